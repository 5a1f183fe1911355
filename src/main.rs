fn main() -> Result<(), Box<dyn std::error::Error>> {
    minplay::runtime::run()
}
