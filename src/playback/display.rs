use super::state::TransportStatus;

/// Callbacks the coordinator uses to push display state to the UI.
///
/// Called from the command path and from the watcher threads. Implementations
/// must not call back into the coordinator.
pub trait DisplaySink: Send + Sync {
    fn on_display_update(&self, title: &str, elapsed: &str);
    fn on_transport_state_changed(&self, status: TransportStatus);
}

/// Format milliseconds as `MM:SS`. Minutes are not capped at 99.
pub fn format_time(milliseconds: u64) -> String {
    let total_seconds = milliseconds / 1000;
    format!("{:02}:{:02}", total_seconds / 60, total_seconds % 60)
}
