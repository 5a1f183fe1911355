use std::path::Path;

use lofty::prelude::{Accessor, TaggedFileExt};
use tracing::trace;

/// Title tag of the file at `path`, if it has a non-blank one.
pub(super) fn read_title(path: &Path) -> Option<String> {
    let tagged = match lofty::read_from_path(path) {
        Ok(t) => t,
        Err(e) => {
            trace!(path = %path.display(), error = %e, "no readable tags");
            return None;
        }
    };

    let tag = tagged.primary_tag().or_else(|| tagged.first_tag())?;
    let title = tag.title()?;
    let title = title.trim();
    if title.is_empty() {
        None
    } else {
        Some(title.to_string())
    }
}
