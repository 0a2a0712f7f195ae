//! Store and layer names derived from tile directory paths.

use crate::error::{PublishError, PublishResult};

const SEPARATORS: [char; 2] = ['/', '\\'];

/// Derive the coverage store name for `path`.
///
/// Without a marker this is the final path component. With one, it is the
/// part after the marker's last occurrence, separators turned into `_`. A
/// marker that does not occur falls back to the final component.
pub fn derive_store_name(path: &str, marker: Option<&str>) -> PublishResult<String> {
    let trimmed = path.trim_end_matches(SEPARATORS);

    let tail = match marker.and_then(|m| trimmed.rfind(m).map(|i| i + m.len())) {
        Some(end) => trimmed[end..].trim_start_matches(SEPARATORS).to_string(),
        None => trimmed
            .rsplit(SEPARATORS)
            .next()
            .unwrap_or_default()
            .to_string(),
    };

    let name = tail.replace(SEPARATORS, "_");
    if name.is_empty() {
        return Err(PublishError::InvalidName(path.to_string()));
    }
    Ok(name)
}
