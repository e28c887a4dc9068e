//! Debug dumps of deobfuscated pages.

use std::path::{Path, PathBuf};

use log::warn;

use crate::utils::sanitize_filename;

/// Path of the dump for `url` at the given attempt number.
pub(crate) fn dump_path(dir: &Path, attempt: usize, url: &str) -> PathBuf {
    dir.join(format!("{attempt}_{}.html", sanitize_filename(url)))
}

/// Writes `html` to `{dir}/{attempt}_{sanitized url}.html`.
///
/// Failures are logged and otherwise ignored.
pub(crate) async fn write_debug_dump(dir: &Path, attempt: usize, url: &str, html: &str) {
    let path = dump_path(dir, attempt, url);
    warn!("NEW DEBUG FILE! {}", path.display());
    if let Err(e) = tokio::fs::write(&path, html).await {
        warn!("Failed to write debug file {}: {}", path.display(), e);
    }
}
