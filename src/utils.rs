//! Small helpers for logging and file system checks.

use std::io;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// Truncate a string for logging purposes.
///
/// Long strings are cut to at most `max` bytes (on a char boundary) with an
/// ellipsis and the number of dropped bytes appended.
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}

/// Hidden marker written and removed again by [`ensure_writable_dir`].
///
/// Never matches the `news-*.json` snapshot pattern.
pub const WRITE_CHECK_FILE: &str = ".ai_act_news.write-check";

/// Ensure a directory exists and is writable.
///
/// Only called once at startup. Creates the directory if needed, then
/// creates [`WRITE_CHECK_FILE`] and removes it before returning.
///
/// # Arguments
///
/// * `path` - The output directory
///
/// # Returns
///
/// `Ok(())` once the directory exists and accepted a write.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn ensure_writable_dir(path: &Path) -> io::Result<()> {
    fs::create_dir_all(path).await?;
    let marker = path.join(WRITE_CHECK_FILE);
    fs::write(&marker, b"").await?;
    fs::remove_file(&marker).await?;
    info!("Output directory is writable");
    Ok(())
}
