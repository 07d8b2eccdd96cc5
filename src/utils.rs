//! Utility functions for output naming, log truncation and directory checks.

use crate::classify::normalize_for_filename;
use chrono::{DateTime, TimeZone};
use std::error::Error;
use std::fs as stdfs;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument};

/// Truncate a string for logging purposes.
///
/// Long strings are cut at the last character boundary before `max` bytes,
/// with an ellipsis and the number of dropped bytes appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…(+{} bytes)", &s[..end], s.len() - end)
}

/// File name of the results workbook for one run.
///
/// `latimes_<YY-MM-DD>_<query>_<section>.json`, with query and section
/// stripped to filename-safe characters.
pub fn workbook_filename<Tz: TimeZone>(now: &DateTime<Tz>, query: &str, section: &str) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!(
        "latimes_{}_{}_{}.json",
        now.format("%y-%m-%d"),
        normalize_for_filename(query),
        normalize_for_filename(section)
    )
}

/// Local path an article image is saved to: `<images_dir>/<normalized title>.jpg`.
pub fn image_path_for(images_dir: &Path, title: &str) -> PathBuf {
    images_dir.join(format!("{}.jpg", normalize_for_filename(title)))
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory if it doesn't exist, then writes and removes a
/// probe file.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or is not writable.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn ensure_writable_dir(path: &Path) -> Result<(), Box<dyn Error>> {
    if let Err(e) = fs::create_dir_all(path).await {
        return Err(Box::new(e));
    }
    let probe_path = path.join("..__probe_write__");
    match stdfs::File::create(&probe_path) {
        Ok(_) => {
            let _ = stdfs::remove_file(&probe_path);
            info!("Output directory is writable");
            Ok(())
        }
        Err(e) => Err(Box::new(e)),
    }
}

/// Open `path` for appending log lines, creating it and its parent directory if needed.
pub fn open_log_file(path: &Path) -> std::io::Result<stdfs::File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        stdfs::create_dir_all(parent)?;
    }
    stdfs::OpenOptions::new().create(true).append(true).open(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_truncate_for_log_short_string() {
        assert_eq!(truncate_for_log("Hello, world!", 100), "Hello, world!");
    }

    #[test]
    fn test_truncate_for_log_long_string() {
        let s = "a".repeat(500);
        let result = truncate_for_log(&s, 100);
        assert!(result.starts_with(&"a".repeat(100)));
        assert!(result.contains("…(+400 bytes)"));
    }

    #[test]
    fn test_truncate_for_log_respects_char_boundaries() {
        let s = "é".repeat(10);
        let result = truncate_for_log(&s, 5);
        assert!(result.starts_with("éé…"));
        assert!(result.contains("(+16 bytes)"));
    }

    #[test]
    fn test_workbook_filename() {
        let now = Utc.with_ymd_and_hms(2024, 6, 9, 12, 0, 0).unwrap();
        assert_eq!(
            workbook_filename(&now, "Fed rates?", "Business & Money"),
            "latimes_24-06-09_Fed rates_Business  Money.json"
        );
    }

    #[test]
    fn test_image_path_for() {
        let path = image_path_for(Path::new("/tmp/imgs"), "Fed's $ Plan: Q&A!");
        assert_eq!(path, PathBuf::from("/tmp/imgs/Feds  Plan QA.jpg"));
    }

    #[tokio::test]
    async fn test_ensure_writable_dir_creates_nested() {
        let tmp = tempfile::tempdir().unwrap();
        let nested = tmp.path().join("out").join("images");
        ensure_writable_dir(&nested).await.unwrap();
        assert!(nested.is_dir());
        assert!(!nested.join("..__probe_write__").exists());
    }

    #[test]
    fn test_open_log_file_appends() {
        use std::io::Write;

        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("logs").join("scraper.log");
        writeln!(open_log_file(&path).unwrap(), "first").unwrap();
        writeln!(open_log_file(&path).unwrap(), "second").unwrap();
        assert_eq!(stdfs::read_to_string(&path).unwrap(), "first\nsecond\n");
    }
}
