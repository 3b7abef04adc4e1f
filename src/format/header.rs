//! Header line describing the open file.

use super::human_readable_size;
use crate::error::Result;
use chrono::{DateTime, Local, NaiveDateTime};
use std::path::Path;

/// Build the header text from the file's metadata on disk.
pub fn header_text(path: &Path) -> Result<String> {
    let meta = std::fs::metadata(path)?;
    let modified: DateTime<Local> = meta.modified()?.into();
    Ok(format_header(
        &path.display().to_string(),
        &modified.naive_local(),
        meta.len(),
    ))
}

/// Format `File: <path>, Last changed: <YYYY-MM-DD HH:MM:SS>, Size: <N> <unit>`.
pub fn format_header(path: &str, modified: &NaiveDateTime, size: u64) -> String {
    format!(
        "File: {}, Last changed: {}, Size: {}",
        path,
        modified.format("%Y-%m-%d %H:%M:%S"),
        human_readable_size(size)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::io::Write;

    #[test]
    fn test_format_header() {
        let modified = NaiveDate::from_ymd_opt(2025, 6, 11)
            .unwrap()
            .and_hms_opt(9, 5, 7)
            .unwrap();
        assert_eq!(
            format_header("data/run.h5", &modified, 1536),
            "File: data/run.h5, Last changed: 2025-06-11 09:05:07, Size: 2 kB"
        );
    }

    #[test]
    fn test_header_text_reads_file_metadata() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[0u8; 500]).unwrap();
        file.flush().unwrap();

        let text = header_text(file.path()).unwrap();
        assert!(text.starts_with("File: "));
        assert!(text.contains(", Last changed: "));
        assert!(text.ends_with(", Size: 500 Byte"));
    }

    #[test]
    fn test_header_text_missing_file() {
        assert!(header_text(Path::new("/definitely/not/here.h5")).is_err());
    }
}
