// LogTriage - core/content.rs
//
// Content source: the full text of one log file, loaded once and cached
// for the lifetime of the object. All matching in the analyzer runs
// against this normalised text, never against the original byte layout.

use crate::platform::fs;
use crate::util::constants::LINE_SEPARATOR;
use crate::util::error::ContentError;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// A log file's text, read lazily on first access.
///
/// The cache is a `OnceLock`, so a source shared between threads is read
/// at most once and readers never observe a partially populated value.
#[derive(Debug)]
pub struct ContentSource {
    path: PathBuf,
    text: OnceLock<String>,
}

impl ContentSource {
    /// Open a log file.
    ///
    /// Fails with `EmptyPath` if the path is blank and `NotFound` if it does
    /// not name an existing file. Nothing is read until `text()` is called.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ContentError> {
        let path = path.as_ref();
        if path.as_os_str().to_string_lossy().trim().is_empty() {
            return Err(ContentError::EmptyPath);
        }
        if !fs::is_existing_file(path) {
            return Err(ContentError::NotFound {
                path: path.to_path_buf(),
            });
        }

        tracing::debug!(path = %path.display(), "Opened log file");
        Ok(Self {
            path: path.to_path_buf(),
            text: OnceLock::new(),
        })
    }

    /// Build an in-memory source. `label` stands in for the file path in
    /// reports and diagnostics.
    pub fn from_text(label: impl Into<PathBuf>, text: &str) -> Self {
        let cell = OnceLock::new();
        let _ = cell.set(normalise_line_endings(text));
        Self {
            path: label.into(),
            text: cell,
        }
    }

    /// Path (or label) this source was created with.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The normalised text. Reads the file on first call only.
    pub fn text(&self) -> Result<&str, ContentError> {
        if let Some(text) = self.text.get() {
            return Ok(text);
        }

        let raw = fs::read_file_lossy(&self.path).map_err(|e| ContentError::Io {
            path: self.path.clone(),
            source: e,
        })?;
        let normalised = normalise_line_endings(&raw);

        tracing::debug!(
            path = %self.path.display(),
            bytes = normalised.len(),
            "Log content loaded"
        );

        // A concurrent reader may have published first; either value is identical.
        Ok(self.text.get_or_init(|| normalised))
    }

    /// The normalised text split into lines.
    pub fn lines(&self) -> Result<Vec<&str>, ContentError> {
        Ok(split_lines(self.text()?))
    }
}

/// Rewrite `\r\n` and lone `\r` to `\n` and drop one trailing terminator,
/// so the result is the file's lines joined with a single separator.
pub fn normalise_line_endings(raw: &str) -> String {
    let unified = raw.replace("\r\n", "\n").replace('\r', "\n");
    unified.lines().collect::<Vec<_>>().join(LINE_SEPARATOR)
}

/// Split normalised text into lines. An empty text is one empty line, so
/// a pattern that matches the empty string still sees it.
pub fn split_lines(text: &str) -> Vec<&str> {
    text.split(LINE_SEPARATOR).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalise_mixed_line_endings() {
        assert_eq!(normalise_line_endings("a\r\nb\rc\nd"), "a\nb\nc\nd");
    }

    #[test]
    fn test_normalise_drops_single_trailing_terminator() {
        assert_eq!(normalise_line_endings("a\r\nb\r\n"), "a\nb");
        // Only the last terminator goes; an intentional blank line survives.
        assert_eq!(normalise_line_endings("a\n\n"), "a\n");
    }

    #[test]
    fn test_split_lines_keeps_blank_lines() {
        assert_eq!(split_lines("a\n\nb"), vec!["a", "", "b"]);
        assert_eq!(split_lines(""), vec![""]);
    }

    #[test]
    fn test_open_blank_path_is_empty_path_error() {
        assert!(matches!(
            ContentSource::open("   "),
            Err(ContentError::EmptyPath)
        ));
        assert!(matches!(ContentSource::open(""), Err(ContentError::EmptyPath)));
    }

    #[test]
    fn test_open_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let result = ContentSource::open(dir.path().join("missing.log"));
        assert!(matches!(result, Err(ContentError::NotFound { .. })));
    }

    #[test]
    fn test_text_is_cached_after_first_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.log");
        std::fs::write(&path, "first\r\nsecond\r\n").unwrap();

        let source = ContentSource::open(&path).unwrap();
        assert_eq!(source.text().unwrap(), "first\nsecond");

        // Later changes on disk are not observed.
        std::fs::write(&path, "rewritten").unwrap();
        assert_eq!(source.text().unwrap(), "first\nsecond");

        // Nor is deletion.
        std::fs::remove_file(&path).unwrap();
        assert_eq!(source.lines().unwrap(), vec!["first", "second"]);
    }

    #[test]
    fn test_from_text_normalises() {
        let source = ContentSource::from_text("<memory>", "x\r\ny\r\n");
        assert_eq!(source.text().unwrap(), "x\ny");
        assert_eq!(source.path(), Path::new("<memory>"));
    }
}
