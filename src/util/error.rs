// LogTriage - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// No string-based error propagation; every variant keeps its cause
// reachable through `source()` for diagnostic logging.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error type for all LogTriage operations.
/// Errors are categorised by the subsystem that produced them.
#[derive(Debug)]
pub enum LogTriageError {
    /// Log file could not be opened or read.
    Content(ContentError),

    /// Rules document loading failed.
    Rules(RulesError),

    /// Analysis aborted.
    Analysis(AnalysisError),

    /// Report export failed.
    Export(ExportError),
}

impl fmt::Display for LogTriageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Content(e) => write!(f, "Log file error: {e}"),
            Self::Rules(e) => write!(f, "Rules error: {e}"),
            Self::Analysis(e) => write!(f, "Analysis error: {e}"),
            Self::Export(e) => write!(f, "Export error: {e}"),
        }
    }
}

impl std::error::Error for LogTriageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Content(e) => Some(e),
            Self::Rules(e) => Some(e),
            Self::Analysis(e) => Some(e),
            Self::Export(e) => Some(e),
        }
    }
}

// ---------------------------------------------------------------------------
// Content errors
// ---------------------------------------------------------------------------

/// Errors related to opening and reading a log file.
#[derive(Debug)]
pub enum ContentError {
    /// The supplied path was empty or whitespace only.
    EmptyPath,

    /// The supplied path does not name an existing file.
    NotFound { path: PathBuf },

    /// Reading the file failed after it was opened.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ContentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPath => write!(f, "No log file path was given"),
            Self::NotFound { path } => {
                write!(f, "Log file '{}' does not exist", path.display())
            }
            Self::Io { path, source } => {
                write!(f, "'{}': I/O error: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ContentError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ContentError> for LogTriageError {
    fn from(e: ContentError) -> Self {
        Self::Content(e)
    }
}

// ---------------------------------------------------------------------------
// Rules errors
// ---------------------------------------------------------------------------

/// Errors related to loading and validating a rules document.
#[derive(Debug)]
pub enum RulesError {
    /// The supplied path was empty or whitespace only.
    EmptyPath,

    /// The rules file does not exist.
    NotFound { path: PathBuf },

    /// I/O error reading the rules file.
    Io { path: PathBuf, source: io::Error },

    /// The document is not valid JSON for the rules schema.
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// The document parsed but produced no rules object (e.g. `null`).
    EmptyDocument { path: PathBuf },

    /// A pattern field does not compile as a regular expression.
    InvalidPattern {
        field: String,
        pattern: String,
        source: regex::Error,
    },

    /// A pattern exceeds the maximum allowed length.
    PatternTooLong {
        field: String,
        length: usize,
        max_length: usize,
    },
}

impl fmt::Display for RulesError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPath => write!(f, "No rules file path was given"),
            Self::NotFound { path } => {
                write!(f, "Rules file '{}' does not exist", path.display())
            }
            Self::Io { path, source } => {
                write!(f, "I/O error reading rules '{}': {source}", path.display())
            }
            Self::Json { path, source } => {
                write!(f, "Failed to parse rules '{}': {source}", path.display())
            }
            Self::EmptyDocument { path } => {
                write!(f, "Rules '{}' does not contain a rules object", path.display())
            }
            Self::InvalidPattern {
                field,
                pattern,
                source,
            } => write!(f, "Invalid regex in '{field}' ('{pattern}'): {source}"),
            Self::PatternTooLong {
                field,
                length,
                max_length,
            } => write!(
                f,
                "Regex in '{field}' is {length} chars, exceeds maximum of {max_length}"
            ),
        }
    }
}

impl std::error::Error for RulesError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
            Self::InvalidPattern { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<RulesError> for LogTriageError {
    fn from(e: RulesError) -> Self {
        Self::Rules(e)
    }
}

// ---------------------------------------------------------------------------
// Analysis errors
// ---------------------------------------------------------------------------

/// Errors that abort a whole `analyze` call. There is no per-rule isolation.
#[derive(Debug)]
pub enum AnalysisError {
    /// The log text could not be loaded.
    Content(ContentError),

    /// A rule supplied a pattern the regex engine rejects.
    InvalidPattern {
        field: String,
        pattern: String,
        source: regex::Error,
    },
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Content(e) => write!(f, "{e}"),
            Self::InvalidPattern {
                field,
                pattern,
                source,
            } => write!(f, "Invalid regex in '{field}' ('{pattern}'): {source}"),
        }
    }
}

impl std::error::Error for AnalysisError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Content(e) => Some(e),
            Self::InvalidPattern { source, .. } => Some(source),
        }
    }
}

impl From<ContentError> for AnalysisError {
    fn from(e: ContentError) -> Self {
        Self::Content(e)
    }
}

impl From<AnalysisError> for LogTriageError {
    fn from(e: AnalysisError) -> Self {
        Self::Analysis(e)
    }
}

// ---------------------------------------------------------------------------
// Export errors
// ---------------------------------------------------------------------------

/// Errors related to writing analysis reports.
#[derive(Debug)]
pub enum ExportError {
    /// I/O error writing the report.
    Io { path: PathBuf, source: io::Error },

    /// CSV serialisation error.
    Csv { path: PathBuf, source: csv::Error },

    /// JSON serialisation error.
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "Export I/O error '{}': {source}", path.display())
            }
            Self::Csv { path, source } => {
                write!(f, "CSV export error '{}': {source}", path.display())
            }
            Self::Json { path, source } => {
                write!(f, "JSON export error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Csv { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
        }
    }
}

impl From<ExportError> for LogTriageError {
    fn from(e: ExportError) -> Self {
        Self::Export(e)
    }
}

/// Convenience type alias for LogTriage results.
pub type Result<T> = std::result::Result<T, LogTriageError>;
