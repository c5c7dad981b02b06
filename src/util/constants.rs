// LogTriage - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "LogTriage";

/// Application identifier used for config/data directories.
pub const APP_ID: &str = "LogTriage";

/// Current application version (updated by release script).
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Content
// =============================================================================

/// Line separator used in normalised log text. Every source file is
/// rewritten to this convention before any matching happens.
pub const LINE_SEPARATOR: &str = "\n";

/// File size threshold in bytes above which log content is read through a
/// read-only memory map instead of a heap buffer.
pub const LARGE_FILE_THRESHOLD: u64 = 100 * 1024 * 1024; // 100 MB

// =============================================================================
// Analysis
// =============================================================================

/// Value reported when the version marker never appears in the log, and for
/// custom extract rules whose start delimiter is absent.
pub const UNKNOWN_VALUE: &str = "Unknown";

/// Display name of the first-timestamp info row.
pub const DATE_STARTED_LABEL: &str = "Date Started";

/// Display name of the last-timestamp info row.
pub const DATE_ENDED_LABEL: &str = "Date Ended";

// =============================================================================
// Rule validation limits
// =============================================================================

/// Maximum regex pattern length accepted by `RuleSet::validate`.
/// Only enforced by the explicit pre-flight check, never by `analyze`.
pub const MAX_REGEX_PATTERN_LENGTH: usize = 4_096;

// =============================================================================
// Logging
// =============================================================================

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Maximum length of a log line included in debug output.
/// Prevents accidental exposure of sensitive data in long lines.
pub const DEBUG_MAX_LINE_PREVIEW: usize = 200;

// =============================================================================
// Configuration
// =============================================================================

/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Rules document looked up in the config directory when neither the CLI
/// nor `config.toml` names one.
pub const DEFAULT_RULES_FILE_NAME: &str = "rules.json";
