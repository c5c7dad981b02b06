// LogTriage - core/model.rs
//
// Core data model types for analysis output. Pure data definitions with
// no I/O. Timestamps are the raw matched text, never parsed into
// calendar values.

use crate::util::constants;
use serde::Serialize;

// =============================================================================
// Event kinds
// =============================================================================

/// The four fixed multi-line event extractions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EventKind {
    /// Clean exits, matched by the exit identifier.
    Closed,
    Restart,
    Exception,
    Crash,
}

impl EventKind {
    /// Returns all variants in the order the analyzer runs them.
    pub fn all() -> &'static [EventKind] {
        &[
            EventKind::Closed,
            EventKind::Restart,
            EventKind::Exception,
            EventKind::Crash,
        ]
    }

    /// Human-readable label for display.
    pub fn label(&self) -> &'static str {
        match self {
            EventKind::Closed => "Closed",
            EventKind::Restart => "Restart",
            EventKind::Exception => "Exception",
            EventKind::Crash => "Crash",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// Log extract
// =============================================================================

/// One grouped event: the triggering line, its leading context lines, and
/// every following line up to the next timestamped line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LogExtract {
    /// Timestamp assigned when the extract was closed; empty if it never
    /// closed or no timestamp could be resolved.
    pub timestamp: String,

    /// Raw text of the event, lines joined with the normalised separator.
    pub details: String,
}

// =============================================================================
// Custom rule output
// =============================================================================

/// Value produced by one extract rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedValue {
    pub name: String,
    pub value: String,
}

/// Match count produced by one count rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OccurrenceCount {
    pub name: String,
    pub amount: usize,
}

// =============================================================================
// Analysis result
// =============================================================================

/// Snapshot of one analysis run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AnalysisResult {
    /// First timestamp in the log (raw text, possibly empty).
    pub timestamp_start: String,

    /// Last timestamp in the log (raw text, possibly empty).
    pub timestamp_end: String,

    /// Product version, or `"Unknown"` when the marker is absent.
    pub version: String,

    pub closed: Vec<LogExtract>,
    pub restarts: Vec<LogExtract>,
    pub exceptions: Vec<LogExtract>,
    pub crashes: Vec<LogExtract>,

    /// Extract-rule results in rule order.
    pub extracts: Vec<ExtractedValue>,

    /// Count-rule results in rule order.
    pub counts: Vec<OccurrenceCount>,
}

impl AnalysisResult {
    /// The extract list for one event kind.
    pub fn extracts_for(&self, kind: EventKind) -> &[LogExtract] {
        match kind {
            EventKind::Closed => &self.closed,
            EventKind::Restart => &self.restarts,
            EventKind::Exception => &self.exceptions,
            EventKind::Crash => &self.crashes,
        }
    }

    pub fn extracts_for_mut(&mut self, kind: EventKind) -> &mut Vec<LogExtract> {
        match kind {
            EventKind::Closed => &mut self.closed,
            EventKind::Restart => &mut self.restarts,
            EventKind::Exception => &mut self.exceptions,
            EventKind::Crash => &mut self.crashes,
        }
    }

    /// Name/value table shown in the summary view: time bounds, then the
    /// custom extracts, then the custom counts.
    pub fn info_rows(&self) -> Vec<(String, String)> {
        let mut rows = Vec::with_capacity(2 + self.extracts.len() + self.counts.len());
        rows.push((
            constants::DATE_STARTED_LABEL.to_string(),
            self.timestamp_start.clone(),
        ));
        rows.push((
            constants::DATE_ENDED_LABEL.to_string(),
            self.timestamp_end.clone(),
        ));
        rows.extend(
            self.extracts
                .iter()
                .map(|e| (e.name.clone(), e.value.clone())),
        );
        rows.extend(
            self.counts
                .iter()
                .map(|c| (c.name.clone(), c.amount.to_string())),
        );
        rows
    }
}
