// LogTriage - core/rules.rs
//
// Rules document loading and the typed runtime rule set.
//
// The raw JSON document (`RuleDefinition`) is converted into a `RuleSet`
// whose fields say how they are used: `Literal` values are searched as
// plain substrings, `Pattern` values are compiled as regular expressions.
// Template substitution is a pure function returning a new `RuleSet`; it
// runs once at load time without a version and once more per analysis
// with the version found in the log.

use crate::core::model::EventKind;
use crate::core::template::{IdentifierSlot, IdentifierValues};
use crate::platform::fs;
use crate::util::constants;
use crate::util::error::RulesError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};

// =============================================================================
// JSON deserialization structures (raw input)
// =============================================================================

/// Raw rules document as deserialized from JSON.
///
/// Every field is optional; unknown fields are ignored. Field names are
/// matched without regard to case (see `canonical_field_names`).
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct RuleDefinition {
    /// Timestamp regexes in priority order.
    pub timestamp_format: Vec<String>,
    pub version_identifier_start: String,
    pub version_identifier_end: String,
    pub restart_identifier: String,
    pub exception_identifier: String,
    pub exit_identifier: String,
    pub crash_identifier: String,
    pub additional_restart_lines: usize,
    pub additional_exception_lines: usize,
    pub additional_exit_lines: usize,
    pub additional_crash_lines: usize,
    pub extract: Vec<ExtractRuleDef>,
    pub count: Vec<CountRuleDef>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct ExtractRuleDef {
    pub name: String,
    pub identifier_start: String,
    pub identifier_end: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct CountRuleDef {
    pub name: String,
    pub identifier: String,
}

/// Every field name the rules document knows, in its canonical casing.
const DOCUMENT_FIELDS: &[&str] = &[
    "TimestampFormat",
    "VersionIdentifierStart",
    "VersionIdentifierEnd",
    "RestartIdentifier",
    "ExceptionIdentifier",
    "ExitIdentifier",
    "CrashIdentifier",
    "AdditionalRestartLines",
    "AdditionalExceptionLines",
    "AdditionalExitLines",
    "AdditionalCrashLines",
    "Extract",
    "Count",
    "Name",
    "IdentifierStart",
    "IdentifierEnd",
    "Identifier",
];

/// Rewrite object keys that match a document field ignoring ASCII case to
/// the canonical spelling, at every depth. Unknown keys pass through.
// TODO: a document holding the same field under two casings silently keeps
// one of them; report it as a duplicate instead.
fn canonical_field_names(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, field)| {
                    let key = DOCUMENT_FIELDS
                        .iter()
                        .find(|known| known.eq_ignore_ascii_case(&key))
                        .map_or(key, |known| known.to_string());
                    (key, canonical_field_names(field))
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(canonical_field_names).collect()),
        other => other,
    }
}

// =============================================================================
// Typed rule values
// =============================================================================

/// A delimiter searched for as a plain substring. Regex metacharacters
/// have no special meaning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Literal(String);

impl Literal {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A regular expression, kept as source text until an analysis compiles it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Pattern(String);

impl Pattern {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// An empty pattern disables the rule that owns it.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn compile(&self) -> Result<Regex, regex::Error> {
        Regex::new(&self.0)
    }
}

/// Named single-value extraction between two delimiters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ExtractRule {
    pub name: String,
    pub identifier_start: Literal,
    pub identifier_end: Literal,
}

/// Named occurrence count of a pattern.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CountRule {
    pub name: String,
    pub identifier: Pattern,
}

/// Identifier and context size driving one grouped event extraction.
#[derive(Debug, Clone, Copy)]
pub struct EventRule<'a> {
    /// Rules-document field the identifier came from.
    pub field: &'static str,
    pub identifier: &'a Pattern,
    pub context_lines: usize,
}

// =============================================================================
// Rule set
// =============================================================================

/// Runtime rule set. Serializes back to the document's field names so a
/// resolved set can be inspected in the same shape it was written in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct RuleSet {
    #[serde(rename = "TimestampFormat")]
    pub timestamp_formats: Vec<Pattern>,
    pub version_identifier_start: Literal,
    pub version_identifier_end: Literal,
    pub restart_identifier: Pattern,
    pub exception_identifier: Pattern,
    pub exit_identifier: Pattern,
    pub crash_identifier: Pattern,
    pub additional_restart_lines: usize,
    pub additional_exception_lines: usize,
    pub additional_exit_lines: usize,
    pub additional_crash_lines: usize,
    #[serde(rename = "Extract")]
    pub extract_rules: Vec<ExtractRule>,
    #[serde(rename = "Count")]
    pub count_rules: Vec<CountRule>,
}

impl From<RuleDefinition> for RuleSet {
    fn from(def: RuleDefinition) -> Self {
        Self {
            timestamp_formats: def.timestamp_format.into_iter().map(Pattern).collect(),
            version_identifier_start: Literal(def.version_identifier_start),
            version_identifier_end: Literal(def.version_identifier_end),
            restart_identifier: Pattern(def.restart_identifier),
            exception_identifier: Pattern(def.exception_identifier),
            exit_identifier: Pattern(def.exit_identifier),
            crash_identifier: Pattern(def.crash_identifier),
            additional_restart_lines: def.additional_restart_lines,
            additional_exception_lines: def.additional_exception_lines,
            additional_exit_lines: def.additional_exit_lines,
            additional_crash_lines: def.additional_crash_lines,
            extract_rules: def
                .extract
                .into_iter()
                .map(|r| ExtractRule {
                    name: r.name,
                    identifier_start: Literal(r.identifier_start),
                    identifier_end: Literal(r.identifier_end),
                })
                .collect(),
            count_rules: def
                .count
                .into_iter()
                .map(|r| CountRule {
                    name: r.name,
                    identifier: Pattern(r.identifier),
                })
                .collect(),
        }
    }
}

impl RuleSet {
    /// Load a rules document from disk and run the load-time substitution.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RulesError> {
        let path = path.as_ref();
        if path.as_os_str().to_string_lossy().trim().is_empty() {
            return Err(RulesError::EmptyPath);
        }
        if !fs::is_existing_file(path) {
            return Err(RulesError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let content = fs::read_file_lossy(path).map_err(|e| RulesError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let rules = Self::from_json(&content, path)?;
        tracing::info!(
            path = %path.display(),
            timestamp_formats = rules.timestamp_formats.len(),
            extract_rules = rules.extract_rules.len(),
            count_rules = rules.count_rules.len(),
            "Rules loaded"
        );
        Ok(rules)
    }

    /// Parse a rules document and run the load-time substitution.
    ///
    /// `source_path` is used for error messages only (not for I/O).
    pub fn from_json(json: &str, source_path: &Path) -> Result<Self, RulesError> {
        let json_err = |e| RulesError::Json {
            path: source_path.to_path_buf(),
            source: e,
        };
        let json = json.strip_prefix('\u{feff}').unwrap_or(json);
        let document: Value = serde_json::from_str(json).map_err(json_err)?;
        let def: Option<RuleDefinition> =
            serde_json::from_value(canonical_field_names(document)).map_err(json_err)?;
        let def = def.ok_or_else(|| RulesError::EmptyDocument {
            path: source_path.to_path_buf(),
        })?;

        Ok(RuleSet::from(def).substitute(None))
    }

    /// Current values of the six identifier fields.
    pub fn identifiers(&self) -> IdentifierValues {
        let mut values = IdentifierValues::default();
        values.set(
            IdentifierSlot::VersionStart,
            self.version_identifier_start.0.clone(),
        );
        values.set(
            IdentifierSlot::VersionEnd,
            self.version_identifier_end.0.clone(),
        );
        values.set(IdentifierSlot::Restart, self.restart_identifier.0.clone());
        values.set(
            IdentifierSlot::Exception,
            self.exception_identifier.0.clone(),
        );
        values.set(IdentifierSlot::Exit, self.exit_identifier.0.clone());
        values.set(IdentifierSlot::Crash, self.crash_identifier.0.clone());
        values
    }

    /// Resolve template placeholders, returning a new rule set.
    ///
    /// Order within one pass:
    /// 1. timestamp formats, against the identifiers as they were on entry;
    /// 2. the six identifiers, in slot order, each seeing earlier slots rewritten;
    /// 3. extract-rule delimiters and 4. count-rule patterns, against the
    ///    rewritten identifiers.
    ///
    /// `$Version` is only replaced when `version` is a non-empty string.
    pub fn substitute(&self, version: Option<&str>) -> RuleSet {
        let mut ids = self.identifiers();

        let timestamp_formats = self
            .timestamp_formats
            .iter()
            .map(|f| Pattern(ids.resolve(f.as_str(), version)))
            .collect();

        ids.resolve_in_order(version);

        let extract_rules = self
            .extract_rules
            .iter()
            .map(|r| ExtractRule {
                name: r.name.clone(),
                identifier_start: Literal(ids.resolve(r.identifier_start.as_str(), version)),
                identifier_end: Literal(ids.resolve(r.identifier_end.as_str(), version)),
            })
            .collect();

        let count_rules = self
            .count_rules
            .iter()
            .map(|r| CountRule {
                name: r.name.clone(),
                identifier: Pattern(ids.resolve(r.identifier.as_str(), version)),
            })
            .collect();

        RuleSet {
            timestamp_formats,
            version_identifier_start: Literal::new(ids.get(IdentifierSlot::VersionStart)),
            version_identifier_end: Literal::new(ids.get(IdentifierSlot::VersionEnd)),
            restart_identifier: Pattern::new(ids.get(IdentifierSlot::Restart)),
            exception_identifier: Pattern::new(ids.get(IdentifierSlot::Exception)),
            exit_identifier: Pattern::new(ids.get(IdentifierSlot::Exit)),
            crash_identifier: Pattern::new(ids.get(IdentifierSlot::Crash)),
            additional_restart_lines: self.additional_restart_lines,
            additional_exception_lines: self.additional_exception_lines,
            additional_exit_lines: self.additional_exit_lines,
            additional_crash_lines: self.additional_crash_lines,
            extract_rules,
            count_rules,
        }
    }

    /// Identifier and context size for one event kind.
    pub fn event_rule(&self, kind: EventKind) -> EventRule<'_> {
        match kind {
            EventKind::Closed => EventRule {
                field: IdentifierSlot::Exit.field_name(),
                identifier: &self.exit_identifier,
                context_lines: self.additional_exit_lines,
            },
            EventKind::Restart => EventRule {
                field: IdentifierSlot::Restart.field_name(),
                identifier: &self.restart_identifier,
                context_lines: self.additional_restart_lines,
            },
            EventKind::Exception => EventRule {
                field: IdentifierSlot::Exception.field_name(),
                identifier: &self.exception_identifier,
                context_lines: self.additional_exception_lines,
            },
            EventKind::Crash => EventRule {
                field: IdentifierSlot::Crash.field_name(),
                identifier: &self.crash_identifier,
                context_lines: self.additional_crash_lines,
            },
        }
    }

    /// Compile every non-empty pattern and report each one that fails.
    ///
    /// The analyzer never calls this; it is a pre-flight check for callers
    /// that want to reject a document before the first analysis.
    pub fn validate(&self) -> Vec<RulesError> {
        let mut patterns: Vec<(String, &Pattern)> = Vec::new();
        for (i, format) in self.timestamp_formats.iter().enumerate() {
            patterns.push((format!("TimestampFormat[{i}]"), format));
        }
        for kind in EventKind::all() {
            let rule = self.event_rule(*kind);
            patterns.push((rule.field.to_string(), rule.identifier));
        }
        for (i, rule) in self.count_rules.iter().enumerate() {
            patterns.push((format!("Count[{i}].Identifier"), &rule.identifier));
        }

        let mut errors = Vec::new();
        for (field, pattern) in patterns {
            if pattern.is_empty() {
                continue;
            }
            if pattern.as_str().len() > constants::MAX_REGEX_PATTERN_LENGTH {
                errors.push(RulesError::PatternTooLong {
                    field,
                    length: pattern.as_str().len(),
                    max_length: constants::MAX_REGEX_PATTERN_LENGTH,
                });
                continue;
            }
            if let Err(e) = pattern.compile() {
                errors.push(RulesError::InvalidPattern {
                    field,
                    pattern: pattern.as_str().to_string(),
                    source: e,
                });
            }
        }

        tracing::debug!(errors = errors.len(), "Rules validation complete");
        errors
    }
}

/// Label used for rules parsed from memory rather than a file.
pub fn inline_source() -> PathBuf {
    PathBuf::from("<inline>")
}

// =============================================================================
// Tests
// =============================================================================
