// LogTriage - core/analyzer.rs
//
// Turns (content, rules) into an AnalysisResult.
//
// Phases, in order: version extraction, version substitution into the
// rules, whole-text timestamp bounds, the four grouped event extractions,
// custom extract rules, custom count rules. Every pattern the run needs
// is compiled before scanning starts; an invalid one aborts the whole
// call.

use crate::core::content::{split_lines, ContentSource};
use crate::core::model::{AnalysisResult, EventKind, ExtractedValue, LogExtract, OccurrenceCount};
use crate::core::rules::{EventRule, Literal, Pattern, RuleSet};
use crate::util::constants::{LINE_SEPARATOR, UNKNOWN_VALUE};
use crate::util::error::AnalysisError;
use crate::util::logging::preview;
use regex::Regex;

/// Analyze one log against a rule set.
///
/// Returns the result together with the rule set as resolved for this log
/// (every `$Version` token replaced). The input rules are not modified.
pub fn analyze(
    content: &ContentSource,
    rules: &RuleSet,
) -> Result<(AnalysisResult, RuleSet), AnalysisError> {
    let text = content.text()?;

    let version = extract_value(
        text,
        &rules.version_identifier_start,
        &rules.version_identifier_end,
    );
    tracing::debug!(file = %content.path().display(), version = %version, "Version extracted");

    let resolved = rules.substitute(Some(&version));

    let timestamps = TimestampResolver::compile(&resolved.timestamp_formats)?;
    let events = CompiledEvents::compile(&resolved)?;
    let counters = compile_count_rules(&resolved)?;

    let timestamp_start = timestamps.first(text);
    let timestamp_end = timestamps.last(text);
    tracing::debug!(start = %timestamp_start, end = %timestamp_end, "Timestamp bounds resolved");

    let extracts = resolved
        .extract_rules
        .iter()
        .map(|rule| ExtractedValue {
            name: rule.name.clone(),
            value: extract_value(text, &rule.identifier_start, &rule.identifier_end),
        })
        .collect();

    let counts = resolved
        .count_rules
        .iter()
        .zip(&counters)
        .map(|(rule, regex)| OccurrenceCount {
            name: rule.name.clone(),
            amount: regex.as_ref().map_or(0, |re| count_occurrences(re, text)),
        })
        .collect();

    let mut result = AnalysisResult {
        timestamp_start,
        timestamp_end,
        version,
        extracts,
        counts,
        ..Default::default()
    };

    let lines = split_lines(text);
    for (kind, compiled) in EventKind::all().iter().zip(&events.0) {
        let Some((identifier, context_lines)) = compiled else {
            continue;
        };
        let extracts = extract_events(&lines, identifier, *context_lines, &timestamps);
        tracing::debug!(kind = %kind, extracts = extracts.len(), "Event extraction complete");
        *result.extracts_for_mut(*kind) = extracts;
    }

    tracing::info!(
        file = %content.path().display(),
        version = %result.version,
        closed = result.closed.len(),
        restarts = result.restarts.len(),
        exceptions = result.exceptions.len(),
        crashes = result.crashes.len(),
        "Analysis complete"
    );

    Ok((result, resolved))
}

// =============================================================================
// Single-value extraction and counting
// =============================================================================

/// Text between the last occurrence of `start` and the next `end` after it,
/// trimmed. Runs to end of text when `end` never follows. `"Unknown"` when
/// `start` is empty or absent.
pub fn extract_value(text: &str, start: &Literal, end: &Literal) -> String {
    if start.is_empty() {
        return UNKNOWN_VALUE.to_string();
    }
    let Some(pos) = text.rfind(start.as_str()) else {
        return UNKNOWN_VALUE.to_string();
    };

    let rest = &text[pos + start.as_str().len()..];
    let value = match rest.find(end.as_str()) {
        Some(end_pos) => &rest[..end_pos],
        None => rest,
    };
    value.trim().to_string()
}

/// Number of non-overlapping matches of `regex` anywhere in `text`.
pub fn count_occurrences(regex: &Regex, text: &str) -> usize {
    regex.find_iter(text).count()
}

// =============================================================================
// Timestamp resolution
// =============================================================================

/// Ordered list of compiled timestamp formats.
///
/// Formats are tried in list order; the first one with a non-empty match
/// decides the answer alone. Matches from different formats never mix.
#[derive(Debug, Clone, Default)]
pub struct TimestampResolver {
    formats: Vec<Regex>,
}

impl TimestampResolver {
    pub fn compile(formats: &[Pattern]) -> Result<Self, AnalysisError> {
        let formats = formats
            .iter()
            .enumerate()
            .map(|(i, format)| compile_pattern(format!("TimestampFormat[{i}]"), format))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { formats })
    }

    /// First match of the first format that matches, or an empty string.
    pub fn first(&self, text: &str) -> String {
        self.formats
            .iter()
            .filter_map(|re| re.find(text).map(|m| m.as_str()))
            .find(|ts| !ts.is_empty())
            .unwrap_or_default()
            .to_string()
    }

    /// Last match of the first format that matches, or an empty string.
    pub fn last(&self, text: &str) -> String {
        self.formats
            .iter()
            .filter_map(|re| re.find_iter(text).last().map(|m| m.as_str()))
            .find(|ts| !ts.is_empty())
            .unwrap_or_default()
            .to_string()
    }
}

// =============================================================================
// Grouped event extraction
// =============================================================================

/// Group lines into extracts around each line matching `identifier`.
///
/// An extract opens on a matching line, seeded with up to `context_lines`
/// preceding lines, and swallows every following line until one carries a
/// timestamp. That boundary line belongs to neither extract and is not
/// tested against `identifier`, so an event logged on the very line that
/// closes the previous extract is not reported.
///
/// On close the extract takes the last timestamp inside its own details,
/// falling back to the boundary line's timestamp. An extract still open at
/// end of input keeps an empty timestamp.
pub fn extract_events(
    lines: &[&str],
    identifier: &Regex,
    context_lines: usize,
    timestamps: &TimestampResolver,
) -> Vec<LogExtract> {
    let mut extracts = Vec::new();
    let mut open: Option<LogExtract> = None;

    for (i, line) in lines.iter().enumerate() {
        if let Some(mut current) = open.take() {
            let boundary = timestamps.first(line);
            if boundary.is_empty() {
                current.details.push_str(LINE_SEPARATOR);
                current.details.push_str(line);
                open = Some(current);
                continue;
            }

            let inner = timestamps.last(&current.details);
            current.timestamp = if inner.is_empty() { boundary } else { inner };
            extracts.push(current);
            continue;
        }

        if !identifier.is_match(line) {
            continue;
        }

        tracing::trace!(line = i + 1, text = preview(line), "Extract opened");
        let mut details = String::new();
        for prior in &lines[i.saturating_sub(context_lines)..i] {
            details.push_str(prior);
            details.push_str(LINE_SEPARATOR);
        }
        details.push_str(line);
        open = Some(LogExtract {
            timestamp: String::new(),
            details,
        });
    }

    extracts.extend(open);
    extracts
}

// =============================================================================
// Pattern compilation
// =============================================================================

/// Compiled identifier and context size per event kind, in `EventKind::all()`
/// order. `None` marks a kind whose identifier is empty.
struct CompiledEvents(Vec<Option<(Regex, usize)>>);

impl CompiledEvents {
    fn compile(rules: &RuleSet) -> Result<Self, AnalysisError> {
        let compiled = EventKind::all()
            .iter()
            .map(|kind| {
                let EventRule {
                    field,
                    identifier,
                    context_lines,
                } = rules.event_rule(*kind);
                if identifier.is_empty() {
                    return Ok(None);
                }
                compile_pattern(field.to_string(), identifier).map(|re| Some((re, context_lines)))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self(compiled))
    }
}

fn compile_count_rules(rules: &RuleSet) -> Result<Vec<Option<Regex>>, AnalysisError> {
    rules
        .count_rules
        .iter()
        .enumerate()
        .map(|(i, rule)| {
            if rule.identifier.is_empty() {
                return Ok(None);
            }
            compile_pattern(format!("Count[{i}].Identifier"), &rule.identifier).map(Some)
        })
        .collect()
}

fn compile_pattern(field: String, pattern: &Pattern) -> Result<Regex, AnalysisError> {
    pattern
        .compile()
        .map_err(|e| AnalysisError::InvalidPattern {
            field,
            pattern: pattern.as_str().to_string(),
            source: e,
        })
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rules::inline_source;

    const TS: &str = r"\d{2}:\d{2}:\d{2}";

    fn resolver(formats: &[&str]) -> TimestampResolver {
        let patterns: Vec<Pattern> = formats.iter().map(|f| Pattern::new(*f)).collect();
        TimestampResolver::compile(&patterns).unwrap()
    }

    fn rules(json: &str) -> RuleSet {
        RuleSet::from_json(json, &inline_source()).unwrap()
    }

    fn run(text: &str, json: &str) -> AnalysisResult {
        let content = ContentSource::from_text("test.log", text);
        analyze(&content, &rules(json)).unwrap().0
    }

    // -------------------------------------------------------------------------
    // Version / single-value extraction
    // -------------------------------------------------------------------------

    #[test]
    fn test_version_unknown_without_marker() {
        let v = extract_value("no marker here", &Literal::new("Version: "), &Literal::new("\n"));
        assert_eq!(v, "Unknown");
    }

    #[test]
    fn test_version_uses_last_marker() {
        let text = "[v1.0.0] boot\nstuff\n[v2.5.1] boot\nmore";
        let v = extract_value(text, &Literal::new("[v"), &Literal::new("]"));
        assert_eq!(v, "2.5.1");
    }

    #[test]
    fn test_version_round_trip_with_newline_end() {
        let text = "starting...\nVersion: 1.2.3\nready...";
        let v = extract_value(text, &Literal::new("Version: "), &Literal::new("\n"));
        assert_eq!(v, "1.2.3");
    }

    #[test]
    fn test_value_runs_to_end_when_end_missing() {
        let v = extract_value("a\nBuild:  77-rc  ", &Literal::new("Build:"), &Literal::new(";"));
        assert_eq!(v, "77-rc");
    }

    #[test]
    fn test_delimiters_are_literal_not_regex() {
        let text = "cfg (a.b) = [x.y] end";
        let v = extract_value(text, &Literal::new("(a.b) = ["), &Literal::new("]"));
        assert_eq!(v, "x.y");
    }

    #[test]
    fn test_empty_start_delimiter_is_unknown() {
        assert_eq!(extract_value("text", &Literal::default(), &Literal::default()), "Unknown");
    }

    #[test]
    fn test_empty_end_delimiter_yields_empty_value() {
        assert_eq!(extract_value("key=v", &Literal::new("key="), &Literal::default()), "");
    }

    // -------------------------------------------------------------------------
    // Counting
    // -------------------------------------------------------------------------

    #[test]
    fn test_count_three_errors() {
        let re = Regex::new("ERROR").unwrap();
        let text = "ERROR one\ninfo\nERROR two\nERROR three";
        assert_eq!(count_occurrences(&re, text), 3);
    }

    #[test]
    fn test_count_is_non_overlapping() {
        let re = Regex::new("aa").unwrap();
        assert_eq!(count_occurrences(&re, "aaaa"), 2);
    }

    // -------------------------------------------------------------------------
    // Timestamp resolution
    // -------------------------------------------------------------------------

    #[test]
    fn test_timestamps_fall_through_to_matching_format() {
        let r = resolver(&[r"\d{4}-\d{2}-\d{2}", TS]);
        let text = "10:00:00 a\n11:00:00 b\n12:00:00 c";
        assert_eq!(r.first(text), "10:00:00");
        assert_eq!(r.last(text), "12:00:00");
    }

    #[test]
    fn test_timestamps_never_mix_formats() {
        let r = resolver(&[r"\d{4}-\d{2}-\d{2}", TS]);
        // Format A matches once in the middle; format B matches before and after.
        let text = "10:00:00 a\n2024-01-15 b\n12:00:00 c";
        assert_eq!(r.first(text), "2024-01-15");
        assert_eq!(r.last(text), "2024-01-15");
    }

    #[test]
    fn test_timestamps_empty_when_nothing_matches() {
        let r = resolver(&[TS]);
        assert_eq!(r.first("no time"), "");
        assert_eq!(r.last("no time"), "");
        assert_eq!(resolver(&[]).first("10:00:00"), "");
    }

    #[test]
    fn test_empty_match_counts_as_no_match() {
        let r = resolver(&["x*", TS]);
        assert_eq!(r.first("10:00:00"), "10:00:00");
    }

    #[test]
    fn test_invalid_timestamp_format_is_error() {
        let result = TimestampResolver::compile(&[Pattern::new(TS), Pattern::new("([")]);
        match result {
            Err(AnalysisError::InvalidPattern { field, .. }) => {
                assert_eq!(field, "TimestampFormat[1]")
            }
            other => panic!("Expected InvalidPattern, got: {other:?}"),
        }
    }

    // -------------------------------------------------------------------------
    // Grouped extraction
    // -------------------------------------------------------------------------

    fn group(text: &str, identifier: &str, context: usize) -> Vec<LogExtract> {
        let lines = split_lines(text);
        extract_events(
            &lines,
            &Regex::new(identifier).unwrap(),
            context,
            &resolver(&[TS]),
        )
    }

    #[test]
    fn test_group_trigger_with_continuations_closes_on_timestamp() {
        let text = "CRASH detected\n  at frame 1\n  at frame 2\n10:00:05 recovered";
        let extracts = group(text, "CRASH", 0);
        assert_eq!(extracts.len(), 1);
        assert_eq!(extracts[0].details, "CRASH detected\n  at frame 1\n  at frame 2");
        assert_eq!(extracts[0].timestamp, "10:00:05");
    }

    #[test]
    fn test_group_prefers_timestamp_inside_details() {
        let text = "10:00:01 CRASH detected\n  at frame\n10:00:09 next";
        let extracts = group(text, "CRASH", 0);
        assert_eq!(extracts[0].timestamp, "10:00:01");
        assert!(!extracts[0].details.contains("next"));
    }

    #[test]
    fn test_group_includes_context_lines() {
        let text = "l0\nl1\nl2\nl3\nl4\nCRASH l5\n10:00:00 after";
        let extracts = group(text, "CRASH", 2);
        assert_eq!(extracts[0].details, "l3\nl4\nCRASH l5");
    }

    #[test]
    fn test_group_context_clipped_at_start() {
        let extracts = group("l0\nCRASH l1", "CRASH", 5);
        assert_eq!(extracts[0].details, "l0\nCRASH l1");
    }

    #[test]
    fn test_group_open_at_eof_keeps_empty_timestamp() {
        let extracts = group("10:00:00 ok\n10:00:01 CRASH\ntrailing", "CRASH", 0);
        assert_eq!(extracts.len(), 1);
        assert_eq!(extracts[0].details, "10:00:01 CRASH\ntrailing");
        assert_eq!(extracts[0].timestamp, "");
    }

    #[test]
    fn test_group_boundary_line_never_opens_extract() {
        let text = "10:00:00 CRASH one\n10:00:01 CRASH two\n10:00:02 CRASH three";
        let extracts = group(text, "CRASH", 0);
        // Line two closes the first extract and is consumed as a boundary.
        assert_eq!(extracts.len(), 2);
        assert_eq!(extracts[0].details, "10:00:00 CRASH one");
        assert_eq!(extracts[1].details, "10:00:02 CRASH three");
    }

    #[test]
    fn test_group_preserves_file_order() {
        let text = "CRASH a\n10:00:00 x\nok\nCRASH b\n10:00:01 y";
        let extracts = group(text, "CRASH", 0);
        let details: Vec<&str> = extracts.iter().map(|e| e.details.as_str()).collect();
        assert_eq!(details, vec!["CRASH a", "CRASH b"]);
    }

    // -------------------------------------------------------------------------
    // Full analysis
    // -------------------------------------------------------------------------

    const SESSION_RULES: &str = r#"{
        "TimestampFormat": ["\\d{2}:\\d{2}:\\d{2}"],
        "VersionIdentifierStart": "MyApp v",
        "VersionIdentifierEnd": " ",
        "RestartIdentifier": "Restarting",
        "ExceptionIdentifier": "Exception:",
        "ExitIdentifier": "Shutdown complete",
        "CrashIdentifier": "FATAL",
        "AdditionalExceptionLines": 1,
        "Extract": [
            { "Name": "User", "IdentifierStart": "user=", "IdentifierEnd": ";" },
            { "Name": "Release", "IdentifierStart": "MyApp v$Version", "IdentifierEnd": "\n" }
        ],
        "Count": [
            { "Name": "Warnings", "Identifier": "WARN" },
            { "Name": "Version mentions", "Identifier": "$Version" }
        ]
    }"#;

    const SESSION_LOG: &str = concat!(
        "08:00:00 MyApp v3.1.4 starting (build 9)\n",
        "08:00:01 login user=alice;\n",
        "08:00:02 WARN low disk\n",
        "08:00:03 calling service\n",
        "08:00:04 Exception: timeout\n",
        "   at Service.call\n",
        "08:00:05 Restarting worker\n",
        "08:00:06 WARN retry 3.1.4\n",
        "08:00:07 Shutdown complete",
    );

    #[test]
    fn test_analyze_session_log() {
        let result = run(SESSION_LOG, SESSION_RULES);

        assert_eq!(result.version, "3.1.4");
        assert_eq!(result.timestamp_start, "08:00:00");
        assert_eq!(result.timestamp_end, "08:00:07");

        assert_eq!(result.exceptions.len(), 1);
        assert_eq!(
            result.exceptions[0].details,
            "08:00:03 calling service\n08:00:04 Exception: timeout\n   at Service.call"
        );
        assert_eq!(result.exceptions[0].timestamp, "08:00:04");

        assert_eq!(result.restarts.len(), 1);
        assert_eq!(result.restarts[0].timestamp, "08:00:05");

        // Last line: still open at end of input.
        assert_eq!(result.closed.len(), 1);
        assert_eq!(result.closed[0].timestamp, "");
        assert!(result.crashes.is_empty());

        assert_eq!(result.extracts[0].value, "alice");
        assert_eq!(result.extracts[1].value, "starting (build 9)");

        assert_eq!(result.counts[0].amount, 2);
        assert_eq!(result.counts[1].name, "Version mentions");
        assert_eq!(result.counts[1].amount, 2);
    }

    #[test]
    fn test_analyze_returns_resolved_rules() {
        let json = r#"{ "VersionIdentifierStart": "v=", "VersionIdentifierEnd": ";", "CrashIdentifier": "crash in $Version" }"#;
        let original = rules(json);
        let content = ContentSource::from_text("t.log", "v=7.0;\ncrash in 7.0");
        let (result, resolved) = analyze(&content, &original).unwrap();

        assert_eq!(resolved.crash_identifier.as_str(), "crash in 7.0");
        assert_eq!(original.crash_identifier.as_str(), "crash in $Version");
        assert_eq!(result.crashes.len(), 1);
    }

    #[test]
    fn test_unknown_version_is_substituted_literally() {
        let json = r#"{ "VersionIdentifierStart": "v=", "Count": [{ "Name": "c", "Identifier": "$Version" }] }"#;
        let content = ContentSource::from_text("t.log", "Unknown Unknown");
        let (result, resolved) = analyze(&content, &rules(json)).unwrap();
        assert_eq!(result.version, "Unknown");
        assert_eq!(resolved.count_rules[0].identifier.as_str(), "Unknown");
        assert_eq!(result.counts[0].amount, 2);
    }

    #[test]
    fn test_empty_rules_produce_empty_results() {
        let result = run("10:00:00 something\nanother line\n", "{}");
        assert_eq!(result.version, "Unknown");
        assert_eq!(result.timestamp_start, "");
        assert_eq!(result.timestamp_end, "");
        for kind in EventKind::all() {
            assert!(result.extracts_for(*kind).is_empty(), "{kind} should be empty");
        }
        assert!(result.extracts.is_empty());
        assert!(result.counts.is_empty());
    }

    #[test]
    fn test_empty_count_pattern_counts_zero() {
        let result = run("abc", r#"{ "Count": [{ "Name": "blank", "Identifier": "" }] }"#);
        assert_eq!(result.counts[0].amount, 0);
    }

    #[test]
    fn test_invalid_count_pattern_aborts_analysis() {
        let content = ContentSource::from_text("t.log", "ERROR");
        let json = r#"{ "Count": [{ "Name": "ok", "Identifier": "ERROR" }, { "Name": "bad", "Identifier": "(ERROR" }] }"#;
        match analyze(&content, &rules(json)) {
            Err(AnalysisError::InvalidPattern { field, pattern, .. }) => {
                assert_eq!(field, "Count[1].Identifier");
                assert_eq!(pattern, "(ERROR");
            }
            other => panic!("Expected InvalidPattern, got: {other:?}"),
        }
    }

    #[test]
    fn test_invalid_event_identifier_aborts_analysis() {
        let content = ContentSource::from_text("t.log", "text");
        let result = analyze(&content, &rules(r#"{ "RestartIdentifier": "[" }"#));
        assert!(matches!(
            result,
            Err(AnalysisError::InvalidPattern { ref field, .. }) if field == "RestartIdentifier"
        ));
    }

    #[test]
    fn test_empty_log_is_not_an_error() {
        let result = run("", SESSION_RULES);
        assert_eq!(result.version, "Unknown");
        assert!(result.crashes.is_empty());
        assert_eq!(result.counts[0].amount, 0);
    }

    #[test]
    fn test_empty_log_is_one_empty_line() {
        let result = run("", r#"{ "CrashIdentifier": "^$" }"#);
        assert_eq!(
            result.crashes,
            vec![LogExtract {
                timestamp: String::new(),
                details: String::new(),
            }]
        );
    }
}
