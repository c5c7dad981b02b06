// LogTriage - core/export.rs
//
// Report writers for one analysis result: plain text, JSON and CSV.
// Core layer: writes to any Write trait object; the path argument is only
// used to label errors.

use crate::core::model::{AnalysisResult, EventKind};
use crate::util::constants;
use crate::util::error::ExportError;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

/// Human-readable report: version, summary rows, then each event kind's
/// extracts in file order.
pub fn write_text_report<W: Write>(
    result: &AnalysisResult,
    source: &Path,
    mut writer: W,
    export_path: &Path,
) -> Result<(), ExportError> {
    let io_err = |e| ExportError::Io {
        path: export_path.to_path_buf(),
        source: e,
    };

    writeln!(writer, "{} report: {}", constants::APP_NAME, source.display()).map_err(io_err)?;
    writeln!(writer, "Version: {}", result.version).map_err(io_err)?;

    let rows = result.info_rows();
    let width = rows.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
    for (name, value) in &rows {
        writeln!(writer, "  {name:<width$}  {value}").map_err(io_err)?;
    }

    for kind in EventKind::all() {
        let extracts = result.extracts_for(*kind);
        writeln!(writer).map_err(io_err)?;
        writeln!(writer, "== {} ({}) ==", kind, extracts.len()).map_err(io_err)?;
        for extract in extracts {
            let timestamp = if extract.timestamp.is_empty() {
                "-"
            } else {
                extract.timestamp.as_str()
            };
            writeln!(writer, "[{timestamp}]").map_err(io_err)?;
            for line in extract.details.split(constants::LINE_SEPARATOR) {
                writeln!(writer, "    {line}").map_err(io_err)?;
            }
        }
    }

    writer.flush().map_err(io_err)
}

#[derive(Serialize)]
struct JsonReport<'a> {
    source: String,
    generated_at: String,
    analysis: &'a AnalysisResult,
}

/// Pretty-printed JSON document wrapping the result with its source path
/// and generation time.
pub fn export_json<W: Write>(
    result: &AnalysisResult,
    source: &Path,
    writer: W,
    export_path: &Path,
) -> Result<(), ExportError> {
    let report = JsonReport {
        source: source.display().to_string(),
        generated_at: chrono::Utc::now().to_rfc3339(),
        analysis: result,
    };
    serde_json::to_writer_pretty(writer, &report).map_err(|e| ExportError::Json {
        path: export_path.to_path_buf(),
        source: e,
    })
}

/// One CSV row per event extract, across any number of analysed files.
///
/// Writes: source, kind, timestamp, details. Returns the number of data rows.
pub fn export_csv<W: Write>(
    reports: &[(&Path, &AnalysisResult)],
    writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    let csv_err = |e| ExportError::Csv {
        path: export_path.to_path_buf(),
        source: e,
    };
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer
        .write_record(["source", "kind", "timestamp", "details"])
        .map_err(csv_err)?;

    let mut count = 0;
    for (source, result) in reports {
        let source = source.display().to_string();
        for kind in EventKind::all() {
            for extract in result.extracts_for(*kind) {
                csv_writer
                    .write_record([
                        source.as_str(),
                        kind.label(),
                        extract.timestamp.as_str(),
                        extract.details.as_str(),
                    ])
                    .map_err(csv_err)?;
                count += 1;
            }
        }
    }

    csv_writer.flush().map_err(|e| ExportError::Io {
        path: export_path.to_path_buf(),
        source: e,
    })?;

    Ok(count)
}
