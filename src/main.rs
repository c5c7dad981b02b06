// LogTriage - main.rs
//
// Command-line entry point. Handles:
// 1. CLI argument parsing
// 2. config.toml loading and logging initialisation (debug mode support)
// 3. Rules document lookup and loading
// 4. Parallel analysis of every log file and report output

use clap::{Parser, ValueEnum};
use logtriage::app::{batch, rules_mgr};
use logtriage::core::export;
use logtriage::core::model::AnalysisResult;
use logtriage::platform;
use logtriage::util;
use logtriage::util::error::{ExportError, LogTriageError};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// LogTriage - rule-driven log file triage.
///
/// Reads one or more log files and reports the product version, the time
/// span, and grouped exit, restart, exception and crash extracts, all
/// driven by a JSON rules document.
#[derive(Parser, Debug)]
#[command(name = "logtriage", version, about)]
struct Cli {
    /// Log files to analyse.
    #[arg(value_name = "LOG_FILE", required_unless_present = "check")]
    files: Vec<PathBuf>,

    /// Rules document (defaults to config.toml's [rules] path, then
    /// rules.json in the config directory).
    #[arg(short = 'r', long = "rules")]
    rules: Option<PathBuf>,

    /// Report format.
    #[arg(short = 'f', long = "format", value_enum)]
    format: Option<ReportFormat>,

    /// Write the report to this file instead of stdout.
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Validate the rules document and exit.
    #[arg(long = "check")]
    check: bool,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug")]
    debug: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ReportFormat {
    Text,
    Json,
    Csv,
}

impl ReportFormat {
    /// Map a validated config.toml value; unknown names fall back to text.
    fn from_config(name: &str) -> Self {
        match name {
            "json" => ReportFormat::Json,
            "csv" => ReportFormat::Csv,
            _ => ReportFormat::Text,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let platform_paths = platform::config::PlatformPaths::resolve();
    let (config, config_warnings) = platform::config::load_config(&platform_paths.config_dir);

    // Initialise logging subsystem
    util::logging::init(cli.debug, config.log_level.as_deref());

    tracing::info!(
        version = util::constants::APP_VERSION,
        debug = cli.debug,
        files = cli.files.len(),
        "LogTriage starting"
    );
    for warning in &config_warnings {
        tracing::warn!("{}", warning);
    }

    let rules_path =
        rules_mgr::resolve_rules_path(cli.rules.as_deref(), &config, &platform_paths);

    let (rules, problems) = match rules_mgr::load_rules(&rules_path) {
        Ok(loaded) => loaded,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load rules");
            eprintln!("Error: {}", LogTriageError::from(e));
            std::process::exit(1);
        }
    };

    if !problems.is_empty() {
        for problem in &problems {
            eprintln!("Error: {problem}");
        }
        // Every analysis compiles all patterns first and would fail the same way.
        std::process::exit(1);
    }
    if cli.check {
        println!("{}: rules OK", rules_path.display());
        return;
    }

    let format = cli.format.unwrap_or_else(|| {
        config
            .output_format
            .as_deref()
            .map_or(ReportFormat::Text, ReportFormat::from_config)
    });

    let analyses = batch::analyze_files(&cli.files, &rules);

    let mut failed = false;
    for analysis in &analyses {
        if let Err(ref e) = analysis.outcome {
            tracing::error!(file = %analysis.path.display(), error = %e, "Analysis failed");
            eprintln!("Error: {}: {e}", analysis.path.display());
            failed = true;
        }
    }

    if let Err(e) = write_reports(&analyses, format, cli.output.as_deref()) {
        tracing::error!(error = %e, "Failed to write report");
        eprintln!("Error: {}", LogTriageError::from(e));
        std::process::exit(1);
    }

    if failed {
        std::process::exit(1);
    }
}

/// Write every successful analysis to `output` (stdout when `None`).
fn write_reports(
    analyses: &[batch::FileAnalysis],
    format: ReportFormat,
    output: Option<&Path>,
) -> Result<(), ExportError> {
    let export_path = output.unwrap_or(Path::new("<stdout>"));
    let mut writer: Box<dyn Write> = match output {
        Some(path) => {
            let file = std::fs::File::create(path).map_err(|e| ExportError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(BufWriter::new(std::io::stdout().lock())),
    };

    let reports: Vec<(&Path, &AnalysisResult)> = analyses
        .iter()
        .filter_map(|a| {
            a.outcome
                .as_ref()
                .ok()
                .map(|report| (a.path.as_path(), &report.result))
        })
        .collect();

    match format {
        ReportFormat::Csv => {
            let rows = export::export_csv(&reports, &mut writer, export_path)?;
            tracing::debug!(rows, "CSV report written");
        }
        ReportFormat::Json => {
            for (source, result) in &reports {
                export::export_json(result, source, &mut writer, export_path)?;
                writeln!(writer).map_err(|e| ExportError::Io {
                    path: export_path.to_path_buf(),
                    source: e,
                })?;
            }
        }
        ReportFormat::Text => {
            for (i, (source, result)) in reports.iter().enumerate() {
                if i > 0 {
                    writeln!(writer).map_err(|e| ExportError::Io {
                        path: export_path.to_path_buf(),
                        source: e,
                    })?;
                }
                export::write_text_report(result, source, &mut writer, export_path)?;
            }
        }
    }

    writer.flush().map_err(|e| ExportError::Io {
        path: export_path.to_path_buf(),
        source: e,
    })
}
