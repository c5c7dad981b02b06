// LogTriage - app/batch.rs
//
// Runs one analysis per log file across the rayon thread pool.
//
// Every file gets its own content source and reads the shared pass-1
// rules; the version-resolved copy each analysis produces stays with that
// file's outcome. One file failing never stops the others.

use crate::core::analyzer;
use crate::core::content::ContentSource;
use crate::core::model::AnalysisResult;
use crate::core::rules::RuleSet;
use crate::util::error::Result;
use rayon::prelude::*;
use std::path::{Path, PathBuf};

/// Successful analysis of one file.
#[derive(Debug, Clone)]
pub struct FileReport {
    pub result: AnalysisResult,

    /// The rules with this file's version substituted in.
    pub resolved_rules: RuleSet,
}

/// Outcome for one input path.
#[derive(Debug)]
pub struct FileAnalysis {
    pub path: PathBuf,
    pub outcome: Result<FileReport>,
}

/// Analyze every path in parallel. Output order matches input order.
pub fn analyze_files(paths: &[PathBuf], rules: &RuleSet) -> Vec<FileAnalysis> {
    tracing::info!(files = paths.len(), "Batch analysis starting");

    let analyses: Vec<FileAnalysis> = paths
        .par_iter()
        .map(|path| FileAnalysis {
            path: path.clone(),
            outcome: analyze_file(path, rules),
        })
        .collect();

    let failed = analyses.iter().filter(|a| a.outcome.is_err()).count();
    tracing::info!(
        files = analyses.len(),
        failed = failed,
        "Batch analysis complete"
    );
    analyses
}

/// Open and analyze a single file.
pub fn analyze_file(path: &Path, rules: &RuleSet) -> Result<FileReport> {
    let content = ContentSource::open(path)?;
    let (result, resolved_rules) = analyzer::analyze(&content, rules)?;
    Ok(FileReport {
        result,
        resolved_rules,
    })
}
