// LogTriage - app/rules_mgr.rs
//
// Locates and loads the rules document for a run.
// Lookup order: --rules on the CLI, then `[rules] path` in config.toml,
// then rules.json in the platform config directory.

use crate::core::rules::RuleSet;
use crate::platform::config::{AppConfig, PlatformPaths};
use crate::util::error::RulesError;
use std::path::{Path, PathBuf};

/// Pick the rules document path for this run.
pub fn resolve_rules_path(
    cli_path: Option<&Path>,
    config: &AppConfig,
    platform: &PlatformPaths,
) -> PathBuf {
    if let Some(path) = cli_path {
        tracing::debug!(path = %path.display(), "Rules path from command line");
        return path.to_path_buf();
    }
    if let Some(ref path) = config.rules_path {
        tracing::debug!(path = %path.display(), "Rules path from config.toml");
        return path.clone();
    }
    tracing::debug!(
        path = %platform.default_rules_path.display(),
        "Rules path from platform default"
    );
    platform.default_rules_path.clone()
}

/// Load the rules document and run the pattern pre-flight check.
///
/// The returned problems do not fail the load, but `analyze` compiles every
/// pattern before scanning, so a rule set with an invalid pattern fails
/// every analysis it is used for.
pub fn load_rules(path: &Path) -> Result<(RuleSet, Vec<RulesError>), RulesError> {
    let rules = RuleSet::load(path)?;
    let problems = rules.validate();

    for problem in &problems {
        tracing::warn!(path = %path.display(), error = %problem, "Rules validation warning");
    }

    Ok((rules, problems))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::analyzer::analyze;
    use crate::core::content::ContentSource;
    use crate::util::error::AnalysisError;

    fn platform(dir: &Path) -> PlatformPaths {
        PlatformPaths {
            config_dir: dir.to_path_buf(),
            default_rules_path: dir.join("rules.json"),
        }
    }

    #[test]
    fn test_cli_path_wins() {
        let config = AppConfig {
            rules_path: Some(PathBuf::from("/cfg/rules.json")),
            ..Default::default()
        };
        let chosen = resolve_rules_path(
            Some(Path::new("/cli/rules.json")),
            &config,
            &platform(Path::new("/platform")),
        );
        assert_eq!(chosen, PathBuf::from("/cli/rules.json"));
    }

    #[test]
    fn test_config_path_before_default() {
        let config = AppConfig {
            rules_path: Some(PathBuf::from("/cfg/rules.json")),
            ..Default::default()
        };
        let chosen = resolve_rules_path(None, &config, &platform(Path::new("/platform")));
        assert_eq!(chosen, PathBuf::from("/cfg/rules.json"));
    }

    #[test]
    fn test_platform_default_last() {
        let chosen = resolve_rules_path(
            None,
            &AppConfig::default(),
            &platform(Path::new("/platform")),
        );
        assert_eq!(chosen, PathBuf::from("/platform/rules.json"));
    }

    #[test]
    fn test_load_rules_reports_bad_patterns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.json");
        std::fs::write(
            &path,
            r#"{ "CrashIdentifier": "FATAL", "ExceptionIdentifier": "(oops" }"#,
        )
        .unwrap();

        let (rules, problems) = load_rules(&path).unwrap();
        assert_eq!(rules.crash_identifier.as_str(), "FATAL");
        assert_eq!(problems.len(), 1);
    }

    #[test]
    fn test_validation_problem_fails_every_analysis() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.json");
        std::fs::write(&path, r#"{ "Count": [{ "Name": "bad", "Identifier": "[" }] }"#).unwrap();

        let (rules, problems) = load_rules(&path).unwrap();
        assert_eq!(problems.len(), 1);

        for text in ["", "no brackets here", "[ ] ["] {
            let content = ContentSource::from_text("t.log", text);
            assert!(matches!(
                analyze(&content, &rules),
                Err(AnalysisError::InvalidPattern { .. })
            ));
        }
    }

    #[test]
    fn test_load_rules_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_rules(&dir.path().join("absent.json"));
        assert!(matches!(result, Err(RulesError::NotFound { .. })));
    }
}
