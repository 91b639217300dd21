//! Config validation
//!
//! Checks a decoded config before anything touches the filesystem.
//! Errors make the config unusable; warnings are reported and the build
//! goes ahead.

use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::config::model::{ConfigModel, InterpreterVersion, MAX_NAME_LEN};
use crate::error::{ContinyError, Result};

/// A single validation finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub message: String,
    pub severity: ValidationSeverity,
}

/// Severity level for validation issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationSeverity {
    Error,
    Warning,
}

impl ValidationIssue {
    fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: ValidationSeverity::Error,
        }
    }

    fn warning(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: ValidationSeverity::Warning,
        }
    }
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix = match self.severity {
            ValidationSeverity::Error => "ERROR",
            ValidationSeverity::Warning => "WARNING",
        };
        write!(f, "{}: {}", prefix, self.message)
    }
}

/// Validation options
#[derive(Debug, Clone)]
pub struct ValidationOptions {
    /// Oldest interpreter (major, minor) accepted
    pub min_interpreter: InterpreterVersion,
    /// Whether to look for file sources on the host
    pub check_sources: bool,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            min_interpreter: InterpreterVersion::default(),
            check_sources: true,
        }
    }
}

fn is_valid_name(name: &str) -> bool {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^[A-Za-z0-9_-]+$").ok())
        .as_ref()
        .is_some_and(|r| r.is_match(name))
}

pub(crate) fn is_shell_name(key: &str) -> bool {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").ok())
        .as_ref()
        .is_some_and(|r| r.is_match(key))
}

/// Check a container name on its own.
///
/// Used before a store slot is located, so a bad name never reaches the
/// filesystem.
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(ContinyError::InvalidConfig("name required".to_string()));
    }
    if name.len() > MAX_NAME_LEN || !is_valid_name(name) {
        return Err(ContinyError::InvalidConfig(format!(
            "invalid container name '{}': use up to {} of [A-Za-z0-9_-]",
            name, MAX_NAME_LEN
        )));
    }
    Ok(())
}

/// Collect every issue with a config
pub fn check_config(config: &ConfigModel, options: &ValidationOptions) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    if let Err(ContinyError::InvalidConfig(msg)) = validate_name(&config.name) {
        issues.push(ValidationIssue::error(msg));
    }

    if config.base_distro.trim().is_empty() {
        issues.push(ValidationIssue::error("distro required"));
    }

    match InterpreterVersion::parse(&config.interpreter_version) {
        Some(version) if version >= options.min_interpreter => {}
        _ => issues.push(ValidationIssue::error("unsupported interpreter version")),
    }

    if !config.working_dir.starts_with('/') {
        issues.push(ValidationIssue::error("working directory must be absolute"));
    }

    if config.entrypoint.is_empty() {
        issues.push(ValidationIssue::error("entrypoint required"));
    }

    if options.check_sources {
        for source in config.files.keys() {
            if !Path::new(source).exists() {
                issues.push(ValidationIssue::warning(format!(
                    "Source file not found: {}",
                    source
                )));
            }
        }
    }

    for key in config.environment.keys() {
        if !is_shell_name(key) {
            issues.push(ValidationIssue::warning(format!(
                "Environment variable '{}' is not a valid shell name and will be skipped",
                key
            )));
        }
    }

    issues
}

/// Validate a config, failing on the first error.
///
/// Returns the warnings when the config is usable.
pub fn validate_config(
    config: &ConfigModel,
    options: &ValidationOptions,
) -> Result<Vec<ValidationIssue>> {
    let issues = check_config(config, options);

    if let Some(first) = issues
        .iter()
        .find(|i| i.severity == ValidationSeverity::Error)
    {
        return Err(ContinyError::InvalidConfig(first.message.clone()));
    }

    for issue in &issues {
        tracing::debug!(container = %config.name, "{}", issue.message);
    }

    Ok(issues)
}

/// Check if any issue is an error (not just a warning)
pub fn has_errors(issues: &[ValidationIssue]) -> bool {
    issues
        .iter()
        .any(|i| i.severity == ValidationSeverity::Error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn offline() -> ValidationOptions {
        ValidationOptions {
            check_sources: false,
            ..Default::default()
        }
    }

    fn with_version(version: &str) -> ConfigModel {
        let mut config = ConfigModel::new("demo");
        config.set_interpreter_version(version);
        config
    }

    #[test]
    fn test_default_config_is_valid() {
        let warnings = validate_config(&ConfigModel::new("demo"), &offline()).unwrap();
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_name_required() {
        let err = validate_config(&ConfigModel::default(), &offline()).unwrap_err();
        assert!(matches!(err, ContinyError::InvalidConfig(ref m) if m == "name required"));
    }

    #[test]
    fn test_invalid_names() {
        assert!(validate_name("has space").is_err());
        assert!(validate_name("slash/name").is_err());
        assert!(validate_name("..").is_err());
        assert!(validate_name(&"a".repeat(65)).is_err());
        assert!(validate_name(&"a".repeat(64)).is_ok());
        assert!(validate_name("web_app-2").is_ok());
    }

    #[test]
    fn test_distro_required() {
        let mut config = ConfigModel::new("demo");
        config.set_base_distro("  ");
        let err = validate_config(&config, &offline()).unwrap_err();
        assert!(matches!(err, ContinyError::InvalidConfig(ref m) if m == "distro required"));
    }

    #[test]
    fn test_interpreter_versions() {
        for version in ["3.7", "abc", "3", "2.7", "3.x"] {
            let err = validate_config(&with_version(version), &offline()).unwrap_err();
            assert!(
                matches!(err, ContinyError::InvalidConfig(ref m) if m == "unsupported interpreter version"),
                "{} should be rejected",
                version
            );
        }
        for version in ["3.8", "3.10", "3.12.1", "4.0"] {
            assert!(validate_config(&with_version(version), &offline()).is_ok(), "{}", version);
        }
    }

    #[test]
    fn test_configured_minimum() {
        let options = ValidationOptions {
            min_interpreter: InterpreterVersion::new(3, 10),
            check_sources: false,
        };
        assert!(validate_config(&with_version("3.9"), &options).is_err());
        assert!(validate_config(&with_version("3.10"), &options).is_ok());
    }

    #[test]
    fn test_relative_working_dir_rejected() {
        let mut config = ConfigModel::new("demo");
        config.set_working_dir("workspace");
        assert!(validate_config(&config, &offline()).is_err());
    }

    #[test]
    fn test_empty_entrypoint_rejected() {
        let mut config = ConfigModel::new("demo");
        config.set_entrypoint(Vec::new());
        let err = validate_config(&config, &offline()).unwrap_err();
        assert!(matches!(err, ContinyError::InvalidConfig(ref m) if m == "entrypoint required"));
    }

    #[test]
    fn test_missing_source_is_warning() {
        let temp_dir = TempDir::new().unwrap();
        let present = temp_dir.path().join("present.txt");
        std::fs::write(&present, "hi").unwrap();

        let mut config = ConfigModel::new("demo");
        config.add_file(present.to_string_lossy(), "/workspace/present.txt");
        config.add_file("definitely-missing.txt", "/workspace/missing.txt");

        let warnings = validate_config(&config, &ValidationOptions::default()).unwrap();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].severity, ValidationSeverity::Warning);
        assert!(warnings[0].message.contains("definitely-missing.txt"));
    }

    #[test]
    fn test_bad_env_key_is_warning() {
        let mut config = ConfigModel::new("demo");
        config.set_env("MY-VAR", "1").set_env("GOOD_VAR", "2");
        let issues = check_config(&config, &offline());
        assert_eq!(issues.len(), 1);
        assert!(!has_errors(&issues));
    }

    #[test]
    fn test_check_collects_all_errors() {
        let mut config = ConfigModel::default();
        config.set_base_distro("").set_interpreter_version("2.7");
        let issues = check_config(&config, &offline());
        assert_eq!(issues.len(), 3);
        assert!(has_errors(&issues));
    }
}
