//! Config file codecs
//!
//! Two textual forms converge on [`ConfigModel`]:
//!
//! - the directive format, one `KEYWORD:value` per line (parsed with pest)
//! - the structured format, a JSON object using the model's field names
//!
//! Decoding is lenient: malformed directives and unknown keywords are
//! dropped, unknown JSON keys are ignored. Only I/O errors and JSON that is
//! not an object of the right shape fail.

use std::fs;
use std::path::Path;

use pest::Parser;
use pest_derive::Parser;

use crate::config::model::ConfigModel;
use crate::error::{ContinyError, Result};

#[derive(Parser)]
#[grammar = "../grammar/config.pest"]
struct DirectiveParser;

/// Which textual form a config is written in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Directives,
    Json,
}

impl ConfigFormat {
    /// `.json` files are structured, everything else is the directive format
    pub fn from_path(path: &Path) -> Self {
        if path.extension().is_some_and(|e| e == "json") {
            ConfigFormat::Json
        } else {
            ConfigFormat::Directives
        }
    }
}

/// Read and decode a config file, choosing the format from its extension
pub fn load_config_file(path: &Path) -> Result<ConfigModel> {
    if !path.exists() {
        return Err(ContinyError::NotFound(format!(
            "configuration file {}",
            path.display()
        )));
    }

    let content = fs::read_to_string(path)?;
    tracing::debug!(path = %path.display(), "loading config file");

    decode(&content, ConfigFormat::from_path(path))
}

pub fn decode(content: &str, format: ConfigFormat) -> Result<ConfigModel> {
    match format {
        ConfigFormat::Directives => parse_directives(content),
        ConfigFormat::Json => parse_json(content),
    }
}

/// Parse the directive format
pub fn parse_directives(content: &str) -> Result<ConfigModel> {
    let pairs = DirectiveParser::parse(Rule::file, content)
        .map_err(|e| ContinyError::ParseError(e.to_string()))?;

    let file = pairs
        .into_iter()
        .next()
        .ok_or_else(|| ContinyError::ParseError("Empty input".to_string()))?;

    let mut config = ConfigModel::default();

    for line in file.into_inner() {
        if line.as_rule() != Rule::directive {
            continue;
        }

        let mut inner = line.into_inner();
        let (Some(keyword), Some(value)) = (inner.next(), inner.next()) else {
            continue;
        };

        apply_directive(&mut config, keyword.as_str(), value.as_str());
    }

    Ok(config)
}

fn apply_directive(config: &mut ConfigModel, keyword: &str, value: &str) {
    match keyword {
        "NAME" => config.name = value.trim().to_string(),
        "BASE" => config.base_distro = value.trim().to_string(),
        "PYTHON" => config.interpreter_version = value.trim().to_string(),
        "PACKAGE" => config.packages.push(value.trim().to_string()),
        "WORKDIR" => config.working_dir = value.trim().to_string(),
        "FILE" => {
            if let Some((source, dest)) = split_pair(value) {
                config.files.insert(source, dest);
            }
        }
        "ENV" => {
            if let Some((key, val)) = split_pair(value) {
                config.environment.insert(key, val);
            }
        }
        other => {
            tracing::trace!(keyword = other, "ignoring unknown directive");
        }
    }
}

/// Split `first:rest` on the first colon only, trimming both halves
fn split_pair(value: &str) -> Option<(String, String)> {
    value
        .split_once(':')
        .map(|(a, b)| (a.trim().to_string(), b.trim().to_string()))
}

/// Parse the structured JSON format
pub fn parse_json(content: &str) -> Result<ConfigModel> {
    serde_json::from_str(content).map_err(|e| ContinyError::InvalidConfig(format!("malformed JSON: {}", e)))
}

/// Encode as pretty-printed JSON, the persisted record format
pub fn to_json(config: &ConfigModel) -> Result<String> {
    serde_json::to_string_pretty(config)
        .map_err(|e| ContinyError::InvalidConfig(format!("cannot encode config: {}", e)))
}

/// Encode in the directive format.
///
/// The directive format has no entrypoint keyword, and FILE/ENV keys
/// containing `:` cannot be written back, so those are left out.
pub fn to_directives(config: &ConfigModel) -> String {
    let mut out = String::new();

    out.push_str(&format!("NAME:{}\n", config.name));
    out.push_str(&format!("BASE:{}\n", config.base_distro));
    out.push_str(&format!("PYTHON:{}\n", config.interpreter_version));
    out.push_str(&format!("WORKDIR:{}\n", config.working_dir));

    for package in &config.packages {
        out.push_str(&format!("PACKAGE:{}\n", package));
    }
    for (source, dest) in &config.files {
        if !source.contains(':') {
            out.push_str(&format!("FILE:{}:{}\n", source, dest));
        }
    }
    for (key, value) in &config.environment {
        if !key.contains(':') {
            out.push_str(&format!("ENV:{}:{}\n", key, value));
        }
    }

    out
}
