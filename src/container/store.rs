//! Container store
//!
//! Maps container names to slots under one root directory. Nothing is
//! cached: every call reads the disk again.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tempfile::NamedTempFile;

use super::record::ContainerRecord;
use crate::build::BuildStage;
use crate::config::{parse_json, to_json, validate_name, ConfigModel};
use crate::error::{ContinyError, Result};

/// Default store root, relative to the working directory
pub const DEFAULT_STORE_DIR: &str = "containers";

/// Registry of containers under a root directory
#[derive(Debug, Clone)]
pub struct ContainerStore {
    root: PathBuf,
}

/// Summary of one stored container
#[derive(Debug, Clone, Serialize)]
pub struct ContainerInfo {
    pub name: String,
    pub stage: BuildStage,
    pub location: PathBuf,
    pub disk_usage: u64,
    pub config: ConfigModel,
}

impl ContainerStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Paths for `name`, whether or not the container exists
    pub fn locate(&self, name: &str) -> ContainerRecord {
        ContainerRecord::new(&self.root, name)
    }

    /// Check if a container has a persisted config
    pub fn exists(&self, name: &str) -> bool {
        self.locate(name).has_config()
    }

    /// Names of all containers, sorted.
    ///
    /// Directories without a persisted config are skipped.
    pub fn list(&self) -> Result<Vec<String>> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            if self.exists(&name) {
                names.push(name);
            }
        }

        names.sort();
        Ok(names)
    }

    /// Load the persisted config of a container
    pub fn load_config(&self, name: &str) -> Result<ConfigModel> {
        let record = self.locate(name);
        let content = match fs::read_to_string(&record.config_path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(ContinyError::NotFound(name.to_string()))
            }
            Err(e) => return Err(e.into()),
        };

        parse_json(&content)
    }

    /// Persist a config, replacing the previous one atomically.
    ///
    /// The JSON goes to a temp file in the container's directory, which is
    /// then renamed over `container.json`.
    pub fn save_config(&self, name: &str, config: &ConfigModel) -> Result<()> {
        if config.name != name {
            return Err(ContinyError::InvalidConfig(format!(
                "config for '{}' cannot be saved as '{}'",
                config.name, name
            )));
        }

        let record = self.locate(name);
        fs::create_dir_all(&record.base_dir)?;

        let json = to_json(config)?;
        let mut temp = NamedTempFile::new_in(&record.base_dir)?;
        temp.write_all(json.as_bytes())?;
        temp.write_all(b"\n")?;
        temp.as_file().sync_all()?;
        temp.persist(&record.config_path).map_err(|e| e.error)?;

        tracing::debug!(container = name, path = %record.config_path.display(), "saved config");
        Ok(())
    }

    /// Describe a stored container
    pub fn inspect(&self, name: &str) -> Result<ContainerInfo> {
        validate_name(name)?;
        let config = self.load_config(name)?;
        let record = self.locate(name);

        Ok(ContainerInfo {
            name: name.to_string(),
            stage: record.observed_stage(),
            disk_usage: record.disk_usage()?,
            location: record.base_dir,
            config,
        })
    }
}

impl Default for ContainerStore {
    fn default() -> Self {
        Self::new(DEFAULT_STORE_DIR)
    }
}
