//! Build pipeline
//!
//! Drives a container from a validated config to a staged root:
//!
//! ```text
//! Declared -> Scaffolded -> Bootstrapped -> FilesCopied -> EntrypointWritten -> Built
//! ```
//!
//! `create` stops after scaffolding; `build` runs every step. The config is
//! persisted twice: once when scaffolding finishes and once at the end.
//! Scaffold, bootstrap, entrypoint and finalize failures abort the build
//! with the step attached; the slot stays where the last finished step left
//! it and `build` can simply be run again.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::scripts::{render_bootstrap, render_entrypoint};
use super::stage::{BuildStage, BuildStep};
use super::steps::{copy_files, scaffold, write_script, CopiedFile, CopyFailure};
use crate::config::{validate_config, validate_name, ConfigModel, ValidationIssue, ValidationOptions};
use crate::container::{ContainerRecord, ContainerStore};
use crate::error::Result;

/// Result of a `create` call
#[derive(Debug, Clone, Serialize)]
pub struct CreateReport {
    pub name: String,
    pub stage: BuildStage,
    pub warnings: Vec<ValidationIssue>,
}

/// Result of a `build` call
#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
    pub name: String,
    pub stage: BuildStage,
    pub warnings: Vec<ValidationIssue>,
    pub copied: Vec<CopiedFile>,
    pub failures: Vec<CopyFailure>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl BuildReport {
    /// Built without copy failures or validation warnings
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && self.warnings.is_empty()
    }
}

/// Runs the build steps for containers in one store
#[derive(Debug, Clone)]
pub struct BuildPipeline<'a> {
    store: &'a ContainerStore,
    options: ValidationOptions,
}

impl<'a> BuildPipeline<'a> {
    pub fn new(store: &'a ContainerStore) -> Self {
        Self {
            store,
            options: ValidationOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ValidationOptions) -> Self {
        self.options = options;
        self
    }

    pub fn store(&self) -> &ContainerStore {
        self.store
    }

    /// Validate the config; nothing on disk changes if this fails
    fn prepare(&self, config: &ConfigModel) -> Result<(ContainerRecord, Vec<ValidationIssue>)> {
        let warnings = validate_config(config, &self.options)?;
        Ok((self.store.locate(&config.name), warnings))
    }

    /// Declare a container: validate, scaffold, persist the initial config
    pub fn create(&self, config: &ConfigModel) -> Result<CreateReport> {
        let (record, warnings) = self.prepare(config)?;
        tracing::info!(container = %config.name, "creating container");

        self.scaffold_step(&record, config)?;

        Ok(CreateReport {
            name: config.name.clone(),
            stage: BuildStage::Scaffolded,
            warnings,
        })
    }

    /// Run every step for `config`.
    ///
    /// Scaffolding runs again first, so a container can be built straight
    /// from a config file without a separate `create`.
    pub fn build(&self, config: &ConfigModel) -> Result<BuildReport> {
        let started_at = Utc::now();
        let (record, warnings) = self.prepare(config)?;
        let name = config.name.as_str();
        tracing::info!(container = name, "building container");

        self.scaffold_step(&record, config)?;

        tracing::info!(container = name, step = %BuildStep::Bootstrap, "writing bootstrap script");
        write_script(&record.bootstrap_path(), &render_bootstrap(config))
            .map_err(|e| e.in_step(name, BuildStep::Bootstrap))?;

        tracing::info!(container = name, step = %BuildStep::CopyFiles, files = config.files.len(), "copying files");
        let outcome = copy_files(&record, &config.files);

        tracing::info!(container = name, step = %BuildStep::Entrypoint, "writing entrypoint script");
        write_script(&record.entrypoint_path(), &render_entrypoint(config))
            .map_err(|e| e.in_step(name, BuildStep::Entrypoint))?;

        tracing::info!(container = name, step = %BuildStep::Finalize, "persisting config");
        self.store
            .save_config(name, config)
            .map_err(|e| e.in_step(name, BuildStep::Finalize))?;

        if !outcome.failures.is_empty() {
            tracing::debug!(
                container = name,
                failures = outcome.failures.len(),
                "built with file copy failures"
            );
        }

        Ok(BuildReport {
            name: name.to_string(),
            stage: BuildStep::Finalize.reaches(),
            warnings,
            copied: outcome.copied,
            failures: outcome.failures,
            started_at,
            finished_at: Utc::now(),
        })
    }

    /// Build a container from its persisted config
    pub fn rebuild(&self, name: &str) -> Result<BuildReport> {
        validate_name(name)?;
        let config = self.store.load_config(name)?;
        self.build(&config)
    }

    fn scaffold_step(&self, record: &ContainerRecord, config: &ConfigModel) -> Result<()> {
        tracing::info!(container = %record.name, step = %BuildStep::Scaffold, "scaffolding");
        scaffold(record)
            .and_then(|_| self.store.save_config(&record.name, config))
            .map_err(|e| e.in_step(&record.name, BuildStep::Scaffold))
    }
}
