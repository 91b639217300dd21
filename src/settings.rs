//! Runtime settings
//!
//! Collected from command-line flags and their environment variables, then
//! handed to the store, the pipeline, and the formatter.

use std::path::PathBuf;

use crate::build::BuildPipeline;
use crate::cli::Args;
use crate::config::{InterpreterVersion, ValidationOptions};
use crate::container::{ContainerStore, DEFAULT_STORE_DIR};
use crate::output::OutputFormat;

#[derive(Debug, Clone)]
pub struct Settings {
    /// Directory holding all containers
    pub store_root: PathBuf,
    /// Oldest accepted interpreter version
    pub min_interpreter: InterpreterVersion,
    pub output_format: OutputFormat,
    pub verbose: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            store_root: PathBuf::from(DEFAULT_STORE_DIR),
            min_interpreter: InterpreterVersion::default(),
            output_format: OutputFormat::Human,
            verbose: false,
        }
    }
}

impl Settings {
    pub fn from_args(args: &Args) -> Self {
        Self {
            store_root: args.store.clone(),
            min_interpreter: args.min_python,
            output_format: if args.json { OutputFormat::Json } else { OutputFormat::Human },
            verbose: args.verbose,
        }
    }

    pub fn store(&self) -> ContainerStore {
        ContainerStore::new(&self.store_root)
    }

    pub fn validation_options(&self) -> ValidationOptions {
        ValidationOptions {
            min_interpreter: self.min_interpreter,
            ..Default::default()
        }
    }

    /// Pipeline over `store` using these settings' validation rules
    pub fn pipeline<'a>(&self, store: &'a ContainerStore) -> BuildPipeline<'a> {
        BuildPipeline::new(store).with_options(self.validation_options())
    }

    /// Log filter used when `RUST_LOG` is not set
    pub fn default_log_filter(&self) -> &'static str {
        if self.verbose {
            "continy=debug"
        } else {
            "warn"
        }
    }
}
