//! Continy - declare, build, and run lightweight directory-tree containers
//!
//! A container is a named directory holding a persisted config and a
//! staged root filesystem. Configs come in two forms, a line-oriented
//! directive file and a JSON document, and both decode to one
//! [`ConfigModel`]. The [`BuildPipeline`] turns a config into a staged root;
//! the [`RunLauncher`] runs its entrypoint as an ordinary subprocess.
//!
//! There is no isolation of any kind: a "container" here is a directory
//! tree and a couple of generated shell scripts.
//!
//! # Example
//!
//! ```no_run
//! use continy::{parse_directives, BuildPipeline, ContainerStore};
//!
//! let config = parse_directives("NAME:demo\nPACKAGE:git\n").unwrap();
//! let store = ContainerStore::new("containers");
//! let report = BuildPipeline::new(&store).build(&config).unwrap();
//! println!("{} failures", report.failures.len());
//! ```

pub mod build;
pub mod cli;
pub mod config;
pub mod container;
pub mod error;
pub mod launcher;
pub mod output;
pub mod settings;

pub use build::{BuildPipeline, BuildReport, BuildStage, BuildStep, CreateReport};
pub use config::{
    load_config_file, parse_directives, parse_json, validate_config, ConfigModel, ValidationOptions,
};
pub use container::{ContainerRecord, ContainerStore};
pub use error::{ContinyError, Result};
pub use launcher::{LaunchPlan, RunLauncher};
pub use output::{format_output, OutputFormat, Report};
pub use settings::Settings;
