//! CLI argument parsing

use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::InterpreterVersion;
use crate::container::DEFAULT_STORE_DIR;

#[derive(Parser)]
#[command(name = "continy")]
#[command(author, version, about = "Declare, build, and run lightweight directory-tree containers", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: SubCommand,

    /// Directory holding all containers
    #[arg(long, global = true, env = "CONTINY_STORE", default_value = DEFAULT_STORE_DIR)]
    pub store: PathBuf,

    /// Oldest accepted interpreter version (MAJOR.MINOR)
    #[arg(long, global = true, env = "CONTINY_MIN_PYTHON", default_value = "3.8")]
    pub min_python: InterpreterVersion,

    /// Output format as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Where a command takes its config from
#[derive(ClapArgs, Debug, Clone)]
#[group(required = true, multiple = false)]
pub struct ConfigSource {
    /// Container configuration file (.json or directive format)
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Container name
    #[arg(short, long)]
    pub name: Option<String>,
}

#[derive(Subcommand)]
pub enum SubCommand {
    /// Create a new container
    Create {
        #[command(flatten)]
        source: ConfigSource,
    },

    /// Build a container
    Build {
        #[command(flatten)]
        source: ConfigSource,
    },

    /// Run a built container
    Run {
        /// Container name
        #[arg(short, long)]
        name: String,

        /// Command to run instead of the configured entrypoint
        #[arg(short, long)]
        command: Option<String>,
    },

    /// List all containers
    List,

    /// Show a container's configuration and build state
    Info {
        /// Container name
        #[arg(short, long)]
        name: String,
    },
}
