//! Run a built container
//!
//! Running is a plain subprocess: `/bin/bash <rootfs>/entrypoint.sh <cmd>`
//! with the container's environment layered over the caller's. There is
//! no namespace, chroot or resource limit involved.

use std::path::PathBuf;
use std::process::{Command, ExitStatus};
use std::sync::Once;

use indexmap::IndexMap;
use serde::Serialize;

use crate::config::validate_name;
use crate::container::ContainerStore;
use crate::error::{ContinyError, Result};

/// Shell used to run the entrypoint script
pub const SHELL: &str = "/bin/bash";

/// Everything needed to start a container process
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LaunchPlan {
    pub name: String,
    pub program: PathBuf,
    pub args: Vec<String>,
    pub cwd: PathBuf,
    /// Added on top of the inherited environment
    pub env: IndexMap<String, String>,
}

impl LaunchPlan {
    /// The command tokens handed to the entrypoint
    pub fn command(&self) -> &[String] {
        self.args.get(1..).unwrap_or_default()
    }
}

/// Starts built containers from a store
#[derive(Debug, Clone)]
pub struct RunLauncher<'a> {
    store: &'a ContainerStore,
}

impl<'a> RunLauncher<'a> {
    pub fn new(store: &'a ContainerStore) -> Self {
        Self { store }
    }

    /// Work out how `name` would be started without starting it.
    ///
    /// `command` replaces the configured entrypoint when given and not empty.
    pub fn prepare(&self, name: &str, command: Option<Vec<String>>) -> Result<LaunchPlan> {
        validate_name(name)?;
        let config = self.store.load_config(name)?;
        let record = self.store.locate(name);

        if !record.is_built() {
            return Err(ContinyError::NotBuilt(name.to_string()));
        }

        let command = match command {
            Some(tokens) if !tokens.is_empty() => tokens,
            _ => config.entrypoint.clone(),
        };

        let workdir = record
            .rootfs_dir
            .join(config.working_dir.trim_start_matches('/'));
        let cwd = if workdir.is_dir() {
            workdir
        } else {
            record.rootfs_dir.clone()
        };

        let mut args = vec![record.entrypoint_path().to_string_lossy().to_string()];
        args.extend(command);

        Ok(LaunchPlan {
            name: name.to_string(),
            program: PathBuf::from(SHELL),
            args,
            cwd,
            env: config.environment,
        })
    }

    /// Prepare and run a container, waiting for it to exit
    pub fn launch(&self, name: &str, command: Option<Vec<String>>) -> Result<ExitStatus> {
        let plan = self.prepare(name, command)?;
        run(&plan)
    }
}

/// Spawn the planned process and wait for it.
///
/// Ctrl+C goes to the container process; this process keeps waiting so it
/// can report how the container ended.
pub fn run(plan: &LaunchPlan) -> Result<ExitStatus> {
    ignore_interrupts();

    tracing::info!(
        container = %plan.name,
        command = %plan.command().join(" "),
        cwd = %plan.cwd.display(),
        "starting container"
    );

    let status = Command::new(&plan.program)
        .args(&plan.args)
        .current_dir(&plan.cwd)
        .envs(&plan.env)
        .status()?;

    tracing::info!(container = %plan.name, status = %status, "container exited");
    Ok(status)
}

fn ignore_interrupts() {
    static HANDLER: Once = Once::new();
    HANDLER.call_once(|| {
        if let Err(e) = ctrlc::set_handler(|| {}) {
            tracing::warn!("Failed to set Ctrl+C handler: {}", e);
        }
    });
}
