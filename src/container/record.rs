//! On-disk slot of one container
//!
//! ```text
//! <store>/<name>/
//! ├── container.json      persisted ConfigModel
//! └── rootfs/
//!     ├── bootstrap.sh
//!     ├── entrypoint.sh
//!     ├── bin/ usr/bin/ usr/local/bin/
//!     └── workspace/ tmp/ var/ etc/
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::build::BuildStage;

pub const CONFIG_FILE: &str = "container.json";
pub const ROOTFS_DIR: &str = "rootfs";
pub const BOOTSTRAP_SCRIPT: &str = "bootstrap.sh";
pub const ENTRYPOINT_SCRIPT: &str = "entrypoint.sh";

/// Directories every staged root starts with
pub const SKELETON_DIRS: [&str; 7] = [
    "bin",
    "usr/bin",
    "usr/local/bin",
    "workspace",
    "tmp",
    "var",
    "etc",
];

/// Paths of one container's slot. Computing them touches nothing on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContainerRecord {
    pub name: String,
    pub base_dir: PathBuf,
    pub rootfs_dir: PathBuf,
    pub config_path: PathBuf,
}

impl ContainerRecord {
    pub fn new(store_root: &Path, name: &str) -> Self {
        let base_dir = store_root.join(name);
        Self {
            name: name.to_string(),
            rootfs_dir: base_dir.join(ROOTFS_DIR),
            config_path: base_dir.join(CONFIG_FILE),
            base_dir,
        }
    }

    pub fn bootstrap_path(&self) -> PathBuf {
        self.rootfs_dir.join(BOOTSTRAP_SCRIPT)
    }

    pub fn entrypoint_path(&self) -> PathBuf {
        self.rootfs_dir.join(ENTRYPOINT_SCRIPT)
    }

    pub fn has_config(&self) -> bool {
        self.config_path.is_file()
    }

    pub fn is_scaffolded(&self) -> bool {
        self.has_config() && SKELETON_DIRS.iter().all(|d| self.rootfs_dir.join(d).is_dir())
    }

    /// Whether the entrypoint script has been materialized
    pub fn is_built(&self) -> bool {
        self.rootfs_dir.is_dir() && self.entrypoint_path().is_file()
    }

    /// Best stage the disk contents prove.
    ///
    /// Copied files leave no marker and the entrypoint is written right
    /// before the final config, so a slot with an entrypoint reads as built.
    pub fn observed_stage(&self) -> BuildStage {
        if !self.has_config() {
            BuildStage::Declared
        } else if self.is_built() {
            BuildStage::Built
        } else if self.bootstrap_path().is_file() {
            BuildStage::Bootstrapped
        } else if self.is_scaffolded() {
            BuildStage::Scaffolded
        } else {
            BuildStage::Declared
        }
    }

    /// Total size in bytes of everything under the slot
    pub fn disk_usage(&self) -> io::Result<u64> {
        if !self.base_dir.exists() {
            return Ok(0);
        }
        dir_size(&self.base_dir)
    }
}

fn dir_size(path: &Path) -> io::Result<u64> {
    let mut total = 0;
    for entry in fs::read_dir(path)? {
        let entry = entry?;
        let metadata = entry.path().symlink_metadata()?;
        if metadata.is_dir() {
            total += dir_size(&entry.path())?;
        } else {
            total += metadata.len();
        }
    }
    Ok(total)
}
