//! Container storage
//!
//! Each container lives in its own directory under the store root:
//! - its persisted config (`container.json`)
//! - its staged root filesystem (`rootfs/`)
//!
//! The directory tree is the only state. Nothing here isolates a running
//! container; the staged root is an ordinary directory.

mod record;
mod store;

pub use record::{
    ContainerRecord, BOOTSTRAP_SCRIPT, CONFIG_FILE, ENTRYPOINT_SCRIPT, ROOTFS_DIR, SKELETON_DIRS,
};
pub use store::{ContainerInfo, ContainerStore, DEFAULT_STORE_DIR};
