//! Build pipeline for containers
//!
//! Turns a validated config into a staged root filesystem.

pub mod pipeline;
pub mod scripts;
pub mod stage;
pub mod steps;

pub use pipeline::{BuildPipeline, BuildReport, CreateReport};
pub use stage::{BuildStage, BuildStep};
pub use steps::{CopiedFile, CopyFailure, CopyFailureKind, CopyOutcome};
