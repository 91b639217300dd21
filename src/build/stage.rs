//! Build stages and the steps between them

use serde::Serialize;

/// How far a container has been built
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BuildStage {
    Declared,
    Scaffolded,
    Bootstrapped,
    FilesCopied,
    EntrypointWritten,
    Built,
}

impl BuildStage {
    /// The entrypoint exists, so the container can be run
    pub fn is_runnable(self) -> bool {
        self >= BuildStage::EntrypointWritten
    }
}

impl std::fmt::Display for BuildStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            BuildStage::Declared => "declared",
            BuildStage::Scaffolded => "scaffolded",
            BuildStage::Bootstrapped => "bootstrapped",
            BuildStage::FilesCopied => "files-copied",
            BuildStage::EntrypointWritten => "entrypoint-written",
            BuildStage::Built => "built",
        };
        write!(f, "{}", s)
    }
}

/// One transition of the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BuildStep {
    Scaffold,
    Bootstrap,
    CopyFiles,
    Entrypoint,
    Finalize,
}

impl BuildStep {
    /// Stage reached once this step completes
    pub fn reaches(self) -> BuildStage {
        match self {
            BuildStep::Scaffold => BuildStage::Scaffolded,
            BuildStep::Bootstrap => BuildStage::Bootstrapped,
            BuildStep::CopyFiles => BuildStage::FilesCopied,
            BuildStep::Entrypoint => BuildStage::EntrypointWritten,
            BuildStep::Finalize => BuildStage::Built,
        }
    }
}

impl std::fmt::Display for BuildStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            BuildStep::Scaffold => "scaffold",
            BuildStep::Bootstrap => "bootstrap",
            BuildStep::CopyFiles => "copy-files",
            BuildStep::Entrypoint => "entrypoint",
            BuildStep::Finalize => "finalize",
        };
        write!(f, "{}", s)
    }
}
