//! Error types for Continy

use thiserror::Error;

use crate::build::BuildStep;

#[derive(Error, Debug)]
pub enum ContinyError {
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Container not found: {0}")]
    NotFound(String),

    #[error("Source not found: {0}")]
    MissingSource(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Container '{0}' is not built. Run build first")]
    NotBuilt(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Build of '{name}' failed at step '{step}': {cause}")]
    BuildFailed {
        name: String,
        step: BuildStep,
        cause: Box<ContinyError>,
    },
}

impl ContinyError {
    /// Wrap a fatal step failure with the container and step it happened in
    pub fn in_step(self, name: &str, step: BuildStep) -> Self {
        ContinyError::BuildFailed {
            name: name.to_string(),
            step,
            cause: Box::new(self),
        }
    }
}

pub type Result<T> = std::result::Result<T, ContinyError>;
