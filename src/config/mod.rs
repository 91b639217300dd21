//! Container configuration: model, codecs, and validation

pub mod codec;
pub mod model;
pub mod validator;

pub use codec::{decode, load_config_file, parse_directives, parse_json, to_directives, to_json, ConfigFormat};
pub use model::{ConfigModel, InterpreterVersion};
pub use validator::{
    check_config, has_errors, validate_config, validate_name, ValidationIssue, ValidationOptions,
    ValidationSeverity,
};
