//! Canonical container configuration
//!
//! A `ConfigModel` is the single in-memory shape every input format is
//! lifted into. All defaults live here; codecs never spell them out.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_DISTRO: &str = "ubuntu:20.04";
pub const DEFAULT_INTERPRETER_VERSION: &str = "3.9";
pub const DEFAULT_WORKING_DIR: &str = "/workspace";
pub const DEFAULT_ENTRYPOINT: &str = "/bin/bash";

/// Maximum length of a container name
pub const MAX_NAME_LEN: usize = 64;

/// Declared build intent for one container
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigModel {
    /// Storage key of the container
    pub name: String,
    /// Base distribution tag, only embedded in generated scripts
    pub base_distro: String,
    /// Dotted interpreter version such as "3.9"
    #[serde(rename = "python_version", alias = "interpreter_version")]
    pub interpreter_version: String,
    /// Packages to install, in declared order
    pub packages: Vec<String>,
    /// Host source path -> container destination path
    pub files: IndexMap<String, String>,
    /// Environment variables exported by the entrypoint
    pub environment: IndexMap<String, String>,
    /// Absolute working directory inside the container
    pub working_dir: String,
    /// Default command tokens
    pub entrypoint: Vec<String>,
}

impl ConfigModel {
    /// Create a config with every field but `name` at its default
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base_distro: DEFAULT_BASE_DISTRO.to_string(),
            interpreter_version: DEFAULT_INTERPRETER_VERSION.to_string(),
            packages: Vec::new(),
            files: IndexMap::new(),
            environment: IndexMap::new(),
            working_dir: DEFAULT_WORKING_DIR.to_string(),
            entrypoint: vec![DEFAULT_ENTRYPOINT.to_string()],
        }
    }

    /// Add a package unless it is already listed
    pub fn add_package(&mut self, package: impl Into<String>) -> &mut Self {
        let package = package.into();
        if !self.packages.contains(&package) {
            self.packages.push(package);
        }
        self
    }

    /// Copy `source` from the host to `destination` inside the container
    pub fn add_file(&mut self, source: impl Into<String>, destination: impl Into<String>) -> &mut Self {
        self.files.insert(source.into(), destination.into());
        self
    }

    pub fn set_env(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.environment.insert(key.into(), value.into());
        self
    }

    pub fn set_base_distro(&mut self, distro: impl Into<String>) -> &mut Self {
        self.base_distro = distro.into();
        self
    }

    pub fn set_interpreter_version(&mut self, version: impl Into<String>) -> &mut Self {
        self.interpreter_version = version.into();
        self
    }

    pub fn set_working_dir(&mut self, dir: impl Into<String>) -> &mut Self {
        self.working_dir = dir.into();
        self
    }

    pub fn set_entrypoint(&mut self, tokens: Vec<String>) -> &mut Self {
        self.entrypoint = tokens;
        self
    }
}

/// Empty name so a document without one fails validation instead of
/// silently sharing a fallback name with other containers.
impl Default for ConfigModel {
    fn default() -> Self {
        Self::new(String::new())
    }
}

/// A parsed `major.minor[.patch...]` interpreter version
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InterpreterVersion {
    pub major: u32,
    pub minor: u32,
}

impl InterpreterVersion {
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// Parse a dotted version. Needs at least two components, all numeric.
    pub fn parse(input: &str) -> Option<Self> {
        let parts: Vec<&str> = input.trim().split('.').collect();
        if parts.len() < 2 {
            return None;
        }

        let mut numbers = Vec::with_capacity(parts.len());
        for part in &parts {
            if part.is_empty() || !part.chars().all(|c| c.is_ascii_digit()) {
                return None;
            }
            numbers.push(part.parse::<u32>().ok()?);
        }

        Some(Self::new(numbers[0], numbers[1]))
    }
}

impl Default for InterpreterVersion {
    fn default() -> Self {
        Self::new(3, 8)
    }
}

impl std::fmt::Display for InterpreterVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl std::str::FromStr for InterpreterVersion {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("'{}' is not a MAJOR.MINOR version", s))
    }
}
