//! Output formatting

use serde::Serialize;

use crate::build::{BuildReport, CreateReport};
use crate::container::ContainerInfo;
use crate::output::human::format_human;
use crate::output::json::format_json;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Human,
    Json,
}

/// Something a command reports back to the user
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Report {
    Created(CreateReport),
    Built(BuildReport),
    Containers(Vec<String>),
    Info(Box<ContainerInfo>),
}

pub fn format_output(report: &Report, format: &OutputFormat) -> String {
    match format {
        OutputFormat::Human => format_human(report),
        OutputFormat::Json => format_json(report),
    }
}
