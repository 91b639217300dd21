//! Human-readable output formatting

use bytesize::ByteSize;

use crate::build::{BuildReport, CreateReport};
use crate::container::ContainerInfo;
use crate::output::formatter::Report;

pub fn format_human(report: &Report) -> String {
    match report {
        Report::Created(created) => format_created(created),
        Report::Built(built) => format_built(built),
        Report::Containers(names) => format_containers(names),
        Report::Info(info) => format_info(info),
    }
}

fn format_created(report: &CreateReport) -> String {
    format!("Container {} created successfully!", report.name)
}

fn format_built(report: &BuildReport) -> String {
    let mut output = String::new();

    for copied in &report.copied {
        output.push_str(&format!("Copied {} -> {}\n", copied.source, copied.destination));
    }
    for failure in &report.failures {
        output.push_str(&format!(
            "Failed {} -> {} ({}): {}\n",
            failure.source, failure.destination, failure.kind, failure.message
        ));
    }

    let elapsed = report.finished_at - report.started_at;
    if report.failures.is_empty() {
        output.push_str(&format!(
            "Container {} built successfully! ({} ms)",
            report.name,
            elapsed.num_milliseconds()
        ));
    } else {
        output.push_str(&format!(
            "Container {} built with {} file copy failure(s). ({} ms)",
            report.name,
            report.failures.len(),
            elapsed.num_milliseconds()
        ));
    }

    output
}

fn format_containers(names: &[String]) -> String {
    if names.is_empty() {
        return "No containers found.".to_string();
    }

    let mut output = String::from("Available containers:");
    for name in names {
        output.push_str(&format!("\n  - {}", name));
    }
    output
}

fn format_info(info: &ContainerInfo) -> String {
    let config = &info.config;
    let packages = if config.packages.is_empty() {
        "None".to_string()
    } else {
        config.packages.join(", ")
    };

    let mut output = format!(
        "Container: {}\n\
         Stage:     {}\n\
         Base:      {}\n\
         Python:    {}\n\
         Packages:  {}\n\
         Workdir:   {}\n\
         Command:   {}\n\
         Size:      {}\n\
         Location:  {}",
        info.name,
        info.stage,
        config.base_distro,
        config.interpreter_version,
        packages,
        config.working_dir,
        config.entrypoint.join(" "),
        ByteSize(info.disk_usage),
        info.location.display()
    );

    if !config.environment.is_empty() {
        output.push_str("\n\nEnvironment:");
        for (key, value) in &config.environment {
            output.push_str(&format!("\n  {}={}", key, value));
        }
    }
    if !config.files.is_empty() {
        output.push_str("\n\nFiles:");
        for (source, dest) in &config.files {
            output.push_str(&format!("\n  {} -> {}", source, dest));
        }
    }

    output
}
