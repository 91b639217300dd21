//! Continy CLI - create, build, and run directory-tree containers

use std::path::Path;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use continy::cli::{Args, SubCommand};
use continy::config::{load_config_file, ConfigModel, ValidationIssue};
use continy::{format_output, Report, RunLauncher, Settings};

fn main() -> ExitCode {
    let args = Args::parse();
    let settings = Settings::from_args(&args);

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(settings.default_log_filter())),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(args.command, &settings) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(command: SubCommand, settings: &Settings) -> anyhow::Result<ExitCode> {
    let store = settings.store();

    match command {
        SubCommand::Create { source } => {
            let config = match source.file {
                Some(ref file) => load_file(file)?,
                None => ConfigModel::new(source.name.unwrap_or_default()),
            };
            let report = settings
                .pipeline(&store)
                .create(&config)
                .with_context(|| format!("cannot create container '{}'", config.name))?;
            print_warnings(&report.warnings);
            println!("{}", format_output(&Report::Created(report), &settings.output_format));
            Ok(ExitCode::SUCCESS)
        }

        SubCommand::Build { source } => {
            let pipeline = settings.pipeline(&store);
            let report = match (source.file, source.name) {
                (Some(file), _) => pipeline.build(&load_file(&file)?)?,
                (None, name) => pipeline.rebuild(&name.unwrap_or_default())?,
            };
            print_warnings(&report.warnings);
            println!("{}", format_output(&Report::Built(report), &settings.output_format));
            Ok(ExitCode::SUCCESS)
        }

        SubCommand::Run { name, command } => {
            let command = command.map(|c| c.split_whitespace().map(str::to_string).collect());
            let launcher = RunLauncher::new(&store);
            let plan = launcher.prepare(&name, command)?;

            if settings.verbose {
                println!("Running container: {}", name);
                println!("Command: {}", plan.command().join(" "));
            }

            let status = continy::launcher::run(&plan)
                .with_context(|| format!("cannot start container '{}'", name))?;

            if status.code().is_none() {
                println!("\nContainer stopped.");
            }
            Ok(exit_code(status.code()))
        }

        SubCommand::List => {
            let names = store.list()?;
            println!("{}", format_output(&Report::Containers(names), &settings.output_format));
            Ok(ExitCode::SUCCESS)
        }

        SubCommand::Info { name } => {
            let info = store.inspect(&name)?;
            println!("{}", format_output(&Report::Info(Box::new(info)), &settings.output_format));
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn load_file(file: &Path) -> anyhow::Result<ConfigModel> {
    load_config_file(file).with_context(|| format!("cannot load configuration from {}", file.display()))
}

fn print_warnings(warnings: &[ValidationIssue]) {
    for warning in warnings {
        eprintln!("Warning: {}", warning.message);
    }
}

fn exit_code(code: Option<i32>) -> ExitCode {
    match code {
        Some(0) => ExitCode::SUCCESS,
        Some(c) => ExitCode::from(u8::try_from(c).unwrap_or(1)),
        None => ExitCode::FAILURE,
    }
}
