//! codedna CLI - import-graph ingestion and Project DNA generation
//!
//! Usage: codedna <command> [arguments]

mod cli;
mod ingest_cmd;
mod show_cmd;
mod top_cmd;

use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;

use codedna::output::{generate_execution_id, output_json, ErrorResponse, JsonResponse};
use codedna::version::BuildInfo;
use codedna::{ConfigError, IngestError, OutputFormat};

use cli::{Cli, Command};

/// Environment variable holding an `env_logger` filter
const LOG_ENV: &str = "CODEDNA_LOG";

fn init_logging(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::new().filter_or(LOG_ENV, default_level))
        .format_timestamp(None)
        .init();
}

fn run_version(output_format: OutputFormat) -> Result<()> {
    let info = BuildInfo::current();
    if output_format == OutputFormat::Json {
        let exec_id = generate_execution_id();
        return output_json(&JsonResponse::new(info, &exec_id));
    }
    println!("{}", info);
    Ok(())
}

fn run(cli: &Cli) -> Result<()> {
    if let Command::Version = cli.command {
        return run_version(cli.output);
    }

    let config = cli.load_config()?;
    match &cli.command {
        Command::Ingest {
            path,
            force,
            no_store,
        } => ingest_cmd::run_ingest_cmd(path, &config, *force, *no_store, cli.output),
        Command::Top { path, limit } => top_cmd::run_top(path, &config, *limit, cli.output),
        Command::Show { path } => show_cmd::run_show(path, &config, cli.output),
        Command::Version => run_version(cli.output),
    }
}

fn error_category(error: &anyhow::Error) -> &'static str {
    match error.downcast_ref::<IngestError>() {
        Some(IngestError::RootNotFound(_)) | Some(IngestError::RootNotDirectory(_)) => "invalid_root",
        Some(IngestError::Io { .. }) => "io",
        Some(IngestError::Store(_)) => "store",
        Some(IngestError::Serialization(_)) => "serialization",
        None if error.downcast_ref::<ConfigError>().is_some() => "config",
        None => "error",
    }
}

fn report_error(error: &anyhow::Error, output_format: OutputFormat) {
    if output_format == OutputFormat::Json {
        let response = ErrorResponse {
            error: error_category(error).to_string(),
            message: format!("{:#}", error),
        };
        let exec_id = generate_execution_id();
        if output_json(&JsonResponse::new(response, &exec_id)).is_ok() {
            return;
        }
    }
    eprintln!("Error: {:#}", error);
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report_error(&e, cli.output);
            ExitCode::from(1)
        }
    }
}
