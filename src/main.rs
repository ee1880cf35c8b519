// Inherit lint configuration from lib.rs for consistency
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::items_after_statements,
    clippy::similar_names,
    clippy::unnecessary_wraps,
    clippy::match_same_arms
)]

use clap::Parser;

use codequery::cli::commands::{Cli, Command};
use codequery::cli::output;
use codequery::config::Config;
use codequery::db::CodeIndex;
use codequery::deadcode::{DeadCodeDetector, DeadCodeOptions};
use codequery::error::QueryError;
use codequery::operations;
use codequery::operations::Direction;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("{}", output::format_error(&e));
        std::process::exit(1);
    }
}

type CmdResult = Result<(), Box<dyn std::fmt::Display>>;

fn map_err(e: impl std::fmt::Display + 'static) -> Box<dyn std::fmt::Display> {
    Box::new(e.to_string())
}

fn run(cli: Cli) -> CmdResult {
    let config = Config::from_cwd().map_err(map_err)?;
    let index = CodeIndex::open(&config).map_err(map_err)?;

    match cli.command {
        Command::Symbol { name, kind } => {
            let result =
                operations::find_symbol(&index, &name, kind.as_deref()).map_err(map_err)?;
            println!("{}", output::format_result(&config, &result));
        }
        Command::Callers { symbol, depth } => {
            let result = operations::get_callers(&index, &symbol, depth).map_err(map_err)?;
            println!("{}", output::format_result(&config, &result));
        }
        Command::Callees { symbol } => {
            let result = operations::get_callees(&index, &symbol).map_err(map_err)?;
            println!("{}", output::format_result(&config, &result));
        }
        Command::Deps { file, direction } => {
            let direction = Direction::parse(&direction).ok_or_else(|| {
                map_err(QueryError::Other(format!(
                    "direction must be incoming, outgoing, or both, got '{direction}'"
                )))
            })?;
            let result =
                operations::get_file_dependencies(&index, &file, direction).map_err(map_err)?;
            println!("{}", output::format_result(&config, &result));
        }
        Command::Dataflow { function } => {
            let result = operations::get_data_dependencies(&index, &function).map_err(map_err)?;
            println!("{}", output::format_result(&config, &result));
        }
        Command::Trace {
            variable,
            file,
            depth,
        } => {
            let result = operations::trace_variable_flow(&index, &variable, &file, depth)
                .map_err(map_err)?;
            println!("{}", output::format_result(&config, &result));
        }
        Command::Taint { function } => {
            let result =
                operations::get_cross_function_taint(&index, &function).map_err(map_err)?;
            println!("{}", output::format_result(&config, &result));
        }
        Command::Coverage { route } => {
            let result = operations::get_api_security_coverage(&index, route.as_deref())
                .map_err(map_err)?;
            println!("{}", output::format_result(&config, &result));
        }
        Command::Deadcode {
            path_filter,
            symbols,
        } => {
            let detector = DeadCodeDetector::new(&index).map_err(map_err)?;
            let options = DeadCodeOptions {
                path_filter,
                analyze_symbols: symbols,
                settings: config.settings.deadcode.clone(),
            };
            let report = detector.analyze(&options).map_err(map_err)?;
            println!("{}", output::format_result(&config, &report));
        }
        Command::Stats => {
            let stats = index.stats().map_err(map_err)?;
            println!("{}", output::format_result(&config, &stats));
        }
    }

    Ok(())
}
