// lazymod/src/main.rs
use std::process;

use clap::Parser;
use colored::Colorize;
use lazymod_common::error::Result;
use tracing::debug;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

mod cli;
mod config;
use cli::CliArgs;

fn init_logging(verbose: u8) {
    let level_filter = match verbose {
        0 => LevelFilter::INFO,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };

    let env_filter = EnvFilter::builder()
        .with_default_directive(level_filter.into())
        .with_env_var("LAZYMOD_LOG")
        .from_env_lossy();

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .without_time()
        .try_init();
}

fn main() -> Result<()> {
    let cli_args = CliArgs::parse();
    init_logging(cli_args.verbose);

    let config = match config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}: {:#}", "Error".red().bold(), e);
            process::exit(1);
        }
    };

    match cli_args.command.run(&config) {
        Ok(true) => {
            debug!("Command completed successfully.");
            Ok(())
        }
        Ok(false) => {
            debug!("Command completed with unresolved modules.");
            process::exit(1);
        }
        Err(e) => {
            eprintln!("{}: {:#}", "Error".red().bold(), e);
            process::exit(1);
        }
    }
}
