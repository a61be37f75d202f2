// lazymod/src/cli.rs
//! Defines the command-line argument structure using clap.
use clap::{ArgAction, Parser, Subcommand};
use lazymod_common::config::Config;
use lazymod_common::error::Result;

pub mod check;
pub mod resolve;

use crate::cli::check::Check;
use crate::cli::resolve::Resolve;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None, name = "lazymod", bin_name = "lazymod")]
#[command(propagate_version = true)]
pub struct CliArgs {
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Define every module in a manifest, issue its requests and report what is left over
    Check(Check),
    /// Print the value of one or more modules from a manifest
    Resolve(Resolve),
}

impl Command {
    /// Returns `Ok(false)` when the command ran but found unresolved modules.
    pub fn run(&self, config: &Config) -> Result<bool> {
        match self {
            Self::Check(command) => command.run(config),
            Self::Resolve(command) => command.run(config),
        }
    }
}
