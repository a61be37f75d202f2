//! Contains the logic for the `check` command.
use std::fmt::Write as _;
use std::path::PathBuf;

use clap::Args;
use colored::Colorize;
use lazymod_common::config::Config;
use lazymod_common::error::Result;
use lazymod_common::manifest::Manifest;
use lazymod_core::manifest::{apply, ManifestReport};
use lazymod_core::{render_chain, Session};

#[derive(Args, Debug)]
pub struct Check {
    /// Path to the JSON module manifest
    pub manifest: PathBuf,

    /// Do not list modules that were defined but never needed
    #[arg(long)]
    pub hide_unused: bool,
}

impl Check {
    pub fn run(&self, config: &Config) -> Result<bool> {
        tracing::debug!("Checking manifest {}", self.manifest.display());
        let manifest = Manifest::from_path(&self.manifest)?;

        let session = Session::with_config(config.clone());
        let report = apply(&session, &manifest)?;
        let unused = if self.hide_unused {
            Vec::new()
        } else {
            session.unused_modules()
        };
        let chains = session.unresolved_dependencies()?;
        session.dispose();

        print!("{}", render_summary(&report, &unused, &chains));
        Ok(chains.is_empty())
    }
}

fn render_summary(report: &ManifestReport, unused: &[String], chains: &[Vec<String>]) -> String {
    let mut out = String::new();

    let _ = writeln!(
        out,
        "{}{} of {} request(s) fired",
        "==> ".bold().blue(),
        report.fired.len(),
        report.issued
    );
    for fired in &report.fired {
        let _ = writeln!(
            out,
            "  {} #{} [{}]",
            "✓".green(),
            fired.index,
            fired.dependencies.join(", ")
        );
    }

    if !unused.is_empty() {
        let _ = writeln!(out, "{}Unused modules:", "==> ".bold().blue());
        for id in unused {
            let _ = writeln!(out, "  {id}");
        }
    }

    if chains.is_empty() {
        let _ = writeln!(out, "{}All dependencies resolved", "==> ".bold().blue());
    } else {
        let _ = writeln!(
            out,
            "{}{} unresolved dependency chain(s):",
            "==> ".bold().yellow(),
            chains.len()
        );
        for chain in chains {
            for line in render_chain(chain).lines() {
                let _ = writeln!(out, "  {line}");
            }
        }
    }
    out
}
