//! Contains the logic for the `resolve` command.
use std::path::PathBuf;

use clap::Args;
use colored::Colorize;
use lazymod_common::config::Config;
use lazymod_common::error::Result;
use lazymod_common::manifest::Manifest;
use lazymod_core::manifest::define_modules;
use lazymod_core::{render_chain, Resolution, Session};

#[derive(Args, Debug)]
pub struct Resolve {
    /// Path to the JSON module manifest
    pub manifest: PathBuf,

    /// Module ids to resolve
    #[arg(required = true)]
    pub ids: Vec<String>,
}

impl Resolve {
    pub fn run(&self, config: &Config) -> Result<bool> {
        let manifest = Manifest::from_path(&self.manifest)?;
        let session = Session::with_config(config.clone());
        define_modules(&session, &manifest)?;

        let mut all_resolved = true;
        for id in &self.ids {
            match session.try_resolve(id)? {
                Resolution::Resolved(value) => {
                    let rendered = serde_json::to_string_pretty(&value)?;
                    println!("{}: {}", id.as_str().bold(), rendered);
                }
                Resolution::Missing(err) => {
                    tracing::debug!("Could not resolve '{}': {}", id, err);
                    all_resolved = false;
                    eprintln!("{} {}", "Unresolved:".yellow().bold(), id);
                    for line in render_chain(&err.chain()).lines() {
                        eprintln!("  {line}");
                    }
                }
            }
        }

        session.dispose();
        Ok(all_resolved)
    }
}
