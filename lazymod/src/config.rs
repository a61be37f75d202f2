// lazymod/src/config.rs
//! Builds the session [`Config`] from `LAZYMOD_*` environment variables.
use std::env;

use lazymod_common::config::Config;
use lazymod_common::error::{LazymodError, Result};
use tracing::debug;

const WARN_DUPLICATES_VAR: &str = "LAZYMOD_WARN_DUPLICATES";
const LOG_CHAINS_VAR: &str = "LAZYMOD_LOG_CHAINS";

pub fn load() -> Result<Config> {
    debug!("Loading lazymod configuration");

    let defaults = Config::default();
    let warn_on_duplicate =
        read_flag(WARN_DUPLICATES_VAR)?.unwrap_or(defaults.warn_on_duplicate);
    let log_unresolved_chains =
        read_flag(LOG_CHAINS_VAR)?.unwrap_or(defaults.log_unresolved_chains);

    debug!(
        "Configuration loaded: warn_on_duplicate={warn_on_duplicate}, log_unresolved_chains={log_unresolved_chains}"
    );
    Ok(Config {
        warn_on_duplicate,
        log_unresolved_chains,
    })
}

fn read_flag(name: &str) -> Result<Option<bool>> {
    match env::var(name) {
        Ok(raw) if raw.trim().is_empty() => Ok(None),
        Ok(raw) => parse_flag(&raw).map(Some).ok_or_else(|| {
            LazymodError::Config(format!("{name} has invalid value '{raw}'"))
        }),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(e) => Err(LazymodError::Config(format!("{name}: {e}"))),
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
