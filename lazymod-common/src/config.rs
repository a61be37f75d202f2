// lazymod-common/src/config.rs
//! Session settings. Plain data: nothing here reads the environment.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Report redefinitions of an already registered module id.
    pub warn_on_duplicate: bool,
    /// Push every chain found by `unresolved_dependencies` through the diagnostic sink.
    pub log_unresolved_chains: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            warn_on_duplicate: true,
            log_unresolved_chains: false,
        }
    }
}
