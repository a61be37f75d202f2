//! Module identifier rules.
//!
//! Any non-empty string is an id, except relative ids (`./x`, `../x`), which
//! are rejected since nothing here resolves them against a base. The same
//! rule applies to declared dependency ids.

use super::error::{LazymodError, Result};

/// Checks the id of a module being defined.
pub fn validate(id: &str) -> Result<()> {
    check(id).map_err(|reason| LazymodError::definition(id, reason))
}

/// Checks a dependency id declared by `module`.
pub fn validate_dependency(module: &str, dependency: &str) -> Result<()> {
    check(dependency)
        .map_err(|reason| LazymodError::definition(module, format!("dependency {reason}")))
}

fn check(id: &str) -> std::result::Result<(), String> {
    if id.is_empty() {
        return Err("id must not be empty".to_string());
    }
    if id.starts_with("./") || id.starts_with("../") || id == "." || id == ".." {
        return Err(format!("id '{id}' is relative; only absolute ids are supported"));
    }
    Ok(())
}
