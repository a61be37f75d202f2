// lazymod-common/src/manifest.rs
// JSON description of a set of module definitions and require calls.
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::{LazymodError, Result};
use super::module_id;

/// A module graph read from disk.
///
/// Modules are defined in file order, then every request is issued in file order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    #[serde(default)]
    pub modules: Vec<ModuleSpec>,
    /// Each entry is the dependency list of one `require` call.
    #[serde(default)]
    pub requests: Vec<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModuleSpec {
    pub id: String,
    #[serde(default)]
    pub dependencies: Vec<String>,
    /// Value produced by the module. Without one the module produces the
    /// array of its dependency values.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
}

impl Manifest {
    pub fn from_path(path: &Path) -> Result<Self> {
        debug!("Reading module manifest from {}", path.display());
        let raw = fs::read_to_string(path)?;
        Self::parse(&raw).map_err(|e| match e {
            LazymodError::Json(err) => {
                LazymodError::Manifest(format!("{}: {err}", path.display()))
            }
            other => other,
        })
    }

    pub fn parse(raw: &str) -> Result<Self> {
        let manifest: Manifest = serde_json::from_str(raw)?;
        manifest.validate()?;
        debug!(
            "Parsed manifest with {} module(s) and {} request(s)",
            manifest.modules.len(),
            manifest.requests.len()
        );
        Ok(manifest)
    }

    /// Checks every id up front so a bad manifest fails before anything is defined.
    pub fn validate(&self) -> Result<()> {
        for module in &self.modules {
            module_id::validate(&module.id)?;
            for dependency in &module.dependencies {
                module_id::validate_dependency(&module.id, dependency)?;
            }
        }
        for (index, request) in self.requests.iter().enumerate() {
            if let Some(bad) = request.iter().find(|id| module_id::validate(id).is_err()) {
                return Err(LazymodError::Manifest(format!(
                    "request #{index} names invalid module id '{bad}'"
                )));
            }
        }
        Ok(())
    }
}
