// lazymod-core/src/manifest.rs
// Drives a JSON-valued session from a module manifest.
use std::cell::RefCell;
use std::rc::Rc;

use lazymod_common::error::Result;
use lazymod_common::manifest::{Manifest, ModuleSpec};
use serde_json::Value;
use tracing::debug;

use crate::session::Session;

/// A manifest request whose callback fired.
#[derive(Debug, Clone, PartialEq)]
pub struct FiredRequest {
    /// Position of the request in the manifest.
    pub index: usize,
    pub dependencies: Vec<String>,
    pub values: Vec<Value>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ManifestReport {
    /// Requests that fired, in firing order.
    pub fired: Vec<FiredRequest>,
    /// Number of requests issued.
    pub issued: usize,
}

impl ManifestReport {
    pub fn waiting(&self) -> usize {
        self.issued - self.fired.len()
    }
}

/// Defines one manifest module.
///
/// The module produces its declared `value`, or the array of its dependency
/// values when it has none.
pub fn define_module(session: &Session<Value>, spec: &ModuleSpec) -> Result<()> {
    let value = spec.value.clone();
    session.define_dyn(&spec.id, spec.dependencies.clone(), move |args| {
        Ok(match &value {
            Some(value) => value.clone(),
            None => Value::Array(args),
        })
    })
}

/// Defines every module, in file order.
pub fn define_modules(session: &Session<Value>, manifest: &Manifest) -> Result<()> {
    for spec in &manifest.modules {
        define_module(session, spec)?;
    }
    debug!("Defined {} module(s) from manifest", manifest.modules.len());
    Ok(())
}

/// Defines every module, then issues every request.
pub fn apply(session: &Session<Value>, manifest: &Manifest) -> Result<ManifestReport> {
    define_modules(session, manifest)?;

    let fired = Rc::new(RefCell::new(Vec::new()));
    for (index, dependencies) in manifest.requests.iter().enumerate() {
        let sink = Rc::clone(&fired);
        let names = dependencies.clone();
        session.require_dyn(dependencies.clone(), move |values| {
            sink.borrow_mut().push(FiredRequest {
                index,
                dependencies: names,
                values,
            });
            Ok(())
        })?;
    }

    let fired = fired.borrow().clone();
    debug!(
        "{} of {} manifest request(s) fired",
        fired.len(),
        manifest.requests.len()
    );
    Ok(ManifestReport {
        fired,
        issued: manifest.requests.len(),
    })
}
