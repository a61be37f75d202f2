// lazymod-core/src/diagnostics.rs
//! Reporting on what a session has defined but never used, and on requests
//! still waiting for modules that do not exist.

use std::cell::RefCell;

use lazymod_common::error::Result;
use tracing::warn;

use crate::resolver::{resolve_module, Resolution};
use crate::session::SessionState;

/// Write-only channel for informational diagnostics.
pub trait DiagnosticSink {
    /// An already registered id was defined again.
    fn duplicate_definition(&self, id: &str);

    /// A root-first chain ending in a module that is not defined.
    fn unresolved_chain(&self, chain: &[String]) {
        let _ = chain;
    }
}

/// Emits diagnostics as `tracing` warnings.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn duplicate_definition(&self, id: &str) {
        warn!("Duplicate module definition '{}'", id);
    }

    fn unresolved_chain(&self, chain: &[String]) {
        warn!("Unresolved dependency chain:\n{}", render_chain(chain));
    }
}

/// Keeps diagnostics in memory, for embedding and tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    duplicates: RefCell<Vec<String>>,
    chains: RefCell<Vec<Vec<String>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn duplicates(&self) -> Vec<String> {
        self.duplicates.borrow().clone()
    }

    pub fn chains(&self) -> Vec<Vec<String>> {
        self.chains.borrow().clone()
    }
}

impl DiagnosticSink for MemorySink {
    fn duplicate_definition(&self, id: &str) {
        self.duplicates.borrow_mut().push(id.to_string());
    }

    fn unresolved_chain(&self, chain: &[String]) {
        self.chains.borrow_mut().push(chain.to_vec());
    }
}

pub(crate) fn unused_modules<V: Clone>(state: &SessionState<V>) -> Vec<String> {
    state.registry.borrow().unused()
}

/// One root-first chain per distinct directly-requested id that still fails to resolve.
pub(crate) fn unresolved_dependencies<V: Clone + 'static>(
    state: &SessionState<V>,
) -> Result<Vec<Vec<String>>> {
    let requested = state.queue.borrow().requested_ids();

    let mut chains = Vec::new();
    for id in &requested {
        if let Resolution::Missing(err) = resolve_module(state, id)? {
            chains.push(err.chain());
        }
    }

    if state.config.log_unresolved_chains {
        for chain in &chains {
            state.sink.unresolved_chain(chain);
        }
    }
    Ok(chains)
}

/// Renders a root-first chain as an indented tree, marking the missing leaf.
///
/// ```text
/// app
///   db
///     driver (unresolved)
/// ```
pub fn render_chain(chain: &[String]) -> String {
    let last = chain.len().saturating_sub(1);
    chain
        .iter()
        .enumerate()
        .map(|(depth, id)| {
            let indent = "  ".repeat(depth);
            if depth == last {
                format!("{indent}{id} (unresolved)")
            } else {
                format!("{indent}{id}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
