//! Depth-first, memoizing resolution of module values.
//!
//! No borrow of the registry is held while a factory runs, so factories may
//! call back into the session (`define`, `require`, `resolve`). Cyclic graphs
//! are not detected and recurse without bound; callers must keep the graph
//! acyclic.

use std::rc::Rc;

use lazymod_common::error::{LazymodError, ResolutionError, Result};
use tracing::{debug, trace};

use crate::session::SessionState;

/// Outcome of resolving a module.
///
/// A missing module is an expected outcome (it drives request deferral), so it
/// is a variant here rather than an error.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution<V> {
    Resolved(V),
    Missing(ResolutionError),
}

impl<V> Resolution<V> {
    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }

    pub fn into_result(self) -> Result<V> {
        match self {
            Self::Resolved(value) => Ok(value),
            Self::Missing(err) => Err(LazymodError::Resolution(err)),
        }
    }
}

/// Resolves `id`, running its factory (and its dependencies' factories) on first use.
///
/// `Err` is only returned for factory faults.
pub(crate) fn resolve_module<V: Clone + 'static>(
    state: &SessionState<V>,
    id: &str,
) -> Result<Resolution<V>> {
    let (dependencies, factory, generation) = {
        let registry = state.registry.borrow();
        let Some(record) = registry.get(id) else {
            debug!("Module '{}' is not defined", id);
            return Ok(Resolution::Missing(ResolutionError::new(id)));
        };
        if let Some(value) = record.memo() {
            return Ok(Resolution::Resolved(value.clone()));
        }
        (
            Rc::clone(record.dependencies()),
            Rc::clone(record.factory()),
            record.generation(),
        )
    };

    let args = match resolve_all(state, &dependencies)? {
        Resolution::Resolved(args) => args,
        Resolution::Missing(err) => return Ok(Resolution::Missing(err.through(id))),
    };

    trace!("Invoking factory for '{}' with {} argument(s)", id, args.len());
    let value = match factory(args) {
        Ok(value) => value,
        Err(e) => {
            // A factory that resolves another module itself can hit a missing
            // one; that defers like a missing declared dependency.
            if let Some(LazymodError::Resolution(err)) = e.downcast_ref::<LazymodError>() {
                debug!("Factory for '{}' needs an undefined module: {}", id, err);
                return Ok(Resolution::Missing(err.clone().through(id)));
            }
            debug!("Factory for '{}' failed: {:#}", id, e);
            return Err(LazymodError::from(e));
        }
    };

    let value = state.registry.borrow_mut().memoize(id, generation, value);
    Ok(Resolution::Resolved(value))
}

/// Resolves every id in order, stopping at the first missing one.
pub(crate) fn resolve_all<V: Clone + 'static>(
    state: &SessionState<V>,
    ids: &[String],
) -> Result<Resolution<Vec<V>>> {
    let mut values = Vec::with_capacity(ids.len());
    for id in ids {
        match resolve_module(state, id)? {
            Resolution::Resolved(value) => values.push(value),
            Resolution::Missing(err) => return Ok(Resolution::Missing(err)),
        }
    }
    Ok(Resolution::Resolved(values))
}
