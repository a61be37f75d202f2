// lazymod-core/src/session.rs
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use lazymod_common::config::Config;
use lazymod_common::error::Result;
use lazymod_common::module_id;
use tracing::debug;

use crate::diagnostics::{self, DiagnosticSink, TracingSink};
use crate::queue::{self, DeferredQueue, DeferredRequest};
use crate::registry::Registry;
use crate::resolver::{resolve_module, Resolution};

pub(crate) struct SessionState<V> {
    pub(crate) registry: RefCell<Registry<V>>,
    pub(crate) queue: RefCell<DeferredQueue<V>>,
    pub(crate) config: Config,
    pub(crate) sink: Rc<dyn DiagnosticSink>,
}

/// An independent set of module definitions and pending requests.
///
/// `Session` is a handle: clones share the same registry and queue. Everything
/// runs on the calling thread and completes before returning. Factories and
/// callbacks may call back into the session; capture a [`WeakSession`] for
/// that so the session does not keep itself alive.
pub struct Session<V> {
    state: Rc<SessionState<V>>,
}

/// Non-owning handle to a [`Session`].
pub struct WeakSession<V> {
    state: Weak<SessionState<V>>,
}

impl<V: Clone + 'static> Session<V> {
    pub fn create() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        Self::with_sink(config, Rc::new(TracingSink))
    }

    pub fn with_sink(config: Config, sink: Rc<dyn DiagnosticSink>) -> Self {
        Self {
            state: Rc::new(SessionState {
                registry: RefCell::new(Registry::new()),
                queue: RefCell::new(DeferredQueue::new()),
                config,
                sink,
            }),
        }
    }

    pub fn config(&self) -> &Config {
        &self.state.config
    }

    pub fn downgrade(&self) -> WeakSession<V> {
        WeakSession {
            state: Rc::downgrade(&self.state),
        }
    }

    /// Registers module `id`; `factory` receives one value per dependency, in order.
    ///
    /// The factory runs lazily, at most once per definition. Defining an id
    /// that already exists replaces it: earlier consumers keep the values they
    /// got, later resolutions use the new factory. Every definition retries
    /// the pending `require` requests, and a factory fault hit during that
    /// retry is returned from here.
    pub fn define<const N: usize, F>(
        &self,
        id: &str,
        dependencies: [&str; N],
        factory: F,
    ) -> Result<()>
    where
        F: Fn([V; N]) -> anyhow::Result<V> + 'static,
    {
        let dependencies = dependencies.iter().map(|dep| dep.to_string()).collect();
        self.define_dyn(id, dependencies, move |args: Vec<V>| {
            let args: [V; N] = args.try_into().map_err(|args: Vec<V>| {
                anyhow::anyhow!("expected {} dependency value(s), got {}", N, args.len())
            })?;
            factory(args)
        })
    }

    /// Like [`Session::define`], for dependency lists only known at runtime.
    pub fn define_dyn<F>(&self, id: &str, dependencies: Vec<String>, factory: F) -> Result<()>
    where
        F: Fn(Vec<V>) -> anyhow::Result<V> + 'static,
    {
        module_id::validate(id)?;
        for dependency in &dependencies {
            module_id::validate_dependency(id, dependency)?;
        }

        debug!("Defining module '{}' with dependencies {:?}", id, dependencies);
        let replaced = self
            .state
            .registry
            .borrow_mut()
            .insert(id, dependencies, Rc::new(factory));
        if replaced.is_some() && self.state.config.warn_on_duplicate {
            self.state.sink.duplicate_definition(id);
        }
        drop(replaced);

        queue::drain(&self.state)
    }

    pub fn is_defined(&self, id: &str) -> bool {
        self.state.registry.borrow().is_defined(id)
    }

    /// Calls `callback` with the values of `dependencies` once all of them resolve.
    ///
    /// If they already do, the callback runs before this returns. Otherwise
    /// the request is parked and retried after each later definition. Factory
    /// faults are returned, and so is an error from the callback itself, from
    /// whichever call ends up running it.
    pub fn require<const N: usize, F>(&self, dependencies: [&str; N], callback: F) -> Result<()>
    where
        F: FnOnce([V; N]) -> anyhow::Result<()> + 'static,
    {
        let dependencies = dependencies.iter().map(|dep| dep.to_string()).collect();
        self.require_dyn(dependencies, move |values: Vec<V>| {
            let values: [V; N] = values.try_into().map_err(|values: Vec<V>| {
                anyhow::anyhow!("expected {} value(s), got {}", N, values.len())
            })?;
            callback(values)
        })
    }

    /// Like [`Session::require`], for dependency lists only known at runtime.
    pub fn require_dyn<F>(&self, dependencies: Vec<String>, callback: F) -> Result<()>
    where
        F: FnOnce(Vec<V>) -> anyhow::Result<()> + 'static,
    {
        queue::submit(
            &self.state,
            DeferredRequest::new(dependencies, Box::new(callback)),
        )
    }

    /// Resolves `id`. A missing module is `Ok(Resolution::Missing(_))`.
    pub fn try_resolve(&self, id: &str) -> Result<Resolution<V>> {
        resolve_module(&self.state, id)
    }

    /// Resolves `id`, reporting a missing module as `LazymodError::Resolution`.
    pub fn resolve(&self, id: &str) -> Result<V> {
        self.try_resolve(id)?.into_result()
    }

    /// Defined ids whose factory has not produced a value, in registration order.
    pub fn unused_modules(&self) -> Vec<String> {
        diagnostics::unused_modules(&self.state)
    }

    /// Root-first chains for every distinct id pending requests are waiting on.
    pub fn unresolved_dependencies(&self) -> Result<Vec<Vec<String>>> {
        diagnostics::unresolved_dependencies(&self.state)
    }

    pub fn defined_modules(&self) -> Vec<String> {
        self.state.registry.borrow().ids()
    }

    pub fn pending_requests(&self) -> usize {
        self.state.queue.borrow().len()
    }

    /// Drops every definition and every pending request.
    pub fn clear(&self) {
        let records = self.state.registry.borrow_mut().clear();
        let pending = self.state.queue.borrow_mut().take_all();
        debug!(
            "Cleared session: {} module(s), {} pending request(s)",
            records.len(),
            pending.len()
        );
        // Dropped here, outside the borrows, in case captured state calls back in.
        drop(records);
        drop(pending);
    }

    pub fn dispose(self) {
        self.clear();
    }
}

impl<V: Clone + 'static> Default for Session<V> {
    fn default() -> Self {
        Self::create()
    }
}

impl<V> Clone for Session<V> {
    fn clone(&self) -> Self {
        Self {
            state: Rc::clone(&self.state),
        }
    }
}

impl<V> fmt::Debug for Session<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let modules = self.state.registry.try_borrow().map(|r| r.len()).ok();
        let pending = self.state.queue.try_borrow().map(|q| q.len()).ok();
        f.debug_struct("Session")
            .field("modules", &modules)
            .field("pending_requests", &pending)
            .field("config", &self.state.config)
            .finish()
    }
}

impl<V> WeakSession<V> {
    pub fn upgrade(&self) -> Option<Session<V>> {
        self.state.upgrade().map(|state| Session { state })
    }
}

impl<V> Clone for WeakSession<V> {
    fn clone(&self) -> Self {
        Self {
            state: Weak::clone(&self.state),
        }
    }
}
