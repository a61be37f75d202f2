//! Parked `require` calls and their replay.

use std::collections::VecDeque;

use indexmap::IndexSet;
use lazymod_common::error::{LazymodError, Result};
use tracing::debug;

use crate::resolver::{resolve_all, Resolution};
use crate::session::SessionState;

pub(crate) type Callback<V> = Box<dyn FnOnce(Vec<V>) -> anyhow::Result<()>>;

pub(crate) struct DeferredRequest<V> {
    dependencies: Vec<String>,
    callback: Callback<V>,
}

impl<V> DeferredRequest<V> {
    pub(crate) fn new(dependencies: Vec<String>, callback: Callback<V>) -> Self {
        Self {
            dependencies,
            callback,
        }
    }
}

pub(crate) struct DeferredQueue<V> {
    pending: VecDeque<DeferredRequest<V>>,
}

impl<V> DeferredQueue<V> {
    pub(crate) fn new() -> Self {
        Self {
            pending: VecDeque::new(),
        }
    }

    pub(crate) fn push(&mut self, request: DeferredRequest<V>) {
        self.pending.push_back(request);
    }

    /// Empties the live queue, returning its contents in enqueue order.
    pub(crate) fn take_all(&mut self) -> VecDeque<DeferredRequest<V>> {
        std::mem::take(&mut self.pending)
    }

    /// Puts requests back ahead of everything currently queued.
    pub(crate) fn restore_front(&mut self, mut requests: VecDeque<DeferredRequest<V>>) {
        requests.append(&mut self.pending);
        self.pending = requests;
    }

    /// Distinct ids named directly by queued requests, in first-seen order.
    pub(crate) fn requested_ids(&self) -> IndexSet<String> {
        self.pending
            .iter()
            .flat_map(|request| request.dependencies.iter().cloned())
            .collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.pending.len()
    }
}

/// Runs `request` now if every dependency resolves, otherwise parks it.
///
/// Only factory faults and callback errors are returned; the request is
/// consumed in either case.
pub(crate) fn submit<V: Clone + 'static>(
    state: &SessionState<V>,
    request: DeferredRequest<V>,
) -> Result<()> {
    match resolve_all(state, &request.dependencies)? {
        Resolution::Resolved(values) => {
            (request.callback)(values).map_err(|e| {
                debug!("Callback for {:?} failed: {:#}", request.dependencies, e);
                LazymodError::from(e)
            })?;
        }
        Resolution::Missing(err) => {
            debug!(
                "Deferring request for {:?}: {}",
                request.dependencies, err
            );
            state.queue.borrow_mut().push(request);
        }
    }
    Ok(())
}

/// Replays every request queued at the time of the call, once, in FIFO order.
///
/// Requests that fail again (or new ones issued by factories and callbacks
/// while draining) land in the live queue and wait for the next drain.
pub(crate) fn drain<V: Clone + 'static>(state: &SessionState<V>) -> Result<()> {
    let mut snapshot = state.queue.borrow_mut().take_all();
    if snapshot.is_empty() {
        return Ok(());
    }
    debug!("Retrying {} deferred request(s)", snapshot.len());

    while let Some(request) = snapshot.pop_front() {
        if let Err(e) = submit(state, request) {
            if !snapshot.is_empty() {
                debug!(
                    "Drain interrupted by an error; requeueing {} request(s)",
                    snapshot.len()
                );
                state.queue.borrow_mut().restore_front(snapshot);
            }
            return Err(e);
        }
    }
    Ok(())
}
