// lazymod-core/src/lib.rs
//! Lazy module registry.
//!
//! Modules are registered with an id, an ordered dependency list and a
//! factory. A module's factory runs the first time something actually needs
//! the module, and its value is memoized for every later consumer. `require`
//! calls whose dependencies are not all registered yet are parked and retried
//! each time a new module is defined.

pub mod diagnostics;
pub mod manifest;
mod queue;
mod registry;
mod resolver;
pub mod session;

pub use diagnostics::{render_chain, DiagnosticSink, MemorySink, TracingSink};
pub use resolver::Resolution;
pub use session::{Session, WeakSession};
