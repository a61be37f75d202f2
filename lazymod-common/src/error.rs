use std::sync::Arc;

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum LazymodError {
    #[error("Definition Error for module '{id}': {reason}")]
    Definition { id: String, reason: String },

    // Not a `#[source]`: the message already includes it.
    #[error("Resolution Error: {0}")]
    Resolution(ResolutionError),

    /// A factory failed. The original error is kept as-is so callers can downcast it.
    #[error("{0:#}")]
    Factory(Arc<anyhow::Error>),

    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("I/O Error: {0}")]
    Io(#[from] Arc<std::io::Error>),

    #[error("JSON Parsing Error: {0}")]
    Json(#[from] Arc<serde_json::Error>),

    #[error("Manifest Error: {0}")]
    Manifest(String),
}

impl LazymodError {
    pub fn definition(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Definition {
            id: id.into(),
            reason: reason.into(),
        }
    }

    /// The error raised by a factory, if this is a factory fault.
    pub fn factory_error(&self) -> Option<&anyhow::Error> {
        match self {
            Self::Factory(err) => Some(err),
            _ => None,
        }
    }

    pub fn is_resolution(&self) -> bool {
        matches!(self, Self::Resolution(_))
    }
}

impl From<ResolutionError> for LazymodError {
    fn from(err: ResolutionError) -> Self {
        LazymodError::Resolution(err)
    }
}

/// Wraps a factory or callback error.
///
/// A `LazymodError` returned as-is by the closure (for example from a
/// reentrant `define` that hit a failing factory) is passed through unchanged
/// instead of being wrapped a second time. Errors with added context stay
/// wrapped so the context is kept.
impl From<anyhow::Error> for LazymodError {
    fn from(err: anyhow::Error) -> Self {
        let direct = err
            .chain()
            .next()
            .is_some_and(|outer| outer.is::<LazymodError>());
        if direct {
            match err.downcast::<LazymodError>() {
                Ok(inner) => return inner,
                Err(err) => return LazymodError::Factory(Arc::new(err)),
            }
        }
        LazymodError::Factory(Arc::new(err))
    }
}

impl From<std::io::Error> for LazymodError {
    fn from(err: std::io::Error) -> Self {
        LazymodError::Io(Arc::new(err))
    }
}

impl From<serde_json::Error> for LazymodError {
    fn from(err: serde_json::Error) -> Self {
        LazymodError::Json(Arc::new(err))
    }
}

/// A module (or one of its transitive dependencies) is not registered.
///
/// The trail is recorded while the resolver unwinds, so it is stored leaf
/// first: the missing id, then each dependent that was being resolved.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown module '{missing}' ({})", render_trail(.trail))]
pub struct ResolutionError {
    missing: String,
    trail: Vec<String>,
}

impl ResolutionError {
    pub fn new(missing: impl Into<String>) -> Self {
        let missing = missing.into();
        Self {
            trail: vec![missing.clone()],
            missing,
        }
    }

    /// Records that `dependent` was being resolved when the failure unwound through it.
    pub fn through(mut self, dependent: impl Into<String>) -> Self {
        self.trail.push(dependent.into());
        self
    }

    pub fn missing(&self) -> &str {
        &self.missing
    }

    /// The id originally asked for.
    pub fn root(&self) -> &str {
        self.trail.last().map_or(self.missing.as_str(), String::as_str)
    }

    /// Root-first chain, ending with the missing id.
    pub fn chain(&self) -> Vec<String> {
        self.trail.iter().rev().cloned().collect()
    }
}

fn render_trail(trail: &[String]) -> String {
    trail
        .iter()
        .rev()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" -> ")
}

pub type Result<T> = std::result::Result<T, LazymodError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_is_root_first() {
        let err = ResolutionError::new("missing").through("m1").through("m");

        assert_eq!(err.missing(), "missing");
        assert_eq!(err.root(), "m");
        assert_eq!(err.chain(), vec!["m", "m1", "missing"]);
    }

    #[test]
    fn display_shows_the_path() {
        let err = ResolutionError::new("b").through("a");
        assert_eq!(err.to_string(), "Unknown module 'b' (a -> b)");

        let wrapped: LazymodError = err.into();
        assert!(wrapped.is_resolution());
        assert_eq!(
            wrapped.to_string(),
            "Resolution Error: Unknown module 'b' (a -> b)"
        );
    }

    #[test]
    fn factory_errors_keep_their_source() {
        #[derive(Debug, thiserror::Error)]
        #[error("boom")]
        struct Boom;

        let err = LazymodError::from(anyhow::Error::new(Boom));
        assert_eq!(err.to_string(), "boom");
        assert!(err.factory_error().is_some_and(|e| e.is::<Boom>()));
    }

    #[test]
    fn nested_lazymod_errors_are_not_wrapped_twice() {
        let inner = LazymodError::from(anyhow::anyhow!("boom"));
        let outer = LazymodError::from(anyhow::Error::new(inner));
        assert!(outer.factory_error().is_some());
        assert_eq!(outer.to_string(), "boom");

        let missing = LazymodError::from(ResolutionError::new("later"));
        let passed = LazymodError::from(anyhow::Error::new(missing));
        assert!(passed.is_resolution());
    }

    #[test]
    fn alternate_display_does_not_repeat_the_resolution_message() {
        let err = LazymodError::from(ResolutionError::new("later"));
        let wrapped = anyhow::Error::new(err);
        assert_eq!(
            format!("{wrapped:#}"),
            "Resolution Error: Unknown module 'later' (later)"
        );
    }
}
