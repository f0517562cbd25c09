//! Teardown actions.
//!
//! A Teardown is the zero-argument action a subscribe procedure returns to
//! release whatever resources it acquired — typically the producer's
//! underlying timer registration. The runtime stores it in the safety
//! wrapper's teardown slot and removes it from the slot before running it,
//! so a teardown can never execute twice no matter how many times
//! cancellation is requested or from where.

/// A one-shot resource-release action returned by a subscribe procedure.
///
/// Constructed with [`Teardown::new`], or [`Teardown::noop`] for work that
/// is already finished and has nothing to release.
pub struct Teardown {
    action: Option<Box<dyn FnOnce() + Send>>,
}

impl Teardown {
    /// Create a teardown that runs the given action.
    pub fn new<F>(action: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            action: Some(Box::new(action)),
        }
    }

    /// Create a teardown with nothing to release.
    pub fn noop() -> Self {
        Self { action: None }
    }

    /// Run the teardown action, consuming it.
    pub(crate) fn run(mut self) {
        if let Some(action) = self.action.take() {
            action();
        }
    }
}

impl std::fmt::Debug for Teardown {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Teardown")
            .field("noop", &self.action.is_none())
            .finish()
    }
}
