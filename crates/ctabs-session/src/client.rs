#![forbid(unsafe_code)]

//! Session callbacks that need the registry.

use std::fmt;
use std::sync::{Arc, MutexGuard, PoisonError};

use crate::registry::{SessionFactory, SessionRegistry, SharedRegistry, TerminalSession};

/// Client handed to terminal sessions so they can report back to the service.
pub struct SessionServiceClient<F: SessionFactory> {
    registry: SharedRegistry<F>,
}

impl<F: SessionFactory> SessionServiceClient<F> {
    #[must_use]
    pub fn new(registry: SharedRegistry<F>) -> Self {
        Self { registry }
    }

    /// Lock the registry. A poisoned lock is recovered.
    pub fn registry(&self) -> MutexGuard<'_, SessionRegistry<F>> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record the shell pid on the registered session with `handle`.
    ///
    /// Returns `false` when the session is no longer registered.
    pub fn set_terminal_shell_pid(&self, handle: &str, pid: i32) -> bool {
        let registry = self.registry();
        match registry.find_session(handle) {
            Some(session) => {
                session.set_shell_pid(pid);
                tracing::trace!(handle, pid, "shell pid recorded");
                true
            }
            None => {
                tracing::debug!(handle, pid, "pid reported for unknown session");
                false
            }
        }
    }
}

impl<F: SessionFactory> Clone for SessionServiceClient<F> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
        }
    }
}

impl<F: SessionFactory> fmt::Debug for SessionServiceClient<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionServiceClient").finish_non_exhaustive()
    }
}
