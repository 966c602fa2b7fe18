#![forbid(unsafe_code)]

//! Tear down the session behind a closed tab.
//!
//! Both entry points accept an absent registry (the service may already be
//! unbound) and tabs without a session; whatever is missing is skipped.

use std::sync::Arc;

use crate::registry::{SessionFactory, SessionRegistry, TerminalSession};

/// A tab hosting a terminal session.
pub trait TermTab<S> {
    fn term_session(&self) -> Option<&Arc<S>>;

    /// Release the tab's own resources once its session is gone.
    fn cleanup(&mut self);
}

/// A tab hosting an X session.
pub trait XSessionTab<X> {
    fn x_session(&self) -> Option<&Arc<X>>;
}

/// Finish the tab's session, unregister it and clean the tab up.
///
/// Returns the index the session had in the registry, if it was registered.
pub fn remove_session<F, T>(registry: Option<&mut SessionRegistry<F>>, tab: &mut T) -> Option<usize>
where
    F: SessionFactory,
    T: TermTab<F::Session> + ?Sized,
{
    let removed = tab.term_session().and_then(|session| {
        session.finish_if_running();
        registry?.remove_term_session(session.handle())
    });
    tab.cleanup();
    removed
}

/// Unregister the tab's X session.
pub fn remove_x_session<F, T>(registry: Option<&mut SessionRegistry<F>>, tab: Option<&T>) -> Option<usize>
where
    F: SessionFactory,
    T: XSessionTab<F::XSession> + ?Sized,
{
    let session = tab?.x_session()?;
    registry?.remove_x_session(session)
}
