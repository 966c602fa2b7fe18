#![forbid(unsafe_code)]

//! Registry of live terminal and X sessions.
//!
//! [`SessionRegistry`] is the state behind the long-running terminal
//! service: it creates sessions through a host [`SessionFactory`], keeps them
//! in creation order, tracks the wake lock, and publishes a
//! [`StatusSummary`] whenever any of that changes.
//!
//! # Invariants
//!
//! 1. Sessions are listed in creation order. Removal shifts later sessions
//!    down by one, so the index returned by a removal is only meaningful until
//!    the next mutation.
//! 2. Finding a session by id never creates one. An unknown id leaves the
//!    registry untouched.
//! 3. The status is republished after every session creation, reuse and
//!    removal, and after every lock transition. Failed lookups, removals of
//!    unknown sessions and redundant lock requests publish nothing.
//!
//! # Failure Modes
//!
//! | Request | Outcome |
//! |---------|---------|
//! | empty session id | [`SessionError::Argument`] |
//! | unknown session id | [`SessionError::NotFound`] |
//! | remove unknown session | `None`, no status update |
//! | acquire held lock / release free lock | no-op |

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use ctabs_core::IllegalArgument;
use ctabs_core::condition::ensure_not_empty;

use crate::error::SessionError;

/// A terminal session owned by the host.
///
/// Methods take `&self`; hosts keep their mutable state behind their own
/// synchronization.
pub trait TerminalSession {
    /// Stable identifier of the session.
    fn handle(&self) -> &str;

    /// Terminate the shell if it is still running.
    fn finish_if_running(&self);

    /// Send `data` to the shell's input.
    fn write(&self, data: &str);

    /// Record the process id of the shell once it has been spawned.
    fn set_shell_pid(&self, pid: i32);

    fn is_running(&self) -> bool;
}

/// Host hooks used by the registry.
pub trait SessionFactory {
    type Session: TerminalSession;
    type XSession;
    type XParameter;

    fn create_session(&self, parameter: &ShellParameter) -> Self::Session;

    fn create_x_session(&self, parameter: &Self::XParameter) -> Self::XSession;

    /// Hold the CPU and network awake while sessions run in the background.
    fn acquire_wake_lock(&self) {}

    fn release_wake_lock(&self) {}

    /// Show the current status, e.g. in an ongoing notification.
    fn publish_status(&self, _status: &StatusSummary) {}
}

/// Request to open a terminal session.
///
/// Without a session id a new session is created; with one, the existing
/// session is reused and receives the initial command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShellParameter {
    pub session_id: Option<String>,
    pub initial_command: Option<String>,
    pub executable: Option<String>,
    pub arguments: Vec<String>,
    pub cwd: Option<String>,
    pub env: Vec<(String, String)>,
}

impl ShellParameter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_session_id(mut self, id: impl Into<String>) -> Self {
        self.session_id = Some(id.into());
        self
    }

    #[must_use]
    pub fn with_initial_command(mut self, command: impl Into<String>) -> Self {
        self.initial_command = Some(command.into());
        self
    }

    #[must_use]
    pub fn with_executable(mut self, executable: impl Into<String>) -> Self {
        self.executable = Some(executable.into());
        self
    }

    #[must_use]
    pub fn with_arguments<I, S>(mut self, arguments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.arguments = arguments.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_cwd(mut self, cwd: impl Into<String>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    #[must_use]
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Whether opening this parameter creates a session instead of reusing one.
    #[must_use]
    pub fn will_create_new_session(&self) -> bool {
        self.session_id.is_none()
    }
}

/// Snapshot published to the host after every change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusSummary {
    pub sessions: usize,
    pub x_sessions: usize,
    pub lock_acquired: bool,
}

impl fmt::Display for StatusSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} sessions, {} X sessions",
            self.sessions, self.x_sessions
        )?;
        if self.lock_acquired {
            f.write_str(" (wake lock held)")?;
        }
        Ok(())
    }
}

/// Commands delivered to the service from outside, e.g. notification buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceAction {
    Stop,
    AcquireLock,
    ReleaseLock,
}

impl ServiceAction {
    pub const STOP: &'static str = "com.thertxnetwork.andrinux.action.service.stop";
    pub const ACQUIRE_LOCK: &'static str = "com.thertxnetwork.andrinux.action.service.lock.acquire";
    pub const RELEASE_LOCK: &'static str = "com.thertxnetwork.andrinux.action.service.lock.release";

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stop => Self::STOP,
            Self::AcquireLock => Self::ACQUIRE_LOCK,
            Self::ReleaseLock => Self::RELEASE_LOCK,
        }
    }

    /// The action that flips the wake lock from its current state.
    #[must_use]
    pub const fn toggle_lock(lock_acquired: bool) -> Self {
        if lock_acquired {
            Self::ReleaseLock
        } else {
            Self::AcquireLock
        }
    }
}

impl FromStr for ServiceAction {
    type Err = IllegalArgument;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            Self::STOP => Ok(Self::Stop),
            Self::ACQUIRE_LOCK => Ok(Self::AcquireLock),
            Self::RELEASE_LOCK => Ok(Self::ReleaseLock),
            other => Err(IllegalArgument::new(format!("unknown service action {other:?}"))),
        }
    }
}

impl fmt::Display for ServiceAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Registry shared between the service and its clients.
pub type SharedRegistry<F> = Arc<Mutex<SessionRegistry<F>>>;

/// Live sessions and the wake lock.
pub struct SessionRegistry<F: SessionFactory> {
    factory: F,
    sessions: Vec<Arc<F::Session>>,
    x_sessions: Vec<Arc<F::XSession>>,
    lock_acquired: bool,
}

impl<F: SessionFactory> SessionRegistry<F> {
    #[must_use]
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            sessions: Vec::new(),
            x_sessions: Vec::new(),
            lock_acquired: false,
        }
    }

    /// Wrap the registry for sharing with a [`SessionServiceClient`](crate::SessionServiceClient).
    #[must_use]
    pub fn into_shared(self) -> SharedRegistry<F> {
        Arc::new(Mutex::new(self))
    }

    #[must_use]
    pub fn factory(&self) -> &F {
        &self.factory
    }

    #[must_use]
    pub fn sessions(&self) -> &[Arc<F::Session>] {
        &self.sessions
    }

    #[must_use]
    pub fn x_sessions(&self) -> &[Arc<F::XSession>] {
        &self.x_sessions
    }

    #[must_use]
    pub fn find_session(&self, handle: &str) -> Option<&Arc<F::Session>> {
        self.sessions.iter().find(|session| session.handle() == handle)
    }

    #[must_use]
    pub fn is_lock_acquired(&self) -> bool {
        self.lock_acquired
    }

    #[must_use]
    pub fn status(&self) -> StatusSummary {
        StatusSummary {
            sessions: self.sessions.len(),
            x_sessions: self.x_sessions.len(),
            lock_acquired: self.lock_acquired,
        }
    }

    /// Create a session, or reuse the one named by `parameter.session_id`.
    ///
    /// A reused session is sent the initial command followed by a newline.
    pub fn create_term_session(
        &mut self,
        parameter: &ShellParameter,
    ) -> Result<Arc<F::Session>, SessionError> {
        let Some(id) = parameter.session_id.as_deref() else {
            tracing::debug!("creating new session");
            let session = Arc::new(self.factory.create_session(parameter));
            self.sessions.push(Arc::clone(&session));
            self.publish();
            return Ok(session);
        };

        let id = ensure_not_empty(id, "session id must not be empty")?;
        tracing::debug!(id, "finding session by id");
        let session = self
            .find_session(id)
            .cloned()
            .ok_or_else(|| SessionError::NotFound {
                handle: id.to_owned(),
            })?;
        if let Some(command) = &parameter.initial_command {
            session.write(&format!("{command}\n"));
        }
        self.publish();
        Ok(session)
    }

    /// Forget the session with `handle`. Returns the index it had.
    pub fn remove_term_session(&mut self, handle: &str) -> Option<usize> {
        let index = self
            .sessions
            .iter()
            .position(|session| session.handle() == handle)?;
        self.sessions.remove(index);
        tracing::debug!(handle, index, "session removed");
        self.publish();
        Some(index)
    }

    pub fn create_x_session(&mut self, parameter: &F::XParameter) -> Arc<F::XSession> {
        let session = Arc::new(self.factory.create_x_session(parameter));
        self.x_sessions.push(Arc::clone(&session));
        tracing::debug!(count = self.x_sessions.len(), "X session created");
        self.publish();
        session
    }

    /// Forget `session`, matched by identity. Returns the index it had.
    pub fn remove_x_session(&mut self, session: &Arc<F::XSession>) -> Option<usize> {
        let index = self
            .x_sessions
            .iter()
            .position(|existing| Arc::ptr_eq(existing, session))?;
        self.x_sessions.remove(index);
        tracing::debug!(index, "X session removed");
        self.publish();
        Some(index)
    }

    /// Finish every running session. Sessions stay registered until removed.
    pub fn stop_all(&self) {
        for session in &self.sessions {
            session.finish_if_running();
        }
        tracing::info!(count = self.sessions.len(), "all sessions stopped");
    }

    /// Finish and forget every terminal session, then drop the lock.
    pub fn shutdown(&mut self) {
        self.stop_all();
        let cleared = !self.sessions.is_empty();
        self.sessions.clear();
        if self.lock_acquired {
            self.release_lock();
        } else if cleared {
            self.publish();
        }
    }

    pub fn acquire_lock(&mut self) {
        if self.lock_acquired {
            return;
        }
        self.factory.acquire_wake_lock();
        self.lock_acquired = true;
        tracing::debug!("wake lock acquired");
        self.publish();
    }

    pub fn release_lock(&mut self) {
        if !self.lock_acquired {
            return;
        }
        self.factory.release_wake_lock();
        self.lock_acquired = false;
        tracing::debug!("wake lock released");
        self.publish();
    }

    /// Run an externally delivered action. `Stop` tears the service down
    /// with [`SessionRegistry::shutdown`].
    pub fn handle_action(&mut self, action: ServiceAction) {
        match action {
            ServiceAction::Stop => self.shutdown(),
            ServiceAction::AcquireLock => self.acquire_lock(),
            ServiceAction::ReleaseLock => self.release_lock(),
        }
    }

    fn publish(&self) {
        self.factory.publish_status(&self.status());
    }
}

impl<F: SessionFactory> fmt::Debug for SessionRegistry<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionRegistry")
            .field("sessions", &self.sessions.len())
            .field("x_sessions", &self.x_sessions.len())
            .field("lock_acquired", &self.lock_acquired)
            .finish()
    }
}
