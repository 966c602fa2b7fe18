#![forbid(unsafe_code)]

//! Terminal session bookkeeping behind the tab UI.
//!
//! - [`registry`]: [`SessionRegistry`] owns terminal and X sessions created
//!   through a host [`SessionFactory`].
//! - [`client`]: [`SessionServiceClient`] routes session callbacks back to the
//!   registry.
//! - [`remover`]: tear down the session behind a closed tab.
//! - [`config`]: terminal preference defaults.
//! - [`shell`]: quote words for a shell command line.

pub mod client;
pub mod config;
pub mod error;
pub mod registry;
pub mod remover;
pub mod shell;

pub use client::SessionServiceClient;
pub use config::SessionDefaults;
pub use error::SessionError;
pub use registry::{
    ServiceAction, SessionFactory, SessionRegistry, SharedRegistry, ShellParameter,
    StatusSummary, TerminalSession,
};
pub use remover::{TermTab, XSessionTab};
pub use shell::{quote_command_line, quote_shell_word};
