#![forbid(unsafe_code)]

//! Core primitives shared by the chrome-style tab crates.
//!
//! - [`condition`]: precondition checks returning [`IllegalArgument`].
//! - [`logging`]: level-gated [`Logger`] emitting `tracing` events.
//! - [`gesture`]: drag threshold detection for tab swiping.
//! - [`display`]: display metrics and density conversion over an injected host.

pub mod condition;
pub mod display;
pub mod gesture;
pub mod logging;

pub use condition::IllegalArgument;
pub use display::{DeviceType, DisplayHost, DisplayMetrics, Orientation, ScreenSize};
pub use gesture::DragHelper;
pub use logging::{LogLevel, Logger, error_report};
