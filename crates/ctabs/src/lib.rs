#![forbid(unsafe_code)]

//! Chrome-style tab utilities.
//!
//! This crate re-exports the workspace crates under short names and offers a
//! [`prelude`] with the types most applications touch:
//!
//! - [`core`]: preconditions, logging, drag gestures, display metrics
//! - [`style`]: themes and colors
//! - [`widgets`]: view recycling, view holders, sorted lists, saved state
//! - [`runtime`]: executors, the bounded cache, and the data binder
//!   (feature `runtime`)
//! - [`session`]: terminal session registry (feature `session`)

pub use ctabs_core as core;
#[cfg(feature = "runtime")]
pub use ctabs_runtime as runtime;
#[cfg(feature = "session")]
pub use ctabs_session as session;
pub use ctabs_style as style;
pub use ctabs_widgets as widgets;

pub use ctabs_core::IllegalArgument;

/// Commonly used types.
pub mod prelude {
    pub use ctabs_core::{
        DeviceType, DisplayHost, DisplayMetrics, DragHelper, IllegalArgument, LogLevel, Logger,
        Orientation, ScreenSize,
    };
    pub use ctabs_style::{Color, Theme, ThemeError, ThemeValue};
    pub use ctabs_widgets::{
        AttachedViewRecycler, Bundle, ComparatorBuilder, Inflation, SavedState, SortedList,
        StateContext, StateError, ViewAdapter, ViewContainer, ViewHolderAdapter, ViewModel,
        ViewNode, ViewRecycler, Visibility,
    };

    #[cfg(feature = "runtime")]
    pub use ctabs_runtime::{
        BinderConfig, BinderListener, BoundedCache, DataBinder, DataLoader, Executor,
        InlineExecutor, QueueExecutor, ThreadPoolExecutor,
    };

    #[cfg(feature = "session")]
    pub use ctabs_session::{
        SessionDefaults, SessionError, SessionFactory, SessionRegistry, SessionServiceClient,
        ShellParameter, TerminalSession,
    };
}
