//! Gesture detection helpers.

pub mod drag;

pub use drag::DragHelper;
