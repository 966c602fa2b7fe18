#![forbid(unsafe_code)]

//! Theme types for chrome-style tabs.
//!
//! This crate provides:
//! - [`Color`] packed ARGB values
//! - [`Theme`] attribute maps with parent fallback, and free functions that
//!   resolve attributes to colors, pixel sizes, flags, and text

pub mod color;
pub mod theme;

pub use color::Color;
pub use theme::{AttrId, DimensionUnit, ResourceId, Theme, ThemeError, ThemeValue};
