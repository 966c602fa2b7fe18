#![forbid(unsafe_code)]

//! Display metrics and density conversion.
//!
//! The host platform owns the real display. It is exposed to this crate
//! through the [`DisplayHost`] trait; the free functions in this module read
//! from an injected host handle instead of reaching for global state.

use crate::condition::{IllegalArgument, ensure_at_least, ensure_true};

/// Density-independent size of the platform touch slop.
pub const TOUCH_SLOP_DP: f32 = 8.0;

/// Coarse screen size class reported by the host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ScreenSize {
    Small,
    #[default]
    Normal,
    Large,
    XLarge,
}

/// Device category derived from the screen size class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceType {
    Phone,
    Tablet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    Portrait,
    Landscape,
}

/// Pixel dimensions and density of a display.
///
/// # Invariants
///
/// - `density` is finite and strictly positive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayMetrics {
    width_px: u32,
    height_px: u32,
    density: f32,
    screen_size: ScreenSize,
}

impl DisplayMetrics {
    /// Create metrics, rejecting non-positive or non-finite densities.
    pub fn new(
        width_px: u32,
        height_px: u32,
        density: f32,
        screen_size: ScreenSize,
    ) -> Result<Self, IllegalArgument> {
        ensure_true(density.is_finite(), "The density must be finite")?;
        ensure_at_least(density, f32::MIN_POSITIVE, "The density must be greater than 0")?;
        Ok(Self {
            width_px,
            height_px,
            density,
            screen_size,
        })
    }

    #[must_use]
    pub const fn width_px(&self) -> u32 {
        self.width_px
    }

    #[must_use]
    pub const fn height_px(&self) -> u32 {
        self.height_px
    }

    #[must_use]
    pub const fn density(&self) -> f32 {
        self.density
    }

    #[must_use]
    pub const fn screen_size(&self) -> ScreenSize {
        self.screen_size
    }

    /// Convert density-independent pixels to physical pixels, rounding to nearest.
    #[must_use]
    pub fn dp_to_pixels(&self, dp: f32) -> i32 {
        (dp * self.density).round() as i32
    }

    /// Convert physical pixels to density-independent pixels.
    #[must_use]
    pub fn pixels_to_dp(&self, px: f32) -> f32 {
        px / self.density
    }

    /// The touch slop in physical pixels.
    #[must_use]
    pub fn touch_slop(&self) -> f32 {
        self.dp_to_pixels(TOUCH_SLOP_DP) as f32
    }

    /// `Tablet` for large and extra-large screens, `Phone` otherwise.
    #[must_use]
    pub fn device_type(&self) -> DeviceType {
        if self.screen_size >= ScreenSize::Large {
            DeviceType::Tablet
        } else {
            DeviceType::Phone
        }
    }

    /// `Landscape` when strictly wider than tall.
    #[must_use]
    pub fn orientation(&self) -> Orientation {
        if self.width_px > self.height_px {
            Orientation::Landscape
        } else {
            Orientation::Portrait
        }
    }
}

/// Host-context handle that knows the current display.
pub trait DisplayHost {
    fn display_metrics(&self) -> DisplayMetrics;
}

impl DisplayHost for DisplayMetrics {
    fn display_metrics(&self) -> DisplayMetrics {
        *self
    }
}

pub fn device_type(host: &impl DisplayHost) -> DeviceType {
    host.display_metrics().device_type()
}

pub fn orientation(host: &impl DisplayHost) -> Orientation {
    host.display_metrics().orientation()
}

pub fn display_width(host: &impl DisplayHost) -> u32 {
    host.display_metrics().width_px()
}

pub fn display_height(host: &impl DisplayHost) -> u32 {
    host.display_metrics().height_px()
}

pub fn dp_to_pixels(host: &impl DisplayHost, dp: f32) -> i32 {
    host.display_metrics().dp_to_pixels(dp)
}
