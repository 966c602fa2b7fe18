#![forbid(unsafe_code)]

//! Drag threshold tracking for swipe gestures.
//!
//! [`DragHelper`] answers one question: has the pointer moved far enough
//! from where it started to count as a drag? It offers two independent
//! tracking paths:
//!
//! - [`DragHelper::update`] follows a 2-D pointer and exposes per-axis deltas
//!   and the Euclidean distance.
//! - [`DragHelper::update_position`] follows a single axis (the tab strip's
//!   scroll axis) and exposes a signed drag distance.
//!
//! The paths do not share state. Feeding both in the same gesture is allowed
//! but each reports only what it was fed.
//!
//! # Invariants
//!
//! 1. The threshold is latched: once reached, it stays reached until
//!    [`DragHelper::reset`].
//! 2. The first update after construction or reset defines the start point.
//! 3. Before the single-axis threshold is reached, `drag_distance()` is 0.

use crate::condition::{IllegalArgument, ensure_at_least, ensure_true};
use crate::display::DisplayMetrics;

/// Tracks pointer movement against a distance threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct DragHelper {
    threshold: f32,
    start: Option<(f32, f32)>,
    delta_x: f32,
    delta_y: f32,
    dragging: bool,
    drag_start_position: Option<f32>,
    drag_distance: f32,
    position_threshold_reached: bool,
}

impl DragHelper {
    /// Create a helper with a threshold in pixels.
    pub fn new(threshold: f32) -> Result<Self, IllegalArgument> {
        ensure_true(threshold.is_finite(), "The threshold must be finite")?;
        let threshold = ensure_at_least(threshold, 0.0, "The threshold must be at least 0")?;
        Ok(Self::with_threshold(threshold))
    }

    /// Create a helper using the platform touch slop for `metrics`.
    #[must_use]
    pub fn from_metrics(metrics: &DisplayMetrics) -> Self {
        Self::with_threshold(metrics.touch_slop())
    }

    fn with_threshold(threshold: f32) -> Self {
        Self {
            threshold,
            start: None,
            delta_x: 0.0,
            delta_y: 0.0,
            dragging: false,
            drag_start_position: None,
            drag_distance: 0.0,
            position_threshold_reached: false,
        }
    }

    #[must_use]
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Forget the current gesture on both tracking paths.
    pub fn reset(&mut self) {
        self.start = None;
        self.delta_x = 0.0;
        self.delta_y = 0.0;
        self.dragging = false;
        self.drag_start_position = None;
        self.drag_distance = 0.0;
        self.position_threshold_reached = false;
    }

    /// Whether no update has been fed since construction or the last reset.
    #[must_use]
    pub fn is_reset(&self) -> bool {
        self.start.is_none() && self.drag_start_position.is_none()
    }

    /// Feed a 2-D pointer position.
    pub fn update(&mut self, x: f32, y: f32) {
        let (start_x, start_y) = *self.start.get_or_insert((x, y));
        self.delta_x = x - start_x;
        self.delta_y = y - start_y;

        if !self.dragging {
            self.dragging = self.distance() > self.threshold;
        }
    }

    /// Feed a position along the drag axis.
    pub fn update_position(&mut self, position: f32) {
        let start = *self.drag_start_position.get_or_insert(position);
        let distance = position - start;

        if !self.position_threshold_reached && distance.abs() > self.threshold {
            self.position_threshold_reached = true;
        }

        if self.position_threshold_reached {
            self.drag_distance = distance;
        }
    }

    /// Whether either tracking path has exceeded the threshold.
    #[must_use]
    pub fn has_threshold_been_reached(&self) -> bool {
        self.dragging || self.position_threshold_reached
    }

    #[must_use]
    pub fn delta_x(&self) -> f32 {
        self.delta_x
    }

    #[must_use]
    pub fn delta_y(&self) -> f32 {
        self.delta_y
    }

    /// Start point of the 2-D path, if one was recorded.
    #[must_use]
    pub fn start(&self) -> Option<(f32, f32)> {
        self.start
    }

    /// Euclidean length of the current 2-D delta.
    #[must_use]
    pub fn distance(&self) -> f32 {
        (self.delta_x * self.delta_x + self.delta_y * self.delta_y).sqrt()
    }

    /// Start position of the single-axis path, if one was recorded.
    #[must_use]
    pub fn drag_start_position(&self) -> Option<f32> {
        self.drag_start_position
    }

    /// Signed single-axis distance once the threshold was reached, else 0.
    #[must_use]
    pub fn drag_distance(&self) -> f32 {
        self.drag_distance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::ScreenSize;
    use proptest::prelude::*;

    #[test]
    fn negative_threshold_is_rejected() {
        assert!(DragHelper::new(-1.0).is_err());
        assert!(DragHelper::new(f32::NAN).is_err());
    }

    #[test]
    fn from_metrics_uses_touch_slop() {
        let metrics = DisplayMetrics::new(1080, 1920, 2.0, ScreenSize::Normal).unwrap();
        assert_eq!(DragHelper::from_metrics(&metrics).threshold(), 16.0);
    }

    #[test]
    fn first_update_records_start_even_at_origin() {
        let mut drag = DragHelper::new(5.0).unwrap();
        assert!(drag.is_reset());
        drag.update(0.0, 0.0);
        assert_eq!(drag.start(), Some((0.0, 0.0)));
        drag.update(3.0, 4.0);
        assert_eq!(drag.start(), Some((0.0, 0.0)));
        assert_eq!(drag.delta_x(), 3.0);
        assert_eq!(drag.delta_y(), 4.0);
        assert_eq!(drag.distance(), 5.0);
        // exactly at the threshold is not past it
        assert!(!drag.has_threshold_been_reached());
    }

    #[test]
    fn threshold_latches_until_reset() {
        let mut drag = DragHelper::new(5.0).unwrap();
        drag.update(10.0, 10.0);
        drag.update(20.0, 10.0);
        assert!(drag.has_threshold_been_reached());

        drag.update(10.0, 10.0);
        assert_eq!(drag.distance(), 0.0);
        assert!(drag.has_threshold_been_reached());

        drag.reset();
        assert!(drag.is_reset());
        assert!(!drag.has_threshold_been_reached());
        assert_eq!(drag.distance(), 0.0);
    }

    #[test]
    fn single_axis_distance_stays_zero_below_threshold() {
        let mut drag = DragHelper::new(10.0).unwrap();
        drag.update_position(100.0);
        drag.update_position(108.0);
        assert_eq!(drag.drag_distance(), 0.0);
        assert!(!drag.has_threshold_been_reached());

        drag.update_position(85.0);
        assert!(drag.has_threshold_been_reached());
        assert_eq!(drag.drag_distance(), -15.0);

        drag.update_position(102.0);
        assert_eq!(drag.drag_distance(), 2.0);
    }

    #[test]
    fn paths_keep_separate_state() {
        let mut drag = DragHelper::new(1.0).unwrap();
        drag.update_position(50.0);
        drag.update_position(60.0);
        assert_eq!(drag.drag_distance(), 10.0);
        assert_eq!(drag.delta_x(), 0.0);
        assert_eq!(drag.start(), None);
    }

    proptest! {
        #[test]
        fn deltas_are_relative_to_first_point(
            x0 in -1000.0f32..1000.0,
            y0 in -1000.0f32..1000.0,
            x1 in -1000.0f32..1000.0,
            y1 in -1000.0f32..1000.0,
        ) {
            let mut drag = DragHelper::new(0.0).unwrap();
            drag.update(x0, y0);
            drag.update(x1, y1);
            prop_assert_eq!(drag.delta_x(), x1 - x0);
            prop_assert_eq!(drag.delta_y(), y1 - y0);
            prop_assert_eq!(drag.has_threshold_been_reached(), drag.distance() > 0.0);
        }
    }
}
