#![forbid(unsafe_code)]

//! Null-tolerant helpers over host views.
//!
//! Host views are reached through the [`ViewNode`] trait. Every helper that
//! takes an `Option` treats `None` as a no-op (or a zero measurement), so call
//! sites holding a possibly-absent view need no guard.

/// Visibility of a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Visible,
    /// Hidden but still takes up layout space.
    Invisible,
    /// Hidden and takes no layout space.
    Gone,
}

/// Margins in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Margins {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Margins {
    #[must_use]
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    #[must_use]
    pub const fn uniform(value: i32) -> Self {
        Self::new(value, value, value, value)
    }
}

/// Operations a host view exposes to these helpers.
pub trait ViewNode {
    fn set_visibility(&self, visibility: Visibility);

    fn set_enabled(&self, enabled: bool);

    /// `alpha` is already clamped to `0.0..=1.0`.
    fn set_alpha(&self, alpha: f32);

    fn measured_width(&self) -> i32;

    fn measured_height(&self) -> i32;

    /// Apply margins. Returns `false` when the view's layout does not support them.
    fn set_margins(&self, margins: Margins) -> bool;

    /// Detach from the structural parent. Returns `false` when there was none.
    fn detach_from_parent(&self) -> bool;
}

/// Show the view, or hide it without reserving space.
pub fn set_visible<V: ViewNode + ?Sized>(view: Option<&V>, visible: bool) {
    if let Some(view) = view {
        view.set_visibility(if visible {
            Visibility::Visible
        } else {
            Visibility::Gone
        });
    }
}

pub fn set_enabled<V: ViewNode + ?Sized>(view: Option<&V>, enabled: bool) {
    if let Some(view) = view {
        view.set_enabled(enabled);
    }
}

/// Set opacity; non-finite values are ignored.
pub fn set_alpha<V: ViewNode + ?Sized>(view: Option<&V>, alpha: f32) {
    if let Some(view) = view {
        if alpha.is_finite() {
            view.set_alpha(alpha.clamp(0.0, 1.0));
        }
    }
}

/// Detach the view from its parent, if both exist.
pub fn remove_from_parent<V: ViewNode + ?Sized>(view: Option<&V>) -> bool {
    view.is_some_and(|view| view.detach_from_parent())
}

/// Measured width, or 0 for an absent view.
pub fn measured_width<V: ViewNode + ?Sized>(view: Option<&V>) -> i32 {
    view.map_or(0, |view| view.measured_width())
}

/// Measured height, or 0 for an absent view.
pub fn measured_height<V: ViewNode + ?Sized>(view: Option<&V>) -> i32 {
    view.map_or(0, |view| view.measured_height())
}

pub fn set_margins<V: ViewNode + ?Sized>(view: &V, margins: Margins) -> bool {
    let applied = view.set_margins(margins);
    if !applied {
        tracing::trace!("view layout does not support margins");
    }
    applied
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    #[derive(Default)]
    struct FakeView {
        visibility: Cell<Visibility>,
        enabled: Cell<bool>,
        alpha: Cell<f32>,
        margins: RefCell<Option<Margins>>,
        supports_margins: bool,
        attached: Cell<bool>,
    }

    impl ViewNode for FakeView {
        fn set_visibility(&self, visibility: Visibility) {
            self.visibility.set(visibility);
        }

        fn set_enabled(&self, enabled: bool) {
            self.enabled.set(enabled);
        }

        fn set_alpha(&self, alpha: f32) {
            self.alpha.set(alpha);
        }

        fn measured_width(&self) -> i32 {
            120
        }

        fn measured_height(&self) -> i32 {
            48
        }

        fn set_margins(&self, margins: Margins) -> bool {
            if self.supports_margins {
                *self.margins.borrow_mut() = Some(margins);
            }
            self.supports_margins
        }

        fn detach_from_parent(&self) -> bool {
            self.attached.replace(false)
        }
    }

    #[test]
    fn absent_view_is_tolerated() {
        let none: Option<&FakeView> = None;
        set_visible(none, true);
        set_enabled(none, true);
        set_alpha(none, 0.5);
        assert!(!remove_from_parent(none));
        assert_eq!(measured_width(none), 0);
        assert_eq!(measured_height(none), 0);
    }

    #[test]
    fn visibility_maps_hidden_to_gone() {
        let view = FakeView::default();
        set_visible(Some(&view), false);
        assert_eq!(view.visibility.get(), Visibility::Gone);
        set_visible(Some(&view), true);
        assert_eq!(view.visibility.get(), Visibility::Visible);
    }

    #[test]
    fn alpha_is_clamped() {
        let view = FakeView::default();
        set_alpha(Some(&view), 1.7);
        assert_eq!(view.alpha.get(), 1.0);
        set_alpha(Some(&view), -0.2);
        assert_eq!(view.alpha.get(), 0.0);
        set_alpha(Some(&view), f32::NAN);
        assert_eq!(view.alpha.get(), 0.0);
    }

    #[test]
    fn measurements_and_enabled() {
        let view = FakeView::default();
        set_enabled(Some(&view), true);
        assert!(view.enabled.get());
        assert_eq!(measured_width(Some(&view)), 120);
        assert_eq!(measured_height(Some(&view)), 48);
    }

    #[test]
    fn remove_from_parent_once() {
        let view = FakeView {
            attached: Cell::new(true),
            ..FakeView::default()
        };
        assert!(remove_from_parent(Some(&view)));
        assert!(!remove_from_parent(Some(&view)));
    }

    #[test]
    fn margins_need_support() {
        let plain = FakeView::default();
        assert!(!set_margins(&plain, Margins::uniform(4)));
        assert_eq!(*plain.margins.borrow(), None);

        let margined = FakeView {
            supports_margins: true,
            ..FakeView::default()
        };
        assert!(set_margins(&margined, Margins::new(1, 2, 3, 4)));
        assert_eq!(*margined.margins.borrow(), Some(Margins::new(1, 2, 3, 4)));
    }
}
