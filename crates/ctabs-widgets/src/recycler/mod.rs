#![forbid(unsafe_code)]

//! View recycling.
//!
//! A [`ViewRecycler`] maps each item to at most one live view. Views are
//! built on demand through a [`ViewAdapter`], reused while the item stays
//! active, and handed back to the adapter on removal.
//!
//! ```text
//! inflate(item) ──▶ active? ──yes──▶ on_show_view(inflated = false)
//!                     │ no
//!                     ▼
//!                 adapter? ──no──▶ Ok(None)
//!                     │ yes
//!                     ▼
//!               on_inflate_view ──▶ record ──▶ on_show_view(inflated = true)
//! ```
//!
//! # Invariants
//!
//! 1. An item maps to at most one view; a second `inflate` of an active item
//!    returns the same view with `inflated == false`.
//! 2. `remove` of an inactive item fires no notification.
//! 3. `remove_all` fires exactly one `on_remove_view` per active item and
//!    leaves the mapping empty.
//! 4. Replacing the adapter does not touch views that are already active.
//!
//! # Failure Modes
//!
//! - No adapter: `inflate` of an inactive item returns `Ok(None)`.
//! - `on_inflate_view` fails: the error is returned, nothing is recorded.
//! - `on_show_view` fails: the error is returned, the view stays recorded.
//!
//! All operations belong to the UI context; the recycler is not `Sync`.

pub mod attached;

use std::fmt;
use std::hash::Hash;

use ahash::AHashMap;

use crate::saved_state::Bundle;

pub use attached::{AttachedViewRecycler, Comparator, ViewContainer};

/// Strategy that builds, refreshes, and disposes views for items.
pub trait ViewAdapter {
    /// Identity of a logical thing needing a view.
    type Item: Eq + Hash + Clone + fmt::Debug;
    /// Handle to a live view.
    type View: Clone;
    /// Per-call parameter bundle.
    type Params;
    /// Structural parent a view is inflated into.
    type Container;
    /// Host context handed to `on_show_view`.
    type Context;
    type Error;

    /// Build a view for `item`. `index` is the position the view will take.
    fn on_inflate_view(
        &self,
        container: Option<&Self::Container>,
        item: &Self::Item,
        index: usize,
        params: &Self::Params,
    ) -> Result<Self::View, Self::Error>;

    /// Refresh `view` for `item`; `inflated` is true right after creation.
    fn on_show_view(
        &self,
        context: &Self::Context,
        view: &Self::View,
        item: &Self::Item,
        inflated: bool,
        params: &Self::Params,
    ) -> Result<(), Self::Error>;

    fn on_remove_view(&self, _view: &Self::View) {}

    fn on_save_instance_state(&self, _view: &Self::View, _item: &Self::Item) -> Option<Bundle> {
        None
    }

    fn on_restore_instance_state(&self, _view: &Self::View, _item: &Self::Item, _state: &Bundle) {
    }
}

/// Outcome of an `inflate` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inflation<V> {
    pub view: V,
    /// Whether the view was created by this call.
    pub inflated: bool,
}

/// Maps items to live views.
pub struct ViewRecycler<A: ViewAdapter> {
    context: A::Context,
    adapter: Option<A>,
    active: AHashMap<A::Item, A::View>,
}

impl<A: ViewAdapter> ViewRecycler<A> {
    #[must_use]
    pub fn new(context: A::Context) -> Self {
        Self {
            context,
            adapter: None,
            active: AHashMap::new(),
        }
    }

    #[must_use]
    pub fn with_adapter(context: A::Context, adapter: A) -> Self {
        Self {
            adapter: Some(adapter),
            ..Self::new(context)
        }
    }

    /// Replace the adapter, returning the previous one.
    pub fn set_adapter(&mut self, adapter: Option<A>) -> Option<A> {
        std::mem::replace(&mut self.adapter, adapter)
    }

    #[must_use]
    pub fn adapter(&self) -> Option<&A> {
        self.adapter.as_ref()
    }

    #[must_use]
    pub fn context(&self) -> &A::Context {
        &self.context
    }

    /// Return the view for `item`, creating it when inactive.
    ///
    /// New views are offered the next free position as their index.
    pub fn inflate(
        &mut self,
        item: &A::Item,
        container: Option<&A::Container>,
        params: &A::Params,
    ) -> Result<Option<Inflation<A::View>>, A::Error> {
        let index = self.active.len();
        let Some(inflation) = self.obtain(item, container, index, params)? else {
            return Ok(None);
        };
        self.show(item, &inflation, params)?;
        Ok(Some(inflation))
    }

    /// [`ViewRecycler::inflate`] without a container.
    pub fn inflate_detached(
        &mut self,
        item: &A::Item,
        params: &A::Params,
    ) -> Result<Option<Inflation<A::View>>, A::Error> {
        self.inflate(item, None, params)
    }

    /// Look up or build the view without notifying `on_show_view`.
    pub(crate) fn obtain(
        &mut self,
        item: &A::Item,
        container: Option<&A::Container>,
        index: usize,
        params: &A::Params,
    ) -> Result<Option<Inflation<A::View>>, A::Error> {
        if let Some(view) = self.active.get(item) {
            return Ok(Some(Inflation {
                view: view.clone(),
                inflated: false,
            }));
        }
        let Some(adapter) = &self.adapter else {
            tracing::trace!(item = ?item, "no adapter set; nothing inflated");
            return Ok(None);
        };
        let view = adapter.on_inflate_view(container, item, index, params)?;
        self.active.insert(item.clone(), view.clone());
        tracing::trace!(item = ?item, index, active = self.active.len(), "view inflated");
        Ok(Some(Inflation {
            view,
            inflated: true,
        }))
    }

    pub(crate) fn show(
        &self,
        item: &A::Item,
        inflation: &Inflation<A::View>,
        params: &A::Params,
    ) -> Result<(), A::Error> {
        match &self.adapter {
            Some(adapter) => {
                adapter.on_show_view(&self.context, &inflation.view, item, inflation.inflated, params)
            }
            None => Ok(()),
        }
    }

    #[must_use]
    pub fn get_view(&self, item: &A::Item) -> Option<&A::View> {
        self.active.get(item)
    }

    #[must_use]
    pub fn is_active(&self, item: &A::Item) -> bool {
        self.active.contains_key(item)
    }

    #[must_use]
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Active items in no particular order.
    pub fn active_items(&self) -> impl Iterator<Item = &A::Item> {
        self.active.keys()
    }

    /// Drop the view of `item`, notifying the adapter. No-op when inactive.
    pub fn remove(&mut self, item: &A::Item) -> Option<A::View> {
        let view = self.active.remove(item)?;
        if let Some(adapter) = &self.adapter {
            adapter.on_remove_view(&view);
        }
        tracing::trace!(item = ?item, active = self.active.len(), "view removed");
        Some(view)
    }

    /// Drop every active view.
    pub fn remove_all(&mut self) {
        self.take_all();
    }

    /// Empty the mapping, then notify the adapter once per drained view.
    pub(crate) fn take_all(&mut self) -> Vec<(A::Item, A::View)> {
        let drained: Vec<_> = self.active.drain().collect();
        if let Some(adapter) = &self.adapter {
            for (_, view) in &drained {
                adapter.on_remove_view(view);
            }
        }
        tracing::trace!(removed = drained.len(), "all views removed");
        drained
    }

    /// Ask the adapter to save the state of `item`'s view.
    pub fn save_instance_state(&self, item: &A::Item) -> Option<Bundle> {
        let adapter = self.adapter.as_ref()?;
        let view = self.active.get(item)?;
        adapter.on_save_instance_state(view, item)
    }

    /// Hand `state` to the adapter for `item`'s view.
    ///
    /// Returns `false` when there is no adapter or the item is inactive.
    pub fn restore_instance_state(&self, item: &A::Item, state: &Bundle) -> bool {
        match (&self.adapter, self.active.get(item)) {
            (Some(adapter), Some(view)) => {
                adapter.on_restore_instance_state(view, item, state);
                true
            }
            _ => false,
        }
    }
}

impl<A: ViewAdapter> fmt::Debug for ViewRecycler<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewRecycler")
            .field("has_adapter", &self.adapter.is_some())
            .field("active", &self.active.len())
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Shared handle standing in for a host view.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct TestView(pub Rc<str>);

    impl TestView {
        pub fn name(&self) -> &str {
            &self.0
        }
    }

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Event {
        Inflate { item: u32, index: usize, container: Option<String> },
        Show { item: u32, inflated: bool },
        Remove(String),
        Restore(u32, Option<String>),
    }

    /// Records every callback; fails inflation for item 13.
    #[derive(Debug, Default)]
    pub struct RecordingAdapter {
        pub events: RefCell<Vec<Event>>,
    }

    impl RecordingAdapter {
        pub fn events(&self) -> Vec<Event> {
            self.events.borrow().clone()
        }

        pub fn clear(&self) {
            self.events.borrow_mut().clear();
        }
    }

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct Unlucky;

    impl ViewAdapter for RecordingAdapter {
        type Item = u32;
        type View = TestView;
        type Params = &'static str;
        type Container = String;
        type Context = ();
        type Error = Unlucky;

        fn on_inflate_view(
            &self,
            container: Option<&String>,
            item: &u32,
            index: usize,
            params: &&'static str,
        ) -> Result<TestView, Unlucky> {
            if *item == 13 {
                return Err(Unlucky);
            }
            self.events.borrow_mut().push(Event::Inflate {
                item: *item,
                index,
                container: container.cloned(),
            });
            Ok(TestView(format!("{params}-{item}").into()))
        }

        fn on_show_view(
            &self,
            _: &(),
            _: &TestView,
            item: &u32,
            inflated: bool,
            _: &&'static str,
        ) -> Result<(), Unlucky> {
            self.events.borrow_mut().push(Event::Show {
                item: *item,
                inflated,
            });
            Ok(())
        }

        fn on_remove_view(&self, view: &TestView) {
            self.events
                .borrow_mut()
                .push(Event::Remove(view.name().to_owned()));
        }

        fn on_save_instance_state(&self, view: &TestView, item: &u32) -> Option<Bundle> {
            let mut bundle = Bundle::new();
            bundle.put("view", view.name()).ok()?;
            bundle.put("item", item).ok()?;
            Some(bundle)
        }

        fn on_restore_instance_state(&self, _: &TestView, item: &u32, state: &Bundle) {
            let view = state.get::<String>("view").ok().flatten();
            self.events.borrow_mut().push(Event::Restore(*item, view));
        }
    }
}
