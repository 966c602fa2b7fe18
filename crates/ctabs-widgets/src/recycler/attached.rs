#![forbid(unsafe_code)]

//! Recycler that also manages where views live.
//!
//! [`AttachedViewRecycler`] adds container bookkeeping to [`ViewRecycler`]:
//!
//! - Inflating without an explicit container uses the default container.
//! - New views are added to their container at an index derived from the
//!   optional comparator, so containers stay sorted.
//! - Removing an item detaches its view from the container it was added to.
//!
//! # Invariants
//!
//! 1. `items()` lists active items in structural order. With a comparator it
//!    is sorted; items comparing equal keep insertion order.
//! 2. Setting a comparator affects only later insertions. It never changes
//!    which view an item maps to.
//! 3. `count() == items().len()` at all times.

use std::cmp::Ordering;
use std::fmt;

use ahash::AHashMap;
use ctabs_core::{LogLevel, Logger};

use super::{Inflation, ViewAdapter, ViewRecycler};
use crate::saved_state::Bundle;

/// Orders items; used to compute insertion indices.
pub type Comparator<I> = Box<dyn Fn(&I, &I) -> Ordering>;

/// Structural parent that can hold views.
pub trait ViewContainer<V> {
    fn add_view(&self, view: &V, index: usize);

    fn remove_view(&self, view: &V);

    fn remove_all_views(&self);
}

const LOG_TAG: &str = "AttachedViewRecycler";

/// [`ViewRecycler`] that attaches views to containers in a defined order.
pub struct AttachedViewRecycler<A: ViewAdapter> {
    recycler: ViewRecycler<A>,
    default_container: Option<A::Container>,
    parents: AHashMap<A::Item, A::Container>,
    order: Vec<A::Item>,
    comparator: Option<Comparator<A::Item>>,
    use_parent_padding: bool,
    logger: Logger,
}

impl<A> AttachedViewRecycler<A>
where
    A: ViewAdapter,
    A::Container: ViewContainer<A::View> + Clone,
{
    /// A recycler without a default container. Logging is off.
    #[must_use]
    pub fn new(context: A::Context) -> Self {
        Self {
            recycler: ViewRecycler::new(context),
            default_container: None,
            parents: AHashMap::new(),
            order: Vec::new(),
            comparator: None,
            use_parent_padding: false,
            logger: Logger::component(LOG_TAG, LogLevel::Off),
        }
    }

    /// A recycler attaching views to `container` by default.
    #[must_use]
    pub fn with_container(context: A::Context, container: A::Container) -> Self {
        let mut recycler = Self::new(context);
        recycler.default_container = Some(container);
        recycler
    }

    /// A recycler attaching views to `container` in `comparator` order.
    #[must_use]
    pub fn with_comparator(
        context: A::Context,
        container: A::Container,
        comparator: Comparator<A::Item>,
    ) -> Self {
        let mut recycler = Self::with_container(context, container);
        recycler.comparator = Some(comparator);
        recycler
    }

    pub fn set_adapter(&mut self, adapter: Option<A>) -> Option<A> {
        self.recycler.set_adapter(adapter)
    }

    #[must_use]
    pub fn adapter(&self) -> Option<&A> {
        self.recycler.adapter()
    }

    #[must_use]
    pub fn context(&self) -> &A::Context {
        self.recycler.context()
    }

    pub fn set_default_container(&mut self, container: Option<A::Container>) {
        self.default_container = container;
    }

    #[must_use]
    pub fn default_container(&self) -> Option<&A::Container> {
        self.default_container.as_ref()
    }

    /// Replace the comparator. Already attached views keep their positions.
    pub fn set_comparator(&mut self, comparator: Option<Comparator<A::Item>>) {
        self.comparator = comparator;
    }

    #[must_use]
    pub fn comparator(&self) -> Option<&dyn Fn(&A::Item, &A::Item) -> Ordering> {
        self.comparator.as_deref()
    }

    pub fn set_use_parent_padding(&mut self, use_parent_padding: bool) {
        self.use_parent_padding = use_parent_padding;
    }

    /// Whether views should be laid out inside the container's padding.
    #[must_use]
    pub fn use_parent_padding(&self) -> bool {
        self.use_parent_padding
    }

    pub fn set_log_level(&mut self, level: LogLevel) {
        self.logger.set_log_level(level);
    }

    #[must_use]
    pub fn log_level(&self) -> LogLevel {
        self.logger.log_level()
    }

    fn insertion_index(&self, item: &A::Item) -> usize {
        match &self.comparator {
            Some(compare) => self
                .order
                .partition_point(|existing| compare(existing, item) != Ordering::Greater),
            None => self.order.len(),
        }
    }

    /// Return the view for `item`, creating and attaching it when inactive.
    ///
    /// `container` overrides the default container for a new view.
    pub fn inflate(
        &mut self,
        item: &A::Item,
        container: Option<&A::Container>,
        params: &A::Params,
    ) -> Result<Option<Inflation<A::View>>, A::Error> {
        let container = container.or(self.default_container.as_ref()).cloned();
        let index = self.insertion_index(item);

        let Some(inflation) = self
            .recycler
            .obtain(item, container.as_ref(), index, params)?
        else {
            return Ok(None);
        };

        if inflation.inflated {
            self.order.insert(index, item.clone());
            if let Some(container) = container {
                container.add_view(&inflation.view, index);
                self.parents.insert(item.clone(), container);
            }
            self.logger
                .log_debug(&format!("Inflated view to represent item {item:?} at index {index}"));
        } else {
            self.logger
                .log_verbose(&format!("Reusing view to represent item {item:?}"));
        }

        self.recycler.show(item, &inflation, params)?;
        Ok(Some(inflation))
    }

    /// [`AttachedViewRecycler::inflate`] using the default container.
    pub fn inflate_detached(
        &mut self,
        item: &A::Item,
        params: &A::Params,
    ) -> Result<Option<Inflation<A::View>>, A::Error> {
        self.inflate(item, None, params)
    }

    #[must_use]
    pub fn get_view(&self, item: &A::Item) -> Option<&A::View> {
        self.recycler.get_view(item)
    }

    #[must_use]
    pub fn is_active(&self, item: &A::Item) -> bool {
        self.recycler.is_active(item)
    }

    /// Number of active views.
    #[must_use]
    pub fn count(&self) -> usize {
        self.recycler.active_count()
    }

    /// Active items in structural order.
    #[must_use]
    pub fn items(&self) -> &[A::Item] {
        &self.order
    }

    /// Remove `item`'s view and detach it from its container.
    pub fn remove(&mut self, item: &A::Item) -> Option<A::View> {
        let view = self.recycler.remove(item)?;
        if let Some(position) = self.order.iter().position(|existing| existing == item) {
            self.order.remove(position);
        }
        if let Some(parent) = self.parents.remove(item) {
            parent.remove_view(&view);
        }
        self.logger
            .log_debug(&format!("Removed view of item {item:?}"));
        Some(view)
    }

    /// Remove every view and detach each from its container.
    pub fn remove_all(&mut self) {
        let drained = self.recycler.take_all();
        for (item, view) in &drained {
            if let Some(parent) = self.parents.remove(item) {
                parent.remove_view(view);
            }
        }
        self.order.clear();
        self.logger
            .log_debug(&format!("Removed all views ({} items)", drained.len()));
    }

    /// [`AttachedViewRecycler::remove_all`], then clear the default container.
    pub fn remove_all_views(&mut self) {
        self.remove_all();
        if let Some(container) = &self.default_container {
            container.remove_all_views();
        }
    }

    pub fn save_instance_state(&self, item: &A::Item) -> Option<Bundle> {
        self.recycler.save_instance_state(item)
    }

    pub fn restore_instance_state(&self, item: &A::Item, state: &Bundle) -> bool {
        self.recycler.restore_instance_state(item, state)
    }
}

impl<A: ViewAdapter> fmt::Debug for AttachedViewRecycler<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttachedViewRecycler")
            .field("recycler", &self.recycler)
            .field("items", &self.order)
            .field("has_default_container", &self.default_container.is_some())
            .field("has_comparator", &self.comparator.is_some())
            .field("use_parent_padding", &self.use_parent_padding)
            .field("log_level", &self.logger.log_level())
            .finish()
    }
}
