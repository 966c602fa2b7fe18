#![forbid(unsafe_code)]

//! Building blocks for adapters that cache per-view holders.
//!
//! Looking up child views is expensive on most hosts, so adapters keep a
//! holder (the resolved children) per inflated view. [`ViewHolderAdapter`]
//! owns that cache plus the host context and the view currently being bound,
//! and is meant to be embedded in a [`ViewAdapter`](crate::ViewAdapter)
//! implementation.
//!
//! All methods take `&self` because adapter callbacks do.

use std::cell::RefCell;
use std::fmt;
use std::hash::Hash;

use ahash::AHashMap;

/// Holder cache keyed by view identity.
///
/// - `C`: host context.
/// - `K`: key identifying a view (e.g. a view id).
/// - `H`: holder type.
pub struct ViewHolderAdapter<C, K, H> {
    context: Option<C>,
    current_parent: RefCell<Option<K>>,
    holders: RefCell<AHashMap<K, H>>,
}

impl<C, K: Eq + Hash + Clone, H> ViewHolderAdapter<C, K, H> {
    /// An adapter without a context; set one before binding.
    #[must_use]
    pub fn new() -> Self {
        Self {
            context: None,
            current_parent: RefCell::new(None),
            holders: RefCell::new(AHashMap::new()),
        }
    }

    #[must_use]
    pub fn with_context(context: C) -> Self {
        Self {
            context: Some(context),
            ..Self::new()
        }
    }

    pub fn set_context(&mut self, context: C) {
        self.context = Some(context);
    }

    #[must_use]
    pub fn context(&self) -> Option<&C> {
        self.context.as_ref()
    }

    /// Mark `view` as the view being bound; `None` when binding ends.
    pub fn set_current_parent_view(&self, view: Option<K>) {
        *self.current_parent.borrow_mut() = view;
    }

    #[must_use]
    pub fn current_parent_view(&self) -> Option<K> {
        self.current_parent.borrow().clone()
    }

    /// Run `f` on the holder of the current parent view, creating it with
    /// `create` on first use. Returns `None` when no view is being bound.
    pub fn with_current_holder<R>(
        &self,
        create: impl FnOnce() -> H,
        f: impl FnOnce(&mut H) -> R,
    ) -> Option<R> {
        let key = self.current_parent_view()?;
        Some(self.with_holder_or_insert(key, create, f))
    }

    /// Run `f` on the holder of `key`, creating it with `create` if absent.
    ///
    /// The holder is taken out of the cache while `create` and `f` run, so
    /// both may call back into the adapter. Lookups of `key` itself from
    /// inside `f` see no holder.
    pub fn with_holder_or_insert<R>(
        &self,
        key: K,
        create: impl FnOnce() -> H,
        f: impl FnOnce(&mut H) -> R,
    ) -> R {
        let taken = self.holders.borrow_mut().remove(&key);
        let mut holder = taken.unwrap_or_else(create);
        let result = f(&mut holder);
        self.holders.borrow_mut().insert(key, holder);
        result
    }

    /// Run `f` on the holder of `key` if one exists. Reentrant like
    /// [`ViewHolderAdapter::with_holder_or_insert`].
    pub fn with_holder<R>(&self, key: &K, f: impl FnOnce(&mut H) -> R) -> Option<R> {
        let mut holder = self.holders.borrow_mut().remove(key)?;
        let result = f(&mut holder);
        self.holders.borrow_mut().insert(key.clone(), holder);
        Some(result)
    }

    #[must_use]
    pub fn has_holder(&self, key: &K) -> bool {
        self.holders.borrow().contains_key(key)
    }

    /// Forget the holder of `key`, typically from `on_remove_view`.
    pub fn remove_holder(&self, key: &K) -> Option<H> {
        let removed = self.holders.borrow_mut().remove(key);
        let mut current = self.current_parent.borrow_mut();
        if current.as_ref() == Some(key) {
            *current = None;
        }
        removed
    }

    #[must_use]
    pub fn holder_count(&self) -> usize {
        self.holders.borrow().len()
    }

    pub fn clear_holders(&self) {
        self.holders.borrow_mut().clear();
        *self.current_parent.borrow_mut() = None;
    }
}

impl<C, K: Eq + Hash + Clone, H> Default for ViewHolderAdapter<C, K, H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C, K, H> fmt::Debug for ViewHolderAdapter<C, K, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewHolderAdapter")
            .field("has_context", &self.context.is_some())
            .field("holders", &self.holders.borrow().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, PartialEq)]
    struct TabHolder {
        title: String,
        binds: u32,
    }

    #[test]
    fn context_can_be_set_later() {
        let mut adapter = ViewHolderAdapter::<&str, u32, TabHolder>::new();
        assert!(adapter.context().is_none());
        adapter.set_context("activity");
        assert_eq!(adapter.context(), Some(&"activity"));
    }

    #[test]
    fn current_holder_requires_a_bound_view() {
        let adapter = ViewHolderAdapter::<(), u32, TabHolder>::with_context(());
        assert_eq!(adapter.with_current_holder(TabHolder::default, |h| h.binds), None);

        adapter.set_current_parent_view(Some(7));
        let binds = adapter.with_current_holder(TabHolder::default, |h| {
            h.binds += 1;
            h.binds
        });
        assert_eq!(binds, Some(1));
        assert_eq!(adapter.current_parent_view(), Some(7));
        assert!(adapter.has_holder(&7));
    }

    #[test]
    fn holder_is_created_once_per_key() {
        let adapter = ViewHolderAdapter::<(), u32, TabHolder>::new();
        let mut created = 0;
        for _ in 0..3 {
            adapter.with_holder_or_insert(
                1,
                || {
                    created += 1;
                    TabHolder::default()
                },
                |h| h.binds += 1,
            );
        }
        assert_eq!(created, 1);
        assert_eq!(adapter.with_holder(&1, |h| h.binds), Some(3));
        assert_eq!(adapter.with_holder(&2, |h| h.binds), None);
    }

    #[test]
    fn remove_holder_clears_current_parent() {
        let adapter = ViewHolderAdapter::<(), u32, TabHolder>::new();
        adapter.set_current_parent_view(Some(4));
        adapter.with_current_holder(
            || TabHolder {
                title: "Docs".into(),
                binds: 0,
            },
            |_| (),
        );
        let removed = adapter.remove_holder(&4).unwrap();
        assert_eq!(removed.title, "Docs");
        assert_eq!(adapter.current_parent_view(), None);
        assert_eq!(adapter.holder_count(), 0);
    }

    #[test]
    fn clear_holders_empties_cache() {
        let adapter = ViewHolderAdapter::<(), u32, TabHolder>::new();
        for key in 0..4 {
            adapter.with_holder_or_insert(key, TabHolder::default, |_| ());
        }
        adapter.clear_holders();
        assert_eq!(adapter.holder_count(), 0);
    }

    #[test]
    fn callbacks_may_reenter_the_adapter() {
        let adapter = ViewHolderAdapter::<(), u32, TabHolder>::new();
        adapter.with_holder_or_insert(2, TabHolder::default, |_| ());

        let seen = adapter.with_holder_or_insert(
            1,
            || TabHolder {
                title: format!("tab {}", adapter.holder_count()),
                binds: 0,
            },
            |holder| {
                holder.binds += 1;
                (adapter.holder_count(), adapter.has_holder(&2))
            },
        );
        assert_eq!(seen, (1, true));
        assert_eq!(adapter.with_holder(&1, |h| h.title.clone()), Some("tab 1".into()));

        let nested = adapter.with_holder(&2, |_| adapter.with_holder(&1, |h| h.binds));
        assert_eq!(nested, Some(Some(1)));
        assert_eq!(adapter.holder_count(), 2);
    }
}
