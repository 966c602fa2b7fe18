#![forbid(unsafe_code)]

//! Comparator-ordered model list with batched edits.
//!
//! [`SortedList`] keeps its entries ordered by a [`Comparator`]. Changes go
//! through an [`Editor`], which queues additions and removals and applies
//! them in one [`Editor::commit`], bracketed by [`EditCallback`] notifications.
//!
//! Identity comes from [`ViewModel::is_same_model_as`], looked up only among
//! entries that compare equal to the given one. Adding a model that is
//! already present replaces it in place.
//!
//! # Invariants
//!
//! 1. Entries are always sorted by the comparator. Entries comparing equal
//!    keep the order they were added in.
//! 2. No two entries comparing equal are the same model.
//! 3. A commit applies, in order: a pending `remove_all`, a pending
//!    `replace_all`, queued removals, queued additions.
//! 4. `on_edit_started` and `on_edit_finished` are called exactly once per
//!    commit, even when the commit changes nothing.

use std::cmp::Ordering;
use std::fmt;

use crate::recycler::Comparator;

/// Identity and content equality for list models.
pub trait ViewModel {
    /// Whether `other` stands for the same underlying model.
    fn is_same_model_as(&self, other: &Self) -> bool;

    /// Whether `other` would render identically.
    fn is_content_same_as(&self, other: &Self) -> bool;
}

/// Notified around every [`Editor::commit`].
pub trait EditCallback {
    fn on_edit_started(&self);

    fn on_edit_finished(&self);
}

/// Counts of what one commit did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EditSummary {
    pub inserted: usize,
    pub removed: usize,
    /// Same-model replacements whose content differed.
    pub changed: usize,
}

/// Models kept in comparator order.
pub struct SortedList<T> {
    entries: Vec<T>,
    comparator: Comparator<T>,
    callback: Option<Box<dyn EditCallback>>,
}

impl<T: ViewModel> SortedList<T> {
    #[must_use]
    pub fn new(comparator: Comparator<T>) -> Self {
        Self {
            entries: Vec::new(),
            comparator,
            callback: None,
        }
    }

    /// Replace the edit callback; `None` removes it.
    pub fn set_callback(&mut self, callback: Option<Box<dyn EditCallback>>) {
        self.callback = callback;
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn get(&self, position: usize) -> Option<&T> {
        self.entries.get(position)
    }

    /// Position of the entry that is the same model as `model`.
    #[must_use]
    pub fn position_of(&self, model: &T) -> Option<usize> {
        let (start, end) = self.equal_run(model);
        (start..end).find(|&i| self.entries[i].is_same_model_as(model))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.entries.iter()
    }

    /// Start a batch of changes.
    pub fn edit(&mut self) -> Editor<'_, T> {
        Editor {
            list: self,
            additions: Vec::new(),
            removals: Vec::new(),
            replacement: None,
            remove_all: false,
        }
    }

    /// Range of entries comparing equal to `model`.
    fn equal_run(&self, model: &T) -> (usize, usize) {
        let cmp = &self.comparator;
        let start = self
            .entries
            .partition_point(|entry| cmp(entry, model) == Ordering::Less);
        let end = start
            + self.entries[start..]
                .partition_point(|entry| cmp(entry, model) != Ordering::Greater);
        (start, end)
    }

    fn insert(&mut self, model: T, summary: &mut EditSummary) {
        let (start, end) = self.equal_run(&model);
        match (start..end).find(|&i| self.entries[i].is_same_model_as(&model)) {
            Some(index) => {
                if !self.entries[index].is_content_same_as(&model) {
                    summary.changed += 1;
                }
                self.entries[index] = model;
            }
            None => {
                self.entries.insert(end, model);
                summary.inserted += 1;
            }
        }
    }

    fn remove(&mut self, model: &T, summary: &mut EditSummary) {
        if let Some(index) = self.position_of(model) {
            self.entries.remove(index);
            summary.removed += 1;
        }
    }

    fn clear(&mut self, summary: &mut EditSummary) {
        summary.removed += self.entries.len();
        self.entries.clear();
    }
}

impl<'a, T> IntoIterator for &'a SortedList<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl<T: fmt::Debug> fmt::Debug for SortedList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SortedList")
            .field("entries", &self.entries)
            .field("callback", &self.callback.is_some())
            .finish_non_exhaustive()
    }
}

/// Pending changes to a [`SortedList`]. Nothing happens until [`Editor::commit`].
#[must_use = "an editor does nothing until committed"]
pub struct Editor<'a, T> {
    list: &'a mut SortedList<T>,
    additions: Vec<T>,
    removals: Vec<T>,
    replacement: Option<Vec<T>>,
    remove_all: bool,
}

impl<T: ViewModel> Editor<'_, T> {
    pub fn add(mut self, model: T) -> Self {
        self.additions.push(model);
        self
    }

    pub fn add_all(mut self, models: impl IntoIterator<Item = T>) -> Self {
        self.additions.extend(models);
        self
    }

    pub fn remove(mut self, model: T) -> Self {
        self.removals.push(model);
        self
    }

    pub fn remove_all_of(mut self, models: impl IntoIterator<Item = T>) -> Self {
        self.removals.extend(models);
        self
    }

    /// Swap the whole content for `models`. A later call wins.
    pub fn replace_all(mut self, models: impl IntoIterator<Item = T>) -> Self {
        self.replacement = Some(models.into_iter().collect());
        self
    }

    pub fn remove_all(mut self) -> Self {
        self.remove_all = true;
        self
    }

    /// Apply the queued changes.
    pub fn commit(self) -> EditSummary {
        let Editor {
            list,
            additions,
            removals,
            replacement,
            remove_all,
        } = self;
        if let Some(callback) = &list.callback {
            callback.on_edit_started();
        }
        let mut summary = EditSummary::default();
        if remove_all {
            list.clear(&mut summary);
        }
        if let Some(models) = replacement {
            list.clear(&mut summary);
            for model in models {
                list.insert(model, &mut summary);
            }
        }
        for model in &removals {
            list.remove(model, &mut summary);
        }
        for model in additions {
            list.insert(model, &mut summary);
        }
        tracing::trace!(
            inserted = summary.inserted,
            removed = summary.removed,
            changed = summary.changed,
            len = list.entries.len(),
            "sorted list edit committed"
        );
        if let Some(callback) = &list.callback {
            callback.on_edit_finished();
        }
        summary
    }
}

/// Chains per-variant orderings into one [`Comparator`].
///
/// Each rule only applies when both sides project to its model type; the
/// first rule that tells two entries apart decides.
///
/// ```
/// use std::cmp::Ordering;
/// use ctabs_widgets::sorted_list::ComparatorBuilder;
///
/// enum Row { Header(u8), Tab(String) }
///
/// let cmp = ComparatorBuilder::<Row>::new()
///     .order(|a, b| matches!(b, Row::Header(_)).cmp(&matches!(a, Row::Header(_))))
///     .order_for(|row| match row { Row::Tab(t) => Some(t), _ => None }, |a, b| a.cmp(b))
///     .build();
/// assert_eq!(cmp(&Row::Header(0), &Row::Tab("a".into())), Ordering::Less);
/// assert_eq!(cmp(&Row::Tab("b".into()), &Row::Tab("a".into())), Ordering::Greater);
/// ```
pub struct ComparatorBuilder<T> {
    rules: Vec<Comparator<T>>,
}

impl<T: 'static> ComparatorBuilder<T> {
    #[must_use]
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Rule over all entries.
    #[must_use]
    pub fn order(mut self, cmp: impl Fn(&T, &T) -> Ordering + 'static) -> Self {
        self.rules.push(Box::new(cmp));
        self
    }

    /// Rule for entries that `project` maps to an `M`; others compare equal.
    #[must_use]
    pub fn order_for<M: ?Sized + 'static>(
        mut self,
        project: impl Fn(&T) -> Option<&M> + 'static,
        cmp: impl Fn(&M, &M) -> Ordering + 'static,
    ) -> Self {
        self.rules
            .push(Box::new(move |a, b| match (project(a), project(b)) {
                (Some(a), Some(b)) => cmp(a, b),
                _ => Ordering::Equal,
            }));
        self
    }

    #[must_use]
    pub fn build(self) -> Comparator<T> {
        let rules = self.rules;
        Box::new(move |a, b| {
            rules
                .iter()
                .map(|rule| rule(a, b))
                .find(|ordering| ordering.is_ne())
                .unwrap_or(Ordering::Equal)
        })
    }
}

impl<T: 'static> Default for ComparatorBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}
