#![forbid(unsafe_code)]

//! View plumbing for chrome-style tabs.
//!
//! - [`recycler`]: [`ViewRecycler`] and the container-aware
//!   [`AttachedViewRecycler`], driven by a [`ViewAdapter`].
//! - [`view_holder`]: holder caching for adapters.
//! - [`sorted_list`]: [`SortedList`] with batched [`Editor`] commits.
//! - [`saved_state`]: bundles and parcels for state that survives recreation.
//! - [`view_util`]: null-tolerant helpers over host views.

pub mod recycler;
pub mod saved_state;
pub mod sorted_list;
pub mod view_holder;
pub mod view_util;

pub use recycler::{
    AttachedViewRecycler, Comparator, Inflation, ViewAdapter, ViewContainer, ViewRecycler,
};
pub use saved_state::{Bundle, SavedState, StateContext, StateError};
pub use sorted_list::{
    ComparatorBuilder, EditCallback, EditSummary, Editor, SortedList, ViewModel,
};
pub use view_holder::ViewHolderAdapter;
pub use view_util::{Margins, ViewNode, Visibility};
