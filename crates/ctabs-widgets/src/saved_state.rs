#![forbid(unsafe_code)]

//! Persistable view state.
//!
//! - [`Bundle`]: a string-keyed map of JSON values, the unit of per-view
//!   state handed to and from adapters.
//! - [`SavedState`]: an envelope carrying a parent's state plus a payload,
//!   serialized to a byte parcel and validated on the way back in.
//!
//! # Invariants
//!
//! 1. `SavedState::from_parcel(s.to_parcel()?)` yields an equal envelope.
//! 2. Restoring through a [`StateContext`] never accepts a parcel whose kind
//!    or version differs from what the context expects.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Encode error | Payload not serializable | `StateError::Encode` |
//! | Decode error | Corrupt parcel, schema drift | `StateError::Decode` |
//! | Kind mismatch | Parcel written by another component | `StateError::TypeMismatch` |
//! | Version mismatch | Component upgraded | `StateError::VersionMismatch` |

use std::collections::BTreeMap;
use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Version written by [`SavedState::new`].
pub const DEFAULT_STATE_VERSION: u32 = 1;

/// Errors from encoding or restoring saved state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    /// A value could not be serialized.
    Encode(String),
    /// A parcel or bundle entry could not be deserialized.
    Decode(String),
    /// The parcel was written for a different kind of component.
    TypeMismatch { expected: String, found: String },
    /// The parcel was written with a different schema version.
    VersionMismatch { expected: u32, found: u32 },
}

impl fmt::Display for StateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Encode(msg) => write!(f, "failed to encode state: {msg}"),
            Self::Decode(msg) => write!(f, "failed to decode state: {msg}"),
            Self::TypeMismatch { expected, found } => {
                write!(f, "saved state kind mismatch: expected {expected}, found {found}")
            }
            Self::VersionMismatch { expected, found } => {
                write!(f, "saved state version mismatch: expected {expected}, found {found}")
            }
        }
    }
}

impl std::error::Error for StateError {}

/// String-keyed map of serialized values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Bundle {
    entries: BTreeMap<String, Value>,
}

impl Bundle {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` under `key`, replacing any previous entry.
    pub fn put<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<(), StateError> {
        let value = serde_json::to_value(value).map_err(|e| StateError::Encode(e.to_string()))?;
        self.entries.insert(key.to_owned(), value);
        Ok(())
    }

    /// Read the entry under `key`. Missing keys are `Ok(None)`.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StateError> {
        self.entries
            .get(key)
            .map(|value| {
                T::deserialize(value).map_err(|e| StateError::Decode(format!("{key}: {e}")))
            })
            .transpose()
    }

    /// Read `key`, falling back to `default` when missing or malformed.
    pub fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.get(key).ok().flatten().unwrap_or(default)
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.remove(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Expectations applied when restoring a [`SavedState`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateContext {
    kind: Option<String>,
    version: Option<u32>,
}

impl StateContext {
    /// A context that accepts any kind and version.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    #[must_use]
    pub fn with_version(mut self, version: u32) -> Self {
        self.version = Some(version);
        self
    }

    fn check(&self, kind: &str, version: u32) -> Result<(), StateError> {
        if let Some(expected) = &self.kind {
            if expected != kind {
                return Err(StateError::TypeMismatch {
                    expected: expected.clone(),
                    found: kind.to_owned(),
                });
            }
        }
        if let Some(expected) = self.version {
            if expected != version {
                return Err(StateError::VersionMismatch {
                    expected,
                    found: version,
                });
            }
        }
        Ok(())
    }
}

/// Parent state plus a component-specific payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedState<S> {
    kind: String,
    version: u32,
    super_state: Option<Bundle>,
    state: S,
}

impl<S> SavedState<S> {
    pub fn new(kind: impl Into<String>, super_state: Option<Bundle>, state: S) -> Self {
        Self {
            kind: kind.into(),
            version: DEFAULT_STATE_VERSION,
            super_state,
            state,
        }
    }

    #[must_use]
    pub fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    #[must_use]
    pub fn version(&self) -> u32 {
        self.version
    }

    #[must_use]
    pub fn super_state(&self) -> Option<&Bundle> {
        self.super_state.as_ref()
    }

    #[must_use]
    pub fn state(&self) -> &S {
        &self.state
    }

    pub fn into_parts(self) -> (Option<Bundle>, S) {
        (self.super_state, self.state)
    }
}

impl<S: Serialize + DeserializeOwned> SavedState<S> {
    /// Serialize the envelope into a parcel.
    pub fn to_parcel(&self) -> Result<Vec<u8>, StateError> {
        serde_json::to_vec(self).map_err(|e| StateError::Encode(e.to_string()))
    }

    /// Restore an envelope without checking its kind or version.
    pub fn from_parcel(parcel: &[u8]) -> Result<Self, StateError> {
        Self::from_parcel_with(parcel, &StateContext::new())
    }

    /// Restore an envelope, rejecting it unless it matches `context`.
    pub fn from_parcel_with(parcel: &[u8], context: &StateContext) -> Result<Self, StateError> {
        let saved: Self =
            serde_json::from_slice(parcel).map_err(|e| StateError::Decode(e.to_string()))?;
        context.check(&saved.kind, saved.version)?;
        Ok(saved)
    }
}
