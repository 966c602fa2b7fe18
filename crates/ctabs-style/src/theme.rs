#![forbid(unsafe_code)]

//! Theme attribute resolution.
//!
//! A [`Theme`] maps [`AttrId`]s to [`ThemeValue`]s and may inherit from a
//! parent theme. Lookups walk the child first, then each ancestor, and stop
//! at the first theme that defines the attribute.
//!
//! The free functions mirror the platform's typed accessors: the strict ones
//! (`color`, `dimension_pixel_size`, `resource_id`) return a [`ThemeError`],
//! the lenient ones (`boolean`, `int`, `text`, `drawable`) fall back to a
//! default or `None`.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Unknown attribute | Not defined in the theme chain | `UnknownAttribute` / default |
//! | Wrong type | e.g. asking a `Text` value for a color | `WrongType` / default |
//! | Bad JSON | `Theme::from_json` input malformed | `Parse` |

use std::fmt;
use std::sync::Arc;

use ahash::AHashMap;
use ctabs_core::DisplayMetrics;

use crate::color::Color;

/// Identifier of a theme attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AttrId(pub u32);

/// Identifier of a host resource (drawable, layout, string).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ResourceId(pub u32);

/// Unit of a dimension value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DimensionUnit {
    Px,
    Dp,
    Sp,
    Pt,
    In,
    Mm,
}

impl DimensionUnit {
    /// Convert `value` in this unit to (fractional) pixels.
    #[must_use]
    pub fn to_pixels(self, value: f32, metrics: &DisplayMetrics) -> f32 {
        let density = metrics.density();
        let dpi = density * 160.0;
        match self {
            Self::Px => value,
            Self::Dp | Self::Sp => value * density,
            Self::Pt => value * dpi / 72.0,
            Self::In => value * dpi,
            Self::Mm => value * dpi / 25.4,
        }
    }
}

/// A resolved attribute value.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ThemeValue {
    Color(Color),
    Dimension { value: f32, unit: DimensionUnit },
    Integer(i32),
    Boolean(bool),
    Text(String),
    Reference(ResourceId),
}

impl ThemeValue {
    fn kind(&self) -> &'static str {
        match self {
            Self::Color(_) => "color",
            Self::Dimension { .. } => "dimension",
            Self::Integer(_) => "integer",
            Self::Boolean(_) => "boolean",
            Self::Text(_) => "text",
            Self::Reference(_) => "reference",
        }
    }
}

/// Errors from strict attribute lookups.
#[derive(Debug, Clone, PartialEq)]
pub enum ThemeError {
    /// No theme in the chain defines the attribute.
    UnknownAttribute(AttrId),
    /// The attribute exists but holds a different kind of value.
    WrongType {
        attr: AttrId,
        expected: &'static str,
        found: &'static str,
    },
    /// A serialized theme could not be parsed.
    Parse(String),
}

impl fmt::Display for ThemeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownAttribute(attr) => write!(f, "unknown theme attribute: {}", attr.0),
            Self::WrongType {
                attr,
                expected,
                found,
            } => write!(
                f,
                "theme attribute {} is a {found}, expected a {expected}",
                attr.0
            ),
            Self::Parse(msg) => write!(f, "theme parse error: {msg}"),
        }
    }
}

impl std::error::Error for ThemeError {}

/// Attribute map with optional parent fallback.
#[derive(Debug, Clone, Default)]
pub struct Theme {
    name: String,
    values: AHashMap<AttrId, ThemeValue>,
    parent: Option<Arc<Theme>>,
}

impl Theme {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: AHashMap::new(),
            parent: None,
        }
    }

    /// Create a theme that falls back to `parent` for undefined attributes.
    #[must_use]
    pub fn inheriting(name: impl Into<String>, parent: Arc<Theme>) -> Self {
        Self {
            parent: Some(parent),
            ..Self::new(name)
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn parent(&self) -> Option<&Arc<Theme>> {
        self.parent.as_ref()
    }

    /// Define or replace an attribute in this theme (not its parent).
    pub fn set(&mut self, attr: AttrId, value: ThemeValue) -> &mut Self {
        self.values.insert(attr, value);
        self
    }

    /// Builder-style [`Theme::set`].
    #[must_use]
    pub fn with(mut self, attr: AttrId, value: ThemeValue) -> Self {
        self.values.insert(attr, value);
        self
    }

    /// Resolve an attribute through the parent chain.
    #[must_use]
    pub fn resolve(&self, attr: AttrId) -> Option<&ThemeValue> {
        let mut theme = self;
        loop {
            if let Some(value) = theme.values.get(&attr) {
                return Some(value);
            }
            theme = theme.parent.as_deref()?;
        }
    }

    /// Parse a theme from JSON of the form
    /// `{"name": "...", "values": {"<attr>": {"color": 4278190080}}}`.
    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> Result<Self, ThemeError> {
        use std::collections::BTreeMap;

        #[derive(serde::Deserialize)]
        struct ThemeDocument {
            name: String,
            #[serde(default)]
            values: BTreeMap<u32, ThemeValue>,
        }

        let document: ThemeDocument =
            serde_json::from_str(json).map_err(|e| ThemeError::Parse(e.to_string()))?;
        let mut theme = Self::new(document.name);
        for (attr, value) in document.values {
            theme.set(AttrId(attr), value);
        }
        tracing::debug!(theme = %theme.name, attributes = theme.values.len(), "theme loaded");
        Ok(theme)
    }
}

fn lookup(theme: &Theme, attr: AttrId) -> Result<&ThemeValue, ThemeError> {
    theme.resolve(attr).ok_or(ThemeError::UnknownAttribute(attr))
}

fn wrong_type(attr: AttrId, expected: &'static str, found: &ThemeValue) -> ThemeError {
    ThemeError::WrongType {
        attr,
        expected,
        found: found.kind(),
    }
}

/// Resolve a color attribute. Integer values are read as packed ARGB.
pub fn color(theme: &Theme, attr: AttrId) -> Result<Color, ThemeError> {
    match lookup(theme, attr)? {
        ThemeValue::Color(color) => Ok(*color),
        ThemeValue::Integer(raw) => Ok(Color(*raw as u32)),
        other => Err(wrong_type(attr, "color", other)),
    }
}

/// Resolve a dimension attribute to whole pixels.
///
/// Rounds to nearest; a non-zero dimension never collapses to 0 px.
pub fn dimension_pixel_size(
    theme: &Theme,
    attr: AttrId,
    metrics: &DisplayMetrics,
) -> Result<i32, ThemeError> {
    match lookup(theme, attr)? {
        ThemeValue::Dimension { value, unit } => {
            let px = unit.to_pixels(*value, metrics);
            let rounded = px.round() as i32;
            Ok(if rounded != 0 || *value == 0.0 {
                rounded
            } else if *value > 0.0 {
                1
            } else {
                -1
            })
        }
        other => Err(wrong_type(attr, "dimension", other)),
    }
}

/// Resolve a reference attribute to its resource id.
pub fn resource_id(theme: &Theme, attr: AttrId) -> Result<ResourceId, ThemeError> {
    match lookup(theme, attr)? {
        ThemeValue::Reference(id) => Ok(*id),
        other => Err(wrong_type(attr, "reference", other)),
    }
}

/// Resource id of a drawable attribute, or `None` when unresolvable.
pub fn drawable(theme: &Theme, attr: AttrId) -> Option<ResourceId> {
    resource_id(theme, attr).ok()
}

/// Resolve a flag; integers are true when non-zero.
pub fn boolean(theme: &Theme, attr: AttrId, default: bool) -> bool {
    match theme.resolve(attr) {
        Some(ThemeValue::Boolean(value)) => *value,
        Some(ThemeValue::Integer(value)) => *value != 0,
        other => {
            trace_fallback(theme, attr, "boolean", other);
            default
        }
    }
}

/// Resolve an integer; booleans read as 0/1.
pub fn int(theme: &Theme, attr: AttrId, default: i32) -> i32 {
    match theme.resolve(attr) {
        Some(ThemeValue::Integer(value)) => *value,
        Some(ThemeValue::Boolean(value)) => i32::from(*value),
        other => {
            trace_fallback(theme, attr, "integer", other);
            default
        }
    }
}

/// Resolve an attribute as text, coercing scalar values to strings.
pub fn text(theme: &Theme, attr: AttrId) -> Option<String> {
    let Some(value) = theme.resolve(attr) else {
        trace_fallback(theme, attr, "text", None);
        return None;
    };
    match value {
        ThemeValue::Text(value) => Some(value.clone()),
        ThemeValue::Integer(value) => Some(value.to_string()),
        ThemeValue::Boolean(value) => Some(value.to_string()),
        ThemeValue::Color(value) => Some(value.to_string()),
        ThemeValue::Dimension { value, unit } => Some(format!("{value}{unit:?}").to_lowercase()),
        ThemeValue::Reference(_) => {
            trace_fallback(theme, attr, "text", Some(value));
            None
        }
    }
}

fn trace_fallback(theme: &Theme, attr: AttrId, expected: &'static str, found: Option<&ThemeValue>) {
    tracing::trace!(
        theme = %theme.name,
        attr = attr.0,
        expected,
        found = found.map_or("nothing", ThemeValue::kind),
        "attribute fallback"
    );
}
