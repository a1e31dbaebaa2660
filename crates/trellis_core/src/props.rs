//! Widget property keys and values
//!
//! Every widget carries a [`PropMap`] of computable definitions keyed by
//! [`PropKey`]. The engine materializes it into [`ComputedProps`], an
//! immutable snapshot whose identity only changes when a value does.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::computable::Computable;

/// A size that is either absolute or relative to the parent
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Length {
    Px(f32),
    Percent(f32),
}

impl From<f32> for Length {
    fn from(px: f32) -> Self {
        Length::Px(px)
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Length::Px(px) => write!(f, "{px}px"),
            Length::Percent(pct) => write!(f, "{pct}%"),
        }
    }
}

/// Materialized property value
#[derive(Clone, Debug, PartialEq, Default)]
pub enum PropValue {
    #[default]
    Unset,
    Bool(bool),
    Text(String),
    Number(f64),
    Length(Length),
}

impl PropValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            PropValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            PropValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Length value; bare numbers are read as pixels
    pub fn as_length(&self) -> Option<Length> {
        match self {
            PropValue::Length(len) => Some(*len),
            PropValue::Number(n) => Some(Length::Px(*n as f32)),
            _ => None,
        }
    }

    pub fn is_unset(&self) -> bool {
        matches!(self, PropValue::Unset)
    }
}

impl From<bool> for PropValue {
    fn from(value: bool) -> Self {
        PropValue::Bool(value)
    }
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        PropValue::Text(value.to_string())
    }
}

impl From<String> for PropValue {
    fn from(value: String) -> Self {
        PropValue::Text(value)
    }
}

impl From<f64> for PropValue {
    fn from(value: f64) -> Self {
        PropValue::Number(value)
    }
}

impl From<f32> for PropValue {
    fn from(value: f32) -> Self {
        PropValue::Number(value.into())
    }
}

impl From<i32> for PropValue {
    fn from(value: i32) -> Self {
        PropValue::Number(value.into())
    }
}

impl From<Length> for PropValue {
    fn from(value: Length) -> Self {
        PropValue::Length(value)
    }
}

impl<T: Into<PropValue>> From<Option<T>> for PropValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(PropValue::Unset, Into::into)
    }
}

/// Known widget properties plus free-form keys for custom containers
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PropKey {
    Label,
    Disabled,
    Required,
    HelperText,
    Placeholder,
    Hidden,
    Flex,
    MinWidth,
    MaxWidth,
    MinHeight,
    MaxHeight,
    ClassName,
    Gap,
    Custom(String),
}

impl PropKey {
    pub fn name(&self) -> &str {
        match self {
            PropKey::Label => "label",
            PropKey::Disabled => "disabled",
            PropKey::Required => "required",
            PropKey::HelperText => "helperText",
            PropKey::Placeholder => "placeholder",
            PropKey::Hidden => "hidden",
            PropKey::Flex => "flex",
            PropKey::MinWidth => "minWidth",
            PropKey::MaxWidth => "maxWidth",
            PropKey::MinHeight => "minHeight",
            PropKey::MaxHeight => "maxHeight",
            PropKey::ClassName => "className",
            PropKey::Gap => "gap",
            PropKey::Custom(name) => name,
        }
    }

    /// Parse a property name, falling back to [`PropKey::Custom`]
    pub fn from_name(name: &str) -> Self {
        match name {
            "label" => PropKey::Label,
            "disabled" => PropKey::Disabled,
            "required" => PropKey::Required,
            "helperText" => PropKey::HelperText,
            "placeholder" => PropKey::Placeholder,
            "hidden" => PropKey::Hidden,
            "flex" => PropKey::Flex,
            "minWidth" => PropKey::MinWidth,
            "maxWidth" => PropKey::MaxWidth,
            "minHeight" => PropKey::MinHeight,
            "maxHeight" => PropKey::MaxHeight,
            "className" => PropKey::ClassName,
            "gap" => PropKey::Gap,
            other => PropKey::Custom(other.to_string()),
        }
    }
}

impl fmt::Display for PropKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Ordered computable property definitions of one widget
#[derive(Clone, Debug, Default)]
pub struct PropMap(IndexMap<PropKey, Computable>);

impl PropMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, key: PropKey, value: impl Into<Computable>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert or replace a definition, keeping the original position
    pub fn insert(&mut self, key: PropKey, value: impl Into<Computable>) {
        self.0.insert(key, value.into());
    }

    pub fn get(&self, key: &PropKey) -> Option<&Computable> {
        self.0.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PropKey, &Computable)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Materialized property values of one widget
///
/// Cloning shares the underlying map; [`ComputedProps::ptr_eq`] tells whether
/// two snapshots are the same commit.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ComputedProps(Arc<IndexMap<PropKey, PropValue>>);

impl ComputedProps {
    pub fn new(values: IndexMap<PropKey, PropValue>) -> Self {
        Self(Arc::new(values))
    }

    pub fn get(&self, key: &PropKey) -> Option<&PropValue> {
        self.0.get(key)
    }

    pub fn bool(&self, key: &PropKey) -> Option<bool> {
        self.get(key).and_then(PropValue::as_bool)
    }

    pub fn text(&self, key: &PropKey) -> Option<&str> {
        self.get(key).and_then(PropValue::as_text)
    }

    pub fn number(&self, key: &PropKey) -> Option<f64> {
        self.get(key).and_then(PropValue::as_number)
    }

    pub fn length(&self, key: &PropKey) -> Option<Length> {
        self.get(key).and_then(PropValue::as_length)
    }

    /// Whether the widget resolved `hidden` to true
    pub fn is_hidden(&self) -> bool {
        self.bool(&PropKey::Hidden).unwrap_or(false)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PropKey, &PropValue)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether both snapshots are the same allocation
    pub fn ptr_eq(&self, other: &ComputedProps) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// A new snapshot with `changes` merged over the current values
    pub(crate) fn merged(&self, changes: Vec<(PropKey, PropValue)>) -> Self {
        let mut values = (*self.0).clone();
        values.extend(changes);
        Self::new(values)
    }
}
