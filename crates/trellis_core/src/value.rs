//! Dynamic form values
//!
//! Form data is held as a [`FieldValue`] tree: objects nest, leaves carry
//! one of the primitive categories described by [`FieldKind`]. Fields are
//! addressed with dotted [`FieldPath`]s such as `name.first`.
//!
//! Resolvers never see the live tree. They receive a [`Snapshot`], an
//! immutable, cheaply clonable view of all values taken at notification time.

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use indexmap::IndexMap;

use crate::error::{CoreError, Result};

// ─────────────────────────────────────────────────────────────────────────────
// Field Path
// ─────────────────────────────────────────────────────────────────────────────

/// Dotted path addressing a value inside a [`FieldValue`] tree
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct FieldPath(String);

impl FieldPath {
    /// Create a path without validating it
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// Create a path, rejecting empty paths and empty segments (`a..b`)
    pub fn parse(path: impl Into<String>) -> Result<Self> {
        let path = path.into();
        if path.is_empty() || path.split('.').any(str::is_empty) {
            return Err(CoreError::InvalidPath { path });
        }
        Ok(Self(path))
    }

    /// The dotted representation
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Iterate the path segments
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('.')
    }

    /// Append a segment, producing a child path
    pub fn join(&self, segment: &str) -> Self {
        if self.0.is_empty() {
            Self(segment.to_string())
        } else {
            Self(format!("{}.{}", self.0, segment))
        }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for FieldPath {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for FieldPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for FieldPath {
    fn from(path: &str) -> Self {
        Self(path.to_string())
    }
}

impl From<String> for FieldPath {
    fn from(path: String) -> Self {
        Self(path)
    }
}

impl From<&FieldPath> for FieldPath {
    fn from(path: &FieldPath) -> Self {
        path.clone()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Field Kind
// ─────────────────────────────────────────────────────────────────────────────

/// Primitive category of a leaf value
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Boolean,
    Int,
    Decimal,
    String,
    Date,
    DateTime,
    Time,
}

impl FieldKind {
    /// Whether an input declared for `self` can edit a field of kind `field`
    ///
    /// Categories must match exactly, except that decimal inputs accept
    /// integer fields.
    pub fn accepts(self, field: FieldKind) -> bool {
        self == field || matches!((self, field), (FieldKind::Decimal, FieldKind::Int))
    }

    /// Lowercase name used in messages and config files
    pub fn name(self) -> &'static str {
        match self {
            FieldKind::Boolean => "boolean",
            FieldKind::Int => "int",
            FieldKind::Decimal => "decimal",
            FieldKind::String => "string",
            FieldKind::Date => "date",
            FieldKind::DateTime => "datetime",
            FieldKind::Time => "time",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Field Value
// ─────────────────────────────────────────────────────────────────────────────

/// A dynamically typed form value
#[derive(Clone, Debug, PartialEq, Default)]
pub enum FieldValue {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Decimal(f64),
    String(String),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Time(NaiveTime),
    Object(IndexMap<String, FieldValue>),
}

impl FieldValue {
    /// An empty object
    pub fn object() -> Self {
        FieldValue::Object(IndexMap::new())
    }

    /// Builder-style insert for object literals; no-op on non-objects
    pub fn with(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        if let FieldValue::Object(ref mut map) = self {
            map.insert(key.into(), value.into());
        }
        self
    }

    /// Primitive category of this value, `None` for null and objects
    pub fn kind(&self) -> Option<FieldKind> {
        match self {
            FieldValue::Bool(_) => Some(FieldKind::Boolean),
            FieldValue::Int(_) => Some(FieldKind::Int),
            FieldValue::Decimal(_) => Some(FieldKind::Decimal),
            FieldValue::String(_) => Some(FieldKind::String),
            FieldValue::Date(_) => Some(FieldKind::Date),
            FieldValue::DateTime(_) => Some(FieldKind::DateTime),
            FieldValue::Time(_) => Some(FieldKind::Time),
            FieldValue::Null | FieldValue::Object(_) => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            FieldValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric value, widening integers
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Int(i) => Some(*i as f64),
            FieldValue::Decimal(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&IndexMap<String, FieldValue>> {
        match self {
            FieldValue::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Look up a dotted path
    pub fn get_path(&self, path: &str) -> Option<&FieldValue> {
        path.split('.').try_fold(self, |current, segment| match current {
            FieldValue::Object(map) => map.get(segment),
            _ => None,
        })
    }

    /// Write a value at a dotted path, creating intermediate objects in
    /// place of nulls
    pub fn set_path(&mut self, path: &FieldPath, value: FieldValue) -> Result<()> {
        let segments: Vec<&str> = path.segments().collect();
        let Some((last, parents)) = segments.split_last() else {
            return Err(CoreError::InvalidPath {
                path: path.to_string(),
            });
        };
        if segments.iter().any(|s| s.is_empty()) {
            return Err(CoreError::InvalidPath {
                path: path.to_string(),
            });
        }

        let mut current = self;
        for segment in parents {
            if current.is_null() {
                *current = FieldValue::object();
            }
            current = match current {
                FieldValue::Object(map) => map
                    .entry((*segment).to_string())
                    .or_insert(FieldValue::Null),
                _ => {
                    return Err(CoreError::NotAnObject {
                        path: path.to_string(),
                    })
                }
            };
        }

        if current.is_null() {
            *current = FieldValue::object();
        }
        let FieldValue::Object(map) = current else {
            return Err(CoreError::NotAnObject {
                path: path.to_string(),
            });
        };
        map.insert((*last).to_string(), value);
        Ok(())
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Int(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Int(value.into())
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Decimal(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::String(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::String(value)
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(value: NaiveDate) -> Self {
        FieldValue::Date(value)
    }
}

impl From<NaiveDateTime> for FieldValue {
    fn from(value: NaiveDateTime) -> Self {
        FieldValue::DateTime(value)
    }
}

impl From<NaiveTime> for FieldValue {
    fn from(value: NaiveTime) -> Self {
        FieldValue::Time(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(FieldValue::Null, Into::into)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Snapshot
// ─────────────────────────────────────────────────────────────────────────────

/// Read-only view of every form value at one point in time
#[derive(Clone, Debug, Default)]
pub struct Snapshot(Arc<FieldValue>);

impl Snapshot {
    pub fn new(root: FieldValue) -> Self {
        Self(Arc::new(root))
    }

    /// The root value (normally an object)
    pub fn root(&self) -> &FieldValue {
        &self.0
    }

    pub fn get(&self, path: &str) -> Option<&FieldValue> {
        self.0.get_path(path)
    }

    pub fn bool(&self, path: &str) -> Option<bool> {
        self.get(path).and_then(FieldValue::as_bool)
    }

    pub fn int(&self, path: &str) -> Option<i64> {
        self.get(path).and_then(FieldValue::as_int)
    }

    pub fn number(&self, path: &str) -> Option<f64> {
        self.get(path).and_then(FieldValue::as_f64)
    }

    pub fn text(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(FieldValue::as_str)
    }

    /// Whether two snapshots share the same underlying tree
    pub fn ptr_eq(&self, other: &Snapshot) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl From<FieldValue> for Snapshot {
    fn from(root: FieldValue) -> Self {
        Self::new(root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person() -> FieldValue {
        FieldValue::object()
            .with("age", 16)
            .with("name", FieldValue::object().with("first", "Ada").with("last", ""))
    }

    #[test]
    fn test_get_path_nested() {
        let value = person();
        assert_eq!(value.get_path("age"), Some(&FieldValue::Int(16)));
        assert_eq!(
            value.get_path("name.first").and_then(FieldValue::as_str),
            Some("Ada")
        );
        assert_eq!(value.get_path("name.middle"), None);
        assert_eq!(value.get_path("age.years"), None);
    }

    #[test]
    fn test_set_path_creates_objects() {
        let mut value = FieldValue::Null;
        value
            .set_path(&FieldPath::from("address.city"), "Oslo".into())
            .unwrap();
        assert_eq!(
            value.get_path("address.city").and_then(FieldValue::as_str),
            Some("Oslo")
        );
    }

    #[test]
    fn test_set_path_through_leaf_fails() {
        let mut value = person();
        let err = value
            .set_path(&FieldPath::from("age.years"), 3.into())
            .unwrap_err();
        assert_eq!(
            err,
            CoreError::NotAnObject {
                path: "age.years".into()
            }
        );
    }

    #[test]
    fn test_parse_rejects_empty_segments() {
        assert!(FieldPath::parse("name.first").is_ok());
        assert!(FieldPath::parse("").is_err());
        assert!(FieldPath::parse("name..first").is_err());
        assert!(FieldPath::parse(".name").is_err());
    }

    #[test]
    fn test_kind_acceptance() {
        assert!(FieldKind::Decimal.accepts(FieldKind::Int));
        assert!(!FieldKind::Int.accepts(FieldKind::Decimal));
        assert!(!FieldKind::String.accepts(FieldKind::Int));
        assert!(FieldKind::Date.accepts(FieldKind::Date));
    }

    #[test]
    fn test_snapshot_accessors() {
        let snapshot = Snapshot::new(person());
        assert_eq!(snapshot.int("age"), Some(16));
        assert_eq!(snapshot.number("age"), Some(16.0));
        assert_eq!(snapshot.text("name.first"), Some("Ada"));
        assert_eq!(snapshot.bool("age"), None);

        let clone = snapshot.clone();
        assert!(clone.ptr_eq(&snapshot));
    }
}
