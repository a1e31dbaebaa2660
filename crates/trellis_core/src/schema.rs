//! Form schema
//!
//! The schema describes the shape of the form data. The core only needs two
//! things from it: the default value tree, and the primitive category of a
//! leaf addressed by a dotted path. [`FormSchema`] captures that capability so
//! hosts can plug in their own schema system; [`ObjectSchema`] is a flat tree
//! of [`FieldDescriptor`]s built once and immutable afterwards.
//!
//! # Example
//!
//! ```rust
//! use trellis_core::schema::{FieldDescriptor, FormSchema, ObjectSchema};
//! use trellis_core::value::FieldKind;
//!
//! let schema = ObjectSchema::builder()
//!     .field(FieldDescriptor::new("age", FieldKind::Int).required())
//!     .object("name", |name| {
//!         name.field(FieldDescriptor::new("first", FieldKind::String))
//!             .field(FieldDescriptor::new("last", FieldKind::String))
//!     })
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(schema.leaf("name.first").map(|f| f.kind), Some(FieldKind::String));
//! assert!(schema.default_value().get_path("name.last").is_some());
//! ```

use indexmap::IndexMap;

use crate::error::Result;
use crate::value::{FieldKind, FieldPath, FieldValue};

/// Schema capability consumed by the layout compiler and the form store
pub trait FormSchema: Send + Sync {
    /// A fresh value tree holding every field's default
    fn default_value(&self) -> FieldValue;

    /// Descriptor of the leaf at `path`, `None` if it is not a leaf
    fn leaf(&self, path: &str) -> Option<&FieldDescriptor>;

    /// Every leaf in declaration order
    fn leaves(&self) -> Vec<&FieldDescriptor>;
}

/// Description of one leaf field
#[derive(Clone, Debug, PartialEq)]
pub struct FieldDescriptor {
    pub path: FieldPath,
    pub kind: FieldKind,
    pub required: bool,
    pub default: FieldValue,
}

impl FieldDescriptor {
    /// A new optional field with a null default
    pub fn new(path: impl Into<FieldPath>, kind: FieldKind) -> Self {
        Self {
            path: path.into(),
            kind,
            required: false,
            default: FieldValue::Null,
        }
    }

    /// Mark the field as required
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Set the default value
    pub fn default_value(mut self, value: impl Into<FieldValue>) -> Self {
        self.default = value.into();
        self
    }
}

/// Schema made of nested objects with primitive leaves
#[derive(Clone, Debug)]
pub struct ObjectSchema {
    leaves: IndexMap<FieldPath, FieldDescriptor>,
    defaults: FieldValue,
}

impl ObjectSchema {
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    /// Number of leaf fields
    pub fn len(&self) -> usize {
        self.leaves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }
}

impl FormSchema for ObjectSchema {
    fn default_value(&self) -> FieldValue {
        self.defaults.clone()
    }

    fn leaf(&self, path: &str) -> Option<&FieldDescriptor> {
        self.leaves.get(path)
    }

    fn leaves(&self) -> Vec<&FieldDescriptor> {
        self.leaves.values().collect()
    }
}

/// Builder for [`ObjectSchema`]
#[derive(Default)]
pub struct SchemaBuilder {
    prefix: FieldPath,
    leaves: Vec<FieldDescriptor>,
}

impl SchemaBuilder {
    /// Add a leaf field relative to the current object
    pub fn field(mut self, mut descriptor: FieldDescriptor) -> Self {
        descriptor.path = self.prefix.join(descriptor.path.as_str());
        self.leaves.push(descriptor);
        self
    }

    /// Add a nested object; `build` receives a builder scoped to it
    pub fn object(mut self, name: &str, build: impl FnOnce(SchemaBuilder) -> SchemaBuilder) -> Self {
        let nested = build(SchemaBuilder {
            prefix: self.prefix.join(name),
            leaves: Vec::new(),
        });
        self.leaves.extend(nested.leaves);
        self
    }

    /// Finish the schema
    ///
    /// Fails when a path is declared both as a leaf and as an object, or is
    /// not a valid dotted path.
    pub fn build(self) -> Result<ObjectSchema> {
        let mut defaults = FieldValue::object();
        let mut leaves = IndexMap::new();
        for descriptor in self.leaves {
            let path = FieldPath::parse(descriptor.path.as_str())?;
            defaults.set_path(&path, descriptor.default.clone())?;
            leaves.insert(path, descriptor);
        }

        // Drop leaves shadowed by a conflicting later declaration
        leaves.retain(|path, _| {
            defaults
                .get_path(path.as_str())
                .map_or(false, |value| value.as_object().is_none())
        });

        tracing::debug!(fields = leaves.len(), "built object schema");
        Ok(ObjectSchema { leaves, defaults })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;

    fn person_schema() -> ObjectSchema {
        ObjectSchema::builder()
            .field(FieldDescriptor::new("age", FieldKind::Int).default_value(16))
            .object("name", |name| {
                name.field(FieldDescriptor::new("first", FieldKind::String).required())
                    .field(FieldDescriptor::new("last", FieldKind::String).required())
            })
            .field(FieldDescriptor::new("favoriteNumber", FieldKind::Decimal))
            .build()
            .unwrap()
    }

    #[test]
    fn test_leaves_are_prefixed() {
        let schema = person_schema();
        let paths: Vec<&str> = schema.leaves().iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["age", "name.first", "name.last", "favoriteNumber"]);
        assert_eq!(schema.len(), 4);
    }

    #[test]
    fn test_leaf_lookup() {
        let schema = person_schema();
        let first = schema.leaf("name.first").unwrap();
        assert_eq!(first.kind, FieldKind::String);
        assert!(first.required);
        assert!(schema.leaf("name").is_none());
        assert!(schema.leaf("missing").is_none());
    }

    #[test]
    fn test_default_value_shape() {
        let defaults = person_schema().default_value();
        assert_eq!(defaults.get_path("age"), Some(&FieldValue::Int(16)));
        assert_eq!(defaults.get_path("name.first"), Some(&FieldValue::Null));
        assert!(defaults.get_path("name").unwrap().as_object().is_some());
    }

    #[test]
    fn test_leaf_under_leaf_is_rejected() {
        let result = ObjectSchema::builder()
            .field(FieldDescriptor::new("age", FieldKind::Int).default_value(0))
            .field(FieldDescriptor::new("age.years", FieldKind::Int))
            .build();
        assert!(matches!(result, Err(CoreError::NotAnObject { .. })));
    }

    #[test]
    fn test_null_leaf_shadowed_by_object() {
        let schema = ObjectSchema::builder()
            .field(FieldDescriptor::new("age", FieldKind::Int))
            .field(FieldDescriptor::new("age.years", FieldKind::Int))
            .build()
            .unwrap();
        assert!(schema.leaf("age").is_none());
        assert!(schema.leaf("age.years").is_some());
    }
}
