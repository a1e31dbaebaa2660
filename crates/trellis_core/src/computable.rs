//! Computable property values
//!
//! A widget property is either a literal or a resolver that derives its
//! value from the form values. Resolvers declare the fields they depend on
//! when they are constructed, so the engine never has to guess:
//!
//! - [`Computable::Literal`] - fixed value, resolved once
//! - [`Computable::Single`] - recomputed when one field changes
//! - [`Computable::Multi`] - recomputed when any listed field changes
//! - [`Computable::OwnField`] - recomputed when the owning input's field changes
//!
//! Every resolver receives the full [`Snapshot`], not just the field that
//! fired, and must be a pure function of it.
//!
//! # Example
//!
//! ```rust
//! use trellis_core::computable::Computable;
//! use trellis_core::props::PropValue;
//! use trellis_core::value::{FieldValue, Snapshot};
//!
//! let disabled = Computable::watch("age", |v| v.int("age").unwrap_or(0) < 18);
//! let snapshot = Snapshot::new(FieldValue::object().with("age", 16));
//! assert_eq!(disabled.resolve(&snapshot), PropValue::Bool(true));
//! ```

use std::fmt;
use std::sync::Arc;

use smallvec::SmallVec;

use crate::props::{Length, PropValue};
use crate::value::{FieldPath, Snapshot};

/// Type-erased resolver function
pub type Resolver = Arc<dyn Fn(&Snapshot) -> PropValue + Send + Sync>;

/// A property definition that may depend on form values
#[derive(Clone)]
pub enum Computable {
    /// A fixed value
    Literal(PropValue),
    /// Derived from the snapshot, recomputed when `dependency` changes
    Single {
        dependency: FieldPath,
        resolver: Resolver,
    },
    /// Derived from the snapshot, recomputed when any of `dependencies` changes
    Multi {
        dependencies: Vec<FieldPath>,
        resolver: Resolver,
    },
    /// Derived from the snapshot, recomputed when the owning input's field
    /// changes. Containers have no field, so on them this never recomputes.
    OwnField { resolver: Resolver },
}

fn erase<T, F>(resolve: F) -> Resolver
where
    T: Into<PropValue>,
    F: Fn(&Snapshot) -> T + Send + Sync + 'static,
{
    Arc::new(move |snapshot: &Snapshot| resolve(snapshot).into())
}

impl Computable {
    pub fn literal(value: impl Into<PropValue>) -> Self {
        Computable::Literal(value.into())
    }

    /// Resolver depending on a single field
    pub fn watch<T, F>(dependency: impl Into<FieldPath>, resolve: F) -> Self
    where
        T: Into<PropValue>,
        F: Fn(&Snapshot) -> T + Send + Sync + 'static,
    {
        Computable::Single {
            dependency: dependency.into(),
            resolver: erase(resolve),
        }
    }

    /// Resolver depending on several fields
    pub fn watch_all<P, T, F>(dependencies: impl IntoIterator<Item = P>, resolve: F) -> Self
    where
        P: Into<FieldPath>,
        T: Into<PropValue>,
        F: Fn(&Snapshot) -> T + Send + Sync + 'static,
    {
        Computable::Multi {
            dependencies: dependencies.into_iter().map(Into::into).collect(),
            resolver: erase(resolve),
        }
    }

    /// Resolver depending on the owning input's own field
    pub fn own<T, F>(resolve: F) -> Self
    where
        T: Into<PropValue>,
        F: Fn(&Snapshot) -> T + Send + Sync + 'static,
    {
        Computable::OwnField {
            resolver: erase(resolve),
        }
    }

    /// Produce the concrete value against `snapshot`
    pub fn resolve(&self, snapshot: &Snapshot) -> PropValue {
        match self {
            Computable::Literal(value) => value.clone(),
            Computable::Single { resolver, .. }
            | Computable::Multi { resolver, .. }
            | Computable::OwnField { resolver } => resolver(snapshot),
        }
    }

    pub fn resolver(&self) -> Option<&Resolver> {
        match self {
            Computable::Literal(_) => None,
            Computable::Single { resolver, .. }
            | Computable::Multi { resolver, .. }
            | Computable::OwnField { resolver } => Some(resolver),
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Computable::Literal(_))
    }

    /// Fields whose change must trigger a recompute, without duplicates
    ///
    /// `own_field` is the field of the input owning this property, if any.
    pub fn dependencies<'a>(&'a self, own_field: Option<&'a FieldPath>) -> SmallVec<[&'a FieldPath; 2]> {
        let mut deps: SmallVec<[&FieldPath; 2]> = SmallVec::new();
        match self {
            Computable::Literal(_) => {}
            Computable::Single { dependency, .. } => deps.push(dependency),
            Computable::Multi { dependencies, .. } => {
                for dependency in dependencies {
                    if !deps.contains(&dependency) {
                        deps.push(dependency);
                    }
                }
            }
            Computable::OwnField { .. } => deps.extend(own_field),
        }
        deps
    }
}

impl fmt::Debug for Computable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Computable::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            Computable::Single { dependency, .. } => f
                .debug_struct("Single")
                .field("dependency", dependency)
                .finish_non_exhaustive(),
            Computable::Multi { dependencies, .. } => f
                .debug_struct("Multi")
                .field("dependencies", dependencies)
                .finish_non_exhaustive(),
            Computable::OwnField { .. } => f.debug_struct("OwnField").finish_non_exhaustive(),
        }
    }
}

impl From<PropValue> for Computable {
    fn from(value: PropValue) -> Self {
        Computable::Literal(value)
    }
}

impl From<bool> for Computable {
    fn from(value: bool) -> Self {
        Computable::Literal(value.into())
    }
}

impl From<&str> for Computable {
    fn from(value: &str) -> Self {
        Computable::Literal(value.into())
    }
}

impl From<String> for Computable {
    fn from(value: String) -> Self {
        Computable::Literal(value.into())
    }
}

impl From<f32> for Computable {
    fn from(value: f32) -> Self {
        Computable::Literal(value.into())
    }
}

impl From<f64> for Computable {
    fn from(value: f64) -> Self {
        Computable::Literal(value.into())
    }
}

impl From<i32> for Computable {
    fn from(value: i32) -> Self {
        Computable::Literal(value.into())
    }
}

impl From<Length> for Computable {
    fn from(value: Length) -> Self {
        Computable::Literal(value.into())
    }
}
