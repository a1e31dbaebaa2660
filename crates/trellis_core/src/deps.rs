//! Dependency map builder
//!
//! Inverts a widget's [`PropMap`] into "field -> properties to recompute".
//! A multi-dependency resolver is registered once under every field it
//! lists; when one of those fields fires only that entry is recomputed.
//! Literals never appear in the map.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::computable::Resolver;
use crate::props::{PropKey, PropMap};
use crate::value::FieldPath;

/// One property to recompute when a field changes
#[derive(Clone)]
pub struct DependencyEntry {
    pub key: PropKey,
    pub resolver: Resolver,
}

impl std::fmt::Debug for DependencyEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DependencyEntry")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

/// Field path -> ordered properties depending on it
#[derive(Clone, Debug, Default)]
pub struct DependencyMap {
    entries: FxHashMap<FieldPath, SmallVec<[DependencyEntry; 2]>>,
}

impl DependencyMap {
    /// Build the map for one widget
    ///
    /// `own_field` is the field bound by the widget, used by own-field
    /// resolvers. Entries for a field keep the property declaration order.
    pub fn build(props: &PropMap, own_field: Option<&FieldPath>) -> Self {
        let mut entries: FxHashMap<FieldPath, SmallVec<[DependencyEntry; 2]>> =
            FxHashMap::default();

        for (key, computable) in props.iter() {
            let Some(resolver) = computable.resolver() else {
                continue;
            };
            for field in computable.dependencies(own_field) {
                entries
                    .entry(field.clone())
                    .or_default()
                    .push(DependencyEntry {
                        key: key.clone(),
                        resolver: resolver.clone(),
                    });
            }
        }

        Self { entries }
    }

    /// Properties to recompute when `field` changes
    pub fn affected(&self, field: &str) -> Option<&[DependencyEntry]> {
        self.entries.get(field).map(|entries| entries.as_slice())
    }

    pub fn contains(&self, field: &str) -> bool {
        self.entries.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
