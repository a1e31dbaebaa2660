//! Form state - values, change notifications and field bindings
//!
//! [`FormState`] is the capability the layout layer consumes: read a snapshot
//! of every value, subscribe to per-field change notifications, and obtain a
//! [`FieldBinding`] for an input. [`FormStore`] is the in-process
//! implementation, seeded from a schema's default value.
//!
//! Listeners are invoked synchronously after the store has released its
//! locks, so a listener may read the store again (or write to it).
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use trellis_core::form_state::{ChangeKind, FormState, FormStore};
//! use trellis_core::schema::{FieldDescriptor, ObjectSchema};
//! use trellis_core::value::{FieldKind, FieldPath};
//!
//! let schema = ObjectSchema::builder()
//!     .field(FieldDescriptor::new("age", FieldKind::Int).default_value(16))
//!     .build()
//!     .unwrap();
//! let store = FormStore::new(Arc::new(schema));
//!
//! let subscription = store.subscribe(Arc::new(|field: &FieldPath, _kind: ChangeKind| {
//!     println!("{field} changed");
//! }));
//!
//! store.set_value("age", 19).unwrap();
//! assert_eq!(store.values().int("age"), Some(19));
//! subscription.unsubscribe();
//! ```

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, Weak};

use rustc_hash::FxHashSet;
use slotmap::{new_key_type, SlotMap};

use crate::error::{CoreError, Result};
use crate::schema::FormSchema;
use crate::value::{FieldKind, FieldPath, FieldValue, Snapshot};

new_key_type! {
    /// Identifier of a registered change listener
    pub struct ListenerId;
}

/// Why a field notification was sent
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChangeKind {
    /// The value was written through a binding or `set_value`
    Change,
    /// The whole form was reset to its defaults
    Reset,
}

/// Callback receiving the changed field and the change kind
pub type ChangeListener = Arc<dyn Fn(&FieldPath, ChangeKind) + Send + Sync>;

/// Form state capability
pub trait FormState: Send + Sync {
    /// Snapshot of every current value
    fn values(&self) -> Snapshot;

    /// Register a change listener; dropping the returned guard unsubscribes
    fn subscribe(&self, listener: ChangeListener) -> Subscription;

    /// Binding object for the input editing `path`
    fn bind(&self, path: &FieldPath) -> FieldBinding;
}

// ─────────────────────────────────────────────────────────────────────────────
// Subscription
// ─────────────────────────────────────────────────────────────────────────────

/// Scoped listener registration
///
/// The listener stays registered until the guard is dropped or
/// [`Subscription::unsubscribe`] is called. Release happens exactly once.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    release: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    /// Create a guard that runs `release` when dropped
    pub fn new(release: impl FnOnce() + Send + Sync + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    /// Release the listener now
    pub fn unsubscribe(mut self) {
        self.release_now();
    }

    fn release_now(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release_now();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.release.is_some())
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Field Binding
// ─────────────────────────────────────────────────────────────────────────────

/// Value and handlers connecting one input to the form state
#[derive(Clone)]
pub struct FieldBinding {
    pub path: FieldPath,
    pub value: FieldValue,
    pub on_change: Arc<dyn Fn(FieldValue) + Send + Sync>,
    pub on_blur: Arc<dyn Fn() + Send + Sync>,
}

impl fmt::Debug for FieldBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldBinding")
            .field("path", &self.path)
            .field("value", &self.value)
            .finish_non_exhaustive()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Form Store
// ─────────────────────────────────────────────────────────────────────────────

struct StoreInner {
    schema: Arc<dyn FormSchema>,
    values: RwLock<Snapshot>,
    touched: RwLock<FxHashSet<FieldPath>>,
    listeners: Mutex<SlotMap<ListenerId, ChangeListener>>,
}

impl StoreInner {
    fn snapshot(&self) -> Snapshot {
        self.values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn listeners(&self) -> MutexGuard<'_, SlotMap<ListenerId, ChangeListener>> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Deliver notifications outside of every lock
    fn notify(&self, fields: &[FieldPath], kind: ChangeKind) {
        let listeners: Vec<ChangeListener> = self.listeners().values().cloned().collect();
        for field in fields {
            tracing::trace!(%field, ?kind, listeners = listeners.len(), "notify field change");
            for listener in &listeners {
                listener(field, kind);
            }
        }
    }
}

/// In-process form state seeded from a schema
#[derive(Clone)]
pub struct FormStore {
    inner: Arc<StoreInner>,
}

impl FormStore {
    /// Create a store holding the schema's default values
    pub fn new(schema: Arc<dyn FormSchema>) -> Self {
        let values = Snapshot::new(schema.default_value());
        Self {
            inner: Arc::new(StoreInner {
                schema,
                values: RwLock::new(values),
                touched: RwLock::new(FxHashSet::default()),
                listeners: Mutex::new(SlotMap::with_key()),
            }),
        }
    }

    /// Write a leaf value and notify listeners
    ///
    /// The value must be null or of a kind the leaf accepts. The previous
    /// snapshot is left untouched; readers holding it keep a consistent view.
    pub fn set_value(&self, path: impl Into<FieldPath>, value: impl Into<FieldValue>) -> Result<()> {
        let path = path.into();
        let value = value.into();
        let Some(leaf) = self.inner.schema.leaf(path.as_str()) else {
            return Err(CoreError::UnknownField {
                path: path.to_string(),
            });
        };
        if !value.is_null() {
            let found = value.kind();
            if !found.is_some_and(|found| leaf.kind.accepts(found)) {
                return Err(CoreError::KindMismatch {
                    path: path.to_string(),
                    expected: leaf.kind,
                    found: found.map_or("object", FieldKind::name),
                });
            }
        }

        {
            let mut values = self
                .inner
                .values
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            let mut root = values.root().clone();
            root.set_path(&path, value)?;
            *values = Snapshot::new(root);
        }

        self.inner.notify(std::slice::from_ref(&path), ChangeKind::Change);
        Ok(())
    }

    /// Restore every field to its schema default, notifying each leaf
    pub fn reset(&self) {
        {
            let mut values = self
                .inner
                .values
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            *values = Snapshot::new(self.inner.schema.default_value());
        }
        self.inner
            .touched
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();

        let fields: Vec<FieldPath> = self
            .inner
            .schema
            .leaves()
            .into_iter()
            .map(|leaf| leaf.path.clone())
            .collect();
        self.inner.notify(&fields, ChangeKind::Reset);
    }

    /// Mark a field as touched (its input lost focus at least once)
    pub fn touch(&self, path: &FieldPath) {
        self.inner
            .touched
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path.clone());
    }

    pub fn is_touched(&self, path: &str) -> bool {
        self.inner
            .touched
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(path)
    }

    /// Whether the field differs from its schema default
    pub fn is_dirty_field(&self, path: &str) -> bool {
        let current = self.inner.snapshot().get(path).cloned().unwrap_or_default();
        let default = self
            .inner
            .schema
            .leaf(path)
            .map(|leaf| leaf.default.clone())
            .unwrap_or_default();
        current != default
    }

    /// Number of registered listeners
    pub fn listener_count(&self) -> usize {
        self.inner.listeners().len()
    }

    pub fn schema(&self) -> &Arc<dyn FormSchema> {
        &self.inner.schema
    }
}

impl FormState for FormStore {
    fn values(&self) -> Snapshot {
        self.inner.snapshot()
    }

    fn subscribe(&self, listener: ChangeListener) -> Subscription {
        let id = self.inner.listeners().insert(listener);
        let weak: Weak<StoreInner> = Arc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.listeners().remove(id);
            }
        })
    }

    fn bind(&self, path: &FieldPath) -> FieldBinding {
        let value = self
            .inner
            .snapshot()
            .get(path.as_str())
            .cloned()
            .unwrap_or_default();

        let store = self.clone();
        let change_path = path.clone();
        let on_change = Arc::new(move |value: FieldValue| {
            if let Err(err) = store.set_value(change_path.clone(), value) {
                tracing::warn!(path = %change_path, %err, "rejected field write");
            }
        });

        let store = self.clone();
        let blur_path = path.clone();
        let on_blur = Arc::new(move || store.touch(&blur_path));

        FieldBinding {
            path: path.clone(),
            value,
            on_change,
            on_blur,
        }
    }
}

impl fmt::Debug for FormStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormStore")
            .field("values", &self.inner.snapshot())
            .field("listeners", &self.listener_count())
            .finish()
    }
}
