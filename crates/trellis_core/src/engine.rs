//! Computed props engine
//!
//! [`PropsEngine`] holds the materialized properties of one widget instance
//! and recomputes the subset affected by a field change. [`LiveProps`] wires
//! an engine to a [`FormState`] for the lifetime of a mounted widget.
//!
//! Lifecycle of a live widget:
//!
//! 1. **Init** - every computable is resolved against the current snapshot
//! 2. **Subscribed** - one listener is registered with the form state;
//!    notifications for fields absent from the dependency map are ignored
//! 3. **Commit** - recomputed values are compared by value; if nothing
//!    changed the [`ComputedProps`] identity is kept, otherwise the changed
//!    entries are merged into a new snapshot
//! 4. **Teardown** - dropping [`LiveProps`] (or calling
//!    [`LiveProps::unmount`]) releases the listener and its handle on the
//!    form state; nothing recomputes after
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use trellis_core::computable::Computable;
//! use trellis_core::engine::LiveProps;
//! use trellis_core::form_state::{FormState, FormStore};
//! use trellis_core::props::{PropKey, PropMap};
//! use trellis_core::schema::{FieldDescriptor, ObjectSchema};
//! use trellis_core::value::FieldKind;
//!
//! let schema = ObjectSchema::builder()
//!     .field(FieldDescriptor::new("age", FieldKind::Int).default_value(16))
//!     .build()
//!     .unwrap();
//! let store = FormStore::new(Arc::new(schema));
//! let state: Arc<dyn FormState> = Arc::new(store.clone());
//!
//! let props = PropMap::new().with(
//!     PropKey::Disabled,
//!     Computable::watch("age", |v| v.int("age").unwrap_or(0) < 18),
//! );
//! let live = LiveProps::mount(Arc::new(props), None, &state);
//! assert_eq!(live.props().bool(&PropKey::Disabled), Some(true));
//!
//! store.set_value("age", 19).unwrap();
//! assert_eq!(live.props().bool(&PropKey::Disabled), Some(false));
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use indexmap::IndexMap;

use crate::deps::DependencyMap;
use crate::form_state::{ChangeKind, FormState, Subscription};
use crate::props::{ComputedProps, PropKey, PropMap, PropValue};
use crate::value::{FieldPath, Snapshot};

/// Callback invoked after a commit produced a new snapshot
pub type CommitCallback = Arc<dyn Fn(&ComputedProps) + Send + Sync>;

/// Materialized properties of one widget instance
pub struct PropsEngine {
    props: Arc<PropMap>,
    own_field: Option<FieldPath>,
    deps: DependencyMap,
    current: ComputedProps,
    recompute_count: u64,
}

fn resolve_all(props: &PropMap, snapshot: &Snapshot) -> ComputedProps {
    let values: IndexMap<PropKey, PropValue> = props
        .iter()
        .map(|(key, computable)| (key.clone(), computable.resolve(snapshot)))
        .collect();
    ComputedProps::new(values)
}

impl PropsEngine {
    /// Resolve every property against `snapshot`
    pub fn new(props: Arc<PropMap>, own_field: Option<FieldPath>, snapshot: &Snapshot) -> Self {
        let deps = DependencyMap::build(&props, own_field.as_ref());
        let current = resolve_all(&props, snapshot);
        Self {
            props,
            own_field,
            deps,
            current,
            recompute_count: 0,
        }
    }

    /// Current snapshot of the materialized properties
    pub fn props(&self) -> &ComputedProps {
        &self.current
    }

    pub fn dependencies(&self) -> &DependencyMap {
        &self.deps
    }

    /// Whether a change of `field` may affect this widget
    pub fn watches(&self, field: &str) -> bool {
        self.deps.contains(field)
    }

    /// Number of resolver invocations since init
    pub fn recompute_count(&self) -> u64 {
        self.recompute_count
    }

    /// Recompute the properties depending on `field` and commit
    ///
    /// Returns `true` when a new snapshot was committed.
    pub fn handle_change(&mut self, field: &str, snapshot: &Snapshot) -> bool {
        let Some(entries) = self.deps.affected(field) else {
            return false;
        };

        let changed: Vec<(PropKey, PropValue)> = entries
            .iter()
            .map(|entry| (entry.key.clone(), (entry.resolver)(snapshot)))
            .filter(|(key, value)| self.current.get(key) != Some(value))
            .collect();
        self.recompute_count += entries.len() as u64;

        if changed.is_empty() {
            return false;
        }

        tracing::trace!(field, changed = changed.len(), "commit computed props");
        self.current = self.current.merged(changed);
        true
    }

    /// Swap in a different property map
    ///
    /// The dependency map is rebuilt only when `props` is a different
    /// allocation. The snapshot identity is kept if every value resolves equal.
    pub fn rebind(&mut self, props: Arc<PropMap>, snapshot: &Snapshot) -> bool {
        if Arc::ptr_eq(&self.props, &props) {
            return false;
        }
        self.deps = DependencyMap::build(&props, self.own_field.as_ref());
        self.props = props;

        let next = resolve_all(&self.props, snapshot);
        if next == self.current {
            return false;
        }
        self.current = next;
        true
    }
}

impl std::fmt::Debug for PropsEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropsEngine")
            .field("own_field", &self.own_field)
            .field("current", &self.current)
            .field("recompute_count", &self.recompute_count)
            .finish_non_exhaustive()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Live Props
// ─────────────────────────────────────────────────────────────────────────────

fn lock(engine: &Mutex<PropsEngine>) -> MutexGuard<'_, PropsEngine> {
    engine.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A [`PropsEngine`] subscribed to a form state
///
/// Holds exactly one listener while mounted.
pub struct LiveProps {
    engine: Arc<Mutex<PropsEngine>>,
    active: Arc<AtomicBool>,
    subscription: Option<Subscription>,
}

impl LiveProps {
    /// Init the engine from the state's current values and subscribe
    pub fn mount(
        props: Arc<PropMap>,
        own_field: Option<FieldPath>,
        state: &Arc<dyn FormState>,
    ) -> Self {
        Self::mount_with(props, own_field, state, None)
    }

    /// Like [`LiveProps::mount`], invoking `on_commit` after every commit
    pub fn mount_with(
        props: Arc<PropMap>,
        own_field: Option<FieldPath>,
        state: &Arc<dyn FormState>,
        on_commit: Option<CommitCallback>,
    ) -> Self {
        let engine = Arc::new(Mutex::new(PropsEngine::new(
            props,
            own_field,
            &state.values(),
        )));
        let active = Arc::new(AtomicBool::new(true));

        // The store keeps the listener and the listener keeps the state;
        // the subscription breaks that cycle on unmount
        let weak_engine: Weak<Mutex<PropsEngine>> = Arc::downgrade(&engine);
        let listener_state = state.clone();
        let listener_active = active.clone();

        let subscription = state.subscribe(Arc::new(move |field: &FieldPath, _kind: ChangeKind| {
            // A listener list captured before teardown may still call us
            if !listener_active.load(Ordering::Acquire) {
                return;
            }
            let Some(engine) = weak_engine.upgrade() else {
                return;
            };
            if !lock(&engine).watches(field.as_str()) {
                return;
            }

            let snapshot = listener_state.values();
            let mut guard = lock(&engine);
            let committed = guard
                .handle_change(field.as_str(), &snapshot)
                .then(|| guard.props().clone());
            drop(guard);

            if let (Some(props), Some(on_commit)) = (committed, on_commit.as_ref()) {
                on_commit(&props);
            }
        }));

        Self {
            engine,
            active,
            subscription: Some(subscription),
        }
    }

    /// Current materialized properties
    pub fn props(&self) -> ComputedProps {
        lock(&self.engine).props().clone()
    }

    pub fn recompute_count(&self) -> u64 {
        lock(&self.engine).recompute_count()
    }

    pub fn is_mounted(&self) -> bool {
        self.subscription.is_some()
    }

    /// Release the listener; later notifications are ignored
    pub fn unmount(&mut self) {
        self.active.store(false, Ordering::Release);
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
    }
}

impl Drop for LiveProps {
    fn drop(&mut self) {
        self.unmount();
    }
}

impl std::fmt::Debug for LiveProps {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveProps")
            .field("engine", &*lock(&self.engine))
            .field("mounted", &self.is_mounted())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::computable::Computable;
    use crate::form_state::FormStore;
    use crate::schema::{FieldDescriptor, ObjectSchema};
    use crate::value::{FieldKind, FieldValue};
    use std::sync::atomic::AtomicUsize;

    fn store() -> FormStore {
        let schema = ObjectSchema::builder()
            .field(FieldDescriptor::new("age", FieldKind::Int).default_value(16))
            .field(FieldDescriptor::new("score", FieldKind::Int).default_value(0))
            .object("name", |name| {
                name.field(FieldDescriptor::new("first", FieldKind::String).default_value(""))
                    .field(FieldDescriptor::new("last", FieldKind::String).default_value(""))
            })
            .build()
            .unwrap();
        FormStore::new(Arc::new(schema))
    }

    fn state(store: &FormStore) -> Arc<dyn FormState> {
        Arc::new(store.clone())
    }

    fn adult() -> Computable {
        Computable::watch("age", |v| v.int("age").unwrap_or(0) < 18)
    }

    #[test]
    fn test_init_resolves_everything() {
        let snapshot = Snapshot::new(FieldValue::object().with("age", 16));
        let props = PropMap::new()
            .with(PropKey::Label, "First")
            .with(PropKey::Disabled, adult());
        let engine = PropsEngine::new(Arc::new(props), None, &snapshot);

        assert_eq!(engine.props().text(&PropKey::Label), Some("First"));
        assert_eq!(engine.props().bool(&PropKey::Disabled), Some(true));
        assert_eq!(engine.recompute_count(), 0);
    }

    #[test]
    fn test_unwatched_field_is_ignored() {
        let snapshot = Snapshot::new(FieldValue::object().with("age", 16));
        let mut engine =
            PropsEngine::new(Arc::new(PropMap::new().with(PropKey::Disabled, adult())), None, &snapshot);
        let before = engine.props().clone();

        assert!(!engine.handle_change("score", &snapshot));
        assert_eq!(engine.recompute_count(), 0);
        assert!(engine.props().ptr_eq(&before));
    }

    #[test]
    fn test_equal_value_keeps_identity() {
        let snapshot = Snapshot::new(FieldValue::object().with("age", 16));
        let mut engine =
            PropsEngine::new(Arc::new(PropMap::new().with(PropKey::Disabled, adult())), None, &snapshot);
        let before = engine.props().clone();

        let next = Snapshot::new(FieldValue::object().with("age", 17));
        assert!(!engine.handle_change("age", &next));
        assert_eq!(engine.recompute_count(), 1);
        assert!(engine.props().ptr_eq(&before));
    }

    #[test]
    fn test_commit_merges_changes() {
        let snapshot = Snapshot::new(FieldValue::object().with("age", 16));
        let props = PropMap::new()
            .with(PropKey::Label, "First")
            .with(PropKey::Disabled, adult());
        let mut engine = PropsEngine::new(Arc::new(props), None, &snapshot);
        let before = engine.props().clone();

        let next = Snapshot::new(FieldValue::object().with("age", 19));
        assert!(engine.handle_change("age", &next));
        assert!(!engine.props().ptr_eq(&before));
        assert_eq!(engine.props().bool(&PropKey::Disabled), Some(false));
        assert_eq!(engine.props().text(&PropKey::Label), Some("First"));
    }

    #[test]
    fn test_rebind_same_map_is_noop() {
        let snapshot = Snapshot::new(FieldValue::object().with("age", 16));
        let props = Arc::new(PropMap::new().with(PropKey::Disabled, adult()));
        let mut engine = PropsEngine::new(props.clone(), None, &snapshot);
        assert!(!engine.rebind(props, &snapshot));

        let other = Arc::new(PropMap::new().with(PropKey::Label, "Other"));
        assert!(engine.rebind(other, &snapshot));
        assert!(!engine.watches("age"));
        assert_eq!(engine.props().text(&PropKey::Label), Some("Other"));
    }

    #[test]
    fn test_literal_stability() {
        let store = store();
        let live = LiveProps::mount(
            Arc::new(PropMap::new().with(PropKey::Label, "Score")),
            Some(FieldPath::from("score")),
            &state(&store),
        );
        let before = live.props();

        for i in 0..10 {
            store.set_value("score", i).unwrap();
            store.set_value("age", 20 + i).unwrap();
        }

        assert!(live.props().ptr_eq(&before));
        assert_eq!(live.props().text(&PropKey::Label), Some("Score"));
        assert_eq!(live.recompute_count(), 0);
    }

    #[test]
    fn test_dependency_precision() {
        let store = store();
        let live = LiveProps::mount(
            Arc::new(PropMap::new().with(PropKey::Disabled, adult())),
            None,
            &state(&store),
        );

        store.set_value("score", 3).unwrap();
        store.set_value("name.first", "Ada").unwrap();
        assert_eq!(live.recompute_count(), 0);

        store.set_value("age", 30).unwrap();
        assert_eq!(live.recompute_count(), 1);
        assert_eq!(live.props().bool(&PropKey::Disabled), Some(false));
    }

    #[test]
    fn test_multi_dependency_fan_out() {
        let store = store();
        let label = Computable::watch_all(["age", "score"], |v| {
            format!("{}:{}", v.int("age").unwrap_or(0), v.int("score").unwrap_or(0))
        });
        let live = LiveProps::mount(
            Arc::new(PropMap::new().with(PropKey::Label, label)),
            None,
            &state(&store),
        );
        assert_eq!(live.props().text(&PropKey::Label), Some("16:0"));

        store.set_value("score", 5).unwrap();
        assert_eq!(live.props().text(&PropKey::Label), Some("16:5"));

        store.set_value("age", 40).unwrap();
        assert_eq!(live.props().text(&PropKey::Label), Some("40:5"));
        assert_eq!(live.recompute_count(), 2);
    }

    #[test]
    fn test_on_commit_only_on_change() {
        let store = store();
        let commits = Arc::new(AtomicUsize::new(0));
        let commits_clone = commits.clone();
        let _live = LiveProps::mount_with(
            Arc::new(PropMap::new().with(PropKey::Disabled, adult())),
            None,
            &state(&store),
            Some(Arc::new(move |_: &ComputedProps| {
                commits_clone.fetch_add(1, Ordering::SeqCst);
            })),
        );

        store.set_value("age", 17).unwrap();
        assert_eq!(commits.load(Ordering::SeqCst), 0);

        store.set_value("age", 18).unwrap();
        assert_eq!(commits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_teardown_stops_recompute() {
        let store = store();
        let mut live = LiveProps::mount(
            Arc::new(PropMap::new().with(PropKey::Disabled, adult())),
            None,
            &state(&store),
        );
        assert_eq!(store.listener_count(), 1);

        live.unmount();
        assert!(!live.is_mounted());
        assert_eq!(store.listener_count(), 0);

        store.set_value("age", 30).unwrap();
        assert_eq!(live.recompute_count(), 0);
        assert_eq!(live.props().bool(&PropKey::Disabled), Some(true));
    }

    #[test]
    fn test_mount_outlives_caller_state_handle() {
        let store = store();
        let mut live = {
            let scoped: Arc<dyn FormState> = Arc::new(store.clone());
            LiveProps::mount(
                Arc::new(PropMap::new().with(PropKey::Disabled, adult())),
                None,
                &scoped,
            )
        };
        assert_eq!(live.props().bool(&PropKey::Disabled), Some(true));

        store.set_value("age", 30).unwrap();
        assert_eq!(live.props().bool(&PropKey::Disabled), Some(false));
        assert_eq!(live.recompute_count(), 1);

        live.unmount();
        assert_eq!(store.listener_count(), 0);
    }

    #[test]
    fn test_drop_releases_listener() {
        let store = store();
        {
            let _live = LiveProps::mount(
                Arc::new(PropMap::new().with(PropKey::Disabled, adult())),
                None,
                &state(&store),
            );
            assert_eq!(store.listener_count(), 1);
        }
        assert_eq!(store.listener_count(), 0);
    }
}
