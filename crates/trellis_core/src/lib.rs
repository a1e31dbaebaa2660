//! Trellis Core
//!
//! Foundational primitives for Trellis declarative forms:
//!
//! - **Values**: Dynamically typed form values addressed by dotted paths
//! - **Schema**: Object schemas describing the leaf fields of a form
//! - **Form State**: A subscribable store of current values with per-field bindings
//! - **Computables**: Literal or dependent property definitions
//! - **Props Engine**: Per-widget materialized props recomputed only when a
//!   declared dependency changes
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use trellis_core::prelude::*;
//!
//! let schema = ObjectSchema::builder()
//!     .field(FieldDescriptor::new("age", FieldKind::Int).default_value(16))
//!     .object("name", |name| {
//!         name.field(FieldDescriptor::new("first", FieldKind::String).default_value(""))
//!     })
//!     .build()
//!     .unwrap();
//! let store = FormStore::new(Arc::new(schema));
//! let state: Arc<dyn FormState> = Arc::new(store.clone());
//!
//! let props = PropMap::new()
//!     .with(PropKey::Label, "First name")
//!     .with(PropKey::Disabled, Computable::watch("age", |v| v.int("age").unwrap_or(0) < 18));
//! let live = LiveProps::mount(Arc::new(props), Some("name.first".into()), &state);
//!
//! assert_eq!(live.props().bool(&PropKey::Disabled), Some(true));
//! store.set_value("age", 19).unwrap();
//! assert_eq!(live.props().bool(&PropKey::Disabled), Some(false));
//! ```

pub mod computable;
pub mod deps;
pub mod engine;
pub mod error;
pub mod form_state;
pub mod props;
pub mod schema;
pub mod value;

pub use computable::{Computable, Resolver};
pub use deps::{DependencyEntry, DependencyMap};
pub use engine::{CommitCallback, LiveProps, PropsEngine};
pub use error::{CoreError, Result};
pub use form_state::{
    ChangeKind, ChangeListener, FieldBinding, FormState, FormStore, ListenerId, Subscription,
};
pub use props::{ComputedProps, Length, PropKey, PropMap, PropValue};
pub use schema::{FieldDescriptor, FormSchema, ObjectSchema, SchemaBuilder};
pub use value::{FieldKind, FieldPath, FieldValue, Snapshot};

/// Commonly used types
pub mod prelude {
    pub use crate::computable::Computable;
    pub use crate::engine::LiveProps;
    pub use crate::form_state::{ChangeKind, FieldBinding, FormState, FormStore, Subscription};
    pub use crate::props::{ComputedProps, Length, PropKey, PropMap, PropValue};
    pub use crate::schema::{FieldDescriptor, FormSchema, ObjectSchema};
    pub use crate::value::{FieldKind, FieldPath, FieldValue, Snapshot};
}
