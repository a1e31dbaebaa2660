//! Trellis Layout
//!
//! Declarative form layouts compiled into widget trees whose props stay live
//! against the form state.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use trellis_layout::prelude::*;
//!
//! let schema = ObjectSchema::builder()
//!     .field(FieldDescriptor::new("age", FieldKind::Int).default_value(16))
//!     .object("name", |name| {
//!         name.field(FieldDescriptor::new("first", FieldKind::String).default_value(""))
//!             .field(FieldDescriptor::new("last", FieldKind::String).default_value(""))
//!     })
//!     .build()
//!     .unwrap();
//!
//! let form = create_form(FormConfig::new(Arc::new(schema), |b: &LayoutBuilders<'_>| {
//!     b.col()
//!         .child(b.input("age").label("Age"))
//!         .child(
//!             b.row()
//!                 .child(b.input("name.first").label("First"))
//!                 .child(
//!                     b.input("name.last")
//!                         .label("Last")
//!                         .disabled(Computable::watch("age", |v| v.int("age").unwrap_or(0) < 18)),
//!                 ),
//!         )
//! }))
//! .unwrap();
//!
//! let store = form.new_store();
//! let mut session = form.mount(Arc::new(store.clone()));
//!
//! let ui = session.render().unwrap();
//! assert!(ui.find_input("name.last").unwrap().is_disabled());
//!
//! store.set_value("age", 19).unwrap();
//! let ui = session.render().unwrap();
//! assert!(!ui.find_input("name.last").unwrap().is_disabled());
//! ```

pub mod builders;
pub mod compiler;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod form;
pub mod registry;
pub mod render;
pub mod widget;

#[cfg(test)]
mod tests;

pub use builders::LayoutBuilders;
pub use compiler::{compile, validate};
pub use config::LayoutConfig;
pub use descriptor::{col, container, input, row, LayoutRoot, NodeDescriptor, NodeKind};
pub use error::{LayoutError, Result};
pub use form::{create_form, FormConfig, FormDefinition, FormSession, LayoutFn};
pub use registry::{
    ContainerPresenter, ContainerRegistry, InputPresenter, Presentation, PresentationRegistry,
};
pub use render::{Axis, Element, InputElement, StackStyle};
pub use widget::{ContainerKind, ContainerWidget, InputWidget, Widget, WidgetId};

/// Prelude module - import everything commonly needed to define forms
pub mod prelude {
    pub use crate::builders::LayoutBuilders;
    pub use crate::config::LayoutConfig;
    pub use crate::descriptor::{col, container, input, row, LayoutRoot, NodeDescriptor};
    pub use crate::error::LayoutError;
    pub use crate::form::{create_form, FormConfig, FormDefinition, FormSession};
    pub use crate::registry::{
        ContainerPresenter, ContainerRegistry, InputPresenter, PresentationRegistry,
    };
    pub use crate::render::{Element, InputElement};
    pub use crate::widget::{Widget, WidgetId};

    pub use trellis_core::prelude::*;
}
