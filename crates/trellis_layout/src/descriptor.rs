//! Layout node descriptors
//!
//! Descriptors are the transient, builder-style description handed back by
//! a layout callback. The compiler consumes them into [`Widget`]s; they are
//! never retained.
//!
//! ```rust
//! use trellis_core::Computable;
//! use trellis_layout::descriptor::{col, input, row};
//!
//! let layout = col()
//!     .child(input("age").label("Age"))
//!     .child(
//!         row()
//!             .gap(4.0)
//!             .child(input("name.first").label("First"))
//!             .child(
//!                 input("name.last")
//!                     .label("Last")
//!                     .disabled(Computable::watch("age", |v| v.int("age").unwrap_or(0) < 18)),
//!             ),
//!     );
//! assert_eq!(layout.child_count(), 2);
//! ```

use trellis_core::{Computable, FieldPath, Length, PropKey, PropMap};

use crate::widget::{ContainerKind, Widget};

/// Node discriminant
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    Container(ContainerKind),
    Input(FieldPath),
    /// Anything the compiler cannot turn into a widget
    Unrecognized(String),
}

/// Builder-style description of one layout node
#[derive(Debug)]
pub struct NodeDescriptor {
    pub(crate) kind: NodeKind,
    pub(crate) props: PropMap,
    pub(crate) presentation: Option<String>,
    pub(crate) children: Vec<NodeDescriptor>,
    pub(crate) items: Vec<Widget>,
}

/// Horizontal container
pub fn row() -> NodeDescriptor {
    NodeDescriptor::new(NodeKind::Container(ContainerKind::Row))
}

/// Vertical container
pub fn col() -> NodeDescriptor {
    NodeDescriptor::new(NodeKind::Container(ContainerKind::Column))
}

/// Input bound to `field`
pub fn input(field: impl Into<FieldPath>) -> NodeDescriptor {
    NodeDescriptor::new(NodeKind::Input(field.into()))
}

/// Named container rendered by a registered presenter
pub fn container(name: impl Into<String>) -> NodeDescriptor {
    NodeDescriptor::new(NodeKind::Container(ContainerKind::Named(name.into())))
}

impl NodeDescriptor {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            props: PropMap::new(),
            presentation: None,
            children: Vec::new(),
            items: Vec::new(),
        }
    }

    /// Descriptor the compiler will reject
    pub fn unrecognized(kind: impl Into<String>) -> Self {
        Self::new(NodeKind::Unrecognized(kind.into()))
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn props(&self) -> &PropMap {
        &self.props
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    // =========================================================================
    // Structure
    // =========================================================================

    /// Add a nested child descriptor
    pub fn child(mut self, child: NodeDescriptor) -> Self {
        self.children.push(child);
        self
    }

    /// Add multiple nested child descriptors
    pub fn children(mut self, children: impl IntoIterator<Item = NodeDescriptor>) -> Self {
        self.children.extend(children);
        self
    }

    /// Append an already compiled widget after the nested children
    pub fn item(mut self, widget: Widget) -> Self {
        self.items.push(widget);
        self
    }

    /// Append already compiled widgets after the nested children
    pub fn items(mut self, widgets: impl IntoIterator<Item = Widget>) -> Self {
        self.items.extend(widgets);
        self
    }

    // =========================================================================
    // Properties
    // =========================================================================

    /// Set any property
    pub fn prop(mut self, key: PropKey, value: impl Into<Computable>) -> Self {
        self.props.insert(key, value);
        self
    }

    /// Set a free-form property by name, as read by custom presenters
    pub fn custom(self, name: &str, value: impl Into<Computable>) -> Self {
        self.prop(PropKey::from_name(name), value)
    }

    pub fn label(self, value: impl Into<Computable>) -> Self {
        self.prop(PropKey::Label, value)
    }

    pub fn disabled(self, value: impl Into<Computable>) -> Self {
        self.prop(PropKey::Disabled, value)
    }

    pub fn required(self, value: impl Into<Computable>) -> Self {
        self.prop(PropKey::Required, value)
    }

    pub fn helper_text(self, value: impl Into<Computable>) -> Self {
        self.prop(PropKey::HelperText, value)
    }

    pub fn placeholder(self, value: impl Into<Computable>) -> Self {
        self.prop(PropKey::Placeholder, value)
    }

    /// Remove the node (and its subtree) from the rendered output
    pub fn hidden(self, value: impl Into<Computable>) -> Self {
        self.prop(PropKey::Hidden, value)
    }

    pub fn flex(self, value: impl Into<Computable>) -> Self {
        self.prop(PropKey::Flex, value)
    }

    pub fn min_width(self, value: impl Into<Computable>) -> Self {
        self.prop(PropKey::MinWidth, value)
    }

    pub fn max_width(self, value: impl Into<Computable>) -> Self {
        self.prop(PropKey::MaxWidth, value)
    }

    pub fn min_height(self, value: impl Into<Computable>) -> Self {
        self.prop(PropKey::MinHeight, value)
    }

    pub fn max_height(self, value: impl Into<Computable>) -> Self {
        self.prop(PropKey::MaxHeight, value)
    }

    /// Set width limits as a percentage of the parent
    pub fn width_pct(self, min: f32, max: f32) -> Self {
        self.min_width(Length::Percent(min))
            .max_width(Length::Percent(max))
    }

    pub fn class_name(self, value: impl Into<Computable>) -> Self {
        self.prop(PropKey::ClassName, value)
    }

    /// Spacing between children, in pixels unless a [`Length`] is given
    pub fn gap(self, value: impl Into<Computable>) -> Self {
        self.prop(PropKey::Gap, value)
    }

    /// Display an input with a registered presentation
    pub fn presentation(mut self, name: impl Into<String>) -> Self {
        self.presentation = Some(name.into());
        self
    }
}

/// What a layout callback returns
#[derive(Debug)]
pub enum LayoutRoot {
    /// A descriptor tree to compile
    Node(NodeDescriptor),
    /// A pre-compiled widget, used as-is
    Compiled(Widget),
}

impl From<NodeDescriptor> for LayoutRoot {
    fn from(node: NodeDescriptor) -> Self {
        LayoutRoot::Node(node)
    }
}

impl From<Widget> for LayoutRoot {
    fn from(widget: Widget) -> Self {
        LayoutRoot::Compiled(widget)
    }
}
