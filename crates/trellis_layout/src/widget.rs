//! Compiled widget tree
//!
//! The output of the compiler. A tree is immutable once built; every node
//! exclusively owns its children. Widgets are addressed by [`WidgetId`], the
//! node's position in a depth-first pre-order walk starting at the root (0).

use std::fmt;
use std::sync::Arc;

use trellis_core::{FieldPath, PropMap};

/// Pre-order position of a widget within its form definition
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WidgetId(u32);

impl WidgetId {
    pub const ROOT: WidgetId = WidgetId(0);

    pub fn new(index: usize) -> Self {
        Self(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Container flavour
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    /// Horizontal stack
    Row,
    /// Vertical stack
    Column,
    /// Externally registered container, rendered by its presenter
    Named(String),
}

impl ContainerKind {
    pub fn name(&self) -> &str {
        match self {
            ContainerKind::Row => "row",
            ContainerKind::Column => "col",
            ContainerKind::Named(name) => name,
        }
    }
}

#[derive(Clone, Debug)]
pub struct ContainerWidget {
    pub kind: ContainerKind,
    pub props: Arc<PropMap>,
    pub children: Vec<Widget>,
}

#[derive(Clone, Debug)]
pub struct InputWidget {
    pub field: FieldPath,
    pub props: Arc<PropMap>,
    /// Registered presentation used to display the field
    pub presentation: Option<String>,
}

/// A compiled widget
#[derive(Clone, Debug)]
pub enum Widget {
    Container(ContainerWidget),
    Input(InputWidget),
}

impl Widget {
    pub fn props(&self) -> &Arc<PropMap> {
        match self {
            Widget::Container(container) => &container.props,
            Widget::Input(input) => &input.props,
        }
    }

    pub fn children(&self) -> &[Widget] {
        match self {
            Widget::Container(container) => &container.children,
            Widget::Input(_) => &[],
        }
    }

    /// Field bound by an input, `None` for containers
    pub fn field(&self) -> Option<&FieldPath> {
        match self {
            Widget::Container(_) => None,
            Widget::Input(input) => Some(&input.field),
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(self, Widget::Container(_))
    }

    /// Number of widgets in this subtree, including self
    pub fn count(&self) -> usize {
        1 + self.children().iter().map(Widget::count).sum::<usize>()
    }

    /// Visit every widget in pre-order with its id, starting at `first`
    pub fn walk<'a>(&'a self, first: WidgetId, visit: &mut impl FnMut(WidgetId, &'a Widget)) {
        let mut next = first.index();
        self.walk_from(&mut next, visit);
    }

    fn walk_from<'a>(&'a self, next: &mut usize, visit: &mut impl FnMut(WidgetId, &'a Widget)) {
        visit(WidgetId::new(*next), self);
        *next += 1;
        for child in self.children() {
            child.walk_from(next, visit);
        }
    }

    /// Widget at pre-order position `id` within this subtree
    pub fn find(&self, id: WidgetId) -> Option<&Widget> {
        let mut found = None;
        self.walk(WidgetId::ROOT, &mut |current, widget| {
            if current == id {
                found = Some(widget);
            }
        });
        found
    }
}

impl From<ContainerWidget> for Widget {
    fn from(container: ContainerWidget) -> Self {
        Widget::Container(container)
    }
}

impl From<InputWidget> for Widget {
    fn from(input: InputWidget) -> Self {
        Widget::Input(input)
    }
}
