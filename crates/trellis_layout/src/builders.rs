//! Builders handed to a layout callback

use crate::descriptor::{self, NodeDescriptor, NodeKind};
use crate::registry::ContainerRegistry;

/// Node constructors available while a layout is being described
///
/// `container` resolves names against the form's [`ContainerRegistry`];
/// an unknown name produces a descriptor the compiler rejects.
pub struct LayoutBuilders<'a> {
    containers: &'a ContainerRegistry,
}

impl<'a> LayoutBuilders<'a> {
    pub fn new(containers: &'a ContainerRegistry) -> Self {
        Self { containers }
    }

    pub fn row(&self) -> NodeDescriptor {
        descriptor::row()
    }

    pub fn col(&self) -> NodeDescriptor {
        descriptor::col()
    }

    pub fn input(&self, field: &str) -> NodeDescriptor {
        descriptor::input(field)
    }

    pub fn container(&self, name: &str) -> NodeDescriptor {
        if self.containers.contains(name) {
            descriptor::container(name)
        } else {
            NodeDescriptor::new(NodeKind::Unrecognized(name.to_string()))
        }
    }
}
