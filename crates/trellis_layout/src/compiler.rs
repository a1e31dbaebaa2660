//! Widget tree compiler
//!
//! Turns a [`LayoutRoot`] into a [`Widget`] tree, then checks every input
//! against the schema and the registries. Compilation is depth-first: a
//! container compiles its nested children before appending its `items`.
//! Any error aborts the whole tree.

use std::sync::Arc;

use trellis_core::FormSchema;

use crate::descriptor::{LayoutRoot, NodeDescriptor, NodeKind};
use crate::error::{LayoutError, Result};
use crate::registry::{ContainerRegistry, PresentationRegistry};
use crate::widget::{ContainerKind, ContainerWidget, InputWidget, Widget};

/// Compile a layout root; pre-compiled roots pass through unchanged
pub fn compile(root: LayoutRoot) -> Result<Widget> {
    match root {
        LayoutRoot::Node(node) => compile_node(node),
        LayoutRoot::Compiled(widget) => Ok(widget),
    }
}

fn compile_node(node: NodeDescriptor) -> Result<Widget> {
    let NodeDescriptor {
        kind,
        props,
        presentation,
        children,
        items,
    } = node;

    match kind {
        NodeKind::Container(kind) => {
            let mut compiled = children
                .into_iter()
                .map(compile_node)
                .collect::<Result<Vec<_>>>()?;
            compiled.extend(items);
            Ok(Widget::Container(ContainerWidget {
                kind,
                props: Arc::new(props),
                children: compiled,
            }))
        }
        NodeKind::Input(field) => Ok(Widget::Input(InputWidget {
            field,
            props: Arc::new(props),
            presentation,
        })),
        NodeKind::Unrecognized(kind) => Err(LayoutError::UnrecognizedNode { kind }),
    }
}

/// Check a compiled tree against the schema and registries
///
/// Every input must be bound to a schema leaf, and a selected presentation
/// must be registered and accept the leaf's kind. Named containers must be
/// registered.
pub fn validate(
    widget: &Widget,
    schema: &dyn FormSchema,
    presentations: &PresentationRegistry,
    containers: &ContainerRegistry,
) -> Result<()> {
    match widget {
        Widget::Container(container) => {
            if let ContainerKind::Named(name) = &container.kind {
                if !containers.contains(name) {
                    return Err(LayoutError::UnrecognizedNode { kind: name.clone() });
                }
            }
            container
                .children
                .iter()
                .try_for_each(|child| validate(child, schema, presentations, containers))
        }
        Widget::Input(input) => {
            let leaf = schema
                .leaf(input.field.as_str())
                .ok_or_else(|| LayoutError::UnknownField {
                    path: input.field.clone(),
                })?;

            let Some(name) = &input.presentation else {
                return Ok(());
            };
            let presentation =
                presentations
                    .get(name)
                    .ok_or_else(|| LayoutError::UnknownPresentation {
                        name: name.clone(),
                        path: input.field.clone(),
                    })?;

            if presentation.kind.accepts(leaf.kind) {
                Ok(())
            } else {
                Err(LayoutError::PresentationMismatch {
                    path: input.field.clone(),
                    presentation: name.clone(),
                    expected: presentation.kind,
                    found: leaf.kind,
                })
            }
        }
    }
}
