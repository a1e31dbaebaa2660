//! Presentation and container registries
//!
//! Inputs and named containers are drawn by externally supplied presenters.
//! A presentation declares the [`FieldKind`] it can display; the compiler
//! rejects inputs whose field kind it does not accept.

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use trellis_core::{ComputedProps, FieldKind};

use crate::render::{Element, InputElement};

/// Draws one input
pub trait InputPresenter: Send + Sync {
    fn render(&self, input: InputElement) -> Element;
}

/// Draws a named container around its rendered children
pub trait ContainerPresenter: Send + Sync {
    fn render(&self, props: &ComputedProps, children: Vec<Element>) -> Element;
}

impl<F> InputPresenter for F
where
    F: Fn(InputElement) -> Element + Send + Sync,
{
    fn render(&self, input: InputElement) -> Element {
        self(input)
    }
}

/// A registered input presentation
#[derive(Clone)]
pub struct Presentation {
    /// Kind of field this presentation displays
    pub kind: FieldKind,
    pub presenter: Arc<dyn InputPresenter>,
}

impl fmt::Debug for Presentation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Presentation")
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// Presentation name -> presentation
#[derive(Clone, Debug, Default)]
pub struct PresentationRegistry {
    entries: FxHashMap<String, Presentation>,
}

impl PresentationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a presentation
    pub fn register(
        &mut self,
        name: impl Into<String>,
        kind: FieldKind,
        presenter: Arc<dyn InputPresenter>,
    ) -> &mut Self {
        self.entries
            .insert(name.into(), Presentation { kind, presenter });
        self
    }

    /// Builder-style [`PresentationRegistry::register`]
    pub fn with(
        mut self,
        name: impl Into<String>,
        kind: FieldKind,
        presenter: impl InputPresenter + 'static,
    ) -> Self {
        self.register(name, kind, Arc::new(presenter));
        self
    }

    pub fn get(&self, name: &str) -> Option<&Presentation> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Container name -> presenter
#[derive(Clone, Default)]
pub struct ContainerRegistry {
    entries: FxHashMap<String, Arc<dyn ContainerPresenter>>,
}

impl ContainerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        name: impl Into<String>,
        presenter: Arc<dyn ContainerPresenter>,
    ) -> &mut Self {
        self.entries.insert(name.into(), presenter);
        self
    }

    pub fn with(mut self, name: impl Into<String>, presenter: impl ContainerPresenter + 'static) -> Self {
        self.register(name, Arc::new(presenter));
        self
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn ContainerPresenter>> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }
}

impl fmt::Debug for ContainerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.entries.keys()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_presenter_registration() {
        let registry = PresentationRegistry::new().with(
            "switch",
            FieldKind::Boolean,
            |input: InputElement| Element::custom("switch", input.props.clone(), Vec::new()),
        );

        let switch = registry.get("switch").unwrap();
        assert_eq!(switch.kind, FieldKind::Boolean);
        assert!(!registry.contains("slider"));
        assert_eq!(registry.len(), 1);
    }
}
