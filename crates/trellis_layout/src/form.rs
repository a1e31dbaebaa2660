//! Form definitions and live sessions
//!
//! [`create_form`] runs the layout callback, compiles the result and
//! validates it against the schema. The resulting [`FormDefinition`] is
//! immutable and can be mounted any number of times.
//!
//! A [`FormSession`] is one mounted instance: every widget in the tree gets
//! its own [`LiveProps`] for as long as the session lives, whether or not it
//! is currently hidden. Hiding a widget only removes it from the rendered
//! output.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use indexmap::IndexSet;
use trellis_core::{
    ComputedProps, FieldValue, FormSchema, FormState, FormStore, LiveProps, Snapshot,
};

use crate::builders::LayoutBuilders;
use crate::compiler::{compile, validate};
use crate::config::LayoutConfig;
use crate::descriptor::LayoutRoot;
use crate::error::Result;
use crate::registry::{ContainerRegistry, PresentationRegistry};
use crate::render::{self, Element, InputElement};
use crate::widget::{ContainerKind, InputWidget, Widget, WidgetId};

/// Layout-definition callback
pub type LayoutFn = Box<dyn FnOnce(&LayoutBuilders<'_>) -> LayoutRoot>;

/// Everything needed to build a form definition
pub struct FormConfig {
    schema: Arc<dyn FormSchema>,
    layout: LayoutFn,
    presentations: PresentationRegistry,
    containers: ContainerRegistry,
    layout_config: LayoutConfig,
}

impl FormConfig {
    pub fn new<F, R>(schema: Arc<dyn FormSchema>, layout: F) -> Self
    where
        F: FnOnce(&LayoutBuilders<'_>) -> R + 'static,
        R: Into<LayoutRoot>,
    {
        Self {
            schema,
            layout: Box::new(move |builders: &LayoutBuilders<'_>| {
                Into::<LayoutRoot>::into(layout(builders))
            }),
            presentations: PresentationRegistry::new(),
            containers: ContainerRegistry::new(),
            layout_config: LayoutConfig::default(),
        }
    }

    pub fn presentations(mut self, presentations: PresentationRegistry) -> Self {
        self.presentations = presentations;
        self
    }

    pub fn containers(mut self, containers: ContainerRegistry) -> Self {
        self.containers = containers;
        self
    }

    pub fn layout_config(mut self, config: LayoutConfig) -> Self {
        self.layout_config = config;
        self
    }
}

/// Build a form definition
///
/// Fails if the layout contains an unrecognized node, binds an input to a
/// field the schema does not have, or selects a missing or incompatible
/// presentation. Pre-compiled roots returned by the callback are validated
/// the same way.
pub fn create_form(config: FormConfig) -> Result<FormDefinition> {
    let FormConfig {
        schema,
        layout,
        presentations,
        containers,
        layout_config,
    } = config;

    let root = compile(layout(&LayoutBuilders::new(&containers)))?;
    validate(&root, schema.as_ref(), &presentations, &containers)?;

    let widget_count = root.count();
    tracing::debug!(widgets = widget_count, "compiled form definition");

    Ok(FormDefinition {
        inner: Arc::new(DefinitionInner {
            schema,
            root,
            widget_count,
            presentations,
            containers,
            layout_config,
        }),
    })
}

struct DefinitionInner {
    schema: Arc<dyn FormSchema>,
    root: Widget,
    widget_count: usize,
    presentations: PresentationRegistry,
    containers: ContainerRegistry,
    layout_config: LayoutConfig,
}

/// A compiled, validated form
#[derive(Clone)]
pub struct FormDefinition {
    inner: Arc<DefinitionInner>,
}

impl FormDefinition {
    pub fn root(&self) -> &Widget {
        &self.inner.root
    }

    pub fn schema(&self) -> &Arc<dyn FormSchema> {
        &self.inner.schema
    }

    pub fn layout_config(&self) -> &LayoutConfig {
        &self.inner.layout_config
    }

    pub fn widget_count(&self) -> usize {
        self.inner.widget_count
    }

    pub fn widget(&self, id: WidgetId) -> Option<&Widget> {
        self.inner.root.find(id)
    }

    /// Id of the first input bound to `field`
    pub fn find_input(&self, field: &str) -> Option<WidgetId> {
        let mut found = None;
        self.inner.root.walk(WidgetId::ROOT, &mut |id, widget| {
            if found.is_none() && widget.field().is_some_and(|f| f.as_str() == field) {
                found = Some(id);
            }
        });
        found
    }

    /// Default values for every field
    pub fn default_values(&self) -> FieldValue {
        self.inner.schema.default_value()
    }

    /// A fresh in-process store for this form's schema
    pub fn new_store(&self) -> FormStore {
        FormStore::new(self.inner.schema.clone())
    }

    /// Mount a session against `state`
    pub fn mount(&self, state: Arc<dyn FormState>) -> FormSession {
        FormSession::mount(self.clone(), state)
    }
}

impl std::fmt::Debug for FormDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormDefinition")
            .field("root", &self.inner.root)
            .field("layout_config", &self.inner.layout_config)
            .finish_non_exhaustive()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Session
// ─────────────────────────────────────────────────────────────────────────────

type DirtySet = Arc<Mutex<IndexSet<WidgetId>>>;

fn lock_dirty(dirty: &Mutex<IndexSet<WidgetId>>) -> MutexGuard<'_, IndexSet<WidgetId>> {
    dirty.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Last rendered output of one widget and the inputs it was built from
#[derive(Default)]
struct RenderSlot {
    props: Option<ComputedProps>,
    value: Option<FieldValue>,
    element: Option<Element>,
    renders: u64,
}

impl RenderSlot {
    fn is_current(&self, props: &ComputedProps) -> bool {
        self.props.as_ref().is_some_and(|cached| cached.ptr_eq(props))
    }
}

/// A mounted form
pub struct FormSession {
    definition: FormDefinition,
    state: Arc<dyn FormState>,
    live: Vec<LiveProps>,
    slots: Vec<RenderSlot>,
    dirty: DirtySet,
}

impl FormSession {
    /// Init and subscribe every widget of `definition`
    pub fn mount(definition: FormDefinition, state: Arc<dyn FormState>) -> Self {
        let dirty: DirtySet = Arc::new(Mutex::new(IndexSet::new()));
        let mut live = Vec::with_capacity(definition.widget_count());

        definition.root().walk(WidgetId::ROOT, &mut |id, widget| {
            let dirty = dirty.clone();
            live.push(LiveProps::mount_with(
                widget.props().clone(),
                widget.field().cloned(),
                &state,
                Some(Arc::new(move |_: &ComputedProps| {
                    lock_dirty(&dirty).insert(id);
                })),
            ));
        });

        let slots = live.iter().map(|_| RenderSlot::default()).collect();
        tracing::debug!(widgets = live.len(), "mounted form session");

        Self {
            definition,
            state,
            live,
            slots,
            dirty,
        }
    }

    pub fn definition(&self) -> &FormDefinition {
        &self.definition
    }

    pub fn state(&self) -> &Arc<dyn FormState> {
        &self.state
    }

    /// Current computed props of a widget
    pub fn props(&self, id: WidgetId) -> Option<ComputedProps> {
        self.live.get(id.index()).map(LiveProps::props)
    }

    /// Resolver invocations of a widget since mount
    pub fn recompute_count(&self, id: WidgetId) -> u64 {
        self.live.get(id.index()).map_or(0, LiveProps::recompute_count)
    }

    /// Number of times a widget's element was rebuilt
    pub fn render_count(&self, id: WidgetId) -> u64 {
        self.slots.get(id.index()).map_or(0, |slot| slot.renders)
    }

    /// Widgets whose props changed since the last call, in commit order
    pub fn take_dirty(&self) -> Vec<WidgetId> {
        std::mem::take(&mut *lock_dirty(&self.dirty))
            .into_iter()
            .collect()
    }

    pub fn is_mounted(&self) -> bool {
        self.live.iter().any(LiveProps::is_mounted)
    }

    /// Release every subscription
    pub fn unmount(&mut self) {
        for live in &mut self.live {
            live.unmount();
        }
        tracing::debug!(widgets = self.live.len(), "unmounted form session");
    }

    /// Render the tree; `None` if the root is hidden
    ///
    /// Widgets whose props snapshot and bound value are unchanged since the
    /// previous render reuse their previous element.
    pub fn render(&mut self) -> Option<Element> {
        let definition = self.definition.clone();
        let values = self.state.values();
        let mut next = 0;
        self.render_widget(definition.root(), &values, &mut next).0
    }

    /// Returns the element and whether it differs from the cached one
    fn render_widget(
        &mut self,
        widget: &Widget,
        values: &Snapshot,
        next: &mut usize,
    ) -> (Option<Element>, bool) {
        let id = WidgetId::new(*next);
        *next += 1;
        let props = self.live[id.index()].props();

        match widget {
            Widget::Input(input) => {
                let value = values.get(input.field.as_str()).cloned().unwrap_or_default();
                let slot = &self.slots[id.index()];
                if slot.is_current(&props) && slot.value.as_ref() == Some(&value) {
                    return (slot.element.clone(), false);
                }

                let element = (!props.is_hidden()).then(|| self.render_input(id, input, props.clone()));
                self.store(id, props, Some(value), element.clone());
                (element, true)
            }
            Widget::Container(container) => {
                if props.is_hidden() {
                    *next += widget.count() - 1;
                    if self.slots[id.index()].is_current(&props) {
                        return (None, false);
                    }
                    self.store(id, props, None, None);
                    return (None, true);
                }

                let mut children = Vec::with_capacity(container.children.len());
                let mut changed = false;
                for child in &container.children {
                    let (element, child_changed) = self.render_widget(child, values, next);
                    changed |= child_changed;
                    children.extend(element);
                }

                let slot = &self.slots[id.index()];
                if !changed && slot.is_current(&props) {
                    return (slot.element.clone(), false);
                }

                let element = match &container.kind {
                    ContainerKind::Named(name) => match self.definition.inner.containers.get(name) {
                        Some(presenter) => presenter.render(&props, children),
                        None => render::stack(
                            &container.kind,
                            &props,
                            self.definition.layout_config(),
                            children,
                        ),
                    },
                    kind => render::stack(kind, &props, self.definition.layout_config(), children),
                };
                self.store(id, props, None, Some(element.clone()));
                (Some(element), true)
            }
        }
    }

    fn render_input(&self, id: WidgetId, input: &InputWidget, props: ComputedProps) -> Element {
        let binding = self.state.bind(&input.field);
        let schema_required = self
            .definition
            .schema()
            .leaf(input.field.as_str())
            .is_some_and(|leaf| leaf.required);
        let element = InputElement::new(
            id,
            binding,
            props,
            input.presentation.clone(),
            schema_required,
        );

        let presentation = input
            .presentation
            .as_deref()
            .and_then(|name| self.definition.inner.presentations.get(name));
        match presentation {
            Some(presentation) => presentation.presenter.render(element),
            None => Element::Input(element),
        }
    }

    fn store(
        &mut self,
        id: WidgetId,
        props: ComputedProps,
        value: Option<FieldValue>,
        element: Option<Element>,
    ) {
        let slot = &mut self.slots[id.index()];
        slot.props = Some(props);
        slot.value = value;
        slot.element = element;
        slot.renders += 1;
        tracing::trace!(widget = %id, renders = slot.renders, "rendered widget");
    }
}

impl std::fmt::Debug for FormSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormSession")
            .field("widgets", &self.live.len())
            .field("mounted", &self.is_mounted())
            .finish_non_exhaustive()
    }
}
