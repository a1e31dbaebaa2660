//! Form scenarios exercising compile, mount, update and render together

use std::sync::Arc;

use crate::prelude::*;
use crate::render::Axis;
use crate::widget::ContainerKind;
use crate::{compile, LayoutRoot};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// `{ age: int, name: { first: string, last: string }, subscribed: bool }`
fn person_schema(age: i64) -> Arc<dyn FormSchema> {
    let schema = ObjectSchema::builder()
        .field(FieldDescriptor::new("age", FieldKind::Int).default_value(age))
        .object("name", |name| {
            name.field(
                FieldDescriptor::new("first", FieldKind::String)
                    .required()
                    .default_value(""),
            )
            .field(FieldDescriptor::new("last", FieldKind::String).default_value(""))
        })
        .field(FieldDescriptor::new("subscribed", FieldKind::Boolean).default_value(false))
        .build()
        .unwrap();
    Arc::new(schema)
}

fn minor() -> Computable {
    Computable::watch("age", |v| v.int("age").unwrap_or(0) < 18)
}

/// col #0 { age #1, row #2 { name.first #3, name.last #4 } }
fn person_form(age: i64) -> FormDefinition {
    create_form(FormConfig::new(person_schema(age), |b: &LayoutBuilders<'_>| {
        b.col().child(b.input("age").label("Age")).child(
            b.row()
                .child(b.input("name.first").label("First").disabled(minor()))
                .child(b.input("name.last").label("Last")),
        )
    }))
    .unwrap()
}

fn mount(form: &FormDefinition) -> (FormStore, FormSession) {
    let store = form.new_store();
    let session = form.mount(Arc::new(store.clone()));
    (store, session)
}

fn shape(widget: &Widget) -> String {
    match widget {
        Widget::Input(input) => input.field.to_string(),
        Widget::Container(container) => format!(
            "{}({})",
            container.kind.name(),
            container
                .children
                .iter()
                .map(shape)
                .collect::<Vec<_>>()
                .join(",")
        ),
    }
}

#[test]
fn test_age_unlocks_first_name() {
    init_tracing();
    let form = person_form(16);
    let (store, mut session) = mount(&form);

    let first = form.find_input("name.first").unwrap();
    let last = form.find_input("name.last").unwrap();
    assert_eq!((first, last), (WidgetId::new(3), WidgetId::new(4)));

    let ui = session.render().unwrap();
    assert!(ui.find_input("name.first").unwrap().is_disabled());
    let last_before = session.props(last).unwrap();

    store.set_value("age", 19).unwrap();

    assert_eq!(session.props(first).unwrap().bool(&PropKey::Disabled), Some(false));
    assert!(session.props(last).unwrap().ptr_eq(&last_before));
    assert_eq!(session.recompute_count(last), 0);
    assert_eq!(session.take_dirty(), vec![first]);

    let ui = session.render().unwrap();
    assert!(!ui.find_input("name.first").unwrap().is_disabled());
    assert_eq!(ui.find_input("age").unwrap().value, FieldValue::Int(19));
    assert_eq!(session.render_count(first), 2);
    assert_eq!(session.render_count(last), 1);
}

#[test]
fn test_equal_value_is_not_dirty() {
    let form = person_form(16);
    let (store, mut session) = mount(&form);
    let first = form.find_input("name.first").unwrap();

    session.render();
    let before = session.props(first).unwrap();

    store.set_value("age", 17).unwrap();
    assert!(session.props(first).unwrap().ptr_eq(&before));
    assert!(session.take_dirty().is_empty());
    assert_eq!(session.recompute_count(first), 1);

    session.render();
    assert_eq!(session.render_count(first), 1);
}

#[test]
fn test_hidden_container_keeps_children_subscribed() {
    let form = create_form(FormConfig::new(person_schema(20), |b: &LayoutBuilders<'_>| {
        b.col().child(b.input("age")).child(
            b.row()
                .hidden(minor())
                .child(b.input("name.first").label(Computable::watch("age", |v| {
                    format!("First ({})", v.int("age").unwrap_or(0))
                })))
                .child(b.input("name.last")),
        )
    }))
    .unwrap();
    let (store, mut session) = mount(&form);
    let first = form.find_input("name.first").unwrap();
    assert_eq!(store.listener_count(), form.widget_count());

    let ui = session.render().unwrap();
    assert_eq!(ui.find_input("name.first").unwrap().label(), Some("First (20)"));

    store.set_value("age", 10).unwrap();
    let ui = session.render().unwrap();
    assert!(ui.find_input("name.first").is_none());
    assert_eq!(ui.inputs().len(), 1);
    assert_eq!(
        session.props(first).unwrap().text(&PropKey::Label),
        Some("First (10)")
    );

    store.set_value("age", 30).unwrap();
    let ui = session.render().unwrap();
    assert_eq!(ui.find_input("name.first").unwrap().label(), Some("First (30)"));

    store.set_value("age", 31).unwrap();
    let ui = session.render().unwrap();
    assert_eq!(ui.find_input("name.first").unwrap().label(), Some("First (31)"));
    assert_eq!(session.recompute_count(first), 3);
    assert_eq!(store.listener_count(), form.widget_count());
}

#[test]
fn test_tree_shape_preserved() {
    let form = create_form(FormConfig::new(person_schema(0), |b: &LayoutBuilders<'_>| {
        b.col()
            .child(b.row().child(b.input("age")).child(b.col()))
            .child(
                b.col()
                    .child(b.input("name.first"))
                    .child(b.row().child(b.input("name.last")).child(b.input("subscribed"))),
            )
    }))
    .unwrap();

    assert_eq!(
        shape(form.root()),
        "col(row(age,col()),col(name.first,row(name.last,subscribed)))"
    );
    assert_eq!(form.widget_count(), 9);
}

#[test]
fn test_unrecognized_node_fails_form() {
    let err = create_form(FormConfig::new(person_schema(0), |b: &LayoutBuilders<'_>| {
        b.col()
            .child(b.input("age"))
            .child(b.container("tabs").child(b.input("name.first")))
    }))
    .unwrap_err();
    assert_eq!(err, LayoutError::UnrecognizedNode { kind: "tabs".into() });
}

#[test]
fn test_presentation_mismatch_fails_form() {
    let presentations = PresentationRegistry::new().with(
        "switch",
        FieldKind::Boolean,
        |input: InputElement| Element::custom("switch", input.props.clone(), Vec::new()),
    );
    let config = FormConfig::new(person_schema(0), |b: &LayoutBuilders<'_>| {
        b.col().child(b.input("age").presentation("switch"))
    })
    .presentations(presentations);

    assert!(matches!(
        create_form(config),
        Err(LayoutError::PresentationMismatch {
            expected: FieldKind::Boolean,
            found: FieldKind::Int,
            ..
        })
    ));
}

#[test]
fn test_presentation_renders_input() {
    let presentations = PresentationRegistry::new().with(
        "switch",
        FieldKind::Boolean,
        |input: InputElement| Element::custom("switch", input.props.clone(), vec![Element::Input(input)]),
    );
    let form = create_form(
        FormConfig::new(person_schema(0), |b: &LayoutBuilders<'_>| {
            b.col()
                .child(b.input("subscribed").label("Newsletter").presentation("switch"))
        })
        .presentations(presentations),
    )
    .unwrap();
    let (store, mut session) = mount(&form);

    let ui = session.render().unwrap();
    match &ui.children()[0] {
        Element::Custom { name, props, .. } => {
            assert_eq!(name, "switch");
            assert_eq!(props.text(&PropKey::Label), Some("Newsletter"));
        }
        other => panic!("expected custom element, got {other:?}"),
    }

    ui.find_input("subscribed").unwrap().change(true);
    assert_eq!(store.values().bool("subscribed"), Some(true));
}

#[test]
fn test_items_follow_children_and_bypass() {
    let subscribed = compile(input("subscribed").label("Newsletter").into()).unwrap();
    let form = create_form(FormConfig::new(person_schema(0), move |b: &LayoutBuilders<'_>| {
        b.col().item(subscribed).child(b.input("age"))
    }))
    .unwrap();
    assert_eq!(shape(form.root()), "col(age,subscribed)");

    let precompiled = compile(col().child(input("name.first")).into()).unwrap();
    let form = create_form(FormConfig::new(person_schema(0), move |_: &LayoutBuilders<'_>| {
        LayoutRoot::Compiled(precompiled)
    }))
    .unwrap();
    assert_eq!(shape(form.root()), "col(name.first)");

    let invalid = compile(col().child(input("height")).into()).unwrap();
    let err = create_form(FormConfig::new(person_schema(0), move |_: &LayoutBuilders<'_>| invalid))
        .unwrap_err();
    assert_eq!(err, LayoutError::UnknownField { path: "height".into() });
}

#[test]
fn test_gap_defaults_and_overrides() {
    let config = LayoutConfig::from_toml_str("row_gap = 4.0\nrow_flex = 2.0").unwrap();
    let form = create_form(
        FormConfig::new(person_schema(0), |b: &LayoutBuilders<'_>| {
            b.col()
                .child(b.row().child(b.input("age")))
                .child(b.row().gap(24.0).flex(0.0).child(b.input("name.first")))
        })
        .layout_config(config),
    )
    .unwrap();
    let (_store, mut session) = mount(&form);
    let ui = session.render().unwrap();

    let Element::Stack { axis, gap, children, .. } = &ui else {
        panic!("expected stack, got {ui:?}");
    };
    assert_eq!(*axis, Axis::Vertical);
    assert_eq!(*gap, Length::Px(10.0));

    match (&children[0], &children[1]) {
        (
            Element::Stack { axis, gap, style, .. },
            Element::Stack {
                gap: custom_gap,
                style: custom_style,
                ..
            },
        ) => {
            assert_eq!(*axis, Axis::Horizontal);
            assert_eq!(*gap, Length::Px(4.0));
            assert_eq!(style.flex, Some(2.0));
            assert_eq!(*custom_gap, Length::Px(24.0));
            assert_eq!(custom_style.flex, Some(0.0));
        }
        other => panic!("expected two stacks, got {other:?}"),
    }
}

#[test]
fn test_named_container_presenter() {
    struct Card;

    impl ContainerPresenter for Card {
        fn render(&self, props: &ComputedProps, children: Vec<Element>) -> Element {
            Element::custom("card", props.clone(), children)
        }
    }

    let form = create_form(
        FormConfig::new(person_schema(16), |b: &LayoutBuilders<'_>| {
            b.container("card")
                .custom(
                    "title",
                    Computable::watch("age", |v| {
                        if v.int("age").unwrap_or(0) < 18 {
                            "Guardian details"
                        } else {
                            "Your details"
                        }
                    }),
                )
                .child(b.input("name.first"))
        })
        .containers(ContainerRegistry::new().with("card", Card)),
    )
    .unwrap();
    assert!(matches!(
        form.root(),
        Widget::Container(c) if c.kind == ContainerKind::Named("card".into())
    ));

    let (store, mut session) = mount(&form);
    let title = PropKey::Custom("title".into());

    let ui = session.render().unwrap();
    let Element::Custom { name, props, children } = &ui else {
        panic!("expected card, got {ui:?}");
    };
    assert_eq!(name, "card");
    assert_eq!(props.text(&title), Some("Guardian details"));
    assert_eq!(children.len(), 1);

    store.set_value("age", 40).unwrap();
    let ui = session.render().unwrap();
    let Element::Custom { props, .. } = &ui else {
        panic!("expected card, got {ui:?}");
    };
    assert_eq!(props.text(&title), Some("Your details"));
}

#[test]
fn test_own_field_helper_text() {
    let form = create_form(FormConfig::new(person_schema(16), |b: &LayoutBuilders<'_>| {
        b.col()
            .helper_text(Computable::own(|v| format!("{} total", v.int("age").unwrap_or(0))))
            .child(b.input("age").helper_text(Computable::own(|v| {
                format!("{} years", v.int("age").unwrap_or(0))
            })))
    }))
    .unwrap();
    let (store, mut session) = mount(&form);
    let age = form.find_input("age").unwrap();

    store.set_value("age", 42).unwrap();
    let ui = session.render().unwrap();
    assert_eq!(ui.find_input("age").unwrap().helper_text(), Some("42 years"));
    assert_eq!(session.recompute_count(age), 1);

    let root = session.props(WidgetId::ROOT).unwrap();
    assert_eq!(root.text(&PropKey::HelperText), Some("16 total"));
    assert_eq!(session.recompute_count(WidgetId::ROOT), 0);
}

#[test]
fn test_input_handlers_write_through() {
    let form = person_form(16);
    let (store, mut session) = mount(&form);

    let ui = session.render().unwrap();
    assert!(ui.as_input().is_none());
    let age = ui.children()[0].as_input().unwrap();
    age.change(21);
    age.change("twenty-two");
    age.blur();

    assert!(store.is_touched("age"));
    assert_eq!(store.values().int("age"), Some(21));
    let ui = session.render().unwrap();
    assert!(!ui.find_input("name.first").unwrap().is_disabled());
    assert!(ui.find_input("name.first").unwrap().is_required());
    assert!(!ui.find_input("name.last").unwrap().is_required());

    store.reset();
    assert_eq!(store.values().root(), &form.default_values());
    assert_eq!(
        session
            .props(form.find_input("name.first").unwrap())
            .unwrap()
            .bool(&PropKey::Disabled),
        Some(true)
    );
}

#[test]
fn test_value_prop_overrides_binding() {
    let form = create_form(FormConfig::new(person_schema(16), |b: &LayoutBuilders<'_>| {
        b.col().child(b.input("name.last").custom(
            "value",
            Computable::watch("age", |v| format!("{}", v.int("age").unwrap_or(0))),
        ))
    }))
    .unwrap();
    let (_store, mut session) = mount(&form);

    let ui = session.render().unwrap();
    assert_eq!(
        ui.find_input("name.last").unwrap().value,
        FieldValue::String("16".into())
    );
}

#[test]
fn test_teardown_releases_every_listener() {
    let form = person_form(16);
    let (store, mut session) = mount(&form);
    let first = form.find_input("name.first").unwrap();
    assert_eq!(store.listener_count(), 5);

    session.unmount();
    assert!(!session.is_mounted());
    assert_eq!(store.listener_count(), 0);

    store.set_value("age", 30).unwrap();
    assert_eq!(session.recompute_count(first), 0);
    assert!(session.take_dirty().is_empty());

    let (store, session) = mount(&form);
    assert_eq!(store.listener_count(), 5);
    drop(session);
    assert_eq!(store.listener_count(), 0);
}
