//! Rendered element tree
//!
//! [`Element`] is the presenter-neutral output of a form session render.
//! Rows and columns become [`Element::Stack`]; inputs without a presentation
//! become [`Element::Input`]; presenters may return anything, typically
//! [`Element::Custom`].

use trellis_core::{
    ComputedProps, FieldBinding, FieldPath, FieldValue, Length, PropKey, PropValue,
};

use crate::config::LayoutConfig;
use crate::widget::{ContainerKind, WidgetId};

/// Main axis of a stack
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// Sizing of a stack within its parent
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StackStyle {
    pub flex: Option<f32>,
    pub min_width: Option<Length>,
    pub max_width: Option<Length>,
    pub min_height: Option<Length>,
    pub max_height: Option<Length>,
}

#[derive(Clone, Debug)]
pub enum Element {
    Stack {
        axis: Axis,
        gap: Length,
        style: StackStyle,
        class_name: Option<String>,
        children: Vec<Element>,
    },
    Input(InputElement),
    Custom {
        name: String,
        props: ComputedProps,
        children: Vec<Element>,
    },
}

impl Element {
    pub fn custom(name: impl Into<String>, props: ComputedProps, children: Vec<Element>) -> Self {
        Element::Custom {
            name: name.into(),
            props,
            children,
        }
    }

    pub fn children(&self) -> &[Element] {
        match self {
            Element::Stack { children, .. } | Element::Custom { children, .. } => children,
            Element::Input(_) => &[],
        }
    }

    pub fn as_input(&self) -> Option<&InputElement> {
        match self {
            Element::Input(input) => Some(input),
            _ => None,
        }
    }

    /// Every input element in this subtree, in document order
    pub fn inputs(&self) -> Vec<&InputElement> {
        let mut found = Vec::new();
        self.collect_inputs(&mut found);
        found
    }

    fn collect_inputs<'a>(&'a self, found: &mut Vec<&'a InputElement>) {
        found.extend(self.as_input());
        for child in self.children() {
            child.collect_inputs(found);
        }
    }

    /// First input element bound to `field`
    pub fn find_input(&self, field: &str) -> Option<&InputElement> {
        self.inputs()
            .into_iter()
            .find(|input| input.field.as_str() == field)
    }
}

/// A field input merged from its binding and its computed props
#[derive(Clone, Debug)]
pub struct InputElement {
    pub widget: WidgetId,
    pub field: FieldPath,
    /// Bound value, unless a `value` prop overrides it
    pub value: FieldValue,
    pub props: ComputedProps,
    pub presentation: Option<String>,
    /// Whether the schema marks the field required
    pub schema_required: bool,
    binding: FieldBinding,
}

impl InputElement {
    pub(crate) fn new(
        widget: WidgetId,
        binding: FieldBinding,
        props: ComputedProps,
        presentation: Option<String>,
        schema_required: bool,
    ) -> Self {
        let value = match props.get(&PropKey::Custom("value".into())) {
            Some(value) if !value.is_unset() => prop_to_field(value),
            _ => binding.value.clone(),
        };
        Self {
            widget,
            field: binding.path.clone(),
            value,
            props,
            presentation,
            schema_required,
            binding,
        }
    }

    pub fn label(&self) -> Option<&str> {
        self.props.text(&PropKey::Label)
    }

    pub fn placeholder(&self) -> Option<&str> {
        self.props.text(&PropKey::Placeholder)
    }

    pub fn helper_text(&self) -> Option<&str> {
        self.props.text(&PropKey::HelperText)
    }

    pub fn is_disabled(&self) -> bool {
        self.props.bool(&PropKey::Disabled).unwrap_or(false)
    }

    /// The `required` prop, falling back to the schema
    pub fn is_required(&self) -> bool {
        self.props
            .bool(&PropKey::Required)
            .unwrap_or(self.schema_required)
    }

    /// Write a new value through the field binding
    pub fn change(&self, value: impl Into<FieldValue>) {
        (self.binding.on_change)(value.into());
    }

    /// Report that the input lost focus
    pub fn blur(&self) {
        (self.binding.on_blur)();
    }
}

fn prop_to_field(value: &PropValue) -> FieldValue {
    match value {
        PropValue::Unset => FieldValue::Null,
        PropValue::Bool(b) => FieldValue::Bool(*b),
        PropValue::Text(s) => FieldValue::String(s.clone()),
        PropValue::Number(n) => FieldValue::Decimal(*n),
        PropValue::Length(len) => FieldValue::String(len.to_string()),
    }
}

/// Build the stack element for a row or column
///
/// Explicit props win over the configured defaults.
pub(crate) fn stack(
    kind: &ContainerKind,
    props: &ComputedProps,
    config: &LayoutConfig,
    children: Vec<Element>,
) -> Element {
    let (axis, default_gap, default_flex) = match kind {
        ContainerKind::Row => (Axis::Horizontal, config.row_gap, Some(config.row_flex)),
        _ => (Axis::Vertical, config.column_gap, None),
    };

    let style = StackStyle {
        flex: props
            .number(&PropKey::Flex)
            .map(|flex| flex as f32)
            .or(default_flex),
        min_width: props.length(&PropKey::MinWidth),
        max_width: props.length(&PropKey::MaxWidth),
        min_height: props.length(&PropKey::MinHeight),
        max_height: props.length(&PropKey::MaxHeight),
    };

    Element::Stack {
        axis,
        gap: props
            .length(&PropKey::Gap)
            .unwrap_or(Length::Px(default_gap)),
        style,
        class_name: props.text(&PropKey::ClassName).map(str::to_string),
        children,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    fn props(entries: Vec<(PropKey, PropValue)>) -> ComputedProps {
        ComputedProps::new(entries.into_iter().collect::<IndexMap<_, _>>())
    }

    #[test]
    fn test_row_defaults() {
        let element = stack(
            &ContainerKind::Row,
            &ComputedProps::default(),
            &LayoutConfig::default(),
            Vec::new(),
        );
        match element {
            Element::Stack {
                axis, gap, style, ..
            } => {
                assert_eq!(axis, Axis::Horizontal);
                assert_eq!(gap, Length::Px(10.0));
                assert_eq!(style.flex, Some(1.0));
            }
            other => panic!("expected stack, got {other:?}"),
        }
    }

    #[test]
    fn test_explicit_props_win() {
        let element = stack(
            &ContainerKind::Column,
            &props(vec![
                (PropKey::Gap, PropValue::Number(4.0)),
                (PropKey::Flex, PropValue::Number(2.0)),
                (PropKey::MaxWidth, PropValue::Length(Length::Percent(50.0))),
                (PropKey::ClassName, PropValue::from("names")),
            ]),
            &LayoutConfig::default(),
            Vec::new(),
        );
        match element {
            Element::Stack {
                axis,
                gap,
                style,
                class_name,
                ..
            } => {
                assert_eq!(axis, Axis::Vertical);
                assert_eq!(gap, Length::Px(4.0));
                assert_eq!(style.flex, Some(2.0));
                assert_eq!(style.max_width, Some(Length::Percent(50.0)));
                assert_eq!(class_name.as_deref(), Some("names"));
            }
            other => panic!("expected stack, got {other:?}"),
        }
    }

    #[test]
    fn test_column_has_no_default_flex() {
        let element = stack(
            &ContainerKind::Column,
            &ComputedProps::default(),
            &LayoutConfig::default(),
            Vec::new(),
        );
        assert!(matches!(element, Element::Stack { style: StackStyle { flex: None, .. }, .. }));
    }
}
