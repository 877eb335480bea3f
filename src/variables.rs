// ABOUTME: Template variables for the mdsite generator
// ABOUTME: Liquid views where unbound names and missing keys resolve to nil

use liquid::model::{
    ArrayView, DisplayCow, KString, KStringCow, Object, ObjectView, Scalar, State,
    Value as LiquidValue, ValueView,
};
use serde_yaml::{Mapping, Value as YamlValue};
use std::collections::BTreeMap;
use std::fmt;

/// The value every missing variable, key or index resolves to.
///
/// It renders as the empty string, is falsy, and can itself be indexed, so
/// `meta.author.name` on a document without an author is nil rather than an
/// error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Undefined;

static UNDEFINED: Undefined = Undefined;

impl ValueView for Undefined {
    fn as_debug(&self) -> &dyn fmt::Debug {
        self
    }

    fn render(&self) -> DisplayCow<'_> {
        DisplayCow::Borrowed(&"")
    }
    fn source(&self) -> DisplayCow<'_> {
        DisplayCow::Borrowed(&"nil")
    }
    fn type_name(&self) -> &'static str {
        "nil"
    }
    fn query_state(&self, state: State) -> bool {
        match state {
            State::Truthy => false,
            State::DefaultValue | State::Empty | State::Blank => true,
        }
    }

    fn to_kstr(&self) -> KStringCow<'_> {
        KStringCow::from_static("")
    }
    fn to_value(&self) -> LiquidValue {
        LiquidValue::Nil
    }

    fn as_object(&self) -> Option<&dyn ObjectView> {
        Some(self)
    }
    fn is_nil(&self) -> bool {
        true
    }
}

impl ObjectView for Undefined {
    fn as_value(&self) -> &dyn ValueView {
        self
    }

    fn size(&self) -> i64 {
        0
    }

    fn keys<'k>(&'k self) -> Box<dyn Iterator<Item = KStringCow<'k>> + 'k> {
        Box::new(std::iter::empty())
    }

    fn values<'k>(&'k self) -> Box<dyn Iterator<Item = &'k dyn ValueView> + 'k> {
        Box::new(std::iter::empty())
    }

    fn iter<'k>(&'k self) -> Box<dyn Iterator<Item = (KStringCow<'k>, &'k dyn ValueView)> + 'k> {
        Box::new(std::iter::empty())
    }

    fn contains_key(&self, _index: &str) -> bool {
        false
    }

    fn get<'s>(&'s self, _index: &str) -> Option<&'s dyn ValueView> {
        Some(&UNDEFINED as &dyn ValueView)
    }
}

/// A value bound into a layout
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateValue {
    Nil,
    Scalar(Scalar),
    Array(TemplateArray),
    Object(TemplateObject),
}

impl TemplateValue {
    pub fn scalar<T: Into<Scalar>>(value: T) -> Self {
        TemplateValue::Scalar(value.into())
    }

    /// Convert a YAML value; nulls become nil and tags are dropped
    pub fn from_yaml(value: &YamlValue) -> Self {
        match value {
            YamlValue::Null => TemplateValue::Nil,
            YamlValue::Bool(b) => TemplateValue::scalar(*b),
            YamlValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    TemplateValue::scalar(i)
                } else {
                    n.as_f64().map_or(TemplateValue::Nil, TemplateValue::scalar)
                }
            }
            YamlValue::String(s) => TemplateValue::scalar(s.clone()),
            YamlValue::Sequence(items) => {
                TemplateValue::Array(TemplateArray(items.iter().map(Self::from_yaml).collect()))
            }
            YamlValue::Mapping(mapping) => TemplateValue::Object(TemplateObject::from_mapping(mapping)),
            YamlValue::Tagged(tagged) => Self::from_yaml(&tagged.value),
        }
    }

    fn as_view(&self) -> &dyn ValueView {
        match self {
            TemplateValue::Nil => &UNDEFINED,
            TemplateValue::Scalar(s) => s,
            TemplateValue::Array(a) => a,
            TemplateValue::Object(o) => o,
        }
    }
}

impl From<TemplateObject> for TemplateValue {
    fn from(object: TemplateObject) -> Self {
        TemplateValue::Object(object)
    }
}

impl ValueView for TemplateValue {
    fn as_debug(&self) -> &dyn fmt::Debug {
        self
    }

    fn render(&self) -> DisplayCow<'_> {
        self.as_view().render()
    }
    fn source(&self) -> DisplayCow<'_> {
        self.as_view().source()
    }
    fn type_name(&self) -> &'static str {
        self.as_view().type_name()
    }
    fn query_state(&self, state: State) -> bool {
        self.as_view().query_state(state)
    }

    fn to_kstr(&self) -> KStringCow<'_> {
        self.as_view().to_kstr()
    }
    fn to_value(&self) -> LiquidValue {
        self.as_view().to_value()
    }

    fn as_scalar(&self) -> Option<liquid::model::ScalarCow<'_>> {
        self.as_view().as_scalar()
    }
    fn as_array(&self) -> Option<&dyn ArrayView> {
        self.as_view().as_array()
    }
    fn as_object(&self) -> Option<&dyn ObjectView> {
        self.as_view().as_object()
    }
    fn is_nil(&self) -> bool {
        self.as_view().is_nil()
    }
}

/// A YAML sequence; indexes past either end resolve to nil
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplateArray(pub Vec<TemplateValue>);

impl TemplateArray {
    fn position(&self, index: i64) -> Option<usize> {
        let index = if index < 0 {
            self.size() + index
        } else {
            index
        };
        usize::try_from(index).ok().filter(|i| *i < self.0.len())
    }
}

impl ValueView for TemplateArray {
    fn as_debug(&self) -> &dyn fmt::Debug {
        self
    }

    fn render(&self) -> DisplayCow<'_> {
        DisplayCow::Owned(Box::new(self.to_value().render().to_string()))
    }
    fn source(&self) -> DisplayCow<'_> {
        DisplayCow::Owned(Box::new(self.to_value().source().to_string()))
    }
    fn type_name(&self) -> &'static str {
        "array"
    }
    fn query_state(&self, state: State) -> bool {
        match state {
            State::Truthy => true,
            State::DefaultValue | State::Empty | State::Blank => self.0.is_empty(),
        }
    }

    fn to_kstr(&self) -> KStringCow<'_> {
        KStringCow::from_string(self.to_value().render().to_string())
    }
    fn to_value(&self) -> LiquidValue {
        LiquidValue::Array(self.0.iter().map(ValueView::to_value).collect())
    }

    fn as_array(&self) -> Option<&dyn ArrayView> {
        Some(self)
    }
}

impl ArrayView for TemplateArray {
    fn as_value(&self) -> &dyn ValueView {
        self
    }

    fn size(&self) -> i64 {
        self.0.len() as i64
    }

    fn values<'k>(&'k self) -> Box<dyn Iterator<Item = &'k dyn ValueView> + 'k> {
        Box::new(self.0.iter().map(|v| v as &dyn ValueView))
    }

    fn contains_key(&self, index: i64) -> bool {
        self.position(index).is_some()
    }

    fn get(&self, index: i64) -> Option<&dyn ValueView> {
        match self.position(index) {
            Some(i) => Some(&self.0[i] as &dyn ValueView),
            None => Some(&UNDEFINED as &dyn ValueView),
        }
    }
}

/// A mapping of named values; missing keys resolve to nil
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplateObject {
    entries: BTreeMap<KString, TemplateValue>,
}

impl TemplateObject {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convert a YAML mapping, stringifying scalar keys
    pub fn from_mapping(mapping: &Mapping) -> Self {
        let entries = mapping
            .iter()
            .map(|(key, value)| (KString::from(key_to_string(key)), TemplateValue::from_yaml(value)))
            .collect();
        Self { entries }
    }

    pub fn insert<V: Into<TemplateValue>>(&mut self, key: &'static str, value: V) {
        self.entries.insert(KString::from_static(key), value.into());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<Scalar> for TemplateValue {
    fn from(scalar: Scalar) -> Self {
        TemplateValue::Scalar(scalar)
    }
}

impl ValueView for TemplateObject {
    fn as_debug(&self) -> &dyn fmt::Debug {
        self
    }

    fn render(&self) -> DisplayCow<'_> {
        DisplayCow::Owned(Box::new(self.to_value().render().to_string()))
    }
    fn source(&self) -> DisplayCow<'_> {
        DisplayCow::Owned(Box::new(self.to_value().source().to_string()))
    }
    fn type_name(&self) -> &'static str {
        "object"
    }
    fn query_state(&self, state: State) -> bool {
        match state {
            State::Truthy => true,
            State::DefaultValue | State::Empty | State::Blank => self.entries.is_empty(),
        }
    }

    fn to_kstr(&self) -> KStringCow<'_> {
        KStringCow::from_string(self.to_value().render().to_string())
    }
    fn to_value(&self) -> LiquidValue {
        let object: Object = self
            .entries
            .iter()
            .map(|(key, value)| (key.clone(), value.to_value()))
            .collect();
        LiquidValue::Object(object)
    }

    fn as_object(&self) -> Option<&dyn ObjectView> {
        Some(self)
    }
}

impl ObjectView for TemplateObject {
    fn as_value(&self) -> &dyn ValueView {
        self
    }

    fn size(&self) -> i64 {
        self.entries.len() as i64
    }

    fn keys<'k>(&'k self) -> Box<dyn Iterator<Item = KStringCow<'k>> + 'k> {
        Box::new(self.entries.keys().map(|k| k.as_str().into()))
    }

    fn values<'k>(&'k self) -> Box<dyn Iterator<Item = &'k dyn ValueView> + 'k> {
        Box::new(self.entries.values().map(|v| v as &dyn ValueView))
    }

    fn iter<'k>(&'k self) -> Box<dyn Iterator<Item = (KStringCow<'k>, &'k dyn ValueView)> + 'k> {
        Box::new(
            self.entries
                .iter()
                .map(|(k, v)| (k.as_str().into(), v as &dyn ValueView)),
        )
    }

    fn contains_key(&self, index: &str) -> bool {
        self.entries.contains_key(index)
    }

    fn get<'s>(&'s self, index: &str) -> Option<&'s dyn ValueView> {
        match self.entries.get(index) {
            Some(value) => Some(value as &dyn ValueView),
            // Leave `size` to Liquid's built-in object size
            None if index == "size" => None,
            None => Some(&UNDEFINED as &dyn ValueView),
        }
    }
}

/// The top-level variables of one render.
///
/// Claims every name, so a variable the layout never had bound renders as
/// nil instead of aborting with "Unknown variable". Names assigned inside the
/// template shadow these.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Globals(pub TemplateObject);

impl ValueView for Globals {
    fn as_debug(&self) -> &dyn fmt::Debug {
        self
    }

    fn render(&self) -> DisplayCow<'_> {
        self.0.render()
    }
    fn source(&self) -> DisplayCow<'_> {
        self.0.source()
    }
    fn type_name(&self) -> &'static str {
        self.0.type_name()
    }
    fn query_state(&self, state: State) -> bool {
        self.0.query_state(state)
    }

    fn to_kstr(&self) -> KStringCow<'_> {
        self.0.to_kstr()
    }
    fn to_value(&self) -> LiquidValue {
        self.0.to_value()
    }

    fn as_object(&self) -> Option<&dyn ObjectView> {
        Some(self)
    }
}

impl ObjectView for Globals {
    fn as_value(&self) -> &dyn ValueView {
        self
    }

    fn size(&self) -> i64 {
        self.0.size()
    }

    fn keys<'k>(&'k self) -> Box<dyn Iterator<Item = KStringCow<'k>> + 'k> {
        self.0.keys()
    }

    fn values<'k>(&'k self) -> Box<dyn Iterator<Item = &'k dyn ValueView> + 'k> {
        self.0.values()
    }

    fn iter<'k>(&'k self) -> Box<dyn Iterator<Item = (KStringCow<'k>, &'k dyn ValueView)> + 'k> {
        self.0.iter()
    }

    fn contains_key(&self, _index: &str) -> bool {
        true
    }

    fn get<'s>(&'s self, index: &str) -> Option<&'s dyn ValueView> {
        match self.0.entries.get(index) {
            Some(value) => Some(value as &dyn ValueView),
            None => Some(&UNDEFINED as &dyn ValueView),
        }
    }
}

fn key_to_string(key: &YamlValue) -> String {
    match key {
        YamlValue::String(s) => s.clone(),
        YamlValue::Bool(b) => b.to_string(),
        YamlValue::Number(n) => n.to_string(),
        YamlValue::Null => "null".to_string(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}
