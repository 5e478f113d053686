//! Per-render context
//!
//! A [`RenderContext`] is built fresh for every render and never shared. Its
//! namespace always holds two reserved bindings:
//!
//! - `helper`: the action the template is rendered for; its helper members
//!   are also imported unqualified
//! - `context`: the render context itself, which engine functions such as
//!   `format_date` and `format_number` read their formatters from
//!
//! Request attributes are bound after the helpers. Neither may replace a
//! reserved binding.

use std::sync::Arc;

use chrono::{DateTime, FixedOffset};
use indexmap::IndexMap;
use minijinja::value::{Enumerator, Object, ObjectRepr, Value};
use minijinja::{Error, ErrorKind, State};
pub use vellum_core::HELPER_BINDING;
use vellum_core::{
    Action, Attributes, DateFormat, DefaultDateFormat, DefaultNumberFormat, Locale, NumberFormat,
    RenderOptions, TemplateIdentifier,
};

use crate::engine::EngineInstance;
use crate::functions::parse_date;

/// Binding of the render context in every template namespace
pub const CONTEXT_BINDING: &str = "context";

/// Names attributes and helpers can never rebind
pub const RESERVED_BINDINGS: [&str; 2] = [HELPER_BINDING, CONTEXT_BINDING];

/// Formatting state of one render, shared with the `context` binding
#[derive(Debug)]
pub struct ContextState {
    identifier: TemplateIdentifier,
    action: Arc<dyn Action>,
    date: Arc<dyn DateFormat>,
    number: Arc<dyn NumberFormat>,
}

impl ContextState {
    pub fn identifier(&self) -> &TemplateIdentifier {
        &self.identifier
    }

    /// Locale of the request
    pub fn locale(&self) -> &Locale {
        self.action.locale()
    }

    pub fn format_date(&self, date: &DateTime<FixedOffset>) -> String {
        self.date.format_date(date, self.locale())
    }

    pub fn format_number(&self, value: f64) -> String {
        self.number.format_number(value, self.locale())
    }
}

/// Template-side view of [`ContextState`]
#[derive(Debug)]
pub(crate) struct ContextObject(pub(crate) Arc<ContextState>);

impl Object for ContextObject {
    fn repr(self: &Arc<Self>) -> ObjectRepr {
        ObjectRepr::Map
    }

    fn get_value(self: &Arc<Self>, key: &Value) -> Option<Value> {
        match key.as_str()? {
            "identifier" => Some(Value::from(self.0.identifier.as_str())),
            "locale" => Some(Value::from(self.0.locale().to_string())),
            _ => None,
        }
    }

    fn enumerate(self: &Arc<Self>) -> Enumerator {
        Enumerator::Str(&["identifier", "locale"])
    }

    fn call_method(
        self: &Arc<Self>,
        _state: &State,
        method: &str,
        args: &[Value],
    ) -> Result<Value, Error> {
        let single = || match args {
            [arg] => Ok(arg.clone()),
            _ => Err(Error::new(
                ErrorKind::InvalidOperation,
                format!("context.{}() takes exactly one argument", method),
            )),
        };

        match method {
            "format_date" => {
                let date = parse_date(&single()?)?;
                Ok(Value::from(self.0.format_date(&date)))
            }
            "format_number" => {
                let value = f64::try_from(single()?)?;
                Ok(Value::from(self.0.format_number(value)))
            }
            _ => Err(Error::new(
                ErrorKind::UnknownMethod,
                format!("context has no method named {}", method),
            )),
        }
    }
}

/// Template-side view of the action
#[derive(Debug)]
pub(crate) struct ActionObject {
    action: Arc<dyn Action>,
    helpers: Attributes,
}

impl ActionObject {
    pub(crate) fn new(action: Arc<dyn Action>) -> Self {
        let helpers = action.helpers();
        Self { action, helpers }
    }
}

impl Object for ActionObject {
    fn repr(self: &Arc<Self>) -> ObjectRepr {
        ObjectRepr::Map
    }

    fn get_value(self: &Arc<Self>, key: &Value) -> Option<Value> {
        match key.as_str()? {
            "name" => Some(Value::from(self.action.name())),
            "locale" => Some(Value::from(self.action.locale().to_string())),
            key => self
                .helpers
                .get(key)
                .or_else(|| self.action.attributes().get(key))
                .map(Value::from_serialize),
        }
    }

    fn enumerate(self: &Arc<Self>) -> Enumerator {
        let keys = ["name", "locale"]
            .into_iter()
            .map(Value::from)
            .chain(self.helpers.keys().map(|k| Value::from(k.as_str())))
            .collect();
        Enumerator::Values(keys)
    }
}

/// State of a single render
pub struct RenderContext<'e> {
    engine: &'e EngineInstance,
    state: Arc<ContextState>,
    namespace: IndexMap<String, Value>,
    out: String,
}

impl<'e> RenderContext<'e> {
    /// Build the context for rendering `identifier` on behalf of `action`
    pub fn build(
        identifier: &TemplateIdentifier,
        engine: &'e EngineInstance,
        action: &Arc<dyn Action>,
        options: &RenderOptions,
    ) -> Self {
        let state = Arc::new(ContextState {
            identifier: identifier.clone(),
            action: Arc::clone(action),
            date: options
                .date_format()
                .cloned()
                .unwrap_or_else(|| Arc::new(DefaultDateFormat)),
            number: options
                .number_format()
                .cloned()
                .unwrap_or_else(|| Arc::new(DefaultNumberFormat)),
        });

        let mut namespace = IndexMap::new();
        namespace.insert(
            HELPER_BINDING.to_string(),
            Value::from_object(ActionObject::new(Arc::clone(action))),
        );
        namespace.insert(
            CONTEXT_BINDING.to_string(),
            Value::from_object(ContextObject(Arc::clone(&state))),
        );

        bind_all(&mut namespace, &action.helpers(), "helper member", identifier);
        bind_all(&mut namespace, action.attributes(), "attribute", identifier);

        Self {
            engine,
            state,
            namespace,
            out: String::new(),
        }
    }

    pub fn identifier(&self) -> &TemplateIdentifier {
        &self.state.identifier
    }

    pub fn engine(&self) -> &'e EngineInstance {
        self.engine
    }

    pub fn state(&self) -> &Arc<ContextState> {
        &self.state
    }

    pub fn locale(&self) -> &Locale {
        self.state.locale()
    }

    /// A bound value by name
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.namespace.get(name)
    }

    /// Names bound in the namespace, in binding order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.namespace.keys().map(String::as_str)
    }

    /// Append rendered output
    pub fn write(&mut self, text: &str) {
        self.out.push_str(text);
    }

    pub fn output(&self) -> &str {
        &self.out
    }

    pub fn into_output(self) -> String {
        self.out
    }

    /// The namespace as a MiniJinja render context
    pub(crate) fn to_value(&self) -> Value {
        Value::from_iter(
            self.namespace
                .iter()
                .map(|(name, value)| (name.clone(), value.clone())),
        )
    }
}

fn bind_all(
    namespace: &mut IndexMap<String, Value>,
    values: &Attributes,
    kind: &str,
    identifier: &TemplateIdentifier,
) {
    for (name, value) in values {
        if RESERVED_BINDINGS.contains(&name.as_str()) {
            tracing::warn!(
                template = %identifier,
                name = %name,
                "ignoring {} that collides with a reserved binding",
                kind
            );
            continue;
        }
        namespace.insert(name.clone(), Value::from_serialize(value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manager::EngineManager;
    use vellum_core::{FixedNumberFormat, RenderConfig, SimpleAction};

    fn action() -> Arc<dyn Action> {
        Arc::new(
            SimpleAction::new("Index")
                .with_locale(Locale::parse("fr-FR").unwrap())
                .with_attribute("title", "Welcome")
                .with_attribute("helper", "spoofed")
                .with_attribute("context", 1)
                .with_helper("site", "example.org"),
        )
    }

    fn manager() -> EngineManager {
        let dir = std::env::temp_dir();
        EngineManager::new(&RenderConfig::default().with_tmp_dir(dir))
    }

    #[test]
    fn test_reserved_bindings_survive_collisions() {
        let manager = manager();
        let id = TemplateIdentifier::new("Index.jade").unwrap();
        let context = RenderContext::build(&id, manager.file_engine(), &action(), &RenderOptions::default());

        let helper = context.get(HELPER_BINDING).unwrap();
        assert!(helper.downcast_object_ref::<ActionObject>().is_some());
        let bound = context.get(CONTEXT_BINDING).unwrap();
        assert!(bound.downcast_object_ref::<ContextObject>().is_some());
    }

    #[test]
    fn test_attributes_and_helpers_are_bound() {
        let manager = manager();
        let id = TemplateIdentifier::new("Index.jade").unwrap();
        let context = RenderContext::build(&id, manager.file_engine(), &action(), &RenderOptions::default());

        assert_eq!(context.get("title").and_then(|v| v.as_str()), Some("Welcome"));
        assert_eq!(context.get("site").and_then(|v| v.as_str()), Some("example.org"));
        let names: Vec<&str> = context.names().collect();
        assert_eq!(names, ["helper", "context", "site", "title"]);
    }

    #[test]
    fn test_locale_delegates_to_action() {
        let manager = manager();
        let id = TemplateIdentifier::new("Index.jade").unwrap();
        let context = RenderContext::build(&id, manager.file_engine(), &action(), &RenderOptions::default());
        assert_eq!(context.locale().to_string(), "fr-FR");
        assert_eq!(context.identifier().as_str(), "Index.jade");
    }

    #[test]
    fn test_explicit_number_format_wins() {
        let manager = manager();
        let id = TemplateIdentifier::new("Index.jade").unwrap();
        let options = RenderOptions::new().with_number_format(FixedNumberFormat::new(2));
        let context = RenderContext::build(&id, manager.file_engine(), &action(), &options);
        assert_eq!(context.state().format_number(3.0), "3,00");
    }

    #[test]
    fn test_output_buffer() {
        let manager = manager();
        let id = TemplateIdentifier::new("Index.jade").unwrap();
        let mut context = RenderContext::build(&id, manager.string_engine(), &action(), &RenderOptions::default());
        context.write("a");
        context.write("b");
        assert_eq!(context.output(), "ab");
        assert_eq!(context.into_output(), "ab");
    }
}
