//! The request-side collaborator of a render
//!
//! An `Action` is whatever handles the current request: it knows the locale
//! the response should use, carries request-scoped attributes that templates
//! may read, and exposes helper members that templates can reference without
//! qualification.

use std::fmt;

use indexmap::IndexMap;
use serde_json::Value as JsonValue;

use crate::format::Locale;

/// Binding of the action in every template namespace
pub const HELPER_BINDING: &str = "helper";

/// Named values, in insertion order
pub type Attributes = IndexMap<String, JsonValue>;

/// The request/action a template is rendered for
pub trait Action: Send + Sync + fmt::Debug {
    /// Short name, exposed to templates as `helper.name`
    fn name(&self) -> &str;

    /// Locale of the current request
    fn locale(&self) -> &Locale;

    /// Request-scoped attributes to bind into the template namespace
    fn attributes(&self) -> &Attributes;

    /// Members imported into the template namespace unqualified
    fn helpers(&self) -> Attributes {
        Attributes::new()
    }
}

/// A plain in-memory action
#[derive(Debug, Clone, Default)]
pub struct SimpleAction {
    name: String,
    locale: Locale,
    attributes: Attributes,
    helpers: Attributes,
}

impl SimpleAction {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn with_helper(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.helpers.insert(key.into(), value.into());
        self
    }

    /// Set or replace a request-scoped attribute
    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<JsonValue>) {
        self.attributes.insert(key.into(), value.into());
    }

    /// Remove a request-scoped attribute, returning its value
    pub fn remove_attribute(&mut self, key: &str) -> Option<JsonValue> {
        self.attributes.shift_remove(key)
    }

    pub fn attributes_mut(&mut self) -> &mut Attributes {
        &mut self.attributes
    }
}

impl Action for SimpleAction {
    fn name(&self) -> &str {
        &self.name
    }

    fn locale(&self) -> &Locale {
        &self.locale
    }

    fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    fn helpers(&self) -> Attributes {
        self.helpers.clone()
    }
}
