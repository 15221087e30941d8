// File: src/model.rs
// Purpose: Render models and view instructions

use serde::Serialize;
use std::collections::hash_map;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::value::Value;

/// String-keyed model handed to a view
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Model(HashMap<String, Value>);

impl Model {
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> hash_map::Iter<'_, String, Value> {
        self.0.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    /// Adds entries of `other` whose keys are not present yet
    pub fn add_missing(&mut self, other: &Model) {
        for (key, value) in other.iter() {
            self.0.entry(key.clone()).or_insert_with(|| value.clone());
        }
    }

    /// Returns `base` overwritten by every entry of `self`
    pub fn layered_over(self, base: &Model) -> Model {
        let mut merged = base.clone();
        merged.0.extend(self.0);
        merged
    }

    /// Replaces proxy-wrapped values by what they wrap
    pub fn unwrap_proxies(&mut self) {
        for value in self.0.values_mut() {
            if value.is_proxy() {
                let wrapped = std::mem::replace(value, Value::Null);
                *value = wrapped.unwrap_proxy();
            }
        }
    }

    pub fn into_inner(self) -> HashMap<String, Value> {
        self.0
    }

    /// Reads a model back out of an object value
    pub fn from_value(value: &Value) -> Option<Model> {
        match value {
            Value::Object(obj) => Some(Model(obj.clone())),
            Value::Proxy(inner) => Model::from_value(inner),
            _ => None,
        }
    }
}

impl From<HashMap<String, Value>> for Model {
    fn from(map: HashMap<String, Value>) -> Self {
        Self(map)
    }
}

impl From<Model> for Value {
    fn from(model: Model) -> Self {
        Value::Object(model.0)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Model {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl<K: Into<String>, V: Into<Value>> Extend<(K, V)> for Model {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        self.0
            .extend(iter.into_iter().map(|(k, v)| (k.into(), v.into())));
    }
}

impl IntoIterator for Model {
    type Item = (String, Value);
    type IntoIter = hash_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Model {
    type Item = (&'a String, &'a Value);
    type IntoIter = hash_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// A resolved view object
///
/// The template engine lives outside the dispatcher; this is its boundary.
pub trait View: fmt::Debug + Send + Sync {
    fn render(&self, model: &Model) -> anyhow::Result<String>;
}

/// Render instruction: which view to render and with what model
#[derive(Debug, Clone, Default)]
pub struct ModelAndView {
    view_name: Option<String>,
    view: Option<Arc<dyn View>>,
    model: Model,
}

impl ModelAndView {
    pub fn new(view_name: impl Into<String>, model: Model) -> Self {
        Self {
            view_name: Some(view_name.into()),
            view: None,
            model,
        }
    }

    /// An instruction carrying only a model; the view is decided later
    pub fn from_model(model: Model) -> Self {
        Self {
            model,
            ..Self::default()
        }
    }

    pub fn with_view(view: Arc<dyn View>, model: Model) -> Self {
        Self {
            view_name: None,
            view: Some(view),
            model,
        }
    }

    pub fn view_name(&self) -> Option<&str> {
        self.view_name.as_deref()
    }

    pub fn set_view_name(&mut self, view_name: impl Into<String>) {
        self.view_name = Some(view_name.into());
    }

    pub fn view(&self) -> Option<&Arc<dyn View>> {
        self.view.as_ref()
    }

    /// True when neither a view object nor a non-blank view name is set
    pub fn lacks_view(&self) -> bool {
        self.view.is_none()
            && self
                .view_name
                .as_deref()
                .map_or(true, |name| name.trim().is_empty())
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut Model {
        &mut self.model
    }

    pub fn into_model(self) -> Model {
        self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_add_missing_keeps_existing() {
        let mut model = Model::new().with("a", 1).with("shared", "mine");
        model.add_missing(&Model::new().with("b", 2).with("shared", "chain"));

        assert_eq!(model.get("a"), Some(&Value::from(1)));
        assert_eq!(model.get("b"), Some(&Value::from(2)));
        assert_eq!(model.get("shared"), Some(&Value::from("mine")));
    }

    #[test]
    fn test_layered_over_overwrites_base() {
        let base = Model::new().with("b", 2).with("shared", "chain");
        let model = Model::new().with("shared", "mine").layered_over(&base);

        assert_eq!(model.len(), 2);
        assert_eq!(model.get("shared"), Some(&Value::from("mine")));
    }

    #[test]
    fn test_unwrap_proxies() {
        let mut model = Model::new()
            .with("book", Value::proxy("Dune"))
            .with("plain", 3);
        model.unwrap_proxies();

        assert_eq!(model.get("book"), Some(&Value::from("Dune")));
        assert_eq!(model.get("plain"), Some(&Value::from(3)));
    }

    #[test]
    fn test_from_value() {
        let value = Value::from(Model::new().with("a", 1));
        assert_eq!(Model::from_value(&value).unwrap().len(), 1);
        assert!(Model::from_value(&Value::from("text")).is_none());
    }

    #[test]
    fn test_model_and_view_lacks_view() {
        let mut mv = ModelAndView::from_model(Model::new());
        assert!(mv.lacks_view());
        mv.set_view_name("/book/show");
        assert!(!mv.lacks_view());
        assert_eq!(mv.view_name(), Some("/book/show"));
    }
}
