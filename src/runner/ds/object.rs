use std::collections::HashMap;

use crate::runner::ds::value::JsValue;

/// Plain data object with JS property ordering: keys iterate in the order
/// they were first inserted.
#[derive(Clone, Default)]
pub struct JsObject {
    keys: Vec<String>,
    properties: HashMap<String, JsValue>,
}

impl JsObject {
    pub fn new() -> Self {
        JsObject::default()
    }

    pub fn get(&self, key: &str) -> Option<&JsValue> {
        self.properties.get(key)
    }

    pub fn has(&self, key: &str) -> bool {
        self.properties.contains_key(key)
    }

    /// Sets `key`, keeping its original position when it already exists.
    pub fn insert(&mut self, key: impl Into<String>, value: JsValue) {
        let key = key.into();
        if !self.properties.contains_key(&key) {
            self.keys.push(key.clone());
        }
        self.properties.insert(key, value);
    }

    pub fn remove(&mut self, key: &str) -> Option<JsValue> {
        let removed = self.properties.remove(key);
        if removed.is_some() {
            self.keys.retain(|k| k != key);
        }
        removed
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.keys.iter()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&String, &JsValue)> {
        self.keys
            .iter()
            .filter_map(move |k| self.properties.get(k).map(|v| (k, v)))
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, JsValue)> for JsObject {
    fn from_iter<T: IntoIterator<Item = (K, JsValue)>>(iter: T) -> Self {
        let mut o = JsObject::new();
        for (k, v) in iter {
            o.insert(k, v);
        }
        o
    }
}
