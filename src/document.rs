//! Ordered configuration document model.
//!
//! A document is an ordered list of named sections; a section is an ordered
//! list of keys whose values are scalars, lists, or nested sections. Order is
//! preserved exactly as inserted so that rendering is deterministic.

use serde::ser::{Serialize, SerializeMap, Serializer};

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<ConfigValue>),
    Section(ConfigSection),
}

impl ConfigValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            ConfigValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            ConfigValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_section(&self) -> Option<&ConfigSection> {
        match self {
            ConfigValue::Section(s) => Some(s),
            _ => None,
        }
    }
}

impl From<bool> for ConfigValue {
    fn from(v: bool) -> Self { ConfigValue::Bool(v) }
}
impl From<i64> for ConfigValue {
    fn from(v: i64) -> Self { ConfigValue::Int(v) }
}
impl From<i32> for ConfigValue {
    fn from(v: i32) -> Self { ConfigValue::Int(i64::from(v)) }
}
impl From<u8> for ConfigValue {
    fn from(v: u8) -> Self { ConfigValue::Int(i64::from(v)) }
}
impl From<u32> for ConfigValue {
    fn from(v: u32) -> Self { ConfigValue::Int(i64::from(v)) }
}
impl From<usize> for ConfigValue {
    fn from(v: usize) -> Self { ConfigValue::Int(v as i64) }
}
impl From<f64> for ConfigValue {
    fn from(v: f64) -> Self { ConfigValue::Float(v) }
}
impl From<&str> for ConfigValue {
    fn from(v: &str) -> Self { ConfigValue::Str(v.to_string()) }
}
impl From<String> for ConfigValue {
    fn from(v: String) -> Self { ConfigValue::Str(v) }
}
impl From<ConfigSection> for ConfigValue {
    fn from(v: ConfigSection) -> Self { ConfigValue::Section(v) }
}
impl<T: Into<ConfigValue>> From<Vec<T>> for ConfigValue {
    fn from(v: Vec<T>) -> Self {
        ConfigValue::List(v.into_iter().map(Into::into).collect())
    }
}

impl Serialize for ConfigValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ConfigValue::Bool(b) => serializer.serialize_bool(*b),
            ConfigValue::Int(i) => serializer.serialize_i64(*i),
            ConfigValue::Float(f) => serializer.serialize_f64(*f),
            ConfigValue::Str(s) => serializer.serialize_str(s),
            ConfigValue::List(items) => items.serialize(serializer),
            ConfigValue::Section(section) => section.serialize(serializer),
        }
    }
}

/// Ordered key/value mapping. Re-inserting a key replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigSection {
    entries: Vec<(String, ConfigValue)>,
}

impl ConfigSection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ConfigValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ConfigValue>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConfigValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<ConfigValue>> FromIterator<(K, V)> for ConfigSection {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(ConfigSection::new(), |section, (k, v)| section.with(k, v))
    }
}

impl<K: Into<String>, V: Into<ConfigValue>> Extend<(K, V)> for ConfigSection {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl Serialize for ConfigSection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// A complete configuration document: named sections in a fixed order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigDocument {
    sections: Vec<(String, ConfigSection)>,
}

impl ConfigDocument {
    pub fn section(&self, name: &str) -> Option<&ConfigSection> {
        self.sections.iter().find(|(n, _)| n == name).map(|(_, s)| s)
    }

    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConfigSection)> {
        self.sections.iter().map(|(n, s)| (n.as_str(), s))
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

impl<N: Into<String>> FromIterator<(N, ConfigSection)> for ConfigDocument {
    fn from_iter<I: IntoIterator<Item = (N, ConfigSection)>>(iter: I) -> Self {
        let sections = iter
            .into_iter()
            .map(|(name, section)| (name.into(), section))
            .collect();
        ConfigDocument { sections }
    }
}

impl Serialize for ConfigDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.sections.len()))?;
        for (name, section) in &self.sections {
            map.serialize_entry(name, section)?;
        }
        map.end()
    }
}
