//! Named parameter storage.

use crate::value::Value;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Ordered mapping from parameter name to value.
///
/// Keys are unique: adding a name that already exists is a no-op, so the
/// first writer wins. Iteration follows insertion order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Parameters {
    entries: Vec<(String, Value)>,
}

impl Parameters {
    /// Create a new empty parameter map.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Add a parameter unless the name is already taken.
    ///
    /// Returns `true` when the value was stored.
    pub fn add(&mut self, name: impl Into<String>, value: Value) -> bool {
        let name = name.into();
        if self.contains(&name) {
            return false;
        }
        self.entries.push((name, value));
        true
    }

    /// Check whether a parameter with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == name)
    }

    /// Look up a parameter value by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    /// Get the current parameter count.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the map is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Parameter names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Parameter values in insertion order.
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(_, v)| v)
    }

    /// First parameter, if any.
    pub fn first(&self) -> Option<(&str, &Value)> {
        self.entries.first().map(|(k, v)| (k.as_str(), v))
    }

    /// Merge another map into this one; existing names keep their value.
    pub fn extend(&mut self, other: &Parameters) {
        for (name, value) in other.iter() {
            self.add(name, value.clone());
        }
    }

    /// Get all values as references for tokio-postgres positional binding.
    #[cfg(feature = "postgres")]
    pub fn as_refs(&self) -> Vec<&(dyn tokio_postgres::types::ToSql + Sync)> {
        self.entries
            .iter()
            .map(|(_, v)| v as &(dyn tokio_postgres::types::ToSql + Sync))
            .collect()
    }
}

impl Serialize for Parameters {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'a> IntoIterator for &'a Parameters {
    type Item = (&'a str, &'a Value);
    type IntoIter = Box<dyn Iterator<Item = (&'a str, &'a Value)> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_writer_wins() {
        let mut params = Parameters::new();
        assert!(params.add("Param1", Value::Int(1)));
        assert!(!params.add("Param1", Value::Int(2)));
        assert_eq!(params.len(), 1);
        assert_eq!(params.get("Param1"), Some(&Value::Int(1)));
    }

    #[test]
    fn keeps_insertion_order() {
        let mut params = Parameters::new();
        params.add("b", Value::Int(2));
        params.add("a", Value::Int(1));
        let names: Vec<_> = params.names().collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn serializes_as_json_object() {
        let mut params = Parameters::new();
        params.add("Param1", Value::Int(10));
        params.add("Param2", Value::Text("x".into()));
        let json = serde_json::to_string(&params).unwrap();
        assert_eq!(json, r#"{"Param1":10,"Param2":"x"}"#);
    }
}
