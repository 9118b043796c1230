//! Field-name keyed value tables used for defaults and errors.

use std::collections::BTreeMap;

/// A table of form values keyed by field name.
///
/// Each field holds one or more values: a plain text input uses the first,
/// checkbox groups and multi-selects match against all of them. The same type
/// carries error messages, where multiple values are joined with newlines.
///
/// # Example
///
/// ```rust
/// use formfill_html::FieldMap;
///
/// let mut defaults = FieldMap::new();
/// defaults.insert("username", "robert");
/// defaults.insert_many("tags", ["rust", "web"]);
///
/// assert_eq!(defaults.first("username"), Some("robert"));
/// assert!(defaults.contains_value("tags", "web"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMap {
    fields: BTreeMap<String, Vec<String>>,
}

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a single value, replacing anything stored under `name`.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(name.into(), vec![value.into()]);
    }

    /// Sets several values, replacing anything stored under `name`.
    pub fn insert_many<I, S>(&mut self, name: impl Into<String>, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields
            .insert(name.into(), values.into_iter().map(Into::into).collect());
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// The first value of a field.
    pub fn first(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// All values of a field (empty when absent).
    pub fn values(&self, name: &str) -> &[String] {
        self.fields.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains_value(&self, name: &str, value: &str) -> bool {
        self.values(name).iter().any(|v| v == value)
    }

    /// The field's values joined with newlines; used for error messages.
    pub fn text(&self, name: &str) -> Option<String> {
        self.fields.get(name).map(|values| values.join("\n"))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for FieldMap
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map = FieldMap::new();
        for (name, value) in iter {
            map.insert(name, value);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_replaces() {
        let mut map = FieldMap::new();
        map.insert_many("a", ["1", "2"]);
        map.insert("a", "3");
        assert_eq!(map.values("a"), ["3".to_string()]);
    }

    #[test]
    fn missing_field() {
        let map = FieldMap::new();
        assert_eq!(map.first("x"), None);
        assert!(map.values("x").is_empty());
        assert_eq!(map.text("x"), None);
    }

    #[test]
    fn text_joins_values() {
        let mut map = FieldMap::new();
        map.insert_many("pw", ["too short", "needs a digit"]);
        assert_eq!(map.text("pw").as_deref(), Some("too short\nneeds a digit"));
    }

    #[test]
    fn collect_from_pairs() {
        let map: FieldMap = [("b", "2"), ("a", "1")].into_iter().collect();
        assert_eq!(map.names().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(map.len(), 2);
    }
}
