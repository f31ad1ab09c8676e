use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Key/value tags from OSM. A value may hold several alternatives joined by `;`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tags(BTreeMap<String, String>);

impl Tags {
    pub fn new(map: BTreeMap<String, String>) -> Tags {
        Tags(map)
    }

    pub fn empty() -> Tags {
        Tags(BTreeMap::new())
    }

    pub fn get(&self, k: &str) -> Option<&String> {
        self.0.get(k)
    }

    pub fn contains_key(&self, k: &str) -> bool {
        self.0.contains_key(k)
    }

    pub fn is(&self, k: &str, v: &str) -> bool {
        self.0.get(k) == Some(&v.to_string())
    }

    /// Every alternative of a value, trimmed and lowercased. Empty alternatives are skipped; a
    /// missing key has none.
    pub fn values(&self, k: &str) -> Vec<String> {
        match self.0.get(k) {
            Some(v) => v
                .split(';')
                .map(|x| x.trim().to_ascii_lowercase())
                .filter(|x| !x.is_empty())
                .collect(),
            None => Vec::new(),
        }
    }

    /// True if any alternative of the value matches any of `values`.
    pub fn is_any(&self, k: &str, values: &[&str]) -> bool {
        self.values(k).iter().any(|v| values.contains(&v.as_str()))
    }

    pub fn insert<K: Into<String>, V: Into<String>>(&mut self, k: K, v: V) {
        self.0.insert(k.into(), v.into());
    }

    /// Stores a list value by joining the alternatives.
    pub fn insert_list<K: Into<String>>(&mut self, k: K, values: Vec<String>) {
        self.0.insert(k.into(), values.join(";"));
    }

    pub fn remove(&mut self, k: &str) -> Option<String> {
        self.0.remove(k)
    }

    pub fn inner(&self) -> &BTreeMap<String, String> {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Tags {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Tags(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multi_values() {
        let mut tags = Tags::empty();
        tags.insert_list("highway", vec!["residential".to_string(), " Unclassified".to_string()]);
        assert_eq!(tags.values("highway"), vec!["residential", "unclassified"]);
        assert!(tags.is_any("highway", &["unclassified"]));
        assert!(!tags.is_any("highway", &["motorway"]));
        assert!(!tags.is_any("name", &["x"]));
        assert!(tags.values("name").is_empty());
    }

    #[test]
    fn empty_alternatives_skipped() {
        let tags: Tags = vec![("highway", ";; ;")].into_iter().collect();
        assert!(tags.values("highway").is_empty());
        assert!(tags.contains_key("highway"));
    }
}
