//! Case-insensitive ordering for everything handed to the view layer.
//!
//! Keys are compared by their lowercase form; equal keys keep their original
//! relative order.

use std::collections::HashMap;

use serde::ser::{Serialize, SerializeMap, Serializer};

/// A string-keyed map that iterates and serializes in insertion order.
///
/// Built in canonical order by [`order_keys`]. Serialized as a JSON object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderedMap<V> {
    entries: Vec<(String, V)>,
}

impl<V> OrderedMap<V> {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V> Default for OrderedMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Into<String>, V> FromIterator<(K, V)> for OrderedMap<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: collapse_duplicates(iter),
        }
    }
}

impl<V> IntoIterator for OrderedMap<V> {
    type Item = (String, V);
    type IntoIter = std::vec::IntoIter<(String, V)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<V: Serialize> Serialize for OrderedMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// Returns the entries in ascending case-insensitive key order.
///
/// Accepts any iterable of pairs, so `Option<HashMap<..>>` flattened, a
/// `Vec` or another `OrderedMap` all work; an empty input yields an empty map.
pub fn order_keys<K, V, I>(entries: I) -> OrderedMap<V>
where
    K: Into<String>,
    I: IntoIterator<Item = (K, V)>,
{
    let mut entries = collapse_duplicates(entries);
    entries.sort_by_cached_key(|(k, _)| k.to_lowercase());
    OrderedMap { entries }
}

/// Single pass: a repeated key keeps its first position and takes the last value.
fn collapse_duplicates<K, V, I>(entries: I) -> Vec<(String, V)>
where
    K: Into<String>,
    I: IntoIterator<Item = (K, V)>,
{
    let iter = entries.into_iter();
    let mut positions: HashMap<String, usize> = HashMap::with_capacity(iter.size_hint().0);
    let mut out: Vec<(String, V)> = Vec::with_capacity(iter.size_hint().0);
    for (k, v) in iter {
        let key = k.into();
        match positions.get(&key).copied() {
            Some(i) => out[i].1 = v,
            None => {
                positions.insert(key.clone(), out.len());
                out.push((key, v));
            }
        }
    }
    out
}

/// Sorts names in place by the same comparator as [`order_keys`].
pub fn order_list(list: &mut [String]) {
    list.sort_by_cached_key(|name| name.to_lowercase());
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    #[test]
    fn test_order_keys_is_case_insensitive() {
        let map: HashMap<&str, u32> = [("Zoo", 1), ("apple", 2), ("Bank", 3)].into_iter().collect();
        let ordered = order_keys(map);
        assert_eq!(ordered.keys().collect::<Vec<_>>(), vec!["apple", "Bank", "Zoo"]);
        assert_eq!(ordered.get("Bank"), Some(&3));
    }

    #[test]
    fn test_order_keys_is_stable_and_idempotent() {
        let input = vec![("b", 1), ("B", 2), ("a", 3), ("b", 4)];
        let once = order_keys(input);
        // duplicate "b" collapses onto its first position with the later value
        assert_eq!(once.keys().collect::<Vec<_>>(), vec!["a", "b", "B"]);
        assert_eq!(once.get("b"), Some(&4));

        let twice = order_keys(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_order_keys_empty_input() {
        let none: Option<HashMap<String, u32>> = None;
        let ordered = order_keys(none.into_iter().flatten());
        assert!(ordered.is_empty());
    }

    #[test]
    fn test_order_keys_scales_linearly_with_many_keys() {
        let n = 50_000;
        let input: Vec<(String, usize)> = (0..n).rev().map(|i| (format!("coll{:06}", i), i)).collect();

        let start = Instant::now();
        let ordered = order_keys(input);
        let elapsed = start.elapsed();

        assert_eq!(ordered.len(), n);
        assert_eq!(ordered.keys().next(), Some("coll000000"));
        assert_eq!(ordered.get("coll049999"), Some(&49_999));
        assert!(elapsed < Duration::from_secs(5), "ordering {} keys took {:?}", n, elapsed);
    }

    #[test]
    fn test_collect_collapses_duplicates_in_one_pass() {
        let map: OrderedMap<u32> = vec![("x", 1), ("y", 2), ("x", 3)].into_iter().collect();
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["x", "y"]);
        assert_eq!(map.get("x"), Some(&3));
    }

    #[test]
    fn test_order_list() {
        let mut list = vec!["users".to_string(), "Orders".to_string(), "audit".to_string()];
        order_list(&mut list);
        assert_eq!(list, vec!["audit", "Orders", "users"]);

        let mut empty: Vec<String> = vec![];
        order_list(&mut empty);
        assert!(empty.is_empty());
    }

    #[test]
    fn test_ordered_map_serializes_in_order() {
        let ordered = order_keys(vec![("zeta", 1), ("Alpha", 2)]);
        let json = serde_json::to_string(&ordered).unwrap();
        assert_eq!(json, r#"{"Alpha":2,"zeta":1}"#);
    }
}
