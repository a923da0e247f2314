//This is a hashset with modified serialization to serialize as a javascript object, not an array.
//This will make the front end far simpler and reduce bugs there
use schemars::JsonSchema;
use serde::{self, Deserialize, Serialize};
use std::collections::HashMap;
use std::hash::Hash;
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(transparent)]
#[serde(bound(deserialize = "T: Hash + Eq + Deserialize<'de>"))]
pub struct HashSetObj<T>
where
    T: Hash + Eq,
{
    base: HashMap<T, ()>,
}

impl<T> HashSetObj<T>
where
    T: Hash + Eq,
{
    //Returns true if the value was newly added
    pub fn insert(&mut self, value: T) -> bool {
        self.base.insert(value, ()).is_none()
    }
    pub fn remove(&mut self, value: &T) -> bool {
        self.base.remove(value).is_some()
    }
    pub fn new() -> Self {
        HashSetObj {
            base: HashMap::new(),
        }
    }
    pub fn contains(&self, value: &T) -> bool {
        self.base.contains_key(value)
    }
    pub fn len(&self) -> usize {
        self.base.len()
    }
    pub fn is_empty(&self) -> bool {
        self.base.is_empty()
    }
    pub fn clear(&mut self) {
        self.base.clear();
    }
    pub fn is_subset(&self, other: &HashSetObj<T>) -> bool {
        self.iter().all(|key| other.contains(key))
    }
    pub fn iter(&self) -> std::collections::hash_map::Keys<'_, T, ()> {
        self.base.keys()
    }
}
impl<T> Default for HashSetObj<T>
where
    T: Hash + Eq,
{
    fn default() -> Self {
        Self {
            base: Default::default(),
        }
    }
}

impl<T> FromIterator<T> for HashSetObj<T>
where
    T: Hash + Eq,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            base: iter.into_iter().map(|i| (i, ())).collect(),
        }
    }
}
impl<T> Extend<T> for HashSetObj<T>
where
    T: Hash + Eq,
{
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.base.extend(iter.into_iter().map(|i| (i, ())));
    }
}
impl<T> IntoIterator for HashSetObj<T>
where
    T: Hash + Eq,
{
    type Item = T;
    type IntoIter = std::collections::hash_map::IntoKeys<T, ()>;

    fn into_iter(self) -> Self::IntoIter {
        self.base.into_keys()
    }
}

impl<'a, T> IntoIterator for &'a HashSetObj<T>
where
    T: Hash + Eq,
{
    type Item = &'a T;
    type IntoIter = std::collections::hash_map::Keys<'a, T, ()>;

    fn into_iter(self) -> Self::IntoIter {
        self.base.keys()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_object() {
        let set: HashSetObj<String> = ["red".to_owned()].into_iter().collect();
        let text = serde_json::to_string(&set).unwrap();
        assert_eq!(text, r#"{"red":null}"#);
        let back: HashSetObj<String> = serde_json::from_str(&text).unwrap();
        assert_eq!(back, set);
    }
}
