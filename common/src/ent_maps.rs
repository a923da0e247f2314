use std::{collections::HashMap, hash::Hash, num::NonZeroU64};

use serde::Serialize;

//Hands out a fresh key for every inserted value. Keys are never reused,
//so a removed entity's id stays dead.
#[derive(Clone, Serialize, Debug)]
pub struct EntMap<K, V>
where
    K: Copy + Hash + Eq + From<NonZeroU64>,
{
    #[serde(flatten)]
    ents: HashMap<K, V>,
    #[serde(skip)]
    count: NonZeroU64,
}

impl<K, V> Default for EntMap<K, V>
where
    K: Copy + Hash + Eq + From<NonZeroU64>,
{
    fn default() -> Self {
        Self::new()
    }
}
impl<K, V> EntMap<K, V>
where
    K: Copy + Hash + Eq + From<NonZeroU64>,
{
    pub fn new() -> Self {
        Self {
            ents: HashMap::new(),
            count: NonZeroU64::MIN,
        }
    }
    pub fn view(&self) -> Vec<(K, &V)> {
        self.ents.iter().map(|(k, v)| (*k, v)).collect()
    }
    pub fn iter(&self) -> impl Iterator<Item = (K, &V)> {
        self.ents.iter().map(|(k, v)| (*k, v))
    }
    pub fn keys(&self) -> impl Iterator<Item = K> + '_ {
        self.ents.keys().copied()
    }
    pub fn get(&self, id: K) -> Option<&V> {
        self.ents.get(&id)
    }
    pub fn get_mut(&mut self, id: K) -> Option<&mut V> {
        self.ents.get_mut(&id)
    }
    pub fn contains(&self, id: K) -> bool {
        self.ents.contains_key(&id)
    }
    pub fn len(&self) -> usize {
        self.ents.len()
    }
    pub fn is_empty(&self) -> bool {
        self.ents.is_empty()
    }
    pub fn is(&self, id: K, f: impl FnOnce(&V) -> bool) -> bool {
        match self.ents.get(&id) {
            None => false,
            Some(ent) => f(ent),
        }
    }
    pub fn peek_count(&self) -> NonZeroU64 {
        self.count
    }
    pub fn remove(&mut self, id: K) -> Option<V> {
        self.ents.remove(&id)
    }
    fn get_newkey(&mut self) -> K {
        let newkey = K::from(self.count);
        self.count = self.count.saturating_add(1);
        newkey
    }
    pub fn insert(&mut self, value: V) -> (K, &mut V) {
        let newkey = self.get_newkey();
        let ent = self.ents.entry(newkey).or_insert(value);
        (newkey, ent)
    }
    pub fn skip_count(&mut self, n: u64) {
        self.count = self.count.saturating_add(n);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{CardId, MIN_CARDID};

    #[test]
    fn keys_are_not_reused() {
        let mut cards: EntMap<CardId, &str> = EntMap::new();
        cards.skip_count(MIN_CARDID - 1);
        let (first, _) = cards.insert("bear");
        cards.remove(first);
        let (second, _) = cards.insert("bear");
        assert_ne!(first, second);
        assert!(!cards.contains(first));
        assert_eq!(cards.len(), 1);
    }
}
