//! Ordered keyed collection for INI parts.
//!
//! This module provides [`OrderedMap`], a dictionary that is also a list: values can be
//! inserted with a key (sections, settings) or without one (lone comments), and
//! enumeration returns both kinds interleaved in the order they were added.
//!
//! ## Ordering model
//!
//! Every value is wrapped in a node that carries a `u64` insertion index drawn from a
//! monotonically increasing counter. Keyed nodes live in an [`IndexMap`], unkeyed nodes in
//! a `Vec`; both runs stay sorted by index, so enumeration is a linear merge.
//!
//! Overwriting a key with [`OrderedMap::insert`] creates a *new* node with a new index,
//! which moves the entry to the end of the iteration order. [`OrderedMap::add`] refuses
//! duplicate keys instead, and [`OrderedMap::get_or_insert_with`] leaves existing nodes
//! where they are.
//!
//! ## Examples
//!
//! ```rust
//! use mini_ini::map::{Item, OrderedMap};
//!
//! let mut map: OrderedMap<String, i32, &str> = OrderedMap::new();
//! map.insert("first".to_string(), 1);
//! map.push_unkeyed("between");
//! map.insert("second".to_string(), 2);
//!
//! let order: Vec<String> = map
//!     .iter()
//!     .map(|item| match item {
//!         Item::Keyed(key, _) => key.clone(),
//!         Item::Unkeyed(text) => text.to_string(),
//!     })
//!     .collect();
//! assert_eq!(order, vec!["first", "between", "second"]);
//!
//! // Overwriting through `insert` moves the entry to the end.
//! map.insert("first".to_string(), 10);
//! let keys: Vec<_> = map.keys().cloned().collect();
//! assert_eq!(keys, vec!["second", "first"]);
//! ```

use crate::{Error, Result};
use indexmap::IndexMap;
use std::borrow::Borrow;
use std::fmt;
use std::hash::Hash;
use std::iter::Peekable;

#[derive(Debug, Clone)]
struct Node<T> {
    index: u64,
    value: T,
}

/// A dictionary-list hybrid that remembers the order in which values were added.
///
/// `K` is the key type, `V` the type of keyed values and `U` the type of unkeyed values
/// (defaults to `V`). The collection is not thread-safe; it is owned by a single
/// document or section.
#[derive(Debug, Clone)]
pub struct OrderedMap<K, V, U = V> {
    keyed: IndexMap<K, Node<V>>,
    unkeyed: Vec<Node<U>>,
    next_index: u64,
}

/// A borrowed entry produced by [`OrderedMap::iter`].
#[derive(Debug, PartialEq)]
pub enum Item<'a, K, V, U> {
    Keyed(&'a K, &'a V),
    Unkeyed(&'a U),
}

/// A mutably borrowed entry produced by [`OrderedMap::iter_mut`].
#[derive(Debug)]
pub enum ItemMut<'a, K, V, U> {
    Keyed(&'a K, &'a mut V),
    Unkeyed(&'a mut U),
}

impl<K, V, U> OrderedMap<K, V, U> {
    /// Creates an empty `OrderedMap`.
    #[must_use]
    pub fn new() -> Self {
        OrderedMap {
            keyed: IndexMap::new(),
            unkeyed: Vec::new(),
            next_index: 0,
        }
    }

    fn node<T>(&mut self, value: T) -> Node<T> {
        let index = self.next_index;
        self.next_index += 1;
        Node { index, value }
    }

    /// Returns the number of keyed and unkeyed values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keyed.len() + self.unkeyed.len()
    }

    /// Returns `true` if the map holds no values at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keyed.is_empty() && self.unkeyed.is_empty()
    }

    /// Appends a value that has no key. It is still ordered with the keyed values.
    pub fn push_unkeyed(&mut self, value: U) {
        let node = self.node(value);
        self.unkeyed.push(node);
    }

    /// Returns an iterator over the keys, in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.keyed.keys()
    }

    /// Returns an iterator over the keyed values, in insertion order.
    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.keyed.values().map(|node| &node.value)
    }

    /// Returns a mutable iterator over the keyed values, in insertion order.
    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut V> + '_ {
        self.keyed.values_mut().map(|node| &mut node.value)
    }

    /// Returns an iterator over the unkeyed values, in insertion order.
    pub fn unkeyed(&self) -> impl Iterator<Item = &U> + '_ {
        self.unkeyed.iter().map(|node| &node.value)
    }

    /// Returns every value, keyed and unkeyed, in insertion order.
    pub fn iter(&self) -> Iter<'_, K, V, U> {
        Iter {
            keyed: self.keyed.iter().peekable(),
            unkeyed: self.unkeyed.iter().peekable(),
        }
    }

    /// Returns every value mutably, keyed and unkeyed, in insertion order.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V, U> {
        IterMut {
            keyed: self.keyed.iter_mut().peekable(),
            unkeyed: self.unkeyed.iter_mut().peekable(),
        }
    }

    /// Removes every value. The index counter keeps counting.
    pub fn clear(&mut self) {
        self.keyed.clear();
        self.unkeyed.clear();
    }
}

impl<K, V, U> OrderedMap<K, V, U>
where
    K: Hash + Eq,
{
    /// Adds a keyed value, refusing keys that are already present.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateKey`] if `key` is already in the map; the map is left
    /// unchanged.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use mini_ini::map::OrderedMap;
    ///
    /// let mut map: OrderedMap<String, i32> = OrderedMap::new();
    /// assert!(map.add("key".to_string(), 1).is_ok());
    /// assert!(map.add("key".to_string(), 2).is_err());
    /// assert_eq!(map.get("key"), Some(&1));
    /// ```
    pub fn add(&mut self, key: K, value: V) -> Result<()>
    where
        K: fmt::Display,
    {
        if self.keyed.contains_key(&key) {
            return Err(Error::DuplicateKey(key.to_string()));
        }
        let node = self.node(value);
        self.keyed.insert(key, node);
        Ok(())
    }

    /// Sets the value for `key`, replacing any previous value.
    ///
    /// The replacement is a new node with a fresh index, so the entry moves to the end of
    /// the iteration order. Returns the previous value, if any.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let previous = self.keyed.shift_remove(&key).map(|node| node.value);
        let node = self.node(value);
        self.keyed.insert(key, node);
        previous
    }

    /// Returns the value for `key`, inserting the result of `default` at the end if the
    /// key is absent. An existing entry keeps its position.
    pub fn get_or_insert_with<F>(&mut self, key: K, default: F) -> &mut V
    where
        F: FnOnce() -> V,
    {
        let index = self.next_index;
        let entry = self.keyed.entry(key);
        if matches!(entry, indexmap::map::Entry::Vacant(_)) {
            self.next_index += 1;
        }
        &mut entry
            .or_insert_with(|| Node {
                index,
                value: default(),
            })
            .value
    }

    /// Returns a reference to the value for `key`.
    #[must_use]
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.keyed.get(key).map(|node| &node.value)
    }

    /// Returns a mutable reference to the value for `key`.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.keyed.get_mut(key).map(|node| &mut node.value)
    }

    /// Returns `true` if `key` is present.
    #[must_use]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.keyed.contains_key(key)
    }

    /// Removes the value for `key`, keeping the order of the remaining values.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.keyed.shift_remove(key).map(|node| node.value)
    }
}

impl<K, V, U> Default for OrderedMap<K, V, U> {
    fn default() -> Self {
        Self::new()
    }
}

/// Two maps are equal when they enumerate equal items in the same order.
impl<K, V, U> PartialEq for OrderedMap<K, V, U>
where
    K: PartialEq,
    V: PartialEq,
    U: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K, V, U> FromIterator<(K, V)> for OrderedMap<K, V, U>
where
    K: Hash + Eq,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map = OrderedMap::new();
        map.extend(iter);
        map
    }
}

impl<K, V, U> Extend<(K, V)> for OrderedMap<K, V, U>
where
    K: Hash + Eq,
{
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

/// Iterator returned by [`OrderedMap::iter`].
pub struct Iter<'a, K, V, U> {
    keyed: Peekable<indexmap::map::Iter<'a, K, Node<V>>>,
    unkeyed: Peekable<std::slice::Iter<'a, Node<U>>>,
}

impl<'a, K, V, U> Iterator for Iter<'a, K, V, U> {
    type Item = Item<'a, K, V, U>;

    fn next(&mut self) -> Option<Self::Item> {
        let take_unkeyed = match (self.keyed.peek(), self.unkeyed.peek()) {
            (Some((_, keyed)), Some(unkeyed)) => unkeyed.index < keyed.index,
            (None, Some(_)) => true,
            (_, None) => false,
        };
        if take_unkeyed {
            self.unkeyed.next().map(|node| Item::Unkeyed(&node.value))
        } else {
            self.keyed
                .next()
                .map(|(key, node)| Item::Keyed(key, &node.value))
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.keyed.len() + self.unkeyed.len();
        (len, Some(len))
    }
}

/// Iterator returned by [`OrderedMap::iter_mut`].
pub struct IterMut<'a, K, V, U> {
    keyed: Peekable<indexmap::map::IterMut<'a, K, Node<V>>>,
    unkeyed: Peekable<std::slice::IterMut<'a, Node<U>>>,
}

impl<'a, K, V, U> Iterator for IterMut<'a, K, V, U> {
    type Item = ItemMut<'a, K, V, U>;

    fn next(&mut self) -> Option<Self::Item> {
        let take_unkeyed = match (self.keyed.peek(), self.unkeyed.peek()) {
            (Some((_, keyed)), Some(unkeyed)) => unkeyed.index < keyed.index,
            (None, Some(_)) => true,
            (_, None) => false,
        };
        if take_unkeyed {
            self.unkeyed
                .next()
                .map(|node| ItemMut::Unkeyed(&mut node.value))
        } else {
            self.keyed
                .next()
                .map(|(key, node)| ItemMut::Keyed(key, &mut node.value))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(map: &OrderedMap<String, i32, &'static str>) -> Vec<String> {
        map.iter()
            .map(|item| match item {
                Item::Keyed(key, value) => format!("{}={}", key, value),
                Item::Unkeyed(text) => text.to_string(),
            })
            .collect()
    }

    #[test]
    fn test_interleaved_order() {
        let mut map: OrderedMap<String, i32, &str> = OrderedMap::new();
        map.push_unkeyed("a");
        map.insert("x".to_string(), 1);
        map.push_unkeyed("b");
        map.insert("y".to_string(), 2);
        map.push_unkeyed("c");

        assert_eq!(labels(&map), vec!["a", "x=1", "b", "y=2", "c"]);
        assert_eq!(map.len(), 5);
    }

    #[test]
    fn test_insert_overwrite_moves_to_end() {
        let mut map: OrderedMap<String, i32, &str> = OrderedMap::new();
        map.insert("x".to_string(), 1);
        map.push_unkeyed("note");
        map.insert("y".to_string(), 2);

        assert_eq!(map.insert("x".to_string(), 3), Some(1));
        assert_eq!(labels(&map), vec!["note", "y=2", "x=3"]);
    }

    #[test]
    fn test_add_rejects_duplicates() {
        let mut map: OrderedMap<String, i32> = OrderedMap::new();
        map.add("x".to_string(), 1).unwrap();
        let err = map.add("x".to_string(), 2).unwrap_err();
        assert!(matches!(err, Error::DuplicateKey(ref key) if key == "x"));
        assert_eq!(map.get("x"), Some(&1));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_get_or_insert_with_keeps_position() {
        let mut map: OrderedMap<String, i32, &str> = OrderedMap::new();
        map.insert("x".to_string(), 1);
        map.insert("y".to_string(), 2);

        *map.get_or_insert_with("x".to_string(), || 0) += 10;
        map.get_or_insert_with("z".to_string(), || 5);
        map.push_unkeyed("tail");

        assert_eq!(labels(&map), vec!["x=11", "y=2", "z=5", "tail"]);
    }

    #[test]
    fn test_remove_keeps_order() {
        let mut map: OrderedMap<String, i32, &str> = OrderedMap::new();
        map.insert("x".to_string(), 1);
        map.push_unkeyed("note");
        map.insert("y".to_string(), 2);
        map.insert("z".to_string(), 3);

        assert_eq!(map.remove("y"), Some(2));
        assert_eq!(map.remove("missing"), None);
        assert_eq!(labels(&map), vec!["x=1", "note", "z=3"]);
    }

    #[test]
    fn test_iter_mut_visits_in_order() {
        let mut map: OrderedMap<String, i32, i32> = OrderedMap::new();
        map.insert("x".to_string(), 1);
        map.push_unkeyed(100);
        map.insert("y".to_string(), 2);

        let mut seen = Vec::new();
        for item in map.iter_mut() {
            match item {
                ItemMut::Keyed(_, value) => {
                    *value *= 10;
                    seen.push(*value);
                }
                ItemMut::Unkeyed(value) => {
                    *value += 1;
                    seen.push(*value);
                }
            }
        }
        assert_eq!(seen, vec![10, 101, 20]);
    }

    #[test]
    fn test_equality_is_order_sensitive() {
        let a: OrderedMap<String, i32> = vec![("x".to_string(), 1), ("y".to_string(), 2)]
            .into_iter()
            .collect();
        let b: OrderedMap<String, i32> = vec![("x".to_string(), 1), ("y".to_string(), 2)]
            .into_iter()
            .collect();
        let c: OrderedMap<String, i32> = vec![("y".to_string(), 2), ("x".to_string(), 1)]
            .into_iter()
            .collect();

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_clear() {
        let mut map: OrderedMap<String, i32> = OrderedMap::new();
        map.insert("x".to_string(), 1);
        map.push_unkeyed(2);
        map.clear();
        assert!(map.is_empty());
        assert_eq!(map.iter().count(), 0);
    }
}
