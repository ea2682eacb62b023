//! Named sections of an INI document.

use crate::map::{Item, OrderedMap};
use crate::part::{Comment, Part, Setting};
use crate::Result;
use std::str::FromStr;

/// A named, ordered collection of settings and lone comments.
///
/// Lookups by key go through [`Section::setting_mut`], which creates missing settings
/// (with an empty value) at the end of the section, or [`Section::setting`] /
/// [`Section::get`], which never create anything.
///
/// # Examples
///
/// ```rust
/// use mini_ini::Section;
///
/// let mut section = Section::new("User");
/// section.set("Name", "alice");
/// section.setting_mut("Email");
///
/// let keys: Vec<&str> = section.settings().map(|s| s.key()).collect();
/// assert_eq!(keys, vec!["Name", "Email"]);
/// assert_eq!(section.get("Email"), Some(""));
/// ```
#[derive(Clone, Debug, Default)]
pub struct Section {
    name: String,
    comment: String,
    blank_lines: usize,
    parts: OrderedMap<String, Setting, Comment>,
}

impl Section {
    pub fn new(name: impl Into<String>) -> Self {
        Section {
            name: name.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The section comment.
    ///
    /// Comment lines above the header are stored first, each ending in `\n`. Text after
    /// the last newline is the inline comment written after the header.
    #[must_use]
    pub fn comment(&self) -> &str {
        &self.comment
    }

    pub fn set_comment(&mut self, comment: impl Into<String>) {
        self.comment = comment.into();
    }

    #[must_use]
    pub fn blank_lines(&self) -> usize {
        self.blank_lines
    }

    pub fn set_blank_lines(&mut self, blank_lines: usize) {
        self.blank_lines = blank_lines;
    }

    /// Returns the setting for `key`, creating an empty one at the end if it is missing.
    pub fn setting_mut(&mut self, key: &str) -> &mut Setting {
        self.parts
            .get_or_insert_with(key.to_string(), || Setting::new(key, ""))
    }

    #[must_use]
    pub fn setting(&self, key: &str) -> Option<&Setting> {
        self.parts.get(key)
    }

    /// Returns the value for `key` without creating the setting.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.setting(key).map(Setting::value)
    }

    /// Sets the value for `key`, creating the setting if needed. An existing setting keeps
    /// its position and comment.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.setting_mut(key).set_value(value);
    }

    /// Parses the value for `key`. Returns `None` when the key is absent.
    pub fn get_value<T: FromStr>(&self, key: &str) -> Option<std::result::Result<T, T::Err>> {
        self.setting(key).map(Setting::parse)
    }

    /// Stores `setting` under its key, replacing any previous setting with that key.
    ///
    /// The replacement moves to the end of the section. Returns the previous setting.
    pub fn insert(&mut self, setting: Setting) -> Option<Setting> {
        self.parts.insert(setting.key().to_string(), setting)
    }

    /// Adds `setting`, refusing a key that is already present.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateKey`](crate::Error::DuplicateKey) if the key exists.
    pub fn add(&mut self, setting: Setting) -> Result<()> {
        self.parts.add(setting.key().to_string(), setting)
    }

    /// Removes the setting for `key`. Removing a missing key is a no-op returning `None`.
    pub fn remove(&mut self, key: &str) -> Option<Setting> {
        self.parts.remove(key)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.parts.contains_key(key)
    }

    /// Appends a lone comment after the current parts.
    pub fn push_comment(&mut self, comment: Comment) {
        self.parts.push_unkeyed(comment);
    }

    pub fn settings(&self) -> impl Iterator<Item = &Setting> + '_ {
        self.parts.values()
    }

    pub fn settings_mut(&mut self) -> impl Iterator<Item = &mut Setting> + '_ {
        self.parts.values_mut()
    }

    /// Settings and lone comments in document order.
    pub fn parts(&self) -> impl Iterator<Item = Part<'_>> + '_ {
        self.parts.iter().map(|item| match item {
            Item::Keyed(_, setting) => Part::Setting(setting),
            Item::Unkeyed(comment) => Part::Comment(comment),
        })
    }

    /// Number of settings and lone comments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

impl PartialEq for Section {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.comment == other.comment && self.parts == other.parts
    }
}

impl Eq for Section {}
