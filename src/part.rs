//! Settings, lone comments, and the closed [`Part`] union.
//!
//! Every node of a document carries a `blank_lines` count: the number of blank lines that
//! preceded it in the source. It is a formatting hint for the writer and is excluded from
//! equality.

use crate::section::Section;
use std::str::FromStr;

/// A `key=value` pair inside a section.
///
/// # Examples
///
/// ```rust
/// use mini_ini::Setting;
///
/// let mut setting = Setting::new("port", "8080");
/// assert_eq!(setting.parse::<u16>().unwrap(), 8080);
///
/// setting.set_value("not a number");
/// assert!(setting.parse::<u16>().is_err());
/// ```
#[derive(Clone, Debug, Default)]
pub struct Setting {
    key: String,
    value: String,
    comment: String,
    blank_lines: usize,
}

impl Setting {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Setting {
            key: key.into(),
            value: value.into(),
            comment: String::new(),
            blank_lines: 0,
        }
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    /// The attached comment. Comments read from text end with a newline: each comment line
    /// above the setting contributes one line of text.
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

    /// Parses the value with [`FromStr`].
    pub fn parse<T: FromStr>(&self) -> Result<T, T::Err> {
        self.value.parse()
    }

    /// Builder form of [`Setting::set_comment`].
    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }
}

impl PartialEq for Setting {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && self.value == other.value && self.comment == other.comment
    }
}

impl Eq for Setting {}

/// A comment that is not attached to any section or setting.
///
/// Lone comments appear in text as comment lines followed by a blank line. They are kept
/// only so that writing reproduces them.
#[derive(Clone, Debug, Default)]
pub struct Comment {
    text: String,
    blank_lines: usize,
}

impl Comment {
    pub fn new(text: impl Into<String>) -> Self {
        Comment {
            text: text.into(),
            blank_lines: 0,
        }
    }

    /// The comment text. Multiple lines are separated by `\n`.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    #[must_use]
    pub fn blank_lines(&self) -> usize {
        self.blank_lines
    }

    pub fn set_blank_lines(&mut self, blank_lines: usize) {
        self.blank_lines = blank_lines;
    }
}

impl PartialEq for Comment {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
    }
}

impl Eq for Comment {}

/// A borrowed node of a document, in document order.
///
/// Documents hold sections and comments; sections hold settings and comments. Matching
/// on the variant recovers per-kind behaviour.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Part<'a> {
    Comment(&'a Comment),
    Section(&'a Section),
    Setting(&'a Setting),
}

impl<'a> Part<'a> {
    #[must_use]
    pub fn blank_lines(&self) -> usize {
        match self {
            Part::Comment(comment) => comment.blank_lines(),
            Part::Section(section) => section.blank_lines(),
            Part::Setting(setting) => setting.blank_lines(),
        }
    }

    /// The section name or setting key. Lone comments have no name.
    #[must_use]
    pub fn name(&self) -> Option<&'a str> {
        match self {
            Part::Comment(_) => None,
            Part::Section(section) => Some(section.name()),
            Part::Setting(setting) => Some(setting.key()),
        }
    }

    #[must_use]
    pub fn comment(&self) -> &'a str {
        match self {
            Part::Comment(comment) => comment.text(),
            Part::Section(section) => section.comment(),
            Part::Setting(setting) => setting.comment(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setting_equality_ignores_blank_lines() {
        let mut a = Setting::new("k", "v").with_comment("note\n");
        let b = Setting::new("k", "v").with_comment("note\n");
        a.set_blank_lines(3);
        assert_eq!(a, b);

        let c = Setting::new("k", "other").with_comment("note\n");
        assert_ne!(a, c);
    }

    #[test]
    fn test_comment_equality_ignores_blank_lines() {
        let mut a = Comment::new("hello");
        a.set_blank_lines(2);
        assert_eq!(a, Comment::new("hello"));
        assert_ne!(a, Comment::new("bye"));
    }

    #[test]
    fn test_part_accessors() {
        let setting = Setting::new("key", "value").with_comment("c\n");
        let comment = Comment::new("lone");
        let section = Section::new("Name");

        assert_eq!(Part::Setting(&setting).name(), Some("key"));
        assert_eq!(Part::Setting(&setting).comment(), "c\n");
        assert_eq!(Part::Comment(&comment).name(), None);
        assert_eq!(Part::Comment(&comment).comment(), "lone");
        assert_eq!(Part::Section(&section).name(), Some("Name"));
        assert_ne!(Part::Comment(&comment), Part::Setting(&setting));
    }

    #[test]
    fn test_setting_parse() {
        let setting = Setting::new("ratio", "0.5");
        assert_eq!(setting.parse::<f64>().unwrap(), 0.5);
        assert!(setting.parse::<i32>().is_err());
    }
}
