//! Line tokenizer for INI text.
//!
//! Each input line is classified as exactly one [`Pattern`]. Classification is tried in a
//! fixed order and the first match wins:
//!
//! 1. comment: `; text`
//! 2. section header: `[Name] ; optional inline comment`
//! 3. setting: `key = value`
//!
//! Anything else is [`Pattern::Blank`]. The tokenizer never fails on malformed syntax; only
//! the underlying reader can produce errors. Exhaustion of the source is reported once as
//! [`Pattern::End`].
//!
//! ```rust
//! use mini_ini::pattern::{match_line, Pattern};
//!
//! assert_eq!(
//!     match_line(" Sixth Key = Sixth Value"),
//!     Pattern::Setting { key: "Sixth Key".into(), value: "Sixth Value".into() }
//! );
//! assert_eq!(match_line("not a setting"), Pattern::Blank);
//! ```

use once_cell::sync::Lazy;
use regex::Regex;
use std::io::{self, BufRead};

static COMMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*;+\s?(?P<comment>.*)$").expect("valid comment grammar"));

static SECTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*\[\s*(?P<name>[\w\s.]*\w)\s*\]\s*;*\s?(?P<comment>.*)$")
        .expect("valid section grammar")
});

// Everything after the first '=' is the value. No inline comment splitting.
static SETTING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?P<key>[^=\s][^=]*?)\s*=(?P<value>.*)$").expect("valid setting grammar")
});

/// The kind of a classified line, without its captured text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PatternKind {
    Comment,
    Section,
    Setting,
    Blank,
    End,
}

/// A classified input line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Pattern {
    /// A comment line; `comment` is the text after the `;` run and one optional space.
    Comment { comment: String },
    /// A section header with its optional inline comment.
    Section { name: String, comment: String },
    /// A `key=value` line. Both sides are trimmed.
    Setting { key: String, value: String },
    /// A blank line, or a line that matches no other pattern.
    Blank,
    /// The source is exhausted.
    End,
}

impl Pattern {
    #[must_use]
    pub fn kind(&self) -> PatternKind {
        match self {
            Pattern::Comment { .. } => PatternKind::Comment,
            Pattern::Section { .. } => PatternKind::Section,
            Pattern::Setting { .. } => PatternKind::Setting,
            Pattern::Blank => PatternKind::Blank,
            Pattern::End => PatternKind::End,
        }
    }
}

/// Classifies a single line. The line must not contain its terminator.
#[must_use]
pub fn match_line(line: &str) -> Pattern {
    if let Some(caps) = COMMENT.captures(line) {
        return Pattern::Comment {
            comment: caps["comment"].to_string(),
        };
    }
    if let Some(caps) = SECTION.captures(line) {
        return Pattern::Section {
            name: caps["name"].to_string(),
            comment: caps["comment"].to_string(),
        };
    }
    if let Some(caps) = SETTING.captures(line) {
        return Pattern::Setting {
            key: caps["key"].to_string(),
            value: caps["value"].trim().to_string(),
        };
    }
    Pattern::Blank
}

/// A single-pass sequence of patterns read from a buffered source.
///
/// The reader is owned, so there is only ever one cursor over a source. Reading again
/// requires reopening it.
///
/// ```rust
/// use mini_ini::pattern::{PatternKind, Patterns};
///
/// let kinds: Vec<PatternKind> = Patterns::new("; hi\n[A]\nk=v\n\n".as_bytes())
///     .map(|p| p.unwrap().kind())
///     .collect();
/// assert_eq!(
///     kinds,
///     vec![PatternKind::Comment, PatternKind::Section, PatternKind::Setting, PatternKind::Blank]
/// );
/// ```
#[derive(Debug)]
pub struct Patterns<R> {
    reader: R,
    line: String,
    done: bool,
}

impl<R: BufRead> Patterns<R> {
    pub fn new(reader: R) -> Self {
        Patterns {
            reader,
            line: String::new(),
            done: false,
        }
    }

    /// Reads and classifies the next line, returning [`Pattern::End`] once the source is
    /// exhausted (and on every call after that).
    pub fn next_pattern(&mut self) -> io::Result<Pattern> {
        if self.done {
            return Ok(Pattern::End);
        }
        self.line.clear();
        if self.reader.read_line(&mut self.line)? == 0 {
            self.done = true;
            return Ok(Pattern::End);
        }
        let mut line = self.line.as_str();
        line = line.strip_suffix('\n').unwrap_or(line);
        line = line.strip_suffix('\r').unwrap_or(line);
        Ok(match_line(line))
    }

    /// Returns the underlying reader.
    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: BufRead> Iterator for Patterns<R> {
    type Item = io::Result<Pattern>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_pattern() {
            Ok(Pattern::End) => None,
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
            Ok(pattern) => Some(Ok(pattern)),
        }
    }
}
