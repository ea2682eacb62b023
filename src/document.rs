//! The INI document tree: parsing, lookup, mutation, and persistence.
//!
//! A [`Document`] is an ordered sequence of sections and lone comments. Parsing keeps
//! enough formatting (comment placement, blank line counts) that writing an unedited
//! document reproduces the source in canonical form, and writing an edited document
//! changes only what was edited.
//!
//! ## Parsing
//!
//! Lines are classified by the [`pattern`](crate::pattern) tokenizer and folded into the
//! tree with a small state machine:
//!
//! - comment lines accumulate into a pending comment;
//! - a section header or setting takes the pending comment and the pending blank line
//!   count, then both are reset;
//! - a blank line flushes a pending comment as a lone comment, then counts as a blank line
//!   in front of whatever follows;
//! - settings before the first section header are dropped;
//! - a pending comment still open at the end of the input is dropped.
//!
//! ## Examples
//!
//! ```rust
//! use mini_ini::Document;
//!
//! let text = "; database settings\n[Database]\nhost = db.local\nport=5432\n";
//! let mut document: Document = text.parse().unwrap();
//!
//! assert_eq!(document.get("Database", "host"), Some("db.local"));
//! assert_eq!(document.get_value::<u16>("Database", "port"), Some(Ok(5432)));
//!
//! document.set("Database", "port", "5433");
//! assert_eq!(
//!     document.to_string(),
//!     "; database settings\n[Database]\nhost=db.local\nport=5433\n"
//! );
//! ```

use crate::map::{Item, OrderedMap};
use crate::options::IniOptions;
use crate::part::{Comment, Part};
use crate::pattern::{Pattern, Patterns};
use crate::section::Section;
use crate::writer::Writer;
use crate::{Error, Result};
use encoding_rs::{Encoding, UTF_8};
use std::fmt;
use std::fs;
use std::io::{self, BufRead, Write};
use std::mem;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tempfile::NamedTempFile;
use tracing::{debug, trace};

/// An INI document.
///
/// Besides its parts, a document remembers the path it was loaded from (used by
/// [`Document::save`]), its text encoding, and the [`IniOptions`] used when writing.
/// None of these take part in equality.
#[derive(Clone)]
pub struct Document {
    parts: OrderedMap<String, Section, Comment>,
    path: Option<PathBuf>,
    encoding: &'static Encoding,
    options: IniOptions,
}

impl Document {
    /// Creates an empty UTF-8 document with no stored path.
    #[must_use]
    pub fn new() -> Self {
        Document {
            parts: OrderedMap::new(),
            path: None,
            encoding: UTF_8,
            options: IniOptions::default(),
        }
    }

    /// Parses already decoded INI text.
    ///
    /// Parsing never fails on malformed lines; only read errors are reported.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if reading fails or the input is not valid UTF-8.
    pub fn parse<R: BufRead>(reader: R) -> Result<Self> {
        let mut document = Document::new();
        let mut patterns = Patterns::new(reader);
        let mut pending = String::new();
        let mut blank_lines = 0;
        let mut current: Option<String> = None;

        loop {
            match patterns.next_pattern()? {
                Pattern::Comment { comment } => {
                    pending = join("", &pending, &comment);
                }
                Pattern::Section { name, comment } => {
                    let section = document.section_mut(&name);
                    let joined = join(section.comment(), &pending, &comment);
                    section.set_comment(joined);
                    section.set_blank_lines(blank_lines);
                    pending.clear();
                    blank_lines = 0;
                    current = Some(name);
                }
                Pattern::Setting { key, value } => match current.as_deref() {
                    Some(name) => {
                        let setting = document.section_mut(name).setting_mut(&key);
                        let mut joined = join(setting.comment(), &pending, "");
                        // Comments read above a setting always end in a line break.
                        if !joined.is_empty() && !joined.ends_with('\n') {
                            joined.push('\n');
                        }
                        setting.set_comment(joined);
                        setting.set_value(value);
                        setting.set_blank_lines(blank_lines);
                        pending.clear();
                        blank_lines = 0;
                    }
                    None => trace!(key = %key, "dropping setting outside of any section"),
                },
                Pattern::Blank => {
                    if !pending.is_empty() {
                        let mut comment = Comment::new(mem::take(&mut pending));
                        comment.set_blank_lines(blank_lines);
                        blank_lines = 0;
                        trace!(section = ?current, "flushing lone comment");
                        match current.as_deref() {
                            Some(name) => document.section_mut(name).push_comment(comment),
                            None => document.parts.push_unkeyed(comment),
                        }
                    }
                    blank_lines += 1;
                }
                Pattern::End => break,
            }
        }

        if !pending.is_empty() {
            trace!("dropping trailing comment at end of input");
        }
        debug!(sections = document.sections().count(), "parsed document");
        Ok(document)
    }

    /// Loads a UTF-8 document from `path` and remembers the path for [`Document::save`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read, or [`Error::Encoding`] if it is
    /// not valid UTF-8.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Document::load_with_encoding(path, UTF_8)
    }

    /// Loads a document from `path`, decoding it with `encoding`.
    ///
    /// A byte order mark matching the encoding is removed. The document remembers both
    /// the path and the encoding.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use mini_ini::Document;
    ///
    /// let document = Document::load_with_encoding("legacy.ini", encoding_rs::WINDOWS_1252)?;
    /// assert_eq!(document.encoding(), encoding_rs::WINDOWS_1252);
    /// # Ok::<(), mini_ini::Error>(())
    /// ```
    pub fn load_with_encoding(path: impl AsRef<Path>, encoding: &'static Encoding) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        let (text, had_errors) = encoding.decode_with_bom_removal(&bytes);
        if had_errors {
            return Err(Error::encoding(
                encoding.name(),
                &format!("{} contains malformed data", path.display()),
            ));
        }

        let mut document = Document::parse(text.as_bytes())?;
        document.path = Some(path.to_path_buf());
        document.encoding = encoding;
        debug!(path = %path.display(), encoding = encoding.name(), "loaded document");
        Ok(document)
    }

    /// Writes the document back to its stored path, using its encoding.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOperation`] if the document has no stored path, otherwise
    /// the errors of [`Document::save_as`].
    pub fn save(&self) -> Result<()> {
        match &self.path {
            Some(path) => self.save_as_with_encoding(path, self.encoding),
            None => Err(Error::invalid_operation(
                "document has no stored path; use save_as with an explicit path",
            )),
        }
    }

    /// Writes the document to `path` using its encoding. The stored path is not changed.
    ///
    /// The text is written to a temporary file next to `path`, which then replaces the
    /// target. A failed save leaves any existing file untouched.
    pub fn save_as(&self, path: impl AsRef<Path>) -> Result<()> {
        self.save_as_with_encoding(path, self.encoding)
    }

    /// Writes the document to `path` using `encoding`.
    ///
    /// Encodings that cannot be written (UTF-16) fall back to UTF-8, as `encoding_rs`
    /// does for output.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Encoding`] if the text contains characters the encoding cannot
    /// represent, or [`Error::Io`] if writing fails.
    pub fn save_as_with_encoding(
        &self,
        path: impl AsRef<Path>,
        encoding: &'static Encoding,
    ) -> Result<()> {
        let path = path.as_ref();
        let text = self.to_string();
        let (bytes, used, had_errors) = encoding.encode(&text);
        if had_errors {
            return Err(Error::encoding(
                used.name(),
                "text contains characters that cannot be encoded",
            ));
        }

        write_atomically(path, &bytes)?;
        debug!(path = %path.display(), encoding = used.name(), "saved document");
        Ok(())
    }

    /// Writes the document to `writer` with the document's options.
    pub fn write<W: io::Write>(&self, mut writer: W) -> Result<()> {
        writer.write_all(self.to_string().as_bytes())?;
        writer.flush()?;
        Ok(())
    }

    /// Returns the section called `name`, creating an empty one at the end if it is
    /// missing.
    ///
    /// This is the read-creates accessor: merely looking a section up through it adds the
    /// section to the document. Use [`Document::section`] to look without creating.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use mini_ini::Document;
    ///
    /// let mut document = Document::new();
    /// assert!(document.section("Missing").is_none());
    ///
    /// document.section_mut("Missing");
    /// assert!(document.has_section("Missing"));
    /// assert_eq!(document.to_string(), "[Missing]\n");
    /// ```
    pub fn section_mut(&mut self, name: &str) -> &mut Section {
        self.parts
            .get_or_insert_with(name.to_string(), || Section::new(name))
    }

    #[must_use]
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.parts.get(name)
    }

    #[must_use]
    pub fn has_section(&self, name: &str) -> bool {
        self.parts.contains_key(name)
    }

    pub fn sections(&self) -> impl Iterator<Item = &Section> + '_ {
        self.parts.values()
    }

    pub fn sections_mut(&mut self) -> impl Iterator<Item = &mut Section> + '_ {
        self.parts.values_mut()
    }

    /// Sections and root-level lone comments in document order.
    pub fn parts(&self) -> impl Iterator<Item = Part<'_>> + '_ {
        self.parts.iter().map(|item| match item {
            Item::Keyed(_, section) => Part::Section(section),
            Item::Unkeyed(comment) => Part::Comment(comment),
        })
    }

    /// Appends a lone comment at the root of the document.
    pub fn push_comment(&mut self, comment: Comment) {
        self.parts.push_unkeyed(comment);
    }

    /// Stores `section` under its name, replacing any section with that name. The
    /// replacement moves to the end of the document.
    pub fn insert(&mut self, section: Section) -> Option<Section> {
        self.parts.insert(section.name().to_string(), section)
    }

    /// Adds `section`, refusing a name that is already present.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateKey`] if a section with that name exists.
    pub fn add(&mut self, section: Section) -> Result<()> {
        self.parts.add(section.name().to_string(), section)
    }

    /// Removes the section called `name`. A missing name is a no-op returning `None`.
    pub fn remove_section(&mut self, name: &str) -> Option<Section> {
        self.parts.remove(name)
    }

    /// Removes this document's section with the same name as `section`, but only if it is
    /// equal to `section`. Returns whether anything was removed.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use mini_ini::{Document, Section};
    ///
    /// let mut document = Document::new();
    /// document.set("User", "name", "alice");
    ///
    /// // Same name, different content: not ours.
    /// assert!(!document.remove(&Section::new("User")));
    /// assert!(document.has_section("User"));
    ///
    /// let ours = document.section("User").cloned().unwrap();
    /// assert!(document.remove(&ours));
    /// assert!(!document.has_section("User"));
    /// ```
    pub fn remove(&mut self, section: &Section) -> bool {
        if self.parts.get(section.name()) != Some(section) {
            return false;
        }
        self.parts.remove(section.name()).is_some()
    }

    /// Returns the value of `key` in `section` without creating anything.
    #[must_use]
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.section(section).and_then(|s| s.get(key))
    }

    /// Sets `key` in `section`, creating either as needed.
    pub fn set(&mut self, section: &str, key: &str, value: impl Into<String>) {
        self.section_mut(section).set(key, value);
    }

    /// Parses the value of `key` in `section`. Returns `None` if either is missing.
    pub fn get_value<T: FromStr>(
        &self,
        section: &str,
        key: &str,
    ) -> Option<std::result::Result<T, T::Err>> {
        self.section(section).and_then(|s| s.get_value(key))
    }

    /// Number of sections and root-level lone comments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn set_path(&mut self, path: impl Into<PathBuf>) {
        self.path = Some(path.into());
    }

    #[must_use]
    pub fn encoding(&self) -> &'static Encoding {
        self.encoding
    }

    pub fn set_encoding(&mut self, encoding: &'static Encoding) {
        self.encoding = encoding;
    }

    #[must_use]
    pub fn options(&self) -> &IniOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: IniOptions) {
        self.options = options;
    }

    #[must_use]
    pub fn with_options(mut self, options: IniOptions) -> Self {
        self.options = options;
        self
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("parts", &self.parts)
            .field("path", &self.path)
            .field("encoding", &self.encoding.name())
            .field("options", &self.options)
            .finish()
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Writer::new(f, self.options).write_document(self)
    }
}

impl FromStr for Document {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Document::parse(s.as_bytes())
    }
}

/// Ordered structural equality. Blank line counts, path, encoding, and options are
/// ignored.
impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        self.parts == other.parts
    }
}

impl Eq for Document {}

fn join(previous: &str, built: &str, last: &str) -> String {
    if !previous.is_empty() {
        format!("{}\n{}{}", previous, built, last)
    } else if !built.is_empty() {
        format!("{}\n{}", built, last)
    } else {
        last.to_string()
    }
}

fn write_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(bytes)?;
    file.flush()?;
    // Replacing a file keeps its permissions.
    if let Ok(metadata) = fs::metadata(path) {
        file.as_file().set_permissions(metadata.permissions())?;
    }
    file.persist(path).map_err(|err| Error::from(err.error))?;
    Ok(())
}
