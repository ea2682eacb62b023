//! Configuration options for writing INI documents.
//!
//! This module provides types to customize the written form of a document:
//!
//! - [`IniOptions`]: Main configuration struct
//! - [`LineEnding`]: Choice of line terminator (`\n` or `\r\n`)
//!
//! Reading is always tolerant of both line endings and of spacing around `=`; these
//! options only affect output.
//!
//! ## Examples
//!
//! ```rust
//! use mini_ini::{Document, IniOptions, LineEnding};
//!
//! let mut document: Document = "[Server]\nhost=localhost\n".parse().unwrap();
//!
//! // Canonical output
//! assert_eq!(document.to_string(), "[Server]\nhost=localhost\n");
//!
//! // Windows line endings with spaces around '='
//! document.set_options(
//!     IniOptions::new()
//!         .with_line_ending(LineEnding::CrLf)
//!         .with_spaced_assignment(true),
//! );
//! assert_eq!(document.to_string(), "[Server]\r\nhost = localhost\r\n");
//! ```

/// Line terminator used for every emitted line.
///
/// # Examples
///
/// ```rust
/// use mini_ini::LineEnding;
///
/// assert_eq!(LineEnding::Lf.as_str(), "\n");
/// assert_eq!(LineEnding::CrLf.as_str(), "\r\n");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
}

impl LineEnding {
    /// Returns the string representation of this line ending.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }
}

/// Configuration options for INI output.
///
/// # Examples
///
/// ```rust
/// use mini_ini::{IniOptions, LineEnding};
///
/// // Default canonical options
/// let options = IniOptions::new();
/// assert_eq!(options.line_ending, LineEnding::Lf);
///
/// // CRLF line endings
/// let options = IniOptions::windows();
/// assert_eq!(options.line_ending, LineEnding::CrLf);
///
/// // Custom configuration
/// let options = IniOptions::new().with_spaced_assignment(true);
/// assert!(options.spaced_assignment);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct IniOptions {
    pub line_ending: LineEnding,
    pub spaced_assignment: bool,
}

impl IniOptions {
    /// Creates default options (`\n` line endings, `key=value`).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates options that write `\r\n` line endings.
    #[must_use]
    pub fn windows() -> Self {
        IniOptions {
            line_ending: LineEnding::CrLf,
            ..Default::default()
        }
    }

    /// Sets the line ending.
    #[must_use]
    pub fn with_line_ending(mut self, line_ending: LineEnding) -> Self {
        self.line_ending = line_ending;
        self
    }

    /// Writes `key = value` instead of `key=value` when set.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use mini_ini::IniOptions;
    ///
    /// let options = IniOptions::new().with_spaced_assignment(true);
    /// assert_eq!(options.assignment(), " = ");
    /// ```
    #[must_use]
    pub fn with_spaced_assignment(mut self, spaced: bool) -> Self {
        self.spaced_assignment = spaced;
        self
    }

    /// Returns the separator written between a key and its value.
    #[must_use]
    pub const fn assignment(&self) -> &'static str {
        if self.spaced_assignment {
            " = "
        } else {
            "="
        }
    }
}
