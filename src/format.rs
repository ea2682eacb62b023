//! INI Format
//!
//! This module documents the INI dialect read and written by this library.
//!
//! # Overview
//!
//! An INI document is a sequence of lines. Each line is exactly one of: a comment, a
//! section header, a setting, or blank. There is no escaping, quoting, or line
//! continuation, and values are untyped strings.
//!
//! ```text
//! ; Application settings
//!
//! ; connection
//! [Database] ; primary
//! host = db.local
//! ; seconds
//! timeout=30
//! ```
//!
//! # Lines
//!
//! ## Comments
//!
//! A comment line starts with one or more `;` after optional leading whitespace. One
//! space after the semicolons is dropped; the rest of the line is the comment text.
//!
//! | Line | Text |
//! |------|------|
//! | `; hello` | `hello` |
//! | `;;hello` | `hello` |
//! | `   ;  two spaces` | ` two spaces` |
//!
//! Consecutive comment lines are joined with `\n` and attach to the section or setting
//! that follows them. A comment run followed by a blank line becomes a **lone comment**
//! instead, a part of its own.
//!
//! ## Section Headers
//!
//! `[Name]`, with optional whitespace inside and around the brackets. Names consist of
//! word characters, whitespace, and dots, and end in a word character:
//!
//! ```text
//! [Server]
//! [ Server.Backup 2 ]
//! [Server] ; inline comment
//! ```
//!
//! Text after the closing bracket and any `;` is the header's inline comment.
//!
//! ## Settings
//!
//! `key = value`. The key starts with a character that is neither `=` nor whitespace
//! and ends at the last non-space character before the first `=`. Everything after the
//! first `=` is the value, trimmed of surrounding whitespace. A `;` inside the value is
//! part of the value:
//!
//! | Line | Key | Value |
//! |------|-----|-------|
//! | `port=80` | `port` | `80` |
//! | `  display name  =  Ada  ` | `display name` | `Ada` |
//! | `url = a=b` | `url` | `a=b` |
//! | `note = x ; y` | `note` | `x ; y` |
//! | `empty =` | `empty` | (empty) |
//!
//! Settings that appear before the first section header are dropped.
//!
//! ## Blank Lines
//!
//! An empty or whitespace-only line. Any other line that matches none of the forms
//! above is treated as blank too. Blank lines are counted and remembered on the part
//! that follows them.
//!
//! # Writing
//!
//! Documents are written in canonical form:
//!
//! - comments as `; text`, one line per comment line;
//! - section headers as `[Name]`, or `[Name] ; comment` when the last comment line
//!   belongs inline;
//! - settings as `key=value` (or `key = value` with
//!   [`IniOptions::with_spaced_assignment`](crate::IniOptions::with_spaced_assignment));
//! - remembered blank lines before each part, and at least one blank line after a lone
//!   comment so it parses back as a lone comment;
//! - every line ends with the configured [`LineEnding`](crate::LineEnding).
//!
//! Reading a canonical document and writing it again gives the same text.
//!
//! # Round-Trip Limits
//!
//! - A comment run at the very end of the input, with no blank line after it, is
//!   dropped.
//! - Duplicate section names or duplicate keys within a section collapse to the last
//!   occurrence, which moves to the end.
//! - Whitespace around `=` and inside brackets is normalised.
//!
//! # Text Encoding
//!
//! Files are decoded and encoded with [`encoding_rs`]; UTF-8 is the default. A byte
//! order mark is removed when loading. Parsing from a string or a reader works on text
//! that is already decoded.
