//! # mini_ini
//!
//! Round-trip INI documents for Rust: read a file, edit a few values, write it back with
//! its comments, order, and blank lines intact.
//!
//! ## Key Features
//!
//! - **Round-Trip**: Comments, part order, and blank line runs survive a read/write cycle
//! - **Ordered**: Sections and settings keep insertion order; overwriting moves an entry
//!   to the end
//! - **Object Mapping**: Bind struct fields to `[Section] key` pairs with declared
//!   defaults through [`IniSerializer`]
//! - **Serde Compatible**: Map two-level structs with `#[derive(Serialize, Deserialize)]`
//! - **Encodings**: Load and save in any encoding known to [`encoding_rs`]
//! - **Atomic Saves**: Files are replaced only after the new content is fully written
//!
//! ## Quick Start
//!
//! Add this to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! mini_ini = "0.1"
//! ```
//!
//! ### Editing a Document
//!
//! ```rust
//! use mini_ini::Document;
//!
//! let text = "; web front end\n[Server]\nhost = localhost\nport = 80\n";
//! let mut document: Document = text.parse().unwrap();
//!
//! document.set("Server", "port", "8080");
//! document.section_mut("Logging").set("level", "info");
//!
//! assert_eq!(
//!     document.to_string(),
//!     "; web front end\n[Server]\nhost=localhost\nport=8080\n[Logging]\nlevel=info\n"
//! );
//! ```
//!
//! ### Serde
//!
//! The top-level value is a struct or map of sections; each section is a struct or map of
//! scalar settings.
//!
//! ```rust
//! use mini_ini::{from_str, to_string};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct Server {
//!     host: String,
//!     port: u16,
//! }
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct Config {
//!     server: Server,
//! }
//!
//! let config = Config {
//!     server: Server { host: "localhost".into(), port: 8080 },
//! };
//!
//! let text = to_string(&config).unwrap();
//! assert_eq!(text, "[server]\nhost=localhost\nport=8080\n");
//!
//! let back: Config = from_str(&text).unwrap();
//! assert_eq!(config, back);
//! ```
//!
//! ### Descriptor-Driven Mapping
//!
//! ```rust
//! use mini_ini::{Binder, Descriptor, Document, IniContainer, IniSerializer};
//!
//! #[derive(Default)]
//! struct Window {
//!     width: u32,
//!     title: String,
//! }
//!
//! impl IniContainer for Window {
//!     fn describe(d: &mut Descriptor<Self>) {
//!         d.value("Window", "Width", "640", |w| &w.width, |w| &mut w.width)
//!             .value("Window", "Title", "Untitled", |w| &w.title, |w| &mut w.title);
//!     }
//! }
//!
//! Binder::global().register_container::<Window>();
//! let serializer = IniSerializer::<Window>::new().unwrap();
//!
//! let document: Document = "[Window]\nWidth=1024\n".parse().unwrap();
//! let window = serializer.deserialize(&document).unwrap();
//! assert_eq!(window.width, 1024);
//! assert_eq!(window.title, "Untitled");
//! ```
//!
//! ### Building Documents with the ini! Macro
//!
//! ```rust
//! use mini_ini::ini;
//!
//! let document = ini! {
//!     "Server" => { "host" => "localhost", "port" => 8080 },
//! };
//! assert_eq!(document.get("Server", "port"), Some("8080"));
//! ```
//!
//! ## Format
//!
//! See the [`format`] module for the accepted grammar and the canonical output form.
//!
//! ## Logging
//!
//! The crate emits [`tracing`](https://docs.rs/tracing) events at `debug` and `trace`
//! level and never installs a subscriber.

pub mod binding;
pub mod convert;
pub mod de;
pub mod document;
pub mod error;
pub mod format;
pub mod macros;
pub mod map;
pub mod mapper;
pub mod options;
pub mod part;
pub mod pattern;
pub mod section;
pub mod ser;
mod writer;

pub use binding::{Binder, Bindings, Descriptor, IniContainer};
pub use convert::StringConverter;
pub use de::Deserializer;
pub use document::Document;
pub use encoding_rs;
pub use error::{Error, Result};
pub use map::OrderedMap;
pub use mapper::IniSerializer;
pub use options::{IniOptions, LineEnding};
pub use part::{Comment, Part, Setting};
pub use section::Section;
pub use ser::Serializer;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::io;
use std::path::Path;

/// Serialize any `T: Serialize` into a new [`Document`].
///
/// # Examples
///
/// ```rust
/// use mini_ini::to_document;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Point { x: i32, y: i32 }
///
/// #[derive(Serialize)]
/// struct Shape { origin: Point }
///
/// let document = to_document(&Shape { origin: Point { x: 1, y: 2 } }).unwrap();
/// assert_eq!(document.get("origin", "y"), Some("2"));
/// ```
///
/// # Errors
///
/// Returns [`Error::UnsupportedType`] if the value does not have the two-level
/// section/setting shape.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_document<T>(value: &T) -> Result<Document>
where
    T: ?Sized + Serialize,
{
    let mut document = Document::new();
    serialize_into(&mut document, value)?;
    Ok(document)
}

/// Serialize any `T: Serialize` into an existing [`Document`].
///
/// Sections and settings that already exist are updated in place and keep their
/// comments; new ones are appended.
///
/// # Errors
///
/// Returns [`Error::UnsupportedType`] if the value does not have the two-level
/// section/setting shape. Settings written before the failure are kept.
pub fn serialize_into<T>(document: &mut Document, value: &T) -> Result<()>
where
    T: ?Sized + Serialize,
{
    value.serialize(&mut Serializer::new(document))
}

/// Serialize any `T: Serialize` to an INI string.
///
/// # Examples
///
/// ```rust
/// use mini_ini::to_string;
/// use std::collections::BTreeMap;
///
/// let mut section = BTreeMap::new();
/// section.insert("debug", true);
/// let mut config = BTreeMap::new();
/// config.insert("App", section);
///
/// assert_eq!(to_string(&config).unwrap(), "[App]\ndebug=true\n");
/// ```
///
/// # Errors
///
/// Returns an error if the value cannot be serialized.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string<T>(value: &T) -> Result<String>
where
    T: ?Sized + Serialize,
{
    Ok(to_document(value)?.to_string())
}

/// Serialize any `T: Serialize` to a writer in INI format.
///
/// # Errors
///
/// Returns an error if serialization fails or writing to the writer fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer<W, T>(writer: W, value: &T) -> Result<()>
where
    W: io::Write,
    T: ?Sized + Serialize,
{
    to_document(value)?.write(writer)
}

/// Deserialize an instance of type `T` from a parsed [`Document`].
///
/// String fields may borrow from the document.
///
/// # Errors
///
/// Returns [`Error::Conversion`] if a value cannot be parsed as its field's type, or a
/// custom error for missing sections and fields.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_document<'d, T>(document: &'d Document) -> Result<T>
where
    T: Deserialize<'d>,
{
    T::deserialize(Deserializer::new(document))
}

/// Deserialize an instance of type `T` from a string of INI text.
///
/// # Examples
///
/// ```rust
/// use mini_ini::from_str;
/// use serde::Deserialize;
///
/// #[derive(Deserialize, PartialEq, Debug)]
/// struct Point { x: i32, y: i32 }
///
/// #[derive(Deserialize, PartialEq, Debug)]
/// struct Shape { origin: Point }
///
/// let shape: Shape = from_str("[origin]\nx = 1\ny = 2\n").unwrap();
/// assert_eq!(shape.origin, Point { x: 1, y: 2 });
/// ```
///
/// # Errors
///
/// Returns an error if the text cannot be deserialized to type `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str<T>(s: &str) -> Result<T>
where
    T: DeserializeOwned,
{
    let document: Document = s.parse()?;
    from_document(&document)
}

/// Deserialize an instance of type `T` from an I/O stream of UTF-8 INI text.
///
/// # Errors
///
/// Returns an error if reading from the reader fails or the data cannot be deserialized
/// to type `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_reader<R, T>(reader: R) -> Result<T>
where
    R: io::Read,
    T: DeserializeOwned,
{
    let document = Document::parse(io::BufReader::new(reader))?;
    from_document(&document)
}

/// Deserialize an instance of type `T` from a UTF-8 INI file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or decoded, or the data cannot be
/// deserialized to type `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_path<T>(path: impl AsRef<Path>) -> Result<T>
where
    T: DeserializeOwned,
{
    let document = Document::load(path)?;
    from_document(&document)
}
