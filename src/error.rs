//! Error types for INI parsing, writing, and object mapping.
//!
//! Parsing itself never fails on malformed INI syntax: lines that match no
//! pattern are treated as blank lines. Errors therefore come from the edges of
//! the library:
//!
//! - **I/O**: unreadable sources, unwritable targets
//! - **Encoding**: bytes that are not valid in the document's text encoding
//! - **Invalid operations**: saving without a path, mapping an unregistered type
//! - **Conversions**: stored strings that do not parse as the requested type
//!
//! ## Examples
//!
//! ```rust
//! use mini_ini::{Document, Error};
//!
//! let document = Document::new();
//! match document.save() {
//!     Err(Error::InvalidOperation(msg)) => assert!(msg.contains("path")),
//!     other => panic!("unexpected result: {:?}", other),
//! }
//! ```

use std::fmt;
use std::io;
use thiserror::Error;

/// Represents all possible errors produced by this crate.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// IO error during reading or writing
    #[error("IO error: {0}")]
    Io(String),

    /// Text could not be decoded from, or encoded to, the document's encoding
    #[error("encoding error ({encoding}): {message}")]
    Encoding {
        encoding: &'static str,
        message: String,
    },

    /// The operation is not valid for the current state
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// A keyed add collided with an existing key
    #[error("duplicate key: {0}")]
    DuplicateKey(String),

    /// A stored string could not be converted to the requested type
    #[error("cannot convert [{section}] {key}={value:?} to {type_name}: {message}")]
    Conversion {
        section: String,
        key: String,
        value: String,
        type_name: String,
        message: String,
    },

    /// The Rust shape has no INI representation
    #[error("Unsupported type: {0}")]
    UnsupportedType(String),

    /// Custom error
    #[error("Error: {0}")]
    Custom(String),
}

impl Error {
    /// Creates an encoding error for the named encoding.
    pub fn encoding(encoding: &'static str, message: &str) -> Self {
        Error::Encoding {
            encoding,
            message: message.to_string(),
        }
    }

    /// Creates an invalid-operation error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use mini_ini::Error;
    ///
    /// let err = Error::invalid_operation("path is empty");
    /// assert!(err.to_string().contains("path is empty"));
    /// ```
    pub fn invalid_operation(msg: &str) -> Self {
        Error::InvalidOperation(msg.to_string())
    }

    /// Creates a conversion error carrying the location of the offending value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use mini_ini::Error;
    ///
    /// let err = Error::conversion("Server", "port", "eighty", "u16", "invalid digit");
    /// assert!(err.to_string().contains("[Server] port"));
    /// ```
    pub fn conversion(
        section: &str,
        key: &str,
        value: &str,
        type_name: &str,
        message: &str,
    ) -> Self {
        Error::Conversion {
            section: section.to_string(),
            key: key.to_string(),
            value: value.to_string(),
            type_name: type_name.to_string(),
            message: message.to_string(),
        }
    }

    /// Creates an unsupported type error for shapes that cannot be stored in INI.
    pub fn unsupported_type(msg: &str) -> Self {
        Error::UnsupportedType(msg.to_string())
    }

    /// Creates a custom error with a display message.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use mini_ini::Error;
    ///
    /// let err = Error::custom("something went wrong");
    /// assert!(err.to_string().contains("something went wrong"));
    /// ```
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

impl serde::de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "no such file");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(ref msg) if msg.contains("no such file")));
    }

    #[test]
    fn test_conversion_error_message() {
        let err = Error::conversion("Server", "port", "eighty", "u16", "invalid digit");
        let msg = err.to_string();
        assert!(msg.contains("[Server] port"));
        assert!(msg.contains("\"eighty\""));
        assert!(msg.contains("u16"));
    }

    #[test]
    fn test_encoding_error_names_encoding() {
        let err = Error::encoding("windows-1252", "unmappable character");
        assert!(err.to_string().contains("windows-1252"));
    }
}
