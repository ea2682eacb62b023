//! Descriptor-driven mapping between Rust values and INI documents.
//!
//! [`IniSerializer`] walks the [`Bindings`] of a registered container type. Value fields
//! are written with [`Document::section_mut`] and [`Section::setting_mut`], so sections
//! and keys are created as needed. Reading never creates anything: a missing or empty
//! value falls back to the declared default, and a field with neither keeps its
//! `Default` value.
//!
//! ## Examples
//!
//! ```rust
//! use mini_ini::{Binder, Document, IniSerializer};
//!
//! #[derive(Default, Debug, PartialEq)]
//! struct Example {
//!     woot_foo: String,
//! }
//!
//! let binder = Binder::new();
//! binder.register::<Example, _>(|d| {
//!     d.value("Woot", "Foo", "Bar", |e| &e.woot_foo, |e| &mut e.woot_foo);
//! });
//! let serializer = IniSerializer::<Example>::with_binder(&binder).unwrap();
//!
//! let mut document = Document::new();
//! serializer
//!     .serialize(&Example { woot_foo: "Baz".into() }, &mut document)
//!     .unwrap();
//! assert_eq!(document.get("Woot", "Foo"), Some("Baz"));
//!
//! // Missing values fall back to the declared default.
//! let example = serializer.deserialize(&Document::new()).unwrap();
//! assert_eq!(example.woot_foo, "Bar");
//! ```
//!
//! [`Section::setting_mut`]: crate::Section::setting_mut

use crate::binding::{Binder, Binding, Bindings};
use crate::document::Document;
use crate::{Error, Result};
use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// Serializes values of a registered container type `T` to and from documents.
///
/// The two directions are not symmetric in what they touch. [`serialize`](Self::serialize)
/// creates every bound section and key it writes to. [`deserialize`](Self::deserialize)
/// only looks values up and takes the document by shared reference, so reading a
/// document never adds a section or a setting to it, not even for keys that fall back
/// to their default. Serialize once if the document should list every bound key.
pub struct IniSerializer<'b, T> {
    binder: &'b Binder,
    bindings: Arc<Bindings>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Any> IniSerializer<'static, T> {
    /// Creates a serializer that uses the process-wide [`Binder::global`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOperation`] naming `T` if it is not registered.
    pub fn new() -> Result<Self> {
        Self::with_binder(Binder::global())
    }
}

impl<'b, T: Any> IniSerializer<'b, T> {
    /// Creates a serializer that uses `binder`, deriving the bindings of `T` if this is
    /// the first use of `T` with that binder.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOperation`] naming the type if `T`, or a container nested
    /// in it, is not registered.
    pub fn with_binder(binder: &'b Binder) -> Result<Self> {
        let bindings = binder.bindings::<T>()?;
        Ok(IniSerializer {
            binder,
            bindings,
            _marker: PhantomData,
        })
    }

    /// The derived bindings shared by every serializer of `T` on this binder.
    #[must_use]
    pub fn bindings(&self) -> &Arc<Bindings> {
        &self.bindings
    }

    /// Writes every bound field of `value` into `document`, creating sections and keys
    /// that are missing.
    ///
    /// # Errors
    ///
    /// Returns an error if a nested container's bindings cannot be derived.
    pub fn serialize(&self, value: &T, document: &mut Document) -> Result<()> {
        serialize_bound(self.binder, &self.bindings, value, document)
    }

    /// Builds a `T` from `document`. Missing sections and keys are not created.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Conversion`] if a stored value cannot be converted to its field's
    /// type.
    pub fn deserialize(&self, document: &Document) -> Result<T>
    where
        T: Default,
    {
        let mut value = T::default();
        self.deserialize_into(document, &mut value)?;
        Ok(value)
    }

    /// Overwrites the bound fields of `value` from `document`. Fields with no stored value
    /// and an empty default are left as they are.
    pub fn deserialize_into(&self, document: &Document, value: &mut T) -> Result<()> {
        deserialize_bound(self.binder, &self.bindings, value, document)
    }
}

impl<T> fmt::Debug for IniSerializer<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IniSerializer")
            .field("bindings", &self.bindings)
            .finish()
    }
}

fn mismatch(bindings: &Bindings) -> Error {
    Error::custom(format!(
        "bound field accessor does not match `{}`",
        bindings.type_name()
    ))
}

fn serialize_bound(
    binder: &Binder,
    bindings: &Bindings,
    value: &dyn Any,
    document: &mut Document,
) -> Result<()> {
    for binding in bindings.targets() {
        match binding {
            Binding::Value {
                section,
                key,
                accessor,
                converter,
                ..
            } => {
                let field = accessor.get(value).ok_or_else(|| mismatch(bindings))?;
                let text = converter.to_ini(field).ok_or_else(|| {
                    Error::unsupported_type(&format!(
                        "converter for {} rejected [{}] {}",
                        converter.type_name(),
                        section,
                        key
                    ))
                })?;
                document.section_mut(section).setting_mut(key).set_value(text);
            }
            Binding::Container {
                field_type,
                field_type_name,
                accessor,
            } => {
                let field = accessor.get(value).ok_or_else(|| mismatch(bindings))?;
                let nested = binder.bindings_by_id(*field_type, *field_type_name)?;
                serialize_bound(binder, &nested, field, document)?;
            }
        }
    }
    Ok(())
}

fn deserialize_bound(
    binder: &Binder,
    bindings: &Bindings,
    value: &mut dyn Any,
    document: &Document,
) -> Result<()> {
    for binding in bindings.targets() {
        match binding {
            Binding::Value {
                section,
                key,
                default,
                accessor,
                converter,
            } => {
                let text = document
                    .get(section, key)
                    .filter(|text| !text.is_empty())
                    .unwrap_or(default.as_str());
                if text.is_empty() {
                    continue;
                }
                let field = accessor.get_mut(value).ok_or_else(|| mismatch(bindings))?;
                converter.from_ini(text, field).map_err(|message| {
                    Error::conversion(section, key, text, converter.type_name(), &message)
                })?;
            }
            Binding::Container {
                field_type,
                field_type_name,
                accessor,
            } => {
                let field = accessor.get_mut(value).ok_or_else(|| mismatch(bindings))?;
                let nested = binder.bindings_by_id(*field_type, *field_type_name)?;
                deserialize_bound(binder, &nested, field, document)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[derive(Default, Debug, PartialEq)]
    struct Limits {
        max_connections: u32,
        ratio: f64,
    }

    #[derive(Default, Debug, PartialEq)]
    struct Config {
        name: String,
        enabled: bool,
        released: NaiveDate,
        limits: Limits,
    }

    fn binder() -> Binder {
        let binder = Binder::new();
        binder.register::<Limits, _>(|d| {
            d.value("Limits", "MaxConnections", "10", |l| &l.max_connections, |l| {
                &mut l.max_connections
            })
            .value("Limits", "Ratio", "", |l| &l.ratio, |l| &mut l.ratio);
        });
        binder.register::<Config, _>(|d| {
            d.value("App", "Name", "", |c| &c.name, |c| &mut c.name)
                .value("App", "Enabled", "true", |c| &c.enabled, |c| &mut c.enabled)
                .value("App", "Released", "2020-01-01", |c| &c.released, |c| {
                    &mut c.released
                })
                .container(|c| &c.limits, |c| &mut c.limits);
        });
        binder
    }

    #[test]
    fn test_serialize_writes_nested_sections() {
        let binder = binder();
        let serializer = IniSerializer::<Config>::with_binder(&binder).unwrap();
        let config = Config {
            name: "demo".into(),
            enabled: false,
            released: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            limits: Limits {
                max_connections: 64,
                ratio: 0.25,
            },
        };

        let mut document = Document::new();
        serializer.serialize(&config, &mut document).unwrap();
        assert_eq!(
            document.to_string(),
            "[App]\nName=demo\nEnabled=false\nReleased=2024-03-01\n\
             [Limits]\nMaxConnections=64\nRatio=0.25\n"
        );
    }

    #[test]
    fn test_deserialize_uses_defaults() {
        let binder = binder();
        let serializer = IniSerializer::<Config>::with_binder(&binder).unwrap();

        let mut document = Document::new();
        document.set("App", "Name", "demo");
        document.set("App", "Enabled", "");

        let config = serializer.deserialize(&document).unwrap();
        assert_eq!(config.name, "demo");
        assert!(config.enabled);
        assert_eq!(config.released, NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
        assert_eq!(config.limits.max_connections, 10);
        assert_eq!(config.limits.ratio, 0.0);
    }

    #[test]
    fn test_deserialize_does_not_create_sections() {
        let binder = binder();
        let serializer = IniSerializer::<Config>::with_binder(&binder).unwrap();
        let document = Document::new();
        serializer.deserialize(&document).unwrap();
        assert!(document.is_empty());
    }

    #[test]
    fn test_only_serialize_adds_missing_keys() {
        let binder = binder();
        let serializer = IniSerializer::<Config>::with_binder(&binder).unwrap();
        let mut document: Document = "[Unrelated]\nkeep=1\n".parse().unwrap();

        serializer.deserialize(&document).unwrap();
        assert_eq!(document.to_string(), "[Unrelated]\nkeep=1\n");

        let config = serializer.deserialize(&document).unwrap();
        serializer.serialize(&config, &mut document).unwrap();
        let names: Vec<&str> = document.sections().map(|section| section.name()).collect();
        assert_eq!(names, vec!["Unrelated", "App", "Limits"]);
        assert_eq!(document.get("Limits", "MaxConnections"), Some("10"));
    }

    #[test]
    fn test_round_trip_through_document() {
        let binder = binder();
        let serializer = IniSerializer::<Config>::with_binder(&binder).unwrap();
        let config = Config {
            name: "round".into(),
            enabled: true,
            released: NaiveDate::from_ymd_opt(2023, 12, 31).unwrap(),
            limits: Limits {
                max_connections: 3,
                ratio: 1.5,
            },
        };
        let mut document = Document::new();
        serializer.serialize(&config, &mut document).unwrap();
        let text = document.to_string();
        let reparsed: Document = text.parse().unwrap();
        assert_eq!(serializer.deserialize(&reparsed).unwrap(), config);
    }

    #[test]
    fn test_conversion_error_names_location() {
        let binder = binder();
        let serializer = IniSerializer::<Config>::with_binder(&binder).unwrap();
        let mut document = Document::new();
        document.set("Limits", "MaxConnections", "lots");

        match serializer.deserialize(&document).unwrap_err() {
            Error::Conversion {
                section,
                key,
                value,
                type_name,
                ..
            } => {
                assert_eq!(section, "Limits");
                assert_eq!(key, "MaxConnections");
                assert_eq!(value, "lots");
                assert_eq!(type_name, "u32");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_unregistered_type_fails_fast() {
        let binder = Binder::new();
        let err = IniSerializer::<Config>::with_binder(&binder).unwrap_err();
        assert!(matches!(err, Error::InvalidOperation(ref msg) if msg.contains("Config")));
    }
}
