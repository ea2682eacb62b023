//! Serde serialization into INI documents.
//!
//! This module provides the [`Serializer`] implementation that writes Rust data
//! structures into a [`Document`].
//!
//! ## Shape
//!
//! INI has exactly two levels, so only two shapes are accepted:
//!
//! - the top-level value is a struct or map; each field becomes a **section**;
//! - each section value is a struct or map; each field becomes a **setting**.
//!
//! Setting values are scalars, written with their `Display` form. `None` fields are
//! skipped and unit enum variants are written by name. Anything else (sequences, nested
//! structs below the section level, bytes) fails with
//! [`Error::UnsupportedType`](crate::Error::UnsupportedType).
//!
//! ## Usage
//!
//! Most users should use the high-level functions in the crate root:
//!
//! ```rust
//! use mini_ini::to_string;
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct Server { host: String, port: u16, tls: Option<bool> }
//!
//! #[derive(Serialize)]
//! struct Config { server: Server }
//!
//! let config = Config {
//!     server: Server { host: "localhost".into(), port: 8080, tls: None },
//! };
//! assert_eq!(to_string(&config).unwrap(), "[server]\nhost=localhost\nport=8080\n");
//! ```
//!
//! ## Direct Serializer Usage
//!
//! Serializing into an existing document keeps its comments and order, and updates
//! settings in place:
//!
//! ```rust
//! use mini_ini::{Document, Serializer};
//! use serde::Serialize;
//! use std::collections::BTreeMap;
//!
//! let mut document: Document = "; keep me\n[server]\nport=80\n".parse().unwrap();
//!
//! let mut server = BTreeMap::new();
//! server.insert("port", 8080);
//! let mut config = BTreeMap::new();
//! config.insert("server", server);
//!
//! config.serialize(&mut Serializer::new(&mut document)).unwrap();
//! assert_eq!(document.to_string(), "; keep me\n[server]\nport=8080\n");
//! ```

use crate::document::Document;
use crate::section::Section;
use crate::{Error, Result};
use serde::ser::{self, Impossible, Serialize};

/// The INI serializer.
///
/// Writes sections and settings into the borrowed [`Document`] through its read-creates
/// accessors, so existing sections and settings keep their position and comments.
pub struct Serializer<'d> {
    document: &'d mut Document,
}

impl<'d> Serializer<'d> {
    pub fn new(document: &'d mut Document) -> Self {
        Serializer { document }
    }
}

fn top_level_error() -> Error {
    Error::unsupported_type("the top-level value must be a struct or map of sections")
}

impl<'a, 'd> ser::Serializer for &'a mut Serializer<'d> {
    type Ok = ();
    type Error = Error;

    type SerializeSeq = Impossible<(), Error>;
    type SerializeTuple = Impossible<(), Error>;
    type SerializeTupleStruct = Impossible<(), Error>;
    type SerializeTupleVariant = Impossible<(), Error>;
    type SerializeMap = SectionsSerializer<'a>;
    type SerializeStruct = SectionsSerializer<'a>;
    type SerializeStructVariant = Impossible<(), Error>;

    fn serialize_bool(self, _v: bool) -> Result<()> {
        Err(top_level_error())
    }

    fn serialize_i8(self, _v: i8) -> Result<()> {
        Err(top_level_error())
    }

    fn serialize_i16(self, _v: i16) -> Result<()> {
        Err(top_level_error())
    }

    fn serialize_i32(self, _v: i32) -> Result<()> {
        Err(top_level_error())
    }

    fn serialize_i64(self, _v: i64) -> Result<()> {
        Err(top_level_error())
    }

    fn serialize_u8(self, _v: u8) -> Result<()> {
        Err(top_level_error())
    }

    fn serialize_u16(self, _v: u16) -> Result<()> {
        Err(top_level_error())
    }

    fn serialize_u32(self, _v: u32) -> Result<()> {
        Err(top_level_error())
    }

    fn serialize_u64(self, _v: u64) -> Result<()> {
        Err(top_level_error())
    }

    fn serialize_f32(self, _v: f32) -> Result<()> {
        Err(top_level_error())
    }

    fn serialize_f64(self, _v: f64) -> Result<()> {
        Err(top_level_error())
    }

    fn serialize_char(self, _v: char) -> Result<()> {
        Err(top_level_error())
    }

    fn serialize_str(self, _v: &str) -> Result<()> {
        Err(top_level_error())
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<()> {
        Err(top_level_error())
    }

    fn serialize_none(self) -> Result<()> {
        Ok(())
    }

    fn serialize_some<T>(self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<()> {
        Ok(())
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<()> {
        Ok(())
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
    ) -> Result<()> {
        Err(top_level_error())
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        Err(top_level_error())
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq> {
        Err(top_level_error())
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple> {
        Err(top_level_error())
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        Err(top_level_error())
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Err(top_level_error())
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
        Ok(SectionsSerializer {
            document: &mut *self.document,
            current_key: None,
        })
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Self::SerializeStruct> {
        Ok(SectionsSerializer {
            document: &mut *self.document,
            current_key: None,
        })
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Err(top_level_error())
    }
}

/// Serializes the fields of the top-level value as sections.
pub struct SectionsSerializer<'a> {
    document: &'a mut Document,
    current_key: Option<String>,
}

impl<'a> SectionsSerializer<'a> {
    fn section<T>(&mut self, name: &str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(SectionSerializer {
            document: &mut *self.document,
            name,
        })
    }
}

impl<'a> ser::SerializeMap for SectionsSerializer<'a> {
    type Ok = ();
    type Error = Error;

    fn serialize_key<T>(&mut self, key: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.current_key = Some(key_to_string(key)?);
        Ok(())
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let key = self
            .current_key
            .take()
            .ok_or_else(|| Error::custom("serialize_value called without serialize_key"))?;
        self.section(&key, value)
    }

    fn end(self) -> Result<()> {
        Ok(())
    }
}

impl<'a> ser::SerializeStruct for SectionsSerializer<'a> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.section(key, value)
    }

    fn end(self) -> Result<()> {
        Ok(())
    }
}

/// Serializes one section. The section is only created once a struct or map arrives, so
/// `None` sections are skipped.
struct SectionSerializer<'a, 'n> {
    document: &'a mut Document,
    name: &'n str,
}

impl<'a, 'n> SectionSerializer<'a, 'n> {
    fn error(&self, what: &str) -> Error {
        Error::unsupported_type(&format!(
            "section `{}` must be a struct or map, found {}",
            self.name, what
        ))
    }

    fn settings(self) -> SettingsSerializer<'a> {
        SettingsSerializer {
            section: self.document.section_mut(self.name),
            current_key: None,
        }
    }
}

impl<'a, 'n> ser::Serializer for SectionSerializer<'a, 'n> {
    type Ok = ();
    type Error = Error;

    type SerializeSeq = Impossible<(), Error>;
    type SerializeTuple = Impossible<(), Error>;
    type SerializeTupleStruct = Impossible<(), Error>;
    type SerializeTupleVariant = Impossible<(), Error>;
    type SerializeMap = SettingsSerializer<'a>;
    type SerializeStruct = SettingsSerializer<'a>;
    type SerializeStructVariant = Impossible<(), Error>;

    fn serialize_bool(self, _v: bool) -> Result<()> {
        Err(self.error("a bool"))
    }

    fn serialize_i8(self, _v: i8) -> Result<()> {
        Err(self.error("an integer"))
    }

    fn serialize_i16(self, _v: i16) -> Result<()> {
        Err(self.error("an integer"))
    }

    fn serialize_i32(self, _v: i32) -> Result<()> {
        Err(self.error("an integer"))
    }

    fn serialize_i64(self, _v: i64) -> Result<()> {
        Err(self.error("an integer"))
    }

    fn serialize_u8(self, _v: u8) -> Result<()> {
        Err(self.error("an integer"))
    }

    fn serialize_u16(self, _v: u16) -> Result<()> {
        Err(self.error("an integer"))
    }

    fn serialize_u32(self, _v: u32) -> Result<()> {
        Err(self.error("an integer"))
    }

    fn serialize_u64(self, _v: u64) -> Result<()> {
        Err(self.error("an integer"))
    }

    fn serialize_f32(self, _v: f32) -> Result<()> {
        Err(self.error("a float"))
    }

    fn serialize_f64(self, _v: f64) -> Result<()> {
        Err(self.error("a float"))
    }

    fn serialize_char(self, _v: char) -> Result<()> {
        Err(self.error("a char"))
    }

    fn serialize_str(self, _v: &str) -> Result<()> {
        Err(self.error("a string"))
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<()> {
        Err(self.error("bytes"))
    }

    fn serialize_none(self) -> Result<()> {
        Ok(())
    }

    fn serialize_some<T>(self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<()> {
        self.settings();
        Ok(())
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<()> {
        self.settings();
        Ok(())
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
    ) -> Result<()> {
        Err(self.error("an enum variant"))
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        Err(self.error("an enum variant"))
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq> {
        Err(self.error("a sequence"))
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple> {
        Err(self.error("a tuple"))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        Err(self.error("a tuple struct"))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Err(self.error("an enum variant"))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
        Ok(self.settings())
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Self::SerializeStruct> {
        Ok(self.settings())
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Err(self.error("an enum variant"))
    }
}

/// Serializes the fields of one section as settings.
pub struct SettingsSerializer<'a> {
    section: &'a mut Section,
    current_key: Option<String>,
}

impl<'a> SettingsSerializer<'a> {
    fn setting<T>(&mut self, key: &str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let location = Location {
            section: self.section.name(),
            key,
        };
        if let Some(text) = value.serialize(ValueSerializer { location })? {
            self.section.set(key, text);
        }
        Ok(())
    }
}

impl<'a> ser::SerializeMap for SettingsSerializer<'a> {
    type Ok = ();
    type Error = Error;

    fn serialize_key<T>(&mut self, key: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.current_key = Some(key_to_string(key)?);
        Ok(())
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let key = self
            .current_key
            .take()
            .ok_or_else(|| Error::custom("serialize_value called without serialize_key"))?;
        self.setting(&key, value)
    }

    fn end(self) -> Result<()> {
        Ok(())
    }
}

impl<'a> ser::SerializeStruct for SettingsSerializer<'a> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.setting(key, value)
    }

    fn end(self) -> Result<()> {
        Ok(())
    }
}

#[derive(Clone, Copy)]
struct Location<'l> {
    section: &'l str,
    key: &'l str,
}

fn key_to_string<T>(key: &T) -> Result<String>
where
    T: ?Sized + Serialize,
{
    let location = Location {
        section: "",
        key: "<map key>",
    };
    key.serialize(ValueSerializer { location })?
        .ok_or_else(|| Error::custom("map keys must not be None"))
}

/// Renders a scalar as setting text. `None` means "skip this setting".
struct ValueSerializer<'l> {
    location: Location<'l>,
}

impl<'l> ValueSerializer<'l> {
    fn error(&self, what: &str) -> Error {
        Error::unsupported_type(&format!(
            "[{}] {}: {} cannot be stored in an INI value",
            self.location.section, self.location.key, what
        ))
    }
}

impl<'l> ser::Serializer for ValueSerializer<'l> {
    type Ok = Option<String>;
    type Error = Error;

    type SerializeSeq = Impossible<Option<String>, Error>;
    type SerializeTuple = Impossible<Option<String>, Error>;
    type SerializeTupleStruct = Impossible<Option<String>, Error>;
    type SerializeTupleVariant = Impossible<Option<String>, Error>;
    type SerializeMap = Impossible<Option<String>, Error>;
    type SerializeStruct = Impossible<Option<String>, Error>;
    type SerializeStructVariant = Impossible<Option<String>, Error>;

    fn serialize_bool(self, v: bool) -> Result<Self::Ok> {
        Ok(Some(v.to_string()))
    }

    fn serialize_i8(self, v: i8) -> Result<Self::Ok> {
        Ok(Some(v.to_string()))
    }

    fn serialize_i16(self, v: i16) -> Result<Self::Ok> {
        Ok(Some(v.to_string()))
    }

    fn serialize_i32(self, v: i32) -> Result<Self::Ok> {
        Ok(Some(v.to_string()))
    }

    fn serialize_i64(self, v: i64) -> Result<Self::Ok> {
        Ok(Some(v.to_string()))
    }

    fn serialize_i128(self, v: i128) -> Result<Self::Ok> {
        Ok(Some(v.to_string()))
    }

    fn serialize_u8(self, v: u8) -> Result<Self::Ok> {
        Ok(Some(v.to_string()))
    }

    fn serialize_u16(self, v: u16) -> Result<Self::Ok> {
        Ok(Some(v.to_string()))
    }

    fn serialize_u32(self, v: u32) -> Result<Self::Ok> {
        Ok(Some(v.to_string()))
    }

    fn serialize_u64(self, v: u64) -> Result<Self::Ok> {
        Ok(Some(v.to_string()))
    }

    fn serialize_u128(self, v: u128) -> Result<Self::Ok> {
        Ok(Some(v.to_string()))
    }

    fn serialize_f32(self, v: f32) -> Result<Self::Ok> {
        Ok(Some(v.to_string()))
    }

    fn serialize_f64(self, v: f64) -> Result<Self::Ok> {
        Ok(Some(v.to_string()))
    }

    fn serialize_char(self, v: char) -> Result<Self::Ok> {
        Ok(Some(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<Self::Ok> {
        Ok(Some(v.to_string()))
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<Self::Ok> {
        Err(self.error("a byte array"))
    }

    fn serialize_none(self) -> Result<Self::Ok> {
        Ok(None)
    }

    fn serialize_some<T>(self, value: &T) -> Result<Self::Ok>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Self::Ok> {
        Ok(Some(String::new()))
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Self::Ok> {
        Ok(Some(String::new()))
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Self::Ok> {
        Ok(Some(variant.to_string()))
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<Self::Ok>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<Self::Ok>
    where
        T: ?Sized + Serialize,
    {
        Err(self.error("an enum variant with data"))
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq> {
        Err(self.error("a sequence"))
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple> {
        Err(self.error("a tuple"))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        Err(self.error("a tuple struct"))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Err(self.error("an enum variant with data"))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
        Err(self.error("a nested map"))
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Self::SerializeStruct> {
        Err(self.error("a nested struct"))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Err(self.error("an enum variant with data"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;
    use std::collections::BTreeMap;

    fn render<T: Serialize>(value: &T) -> Result<String> {
        let mut document = Document::new();
        value.serialize(&mut Serializer::new(&mut document))?;
        Ok(document.to_string())
    }

    #[derive(Serialize)]
    enum Level {
        Debug,
        #[allow(dead_code)]
        Info,
    }

    #[derive(Serialize)]
    struct Logging {
        level: Level,
        file: Option<String>,
        max_size: u64,
    }

    #[derive(Serialize)]
    struct Config {
        logging: Logging,
        extra: Option<BTreeMap<String, String>>,
    }

    #[test]
    fn test_struct_sections() {
        let config = Config {
            logging: Logging {
                level: Level::Debug,
                file: None,
                max_size: 1024,
            },
            extra: None,
        };
        assert_eq!(
            render(&config).unwrap(),
            "[logging]\nlevel=Debug\nmax_size=1024\n"
        );
    }

    #[test]
    fn test_map_sections() {
        let mut extra = BTreeMap::new();
        extra.insert("b".to_string(), "2".to_string());
        extra.insert("a".to_string(), "1".to_string());
        let config = Config {
            logging: Logging {
                level: Level::Debug,
                file: Some("app.log".into()),
                max_size: 1,
            },
            extra: Some(extra),
        };
        assert_eq!(
            render(&config).unwrap(),
            "[logging]\nlevel=Debug\nfile=app.log\nmax_size=1\n[extra]\na=1\nb=2\n"
        );
    }

    #[test]
    fn test_top_level_scalar_is_unsupported() {
        assert!(matches!(render(&42), Err(Error::UnsupportedType(_))));
        assert!(matches!(render(&vec![1, 2]), Err(Error::UnsupportedType(_))));
    }

    #[test]
    fn test_nested_struct_below_section_is_unsupported() {
        #[derive(Serialize)]
        struct Inner {
            x: i32,
        }
        #[derive(Serialize)]
        struct Section {
            inner: Inner,
        }
        #[derive(Serialize)]
        struct Top {
            section: Section,
        }

        let err = render(&Top {
            section: Section { inner: Inner { x: 1 } },
        })
        .unwrap_err();
        match err {
            Error::UnsupportedType(msg) => assert!(msg.contains("[section] inner")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_section_must_be_compound() {
        #[derive(Serialize)]
        struct Top {
            name: String,
        }
        let err = render(&Top {
            name: "x".into(),
        })
        .unwrap_err();
        assert!(matches!(err, Error::UnsupportedType(ref msg) if msg.contains("`name`")));
    }

    #[test]
    fn test_updates_existing_document_in_place() {
        let mut document: Document = "[s]\n; about a\na=old\nb=keep\n".parse().unwrap();
        let mut section = BTreeMap::new();
        section.insert("a", "new");
        let mut top = BTreeMap::new();
        top.insert("s", section);

        top.serialize(&mut Serializer::new(&mut document)).unwrap();
        assert_eq!(document.to_string(), "[s]\n; about a\na=new\nb=keep\n");
    }
}
