//! Serde deserialization from INI documents.
//!
//! This module provides the [`Deserializer`] implementation that reads Rust data
//! structures out of a parsed [`Document`].
//!
//! ## Overview
//!
//! - The document is a map from section names to sections.
//! - Each section is a map from setting keys to values.
//! - Values are strings, parsed on demand into whatever primitive the target type asks
//!   for. A value that does not parse fails with
//!   [`Error::Conversion`](crate::Error::Conversion), naming the section and key.
//! - An empty value deserializes to `None` for `Option` fields.
//! - Unit enum variants are read by name.
//!
//! ## Usage
//!
//! Most users should use the high-level functions in the crate root:
//!
//! ```rust
//! use mini_ini::from_str;
//! use serde::Deserialize;
//!
//! #[derive(Deserialize, Debug, PartialEq)]
//! struct Server { host: String, port: u16, tls: Option<bool> }
//!
//! #[derive(Deserialize, Debug, PartialEq)]
//! struct Config { server: Server }
//!
//! let config: Config = from_str("[server]\nhost = localhost\nport = 8080\ntls =\n").unwrap();
//! assert_eq!(config.server.port, 8080);
//! assert_eq!(config.server.tls, None);
//! ```

use crate::document::Document;
use crate::part::Setting;
use crate::section::Section;
use crate::{Error, Result};
use serde::de::{self, IntoDeserializer, Visitor};
use serde::forward_to_deserialize_any;
use std::any::type_name;
use std::str::FromStr;

/// The INI deserializer.
///
/// Borrows a parsed [`Document`]; string fields can borrow from it as well.
#[derive(Clone, Copy)]
pub struct Deserializer<'de> {
    document: &'de Document,
}

impl<'de> Deserializer<'de> {
    pub fn new(document: &'de Document) -> Self {
        Deserializer { document }
    }
}

impl<'de> de::Deserializer<'de> for Deserializer<'de> {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_map(SectionsAccess {
            sections: Box::new(self.document.sections()),
            current: None,
        })
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_some(self)
    }

    fn deserialize_unit<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_unit()
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf unit_struct seq tuple tuple_struct map struct enum
        identifier ignored_any
    }
}

struct SectionsAccess<'de> {
    sections: Box<dyn Iterator<Item = &'de Section> + 'de>,
    current: Option<&'de Section>,
}

impl<'de> de::MapAccess<'de> for SectionsAccess<'de> {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: de::DeserializeSeed<'de>,
    {
        match self.sections.next() {
            Some(section) => {
                self.current = Some(section);
                seed.deserialize(de::value::BorrowedStrDeserializer::new(section.name()))
                    .map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: de::DeserializeSeed<'de>,
    {
        let section = self
            .current
            .take()
            .ok_or_else(|| Error::custom("next_value_seed called without next_key_seed"))?;
        seed.deserialize(SectionDeserializer { section })
    }
}

#[derive(Clone, Copy)]
struct SectionDeserializer<'de> {
    section: &'de Section,
}

impl<'de> de::Deserializer<'de> for SectionDeserializer<'de> {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_map(SettingsAccess {
            section: self.section,
            settings: Box::new(self.section.settings()),
            current: None,
        })
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_some(self)
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf unit unit_struct seq tuple tuple_struct map struct enum
        identifier ignored_any
    }
}

struct SettingsAccess<'de> {
    section: &'de Section,
    settings: Box<dyn Iterator<Item = &'de Setting> + 'de>,
    current: Option<&'de Setting>,
}

impl<'de> de::MapAccess<'de> for SettingsAccess<'de> {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: de::DeserializeSeed<'de>,
    {
        match self.settings.next() {
            Some(setting) => {
                self.current = Some(setting);
                seed.deserialize(de::value::BorrowedStrDeserializer::new(setting.key()))
                    .map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: de::DeserializeSeed<'de>,
    {
        let setting = self
            .current
            .take()
            .ok_or_else(|| Error::custom("next_value_seed called without next_key_seed"))?;
        seed.deserialize(ValueDeserializer {
            section: self.section.name(),
            key: setting.key(),
            value: setting.value(),
        })
    }
}

/// Deserializes one setting value, parsing it into the requested type.
struct ValueDeserializer<'de> {
    section: &'de str,
    key: &'de str,
    value: &'de str,
}

impl<'de> ValueDeserializer<'de> {
    fn parse<T>(&self) -> Result<T>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.value.parse().map_err(|err: T::Err| {
            Error::conversion(
                self.section,
                self.key,
                self.value,
                type_name::<T>(),
                &err.to_string(),
            )
        })
    }

    fn unsupported(&self, what: &str) -> Error {
        Error::unsupported_type(&format!(
            "[{}] {}: INI values cannot hold {}",
            self.section, self.key, what
        ))
    }
}

macro_rules! deserialize_parsed {
    ($($method:ident => $visit:ident($ty:ty)),* $(,)?) => {
        $(
            fn $method<V>(self, visitor: V) -> Result<V::Value>
            where
                V: Visitor<'de>,
            {
                visitor.$visit(self.parse::<$ty>()?)
            }
        )*
    };
}

impl<'de> de::Deserializer<'de> for ValueDeserializer<'de> {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_borrowed_str(self.value)
    }

    fn deserialize_bool<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        if self.value.eq_ignore_ascii_case("true") {
            visitor.visit_bool(true)
        } else if self.value.eq_ignore_ascii_case("false") {
            visitor.visit_bool(false)
        } else {
            Err(Error::conversion(
                self.section,
                self.key,
                self.value,
                "bool",
                "expected `true` or `false`",
            ))
        }
    }

    deserialize_parsed! {
        deserialize_i8 => visit_i8(i8),
        deserialize_i16 => visit_i16(i16),
        deserialize_i32 => visit_i32(i32),
        deserialize_i64 => visit_i64(i64),
        deserialize_i128 => visit_i128(i128),
        deserialize_u8 => visit_u8(u8),
        deserialize_u16 => visit_u16(u16),
        deserialize_u32 => visit_u32(u32),
        deserialize_u64 => visit_u64(u64),
        deserialize_u128 => visit_u128(u128),
        deserialize_f32 => visit_f32(f32),
        deserialize_f64 => visit_f64(f64),
        deserialize_char => visit_char(char),
    }

    fn deserialize_str<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_borrowed_str(self.value)
    }

    fn deserialize_string<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_borrowed_str(self.value)
    }

    fn deserialize_bytes<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_borrowed_bytes(self.value.as_bytes())
    }

    fn deserialize_byte_buf<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_borrowed_bytes(self.value.as_bytes())
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        if self.value.is_empty() {
            visitor.visit_none()
        } else {
            visitor.visit_some(self)
        }
    }

    fn deserialize_unit<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_unit()
    }

    fn deserialize_unit_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_unit()
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_seq<V>(self, _visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        Err(self.unsupported("a sequence"))
    }

    fn deserialize_tuple<V>(self, _len: usize, _visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        Err(self.unsupported("a tuple"))
    }

    fn deserialize_tuple_struct<V>(
        self,
        _name: &'static str,
        _len: usize,
        _visitor: V,
    ) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        Err(self.unsupported("a tuple struct"))
    }

    fn deserialize_map<V>(self, _visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        Err(self.unsupported("a nested map"))
    }

    fn deserialize_struct<V>(
        self,
        _name: &'static str,
        _fields: &'static [&'static str],
        _visitor: V,
    ) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        Err(self.unsupported("a nested struct"))
    }

    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_enum(self.value.into_deserializer())
    }

    fn deserialize_identifier<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_borrowed_str(self.value)
    }

    fn deserialize_ignored_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_unit()
    }
}
