//! String conversion strategies used by the object mapper.
//!
//! Every value stored in an INI document is a string. When a bound field is written or
//! read, a [`StringConverter`] registered for the field's type turns it into a string and
//! back. Fields whose type has no converter are skipped when bindings are derived.
//!
//! [`FromStrConverter`] covers any type with `FromStr` and `Display`; the default
//! [`Binder`](crate::Binder) registers it for the primitive types, `String`,
//! `num_bigint::BigInt`, `chrono::NaiveDate` and the `std::net` address types.
//! [`Rfc3339Converter`] handles `chrono::DateTime<Utc>`.

use chrono::{DateTime, Utc};
use std::any::{type_name, Any};
use std::fmt::Display;
use std::marker::PhantomData;
use std::str::FromStr;

/// Converts values of one concrete type to and from their INI string form.
///
/// Values are passed as `dyn Any`; implementations downcast to the type they were
/// registered for.
pub trait StringConverter: Send + Sync {
    /// Name of the converted type, used in error messages.
    fn type_name(&self) -> &'static str;

    /// Renders `value`. Returns `None` if `value` is not of the converted type.
    fn to_ini(&self, value: &dyn Any) -> Option<String>;

    /// Parses `text` into `target`, or describes why it cannot.
    fn from_ini(&self, text: &str, target: &mut dyn Any) -> Result<(), String>;
}

/// Converts through `FromStr` and `Display`.
///
/// # Examples
///
/// ```rust
/// use mini_ini::convert::{FromStrConverter, StringConverter};
///
/// let converter = FromStrConverter::<u16>::new();
/// let mut port = 0u16;
/// converter.from_ini("8080", &mut port).unwrap();
/// assert_eq!(port, 8080);
/// assert_eq!(converter.to_ini(&port), Some("8080".to_string()));
/// assert!(converter.from_ini("eighty", &mut port).is_err());
/// ```
pub struct FromStrConverter<T>(PhantomData<fn() -> T>);

impl<T> FromStrConverter<T> {
    #[must_use]
    pub fn new() -> Self {
        FromStrConverter(PhantomData)
    }
}

impl<T> Default for FromStrConverter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> StringConverter for FromStrConverter<T>
where
    T: FromStr + Display + Any,
    T::Err: Display,
{
    fn type_name(&self) -> &'static str {
        type_name::<T>()
    }

    fn to_ini(&self, value: &dyn Any) -> Option<String> {
        value.downcast_ref::<T>().map(ToString::to_string)
    }

    fn from_ini(&self, text: &str, target: &mut dyn Any) -> Result<(), String> {
        let slot = target
            .downcast_mut::<T>()
            .ok_or_else(|| format!("target is not a {}", type_name::<T>()))?;
        *slot = text.parse().map_err(|err: T::Err| err.to_string())?;
        Ok(())
    }
}

/// Converts `chrono::DateTime<Utc>` to and from RFC 3339 text.
///
/// Offsets other than UTC are accepted on input and normalized.
pub struct Rfc3339Converter;

impl StringConverter for Rfc3339Converter {
    fn type_name(&self) -> &'static str {
        type_name::<DateTime<Utc>>()
    }

    fn to_ini(&self, value: &dyn Any) -> Option<String> {
        value
            .downcast_ref::<DateTime<Utc>>()
            .map(DateTime::to_rfc3339)
    }

    fn from_ini(&self, text: &str, target: &mut dyn Any) -> Result<(), String> {
        let slot = target
            .downcast_mut::<DateTime<Utc>>()
            .ok_or_else(|| "target is not a DateTime<Utc>".to_string())?;
        *slot = DateTime::parse_from_rfc3339(text)
            .map_err(|err| err.to_string())?
            .with_timezone(&Utc);
        Ok(())
    }
}
