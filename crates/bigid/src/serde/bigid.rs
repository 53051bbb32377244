//! JSON adapters for [`BigId`].
//!
//! By default an ID serializes as a quoted decimal string (`"4611686..."`),
//! so that consumers whose JSON numbers are doubles do not lose precision.
//! Deserialization accepts the quoted form, with any stray surrounding quote
//! characters stripped, and also a bare integer.
//!
//! Use [`as_native`] with `#[serde(with = "...")]` for a field that should
//! be written as a plain JSON number.

use core::fmt;

use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{self, Visitor},
};

use crate::{BigId, id::parse};

impl Serialize for BigId {
    fn serialize<S>(&self, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        s.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for BigId {
    fn deserialize<D>(d: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        d.deserialize_any(BigIdVisitor)
    }
}

struct BigIdVisitor;

impl Visitor<'_> for BigIdVisitor {
    type Value = BigId;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a decimal 64-bit integer, as a string or a number")
    }

    #[inline]
    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        parse(v.trim_matches('"')).map_err(E::custom)
    }

    fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(BigId::from_raw(v))
    }

    fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        i64::try_from(v)
            .map(BigId::from_raw)
            .map_err(|_| E::invalid_value(de::Unexpected::Unsigned(v), &self))
    }
}

pub mod as_native {
    use super::{BigId, Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize an ID as a plain signed JSON number.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying serializer fails.
    pub fn serialize<S>(id: &BigId, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        id.to_raw().serialize(s)
    }

    /// Deserialize an ID from a plain signed JSON number.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying deserializer fails or the number
    /// does not fit in an `i64`.
    pub fn deserialize<'de, D>(d: D) -> Result<BigId, D::Error>
    where
        D: Deserializer<'de>,
    {
        i64::deserialize(d).map(BigId::from_raw)
    }
}
