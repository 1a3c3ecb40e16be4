use core::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

use crate::FlakeId;

/// Ids serialize as quoted decimal strings so that consumers which parse
/// numbers as doubles (browsers, most JSON tooling) keep every digit.
impl Serialize for FlakeId {
    fn serialize<S>(&self, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        s.collect_str(self)
    }
}

/// Accepts the quoted decimal form as well as a bare integer.
impl<'de> Deserialize<'de> for FlakeId {
    fn deserialize<D>(d: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        d.deserialize_any(FlakeIdVisitor)
    }
}

struct FlakeIdVisitor;

impl de::Visitor<'_> for FlakeIdVisitor {
    type Value = FlakeId;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a decimal string or a signed 64-bit integer")
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        FlakeId::from_text(v).map_err(E::custom)
    }

    fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(FlakeId::from_raw(v))
    }

    fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        i64::try_from(v)
            .map(FlakeId::from_raw)
            .map_err(|_| E::invalid_value(de::Unexpected::Unsigned(v), &self))
    }
}

pub mod as_native {
    use super::{Deserialize, Deserializer, Serialize, Serializer};
    use crate::FlakeId;

    /// Serialize an id as its native integer representation.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying serializer fails.
    pub fn serialize<S>(id: &FlakeId, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        id.to_raw().serialize(s)
    }

    /// Deserialize an id from its native integer representation.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying deserializer fails or the value
    /// does not fit an `i64`.
    pub fn deserialize<'de, D>(d: D) -> Result<FlakeId, D::Error>
    where
        D: Deserializer<'de>,
    {
        i64::deserialize(d).map(FlakeId::from_raw)
    }
}
