use core::fmt;
use core::str::FromStr;

use crate::{Error, Result};

/// A generated identifier.
///
/// The value is a signed 64-bit integer whose sign bit is never set by a
/// generator. Callers should treat it as opaque: the bit structure is only
/// meaningful to the generator (or layout) that produced it, see
/// [`LockFlakeGenerator::decompose`](crate::LockFlakeGenerator::decompose).
///
/// The text form is plain base-10. Many JSON consumers lose precision above
/// 2^53, so the `serde` feature encodes ids as quoted decimal strings.
///
/// ```
/// use flakeid::FlakeId;
///
/// let id = FlakeId::from_raw(1_541_815_603_606_036_480);
/// assert_eq!(id.to_string(), "1541815603606036480");
/// assert_eq!("1541815603606036480".parse::<FlakeId>().unwrap(), id);
/// ```
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FlakeId(i64);

impl FlakeId {
    /// Width of [`FlakeId::to_padded_string`].
    pub const PADDED_LEN: usize = 19;

    pub const fn from_raw(raw: i64) -> Self {
        Self(raw)
    }

    pub const fn to_raw(&self) -> i64 {
        self.0
    }

    /// Base-10 text form.
    pub fn to_text(&self) -> String {
        self.to_string()
    }

    /// Parses the base-10 text form.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] if `text` is not a signed 64-bit decimal
    /// integer.
    pub fn from_text(text: &str) -> Result<Self> {
        text.parse::<i64>().map(Self).map_err(|source| Error::Parse {
            input: text.to_owned(),
            source,
        })
    }

    /// Returns the ID as a zero-padded 19-digit string, so that string order
    /// matches numeric order for non-negative ids.
    pub fn to_padded_string(&self) -> String {
        format!("{:019}", self.0)
    }
}

impl FromStr for FlakeId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_text(s)
    }
}

impl From<FlakeId> for i64 {
    fn from(id: FlakeId) -> Self {
        id.0
    }
}

impl From<i64> for FlakeId {
    fn from(raw: i64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for FlakeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for FlakeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FlakeId({} / 0x{:016x})", self.0, self.0)
    }
}
