use crate::{Error, Field, Result};

/// Relative significance of each field within an identifier.
///
/// A field with a strictly larger rank sits at more significant bit positions
/// than every field with a strictly smaller rank. Ranks are only compared, so
/// any integers work: `(3, 2, 1, 0)` and `(40, 30, 20, 10)` describe the same
/// order.
///
/// At least three distinct ranks are required. Two fields may still share a
/// rank here; a generator rejects such an order if both tied fields have a
/// non-zero width, since they would land on the same bits.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "UncheckedFieldOrder"))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FieldOrder {
    random: i32,
    time: i32,
    node: i32,
    sequence: i32,
}

impl FieldOrder {
    /// Random > Time > Node > Sequence, the order used by every preset.
    pub const DESCENDING: Self = Self {
        random: 3,
        time: 2,
        node: 1,
        sequence: 0,
    };

    /// Validates the ranks and builds an order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOrder`] if fewer than three distinct rank
    /// values are present.
    pub fn new(random: i32, time: i32, node: i32, sequence: i32) -> Result<Self> {
        let mut ranks = [random, time, node, sequence];
        ranks.sort_unstable();
        let distinct = 1 + ranks.windows(2).filter(|w| w[0] != w[1]).count();
        if distinct < 3 {
            return Err(Error::InvalidOrder { distinct });
        }
        Ok(Self {
            random,
            time,
            node,
            sequence,
        })
    }

    pub const fn rank(&self, field: Field) -> i32 {
        match field {
            Field::Random => self.random,
            Field::Time => self.time,
            Field::Node => self.node,
            Field::Sequence => self.sequence,
        }
    }
}

impl Default for FieldOrder {
    fn default() -> Self {
        Self::DESCENDING
    }
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct UncheckedFieldOrder {
    random: i32,
    time: i32,
    node: i32,
    sequence: i32,
}

#[cfg(feature = "serde")]
impl TryFrom<UncheckedFieldOrder> for FieldOrder {
    type Error = Error;

    fn try_from(raw: UncheckedFieldOrder) -> Result<Self> {
        Self::new(raw.random, raw.time, raw.node, raw.sequence)
    }
}
