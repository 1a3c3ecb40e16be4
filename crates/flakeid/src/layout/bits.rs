use crate::{Error, Field, Result};

/// Smallest total width accepted by [`BitLayout::new`].
pub const MIN_TOTAL_BITS: u32 = 5;

/// Largest total width accepted by [`BitLayout::new`]. The sign bit of the
/// `i64` identifier is never used.
pub const MAX_TOTAL_BITS: u32 = 63;

/// Number of bits allocated to each field of an identifier.
///
/// The widths say nothing about where a field sits; that is decided by a
/// [`FieldOrder`](crate::FieldOrder). A width of zero removes the field.
///
/// # Example
///
/// ```
/// use flakeid::{BitLayout, Field};
///
/// let layout = BitLayout::new(0, 41, 10, 12).unwrap();
/// assert_eq!(layout.total(), 63);
/// assert_eq!(layout.width(Field::Node), 10);
///
/// assert!(BitLayout::new(0, 2, 1, 1).is_err());
/// assert!(BitLayout::new(1, 41, 10, 12).is_err());
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "UncheckedBitLayout"))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BitLayout {
    random: u32,
    time: u32,
    node: u32,
    sequence: u32,
}

impl BitLayout {
    /// Validates the widths and builds a layout.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidLayout`] if the widths sum to less than
    /// [`MIN_TOTAL_BITS`] or more than [`MAX_TOTAL_BITS`].
    pub fn new(random: u32, time: u32, node: u32, sequence: u32) -> Result<Self> {
        let total = u64::from(random) + u64::from(time) + u64::from(node) + u64::from(sequence);
        if !(u64::from(MIN_TOTAL_BITS)..=u64::from(MAX_TOTAL_BITS)).contains(&total) {
            return Err(Error::InvalidLayout { total });
        }
        Ok(Self {
            random,
            time,
            node,
            sequence,
        })
    }

    /// Builds a layout known to be valid at compile time.
    pub(crate) const fn new_unchecked(random: u32, time: u32, node: u32, sequence: u32) -> Self {
        Self {
            random,
            time,
            node,
            sequence,
        }
    }

    /// Width in bits of `field`.
    pub const fn width(&self, field: Field) -> u32 {
        match field {
            Field::Random => self.random,
            Field::Time => self.time,
            Field::Node => self.node,
            Field::Sequence => self.sequence,
        }
    }

    /// Sum of all four widths.
    pub const fn total(&self) -> u32 {
        self.random + self.time + self.node + self.sequence
    }

    /// Largest value `field` can hold.
    pub const fn max_value(&self, field: Field) -> i64 {
        // widths never exceed MAX_TOTAL_BITS
        i64::MAX >> (MAX_TOTAL_BITS - self.width(field))
    }
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct UncheckedBitLayout {
    random: u32,
    time: u32,
    node: u32,
    sequence: u32,
}

#[cfg(feature = "serde")]
impl TryFrom<UncheckedBitLayout> for BitLayout {
    type Error = Error;

    fn try_from(raw: UncheckedBitLayout) -> Result<Self> {
        Self::new(raw.random, raw.time, raw.node, raw.sequence)
    }
}
