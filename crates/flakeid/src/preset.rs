use core::fmt;

use crate::{BitLayout, FieldOrder, LockFlakeGenerator, Result};

/// Known-good layouts. All of them leave the random field empty and use
/// [`FieldOrder::DESCENDING`], so the sequence occupies the lowest bits.
///
/// | preset     | time       | node | sequence | total | capacity per node |
/// |------------|------------|------|----------|-------|-------------------|
/// | `Compact`  | 30 (1 s)   | 2    | 2        | 34    | 4 / s             |
/// | `Extended` | 32 (1 s)   | 4    | 4        | 40    | 16 / s            |
/// | `Standard` | 41 (1 ms)  | 10   | 12       | 63    | 4096 / ms         |
/// | `WideNode` | 39 (10 ms) | 8    | 16       | 63    | 65536 / 10 ms     |
///
/// `Standard` is bit-for-bit the Twitter Snowflake layout and `WideNode`
/// follows Sonyflake.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Preset {
    Compact,
    Extended,
    Standard,
    WideNode,
}

impl Preset {
    pub const ALL: [Self; 4] = [Self::Compact, Self::Extended, Self::Standard, Self::WideNode];

    pub const fn layout(self) -> BitLayout {
        match self {
            Self::Compact => BitLayout::new_unchecked(0, 30, 2, 2),
            Self::Extended => BitLayout::new_unchecked(0, 32, 4, 4),
            Self::Standard => BitLayout::new_unchecked(0, 41, 10, 12),
            Self::WideNode => BitLayout::new_unchecked(0, 39, 8, 16),
        }
    }

    pub const fn order(self) -> FieldOrder {
        FieldOrder::DESCENDING
    }

    /// Milliseconds per unit of the time field.
    pub const fn tick_millis(self) -> i64 {
        match self {
            Self::Compact | Self::Extended => 1_000,
            Self::Standard => 1,
            Self::WideNode => 10,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Compact => "compact",
            Self::Extended => "extended",
            Self::Standard => "standard",
            Self::WideNode => "wide-node",
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl LockFlakeGenerator {
    /// Creates a generator from a [`Preset`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::NodeOutOfRange`] if `node_id` does not fit the
    /// preset's node field, or [`Error::EpochInFuture`].
    ///
    /// [`Error::NodeOutOfRange`]: crate::Error::NodeOutOfRange
    /// [`Error::EpochInFuture`]: crate::Error::EpochInFuture
    pub fn from_preset(preset: Preset, epoch_millis: i64, node_id: i64) -> Result<Self> {
        Self::new(
            epoch_millis,
            preset.tick_millis(),
            node_id,
            preset.layout(),
            preset.order(),
        )
    }

    /// 34-bit ids, one-second ticks, 4 nodes, 4 ids per second per node.
    pub fn compact(epoch_millis: i64, node_id: i64) -> Result<Self> {
        Self::from_preset(Preset::Compact, epoch_millis, node_id)
    }

    /// Twitter Snowflake layout: 41-bit millisecond time, 10-bit node,
    /// 12-bit sequence.
    pub fn standard(epoch_millis: i64, node_id: i64) -> Result<Self> {
        Self::from_preset(Preset::Standard, epoch_millis, node_id)
    }

    /// Sonyflake-style layout: 39-bit time in 10 ms ticks, 8-bit node,
    /// 16-bit sequence.
    pub fn wide_node(epoch_millis: i64, node_id: i64) -> Result<Self> {
        Self::from_preset(Preset::WideNode, epoch_millis, node_id)
    }
}
