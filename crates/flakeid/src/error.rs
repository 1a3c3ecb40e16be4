use core::num::ParseIntError;

use thiserror::Error;

use crate::layout::Field;

/// A result type defaulting to the crate [`enum@Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All errors that `flakeid` can emit.
///
/// Every variant except [`Error::Parse`] is a configuration error raised while
/// building a [`BitLayout`], [`FieldOrder`] or generator. Those are meant to
/// be treated as fatal startup misconfiguration. Generation itself never
/// fails.
///
/// [`BitLayout`]: crate::BitLayout
/// [`FieldOrder`]: crate::FieldOrder
#[derive(Error, Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// The four field widths do not add up to a value in `5..=63`.
    #[error("invalid bit layout: total width {total} is outside 5..=63")]
    InvalidLayout { total: u64 },

    /// Fewer than three distinct rank values were supplied.
    #[error("invalid field order: {distinct} distinct ranks, at least 3 required")]
    InvalidOrder { distinct: usize },

    /// Two fields with non-zero width share a rank and would overlap.
    #[error("fields {first} and {second} share a rank and would overlap")]
    TiedRanks { first: Field, second: Field },

    /// The node identifier does not fit the node field.
    #[error("node id {node_id} is out of range 0..={max}")]
    NodeOutOfRange { node_id: i64, max: i64 },

    /// The tick duration must be at least one millisecond.
    #[error("tick duration must be at least 1ms, got {tick_millis}")]
    InvalidTick { tick_millis: i64 },

    /// The clock reports a time before the configured epoch.
    #[error("epoch {epoch_millis} lies in the future")]
    EpochInFuture { epoch_millis: i64 },

    /// The input is not a base-10 signed 64-bit integer.
    #[error("invalid id {input:?}: {source}")]
    Parse {
        input: String,
        #[source]
        source: ParseIntError,
    },
}
