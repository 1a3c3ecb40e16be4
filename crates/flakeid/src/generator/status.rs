use crate::FlakeId;

/// Represents the result of attempting to generate a new ID without blocking.
///
/// This type models the outcome of
/// [`LockFlakeGenerator::try_next_id`](crate::LockFlakeGenerator::try_next_id):
///
/// - [`IdGenStatus::Ready`] indicates a new ID was successfully generated.
/// - [`IdGenStatus::Pending`] means the sequence for the current tick is used
///   up and no ID can be produced until the clock reaches `yield_until`.
///
/// This allows non-blocking generation loops and clean backoff strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdGenStatus {
    /// A unique ID was generated and is ready to use.
    Ready {
        /// The generated ID.
        id: FlakeId,
    },
    /// No ID could be generated because the sequence has been exhausted for
    /// the current tick.
    Pending {
        /// The first tick (inclusive) at which generation may resume.
        yield_until: i64,
    },
}

impl IdGenStatus {
    pub const fn is_ready(&self) -> bool {
        matches!(self, Self::Ready { .. })
    }

    /// Returns the ID if one was produced.
    pub const fn ready(self) -> Option<FlakeId> {
        match self {
            Self::Ready { id } => Some(id),
            Self::Pending { .. } => None,
        }
    }
}
