use core::fmt;

use parking_lot::Mutex;
#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    BitLayout, Error, Field, FieldOrder, FieldTable, FlakeId, FlakeParts, IdGenStatus,
    MonotonicClock, RandSource, Result, ThreadRandom, TimeSource,
};

/// Mutable generation state, only touched while the lock is held.
#[derive(Debug)]
struct State {
    last_tick: i64,
    sequence: i64,
}

/// A lock-based ID generator with a caller-defined bit layout.
///
/// One generator owns one node identifier. Every call to
/// [`LockFlakeGenerator::next_id`] runs entirely under a
/// [`parking_lot::Mutex`], including the spin that waits out an exhausted
/// sequence, so concurrent callers on the same generator are serialized.
/// Share it across threads with `&` or an [`Arc`](std::sync::Arc).
///
/// Different generators never synchronize with each other. Uniqueness across
/// a fleet relies on every generator using a distinct node identifier.
///
/// ## See Also
/// - [`Preset`](crate::Preset) for ready-made layouts.
pub struct LockFlakeGenerator<T = MonotonicClock, R = ThreadRandom>
where
    T: TimeSource,
    R: RandSource,
{
    table: FieldTable,
    node_id: i64,
    epoch_millis: i64,
    tick_millis: i64,
    state: Mutex<State>,
    time: T,
    rand: R,
}

impl LockFlakeGenerator {
    /// Creates a generator backed by a [`MonotonicClock`] anchored at
    /// `epoch_millis` (milliseconds since the Unix epoch) and a
    /// [`ThreadRandom`] source.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidTick`] if `tick_millis < 1`
    /// - [`Error::TiedRanks`] if two non-empty fields share a rank
    /// - [`Error::NodeOutOfRange`] if `node_id` does not fit the node field
    /// - [`Error::EpochInFuture`] if `epoch_millis` is later than now
    ///
    /// # Example
    ///
    /// ```
    /// use flakeid::{BitLayout, FieldOrder, LockFlakeGenerator, TWITTER_EPOCH};
    ///
    /// let generator = LockFlakeGenerator::new(
    ///     TWITTER_EPOCH,
    ///     1,
    ///     7,
    ///     BitLayout::new(0, 41, 10, 12).unwrap(),
    ///     FieldOrder::DESCENDING,
    /// )
    /// .unwrap();
    ///
    /// let first = generator.next_id();
    /// let second = generator.next_id();
    /// assert!(second > first);
    /// assert_eq!(generator.decompose(first).node, 7);
    /// ```
    pub fn new(
        epoch_millis: i64,
        tick_millis: i64,
        node_id: i64,
        layout: BitLayout,
        order: FieldOrder,
    ) -> Result<Self> {
        Self::with_sources(
            epoch_millis,
            tick_millis,
            node_id,
            layout,
            order,
            MonotonicClock::with_epoch(epoch_millis),
            ThreadRandom,
        )
    }
}

impl<T, R> LockFlakeGenerator<T, R>
where
    T: TimeSource,
    R: RandSource,
{
    /// Creates a generator with explicit time and random sources.
    ///
    /// `time` must count milliseconds from `epoch_millis`; the epoch is only
    /// kept to map ticks back to Unix time in
    /// [`LockFlakeGenerator::unix_millis_of`].
    ///
    /// # Errors
    ///
    /// Same as [`LockFlakeGenerator::new`]. [`Error::EpochInFuture`] is
    /// returned when `time` reports a negative value.
    pub fn with_sources(
        epoch_millis: i64,
        tick_millis: i64,
        node_id: i64,
        layout: BitLayout,
        order: FieldOrder,
        time: T,
        rand: R,
    ) -> Result<Self> {
        if tick_millis < 1 {
            return Err(Error::InvalidTick { tick_millis });
        }

        let table = FieldTable::derive(layout, order)?;

        let max = table.max_value(Field::Node);
        if !(0..=max).contains(&node_id) {
            return Err(Error::NodeOutOfRange { node_id, max });
        }

        if time.current_millis() < 0 {
            return Err(Error::EpochInFuture { epoch_millis });
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            ?layout,
            ?order,
            node_id,
            epoch_millis,
            tick_millis,
            "created id generator"
        );

        Ok(Self {
            table,
            node_id,
            epoch_millis,
            tick_millis,
            state: Mutex::new(State {
                // no tick observed yet
                last_tick: -1,
                sequence: 0,
            }),
            time,
            rand,
        })
    }

    /// Generates the next ID, blocking if necessary.
    ///
    /// Within one tick each call increments the sequence. When the sequence
    /// wraps, the caller spins (still holding the lock) until the clock moves
    /// to a later tick, so a duplicate is never produced for forward-moving
    /// time. There is no timeout.
    ///
    /// A clock that steps backward is treated like any other tick change: the
    /// sequence restarts at zero. A [`MonotonicClock`] never does this, but an
    /// injected wall clock might, and ids issued after such a step can repeat
    /// earlier ones.
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn next_id(&self) -> FlakeId {
        let mut state = self.state.lock();
        let mut tick = self.current_tick();

        if tick == state.last_tick {
            state.sequence = (state.sequence + 1) & self.table.max_value(Field::Sequence);
            if state.sequence == 0 {
                #[cfg(feature = "tracing")]
                tracing::trace!(tick, "sequence exhausted, waiting for next tick");
                while tick <= state.last_tick {
                    core::hint::spin_loop();
                    tick = self.current_tick();
                }
            }
        } else {
            if tick < state.last_tick {
                Self::cold_clock_behind(tick, state.last_tick);
            }
            state.sequence = 0;
        }

        state.last_tick = tick;
        self.compose(tick, state.sequence)
    }

    /// Attempts to generate the next ID without blocking.
    ///
    /// Returns [`IdGenStatus::Pending`] instead of spinning when the sequence
    /// for the current tick is used up; the generator state is left untouched
    /// in that case. Otherwise behaves like [`LockFlakeGenerator::next_id`].
    ///
    /// # Example
    /// ```
    /// use flakeid::{IdGenStatus, LockFlakeGenerator, TWITTER_EPOCH};
    ///
    /// let generator = LockFlakeGenerator::standard(TWITTER_EPOCH, 0).unwrap();
    ///
    /// let id = loop {
    ///     match generator.try_next_id() {
    ///         IdGenStatus::Ready { id } => break id,
    ///         IdGenStatus::Pending { .. } => std::thread::yield_now(),
    ///     }
    /// };
    /// assert!(id.to_raw() > 0);
    /// ```
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn try_next_id(&self) -> IdGenStatus {
        let mut state = self.state.lock();
        let tick = self.current_tick();

        if tick == state.last_tick {
            if state.sequence >= self.table.max_value(Field::Sequence) {
                return IdGenStatus::Pending {
                    yield_until: state.last_tick + 1,
                };
            }
            state.sequence += 1;
        } else {
            if tick < state.last_tick {
                Self::cold_clock_behind(tick, state.last_tick);
            }
            state.sequence = 0;
        }

        state.last_tick = tick;
        IdGenStatus::Ready {
            id: self.compose(tick, state.sequence),
        }
    }

    /// Splits an ID produced by this generator into its field values.
    pub fn decompose(&self, id: FlakeId) -> FlakeParts {
        self.table.extract(id.to_raw())
    }

    /// Unix time in milliseconds at the start of the tick encoded in `id`.
    ///
    /// Only meaningful while the tick still fits the time field.
    pub fn unix_millis_of(&self, id: FlakeId) -> i64 {
        let tick = self.decompose(id).tick;
        self.epoch_millis
            .saturating_add(tick.saturating_mul(self.tick_millis))
    }

    pub const fn node_id(&self) -> i64 {
        self.node_id
    }

    pub const fn epoch_millis(&self) -> i64 {
        self.epoch_millis
    }

    pub const fn tick_millis(&self) -> i64 {
        self.tick_millis
    }

    pub const fn table(&self) -> &FieldTable {
        &self.table
    }

    pub const fn layout(&self) -> BitLayout {
        self.table.layout()
    }

    pub const fn order(&self) -> FieldOrder {
        self.table.order()
    }

    fn current_tick(&self) -> i64 {
        self.time.current_millis().div_euclid(self.tick_millis)
    }

    fn compose(&self, tick: i64, sequence: i64) -> FlakeId {
        let random_max = self.table.max_value(Field::Random);
        let random = if random_max > 0 {
            // the mask keeps the draw uniform because the range is a power of two
            (self.rand.rand() & random_max.unsigned_abs()) as i64
        } else {
            0
        };

        #[cfg(feature = "tracing")]
        {
            if tick > self.table.max_value(Field::Time) {
                tracing::warn!(
                    tick,
                    max = self.table.max_value(Field::Time),
                    "tick exceeds the time field, ids wrap around"
                );
            }
        }

        FlakeId::from_raw(self.table.compose(&FlakeParts {
            random,
            tick,
            node: self.node_id,
            sequence,
        }))
    }

    #[cold]
    #[inline(never)]
    fn cold_clock_behind(_now: i64, _last: i64) {
        #[cfg(feature = "tracing")]
        tracing::warn!(
            now = _now,
            last = _last,
            "clock moved backward, sequence restarts"
        );
    }
}

impl<T, R> fmt::Debug for LockFlakeGenerator<T, R>
where
    T: TimeSource,
    R: RandSource,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LockFlakeGenerator")
            .field("table", &self.table)
            .field("node_id", &self.node_id)
            .field("epoch_millis", &self.epoch_millis)
            .field("tick_millis", &self.tick_millis)
            .field("state", &*self.state.lock())
            .finish_non_exhaustive()
    }
}
