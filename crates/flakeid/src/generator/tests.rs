use std::cell::Cell;
use std::collections::HashSet;
use std::rc::Rc;
use std::sync::Arc;
use std::thread::scope;
use std::time::{Duration, Instant};

use crate::{
    BitLayout, Error, Field, FieldOrder, FlakeId, IdGenStatus, LockFlakeGenerator, Preset,
    RandSource, TWITTER_EPOCH, ThreadRandom, TimeSource,
};

struct MockTime {
    millis: i64,
}

impl TimeSource for MockTime {
    fn current_millis(&self) -> i64 {
        self.millis
    }
}

#[derive(Clone)]
struct SharedMockTime {
    millis: Rc<Cell<i64>>,
}

impl SharedMockTime {
    fn new(millis: i64) -> Self {
        Self {
            millis: Rc::new(Cell::new(millis)),
        }
    }

    fn set(&self, millis: i64) {
        self.millis.set(millis);
    }
}

impl TimeSource for SharedMockTime {
    fn current_millis(&self) -> i64 {
        self.millis.get()
    }
}

/// Advances by one millisecond every `reads_per_milli` reads.
struct AdvancingTime {
    start: i64,
    reads: Cell<i64>,
    reads_per_milli: i64,
}

impl TimeSource for AdvancingTime {
    fn current_millis(&self) -> i64 {
        let reads = self.reads.get();
        self.reads.set(reads + 1);
        self.start + reads / self.reads_per_milli
    }
}

struct FixedRand(u64);

impl RandSource for FixedRand {
    fn rand(&self) -> u64 {
        self.0
    }
}

trait IdGenStatusExt {
    fn unwrap_ready(self) -> FlakeId;
    fn unwrap_pending(self) -> i64;
}

impl IdGenStatusExt for IdGenStatus {
    fn unwrap_ready(self) -> FlakeId {
        match self {
            Self::Ready { id } => id,
            Self::Pending { yield_until } => {
                panic!("unexpected pending (yield until: {yield_until})")
            }
        }
    }

    fn unwrap_pending(self) -> i64 {
        match self {
            Self::Ready { id } => panic!("unexpected ready ({id})"),
            Self::Pending { yield_until } => yield_until,
        }
    }
}

fn mock_generator<T: TimeSource>(
    preset: Preset,
    node_id: i64,
    time: T,
) -> LockFlakeGenerator<T, ThreadRandom> {
    LockFlakeGenerator::with_sources(
        0,
        preset.tick_millis(),
        node_id,
        preset.layout(),
        preset.order(),
        time,
        ThreadRandom,
    )
    .unwrap()
}

/// Minimal Twitter Snowflake: 41-bit ms time, 10-bit node, 12-bit sequence.
struct ReferenceSnowflake {
    node: i64,
    time: i64,
    step: i64,
}

impl ReferenceSnowflake {
    fn generate(&mut self, now: i64) -> i64 {
        if now == self.time {
            self.step = (self.step + 1) & 0xfff;
            assert_ne!(self.step, 0, "reference cannot wait in this test");
        } else {
            self.step = 0;
        }
        self.time = now;
        (now << 22) | (self.node << 12) | self.step
    }
}

#[test]
fn sequence_increments_within_same_tick() {
    let generator = mock_generator(Preset::Standard, 1, MockTime { millis: 42 });

    let id1 = generator.next_id();
    let id2 = generator.next_id();
    let id3 = generator.next_id();

    for (i, id) in [id1, id2, id3].into_iter().enumerate() {
        let parts = generator.decompose(id);
        assert_eq!(parts.tick, 42);
        assert_eq!(parts.node, 1);
        assert_eq!(parts.random, 0);
        assert_eq!(parts.sequence, i as i64);
    }
    assert!(id1 < id2 && id2 < id3);
}

#[test]
fn standard_preset_known_value() {
    let generator = mock_generator(Preset::Standard, 1, MockTime { millis: 1_000 });
    assert_eq!(generator.next_id().to_raw(), (1_000 << 22) | (1 << 12));
}

#[test]
fn tick_duration_divides_elapsed_millis() {
    let generator = mock_generator(Preset::WideNode, 3, MockTime { millis: 12_345 });
    let parts = generator.decompose(generator.next_id());
    assert_eq!(parts.tick, 1_234);
    assert_eq!(parts.node, 3);
}

#[test]
fn sequence_resets_on_new_tick() {
    let time = SharedMockTime::new(42);
    let generator = mock_generator(Preset::Standard, 1, time.clone());

    let first = generator.next_id();
    generator.next_id();
    time.set(43);
    let later = generator.next_id();

    let parts = generator.decompose(later);
    assert_eq!(parts.tick, 43);
    assert_eq!(parts.sequence, 0);
    assert!(parts.tick > generator.decompose(first).tick);
    assert!(later > first);
}

#[test]
fn exhausted_sequence_waits_for_next_tick() {
    // two sequence bits: four ids per tick
    let layout = BitLayout::new(0, 20, 2, 2).unwrap();
    let time = AdvancingTime {
        start: 500,
        reads: Cell::new(0),
        reads_per_milli: 100,
    };
    let generator = LockFlakeGenerator::with_sources(
        0,
        1,
        2,
        layout,
        FieldOrder::DESCENDING,
        time,
        ThreadRandom,
    )
    .unwrap();

    let ids: Vec<_> = (0..5).map(|_| generator.next_id()).collect();
    let parts: Vec<_> = ids.iter().map(|id| generator.decompose(*id)).collect();

    for (i, part) in parts[..4].iter().enumerate() {
        assert_eq!(part.tick, 500);
        assert_eq!(part.sequence, i as i64);
    }
    assert_eq!(parts[4].tick, 501);
    assert_eq!(parts[4].sequence, 0);
    assert!(ids.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn empty_sequence_field_yields_one_id_per_tick() {
    let layout = BitLayout::new(0, 20, 4, 0).unwrap();
    let time = AdvancingTime {
        start: 0,
        reads: Cell::new(0),
        reads_per_milli: 10,
    };
    let generator = LockFlakeGenerator::with_sources(
        0,
        1,
        9,
        layout,
        FieldOrder::DESCENDING,
        time,
        ThreadRandom,
    )
    .unwrap();

    let ticks: Vec<_> = (0..5)
        .map(|_| generator.decompose(generator.next_id()).tick)
        .collect();
    assert!(ticks.windows(2).all(|w| w[0] < w[1]), "{ticks:?}");
}

#[test]
fn try_next_id_returns_pending_when_exhausted() {
    let time = SharedMockTime::new(7);
    let generator = mock_generator(Preset::Compact, 0, time.clone());
    // compact ticks are seconds
    time.set(7_000);

    for i in 0..4 {
        let id = generator.try_next_id().unwrap_ready();
        assert_eq!(generator.decompose(id).sequence, i);
    }
    assert_eq!(generator.try_next_id().unwrap_pending(), 8);
    // pending does not consume anything
    assert_eq!(generator.try_next_id().unwrap_pending(), 8);

    time.set(8_000);
    let id = generator.try_next_id().unwrap_ready();
    let parts = generator.decompose(id);
    assert_eq!(parts.tick, 8);
    assert_eq!(parts.sequence, 0);
}

#[test]
fn backward_clock_restarts_sequence() {
    let time = SharedMockTime::new(50);
    let generator = mock_generator(Preset::Standard, 0, time.clone());

    generator.next_id();
    generator.next_id();
    time.set(40);
    let parts = generator.decompose(generator.next_id());

    assert_eq!(parts.tick, 40);
    assert_eq!(parts.sequence, 0);
}

#[test]
fn matches_reference_twitter_snowflake() {
    let time = SharedMockTime::new(0);
    let generator = mock_generator(Preset::Standard, 1, time.clone());
    let mut reference = ReferenceSnowflake {
        node: 1,
        time: -1,
        step: 0,
    };

    for now in [100, 100, 100, 101, 101, 105, 105, 105, 105, 2_000_000_000_000] {
        time.set(now);
        assert_eq!(generator.next_id().to_raw(), reference.generate(now), "at {now}");
    }
}

#[test]
fn sequence_ranked_above_node_is_shifted() {
    // time | sequence | node
    let layout = BitLayout::new(0, 40, 8, 12).unwrap();
    let order = FieldOrder::new(0, 3, 1, 2).unwrap();
    let generator = LockFlakeGenerator::with_sources(
        0,
        1,
        0xab,
        layout,
        order,
        MockTime { millis: 9 },
        ThreadRandom,
    )
    .unwrap();

    generator.next_id();
    let id = generator.next_id();

    assert_eq!(id.to_raw(), (9 << 20) | (1 << 8) | 0xab);
    let parts = generator.decompose(id);
    assert_eq!(parts.sequence, 1);
    assert_eq!(parts.node, 0xab);
}

#[test]
fn random_field_is_masked_to_width() {
    let layout = BitLayout::new(4, 30, 2, 2).unwrap();
    let generator = LockFlakeGenerator::with_sources(
        0,
        1,
        1,
        layout,
        FieldOrder::DESCENDING,
        MockTime { millis: 5 },
        FixedRand(u64::MAX),
    )
    .unwrap();

    let id = generator.next_id();
    let parts = generator.decompose(id);
    assert_eq!(parts.random, 0xf);
    assert_eq!(parts.tick, 5);
    assert_eq!(id.to_raw() >> 34, 0xf);
    assert!(id.to_raw() > 0);
}

#[test]
fn thread_random_stays_in_range() {
    let layout = BitLayout::new(8, 30, 2, 2).unwrap();
    let generator = LockFlakeGenerator::with_sources(
        0,
        1,
        0,
        layout,
        FieldOrder::new(0, 3, 2, 1).unwrap(),
        MockTime { millis: 1 },
        ThreadRandom,
    )
    .unwrap();

    for _ in 0..4 {
        let parts = generator.decompose(generator.next_id());
        assert!((0..=0xff).contains(&parts.random));
        assert_eq!(parts.tick, 1);
    }
}

#[test]
fn tick_wraps_inside_time_field() {
    let layout = BitLayout::new(0, 4, 2, 2).unwrap();
    let generator = LockFlakeGenerator::with_sources(
        0,
        1,
        3,
        layout,
        FieldOrder::DESCENDING,
        MockTime { millis: 0x13 },
        ThreadRandom,
    )
    .unwrap();

    let parts = generator.decompose(generator.next_id());
    assert_eq!(parts.tick, 0x3);
    assert_eq!(parts.node, 3);
}

#[test]
fn unix_millis_of_recovers_tick_start() {
    let generator = mock_generator(Preset::WideNode, 0, MockTime { millis: 12_345 });
    let id = generator.next_id();
    assert_eq!(generator.unix_millis_of(id), 12_340);
}

#[test]
fn constructor_rejects_bad_configuration() {
    let layout = Preset::Standard.layout();
    let order = FieldOrder::DESCENDING;

    assert_eq!(
        LockFlakeGenerator::new(TWITTER_EPOCH, 1, 1_024, layout, order).unwrap_err(),
        Error::NodeOutOfRange {
            node_id: 1_024,
            max: 1_023
        }
    );
    assert_eq!(
        LockFlakeGenerator::new(TWITTER_EPOCH, 1, -1, layout, order).unwrap_err(),
        Error::NodeOutOfRange {
            node_id: -1,
            max: 1_023
        }
    );
    assert_eq!(
        LockFlakeGenerator::new(TWITTER_EPOCH, 0, 0, layout, order).unwrap_err(),
        Error::InvalidTick { tick_millis: 0 }
    );
    assert_eq!(
        LockFlakeGenerator::new(TWITTER_EPOCH, 1, 0, layout, FieldOrder::new(3, 1, 1, 0).unwrap())
            .unwrap_err(),
        Error::TiedRanks {
            first: Field::Time,
            second: Field::Node
        }
    );

    let far_future = crate::time::unix_millis_now() + 3_600_000;
    assert_eq!(
        LockFlakeGenerator::new(far_future, 1, 0, layout, order).unwrap_err(),
        Error::EpochInFuture {
            epoch_millis: far_future
        }
    );
}

#[test]
fn layout_width_bounds_rejected() {
    assert!(matches!(
        BitLayout::new(0, 2, 1, 1),
        Err(Error::InvalidLayout { total: 4 })
    ));
    assert!(matches!(
        BitLayout::new(0, 42, 10, 12),
        Err(Error::InvalidLayout { total: 64 })
    ));
}

#[test]
fn monotonic_clock_ids_strictly_increase() {
    const TOTAL_IDS: usize = 4096 * 64;

    let generator = LockFlakeGenerator::standard(TWITTER_EPOCH, 1).unwrap();
    let mut last = generator.next_id();
    for _ in 1..TOTAL_IDS {
        let id = generator.next_id();
        assert!(id > last, "{id:?} <= {last:?}");
        assert_eq!(generator.decompose(id).node, 1);
        last = id;
    }
}

#[test]
fn threaded_ids_are_unique() {
    const THREADS: usize = 8;
    const TOTAL_IDS: usize = 4096 * 64;
    const IDS_PER_THREAD: usize = TOTAL_IDS / THREADS;

    let generator = Arc::new(LockFlakeGenerator::standard(TWITTER_EPOCH, 0).unwrap());

    let per_thread: Vec<Vec<FlakeId>> = scope(|s| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let generator = Arc::clone(&generator);
                s.spawn(move || {
                    (0..IDS_PER_THREAD)
                        .map(|_| generator.next_id())
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let mut seen = HashSet::with_capacity(TOTAL_IDS);
    for ids in per_thread {
        // each thread observes its own ids in increasing order
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
        for id in ids {
            assert!(seen.insert(id), "duplicate {id:?}");
        }
    }
    assert_eq!(seen.len(), TOTAL_IDS, "Expected {TOTAL_IDS} unique IDs");
}

#[test]
fn compact_preset_throughput_bound() {
    let generator = LockFlakeGenerator::compact(TWITTER_EPOCH, 1).unwrap();

    let start = Instant::now();
    let ticks: Vec<_> = (0..16)
        .map(|_| generator.decompose(generator.next_id()).tick)
        .collect();
    let elapsed = start.elapsed();

    // four ids per second: sixteen ids span four one-second ticks, so the
    // caller waits out at least two full tick boundaries after the first
    let span = ticks[15] - ticks[0];
    assert!((3..=4).contains(&span), "{ticks:?}");
    assert!(elapsed >= Duration::from_secs(2), "{elapsed:?}");
    assert!(elapsed < Duration::from_secs(4), "{elapsed:?}");
}
