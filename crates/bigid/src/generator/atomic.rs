use portable_atomic::{AtomicU64, Ordering};
#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    decode::DecodedFields,
    error::Result,
    id::{BigId, check_shard_id},
    time::{ClockBase, MonotonicClock, TimeSource},
};

/// A lock-free [`BigId`] generator.
///
/// The only mutable state is a sequence counter held in an [`AtomicU64`].
/// Each call to [`BigIdGenerator::generate`] performs one atomic
/// increment-and-fetch, reads the clock, and packs the result; nothing
/// blocks, so a single generator can be shared freely across threads
/// (behind an `Arc` or a `&`).
///
/// ## Sequence policy
///
/// The counter is never reset. Only its low 10 bits are encoded, so the
/// encoded sequence wraps silently from 1023 to 0. There is no per-millisecond
/// reset and no wait for the clock to advance: a single shard minting more
/// than 1024 IDs within one millisecond produces duplicates, and those are
/// not detected.
///
/// ## Shard policy
///
/// [`BigIdGenerator::generate`] masks the shard ID to its low 8 bits.
/// [`BigIdGenerator::try_generate`] rejects shard IDs above 255 instead.
///
/// Distinct generators must use distinct shard IDs (or distinct clock
/// bases) to avoid collisions; nothing here can check that.
///
/// # Example
///
/// ```
/// use bigid::BigIdGenerator;
///
/// let generator = BigIdGenerator::new();
/// let id = generator.generate(7);
/// assert_eq!(id.version(), 1);
/// assert_eq!(id.shard_id(), 7);
/// assert_eq!(id.sequence(), 1);
/// ```
pub struct BigIdGenerator<T = MonotonicClock>
where
    T: TimeSource,
{
    #[cfg(feature = "cache-padded")]
    sequence: crossbeam_utils::CachePadded<AtomicU64>,
    #[cfg(not(feature = "cache-padded"))]
    sequence: AtomicU64,
    time: T,
}

impl BigIdGenerator<MonotonicClock> {
    /// A generator measuring time from the default [`ClockBase`].
    pub fn new() -> Self {
        Self::with_base(ClockBase::default())
    }

    /// A generator measuring time from `base` with a [`MonotonicClock`].
    pub fn with_base(base: ClockBase) -> Self {
        Self::with_time(MonotonicClock::with_base(base))
    }
}

impl Default for BigIdGenerator<MonotonicClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> BigIdGenerator<T>
where
    T: TimeSource,
{
    /// A generator reading time from `time`, with the counter at zero.
    pub fn with_time(time: T) -> Self {
        Self::from_sequence(0, time)
    }

    /// A generator whose counter starts at `sequence`.
    ///
    /// The next generated ID carries `sequence + 1` (mod 1024). This is mostly
    /// useful for exercising the wrap-around.
    pub fn from_sequence(sequence: u64, time: T) -> Self {
        Self {
            #[cfg(feature = "cache-padded")]
            sequence: crossbeam_utils::CachePadded::new(AtomicU64::new(sequence)),
            #[cfg(not(feature = "cache-padded"))]
            sequence: AtomicU64::new(sequence),
            time,
        }
    }

    /// Generates a new ID for `shard_id`.
    ///
    /// Always succeeds. The counter is incremented before the clock is read,
    /// the shard ID is masked to 8 bits, and the timestamp to 40 bits.
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn generate(&self, shard_id: u64) -> BigId {
        let sequence = self.next_sequence();
        let timestamp = self.time.current_millis();
        BigId::from_components(BigId::VERSION, 0, timestamp, shard_id, sequence)
    }

    /// Like [`BigIdGenerator::generate`], but fails instead of truncating a
    /// shard ID that does not fit in 8 bits.
    ///
    /// A rejected call does not advance the counter.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::ShardOutOfRange`] if `shard_id > 255`.
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn try_generate(&self, shard_id: u64) -> Result<BigId> {
        check_shard_id(shard_id)?;
        Ok(self.generate(shard_id))
    }

    /// Decodes `id` against this generator's clock base.
    pub fn decode(&self, id: BigId) -> DecodedFields {
        DecodedFields::new(id, &self.time.base())
    }

    /// The raw counter value: the number of IDs generated so far, plus the
    /// starting value. Not masked.
    pub fn sequence(&self) -> u64 {
        self.sequence.load(Ordering::Relaxed)
    }

    pub fn time(&self) -> &T {
        &self.time
    }

    fn next_sequence(&self) -> u64 {
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed).wrapping_add(1);
        #[cfg(feature = "tracing")]
        {
            if sequence & BigId::SEQUENCE_MASK == 0 {
                tracing::trace!(sequence, "sequence wrapped");
            }
        }
        sequence
    }
}
