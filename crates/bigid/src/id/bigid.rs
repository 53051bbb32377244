//! # The 64-bit shard ID layout
//!
//! Field layout, from least to most significant bit:
//!
//! ```text
//!  63 62 61    58 57                                18 17      10 9        0
//! +-----+--------+------------------------------------+----------+----------+
//! | ver |  rsvd  |         timestamp (40 bits)        | shard id | sequence |
//! +-----+--------+------------------------------------+----------+----------+
//! ```
//!
//! - `sequence`: 10 bits, wraps at 1024
//! - `shard_id`: 8 bits, 0..=255
//! - `timestamp`: 40 bits of milliseconds since the clock base
//! - `reserved`: 4 bits, always 0 in the current encoding
//! - `version`: 2 bits, currently 1
//!
//! Every 64-bit pattern is a valid (if not necessarily meaningful) encoding,
//! so every accessor here is total.
//!
//! The 40-bit timestamp runs out roughly 34.8 years after the clock base.
//! Values past that point wrap, and the layout is not widened because
//! persisted IDs depend on it.

use core::fmt;

use chrono::{DateTime, FixedOffset};

use crate::{
    error::{Error, Result},
    time::ClockBase,
};

/// A time-ordered 64-bit identifier carrying a shard ID, a millisecond
/// timestamp and a local sequence number.
///
/// The value is stored as a signed 64-bit integer because that is how it is
/// rendered and parsed as text; the bit layout is read through the unsigned
/// view returned by [`BigId::to_u64`].
///
/// # Example
///
/// ```
/// use bigid::BigId;
///
/// let id = BigId::from_components(1, 0, 1000, 7, 1);
/// assert_eq!(id.version(), 1);
/// assert_eq!(id.timestamp(), 1000);
/// assert_eq!(id.shard_id(), 7);
/// assert_eq!(id.sequence(), 1);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct BigId {
    id: i64,
}

impl BigId {
    pub const SEQUENCE_BITS: u64 = 10;
    pub const SHARD_ID_BITS: u64 = 8;
    pub const TIMESTAMP_BITS: u64 = 40;
    pub const RESERVED_BITS: u64 = 4;
    pub const VERSION_BITS: u64 = 2;

    pub const SEQUENCE_SHIFT: u64 = 0;
    pub const SHARD_ID_SHIFT: u64 = Self::SEQUENCE_SHIFT + Self::SEQUENCE_BITS;
    pub const TIMESTAMP_SHIFT: u64 = Self::SHARD_ID_SHIFT + Self::SHARD_ID_BITS;
    pub const RESERVED_SHIFT: u64 = Self::TIMESTAMP_SHIFT + Self::TIMESTAMP_BITS;
    pub const VERSION_SHIFT: u64 = Self::RESERVED_SHIFT + Self::RESERVED_BITS;

    pub const SEQUENCE_MASK: u64 = (1 << Self::SEQUENCE_BITS) - 1;
    pub const SHARD_ID_MASK: u64 = (1 << Self::SHARD_ID_BITS) - 1;
    pub const TIMESTAMP_MASK: u64 = (1 << Self::TIMESTAMP_BITS) - 1;
    pub const RESERVED_MASK: u64 = (1 << Self::RESERVED_BITS) - 1;
    pub const VERSION_MASK: u64 = (1 << Self::VERSION_BITS) - 1;

    /// Format version written by the generator.
    pub const VERSION: u64 = 1;

    /// Largest shard ID that survives encoding unchanged.
    pub const MAX_SHARD_ID: u64 = Self::SHARD_ID_MASK;

    /// Builds an ID from its five fields.
    ///
    /// Each field is masked to its width, so out-of-range inputs are
    /// truncated rather than rejected. This matters most for `shard_id`:
    /// a value of 300 is stored as `300 & 0xFF == 44`.
    pub const fn from_components(
        version: u64,
        reserved: u64,
        timestamp: u64,
        shard_id: u64,
        sequence: u64,
    ) -> Self {
        let raw = ((version & Self::VERSION_MASK) << Self::VERSION_SHIFT)
            | ((reserved & Self::RESERVED_MASK) << Self::RESERVED_SHIFT)
            | ((timestamp & Self::TIMESTAMP_MASK) << Self::TIMESTAMP_SHIFT)
            | ((shard_id & Self::SHARD_ID_MASK) << Self::SHARD_ID_SHIFT)
            | ((sequence & Self::SEQUENCE_MASK) << Self::SEQUENCE_SHIFT);
        Self::from_u64(raw)
    }

    /// A shard-only sentinel: the shard ID in its field, zeros elsewhere
    /// (including the version bits).
    ///
    /// Reads no clock and touches no sequence counter. Shard IDs above 255
    /// are truncated to their low 8 bits.
    pub const fn placeholder(shard_id: u64) -> Self {
        Self::from_components(0, 0, 0, shard_id, 0)
    }

    /// Like [`BigId::placeholder`], but rejects shard IDs above
    /// [`BigId::MAX_SHARD_ID`] instead of truncating them.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ShardOutOfRange`] if `shard_id` does not fit in 8 bits.
    pub fn try_placeholder(shard_id: u64) -> Result<Self> {
        check_shard_id(shard_id)?;
        Ok(Self::placeholder(shard_id))
    }

    pub const fn from_raw(id: i64) -> Self {
        Self { id }
    }

    pub const fn to_raw(self) -> i64 {
        self.id
    }

    pub const fn from_u64(raw: u64) -> Self {
        Self { id: raw as i64 }
    }

    pub const fn to_u64(self) -> u64 {
        self.id as u64
    }

    pub const fn version(self) -> u64 {
        (self.to_u64() >> Self::VERSION_SHIFT) & Self::VERSION_MASK
    }

    pub const fn reserved(self) -> u64 {
        (self.to_u64() >> Self::RESERVED_SHIFT) & Self::RESERVED_MASK
    }

    /// Milliseconds since the clock base the ID was generated against.
    pub const fn timestamp(self) -> u64 {
        (self.to_u64() >> Self::TIMESTAMP_SHIFT) & Self::TIMESTAMP_MASK
    }

    pub const fn shard_id(self) -> u64 {
        extract_shard_id(self.to_u64())
    }

    pub const fn sequence(self) -> u64 {
        (self.to_u64() >> Self::SEQUENCE_SHIFT) & Self::SEQUENCE_MASK
    }

    /// The creation instant, given the base the ID was generated against.
    pub fn created_at(self, base: &ClockBase) -> Option<DateTime<FixedOffset>> {
        base.at(self.timestamp())
    }
}

// The five fields must tile all 64 bits.
const _: () = assert!(BigId::VERSION_SHIFT + BigId::VERSION_BITS == u64::BITS as u64);

/// Isolates the shard ID field (bits 10..=17) of any 64-bit value.
pub const fn extract_shard_id(id: u64) -> u64 {
    (id >> BigId::SHARD_ID_SHIFT) & BigId::SHARD_ID_MASK
}

/// See [`BigId::placeholder`].
pub const fn placeholder(shard_id: u64) -> BigId {
    BigId::placeholder(shard_id)
}

pub(crate) fn check_shard_id(shard_id: u64) -> Result<()> {
    if shard_id > BigId::MAX_SHARD_ID {
        #[cfg(feature = "tracing")]
        tracing::warn!(shard_id, max = BigId::MAX_SHARD_ID, "rejecting shard id");
        return Err(Error::ShardOutOfRange {
            shard_id,
            max: BigId::MAX_SHARD_ID,
        });
    }
    Ok(())
}

impl From<i64> for BigId {
    fn from(id: i64) -> Self {
        Self::from_raw(id)
    }
}

impl From<BigId> for i64 {
    fn from(id: BigId) -> Self {
        id.to_raw()
    }
}

impl From<u64> for BigId {
    fn from(raw: u64) -> Self {
        Self::from_u64(raw)
    }
}

impl From<BigId> for u64 {
    fn from(id: BigId) -> Self {
        id.to_u64()
    }
}

impl fmt::Debug for BigId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BigId")
            .field("id", &self.id)
            .field("version", &self.version())
            .field("reserved", &self.reserved())
            .field("timestamp", &self.timestamp())
            .field("shard_id", &self.shard_id())
            .field("sequence", &self.sequence())
            .finish()
    }
}
