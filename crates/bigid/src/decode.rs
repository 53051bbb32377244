use crate::{BigId, ClockBase};

/// The logical fields of a [`BigId`] plus its reconstructed creation time.
///
/// With the `serde` feature this serializes with the keys `version`,
/// `reserved`, `timestamp`, `vsid`, `auto_inc_seq` and `create_time`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DecodedFields {
    pub version: u64,
    pub reserved: u64,
    /// Milliseconds since the clock base.
    pub timestamp: u64,
    #[cfg_attr(feature = "serde", serde(rename = "vsid"))]
    pub shard_id: u64,
    #[cfg_attr(feature = "serde", serde(rename = "auto_inc_seq"))]
    pub sequence: u64,
    /// `base + timestamp` in RFC 3339, e.g. `2015-06-06T00:00:01.5Z`.
    /// Empty only if the instant is outside chrono's date range.
    pub create_time: String,
}

impl DecodedFields {
    pub fn new(id: BigId, base: &ClockBase) -> Self {
        let timestamp = id.timestamp();
        Self {
            version: id.version(),
            reserved: id.reserved(),
            timestamp,
            shard_id: id.shard_id(),
            sequence: id.sequence(),
            create_time: base
                .at(timestamp)
                .map(|instant| ClockBase::format(&instant))
                .unwrap_or_default(),
        }
    }

    /// Packs the five numeric fields back into an ID. `create_time` is not
    /// consulted.
    pub fn to_id(&self) -> BigId {
        BigId::from_components(
            self.version,
            self.reserved,
            self.timestamp,
            self.shard_id,
            self.sequence,
        )
    }
}

/// Decodes any 64-bit value against the default [`ClockBase`].
///
/// Every bit pattern decodes; values that were not produced by a generator
/// simply yield meaningless fields.
///
/// # Example
///
/// ```
/// use bigid::{decode, placeholder};
///
/// let fields = decode(placeholder(42).to_u64());
/// assert_eq!(fields.shard_id, 42);
/// assert_eq!((fields.version, fields.timestamp, fields.sequence), (0, 0, 0));
/// ```
pub fn decode(id: u64) -> DecodedFields {
    decode_with_base(id, &ClockBase::default())
}

/// Decodes any 64-bit value against `base`.
pub fn decode_with_base(id: u64, base: &ClockBase) -> DecodedFields {
    DecodedFields::new(BigId::from_u64(id), base)
}
