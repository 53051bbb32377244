use core::num::{IntErrorKind, ParseIntError};

/// A result type whose error defaults to the crate-wide [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All errors that `bigid` can produce.
///
/// Generation and decoding are total, so the only runtime failures come from
/// interpreting text as an identifier, or from the strict generation path
/// refusing a shard ID that does not fit in its 8-bit field.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The input text is not a base-10 signed 64-bit integer.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// A strict constructor was given a shard ID wider than 8 bits.
    ///
    /// The lenient constructors never raise this; they mask the value to its
    /// low 8 bits instead.
    #[error("shard id {shard_id} does not fit in 8 bits (max {max})")]
    ShardOutOfRange {
        /// The rejected shard ID.
        shard_id: u64,
        /// The largest accepted shard ID.
        max: u64,
    },
}

/// The input text could not be read as a base-10 signed 64-bit integer.
///
/// Raised for empty input, non-digit characters, and magnitudes outside
/// `i64::MIN..=i64::MAX`. The offending text is kept for diagnostics.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("invalid id {input:?}: {source}")]
pub struct ParseError {
    input: String,
    #[source]
    source: ParseIntError,
}

impl ParseError {
    pub(crate) fn new(input: &str, source: ParseIntError) -> Self {
        Self {
            input: input.to_owned(),
            source,
        }
    }

    /// The text that failed to parse.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Why the text was rejected (empty, bad digit, or out of range).
    pub fn kind(&self) -> &IntErrorKind {
        self.source.kind()
    }
}
