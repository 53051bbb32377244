//! Time-ordered 64-bit shard IDs.
//!
//! A [`BigId`] packs a format version, a 40-bit millisecond timestamp
//! relative to a [`ClockBase`], an 8-bit shard ID and a 10-bit sequence into
//! one integer. IDs minted by generators with distinct shard IDs do not
//! collide, and IDs sort roughly by creation time.
//!
//! ```
//! use bigid::{BigIdGenerator, decode, parse};
//!
//! let generator = BigIdGenerator::new();
//! let id = generator.generate(7);
//!
//! let text = id.to_string();
//! assert_eq!(parse(&text).unwrap(), id);
//!
//! let fields = decode(id.to_u64());
//! assert_eq!(fields.shard_id, 7);
//! assert_eq!(fields.version, 1);
//! ```

mod decode;
mod error;
mod generator;
mod id;
#[cfg(feature = "serde")]
mod serde;
mod time;

pub use crate::decode::*;
pub use crate::error::*;
pub use crate::generator::*;
pub use crate::id::*;
#[cfg(feature = "serde")]
pub use crate::serde::*;
pub use crate::time::*;
