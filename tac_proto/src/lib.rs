//! Wire layer for the incremental state-synchronization stream.
//!
//! One message arrives per network tick:
//!
//! ```text
//! [timestamp: u64 LE]
//! repeated until buffer end:
//!     [unit id: u32 LE] [field tag: u8] [value: per-tag encoding]
//! ```
//!
//! The layout is self-describing only in the sense that every tag has a
//! fixed or length-prefixed value encoding; there is no checksum, no
//! per-unit terminator and no version field. Encoder and decoder stay in
//! lockstep through [`FieldTag`], the single source of truth for the layout.

mod cursor;
mod fields;
mod writer;

pub use cursor::ByteCursor;
pub use fields::{decode_field, FieldTag};
pub use writer::UpdateWriter;

use thiserror::Error;

/// Errors raised while decoding an update buffer.
///
/// None of these are fatal to the client: a truncated or malformed buffer
/// costs at most the remainder of one tick, and the next tick resynchronizes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// A read would run past the end of the buffer. Treated as "wait for the
    /// next tick", never as a hard failure.
    #[error("buffer underrun: needed {needed} bytes, {remaining} remaining")]
    BufferUnderrun { needed: usize, remaining: usize },
    #[error("unknown field tag {0:#04x}")]
    UnknownTag(u8),
    #[error("field tag {tag:?} is not valid for category {category:?}")]
    TagCategoryMismatch {
        tag: FieldTag,
        category: tac_schema::UnitCategory,
    },
    #[error("unknown unit category {0:?}")]
    UnknownCategory(String),
    #[error("invalid wire value {value} for {field}")]
    InvalidEnum { field: &'static str, value: u8 },
    #[error("string field is not valid UTF-8")]
    MalformedString,
}
