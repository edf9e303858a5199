//! Egg ROM container (`.egg`)
//!
//! A ROM is a flat list of resources keyed by `(tid, rid)`. On disk the
//! identifiers are delta-coded against a running cursor and interleaved with
//! the payloads, so there is no separate table of contents.
//!
//! # File Structure
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │ Magic "\0ERM" (4 bytes)                              │
//! ├──────────────────────────────────────────────────────┤
//! │ 00dddddd                    tid += d, rid = 1        │
//! │ 01dddddd dddddddd           rid += d                 │
//! │ 10llllll llllllll           resource, len = l + 1    │
//! │ 11llllll llllllll llllllll  resource, len = l + 16385│
//! │ ...payload follows each length, then rid += 1        │
//! ├──────────────────────────────────────────────────────┤
//! │ 0x00 terminator                                      │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! The cursor starts at `(1, 1)`. Zero-length resources are never stored.

mod model;
mod reader;
mod validate;
mod writer;

#[cfg(test)]
mod tests;

pub use model::{Resource, Rom};
pub use reader::{RomEntry, RomReader};
pub use writer::RomWriter;

use thiserror::Error;

/// Errors from the resource model and the ROM codec.
#[derive(Debug, Error)]
pub enum RomError {
    #[error("type id {0} out of range (1..=255)")]
    InvalidTid(u32),

    #[error("resource id {0} out of range (1..=65535)")]
    InvalidRid(u32),

    #[error("inserting {tid}:{rid} at index {index} would break resource order")]
    MisplacedInsert { index: usize, tid: u8, rid: u16 },

    #[error("no custom type ids left for {0:?} (16..=127 exhausted)")]
    CustomTypesExhausted(String),

    #[error("resource {tid}:{rid} is {len} bytes, limit is {limit}")]
    ResourceTooLarge {
        tid: u8,
        rid: u16,
        len: usize,
        limit: usize,
    },

    #[error("resource {tid}:{rid} out of order")]
    OutOfOrder { tid: u8, rid: u16 },

    #[error("duplicate resource {tid}:{rid}")]
    DuplicateResource { tid: u8, rid: u16 },

    #[error("{name} resource must use rid 1, found {rid}")]
    SingletonRid { name: &'static str, rid: u16 },

    #[error("invalid ROM signature")]
    BadMagic,

    #[error("ROM truncated at offset {0}")]
    Truncated(usize),

    #[error("malformed TOC entry at offset {0}")]
    Malformed(usize),

    #[error("identifier overflow at offset {offset} (tid {tid}, rid {rid})")]
    IdOverflow { offset: usize, tid: u32, rid: u32 },

    #[error("I/O error writing ROM")]
    Io(#[from] std::io::Error),
}
