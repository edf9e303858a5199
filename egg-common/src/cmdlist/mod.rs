//! Command lists
//!
//! A command list is a resource holding a sequence of commands, each an
//! opcode byte followed by a payload. The payload length is implied by the
//! top three bits of the opcode:
//!
//! | `opcode & 0xe0` | Payload                         |
//! |-----------------|---------------------------------|
//! | `0x00`          | none                            |
//! | `0x20`          | 2 bytes                         |
//! | `0x40`          | 4 bytes                         |
//! | `0x60`          | 8 bytes                         |
//! | `0x80`          | 12 bytes                        |
//! | `0xa0`          | 16 bytes                        |
//! | `0xc0`          | 1 length byte, then that many   |
//! | `0xe0`          | reserved                        |
//!
//! Opcode `0x00` terminates the list.
//!
//! Opcode names come from the `CMD_<type>_*` namespace of the resource's
//! type. The text form is one command per line:
//!
//! ```text
//! # comment
//! sprite 0x0005 (u16)42 *
//! 0x21 @1,2
//! ```

mod args;
mod compiler;
mod decompiler;


pub use compiler::{CompileError, CompileErrorKind, Compiler, compile};
pub use decompiler::{DecompileError, Decompiler, decompile};

use egg_shared::CoreTid;

use crate::rom::Rom;

/// Largest payload a variable-length command can carry.
pub const MAX_VARIABLE_PAYLOAD: usize = 0xff;

/// Payload length class of an opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadClass {
    Fixed(usize),
    /// An 8-bit length precedes the payload
    Variable,
    Reserved,
}

impl PayloadClass {
    pub fn of(opcode: u8) -> Self {
        match opcode & 0xe0 {
            0x00 => PayloadClass::Fixed(0),
            0x20 => PayloadClass::Fixed(2),
            0x40 => PayloadClass::Fixed(4),
            0x60 => PayloadClass::Fixed(8),
            0x80 => PayloadClass::Fixed(12),
            0xa0 => PayloadClass::Fixed(16),
            0xc0 => PayloadClass::Variable,
            _ => PayloadClass::Reserved,
        }
    }
}

/// Name of a type, preferring the ROM's table and falling back to core names.
fn type_name(tid: u8, rom: Option<&Rom>) -> Option<&str> {
    rom.and_then(|r| r.type_name(tid))
        .or_else(|| CoreTid::from_tid(tid).map(CoreTid::name))
}
