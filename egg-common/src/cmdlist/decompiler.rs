//! Command-list decompiler
//!
//! Emits one line per command: the opcode's schema name (or `0xNN`),
//! followed by the payload as a single hex dump. The output compiles back to
//! the same bytes.

use std::fmt::Write;

use thiserror::Error;

use super::{PayloadClass, type_name};
use crate::namespace::{Namespace, NamespaceError, Registry};
use crate::rom::Rom;

#[derive(Debug, Error)]
pub enum DecompileError {
    #[error(transparent)]
    Schema(#[from] NamespaceError),

    #[error("command 0x{opcode:02x} at offset {offset} runs past the end of the list")]
    Truncated { offset: usize, opcode: u8 },

    #[error("reserved opcode 0x{opcode:02x} at offset {offset}")]
    ReservedOpcode { offset: usize, opcode: u8 },
}

pub struct Decompiler<'a> {
    schema: Option<&'a Namespace>,
}

impl<'a> Decompiler<'a> {
    pub fn new(registry: &'a Registry, tid: u8, rom: Option<&'a Rom>) -> Self {
        Self {
            schema: registry.command_schema(tid, type_name(tid, rom)),
        }
    }

    pub fn decompile(&self, src: &[u8]) -> Result<String, DecompileError> {
        let mut text = String::new();
        let mut pos = 0;
        while let Some(&opcode) = src.get(pos) {
            if opcode == 0 {
                break;
            }
            let offset = pos;
            pos += 1;

            let len = match PayloadClass::of(opcode) {
                PayloadClass::Fixed(n) => n,
                PayloadClass::Variable => {
                    let n = *src
                        .get(pos)
                        .ok_or(DecompileError::Truncated { offset, opcode })?
                        as usize;
                    pos += 1;
                    n
                }
                PayloadClass::Reserved => {
                    return Err(DecompileError::ReservedOpcode { offset, opcode });
                }
            };
            let payload = src
                .get(pos..pos + len)
                .ok_or(DecompileError::Truncated { offset, opcode })?;
            pos += len;

            match self.schema.and_then(|s| s.name_of(opcode as u32)) {
                Some(name) => text.push_str(name),
                None => {
                    let _ = write!(text, "0x{:02x}", opcode);
                }
            }
            if !payload.is_empty() {
                text.push_str(" 0x");
                text.push_str(&hex::encode(payload));
            }
            text.push('\n');
        }
        Ok(text)
    }
}

/// Decompile a command list of type `tid`, loading the schema first.
pub fn decompile(
    src: &[u8],
    tid: u8,
    registry: &mut Registry,
    rom: Option<&Rom>,
) -> Result<String, DecompileError> {
    registry.require()?;
    Decompiler::new(registry, tid, rom).decompile(src)
}
