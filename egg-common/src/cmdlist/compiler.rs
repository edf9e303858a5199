//! Command-list compiler
//!
//! Turns the line-oriented text form into opcode and payload bytes.

use thiserror::Error;

use super::args::tokenize;
use super::{MAX_VARIABLE_PAYLOAD, PayloadClass, type_name};
use crate::lexer::parse_int;
use crate::namespace::{Namespace, NamespaceError, Registry};
use crate::rom::Rom;

#[derive(Debug, Error)]
pub enum CompileError {
    #[error(transparent)]
    Schema(#[from] NamespaceError),

    #[error("line {line}: {kind}")]
    Line {
        line: usize,
        #[source]
        kind: CompileErrorKind,
    },
}

impl CompileError {
    /// 1-based line the error was found on, if it came from a line.
    pub fn line(&self) -> Option<usize> {
        match self {
            CompileError::Line { line, .. } => Some(*line),
            CompileError::Schema(_) => None,
        }
    }
}

/// What went wrong on a single line.
#[derive(Debug, Error)]
pub enum CompileErrorKind {
    #[error("malformed token {0:?}")]
    Malformed(String),

    #[error("unknown command {0:?}")]
    UnknownOpcode(String),

    #[error("opcode {0} out of range (1..=255)")]
    OpcodeRange(i64),

    #[error(transparent)]
    Symbol(#[from] NamespaceError),

    #[error("{value} does not fit in {bits} bits")]
    Overflow { value: i64, bits: u32 },

    #[error("bit {bit} outside a {bits}-bit mask")]
    BitRange { bit: i64, bits: u32 },

    #[error("'*' is only allowed as the last argument")]
    MisplacedFill,

    #[error("no resource {0:?}")]
    UnknownResource(String),

    #[error("invalid string literal")]
    Json(#[source] serde_json::Error),

    #[error("command 0x{opcode:02x} takes {required} bytes of payload, found {found}")]
    LengthMismatch {
        opcode: u8,
        required: usize,
        found: usize,
    },

    #[error("payload of {0} bytes exceeds the variable-length limit of 255")]
    VariableTooLong(usize),
}

/// Compiler bound to one resource type's command schema.
pub struct Compiler<'a> {
    pub(super) registry: &'a Registry,
    pub(super) rom: Option<&'a Rom>,
    schema: Option<&'a Namespace>,
}

impl<'a> Compiler<'a> {
    /// Build a compiler for resources of type `tid`.
    ///
    /// The registry should already be loaded (see [`Registry::require`]).
    /// `rom` enables `TYPE:NAME` resource references.
    pub fn new(registry: &'a Registry, tid: u8, rom: Option<&'a Rom>) -> Self {
        let schema = registry.command_schema(tid, type_name(tid, rom));
        if schema.is_none() {
            tracing::debug!("no command schema for type {}", tid);
        }
        Self {
            registry,
            rom,
            schema,
        }
    }

    pub fn compile(&self, text: &str) -> Result<Vec<u8>, CompileError> {
        let mut out = Vec::new();
        for (i, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            self.compile_line(line, &mut out)
                .map_err(|kind| CompileError::Line { line: i + 1, kind })?;
        }
        Ok(out)
    }

    /// Compile one non-blank line, appending to `out`.
    pub fn compile_line(&self, line: &str, out: &mut Vec<u8>) -> Result<(), CompileErrorKind> {
        let tokens = tokenize(line)?;
        let Some((&first, args)) = tokens.split_first() else {
            return Ok(());
        };
        let opcode = self.opcode(first)?;

        let mut payload = Vec::new();
        let mut fill = false;
        for (i, &arg) in args.iter().enumerate() {
            if arg == "*" {
                if i + 1 != args.len() {
                    return Err(CompileErrorKind::MisplacedFill);
                }
                fill = true;
                continue;
            }
            self.encode_arg(arg, &mut payload)?;
        }

        match PayloadClass::of(opcode) {
            PayloadClass::Fixed(required) => {
                let found = payload.len();
                if found > required || (found < required && !fill) {
                    return Err(CompileErrorKind::LengthMismatch {
                        opcode,
                        required,
                        found,
                    });
                }
                payload.resize(required, 0);
                out.push(opcode);
            }
            PayloadClass::Variable => {
                if payload.len() > MAX_VARIABLE_PAYLOAD {
                    return Err(CompileErrorKind::VariableTooLong(payload.len()));
                }
                out.extend([opcode, payload.len() as u8]);
            }
            PayloadClass::Reserved => out.push(opcode),
        }
        out.extend_from_slice(&payload);
        Ok(())
    }

    /// Integer literals win over schema symbols.
    fn opcode(&self, token: &str) -> Result<u8, CompileErrorKind> {
        let value = match parse_int(token) {
            Some(v) => v,
            None => self
                .schema
                .and_then(|s| s.value_of(token))
                .map(i64::from)
                .ok_or_else(|| CompileErrorKind::UnknownOpcode(token.to_string()))?,
        };
        match u8::try_from(value) {
            Ok(op) if op > 0 => Ok(op),
            _ => Err(CompileErrorKind::OpcodeRange(value)),
        }
    }
}

/// Compile `text` for a resource of type `tid`, loading the schema first.
pub fn compile(
    text: &str,
    tid: u8,
    registry: &mut Registry,
    rom: Option<&Rom>,
) -> Result<Vec<u8>, CompileError> {
    registry.require()?;
    Compiler::new(registry, tid, rom).compile(text)
}
