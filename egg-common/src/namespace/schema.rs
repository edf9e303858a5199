//! Schema line scraper
//!
//! Schema sources are C headers. Only lines of this shape contribute:
//!
//! ```text
//! #define CMD_<type>_<name> <int> [/* argspec */]
//! #define NS_<namespace>_<name> <int> [/* argspec */]
//! ```
//!
//! Anything else, including a comment that is not closed on the same line,
//! is skipped.

use super::NamespaceMode;
use crate::lexer::{next_token, parse_uint};

/// One accepted `#define` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Define<'a> {
    pub mode: NamespaceMode,
    pub namespace: &'a str,
    pub symbol: &'a str,
    pub value: u32,
    pub argspec: Option<&'a str>,
}

/// Parse one schema line, or `None` if it does not contribute.
pub fn parse_define(line: &str) -> Option<Define<'_>> {
    let (directive, rest) = next_token(line)?;
    if directive != "#define" {
        return None;
    }
    let (key, rest) = next_token(rest)?;
    let (mode, key) = if let Some(k) = key.strip_prefix("CMD_") {
        (NamespaceMode::Opcode, k)
    } else if let Some(k) = key.strip_prefix("NS_") {
        (NamespaceMode::Value, k)
    } else {
        return None;
    };
    let (namespace, symbol) = key.split_once('_')?;
    if namespace.is_empty() || symbol.is_empty() {
        return None;
    }

    let (value, rest) = next_token(rest)?;
    let value = parse_uint(value)?;

    let rest = rest.trim();
    let argspec = if rest.is_empty() {
        None
    } else {
        let inner = rest.strip_prefix("/*")?.strip_suffix("*/")?;
        if inner.contains("*/") {
            return None;
        }
        Some(inner.trim()).filter(|s| !s.is_empty())
    };

    Some(Define {
        mode,
        namespace,
        symbol,
        value,
        argspec,
    })
}
