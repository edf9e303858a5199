//! Argument tokens
//!
//! Each argument describes its own encoding:
//!
//! | Form                  | Encoding                                         |
//! |-----------------------|--------------------------------------------------|
//! | `0x0102ab`            | raw bytes, even digit count                      |
//! | `@1,2,255`            | one byte each, 0..=255                           |
//! | `(b16:NS)(a,b,3)`     | 8, 16, 24 or 32-bit mask, bits named in NS       |
//! | `(u16)42`             | big-endian integer of 8, 16, 24 or 32 bits       |
//! | `(u8:NS)name`         | same, value looked up in NS                      |
//! | `"text"`              | JSON string, raw UTF-8                           |
//! | `TYPE:NAME`           | 2-byte rid of a resource in the ROM              |
//! | `42`                  | one byte, -128..=255                             |
//! | `*`                   | zero fill, last argument only                    |

use super::compiler::{CompileErrorKind, Compiler};
use crate::lexer::parse_int;
use crate::namespace::NamespaceMode;

/// Split a line on whitespace, keeping `"..."` strings whole.
pub(super) fn tokenize(line: &str) -> Result<Vec<&str>, CompileErrorKind> {
    let mut tokens = Vec::new();
    let mut rest = line.trim_start();
    while !rest.is_empty() {
        let end = if rest.starts_with('"') {
            let close = closing_quote(rest)
                .ok_or_else(|| CompileErrorKind::Malformed(rest.to_string()))?;
            let end = close + 1;
            if rest[end..].chars().next().is_some_and(|c| !c.is_whitespace()) {
                return Err(CompileErrorKind::Malformed(rest.to_string()));
            }
            end
        } else {
            rest.find(char::is_whitespace).unwrap_or(rest.len())
        };
        tokens.push(&rest[..end]);
        rest = rest[end..].trim_start();
    }
    Ok(tokens)
}

/// Byte index of the quote closing the string that opens `src`.
fn closing_quote(src: &str) -> Option<usize> {
    let mut escaped = false;
    for (i, c) in src.char_indices().skip(1) {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '"' => return Some(i),
            _ => {}
        }
    }
    None
}

fn check_range(value: i64, bits: u32) -> Result<(), CompileErrorKind> {
    let min = -(1i64 << (bits - 1));
    let max = (1i64 << bits) - 1;
    if value < min || value > max {
        return Err(CompileErrorKind::Overflow { value, bits });
    }
    Ok(())
}

fn push_be(out: &mut Vec<u8>, value: i64, bits: u32) {
    let bytes = (value as u64).to_be_bytes();
    out.extend_from_slice(&bytes[8 - (bits / 8) as usize..]);
}

/// Split `(header)rest` into `header` and `rest`.
fn split_cast(token: &str) -> Option<(&str, &str)> {
    let inner = token.strip_prefix('(')?;
    let close = inner.find(')')?;
    Some((&inner[..close], &inner[close + 1..]))
}

/// Split `u16:NS` into the size and optional namespace.
fn split_size<'t>(header: &'t str, sigil: char) -> Option<(u32, Option<&'t str>)> {
    let header = header.strip_prefix(sigil)?;
    let (size, namespace) = match header.split_once(':') {
        Some((size, ns)) if !ns.is_empty() => (size, Some(ns)),
        Some(_) => return None,
        None => (header, None),
    };
    if size.is_empty() || !size.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some((size.parse().ok()?, namespace))
}

impl Compiler<'_> {
    /// Encode one argument, appending to `out`.
    pub(super) fn encode_arg(&self, token: &str, out: &mut Vec<u8>) -> Result<(), CompileErrorKind> {
        let malformed = || CompileErrorKind::Malformed(token.to_string());

        if let Some(digits) = token.strip_prefix("0x").or_else(|| token.strip_prefix("0X")) {
            if digits.is_empty() {
                return Err(malformed());
            }
            let bytes = hex::decode(digits).map_err(|_| malformed())?;
            out.extend_from_slice(&bytes);
            return Ok(());
        }

        if let Some(list) = token.strip_prefix('@') {
            for item in list.split(',') {
                let value = parse_int(item).ok_or_else(malformed)?;
                let byte = u8::try_from(value)
                    .map_err(|_| CompileErrorKind::Overflow { value, bits: 8 })?;
                out.push(byte);
            }
            return Ok(());
        }

        if token.starts_with('(') {
            let (header, rest) = split_cast(token).ok_or_else(malformed)?;
            return if header.starts_with('b') {
                self.encode_bitmask(token, header, rest, out)
            } else {
                self.encode_sized(token, header, rest, out)
            };
        }

        if token.starts_with('"') {
            let text: String = serde_json::from_str(token).map_err(CompileErrorKind::Json)?;
            out.extend_from_slice(text.as_bytes());
            return Ok(());
        }

        if let Some(value) = parse_int(token) {
            check_range(value, 8)?;
            out.push(value as u8);
            return Ok(());
        }

        if let Some((type_name, name)) = token.split_once(':') {
            if self.rom.is_some() {
                let rid = self.resource_ref(token, type_name, name)?;
                out.extend_from_slice(&rid.to_be_bytes());
                return Ok(());
            }
        }

        Err(malformed())
    }

    /// `(uSIZE)INT` or `(uSIZE:NS)SYMBOL`
    fn encode_sized(
        &self,
        token: &str,
        header: &str,
        value: &str,
        out: &mut Vec<u8>,
    ) -> Result<(), CompileErrorKind> {
        let malformed = || CompileErrorKind::Malformed(token.to_string());
        let (bits, namespace) = split_size(header, 'u').ok_or_else(malformed)?;
        if !matches!(bits, 8 | 16 | 24 | 32) || value.is_empty() {
            return Err(malformed());
        }
        let value = match (parse_int(value), namespace) {
            (Some(v), _) => v,
            (None, Some(ns)) => self
                .registry
                .find_value(NamespaceMode::Value, ns, value)
                .map(i64::from)?,
            (None, None) => return Err(malformed()),
        };
        check_range(value, bits)?;
        push_be(out, value, bits);
        Ok(())
    }

    /// `(bSIZE:NS)(bit,bit,...)`, bit 0 being the least significant.
    fn encode_bitmask(
        &self,
        token: &str,
        header: &str,
        list: &str,
        out: &mut Vec<u8>,
    ) -> Result<(), CompileErrorKind> {
        let malformed = || CompileErrorKind::Malformed(token.to_string());
        let (bits, namespace) = split_size(header, 'b').ok_or_else(malformed)?;
        if !matches!(bits, 8 | 16 | 24 | 32) {
            return Err(malformed());
        }
        let list = list
            .strip_prefix('(')
            .and_then(|l| l.strip_suffix(')'))
            .ok_or_else(malformed)?;

        let mut mask = vec![0u8; bits as usize / 8];
        for item in list.split(',').filter(|s| !s.is_empty()) {
            let bit = match (parse_int(item), namespace) {
                (Some(v), _) => v,
                (None, Some(ns)) => self
                    .registry
                    .find_value(NamespaceMode::Value, ns, item)
                    .map(i64::from)?,
                (None, None) => return Err(malformed()),
            };
            if bit < 0 || bit >= bits as i64 {
                return Err(CompileErrorKind::BitRange { bit, bits });
            }
            let byte = mask.len() - 1 - (bit / 8) as usize;
            mask[byte] |= 1 << (bit % 8);
        }
        out.extend_from_slice(&mask);
        Ok(())
    }

    /// Rid of `TYPE:NAME`, with language bits stripped from localized resources.
    fn resource_ref(&self, token: &str, type_name: &str, name: &str) -> Result<u16, CompileErrorKind> {
        let unknown = || CompileErrorKind::UnknownResource(token.to_string());
        let Some(rom) = self.rom else {
            return Err(unknown());
        };

        let tid = match parse_int(type_name) {
            Some(v) => u8::try_from(v).ok().filter(|&t| t > 0),
            None => rom.tid_by_name(type_name),
        }
        .ok_or_else(unknown)?;

        let resource = match parse_int(name) {
            Some(v) => {
                let rid = u16::try_from(v).ok().filter(|&r| r > 0).ok_or_else(unknown)?;
                match rom.get(tid, rid) {
                    Some(res) => res,
                    None => return Ok(rid),
                }
            }
            None => rom.find_by_name(tid, name).ok_or_else(unknown)?,
        };

        Ok(match resource.language() {
            Some(_) => resource.rid & 0x3f,
            None => resource.rid,
        })
    }
}
