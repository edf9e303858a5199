//! Resource identity from loose file paths
//!
//! Only the last two path components matter:
//!
//! ```text
//! <type>/[ll-]<id>[-<name>][.<comment>].<format>
//! map/3-castle.tmx
//! strings/fr-1
//! hero/12.idle.png
//! ```
//!
//! `<type>` is a decimal tid, a core or custom type name, or a name the
//! schema pins with `NS_tid_`. Unknown names become new custom types.

use std::path::Path;

use egg_shared::{CoreTid, LangCode, LangError, is_pinnable_tid};
use thiserror::Error;

use crate::namespace::{NamespaceError, NamespaceMode, Registry};
use crate::rom::{Rom, RomError};

/// Everything a loose file's path says about the resource it holds.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResourceIdentity {
    pub tid: u8,
    pub rid: u16,
    pub lang: Option<LangCode>,
    pub name: Option<String>,
    pub comment: Option<String>,
    pub format: Option<String>,
}

#[derive(Debug, Error)]
pub enum PathError {
    #[error("path has no file name")]
    NoBasename,

    #[error("path has no type directory")]
    NoDirectory,

    #[error("invalid resource type {0:?}")]
    InvalidType(String),

    #[error("malformed resource file name {0:?}")]
    MalformedBasename(String),

    #[error("resource id {0} out of range (1..=65535)")]
    RidOutOfRange(u32),

    #[error(transparent)]
    Lang(#[from] LangError),

    #[error(transparent)]
    Rom(#[from] RomError),

    #[error(transparent)]
    Schema(#[from] NamespaceError),
}

/// Derive a resource identity from `path`.
///
/// May assign a new custom type id in `rom` when the directory names a type
/// nobody has seen yet.
pub fn resolve_path(
    path: &Path,
    rom: &mut Rom,
    registry: &mut Registry,
) -> Result<ResourceIdentity, PathError> {
    let basename = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or(PathError::NoBasename)?;

    match basename {
        "metadata" => {
            return Ok(ResourceIdentity {
                tid: CoreTid::Metadata.tid(),
                rid: 1,
                ..Default::default()
            });
        }
        "code.wasm" => {
            return Ok(ResourceIdentity {
                tid: CoreTid::Code.tid(),
                rid: 1,
                format: Some("wasm".to_string()),
                ..Default::default()
            });
        }
        _ => {}
    }

    let directory = path
        .parent()
        .and_then(|p| p.file_name())
        .and_then(|n| n.to_str())
        .ok_or(PathError::NoDirectory)?;

    let tid = resolve_type(directory, rom, registry)?;
    let mut identity = parse_basename(basename)?;
    identity.tid = tid;
    Ok(identity)
}

/// Type id for a directory name.
///
/// Tries, in order: a decimal id, a type the ROM already knows, a schema
/// `NS_tid_` symbol, and finally a fresh custom id. A schema symbol naming
/// an id in the custom range is rejected.
pub fn resolve_type(name: &str, rom: &mut Rom, registry: &mut Registry) -> Result<u8, PathError> {
    if name.is_empty() {
        return Err(PathError::InvalidType(name.to_string()));
    }
    if name.bytes().all(|b| b.is_ascii_digit()) {
        return match name.parse::<u8>() {
            Ok(tid) if tid > 0 => Ok(tid),
            _ => Err(PathError::InvalidType(name.to_string())),
        };
    }
    if let Some(tid) = rom.tid_by_name(name) {
        return Ok(tid);
    }
    match registry.lookup_value_from_name(NamespaceMode::Value, "tid", name) {
        Ok(id) => {
            return match u8::try_from(id) {
                Ok(tid) if is_pinnable_tid(tid) => Ok(tid),
                _ => Err(PathError::InvalidType(name.to_string())),
            };
        }
        Err(e) if e.is_lookup_miss() => {}
        Err(e) => return Err(e.into()),
    }
    Ok(rom.name_type(name)?)
}

/// Parse `[ll-]<id>[-<name>][.<comment>][.<format>]`. The returned tid is 0.
pub fn parse_basename(basename: &str) -> Result<ResourceIdentity, PathError> {
    let malformed = || PathError::MalformedBasename(basename.to_string());

    let (lang, rest) = match basename.as_bytes() {
        [c1, c2, b'-', ..] if c1.is_ascii_lowercase() && c2.is_ascii_lowercase() => {
            (LangCode::from_letters(*c1, *c2), &basename[3..])
        }
        _ => (None, basename),
    };

    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return Err(malformed());
    }
    let id: u32 = rest[..digits].parse().map_err(|_| malformed())?;
    let rest = &rest[digits..];

    let (stem, suffix) = match rest.find('.') {
        Some(p) => (&rest[..p], Some(&rest[p + 1..])),
        None => (rest, None),
    };

    let name = if stem.is_empty() {
        None
    } else {
        match stem.strip_prefix('-') {
            Some(name) if !name.is_empty() => Some(name.to_string()),
            _ => return Err(malformed()),
        }
    };

    let (comment, format) = match suffix {
        None => (None, None),
        Some(suffix) => {
            let parts: Vec<&str> = suffix.split('.').collect();
            if parts.iter().any(|p| p.is_empty()) {
                return Err(malformed());
            }
            match parts.as_slice() {
                [format] => (None, Some(format.to_string())),
                [comment, format] => (Some(comment.to_string()), Some(format.to_string())),
                _ => return Err(malformed()),
            }
        }
    };

    let rid = match lang {
        Some(lang) => lang.rid(id)?,
        None => match u16::try_from(id) {
            Ok(rid) if rid > 0 => rid,
            _ => return Err(PathError::RidOutOfRange(id)),
        },
    };

    Ok(ResourceIdentity {
        tid: 0,
        rid,
        lang,
        name,
        comment,
        format,
    })
}
