//! Two-letter language codes packed into resource ids.
//!
//! A localized resource id carries the language in its high 10 bits and a
//! 6-bit stem in its low bits: `rid = ((c1-'a') << 5 | (c2-'a')) << 6 | stem`.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Largest stem a localized resource id can carry.
pub const MAX_LANG_STEM: u16 = 0x3f;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LangError {
    #[error("language code must be two lowercase letters, found {0:?}")]
    InvalidCode(String),
    #[error("stem {0} out of range for a localized resource (1..=63)")]
    StemOutOfRange(u32),
}

/// Packed 10-bit language code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LangCode(u16);

impl LangCode {
    pub fn from_letters(c1: u8, c2: u8) -> Option<Self> {
        if c1.is_ascii_lowercase() && c2.is_ascii_lowercase() {
            Some(Self((((c1 - b'a') as u16) << 5) | (c2 - b'a') as u16))
        } else {
            None
        }
    }

    pub fn packed(self) -> u16 {
        self.0
    }

    pub fn letters(self) -> [u8; 2] {
        [b'a' + (self.0 >> 5) as u8, b'a' + (self.0 & 0x1f) as u8]
    }

    /// Combine with a stem into a full resource id.
    pub fn rid(self, stem: u32) -> Result<u16, LangError> {
        if stem < 1 || stem > MAX_LANG_STEM as u32 {
            return Err(LangError::StemOutOfRange(stem));
        }
        Ok((self.0 << 6) | stem as u16)
    }

    /// Split a localized rid back into language and stem.
    pub fn split_rid(rid: u16) -> (Self, u16) {
        (Self(rid >> 6), rid & MAX_LANG_STEM)
    }
}

impl FromStr for LangCode {
    type Err = LangError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.as_bytes() {
            [c1, c2] => Self::from_letters(*c1, *c2),
            _ => None,
        }
        .ok_or_else(|| LangError::InvalidCode(s.to_string()))
    }
}

impl fmt::Display for LangCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [c1, c2] = self.letters();
        write!(f, "{}{}", c1 as char, c2 as char)
    }
}
