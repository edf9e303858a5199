//! Resource type identifiers.
//!
//! Type ids split into four ranges:
//! - `1..=15` core types with fixed names ([`CoreTid`])
//! - `16..=127` custom types, assigned per build in alphabetical order
//! - `128..=255` types pinned by a schema declaration (`NS_tid_<name> <id>`)

/// First id available to custom types.
pub const CUSTOM_TID_MIN: u8 = 16;

/// Last id available to custom types.
pub const CUSTOM_TID_MAX: u8 = 127;

/// First id a schema may pin a type name to.
pub const SCHEMA_TID_MIN: u8 = 128;

/// Resource types known to every Egg ROM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum CoreTid {
    Metadata = 1,
    Code = 2,
    Strings = 3,
    Image = 4,
    Song = 5,
    Sound = 6,
    Tilesheet = 7,
    Decalsheet = 8,
    Map = 9,
    Sprite = 10,
}

impl CoreTid {
    pub const ALL: [CoreTid; 10] = [
        CoreTid::Metadata,
        CoreTid::Code,
        CoreTid::Strings,
        CoreTid::Image,
        CoreTid::Song,
        CoreTid::Sound,
        CoreTid::Tilesheet,
        CoreTid::Decalsheet,
        CoreTid::Map,
        CoreTid::Sprite,
    ];

    pub fn from_tid(tid: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|t| *t as u8 == tid)
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name() == name)
    }

    pub fn tid(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            CoreTid::Metadata => "metadata",
            CoreTid::Code => "code",
            CoreTid::Strings => "strings",
            CoreTid::Image => "image",
            CoreTid::Song => "song",
            CoreTid::Sound => "sound",
            CoreTid::Tilesheet => "tilesheet",
            CoreTid::Decalsheet => "decalsheet",
            CoreTid::Map => "map",
            CoreTid::Sprite => "sprite",
        }
    }

    /// Singleton types may only ever use rid 1.
    pub fn is_singleton(self) -> bool {
        matches!(self, CoreTid::Metadata | CoreTid::Code)
    }
}

/// True if `tid` lies in the range reserved for custom types.
pub fn is_custom_tid(tid: u8) -> bool {
    (CUSTOM_TID_MIN..=CUSTOM_TID_MAX).contains(&tid)
}

/// True if a schema `NS_tid_` symbol may bind a type name to `tid`.
///
/// The custom range is assigned per build and is never pinned.
pub fn is_pinnable_tid(tid: u8) -> bool {
    tid != 0 && !is_custom_tid(tid)
}
