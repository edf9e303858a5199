//! ROM format constants for the Egg console.
//!
//! `RomFormat` is the single source of truth for the container's constants:
//! magic bytes, file extension, and the limits enforced by the TOC framing.
//!
//! # Example
//!
//! ```
//! use egg_shared::EGG_ROM_FORMAT;
//!
//! assert_eq!(EGG_ROM_FORMAT.extension, "egg");
//! assert_eq!(EGG_ROM_FORMAT.magic, b"\0ERM");
//! assert_eq!(EGG_ROM_FORMAT.max_resource_len, 4_210_688);
//! ```

/// ROM container constants.
#[derive(Debug, Clone, Copy)]
pub struct RomFormat {
    /// ROM file extension without dot
    pub extension: &'static str,

    /// Magic bytes at start of ROM file (4 bytes)
    pub magic: &'static [u8; 4],

    /// Largest payload that fits the 2-byte length field
    pub short_len_limit: usize,

    /// Largest payload that fits the 3-byte length field
    pub max_resource_len: usize,

    /// Leading bytes of every metadata resource
    pub metadata_signature: &'static [u8; 4],
}

impl RomFormat {
    /// Create a new ROM format description.
    pub const fn new(
        extension: &'static str,
        magic: &'static [u8; 4],
        short_len_limit: usize,
        max_resource_len: usize,
        metadata_signature: &'static [u8; 4],
    ) -> Self {
        Self {
            extension,
            magic,
            short_len_limit,
            max_resource_len,
            metadata_signature,
        }
    }
}

/// Egg ROM format.
///
/// - ROM extension: `.egg`
/// - Magic bytes: `\0ERM`
/// - Payload lengths: `1..=0x4000` use a 2-byte field, up to
///   `0x4000 + 0x400000` a 3-byte field
pub const EGG_ROM_FORMAT: RomFormat = RomFormat::new(
    "egg",
    b"\0ERM",
    0x4000,
    0x4000 + 0x40_0000,
    b"\0EMD",
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_egg_rom_format_extension() {
        assert_eq!(EGG_ROM_FORMAT.extension, "egg");
    }

    #[test]
    fn test_egg_rom_format_magic() {
        assert_eq!(EGG_ROM_FORMAT.magic, b"\0ERM");
        assert_eq!(EGG_ROM_FORMAT.magic.len(), 4);
    }

    #[test]
    fn test_length_limits() {
        assert_eq!(EGG_ROM_FORMAT.short_len_limit, 16384);
        assert_eq!(EGG_ROM_FORMAT.max_resource_len, 4_210_688);
    }
}
