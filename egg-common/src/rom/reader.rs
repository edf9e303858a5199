//! ROM reader
//!
//! Iterates the TOC of a ROM held in memory, yielding borrowed payloads.

use byteorder::{BigEndian, ByteOrder};
use egg_shared::EGG_ROM_FORMAT;

use super::{Rom, RomError};

/// One decoded resource, borrowing its payload from the source buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RomEntry<'a> {
    pub tid: u8,
    pub rid: u16,
    pub serial: &'a [u8],
}

/// Reader for the ROM container format.
///
/// Yields `Ok(entry)` per resource until the terminator. After the first
/// error it yields nothing further.
pub struct RomReader<'a> {
    src: &'a [u8],
    pos: usize,
    tid: u32,
    rid: u32,
    done: bool,
}

impl<'a> RomReader<'a> {
    /// Check the magic and position the reader at the first TOC entry.
    pub fn new(src: &'a [u8]) -> Result<Self, RomError> {
        if !src.starts_with(EGG_ROM_FORMAT.magic) {
            return Err(RomError::BadMagic);
        }
        Ok(Self {
            src,
            pos: EGG_ROM_FORMAT.magic.len(),
            tid: 1,
            rid: 1,
            done: false,
        })
    }

    /// True if `src` starts with the ROM magic.
    pub fn is_rom(src: &[u8]) -> bool {
        src.starts_with(EGG_ROM_FORMAT.magic)
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], RomError> {
        let chunk = self
            .src
            .get(self.pos..self.pos + n)
            .ok_or(RomError::Truncated(self.pos))?;
        self.pos += n;
        Ok(chunk)
    }

    fn next_entry(&mut self) -> Result<Option<RomEntry<'a>>, RomError> {
        loop {
            let offset = self.pos;
            let lead = *self.src.get(offset).ok_or(RomError::Truncated(offset))?;
            let len = match lead & 0xc0 {
                0x00 => {
                    if lead == 0 {
                        if self.pos + 1 < self.src.len() {
                            tracing::debug!(
                                "ignoring {} bytes after ROM terminator",
                                self.src.len() - self.pos - 1
                            );
                        }
                        return Ok(None);
                    }
                    self.pos += 1;
                    self.tid += lead as u32;
                    self.rid = 1;
                    if self.tid > 0xff {
                        return Err(self.overflow(offset));
                    }
                    continue;
                }
                0x40 => {
                    let advance = BigEndian::read_u16(self.take(2)?) as u32 & 0x3fff;
                    if advance == 0 {
                        return Err(RomError::Malformed(offset));
                    }
                    self.rid += advance;
                    continue;
                }
                0x80 => (BigEndian::read_u16(self.take(2)?) as usize & 0x3fff) + 1,
                _ => {
                    let extra = BigEndian::read_u24(self.take(3)?) as usize & 0x3f_ffff;
                    extra + EGG_ROM_FORMAT.short_len_limit + 1
                }
            };
            if self.rid > 0xffff {
                return Err(self.overflow(offset));
            }
            let serial = self.take(len)?;
            let entry = RomEntry {
                tid: self.tid as u8,
                rid: self.rid as u16,
                serial,
            };
            self.rid += 1;
            return Ok(Some(entry));
        }
    }

    fn overflow(&self, offset: usize) -> RomError {
        RomError::IdOverflow {
            offset,
            tid: self.tid,
            rid: self.rid,
        }
    }
}

impl<'a> Iterator for RomReader<'a> {
    type Item = Result<RomEntry<'a>, RomError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_entry() {
            Ok(Some(entry)) => Some(Ok(entry)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

impl Rom {
    /// Decode a whole ROM into a fresh model.
    pub fn decode(src: &[u8]) -> Result<Self, RomError> {
        let mut rom = Rom::new();
        rom.add_rom_serial(src)?;
        Ok(rom)
    }

    /// Merge a serialized ROM into this model as a new generation.
    ///
    /// Entries replace existing resources with the same id; any cached
    /// name, comment, format or path is dropped with the old payload.
    pub fn add_rom_serial(&mut self, src: &[u8]) -> Result<(), RomError> {
        let reader = RomReader::new(src)?;
        self.begin_generation();
        let mut count = 0usize;
        for entry in reader {
            let entry = entry?;
            let res = self.claim(entry.tid, entry.rid)?;
            res.serial = entry.serial.to_vec();
            count += 1;
        }
        tracing::debug!("merged {} resources from ROM ({} bytes)", count, src.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(src: &[u8]) -> Result<Vec<(u8, u16, Vec<u8>)>, RomError> {
        RomReader::new(src)?
            .map(|e| e.map(|e| (e.tid, e.rid, e.serial.to_vec())))
            .collect()
    }

    #[test]
    fn test_read_empty_rom() {
        assert!(entries(b"\0ERM\0").unwrap().is_empty());
    }

    #[test]
    fn test_bad_magic() {
        assert!(matches!(RomReader::new(b"EGG!\0"), Err(RomError::BadMagic)));
        assert!(matches!(RomReader::new(b"\0E"), Err(RomError::BadMagic)));
    }

    #[test]
    fn test_read_entries() {
        let src = [
            b'\0', b'E', b'R', b'M', 0x03, 0x80, 0x00, b'a', 0x80, 0x00, b'b', 0x40, 0x02, 0x80,
            0x01, b'c', b'd', 0x00,
        ];
        assert_eq!(
            entries(&src).unwrap(),
            vec![
                (4, 1, b"a".to_vec()),
                (4, 2, b"b".to_vec()),
                (4, 5, b"cd".to_vec()),
            ]
        );
    }

    #[test]
    fn test_missing_terminator() {
        let src = [b'\0', b'E', b'R', b'M', 0x80, 0x00, b'a'];
        assert!(matches!(entries(&src), Err(RomError::Truncated(7))));
    }

    #[test]
    fn test_truncated_payload() {
        let src = [b'\0', b'E', b'R', b'M', 0x80, 0x04, b'a', b'b'];
        assert!(matches!(entries(&src), Err(RomError::Truncated(6))));
    }

    #[test]
    fn test_tid_overflow() {
        let mut src = b"\0ERM".to_vec();
        src.extend([0x3f; 5]); // 1 + 315 > 255
        src.push(0x00);
        assert!(matches!(entries(&src), Err(RomError::IdOverflow { .. })));
    }

    #[test]
    fn test_rid_overflow() {
        let mut src = b"\0ERM".to_vec();
        src.extend([0x7f, 0xff].repeat(5)); // 1 + 5 * 0x3fff > 0xffff
        src.extend([0x80, 0x00, b'x', 0x00]);
        assert!(matches!(entries(&src), Err(RomError::IdOverflow { .. })));
    }

    #[test]
    fn test_zero_rid_advance_is_malformed() {
        let src = [b'\0', b'E', b'R', b'M', 0x40, 0x00, 0x00];
        assert!(matches!(entries(&src), Err(RomError::Malformed(4))));
    }

    #[test]
    fn test_reader_stops_after_error() {
        let src = [b'\0', b'E', b'R', b'M', 0x40, 0x00, 0x00];
        let mut reader = RomReader::new(&src).unwrap();
        assert!(matches!(reader.next(), Some(Err(_))));
        assert!(reader.next().is_none());
    }
}
