//! ROM writer
//!
//! Serializes a [`Rom`] into the delta-coded container format.

use byteorder::{BigEndian, WriteBytesExt};
use egg_shared::EGG_ROM_FORMAT;
use std::io::Write;

use super::{Rom, RomError};

/// Tid advance carried by one continuation byte.
const TID_STEP: u32 = 0x3f;

/// Rid advance carried by one continuation halfword.
const RID_STEP: u32 = 0x3fff;

/// Writer for the ROM container format
pub struct RomWriter<W: Write> {
    writer: W,
    tid: u32,
    rid: u32,
}

impl<W: Write> RomWriter<W> {
    /// Create a new ROM writer with the cursor at `(1, 1)`
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            tid: 1,
            rid: 1,
        }
    }

    /// Write a complete ROM: magic, every resource, terminator
    pub fn write_rom(&mut self, rom: &Rom) -> Result<(), RomError> {
        self.write_header()?;
        for res in rom {
            self.write_resource(res.tid, res.rid, &res.serial)?;
        }
        self.finish()
    }

    pub fn write_header(&mut self) -> Result<(), RomError> {
        self.writer.write_all(EGG_ROM_FORMAT.magic)?;
        Ok(())
    }

    /// Write one TOC entry and its payload. Empty payloads are skipped.
    ///
    /// Resources must arrive in strictly increasing `(tid, rid)` order.
    pub fn write_resource(&mut self, tid: u8, rid: u16, serial: &[u8]) -> Result<(), RomError> {
        if serial.is_empty() {
            return Ok(());
        }
        if tid == 0 {
            return Err(RomError::InvalidTid(0));
        }
        if rid == 0 {
            return Err(RomError::InvalidRid(0));
        }
        let (tid32, rid32) = (tid as u32, rid as u32);

        if tid32 < self.tid {
            return Err(RomError::OutOfOrder { tid, rid });
        }
        if tid32 > self.tid {
            let mut advance = tid32 - self.tid;
            while advance >= TID_STEP {
                self.writer.write_u8(TID_STEP as u8)?;
                advance -= TID_STEP;
            }
            if advance > 0 {
                self.writer.write_u8(advance as u8)?;
            }
            self.tid = tid32;
            self.rid = 1;
        }

        if rid32 < self.rid {
            return Err(RomError::OutOfOrder { tid, rid });
        }
        let mut advance = rid32 - self.rid;
        while advance >= RID_STEP {
            self.writer.write_u16::<BigEndian>(0x4000 | RID_STEP as u16)?;
            advance -= RID_STEP;
        }
        if advance > 0 {
            self.writer.write_u16::<BigEndian>(0x4000 | advance as u16)?;
        }

        let len = serial.len();
        if len > EGG_ROM_FORMAT.max_resource_len {
            return Err(RomError::ResourceTooLarge {
                tid,
                rid,
                len,
                limit: EGG_ROM_FORMAT.max_resource_len,
            });
        }
        if len <= EGG_ROM_FORMAT.short_len_limit {
            self.writer.write_u16::<BigEndian>(0x8000 | (len - 1) as u16)?;
        } else {
            let extra = (len - EGG_ROM_FORMAT.short_len_limit - 1) as u32;
            self.writer.write_u24::<BigEndian>(0xc0_0000 | extra)?;
        }
        self.writer.write_all(serial)?;
        self.rid = rid32 + 1;
        Ok(())
    }

    /// Write the terminator
    pub fn finish(&mut self) -> Result<(), RomError> {
        self.writer.write_u8(0x00)?;
        Ok(())
    }

    /// Consume the writer and return the inner writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl Rom {
    /// Serialize to bytes.
    pub fn encode(&self) -> Result<Vec<u8>, RomError> {
        let mut writer = RomWriter::new(Vec::new());
        writer.write_rom(self)?;
        Ok(writer.into_inner())
    }
}
