//! iNES cartridge container codec.
//!
//! Parses the iNES file format (16-byte header, optional 512-byte
//! trainer, PRG ROM, CHR ROM) into immutable PRG/CHR buffers plus mapper
//! and mirroring metadata, and serialises the same layout back out
//! byte-for-byte. The cartridge itself holds data only; banking logic
//! lives in the mapper built from it.

use thiserror::Error;

use crate::mapper::{Mapper, Mirroring};
use crate::mappers::{CnRom, Mmc1, Nrom, UxRom};

/// iNES magic: "NES" followed by MS-DOS EOF.
const INES_MAGIC: [u8; 4] = *b"NES\x1A";

/// Header length in bytes.
const HEADER_LEN: usize = 16;

/// Trainer length when flag 6 bit 2 is set.
const TRAINER_LEN: usize = 512;

/// PRG ROM comes in 16 KiB units, CHR ROM in 8 KiB units.
pub const PRG_BANK_LEN: usize = 16 * 1024;
pub const CHR_BANK_LEN: usize = 8 * 1024;

/// Cartridge load failures. All are fatal configuration errors:
/// malformed data is never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartridgeError {
    #[error("not an iNES file (bad magic)")]
    BadMagic,
    #[error("file truncated: need {expected} bytes, have {actual}")]
    Truncated { expected: usize, actual: usize },
    #[error("unsupported mapper {0}")]
    UnsupportedMapper(u8),
}

/// Nametable mirroring as declared by the header.
///
/// Mappers may override this at runtime through [`Mapper::mirroring`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderMirroring {
    Horizontal,
    Vertical,
    FourScreen,
}

/// A parsed cartridge: immutable PRG/CHR buffers plus metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cartridge {
    pub prg_rom: Vec<u8>,
    /// CHR ROM; empty means the board carries 8 KiB of CHR RAM instead.
    pub chr_rom: Vec<u8>,
    pub mapper_id: u8,
    pub mirroring: HeaderMirroring,
    /// Battery-backed PRG RAM present (flag 6 bit 1).
    pub battery: bool,
    /// 512-byte trainer, preserved for round-trip fidelity.
    pub trainer: Option<Vec<u8>>,
}

impl Cartridge {
    /// Parse an iNES image.
    pub fn from_ines_bytes(data: &[u8]) -> Result<Self, CartridgeError> {
        if data.len() < HEADER_LEN {
            return Err(CartridgeError::Truncated {
                expected: HEADER_LEN,
                actual: data.len(),
            });
        }
        if data[0..4] != INES_MAGIC {
            return Err(CartridgeError::BadMagic);
        }

        let prg_banks = data[4] as usize;
        let chr_banks = data[5] as usize;
        let flags6 = data[6];
        let flags7 = data[7];

        // Mapper id is split across the two control bytes' high nibbles.
        let mapper_id = (flags7 & 0xF0) | (flags6 >> 4);
        let battery = flags6 & 0x02 != 0;
        let has_trainer = flags6 & 0x04 != 0;
        let mirroring = if flags6 & 0x08 != 0 {
            HeaderMirroring::FourScreen
        } else if flags6 & 0x01 != 0 {
            HeaderMirroring::Vertical
        } else {
            HeaderMirroring::Horizontal
        };

        let prg_len = prg_banks * PRG_BANK_LEN;
        let chr_len = chr_banks * CHR_BANK_LEN;
        let trainer_len = if has_trainer { TRAINER_LEN } else { 0 };
        let expected = HEADER_LEN + trainer_len + prg_len + chr_len;
        if data.len() < expected {
            return Err(CartridgeError::Truncated {
                expected,
                actual: data.len(),
            });
        }

        let mut offset = HEADER_LEN;
        let trainer = if has_trainer {
            let t = data[offset..offset + TRAINER_LEN].to_vec();
            offset += TRAINER_LEN;
            Some(t)
        } else {
            None
        };
        let prg_rom = data[offset..offset + prg_len].to_vec();
        offset += prg_len;
        let chr_rom = data[offset..offset + chr_len].to_vec();

        Ok(Self {
            prg_rom,
            chr_rom,
            mapper_id,
            mirroring,
            battery,
            trainer,
        })
    }

    /// Serialise back to the exact iNES byte layout.
    #[must_use]
    pub fn to_ines_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(
            HEADER_LEN
                + self.trainer.as_ref().map_or(0, Vec::len)
                + self.prg_rom.len()
                + self.chr_rom.len(),
        );
        out.extend_from_slice(&INES_MAGIC);
        out.push((self.prg_rom.len() / PRG_BANK_LEN) as u8);
        out.push((self.chr_rom.len() / CHR_BANK_LEN) as u8);

        let mut flags6 = (self.mapper_id & 0x0F) << 4;
        match self.mirroring {
            HeaderMirroring::Horizontal => {}
            HeaderMirroring::Vertical => flags6 |= 0x01,
            HeaderMirroring::FourScreen => flags6 |= 0x08,
        }
        if self.battery {
            flags6 |= 0x02;
        }
        if self.trainer.is_some() {
            flags6 |= 0x04;
        }
        out.push(flags6);
        out.push(self.mapper_id & 0xF0);
        out.extend_from_slice(&[0; 8]); // header padding

        if let Some(trainer) = &self.trainer {
            out.extend_from_slice(trainer);
        }
        out.extend_from_slice(&self.prg_rom);
        out.extend_from_slice(&self.chr_rom);
        out
    }

    /// Mirroring as the mapper layer sees it.
    #[must_use]
    pub fn initial_mirroring(&self) -> Mirroring {
        match self.mirroring {
            HeaderMirroring::Horizontal => Mirroring::Horizontal,
            HeaderMirroring::Vertical => Mirroring::Vertical,
            HeaderMirroring::FourScreen => Mirroring::FourScreen,
        }
    }

    /// Build the mapper for this cartridge.
    ///
    /// Selecting a mapper id with no registered implementation is a fatal
    /// configuration error at load time, not at run time.
    pub fn into_mapper(self) -> Result<Box<dyn Mapper>, CartridgeError> {
        let mirroring = self.initial_mirroring();
        match self.mapper_id {
            0 => Ok(Box::new(Nrom::new(self.prg_rom, self.chr_rom, mirroring))),
            1 => Ok(Box::new(Mmc1::new(self.prg_rom, self.chr_rom))),
            2 => Ok(Box::new(UxRom::new(self.prg_rom, self.chr_rom, mirroring))),
            3 => Ok(Box::new(CnRom::new(self.prg_rom, self.chr_rom, mirroring))),
            id => Err(CartridgeError::UnsupportedMapper(id)),
        }
    }
}
