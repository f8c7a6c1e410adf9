//! UxROM (mapper 2): 16 KiB PRG bank switching.
//!
//! One of the most common NES boards (Mega Man, Castlevania, Contra).
//!
//! - PRG: 16 KiB switchable at $8000-$BFFF, 16 KiB fixed to the last
//!   bank at $C000-$FFFF
//! - CHR: 8 KiB RAM on most boards, ROM on some
//! - Mirroring: fixed from the cartridge header

use crate::mapper::{BankWindows, Mapper, MapperState, Mirroring};
use crate::mappers::CHR_RAM_LEN;

pub struct UxRom {
    prg_rom: Vec<u8>,
    chr: Vec<u8>,
    chr_is_ram: bool,
    prg: BankWindows,
    mirroring: Mirroring,
}

impl UxRom {
    #[must_use]
    pub fn new(prg_rom: Vec<u8>, chr_rom: Vec<u8>, mirroring: Mirroring) -> Self {
        let chr_is_ram = chr_rom.is_empty();
        let chr = if chr_is_ram {
            vec![0; CHR_RAM_LEN]
        } else {
            chr_rom
        };
        let mut prg = BankWindows::new(prg_rom.len(), 16 * 1024, 2);
        prg.set_window(0, 0);
        prg.set_window(1, -1);
        Self {
            prg_rom,
            chr,
            chr_is_ram,
            prg,
            mirroring,
        }
    }
}

impl Mapper for UxRom {
    fn mapper_id(&self) -> u8 {
        2
    }

    fn cpu_read(&self, addr: u16) -> u8 {
        match addr {
            0x8000..=0xFFFF => self.prg_rom[self.prg.region_offset(addr as usize - 0x8000)],
            _ => 0,
        }
    }

    fn cpu_write(&mut self, addr: u16, value: u8) {
        if addr >= 0x8000 {
            // Bus conflict: the written value is ANDed with the ROM byte
            // at the write address.
            let bank = value & self.cpu_read(addr);
            self.prg.set_window(0, bank as isize);
        }
    }

    fn chr_read(&mut self, addr: u16) -> u8 {
        self.chr[(addr as usize) & 0x1FFF]
    }

    fn chr_write(&mut self, addr: u16, value: u8) {
        if self.chr_is_ram {
            self.chr[(addr as usize) & 0x1FFF] = value;
        }
    }

    fn mirroring(&self) -> Mirroring {
        self.mirroring
    }

    fn reset(&mut self) {
        self.prg.set_window(0, 0);
    }

    fn state(&self) -> MapperState {
        MapperState {
            mapper_id: 2,
            prg_banks: self.prg.banks(),
            chr_banks: vec![0],
            mirroring: self.mirroring,
        }
    }
}
