//! NROM (mapper 0): no bank switching.
//!
//! - PRG: 16 KiB mirrored across $8000-$FFFF, or 32 KiB direct
//! - CHR: 8 KiB ROM, or RAM when the cartridge ships none
//! - PRG RAM: 8 KiB at $6000-$7FFF

use crate::mapper::{BankWindows, Mapper, MapperState, Mirroring};
use crate::mappers::{CHR_RAM_LEN, PRG_RAM_LEN};

pub struct Nrom {
    prg_rom: Vec<u8>,
    prg_ram: Vec<u8>,
    chr: Vec<u8>,
    chr_is_ram: bool,
    prg: BankWindows,
    mirroring: Mirroring,
}

impl Nrom {
    #[must_use]
    pub fn new(prg_rom: Vec<u8>, chr_rom: Vec<u8>, mirroring: Mirroring) -> Self {
        let chr_is_ram = chr_rom.is_empty();
        let chr = if chr_is_ram {
            vec![0; CHR_RAM_LEN]
        } else {
            chr_rom
        };
        // Two 16K windows: the first bank and the last. A 16K ROM has
        // one bank, so "last" mirrors the first.
        let mut prg = BankWindows::new(prg_rom.len(), 16 * 1024, 2);
        prg.set_window(0, 0);
        prg.set_window(1, -1);
        Self {
            prg_rom,
            prg_ram: vec![0; PRG_RAM_LEN],
            chr,
            chr_is_ram,
            prg,
            mirroring,
        }
    }
}

impl Mapper for Nrom {
    fn mapper_id(&self) -> u8 {
        0
    }

    fn cpu_read(&self, addr: u16) -> u8 {
        match addr {
            0x6000..=0x7FFF => self.prg_ram[(addr as usize - 0x6000) % PRG_RAM_LEN],
            0x8000..=0xFFFF => self.prg_rom[self.prg.region_offset(addr as usize - 0x8000)],
            _ => 0,
        }
    }

    fn cpu_write(&mut self, addr: u16, value: u8) {
        if let 0x6000..=0x7FFF = addr {
            let index = (addr as usize - 0x6000) % PRG_RAM_LEN;
            self.prg_ram[index] = value;
        }
        // NROM has no bank registers; ROM writes are ignored.
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

    fn state(&self) -> MapperState {
        MapperState {
            mapper_id: 0,
            prg_banks: self.prg.banks(),
            chr_banks: vec![0],
            mirroring: self.mirroring,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prg_16k_mirrors_into_upper_window() {
        let mut prg = vec![0u8; 16 * 1024];
        prg[0] = 0x12;
        prg[0x3FFF] = 0x34;
        let m = Nrom::new(prg, vec![0; 8192], Mirroring::Horizontal);
        assert_eq!(m.cpu_read(0x8000), 0x12);
        assert_eq!(m.cpu_read(0xBFFF), 0x34);
        assert_eq!(m.cpu_read(0xC000), 0x12);
        assert_eq!(m.cpu_read(0xFFFF), 0x34);
    }

    #[test]
    fn prg_32k_maps_directly() {
        let mut prg = vec![0u8; 32 * 1024];
        prg[0x4000] = 0x56;
        let m = Nrom::new(prg, vec![0; 8192], Mirroring::Vertical);
        assert_eq!(m.cpu_read(0xC000), 0x56);
    }

    #[test]
    fn prg_ram_round_trips() {
        let mut m = Nrom::new(vec![0; 16 * 1024], vec![0; 8192], Mirroring::Horizontal);
        m.cpu_write(0x6000, 0x42);
        assert_eq!(m.cpu_read(0x6000), 0x42);
    }

    #[test]
    fn chr_rom_ignores_writes_chr_ram_accepts() {
        let mut rom = Nrom::new(vec![0; 16 * 1024], vec![0xCC; 8192], Mirroring::Horizontal);
        rom.chr_write(0x0000, 0x11);
        assert_eq!(rom.chr_read(0x0000), 0xCC);

        let mut ram = Nrom::new(vec![0; 16 * 1024], Vec::new(), Mirroring::Horizontal);
        ram.chr_write(0x0000, 0x11);
        assert_eq!(ram.chr_read(0x0000), 0x11);
    }
}
