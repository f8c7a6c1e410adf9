//! CNROM (mapper 3): 8 KiB CHR bank switching.
//!
//! PRG is unbanked (16 KiB mirrored or 32 KiB); writes to $8000-$FFFF
//! select the 8 KiB CHR ROM bank visible at PPU $0000-$1FFF.

use crate::mapper::{BankWindows, Mapper, MapperState, Mirroring};

pub struct CnRom {
    prg_rom: Vec<u8>,
    chr_rom: Vec<u8>,
    prg: BankWindows,
    chr: BankWindows,
    mirroring: Mirroring,
}

impl CnRom {
    #[must_use]
    pub fn new(prg_rom: Vec<u8>, chr_rom: Vec<u8>, mirroring: Mirroring) -> Self {
        let mut prg = BankWindows::new(prg_rom.len(), 16 * 1024, 2);
        prg.set_window(0, 0);
        prg.set_window(1, -1);
        let chr = BankWindows::new(chr_rom.len(), 8 * 1024, 1);
        Self {
            prg_rom,
            chr_rom,
            prg,
            chr,
            mirroring,
        }
    }
}

impl Mapper for CnRom {
    fn mapper_id(&self) -> u8 {
        3
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
            self.chr.set_window(0, bank as isize);
        }
    }

    fn chr_read(&mut self, addr: u16) -> u8 {
        self.chr_rom[self.chr.offset(0, (addr as usize) & 0x1FFF)]
    }

    fn chr_write(&mut self, _addr: u16, _value: u8) {
        // CNROM carries CHR ROM only.
    }

    fn mirroring(&self) -> Mirroring {
        self.mirroring
    }

    fn reset(&mut self) {
        self.chr.set_window(0, 0);
    }

    fn state(&self) -> MapperState {
        MapperState {
            mapper_id: 3,
            prg_banks: self.prg.banks(),
            chr_banks: self.chr.banks(),
            mirroring: self.mirroring,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapper() -> CnRom {
        // 4 x 8K CHR banks, each filled with its own index.
        let mut chr = vec![0u8; 4 * 8 * 1024];
        for (bank, chunk) in chr.chunks_mut(8 * 1024).enumerate() {
            chunk.fill(bank as u8);
        }
        // All-ones PRG keeps the bus-conflict AND transparent.
        CnRom::new(vec![0xFF; 32 * 1024], chr, Mirroring::Horizontal)
    }

    #[test]
    fn chr_bank_switching() {
        let mut m = mapper();
        assert_eq!(m.chr_read(0x0000), 0);
        m.cpu_write(0x8000, 0x02);
        assert_eq!(m.chr_read(0x0000), 2);
        assert_eq!(m.chr_read(0x1FFF), 2);
    }

    #[test]
    fn chr_bank_wraps_modulo_count() {
        let mut m = mapper();
        m.cpu_write(0x8000, 0x06); // 6 mod 4 = 2
        assert_eq!(m.chr_read(0x0000), 2);
    }

    #[test]
    fn chr_writes_are_ignored() {
        let mut m = mapper();
        m.chr_write(0x0000, 0x99);
        assert_eq!(m.chr_read(0x0000), 0);
    }
}
