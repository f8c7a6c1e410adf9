//! NES CPU bus: address routing.
//!
//! Pure dispatch with no logic beyond range routing. Every address has
//! exactly one owner:
//!
//! - $0000-$1FFF: 2K internal RAM, mirrored every $0800
//! - $2000-$3FFF: PPU registers, mirrored every 8 bytes
//! - $4000-$4013, $4015: APU registers (stubbed)
//! - $4014: OAM DMA trigger
//! - $4016: controller strobe (write), controller 1 serial read
//! - $4017: APU frame counter (write), controller 2 serial read
//! - $4018-$4020: disabled APU test mode, accepted silently
//! - $4021-$5FFF: mapped to nothing — accessing it is a bus fault
//! - $6000-$7FFF: cartridge PRG RAM (mapper)
//! - $8000-$FFFF: cartridge PRG ROM (mapper)

use nestalgia_core::{Bus, BusFault};

use crate::apu::{Apu, OPEN_BUS};
use crate::controller::Controller;
use crate::mapper::Mapper;
use crate::ppu::Ppu;

/// The NES bus, implementing [`nestalgia_core::Bus`].
pub struct NesBus {
    /// 2K internal RAM.
    pub ram: [u8; 2048],
    /// PPU (2C02).
    pub ppu: Ppu,
    /// APU register stub.
    pub apu: Apu,
    /// Cartridge mapper.
    pub mapper: Box<dyn Mapper>,
    /// Controller 1 ($4016 reads).
    pub controller1: Controller,
    /// Controller 2 ($4017 reads).
    pub controller2: Controller,
    /// OAM DMA page latched by a $4014 write; the machine loop performs
    /// the transfer and stalls the CPU.
    pub oam_dma_page: Option<u8>,
}

impl NesBus {
    #[must_use]
    pub fn new(mapper: Box<dyn Mapper>) -> Self {
        Self {
            ram: [0; 2048],
            ppu: Ppu::new(),
            apu: Apu::new(),
            mapper,
            controller1: Controller::new(),
            controller2: Controller::new(),
            oam_dma_page: None,
        }
    }

    /// Side-effect-free read for tracing and inspection. Registers whose
    /// reads would perturb state report their raw value (PPU status) or
    /// the open-bus placeholder.
    #[must_use]
    pub fn peek(&self, addr: u16) -> u8 {
        match addr {
            0x0000..=0x1FFF => self.ram[(addr & 0x07FF) as usize],
            0x2000..=0x3FFF => match addr & 0x07 {
                2 => self.ppu.peek_status(),
                _ => OPEN_BUS,
            },
            0x4000..=0x4020 => OPEN_BUS,
            0x4021..=0x5FFF => OPEN_BUS,
            0x6000..=0xFFFF => self.mapper.cpu_read(addr),
        }
    }
}

impl Bus for NesBus {
    fn read(&mut self, addr: u16) -> Result<u8, BusFault> {
        let value = match addr {
            0x0000..=0x1FFF => self.ram[(addr & 0x07FF) as usize],
            0x2000..=0x3FFF => self.ppu.cpu_read(addr & 0x0007, self.mapper.as_mut()),
            0x4016 => self.controller1.read(),
            0x4017 => self.controller2.read(),
            0x4000..=0x4015 => self.apu.read(addr),
            0x4018..=0x4020 => OPEN_BUS,
            0x4021..=0x5FFF => return Err(BusFault::UnmappedRead(addr)),
            0x6000..=0xFFFF => self.mapper.cpu_read(addr),
        };
        Ok(value)
    }

    fn write(&mut self, addr: u16, value: u8) -> Result<(), BusFault> {
        match addr {
            0x0000..=0x1FFF => self.ram[(addr & 0x07FF) as usize] = value,
            0x2000..=0x3FFF => {
                self.ppu
                    .cpu_write(addr & 0x0007, value, self.mapper.as_mut());
            }
            0x4014 => self.oam_dma_page = Some(value),
            0x4016 => {
                // The strobe line is shared by both ports.
                self.controller1.write(value);
                self.controller2.write(value);
            }
            0x4000..=0x4013 | 0x4015 | 0x4017 => self.apu.write(addr, value),
            0x4018..=0x4020 => {} // disabled test-mode registers
            0x4021..=0x5FFF => return Err(BusFault::UnmappedWrite(addr)),
            0x6000..=0xFFFF => self.mapper.cpu_write(addr, value),
        }
        Ok(())
    }
}
