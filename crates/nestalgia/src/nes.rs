//! Top-level NES machine.
//!
//! The CPU's instruction loop drives everything: each instruction's
//! cycle cost advances the PPU three dots per CPU cycle, OAM DMA stalls
//! the CPU for 513 or 514 cycles depending on cycle parity, and PPU NMI
//! and mapper IRQ lines feed back into the CPU between instructions.
//!
//! There is no pacing and no cancellation inside the machine; a caller
//! stops between steps, and real-time pacing belongs to whatever
//! presents the frames.

use cpu_2a03::{CpuError, Rp2a03};
use nestalgia_core::{Bus, BusFault, Cpu, Observable, Value};
use thiserror::Error;

use crate::bus::NesBus;
use crate::cartridge::{Cartridge, CartridgeError};
use crate::config::NesConfig;
use crate::controller::Controller;
use crate::ppu;
use crate::snapshot::{CpuSnapshot, PpuSnapshot, Snapshot};

/// PPU dots per CPU cycle (NTSC).
const PPU_DOTS_PER_CPU_CYCLE: u32 = 3;

/// Fatal machine errors: bad cartridge data, an illegal opcode, or an
/// access outside every mapped bus range. Nothing here is retryable.
#[derive(Debug, Error)]
pub enum NesError {
    #[error(transparent)]
    Cartridge(#[from] CartridgeError),
    #[error(transparent)]
    Cpu(#[from] CpuError),
    #[error(transparent)]
    Bus(#[from] BusFault),
    #[error("trace output failed: {0}")]
    Io(#[from] std::io::Error),
}

/// NES machine.
pub struct Nes {
    cpu: Rp2a03,
    bus: NesBus,
}

impl core::fmt::Debug for Nes {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Nes").finish_non_exhaustive()
    }
}

impl Nes {
    /// Build a machine from an iNES image.
    ///
    /// # Errors
    ///
    /// Fails on a malformed header or an unsupported mapper id; both are
    /// configuration errors detected before emulation starts.
    pub fn new(config: &NesConfig) -> Result<Self, NesError> {
        let cartridge = Cartridge::from_ines_bytes(&config.rom_data)?;
        let mapper = cartridge.into_mapper()?;
        let mut bus = NesBus::new(mapper);
        let mut cpu = Rp2a03::new();
        cpu.reset(&mut bus)?;
        Ok(Self { cpu, bus })
    }

    /// Execute one CPU step and advance the PPU in lockstep.
    /// Returns the CPU cycles consumed.
    pub fn step(&mut self) -> Result<u32, NesError> {
        self.run_oam_dma()?;

        let cpu_cycles = self.cpu.step(&mut self.bus)?;

        for _ in 0..cpu_cycles * PPU_DOTS_PER_CPU_CYCLE {
            let NesBus { ppu, mapper, .. } = &mut self.bus;
            ppu.tick(mapper.as_mut());
            if ppu.take_nmi() {
                self.cpu.nmi();
            }
        }

        if self.bus.mapper.irq_pending() {
            self.cpu.interrupt();
        }

        Ok(cpu_cycles)
    }

    /// Run until the PPU completes the current frame. Returns the CPU
    /// cycles executed.
    pub fn run_frame(&mut self) -> Result<u64, NesError> {
        let frame = self.bus.ppu.frame();
        let mut cycles = 0u64;
        while self.bus.ppu.frame() == frame {
            cycles += u64::from(self.step()?);
        }
        Ok(cycles)
    }

    /// A $4014 write latches a page; the transfer copies 256 bytes into
    /// OAM and stalls the CPU 513 cycles (514 from an odd cycle).
    fn run_oam_dma(&mut self) -> Result<(), NesError> {
        let Some(page) = self.bus.oam_dma_page.take() else {
            return Ok(());
        };
        let base = u16::from(page) << 8;
        for i in 0..256 {
            let value = self.bus.read(base + i)?;
            self.bus.ppu.dma_write_oam(value);
        }
        let mut stall = 513;
        if self.cpu.cycles() % 2 == 1 {
            stall += 1;
        }
        self.cpu.add_stall(stall);
        Ok(())
    }

    /// Reset the machine: CPU from the reset vector, mapper to power-on
    /// banks.
    pub fn reset(&mut self) -> Result<(), NesError> {
        self.bus.mapper.reset();
        self.cpu.reset(&mut self.bus)?;
        Ok(())
    }

    // === Input ===

    /// Press a button on controller 1.
    pub fn press_button(&mut self, bit: u8) {
        self.bus.controller1.set_button(bit, true);
    }

    /// Release a button on controller 1.
    pub fn release_button(&mut self, bit: u8) {
        self.bus.controller1.set_button(bit, false);
    }

    /// Controller 1 reference.
    #[must_use]
    pub fn controller1(&self) -> &Controller {
        &self.bus.controller1
    }

    // === Read-only surfaces ===

    /// The most recently completed frame (ARGB32, 256x240).
    #[must_use]
    pub fn framebuffer(&self) -> &[u32] {
        self.bus.ppu.framebuffer()
    }

    #[must_use]
    pub fn framebuffer_width(&self) -> u32 {
        ppu::FB_WIDTH
    }

    #[must_use]
    pub fn framebuffer_height(&self) -> u32 {
        ppu::FB_HEIGHT
    }

    /// Reference to the CPU.
    #[must_use]
    pub fn cpu(&self) -> &Rp2a03 {
        &self.cpu
    }

    /// Reference to the bus.
    #[must_use]
    pub fn bus(&self) -> &NesBus {
        &self.bus
    }

    /// Mutable reference to the bus (controller wiring, tests).
    pub fn bus_mut(&mut self) -> &mut NesBus {
        &mut self.bus
    }

    /// Copy the externally visible state. The copy is taken between
    /// instructions, so it is always internally consistent; inspectors
    /// read it instead of live component fields.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        use cpu_2a03::flags;
        let p = self.cpu.regs.p;
        Snapshot {
            cpu: CpuSnapshot {
                a: self.cpu.regs.a,
                x: self.cpu.regs.x,
                y: self.cpu.regs.y,
                sp: self.cpu.regs.sp,
                pc: self.cpu.regs.pc,
                status: p.0,
                carry: p.is_set(flags::C),
                zero: p.is_set(flags::Z),
                interrupt_disable: p.is_set(flags::I),
                decimal: p.is_set(flags::D),
                overflow: p.is_set(flags::V),
                negative: p.is_set(flags::N),
                cycles: self.cpu.cycles(),
            },
            ppu: PpuSnapshot {
                scanline: self.bus.ppu.scanline(),
                dot: self.bus.ppu.dot(),
                frame: self.bus.ppu.frame(),
                palette: self.bus.ppu.palette_ram(),
                nametables: (0..4)
                    .map(|i| self.bus.ppu.nametable(i, self.bus.mapper.as_ref()).to_vec())
                    .collect(),
            },
            mapper: self.bus.mapper.state(),
        }
    }
}

impl Observable for Nes {
    fn query(&self, path: &str) -> Option<Value> {
        if let Some(rest) = path.strip_prefix("cpu.") {
            self.cpu.query(rest)
        } else if let Some(rest) = path.strip_prefix("ppu.") {
            match rest {
                "scanline" => Some(self.bus.ppu.scanline().into()),
                "dot" => Some(self.bus.ppu.dot().into()),
                "frame" => Some(self.bus.ppu.frame().into()),
                _ => None,
            }
        } else if let Some(rest) = path.strip_prefix("memory.") {
            let addr = if let Some(hex) = rest.strip_prefix('$') {
                u16::from_str_radix(hex, 16).ok()
            } else if let Some(hex) = rest.strip_prefix("0x") {
                u16::from_str_radix(hex, 16).ok()
            } else {
                rest.parse().ok()
            };
            addr.map(|a| Value::U8(self.bus.peek(a)))
        } else {
            self.cpu.query(path)
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &[
            "cpu.<register paths>",
            "ppu.scanline",
            "ppu.dot",
            "ppu.frame",
            "memory.<address>",
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Minimal 32K NROM image: `code` at $8000, vectors at the top.
    fn build_rom(code: &[u8], nmi_target: u16) -> Vec<u8> {
        let mut rom = vec![0u8; 16 + 32 * 1024 + 8 * 1024];
        rom[0..4].copy_from_slice(b"NES\x1A");
        rom[4] = 2;
        rom[5] = 1;
        rom[16..16 + code.len()].copy_from_slice(code);
        rom[16 + 0x7FFA] = nmi_target as u8;
        rom[16 + 0x7FFB] = (nmi_target >> 8) as u8;
        rom[16 + 0x7FFC] = 0x00;
        rom[16 + 0x7FFD] = 0x80;
        rom
    }

    fn make_nes(code: &[u8], nmi_target: u16) -> Nes {
        Nes::new(&NesConfig {
            rom_data: build_rom(code, nmi_target),
        })
        .expect("build machine")
    }

    #[test]
    fn unsupported_mapper_fails_at_construction() {
        let mut rom = build_rom(&[0xEA], 0x8000);
        rom[6] = 0x50; // mapper 5
        let err = Nes::new(&NesConfig { rom_data: rom }).expect_err("MMC5 unsupported");
        assert!(matches!(
            err,
            NesError::Cartridge(CartridgeError::UnsupportedMapper(5))
        ));
    }

    #[test]
    fn oam_dma_stalls_the_cpu() {
        // NOP sled; trigger DMA by hand and observe the stall burn down.
        let mut nes = make_nes(&[0xEA; 16], 0x8000);
        nes.bus.write(0x0200, 0x77).expect("seed DMA source");
        nes.bus.oam_dma_page = Some(0x02);
        // Reset leaves the cycle counter at 7 (odd): 514 stall cycles.
        let cycles = nes.step().expect("step");
        assert_eq!(cycles, 1);
        assert_eq!(nes.cpu.stall(), 513);
        // The transfer itself already happened.
        assert_eq!(nes.bus.ppu.read_oam(0), 0x77);
        let snapshot = nes.snapshot();
        assert_eq!(snapshot.cpu.cycles, 8);
    }

    #[test]
    fn oam_dma_stall_parity_follows_cycle_count() {
        let mut nes = make_nes(&[0xEA; 16], 0x8000);
        nes.step().expect("one NOP"); // cycles now 9, still odd
        nes.step().expect("another"); // 11
        // Burn one more cycle to make it even: stall from an even cycle
        // count is 513.
        nes.cpu.add_stall(1);
        nes.step().expect("stall cycle"); // cycles 12, even
        nes.bus.oam_dma_page = Some(0x00);
        nes.step().expect("dma step");
        assert_eq!(nes.cpu.stall(), 512);
    }

    #[test]
    fn vblank_nmi_reaches_the_cpu() {
        // Enable NMI via $2000, then idle; the NMI vector parks at $9000.
        // $8000: A9 80     LDA #$80
        // $8002: 8D 00 20  STA $2000
        // $8005: 4C 05 80  JMP $8005
        // $9000: 4C 00 90  JMP $9000  (NMI handler)
        let mut code = vec![0u8; 0x1010];
        code[0..8].copy_from_slice(&[0xA9, 0x80, 0x8D, 0x00, 0x20, 0x4C, 0x05, 0x80]);
        code[0x1000..0x1003].copy_from_slice(&[0x4C, 0x00, 0x90]);
        let mut nes = make_nes(&code, 0x9000);
        nes.run_frame().expect("frame");
        let pc = nes.cpu.regs.pc;
        assert!(
            (0x9000..=0x9002).contains(&pc),
            "NMI never delivered; PC=${pc:04X}"
        );
    }

    #[test]
    fn snapshot_is_internally_consistent() {
        let mut nes = make_nes(&[0xEA; 16], 0x8000);
        nes.step().expect("step");
        let snapshot = nes.snapshot();
        assert_eq!(snapshot.cpu.pc, nes.cpu.regs.pc);
        assert_eq!(snapshot.cpu.cycles, nes.cpu.cycles());
        assert!(snapshot.cpu.interrupt_disable);
        assert_eq!(snapshot.mapper.mapper_id, 0);
        assert_eq!(snapshot.ppu.nametables.len(), 4);
        assert_eq!(snapshot.ppu.nametables[0].len(), 1024);
        // Horizontal mirroring: logical tables 0 and 1 alias.
        assert_eq!(snapshot.ppu.nametables[0], snapshot.ppu.nametables[1]);
    }

    #[test]
    fn snapshot_serialises_to_json() {
        let nes = make_nes(&[0xEA; 16], 0x8000);
        let json = serde_json::to_value(nes.snapshot()).expect("serialise");
        assert_eq!(json["mapper"]["mapper_id"], 0);
        assert_eq!(json["cpu"]["sp"], 0xFD);
    }

    #[test]
    fn observable_paths_resolve() {
        let mut nes = make_nes(&[0xEA; 16], 0x8000);
        assert_eq!(nes.query("cpu.pc"), Some(Value::U16(0x8000)));
        assert_eq!(nes.query("ppu.frame"), Some(Value::U64(0)));
        nes.bus.ram[0] = 0xAB;
        assert_eq!(nes.query("memory.$0000"), Some(Value::U8(0xAB)));
        assert_eq!(nes.query("nonsense.path"), None);
    }
}
