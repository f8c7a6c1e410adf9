//! Instruction-stepped 2A03 execution engine.
//!
//! One `step()` = one instruction (or one delivered interrupt, or one
//! consumed DMA stall cycle). Cycle cost comes from the decode table plus
//! the page-crossing and branch penalties.

use nestalgia_core::{Bus, BusFault, Cpu, Observable, Value};
use thiserror::Error;

use crate::flags::{B, C, D, I, N, U, V, Z};
use crate::opcodes::{AddressingMode, Mnemonic, Operand, OPCODES};
use crate::{Registers, Status, IRQ_VECTOR, NMI_VECTOR, RESET_VECTOR};

/// Fatal execution errors.
///
/// The decode table is closed and fully populated, so an illegal opcode
/// means the program wandered into data (or a table bug); it is never a
/// recoverable runtime condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CpuError {
    #[error("illegal opcode ${opcode:02X} at ${pc:04X}")]
    IllegalOpcode { opcode: u8, pc: u16 },
    #[error(transparent)]
    Bus(#[from] BusFault),
}

/// The Ricoh 2A03 CPU.
#[derive(Debug)]
pub struct Rp2a03 {
    /// Architectural registers. The single owned register struct; helpers
    /// receive it by reference, never through shared pointers.
    pub regs: Registers,

    /// NMI line latched until serviced.
    nmi_pending: bool,
    /// IRQ line, level-sensitive, gated by the I flag.
    irq_pending: bool,
    /// Cycles the CPU is stalled for (OAM DMA).
    stall: u32,
    /// Total cycles since reset.
    cycles: u64,
}

impl Default for Rp2a03 {
    fn default() -> Self {
        Self::new()
    }
}

impl Rp2a03 {
    #[must_use]
    pub fn new() -> Self {
        Self {
            regs: Registers::new(),
            nmi_pending: false,
            irq_pending: false,
            stall: 0,
            cycles: 0,
        }
    }

    /// Total cycles executed since reset.
    #[must_use]
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Add stall cycles (OAM DMA). The CPU burns them one per step.
    pub fn add_stall(&mut self, cycles: u32) {
        self.stall += cycles;
    }

    /// Remaining stall cycles.
    #[must_use]
    pub fn stall(&self) -> u32 {
        self.stall
    }

    // =======================================================================
    // Bus helpers
    // =======================================================================

    fn fetch(&mut self, bus: &mut impl Bus) -> Result<u8, CpuError> {
        let value = bus.read(self.regs.pc)?;
        self.regs.pc = self.regs.pc.wrapping_add(1);
        Ok(value)
    }

    fn fetch_word(&mut self, bus: &mut impl Bus) -> Result<u16, CpuError> {
        let low = self.fetch(bus)?;
        let high = self.fetch(bus)?;
        Ok(u16::from_le_bytes([low, high]))
    }

    fn read_word(&mut self, bus: &mut impl Bus, addr: u16) -> Result<u16, CpuError> {
        let low = bus.read(addr)?;
        let high = bus.read(addr.wrapping_add(1))?;
        Ok(u16::from_le_bytes([low, high]))
    }

    /// Read a pointer from zero page; the high byte wraps within the page.
    fn read_word_zp(&mut self, bus: &mut impl Bus, base: u8) -> Result<u16, CpuError> {
        let low = bus.read(u16::from(base))?;
        let high = bus.read(u16::from(base.wrapping_add(1)))?;
        Ok(u16::from_le_bytes([low, high]))
    }

    /// Read a 16-bit word reproducing the JMP (indirect) hardware bug:
    /// when the low byte of the pointer is $FF, the high byte is fetched
    /// from the start of the same page instead of the next one.
    fn read_word_page_bug(&mut self, bus: &mut impl Bus, addr: u16) -> Result<u16, CpuError> {
        let low = bus.read(addr)?;
        let high_addr = (addr & 0xFF00) | (addr.wrapping_add(1) & 0x00FF);
        let high = bus.read(high_addr)?;
        Ok(u16::from_le_bytes([low, high]))
    }

    fn push(&mut self, bus: &mut impl Bus, value: u8) -> Result<(), CpuError> {
        bus.write(0x0100 | u16::from(self.regs.sp), value)?;
        self.regs.sp = self.regs.sp.wrapping_sub(1);
        Ok(())
    }

    fn pull(&mut self, bus: &mut impl Bus) -> Result<u8, CpuError> {
        self.regs.sp = self.regs.sp.wrapping_add(1);
        Ok(bus.read(0x0100 | u16::from(self.regs.sp))?)
    }

    fn push_word(&mut self, bus: &mut impl Bus, value: u16) -> Result<(), CpuError> {
        self.push(bus, (value >> 8) as u8)?;
        self.push(bus, value as u8)
    }

    fn pull_word(&mut self, bus: &mut impl Bus) -> Result<u16, CpuError> {
        let low = self.pull(bus)?;
        let high = self.pull(bus)?;
        Ok(u16::from_le_bytes([low, high]))
    }

    // =======================================================================
    // Addressing-mode resolution
    // =======================================================================

    /// Resolve an instruction argument. Returns the operand and whether
    /// the effective address crossed a page boundary (the penalty is only
    /// charged for opcodes the table marks as sensitive).
    fn resolve(
        &mut self,
        bus: &mut impl Bus,
        mode: AddressingMode,
    ) -> Result<(Operand, bool), CpuError> {
        let operand = match mode {
            AddressingMode::Implied => (Operand::Implied, false),
            AddressingMode::Accumulator => (Operand::Accumulator, false),
            AddressingMode::Immediate => (Operand::Immediate(self.fetch(bus)?), false),
            AddressingMode::ZeroPage => (Operand::Address(u16::from(self.fetch(bus)?)), false),
            AddressingMode::ZeroPageX => {
                let base = self.fetch(bus)?;
                (
                    Operand::Address(u16::from(base.wrapping_add(self.regs.x))),
                    false,
                )
            }
            AddressingMode::ZeroPageY => {
                let base = self.fetch(bus)?;
                (
                    Operand::Address(u16::from(base.wrapping_add(self.regs.y))),
                    false,
                )
            }
            AddressingMode::Absolute => (Operand::Address(self.fetch_word(bus)?), false),
            AddressingMode::AbsoluteX => {
                let base = self.fetch_word(bus)?;
                let addr = base.wrapping_add(u16::from(self.regs.x));
                (Operand::Address(addr), pages_differ(base, addr))
            }
            AddressingMode::AbsoluteY => {
                let base = self.fetch_word(bus)?;
                let addr = base.wrapping_add(u16::from(self.regs.y));
                (Operand::Address(addr), pages_differ(base, addr))
            }
            AddressingMode::Indirect => {
                let ptr = self.fetch_word(bus)?;
                (Operand::Address(self.read_word_page_bug(bus, ptr)?), false)
            }
            AddressingMode::IndirectX => {
                let ptr = self.fetch(bus)?.wrapping_add(self.regs.x);
                (Operand::Address(self.read_word_zp(bus, ptr)?), false)
            }
            AddressingMode::IndirectY => {
                // Dereference first, then add Y; the order matters for
                // page-cross accounting.
                let ptr = self.fetch(bus)?;
                let base = self.read_word_zp(bus, ptr)?;
                let addr = base.wrapping_add(u16::from(self.regs.y));
                (Operand::Address(addr), pages_differ(base, addr))
            }
            AddressingMode::Relative => {
                let offset = self.fetch(bus)? as i8;
                (
                    Operand::Relative(self.regs.pc.wrapping_add(offset as u16)),
                    false,
                )
            }
        };
        Ok(operand)
    }

    /// Read the value an operand designates.
    fn load(&mut self, bus: &mut impl Bus, operand: Operand) -> Result<u8, CpuError> {
        match operand {
            Operand::Accumulator => Ok(self.regs.a),
            Operand::Immediate(value) => Ok(value),
            Operand::Address(addr) => Ok(bus.read(addr)?),
            Operand::Implied | Operand::Relative(_) => {
                unreachable!("operand carries no readable value")
            }
        }
    }

    /// Write a value where an operand designates.
    fn store(&mut self, bus: &mut impl Bus, operand: Operand, value: u8) -> Result<(), CpuError> {
        match operand {
            Operand::Accumulator => {
                self.regs.a = value;
                Ok(())
            }
            Operand::Address(addr) => Ok(bus.write(addr, value)?),
            Operand::Implied | Operand::Immediate(_) | Operand::Relative(_) => {
                unreachable!("operand is not writable")
            }
        }
    }

    // =======================================================================
    // Interrupts
    // =======================================================================

    /// Service a pending interrupt, if any. Called between instructions.
    fn check_interrupts(&mut self, bus: &mut impl Bus) -> Result<Option<u32>, CpuError> {
        if self.nmi_pending {
            self.nmi_pending = false;
            return self.service_interrupt(bus, NMI_VECTOR).map(Some);
        }
        if self.irq_pending {
            self.irq_pending = false;
            if !self.regs.p.is_set(I) {
                return self.service_interrupt(bus, IRQ_VECTOR).map(Some);
            }
        }
        Ok(None)
    }

    /// Push PC and status, set I, load PC from the vector. 7 cycles.
    fn service_interrupt(&mut self, bus: &mut impl Bus, vector: u16) -> Result<u32, CpuError> {
        self.push_word(bus, self.regs.pc)?;
        self.push(bus, self.regs.p.to_byte_irq())?;
        self.regs.p.set(I);
        self.regs.pc = self.read_word(bus, vector)?;
        Ok(7)
    }

    // =======================================================================
    // Instruction semantics
    // =======================================================================

    fn adc(&mut self, value: u8) {
        // Binary only: the 2A03's BCD circuit is disconnected.
        let a = self.regs.a;
        let carry = u16::from(self.regs.p.is_set(C));
        let sum = u16::from(a) + u16::from(value) + carry;
        let result = sum as u8;
        self.regs.p.set_if(C, sum > 0xFF);
        self.regs
            .p
            .set_if(V, (a ^ result) & (value ^ result) & 0x80 != 0);
        self.regs.a = result;
        self.regs.p.update_nz(result);
    }

    fn sbc(&mut self, value: u8) {
        // SBC is ADC of the one's complement; carry set means no borrow.
        self.adc(!value);
    }

    fn compare(&mut self, register: u8, value: u8) {
        self.regs.p.set_if(C, register >= value);
        self.regs.p.update_nz(register.wrapping_sub(value));
    }

    fn asl(&mut self, value: u8) -> u8 {
        self.regs.p.set_if(C, value & 0x80 != 0);
        let result = value << 1;
        self.regs.p.update_nz(result);
        result
    }

    fn lsr(&mut self, value: u8) -> u8 {
        self.regs.p.set_if(C, value & 0x01 != 0);
        let result = value >> 1;
        self.regs.p.update_nz(result);
        result
    }

    fn rol(&mut self, value: u8) -> u8 {
        let carry_in = u8::from(self.regs.p.is_set(C));
        self.regs.p.set_if(C, value & 0x80 != 0);
        let result = (value << 1) | carry_in;
        self.regs.p.update_nz(result);
        result
    }

    fn ror(&mut self, value: u8) -> u8 {
        let carry_in = u8::from(self.regs.p.is_set(C)) << 7;
        self.regs.p.set_if(C, value & 0x01 != 0);
        let result = (value >> 1) | carry_in;
        self.regs.p.update_nz(result);
        result
    }

    /// Take the branch when `taken`; returns the extra cycles (+1 taken,
    /// +1 more when the target is on a different page).
    fn branch(&mut self, taken: bool, target: u16) -> u32 {
        if !taken {
            return 0;
        }
        let extra = if pages_differ(self.regs.pc, target) {
            2
        } else {
            1
        };
        self.regs.pc = target;
        extra
    }

    /// Execute one decoded instruction. Returns extra cycles beyond the
    /// table entry (branches only).
    fn exec(
        &mut self,
        bus: &mut impl Bus,
        mnemonic: Mnemonic,
        operand: Operand,
        opcode: u8,
        pc: u16,
    ) -> Result<u32, CpuError> {
        match mnemonic {
            // Loads and stores
            Mnemonic::Lda => {
                self.regs.a = self.load(bus, operand)?;
                self.regs.p.update_nz(self.regs.a);
            }
            Mnemonic::Ldx => {
                self.regs.x = self.load(bus, operand)?;
                self.regs.p.update_nz(self.regs.x);
            }
            Mnemonic::Ldy => {
                self.regs.y = self.load(bus, operand)?;
                self.regs.p.update_nz(self.regs.y);
            }
            Mnemonic::Sta => self.store(bus, operand, self.regs.a)?,
            Mnemonic::Stx => self.store(bus, operand, self.regs.x)?,
            Mnemonic::Sty => self.store(bus, operand, self.regs.y)?,

            // Transfers
            Mnemonic::Tax => {
                self.regs.x = self.regs.a;
                self.regs.p.update_nz(self.regs.x);
            }
            Mnemonic::Tay => {
                self.regs.y = self.regs.a;
                self.regs.p.update_nz(self.regs.y);
            }
            Mnemonic::Tsx => {
                self.regs.x = self.regs.sp;
                self.regs.p.update_nz(self.regs.x);
            }
            Mnemonic::Txa => {
                self.regs.a = self.regs.x;
                self.regs.p.update_nz(self.regs.a);
            }
            Mnemonic::Txs => self.regs.sp = self.regs.x,
            Mnemonic::Tya => {
                self.regs.a = self.regs.y;
                self.regs.p.update_nz(self.regs.a);
            }

            // Stack
            Mnemonic::Pha => self.push(bus, self.regs.a)?,
            Mnemonic::Php => self.push(bus, self.regs.p.to_byte_brk())?,
            Mnemonic::Pla => {
                self.regs.a = self.pull(bus)?;
                self.regs.p.update_nz(self.regs.a);
            }
            Mnemonic::Plp => {
                let value = self.pull(bus)?;
                self.regs.p = Status::from_pull(value);
            }

            // Arithmetic and compares
            Mnemonic::Adc => {
                let value = self.load(bus, operand)?;
                self.adc(value);
            }
            Mnemonic::Sbc => {
                let value = self.load(bus, operand)?;
                self.sbc(value);
            }
            Mnemonic::Cmp => {
                let value = self.load(bus, operand)?;
                self.compare(self.regs.a, value);
            }
            Mnemonic::Cpx => {
                let value = self.load(bus, operand)?;
                self.compare(self.regs.x, value);
            }
            Mnemonic::Cpy => {
                let value = self.load(bus, operand)?;
                self.compare(self.regs.y, value);
            }

            // Logical
            Mnemonic::And => {
                let value = self.load(bus, operand)?;
                self.regs.a &= value;
                self.regs.p.update_nz(self.regs.a);
            }
            Mnemonic::Ora => {
                let value = self.load(bus, operand)?;
                self.regs.a |= value;
                self.regs.p.update_nz(self.regs.a);
            }
            Mnemonic::Eor => {
                let value = self.load(bus, operand)?;
                self.regs.a ^= value;
                self.regs.p.update_nz(self.regs.a);
            }
            Mnemonic::Bit => {
                let value = self.load(bus, operand)?;
                self.regs.p.set_if(Z, self.regs.a & value == 0);
                self.regs.p.set_if(N, value & 0x80 != 0);
                self.regs.p.set_if(V, value & 0x40 != 0);
            }

            // Shifts and rotates
            Mnemonic::Asl => {
                let value = self.load(bus, operand)?;
                let result = self.asl(value);
                self.store(bus, operand, result)?;
            }
            Mnemonic::Lsr => {
                let value = self.load(bus, operand)?;
                let result = self.lsr(value);
                self.store(bus, operand, result)?;
            }
            Mnemonic::Rol => {
                let value = self.load(bus, operand)?;
                let result = self.rol(value);
                self.store(bus, operand, result)?;
            }
            Mnemonic::Ror => {
                let value = self.load(bus, operand)?;
                let result = self.ror(value);
                self.store(bus, operand, result)?;
            }

            // Increment / decrement
            Mnemonic::Inc => {
                let result = self.load(bus, operand)?.wrapping_add(1);
                self.regs.p.update_nz(result);
                self.store(bus, operand, result)?;
            }
            Mnemonic::Dec => {
                let result = self.load(bus, operand)?.wrapping_sub(1);
                self.regs.p.update_nz(result);
                self.store(bus, operand, result)?;
            }
            Mnemonic::Inx => {
                self.regs.x = self.regs.x.wrapping_add(1);
                self.regs.p.update_nz(self.regs.x);
            }
            Mnemonic::Iny => {
                self.regs.y = self.regs.y.wrapping_add(1);
                self.regs.p.update_nz(self.regs.y);
            }
            Mnemonic::Dex => {
                self.regs.x = self.regs.x.wrapping_sub(1);
                self.regs.p.update_nz(self.regs.x);
            }
            Mnemonic::Dey => {
                self.regs.y = self.regs.y.wrapping_sub(1);
                self.regs.p.update_nz(self.regs.y);
            }

            // Control flow
            Mnemonic::Jmp => {
                let Operand::Address(addr) = operand else {
                    unreachable!("JMP decodes to an address operand");
                };
                self.regs.pc = addr;
            }
            Mnemonic::Jsr => {
                let Operand::Address(addr) = operand else {
                    unreachable!("JSR decodes to an address operand");
                };
                // Push the address of the last byte of the JSR.
                self.push_word(bus, self.regs.pc.wrapping_sub(1))?;
                self.regs.pc = addr;
            }
            Mnemonic::Rts => {
                self.regs.pc = self.pull_word(bus)?.wrapping_add(1);
            }
            Mnemonic::Rti => {
                let status = self.pull(bus)?;
                self.regs.p = Status::from_pull(status);
                self.regs.pc = self.pull_word(bus)?;
            }
            Mnemonic::Brk => {
                // Software IRQ: the byte after BRK is padding.
                self.push_word(bus, self.regs.pc.wrapping_add(1))?;
                self.push(bus, self.regs.p.to_byte_brk())?;
                self.regs.p.set(I);
                self.regs.pc = self.read_word(bus, IRQ_VECTOR)?;
            }

            // Branches
            Mnemonic::Bcc | Mnemonic::Bcs | Mnemonic::Beq | Mnemonic::Bmi | Mnemonic::Bne
            | Mnemonic::Bpl | Mnemonic::Bvc | Mnemonic::Bvs => {
                let Operand::Relative(target) = operand else {
                    unreachable!("branches decode to a relative operand");
                };
                let taken = match mnemonic {
                    Mnemonic::Bcc => !self.regs.p.is_set(C),
                    Mnemonic::Bcs => self.regs.p.is_set(C),
                    Mnemonic::Beq => self.regs.p.is_set(Z),
                    Mnemonic::Bne => !self.regs.p.is_set(Z),
                    Mnemonic::Bmi => self.regs.p.is_set(N),
                    Mnemonic::Bpl => !self.regs.p.is_set(N),
                    Mnemonic::Bvc => !self.regs.p.is_set(V),
                    Mnemonic::Bvs => self.regs.p.is_set(V),
                    _ => unreachable!(),
                };
                return Ok(self.branch(taken, target));
            }

            // Flag operations
            Mnemonic::Clc => self.regs.p.clear(C),
            Mnemonic::Cld => self.regs.p.clear(D),
            Mnemonic::Cli => self.regs.p.clear(I),
            Mnemonic::Clv => self.regs.p.clear(V),
            Mnemonic::Sec => self.regs.p.set(C),
            Mnemonic::Sed => self.regs.p.set(D),
            Mnemonic::Sei => self.regs.p.set(I),

            // NOP in all its widths; operand bytes were already consumed.
            Mnemonic::Nop => {}

            // Undocumented, stable
            Mnemonic::Lax => {
                let value = self.load(bus, operand)?;
                self.regs.a = value;
                self.regs.x = value;
                self.regs.p.update_nz(value);
            }
            Mnemonic::Sax => self.store(bus, operand, self.regs.a & self.regs.x)?,
            Mnemonic::Dcp => {
                let result = self.load(bus, operand)?.wrapping_sub(1);
                self.store(bus, operand, result)?;
                self.compare(self.regs.a, result);
            }
            Mnemonic::Isc => {
                let result = self.load(bus, operand)?.wrapping_add(1);
                self.store(bus, operand, result)?;
                self.sbc(result);
            }
            Mnemonic::Slo => {
                let value = self.load(bus, operand)?;
                let result = self.asl(value);
                self.store(bus, operand, result)?;
                self.regs.a |= result;
                self.regs.p.update_nz(self.regs.a);
            }
            Mnemonic::Rla => {
                let value = self.load(bus, operand)?;
                let result = self.rol(value);
                self.store(bus, operand, result)?;
                self.regs.a &= result;
                self.regs.p.update_nz(self.regs.a);
            }
            Mnemonic::Sre => {
                let value = self.load(bus, operand)?;
                let result = self.lsr(value);
                self.store(bus, operand, result)?;
                self.regs.a ^= result;
                self.regs.p.update_nz(self.regs.a);
            }
            Mnemonic::Rra => {
                let value = self.load(bus, operand)?;
                let result = self.ror(value);
                self.store(bus, operand, result)?;
                self.adc(result);
            }
            Mnemonic::Anc => {
                let value = self.load(bus, operand)?;
                self.regs.a &= value;
                self.regs.p.update_nz(self.regs.a);
                self.regs.p.set_if(C, self.regs.a & 0x80 != 0);
            }
            Mnemonic::Alr => {
                let value = self.regs.a & self.load(bus, operand)?;
                self.regs.a = self.lsr(value);
            }
            Mnemonic::Arr => {
                let value = self.regs.a & self.load(bus, operand)?;
                let carry_in = u8::from(self.regs.p.is_set(C)) << 7;
                let result = (value >> 1) | carry_in;
                self.regs.a = result;
                self.regs.p.update_nz(result);
                self.regs.p.set_if(C, result & 0x40 != 0);
                self.regs
                    .p
                    .set_if(V, ((result >> 6) ^ (result >> 5)) & 1 != 0);
            }
            Mnemonic::Sbx => {
                let value = self.load(bus, operand)?;
                let base = self.regs.a & self.regs.x;
                self.regs.p.set_if(C, base >= value);
                self.regs.x = base.wrapping_sub(value);
                self.regs.p.update_nz(self.regs.x);
            }

            // Undocumented, unstable: never executed.
            Mnemonic::Jam
            | Mnemonic::Xaa
            | Mnemonic::Lxa
            | Mnemonic::Ahx
            | Mnemonic::Tas
            | Mnemonic::Shx
            | Mnemonic::Shy
            | Mnemonic::Las => {
                return Err(CpuError::IllegalOpcode { opcode, pc });
            }
        }
        Ok(0)
    }
}

impl Cpu for Rp2a03 {
    type Error = CpuError;

    fn step<B: Bus>(&mut self, bus: &mut B) -> Result<u32, CpuError> {
        // DMA stall burns one cycle per step.
        if self.stall > 0 {
            self.stall -= 1;
            self.cycles += 1;
            return Ok(1);
        }

        // Interrupts are checked between instructions.
        if let Some(cycles) = self.check_interrupts(bus)? {
            self.cycles += u64::from(cycles);
            return Ok(cycles);
        }

        let pc = self.regs.pc;
        let opcode = self.fetch(bus)?;
        let info = &OPCODES[opcode as usize];
        let (operand, page_crossed) = self.resolve(bus, info.mode)?;

        let mut cycles = info.cycles;
        if page_crossed && info.page_penalty {
            cycles += 1;
        }
        cycles += self.exec(bus, info.mnemonic, operand, opcode, pc)?;

        self.cycles += u64::from(cycles);
        Ok(cycles)
    }

    fn reset<B: Bus>(&mut self, bus: &mut B) -> Result<(), CpuError> {
        self.regs = Registers::new();
        self.regs.pc = self.read_word(bus, RESET_VECTOR)?;
        self.nmi_pending = false;
        self.irq_pending = false;
        self.stall = 0;
        // The reset sequence itself takes 7 cycles.
        self.cycles = 7;
        Ok(())
    }

    fn interrupt(&mut self) {
        self.irq_pending = true;
    }

    fn nmi(&mut self) {
        self.nmi_pending = true;
    }

    fn pc(&self) -> u16 {
        self.regs.pc
    }
}

impl Observable for Rp2a03 {
    fn query(&self, path: &str) -> Option<Value> {
        match path {
            "pc" => Some(self.regs.pc.into()),
            "a" => Some(self.regs.a.into()),
            "x" => Some(self.regs.x.into()),
            "y" => Some(self.regs.y.into()),
            "sp" => Some(self.regs.sp.into()),
            "p" | "status" => Some(self.regs.p.0.into()),
            "flags.c" => Some(self.regs.p.is_set(C).into()),
            "flags.z" => Some(self.regs.p.is_set(Z).into()),
            "flags.i" => Some(self.regs.p.is_set(I).into()),
            "flags.d" => Some(self.regs.p.is_set(D).into()),
            "flags.b" => Some(self.regs.p.is_set(B).into()),
            "flags.u" => Some(self.regs.p.is_set(U).into()),
            "flags.v" => Some(self.regs.p.is_set(V).into()),
            "flags.n" => Some(self.regs.p.is_set(N).into()),
            "cycles" => Some(self.cycles.into()),
            "stall" => Some(u64::from(self.stall).into()),
            _ => None,
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &[
            "pc", "a", "x", "y", "sp", "p", "flags.c", "flags.z", "flags.i", "flags.d", "flags.b",
            "flags.u", "flags.v", "flags.n", "cycles", "stall",
        ]
    }
}

fn pages_differ(a: u16, b: u16) -> bool {
    a & 0xFF00 != b & 0xFF00
}

#[cfg(test)]
mod tests {
    use super::*;
    use nestalgia_core::SimpleBus;

    /// CPU with PC at $0200 and the given program loaded there.
    fn setup(program: &[u8]) -> (Rp2a03, SimpleBus) {
        let mut bus = SimpleBus::new();
        bus.load(0x0200, program);
        bus.load(RESET_VECTOR, &[0x00, 0x02]);
        let mut cpu = Rp2a03::new();
        cpu.reset(&mut bus).expect("simple bus never faults");
        (cpu, bus)
    }

    fn run(cpu: &mut Rp2a03, bus: &mut SimpleBus, instructions: usize) {
        for _ in 0..instructions {
            cpu.step(bus).expect("step");
        }
    }

    #[test]
    fn reset_loads_vector_and_charges_seven_cycles() {
        let (cpu, _) = setup(&[0xEA]);
        assert_eq!(cpu.regs.pc, 0x0200);
        assert_eq!(cpu.regs.sp, 0xFD);
        assert_eq!(cpu.regs.p.0, 0x24);
        assert_eq!(cpu.cycles(), 7);
    }

    #[test]
    fn adc_carries_out() {
        // A=$02 + $FF with carry clear -> A=$01, C=1, Z=0, N=0
        let (mut cpu, mut bus) = setup(&[0xA9, 0x02, 0x69, 0xFF]);
        run(&mut cpu, &mut bus, 2);
        assert_eq!(cpu.regs.a, 0x01);
        assert!(cpu.regs.p.is_set(C));
        assert!(!cpu.regs.p.is_set(Z));
        assert!(!cpu.regs.p.is_set(N));
    }

    #[test]
    fn sbc_borrows() {
        // A=$02 - $FF with carry set (no pending borrow) -> A=$03, C=0
        let (mut cpu, mut bus) = setup(&[0xA9, 0x02, 0x38, 0xE9, 0xFF]);
        run(&mut cpu, &mut bus, 3);
        assert_eq!(cpu.regs.a, 0x03);
        assert!(!cpu.regs.p.is_set(C));
    }

    #[test]
    fn adc_signed_overflow() {
        // $50 + $50 = $A0: unsigned fine, signed overflow
        let (mut cpu, mut bus) = setup(&[0xA9, 0x50, 0x69, 0x50]);
        run(&mut cpu, &mut bus, 2);
        assert_eq!(cpu.regs.a, 0xA0);
        assert!(cpu.regs.p.is_set(V));
        assert!(cpu.regs.p.is_set(N));
        assert!(!cpu.regs.p.is_set(C));
    }

    #[test]
    fn page_cross_costs_one_extra_cycle() {
        // LDA $02F0,X with X=$20 crosses into $0310
        let (mut cpu, mut bus) = setup(&[0xA2, 0x20, 0xBD, 0xF0, 0x02]);
        run(&mut cpu, &mut bus, 1); // LDX
        let before = cpu.cycles();
        run(&mut cpu, &mut bus, 1); // LDA abs,X
        assert_eq!(cpu.cycles() - before, 5);

        // Same read without crossing costs the base 4
        let (mut cpu, mut bus) = setup(&[0xA2, 0x01, 0xBD, 0xF0, 0x02]);
        run(&mut cpu, &mut bus, 1);
        let before = cpu.cycles();
        run(&mut cpu, &mut bus, 1);
        assert_eq!(cpu.cycles() - before, 4);
    }

    #[test]
    fn store_never_pays_page_penalty() {
        // STA abs,X is always 5 cycles, crossing or not
        let (mut cpu, mut bus) = setup(&[0xA2, 0x20, 0x9D, 0xF0, 0x02]);
        run(&mut cpu, &mut bus, 1);
        let before = cpu.cycles();
        run(&mut cpu, &mut bus, 1);
        assert_eq!(cpu.cycles() - before, 5);
    }

    #[test]
    fn branch_cycle_accounting() {
        // Not taken: 2. Taken, same page: 3.
        let (mut cpu, mut bus) = setup(&[0x18, 0xB0, 0x02, 0x90, 0x02]);
        run(&mut cpu, &mut bus, 1); // CLC
        let before = cpu.cycles();
        run(&mut cpu, &mut bus, 1); // BCS, not taken
        assert_eq!(cpu.cycles() - before, 2);
        let before = cpu.cycles();
        run(&mut cpu, &mut bus, 1); // BCC, taken, same page
        assert_eq!(cpu.cycles() - before, 3);
    }

    #[test]
    fn branch_to_other_page_costs_two_extra() {
        // BNE back across the page boundary: 2 + 2 cycles
        let mut bus = SimpleBus::new();
        // Program at $0200: LDX #$01 (Z clear); BNE -5 -> $01FE
        bus.load(0x0200, &[0xA2, 0x01, 0xD0, 0xFB]);
        bus.load(RESET_VECTOR, &[0x00, 0x02]);
        let mut cpu = Rp2a03::new();
        cpu.reset(&mut bus).expect("reset");
        run(&mut cpu, &mut bus, 1);
        let before = cpu.cycles();
        run(&mut cpu, &mut bus, 1);
        assert_eq!(cpu.cycles() - before, 4);
        assert_eq!(cpu.regs.pc, 0x01FF);
    }

    #[test]
    fn jmp_indirect_page_bug() {
        // Pointer at $10FF: low byte from $10FF, high from $1000 (not $1100)
        let mut bus = SimpleBus::new();
        bus.load(0x0200, &[0x6C, 0xFF, 0x10]);
        bus.load(0x10FF, &[0x34]);
        bus.load(0x1000, &[0x12]);
        bus.load(0x1100, &[0x99]); // would be read without the bug
        bus.load(RESET_VECTOR, &[0x00, 0x02]);
        let mut cpu = Rp2a03::new();
        cpu.reset(&mut bus).expect("reset");
        cpu.step(&mut bus).expect("step");
        assert_eq!(cpu.regs.pc, 0x1234);
    }

    #[test]
    fn indirect_y_dereferences_then_adds() {
        // Pointer at $40 -> $02F0; Y=$20 -> effective $0310, page crossed
        let (mut cpu, mut bus) = setup(&[0xA0, 0x20, 0xB1, 0x40]);
        bus.load(0x0040, &[0xF0, 0x02]);
        bus.load(0x0310, &[0x5A]);
        run(&mut cpu, &mut bus, 1); // LDY
        let before = cpu.cycles();
        run(&mut cpu, &mut bus, 1); // LDA (zp),Y
        assert_eq!(cpu.regs.a, 0x5A);
        assert_eq!(cpu.cycles() - before, 6); // 5 + page cross
    }

    #[test]
    fn indirect_x_wraps_in_zero_page() {
        // Operand $FF + X=$02 wraps to pointer at $01
        let (mut cpu, mut bus) = setup(&[0xA2, 0x02, 0xA1, 0xFF]);
        bus.load(0x0001, &[0x00, 0x03]);
        bus.load(0x0300, &[0x77]);
        run(&mut cpu, &mut bus, 2);
        assert_eq!(cpu.regs.a, 0x77);
    }

    #[test]
    fn stack_wraps_silently() {
        // Push with SP=$00 wraps to $FF; hardware behavior, not an error.
        let (mut cpu, mut bus) = setup(&[0xA2, 0x00, 0x9A, 0x48]);
        cpu.regs.a = 0xAB;
        run(&mut cpu, &mut bus, 3);
        assert_eq!(cpu.regs.sp, 0xFF);
        assert_eq!(bus.peek(0x0100), 0xAB);
    }

    #[test]
    fn jsr_rts_round_trip() {
        let (mut cpu, mut bus) = setup(&[0x20, 0x00, 0x03]);
        bus.load(0x0300, &[0x60]); // RTS
        run(&mut cpu, &mut bus, 1);
        assert_eq!(cpu.regs.pc, 0x0300);
        run(&mut cpu, &mut bus, 1);
        assert_eq!(cpu.regs.pc, 0x0203);
    }

    #[test]
    fn brk_behaves_as_software_irq() {
        let mut bus = SimpleBus::new();
        bus.load(0x0200, &[0x58, 0x00]); // CLI; BRK
        bus.load(IRQ_VECTOR, &[0x00, 0x03]);
        bus.load(RESET_VECTOR, &[0x00, 0x02]);
        let mut cpu = Rp2a03::new();
        cpu.reset(&mut bus).expect("reset");
        run(&mut cpu, &mut bus, 2);
        assert_eq!(cpu.regs.pc, 0x0300);
        assert!(cpu.regs.p.is_set(I));
        // Pushed status has B set; return address is BRK+2.
        let status = bus.peek(0x0100 | u16::from(cpu.regs.sp.wrapping_add(1)));
        assert!(status & B != 0);
        let lo = bus.peek(0x0100 | u16::from(cpu.regs.sp.wrapping_add(2)));
        let hi = bus.peek(0x0100 | u16::from(cpu.regs.sp.wrapping_add(3)));
        assert_eq!(u16::from_le_bytes([lo, hi]), 0x0203);
    }

    #[test]
    fn nmi_is_serviced_between_instructions() {
        let mut bus = SimpleBus::new();
        bus.load(0x0200, &[0xEA, 0xEA]);
        bus.load(NMI_VECTOR, &[0x00, 0x04]);
        bus.load(RESET_VECTOR, &[0x00, 0x02]);
        let mut cpu = Rp2a03::new();
        cpu.reset(&mut bus).expect("reset");
        cpu.nmi();
        let cycles = cpu.step(&mut bus).expect("step");
        assert_eq!(cycles, 7);
        assert_eq!(cpu.regs.pc, 0x0400);
        assert!(cpu.regs.p.is_set(I));
    }

    #[test]
    fn irq_is_masked_by_interrupt_disable() {
        let mut bus = SimpleBus::new();
        bus.load(0x0200, &[0xEA]);
        bus.load(IRQ_VECTOR, &[0x00, 0x04]);
        bus.load(RESET_VECTOR, &[0x00, 0x02]);
        let mut cpu = Rp2a03::new();
        cpu.reset(&mut bus).expect("reset");
        // I is set after reset: the IRQ is swallowed, the NOP runs.
        cpu.interrupt();
        cpu.step(&mut bus).expect("step");
        assert_eq!(cpu.regs.pc, 0x0201);
    }

    #[test]
    fn stall_consumes_one_cycle_per_step() {
        let (mut cpu, mut bus) = setup(&[0xEA]);
        cpu.add_stall(3);
        for _ in 0..3 {
            assert_eq!(cpu.step(&mut bus).expect("step"), 1);
        }
        assert_eq!(cpu.stall(), 0);
        // Next step executes the NOP.
        assert_eq!(cpu.step(&mut bus).expect("step"), 2);
    }

    #[test]
    fn illegal_opcode_is_fatal_with_location() {
        let (mut cpu, mut bus) = setup(&[0x02]); // JAM
        let err = cpu.step(&mut bus).expect_err("JAM must not execute");
        assert_eq!(
            err,
            CpuError::IllegalOpcode {
                opcode: 0x02,
                pc: 0x0200
            }
        );
    }

    #[test]
    fn lax_loads_both_registers() {
        let (mut cpu, mut bus) = setup(&[0xA7, 0x10]);
        bus.load(0x0010, &[0x8F]);
        run(&mut cpu, &mut bus, 1);
        assert_eq!(cpu.regs.a, 0x8F);
        assert_eq!(cpu.regs.x, 0x8F);
        assert!(cpu.regs.p.is_set(N));
    }

    #[test]
    fn dcp_decrements_then_compares() {
        let (mut cpu, mut bus) = setup(&[0xA9, 0x40, 0xC7, 0x10]);
        bus.load(0x0010, &[0x41]);
        run(&mut cpu, &mut bus, 2);
        assert_eq!(bus.peek(0x0010), 0x40);
        assert!(cpu.regs.p.is_set(Z)); // A == M after decrement
        assert!(cpu.regs.p.is_set(C));
    }
}
