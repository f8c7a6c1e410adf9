//! Deterministic execution tracing.
//!
//! One line per executed instruction: program counter, raw opcode
//! bytes, disassembly, then the post-instruction register, flag, and
//! cycle values. Given the same ROM and input sequence the output is
//! byte-for-byte reproducible, which is what makes it usable as a
//! golden-file conformance format.
//!
//! ```text
//! 8000  78        SEI                             A:00 X:00 Y:00 P:24 SP:FD CYC:9
//! ```
//!
//! The disassembly comes from the CPU's own decode table
//! ([`cpu_2a03::OPCODES`]); nothing here re-derives instruction shapes.

use std::io::Write;

use cpu_2a03::{disasm, OPCODES};

use crate::nes::{Nes, NesError};

/// Execute one step, writing a trace line for the instruction at PC.
///
/// The line reflects the instruction the program counter pointed at
/// before the step; if a pending interrupt is delivered instead, the
/// registers show the interrupt's effect (the sequence stays
/// deterministic either way).
pub fn step_traced<W: Write>(nes: &mut Nes, out: &mut W) -> Result<u32, NesError> {
    let pc = nes.cpu().regs.pc;
    let opcode = nes.bus().peek(pc);
    let len = 1 + OPCODES[opcode as usize].mode.operand_len();
    let mut bytes = Vec::with_capacity(3);
    for i in 0..len {
        bytes.push(nes.bus().peek(pc.wrapping_add(i)));
    }
    let text = disasm(pc, &bytes);
    let raw = bytes
        .iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(" ");

    let cycles = nes.step()?;

    let regs = nes.cpu().regs;
    writeln!(
        out,
        "{pc:04X}  {raw:<8}  {text:<30}  A:{:02X} X:{:02X} Y:{:02X} P:{:02X} SP:{:02X} CYC:{}",
        regs.a,
        regs.x,
        regs.y,
        regs.p.0,
        regs.sp,
        nes.cpu().cycles()
    )?;
    Ok(cycles)
}

/// Trace one whole frame.
pub fn trace_frame<W: Write>(nes: &mut Nes, out: &mut W) -> Result<u64, NesError> {
    let frame = nes.bus().ppu.frame();
    let mut cycles = 0u64;
    while nes.bus().ppu.frame() == frame {
        cycles += u64::from(step_traced(nes, out)?);
    }
    Ok(cycles)
}
