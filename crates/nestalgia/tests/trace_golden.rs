//! Golden-file conformance for the execution trace.
//!
//! Builds a small NROM ROM as a byte array, traces a fixed number of
//! instructions, and compares the output byte-for-byte against a
//! hand-verified reference. A second run from a fresh machine must
//! produce the identical bytes (determinism).

use nestalgia::{trace, Nes, NesConfig};

/// Build a 32K NROM iNES image with `code` at $8000 and the reset
/// vector pointing there.
fn build_rom(code: &[u8]) -> Vec<u8> {
    let prg_size = 32 * 1024;
    let mut rom = vec![0u8; 16 + prg_size + 8 * 1024];
    rom[0..4].copy_from_slice(b"NES\x1A");
    rom[4] = 2; // 2 x 16K PRG
    rom[5] = 1; // 1 x 8K CHR
    rom[16..16 + code.len()].copy_from_slice(code);
    rom[16 + 0x7FFC] = 0x00; // reset vector -> $8000
    rom[16 + 0x7FFD] = 0x80;
    rom
}

/// SEI; CLD; LDA #$10; STA $00; LDX #$05; INX; JMP $8009 (idle loop).
const PROGRAM: &[u8] = &[
    0x78, // SEI
    0xD8, // CLD
    0xA9, 0x10, // LDA #$10
    0x85, 0x00, // STA $00
    0xA2, 0x05, // LDX #$05
    0xE8, // INX
    0x4C, 0x09, 0x80, // JMP $8009
];

const GOLDEN: &str = "\
8000  78        SEI                             A:00 X:00 Y:00 P:24 SP:FD CYC:9
8001  D8        CLD                             A:00 X:00 Y:00 P:24 SP:FD CYC:11
8002  A9 10     LDA #$10                        A:10 X:00 Y:00 P:24 SP:FD CYC:13
8004  85 00     STA $00                         A:10 X:00 Y:00 P:24 SP:FD CYC:16
8006  A2 05     LDX #$05                        A:10 X:05 Y:00 P:24 SP:FD CYC:18
8008  E8        INX                             A:10 X:06 Y:00 P:24 SP:FD CYC:20
8009  4C 09 80  JMP $8009                       A:10 X:06 Y:00 P:24 SP:FD CYC:23
";

fn trace_instructions(count: usize) -> Vec<u8> {
    let rom_data = build_rom(PROGRAM);
    let mut nes = Nes::new(&NesConfig { rom_data }).expect("build machine");
    let mut out = Vec::new();
    for _ in 0..count {
        trace::step_traced(&mut nes, &mut out).expect("step");
    }
    out
}

#[test]
fn trace_matches_golden_log() {
    let out = trace_instructions(7);
    let text = String::from_utf8(out).expect("trace is UTF-8");
    for (line, expected) in text.lines().zip(GOLDEN.lines()) {
        assert_eq!(line, expected);
    }
    assert_eq!(text, GOLDEN);
}

#[test]
fn trace_is_deterministic_across_runs() {
    let first = trace_instructions(200);
    let second = trace_instructions(200);
    assert_eq!(first, second);
}
