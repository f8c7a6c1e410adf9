//! Owned, serialisable state snapshots.
//!
//! A debug inspector never reads live component state: it takes a
//! [`Snapshot`] between instructions and works on the copy. Everything
//! here is plain data; serialising it cannot observe a frame in
//! progress.

use serde::Serialize;

use crate::mapper::MapperState;

/// CPU registers and flags after the last completed instruction.
#[derive(Debug, Clone, Serialize)]
pub struct CpuSnapshot {
    pub a: u8,
    pub x: u8,
    pub y: u8,
    pub sp: u8,
    pub pc: u16,
    pub status: u8,
    pub carry: bool,
    pub zero: bool,
    pub interrupt_disable: bool,
    pub decimal: bool,
    pub overflow: bool,
    pub negative: bool,
    pub cycles: u64,
}

/// PPU render position, palette RAM, and nametable contents.
#[derive(Debug, Clone, Serialize)]
pub struct PpuSnapshot {
    pub scanline: u16,
    pub dot: u16,
    pub frame: u64,
    pub palette: [u8; 32],
    /// The four logical nametables, resolved through the active
    /// mirroring (aliased tables repeat).
    pub nametables: Vec<Vec<u8>>,
}

/// Everything the inspector surface exposes, copied atomically between
/// instructions.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub cpu: CpuSnapshot,
    pub ppu: PpuSnapshot,
    pub mapper: MapperState,
}
