//! Cycle-accurate NES emulator core.
//!
//! The CPU drives the whole system: each instruction's cycle cost steps
//! the PPU forward three dots per CPU cycle (the NTSC 2C02 runs at three
//! times the 2A03 clock). One frame is 341 dots x 262 scanlines, minus
//! one skipped dot on odd frames.
//!
//! The core is single-threaded and deterministic. State crosses the
//! boundary to presentation or inspection code only as completed values:
//! the framebuffer is double-buffered and swapped at vertical blank, and
//! [`Nes::snapshot`] returns an owned copy taken between instructions.

mod apu;
mod bus;
pub mod capture;
mod cartridge;
mod config;
mod controller;
mod mapper;
mod mappers;
mod nes;
mod palette;
pub mod ppu;
mod snapshot;
pub mod trace;

pub use bus::NesBus;
pub use cartridge::{Cartridge, CartridgeError, HeaderMirroring};
pub use config::NesConfig;
pub use controller::{button, Controller};
pub use mapper::{BankWindows, Mapper, MapperState, Mirroring};
pub use nes::{Nes, NesError};
pub use snapshot::{CpuSnapshot, PpuSnapshot, Snapshot};
