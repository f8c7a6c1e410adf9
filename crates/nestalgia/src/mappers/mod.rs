//! Concrete mapper implementations.
//!
//! Each board expresses its banking scheme through [`BankWindows`]
//! (crate::mapper::BankWindows), so the window/bank arithmetic — modulo
//! reduction, negative "from the end" indices — lives in one place.

mod cnrom;
mod mmc1;
mod nrom;
mod uxrom;

pub use cnrom::CnRom;
pub use mmc1::Mmc1;
pub use nrom::Nrom;
pub use uxrom::UxRom;

/// PRG RAM size on boards that carry it.
pub(crate) const PRG_RAM_LEN: usize = 8 * 1024;

/// CHR RAM size when the cartridge ships no CHR ROM.
pub(crate) const CHR_RAM_LEN: usize = 8 * 1024;
