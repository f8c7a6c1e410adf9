//! Cartridge mapper abstraction.
//!
//! A mapper owns the cartridge's PRG/CHR storage and translates CPU and
//! PPU addresses into it. Concrete mappers react to writes in their
//! register ranges (bank switches, mirroring changes); the bus forwards
//! $4020-$FFFF CPU traffic and $0000-$1FFF PPU traffic here and nothing
//! else. Mirroring changes surface only through [`Mapper::mirroring`] —
//! a mapper never touches nametable memory itself.

use serde::Serialize;

/// Nametable mirroring mode.
///
/// Indexes [`MIRROR_LOOKUP`]; keep the discriminants in table order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Mirroring {
    Horizontal,
    Vertical,
    SingleScreenLower,
    SingleScreenUpper,
    FourScreen,
}

/// Logical nametable slot (0-3) to physical nametable, per mode.
const MIRROR_LOOKUP: [[u16; 4]; 5] = [
    [0, 0, 1, 1], // horizontal
    [0, 1, 0, 1], // vertical
    [0, 0, 0, 0], // single-screen lower
    [1, 1, 1, 1], // single-screen upper
    [0, 1, 2, 3], // four-screen
];

impl Mirroring {
    /// Map a PPU nametable address ($2000-$3EFF) to an offset into
    /// physical nametable RAM.
    #[must_use]
    pub fn nametable_offset(self, addr: u16) -> u16 {
        let rel = (addr.wrapping_sub(0x2000)) & 0x0FFF;
        let slot = rel / 0x0400;
        MIRROR_LOOKUP[self as usize][slot as usize] * 0x0400 + (rel & 0x03FF)
    }
}

/// Snapshot of a mapper's banking state, read by the debug inspector.
#[derive(Debug, Clone, Serialize)]
pub struct MapperState {
    pub mapper_id: u8,
    /// Current PRG bank index per window.
    pub prg_banks: Vec<usize>,
    /// Current CHR bank index per window.
    pub chr_banks: Vec<usize>,
    pub mirroring: Mirroring,
}

/// Common interface all cartridge mappers implement.
///
/// The bus forwards CPU $4020-$FFFF and PPU $0000-$1FFF here; addresses
/// arrive unmasked. A mapper never sees nametable or palette traffic.
pub trait Mapper {
    /// Mapper numeric identifier (0 for NROM, ...).
    fn mapper_id(&self) -> u8;

    /// CPU-visible read (PRG RAM at $6000-$7FFF, PRG ROM at $8000+).
    fn cpu_read(&self, addr: u16) -> u8;

    /// CPU-visible write. Writes into ROM ranges drive the mapper's bank
    /// registers; a concrete mapper may fully reinterpret a range or just
    /// observe it.
    fn cpu_write(&mut self, addr: u16, value: u8);

    /// PPU pattern-table read ($0000-$1FFF).
    fn chr_read(&mut self, addr: u16) -> u8;

    /// PPU pattern-table write (effective only with CHR RAM).
    fn chr_write(&mut self, addr: u16, value: u8);

    /// Current nametable mirroring. The nametable owner consults this on
    /// every access, so runtime changes take effect immediately.
    fn mirroring(&self) -> Mirroring;

    /// Whether the mapper asserts its IRQ line.
    fn irq_pending(&self) -> bool {
        false
    }

    /// Reinitialise bank registers to power-on state.
    fn reset(&mut self) {}

    /// Banking state for the inspector.
    fn state(&self) -> MapperState;
}

/// An ordered set of fixed-size address windows over banked storage.
///
/// Each window maps to a physical bank offset. Bank indices are taken
/// modulo the bank count, and negative indices count from the last bank,
/// so a mapper can say "always the last bank" without knowing the ROM
/// size.
#[derive(Debug, Clone)]
pub struct BankWindows {
    window_len: usize,
    bank_count: usize,
    offsets: Vec<usize>,
}

impl BankWindows {
    /// Create `windows` windows of `window_len` bytes over `storage_len`
    /// bytes of storage, all initially mapped to bank 0.
    #[must_use]
    pub fn new(storage_len: usize, window_len: usize, windows: usize) -> Self {
        let bank_count = (storage_len / window_len).max(1);
        Self {
            window_len,
            bank_count,
            offsets: vec![0; windows],
        }
    }

    /// Map a window to a bank. Negative banks count from the end
    /// (-1 = last bank); out-of-range banks wrap modulo the bank count.
    pub fn set_window(&mut self, window: usize, bank: isize) {
        let count = self.bank_count as isize;
        let resolved = bank.rem_euclid(count) as usize;
        self.offsets[window] = resolved * self.window_len;
    }

    /// Translate a window-relative address into a physical offset.
    #[must_use]
    pub fn offset(&self, window: usize, rel: usize) -> usize {
        self.offsets[window] + (rel % self.window_len)
    }

    /// Translate an address relative to the whole windowed region.
    #[must_use]
    pub fn region_offset(&self, rel: usize) -> usize {
        self.offset(rel / self.window_len, rel % self.window_len)
    }

    /// Current bank index per window.
    #[must_use]
    pub fn banks(&self) -> Vec<usize> {
        self.offsets.iter().map(|o| o / self.window_len).collect()
    }

    /// Number of banks the storage divides into.
    #[must_use]
    pub fn bank_count(&self) -> usize {
        self.bank_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_reads_follow_bank_arithmetic() {
        // 4 banks of 4 bytes; for every bank index and offset, window 0
        // must land on storage[(bank mod count) * len + k].
        let storage: Vec<u8> = (0..16).collect();
        let mut windows = BankWindows::new(storage.len(), 4, 1);
        for bank in 0..8isize {
            windows.set_window(0, bank);
            for k in 0..4 {
                let expected = ((bank as usize % 4) * 4 + k) as u8;
                assert_eq!(storage[windows.offset(0, k)], expected);
            }
        }
    }

    #[test]
    fn negative_banks_count_from_the_end() {
        let mut windows = BankWindows::new(64, 16, 2);
        windows.set_window(0, -1);
        windows.set_window(1, -2);
        assert_eq!(windows.banks(), vec![3, 2]);
    }

    #[test]
    fn offsets_wrap_within_window() {
        let windows = BankWindows::new(32, 16, 1);
        assert_eq!(windows.offset(0, 16), 0);
        assert_eq!(windows.offset(0, 17), 1);
    }

    #[test]
    fn single_bank_storage_maps_everything_to_bank_zero() {
        let mut windows = BankWindows::new(16, 16, 2);
        windows.set_window(1, -1);
        assert_eq!(windows.banks(), vec![0, 0]);
    }

    #[test]
    fn horizontal_mirroring_pairs_nametables() {
        // NT0 and NT1 share a page; NT2 and NT3 share the other.
        let m = Mirroring::Horizontal;
        assert_eq!(m.nametable_offset(0x2000), m.nametable_offset(0x2400));
        assert_eq!(m.nametable_offset(0x2800), m.nametable_offset(0x2C00));
        assert_ne!(m.nametable_offset(0x2000), m.nametable_offset(0x2800));
    }

    #[test]
    fn vertical_mirroring_pairs_nametables() {
        let m = Mirroring::Vertical;
        assert_eq!(m.nametable_offset(0x2000), m.nametable_offset(0x2800));
        assert_eq!(m.nametable_offset(0x2400), m.nametable_offset(0x2C00));
        assert_ne!(m.nametable_offset(0x2000), m.nametable_offset(0x2400));
    }

    #[test]
    fn single_screen_maps_all_slots_to_one_page() {
        let lower = Mirroring::SingleScreenLower;
        let upper = Mirroring::SingleScreenUpper;
        for base in [0x2000u16, 0x2400, 0x2800, 0x2C00] {
            assert_eq!(lower.nametable_offset(base), 0);
            assert_eq!(upper.nametable_offset(base), 0x0400);
        }
    }

    #[test]
    fn mirror_region_aliases_above_3000() {
        // $3000-$3EFF aliases $2000-$2EFF.
        let m = Mirroring::Vertical;
        assert_eq!(m.nametable_offset(0x3123), m.nametable_offset(0x2123));
    }
}
