//! NES machine configuration.

/// Configuration for [`crate::Nes::new`].
pub struct NesConfig {
    /// iNES file contents.
    pub rom_data: Vec<u8>,
}
