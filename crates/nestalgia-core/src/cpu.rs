//! CPU core trait.

use crate::Bus;

/// A CPU that executes instructions over a bus.
///
/// The bus is passed into each call, not owned, so it can be shared with
/// other components between steps.
pub trait Cpu {
    /// Error surfaced when a step cannot complete (illegal opcode, bus
    /// fault). All such errors are fatal to the current step.
    type Error;

    /// Execute one instruction (or deliver one pending interrupt, or
    /// consume one stall cycle). Returns cycles consumed.
    fn step<B: Bus>(&mut self, bus: &mut B) -> Result<u32, Self::Error>;

    /// Reset the CPU, loading the program counter from the reset vector.
    fn reset<B: Bus>(&mut self, bus: &mut B) -> Result<(), Self::Error>;

    /// Assert the maskable interrupt line. Serviced between instructions
    /// unless the interrupt-disable flag is set.
    fn interrupt(&mut self);

    /// Assert the non-maskable interrupt line. Serviced between
    /// instructions.
    fn nmi(&mut self);

    /// Current program counter.
    fn pc(&self) -> u16;
}
