//! Common types shared across the core family.
//!
//! This module provides the fundamental building blocks every core-family
//! member depends on:
//! 1. **Error handling:** the `Trap` enum covering every exception and
//!    interrupt a core can raise.
//! 2. **Constants:** the reset vector, simulation memory window, and the
//!    canonical NOP encoding.
//! 3. **Register file:** the per-thread, multi-port `RegisterFile`.

/// Constants shared by the decoder, memory model, and simulation harness.
pub mod constants;

/// Trap representation (synchronous exceptions and machine-mode interrupts).
pub mod error;

/// Multi-thread, multi-port general-purpose register file.
pub mod regfile;

pub use constants::{NOP_INSTRUCTION, RAM_SIZE, RESET_VECTOR};
pub use error::Trap;
pub use regfile::{RegisterFile, WritePort};
