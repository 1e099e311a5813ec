//! Global system constants.
//!
//! Mirrors the teacher's `common::constants` module: named constants instead
//! of inline magic numbers for the reset vector, simulation memory window,
//! and the handful of instruction encodings the core treats specially.

/// Program counter value every thread starts at after reset.
pub const RESET_VECTOR: u32 = 0x8000_0000;

/// Size of the simulation RAM window starting at [`RESET_VECTOR`] (16 MiB).
///
/// Accesses outside `[RESET_VECTOR, RESET_VECTOR + RAM_SIZE)` return zero on
/// reads and are silently dropped on writes — a simulation-only convention,
/// not a fault.
pub const RAM_SIZE: u32 = 16 * 1024 * 1024;

/// The canonical RV32I NOP encoding: `ADDI x0, x0, 0`.
///
/// Decodes as an ordinary ALU-imm instruction that happens to write `x0`;
/// it never raises [`crate::common::Trap::IllegalInstruction`].
pub const NOP_INSTRUCTION: u32 = 0x0000_0013;

/// Bit mask for extracting the opcode field (bits 0-6) of an instruction.
pub const OPCODE_MASK: u32 = 0x7F;
