//! 32-bit ALU.
//!
//! Pure combinational: `(a, b, AluOp) -> result`. Shared by every core
//! variant's Execute stage for ALU-reg/ALU-imm instructions and for
//! effective-address computation (`Add`) in loads, stores, branches, JALR.

use crate::core::pipeline::signals::AluOp;

/// Evaluates the 32-bit ALU for one operation.
///
/// Overflow wraps modulo 2^32 (ordinary `u32` wrapping arithmetic); `Sra`
/// preserves the sign of `a`. Shift amounts use only `b[4:0]`, per RV32I.
#[must_use]
pub fn alu32(a: u32, b: u32, op: AluOp) -> u32 {
    let shamt = b & 0x1F;
    match op {
        AluOp::Add => a.wrapping_add(b),
        AluOp::Sub => a.wrapping_sub(b),
        AluOp::Sll => a.wrapping_shl(shamt),
        AluOp::Slt => u32::from((a as i32) < (b as i32)),
        AluOp::Sltu => u32::from(a < b),
        AluOp::Xor => a ^ b,
        AluOp::Srl => a.wrapping_shr(shamt),
        AluOp::Sra => ((a as i32).wrapping_shr(shamt)) as u32,
        AluOp::Or => a | b,
        AluOp::And => a & b,
    }
}
