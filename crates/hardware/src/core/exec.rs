//! Shared Execute-stage semantics.
//!
//! Every core-family member's Execute stage dispatches a decoded instruction
//! to the same functional units (ALU, branch unit, CSR read-modify-write);
//! only the surrounding pipeline plumbing differs between ZeroNyte,
//! PipeNyte, TetraNyte, and OctoNyte. Factoring that dispatch into one pure
//! function keeps each core top focused on its own stage wiring instead of
//! re-deriving operand selection and trap detection four times.
//!
//! Memory side effects (the actual load/store against RAM) are deliberately
//! left to the caller: this function only computes the effective address
//! and, for stores, the masked write data — exactly the split the spec
//! draws between the ALU/LSU (pure) and the memory port (stateful).

use crate::common::Trap;
use crate::core::pipeline::signals::{AluOp, CsrOp, MemWidth, MulOp, OpASrc, OpBSrc};
use crate::core::units::alu::alu32;
use crate::core::units::branch;
use crate::core::units::lsu;
use crate::core::units::muldiv::mul32_parts;
use crate::isa::decode::OpcodeClass;
use crate::isa::instruction::InstructionBits;
use crate::isa::opcodes::priv_inst;

/// Parameters for an RV32M divide/remainder op Execute cannot finish on its
/// own (the iterative divider is stateful and multi-cycle); the caller
/// starts/ticks it and commits the result once it completes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DivRequest {
    /// Dividend bit pattern.
    pub dividend: u32,
    /// Divisor bit pattern.
    pub divisor: u32,
    /// Signed (`DIV`/`REM`) vs unsigned (`DIVU`/`REMU`) semantics.
    pub signed: bool,
    /// True for `REM`/`REMU`: the caller wants the remainder, not the quotient.
    pub want_remainder: bool,
}

/// Everything Execute needs about one decoded instruction; a flattened view
/// over a [`crate::core::pipeline::register::Bundle`] (or, for ZeroNyte,
/// a [`crate::isa::decode::DecodeSignals`]) so both pipeline shapes can
/// share this function.
#[derive(Clone, Copy, Debug)]
pub struct ExecuteInputs {
    /// Raw instruction word (used to recover funct3 for branches/CSRs and
    /// to distinguish ECALL/EBREAK/MRET).
    pub instr: u32,
    /// Opcode classification.
    pub class: OpcodeClass,
    /// ALU operation tag.
    pub alu_op: AluOp,
    /// RV32M operation tag, meaningful only when `class == OpcodeClass::MulDiv`.
    pub mul_op: MulOp,
    /// Decoded immediate.
    pub imm: i32,
    /// `rs1`'s value.
    pub rs1_data: u32,
    /// `rs2`'s value.
    pub rs2_data: u32,
    /// This instruction's own pc.
    pub pc: u32,
    /// Load/store access width.
    pub mem_width: MemWidth,
    /// CSR read-modify-write mode.
    pub csr_op: CsrOp,
    /// CSR operand: `rs1_data`, or the zero-extended 5-bit immediate for
    /// `CSRR*I` forms (the caller resolves which, since that depends on
    /// `rs1`'s *index*, not a register read).
    pub csr_operand: u32,
    /// The CSR's value before this instruction's read-modify-write, read by
    /// the caller from its own `Csrs` (CSR reads are a stateful side
    /// effect, so this function stays pure with respect to them).
    pub csr_old_value: u32,
}

/// Everything Execute produces for one instruction.
#[derive(Clone, Copy, Debug, Default)]
pub struct ExecuteOutputs {
    /// ALU result / effective address / link address / CSR old value,
    /// depending on `class` — whatever writeback commits to `rd`.
    pub result: u32,
    /// True if this instruction redirects control flow.
    pub ctrl_taken: bool,
    /// Redirect target, meaningful only when `ctrl_taken`.
    pub ctrl_target: u32,
    /// True if this instruction commits a register-file write.
    pub do_reg_write: bool,
    /// `Some(new_value)` when a CSR write should be committed this cycle.
    pub csr_write: Option<u32>,
    /// True for `MRET` (the caller restores `pc` from `mepc` via `Csrs::mret`).
    pub is_mret: bool,
    /// `Some(request)` for `DIV`/`DIVU`/`REM`/`REMU`: the caller owns the
    /// stateful iterative divider and the thread-scoped stall while it runs.
    pub div_request: Option<DivRequest>,
    /// A trap raised during Execute (illegal instruction, misaligned
    /// branch target, or the synchronous ECALL trap). Loads/stores raise
    /// their own misalignment trap once the caller computes the mask.
    pub trap: Option<Trap>,
}

/// Classifies which operand-A source a decoded class pulls from.
fn op_a_src(class: OpcodeClass) -> OpASrc {
    match class {
        OpcodeClass::Auipc | OpcodeClass::Jal | OpcodeClass::Jalr => OpASrc::Pc,
        OpcodeClass::Lui => OpASrc::Zero,
        _ => OpASrc::Reg1,
    }
}

/// Classifies which operand-B source a decoded class pulls from.
fn op_b_src(class: OpcodeClass) -> OpBSrc {
    match class {
        OpcodeClass::AluReg => OpBSrc::Reg2,
        _ => OpBSrc::Imm,
    }
}

/// Selects ALU operand A per the spec's Execute1 contract: `rs1Data`, or
/// `pc` for `AUIPC`/`JAL`, or zero for `LUI`.
fn operand_a(inputs: &ExecuteInputs) -> u32 {
    match op_a_src(inputs.class) {
        OpASrc::Reg1 => inputs.rs1_data,
        OpASrc::Pc => inputs.pc,
        OpASrc::Zero => 0,
    }
}

/// Selects ALU operand B: the immediate for everything except register-
/// register ALU ops, which use `rs2Data`.
fn operand_b(inputs: &ExecuteInputs) -> u32 {
    match op_b_src(inputs.class) {
        OpBSrc::Reg2 => inputs.rs2_data,
        OpBSrc::Imm => inputs.imm as u32,
    }
}

/// Applies the CSR read-modify-write for one `CsrOp`, returning the new
/// value to write back (the *old* value is what `rd` receives).
fn csr_new_value(op: CsrOp, old: u32, operand: u32) -> u32 {
    match op {
        CsrOp::ReadWrite => operand,
        CsrOp::ReadSet => old | operand,
        CsrOp::ReadClear => old & !operand,
        CsrOp::None => old,
    }
}

/// Dispatches one decoded instruction through the shared functional units.
///
/// The effective address for `Load`/`Store` is returned in `result`; the
/// caller performs the actual memory access (and, for stores, derives the
/// write data/mask via [`lsu::store`]) since that's a stateful operation
/// this function does not own.
#[must_use]
pub fn execute(inputs: &ExecuteInputs) -> ExecuteOutputs {
    match inputs.class {
        OpcodeClass::Illegal => ExecuteOutputs {
            trap: Some(Trap::IllegalInstruction(inputs.instr)),
            ..Default::default()
        },
        OpcodeClass::AluReg | OpcodeClass::AluImm => ExecuteOutputs {
            result: alu32(operand_a(inputs), operand_b(inputs), inputs.alu_op),
            do_reg_write: true,
            ..Default::default()
        },
        OpcodeClass::MulDiv => execute_muldiv(inputs),
        OpcodeClass::Load => ExecuteOutputs {
            result: inputs.rs1_data.wrapping_add(inputs.imm as u32),
            do_reg_write: !matches!(inputs.mem_width, MemWidth::None),
            ..Default::default()
        },
        OpcodeClass::Store => ExecuteOutputs {
            result: inputs.rs1_data.wrapping_add(inputs.imm as u32),
            ..Default::default()
        },
        OpcodeClass::Branch => {
            let funct3 = inputs.instr.funct3();
            let b = branch::evaluate(
                inputs.rs1_data,
                inputs.rs2_data,
                inputs.pc,
                inputs.imm,
                funct3,
                true,
            );
            let trap = if b.misaligned {
                Some(Trap::InstructionAddressMisaligned(b.target))
            } else {
                None
            };
            ExecuteOutputs {
                ctrl_taken: b.taken,
                ctrl_target: b.target,
                trap,
                ..Default::default()
            }
        }
        OpcodeClass::Jal => {
            let target = inputs.pc.wrapping_add(inputs.imm as u32);
            let misaligned = target & 0b11 != 0;
            ExecuteOutputs {
                result: inputs.pc.wrapping_add(4),
                do_reg_write: true,
                ctrl_taken: true,
                ctrl_target: target,
                trap: misaligned.then_some(Trap::InstructionAddressMisaligned(target)),
                ..Default::default()
            }
        }
        OpcodeClass::Jalr => {
            let target = inputs.rs1_data.wrapping_add(inputs.imm as u32) & !1;
            let misaligned = target & 0b11 != 0;
            ExecuteOutputs {
                result: inputs.pc.wrapping_add(4),
                do_reg_write: true,
                ctrl_taken: true,
                ctrl_target: target,
                trap: misaligned.then_some(Trap::InstructionAddressMisaligned(target)),
                ..Default::default()
            }
        }
        OpcodeClass::Lui => ExecuteOutputs {
            result: inputs.imm as u32,
            do_reg_write: true,
            ..Default::default()
        },
        OpcodeClass::Auipc => ExecuteOutputs {
            result: inputs.pc.wrapping_add(inputs.imm as u32),
            do_reg_write: true,
            ..Default::default()
        },
        OpcodeClass::Fence => ExecuteOutputs::default(),
        OpcodeClass::System => execute_system(inputs),
    }
}

/// Dispatches one RV32M instruction. `MUL`/`MULH`/`MULHSU`/`MULHU` resolve
/// on the spot (the multiplier is single-cycle); `DIV`/`DIVU`/`REM`/`REMU`
/// only produce a [`DivRequest`] here — the iterative divider is stateful
/// and multi-cycle, so the caller owns ticking it and stalling the thread.
fn execute_muldiv(inputs: &ExecuteInputs) -> ExecuteOutputs {
    if inputs.mul_op.is_divide() {
        return ExecuteOutputs {
            // `result` is a placeholder: DIV/DIVU/REM/REMU do write rd, but
            // the actual value isn't known until the caller's divider
            // completes, so `do_reg_write` is set here and the caller
            // overwrites `result` once it has a real quotient/remainder.
            do_reg_write: true,
            div_request: Some(DivRequest {
                dividend: inputs.rs1_data,
                divisor: inputs.rs2_data,
                signed: inputs.mul_op.is_signed_divide(),
                want_remainder: inputs.mul_op.wants_remainder(),
            }),
            ..Default::default()
        };
    }
    let (signed_a, signed_b) = match inputs.mul_op {
        MulOp::Mul | MulOp::Mulh => (true, true),
        MulOp::Mulhsu => (true, false),
        _ => (false, false),
    };
    let (hi, lo) = mul32_parts(inputs.rs1_data, inputs.rs2_data, signed_a, signed_b);
    let result = if inputs.mul_op == MulOp::Mul { lo } else { hi };
    ExecuteOutputs { result, do_reg_write: true, ..Default::default() }
}

fn execute_system(inputs: &ExecuteInputs) -> ExecuteOutputs {
    if inputs.csr_op != CsrOp::None {
        return ExecuteOutputs {
            result: inputs.csr_old_value,
            do_reg_write: true,
            csr_write: Some(csr_new_value(inputs.csr_op, inputs.csr_old_value, inputs.csr_operand)),
            ..Default::default()
        };
    }
    match inputs.instr {
        priv_inst::ECALL => ExecuteOutputs {
            trap: Some(Trap::EnvironmentCallFromMMode),
            ..Default::default()
        },
        priv_inst::EBREAK => ExecuteOutputs {
            trap: Some(Trap::Breakpoint(inputs.pc)),
            ..Default::default()
        },
        priv_inst::MRET => ExecuteOutputs {
            is_mret: true,
            ..Default::default()
        },
        // WFI, SFENCE.VMA, and other privileged encodings this core does
        // not model retire as no-ops, matching the FENCE non-goal.
        _ => ExecuteOutputs::default(),
    }
}
