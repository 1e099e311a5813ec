//! Pipeline register: a tagged-union slot between two stages.
//!
//! Represented as a sum type (`Bubble | Valid(bundle)`) rather than a
//! struct with a separate valid bit, per the design notes' guidance — this
//! makes "a bubble commits no architectural effect" a type-system property
//! instead of a convention every stage has to remember to honor.

use crate::common::Trap;
use crate::core::pipeline::signals::{AluOp, CsrOp, MemWidth, MulOp};
use crate::isa::decode::OpcodeClass;

/// The payload one pipeline stage hands to the next.
///
/// Carries exactly the fields named in the spec's `PipelineRegister`: the
/// owning thread, pc, raw instruction, decode classification, operands,
/// the (possibly partially computed) result, and control-transfer/writeback
/// intent.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bundle {
    /// Owning thread id.
    pub thread_id: usize,
    /// Program counter of this instruction.
    pub pc: u32,
    /// Raw instruction word.
    pub instr: u32,
    /// Opcode class.
    pub class: OpcodeClass,
    /// ALU operation tag.
    pub alu_op: AluOp,
    /// RV32M operation tag, meaningful only for `OpcodeClass::MulDiv`.
    pub mul_op: MulOp,
    /// Decoded immediate.
    pub imm: i32,
    /// `rs1`'s register value, as read in RegisterRead.
    pub rs1_data: u32,
    /// `rs2`'s register value, as read in RegisterRead.
    pub rs2_data: u32,
    /// Destination register index.
    pub rd: u8,
    /// Computed result (ALU output, link address, or load address).
    pub alu_result: u32,
    /// Whether a branch/jump in this instruction redirects control flow.
    pub ctrl_taken: bool,
    /// Redirect target, meaningful only when `ctrl_taken`.
    pub ctrl_target: u32,
    /// Whether this instruction commits a register-file write.
    pub do_reg_write: bool,
    /// Data fetched from memory for a load, populated in the memory stage.
    pub mem_rdata: u32,
    /// Memory access width (for loads/stores in flight).
    pub mem_width: MemWidth,
    /// Unsigned-load flag, carried alongside `mem_width`.
    pub unsigned_load: bool,
    /// CSR read-modify-write mode.
    pub csr_op: CsrOp,
    /// CSR address.
    pub csr_addr: u32,
    /// CSR write operand (post operand-select: `rs1_data` or the 5-bit
    /// zero-extended immediate).
    pub csr_operand: u32,
    /// `Some(new_value)` once Execute has computed a CSR read-modify-write,
    /// carried forward so writeback (not Execute) commits it.
    pub csr_write: Option<u32>,
    /// A trap raised by an earlier stage (illegal instruction, misaligned
    /// access); carried forward so writeback can redirect instead of commit.
    pub trap: Option<Trap>,
}

impl Default for Bundle {
    fn default() -> Self {
        Self {
            thread_id: 0,
            pc: 0,
            instr: 0,
            class: OpcodeClass::Illegal,
            alu_op: AluOp::Add,
            mul_op: MulOp::None,
            imm: 0,
            rs1_data: 0,
            rs2_data: 0,
            rd: 0,
            alu_result: 0,
            ctrl_taken: false,
            ctrl_target: 0,
            do_reg_write: false,
            mem_rdata: 0,
            mem_width: MemWidth::None,
            unsigned_load: false,
            csr_op: CsrOp::None,
            csr_addr: 0,
            csr_operand: 0,
            csr_write: None,
            trap: None,
        }
    }
}

/// One pipeline-register slot: either an empty bubble or a valid bundle.
///
/// Bubbles never mutate architectural state; every stage function takes a
/// `PipelineEntry` and returns one, and only `Valid` entries are ever
/// inspected for writeback side effects.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum PipelineEntry {
    /// Carries no instruction.
    #[default]
    Bubble,
    /// Carries an in-flight instruction's bundle.
    Valid(Bundle),
}

impl PipelineEntry {
    /// True for `Valid`.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, PipelineEntry::Valid(_))
    }

    /// Returns the bundle if `Valid`, `None` for a `Bubble`.
    #[must_use]
    pub fn bundle(&self) -> Option<&Bundle> {
        match self {
            PipelineEntry::Valid(b) => Some(b),
            PipelineEntry::Bubble => None,
        }
    }

    /// Returns the bundle mutably if `Valid`.
    pub fn bundle_mut(&mut self) -> Option<&mut Bundle> {
        match self {
            PipelineEntry::Valid(b) => Some(b),
            PipelineEntry::Bubble => None,
        }
    }
}
