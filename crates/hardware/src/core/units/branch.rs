//! Branch unit: condition evaluation, target computation, misalignment flag.

use crate::isa::opcodes::branch_funct3;

/// Outputs of the branch unit for one `BRANCH`-class instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct BranchResult {
    /// Whether the branch condition held.
    pub taken: bool,
    /// Branch target (`pc + imm`); only meaningful when `taken`.
    pub target: u32,
    /// True if `target` is not 2-byte aligned.
    pub misaligned: bool,
}

/// Evaluates a conditional branch.
///
/// `imm` is the decoder's already-doubled (half-word-scaled) signed
/// immediate, so `target = pc.wrapping_add(imm as u32)`. An unrecognized
/// `branch_funct3` is never taken (there are no unused encodings in the
/// 3-bit condition-code space, but the fallback keeps this total).
#[must_use]
pub fn evaluate(rs1: u32, rs2: u32, pc: u32, imm: i32, funct3: u32, valid: bool) -> BranchResult {
    if !valid {
        return BranchResult::default();
    }
    let taken = match funct3 {
        branch_funct3::BEQ => rs1 == rs2,
        branch_funct3::BNE => rs1 != rs2,
        branch_funct3::BLT => (rs1 as i32) < (rs2 as i32),
        branch_funct3::BGE => (rs1 as i32) >= (rs2 as i32),
        branch_funct3::BLTU => rs1 < rs2,
        branch_funct3::BGEU => rs1 >= rs2,
        _ => false,
    };
    let target = pc.wrapping_add(imm as u32);
    BranchResult {
        taken,
        target,
        misaligned: taken && target & 0b11 != 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(branch_funct3::BEQ, 1, 1, true)]
    #[case(branch_funct3::BEQ, 1, 2, false)]
    #[case(branch_funct3::BNE, 1, 2, true)]
    #[case(branch_funct3::BLT, 0xFFFF_FFFF, 1, true)] // -1 < 1
    #[case(branch_funct3::BGE, 1, 0xFFFF_FFFF, true)] // 1 >= -1
    #[case(branch_funct3::BLTU, 0xFFFF_FFFF, 1, false)]
    #[case(branch_funct3::BGEU, 0xFFFF_FFFF, 1, true)]
    fn conditions(#[case] f3: u32, #[case] rs1: u32, #[case] rs2: u32, #[case] taken: bool) {
        let r = evaluate(rs1, rs2, 0x1000, 8, f3, true);
        assert_eq!(r.taken, taken);
    }

    #[test]
    fn invalid_never_taken() {
        let r = evaluate(1, 1, 0x1000, 8, branch_funct3::BEQ, false);
        assert!(!r.taken);
    }

    #[test]
    fn misaligned_target_flagged_only_when_taken() {
        let r = evaluate(1, 1, 0x1000, 2, branch_funct3::BEQ, true);
        assert!(r.taken);
        assert_eq!(r.target, 0x1002);
        assert!(r.misaligned);
    }

    #[test]
    fn untaken_branch_never_flags_misalignment() {
        let r = evaluate(1, 2, 0x1000, 2, branch_funct3::BEQ, true);
        assert!(!r.taken);
        assert!(!r.misaligned);
    }
}
