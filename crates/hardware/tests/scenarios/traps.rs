//! End-to-end trap scenarios: a full program runs until it traps, and the
//! test inspects the resulting CSR state the way a debugger or a
//! conformance harness would, rather than calling `step` and inspecting the
//! trap return value directly (already covered by each core's own unit
//! tests).

use crate::common::{addi, Harness};
use kryptonyte_core::common::RESET_VECTOR;
use kryptonyte_core::config::CoreFamily;
use kryptonyte_core::core::csr::{MCAUSE, MEPC, MTVAL};

const ILLEGAL_OPCODE: u32 = 0b0101011; // reserved custom-0, not a valid RV32I opcode

#[test]
fn illegal_instruction_sets_mcause_two_and_mepc_to_the_faulting_pc() {
    let program = vec![
        addi(1, 0, 5), // one ordinary instruction first, so mepc isn't just the reset vector
        ILLEGAL_OPCODE,
    ];
    let mut h = Harness::new(CoreFamily::ZeroNyte, &program);
    h.run_cycles(2);
    assert_eq!(h.csr(0, MCAUSE), 2);
    assert_eq!(h.csr(0, MEPC), RESET_VECTOR + 4);
    assert_eq!(h.csr(0, MTVAL), ILLEGAL_OPCODE);
    // The faulting ADDI still committed before the trap redirected control.
    assert_eq!(h.reg(0, 1), 5);
}

#[test]
fn illegal_instruction_traps_the_same_way_on_every_family_member() {
    for family in [
        CoreFamily::ZeroNyte,
        CoreFamily::PipeNyte,
        CoreFamily::TetraNyte,
        CoreFamily::OctoNyte,
    ] {
        let program = vec![ILLEGAL_OPCODE];
        let mut h = Harness::with_cycles(family, &program, 64);
        h.run_cycles(64);
        assert_eq!(h.csr(0, MCAUSE), 2, "{family:?} did not report mcause=2");
    }
}
