//! End-to-end barrel-scheduling scenarios on `TetraNyte`, driven through the
//! public `Simulator` API (already covered at the pipeline-register level by
//! `TetraNyte`'s own unit tests).

use crate::common::{addi, Harness};
use kryptonyte_core::config::CoreFamily;

#[test]
fn every_thread_retires_the_shared_program_independently() {
    // Every thread fetches from the same instruction stream starting at its
    // own reset vector, so all four end up with the same architectural state.
    let program = vec![addi(1, 0, 5), addi(2, 0, 7), addi(3, 1, 0)];
    let mut h = Harness::new(CoreFamily::TetraNyte, &program);
    h.run_cycles(40);
    for t in 0..4 {
        assert_eq!(h.reg(t, 1), 5, "thread {t}");
        assert_eq!(h.reg(t, 2), 7, "thread {t}");
    }
}

#[test]
fn every_thread_completes_a_divide_issued_on_the_same_shared_program() {
    let program = vec![
        addi(1, 0, 20),
        addi(2, 0, 6),
        0x0220_C1B3, // DIV x3, x1, x2
    ];
    let mut h = Harness::new(CoreFamily::TetraNyte, &program);
    h.run_cycles(220);
    for t in 0..4 {
        assert_eq!(h.reg(t, 3), 3, "thread {t} did not complete its divide");
    }
}

#[test]
fn instruction_mix_accumulates_across_every_thread() {
    let program = vec![addi(1, 0, 1), addi(2, 0, 2)];
    let mut h = Harness::new(CoreFamily::TetraNyte, &program);
    h.run_cycles(40);
    // Each of the 4 threads retires both ADDIs at least once within the budget.
    assert!(h.stats().inst_alu >= 8, "inst_alu = {}", h.stats().inst_alu);
}
