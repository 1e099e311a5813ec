//! End-to-end stall scenarios on `PipeNyte`, driven through the public
//! `Simulator` API rather than `PipeNyte::step` directly (already covered by
//! its own unit tests).

use crate::common::{add, addi, lui, lw, sw, Harness};
use kryptonyte_core::config::CoreFamily;

const RAM_BASE_HIGH: u32 = 0x8000_0000;

#[test]
fn load_use_hazard_stalls_and_still_produces_the_right_answer() {
    // x2 = a scratch address inside the simulation RAM window ; mem[x2] = 7 ;
    // LW x1,0(x2) ; ADD x3,x1,x1
    let program = vec![
        lui(2, RAM_BASE_HIGH),
        addi(2, 2, 0x200),
        addi(1, 0, 7),
        sw(2, 1, 0),
        lw(1, 2, 0),
        add(3, 1, 1),
    ];
    let mut h = Harness::new(CoreFamily::PipeNyte, &program);
    h.run_cycles(24);
    assert_eq!(h.reg(0, 3), 14);
    assert!(h.stats().stalls > 0, "a load immediately followed by its use should stall");
}

#[test]
fn back_to_back_independent_adds_never_stall() {
    let program = vec![addi(1, 0, 1), addi(2, 0, 2), addi(3, 0, 3), addi(4, 0, 4)];
    let mut h = Harness::new(CoreFamily::PipeNyte, &program);
    h.run_cycles(12);
    assert_eq!(h.stats().stalls, 0);
    assert_eq!(h.reg(0, 4), 4);
}

#[test]
fn a_divide_resolves_to_the_right_quotient_without_corrupting_the_fetch_stream() {
    // x1=20, x2=6, x3=DIV x1/x2, then an ordinary ADDI after it to confirm
    // fetch/decode keep running correctly once the divider's stall lifts.
    let program = vec![
        addi(1, 0, 20),
        addi(2, 0, 6),
        0x0220_C1B3, // DIV x3, x1, x2
        addi(4, 0, 99),
    ];
    let mut h = Harness::new(CoreFamily::PipeNyte, &program);
    h.run_cycles(40);
    assert_eq!(h.reg(0, 3), 3);
    assert_eq!(h.reg(0, 4), 99);
    assert!(h.stats().stalls > 0, "an iterative divide should stall the pipeline");
}
