//! Exercises the `tohost` host-target protocol end to end: a program builds
//! the `tohost` address, writes a sentinel, and the harness must observe it
//! without the test ever inspecting the core's internals directly.

use crate::common::{addi, lui, sw, Harness};
use kryptonyte_core::config::CoreFamily;
use kryptonyte_core::sim::RunOutcome;

/// `tohost` sits 0x100 bytes into the simulation window; its low 12 bits
/// have bit 11 clear so `ADDI`'s sign-extension doesn't require correcting
/// the `LUI` immediate.
const TOHOST_OFFSET: u32 = 0x100;
const TOHOST_ADDR_HIGH: u32 = 0x8000_0000;

fn program(value: i32) -> Vec<u32> {
    vec![
        lui(2, TOHOST_ADDR_HIGH),           // x2 = 0x8000_0000
        addi(2, 2, TOHOST_OFFSET as i32),   // x2 = tohost address
        addi(1, 0, value),                  // x1 = value
        sw(2, 1, 0),                        // mem[tohost] = value
    ]
}

#[test]
fn writing_one_to_tohost_reports_pass_on_zeronyte() {
    let mut h = Harness::with_cycles_and_tohost(
        CoreFamily::ZeroNyte,
        &program(1),
        1_000,
        Some(TOHOST_OFFSET),
    );
    assert_eq!(h.run(), RunOutcome::Passed);
}

#[test]
fn writing_a_nonzero_non_one_value_reports_failure_with_the_value() {
    let mut h = Harness::with_cycles_and_tohost(
        CoreFamily::ZeroNyte,
        &program(3),
        1_000,
        Some(TOHOST_OFFSET),
    );
    assert_eq!(h.run(), RunOutcome::Failed(3));
}

#[test]
fn the_same_program_passes_on_every_family_member() {
    for family in [
        CoreFamily::ZeroNyte,
        CoreFamily::PipeNyte,
        CoreFamily::TetraNyte,
        CoreFamily::OctoNyte,
    ] {
        let mut h =
            Harness::with_cycles_and_tohost(family, &program(1), 10_000, Some(TOHOST_OFFSET));
        assert_eq!(h.run(), RunOutcome::Passed, "{family:?} did not pass");
    }
}
