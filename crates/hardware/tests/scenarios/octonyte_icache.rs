//! End-to-end instruction-cache scenarios on `OctoNyte`, driven through the
//! public `Simulator` API (the cache's own miss/refill FSM is covered by its
//! unit tests).

use crate::common::{addi, Harness};
use kryptonyte_core::config::CoreFamily;

#[test]
fn a_straight_line_program_hits_after_its_first_block_refill() {
    // One 64-byte block holds 16 words; a program that fits inside one
    // block should miss exactly once per thread on its first fetch and hit
    // on every fetch after that, for every one of the 8 threads sharing the
    // cache.
    let program: Vec<u32> = (0..8).map(|i| addi(1, 1, i)).collect();
    let mut h = Harness::new(CoreFamily::OctoNyte, &program);
    h.run_cycles(200);
    let stats = h.stats();
    assert!(stats.icache_misses > 0, "first fetch of a cold cache must miss");
    assert!(stats.icache_hits > 0, "repeated fetches of the same block must hit");
}

#[test]
fn crossing_a_block_boundary_produces_more_than_one_miss() {
    // 20 instructions span two 64-byte blocks (16 words each), so fetching
    // past the first block forces a second refill.
    let program: Vec<u32> = (0..20).map(|i| addi(1, 1, i % 2)).collect();
    let mut h = Harness::new(CoreFamily::OctoNyte, &program);
    h.run_cycles(400);
    assert!(
        h.stats().icache_misses >= 2,
        "a program spanning two blocks should miss at least twice, got {}",
        h.stats().icache_misses
    );
}
