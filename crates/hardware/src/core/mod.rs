//! Core family: functional units, pipeline scaffolding, and per-family tops.
//!
//! 1. **Units** (`units`): the pure/narrowly-stateful functional blocks
//!    (ALU, branch unit, load/store units, multiplier/divider, ICache,
//!    interrupt controller) shared by every family member.
//! 2. **Pipeline** (`pipeline`): the tagged-union pipeline register, the
//!    control-tag enums, and the barrel scheduler.
//! 3. **CSR file** (`csr`): the per-thread machine-mode CSR subset.
//! 4. **Execute** (`exec`): the shared Execute-stage dispatch every family
//!    member's Execute stage calls into.
//! 5. **Family members**: [`zeronyte`] (single-cycle reference),
//!    [`pipenyte`] (4-stage single-thread), [`tetranyte`] (4-thread barrel),
//!    [`octonyte`] (8-stage/8-thread barrel, the canonical case).

/// Machine-mode CSR file (`Csrs`).
pub mod csr;
/// Shared Execute-stage dispatch (`execute`).
pub mod exec;
/// Pipeline register, control-tag enums, and the barrel scheduler.
pub mod pipeline;
/// Functional units (ALU, branch, load/store, mul/div, ICache, interrupts).
pub mod units;

/// OctoNyte: 8-stage, 8-thread barrel-threaded core (the canonical family member).
pub mod octonyte;
/// PipeNyte: single-thread, 4-stage pipeline with stall-on-load-use.
pub mod pipenyte;
/// TetraNyte: 4-thread barrel-threaded version of the PipeNyte datapath.
pub mod tetranyte;
/// ZeroNyte: single-cycle, single-thread reference core.
pub mod zeronyte;

pub use csr::Csrs;
pub use octonyte::OctoNyte;
pub use pipenyte::PipeNyte;
pub use tetranyte::TetraNyte;
pub use zeronyte::ZeroNyte;
