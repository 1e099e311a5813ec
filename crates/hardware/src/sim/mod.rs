//! Simulation harness: loading a program and driving a core to completion.
//!
//! 1. **Loader** (`loader`): reads an ELF file, copies its allocatable
//!    sections into RAM, and resolves the `tohost`/`fromhost`/signature
//!    symbols a conformance test uses to report completion.
//! 2. **Simulator** (`simulator`): owns a configured core and RAM, ticks the
//!    core once per clock edge, and polls `tohost` the way a reference
//!    harness does.

/// ELF loading and host-target protocol symbol resolution.
pub mod loader;
/// The cycle-driven `Simulator` and its `RunOutcome`.
pub mod simulator;

pub use loader::{HostSymbols, LoadedProgram, LoaderError};
pub use simulator::{RunOutcome, Simulator};
