//! KryptoNyte RV32I core family simulator library.
//!
//! This crate implements the cycle-accurate behavioral model for the
//! KryptoNyte family of RISC-V RV32I processors:
//! 1. **ZeroNyte:** single-cycle, single-thread reference core.
//! 2. **PipeNyte:** single-thread, 4-stage (IF/ID/EX/MEM/WB) pipeline with
//!    stall-on-load-use hazard handling.
//! 3. **TetraNyte:** four-way barrel-threaded version of the PipeNyte datapath.
//! 4. **OctoNyte:** eight-stage, eight-thread barrel-threaded core.
//!
//! All four family members share the same functional units (decoder, ALU,
//! branch unit, load/store units, multiplier/divider, register file,
//! interrupt controller, instruction cache) and differ only in how those
//! units are wired into a pipeline topology.

/// Common types shared across the core family (traps, constants, register file).
pub mod common;
/// Simulator configuration (core family selection, cache geometry, cycle budget).
pub mod config;
/// Core family: functional units, pipeline scaffolding, and per-family tops.
pub mod core;
/// Instruction decoding (RV32I field extraction, sign extension, control bundle).
pub mod isa;
/// Simulation harness: ELF loader and cycle-driven `Simulator`.
pub mod sim;
/// Memory-side plumbing: flat RAM, the TileLink-UL `MemPort` shim, and the
/// TileLink-to-AXI4-Lite bridge.
pub mod soc;
/// Simulation statistics collection and reporting.
pub mod stats;

/// Root configuration type; use `Config::default()` or deserialize from JSON.
pub use crate::config::Config;
/// Top-level simulator; owns a core-family instance and the memory subsystem.
pub use crate::sim::simulator::Simulator;
