//! Shared test infrastructure for the hardware integration suite.

use kryptonyte_core::common::RESET_VECTOR;
use kryptonyte_core::config::{Config, CoreConfig, CoreFamily, GeneralConfig};
use kryptonyte_core::sim::{HostSymbols, RunOutcome, Simulator};
use kryptonyte_core::soc::Ram;

/// Wraps a [`Simulator`] with convenience constructors for assembling a
/// program directly into RAM (no ELF file needed) and driving it.
pub struct Harness {
    pub sim: Simulator,
}

impl Harness {
    /// Builds a harness for `family`, with `program` loaded at
    /// [`RESET_VECTOR`] and a generous default cycle budget.
    #[must_use]
    pub fn new(family: CoreFamily, program: &[u32]) -> Self {
        Self::with_cycles(family, program, 10_000)
    }

    /// As [`Harness::new`], with an explicit cycle budget.
    #[must_use]
    pub fn with_cycles(family: CoreFamily, program: &[u32], max_cycles: u64) -> Self {
        Self::with_cycles_and_tohost(family, program, max_cycles, None)
    }

    /// As [`Harness::with_cycles`], additionally registering `tohost_offset`
    /// (a byte offset from [`RESET_VECTOR`]) as the `tohost` symbol so
    /// [`Harness::run`] can observe program-signaled completion.
    #[must_use]
    pub fn with_cycles_and_tohost(
        family: CoreFamily,
        program: &[u32],
        max_cycles: u64,
        tohost_offset: Option<u32>,
    ) -> Self {
        let symbols = HostSymbols {
            tohost: tohost_offset.map(|offset| RESET_VECTOR + offset),
            ..HostSymbols::default()
        };
        Self::with_symbols(family, program, max_cycles, symbols)
    }

    /// As [`Harness::with_cycles_and_tohost`], with the full set of
    /// host-target symbols (including a signature region).
    #[must_use]
    pub fn with_symbols(
        family: CoreFamily,
        program: &[u32],
        max_cycles: u64,
        symbols: HostSymbols,
    ) -> Self {
        let mut ram = Ram::new(kryptonyte_core::common::RAM_SIZE);
        for (i, &word) in program.iter().enumerate() {
            ram.load_bytes(RESET_VECTOR + (i as u32) * 4, &word.to_le_bytes());
        }
        let config = Config {
            core: CoreConfig {
                family,
                ..CoreConfig::default()
            },
            general: GeneralConfig {
                max_cycles,
                ..GeneralConfig::default()
            },
            ..Config::default()
        };
        Self {
            sim: Simulator::new(&config, ram, symbols),
        }
    }

    /// The underlying signature region, if the harness was built with one.
    #[must_use]
    pub fn signature(&self) -> Vec<u32> {
        self.sim.signature()
    }

    /// Single-steps the simulation `n` times.
    pub fn run_cycles(&mut self, n: u64) -> &mut Self {
        for _ in 0..n {
            self.sim.tick();
        }
        self
    }

    /// Runs to completion via the `tohost`/cycle-budget protocol.
    pub fn run(&mut self) -> RunOutcome {
        self.sim.run()
    }

    /// Reads general-purpose register `reg` of `thread`.
    #[must_use]
    pub fn reg(&self, thread: usize, reg: u8) -> u32 {
        self.sim.register(thread, reg)
    }

    /// Reads CSR `addr` of `thread`'s CSR file.
    #[must_use]
    pub fn csr(&self, thread: usize, addr: u32) -> u32 {
        self.sim.csr(thread, addr)
    }

    /// Accumulated run statistics.
    #[must_use]
    pub fn stats(&self) -> &kryptonyte_core::stats::SimStats {
        self.sim.stats()
    }

    /// Reads the 32-bit word at `addr` out of RAM.
    #[must_use]
    pub fn mem_word(&mut self, addr: u32) -> u32 {
        let bytes = self.sim.ram_mut().read_bytes(addr, 4);
        u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
    }
}

/// Encodes `ADDI rd, rs1, imm` (a 12-bit signed immediate).
#[must_use]
pub fn addi(rd: u8, rs1: u8, imm: i32) -> u32 {
    let imm = (imm as u32) & 0xFFF;
    (imm << 20) | (u32::from(rs1) << 15) | (u32::from(rd) << 7) | 0b001_0011
}

/// Encodes `LUI rd, imm20` (imm20 already shifted into bits 31:12).
#[must_use]
pub fn lui(rd: u8, imm20: u32) -> u32 {
    (imm20 & 0xFFFF_F000) | (u32::from(rd) << 7) | 0b011_0111
}

/// Encodes `SW rs2, offset(rs1)`.
#[must_use]
pub fn sw(rs1: u8, rs2: u8, offset: i32) -> u32 {
    let offset = (offset as u32) & 0xFFF;
    let hi = (offset >> 5) & 0x7F;
    let lo = offset & 0x1F;
    (hi << 25)
        | (u32::from(rs2) << 20)
        | (u32::from(rs1) << 15)
        | (0b010 << 12)
        | (lo << 7)
        | 0b010_0011
}

/// Encodes `LW rd, offset(rs1)`.
#[must_use]
pub fn lw(rd: u8, rs1: u8, offset: i32) -> u32 {
    let offset = (offset as u32) & 0xFFF;
    (offset << 20) | (u32::from(rs1) << 15) | (0b010 << 12) | (u32::from(rd) << 7) | 0b000_0011
}

/// Encodes `ADD rd, rs1, rs2`.
#[must_use]
pub fn add(rd: u8, rs1: u8, rs2: u8) -> u32 {
    (u32::from(rs2) << 20) | (u32::from(rs1) << 15) | (u32::from(rd) << 7) | 0b011_0011
}

/// Encodes `BEQ rs1, rs2, offset` (a 13-bit signed, 2-byte-aligned offset).
#[must_use]
pub fn beq(rs1: u8, rs2: u8, offset: i32) -> u32 {
    let offset = offset as u32;
    let b12 = (offset >> 12) & 1;
    let b11 = (offset >> 11) & 1;
    let b10_5 = (offset >> 5) & 0x3F;
    let b4_1 = (offset >> 1) & 0xF;
    (b12 << 31)
        | (b10_5 << 25)
        | (u32::from(rs2) << 20)
        | (u32::from(rs1) << 15)
        | (0b000 << 12)
        | (b4_1 << 8)
        | (b11 << 7)
        | 0b110_0011
}
