//! The cycle-driven simulation harness.
//!
//! Owns one family member (selected by [`Config::core`]), the flat system
//! RAM, and the host-target protocol addresses the loader found. Each call
//! to [`Simulator::tick`] advances every family member's notion of "one
//! clock edge" by exactly one, and the harness polls `tohost` the same way
//! a real conformance runner does: nonzero means done, `1` means pass.

use tracing::{debug, info, warn};

use crate::config::{Config, CoreFamily};
use crate::core::{OctoNyte, PipeNyte, TetraNyte, ZeroNyte};
use crate::sim::loader::HostSymbols;
use crate::soc::ram::Ram;
use crate::stats::{InstMix, SimStats};

/// Copies a core's cumulative instruction-mix counters into the
/// simulation-wide totals. Each core tracks its own mix as a running total
/// (like `retired()`), so this assigns rather than accumulates.
fn apply_mix(stats: &mut SimStats, mix: InstMix) {
    stats.inst_alu = mix.alu;
    stats.inst_load = mix.load;
    stats.inst_store = mix.store;
    stats.inst_branch = mix.branch;
    stats.inst_system = mix.system;
    stats.inst_mul = mix.mul;
}

/// Why a simulation run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The program wrote `1` to `tohost`: the conformance test passed.
    Passed,
    /// The program wrote a nonzero value other than `1` to `tohost`.
    /// Typically the high bits encode which sub-test failed.
    Failed(u32),
    /// The configured cycle budget elapsed before `tohost` was written.
    TimedOut,
}

/// One of the four KryptoNyte family members, erased behind a single type
/// so the harness can drive any of them with the same loop.
#[derive(Debug)]
enum Core {
    Zero(ZeroNyte),
    Pipe(PipeNyte),
    Tetra(TetraNyte),
    Octo(OctoNyte),
}

/// Owns a core, the system RAM, and runs the simulation to completion.
#[derive(Debug)]
pub struct Simulator {
    core: Core,
    ram: Ram,
    symbols: HostSymbols,
    max_cycles: u64,
    trace: bool,
    cycles: u64,
    stats: SimStats,
}

impl Simulator {
    /// Builds a simulator for `config` around an already-loaded `ram` and
    /// the host-target symbols the loader found (pass
    /// [`HostSymbols::default()`] if none were resolved).
    #[must_use]
    pub fn new(config: &Config, ram: Ram, symbols: HostSymbols) -> Self {
        let core = match config.core.family {
            CoreFamily::ZeroNyte => Core::Zero(ZeroNyte::new()),
            CoreFamily::PipeNyte => Core::Pipe(PipeNyte::new()),
            CoreFamily::TetraNyte => Core::Tetra(TetraNyte::new()),
            CoreFamily::OctoNyte => Core::Octo(OctoNyte::new()),
        };
        Self {
            core,
            ram,
            symbols,
            max_cycles: config.general.max_cycles,
            trace: config.general.trace,
            cycles: 0,
            stats: SimStats::default(),
        }
    }

    /// The backing RAM, for loading a program before the first tick or
    /// inspecting a signature region afterward.
    pub fn ram_mut(&mut self) -> &mut Ram {
        &mut self.ram
    }

    /// Accumulated statistics for the run so far.
    #[must_use]
    pub fn stats(&self) -> &SimStats {
        &self.stats
    }

    /// Reads general-purpose register `reg` of `thread` as it stands right
    /// now. `thread` is ignored by `ZeroNyte` and `PipeNyte`, which only
    /// ever have thread 0. Useful for harnesses that check final register
    /// state directly instead of relying on a signature region.
    #[must_use]
    pub fn register(&self, thread: usize, reg: u8) -> u32 {
        match &self.core {
            Core::Zero(core) => core.regs().read(0, reg),
            Core::Pipe(core) => core.regs().read(0, reg),
            Core::Tetra(core) => core.regs().read(thread, reg),
            Core::Octo(core) => core.regs().read(thread, reg),
        }
    }

    /// Reads CSR `addr` of `thread`'s CSR file. `thread` is ignored by
    /// `ZeroNyte` and `PipeNyte`. Primarily for conformance harnesses that
    /// inspect `mcause`/`mepc`/`mtval` after a trap.
    #[must_use]
    pub fn csr(&self, thread: usize, addr: u32) -> u32 {
        match &self.core {
            Core::Zero(core) => core.csrs().read(addr),
            Core::Pipe(core) => core.csrs().read(addr),
            Core::Tetra(core) => core.csrs(thread).read(addr),
            Core::Octo(core) => core.csrs(thread).read(addr),
        }
    }

    /// Advances the simulation by one clock edge, independent of the
    /// `tohost` protocol. [`Simulator::run`] is built on top of this for
    /// the common case; single-stepping is useful for test harnesses and
    /// interactive debugging.
    pub fn tick(&mut self) {
        self.cycles += 1;
        self.stats.cycles += 1;
        match &mut self.core {
            Core::Zero(core) => {
                if let Some(trap) = core.step(&mut self.ram) {
                    self.stats.traps_taken += 1;
                    if self.trace {
                        debug!(pc = core.pc(), %trap, "zeronyte trapped");
                    }
                }
                self.stats.instructions_retired = core.retired();
                apply_mix(&mut self.stats, core.instruction_mix());
            }
            Core::Pipe(core) => {
                if let Some(trap) = core.step(&mut self.ram) {
                    self.stats.traps_taken += 1;
                    if self.trace {
                        debug!(pc = core.pc(), %trap, "pipenyte trapped");
                    }
                }
                self.stats.instructions_retired = core.retired();
                self.stats.stalls = core.stall_cycles();
                apply_mix(&mut self.stats, core.instruction_mix());
            }
            Core::Tetra(core) => {
                if let Some((thread, trap)) = core.step(&mut self.ram) {
                    self.stats.traps_taken += 1;
                    if self.trace {
                        debug!(thread, %trap, "tetranyte trapped");
                    }
                }
                self.stats.instructions_retired = core.retired();
                apply_mix(&mut self.stats, core.instruction_mix());
            }
            Core::Octo(core) => {
                if let Some((thread, trap)) = core.step(&mut self.ram) {
                    self.stats.traps_taken += 1;
                    if self.trace {
                        debug!(thread, %trap, "octonyte trapped");
                    }
                }
                self.stats.instructions_retired = core.retired();
                apply_mix(&mut self.stats, core.instruction_mix());
                let (hits, misses) = core.icache_stats();
                self.stats.icache_hits = hits;
                self.stats.icache_misses = misses;
            }
        }
    }

    /// Reads the word at `addr` out of the simulation RAM without
    /// advancing any clock.
    fn peek(&self, addr: u32) -> u32 {
        let bytes = self.ram.read_bytes(addr, 4);
        u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
    }

    /// Runs until `tohost` is written, the cycle budget is exhausted, or
    /// (if neither `tohost` nor a cycle budget constrains the program) the
    /// core simply stops making forward progress is left to the caller to
    /// detect — this harness always polls `tohost` after every tick.
    pub fn run(&mut self) -> RunOutcome {
        loop {
            self.tick();

            if let Some(tohost) = self.symbols.tohost {
                let value = self.peek(tohost);
                if value != 0 {
                    info!(cycles = self.cycles, value, "tohost write observed");
                    return if value == 1 {
                        RunOutcome::Passed
                    } else {
                        RunOutcome::Failed(value)
                    };
                }
            }

            if self.cycles >= self.max_cycles {
                warn!(max_cycles = self.max_cycles, "cycle budget exceeded");
                return RunOutcome::TimedOut;
            }
        }
    }

    /// Reads the signature region (`begin_signature`..`end_signature`) as
    /// little-endian 32-bit words, for comparison against a reference
    /// simulator's output. Empty if the program defines no signature.
    #[must_use]
    pub fn signature(&self) -> Vec<u32> {
        let (Some(begin), Some(end)) = (self.symbols.begin_signature, self.symbols.end_signature)
        else {
            return Vec::new();
        };
        let len = end.saturating_sub(begin);
        self.ram
            .read_bytes(begin, len)
            .chunks_exact(4)
            .map(|w| u32::from_le_bytes([w[0], w[1], w[2], w[3]]))
            .collect()
    }
}
