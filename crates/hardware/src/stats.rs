//! Simulation statistics collection and reporting.
//!
//! Scoped to what an RV32I/RV32M core family can actually report: no
//! floating point, no branch predictor (the barrel schedule never predicts
//! — it just round-robins), no privilege-mode breakdown beyond machine
//! mode, and a single instruction cache (`OctoNyte` only; the other family
//! members fetch straight from RAM).
//! 1. **Cycle and IPC:** total cycles, retired instructions, derived CPI/IPC.
//! 2. **Instruction mix:** counts by class (ALU, load, store, branch,
//!    system, multiply/divide).
//! 3. **Stalls:** load-use stall cycles (`PipeNyte` only).
//! 4. **Instruction cache:** hit/miss counts (`OctoNyte` only).

use std::time::Instant;

use crate::isa::decode::OpcodeClass;

/// Buckets one retired instruction's opcode class into the single
/// [`InstMix`] field it contributes to. `Fence` and `Illegal` retire
/// without landing in any bucket — there's no instruction-mix category a
/// fenced no-op or a trapped illegal opcode belongs to.
#[must_use]
pub fn classify(class: OpcodeClass) -> InstMix {
    let mut mix = InstMix::default();
    match class {
        OpcodeClass::AluReg | OpcodeClass::AluImm | OpcodeClass::Lui | OpcodeClass::Auipc => {
            mix.alu = 1;
        }
        OpcodeClass::Load => mix.load = 1,
        OpcodeClass::Store => mix.store = 1,
        OpcodeClass::Branch | OpcodeClass::Jal | OpcodeClass::Jalr => mix.branch = 1,
        OpcodeClass::System => mix.system = 1,
        OpcodeClass::MulDiv => mix.mul = 1,
        OpcodeClass::Fence | OpcodeClass::Illegal => {}
    }
    mix
}

/// Per-category retirement counts for one `step` (or accumulated over a
/// run), broken out by the same classes [`SimStats`] reports.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InstMix {
    /// ALU-class instructions (register-register, register-immediate,
    /// `LUI`, `AUIPC`).
    pub alu: u64,
    /// Loads.
    pub load: u64,
    /// Stores.
    pub store: u64,
    /// Taken or not-taken branches and jumps (`BRANCH`/`JAL`/`JALR`).
    pub branch: u64,
    /// `SYSTEM`-class instructions (CSR access, `ECALL`, `EBREAK`, `MRET`).
    pub system: u64,
    /// RV32M multiply/divide instructions (`MUL`/`MULH`/`MULHSU`/`MULHU`/
    /// `DIV`/`DIVU`/`REM`/`REMU`).
    pub mul: u64,
}

impl std::ops::AddAssign for InstMix {
    fn add_assign(&mut self, rhs: Self) {
        self.alu += rhs.alu;
        self.load += rhs.load;
        self.store += rhs.store;
        self.branch += rhs.branch;
        self.system += rhs.system;
        self.mul += rhs.mul;
    }
}

/// Simulation statistics accumulated over a run.
#[derive(Clone, Debug)]
pub struct SimStats {
    start_time: Instant,
    /// Total simulator cycles elapsed.
    pub cycles: u64,
    /// Number of instructions retired (including those that trapped).
    pub instructions_retired: u64,

    /// Count of load instructions retired.
    pub inst_load: u64,
    /// Count of store instructions retired.
    pub inst_store: u64,
    /// Count of taken and not-taken branch/jump instructions retired.
    pub inst_branch: u64,
    /// Count of ALU-class instructions retired (register-register,
    /// register-immediate, LUI, AUIPC).
    pub inst_alu: u64,
    /// Count of system instructions retired (CSR access, `ECALL`, `EBREAK`,
    /// `MRET`).
    pub inst_system: u64,
    /// Count of RV32M multiply/divide instructions retired.
    pub inst_mul: u64,

    /// Cycles stalled for a load-use hazard (`PipeNyte` only).
    pub stalls: u64,
    /// Number of traps (exceptions or interrupts) taken.
    pub traps_taken: u64,

    /// Instruction cache hits (`OctoNyte` only).
    pub icache_hits: u64,
    /// Instruction cache misses (`OctoNyte` only).
    pub icache_misses: u64,
}

impl Default for SimStats {
    fn default() -> Self {
        Self {
            start_time: Instant::now(),
            cycles: 0,
            instructions_retired: 0,
            inst_load: 0,
            inst_store: 0,
            inst_branch: 0,
            inst_alu: 0,
            inst_system: 0,
            inst_mul: 0,
            stalls: 0,
            traps_taken: 0,
            icache_hits: 0,
            icache_misses: 0,
        }
    }
}

/// Section names for selective stats output.
///
/// Valid section identifiers: `"summary"`, `"instruction_mix"`, `"memory"`.
/// Pass an empty slice to [`SimStats::print_sections`] to print all sections.
pub const STATS_SECTIONS: &[&str] = &["summary", "instruction_mix", "memory"];

impl SimStats {
    /// Folds one cycle's retired-instruction mix into the running totals.
    pub fn accumulate_mix(&mut self, mix: InstMix) {
        self.inst_alu += mix.alu;
        self.inst_load += mix.load;
        self.inst_store += mix.store;
        self.inst_branch += mix.branch;
        self.inst_system += mix.system;
        self.inst_mul += mix.mul;
    }

    /// Prints only the requested statistics sections to stdout.
    ///
    /// Each element of `sections` should be one of `"summary"`,
    /// `"instruction_mix"`, or `"memory"`. Pass an empty slice to print all
    /// sections (same as [`SimStats::print`]).
    pub fn print_sections(&self, sections: &[String]) {
        let all = sections.is_empty();
        let want = |name: &str| all || sections.iter().any(|s| s == name);

        let seconds = self.start_time.elapsed().as_secs_f64();
        let cyc = self.cycles.max(1);
        let insts = self.instructions_retired.max(1);
        let ipc = self.instructions_retired as f64 / cyc as f64;
        let cpi = self.cycles as f64 / insts as f64;
        let mips = if seconds > 0.0 {
            self.instructions_retired as f64 / seconds / 1_000_000.0
        } else {
            0.0
        };

        println!("==========================================================");
        println!("KRYPTONYTE SIMULATION STATISTICS");
        println!("==========================================================");

        if want("summary") {
            println!("host_seconds             {seconds:.4} s");
            println!("sim_cycles               {}", self.cycles);
            println!("sim_insts                {}", self.instructions_retired);
            println!("sim_ipc                  {ipc:.4}");
            println!("sim_cpi                  {cpi:.4}");
            println!("sim_mips                 {mips:.2}");
            println!("stall_cycles             {}", self.stalls);
            println!("traps_taken              {}", self.traps_taken);
            println!("----------------------------------------------------------");
        }

        if want("instruction_mix") {
            println!("INSTRUCTION MIX");
            println!("  alu                    {}", self.inst_alu);
            println!("  load                   {}", self.inst_load);
            println!("  store                  {}", self.inst_store);
            println!("  branch                 {}", self.inst_branch);
            println!("  system                 {}", self.inst_system);
            println!("  mul                    {}", self.inst_mul);
            println!("----------------------------------------------------------");
        }

        if want("memory") {
            let icache_total = self.icache_hits + self.icache_misses;
            let icache_rate = if icache_total > 0 {
                self.icache_hits as f64 / icache_total as f64 * 100.0
            } else {
                0.0
            };
            println!("MEMORY HIERARCHY");
            println!("  icache.hits            {}", self.icache_hits);
            println!("  icache.misses          {}", self.icache_misses);
            println!("  icache.hit_rate        {icache_rate:.2}%");
            println!("----------------------------------------------------------");
        }

        println!("==========================================================");
    }

    /// Prints every statistics section to stdout.
    pub fn print(&self) {
        self.print_sections(&[]);
    }
}
