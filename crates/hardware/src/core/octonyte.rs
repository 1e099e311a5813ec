//! OctoNyte: 8-stage, 8-thread barrel-threaded core — the canonical family
//! member the other three specialize away from.
//!
//! Fetch → Decode → Dispatch → RegisterRead → Execute1 → Execute2 →
//! Execute3 → Writeback, seven [`PipelineEntry`] registers between stage
//! boundaries, one [`BarrelScheduler`] of depth 8 over 8 threads. With
//! `numThreads == pipelineDepth` every stage holds a different thread every
//! cycle by construction (see [`crate::core::tetranyte`] for the argument in
//! full), so — as in TetraNyte — neither a load-use stall nor branch/trap
//! squashing is ever reachable; a thread's own next Fetch turn is always
//! far enough behind its previous instruction's Execute1 resolution and
//! Writeback commit. `Dispatch` and `Execute2`/`Execute3` are structural
//! pass-through stages here: they exist because the canonical pipeline
//! names them, reserved for instruction routing a fuller build-out would
//! place there, but carry no transformation of their own yet. Multiply
//! resolves inline in Execute1 like any other ALU op; divide is handed off
//! to a per-thread divider instead (see below) rather than occupying
//! Execute2/Execute3, since its latency outlasts the barrel rotation those
//! stages are sized for.
//!
//! Fetch is serviced through a shared [`ICache`]; because the backing RAM
//! is modeled as latency-free, a miss's whole Compare→Refill→WaitResp→
//! Replay→Compare-hit sequence resolves within the one cycle that missed,
//! rather than stretching across several of that thread's future turns.
//!
//! `DIV`/`DIVU`/`REM`/`REMU` resolve the same way they do on
//! [`crate::core::tetranyte`]: the iterative divider's 16-cycle latency
//! outlasts the barrel's 8-cycle rotation, so Execute1 hands the divide to a
//! per-thread [`Divider`] and retires a bubble; the owning thread drops out
//! of Fetch (alongside the existing interrupt check) until its divider
//! resolves and commits straight to the register file.

use crate::common::{RegisterFile, Trap, RESET_VECTOR};
use crate::core::csr::Csrs;
use crate::core::exec::{execute, ExecuteInputs};
use crate::core::pipeline::register::{Bundle, PipelineEntry};
use crate::core::pipeline::scheduler::BarrelScheduler;
use crate::core::pipeline::signals::CsrOp;
use crate::core::units::cache::ICache;
use crate::core::units::interrupt::InterruptController;
use crate::core::units::lsu;
use crate::core::units::muldiv::Divider;
use crate::isa::decode::{decode, OpcodeClass};
use crate::soc::ram::MemoryBus;
use crate::stats::{self, InstMix};

const NUM_THREADS: usize = 8;
const NUM_STAGES: u32 = 8;
const ICACHE_CAPACITY: u32 = 4096;
const ICACHE_BLOCK: u32 = 64;
const NUM_INTERRUPT_SOURCES: u32 = 8;

/// A divide in flight on one hardware thread, tracked outside the
/// pipeline-register chain since its result arrives long after the
/// instruction that issued it would otherwise have retired.
#[derive(Clone, Copy, Debug)]
struct PendingDiv {
    rd: u8,
    want_remainder: bool,
}

/// Reads one full cache block out of `mem` starting at `base`.
fn read_block(mem: &impl MemoryBus, base: u32, block: u32) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(block as usize);
    for w in 0..(block / 4) {
        bytes.extend_from_slice(&mem.read_word(base + w * 4).to_le_bytes());
    }
    bytes
}

/// Drives the shared instruction cache's FSM to completion for one fetch,
/// servicing any miss synchronously against `mem` within this call.
fn icache_fetch(cache: &mut ICache, mem: &impl MemoryBus, addr: u32) -> u32 {
    loop {
        let (resp, req) = cache.step(addr);
        if resp.valid {
            return resp.data;
        }
        if let Some(r) = req {
            let block = read_block(mem, r.addr, ICACHE_BLOCK);
            cache.supply_refill(&block);
        }
    }
}

/// The canonical 8-stage, 8-thread barrel-threaded core.
#[derive(Debug, Clone)]
pub struct OctoNyte {
    pcs: [u32; NUM_THREADS],
    regs: RegisterFile,
    csrs: Vec<Csrs>,
    scheduler: BarrelScheduler,
    icache: ICache,
    interrupts: InterruptController,
    fetch_decode: PipelineEntry,
    decode_dispatch: PipelineEntry,
    dispatch_regread: PipelineEntry,
    regread_ex1: PipelineEntry,
    ex1_ex2: PipelineEntry,
    ex2_ex3: PipelineEntry,
    ex3_wb: PipelineEntry,
    dividers: [Divider; NUM_THREADS],
    pending_div: [Option<PendingDiv>; NUM_THREADS],
    retired: u64,
    mix: InstMix,
}

impl Default for OctoNyte {
    fn default() -> Self {
        Self::new()
    }
}

impl OctoNyte {
    /// A freshly reset core: all eight threads at `RESET_VECTOR`, pipeline
    /// and instruction cache both empty.
    #[must_use]
    pub fn new() -> Self {
        Self {
            pcs: [RESET_VECTOR; NUM_THREADS],
            regs: RegisterFile::new(NUM_THREADS),
            csrs: vec![Csrs::new(); NUM_THREADS],
            scheduler: BarrelScheduler::new(NUM_THREADS as u32, NUM_STAGES),
            icache: ICache::new(ICACHE_CAPACITY, ICACHE_BLOCK),
            interrupts: InterruptController::new(NUM_INTERRUPT_SOURCES),
            fetch_decode: PipelineEntry::Bubble,
            decode_dispatch: PipelineEntry::Bubble,
            dispatch_regread: PipelineEntry::Bubble,
            regread_ex1: PipelineEntry::Bubble,
            ex1_ex2: PipelineEntry::Bubble,
            ex2_ex3: PipelineEntry::Bubble,
            ex3_wb: PipelineEntry::Bubble,
            dividers: [Divider::new(); NUM_THREADS],
            pending_div: [None; NUM_THREADS],
            retired: 0,
            mix: InstMix::default(),
        }
    }

    /// Program counter for one hardware thread.
    #[must_use]
    pub fn pc(&self, thread: usize) -> u32 {
        self.pcs[thread]
    }

    /// The shared, per-thread-partitioned register file.
    #[must_use]
    pub fn regs(&self) -> &RegisterFile {
        &self.regs
    }

    /// One thread's CSR file.
    #[must_use]
    pub fn csrs(&self, thread: usize) -> &Csrs {
        &self.csrs[thread]
    }

    /// Disables or enables a hardware thread; a disabled thread is never
    /// selected for Fetch and contributes guaranteed bubbles.
    pub fn set_thread_enable(&mut self, thread: usize, enabled: bool) {
        self.scheduler.set_thread_enable(thread, enabled);
    }

    /// Raises external interrupt sources (bit-vector, one bit per source)
    /// for this cycle; latched until claimed.
    pub fn raise_external_interrupts(&mut self, sources: u32) {
        self.interrupts.raise(sources);
    }

    /// `(hits, misses)` the shared instruction cache has served since reset.
    #[must_use]
    pub fn icache_stats(&self) -> (u64, u64) {
        (self.icache.hits(), self.icache.misses())
    }

    /// Total instructions retired across every thread since reset.
    #[must_use]
    pub fn retired(&self) -> u64 {
        self.retired
    }

    /// Retired-instruction counts broken down by opcode class, across every
    /// thread.
    #[must_use]
    pub fn instruction_mix(&self) -> InstMix {
        self.mix
    }

    /// Runs one clock edge across all eight stages. Returns `(thread,
    /// trap)` if the instruction resolving in Execute1 this cycle raised
    /// one (including a taken external interrupt).
    pub fn step(&mut self, mem: &mut impl MemoryBus) -> Option<(usize, Trap)> {
        for c in &mut self.csrs {
            c.tick_cycle();
        }

        // ---- Divider resolution (runs outside the pipeline-register chain) ----
        for t in 0..NUM_THREADS {
            if let Some(pending) = self.pending_div[t] {
                if let Some(r) = self.dividers[t].tick() {
                    let value = if pending.want_remainder { r.remainder } else { r.quotient };
                    self.regs.write(t, pending.rd, value);
                    self.csrs[t].tick_instret();
                    self.retired += 1;
                    self.pending_div[t] = None;
                }
            }
        }

        // ---- Writeback (consumes ex3_wb as it stood entering this cycle) ----
        if let Some(wb) = self.ex3_wb.bundle() {
            let t = wb.thread_id;
            if let Some(csr_val) = wb.csr_write {
                self.csrs[t].write(wb.csr_addr, csr_val);
            }
            if wb.do_reg_write {
                let value = if wb.class == OpcodeClass::Load { wb.mem_rdata } else { wb.alu_result };
                self.regs.write(t, wb.rd, value);
            }
            self.csrs[t].tick_instret();
            self.retired += 1;
        }

        // ---- Execute3: performs the memory access (consumes ex2_ex3) ----
        let ex3_wb_next = match self.ex2_ex3 {
            PipelineEntry::Bubble => PipelineEntry::Bubble,
            PipelineEntry::Valid(mut b) => {
                match b.class {
                    OpcodeClass::Store => {
                        let sr = lsu::store(b.alu_result, b.rs2_data, b.mem_width);
                        mem.write_word(b.alu_result, sr.mem_write, sr.mask);
                    }
                    OpcodeClass::Load => {
                        let word = mem.read_word(b.alu_result);
                        b.mem_rdata = lsu::load(b.alu_result, word, b.mem_width, b.unsigned_load);
                    }
                    _ => {}
                }
                PipelineEntry::Valid(b)
            }
        };

        // ---- Execute2: reserved pass-through (consumes ex1_ex2) ----
        let ex2_ex3_next = self.ex1_ex2;

        // ---- Execute1 (consumes regread_ex1 as it stood entering this cycle) ----
        let mut taken_trap = None;
        let ex1_ex2_next = match self.regread_ex1 {
            PipelineEntry::Bubble => PipelineEntry::Bubble,
            PipelineEntry::Valid(b) if b.class == OpcodeClass::MulDiv && b.mul_op.is_divide() => {
                let t = b.thread_id;
                self.dividers[t].start(b.rs1_data, b.rs2_data, b.mul_op.is_signed_divide());
                self.pending_div[t] =
                    Some(PendingDiv { rd: b.rd, want_remainder: b.mul_op.wants_remainder() });
                PipelineEntry::Bubble
            }
            PipelineEntry::Valid(b) => {
                let t = b.thread_id;
                let csr_old_value = if b.class == OpcodeClass::System && b.csr_op != CsrOp::None {
                    self.csrs[t].read(b.csr_addr)
                } else {
                    0
                };
                let inputs = ExecuteInputs {
                    instr: b.instr,
                    class: b.class,
                    alu_op: b.alu_op,
                    mul_op: b.mul_op,
                    imm: b.imm,
                    rs1_data: b.rs1_data,
                    rs2_data: b.rs2_data,
                    pc: b.pc,
                    mem_width: b.mem_width,
                    csr_op: b.csr_op,
                    csr_operand: b.csr_operand,
                    csr_old_value,
                };
                let out = execute(&inputs);

                let mem_trap = match b.class {
                    OpcodeClass::Load if lsu::load_misaligned(out.result, b.mem_width) => {
                        Some(Trap::LoadAddressMisaligned(out.result))
                    }
                    OpcodeClass::Store if lsu::store(out.result, b.rs2_data, b.mem_width).misaligned => {
                        Some(Trap::StoreAddressMisaligned(out.result))
                    }
                    _ => None,
                };

                if let Some(trap) = out.trap.or(mem_trap) {
                    self.pcs[t] = self.csrs[t].enter_trap(b.pc, trap);
                    taken_trap = Some((t, trap));
                    self.csrs[t].tick_instret();
                    self.retired += 1;
                    PipelineEntry::Bubble
                } else if out.is_mret {
                    self.pcs[t] = self.csrs[t].mret();
                    self.csrs[t].tick_instret();
                    self.retired += 1;
                    PipelineEntry::Bubble
                } else {
                    if out.ctrl_taken {
                        self.pcs[t] = out.ctrl_target;
                    }
                    PipelineEntry::Valid(Bundle {
                        alu_result: out.result,
                        do_reg_write: out.do_reg_write,
                        csr_write: out.csr_write,
                        ctrl_taken: out.ctrl_taken,
                        ctrl_target: out.ctrl_target,
                        ..b
                    })
                }
            }
        };

        // ---- RegisterRead (consumes dispatch_regread) ----
        let regread_ex1_next = match self.dispatch_regread {
            PipelineEntry::Bubble => PipelineEntry::Bubble,
            PipelineEntry::Valid(mut b) => {
                let t = b.thread_id;
                let d = decode(b.instr);
                b.rs1_data = self.regs.read(t, d.rs1);
                b.rs2_data = self.regs.read(t, d.rs2);
                b.csr_operand = if d.csr_imm_operand { u32::from(d.rs1) } else { b.rs1_data };
                PipelineEntry::Valid(b)
            }
        };

        // ---- Dispatch: reserved pass-through (consumes decode_dispatch) ----
        let dispatch_regread_next = self.decode_dispatch;

        // ---- Decode (consumes fetch_decode) ----
        let decode_dispatch_next = match self.fetch_decode {
            PipelineEntry::Bubble => PipelineEntry::Bubble,
            PipelineEntry::Valid(fetched) => {
                let t = fetched.thread_id;
                let d = decode(fetched.instr);
                self.mix += stats::classify(d.class);
                PipelineEntry::Valid(Bundle {
                    thread_id: t,
                    pc: fetched.pc,
                    instr: fetched.instr,
                    class: d.class,
                    alu_op: d.alu_op,
                    mul_op: d.mul_op,
                    imm: d.imm,
                    rd: d.rd,
                    mem_width: d.mem_width,
                    unsigned_load: d.unsigned_load,
                    csr_op: d.csr_op,
                    csr_addr: d.csr_addr,
                    ..Bundle::default()
                })
            }
        };

        // ---- Fetch ----
        let (fetch_thread, fetch_valid) = self.scheduler.stage_threads()[0];
        let fetch_decode_next = if fetch_valid && self.pending_div[fetch_thread as usize].is_none() {
            let t = fetch_thread as usize;
            let enable_mask = self.csrs[t].interrupt_enable_mask();
            if self.interrupts.has_interrupt(enable_mask) {
                self.pcs[t] = self.csrs[t].enter_trap(self.pcs[t], Trap::MachineExternalInterrupt);
                self.interrupts.complete(enable_mask);
                if taken_trap.is_none() {
                    taken_trap = Some((t, Trap::MachineExternalInterrupt));
                }
                PipelineEntry::Bubble
            } else {
                let pc = self.pcs[t];
                let instr = icache_fetch(&mut self.icache, mem, pc);
                self.pcs[t] = pc.wrapping_add(4);
                PipelineEntry::Valid(Bundle { thread_id: t, pc, instr, ..Bundle::default() })
            }
        } else {
            PipelineEntry::Bubble
        };
        self.scheduler.advance();

        self.fetch_decode = fetch_decode_next;
        self.decode_dispatch = decode_dispatch_next;
        self.dispatch_regread = dispatch_regread_next;
        self.regread_ex1 = regread_ex1_next;
        self.ex1_ex2 = ex1_ex2_next;
        self.ex2_ex3 = ex2_ex3_next;
        self.ex3_wb = ex3_wb_next;

        taken_trap
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::NOP_INSTRUCTION;
    use crate::soc::ram::Ram;

    fn ram_with(program: &[u32]) -> Ram {
        let mut ram = Ram::new(1 << 20);
        for (i, &w) in program.iter().enumerate() {
            ram.write_word(RESET_VECTOR + (i as u32) * 4, w, 0b1111);
        }
        ram
    }

    #[test]
    fn all_eight_threads_make_independent_progress() {
        let mut core = OctoNyte::new();
        let mut ram = ram_with(&[NOP_INSTRUCTION; 16]);
        for _ in 0..64 {
            core.step(&mut ram);
        }
        for t in 0..NUM_THREADS {
            assert!(core.pc(t) > RESET_VECTOR, "thread {t} never advanced");
        }
    }

    #[test]
    fn disabled_thread_never_advances_its_pc() {
        let mut core = OctoNyte::new();
        core.set_thread_enable(3, false);
        let mut ram = ram_with(&[NOP_INSTRUCTION; 16]);
        for _ in 0..64 {
            core.step(&mut ram);
        }
        assert_eq!(core.pc(3), RESET_VECTOR);
    }

    #[test]
    fn instruction_cache_miss_still_delivers_the_right_word() {
        // ADDI x1, x0, 5, laid out across what a small cache treats as two
        // lines, forcing at least one refill before thread 0 can decode it.
        let mut core = OctoNyte::new();
        let mut ram = ram_with(&[0x0050_0093]);
        for _ in 0..64 {
            core.step(&mut ram);
        }
        assert_eq!(core.regs().read(0, 1), 5);
    }

    #[test]
    fn pending_external_interrupt_redirects_to_the_trap_handler() {
        let mut core = OctoNyte::new();
        core.csrs[0].write(crate::core::csr::MTVEC, 0x8000_1000);
        core.csrs[0].write(crate::core::csr::MSTATUS, 0x8); // global MIE on
        core.csrs[0].write(crate::core::csr::MIE, 0b1); // source 0 enabled
        core.raise_external_interrupts(0b1);
        let mut ram = ram_with(&[NOP_INSTRUCTION; 16]);
        let mut saw_trap = false;
        for _ in 0..16 {
            if let Some((0, Trap::MachineExternalInterrupt)) = core.step(&mut ram) {
                saw_trap = true;
                break;
            }
        }
        assert!(saw_trap);
        assert_eq!(core.pc(0), 0x8000_1000);
    }

    #[test]
    fn every_thread_completes_a_divide_started_behind_its_back() {
        // ADDI x1,x0,20 ; ADDI x2,x0,6 ; DIV x3,x1,x2 ; NOP (every thread runs it)
        let mut core = OctoNyte::new();
        let mut ram = ram_with(&[0x0140_0093, 0x0060_0113, 0x0220_C1B3, NOP_INSTRUCTION]);
        for _ in 0..300 {
            core.step(&mut ram);
        }
        for t in 0..NUM_THREADS {
            assert_eq!(core.regs().read(t, 3), 3, "thread {t} should have divided 20/6");
        }
    }

    #[test]
    fn divide_by_zero_writes_all_ones_on_every_thread() {
        // ADDI x1,x0,7 ; DIVU x2,x1,x0
        let mut core = OctoNyte::new();
        let mut ram = ram_with(&[0x0070_0093, 0x0200_D133, NOP_INSTRUCTION, NOP_INSTRUCTION]);
        for _ in 0..100 {
            core.step(&mut ram);
        }
        for t in 0..NUM_THREADS {
            assert_eq!(core.regs().read(t, 2), 0xFFFF_FFFF);
        }
    }
}
