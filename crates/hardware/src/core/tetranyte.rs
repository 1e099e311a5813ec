//! TetraNyte: 4-thread barrel-threaded version of the PipeNyte datapath.
//!
//! Same four pipeline registers and the same Fetch/Decode/Execute/Memory/
//! Writeback split as [`crate::core::pipenyte`], but each register's bundle
//! is tagged with the hardware thread that produced it, and a
//! [`BarrelScheduler`] picks a different thread to fetch every cycle. With
//! `numThreads == pipelineDepth` no two in-flight instructions ever share a
//! thread, so neither the load-use stall nor branch/trap squashing PipeNyte
//! needs are reachable here: by the time a thread is fetched again, its
//! previous instruction's Execute-stage redirect and Writeback-stage commit
//! have both already landed. The forwarding paths are kept anyway (gated on
//! a matching `thread_id`) since they can never fire but document the
//! hazard the datapath would otherwise need to handle.
//!
//! `DIV`/`DIVU`/`REM`/`REMU` need a different accommodation again: the
//! iterative divider's latency (16 cycles) is longer than the barrel's
//! entire rotation period (4 cycles), so holding a divide in the shared
//! `id_ex` register the way [`crate::core::pipenyte`] does would stall every
//! other thread's turn in that same slot, not just the divide's own thread.
//! Instead, Execute kicks the divide off into a per-thread [`Divider`] and
//! retires a bubble immediately; the owning thread is excluded from Fetch
//! (its rotation slot is simply skipped, not compressed) until its divider
//! resolves, at which point the result commits straight to the register
//! file and CSR retirement counters outside the pipeline-register chain.

use crate::common::{RegisterFile, Trap, RESET_VECTOR};
use crate::core::csr::Csrs;
use crate::core::exec::{execute, ExecuteInputs};
use crate::core::pipeline::register::{Bundle, PipelineEntry};
use crate::core::pipeline::scheduler::BarrelScheduler;
use crate::core::pipeline::signals::CsrOp;
use crate::core::units::lsu;
use crate::core::units::muldiv::Divider;
use crate::isa::decode::{decode, OpcodeClass};
use crate::soc::ram::MemoryBus;
use crate::stats::{self, InstMix};

const NUM_THREADS: usize = 4;

/// A divide in flight on one hardware thread, tracked outside the pipeline
/// register chain since its result arrives long after the instruction that
/// issued it would otherwise have retired.
#[derive(Clone, Copy, Debug)]
struct PendingDiv {
    rd: u8,
    want_remainder: bool,
}

/// Resolves one operand through same-thread forwarding from `ex_mem` and
/// `mem_wb`, falling back to the register file read at Decode. Never
/// triggers when barrel scheduling holds (every in-flight bundle belongs to
/// a distinct thread), but is correct regardless if a thread is disabled
/// and the rotation's distinctness guarantee no longer matters.
fn forward(thread: usize, rs: u8, regfile_value: u32, ex_mem: &PipelineEntry, mem_wb: &PipelineEntry) -> u32 {
    if rs == 0 {
        return 0;
    }
    if let Some(b) = ex_mem.bundle() {
        if b.thread_id == thread && b.do_reg_write && b.rd == rs && b.class != OpcodeClass::Load {
            return b.alu_result;
        }
    }
    if let Some(b) = mem_wb.bundle() {
        if b.thread_id == thread && b.do_reg_write && b.rd == rs {
            return if b.class == OpcodeClass::Load { b.mem_rdata } else { b.alu_result };
        }
    }
    regfile_value
}

/// The 4-thread barrel-threaded PipeNyte datapath.
#[derive(Debug, Clone)]
pub struct TetraNyte {
    pcs: [u32; NUM_THREADS],
    regs: RegisterFile,
    csrs: Vec<Csrs>,
    scheduler: BarrelScheduler,
    if_id: PipelineEntry,
    id_ex: PipelineEntry,
    ex_mem: PipelineEntry,
    mem_wb: PipelineEntry,
    dividers: [Divider; NUM_THREADS],
    pending_div: [Option<PendingDiv>; NUM_THREADS],
    retired: u64,
    mix: InstMix,
}

impl Default for TetraNyte {
    fn default() -> Self {
        Self::new()
    }
}

impl TetraNyte {
    /// A freshly reset core: all four threads at `RESET_VECTOR`, pipeline empty.
    #[must_use]
    pub fn new() -> Self {
        Self {
            pcs: [RESET_VECTOR; NUM_THREADS],
            regs: RegisterFile::new(NUM_THREADS),
            csrs: vec![Csrs::new(); NUM_THREADS],
            scheduler: BarrelScheduler::new(NUM_THREADS as u32, NUM_THREADS as u32),
            if_id: PipelineEntry::Bubble,
            id_ex: PipelineEntry::Bubble,
            ex_mem: PipelineEntry::Bubble,
            mem_wb: PipelineEntry::Bubble,
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

    /// Runs one clock edge. Returns `(thread, trap)` if the instruction
    /// retiring through Execute this cycle raised one.
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

        // ---- Writeback (consumes mem_wb as it stood entering this cycle) ----
        if let Some(wb) = self.mem_wb.bundle() {
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

        // ---- Memory (consumes ex_mem as it stood entering this cycle) ----
        let mem_wb_next = match self.ex_mem {
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

        // ---- Execute (consumes id_ex as it stood entering this cycle) ----
        let mut taken_trap = None;
        let ex_mem_next = match self.id_ex {
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

        // ---- Decode + RegisterRead (consumes if_id as it stood entering this cycle) ----
        let id_ex_next = match self.if_id {
            PipelineEntry::Bubble => PipelineEntry::Bubble,
            PipelineEntry::Valid(fetched) => {
                let t = fetched.thread_id;
                let d = decode(fetched.instr);
                self.mix += stats::classify(d.class);
                let rs1_raw = self.regs.read(t, d.rs1);
                let rs2_raw = self.regs.read(t, d.rs2);
                let rs1_data = forward(t, d.rs1, rs1_raw, &self.ex_mem, &self.mem_wb);
                let rs2_data = forward(t, d.rs2, rs2_raw, &self.ex_mem, &self.mem_wb);
                let csr_operand = if d.csr_imm_operand { u32::from(d.rs1) } else { rs1_data };
                PipelineEntry::Valid(Bundle {
                    thread_id: t,
                    pc: fetched.pc,
                    instr: fetched.instr,
                    class: d.class,
                    alu_op: d.alu_op,
                    mul_op: d.mul_op,
                    imm: d.imm,
                    rs1_data,
                    rs2_data,
                    rd: d.rd,
                    mem_width: d.mem_width,
                    unsigned_load: d.unsigned_load,
                    csr_op: d.csr_op,
                    csr_addr: d.csr_addr,
                    csr_operand,
                    ..Bundle::default()
                })
            }
        };

        // ---- Fetch ----
        // A thread with an outstanding divide keeps its rotation slot (the
        // barrel does not compress around it) but is skipped for fetch
        // until `pending_div` clears, so it never has two instructions
        // in flight at once.
        let (fetch_thread, fetch_valid) = self.scheduler.stage_threads()[0];
        let if_id_next = if fetch_valid && self.pending_div[fetch_thread as usize].is_none() {
            let t = fetch_thread as usize;
            let pc = self.pcs[t];
            let instr = mem.read_word(pc);
            self.pcs[t] = pc.wrapping_add(4);
            PipelineEntry::Valid(Bundle { thread_id: t, pc, instr, ..Bundle::default() })
        } else {
            PipelineEntry::Bubble
        };
        self.scheduler.advance();

        self.if_id = if_id_next;
        self.id_ex = id_ex_next;
        self.ex_mem = ex_mem_next;
        self.mem_wb = mem_wb_next;

        taken_trap
    }
}
