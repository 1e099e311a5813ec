//! PipeNyte: single-thread, 4-register pipeline (Fetch/Decode/Execute/Memory,
//! writeback folded into Memory's consumer).
//!
//! Four pipeline registers — `if_id`, `id_ex`, `ex_mem`, `mem_wb` — stage one
//! instruction at a time through Fetch, Decode (with register read and
//! forwarding), Execute, and Memory/Writeback. Branches, jumps, `MRET`, and
//! every trap resolve as soon as Execute detects them (effective address and
//! CSR state are both already available there), squashing the two younger,
//! not-yet-executed instructions the same cycle. Two things need an explicit
//! stall instead of flowing straight through: the load-use hazard, whose
//! data isn't ready until Memory, and `DIV`/`DIVU`/`REM`/`REMU`, which hold
//! their instruction in Execute across the iterative divider's multi-cycle
//! latency.

use crate::common::{RegisterFile, Trap, RESET_VECTOR};
use crate::core::csr::Csrs;
use crate::core::exec::{execute, ExecuteInputs};
use crate::core::pipeline::register::{Bundle, PipelineEntry};
use crate::core::pipeline::signals::CsrOp;
use crate::core::units::lsu;
use crate::core::units::muldiv::Divider;
use crate::isa::decode::{decode, OpcodeClass};
use crate::soc::ram::MemoryBus;
use crate::stats::{self, InstMix};

/// Whether `class` reads `rs2` as a data operand (as opposed to not using it,
/// or using the `rs1` field as a CSR address's source).
fn reads_rs2(class: OpcodeClass) -> bool {
    matches!(class, OpcodeClass::AluReg | OpcodeClass::Store | OpcodeClass::Branch)
}

/// Resolves one operand through the forwarding paths from `ex_mem` (the
/// fresher producer) and `mem_wb`, falling back to the register file's value
/// read at Decode. `x0` never forwards, matching [`RegisterFile::read`].
fn forward(rs: u8, regfile_value: u32, ex_mem: &PipelineEntry, mem_wb: &PipelineEntry) -> u32 {
    if rs == 0 {
        return 0;
    }
    if let Some(b) = ex_mem.bundle() {
        if b.do_reg_write && b.rd == rs && b.class != OpcodeClass::Load {
            return b.alu_result;
        }
    }
    if let Some(b) = mem_wb.bundle() {
        if b.do_reg_write && b.rd == rs {
            return if b.class == OpcodeClass::Load { b.mem_rdata } else { b.alu_result };
        }
    }
    regfile_value
}

/// The 4-register single-thread pipeline.
#[derive(Debug, Clone)]
pub struct PipeNyte {
    pc: u32,
    regs: RegisterFile,
    csrs: Csrs,
    if_id: PipelineEntry,
    id_ex: PipelineEntry,
    ex_mem: PipelineEntry,
    mem_wb: PipelineEntry,
    divider: Divider,
    retired: u64,
    stall_cycles: u64,
    mix: InstMix,
}

impl Default for PipeNyte {
    fn default() -> Self {
        Self::new()
    }
}

impl PipeNyte {
    /// A freshly reset core, pipeline empty, `pc = RESET_VECTOR`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            pc: RESET_VECTOR,
            regs: RegisterFile::new(1),
            csrs: Csrs::new(),
            if_id: PipelineEntry::Bubble,
            id_ex: PipelineEntry::Bubble,
            ex_mem: PipelineEntry::Bubble,
            mem_wb: PipelineEntry::Bubble,
            divider: Divider::new(),
            retired: 0,
            stall_cycles: 0,
            mix: InstMix::default(),
        }
    }

    /// Current fetch program counter.
    #[must_use]
    pub fn pc(&self) -> u32 {
        self.pc
    }

    /// The register file.
    #[must_use]
    pub fn regs(&self) -> &RegisterFile {
        &self.regs
    }

    /// The CSR file.
    #[must_use]
    pub fn csrs(&self) -> &Csrs {
        &self.csrs
    }

    /// Count of instructions retired (committed or trapped) since reset.
    #[must_use]
    pub fn retired(&self) -> u64 {
        self.retired
    }

    /// Count of cycles spent stalled on a load-use hazard or a busy divider.
    #[must_use]
    pub fn stall_cycles(&self) -> u64 {
        self.stall_cycles
    }

    /// Retired-instruction counts broken down by opcode class.
    #[must_use]
    pub fn instruction_mix(&self) -> InstMix {
        self.mix
    }

    /// Runs one clock edge across all four stages. Returns the trap taken
    /// this cycle, if the instruction in Execute raised one.
    pub fn step(&mut self, mem: &mut impl MemoryBus) -> Option<Trap> {
        self.csrs.tick_cycle();

        // ---- Writeback (consumes mem_wb as it stood entering this cycle) ----
        if let Some(wb) = self.mem_wb.bundle() {
            if let Some(csr_val) = wb.csr_write {
                self.csrs.write(wb.csr_addr, csr_val);
            }
            if wb.do_reg_write {
                let value = if wb.class == OpcodeClass::Load { wb.mem_rdata } else { wb.alu_result };
                self.regs.write(0, wb.rd, value);
            }
            self.csrs.tick_instret();
            self.retired += 1;
            self.mix += stats::classify(wb.class);
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
        let mut flush_younger = false;
        let mut redirect = None;
        let mut taken_trap = None;
        let mut div_stall = false;
        let ex_mem_next = match self.id_ex {
            PipelineEntry::Bubble => PipelineEntry::Bubble,
            PipelineEntry::Valid(b) if b.class == OpcodeClass::MulDiv && b.mul_op.is_divide() => {
                if !self.divider.busy() {
                    self.divider.start(b.rs1_data, b.rs2_data, b.mul_op.is_signed_divide());
                }
                match self.divider.tick() {
                    Some(r) => {
                        let value = if b.mul_op.wants_remainder() { r.remainder } else { r.quotient };
                        PipelineEntry::Valid(Bundle { alu_result: value, do_reg_write: true, ..b })
                    }
                    None => {
                        div_stall = true;
                        PipelineEntry::Bubble
                    }
                }
            }
            PipelineEntry::Valid(b) => {
                let csr_old_value = if b.class == OpcodeClass::System && b.csr_op != CsrOp::None {
                    self.csrs.read(b.csr_addr)
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
                    redirect = Some(self.csrs.enter_trap(b.pc, trap));
                    flush_younger = true;
                    taken_trap = Some(trap);
                    self.csrs.tick_instret();
                    self.retired += 1;
                    self.mix += stats::classify(b.class);
                    PipelineEntry::Bubble
                } else if out.is_mret {
                    redirect = Some(self.csrs.mret());
                    flush_younger = true;
                    self.csrs.tick_instret();
                    self.retired += 1;
                    self.mix += stats::classify(b.class);
                    PipelineEntry::Bubble
                } else {
                    if out.ctrl_taken {
                        redirect = Some(out.ctrl_target);
                        flush_younger = true;
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
        let (id_ex_candidate, stall) = match self.if_id {
            PipelineEntry::Bubble => (PipelineEntry::Bubble, false),
            PipelineEntry::Valid(fetched) => {
                let d = decode(fetched.instr);
                let load_use_hazard = matches!(
                    self.id_ex,
                    PipelineEntry::Valid(b)
                        if b.class == OpcodeClass::Load
                            && b.rd != 0
                            && (b.rd == d.rs1 || (reads_rs2(d.class) && b.rd == d.rs2))
                );
                if load_use_hazard {
                    (PipelineEntry::Bubble, true)
                } else {
                    let rs1_raw = self.regs.read(0, d.rs1);
                    let rs2_raw = self.regs.read(0, d.rs2);
                    let rs1_data = forward(d.rs1, rs1_raw, &self.ex_mem, &self.mem_wb);
                    let rs2_data = forward(d.rs2, rs2_raw, &self.ex_mem, &self.mem_wb);
                    let csr_operand = if d.csr_imm_operand { u32::from(d.rs1) } else { rs1_data };
                    (
                        PipelineEntry::Valid(Bundle {
                            thread_id: 0,
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
                        }),
                        false,
                    )
                }
            }
        };
        let stall = stall || div_stall;

        // ---- Fetch ----
        let (if_id_next, pc_next) = if let (true, Some(target)) = (flush_younger, redirect) {
            (PipelineEntry::Bubble, target)
        } else if stall {
            (self.if_id, self.pc)
        } else {
            let instr = mem.read_word(self.pc);
            (
                PipelineEntry::Valid(Bundle { pc: self.pc, instr, ..Bundle::default() }),
                self.pc.wrapping_add(4),
            )
        };

        self.if_id = if_id_next;
        self.id_ex = if flush_younger {
            PipelineEntry::Bubble
        } else if div_stall {
            self.id_ex
        } else {
            id_ex_candidate
        };
        self.ex_mem = ex_mem_next;
        self.mem_wb = mem_wb_next;
        self.pc = pc_next;
        if stall {
            self.stall_cycles += 1;
        }

        taken_trap
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::NOP_INSTRUCTION;
    use crate::soc::ram::Ram;

    fn ram_with(program: &[u32]) -> Ram {
        let mut ram = Ram::new(4096);
        for (i, &w) in program.iter().enumerate() {
            ram.write_word(RESET_VECTOR + (i as u32) * 4, w, 0b1111);
        }
        ram
    }

    fn run(core: &mut PipeNyte, ram: &mut Ram, cycles: usize) {
        for _ in 0..cycles {
            core.step(ram);
        }
    }

    #[test]
    fn back_to_back_alu_ops_forward_without_stalling() {
        // ADDI x1, x0, 5 ; ADD x2, x1, x1
        let mut core = PipeNyte::new();
        let mut ram = ram_with(&[0x0050_0093, 0x0010_8133, NOP_INSTRUCTION, NOP_INSTRUCTION, NOP_INSTRUCTION]);
        run(&mut core, &mut ram, 6);
        assert_eq!(core.regs().read(0, 2), 10);
        assert_eq!(core.stall_cycles(), 0);
    }

    #[test]
    fn load_use_hazard_stalls_one_cycle() {
        // LW x1, 0(x2) ; ADD x3, x1, x1 -- x2 preloaded with RESET_VECTOR, mem[RESET_VECTOR]=7
        let mut core = PipeNyte::new();
        let mut ram = ram_with(&[0x0001_2083, 0x0010_81B3, NOP_INSTRUCTION, NOP_INSTRUCTION, NOP_INSTRUCTION]);
        ram.write_word(RESET_VECTOR, 7, 0b1111);
        core.regs.write(0, 2, RESET_VECTOR);
        run(&mut core, &mut ram, 7);
        assert_eq!(core.regs().read(0, 3), 14);
        assert_eq!(core.stall_cycles(), 1);
    }

    #[test]
    fn taken_branch_flushes_two_younger_fetches() {
        // BEQ x0, x0, 8 ; ADDI x1, x0, 1 (skipped) ; ADDI x1, x0, 2 (target)
        let mut core = PipeNyte::new();
        let mut ram = ram_with(&[0x0000_0463, 0x0010_0093, 0x0020_0093, NOP_INSTRUCTION]);
        run(&mut core, &mut ram, 6);
        assert_eq!(core.regs().read(0, 1), 2);
    }

    #[test]
    fn illegal_instruction_traps_and_squashes_younger_fetches() {
        let mut core = PipeNyte::new();
        core.csrs.write(crate::core::csr::MTVEC, 0x8000_2000);
        let mut ram = ram_with(&[0b0101011, 0x0010_0093, NOP_INSTRUCTION]);
        let mut trap = None;
        for _ in 0..4 {
            if let Some(t) = core.step(&mut ram) {
                trap = Some(t);
            }
        }
        assert_eq!(trap, Some(Trap::IllegalInstruction(0b0101011)));
        assert_eq!(core.regs().read(0, 1), 0); // the flushed ADDI never commits
    }

    #[test]
    fn div_stalls_in_execute_until_the_divider_resolves() {
        // ADDI x1, x0, 20 ; ADDI x2, x0, 6 ; DIV x3, x1, x2
        let mut core = PipeNyte::new();
        let mut ram = ram_with(&[
            0x0140_0093,
            0x0060_0113,
            0x0220_C1B3,
            NOP_INSTRUCTION,
            NOP_INSTRUCTION,
        ]);
        run(&mut core, &mut ram, 30);
        assert_eq!(core.regs().read(0, 3), 3);
        assert_eq!(core.stall_cycles(), 15);
    }

    #[test]
    fn divide_by_zero_resolves_without_stalling() {
        // ADDI x1, x0, 7 ; DIVU x2, x1, x0
        let mut core = PipeNyte::new();
        let mut ram = ram_with(&[0x0070_0093, 0x0200_D133, NOP_INSTRUCTION, NOP_INSTRUCTION]);
        run(&mut core, &mut ram, 10);
        assert_eq!(core.regs().read(0, 2), 0xFFFF_FFFF);
        assert_eq!(core.stall_cycles(), 0);
    }
}
