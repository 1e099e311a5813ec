//! ZeroNyte: single-cycle, single-thread reference core.
//!
//! No pipeline registers: fetch, decode, execute, memory access, and
//! writeback all happen within one rising edge. This is the family's
//! behavioral reference — every other member's retired instruction stream
//! (register writes, memory writes, CSR/trap behavior) on a given program
//! must match what ZeroNyte produces, cycle count aside.

use crate::common::{RegisterFile, Trap, RESET_VECTOR};
use crate::core::csr::Csrs;
use crate::core::exec::{execute, ExecuteInputs};
use crate::core::pipeline::signals::{CsrOp, MemWidth};
use crate::core::units::lsu;
use crate::core::units::muldiv::Divider;
use crate::isa::decode::{decode, OpcodeClass};
use crate::soc::ram::MemoryBus;
use crate::stats::{self, InstMix};

/// The single-cycle core: one thread, one CSR file, no pipeline state at all.
#[derive(Debug, Clone)]
pub struct ZeroNyte {
    pc: u32,
    regs: RegisterFile,
    csrs: Csrs,
    retired: u64,
    mix: InstMix,
}

impl Default for ZeroNyte {
    fn default() -> Self {
        Self::new()
    }
}

impl ZeroNyte {
    /// A freshly reset core: `pc = RESET_VECTOR`, all registers and CSRs zero.
    #[must_use]
    pub fn new() -> Self {
        Self {
            pc: RESET_VECTOR,
            regs: RegisterFile::new(1),
            csrs: Csrs::new(),
            retired: 0,
            mix: InstMix::default(),
        }
    }

    /// Current program counter.
    #[must_use]
    pub fn pc(&self) -> u32 {
        self.pc
    }

    /// The single thread's register file (thread 0 of 1).
    #[must_use]
    pub fn regs(&self) -> &RegisterFile {
        &self.regs
    }

    /// The single thread's CSR file.
    #[must_use]
    pub fn csrs(&self) -> &Csrs {
        &self.csrs
    }

    /// Count of instructions that have retired (including those that trapped).
    #[must_use]
    pub fn retired(&self) -> u64 {
        self.retired
    }

    /// Retired-instruction counts broken down by opcode class.
    #[must_use]
    pub fn instruction_mix(&self) -> InstMix {
        self.mix
    }

    /// Runs one clock edge: fetch, decode, execute, memory access, and
    /// commit, all against `mem`. Returns the trap raised this cycle, if any.
    pub fn step(&mut self, mem: &mut impl MemoryBus) -> Option<Trap> {
        let pc = self.pc;
        self.csrs.tick_cycle();

        if pc & 0b11 != 0 {
            return Some(self.take_trap(pc, Trap::InstructionAddressMisaligned(pc)));
        }

        let instr = mem.read_word(pc);
        let d = decode(instr);
        self.mix += stats::classify(d.class);

        let csr_operand = if d.csr_imm_operand {
            u32::from(d.rs1)
        } else {
            self.regs.read(0, d.rs1)
        };
        let csr_old_value = if d.class == OpcodeClass::System && d.csr_op != CsrOp::None {
            self.csrs.read(d.csr_addr)
        } else {
            0
        };

        let inputs = ExecuteInputs {
            instr,
            class: d.class,
            alu_op: d.alu_op,
            mul_op: d.mul_op,
            imm: d.imm,
            rs1_data: self.regs.read(0, d.rs1),
            rs2_data: self.regs.read(0, d.rs2),
            pc,
            mem_width: d.mem_width,
            csr_op: d.csr_op,
            csr_operand,
            csr_old_value,
        };
        let out = execute(&inputs);

        if let Some(trap) = out.trap {
            return Some(self.take_trap(pc, trap));
        }

        let mut writeback = out.result;
        match d.class {
            OpcodeClass::MulDiv => {
                if let Some(req) = out.div_request {
                    // ZeroNyte is the single-cycle behavioral reference: it
                    // resolves the iterative divider to completion within
                    // the same cycle rather than modeling its 16-cycle
                    // latency, the same simplification it already makes for
                    // the (latency-free) memory model.
                    let mut divider = Divider::new();
                    divider.start(req.dividend, req.divisor, req.signed);
                    let result = loop {
                        if let Some(r) = divider.tick() {
                            break r;
                        }
                    };
                    writeback = if req.want_remainder { result.remainder } else { result.quotient };
                }
            }
            OpcodeClass::Load => {
                let addr = out.result;
                if lsu::load_misaligned(addr, d.mem_width) {
                    return Some(self.take_trap(pc, Trap::LoadAddressMisaligned(addr)));
                }
                let word = mem.read_word(addr);
                writeback = lsu::load(addr, word, d.mem_width, d.unsigned_load);
            }
            OpcodeClass::Store => {
                let addr = out.result;
                let sr = lsu::store(addr, self.regs.read(0, d.rs2), d.mem_width);
                if sr.misaligned {
                    return Some(self.take_trap(pc, Trap::StoreAddressMisaligned(addr)));
                }
                mem.write_word(addr, sr.mem_write, sr.mask);
            }
            _ => {}
        }

        if let Some(csr_value) = out.csr_write {
            self.csrs.write(d.csr_addr, csr_value);
        }
        if out.do_reg_write {
            self.regs.write(0, d.rd, writeback);
        }

        self.pc = if out.is_mret {
            self.csrs.mret()
        } else if out.ctrl_taken {
            out.ctrl_target
        } else {
            pc.wrapping_add(4)
        };

        self.csrs.tick_instret();
        self.retired += 1;
        None
    }

    fn take_trap(&mut self, pc: u32, trap: Trap) -> Trap {
        self.pc = self.csrs.enter_trap(pc, trap);
        self.retired += 1;
        trap
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

    #[test]
    fn nop_advances_pc_by_four_and_writes_nothing() {
        let mut core = ZeroNyte::new();
        let mut ram = ram_with(&[NOP_INSTRUCTION]);
        let trap = core.step(&mut ram);
        assert!(trap.is_none());
        assert_eq!(core.pc(), RESET_VECTOR + 4);
        assert_eq!(core.retired(), 1);
    }

    #[test]
    fn addi_writes_destination_register() {
        // ADDI x1, x0, 5
        let mut core = ZeroNyte::new();
        let mut ram = ram_with(&[0x0050_0093]);
        core.step(&mut ram);
        assert_eq!(core.regs().read(0, 1), 5);
    }

    #[test]
    fn sw_writes_register_value_to_its_effective_address() {
        // x2 is preloaded with RESET_VECTOR so `SW x1, 0(x2)` lands in range.
        let mut core = ZeroNyte::new();
        core.regs.write(0, 2, RESET_VECTOR);
        let mut ram = ram_with(&[
            0x0050_0093, // ADDI x1, x0, 5
            0x0011_2023, // SW x1, 0(x2)
        ]);
        core.step(&mut ram); // x1 = 5
        core.step(&mut ram); // mem[RESET_VECTOR] = 5
        assert_eq!(ram.read_word(RESET_VECTOR), 5);
    }

    #[test]
    fn mul_writes_low_32_bits_of_the_product() {
        // ADDI x1, x0, 5 ; ADDI x2, x0, 3 ; MUL x3, x1, x2
        let mut core = ZeroNyte::new();
        let mut ram = ram_with(&[0x0050_0093, 0x0030_0113, 0x0220_81B3]);
        core.step(&mut ram);
        core.step(&mut ram);
        core.step(&mut ram);
        assert_eq!(core.regs().read(0, 3), 15);
    }

    #[test]
    fn div_writes_the_quotient() {
        // ADDI x1, x0, 20 ; ADDI x2, x0, 6 ; DIV x3, x1, x2
        let mut core = ZeroNyte::new();
        let mut ram = ram_with(&[0x0140_0093, 0x0060_0113, 0x0220_C1B3]);
        core.step(&mut ram);
        core.step(&mut ram);
        core.step(&mut ram);
        assert_eq!(core.regs().read(0, 3), 3);
    }

    #[test]
    fn divu_by_zero_writes_all_ones() {
        // ADDI x1, x0, 7 ; DIVU x2, x1, x0 (x0 is always zero)
        let mut core = ZeroNyte::new();
        let mut ram = ram_with(&[0x0070_0093, 0x0200_D133]);
        core.step(&mut ram);
        core.step(&mut ram);
        assert_eq!(core.regs().read(0, 2), 0xFFFF_FFFF);
    }

    #[test]
    fn illegal_instruction_traps_without_advancing_pc_normally() {
        let mut core = ZeroNyte::new();
        let mut ram = ram_with(&[0b0101011]); // reserved custom-0 opcode
        let trap = core.step(&mut ram);
        assert_eq!(trap, Some(Trap::IllegalInstruction(0b0101011)));
        assert_ne!(core.pc(), RESET_VECTOR + 4);
    }

    #[test]
    fn misaligned_jalr_target_traps() {
        // JALR x1, 2(x5) with x5 = RESET_VECTOR + 1: target = RESET_VECTOR + 3,
        // &!1 clears only bit 0, leaving it 2-byte misaligned.
        let mut core = ZeroNyte::new();
        core.regs.write(0, 5, RESET_VECTOR + 1);
        let mut ram = ram_with(&[0x0022_80E7]);
        let trap = core.step(&mut ram);
        assert!(matches!(trap, Some(Trap::InstructionAddressMisaligned(_))));
    }

    #[test]
    fn ecall_enters_trap_handler_at_mtvec() {
        let mut core = ZeroNyte::new();
        core.csrs.write(crate::core::csr::MTVEC, 0x8000_1000);
        let mut ram = ram_with(&[crate::isa::opcodes::priv_inst::ECALL]);
        let trap = core.step(&mut ram);
        assert_eq!(trap, Some(Trap::EnvironmentCallFromMMode));
        assert_eq!(core.pc(), 0x8000_1000);
    }
}
