//! RV32I opcode, funct3, and funct12 constants.
//!
//! Named the way the RISC-V ISA manual names them; kept in one flat module
//! since, unlike the teacher's per-extension split (`rv64i`, `rv64m`, ...),
//! this core implements a single base ISA plus a fixed CSR subset.

/// `OP-IMM`: register-immediate ALU instructions (ADDI, SLTI, ANDI, ...).
pub const OP_IMM: u32 = 0x13;
/// `OP`: register-register ALU instructions (ADD, SUB, AND, ...).
pub const OP: u32 = 0x33;
/// `LOAD`: byte/half/word loads.
pub const LOAD: u32 = 0x03;
/// `STORE`: byte/half/word stores.
pub const STORE: u32 = 0x23;
/// `BRANCH`: conditional branches.
pub const BRANCH: u32 = 0x63;
/// `JAL`: unconditional jump-and-link.
pub const JAL: u32 = 0x6F;
/// `JALR`: unconditional jump-and-link, register-indirect.
pub const JALR: u32 = 0x67;
/// `LUI`: load upper immediate.
pub const LUI: u32 = 0x37;
/// `AUIPC`: add upper immediate to pc.
pub const AUIPC: u32 = 0x17;
/// `MISC-MEM`: `FENCE` / `FENCE.I`.
pub const MISC_MEM: u32 = 0x0F;
/// `SYSTEM`: `ECALL`/`EBREAK`/`MRET`/CSR instructions.
pub const SYSTEM: u32 = 0x73;

/// `funct7` marking an `OP` encoding as RV32M (`MUL`/`DIV`/...) rather than
/// a base-ISA ALU op.
pub const MULDIV_FUNCT7: u32 = 0b0000_001;

/// RV32M operation codes (funct3 under [`OP`] when funct7 is [`MULDIV_FUNCT7`]).
pub mod muldiv_funct3 {
    /// `MUL`.
    pub const MUL: u32 = 0b000;
    /// `MULH`.
    pub const MULH: u32 = 0b001;
    /// `MULHSU`.
    pub const MULHSU: u32 = 0b010;
    /// `MULHU`.
    pub const MULHU: u32 = 0b011;
    /// `DIV`.
    pub const DIV: u32 = 0b100;
    /// `DIVU`.
    pub const DIVU: u32 = 0b101;
    /// `REM`.
    pub const REM: u32 = 0b110;
    /// `REMU`.
    pub const REMU: u32 = 0b111;
}

/// Branch condition codes (funct3 under [`BRANCH`]).
pub mod branch_funct3 {
    /// `BEQ`: branch if equal.
    pub const BEQ: u32 = 0b000;
    /// `BNE`: branch if not equal.
    pub const BNE: u32 = 0b001;
    /// `BLT`: branch if less than (signed).
    pub const BLT: u32 = 0b100;
    /// `BGE`: branch if greater-or-equal (signed).
    pub const BGE: u32 = 0b101;
    /// `BLTU`: branch if less than (unsigned).
    pub const BLTU: u32 = 0b110;
    /// `BGEU`: branch if greater-or-equal (unsigned).
    pub const BGEU: u32 = 0b111;
}

/// Load/store width codes (funct3 under [`LOAD`]/[`STORE`]).
pub mod mem_funct3 {
    /// Byte, sign-extended on load.
    pub const BYTE: u32 = 0b000;
    /// Half-word, sign-extended on load.
    pub const HALF: u32 = 0b001;
    /// Word.
    pub const WORD: u32 = 0b010;
    /// Byte, zero-extended on load (`LBU` only).
    pub const BYTE_U: u32 = 0b100;
    /// Half-word, zero-extended on load (`LHU` only).
    pub const HALF_U: u32 = 0b101;
}

/// `SYSTEM` funct3 codes distinguishing privileged instructions from CSR ops.
pub mod system_funct3 {
    /// `ECALL`/`EBREAK`/`MRET` (distinguished further by funct12/the immediate field).
    pub const PRIV: u32 = 0b000;
    /// `CSRRW`.
    pub const CSRRW: u32 = 0b001;
    /// `CSRRS`.
    pub const CSRRS: u32 = 0b010;
    /// `CSRRC`.
    pub const CSRRC: u32 = 0b011;
    /// `CSRRWI`.
    pub const CSRRWI: u32 = 0b101;
    /// `CSRRSI`.
    pub const CSRRSI: u32 = 0b110;
    /// `CSRRCI`.
    pub const CSRRCI: u32 = 0b111;
}

/// Full 32-bit encodings for the zero-operand `SYSTEM`/`PRIV` instructions.
pub mod priv_inst {
    /// `ECALL`.
    pub const ECALL: u32 = 0x0000_0073;
    /// `EBREAK`.
    pub const EBREAK: u32 = 0x0010_0073;
    /// `MRET`.
    pub const MRET: u32 = 0x3020_0073;
}
