//! Trap representation.
//!
//! Enumerates every synchronous exception and machine-mode interrupt a
//! KryptoNyte core can raise. Each variant carries the associated fault
//! value (the faulting address, the illegal encoding, or nothing for
//! environment calls) and knows its own `mcause` code, so the writeback
//! stage of every core variant can drive `Csrs::enter_trap` without
//! re-deriving the cause.

use std::fmt;

/// A synchronous exception or machine-mode interrupt.
///
/// Traps are reported alongside a functional unit's ordinary result on the
/// same clock (per the propagation policy: misalignment and illegal-opcode
/// conditions never flow through a side error channel) and are resolved by
/// the writeback stage, which decides whether to commit the instruction's
/// result or redirect to the trap handler instead.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Trap {
    /// Instruction address misaligned (`mcause = 0`): a taken branch/jump
    /// whose target is not 2-byte aligned. The associated value is the
    /// faulting target address.
    InstructionAddressMisaligned(u32),
    /// Unrecognized opcode (`mcause = 2`). The associated value is the raw
    /// instruction encoding.
    IllegalInstruction(u32),
    /// Breakpoint (`EBREAK`, `mcause = 3`). The associated value is the pc.
    Breakpoint(u32),
    /// Load address misaligned (`mcause = 4`). The associated value is the
    /// faulting effective address.
    LoadAddressMisaligned(u32),
    /// Store address misaligned (`mcause = 6`). The associated value is the
    /// faulting effective address.
    StoreAddressMisaligned(u32),
    /// Environment call from machine mode (`ECALL`, `mcause = 11`).
    EnvironmentCallFromMMode,
    /// Machine software interrupt (`mcause = 0x8000_0003`).
    MachineSoftwareInterrupt,
    /// Machine timer interrupt (`mcause = 0x8000_0007`).
    MachineTimerInterrupt,
    /// Machine external interrupt (`mcause = 0x8000_000B`).
    MachineExternalInterrupt,
}

impl Trap {
    /// Returns the `mcause` CSR value for this trap.
    ///
    /// Interrupts set the top bit of the (32-bit) cause register; synchronous
    /// exceptions leave it clear.
    #[must_use]
    pub fn mcause(self) -> u32 {
        match self {
            Trap::InstructionAddressMisaligned(_) => 0,
            Trap::IllegalInstruction(_) => 2,
            Trap::Breakpoint(_) => 3,
            Trap::LoadAddressMisaligned(_) => 4,
            Trap::StoreAddressMisaligned(_) => 6,
            Trap::EnvironmentCallFromMMode => 11,
            Trap::MachineSoftwareInterrupt => 0x8000_0003,
            Trap::MachineTimerInterrupt => 0x8000_0007,
            Trap::MachineExternalInterrupt => 0x8000_000B,
        }
    }

    /// Returns the `mtval` CSR value for this trap (the faulting address or
    /// instruction encoding; zero for traps with no associated value).
    #[must_use]
    pub fn mtval(self) -> u32 {
        match self {
            Trap::InstructionAddressMisaligned(addr) => addr,
            Trap::IllegalInstruction(inst) => inst,
            Trap::Breakpoint(pc) => pc,
            Trap::LoadAddressMisaligned(addr) | Trap::StoreAddressMisaligned(addr) => addr,
            Trap::EnvironmentCallFromMMode
            | Trap::MachineSoftwareInterrupt
            | Trap::MachineTimerInterrupt
            | Trap::MachineExternalInterrupt => 0,
        }
    }

    /// Returns whether this trap is an asynchronous interrupt rather than a
    /// synchronous exception.
    #[must_use]
    pub fn is_interrupt(self) -> bool {
        matches!(
            self,
            Trap::MachineSoftwareInterrupt
                | Trap::MachineTimerInterrupt
                | Trap::MachineExternalInterrupt
        )
    }
}

impl fmt::Display for Trap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trap::InstructionAddressMisaligned(addr) => {
                write!(f, "InstructionAddressMisaligned({addr:#010x})")
            }
            Trap::IllegalInstruction(inst) => write!(f, "IllegalInstruction({inst:#010x})"),
            Trap::Breakpoint(pc) => write!(f, "Breakpoint({pc:#010x})"),
            Trap::LoadAddressMisaligned(addr) => {
                write!(f, "LoadAddressMisaligned({addr:#010x})")
            }
            Trap::StoreAddressMisaligned(addr) => {
                write!(f, "StoreAddressMisaligned({addr:#010x})")
            }
            Trap::EnvironmentCallFromMMode => write!(f, "EnvironmentCallFromMMode"),
            Trap::MachineSoftwareInterrupt => write!(f, "MachineSoftwareInterrupt"),
            Trap::MachineTimerInterrupt => write!(f, "MachineTimerInterrupt"),
            Trap::MachineExternalInterrupt => write!(f, "MachineExternalInterrupt"),
        }
    }
}

impl std::error::Error for Trap {}
