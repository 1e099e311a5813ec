//! ELF loading and the host-target conformance protocol.
//!
//! Test programs are plain RV32I ELF executables: their loadable sections
//! are copied verbatim into simulation RAM at their linked addresses, and
//! three well-known symbols — `tohost`, `fromhost`, and the
//! `begin_signature`/`end_signature` pair — give the harness a way to learn
//! when the program is done and what it computed, without any simulated
//! I/O device at all.

use object::read::elf::{FileHeader, FileHeader32};
use object::{Endianness, elf};
use thiserror::Error;

use crate::soc::ram::Ram;

/// Failures that can occur while loading a test program.
#[derive(Debug, Error)]
pub enum LoaderError {
    /// The file could not be read from disk.
    #[error("failed to read {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The file's contents are not a little-endian 32-bit ELF.
    #[error("failed to parse ELF: {0}")]
    Malformed(String),
}

/// The addresses a loaded program exposes for the host-target protocol.
///
/// `tohost` and `fromhost` are mandatory for a conformance harness to detect
/// completion; the signature bracket is optional and only present in
/// programs built against the `riscv-test` signature macros.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostSymbols {
    /// Address of the `tohost` word, if the program defines it.
    pub tohost: Option<u32>,
    /// Address of the `fromhost` word, if the program defines it.
    pub fromhost: Option<u32>,
    /// Start of the signature region, if the program defines one.
    pub begin_signature: Option<u32>,
    /// End (exclusive) of the signature region, if the program defines one.
    pub end_signature: Option<u32>,
}

/// A loaded program: its entry point and the host-target symbols extracted
/// from its symbol table.
#[derive(Debug, Clone, Copy)]
pub struct LoadedProgram {
    /// The ELF entry point. KryptoNyte cores always reset to
    /// [`crate::common::RESET_VECTOR`] regardless of this value; it is
    /// reported for diagnostics and to let callers sanity-check the link.
    pub entry: u32,
    /// Host-target protocol symbols found in the program, if any.
    pub symbols: HostSymbols,
}

/// Reads `path`, copies every allocatable section into `ram` at its linked
/// address, and resolves the host-target protocol symbols.
///
/// # Errors
///
/// Returns [`LoaderError::Io`] if `path` cannot be read, or
/// [`LoaderError::Malformed`] if its contents are not a 32-bit
/// little-endian ELF.
pub fn load_elf(path: &str, ram: &mut Ram) -> Result<LoadedProgram, LoaderError> {
    let data = std::fs::read(path).map_err(|source| LoaderError::Io {
        path: path.to_string(),
        source,
    })?;
    load_elf_bytes(&data)
        .map(|program| {
            copy_sections(&data, ram);
            program
        })
        .map_err(LoaderError::Malformed)
}

fn parse(data: &[u8]) -> Result<(&FileHeader32<Endianness>, Endianness), String> {
    let header = FileHeader32::<Endianness>::parse(data).map_err(|e| e.to_string())?;
    let endian = header.endian().map_err(|e| e.to_string())?;
    if endian != Endianness::Little {
        return Err("only little-endian ELF is supported".to_string());
    }
    Ok((header, endian))
}

fn load_elf_bytes(data: &[u8]) -> Result<LoadedProgram, String> {
    let (header, endian) = parse(data)?;
    let entry = header.e_entry(endian);
    let symbols = resolve_host_symbols(header, endian, data)?;
    Ok(LoadedProgram {
        entry: entry as u32,
        symbols,
    })
}

fn resolve_host_symbols(
    header: &FileHeader32<Endianness>,
    endian: Endianness,
    data: &[u8],
) -> Result<HostSymbols, String> {
    let mut symbols = HostSymbols::default();
    let Ok(table) = header.symbols(endian, data) else {
        // Stripped binaries simply can't use the symbol-based protocol;
        // the harness falls back to the cycle budget alone.
        return Ok(symbols);
    };
    for (_, sym) in table.symbols() {
        let Ok(name) = table.symbol_name(endian, sym) else {
            continue;
        };
        let addr = sym.st_value(endian);
        match name {
            b"tohost" => symbols.tohost = Some(addr as u32),
            b"fromhost" => symbols.fromhost = Some(addr as u32),
            b"begin_signature" => symbols.begin_signature = Some(addr as u32),
            b"end_signature" => symbols.end_signature = Some(addr as u32),
            _ => {}
        }
    }
    Ok(symbols)
}

fn copy_sections(data: &[u8], ram: &mut Ram) {
    let Ok((header, endian)) = parse(data) else {
        return;
    };
    let Ok(sections) = header.sections(endian, data) else {
        return;
    };
    for section in sections.iter() {
        // SHT_NOBITS (.bss) has no file contents; it reads as the RAM's
        // zero-initialized state already, so there is nothing to copy.
        if section.sh_type(endian) == elf::SHT_NOBITS {
            continue;
        }
        // Only sections the linker actually placed in memory matter; debug
        // info and friends carry SHF_ALLOC == 0.
        if section.sh_flags(endian) & u32::from(elf::SHF_ALLOC) == 0 {
            continue;
        }
        let Ok(bytes) = section.data(endian, data) else {
            continue;
        };
        let addr = section.sh_addr(endian) as u32;
        ram.load_bytes(addr, bytes);
    }
}
