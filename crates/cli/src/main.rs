//! KryptoNyte conformance-test runner.
//!
//! Loads a bare-metal RV32I/RV32M ELF, drives the selected family member
//! until the program signals completion through the `tohost` protocol or
//! the cycle budget runs out, and reports the outcome plus statistics.

use std::process;

use clap::{Parser, ValueEnum};
use kryptonyte_core::config::{Config, CoreConfig, CoreFamily, GeneralConfig};
use kryptonyte_core::sim::{loader, RunOutcome, Simulator};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "kryptonyte",
    author,
    version,
    about = "KryptoNyte RV32I core family simulator",
    long_about = "Runs a bare-metal RISC-V ELF against one of the four KryptoNyte family \
members (ZeroNyte, PipeNyte, TetraNyte, OctoNyte) and reports the tohost/signature \
outcome a conformance harness cares about.\n\nExample:\n  \
kryptonyte rv32ui-p-add.elf --core octo --max-cycles 200000"
)]
struct Cli {
    /// ELF file to load and run.
    elf: String,

    /// Which family member to simulate.
    #[arg(long, value_enum, default_value_t = Family::Octo)]
    core: Family,

    /// Cycle budget before the run is reported as timed out.
    #[arg(long, default_value_t = 10_000_000)]
    max_cycles: u64,

    /// Log every retired instruction at debug level.
    #[arg(long)]
    trace: bool,

    /// Print the final signature region as hex words (for comparison
    /// against a reference simulator).
    #[arg(long)]
    signature: bool,

    /// Restrict statistics output to these sections; omit for all.
    #[arg(long, value_delimiter = ',')]
    stats: Vec<String>,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum Family {
    Zero,
    Pipe,
    Tetra,
    Octo,
}

impl From<Family> for CoreFamily {
    fn from(family: Family) -> Self {
        match family {
            Family::Zero => CoreFamily::ZeroNyte,
            Family::Pipe => CoreFamily::PipeNyte,
            Family::Tetra => CoreFamily::TetraNyte,
            Family::Octo => CoreFamily::OctoNyte,
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = Config {
        core: CoreConfig {
            family: cli.core.into(),
            ..CoreConfig::default()
        },
        general: GeneralConfig {
            max_cycles: cli.max_cycles,
            trace: cli.trace,
            ..GeneralConfig::default()
        },
        ..Config::default()
    };

    let mut ram = kryptonyte_core::soc::Ram::new(kryptonyte_core::common::RAM_SIZE);
    let program = match loader::load_elf(&cli.elf, &mut ram) {
        Ok(program) => program,
        Err(e) => {
            eprintln!("error: failed to load {}: {e}", cli.elf);
            process::exit(1);
        }
    };

    println!("KryptoNyte simulator");
    println!("  core:   {:?}", cli.core);
    println!("  elf:    {} (entry {:#010x})", cli.elf, program.entry);
    println!(
        "  tohost: {}",
        program
            .symbols
            .tohost
            .map_or_else(|| "none".to_string(), |a| format!("{a:#010x}"))
    );
    println!();

    let mut sim = Simulator::new(&config, ram, program.symbols);

    let outcome = sim.run();
    sim.stats().print_sections(&cli.stats);

    if cli.signature {
        let words = sim.signature();
        if words.is_empty() {
            println!("(no signature region)");
        } else {
            for chunk in words.chunks(4) {
                let line: Vec<String> = chunk.iter().map(|w| format!("{w:08x}")).collect();
                println!("{}", line.join(" "));
            }
        }
    }

    match outcome {
        RunOutcome::Passed => {
            println!("PASS");
        }
        RunOutcome::Failed(value) => {
            println!("FAIL (tohost = {value:#x})");
            process::exit(1);
        }
        RunOutcome::TimedOut => {
            println!("TIMEOUT (exceeded {} cycles)", cli.max_cycles);
            process::exit(1);
        }
    }
}
