//! Configuration for the KryptoNyte simulator.
//!
//! Covers exactly what differs from run to run: which family member to
//! instantiate, how many hardware threads it schedules, instruction cache
//! geometry, the reset vector, the cycle budget, and whether to trace
//! retired instructions. Everything else (ALU behavior, trap semantics,
//! CSR layout) is fixed by the core itself and is not configurable.
//!
//! Supplied via JSON (`Config::from_json`) or `Config::default()` for the CLI.

use serde::Deserialize;

use crate::common::constants::RESET_VECTOR;

/// Default configuration constants.
mod defaults {
    /// Default hardware thread count (matches OctoNyte's pipeline depth).
    pub const NUM_THREADS: usize = 8;

    /// Default instruction cache capacity in bytes.
    pub const ICACHE_CAPACITY: usize = 4096;

    /// Default instruction cache block size in bytes.
    pub const ICACHE_BLOCK: usize = 64;

    /// Default simulation cycle budget before the harness gives up on a run.
    pub const MAX_CYCLES: u64 = 10_000_000;
}

/// Which family member a [`Config`] instantiates.
///
/// The thread count is meaningful only for [`CoreFamily::TetraNyte`] and
/// [`CoreFamily::OctoNyte`]; `ZeroNyte` and `PipeNyte` are always
/// single-threaded regardless of [`Config::num_threads`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum CoreFamily {
    /// Single-cycle, single-thread reference core.
    ZeroNyte,
    /// Single-thread, 4-stage pipeline with load-use stalling.
    PipeNyte,
    /// Four-way barrel-threaded version of the `PipeNyte` datapath.
    TetraNyte,
    /// Eight-stage, eight-thread barrel-threaded core with an instruction
    /// cache and external interrupt controller.
    #[default]
    OctoNyte,
}

/// Top-level simulator configuration.
///
/// ```
/// use kryptonyte_core::config::{Config, CoreFamily};
///
/// let json = r#"{
///     "core": { "family": "TetraNyte", "num_threads": 4 },
///     "general": { "max_cycles": 50000, "trace": true }
/// }"#;
/// let config: Config = serde_json::from_str(json).unwrap();
/// assert_eq!(config.core.family, CoreFamily::TetraNyte);
/// assert_eq!(config.core.num_threads, 4);
/// assert!(config.general.trace);
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Which family member to build and how wide it is.
    #[serde(default)]
    pub core: CoreConfig,
    /// General simulation controls.
    #[serde(default)]
    pub general: GeneralConfig,
    /// Instruction cache geometry, consulted only by `OctoNyte`.
    #[serde(default)]
    pub icache: ICacheConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            core: CoreConfig::default(),
            general: GeneralConfig::default(),
            icache: ICacheConfig::default(),
        }
    }
}

/// Core family selection and thread count.
#[derive(Debug, Clone, Deserialize)]
pub struct CoreConfig {
    /// Which family member to instantiate.
    #[serde(default)]
    pub family: CoreFamily,
    /// Hardware thread count (ignored by `ZeroNyte` and `PipeNyte`).
    #[serde(default = "CoreConfig::default_num_threads")]
    pub num_threads: usize,
}

impl CoreConfig {
    fn default_num_threads() -> usize {
        defaults::NUM_THREADS
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            family: CoreFamily::default(),
            num_threads: defaults::NUM_THREADS,
        }
    }
}

/// General simulation controls: reset vector, cycle budget, tracing.
#[derive(Debug, Clone, Deserialize)]
pub struct GeneralConfig {
    /// Program counter at reset.
    #[serde(default = "GeneralConfig::default_reset_vector")]
    pub reset_vector: u32,
    /// Cycles to run before the harness reports a timeout.
    #[serde(default = "GeneralConfig::default_max_cycles")]
    pub max_cycles: u64,
    /// Log each retired instruction (pc, thread, disassembly-ish summary)
    /// at `tracing` debug level.
    #[serde(default)]
    pub trace: bool,
}

impl GeneralConfig {
    fn default_reset_vector() -> u32 {
        RESET_VECTOR
    }

    fn default_max_cycles() -> u64 {
        defaults::MAX_CYCLES
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            reset_vector: RESET_VECTOR,
            max_cycles: defaults::MAX_CYCLES,
            trace: false,
        }
    }
}

/// Instruction cache geometry for `OctoNyte`.
#[derive(Debug, Clone, Deserialize)]
pub struct ICacheConfig {
    /// Total cache capacity in bytes.
    #[serde(default = "ICacheConfig::default_capacity")]
    pub capacity: usize,
    /// Block (line) size in bytes.
    #[serde(default = "ICacheConfig::default_block")]
    pub block: usize,
}

impl ICacheConfig {
    fn default_capacity() -> usize {
        defaults::ICACHE_CAPACITY
    }

    fn default_block() -> usize {
        defaults::ICACHE_BLOCK
    }
}

impl Default for ICacheConfig {
    fn default() -> Self {
        Self {
            capacity: defaults::ICACHE_CAPACITY,
            block: defaults::ICACHE_BLOCK,
        }
    }
}

impl Config {
    /// Parses a configuration from a JSON document.
    ///
    /// # Errors
    ///
    /// Returns an error if `json` is not valid JSON or doesn't match the
    /// shape of [`Config`].
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
