//! Memory-side plumbing: flat RAM, the TileLink-UL `MemPort` shim, and the
//! TileLink-to-AXI4-Lite bridge.
//!
//! 1. **RAM** (`ram`): the flat, simulation-only memory window and its
//!    `MemoryBus` read/write contract.
//! 2. **TileLink-UL** (`tilelink`): `MemPort`, the A/D-channel shim a core's
//!    legacy single-beat request adapts onto.
//! 3. **AXI4-Lite** (`axi`): the downstream bridge a TileLink master talks
//!    to when the backing memory is modeled as an AXI-Lite slave instead of
//!    wired directly to [`ram::Ram`].

/// AXI4-Lite channel types and the TileLink-to-AXI4-Lite translation.
pub mod axi;
/// Flat simulation RAM and the `MemoryBus` trait.
pub mod ram;
/// TileLink-UL A/D channel beats and the `MemPort` shim.
pub mod tilelink;

pub use ram::{MemoryBus, Ram};
pub use tilelink::{DBeat, LegacyRequest, MemPort};
