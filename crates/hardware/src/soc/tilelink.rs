//! TileLink-UL A/D channel shim.
//!
//! `MemPort` observes a core's legacy single-beat `{valid, addr, writeData,
//! writeMask}` request and constructs the corresponding A-channel beat;
//! the D-channel response is routed back to the requesting thread's `rd`
//! by `source`.

use crate::soc::ram::{MemoryBus, Ram};

/// TileLink-UL A-channel opcode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AOpcode {
    /// Read request.
    Get = 4,
    /// Full-word write.
    PutFullData = 0,
    /// Partial-word (byte-masked) write.
    PutPartialData = 1,
}

/// TileLink-UL D-channel opcode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DOpcode {
    /// Acknowledges a store; carries no data.
    AccessAck = 0,
    /// Acknowledges a load; carries `data`.
    AccessAckData = 1,
}

/// One A-channel beat.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ABeat {
    /// Request opcode.
    pub opcode: AOpcode,
    /// `size` field: encodes the transfer width by byte population of
    /// `mask` (1 bit -> 0, 2 contiguous -> 1, 4 -> 2); loads default to
    /// word (`size = 2`).
    pub size: u8,
    /// Source id tagging this outstanding request.
    pub source: u32,
    /// Target address (unchanged from the legacy request).
    pub address: u32,
    /// Byte-lane mask (write mask for stores; a size-derived lane mask for
    /// loads).
    pub mask: u8,
    /// Write data (zero for loads).
    pub data: u32,
}

/// One D-channel beat.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DBeat {
    /// Response opcode.
    pub opcode: DOpcode,
    /// `size`, echoed from the originating request.
    pub size: u8,
    /// Source id, used to route this response back to its requester.
    pub source: u32,
    /// Response data (meaningful only for `AccessAckData`).
    pub data: u32,
}

/// The legacy single-beat request a core issues to its memory port.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LegacyRequest {
    /// True when this cycle issues a request.
    pub valid: bool,
    /// Target address.
    pub addr: u32,
    /// Write data (ignored for loads).
    pub write_data: u32,
    /// Byte write-mask; `0` means "load".
    pub write_mask: u8,
    /// Requesting thread, used to derive the TileLink `source` id.
    pub thread_id: u32,
}

fn size_from_mask(mask: u8) -> u8 {
    match mask.count_ones() {
        1 => 0,
        2 => 1,
        _ => 2,
    }
}

/// Builds the A-channel beat a legacy request translates to.
///
/// `source` is derived from the requesting thread id — one outstanding
/// request per thread can be disambiguated, enabling true multi-thread
/// overlap on the A/D channels (the original core hard-coded `source = 0`,
/// serializing every request; that limitation is lifted here).
#[must_use]
pub fn to_a_beat(req: LegacyRequest) -> ABeat {
    let opcode = if req.write_mask == 0 {
        AOpcode::Get
    } else if req.write_mask == 0b1111 {
        AOpcode::PutFullData
    } else {
        AOpcode::PutPartialData
    };
    let mask = if req.write_mask == 0 {
        0b1111
    } else {
        req.write_mask
    };
    ABeat {
        opcode,
        size: size_from_mask(mask),
        source: req.thread_id,
        address: req.addr,
        mask,
        data: if req.write_mask == 0 { 0 } else { req.write_data },
    }
}

/// A request awaiting its D-channel response.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Outstanding {
    thread_id: u32,
    rd: u8,
    is_load: bool,
}

/// Adapts single-beat legacy memory requests onto a TileLink-UL master
/// port, backed directly by [`Ram`] for the in-process simulation case.
///
/// Tracks one outstanding transaction per `source` (per thread); at most
/// one response is ever pending per source, matching the spec's identity
/// invariant.
#[derive(Debug, Default)]
pub struct MemPort {
    outstanding: std::collections::HashMap<u32, Outstanding>,
}

impl MemPort {
    /// An empty port, nothing outstanding.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues `req` against `ram` and, since this in-process model never
    /// actually delays a response, returns the D-channel beat for the same
    /// cycle. `rd` is recorded so a caller threading responses through a
    /// real queue can still route write-back data by `source`.
    pub fn request(&mut self, ram: &mut Ram, req: LegacyRequest, rd: u8) -> Option<DBeat> {
        if !req.valid {
            return None;
        }
        let beat = to_a_beat(req);
        self.outstanding.insert(
            beat.source,
            Outstanding {
                thread_id: req.thread_id,
                rd,
                is_load: beat.opcode == AOpcode::Get,
            },
        );
        let resp = match beat.opcode {
            AOpcode::Get => DBeat {
                opcode: DOpcode::AccessAckData,
                size: beat.size,
                source: beat.source,
                data: ram.read_word(beat.address),
            },
            AOpcode::PutFullData | AOpcode::PutPartialData => {
                ram.write_word(beat.address, beat.data, beat.mask);
                DBeat {
                    opcode: DOpcode::AccessAck,
                    size: beat.size,
                    source: beat.source,
                    data: 0,
                }
            }
        };
        self.outstanding.remove(&beat.source);
        Some(resp)
    }

    /// Looks up the `(thread_id, rd)` a still-outstanding `source` should
    /// route its eventual response to.
    #[must_use]
    pub fn route(&self, source: u32) -> Option<(u32, u8)> {
        self.outstanding.get(&source).map(|o| (o.thread_id, o.rd))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_becomes_get() {
        let req = LegacyRequest {
            valid: true,
            addr: 0x8000_0000,
            write_data: 0,
            write_mask: 0,
            thread_id: 2,
        };
        let beat = to_a_beat(req);
        assert_eq!(beat.opcode, AOpcode::Get);
        assert_eq!(beat.size, 2);
        assert_eq!(beat.source, 2);
    }

    #[test]
    fn full_word_store_becomes_put_full_data() {
        let req = LegacyRequest {
            valid: true,
            addr: 0x8000_0000,
            write_data: 0x1234,
            write_mask: 0b1111,
            thread_id: 0,
        };
        let beat = to_a_beat(req);
        assert_eq!(beat.opcode, AOpcode::PutFullData);
        assert_eq!(beat.size, 2);
    }

    #[test]
    fn byte_store_becomes_put_partial_with_size_zero() {
        let req = LegacyRequest {
            valid: true,
            addr: 0x8000_0000,
            write_data: 0xAB,
            write_mask: 0b0001,
            thread_id: 0,
        };
        let beat = to_a_beat(req);
        assert_eq!(beat.opcode, AOpcode::PutPartialData);
        assert_eq!(beat.size, 0);
    }

    #[test]
    fn request_round_trips_through_ram() {
        let mut ram = Ram::new(4096);
        let mut port = MemPort::new();
        let store = LegacyRequest {
            valid: true,
            addr: crate::common::RESET_VECTOR,
            write_data: 0xCAFE_BABE,
            write_mask: 0b1111,
            thread_id: 0,
        };
        let resp = port.request(&mut ram, store, 0).unwrap();
        assert_eq!(resp.opcode, DOpcode::AccessAck);

        let load = LegacyRequest {
            valid: true,
            addr: crate::common::RESET_VECTOR,
            write_data: 0,
            write_mask: 0,
            thread_id: 0,
        };
        let resp = port.request(&mut ram, load, 5).unwrap();
        assert_eq!(resp.opcode, DOpcode::AccessAckData);
        assert_eq!(resp.data, 0xCAFE_BABE);
    }
}
