//! TileLink-UL to AXI4-Lite bridge.
//!
//! Maps TL `Get` to an AXI `AR`+`R` pair and TL `PutFull/PartialData` to an
//! `AW`+`W`+`B` triple, single beat per transaction, preserving the TL
//! `source` as the AXI `id` end to end.

use crate::soc::tilelink::{ABeat, AOpcode, DBeat, DOpcode};

/// AXI4-Lite read-address channel beat.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ar {
    /// Transaction id (the originating TL `source`).
    pub id: u32,
    /// Read address.
    pub addr: u32,
}

/// AXI4-Lite read-data channel beat.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct R {
    /// Transaction id, echoed from the matching `AR`.
    pub id: u32,
    /// Read data.
    pub data: u32,
}

/// AXI4-Lite write-address channel beat.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Aw {
    /// Transaction id.
    pub id: u32,
    /// Write address.
    pub addr: u32,
}

/// AXI4-Lite write-data channel beat.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct W {
    /// Write data.
    pub data: u32,
    /// Byte-lane strobe.
    pub strb: u8,
}

/// AXI4-Lite write-response channel beat.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct B {
    /// Transaction id, echoed from the matching `AW`.
    pub id: u32,
}

/// One side of a translated AXI transaction: either a read (`AR`, expects
/// an `R`) or a write (`AW`+`W`, expects a `B`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AxiRequest {
    /// Read address beat.
    Read(Ar),
    /// Write address + data beats.
    Write(Aw, W),
}

/// Translates one TileLink-UL A-channel beat into its AXI4-Lite equivalent.
///
/// Width upsizing from a narrower TL side onto a wider AXI side is handled
/// entirely by address/mask alignment upstream (the TL `mask` already
/// encodes which lanes of the AXI-side beat are valid); this bridge does
/// not itself need to know the AXI data width.
#[must_use]
pub fn tl_to_axi(beat: ABeat) -> AxiRequest {
    match beat.opcode {
        AOpcode::Get => AxiRequest::Read(Ar { id: beat.source, addr: beat.address }),
        AOpcode::PutFullData | AOpcode::PutPartialData => AxiRequest::Write(
            Aw { id: beat.source, addr: beat.address },
            W { data: beat.data, strb: beat.mask },
        ),
    }
}

/// Translates an AXI `R` beat back into a TL `AccessAckData`.
#[must_use]
pub fn axi_r_to_tl(r: R, size: u8) -> DBeat {
    DBeat {
        opcode: DOpcode::AccessAckData,
        size,
        source: r.id,
        data: r.data,
    }
}

/// Translates an AXI `B` beat back into a TL `AccessAck`.
#[must_use]
pub fn axi_b_to_tl(b: B, size: u8) -> DBeat {
    DBeat {
        opcode: DOpcode::AccessAck,
        size,
        source: b.id,
        data: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::soc::tilelink::to_a_beat;
    use crate::soc::tilelink::LegacyRequest;

    #[test]
    fn get_becomes_ar() {
        let beat = to_a_beat(LegacyRequest {
            valid: true,
            addr: 0x8000_0004,
            write_data: 0,
            write_mask: 0,
            thread_id: 3,
        });
        match tl_to_axi(beat) {
            AxiRequest::Read(ar) => {
                assert_eq!(ar.id, 3);
                assert_eq!(ar.addr, 0x8000_0004);
            }
            AxiRequest::Write(..) => panic!("expected a read"),
        }
    }

    #[test]
    fn put_becomes_aw_plus_w_with_preserved_strobe() {
        let beat = to_a_beat(LegacyRequest {
            valid: true,
            addr: 0x8000_0008,
            write_data: 0xAABB,
            write_mask: 0b0011,
            thread_id: 1,
        });
        match tl_to_axi(beat) {
            AxiRequest::Write(aw, w) => {
                assert_eq!(aw.id, 1);
                assert_eq!(w.strb, 0b0011);
                assert_eq!(w.data, 0xAABB);
            }
            AxiRequest::Read(_) => panic!("expected a write"),
        }
    }

    #[test]
    fn transaction_id_round_trips_end_to_end() {
        let r = R { id: 7, data: 0xDEAD_BEEF };
        let tl = axi_r_to_tl(r, 2);
        assert_eq!(tl.source, 7);
        assert_eq!(tl.data, 0xDEAD_BEEF);
    }
}
