use crate::*;
use std::borrow::Cow;

/// Byte ranges of the Ethernet II header fields, measured from the start of the frame.
pub const ETHERNET_DEST_MAC_RANGE: (usize, usize) = (0, 6);
pub const ETHERNET_SRC_MAC_RANGE: (usize, usize) = (6, 12);
pub const ETHERNET_ETHER_TYPE_RANGE: (usize, usize) = (12, 14);

#[derive(Clone, Debug)]
pub struct EthernetFrame {
    pub data: PacketData,
    pub payload_offset: usize,
}

impl Packet for EthernetFrame {}

impl EthernetFrame {
    pub fn from_buffer(frame: PacketData) -> Result<EthernetFrame, &'static str> {
        // Ethernet II frames must be at least the header, which is 14bytes
        // 0                    6                    12                      14
        // |---6 byte Dest_MAC--|---6 byte Src_MAC---|--2 Byte EtherType---|
        // 802.1Q tagged frames are not supported, so the payload always starts at 14.

        if frame.len() < ETHERNET_HEADER_LEN {
            return Err("Frame is less than the minimum of 14 bytes");
        }

        Ok(EthernetFrame {
            data: frame,
            payload_offset: ETHERNET_HEADER_LEN,
        })
    }

    /// Returns an empty EthernetFrame where all values all populated to zero. This function allocates a
    /// new array to hold the header.
    pub fn empty() -> EthernetFrame {
        EthernetFrame {
            data: vec![0; ETHERNET_HEADER_LEN],
            payload_offset: ETHERNET_HEADER_LEN,
        }
    }

    pub fn dest_mac(&self) -> MacAddr {
        self.mac_at(ETHERNET_DEST_MAC_RANGE)
    }

    pub fn src_mac(&self) -> MacAddr {
        self.mac_at(ETHERNET_SRC_MAC_RANGE)
    }

    pub fn set_dest_mac(&mut self, mac: MacAddr) {
        let (start, end) = ETHERNET_DEST_MAC_RANGE;
        self.data[start..end].copy_from_slice(&mac.bytes);
    }

    pub fn set_src_mac(&mut self, mac: MacAddr) {
        let (start, end) = ETHERNET_SRC_MAC_RANGE;
        self.data[start..end].copy_from_slice(&mac.bytes);
    }

    pub fn ether_type(&self) -> u16 {
        let (start, _) = ETHERNET_ETHER_TYPE_RANGE;
        u16::from_be_bytes([self.data[start], self.data[start + 1]])
    }

    pub fn set_ether_type(&mut self, ether_type: u16) {
        let (start, end) = ETHERNET_ETHER_TYPE_RANGE;
        self.data[start..end].copy_from_slice(&ether_type.to_be_bytes());
    }

    // This gives you a cow of a slice of the payload.
    pub fn payload(&self) -> Cow<[u8]> {
        Cow::from(&self.data[self.payload_offset..])
    }

    pub fn set_payload(&mut self, payload: &[u8]) {
        self.data.truncate(self.payload_offset);
        self.data.reserve_exact(payload.len());
        self.data.extend(payload);
    }

    fn mac_at(&self, range: (usize, usize)) -> MacAddr {
        let (start, end) = range;
        let mut bytes = [0; 6];
        bytes.copy_from_slice(&self.data[start..end]);
        MacAddr::new(bytes)
    }
}

/// EthernetFrames are considered the same if they carry the same bytes.
impl PartialEq for EthernetFrame {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
    }
}

impl Eq for EthernetFrame {}
