use crate::{
    EthernetFrame, MacAddr, Packet, ARP_ETHER_TYPE, ARP_FRAME_MIN_LEN, ARP_HEADER_LEN,
    IPV4_ETHER_TYPE,
};
use std::convert::TryFrom;
use std::net::Ipv4Addr;

pub enum ArpOp {
    Request = 1,
    Reply = 2,
}

pub enum ArpHardwareType {
    Ethernet = 1,
}

// Byte ranges of the Ethernet/IPv4 ARP header fields, measured from the start of the
// ARP header. Add ETHERNET_HEADER_LEN to address them inside a whole frame.
pub const ARP_HARDWARE_TYPE_RANGE: (usize, usize) = (0, 2);
pub const ARP_PROTOCOL_TYPE_RANGE: (usize, usize) = (2, 4);
pub const ARP_HARDWARE_ADDR_LEN_RANGE: (usize, usize) = (4, 5);
pub const ARP_PROTOCOL_ADDR_LEN_RANGE: (usize, usize) = (5, 6);
pub const ARP_OPCODE_RANGE: (usize, usize) = (6, 8);
pub const ARP_SENDER_HARDWARE_ADDR_RANGE: (usize, usize) = (8, 14);
pub const ARP_SENDER_PROTOCOL_ADDR_RANGE: (usize, usize) = (14, 18);
pub const ARP_TARGET_HARDWARE_ADDR_RANGE: (usize, usize) = (18, 24);
pub const ARP_TARGET_PROTOCOL_ADDR_RANGE: (usize, usize) = (24, 28);

///
/// EthernetFrame wrapper with getters/setters for the packet structure described in RFC 826
/// https://tools.ietf.org/html/rfc826
///
/// Only the Ethernet hardware / IPv4 protocol layout is modelled, so every field sits at a
/// fixed offset regardless of what the length fields claim.
///
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArpFrame {
    frame: EthernetFrame,
}

impl Packet for ArpFrame {}

impl ArpFrame {
    ///
    /// Constructs a new packet with an ARP ether type and a zeroed payload big enough for all
    /// ARP fields. Hardware and protocol types and lengths are filled in for Ethernet/IPv4.
    ///
    pub fn new() -> Self {
        let mut frame = EthernetFrame::empty();
        frame.set_ether_type(ARP_ETHER_TYPE);
        frame.set_payload(&[0; ARP_HEADER_LEN]);

        let mut arp_frame = ArpFrame { frame };
        arp_frame.set_hardware_type(ArpHardwareType::Ethernet as u16);
        arp_frame.set_protocol_type(IPV4_ETHER_TYPE);
        arp_frame.set_hardware_addr_len(6);
        arp_frame.set_protocol_addr_len(4);
        arp_frame
    }

    ///
    /// A broadcast "who-has `target_ip`, tell `sender_ip`" request, as a host would send it.
    ///
    pub fn request(sender_mac: MacAddr, sender_ip: Ipv4Addr, target_ip: Ipv4Addr) -> Self {
        let mut arp_frame = ArpFrame::new();
        arp_frame.frame.set_dest_mac(MacAddr::broadcast());
        arp_frame.frame.set_src_mac(sender_mac);
        arp_frame.set_opcode(ArpOp::Request as u16);
        arp_frame.set_sender_hardware_addr(sender_mac);
        arp_frame.set_sender_protocol_addr(sender_ip);
        arp_frame.set_target_hardware_addr(MacAddr::default());
        arp_frame.set_target_protocol_addr(target_ip);
        arp_frame
    }

    pub fn hardware_type(&self) -> u16 {
        self.arp_u16(ARP_HARDWARE_TYPE_RANGE)
    }

    pub fn protocol_type(&self) -> u16 {
        self.arp_u16(ARP_PROTOCOL_TYPE_RANGE)
    }

    pub fn hardware_addr_len(&self) -> u8 {
        let (start, end) = ARP_HARDWARE_ADDR_LEN_RANGE;
        self.arp_data(start, end)[0]
    }

    pub fn protocol_addr_len(&self) -> u8 {
        let (start, end) = ARP_PROTOCOL_ADDR_LEN_RANGE;
        self.arp_data(start, end)[0]
    }

    pub fn opcode(&self) -> u16 {
        self.arp_u16(ARP_OPCODE_RANGE)
    }

    pub fn sender_hardware_addr(&self) -> MacAddr {
        self.arp_mac(ARP_SENDER_HARDWARE_ADDR_RANGE)
    }

    pub fn sender_protocol_addr(&self) -> Ipv4Addr {
        self.arp_ipv4(ARP_SENDER_PROTOCOL_ADDR_RANGE)
    }

    pub fn target_hardware_addr(&self) -> MacAddr {
        self.arp_mac(ARP_TARGET_HARDWARE_ADDR_RANGE)
    }

    pub fn target_protocol_addr(&self) -> Ipv4Addr {
        self.arp_ipv4(ARP_TARGET_PROTOCOL_ADDR_RANGE)
    }

    pub fn set_hardware_type(&mut self, htype: u16) {
        let (start, end) = ARP_HARDWARE_TYPE_RANGE;
        self.set_arp_data(&htype.to_be_bytes(), start, end);
    }

    pub fn set_protocol_type(&mut self, ptype: u16) {
        let (start, end) = ARP_PROTOCOL_TYPE_RANGE;
        self.set_arp_data(&ptype.to_be_bytes(), start, end);
    }

    pub fn set_hardware_addr_len(&mut self, len: u8) {
        let (start, end) = ARP_HARDWARE_ADDR_LEN_RANGE;
        self.set_arp_data(&[len], start, end);
    }

    pub fn set_protocol_addr_len(&mut self, len: u8) {
        let (start, end) = ARP_PROTOCOL_ADDR_LEN_RANGE;
        self.set_arp_data(&[len], start, end);
    }

    pub fn set_opcode(&mut self, code: u16) {
        let (start, end) = ARP_OPCODE_RANGE;
        self.set_arp_data(&code.to_be_bytes(), start, end);
    }

    pub fn set_sender_hardware_addr(&mut self, addr: MacAddr) {
        let (start, end) = ARP_SENDER_HARDWARE_ADDR_RANGE;
        self.set_arp_data(&addr.bytes, start, end);
    }

    pub fn set_sender_protocol_addr(&mut self, addr: Ipv4Addr) {
        let (start, end) = ARP_SENDER_PROTOCOL_ADDR_RANGE;
        self.set_arp_data(&addr.octets(), start, end);
    }

    pub fn set_target_hardware_addr(&mut self, addr: MacAddr) {
        let (start, end) = ARP_TARGET_HARDWARE_ADDR_RANGE;
        self.set_arp_data(&addr.bytes, start, end);
    }

    pub fn set_target_protocol_addr(&mut self, addr: Ipv4Addr) {
        let (start, end) = ARP_TARGET_PROTOCOL_ADDR_RANGE;
        self.set_arp_data(&addr.octets(), start, end);
    }

    pub fn ethernet(&self) -> &EthernetFrame {
        &self.frame
    }

    pub fn ethernet_mut(&mut self) -> &mut EthernetFrame {
        &mut self.frame
    }

    // Move ownership of the frame back to the caller
    pub fn frame(self) -> EthernetFrame {
        self.frame
    }

    // Returns the bytes in the ethernet frame between start and end, exclusive
    fn arp_data(&self, start: usize, end: usize) -> &[u8] {
        let frame_offset_start = self.frame.payload_offset + start;
        let frame_offset_end = self.frame.payload_offset + end;
        &self.frame.data[frame_offset_start..frame_offset_end]
    }

    fn set_arp_data(&mut self, bytes: &[u8], start: usize, end: usize) {
        let frame_offset_start = self.frame.payload_offset + start;
        let frame_offset_end = self.frame.payload_offset + end;
        self.frame.data[frame_offset_start..frame_offset_end].copy_from_slice(bytes);
    }

    fn arp_u16(&self, range: (usize, usize)) -> u16 {
        let (start, end) = range;
        let bytes = self.arp_data(start, end);
        u16::from_be_bytes([bytes[0], bytes[1]])
    }

    fn arp_mac(&self, range: (usize, usize)) -> MacAddr {
        let (start, end) = range;
        let mut bytes = [0; 6];
        bytes.copy_from_slice(self.arp_data(start, end));
        MacAddr::new(bytes)
    }

    fn arp_ipv4(&self, range: (usize, usize)) -> Ipv4Addr {
        let (start, end) = range;
        let b = self.arp_data(start, end);
        Ipv4Addr::new(b[0], b[1], b[2], b[3])
    }
}

impl Default for ArpFrame {
    fn default() -> Self {
        ArpFrame::new()
    }
}

impl TryFrom<EthernetFrame> for ArpFrame {
    type Error = &'static str;

    ///
    /// Decorates the given EthernetFrame with ArpFrame getters/setters.
    /// Validates
    /// - The frame has an ARP ether type
    /// - The frame is long enough to hold an Ethernet/IPv4 ARP header. Trailing bytes are
    ///   allowed, since short frames are padded up to the Ethernet minimum on the wire.
    ///
    fn try_from(frame: EthernetFrame) -> Result<Self, Self::Error> {
        if frame.ether_type() != ARP_ETHER_TYPE {
            return Err("Frame does not have ARP ether type.");
        };

        if frame.data.len() < ARP_FRAME_MIN_LEN {
            return Err("Frame payload is too small");
        }

        Ok(ArpFrame { frame })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_empty_arp_frame() {
        let arp_frame = ArpFrame::new();
        assert_eq!(arp_frame.ethernet().ether_type(), ARP_ETHER_TYPE);
        assert_eq!(arp_frame.ethernet().data.len(), ARP_FRAME_MIN_LEN);
        assert_eq!(arp_frame.hardware_type(), 1);
        assert_eq!(arp_frame.protocol_type(), IPV4_ETHER_TYPE);
        assert_eq!(arp_frame.hardware_addr_len(), 6);
        assert_eq!(arp_frame.protocol_addr_len(), 4);
        assert_eq!(arp_frame.opcode(), 0);
        assert_eq!(arp_frame.sender_hardware_addr(), MacAddr::default());
        assert_eq!(arp_frame.sender_protocol_addr(), Ipv4Addr::UNSPECIFIED);
        assert_eq!(arp_frame.target_hardware_addr(), MacAddr::default());
        assert_eq!(arp_frame.target_protocol_addr(), Ipv4Addr::UNSPECIFIED);
    }

    #[test]
    fn arp_frame_from_ethernet() -> Result<(), String> {
        let arp_payload: Vec<u8> = vec![
            0x00, 0x01, 0x08, 0x00, 0x06, 0x04, 0x00, 0x01, 1, 2, 3, 4, 5, 6, 10, 0, 0, 1, 10, 9,
            8, 7, 6, 5, 0xff, 0xff, 0xff, 0xff,
        ];
        let mut ethernet_frame = EthernetFrame::empty();
        ethernet_frame.set_payload(&arp_payload);
        ethernet_frame.set_ether_type(ARP_ETHER_TYPE);

        let arp_frame = ArpFrame::try_from(ethernet_frame)?;
        assert_eq!(arp_frame.hardware_type(), ArpHardwareType::Ethernet as u16);
        assert_eq!(arp_frame.protocol_type(), IPV4_ETHER_TYPE);
        assert_eq!(arp_frame.hardware_addr_len(), 6);
        assert_eq!(arp_frame.protocol_addr_len(), 4);
        assert_eq!(arp_frame.opcode(), ArpOp::Request as u16);
        assert_eq!(
            arp_frame.sender_hardware_addr(),
            MacAddr::new([1, 2, 3, 4, 5, 6])
        );
        assert_eq!(arp_frame.sender_protocol_addr(), Ipv4Addr::new(10, 0, 0, 1));
        assert_eq!(
            arp_frame.target_hardware_addr(),
            MacAddr::new([10, 9, 8, 7, 6, 5])
        );
        assert_eq!(arp_frame.target_protocol_addr(), Ipv4Addr::BROADCAST);
        Ok(())
    }

    #[test]
    fn padded_frame_is_accepted() {
        let mut frame = ArpFrame::new().frame();
        frame.data.resize(60, 0);
        assert!(ArpFrame::try_from(frame).is_ok());
    }

    #[test]
    fn rejects_other_ether_types() {
        let mut frame = ArpFrame::new().frame();
        frame.set_ether_type(IPV4_ETHER_TYPE);
        assert_eq!(
            ArpFrame::try_from(frame),
            Err("Frame does not have ARP ether type.")
        );
    }

    #[test]
    fn rejects_truncated_payload() {
        let mut frame = EthernetFrame::empty();
        frame.set_ether_type(ARP_ETHER_TYPE);
        frame.set_payload(&[0; ARP_HEADER_LEN - 1]);
        assert_eq!(ArpFrame::try_from(frame), Err("Frame payload is too small"));
    }

    #[test]
    fn request_builder() {
        let sender = MacAddr::new([0xaa; 6]);
        let arp_frame = ArpFrame::request(
            sender,
            Ipv4Addr::new(10, 0, 0, 1),
            Ipv4Addr::new(10, 0, 0, 2),
        );
        assert_eq!(arp_frame.ethernet().dest_mac(), MacAddr::broadcast());
        assert_eq!(arp_frame.ethernet().src_mac(), sender);
        assert_eq!(arp_frame.opcode(), ArpOp::Request as u16);
        assert_eq!(arp_frame.sender_hardware_addr(), sender);
        assert_eq!(arp_frame.sender_protocol_addr(), Ipv4Addr::new(10, 0, 0, 1));
        assert!(arp_frame.target_hardware_addr().is_unspecified());
        assert_eq!(arp_frame.target_protocol_addr(), Ipv4Addr::new(10, 0, 0, 2));
    }

    #[test]
    fn setters_touch_only_their_field() {
        let mut arp_frame = ArpFrame::new();
        arp_frame.set_opcode(ArpOp::Reply as u16);
        arp_frame.set_target_protocol_addr(Ipv4Addr::new(192, 168, 1, 1));
        assert_eq!(arp_frame.opcode(), 2);
        assert_eq!(arp_frame.target_protocol_addr(), Ipv4Addr::new(192, 168, 1, 1));
        assert_eq!(arp_frame.sender_protocol_addr(), Ipv4Addr::UNSPECIFIED);
        assert!(arp_frame.target_hardware_addr().is_unspecified());
    }
}
