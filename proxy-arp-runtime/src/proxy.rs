//! # Proxy ARP replies
//!
//! `process` inspects one Ethernet frame. If, and only if, it is an ARP request, the frame is
//! rewritten in place into the reply that the configured identity would send, and the caller is
//! told to redirect it back out the interface it came in on and drop the original. Anything else
//! is passed untouched.
//!
//! The whole frame is validated with a single length check up front. Every field the transform
//! touches lies inside the first `ARP_FRAME_MIN_LEN` bytes, so once that prefix is pinned down as
//! a fixed-size array no further bounds checks are needed.

use proxy_arp_packets::{
    ArpOp, MacAddr, ARP_ETHER_TYPE, ARP_FRAME_MIN_LEN, ARP_OPCODE_RANGE,
    ARP_SENDER_HARDWARE_ADDR_RANGE, ARP_SENDER_PROTOCOL_ADDR_RANGE,
    ARP_TARGET_HARDWARE_ADDR_RANGE, ARP_TARGET_PROTOCOL_ADDR_RANGE, ETHERNET_DEST_MAC_RANGE,
    ETHERNET_ETHER_TYPE_RANGE, ETHERNET_HEADER_LEN, ETHERNET_SRC_MAC_RANGE,
};
use std::convert::TryFrom;

/// What the surrounding dispatch layer should do with a frame once `process` has seen it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    /// No opinion, let the frame continue along its normal path.
    Pass,
    /// Discard the frame silently.
    Drop,
    /// Clone the (already rewritten) frame back out the interface it arrived on, then discard
    /// the original.
    RedirectAndDrop,
}

/// A packet paired with the action decided for it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Decision<P> {
    pub action: Action,
    pub packet: P,
}

/// The hardware addresses the proxy answers with. Fixed at start up.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ProxyIdentity {
    reply_as: MacAddr,
    bridge: Option<MacAddr>,
}

impl ProxyIdentity {
    pub fn new(reply_as: MacAddr) -> Self {
        ProxyIdentity {
            reply_as,
            bridge: None,
        }
    }

    /// Records the bridge address. It is carried alongside the reply-as address but no
    /// transform reads it.
    pub fn bridge(self, bridge: MacAddr) -> Self {
        ProxyIdentity {
            reply_as: self.reply_as,
            bridge: Some(bridge),
        }
    }

    /// The address replies claim to come from, in both the Ethernet and the ARP header.
    pub fn reply_as(&self) -> MacAddr {
        self.reply_as
    }

    pub fn bridge_mac(&self) -> Option<MacAddr> {
        self.bridge
    }
}

type Header = [u8; ARP_FRAME_MIN_LEN];

const fn in_frame(arp_range: (usize, usize)) -> (usize, usize) {
    (
        ETHERNET_HEADER_LEN + arp_range.0,
        ETHERNET_HEADER_LEN + arp_range.1,
    )
}

const OPCODE: (usize, usize) = in_frame(ARP_OPCODE_RANGE);
const SENDER_HARDWARE_ADDR: (usize, usize) = in_frame(ARP_SENDER_HARDWARE_ADDR_RANGE);
const SENDER_PROTOCOL_ADDR: (usize, usize) = in_frame(ARP_SENDER_PROTOCOL_ADDR_RANGE);
const TARGET_HARDWARE_ADDR: (usize, usize) = in_frame(ARP_TARGET_HARDWARE_ADDR_RANGE);
const TARGET_PROTOCOL_ADDR: (usize, usize) = in_frame(ARP_TARGET_PROTOCOL_ADDR_RANGE);

/// Turns an ARP request into the proxy reply, in place.
///
/// Returns `Action::Pass` without reading past the end of `frame` or writing anything when the
/// frame is too short to hold Ethernet + ARP headers, is not ARP, or is not a request. Otherwise
/// rewrites the frame and returns `Action::RedirectAndDrop`:
///
/// * Ethernet destination becomes the original Ethernet source, Ethernet source becomes the
///   reply-as address.
/// * ARP target hardware address becomes the original sender hardware address, ARP sender
///   hardware address becomes the reply-as address.
/// * ARP sender and target protocol addresses are swapped.
/// * The opcode becomes `ArpOp::Reply`.
///
/// The frame's length never changes and nothing past the ARP header is touched. A reply fails the
/// request check, so running `process` over its own output passes it through.
pub fn process(frame: &mut [u8], identity: &ProxyIdentity) -> Action {
    let header: &mut Header = match frame
        .get_mut(..ARP_FRAME_MIN_LEN)
        .and_then(|prefix| <&mut Header>::try_from(prefix).ok())
    {
        Some(header) => header,
        None => return Action::Pass,
    };

    if read_u16(header, ETHERNET_ETHER_TYPE_RANGE) != ARP_ETHER_TYPE {
        return Action::Pass;
    }
    if read_u16(header, OPCODE) != ArpOp::Request as u16 {
        return Action::Pass;
    }

    let reply_as = identity.reply_as().bytes;

    // All reads happen before the writes that would clobber them.
    let requester_mac = read_array::<[u8; 6]>(header, ETHERNET_SRC_MAC_RANGE);
    let sender_hardware_addr = read_array::<[u8; 6]>(header, SENDER_HARDWARE_ADDR);
    let sender_protocol_addr = read_array::<[u8; 4]>(header, SENDER_PROTOCOL_ADDR);
    let target_protocol_addr = read_array::<[u8; 4]>(header, TARGET_PROTOCOL_ADDR);

    write(header, ETHERNET_SRC_MAC_RANGE, &reply_as);
    write(header, ETHERNET_DEST_MAC_RANGE, &requester_mac);

    write(header, SENDER_HARDWARE_ADDR, &reply_as);
    write(header, TARGET_HARDWARE_ADDR, &sender_hardware_addr);

    write(header, SENDER_PROTOCOL_ADDR, &target_protocol_addr);
    write(header, TARGET_PROTOCOL_ADDR, &sender_protocol_addr);

    write(header, OPCODE, &(ArpOp::Reply as u16).to_be_bytes());

    Action::RedirectAndDrop
}

fn read_u16(header: &Header, range: (usize, usize)) -> u16 {
    u16::from_be_bytes(read_array(header, range))
}

fn read_array<A: Default + AsMut<[u8]>>(header: &Header, range: (usize, usize)) -> A {
    let (start, end) = range;
    let mut bytes = A::default();
    bytes.as_mut().copy_from_slice(&header[start..end]);
    bytes
}

fn write(header: &mut Header, range: (usize, usize), bytes: &[u8]) {
    let (start, end) = range;
    header[start..end].copy_from_slice(bytes);
}
