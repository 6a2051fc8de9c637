use crate::processor::Processor;
use crate::proxy::{self, Action, Decision, ProxyIdentity};
use proxy_arp_packets::{
    PacketData, ARP_SENDER_PROTOCOL_ADDR_RANGE, ARP_TARGET_PROTOCOL_ADDR_RANGE,
    ETHERNET_HEADER_LEN,
};
use std::net::Ipv4Addr;
use tracing::{debug, trace};

/// Runs every raw frame through `proxy::process` and attaches the resulting action.
///
/// Frames are rewritten in place, so a `RedirectAndDrop` decision already carries the reply
/// that should go back out the ingress interface. Nothing is ever dropped here; acting on the
/// decision is left to whatever is downstream.
pub struct ArpProxy {
    identity: ProxyIdentity,
}

impl ArpProxy {
    pub fn new(identity: ProxyIdentity) -> Self {
        ArpProxy { identity }
    }
}

impl Processor for ArpProxy {
    type Input = PacketData;
    type Output = Decision<PacketData>;

    fn process(&mut self, mut frame: Self::Input) -> Option<Self::Output> {
        let action = proxy::process(&mut frame, &self.identity);
        match action {
            Action::RedirectAndDrop => debug!(
                // The protocol addresses have already been swapped.
                asked_for = %ipv4_at(&frame, ARP_SENDER_PROTOCOL_ADDR_RANGE),
                asked_by = %ipv4_at(&frame, ARP_TARGET_PROTOCOL_ADDR_RANGE),
                reply_as = %self.identity.reply_as(),
                "answering arp request"
            ),
            _ => trace!(len = frame.len(), ?action, "frame not handled"),
        }
        Some(Decision {
            action,
            packet: frame,
        })
    }
}

// Only called on frames `proxy::process` has already length checked.
fn ipv4_at(frame: &[u8], arp_range: (usize, usize)) -> Ipv4Addr {
    let start = ETHERNET_HEADER_LEN + arp_range.0;
    Ipv4Addr::new(
        frame[start],
        frame[start + 1],
        frame[start + 2],
        frame[start + 3],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use proxy_arp_packets::{ArpFrame, ArpOp, EthernetFrame, MacAddr};
    use std::convert::TryFrom;

    const REPLY_AS: MacAddr = MacAddr::new([0x1a, 0xfb, 0x32, 0x2c, 0x70, 0x33]);

    fn arp_proxy() -> ArpProxy {
        ArpProxy::new(ProxyIdentity::new(REPLY_AS))
    }

    #[test]
    fn request_is_marked_for_redirect() {
        let request = ArpFrame::request(
            MacAddr::new([0xaa; 6]),
            Ipv4Addr::new(10, 0, 0, 1),
            Ipv4Addr::new(10, 0, 0, 2),
        );

        let decision = arp_proxy().process(request.frame().data).unwrap();

        assert_eq!(decision.action, Action::RedirectAndDrop);
        let reply = ArpFrame::try_from(EthernetFrame::from_buffer(decision.packet).unwrap()).unwrap();
        assert_eq!(reply.opcode(), ArpOp::Reply as u16);
        assert_eq!(reply.sender_hardware_addr(), REPLY_AS);
    }

    #[test]
    fn everything_else_is_passed_unchanged() {
        let mut proxy = arp_proxy();

        let mut reply = ArpFrame::new();
        reply.set_opcode(ArpOp::Reply as u16);
        let packets: Vec<PacketData> = vec![vec![], vec![0xff; 20], reply.frame().data];

        for packet in packets {
            let decision = proxy.process(packet.clone()).unwrap();
            assert_eq!(decision.action, Action::Pass);
            assert_eq!(decision.packet, packet);
        }
    }

    #[test]
    fn ipv4_at_reads_arp_fields() {
        let request = ArpFrame::request(
            MacAddr::new([0xaa; 6]),
            Ipv4Addr::new(10, 0, 0, 1),
            Ipv4Addr::new(10, 0, 0, 2),
        );
        let frame = request.frame().data;
        assert_eq!(
            ipv4_at(&frame, ARP_SENDER_PROTOCOL_ADDR_RANGE),
            Ipv4Addr::new(10, 0, 0, 1)
        );
        assert_eq!(
            ipv4_at(&frame, ARP_TARGET_PROTOCOL_ADDR_RANGE),
            Ipv4Addr::new(10, 0, 0, 2)
        );
    }
}
