use proxy_arp_packets::PacketData;
use proxy_arp_runtime::classifier::{action_link, DROP_PORT, PASS_PORT, REDIRECT_PORT};
use proxy_arp_runtime::link::primitive::{BlackHoleLink, ProcessLink};
use proxy_arp_runtime::link::{Link, LinkBuilder, PacketStream, ProcessLinkBuilder};
use proxy_arp_runtime::processor::{ArpProxy, StripDecision};
use proxy_arp_runtime::proxy::ProxyIdentity;

/// The daemon's whole pipeline, from raw frames in to raw frames out:
///
/// ```text
///            ArpProxy          ByAction        StripDecision
/// frames ──▶ ProcessLink ──▶ ClassifyLink ─0─▶ ProcessLink ──▶ replies
///                                         ─1─▶ BlackHole   (pass)
///                                         ─2─▶ BlackHole   (drop)
/// ```
///
/// The single egressor carries only rewritten replies. It is meant to be attached to the send
/// half of the socket the frames were read from, so each reply leaves by the interface its request
/// arrived on. Passed and dropped frames end in black holes: the kernel already delivers its own
/// copy of every frame, and nothing of ours should be re-emitted.
#[derive(Default)]
pub struct ProxyPipeline {
    in_stream: Option<PacketStream<PacketData>>,
    identity: Option<ProxyIdentity>,
}

impl ProxyPipeline {
    pub fn identity(self, identity: ProxyIdentity) -> Self {
        ProxyPipeline {
            in_stream: self.in_stream,
            identity: Some(identity),
        }
    }
}

impl LinkBuilder<PacketData, PacketData> for ProxyPipeline {
    fn new() -> Self {
        ProxyPipeline {
            in_stream: None,
            identity: None,
        }
    }

    fn ingressors(self, mut in_streams: Vec<PacketStream<PacketData>>) -> Self {
        assert_eq!(
            in_streams.len(),
            1,
            "ProxyPipeline may only take 1 input stream"
        );
        self.ingressor(in_streams.remove(0))
    }

    fn ingressor(self, in_stream: PacketStream<PacketData>) -> Self {
        if self.in_stream.is_some() {
            panic!("ProxyPipeline may only take 1 input stream")
        }

        ProxyPipeline {
            in_stream: Some(in_stream),
            identity: self.identity,
        }
    }

    fn build_link(self) -> Link<PacketData> {
        let (in_stream, identity) = match (self.in_stream, self.identity) {
            (None, _) => panic!("Cannot build link! Missing input streams"),
            (_, None) => panic!("Cannot build link! Missing identity"),
            (Some(in_stream), Some(identity)) => (in_stream, identity),
        };

        let (_, mut decided) = ProcessLink::new()
            .ingressor(in_stream)
            .processor(ArpProxy::new(identity))
            .build_link();

        let (mut runnables, mut ports) = action_link(decided.remove(0));

        // Highest port first so the lower indices stay put.
        let dropped = ports.remove(DROP_PORT);
        let passed = ports.remove(PASS_PORT);
        let redirected = ports.remove(REDIRECT_PORT);

        for terminal in vec![passed, dropped] {
            let (mut sinks, _) = BlackHoleLink::new().ingressor(terminal).build_link();
            runnables.append(&mut sinks);
        }

        let (_, replies) = ProcessLink::new()
            .ingressor(redirected)
            .processor(StripDecision::new())
            .build_link();

        (runnables, replies)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proxy_arp_packets::{ArpFrame, ArpOp, EthernetFrame, MacAddr};
    use proxy_arp_runtime::link::primitive::{InputChannelLink, OutputChannelLink};
    use proxy_arp_runtime::link::utils::handoff::handoff;
    use proxy_arp_runtime::utils::runner::build_and_run_router;
    use proxy_arp_runtime::utils::test::harness::{initialize_runtime, run_link};
    use proxy_arp_runtime::utils::test::packet_generators::immediate_stream;
    use std::convert::TryFrom;
    use std::net::Ipv4Addr;

    const REPLY_AS: MacAddr = MacAddr::new([0x1a, 0xfb, 0x32, 0x2c, 0x70, 0x33]);
    const BRIDGE: MacAddr = MacAddr::new([0x96, 0x66, 0xa4, 0x63, 0x8d, 0x17]);

    fn request(requester: u8, asking_for: u8) -> PacketData {
        ArpFrame::request(
            MacAddr::new([requester; 6]),
            Ipv4Addr::new(10, 0, 0, requester),
            Ipv4Addr::new(10, 0, 0, asking_for),
        )
        .frame()
        .data
    }

    fn pipeline() -> ProxyPipeline {
        ProxyPipeline::new().identity(ProxyIdentity::new(REPLY_AS).bridge(BRIDGE))
    }

    fn parse(frame: PacketData) -> ArpFrame {
        ArpFrame::try_from(EthernetFrame::from_buffer(frame).unwrap()).unwrap()
    }

    #[test]
    #[should_panic]
    fn panics_when_built_without_input_streams() {
        pipeline().build_link();
    }

    #[test]
    #[should_panic]
    fn panics_when_built_without_identity() {
        ProxyPipeline::new()
            .ingressor(immediate_stream(vec![]))
            .build_link();
    }

    #[test]
    #[should_panic]
    fn panics_when_given_two_ingressors() {
        pipeline()
            .ingressors(vec![immediate_stream(vec![]), immediate_stream(vec![])])
            .build_link();
    }

    #[test]
    fn only_replies_come_out() {
        let mut reply = ArpFrame::new();
        reply.set_opcode(ArpOp::Reply as u16);

        let frames = vec![
            vec![0xff; 20],
            request(0xaa, 2),
            vec![],
            reply.frame().data,
            vec![0; 64],
            request(0xbb, 3),
        ];

        let mut runtime = initialize_runtime();
        let results = runtime.block_on(async {
            run_link(pipeline().ingressor(immediate_stream(frames)).build_link()).await
        });

        assert_eq!(results.len(), 1);
        let replies: Vec<ArpFrame> = results.into_iter().next().unwrap().into_iter().map(parse).collect();
        assert_eq!(replies.len(), 2);

        assert_eq!(replies[0].ethernet().dest_mac(), MacAddr::new([0xaa; 6]));
        assert_eq!(replies[0].sender_protocol_addr(), Ipv4Addr::new(10, 0, 0, 2));
        assert_eq!(replies[0].target_protocol_addr(), Ipv4Addr::new(10, 0, 0, 0xaa));

        assert_eq!(replies[1].ethernet().dest_mac(), MacAddr::new([0xbb; 6]));
        assert_eq!(replies[1].target_hardware_addr(), MacAddr::new([0xbb; 6]));

        for reply in &replies {
            assert_eq!(reply.opcode(), ArpOp::Reply as u16);
            assert_eq!(reply.ethernet().src_mac(), REPLY_AS);
            assert_eq!(reply.sender_hardware_addr(), REPLY_AS);
        }
    }

    #[test]
    fn nothing_in_nothing_out() {
        let mut runtime = initialize_runtime();
        let results = runtime.block_on(async {
            run_link(pipeline().ingressor(immediate_stream(vec![])).build_link()).await
        });
        assert_eq!(results, vec![Vec::<PacketData>::new()]);
    }

    #[test]
    fn long_stream_of_mixed_frames() {
        let frames: Vec<PacketData> = (0..600)
            .map(|i| if i % 3 == 0 { request(1, 2) } else { vec![0; 60] })
            .collect();

        let mut runtime = initialize_runtime();
        let results = runtime.block_on(async {
            run_link(pipeline().ingressor(immediate_stream(frames)).build_link()).await
        });
        assert_eq!(results[0].len(), 200);
    }

    #[test]
    fn through_channels() {
        let (ingress_sender, ingress_receiver) = handoff::<PacketData>(8);
        let (egress_sender, egress_receiver) = handoff::<PacketData>(8);

        let scenario = request(0xaa, 2);
        ingress_sender.send(scenario.clone()).unwrap();
        ingress_sender.send(vec![0x08; 42]).unwrap();
        drop(ingress_sender);

        build_and_run_router::<_, InputChannelLink<PacketData>, _, OutputChannelLink<PacketData>, _>(
            vec![ingress_receiver],
            vec![egress_sender],
            pipeline(),
        )
        .unwrap();

        let replies: Vec<PacketData> = egress_receiver.iter().collect();
        assert_eq!(replies.len(), 1);

        let reply = &replies[0];
        assert_eq!(reply.len(), scenario.len());
        assert_eq!(&reply[0..6], &[0xaa; 6]);
        assert_eq!(&reply[6..12], &REPLY_AS.bytes);
        assert_eq!(&reply[12..14], &[0x08, 0x06]);
        assert_eq!(&reply[20..22], &[0x00, 0x02]);
        assert_eq!(&reply[22..28], &REPLY_AS.bytes);
        assert_eq!(&reply[28..32], &[10, 0, 0, 2]);
        assert_eq!(&reply[32..38], &[0xaa; 6]);
        assert_eq!(&reply[38..42], &[10, 0, 0, 0xaa]);
    }
}
