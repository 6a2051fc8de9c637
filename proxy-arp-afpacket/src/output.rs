use afpacket::SendHalf;
use futures::{
    ready,
    task::{Context, Poll},
    Future, Stream,
};
use proxy_arp_packets::PacketData;
use proxy_arp_runtime::link::{EgressLinkBuilder, Link, LinkBuilder, PacketStream};
use std::pin::Pin;
use tracing::{trace, warn};

/// Egress link that transmits every frame it receives out the send half of an `AF_PACKET`
/// socket.
#[derive(Default)]
pub struct AfPacketOutput {
    in_stream: Option<PacketStream<PacketData>>,
    egress: Option<SendHalf>,
}

impl EgressLinkBuilder<PacketData> for AfPacketOutput {
    type Sender = SendHalf;

    fn channel(self, egress: SendHalf) -> Self {
        AfPacketOutput {
            in_stream: self.in_stream,
            egress: Some(egress),
        }
    }
}

impl LinkBuilder<PacketData, ()> for AfPacketOutput {
    fn new() -> Self {
        AfPacketOutput {
            in_stream: None,
            egress: None,
        }
    }

    fn ingressors(self, mut in_streams: Vec<PacketStream<PacketData>>) -> Self {
        assert_eq!(
            in_streams.len(),
            1,
            "AfPacketOutput may only take 1 input stream"
        );

        if self.in_stream.is_some() {
            panic!("AfPacketOutput may only take 1 input stream");
        }

        AfPacketOutput {
            in_stream: Some(in_streams.remove(0)),
            egress: self.egress,
        }
    }

    fn ingressor(self, in_stream: PacketStream<PacketData>) -> Self {
        if self.in_stream.is_some() {
            panic!("AfPacketOutput may only take 1 input stream");
        }

        AfPacketOutput {
            in_stream: Some(in_stream),
            egress: self.egress,
        }
    }

    fn build_link(self) -> Link<()> {
        match (self.in_stream, self.egress) {
            (None, _) => panic!("Cannot build link! Missing input streams"),
            (_, None) => panic!("Cannot build link! Missing channel"),
            (Some(stream), Some(egress)) => (
                vec![Box::new(StreamToSocket {
                    stream,
                    egress,
                    pending: None,
                })],
                vec![],
            ),
        }
    }
}

struct StreamToSocket {
    stream: PacketStream<PacketData>,
    egress: SendHalf,
    /// A frame pulled from the stream that the socket has not accepted yet.
    pending: Option<PacketData>,
}

impl Unpin for StreamToSocket {}

impl Future for StreamToSocket {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let me = self.get_mut();
        loop {
            if let Some(frame) = &me.pending {
                match ready!(me.egress.poll_send(cx, frame)) {
                    Ok(sent) if sent < frame.len() => {
                        warn!(sent, len = frame.len(), "short send")
                    }
                    Ok(sent) => trace!(sent, "frame sent"),
                    // One lost reply is not worth tearing the pipeline down for.
                    Err(err) => warn!(%err, "failed to send frame"),
                }
                me.pending = None;
            }

            match ready!(Pin::new(&mut me.stream).poll_next(cx)) {
                Some(frame) => me.pending = Some(frame),
                None => return Poll::Ready(()),
            }
        }
    }
}
