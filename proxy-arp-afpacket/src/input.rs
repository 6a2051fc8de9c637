use afpacket::RecvHalf;
use futures::{
    ready,
    task::{Context, Poll},
};
use proxy_arp_packets::{PacketData, ETHERNET_HEADER_LEN};
use proxy_arp_runtime::link::{IngressLinkBuilder, Link, LinkBuilder, PacketStream};
use std::{io, mem, pin::Pin};
use tracing::{error, trace};

/// Largest frame read off the wire; anything longer is truncated by the kernel.
const MAX_FRAME_LEN: usize = 1500 + ETHERNET_HEADER_LEN;

/// Ingress link reading frames from the receive half of an `AF_PACKET` socket.
///
/// Frames the kernel reports as outgoing were transmitted by this host and are skipped. The
/// stream ends on the first unrecoverable read error.
#[derive(Default)]
pub struct AfPacketInput {
    ingress: Option<RecvHalf>,
}

impl IngressLinkBuilder<PacketData> for AfPacketInput {
    type Receiver = RecvHalf;

    fn channel(self, ingress: RecvHalf) -> Self {
        AfPacketInput {
            ingress: Some(ingress),
        }
    }
}

impl LinkBuilder<(), PacketData> for AfPacketInput {
    fn new() -> Self {
        AfPacketInput { ingress: None }
    }

    fn ingressors(self, _in_streams: Vec<PacketStream<()>>) -> Self {
        panic!("AfPacketInput does not take stream ingressors")
    }

    fn ingressor(self, _in_stream: PacketStream<()>) -> Self {
        panic!("AfPacketInput does not take any stream ingressors")
    }

    fn build_link(self) -> Link<PacketData> {
        match self.ingress {
            None => panic!("Cannot build link! Missing channel"),
            Some(ingress) => (
                vec![],
                vec![Box::new(FrameStream {
                    ingress,
                    in_buf: vec![0; MAX_FRAME_LEN],
                })],
            ),
        }
    }
}

struct FrameStream {
    ingress: RecvHalf,
    in_buf: PacketData,
}

impl Unpin for FrameStream {}

impl futures::Stream for FrameStream {
    type Item = PacketData;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let me = self.get_mut();
        loop {
            match ready!(me.ingress.poll_recv(cx, &mut me.in_buf)) {
                Ok((_, addr)) if addr.is_outgoing() => {
                    trace!(?addr, "skipping outgoing frame");
                }
                Ok((len, _)) => {
                    me.in_buf.truncate(len);
                    let frame = mem::replace(&mut me.in_buf, vec![0; MAX_FRAME_LEN]);
                    return Poll::Ready(Some(frame));
                }
                Err(ref err) if err.kind() == io::ErrorKind::Interrupted => {}
                Err(err) => {
                    error!(%err, "failed to read frame, closing ingress");
                    return Poll::Ready(None);
                }
            }
        }
    }
}
