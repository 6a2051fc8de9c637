use crate::link::utils::handoff::HandoffSender;
use crate::link::{EgressLinkBuilder, Link, LinkBuilder, PacketStream};
use futures::task::{Context, Poll};
use futures::{Future, Stream};
use std::pin::Pin;

/// Egress link that hands every packet to a thread through a `handoff` queue. When the queue is
/// full the link sleeps until the thread takes something. Dropping the `HandoffReceiver` ends the
/// link; so does the end of its input, which in turn ends the receiver's iterator.
pub struct OutputChannelLink<Packet> {
    in_stream: Option<PacketStream<Packet>>,
    sender: Option<HandoffSender<Packet>>,
}

impl<Packet: Send + 'static> EgressLinkBuilder<Packet> for OutputChannelLink<Packet> {
    type Sender = HandoffSender<Packet>;

    fn channel(self, sender: HandoffSender<Packet>) -> Self {
        assert!(
            self.sender.is_none(),
            "OutputChannelLink may only take 1 channel"
        );
        OutputChannelLink {
            sender: Some(sender),
            ..self
        }
    }
}

impl<Packet: Send + 'static> LinkBuilder<Packet, ()> for OutputChannelLink<Packet> {
    fn new() -> Self {
        OutputChannelLink {
            in_stream: None,
            sender: None,
        }
    }

    fn ingressors(self, in_streams: Vec<PacketStream<Packet>>) -> Self {
        assert_eq!(
            in_streams.len(),
            1,
            "OutputChannelLink may only take 1 input stream"
        );
        in_streams
            .into_iter()
            .fold(self, |link, in_stream| link.ingressor(in_stream))
    }

    fn ingressor(self, in_stream: PacketStream<Packet>) -> Self {
        assert!(
            self.in_stream.is_none(),
            "OutputChannelLink may only take 1 input stream"
        );
        OutputChannelLink {
            in_stream: Some(in_stream),
            ..self
        }
    }

    fn build_link(self) -> Link<()> {
        let in_stream = self
            .in_stream
            .unwrap_or_else(|| panic!("Cannot build link! Missing input streams"));
        let sender = self
            .sender
            .unwrap_or_else(|| panic!("Cannot build link! Missing channel"));

        (
            vec![Box::new(StreamToHandoff {
                in_stream,
                sender,
                pending: None,
            })],
            vec![],
        )
    }
}

struct StreamToHandoff<Packet> {
    in_stream: PacketStream<Packet>,
    sender: HandoffSender<Packet>,
    /// Pulled from the stream, waiting for room in the queue.
    pending: Option<Packet>,
}

impl<Packet> Unpin for StreamToHandoff<Packet> {}

impl<Packet> Future for StreamToHandoff<Packet> {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context) -> Poll<()> {
        let me = self.get_mut();
        loop {
            if ready!(me.sender.poll_send(cx, &mut me.pending)).is_err() {
                // Receiver hung up.
                return Poll::Ready(());
            }

            match ready!(Pin::new(&mut me.in_stream).poll_next(cx)) {
                Some(packet) => me.pending = Some(packet),
                None => return Poll::Ready(()),
            }
        }
    }
}
