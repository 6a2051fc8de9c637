use crate::link::utils::handoff::HandoffReceiver;
use crate::link::{IngressLinkBuilder, Link, LinkBuilder, PacketStream};
use futures::task::{Context, Poll};
use futures::Stream;
use std::pin::Pin;

/// Ingress link fed by a thread through a `handoff` queue. The egressor ends when the
/// `HandoffSender` is dropped and the queue has drained.
pub struct InputChannelLink<Packet> {
    receiver: Option<HandoffReceiver<Packet>>,
}

impl<Packet: Send + 'static> IngressLinkBuilder<Packet> for InputChannelLink<Packet> {
    type Receiver = HandoffReceiver<Packet>;

    fn channel(self, receiver: HandoffReceiver<Packet>) -> Self {
        assert!(
            self.receiver.is_none(),
            "InputChannelLink may only take 1 channel"
        );
        InputChannelLink {
            receiver: Some(receiver),
        }
    }
}

impl<Packet: Send + 'static> LinkBuilder<(), Packet> for InputChannelLink<Packet> {
    fn new() -> Self {
        InputChannelLink { receiver: None }
    }

    fn ingressors(self, _in_streams: Vec<PacketStream<()>>) -> Self {
        panic!("InputChannelLink is fed by its channel, not by streams")
    }

    fn ingressor(self, _in_stream: PacketStream<()>) -> Self {
        panic!("InputChannelLink is fed by its channel, not by streams")
    }

    fn build_link(self) -> Link<Packet> {
        let receiver = self
            .receiver
            .unwrap_or_else(|| panic!("Cannot build link! Missing channel"));
        (vec![], vec![Box::new(HandoffStream { receiver })])
    }
}

struct HandoffStream<Packet> {
    receiver: HandoffReceiver<Packet>,
}

impl<Packet> Unpin for HandoffStream<Packet> {}

impl<Packet> Stream for HandoffStream<Packet> {
    type Item = Packet;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context) -> Poll<Option<Packet>> {
        self.receiver.poll_recv(cx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::utils::handoff::handoff;
    use crate::utils::test::harness::{initialize_runtime, run_link};
    use crate::utils::test::packet_generators::immediate_stream;
    use proxy_arp_packets::PacketData;
    use std::thread;
    use std::time::Duration;

    fn frames(lens: &[usize]) -> Vec<PacketData> {
        lens.iter().map(|&len| vec![0x5a; len]).collect()
    }

    #[test]
    #[should_panic]
    fn panics_when_built_with_ingressors() {
        InputChannelLink::<PacketData>::new()
            .ingressors(vec![immediate_stream(vec![])])
            .build_link();
    }

    #[test]
    #[should_panic]
    fn panics_when_built_without_channel() {
        InputChannelLink::<PacketData>::new().build_link();
    }

    #[test]
    #[should_panic]
    fn panics_when_given_two_channels() {
        let (_s0, r0) = handoff::<PacketData>(1);
        let (_s1, r1) = handoff::<PacketData>(1);
        InputChannelLink::new().channel(r0).channel(r1);
    }

    #[test]
    fn queued_before_running() {
        let input = frames(&[42, 60, 14, 1514]);
        let (sender, receiver) = handoff(8);
        for frame in input.clone() {
            sender.send(frame).unwrap();
        }
        drop(sender);

        let mut runtime = initialize_runtime();
        let results = runtime.block_on(async {
            run_link(InputChannelLink::new().channel(receiver).build_link()).await
        });
        assert_eq!(results, vec![input]);
    }

    #[test]
    fn trickled_in_by_a_thread() {
        let input = frames(&[42, 0, 64, 28, 1500, 43]);
        let expected = input.clone();
        let (sender, receiver) = handoff(1);

        let mut runtime = initialize_runtime();
        let results = runtime.block_on(async {
            let producer = thread::spawn(move || {
                for frame in input {
                    thread::sleep(Duration::from_millis(5));
                    sender.send(frame).unwrap();
                }
            });

            let results = run_link(InputChannelLink::new().channel(receiver).build_link()).await;
            producer.join().unwrap();
            results
        });
        assert_eq!(results, vec![expected]);
    }
}
