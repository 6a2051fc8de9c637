use crate::link::PacketStream;
use futures::prelude::*;
use futures::task::{Context, Poll};
use std::pin::Pin;
use tokio::time::{interval, Duration, Interval};

/// Immediately yields a collection of packets to be poll'd.
pub fn immediate_stream<I>(collection: I) -> PacketStream<I::Item>
where
    I: IntoIterator,
    I::IntoIter: Send + 'static,
{
    Box::new(stream::iter(collection))
}

/// Produces a stream of packets, one per `duration`.
///
/// Packets are taken from the iterator given at creation. Once it runs out the stream ends.
pub struct PacketIntervalGenerator<Iterable: Iterator> {
    interval: Interval,
    packets: Iterable,
}

impl<Iterable: Iterator> Unpin for PacketIntervalGenerator<Iterable> {}

impl<Iterable: Iterator> PacketIntervalGenerator<Iterable> {
    pub fn new(duration: Duration, packets: Iterable) -> Self {
        PacketIntervalGenerator {
            interval: interval(duration),
            packets,
        }
    }
}

impl<Iterable: Iterator> Stream for PacketIntervalGenerator<Iterable> {
    type Item = Iterable::Item;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context) -> Poll<Option<Self::Item>> {
        let generator = Pin::into_inner(self);
        ready!(Pin::new(&mut generator.interval).poll_next(cx));
        Poll::Ready(generator.packets.next())
    }
}
