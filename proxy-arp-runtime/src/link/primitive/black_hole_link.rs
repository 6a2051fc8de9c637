use crate::link::{Link, LinkBuilder, PacketStream};
use futures::task::{Context, Poll};
use futures::{Future, Stream};
use std::pin::Pin;

/// Terminates a branch of the pipeline. Every packet that reaches it is dropped.
#[derive(Default)]
pub struct BlackHoleLink<Input> {
    in_stream: Option<PacketStream<Input>>,
}

impl<Input: Send + 'static> LinkBuilder<Input, ()> for BlackHoleLink<Input> {
    fn new() -> Self {
        BlackHoleLink { in_stream: None }
    }

    fn ingressors(self, mut in_streams: Vec<PacketStream<Input>>) -> Self {
        assert_eq!(
            in_streams.len(),
            1,
            "BlackHoleLink may only take 1 input stream"
        );
        assert!(
            self.in_stream.is_none(),
            "BlackHoleLink may only take 1 input stream"
        );

        BlackHoleLink {
            in_stream: Some(in_streams.remove(0)),
        }
    }

    fn ingressor(self, in_stream: PacketStream<Input>) -> Self {
        assert!(
            self.in_stream.is_none(),
            "BlackHoleLink may only take 1 input stream"
        );

        BlackHoleLink {
            in_stream: Some(in_stream),
        }
    }

    fn build_link(self) -> Link<()> {
        match self.in_stream {
            None => panic!("Cannot build link! Missing input stream"),
            Some(in_stream) => (vec![Box::new(BlackHoleIngressor::new(in_stream))], vec![]),
        }
    }
}

pub struct BlackHoleIngressor<Input> {
    input_stream: PacketStream<Input>,
}

impl<Input> BlackHoleIngressor<Input> {
    fn new(input_stream: PacketStream<Input>) -> Self {
        BlackHoleIngressor { input_stream }
    }
}

impl<Input> Unpin for BlackHoleIngressor<Input> {}

impl<Input> Future for BlackHoleIngressor<Input> {
    type Output = ();

    /// Pulls and discards packets until the upstream stops making progress. Finishes once the
    /// upstream ends.
    fn poll(mut self: Pin<&mut Self>, cx: &mut Context) -> Poll<Self::Output> {
        while ready!(Pin::new(&mut self.input_stream).poll_next(cx)).is_some() {}
        Poll::Ready(())
    }
}
