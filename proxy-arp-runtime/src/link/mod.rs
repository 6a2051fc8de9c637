use crate::processor::Processor;
use futures::{Future, Stream};

/// Utilities shared by the links, mainly the `task_park` used to put tasks to sleep and wake them.
pub mod utils;

/// The building blocks every pipeline is assembled from.
pub mod primitive;

/// A stream of packets flowing out of one link and into the next.
pub type PacketStream<Input> = Box<dyn Stream<Item = Input> + Send + Unpin>;

/// A task that must be spawned onto the runtime for a link to make progress.
pub type TokioRunnable = Box<dyn Future<Output = ()> + Send + Unpin>;

/// What building a link produces: the tasks that drive it, and its egressors.
pub type Link<Output> = (Vec<TokioRunnable>, Vec<PacketStream<Output>>);

/// Builder interface shared by all links. Ingressors are attached, then `build_link` consumes the
/// builder and returns the runnables and egressors. Builders panic when asked to build without
/// everything they need, since that is a wiring mistake in the pipeline, not a runtime condition.
pub trait LinkBuilder<Input, Output> {
    fn new() -> Self;

    fn ingressors(self, in_streams: Vec<PacketStream<Input>>) -> Self;

    fn ingressor(self, in_stream: PacketStream<Input>) -> Self;

    fn build_link(self) -> Link<Output>;
}

/// Links that run their packets through a `Processor`.
pub trait ProcessLinkBuilder<P: Processor>: LinkBuilder<P::Input, P::Output> {
    fn processor(self, processor: P) -> Self;
}

/// Links that pull packets from something outside the pipeline, such as a channel or a socket.
pub trait IngressLinkBuilder<Packet>: LinkBuilder<(), Packet> {
    type Receiver;

    fn channel(self, receiver: Self::Receiver) -> Self;
}

/// Links that push packets to something outside the pipeline, such as a channel or a socket.
pub trait EgressLinkBuilder<Packet>: LinkBuilder<Packet, ()> {
    type Sender;

    fn channel(self, sender: Self::Sender) -> Self;
}
