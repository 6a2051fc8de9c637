#[macro_use]
extern crate futures;
extern crate crossbeam;
extern crate tokio;

/// The proxy ARP transform itself: given one frame and the configured identity, decide whether
/// to pass it, drop it, or turn it into a reply that is redirected back out the interface it
/// arrived on. This is a pure function over a byte slice; everything else in this crate exists
/// to feed it frames and carry out its decisions.
pub mod proxy;

/// Processors are the unit of transformation in a pipeline. A link calls the processor's
/// `process` function on every packet that moves through it, and the processor either returns
/// a (possibly transformed) packet or drops it by returning `None`.
pub mod processor;

/// Classifiers look at packets by reference and sort them into classes, which a `ClassifyLink`
/// turns into output ports.
pub mod classifier;

/// Links are an abstraction used by the runtime to link processors together, and manage the flow of packets
/// through the pipeline. Links are joined together via their interfaces, and the links are then dumped into a
/// runtime to begin pulling packets through. In general, users are not expected to implement their own links,
/// because all of the desired flows should already be representable with the provided selection.
pub mod link;

/// Utility module
pub mod utils;
