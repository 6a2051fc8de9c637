/// A simple pull based link. Packets are only fetched on the input when a packet is requested
/// from the output. This link does not store packets internally, so every packet that enters
/// either leaves immediately or is dropped, as dictated by the processor.
mod process_link;
pub use self::process_link::*;

/// Uses classifier defined classes to sort input into different channels, asynchronous.
mod classify_link;
pub use self::classify_link::*;

/// The receiving end of a bounded queue between two tasks, exposed as a stream.
mod queue_egressor;
pub use self::queue_egressor::*;

/// Consumes and discards everything it is given.
mod black_hole_link;
pub use self::black_hole_link::*;

/// Takes a channel for input and converts it to a stream.
mod input_channel_link;
pub use self::input_channel_link::*;

/// Takes a stream and converts it to a channel for output.
mod output_channel_link;
pub use self::output_channel_link::*;
