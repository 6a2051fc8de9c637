//! Links that connect a pipeline to an `AF_PACKET` socket from the `afpacket` crate.
#![deny(missing_docs)]

mod input;
mod output;

pub use input::AfPacketInput;
pub use output::AfPacketOutput;
