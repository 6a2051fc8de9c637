//! Raw `AF_PACKET` sockets bound to a single Linux network interface.
//!
//! `Socket` is configured, then bound by interface name into a `BoundSocket` that sends and
//! receives whole link-layer frames. With the `tokio-support` feature, `AsyncBoundSocket` drives
//! the same socket from tokio's reactor and can be split into independent send and receive
//! halves.
#![cfg(target_os = "linux")]
mod sockets;
mod sys;

#[cfg(feature = "tokio-support")]
mod tokio_sockets;

pub use sockets::{Addr, BoundSocket, PacketType, Socket};
#[cfg(feature = "tokio-support")]
pub use tokio_sockets::{AsyncBoundSocket, RecvHalf, SendHalf};
