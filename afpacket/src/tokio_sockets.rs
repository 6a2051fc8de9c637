use crate::sockets::{Addr, BoundSocket, Socket};
use futures::{
    future::poll_fn,
    ready,
    task::{Context, Poll},
};
use mio::Ready;
use std::{
    cell::UnsafeCell,
    ffi::CStr,
    io,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};
use tokio::io::PollEvented;

/// A bound `AF_PACKET` socket registered with tokio's reactor.
///
/// Must be created from within a tokio runtime.
pub struct AsyncBoundSocket {
    sock: PollEvented<BoundSocket>,
}

impl AsyncBoundSocket {
    /// Opens a non-blocking socket bound to the named interface.
    pub fn from_interface(iface: impl AsRef<CStr>) -> io::Result<Self> {
        let mut sock = Socket::new()?;
        sock.set_nonblocking(true)?;
        let sock = sock.bind(iface)?;
        Ok(Self {
            sock: PollEvented::new(sock)?,
        })
    }

    /// Index of the interface the socket is bound to.
    pub fn ifindex(&self) -> i32 {
        self.sock.get_ref().ifindex()
    }

    /// See [`BoundSocket::set_promiscuous`].
    pub fn set_promiscuous(&mut self, promiscuous: bool) -> io::Result<()> {
        self.sock.get_mut().set_promiscuous(promiscuous)
    }

    /// Splits the socket so sending and receiving can live in different tasks. The halves share
    /// the socket behind a spin lock, so only one of them touches it at a time.
    pub fn split(self) -> (SendHalf, RecvHalf) {
        let shared = Arc::new(Shared {
            locked: AtomicBool::new(false),
            sock: UnsafeCell::new(self),
        });

        (
            SendHalf {
                shared: Arc::clone(&shared),
            },
            RecvHalf { shared },
        )
    }

    /// Receives a frame, or registers for a wakeup and returns `Poll::Pending` when none is
    /// waiting.
    pub fn poll_recv(
        &mut self,
        cx: &mut Context<'_>,
        frame: &mut [u8],
    ) -> Poll<io::Result<(usize, Addr)>> {
        ready!(self.sock.poll_read_ready(cx, Ready::readable()))?;
        match self.sock.get_mut().recv(frame) {
            Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => {
                self.sock.clear_read_ready(cx, Ready::readable())?;
                Poll::Pending
            }
            result => Poll::Ready(result),
        }
    }

    /// Sends a frame, or registers for a wakeup and returns `Poll::Pending` when the transmit
    /// queue is full.
    pub fn poll_send(&mut self, cx: &mut Context<'_>, frame: &[u8]) -> Poll<io::Result<usize>> {
        ready!(self.sock.poll_write_ready(cx))?;
        match self.sock.get_mut().send(frame) {
            Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => {
                self.sock.clear_write_ready(cx)?;
                Poll::Pending
            }
            result => Poll::Ready(result),
        }
    }

    /// Receives one frame.
    pub async fn recv(&mut self, frame: &mut [u8]) -> io::Result<(usize, Addr)> {
        poll_fn(|cx| self.poll_recv(cx, frame)).await
    }

    /// Sends one frame.
    pub async fn send(&mut self, frame: &[u8]) -> io::Result<usize> {
        poll_fn(|cx| self.poll_send(cx, frame)).await
    }
}

/// The receiving half of a split `AsyncBoundSocket`.
pub struct RecvHalf {
    shared: Arc<Shared>,
}

/// The sending half of a split `AsyncBoundSocket`.
pub struct SendHalf {
    shared: Arc<Shared>,
}

impl RecvHalf {
    /// True if both halves came from the same `split`.
    pub fn is_pair_of(&self, other: &SendHalf) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }

    /// See [`AsyncBoundSocket::poll_recv`].
    pub fn poll_recv(
        &mut self,
        cx: &mut Context<'_>,
        frame: &mut [u8],
    ) -> Poll<io::Result<(usize, Addr)>> {
        let mut guard = ready!(self.shared.poll_lock(cx));
        guard.sock().poll_recv(cx, frame)
    }

    /// Receives one frame.
    pub async fn recv(&mut self, frame: &mut [u8]) -> io::Result<(usize, Addr)> {
        poll_fn(|cx| self.poll_recv(cx, frame)).await
    }
}

impl SendHalf {
    /// True if both halves came from the same `split`.
    pub fn is_pair_of(&self, other: &RecvHalf) -> bool {
        other.is_pair_of(self)
    }

    /// See [`AsyncBoundSocket::poll_send`].
    pub fn poll_send(&mut self, cx: &mut Context<'_>, frame: &[u8]) -> Poll<io::Result<usize>> {
        let mut guard = ready!(self.shared.poll_lock(cx));
        guard.sock().poll_send(cx, frame)
    }

    /// Sends one frame.
    pub async fn send(&mut self, frame: &[u8]) -> io::Result<usize> {
        poll_fn(|cx| self.poll_send(cx, frame)).await
    }
}

// The lock follows the same shape as tokio's `io::split`.
struct Shared {
    locked: AtomicBool,
    sock: UnsafeCell<AsyncBoundSocket>,
}

// Access to `sock` only happens through a `Guard`, which holds `locked`.
unsafe impl Sync for Shared {}

struct Guard<'a> {
    shared: &'a Shared,
}

impl Shared {
    fn poll_lock(&self, cx: &mut Context<'_>) -> Poll<Guard<'_>> {
        if self
            .locked
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
        {
            Poll::Ready(Guard { shared: self })
        } else {
            // The other half holds it for at most one syscall; spin.
            std::thread::yield_now();
            cx.waker().wake_by_ref();
            Poll::Pending
        }
    }
}

impl Guard<'_> {
    fn sock(&mut self) -> &mut AsyncBoundSocket {
        // Exclusive while the guard is alive.
        unsafe { &mut *self.shared.sock.get() }
    }
}

impl Drop for Guard<'_> {
    fn drop(&mut self) {
        self.shared.locked.store(false, Ordering::Release);
    }
}
