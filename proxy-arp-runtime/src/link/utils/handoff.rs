//! A bounded queue between a pipeline task and a plain thread.
//!
//! Both ends share one task park. An async end that finds the queue empty (receiver) or full
//! (sender) parks its waker there, and every successful push or pop on the other end wakes it.
//! A thread end just blocks inside crossbeam. Each end marks the park dead when dropped.

use crate::link::utils::task_park::*;
use crossbeam::atomic::AtomicCell;
use crossbeam::crossbeam_channel::{
    self, Receiver, RecvError, SendError, Sender, TryRecvError, TrySendError,
};
use futures::task::{Context, Poll};
use std::sync::Arc;

/// Creates a queue holding up to `capacity` items.
pub fn handoff<T>(capacity: usize) -> (HandoffSender<T>, HandoffReceiver<T>) {
    assert!(capacity > 0, "Handoff capacity: {}, must be > 0", capacity);

    let (sender, receiver) = crossbeam_channel::bounded(capacity);
    let task_park = Arc::new(AtomicCell::new(TaskParkState::Empty));
    (
        HandoffSender {
            sender,
            task_park: Arc::clone(&task_park),
        },
        HandoffReceiver {
            receiver,
            task_park,
        },
    )
}

pub struct HandoffSender<T> {
    sender: Sender<T>,
    task_park: Arc<AtomicCell<TaskParkState>>,
}

pub struct HandoffReceiver<T> {
    receiver: Receiver<T>,
    task_park: Arc<AtomicCell<TaskParkState>>,
}

impl<T> HandoffSender<T> {
    /// Blocks the calling thread until there is room.
    pub fn send(&self, item: T) -> Result<(), SendError<T>> {
        self.sender.send(item)?;
        unpark_and_wake(&self.task_park);
        Ok(())
    }

    /// Pushes the item held in `slot`, leaving it there and parking the task if the queue is
    /// full. An empty `slot` is ready immediately. Fails once the receiver is gone.
    pub fn poll_send(&self, cx: &mut Context, slot: &mut Option<T>) -> Poll<Result<(), SendError<T>>> {
        let item = match slot.take() {
            Some(item) => item,
            None => return Poll::Ready(Ok(())),
        };

        let item = match self.try_send(item) {
            Ok(()) => return Poll::Ready(Ok(())),
            Err(TrySendError::Disconnected(item)) => return Poll::Ready(Err(SendError(item))),
            Err(TrySendError::Full(item)) => item,
        };

        park_and_wake(&self.task_park, cx.waker().clone());

        // The receiver may have made room before we parked.
        match self.try_send(item) {
            Ok(()) => Poll::Ready(Ok(())),
            Err(TrySendError::Disconnected(item)) => Poll::Ready(Err(SendError(item))),
            Err(TrySendError::Full(item)) => {
                *slot = Some(item);
                Poll::Pending
            }
        }
    }

    fn try_send(&self, item: T) -> Result<(), TrySendError<T>> {
        self.sender.try_send(item)?;
        unpark_and_wake(&self.task_park);
        Ok(())
    }
}

impl<T> HandoffReceiver<T> {
    /// Blocks the calling thread until an item arrives, or fails once the queue is empty and
    /// the sender is gone.
    pub fn recv(&self) -> Result<T, RecvError> {
        let item = self.receiver.recv()?;
        unpark_and_wake(&self.task_park);
        Ok(item)
    }

    /// Blocking iterator over everything still to come.
    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        std::iter::from_fn(move || self.recv().ok())
    }

    /// `Ready(None)` once the queue is drained and the sender is gone.
    pub fn poll_recv(&self, cx: &mut Context) -> Poll<Option<T>> {
        match self.try_recv() {
            Ok(item) => return Poll::Ready(Some(item)),
            Err(TryRecvError::Disconnected) => return Poll::Ready(None),
            Err(TryRecvError::Empty) => {}
        }

        park_and_wake(&self.task_park, cx.waker().clone());

        // The sender may have pushed before we parked.
        match self.try_recv() {
            Ok(item) => Poll::Ready(Some(item)),
            Err(TryRecvError::Disconnected) => Poll::Ready(None),
            Err(TryRecvError::Empty) => Poll::Pending,
        }
    }

    fn try_recv(&self) -> Result<T, TryRecvError> {
        let item = self.receiver.try_recv()?;
        unpark_and_wake(&self.task_park);
        Ok(item)
    }
}

impl<T> Drop for HandoffSender<T> {
    fn drop(&mut self) {
        die_and_wake(&self.task_park);
    }
}

impl<T> Drop for HandoffReceiver<T> {
    fn drop(&mut self) {
        die_and_wake(&self.task_park);
    }
}
