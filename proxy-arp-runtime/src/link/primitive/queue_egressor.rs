use crate::link::utils::task_park::*;
use crossbeam::atomic::AtomicCell;
use crossbeam::crossbeam_channel::{Receiver, TryRecvError};
use futures::prelude::*;
use futures::task::{Context, Poll};
use std::pin::Pin;
use std::sync::Arc;

/// Turns the receiving end of a link's internal queue back into a `Stream`.
///
/// The ingressor on the other side sends `Some(packet)` for every packet and a single `None`
/// when it is done. Both sides share a task park so whichever one is waiting on the other can
/// be woken.
pub struct QueueEgressor<Packet: Sized> {
    from_ingressor: Receiver<Option<Packet>>,
    task_park: Arc<AtomicCell<TaskParkState>>,
}

impl<Packet: Sized> QueueEgressor<Packet> {
    pub fn new(
        from_ingressor: Receiver<Option<Packet>>,
        task_park: Arc<AtomicCell<TaskParkState>>,
    ) -> Self {
        QueueEgressor {
            from_ingressor,
            task_park,
        }
    }
}

impl<Packet: Sized> Unpin for QueueEgressor<Packet> {}

impl<Packet: Sized> Stream for QueueEgressor<Packet> {
    type Item = Packet;

    /// `Ok(Some(packet))`: hand the packet downstream and wake the ingressor in case it parked
    /// on a full queue.
    ///
    /// `Ok(None)`: the ingressor is tearing down. Mark the park dead and end the stream.
    ///
    /// `Err(Empty)`: park ourselves until the ingressor has more work for us.
    ///
    /// `Err(Disconnected)`: the ingressor dropped its sender, end the stream.
    fn poll_next(self: Pin<&mut Self>, cx: &mut Context) -> Poll<Option<Self::Item>> {
        match self.from_ingressor.try_recv() {
            Ok(Some(packet)) => {
                unpark_and_wake(&self.task_park);
                Poll::Ready(Some(packet))
            }
            Ok(None) => {
                die_and_wake(&self.task_park);
                Poll::Ready(None)
            }
            Err(TryRecvError::Empty) => {
                park_and_wake(&self.task_park, cx.waker().clone());
                Poll::Pending
            }
            Err(TryRecvError::Disconnected) => Poll::Ready(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::test::harness::initialize_runtime;
    use crossbeam::crossbeam_channel;

    #[test]
    fn drains_until_none() {
        let (send, recv) = crossbeam_channel::unbounded();
        let park = Arc::new(AtomicCell::new(TaskParkState::Empty));
        let egressor = QueueEgressor::new(recv, Arc::clone(&park));

        for packet in vec![Some(1), Some(2), None, Some(3)] {
            send.send(packet).unwrap();
        }

        let mut runtime = initialize_runtime();
        let collected: Vec<i32> = runtime.block_on(egressor.collect());
        assert_eq!(collected, vec![1, 2]);
    }

    #[test]
    fn ends_when_sender_disconnects() {
        let (send, recv) = crossbeam_channel::unbounded::<Option<i32>>();
        let park = Arc::new(AtomicCell::new(TaskParkState::Empty));
        let egressor = QueueEgressor::new(recv, park);

        send.send(Some(7)).unwrap();
        drop(send);

        let mut runtime = initialize_runtime();
        let collected: Vec<i32> = runtime.block_on(egressor.collect());
        assert_eq!(collected, vec![7]);
    }
}
