use crate::classifier::Classifier;
use crate::link::utils::task_park::*;
use crate::link::{primitive::QueueEgressor, Link, LinkBuilder, PacketStream};
use crossbeam::atomic::AtomicCell;
use crossbeam::crossbeam_channel;
use crossbeam::crossbeam_channel::{Receiver, Sender};
use futures::prelude::*;
use futures::task::{Context, Poll};
use std::pin::Pin;
use std::sync::Arc;

type Dispatcher<Class> = Box<dyn Fn(Class) -> usize + Send + Sync + 'static>;

/// Fans one input stream out to `num_egressors` queues. Each packet is classified, the
/// dispatcher turns its class into a port, and the packet is enqueued on that port's egressor.
pub struct ClassifyLink<C: Classifier> {
    in_stream: Option<PacketStream<C::Packet>>,
    classifier: Option<C>,
    dispatcher: Option<Dispatcher<C::Class>>,
    queue_capacity: usize,
    num_egressors: Option<usize>,
}

impl<C: Classifier> ClassifyLink<C> {
    pub fn classifier(self, classifier: C) -> Self {
        ClassifyLink {
            classifier: Some(classifier),
            ..self
        }
    }

    pub fn dispatcher(self, dispatcher: Dispatcher<C::Class>) -> Self {
        ClassifyLink {
            dispatcher: Some(dispatcher),
            ..self
        }
    }

    /// Changes queue_capacity, default value is 10.
    pub fn queue_capacity(self, queue_capacity: usize) -> Self {
        assert!(
            queue_capacity > 0,
            "Queue capacity: {}, must be > 0",
            queue_capacity
        );
        ClassifyLink {
            queue_capacity,
            ..self
        }
    }

    pub fn num_egressors(self, num_egressors: usize) -> Self {
        assert!(
            num_egressors > 0,
            "num_egressors: {}, must be > 0",
            num_egressors
        );
        ClassifyLink {
            num_egressors: Some(num_egressors),
            ..self
        }
    }
}

impl<C: Classifier + Send + 'static> LinkBuilder<C::Packet, C::Packet> for ClassifyLink<C> {
    fn new() -> Self {
        ClassifyLink {
            in_stream: None,
            classifier: None,
            dispatcher: None,
            queue_capacity: 10,
            num_egressors: None,
        }
    }

    fn ingressors(self, mut in_streams: Vec<PacketStream<C::Packet>>) -> Self {
        assert_eq!(
            in_streams.len(),
            1,
            "ClassifyLink may only take 1 input stream"
        );

        if self.in_stream.is_some() {
            panic!("ClassifyLink may only take 1 input stream")
        }

        ClassifyLink {
            in_stream: Some(in_streams.remove(0)),
            ..self
        }
    }

    fn ingressor(self, in_stream: PacketStream<C::Packet>) -> Self {
        if self.in_stream.is_some() {
            panic!("ClassifyLink may only take 1 input stream")
        }

        ClassifyLink {
            in_stream: Some(in_stream),
            ..self
        }
    }

    fn build_link(self) -> Link<C::Packet> {
        match (
            self.in_stream,
            self.classifier,
            self.dispatcher,
            self.num_egressors,
        ) {
            (None, _, _, _) => panic!("Cannot build link! Missing input streams"),
            (_, None, _, _) => panic!("Cannot build link! Missing classifier"),
            (_, _, None, _) => panic!("Cannot build link! Missing dispatcher"),
            (_, _, _, None) => panic!("Cannot build link! Missing num_egressors"),
            (Some(in_stream), Some(classifier), Some(dispatcher), Some(num_egressors)) => {
                let mut to_egressors: Vec<Sender<Option<C::Packet>>> = Vec::new();
                let mut egressors: Vec<PacketStream<C::Packet>> = Vec::new();
                let mut task_parks: Vec<Arc<AtomicCell<TaskParkState>>> = Vec::new();

                for _ in 0..num_egressors {
                    let (to_egressor, from_ingressor): (_, Receiver<Option<C::Packet>>) =
                        crossbeam_channel::bounded(self.queue_capacity);
                    let task_park = Arc::new(AtomicCell::new(TaskParkState::Empty));

                    let egressor = QueueEgressor::new(from_ingressor, Arc::clone(&task_park));

                    to_egressors.push(to_egressor);
                    egressors.push(Box::new(egressor));
                    task_parks.push(task_park);
                }

                let ingressor =
                    ClassifyIngressor::new(in_stream, dispatcher, to_egressors, classifier, task_parks);
                (vec![Box::new(ingressor)], egressors)
            }
        }
    }
}

/// Drives a `ClassifyLink`: pulls from the input stream and pushes each packet onto the queue
/// of the port it was dispatched to. Handed to, and polled by, the runtime.
pub struct ClassifyIngressor<C: Classifier> {
    input_stream: PacketStream<C::Packet>,
    dispatcher: Dispatcher<C::Class>,
    to_egressors: Vec<Sender<Option<C::Packet>>>,
    classifier: C,
    task_parks: Vec<Arc<AtomicCell<TaskParkState>>>,
}

impl<C: Classifier> Unpin for ClassifyIngressor<C> {}

impl<C: Classifier> ClassifyIngressor<C> {
    fn new(
        input_stream: PacketStream<C::Packet>,
        dispatcher: Dispatcher<C::Class>,
        to_egressors: Vec<Sender<Option<C::Packet>>>,
        classifier: C,
        task_parks: Vec<Arc<AtomicCell<TaskParkState>>>,
    ) -> Self {
        ClassifyIngressor {
            input_stream,
            dispatcher,
            to_egressors,
            classifier,
            task_parks,
        }
    }
}

impl<C: Classifier> Future for ClassifyIngressor<C> {
    type Output = ();

    /// If any of the egress queues is full we park on that queue before taking another packet,
    /// since there is nowhere to put it if it happens to dispatch there.
    ///
    /// When the input stream ends, every egressor is sent a `None` and woken, which propagates
    /// teardown down each branch.
    fn poll(self: Pin<&mut Self>, cx: &mut Context) -> Poll<Self::Output> {
        let ingressor = Pin::into_inner(self);
        loop {
            for (port, to_egressor) in ingressor.to_egressors.iter().enumerate() {
                if to_egressor.is_full() {
                    park_and_wake(&ingressor.task_parks[port], cx.waker().clone());
                    return Poll::Pending;
                }
            }

            match ready!(Pin::new(&mut ingressor.input_stream).poll_next(cx)) {
                None => {
                    for to_egressor in ingressor.to_egressors.iter() {
                        // A disconnected egressor has already torn down; nothing to tell it.
                        let _ = to_egressor.try_send(None);
                    }
                    for task_park in ingressor.task_parks.iter() {
                        die_and_wake(&task_park);
                    }
                    return Poll::Ready(());
                }
                Some(packet) => {
                    let class = ingressor.classifier.classify(&packet);
                    let port = (ingressor.dispatcher)(class);
                    if port >= ingressor.to_egressors.len() {
                        panic!("Tried to access invalid port: {}", port);
                    }
                    if let Err(err) = ingressor.to_egressors[port].try_send(Some(packet)) {
                        panic!(
                            "Error in to_egressors[{}] sender, have nowhere to put packet: {:?}",
                            port, err
                        );
                    }
                    unpark_and_wake(&ingressor.task_parks[port]);
                }
            }
        }
    }
}
