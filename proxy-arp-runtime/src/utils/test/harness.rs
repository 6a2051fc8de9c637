use crate::link::{Link, TokioRunnable};
use crate::utils::test::packet_collectors::ExhaustiveCollector;
use crossbeam::crossbeam_channel;
use std::fmt::Debug;
use tokio::runtime;

/// Tests for links follow a "Given, When, Then" shape. The input streams are the given, the
/// link configuration is the when, and what the collectors saw once the input is exhausted is
/// the then.
///
/// `run_link` takes a connected link, spawns its runnables plus one collector per egressor onto
/// the current runtime, and returns the packets each egressor produced, in egressor order.
pub async fn run_link<OutputPacket: Debug + Send + Clone + 'static>(
    link: Link<OutputPacket>,
) -> Vec<Vec<OutputPacket>> {
    let (mut runnables, egressors) = link;

    let (mut consumers, receivers): (
        Vec<TokioRunnable>,
        Vec<crossbeam_channel::Receiver<OutputPacket>>,
    ) = egressors
        .into_iter()
        .enumerate()
        .map(|(id, egressor)| {
            let (s, r) = crossbeam_channel::unbounded::<OutputPacket>();
            let consumer: TokioRunnable = Box::new(ExhaustiveCollector::new(id, egressor, s));
            (consumer, r)
        })
        .unzip();

    runnables.append(&mut consumers);

    let handles: Vec<_> = runnables.into_iter().map(tokio::spawn).collect();
    for handle in handles {
        handle.await.unwrap();
    }

    receivers
        .into_iter()
        .map(|receiver| receiver.iter().collect())
        .collect()
}

pub fn initialize_runtime() -> runtime::Runtime {
    runtime::Builder::new()
        .threaded_scheduler()
        .enable_all()
        .build()
        .unwrap()
}
