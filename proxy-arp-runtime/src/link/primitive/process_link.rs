use crate::link::{Link, LinkBuilder, PacketStream, ProcessLinkBuilder};
use crate::processor::Processor;
use futures::prelude::*;
use futures::task::{Context, Poll};
use std::pin::Pin;

/// `ProcessLink` processes packets through a user-defined processor.
/// It can not buffer packets, so it only does work when it is called. It must immediately drop
/// or return a transformed packet.
#[derive(Default)]
pub struct ProcessLink<P: Processor> {
    in_stream: Option<PacketStream<P::Input>>,
    processor: Option<P>,
}

/// Although `Link` allows an arbitrary number of ingressors and egressors, `ProcessLink`
/// may only have one ingress and egress stream since it lacks some kind of queue
/// storage.
impl<P: Processor + Send + 'static> LinkBuilder<P::Input, P::Output> for ProcessLink<P> {
    fn new() -> Self {
        ProcessLink {
            in_stream: None,
            processor: None,
        }
    }

    fn ingressors(self, mut in_streams: Vec<PacketStream<P::Input>>) -> Self {
        assert_eq!(
            in_streams.len(),
            1,
            "ProcessLink may only take 1 input stream"
        );

        if self.in_stream.is_some() {
            panic!("ProcessLink may only take 1 input stream")
        }

        ProcessLink {
            in_stream: Some(in_streams.remove(0)),
            processor: self.processor,
        }
    }

    fn ingressor(self, in_stream: PacketStream<P::Input>) -> Self {
        if self.in_stream.is_some() {
            panic!("ProcessLink may only take 1 input stream")
        }

        ProcessLink {
            in_stream: Some(in_stream),
            processor: self.processor,
        }
    }

    fn build_link(self) -> Link<P::Output> {
        match (self.in_stream, self.processor) {
            (None, _) => panic!("Cannot build link! Missing input streams"),
            (_, None) => panic!("Cannot build link! Missing processor"),
            (Some(in_stream), Some(processor)) => (
                vec![],
                vec![Box::new(ProcessRunner::new(in_stream, processor))],
            ),
        }
    }
}

impl<P: Processor + Send + 'static> ProcessLinkBuilder<P> for ProcessLink<P> {
    fn processor(self, processor: P) -> Self {
        ProcessLink {
            in_stream: self.in_stream,
            processor: Some(processor),
        }
    }
}

/// The single egressor of ProcessLink
struct ProcessRunner<P: Processor> {
    in_stream: PacketStream<P::Input>,
    processor: P,
}

impl<P: Processor> ProcessRunner<P> {
    fn new(in_stream: PacketStream<P::Input>, processor: P) -> Self {
        ProcessRunner {
            in_stream,
            processor,
        }
    }
}

impl<P: Processor> Unpin for ProcessRunner<P> {}

impl<P: Processor> Stream for ProcessRunner<P> {
    type Item = P::Output;

    /// 3 cases: `Poll::Ready(Some)`, `Poll::Ready(None)`, `Poll::Pending`
    ///
    /// `Poll::Ready(Some)`: We have a packet ready from the upstream link. It's passed to our
    /// processor, and if the processor keeps it, it is handed downstream.
    ///
    /// `Poll::Ready(None)`: The input stream is exhausted. We return `Poll::Ready(None)` to
    /// propagate teardown to our downstream components.
    ///
    /// `Poll::Pending`: The upstream can't make progress right now and has arranged to be woken;
    /// the `ready!` macro returns `Poll::Pending` on our behalf.
    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context) -> Poll<Option<Self::Item>> {
        loop {
            match ready!(Pin::new(&mut self.in_stream).poll_next(cx)) {
                None => return Poll::Ready(None),
                Some(input_packet) => {
                    // if `processor.process` returns None, do nothing, loop around and try polling again.
                    if let Some(output_packet) = self.processor.process(input_packet) {
                        return Poll::Ready(Some(output_packet));
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processor::{ArpProxy, StripDecision};
    use crate::proxy::{Action, Decision, ProxyIdentity};
    use crate::utils::test::harness::{initialize_runtime, run_link};
    use crate::utils::test::packet_generators::{immediate_stream, PacketIntervalGenerator};
    use core::time;
    use proxy_arp_packets::{ArpFrame, MacAddr};
    use std::net::Ipv4Addr;

    /// Keeps even numbers, drops odd ones.
    struct KeepEven;

    impl Processor for KeepEven {
        type Input = i32;
        type Output = i32;

        fn process(&mut self, packet: i32) -> Option<i32> {
            if packet % 2 == 0 {
                Some(packet)
            } else {
                None
            }
        }
    }

    fn decisions(packets: &[i32]) -> Vec<Decision<i32>> {
        packets
            .iter()
            .map(|&packet| Decision {
                action: Action::Pass,
                packet,
            })
            .collect()
    }

    #[test]
    #[should_panic]
    fn panics_when_built_without_input_streams() {
        ProcessLink::new()
            .processor(StripDecision::<i32>::new())
            .build_link();
    }

    #[test]
    #[should_panic]
    fn panics_when_built_without_processor() {
        ProcessLink::<StripDecision<i32>>::new()
            .ingressor(immediate_stream(vec![]))
            .build_link();
    }

    #[test]
    #[should_panic]
    fn panics_when_given_two_ingressors() {
        ProcessLink::<StripDecision<i32>>::new()
            .ingressors(vec![immediate_stream(vec![]), immediate_stream(vec![])])
            .build_link();
    }

    #[test]
    fn builder_methods_work_in_any_order() {
        ProcessLink::new()
            .ingressor(immediate_stream(decisions(&[])))
            .processor(StripDecision::new())
            .build_link();

        ProcessLink::new()
            .processor(StripDecision::new())
            .ingressor(immediate_stream(decisions(&[])))
            .build_link();
    }

    #[test]
    fn strips_decisions() {
        let packets = vec![42, 60, 14, 1514, 0, 28, 64, 1500, 43, 41];

        let mut runtime = initialize_runtime();
        let results = runtime.block_on(async {
            let link = ProcessLink::new()
                .ingressor(immediate_stream(decisions(&packets)))
                .processor(StripDecision::new())
                .build_link();

            run_link(link).await
        });
        assert_eq!(results[0], packets);
    }

    #[test]
    fn wait_between_packets() {
        let packets = vec![42, 60, 14, 1514, 0, 28, 64, 1500, 43, 41];

        let mut runtime = initialize_runtime();
        let results = runtime.block_on(async {
            let packet_generator = PacketIntervalGenerator::new(
                time::Duration::from_millis(10),
                decisions(&packets).into_iter(),
            );

            let link = ProcessLink::new()
                .ingressor(Box::new(packet_generator))
                .processor(StripDecision::new())
                .build_link();

            run_link(link).await
        });
        assert_eq!(results[0], packets);
    }

    #[test]
    fn dropped_packets_do_not_end_the_stream() {
        let mut runtime = initialize_runtime();
        let results = runtime.block_on(async {
            let link = ProcessLink::new()
                .ingressor(immediate_stream(vec![1, 3, 4, 5, 7, 8, 9]))
                .processor(KeepEven)
                .build_link();

            run_link(link).await
        });
        assert_eq!(results[0], vec![4, 8]);
    }

    #[test]
    fn arp_proxy_decides_every_frame() {
        let request = ArpFrame::request(
            MacAddr::new([0xaa; 6]),
            Ipv4Addr::new(10, 0, 0, 1),
            Ipv4Addr::new(10, 0, 0, 2),
        )
        .frame()
        .data;
        let frames = vec![request, vec![0; 64], vec![]];

        let mut runtime = initialize_runtime();
        let results = runtime.block_on(async {
            let link = ProcessLink::new()
                .ingressor(immediate_stream(frames))
                .processor(ArpProxy::new(ProxyIdentity::new(MacAddr::new([
                    0x1a, 0xfb, 0x32, 0x2c, 0x70, 0x33,
                ]))))
                .build_link();

            run_link(link).await
        });

        let actions: Vec<Action> = results[0].iter().map(|d| d.action).collect();
        assert_eq!(
            actions,
            vec![Action::RedirectAndDrop, Action::Pass, Action::Pass]
        );
    }
}
