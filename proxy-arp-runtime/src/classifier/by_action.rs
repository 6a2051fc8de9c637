use crate::classifier::Classifier;
use crate::link::{primitive::ClassifyLink, Link, LinkBuilder, PacketStream};
use crate::proxy::{Action, Decision};
use std::marker::PhantomData;

/// Sorts decided packets by the action that was decided for them.
#[derive(Default)]
pub struct ByAction<P> {
    phantom: PhantomData<P>,
}

impl<P> ByAction<P> {
    pub fn new() -> Self {
        ByAction {
            phantom: PhantomData,
        }
    }
}

impl<P: Send + Clone> Classifier for ByAction<P> {
    type Packet = Decision<P>;
    type Class = Action;

    fn classify(&self, packet: &Self::Packet) -> Self::Class {
        packet.action
    }
}

pub const REDIRECT_PORT: usize = 0;
pub const PASS_PORT: usize = 1;
pub const DROP_PORT: usize = 2;

/// Splits a stream of decisions three ways.
///
/// Outputs:
/// Port 0: RedirectAndDrop
/// Port 1: Pass
/// Port 2: Drop
pub fn action_link<P: Send + Clone + 'static>(stream: PacketStream<Decision<P>>) -> Link<Decision<P>> {
    ClassifyLink::new()
        .ingressor(stream)
        .num_egressors(3)
        .classifier(ByAction::new())
        .dispatcher(Box::new(|action| match action {
            Action::RedirectAndDrop => REDIRECT_PORT,
            Action::Pass => PASS_PORT,
            Action::Drop => DROP_PORT,
        }))
        .build_link()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::test::harness::{initialize_runtime, run_link};
    use crate::utils::test::packet_generators::immediate_stream;

    fn decided(action: Action, packet: u32) -> Decision<u32> {
        Decision { action, packet }
    }

    #[test]
    fn classifies_by_action() {
        let classifier = ByAction::new();
        assert_eq!(
            classifier.classify(&decided(Action::Pass, 1)),
            Action::Pass
        );
        assert_eq!(
            classifier.classify(&decided(Action::RedirectAndDrop, 1)),
            Action::RedirectAndDrop
        );
    }

    #[test]
    fn action_link_routes_each_action_to_its_port() {
        let packets = vec![
            decided(Action::Pass, 0),
            decided(Action::RedirectAndDrop, 1),
            decided(Action::Drop, 2),
            decided(Action::RedirectAndDrop, 3),
            decided(Action::Pass, 4),
        ];

        let mut runtime = initialize_runtime();
        let results = runtime.block_on(async {
            run_link(action_link(immediate_stream(packets))).await
        });

        let ports: Vec<Vec<u32>> = results
            .into_iter()
            .map(|port| port.into_iter().map(|d| d.packet).collect())
            .collect();
        assert_eq!(ports[REDIRECT_PORT], vec![1, 3]);
        assert_eq!(ports[PASS_PORT], vec![0, 4]);
        assert_eq!(ports[DROP_PORT], vec![2]);
    }
}
