use crate::processor::Processor;
use crate::proxy::Decision;
use std::marker::PhantomData;

/// Processor that forgets the decision attached to a packet and passes the packet on.
/// Placed after a classifier has already routed on the decision.
#[derive(Default)]
pub struct StripDecision<P: Send + Clone> {
    phantom: PhantomData<P>,
}

impl<P: Send + Clone> StripDecision<P> {
    pub fn new() -> StripDecision<P> {
        StripDecision {
            phantom: PhantomData,
        }
    }
}

impl<P: Send + Clone> Processor for StripDecision<P> {
    type Input = Decision<P>;
    type Output = P;

    fn process(&mut self, decision: Self::Input) -> Option<Self::Output> {
        Some(decision.packet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proxy::Action;

    #[test]
    fn yields_the_packet() {
        let mut strip = StripDecision::new();
        let decision = Decision {
            action: Action::RedirectAndDrop,
            packet: vec![1u8, 2, 3],
        };
        assert_eq!(strip.process(decision), Some(vec![1, 2, 3]));
    }
}
