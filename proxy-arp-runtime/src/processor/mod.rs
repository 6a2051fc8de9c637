mod arp_proxy;
pub use self::arp_proxy::*;

mod strip_decision;
pub use self::strip_decision::*;

pub trait Processor {
    type Input: Send + Clone;
    type Output: Send + Clone;

    fn process(&mut self, packet: Self::Input) -> Option<Self::Output>;
}
