use crate::link::{EgressLinkBuilder, IngressLinkBuilder, Link, LinkBuilder};
use std::io;
use tokio::runtime::{self, Runtime};
use tokio::task::{JoinError, JoinHandle};

/// The runtime every pipeline runs on: tokio's threaded scheduler with IO and timers enabled.
///
/// Anything that registers with the reactor, such as an `AF_PACKET` socket, has to be created
/// from inside this runtime (i.e. within `block_on`).
pub fn new_runtime() -> io::Result<Runtime> {
    runtime::Builder::new()
        .threaded_scheduler()
        .enable_all()
        .build()
}

/// Assembles ingress links from `ingress_receivers`, feeds all of their egressors into `router`,
/// attaches one egress link per router egressor, and runs every resulting task to completion.
///
/// Router egressors and `egress_senders` are paired in order. The router in a production
/// pipeline is expected to be self contained, so when the ingress ends the whole thing winds
/// down and this future resolves.
pub async fn route<
    IngressPacket,
    IngressLink: IngressLinkBuilder<IngressPacket>,
    EgressPacket,
    EgressLink: EgressLinkBuilder<EgressPacket>,
    Router: LinkBuilder<IngressPacket, EgressPacket>,
>(
    ingress_receivers: Vec<IngressLink::Receiver>,
    egress_senders: Vec<EgressLink::Sender>,
    router: Router,
) -> Result<(), JoinError> {
    let mut all_runnables = vec![];
    let mut ingress_egressors = vec![];
    for receiver in ingress_receivers {
        let (mut runnables, mut egressors) = IngressLink::new().channel(receiver).build_link();
        all_runnables.append(&mut runnables);
        ingress_egressors.append(&mut egressors);
    }

    let (mut router_runnables, router_egressors) =
        router.ingressors(ingress_egressors).build_link();
    all_runnables.append(&mut router_runnables);

    for (egressor, sender) in router_egressors.into_iter().zip(egress_senders) {
        // Egress links have no egressors of their own.
        let (mut runnables, _): Link<()> = EgressLink::new()
            .ingressor(egressor)
            .channel(sender)
            .build_link();
        all_runnables.append(&mut runnables);
    }

    let handles: Vec<JoinHandle<()>> = all_runnables.into_iter().map(tokio::spawn).collect();
    for handle in handles {
        handle.await?;
    }
    Ok(())
}

/// Blocking form of `route` on a fresh runtime. Only suitable for ingress and egress halves
/// that do not need the runtime to exist before they are created, such as channels.
pub fn build_and_run_router<
    IngressPacket,
    IngressLink: IngressLinkBuilder<IngressPacket>,
    EgressPacket,
    EgressLink: EgressLinkBuilder<EgressPacket>,
    Router: LinkBuilder<IngressPacket, EgressPacket>,
>(
    ingress_receivers: Vec<IngressLink::Receiver>,
    egress_senders: Vec<EgressLink::Sender>,
    router: Router,
) -> io::Result<()> {
    let mut runtime = new_runtime()?;
    runtime
        .block_on(route::<_, IngressLink, _, EgressLink, _>(
            ingress_receivers,
            egress_senders,
            router,
        ))
        .map_err(|err| io::Error::new(io::ErrorKind::Other, err.to_string()))
}
