use afpacket::AsyncBoundSocket;
use failure::{Fail, ResultExt};
use futures::future::{self, Either};
use proxy_arp_afpacket::{AfPacketInput, AfPacketOutput};
use proxy_arp_runtime::link::LinkBuilder;
use proxy_arp_runtime::utils::runner::{new_runtime, route};
use std::process;
use tracing::{error, info, warn};

mod config;
mod errors;
mod logging;
mod pipeline;

use config::Config;
use errors::{Error, ErrorKind};
use pipeline::ProxyPipeline;

fn main() {
    let matches = config::app().get_matches();
    let config = match Config::from_matches(&matches) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("proxy-arpd: {}", errors::chain(&err));
            process::exit(1);
        }
    };

    if let Err(err) = logging::init(config.log_level) {
        eprintln!("proxy-arpd: could not install logger: {}", err);
    }

    if let Err(err) = run(config) {
        error!("{}", errors::chain(&err));
        process::exit(1);
    }
}

fn run(config: Config) -> Result<(), Error> {
    let mut runtime = new_runtime().context(ErrorKind::Runtime)?;
    runtime.block_on(serve(config))
}

/// Opens the socket, runs the pipeline over it, and returns once the socket stops delivering
/// frames or ctrl-c arrives.
async fn serve(config: Config) -> Result<(), Error> {
    let interface = config.interface_name();

    let mut socket = AsyncBoundSocket::from_interface(&config.interface)
        .context(ErrorKind::Socket(interface.clone()))?;
    if config.promiscuous {
        socket
            .set_promiscuous(true)
            .context(ErrorKind::Socket(interface.clone()))?;
    }

    info!(
        interface = interface.as_str(),
        ifindex = socket.ifindex(),
        reply_as = %config.identity.reply_as(),
        bridge = ?config.identity.bridge_mac(),
        "proxying arp"
    );

    let (send_half, recv_half) = socket.split();
    let pipeline = ProxyPipeline::new().identity(config.identity);
    let routing = route::<_, AfPacketInput, _, AfPacketOutput, _>(
        vec![recv_half],
        vec![send_half],
        pipeline,
    );
    let interrupt = tokio::signal::ctrl_c();
    futures::pin_mut!(routing);
    futures::pin_mut!(interrupt);

    match future::select(routing, interrupt).await {
        Either::Left((Ok(()), _)) => {
            warn!(interface = interface.as_str(), "socket closed, shutting down");
            Ok(())
        }
        Either::Left((Err(join_error), _)) => Err(join_error.into()),
        Either::Right((Ok(()), _)) => {
            info!("interrupted, shutting down");
            Ok(())
        }
        Either::Right((Err(signal_error), _)) => Err(signal_error.context(ErrorKind::Signal).into()),
    }
}
