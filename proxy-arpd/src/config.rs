use crate::errors::{Error, ErrorKind};
use clap::{App, Arg, ArgMatches};
use proxy_arp_packets::MacAddr;
use proxy_arp_runtime::proxy::ProxyIdentity;
use std::ffi::CString;
use tracing::Level;

/// Longest name the kernel accepts for an interface (`IFNAMSIZ` less the terminating NUL).
const MAX_INTERFACE_NAME_LEN: usize = 15;

/// Everything the daemon needs to run, validated before any socket is opened.
#[derive(Clone, Debug)]
pub struct Config {
    pub interface: CString,
    pub identity: ProxyIdentity,
    pub promiscuous: bool,
    pub log_level: Level,
}

pub fn app() -> App<'static, 'static> {
    App::new("proxy-arpd")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Answers ARP requests seen on an interface on behalf of a fixed hardware address")
        .arg(
            Arg::with_name("interface")
                .short("i")
                .long("interface")
                .value_name("IFACE")
                .help("Interface to listen on and reply out of")
                .required(true)
                .takes_value(true),
        )
        .arg(
            Arg::with_name("reply_as")
                .short("m")
                .long("reply-as")
                .value_name("MAC")
                .help("Hardware address every reply claims to come from")
                .required(true)
                .takes_value(true),
        )
        .arg(
            Arg::with_name("bridge_mac")
                .short("b")
                .long("bridge-mac")
                .value_name("MAC")
                .help("Hardware address of the bridge behind the interface (recorded only)")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("promiscuous")
                .short("p")
                .long("promiscuous")
                .help("Put the interface into promiscuous mode while running"),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .multiple(true)
                .help("Log more; repeat for more detail"),
        )
        .arg(
            Arg::with_name("quiet")
                .short("q")
                .long("quiet")
                .conflicts_with("verbose")
                .help("Only log errors"),
        )
}

impl Config {
    pub fn from_matches(matches: &ArgMatches) -> Result<Config, Error> {
        // clap enforces both required arguments before we get here.
        let interface = interface_name(matches.value_of("interface").unwrap_or_default())?;
        let reply_as = parse_mac("reply-as address", matches.value_of("reply_as").unwrap_or_default())?;

        let mut identity = ProxyIdentity::new(reply_as);
        if let Some(bridge) = matches.value_of("bridge_mac") {
            identity = identity.bridge(parse_mac("bridge address", bridge)?);
        }

        Ok(Config {
            interface,
            identity,
            promiscuous: matches.is_present("promiscuous"),
            log_level: log_level(matches.occurrences_of("verbose"), matches.is_present("quiet")),
        })
    }

    /// The interface name for display.
    pub fn interface_name(&self) -> String {
        self.interface.to_string_lossy().into_owned()
    }
}

fn interface_name(name: &str) -> Result<CString, Error> {
    let invalid = || ErrorKind::InvalidConfig {
        field: "interface name",
        value: name.to_string(),
    };
    if name.is_empty() || name.len() > MAX_INTERFACE_NAME_LEN {
        return Err(invalid().into());
    }
    CString::new(name).map_err(|_| invalid().into())
}

fn parse_mac(field: &'static str, value: &str) -> Result<MacAddr, Error> {
    value.parse().map_err(|_| {
        ErrorKind::InvalidConfig {
            field,
            value: value.to_string(),
        }
        .into()
    })
}

fn log_level(verbose: u64, quiet: bool) -> Level {
    if quiet {
        return Level::ERROR;
    }
    match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}
