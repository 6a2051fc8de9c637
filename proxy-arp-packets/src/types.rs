use std::convert::TryFrom;
use std::error::Error;
use std::fmt;
use std::str::FromStr;

/// Raw bytes of a frame, as they came off (or will go onto) the wire.
pub type PacketData = Vec<u8>;

/// Marker for the typed views over `PacketData` that may travel through a pipeline.
pub trait Packet: Send + Clone {}

pub const IPV4_ETHER_TYPE: u16 = 0x0800;
pub const ARP_ETHER_TYPE: u16 = 0x0806;

/// Length of an Ethernet II header without an 802.1Q tag.
pub const ETHERNET_HEADER_LEN: usize = 14;

/// Length of an ARP header carrying Ethernet hardware and IPv4 protocol addresses.
pub const ARP_HEADER_LEN: usize = 28;

/// Shortest frame that can hold an Ethernet header followed by an Ethernet/IPv4 ARP header.
pub const ARP_FRAME_MIN_LEN: usize = ETHERNET_HEADER_LEN + ARP_HEADER_LEN;

/// A 48 bit IEEE 802 hardware address.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct MacAddr {
    pub bytes: [u8; 6],
}

impl MacAddr {
    pub const fn new(bytes: [u8; 6]) -> MacAddr {
        MacAddr { bytes }
    }

    pub const fn broadcast() -> MacAddr {
        MacAddr { bytes: [0xff; 6] }
    }

    pub fn is_broadcast(&self) -> bool {
        self.bytes == [0xff; 6]
    }

    /// True if the group bit (least significant bit of the first octet) is set.
    /// Broadcast counts as multicast.
    pub fn is_multicast(&self) -> bool {
        self.bytes[0] & 0x01 == 0x01
    }

    pub fn is_unspecified(&self) -> bool {
        self.bytes == [0; 6]
    }
}

impl From<[u8; 6]> for MacAddr {
    fn from(bytes: [u8; 6]) -> Self {
        MacAddr::new(bytes)
    }
}

impl TryFrom<&[u8]> for MacAddr {
    type Error = &'static str;

    fn try_from(slice: &[u8]) -> Result<Self, Self::Error> {
        if slice.len() != 6 {
            return Err("Hardware address must be exactly 6 bytes");
        }
        let mut bytes = [0; 6];
        bytes.copy_from_slice(slice);
        Ok(MacAddr::new(bytes))
    }
}

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = &self.bytes;
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            b[0], b[1], b[2], b[3], b[4], b[5]
        )
    }
}

/// Returned when a string is not six hex octets separated by `:` or `-`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MacAddrParseError {
    input: String,
}

impl fmt::Display for MacAddrParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid hardware address {:?}, expected six hex octets like 1a:fb:32:2c:70:33",
            self.input
        )
    }
}

impl Error for MacAddrParseError {}

impl FromStr for MacAddr {
    type Err = MacAddrParseError;

    /// Accepts `aa:bb:cc:dd:ee:ff` or `aa-bb-cc-dd-ee-ff`, any case. Separators may not be mixed.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || MacAddrParseError {
            input: s.to_string(),
        };

        let separator = if s.contains(':') { ':' } else { '-' };
        let mut bytes = [0; 6];
        let mut octets = s.split(separator);
        for byte in bytes.iter_mut() {
            let octet = octets.next().ok_or_else(err)?;
            if octet.len() != 2 {
                return Err(err());
            }
            *byte = u8::from_str_radix(octet, 16).map_err(|_| err())?;
        }
        if octets.next().is_some() {
            return Err(err());
        }
        Ok(MacAddr::new(bytes))
    }
}
