//! Kernel definitions from `<linux/if.h>` and `<linux/if_packet.h>` that libc does not expose
//! consistently across versions.
#![allow(non_camel_case_types)]

use libc;

pub(crate) const SIOCGIFINDEX: libc::c_ulong = 0x8933;

pub(crate) const PACKET_ADD_MEMBERSHIP: libc::c_int = 1;
pub(crate) const PACKET_DROP_MEMBERSHIP: libc::c_int = 2;
pub(crate) const PACKET_MR_PROMISC: libc::c_ushort = 1;

pub(crate) const PACKET_HOST: libc::c_uchar = 0;
pub(crate) const PACKET_BROADCAST: libc::c_uchar = 1;
pub(crate) const PACKET_MULTICAST: libc::c_uchar = 2;
pub(crate) const PACKET_OTHERHOST: libc::c_uchar = 3;
pub(crate) const PACKET_OUTGOING: libc::c_uchar = 4;

/// `ETH_P_ALL` in network byte order, as both `socket(2)` and `sockaddr_ll` want it.
pub(crate) fn eth_p_all() -> libc::c_ushort {
    (libc::ETH_P_ALL as libc::c_ushort).to_be()
}

/// `struct ifreq`, trimmed to the members we use. The union is padded to its kernel size so
/// `ioctl` never writes past the end.
#[repr(C)]
pub(crate) struct ifreq {
    pub(crate) ifr_name: [libc::c_char; libc::IFNAMSIZ],
    pub(crate) ifr_ifru: ifreq_data,
}

#[repr(C)]
pub(crate) union ifreq_data {
    pub(crate) ifru_ifindex: libc::c_int,
    _pad: [u8; 24],
}

/// `struct packet_mreq`
#[repr(C)]
pub(crate) struct packet_mreq {
    pub(crate) mr_ifindex: libc::c_int,
    pub(crate) mr_type: libc::c_ushort,
    pub(crate) mr_alen: libc::c_ushort,
    pub(crate) mr_address: [libc::c_uchar; 8],
}
