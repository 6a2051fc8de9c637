#![deny(missing_docs)]

use crate::sys;
use libc;
use std::{
    ffi::CStr,
    fmt, io,
    mem::{self, MaybeUninit},
    os::unix::io::{AsRawFd, RawFd},
    ptr,
};

/// Who a received frame was addressed to, as classified by the kernel (`sll_pkttype`).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PacketType {
    /// Addressed to this host.
    Host,
    /// Link-layer broadcast.
    Broadcast,
    /// Link-layer multicast.
    Multicast,
    /// Addressed to some other host, seen because the interface is promiscuous.
    OtherHost,
    /// Sent by this host, looped back to packet sockets.
    Outgoing,
    /// Any value the kernel reports that is not listed above.
    Other(u8),
}

impl From<u8> for PacketType {
    fn from(pkttype: u8) -> Self {
        match pkttype {
            sys::PACKET_HOST => PacketType::Host,
            sys::PACKET_BROADCAST => PacketType::Broadcast,
            sys::PACKET_MULTICAST => PacketType::Multicast,
            sys::PACKET_OTHERHOST => PacketType::OtherHost,
            sys::PACKET_OUTGOING => PacketType::Outgoing,
            other => PacketType::Other(other),
        }
    }
}

/// The link-level address a frame was received from.
#[derive(Copy, Clone)]
pub struct Addr {
    inner: libc::sockaddr_ll,
}

impl Addr {
    /// Index of the interface the frame was seen on.
    pub fn ifindex(&self) -> i32 {
        self.inner.sll_ifindex
    }

    /// The frame's ethertype, in host byte order.
    pub fn protocol(&self) -> u16 {
        u16::from_be(self.inner.sll_protocol)
    }

    /// How the kernel classified the frame.
    pub fn packet_type(&self) -> PacketType {
        PacketType::from(self.inner.sll_pkttype)
    }

    /// True for frames this host transmitted, including our own sends.
    pub fn is_outgoing(&self) -> bool {
        self.packet_type() == PacketType::Outgoing
    }
}

impl fmt::Debug for Addr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Addr")
            .field("ifindex", &self.ifindex())
            .field("protocol", &self.protocol())
            .field("packet_type", &self.packet_type())
            .finish()
    }
}

/// Represents an unbound `AF_PACKET` socket. At this phase of a socket's lifecycle, it can be
/// configured.
pub struct Socket {
    fd: RawFd,
}

/// Represents a bound `AF_PACKET` socket. At this phase of a socket's lifecycle, it can be read
/// from and written to.
pub struct BoundSocket {
    fd: RawFd,
    send_addr: libc::sockaddr_ll,
    promiscuous: bool,
}

impl Socket {
    /// Creates a new unbound socket that sees every ethertype. Needs `CAP_NET_RAW`.
    pub fn new() -> io::Result<Self> {
        // No Rust-owned memory is involved; failure is reported through errno.
        // man 7 packet
        let fd = unsafe {
            libc::socket(
                libc::AF_PACKET,
                libc::SOCK_RAW,
                libc::c_int::from(sys::eth_p_all()),
            )
        };
        if fd < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(Self { fd })
    }

    /// Binds the socket to a network interface. This consumes the `Socket`, since nothing else
    /// may be safely reconfigured after binding.
    pub fn bind(self, iface: impl AsRef<CStr>) -> io::Result<BoundSocket> {
        let ifindex = interface_index(self.fd, iface.as_ref())?;

        // A zeroed sockaddr_ll is a valid value for every field.
        let mut ll: libc::sockaddr_ll = unsafe { MaybeUninit::zeroed().assume_init() };
        ll.sll_family = libc::AF_PACKET as libc::c_ushort;
        ll.sll_protocol = sys::eth_p_all();
        ll.sll_ifindex = ifindex;

        // `ll` outlives the call and its size is passed alongside it.
        let err = unsafe {
            libc::bind(
                self.fd,
                &ll as *const _ as *const libc::sockaddr,
                mem::size_of::<libc::sockaddr_ll>() as libc::socklen_t,
            )
        };
        if err < 0 {
            return Err(io::Error::last_os_error());
        }

        let fd = self.fd;
        // The descriptor now belongs to the BoundSocket; `self` must not close it.
        mem::forget(self);
        Ok(BoundSocket {
            fd,
            send_addr: ll,
            promiscuous: false,
        })
    }

    /// Configures the socket's non-blocking status.
    pub fn set_nonblocking(&mut self, nonblocking: bool) -> io::Result<()> {
        let flags = self.flags()?;
        let new_flags = if nonblocking {
            flags | libc::O_NONBLOCK
        } else {
            flags & !libc::O_NONBLOCK
        };
        // man 2 fcntl
        if unsafe { libc::fcntl(self.fd, libc::F_SETFL, new_flags) } < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }

    /// Returns true if the socket is configured not to block, false otherwise.
    pub fn is_nonblocking(&self) -> io::Result<bool> {
        Ok(self.flags()? & libc::O_NONBLOCK == libc::O_NONBLOCK)
    }

    fn flags(&self) -> io::Result<libc::c_int> {
        let flags = unsafe { libc::fcntl(self.fd, libc::F_GETFL) };
        if flags < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(flags)
    }
}

impl BoundSocket {
    /// Index of the interface this socket is bound to.
    pub fn ifindex(&self) -> i32 {
        self.send_addr.sll_ifindex
    }

    /// Whether this socket currently holds a promiscuous membership on its interface.
    pub fn is_promiscuous(&self) -> bool {
        self.promiscuous
    }

    /// Turns promiscuous mode on or off for the bound interface, so frames addressed to other
    /// hosts are delivered too. The membership is tied to this socket: the kernel releases it
    /// when the socket is closed.
    pub fn set_promiscuous(&mut self, promiscuous: bool) -> io::Result<()> {
        if promiscuous == self.promiscuous {
            return Ok(());
        }

        let mreq = sys::packet_mreq {
            mr_ifindex: self.ifindex(),
            mr_type: sys::PACKET_MR_PROMISC,
            mr_alen: 0,
            mr_address: [0; 8],
        };
        let option = if promiscuous {
            sys::PACKET_ADD_MEMBERSHIP
        } else {
            sys::PACKET_DROP_MEMBERSHIP
        };

        // `mreq` outlives the call and its size is passed alongside it.
        let err = unsafe {
            libc::setsockopt(
                self.fd,
                libc::SOL_PACKET,
                option,
                &mreq as *const _ as *const libc::c_void,
                mem::size_of::<sys::packet_mreq>() as libc::socklen_t,
            )
        };
        if err < 0 {
            return Err(io::Error::last_os_error());
        }
        self.promiscuous = promiscuous;
        Ok(())
    }

    /// Sends a frame out the bound interface. The frame must include its link-layer header.
    pub fn send(&mut self, frame: &[u8]) -> io::Result<usize> {
        // The kernel reads at most `frame.len()` bytes from the borrowed slice.
        let bytes = unsafe {
            libc::sendto(
                self.fd,
                frame.as_ptr() as *const libc::c_void,
                frame.len(),
                0,
                &self.send_addr as *const _ as *const libc::sockaddr,
                mem::size_of::<libc::sockaddr_ll>() as libc::socklen_t,
            )
        };
        if bytes < 0 {
            Err(io::Error::last_os_error())
        } else {
            Ok(bytes as usize)
        }
    }

    /// Receives one frame into `frame`, returning its length and where it came from. Frames
    /// longer than the buffer are truncated.
    pub fn recv(&mut self, frame: &mut [u8]) -> io::Result<(usize, Addr)> {
        let mut addr = MaybeUninit::<libc::sockaddr_ll>::zeroed();
        let mut addrlen = mem::size_of::<libc::sockaddr_ll>() as libc::socklen_t;

        // The kernel writes at most `frame.len()` bytes into the buffer and at most `addrlen`
        // bytes into `addr`.
        let bytes = unsafe {
            libc::recvfrom(
                self.fd,
                frame.as_mut_ptr() as *mut libc::c_void,
                frame.len(),
                0,
                addr.as_mut_ptr() as *mut libc::sockaddr,
                &mut addrlen,
            )
        };
        if bytes < 0 {
            return Err(io::Error::last_os_error());
        }
        // Zero initialised, so valid even if the kernel filled in less than all of it.
        let inner = unsafe { addr.assume_init() };
        Ok((bytes as usize, Addr { inner }))
    }
}

/// Copies `name` into an `ifreq`, refusing names the kernel would truncate.
fn ifreq_for(name: &CStr) -> io::Result<sys::ifreq> {
    let bytes = name.to_bytes_with_nul();
    if bytes.len() > libc::IFNAMSIZ {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("interface name {:?} is longer than {} bytes", name, libc::IFNAMSIZ - 1),
        ));
    }

    // All-zero is a valid ifreq, and the copy stays within both buffers.
    let mut ifr: sys::ifreq = unsafe { MaybeUninit::zeroed().assume_init() };
    unsafe {
        ptr::copy_nonoverlapping(
            bytes.as_ptr() as *const libc::c_char,
            ifr.ifr_name.as_mut_ptr(),
            bytes.len(),
        );
    }
    Ok(ifr)
}

/// Looks up an interface index through `ioctl(SIOCGIFINDEX)` on any open socket.
fn interface_index(fd: RawFd, name: &CStr) -> io::Result<libc::c_int> {
    let mut ifr = ifreq_for(name)?;
    // man 7 netdevice
    if unsafe { libc::ioctl(fd, sys::SIOCGIFINDEX, &mut ifr as *mut sys::ifreq) } < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(unsafe { ifr.ifr_ifru.ifru_ifindex })
}

impl AsRawFd for Socket {
    fn as_raw_fd(&self) -> RawFd {
        self.fd
    }
}

impl AsRawFd for BoundSocket {
    fn as_raw_fd(&self) -> RawFd {
        self.fd
    }
}

#[cfg(feature = "tokio-support")]
impl mio::Evented for BoundSocket {
    fn register(
        &self,
        poll: &mio::Poll,
        token: mio::Token,
        interest: mio::Ready,
        opts: mio::PollOpt,
    ) -> io::Result<()> {
        mio::unix::EventedFd(&self.fd).register(poll, token, interest, opts)
    }

    fn reregister(
        &self,
        poll: &mio::Poll,
        token: mio::Token,
        interest: mio::Ready,
        opts: mio::PollOpt,
    ) -> io::Result<()> {
        mio::unix::EventedFd(&self.fd).reregister(poll, token, interest, opts)
    }

    fn deregister(&self, poll: &mio::Poll) -> io::Result<()> {
        mio::unix::EventedFd(&self.fd).deregister(poll)
    }
}

impl Drop for Socket {
    fn drop(&mut self) {
        unsafe {
            libc::close(self.fd);
        }
    }
}

impl Drop for BoundSocket {
    fn drop(&mut self) {
        unsafe {
            libc::close(self.fd);
        }
    }
}
