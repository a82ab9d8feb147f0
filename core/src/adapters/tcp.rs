//! TCP binder backed by `std::net::TcpListener`.

use std::io;
use std::net::{SocketAddr, TcpListener};

use crate::ports::PortBinder;

/// Binds real TCP listeners on the local host.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpBinder;

impl TcpBinder {
    pub fn new() -> Self {
        Self
    }
}

impl PortBinder for TcpBinder {
    type Listener = TcpListener;

    fn bind(&self, addr: SocketAddr) -> io::Result<TcpListener> {
        TcpListener::bind(addr)
    }

    fn local_addr(&self, listener: &TcpListener) -> io::Result<SocketAddr> {
        listener.local_addr()
    }

    #[cfg(unix)]
    fn release(&self, listener: TcpListener) -> io::Result<()> {
        use std::os::fd::IntoRawFd;

        // Dropping would swallow a close(2) failure.
        let fd = listener.into_raw_fd();
        nix::unistd::close(fd).map_err(io::Error::from)
    }

    #[cfg(not(unix))]
    fn release(&self, listener: TcpListener) -> io::Result<()> {
        drop(listener);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{Ipv4Addr, SocketAddrV4};

    fn any_port() -> SocketAddr {
        SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 0))
    }

    #[test]
    fn test_bind_reads_back_assigned_port() {
        let binder = TcpBinder::new();
        let listener = binder.bind(any_port()).unwrap();
        let addr = binder.local_addr(&listener).unwrap();

        assert!(addr.is_ipv4());
        assert_ne!(addr.port(), 0);
        binder.release(listener).unwrap();
    }

    #[test]
    fn test_bind_held_port_is_addr_in_use() {
        let binder = TcpBinder::new();
        let holder = TcpListener::bind(any_port()).unwrap();
        let port = holder.local_addr().unwrap().port();

        let err = binder
            .bind(SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, port)))
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AddrInUse);
    }

    #[test]
    fn test_release_frees_port() {
        let binder = TcpBinder::new();
        let listener = binder.bind(any_port()).unwrap();
        let addr = binder.local_addr(&listener).unwrap();
        binder.release(listener).unwrap();

        let again = binder.bind(addr).unwrap();
        binder.release(again).unwrap();
    }
}
