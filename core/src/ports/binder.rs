//! Socket binder port (interface).

use std::io;
use std::net::SocketAddr;

/// Port for claiming and releasing a local TCP address.
///
/// This trait isolates the OS socket calls so the probe logic can be
/// exercised against a scripted implementation.
pub trait PortBinder: Send + Sync {
    /// A bound, listening socket.
    type Listener;

    /// Bind and listen on `addr`.
    ///
    /// An address already owned by another socket must surface as
    /// `io::ErrorKind::AddrInUse`.
    fn bind(&self, addr: SocketAddr) -> io::Result<Self::Listener>;

    /// Read back the address the listener is actually bound to.
    fn local_addr(&self, listener: &Self::Listener) -> io::Result<SocketAddr>;

    /// Close the listener, reporting any failure to do so.
    fn release(&self, listener: Self::Listener) -> io::Result<()>;
}
