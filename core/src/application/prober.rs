//! Probe-and-release port allocation.

use std::io;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use tracing::{debug, trace};

use crate::adapters::TcpBinder;
use crate::config::ProbeConfig;
use crate::domain::{Allocation, FreePorts, PortRange};
use crate::error::{Error, ReleaseError, Result};
use crate::ports::PortBinder;

/// Upper bound for preallocating a batch report.
const MAX_REPORT_CAPACITY: u64 = 1 << 16;

/// Application service that checks ports by binding and immediately
/// releasing them.
///
/// A successful probe only says the port was free at that instant. Nothing
/// is held after a call returns, so another process can take the port
/// before the caller uses it.
///
/// All candidates of a batch are probed sequentially in input order.
pub struct PortProber<B: PortBinder = TcpBinder> {
    binder: B,
    config: ProbeConfig,
}

impl PortProber<TcpBinder> {
    /// Create a prober on all local interfaces.
    pub fn new() -> Self {
        Self::with_config(ProbeConfig::default())
    }

    pub fn with_config(config: ProbeConfig) -> Self {
        Self::with_binder(TcpBinder::new(), config)
    }
}

impl Default for PortProber<TcpBinder> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: PortBinder> PortProber<B> {
    /// Create a prober with a custom binder (for testing).
    pub fn with_binder(binder: B, config: ProbeConfig) -> Self {
        Self { binder, config }
    }

    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }

    /// Try to allocate a single port.
    ///
    /// Port 0 is passed through to the OS, which picks the port; the
    /// returned allocation carries the concrete number. Values above 65535
    /// fail with a resolution error before any socket is created.
    pub fn allocate_one(&self, port: u64) -> Result<Allocation> {
        let addr: SocketAddr = self
            .config
            .bind_address(port)
            .parse()
            .map_err(|source| Error::Resolution { port, source })?;
        let requested = addr.port();

        let (listener, addr) = match self.bind(addr) {
            Ok(bound) => bound,
            Err(err) if err.kind() == io::ErrorKind::AddrInUse => {
                trace!(port = requested, "Port is busy");
                return Err(Error::PortBusy { port: requested });
            }
            Err(source) => {
                return Err(Error::Bind {
                    port: requested,
                    source,
                });
            }
        };

        let socket = BoundSocket::new(&self.binder, listener);
        let bound = socket.local_addr().and_then(|actual| {
            if actual.is_ipv4() == addr.is_ipv4() {
                Ok(actual.port())
            } else {
                Err(io::Error::other(format!(
                    "bound to {actual}, requested {addr}"
                )))
            }
        });
        let released = socket.release();

        match (bound, released) {
            (Ok(port), Ok(())) => {
                trace!(port = port, "Port is free");
                Ok(Allocation::new(port))
            }
            (Ok(port), Err(source)) => {
                trace!(port = port, error = %source, "Port is free, release failed");
                Ok(Allocation::with_release_error(
                    port,
                    ReleaseError { port, source },
                ))
            }
            (Err(source), Ok(())) => Err(Error::ReadBack {
                port: requested,
                source,
            }),
            (Err(source), Err(release)) => Err(Error::WithRelease {
                primary: Box::new(Error::ReadBack {
                    port: requested,
                    source,
                }),
                release: ReleaseError {
                    port: requested,
                    source: release,
                },
            }),
        }
    }

    /// Probe every port in `from..=to` and return all free ones.
    ///
    /// Busy ports are skipped. Any other failure aborts the whole call and
    /// discards what was found so far.
    pub fn allocate_range(&self, from: u64, to: u64) -> Result<FreePorts> {
        let range = PortRange::new(from, to)?;
        let free = self.collect_free(range, range.len())?;
        debug!(range = %range, free = free.len(), "Probed port range");
        Ok(free)
    }

    /// Return the first port in `from..=to` that is not busy.
    ///
    /// Stops at the first hit. If every candidate is busy the result is a
    /// busy-class error, not an empty success.
    pub fn allocate_range_first_fit(&self, from: u64, to: u64) -> Result<Allocation> {
        let range = PortRange::new(from, to)?;

        for port in range {
            match self.allocate_one(port) {
                Err(err) if err.is_busy() => continue,
                result => return result,
            }
        }

        debug!(range = %range, "No free port in range");
        Err(Error::NoFreePort { from, to })
    }

    /// Probe each candidate in the given order and return the free ones.
    ///
    /// Candidates need not be sorted or contiguous. Duplicates are probed
    /// again each time they appear.
    pub fn allocate_set(&self, ports: &[u64]) -> Result<FreePorts> {
        let free = self.collect_free(ports.iter().copied(), ports.len() as u64)?;
        debug!(candidates = ports.len(), free = free.len(), "Probed port set");
        Ok(free)
    }

    /// Bind `addr`, dropping to IPv4 when a dual-stack wildcard is not
    /// available on this host. Returns the address actually used.
    fn bind(&self, addr: SocketAddr) -> io::Result<(B::Listener, SocketAddr)> {
        match self.binder.bind(addr) {
            Err(err) if addr.is_ipv6() && addr.ip().is_unspecified() && ipv6_unavailable(&err) => {
                trace!(port = addr.port(), error = %err, "IPv6 unavailable, binding IPv4");
                let fallback = SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), addr.port());
                self.binder.bind(fallback).map(|listener| (listener, fallback))
            }
            result => result.map(|listener| (listener, addr)),
        }
    }

    fn collect_free(
        &self,
        candidates: impl IntoIterator<Item = u64>,
        count: u64,
    ) -> Result<FreePorts> {
        let mut free = FreePorts::with_capacity(count.min(MAX_REPORT_CAPACITY) as usize);

        for port in candidates {
            match self.allocate_one(port) {
                Ok(allocation) => free.push(allocation),
                Err(err) if err.is_busy() => continue,
                Err(err) => return Err(err),
            }
        }

        Ok(free)
    }
}

fn ipv6_unavailable(err: &io::Error) -> bool {
    if matches!(
        err.kind(),
        io::ErrorKind::AddrNotAvailable | io::ErrorKind::Unsupported
    ) {
        return true;
    }

    #[cfg(unix)]
    {
        err.raw_os_error() == Some(nix::errno::Errno::EAFNOSUPPORT as i32)
    }
    #[cfg(not(unix))]
    {
        false
    }
}

/// A bound listener that is released on every exit path.
///
/// `release` reports the close outcome; if the guard is dropped without it
/// (unwinding) the listener is still closed and the outcome is lost.
struct BoundSocket<'a, B: PortBinder> {
    binder: &'a B,
    listener: Option<B::Listener>,
}

impl<'a, B: PortBinder> BoundSocket<'a, B> {
    fn new(binder: &'a B, listener: B::Listener) -> Self {
        Self {
            binder,
            listener: Some(listener),
        }
    }

    fn local_addr(&self) -> io::Result<SocketAddr> {
        match &self.listener {
            Some(listener) => self.binder.local_addr(listener),
            None => Err(io::Error::other("probe socket already released")),
        }
    }

    fn release(mut self) -> io::Result<()> {
        match self.listener.take() {
            Some(listener) => self.binder.release(listener),
            None => Ok(()),
        }
    }
}

impl<B: PortBinder> Drop for BoundSocket<'_, B> {
    fn drop(&mut self) {
        if let Some(listener) = self.listener.take() {
            let _ = self.binder.release(listener);
        }
    }
}
