//! PortProbe Core Library
//!
//! Finds TCP ports that are free on the local host by binding each
//! candidate and releasing it straight away. Intended for test harnesses
//! and service bootstrap code that need a concrete port number before
//! starting a listener elsewhere.
//!
//! Provides:
//! - Single-port probes, including OS-assigned ports via port 0
//! - Range probes: collect every free port, or stop at the first one
//! - Probes over an explicit list of candidates
//!
//! A returned port is not reserved. Between the probe and the caller's own
//! bind another process may take it; there is no portable way around that
//! short of holding the socket open.
//!
//! # Architecture
//! - `domain`: Probe results and candidate ranges
//! - `ports`: Trait definitions (interfaces)
//! - `adapters`: OS socket implementations
//! - `application`: Probe operations
//!
//! # Example
//! ```no_run
//! use portprobe_core::{allocate_range_first_fit, ErrorKind};
//!
//! match allocate_range_first_fit(20000, 20100) {
//!     Ok(alloc) => println!("use port {}", alloc.port()),
//!     Err(err) if err.kind() == ErrorKind::PortBusy => println!("range exhausted"),
//!     Err(err) => eprintln!("probe failed: {err}"),
//! }
//! ```

pub mod adapters;
pub mod application;
pub mod domain;
pub mod ports;

pub mod config;
pub mod error;

// Re-export main types
pub use adapters::TcpBinder;
pub use application::{AsyncPortProber, PortProber};
pub use config::ProbeConfig;
pub use domain::{Allocation, FreePorts, PortRange};
pub use error::{Error, ErrorKind, ReleaseError, Result};
pub use ports::PortBinder;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Try to allocate `port` on all local interfaces.
pub fn allocate_one(port: u64) -> Result<Allocation> {
    PortProber::new().allocate_one(port)
}

/// Collect every free port in `from..=to`.
pub fn allocate_range(from: u64, to: u64) -> Result<FreePorts> {
    PortProber::new().allocate_range(from, to)
}

/// Return the first free port in `from..=to`.
pub fn allocate_range_first_fit(from: u64, to: u64) -> Result<Allocation> {
    PortProber::new().allocate_range_first_fit(from, to)
}

/// Collect the free ports among `ports`, in input order.
pub fn allocate_set(ports: &[u64]) -> Result<FreePorts> {
    PortProber::new().allocate_set(ports)
}
