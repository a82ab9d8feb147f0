//! Probe results.

use std::fmt;
use std::ops::Deref;

use crate::error::ReleaseError;

/// A port that was free at the moment of its probe.
///
/// The port is not held: another process may take it before the caller
/// binds it.
#[derive(Debug)]
pub struct Allocation {
    port: u16,
    release_error: Option<ReleaseError>,
}

impl Allocation {
    pub fn new(port: u16) -> Self {
        Self {
            port,
            release_error: None,
        }
    }

    /// Attach a failure to close the probe socket.
    pub fn with_release_error(port: u16, release_error: ReleaseError) -> Self {
        Self {
            port,
            release_error: Some(release_error),
        }
    }

    /// The concrete port. For a request of port 0 this is the OS-assigned one.
    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn release_error(&self) -> Option<&ReleaseError> {
        self.release_error.as_ref()
    }

    /// Whether the probe socket closed cleanly.
    pub fn is_clean(&self) -> bool {
        self.release_error.is_none()
    }

    pub fn into_parts(self) -> (u16, Option<ReleaseError>) {
        (self.port, self.release_error)
    }
}

impl fmt::Display for Allocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.release_error {
            None => write!(f, "{}", self.port),
            Some(err) => write!(f, "{} ({})", self.port, err),
        }
    }
}

/// Ports found free by a batch probe, in input order.
///
/// Each port was verified independently; there is no atomicity across
/// probes. Release failures seen along the way are kept here instead of
/// dropping the ports they belong to.
#[derive(Debug, Default)]
pub struct FreePorts {
    ports: Vec<u16>,
    release_errors: Vec<ReleaseError>,
}

impl FreePorts {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            ports: Vec::with_capacity(capacity),
            release_errors: Vec::new(),
        }
    }

    pub fn push(&mut self, allocation: Allocation) {
        let (port, release_error) = allocation.into_parts();
        self.ports.push(port);
        if let Some(err) = release_error {
            self.release_errors.push(err);
        }
    }

    pub fn ports(&self) -> &[u16] {
        &self.ports
    }

    pub fn release_errors(&self) -> &[ReleaseError] {
        &self.release_errors
    }

    pub fn into_ports(self) -> Vec<u16> {
        self.ports
    }
}

impl Deref for FreePorts {
    type Target = [u16];

    fn deref(&self) -> &Self::Target {
        &self.ports
    }
}

impl From<FreePorts> for Vec<u16> {
    fn from(free: FreePorts) -> Self {
        free.ports
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    fn release_error(port: u16) -> ReleaseError {
        ReleaseError {
            port,
            source: io::Error::other("close failed"),
        }
    }

    #[test]
    fn test_clean_allocation() {
        let alloc = Allocation::new(3000);
        assert_eq!(alloc.port(), 3000);
        assert!(alloc.is_clean());
        assert_eq!(alloc.to_string(), "3000");
    }

    #[test]
    fn test_allocation_keeps_port_with_release_error() {
        let alloc = Allocation::with_release_error(3000, release_error(3000));
        assert_eq!(alloc.port(), 3000);
        assert!(!alloc.is_clean());
        assert!(alloc.to_string().starts_with("3000 ("));
    }

    #[test]
    fn test_free_ports_preserve_order_and_release_errors() {
        let mut free = FreePorts::with_capacity(3);
        free.push(Allocation::new(20001));
        free.push(Allocation::with_release_error(20000, release_error(20000)));
        free.push(Allocation::new(20001));

        assert_eq!(free.ports(), &[20001, 20000, 20001]);
        assert_eq!(free.len(), 3);
        assert_eq!(free.release_errors().len(), 1);
        assert_eq!(free.release_errors()[0].port, 20000);
        assert_eq!(Vec::from(free), vec![20001, 20000, 20001]);
    }

    #[test]
    fn test_empty_free_ports() {
        let free = FreePorts::default();
        assert!(free.is_empty());
        assert!(free.into_ports().is_empty());
    }
}
