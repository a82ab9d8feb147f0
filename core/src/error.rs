//! Error types for the portprobe-core library.

use std::io;
use std::net::AddrParseError;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for probe operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Closed set of failure classes.
///
/// Callers branch on this instead of matching message strings: `PortBusy`
/// means "try another candidate", everything else means "stop".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    /// `from > to` in a range call.
    InvalidRange,
    /// The candidate could not be turned into a bind address.
    Resolution,
    /// The OS reported the address already in use.
    PortBusy,
    /// Any other failure to bind, listen or read back the address.
    Bind,
    /// Closing the probe socket failed.
    Release,
    /// Loading configuration failed.
    Config,
}

/// Closing a probe socket failed after the port was already known.
///
/// Never replaces an allocation result; it rides along with it.
#[derive(Error, Debug)]
#[error("failed to release probe socket on port {port}: {source}")]
pub struct ReleaseError {
    pub port: u16,
    #[source]
    pub source: io::Error,
}

/// Errors that can occur while probing ports.
#[derive(Error, Debug)]
pub enum Error {
    /// Range bounds are inverted.
    #[error("invalid port range: to ({to}) can't be lower than from ({from})")]
    InvalidRange { from: u64, to: u64 },

    /// Port value rejected by the address parser.
    #[error("failed to resolve TCP address for port {port}: {source}")]
    Resolution {
        port: u64,
        #[source]
        source: AddrParseError,
    },

    /// Port is already bound by another socket.
    #[error("port {port} is busy")]
    PortBusy { port: u16 },

    /// Every candidate of a first-fit range was busy.
    #[error("no free port in range {from}..={to}")]
    NoFreePort { from: u64, to: u64 },

    /// Bind or listen failed for a reason other than address-in-use.
    #[error("failed to allocate TCP port {port}: {source}")]
    Bind {
        port: u16,
        #[source]
        source: io::Error,
    },

    /// The bound address could not be read back or had the wrong family.
    #[error("failed to interpret bound address for port {port}: {source}")]
    ReadBack {
        port: u16,
        #[source]
        source: io::Error,
    },

    /// A primary failure whose probe socket also failed to close.
    #[error("{primary} (additionally: {release})")]
    WithRelease {
        primary: Box<Error>,
        release: ReleaseError,
    },

    /// The blocking probe task did not run to completion.
    #[error("probe task aborted: {0}")]
    Aborted(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidRange { .. } => ErrorKind::InvalidRange,
            Error::Resolution { .. } => ErrorKind::Resolution,
            Error::PortBusy { .. } | Error::NoFreePort { .. } => ErrorKind::PortBusy,
            Error::Bind { .. } | Error::ReadBack { .. } | Error::Aborted(_) => ErrorKind::Bind,
            Error::WithRelease { primary, .. } => primary.kind(),
            Error::Io(_) | Error::Json(_) | Error::Config(_) => ErrorKind::Config,
        }
    }

    /// Whether this is the one recoverable condition.
    pub fn is_busy(&self) -> bool {
        self.kind() == ErrorKind::PortBusy
    }

    /// The release failure carried alongside the primary error, if any.
    pub fn release_error(&self) -> Option<&ReleaseError> {
        match self {
            Error::WithRelease { release, .. } => Some(release),
            _ => None,
        }
    }
}

impl ReleaseError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Release
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_error() -> AddrParseError {
        "0.0.0.0:100000"
            .parse::<std::net::SocketAddr>()
            .unwrap_err()
    }

    #[test]
    fn test_kind_classification() {
        assert_eq!(
            Error::InvalidRange { from: 2, to: 1 }.kind(),
            ErrorKind::InvalidRange
        );
        assert_eq!(
            Error::Resolution {
                port: 100_000,
                source: parse_error()
            }
            .kind(),
            ErrorKind::Resolution
        );
        assert_eq!(Error::PortBusy { port: 80 }.kind(), ErrorKind::PortBusy);
        assert_eq!(
            Error::NoFreePort { from: 1, to: 2 }.kind(),
            ErrorKind::PortBusy
        );
        assert_eq!(
            Error::ReadBack {
                port: 80,
                source: io::Error::other("family")
            }
            .kind(),
            ErrorKind::Bind
        );
        assert_eq!(Error::Config("bad".into()).kind(), ErrorKind::Config);
    }

    #[test]
    fn test_with_release_keeps_primary_kind() {
        let err = Error::WithRelease {
            primary: Box::new(Error::ReadBack {
                port: 8080,
                source: io::Error::other("family"),
            }),
            release: ReleaseError {
                port: 8080,
                source: io::Error::other("close"),
            },
        };

        assert_eq!(err.kind(), ErrorKind::Bind);
        assert!(!err.is_busy());
        assert_eq!(err.release_error().map(|r| r.port), Some(8080));

        let msg = err.to_string();
        assert!(msg.contains("failed to interpret bound address"));
        assert!(msg.contains("failed to release probe socket"));
    }

    #[test]
    fn test_display() {
        assert_eq!(
            Error::InvalidRange { from: 10, to: 5 }.to_string(),
            "invalid port range: to (5) can't be lower than from (10)"
        );
        assert_eq!(Error::PortBusy { port: 3000 }.to_string(), "port 3000 is busy");
    }

    #[test]
    fn test_kind_serializes_camel_case() {
        let json = serde_json::to_string(&ErrorKind::PortBusy).unwrap();
        assert_eq!(json, "\"portBusy\"");
    }
}
