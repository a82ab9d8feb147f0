//! Adapters layer - OS implementations.
//!
//! This module contains implementations of the port traits defined in `ports`.

pub mod tcp;

// Re-export main types for convenience
pub use tcp::TcpBinder;
