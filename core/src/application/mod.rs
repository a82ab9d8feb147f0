//! Application layer - Probe operations.
//!
//! `PortProber` runs the bind-and-release primitive and its batch
//! variants over a `PortBinder`. `AsyncPortProber` exposes the same
//! operations to async callers.

mod async_prober;
mod prober;

pub use async_prober::AsyncPortProber;
pub use prober::PortProber;
