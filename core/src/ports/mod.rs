//! Ports layer - Trait definitions (interfaces).
//!
//! This module defines the interfaces that the application layer uses
//! to interact with the OS. Implementations live in `adapters`.

mod binder;

pub use binder::PortBinder;
