//! Domain layer - Probe results and candidate ranges.
//!
//! These types have no I/O dependencies and can be tested in isolation.

mod allocation;
mod range;

pub use allocation::{Allocation, FreePorts};
pub use range::PortRange;
