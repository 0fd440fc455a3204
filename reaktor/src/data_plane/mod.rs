//! Data plane: per-destination stream multiplexing and flow control.

mod target;

pub use target::{Target, ThrottleHandler};
