//! Frame data model and wire codec for both planes.

pub mod codec;
pub mod control;
pub mod stream;
