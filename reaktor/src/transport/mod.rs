//! In-memory transport substrate.
//!
//! The rest of the system consumes only the contract implemented here:
//! single-writer FIFO ring buffers with guarded writes and drain reads, and
//! a single-writer broadcast channel with full fan-out and a byte budget
//! per reader queue. Cross-thread safety lives entirely at this boundary.

mod broadcast;
mod ring_buffer;

pub use broadcast::{BroadcastChannel, BroadcastReader, BroadcastTransmitter};
pub use ring_buffer::{ring_buffer, RingBufferReader, RingBufferWriter, RECORD_HEADER_LEN};
