//! Structured logging vocabulary shared by all nukleii.

pub mod events;
pub mod fields;
