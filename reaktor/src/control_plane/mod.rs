//! Control plane: command dispatch, response correlation.

mod conductor;
mod controller;
mod correlation;

pub use conductor::{Acceptor, Conductor, ReplyEmitter};
pub use controller::Controller;
pub use correlation::{ControlOutcome, PendingResponse};
