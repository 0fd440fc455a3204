//! Error types shared across the control and data planes.

use std::error::Error;
use std::fmt;
use std::fmt::{Display, Formatter};

/// Boxed error used at the `Nukleus` and `Acceptor` seams, where each
/// implementation surfaces its own failure type.
pub type BoxError = Box<dyn Error + Send + Sync>;

/// Failures while decoding a frame body.
#[derive(Debug, PartialEq, Eq)]
pub enum DecodeError {
    /// The frame body ended before a fixed-width or length-prefixed field.
    Truncated { expected: usize, available: usize },
    /// The transport record carried a type tag no schema claims.
    UnknownTag { tag: u32 },
    /// A `Role` byte outside the `{CLIENT, SERVER}` range.
    InvalidRole { value: u8 },
    /// A length-prefixed string field was not valid UTF-8.
    InvalidUtf8,
}

impl Display for DecodeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::Truncated {
                expected,
                available,
            } => {
                write!(
                    f,
                    "frame truncated: needed {expected} more bytes, {available} available"
                )
            }
            DecodeError::UnknownTag { tag } => write!(f, "unknown frame type tag 0x{tag:08x}"),
            DecodeError::InvalidRole { value } => write!(f, "invalid role byte 0x{value:02x}"),
            DecodeError::InvalidUtf8 => write!(f, "string field is not valid UTF-8"),
        }
    }
}

impl Error for DecodeError {}

/// Failures raised from a [`Target`](crate::Target) turn.
#[derive(Debug)]
pub enum TargetError {
    /// The outbound streams channel refused a frame. Capacity defect, never
    /// swallowed.
    StreamsBufferFull { target: String, stream_id: u64 },
    /// A registered throttle callback failed while dispatching a window or
    /// reset; carries the diagnostic context of the owning target.
    ThrottleDispatch {
        target: String,
        nukleus: String,
        stream_id: u64,
        source: BoxError,
    },
}

impl Display for TargetError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            TargetError::StreamsBufferFull { target, stream_id } => {
                write!(
                    f,
                    "unable to write stream 0x{stream_id:016x} to streams buffer of target {target}"
                )
            }
            TargetError::ThrottleDispatch {
                target,
                nukleus,
                stream_id,
                source,
            } => {
                write!(
                    f,
                    "[{target}/{nukleus}]\t[0x{stream_id:016x}] throttle dispatch failed: {source}"
                )
            }
        }
    }
}

impl Error for TargetError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            TargetError::ThrottleDispatch { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

/// Caller-visible failures for control-plane commands.
#[derive(Debug, PartialEq, Eq)]
pub enum ControlError {
    /// The conductor answered with a correlated `Error` response.
    CommandFailed { correlation_id: u64 },
    /// The command ring buffer refused the frame; the pending handle was
    /// unregistered before returning.
    CommandRejected,
    /// The resolving side went away before any response arrived.
    Abandoned,
}

impl Display for ControlError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ControlError::CommandFailed { correlation_id } => {
                write!(f, "command 0x{correlation_id:016x} failed")
            }
            ControlError::CommandRejected => {
                write!(f, "command buffer rejected the frame")
            }
            ControlError::Abandoned => write!(f, "command abandoned before resolution"),
        }
    }
}

impl Error for ControlError {}
