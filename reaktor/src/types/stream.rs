/********************************************************************************
 * Copyright (c) 2026 Contributors to the Eclipse Foundation
 *
 * See the NOTICE file(s) distributed with this work for additional
 * information regarding copyright ownership.
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

//! Data-plane stream and throttle schemas.
//!
//! Downstream bodies reserve an 8-byte timestamp slot directly after
//! `stream_id` so the owning target can stamp monotonic time in place
//! before forwarding.

use crate::error::DecodeError;
use crate::types::codec::{FrameCursor, FrameWriter};

/// Data-plane type tags. Downstream counts up from one; throttle tags carry
/// the reply bit.
pub mod tag {
    pub const BEGIN: u32 = 0x0000_0001;
    pub const DATA: u32 = 0x0000_0002;
    pub const END: u32 = 0x0000_0003;
    pub const ABORT: u32 = 0x0000_0004;

    pub const WINDOW: u32 = 0x4000_0001;
    pub const RESET: u32 = 0x4000_0002;
}

/// Byte offset of the reserved timestamp slot in every downstream body.
pub const TIMESTAMP_OFFSET: usize = 8;

/// Downstream frame written by a stream owner through its target.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum StreamFrame {
    Begin {
        stream_id: u64,
        timestamp: u64,
        source_ref: u64,
        correlation_id: u64,
    },
    Data {
        stream_id: u64,
        timestamp: u64,
        payload: Vec<u8>,
    },
    End {
        stream_id: u64,
        timestamp: u64,
    },
    Abort {
        stream_id: u64,
        timestamp: u64,
    },
}

impl StreamFrame {
    pub fn tag(&self) -> u32 {
        match self {
            StreamFrame::Begin { .. } => tag::BEGIN,
            StreamFrame::Data { .. } => tag::DATA,
            StreamFrame::End { .. } => tag::END,
            StreamFrame::Abort { .. } => tag::ABORT,
        }
    }

    pub fn stream_id(&self) -> u64 {
        match self {
            StreamFrame::Begin { stream_id, .. }
            | StreamFrame::Data { stream_id, .. }
            | StreamFrame::End { stream_id, .. }
            | StreamFrame::Abort { stream_id, .. } => *stream_id,
        }
    }

    pub fn timestamp(&self) -> u64 {
        match self {
            StreamFrame::Begin { timestamp, .. }
            | StreamFrame::Data { timestamp, .. }
            | StreamFrame::End { timestamp, .. }
            | StreamFrame::Abort { timestamp, .. } => *timestamp,
        }
    }

    /// End and Abort are terminal; no further throttle traffic for the
    /// stream is meaningful once one is written.
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamFrame::End { .. } | StreamFrame::Abort { .. })
    }

    pub fn encode<'a>(&self, writer: &'a mut FrameWriter) -> &'a [u8] {
        writer.begin();
        match self {
            StreamFrame::Begin {
                stream_id,
                timestamp,
                source_ref,
                correlation_id,
            } => {
                writer
                    .put_u64(*stream_id)
                    .put_u64(*timestamp)
                    .put_u64(*source_ref)
                    .put_u64(*correlation_id);
            }
            StreamFrame::Data {
                stream_id,
                timestamp,
                payload,
            } => {
                writer
                    .put_u64(*stream_id)
                    .put_u64(*timestamp)
                    .put_bytes(payload);
            }
            StreamFrame::End {
                stream_id,
                timestamp,
            }
            | StreamFrame::Abort {
                stream_id,
                timestamp,
            } => {
                writer.put_u64(*stream_id).put_u64(*timestamp);
            }
        }
        writer.written()
    }

    pub fn decode(msg_type_id: u32, body: &[u8]) -> Result<Self, DecodeError> {
        let mut cursor = FrameCursor::new(body);
        match msg_type_id {
            tag::BEGIN => Ok(StreamFrame::Begin {
                stream_id: cursor.get_u64()?,
                timestamp: cursor.get_u64()?,
                source_ref: cursor.get_u64()?,
                correlation_id: cursor.get_u64()?,
            }),
            tag::DATA => Ok(StreamFrame::Data {
                stream_id: cursor.get_u64()?,
                timestamp: cursor.get_u64()?,
                payload: cursor.get_bytes()?,
            }),
            tag::END => Ok(StreamFrame::End {
                stream_id: cursor.get_u64()?,
                timestamp: cursor.get_u64()?,
            }),
            tag::ABORT => Ok(StreamFrame::Abort {
                stream_id: cursor.get_u64()?,
                timestamp: cursor.get_u64()?,
            }),
            other => Err(DecodeError::UnknownTag { tag: other }),
        }
    }
}

/// Upstream flow-control frame routed back to one stream owner.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ThrottleFrame {
    /// Additional send credit for the stream.
    Window { stream_id: u64, credit: u32 },
    /// Hard stop; terminal for the registration.
    Reset { stream_id: u64 },
}

impl ThrottleFrame {
    pub fn tag(&self) -> u32 {
        match self {
            ThrottleFrame::Window { .. } => tag::WINDOW,
            ThrottleFrame::Reset { .. } => tag::RESET,
        }
    }

    pub fn stream_id(&self) -> u64 {
        match self {
            ThrottleFrame::Window { stream_id, .. } | ThrottleFrame::Reset { stream_id } => {
                *stream_id
            }
        }
    }

    pub fn encode<'a>(&self, writer: &'a mut FrameWriter) -> &'a [u8] {
        writer.begin();
        match self {
            ThrottleFrame::Window { stream_id, credit } => {
                writer.put_u64(*stream_id).put_u32(*credit);
            }
            ThrottleFrame::Reset { stream_id } => {
                writer.put_u64(*stream_id);
            }
        }
        writer.written()
    }

    pub fn decode(msg_type_id: u32, body: &[u8]) -> Result<Self, DecodeError> {
        let mut cursor = FrameCursor::new(body);
        match msg_type_id {
            tag::WINDOW => Ok(ThrottleFrame::Window {
                stream_id: cursor.get_u64()?,
                credit: cursor.get_u32()?,
            }),
            tag::RESET => Ok(ThrottleFrame::Reset {
                stream_id: cursor.get_u64()?,
            }),
            other => Err(DecodeError::UnknownTag { tag: other }),
        }
    }
}
