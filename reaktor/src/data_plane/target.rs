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

//! Per-destination duplex stream multiplexer.
//!
//! One target owns one physical outbound data channel shared by many
//! logical streams, plus the registry routing inbound window/reset frames
//! back to each stream's owner. The throttle map is mutated only by the
//! thread owning this target's turns; it is never shared by reference.

use crate::config::ReaktorConfig;
use crate::error::{BoxError, TargetError};
use crate::nukleus::Nukleus;
use crate::observability::{events, fields};
use crate::transport::{RingBufferReader, RingBufferWriter};
use crate::types::codec::FrameWriter;
use crate::types::stream::{StreamFrame, ThrottleFrame, TIMESTAMP_OFFSET};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::fmt::{Display, Formatter};
use std::sync::OnceLock;
use std::time::Instant;
use tracing::{debug, trace, warn};

const COMPONENT: &str = "target";

/// Callback invoked with window and reset frames for one registered stream.
pub type ThrottleHandler = Box<dyn FnMut(&ThrottleFrame) -> Result<(), BoxError> + Send>;

type WritePredicate = Box<dyn FnMut(u32, &[u8]) -> bool + Send>;

fn monotonic_nanos() -> u64 {
    static EPOCH: OnceLock<Instant> = OnceLock::new();
    EPOCH.get_or_init(Instant::now).elapsed().as_nanos() as u64
}

/// The per-destination duplex multiplexer for one outbound data channel.
pub struct Target {
    nukleus_name: String,
    target_name: String,
    timestamps: bool,
    streams: WritePredicate,
    throttle: RingBufferReader,
    throttles: HashMap<u64, ThrottleHandler>,
    scratch: FrameWriter,
}

impl Target {
    pub fn new(
        nukleus_name: &str,
        target_name: &str,
        config: &ReaktorConfig,
        streams: RingBufferWriter,
        throttle: RingBufferReader,
    ) -> Self {
        Self {
            nukleus_name: nukleus_name.to_string(),
            target_name: target_name.to_string(),
            timestamps: config.timestamps,
            streams: Box::new(move |msg_type_id, body| streams.write(msg_type_id, body)),
            throttle,
            throttles: HashMap::new(),
            scratch: FrameWriter::with_capacity(config.streams_buffer_capacity.min(8 * 1024)),
        }
    }

    /// Forwards one downstream frame, stamping the reserved timestamp slot
    /// when enabled. End and Abort retire the stream's throttle
    /// registration; a rejected write is fatal to this turn.
    pub fn write(&mut self, frame: &StreamFrame) -> Result<(), TargetError> {
        frame.encode(&mut self.scratch);
        if self.timestamps {
            self.scratch.patch_u64(TIMESTAMP_OFFSET, monotonic_nanos());
        }

        let handled = (self.streams)(frame.tag(), self.scratch.written());

        if frame.is_terminal() {
            // Terminal for the stream; a reused id must not inherit stale
            // callbacks.
            self.throttles.remove(&frame.stream_id());
        }

        if !handled {
            warn!(
                event = events::STREAM_WRITE_REJECTED,
                component = COMPONENT,
                target = self.target_name.as_str(),
                nukleus = self.nukleus_name.as_str(),
                stream_id = fields::format_id(frame.stream_id()).as_str(),
                "streams buffer rejected the frame"
            );
            return Err(TargetError::StreamsBufferFull {
                target: self.target_name.clone(),
                stream_id: frame.stream_id(),
            });
        }

        Ok(())
    }

    /// Associates a callback with one live stream id. At most one
    /// registration may exist per id; registering twice is a programming
    /// error.
    pub fn register_throttle(&mut self, stream_id: u64, handler: ThrottleHandler) {
        match self.throttles.entry(stream_id) {
            Entry::Vacant(vacant) => {
                vacant.insert(handler);
            }
            Entry::Occupied(_) => {
                panic!(
                    "throttle already registered for stream 0x{stream_id:016x} on target {}",
                    self.target_name
                );
            }
        }
    }

    /// Drains the throttle channel, dispatching window/reset frames to the
    /// registered owner of each stream. Late frames for unknown ids are an
    /// expected race and are dropped silently.
    pub fn process(&mut self) -> Result<usize, TargetError> {
        let Self {
            nukleus_name,
            target_name,
            throttle,
            throttles,
            ..
        } = self;

        throttle.read(|msg_type_id, body| {
            let frame = match ThrottleFrame::decode(msg_type_id, body) {
                Ok(frame) => frame,
                // Unrecognized throttle traffic is ignored, matching the
                // dispatch table's explicit default.
                Err(err) => {
                    trace!(
                        event = events::THROTTLE_FRAME_DROPPED,
                        component = COMPONENT,
                        target = target_name.as_str(),
                        tag = fields::format_tag(msg_type_id).as_str(),
                        err = %err,
                        "undecodable throttle frame ignored"
                    );
                    return Ok(());
                }
            };

            let stream_id = frame.stream_id();
            let Some(handler) = throttles.get_mut(&stream_id) else {
                trace!(
                    event = events::THROTTLE_FRAME_DROPPED,
                    component = COMPONENT,
                    target = target_name.as_str(),
                    stream_id = fields::format_id(stream_id).as_str(),
                    reason = fields::REASON_LATE_THROTTLE_FRAME,
                    "no registered throttle"
                );
                return Ok(());
            };

            if let Err(source) = handler(&frame) {
                warn!(
                    event = events::THROTTLE_DISPATCH_FAILED,
                    component = COMPONENT,
                    target = target_name.as_str(),
                    nukleus = nukleus_name.as_str(),
                    stream_id = fields::format_id(stream_id).as_str(),
                    err = %source,
                    "throttle callback failed"
                );
                return Err(TargetError::ThrottleDispatch {
                    target: target_name.clone(),
                    nukleus: nukleus_name.clone(),
                    stream_id,
                    source,
                });
            }

            if matches!(frame, ThrottleFrame::Reset { .. }) {
                throttles.remove(&stream_id);
            }

            Ok(())
        })
    }

    /// Sends a synthetic reset to every remaining registration, in
    /// unspecified order, then releases the channel.
    pub fn close(&mut self) -> Result<(), TargetError> {
        let remaining = std::mem::take(&mut self.throttles);
        let reset_count = remaining.len();

        for (stream_id, mut handler) in remaining {
            let reset = ThrottleFrame::Reset { stream_id };
            if let Err(source) = handler(&reset) {
                return Err(TargetError::ThrottleDispatch {
                    target: self.target_name.clone(),
                    nukleus: self.nukleus_name.clone(),
                    stream_id,
                    source,
                });
            }
        }

        debug!(
            event = events::TARGET_CLOSE_RESETS,
            component = COMPONENT,
            target = self.target_name.as_str(),
            nukleus = self.nukleus_name.as_str(),
            reset_count,
            "target closed"
        );

        self.detach();
        Ok(())
    }

    /// Swaps the write predicate for an always-succeeds no-op so in-flight
    /// writes during shutdown complete harmlessly.
    pub fn detach(&mut self) {
        self.streams = Box::new(|_, _| true);
        debug!(
            event = events::TARGET_DETACHED,
            component = COMPONENT,
            target = self.target_name.as_str(),
            nukleus = self.nukleus_name.as_str(),
            "write predicate detached"
        );
    }

    #[cfg(test)]
    pub(crate) fn registered_throttles(&self) -> usize {
        self.throttles.len()
    }
}

impl Display for Target {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} (write)", self.target_name)
    }
}

impl Nukleus for Target {
    fn name(&self) -> &str {
        &self.target_name
    }

    fn process(&mut self) -> Result<usize, BoxError> {
        Ok(Target::process(self)?)
    }

    fn close(&mut self) -> Result<(), BoxError> {
        Ok(Target::close(self)?)
    }
}
