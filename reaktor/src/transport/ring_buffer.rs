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

//! Bounded single-writer ring buffer with drain-based reads.
//!
//! Records are `(msg_type_id, body)` pairs accounted against a byte budget
//! (`RECORD_HEADER_LEN` per record plus the body). A write that does not fit
//! is rejected, never trimmed. FIFO order holds per writer; the lock at this
//! boundary is the only synchronization the rest of the system relies on.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Framing cost accounted per queued record.
pub const RECORD_HEADER_LEN: usize = 8;

struct RingState {
    records: VecDeque<(u32, Box<[u8]>)>,
    used: usize,
}

struct Shared {
    capacity: usize,
    state: Mutex<RingState>,
}

/// Creates a bounded ring buffer, returning its single writer and its
/// drain-side reader.
pub fn ring_buffer(capacity: usize) -> (RingBufferWriter, RingBufferReader) {
    let shared = Arc::new(Shared {
        capacity,
        state: Mutex::new(RingState {
            records: VecDeque::new(),
            used: 0,
        }),
    });

    (
        RingBufferWriter {
            shared: shared.clone(),
        },
        RingBufferReader { shared },
    )
}

/// Guarded write side. Exactly one writer owns a ring buffer.
pub struct RingBufferWriter {
    shared: Arc<Shared>,
}

impl RingBufferWriter {
    /// Queues one record; returns `false` when the byte budget is exhausted.
    pub fn write(&self, msg_type_id: u32, body: &[u8]) -> bool {
        let cost = RECORD_HEADER_LEN + body.len();
        let mut state = match self.shared.state.lock() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        };

        if state.used + cost > self.shared.capacity {
            return false;
        }
        state.used += cost;
        state.records.push_back((msg_type_id, body.into()));
        true
    }
}

/// Drain side. One bounded pass per `read` call.
pub struct RingBufferReader {
    shared: Arc<Shared>,
}

impl RingBufferReader {
    /// Drains the records present at call time, invoking the handler once
    /// per record, and returns the count processed. A handler error stops
    /// the pass; the failing record counts as consumed and is never
    /// re-delivered, while the records behind it are requeued in order.
    pub fn read<E>(
        &self,
        mut handler: impl FnMut(u32, &[u8]) -> Result<(), E>,
    ) -> Result<usize, E> {
        let mut batch = {
            let mut state = match self.shared.state.lock() {
                Ok(state) => state,
                Err(poisoned) => poisoned.into_inner(),
            };
            state.used = 0;
            std::mem::take(&mut state.records)
        };

        let mut processed = 0;
        while let Some((msg_type_id, body)) = batch.pop_front() {
            if let Err(err) = handler(msg_type_id, &body) {
                self.requeue(batch);
                return Err(err);
            }
            processed += 1;
        }

        Ok(processed)
    }

    fn requeue(&self, unhandled: VecDeque<(u32, Box<[u8]>)>) {
        let mut state = match self.shared.state.lock() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        };
        let refund: usize = unhandled
            .iter()
            .map(|(_, body)| RECORD_HEADER_LEN + body.len())
            .sum();
        state.used += refund;
        for record in unhandled.into_iter().rev() {
            state.records.push_front(record);
        }
    }
}
