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

//! Single-writer broadcast channel with full fan-out.
//!
//! Every reader attached at transmit time observes every transmitted record;
//! there is no load balancing. Record bodies are shared between readers, so
//! fan-out cost is one `Arc` clone per reader. Each reader queue is bounded
//! by the channel's byte budget; a record that does not fit in a lagging
//! reader's queue is dropped for that reader only. Readers that have been
//! dropped are pruned on the next transmit.

use super::ring_buffer::RECORD_HEADER_LEN;
use crate::observability::{events, fields};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, Weak};
use tracing::warn;

const COMPONENT: &str = "broadcast";

type Record = (u32, Arc<[u8]>);

struct QueueState {
    records: VecDeque<Record>,
    used: usize,
}

struct ReaderQueue {
    state: Mutex<QueueState>,
}

struct Shared {
    capacity: usize,
    readers: Mutex<Vec<Weak<ReaderQueue>>>,
}

/// Handle used to attach readers and obtain the single transmitter.
#[derive(Clone)]
pub struct BroadcastChannel {
    shared: Arc<Shared>,
}

impl BroadcastChannel {
    /// Creates a channel whose attached readers each buffer up to `capacity`
    /// bytes of undrained records.
    pub fn new(capacity: usize) -> Self {
        Self {
            shared: Arc::new(Shared {
                capacity,
                readers: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn transmitter(&self) -> BroadcastTransmitter {
        BroadcastTransmitter {
            shared: self.shared.clone(),
        }
    }

    /// Attaches a reader that observes frames transmitted from now on.
    pub fn attach(&self) -> BroadcastReader {
        let queue = Arc::new(ReaderQueue {
            state: Mutex::new(QueueState {
                records: VecDeque::new(),
                used: 0,
            }),
        });
        let mut readers = match self.shared.readers.lock() {
            Ok(readers) => readers,
            Err(poisoned) => poisoned.into_inner(),
        };
        readers.push(Arc::downgrade(&queue));
        BroadcastReader { queue }
    }
}

/// Single-writer transmit side.
pub struct BroadcastTransmitter {
    shared: Arc<Shared>,
}

impl BroadcastTransmitter {
    pub fn transmit(&self, msg_type_id: u32, body: &[u8]) {
        let record_body: Arc<[u8]> = body.into();
        let cost = RECORD_HEADER_LEN + record_body.len();
        let mut readers = match self.shared.readers.lock() {
            Ok(readers) => readers,
            Err(poisoned) => poisoned.into_inner(),
        };
        readers.retain(|weak| {
            let Some(queue) = weak.upgrade() else {
                return false;
            };
            let mut state = match queue.state.lock() {
                Ok(state) => state,
                Err(poisoned) => poisoned.into_inner(),
            };
            if state.used + cost > self.shared.capacity {
                // Per-reader budget: a lagging reader loses the record, the
                // rest of the fan-out is unaffected.
                warn!(
                    event = events::BROADCAST_RECORD_DROPPED,
                    component = COMPONENT,
                    tag = fields::format_tag(msg_type_id).as_str(),
                    reason = fields::REASON_READER_OVER_BUDGET,
                    "record dropped for a lagging reader"
                );
                return true;
            }
            state.used += cost;
            state.records.push_back((msg_type_id, record_body.clone()));
            true
        });
    }
}

/// One attached reader's drain side.
pub struct BroadcastReader {
    queue: Arc<ReaderQueue>,
}

impl BroadcastReader {
    /// Drains the records present at call time and returns the count
    /// processed.
    pub fn read(&self, mut handler: impl FnMut(u32, &[u8])) -> usize {
        let batch = {
            let mut state = match self.queue.state.lock() {
                Ok(state) => state,
                Err(poisoned) => poisoned.into_inner(),
            };
            state.used = 0;
            std::mem::take(&mut state.records)
        };

        let processed = batch.len();
        for (msg_type_id, body) in batch {
            handler(msg_type_id, &body);
        }
        processed
    }
}
