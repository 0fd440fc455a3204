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

//! Canonical structured field keys and value-format helpers.

pub const EVENT: &str = "event";
pub const COMPONENT: &str = "component";
pub const NUKLEUS: &str = "nukleus";
pub const TARGET: &str = "target";
pub const TAG: &str = "tag";
pub const CORRELATION_ID: &str = "correlation_id";
pub const STREAM_ID: &str = "stream_id";
pub const ERR: &str = "err";
pub const REASON: &str = "reason";

pub const NONE: &str = "none";
pub const REASON_NO_RESOLVER: &str = "no_resolver_at_this_layer";
pub const REASON_NO_CORRELATION_PREFIX: &str = "no_correlation_prefix";
pub const REASON_LATE_THROTTLE_FRAME: &str = "late_throttle_frame";
pub const REASON_READER_OVER_BUDGET: &str = "reader_over_budget";
pub const DEFAULT_RUNNER_THREAD: &str = "unknown-thread";

/// Ids are rendered as fixed-width hex so log joins line up with the wire.
pub fn format_id(id: u64) -> String {
    format!("0x{id:016x}")
}

pub fn format_tag(tag: u32) -> String {
    format!("0x{tag:08x}")
}

pub fn thread_name_or_default(thread_name: Option<&str>) -> String {
    thread_name.unwrap_or(DEFAULT_RUNNER_THREAD).to_string()
}

pub fn current_thread_name_or_default() -> String {
    thread_name_or_default(std::thread::current().name())
}
