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

use crate::error::BoxError;

/// An independently scheduled, single-threaded reactive unit.
///
/// `process()` is one bounded, non-blocking pass invoked repeatedly by an
/// external scheduler; it must never block, and a frame is decoded,
/// dispatched, and answered entirely within one call.
/// Distinct nukleii communicate only through the transport substrate.
pub trait Nukleus {
    /// The unit's stable name, used in diagnostics.
    fn name(&self) -> &str;

    /// Performs one non-blocking pass and returns the number of frames
    /// handled. An error is fatal to the owning processing turn.
    fn process(&mut self) -> Result<usize, BoxError>;

    /// Releases owned resources. Called once when the scheduler retires the
    /// unit.
    fn close(&mut self) -> Result<(), BoxError> {
        Ok(())
    }
}
