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

//! Cursor-based frame codec.
//!
//! Frame bodies are little-endian: fixed-width fields first, then
//! length-prefixed variable fields (`u16` length for strings and byte
//! arrays, `u16` count for sequences). The type tag travels out-of-band on
//! the transport record, so it never appears in the body.

use crate::error::DecodeError;
use byteorder::{ByteOrder, LittleEndian};

/// Reusable scratch encoder. One writer per owning component; `begin()`
/// rewinds the cursor so steady-state encoding never allocates.
pub struct FrameWriter {
    buf: Vec<u8>,
    len: usize,
}

impl FrameWriter {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: vec![0; capacity],
            len: 0,
        }
    }

    /// Rewinds the cursor for the next frame.
    pub fn begin(&mut self) -> &mut Self {
        self.len = 0;
        self
    }

    fn reserve_for(&mut self, additional: usize) {
        if self.len + additional > self.buf.len() {
            self.buf.resize(self.len + additional, 0);
        }
    }

    pub fn put_u8(&mut self, value: u8) -> &mut Self {
        self.reserve_for(1);
        self.buf[self.len] = value;
        self.len += 1;
        self
    }

    pub fn put_u16(&mut self, value: u16) -> &mut Self {
        self.reserve_for(2);
        LittleEndian::write_u16(&mut self.buf[self.len..], value);
        self.len += 2;
        self
    }

    pub fn put_u32(&mut self, value: u32) -> &mut Self {
        self.reserve_for(4);
        LittleEndian::write_u32(&mut self.buf[self.len..], value);
        self.len += 4;
        self
    }

    pub fn put_u64(&mut self, value: u64) -> &mut Self {
        self.reserve_for(8);
        LittleEndian::write_u64(&mut self.buf[self.len..], value);
        self.len += 8;
        self
    }

    pub fn put_bytes(&mut self, value: &[u8]) -> &mut Self {
        debug_assert!(value.len() <= u16::MAX as usize);
        self.put_u16(value.len() as u16);
        self.reserve_for(value.len());
        self.buf[self.len..self.len + value.len()].copy_from_slice(value);
        self.len += value.len();
        self
    }

    pub fn put_str(&mut self, value: &str) -> &mut Self {
        self.put_bytes(value.as_bytes())
    }

    pub fn put_str_seq(&mut self, items: &[String]) -> &mut Self {
        debug_assert!(items.len() <= u16::MAX as usize);
        self.put_u16(items.len() as u16);
        for item in items {
            self.put_str(item);
        }
        self
    }

    /// Overwrites a fixed-width field already emitted at `offset`. Used for
    /// the reserved data-plane timestamp slot.
    pub fn patch_u64(&mut self, offset: usize, value: u64) {
        debug_assert!(offset + 8 <= self.len);
        LittleEndian::write_u64(&mut self.buf[offset..], value);
    }

    /// The sub-range written since the last `begin()`.
    pub fn written(&self) -> &[u8] {
        &self.buf[..self.len]
    }
}

/// Checked reader over one frame body.
pub struct FrameCursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> FrameCursor<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn take(&mut self, count: usize) -> Result<&'a [u8], DecodeError> {
        let available = self.buf.len() - self.pos;
        if count > available {
            return Err(DecodeError::Truncated {
                expected: count,
                available,
            });
        }
        let slice = &self.buf[self.pos..self.pos + count];
        self.pos += count;
        Ok(slice)
    }

    pub fn get_u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.take(1)?[0])
    }

    pub fn get_u16(&mut self) -> Result<u16, DecodeError> {
        Ok(LittleEndian::read_u16(self.take(2)?))
    }

    pub fn get_u32(&mut self) -> Result<u32, DecodeError> {
        Ok(LittleEndian::read_u32(self.take(4)?))
    }

    pub fn get_u64(&mut self) -> Result<u64, DecodeError> {
        Ok(LittleEndian::read_u64(self.take(8)?))
    }

    pub fn get_bytes(&mut self) -> Result<Vec<u8>, DecodeError> {
        let len = self.get_u16()? as usize;
        Ok(self.take(len)?.to_vec())
    }

    pub fn get_str(&mut self) -> Result<String, DecodeError> {
        let len = self.get_u16()? as usize;
        let raw = self.take(len)?;
        std::str::from_utf8(raw)
            .map(str::to_string)
            .map_err(|_| DecodeError::InvalidUtf8)
    }

    pub fn get_str_seq(&mut self) -> Result<Vec<String>, DecodeError> {
        let count = self.get_u16()? as usize;
        let mut items = Vec::with_capacity(count);
        for _ in 0..count {
            items.push(self.get_str()?);
        }
        Ok(items)
    }
}

/// Recovers the 8-byte primary key (`correlation_id` or `stream_id`) from a
/// frame body that failed full decoding, when the prefix is readable.
pub fn peek_frame_key(body: &[u8]) -> Option<u64> {
    if body.len() >= 8 {
        Some(LittleEndian::read_u64(&body[..8]))
    } else {
        None
    }
}
