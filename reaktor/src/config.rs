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

//! Capacity and feature configuration, loadable from JSON5.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;
use std::fmt::{Display, Formatter};
use std::path::Path;

const DEFAULT_COMMAND_BUFFER_CAPACITY: usize = 1024;
const DEFAULT_RESPONSE_BUFFER_CAPACITY: usize = 1024;
const DEFAULT_STREAMS_BUFFER_CAPACITY: usize = 64 * 1024;
const DEFAULT_THROTTLE_BUFFER_CAPACITY: usize = 64 * 1024;
const DEFAULT_MAX_CONTROL_FRAME_LENGTH: usize = 1024;

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields, default)]
pub struct ReaktorConfig {
    /// Byte budget of the control-plane command ring buffer.
    pub command_buffer_capacity: usize,
    /// Byte budget of each reader queue on the response broadcast channel.
    pub response_buffer_capacity: usize,
    /// Byte budget of one target's outbound streams ring buffer.
    pub streams_buffer_capacity: usize,
    /// Byte budget of one target's inbound throttle ring buffer.
    pub throttle_buffer_capacity: usize,
    /// Scratch sizing for control-plane encode buffers.
    pub max_control_frame_length: usize,
    /// Whether targets stamp downstream frames with monotonic time.
    pub timestamps: bool,
}

impl Default for ReaktorConfig {
    fn default() -> Self {
        Self {
            command_buffer_capacity: DEFAULT_COMMAND_BUFFER_CAPACITY,
            response_buffer_capacity: DEFAULT_RESPONSE_BUFFER_CAPACITY,
            streams_buffer_capacity: DEFAULT_STREAMS_BUFFER_CAPACITY,
            throttle_buffer_capacity: DEFAULT_THROTTLE_BUFFER_CAPACITY,
            max_control_frame_length: DEFAULT_MAX_CONTROL_FRAME_LENGTH,
            timestamps: true,
        }
    }
}

impl ReaktorConfig {
    pub fn from_json5_str(contents: &str) -> Result<Self, ConfigError> {
        json5::from_str(contents).map_err(ConfigError::Parse)
    }

    pub fn from_json5_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        Self::from_json5_str(&contents)
    }
}

/// Failures while loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(json5::Error),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(err) => write!(f, "unable to read config file: {err}"),
            ConfigError::Parse(err) => write!(f, "unable to parse config: {err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ConfigError::Io(err) => Some(err),
            ConfigError::Parse(err) => Some(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ReaktorConfig;

    #[test]
    fn defaults_match_documented_capacities() {
        let config = ReaktorConfig::default();

        assert_eq!(config.command_buffer_capacity, 1024);
        assert_eq!(config.response_buffer_capacity, 1024);
        assert_eq!(config.max_control_frame_length, 1024);
        assert!(config.timestamps);
    }

    #[test]
    fn json5_overrides_merge_with_defaults() {
        let config = ReaktorConfig::from_json5_str(
            r#"{
                // larger data plane, timestamping off
                streams_buffer_capacity: 131072,
                timestamps: false,
            }"#,
        )
        .expect("config should parse");

        assert_eq!(config.streams_buffer_capacity, 131072);
        assert!(!config.timestamps);
        assert_eq!(config.command_buffer_capacity, 1024);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(ReaktorConfig::from_json5_str(r#"{ not_a_field: 1 }"#).is_err());
    }
}
