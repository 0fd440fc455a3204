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

//! Client-side command issuance and response resolution.

use crate::config::ReaktorConfig;
use crate::control_plane::correlation::{CorrelationTable, PendingResponse};
use crate::error::{BoxError, ControlError};
use crate::nukleus::Nukleus;
use crate::observability::{events, fields};
use crate::transport::{BroadcastReader, RingBufferWriter};
use crate::types::codec::FrameWriter;
use crate::types::control::{
    AuthorizeCommand, Command, ResolveCommand, Response, Role, RouteCommand, UnauthorizeCommand,
    UnresolveCommand,
};
use tracing::{debug, trace, warn};

const COMPONENT: &str = "controller";

/// Issues correlated commands into the command ring buffer and resolves
/// pending handles from the response broadcast.
pub struct Controller {
    name: String,
    commands: RingBufferWriter,
    responses: BroadcastReader,
    correlations: CorrelationTable,
    scratch: FrameWriter,
}

impl Controller {
    pub fn new(
        name: &str,
        config: &ReaktorConfig,
        commands: RingBufferWriter,
        responses: BroadcastReader,
    ) -> Self {
        Self {
            name: name.to_string(),
            commands,
            responses,
            correlations: CorrelationTable::new(),
            scratch: FrameWriter::with_capacity(config.max_control_frame_length),
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn route(
        &mut self,
        role: Role,
        source: &str,
        source_ref: u64,
        target: &str,
        target_ref: u64,
        extension: &[u8],
    ) -> Result<PendingResponse, ControlError> {
        let correlation_id = self.correlations.next_correlation_id();
        self.issue(Command::Route(RouteCommand {
            correlation_id,
            role,
            source: source.to_string(),
            source_ref,
            target: target.to_string(),
            target_ref,
            extension: extension.to_vec(),
        }))
    }

    #[allow(clippy::too_many_arguments)]
    pub fn unroute(
        &mut self,
        role: Role,
        source: &str,
        source_ref: u64,
        target: &str,
        target_ref: u64,
        extension: &[u8],
    ) -> Result<PendingResponse, ControlError> {
        let correlation_id = self.correlations.next_correlation_id();
        self.issue(Command::Unroute(RouteCommand {
            correlation_id,
            role,
            source: source.to_string(),
            source_ref,
            target: target.to_string(),
            target_ref,
            extension: extension.to_vec(),
        }))
    }

    pub fn authorize(
        &mut self,
        source_ref: u64,
        security_nukleus: &str,
        roles: &[String],
    ) -> Result<PendingResponse, ControlError> {
        let correlation_id = self.correlations.next_correlation_id();
        self.issue(Command::Authorize(AuthorizeCommand {
            correlation_id,
            source_ref,
            security_nukleus: security_nukleus.to_string(),
            roles: roles.to_vec(),
        }))
    }

    pub fn unauthorize(
        &mut self,
        source_ref: u64,
        security_nukleus: &str,
    ) -> Result<PendingResponse, ControlError> {
        let correlation_id = self.correlations.next_correlation_id();
        self.issue(Command::Unauthorize(UnauthorizeCommand {
            correlation_id,
            source_ref,
            security_nukleus: security_nukleus.to_string(),
        }))
    }

    pub fn resolve(
        &mut self,
        realm: &str,
        roles: &[String],
    ) -> Result<PendingResponse, ControlError> {
        let correlation_id = self.correlations.next_correlation_id();
        self.issue(Command::Resolve(ResolveCommand {
            correlation_id,
            realm: realm.to_string(),
            roles: roles.to_vec(),
        }))
    }

    pub fn unresolve(&mut self, realm_id: u64) -> Result<PendingResponse, ControlError> {
        let correlation_id = self.correlations.next_correlation_id();
        self.issue(Command::Unresolve(UnresolveCommand {
            correlation_id,
            realm_id,
        }))
    }

    /// Outstanding requests awaiting a broadcast response.
    pub fn pending_commands(&self) -> usize {
        self.correlations.pending_len()
    }

    /// Registers, stamps, writes, and returns the handle without blocking.
    /// A rejected write fails fast with the handle unregistered.
    fn issue(&mut self, command: Command) -> Result<PendingResponse, ControlError> {
        let correlation_id = command.correlation_id();
        let handle = self.correlations.register(correlation_id);

        let body = command.encode(&mut self.scratch);
        if !self.commands.write(command.tag(), body) {
            self.correlations.unregister(correlation_id);
            warn!(
                event = events::COMMAND_REJECTED,
                component = COMPONENT,
                nukleus = self.name.as_str(),
                tag = fields::format_tag(command.tag()).as_str(),
                correlation_id = fields::format_id(correlation_id).as_str(),
                "command buffer rejected the frame"
            );
            return Err(ControlError::CommandRejected);
        }

        debug!(
            event = events::COMMAND_ISSUED,
            component = COMPONENT,
            nukleus = self.name.as_str(),
            tag = fields::format_tag(command.tag()).as_str(),
            correlation_id = fields::format_id(correlation_id).as_str(),
            "command issued"
        );
        Ok(handle)
    }
}

impl Nukleus for Controller {
    fn name(&self) -> &str {
        &self.name
    }

    fn process(&mut self) -> Result<usize, BoxError> {
        let correlations = &mut self.correlations;
        let name = self.name.as_str();

        let processed = self.responses.read(|msg_type_id, body| {
            match Response::decode(msg_type_id, body) {
                Ok(response) => {
                    if correlations.resolve(&response) {
                        debug!(
                            event = events::RESPONSE_RESOLVED,
                            component = COMPONENT,
                            nukleus = name,
                            correlation_id =
                                fields::format_id(response.correlation_id()).as_str(),
                            "pending request resolved"
                        );
                    } else {
                        // Fan-out means most responses belong to some other
                        // controller.
                        trace!(
                            event = events::RESPONSE_DISCARDED,
                            component = COMPONENT,
                            nukleus = name,
                            correlation_id =
                                fields::format_id(response.correlation_id()).as_str(),
                            "no matching pending request"
                        );
                    }
                }
                Err(err) => {
                    warn!(
                        event = events::RESPONSE_DECODE_FAILED,
                        component = COMPONENT,
                        nukleus = name,
                        tag = fields::format_tag(msg_type_id).as_str(),
                        err = %err,
                        "response decode failed"
                    );
                }
            }
        });

        Ok(processed)
    }
}

#[cfg(test)]
mod tests {
    use super::Controller;
    use crate::config::ReaktorConfig;
    use crate::error::ControlError;
    use crate::nukleus::Nukleus;
    use crate::transport::{ring_buffer, BroadcastChannel, RingBufferReader};
    use crate::types::codec::FrameWriter;
    use crate::types::control::{Command, Response, Role};

    fn harness() -> (
        Controller,
        RingBufferReader,
        crate::transport::BroadcastTransmitter,
    ) {
        let config = ReaktorConfig::default();
        let (command_writer, command_reader) = ring_buffer(config.command_buffer_capacity);
        let responses = BroadcastChannel::new(config.response_buffer_capacity);
        let response_reader = responses.attach();
        let controller = Controller::new("tcp", &config, command_writer, response_reader);
        (controller, command_reader, responses.transmitter())
    }

    fn transmit(transmitter: &crate::transport::BroadcastTransmitter, response: &Response) {
        let mut scratch = FrameWriter::with_capacity(64);
        let body = response.encode(&mut scratch);
        transmitter.transmit(response.tag(), body);
    }

    #[test]
    fn issued_command_reaches_the_ring_with_a_fresh_id() {
        let (mut controller, commands, _responses) = harness();
        let handle = controller
            .route(Role::Server, "a", 1, "b", 2, &[])
            .expect("route should be issued");

        let mut decoded = Vec::new();
        commands
            .read(|tag, body| {
                decoded.push(Command::decode(tag, body).unwrap());
                Ok::<(), std::convert::Infallible>(())
            })
            .unwrap();

        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded[0].correlation_id(), handle.correlation_id());
        assert_eq!(controller.pending_commands(), 1);
    }

    #[test]
    fn rejected_write_fails_fast_and_unregisters() {
        let config = ReaktorConfig::default();
        // A ring too small for any route frame.
        let (command_writer, _command_reader) = ring_buffer(4);
        let responses = BroadcastChannel::new(config.response_buffer_capacity);
        let mut controller =
            Controller::new("tcp", &config, command_writer, responses.attach());

        let result = controller.route(Role::Client, "a", 1, "b", 2, &[]);

        assert!(matches!(result, Err(ControlError::CommandRejected)));
        assert_eq!(controller.pending_commands(), 0);
    }

    #[test]
    fn unmatched_response_is_silently_discarded() {
        let (mut controller, _commands, transmitter) = harness();
        transmit(
            &transmitter,
            &Response::Routed {
                correlation_id: 0xdead,
                source_ref: 1,
            },
        );

        assert_eq!(controller.process().unwrap(), 1);
        assert_eq!(controller.pending_commands(), 0);
    }

    #[test]
    fn responses_resolve_only_their_own_pending_handle() {
        let (mut controller, _commands, transmitter) = harness();
        let mut handle_a = controller.route(Role::Server, "a", 1, "b", 2, &[]).unwrap();
        let mut handle_b = controller.route(Role::Server, "c", 3, "d", 4, &[]).unwrap();

        transmit(
            &transmitter,
            &Response::Routed {
                correlation_id: handle_a.correlation_id(),
                source_ref: 1,
            },
        );
        controller.process().unwrap();

        assert!(handle_a.try_outcome().is_some());
        assert!(handle_b.try_outcome().is_none());
        assert_eq!(controller.pending_commands(), 1);
    }
}
