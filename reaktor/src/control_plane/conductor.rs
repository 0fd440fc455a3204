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

//! Control-plane reactor: drains commands, dispatches to the acceptor seam,
//! broadcasts correlated responses.

use crate::config::ReaktorConfig;
use crate::error::BoxError;
use crate::nukleus::Nukleus;
use crate::observability::{events, fields};
use crate::transport::{BroadcastTransmitter, RingBufferReader};
use crate::types::codec::{peek_frame_key, FrameWriter};
use crate::types::control::{
    AuthorizeCommand, Command, Response, RouteCommand, UnauthorizeCommand,
};
use tracing::{debug, warn};

const NAME: &str = "conductor";
const COMPONENT: &str = "conductor";

/// Executes route and authorize decisions on behalf of the conductor.
///
/// Each handler is expected to eventually invoke the matching reply entry
/// point with the original correlation id, exactly once: either through
/// the emitter passed in, or from a later turn through the conductor's
/// `on_*` methods. Handler errors are not caught by the conductor; they are
/// fatal to the owning processing turn and must be contained by the
/// acceptor itself outside of deliberate fault injection.
pub trait Acceptor {
    fn do_route(&mut self, route: RouteCommand, replies: &mut ReplyEmitter)
        -> Result<(), BoxError>;

    fn do_unroute(
        &mut self,
        unroute: RouteCommand,
        replies: &mut ReplyEmitter,
    ) -> Result<(), BoxError>;

    fn do_authorize(
        &mut self,
        authorize: AuthorizeCommand,
        replies: &mut ReplyEmitter,
    ) -> Result<(), BoxError>;

    fn do_unauthorize(
        &mut self,
        unauthorize: UnauthorizeCommand,
        replies: &mut ReplyEmitter,
    ) -> Result<(), BoxError>;
}

/// Encodes one response per callback into a reusable scratch buffer and
/// broadcasts it.
///
/// Only ever touched from the conductor's own serialized turns, so no
/// locking is required even when a completion fires from a later turn than
/// the triggering command.
pub struct ReplyEmitter {
    responses: BroadcastTransmitter,
    scratch: FrameWriter,
}

impl ReplyEmitter {
    fn new(responses: BroadcastTransmitter, scratch_capacity: usize) -> Self {
        Self {
            responses,
            scratch: FrameWriter::with_capacity(scratch_capacity),
        }
    }

    pub fn on_routed(&mut self, correlation_id: u64, source_ref: u64) {
        self.transmit(&Response::Routed {
            correlation_id,
            source_ref,
        });
    }

    pub fn on_unrouted(&mut self, correlation_id: u64) {
        self.transmit(&Response::Unrouted { correlation_id });
    }

    pub fn on_authorized(&mut self, correlation_id: u64, auth_mask: u64, auth_expires: u64) {
        self.transmit(&Response::Authorized {
            correlation_id,
            auth_mask,
            auth_expires,
        });
    }

    pub fn on_unauthorized(&mut self, correlation_id: u64) {
        self.transmit(&Response::Unauthorized { correlation_id });
    }

    pub fn on_error(&mut self, correlation_id: u64) {
        self.transmit(&Response::Error { correlation_id });
    }

    fn transmit(&mut self, response: &Response) {
        let body = response.encode(&mut self.scratch);
        self.responses.transmit(response.tag(), body);
        debug!(
            event = events::RESPONSE_TRANSMIT,
            component = COMPONENT,
            tag = fields::format_tag(response.tag()).as_str(),
            correlation_id = fields::format_id(response.correlation_id()).as_str(),
            "response transmitted"
        );
    }
}

/// The nukleus owning the control-plane command/response protocol.
pub struct Conductor {
    commands: RingBufferReader,
    replies: ReplyEmitter,
    acceptor: Box<dyn Acceptor + Send>,
}

impl Conductor {
    pub fn new(
        config: &ReaktorConfig,
        commands: RingBufferReader,
        responses: BroadcastTransmitter,
        acceptor: Box<dyn Acceptor + Send>,
    ) -> Self {
        Self {
            commands,
            replies: ReplyEmitter::new(responses, config.max_control_frame_length),
            acceptor,
        }
    }

    // Deferred completion entry points, invoked by whoever drives the
    // acceptor's asynchronous resolution from a later turn.

    pub fn on_routed(&mut self, correlation_id: u64, source_ref: u64) {
        self.replies.on_routed(correlation_id, source_ref);
    }

    pub fn on_unrouted(&mut self, correlation_id: u64) {
        self.replies.on_unrouted(correlation_id);
    }

    pub fn on_authorized(&mut self, correlation_id: u64, auth_mask: u64, auth_expires: u64) {
        self.replies
            .on_authorized(correlation_id, auth_mask, auth_expires);
    }

    pub fn on_unauthorized(&mut self, correlation_id: u64) {
        self.replies.on_unauthorized(correlation_id);
    }

    pub fn on_error(&mut self, correlation_id: u64) {
        self.replies.on_error(correlation_id);
    }
}

impl Nukleus for Conductor {
    fn name(&self) -> &str {
        NAME
    }

    fn process(&mut self) -> Result<usize, BoxError> {
        let Self {
            commands,
            replies,
            acceptor,
        } = self;

        commands.read(|msg_type_id, body| handle_command(acceptor.as_mut(), replies, msg_type_id, body))
    }
}

fn handle_command(
    acceptor: &mut dyn Acceptor,
    replies: &mut ReplyEmitter,
    msg_type_id: u32,
    body: &[u8],
) -> Result<(), BoxError> {
    match Command::decode(msg_type_id, body) {
        Ok(command) => {
            debug!(
                event = events::COMMAND_DISPATCH,
                component = COMPONENT,
                tag = fields::format_tag(msg_type_id).as_str(),
                correlation_id = fields::format_id(command.correlation_id()).as_str(),
                "dispatching command"
            );
            match command {
                Command::Route(route) => acceptor.do_route(route, replies),
                Command::Unroute(unroute) => acceptor.do_unroute(unroute, replies),
                Command::Authorize(authorize) => acceptor.do_authorize(authorize, replies),
                Command::Unauthorize(unauthorize) => {
                    acceptor.do_unauthorize(unauthorize, replies)
                }
                // Realm resolution lives in a security nukleus, not in this
                // substrate; answer with a correlated error.
                Command::Resolve(resolve) => {
                    warn!(
                        event = events::COMMAND_UNSUPPORTED,
                        component = COMPONENT,
                        correlation_id = fields::format_id(resolve.correlation_id).as_str(),
                        reason = fields::REASON_NO_RESOLVER,
                        "resolve is not handled at this layer"
                    );
                    replies.on_error(resolve.correlation_id);
                    Ok(())
                }
                Command::Unresolve(unresolve) => {
                    warn!(
                        event = events::COMMAND_UNSUPPORTED,
                        component = COMPONENT,
                        correlation_id = fields::format_id(unresolve.correlation_id).as_str(),
                        reason = fields::REASON_NO_RESOLVER,
                        "unresolve is not handled at this layer"
                    );
                    replies.on_error(unresolve.correlation_id);
                    Ok(())
                }
            }
        }
        Err(err) => {
            // Recovered: a correlated error response when the 8-byte prefix
            // is readable, a dropped frame otherwise.
            match peek_frame_key(body) {
                Some(correlation_id) => {
                    warn!(
                        event = events::COMMAND_DECODE_FAILED,
                        component = COMPONENT,
                        tag = fields::format_tag(msg_type_id).as_str(),
                        correlation_id = fields::format_id(correlation_id).as_str(),
                        err = %err,
                        "command decode failed; answering with error"
                    );
                    replies.on_error(correlation_id);
                }
                None => {
                    warn!(
                        event = events::COMMAND_FRAME_DROPPED,
                        component = COMPONENT,
                        tag = fields::format_tag(msg_type_id).as_str(),
                        reason = fields::REASON_NO_CORRELATION_PREFIX,
                        err = %err,
                        "command frame dropped"
                    );
                }
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Acceptor, Conductor, ReplyEmitter};
    use crate::config::ReaktorConfig;
    use crate::error::BoxError;
    use crate::nukleus::Nukleus;
    use crate::transport::{ring_buffer, BroadcastChannel};
    use crate::types::codec::FrameWriter;
    use crate::types::control::{
        tag, AuthorizeCommand, Command, Response, Role, RouteCommand, UnauthorizeCommand,
    };

    /// Completes every command inline with the canonical success response.
    struct EchoAcceptor;

    impl Acceptor for EchoAcceptor {
        fn do_route(
            &mut self,
            route: RouteCommand,
            replies: &mut ReplyEmitter,
        ) -> Result<(), BoxError> {
            replies.on_routed(route.correlation_id, route.source_ref);
            Ok(())
        }

        fn do_unroute(
            &mut self,
            unroute: RouteCommand,
            replies: &mut ReplyEmitter,
        ) -> Result<(), BoxError> {
            replies.on_unrouted(unroute.correlation_id);
            Ok(())
        }

        fn do_authorize(
            &mut self,
            authorize: AuthorizeCommand,
            replies: &mut ReplyEmitter,
        ) -> Result<(), BoxError> {
            replies.on_authorized(authorize.correlation_id, 0xff, 0);
            Ok(())
        }

        fn do_unauthorize(
            &mut self,
            unauthorize: UnauthorizeCommand,
            replies: &mut ReplyEmitter,
        ) -> Result<(), BoxError> {
            replies.on_unauthorized(unauthorize.correlation_id);
            Ok(())
        }
    }

    struct FailingAcceptor;

    impl Acceptor for FailingAcceptor {
        fn do_route(
            &mut self,
            _route: RouteCommand,
            _replies: &mut ReplyEmitter,
        ) -> Result<(), BoxError> {
            Err("route handler fault".into())
        }

        fn do_unroute(
            &mut self,
            _unroute: RouteCommand,
            _replies: &mut ReplyEmitter,
        ) -> Result<(), BoxError> {
            unreachable!("not exercised")
        }

        fn do_authorize(
            &mut self,
            _authorize: AuthorizeCommand,
            _replies: &mut ReplyEmitter,
        ) -> Result<(), BoxError> {
            unreachable!("not exercised")
        }

        fn do_unauthorize(
            &mut self,
            _unauthorize: UnauthorizeCommand,
            _replies: &mut ReplyEmitter,
        ) -> Result<(), BoxError> {
            unreachable!("not exercised")
        }
    }

    fn harness(
        acceptor: Box<dyn Acceptor + Send>,
    ) -> (
        Conductor,
        crate::transport::RingBufferWriter,
        crate::transport::BroadcastReader,
    ) {
        let config = ReaktorConfig::default();
        let (command_writer, command_reader) = ring_buffer(config.command_buffer_capacity);
        let responses = BroadcastChannel::new(config.response_buffer_capacity);
        let response_reader = responses.attach();
        let conductor = Conductor::new(
            &config,
            command_reader,
            responses.transmitter(),
            acceptor,
        );
        (conductor, command_writer, response_reader)
    }

    fn write_command(writer: &crate::transport::RingBufferWriter, command: &Command) {
        let mut scratch = FrameWriter::with_capacity(256);
        let body = command.encode(&mut scratch);
        assert!(writer.write(command.tag(), body));
    }

    fn drain_responses(reader: &crate::transport::BroadcastReader) -> Vec<Response> {
        let mut responses = Vec::new();
        reader.read(|tag, body| responses.push(Response::decode(tag, body).unwrap()));
        responses
    }

    #[test]
    fn route_command_is_answered_with_routed() {
        let (mut conductor, commands, responses) = harness(Box::new(EchoAcceptor));
        write_command(
            &commands,
            &Command::Route(RouteCommand {
                correlation_id: 11,
                role: Role::Server,
                source: "a".to_string(),
                source_ref: 1,
                target: "b".to_string(),
                target_ref: 2,
                extension: Vec::new(),
            }),
        );

        assert_eq!(conductor.process().unwrap(), 1);
        assert_eq!(
            drain_responses(&responses),
            vec![Response::Routed {
                correlation_id: 11,
                source_ref: 1,
            }]
        );
    }

    #[test]
    fn unknown_tag_recovers_with_correlated_error() {
        let (mut conductor, commands, responses) = harness(Box::new(EchoAcceptor));
        let mut body = Vec::new();
        body.extend_from_slice(&77u64.to_le_bytes());
        assert!(commands.write(0x0000_7777, &body));

        assert_eq!(conductor.process().unwrap(), 1);
        assert_eq!(
            drain_responses(&responses),
            vec![Response::Error { correlation_id: 77 }]
        );
    }

    #[test]
    fn frame_without_prefix_is_dropped_not_answered() {
        let (mut conductor, commands, responses) = harness(Box::new(EchoAcceptor));
        assert!(commands.write(0x0000_7777, &[1, 2, 3]));

        assert_eq!(conductor.process().unwrap(), 1);
        assert!(drain_responses(&responses).is_empty());
    }

    #[test]
    fn resolve_routes_through_the_error_fallback() {
        let (mut conductor, commands, responses) = harness(Box::new(EchoAcceptor));
        write_command(
            &commands,
            &Command::Resolve(crate::types::control::ResolveCommand {
                correlation_id: 5,
                realm: "security".to_string(),
                roles: vec!["role".to_string()],
            }),
        );

        assert_eq!(conductor.process().unwrap(), 1);
        assert_eq!(
            drain_responses(&responses),
            vec![Response::Error { correlation_id: 5 }]
        );
    }

    #[test]
    fn acceptor_fault_is_fatal_to_the_turn() {
        let (mut conductor, commands, responses) = harness(Box::new(FailingAcceptor));
        write_command(
            &commands,
            &Command::Route(RouteCommand {
                correlation_id: 1,
                role: Role::Client,
                source: "a".to_string(),
                source_ref: 1,
                target: "b".to_string(),
                target_ref: 2,
                extension: Vec::new(),
            }),
        );

        assert!(conductor.process().is_err());
        assert!(drain_responses(&responses).is_empty());
    }

    #[test]
    fn faulted_command_is_not_redispatched() {
        let (mut conductor, commands, _responses) = harness(Box::new(FailingAcceptor));
        write_command(
            &commands,
            &Command::Route(RouteCommand {
                correlation_id: 2,
                role: Role::Client,
                source: "a".to_string(),
                source_ref: 1,
                target: "b".to_string(),
                target_ref: 2,
                extension: Vec::new(),
            }),
        );

        assert!(conductor.process().is_err());
        // The acceptor fires once per command; the faulted frame is gone.
        assert_eq!(conductor.process().unwrap(), 0);
    }

    #[test]
    fn deferred_completion_emits_from_a_later_turn() {
        let (mut conductor, _commands, responses) = harness(Box::new(EchoAcceptor));

        conductor.on_authorized(21, 0x3, 10_000);

        let emitted = drain_responses(&responses);
        assert_eq!(
            emitted,
            vec![Response::Authorized {
                correlation_id: 21,
                auth_mask: 0x3,
                auth_expires: 10_000,
            }]
        );
        assert_eq!(emitted[0].tag(), tag::AUTHORIZED);
    }
}
