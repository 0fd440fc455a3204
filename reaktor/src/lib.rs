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

//! # reaktor
//!
//! `reaktor` is an in-process substrate for composing network functions as
//! cooperatively scheduled nuklei: single-threaded reactors polled for
//! turns over shared-nothing in-memory channels.
//!
//! The control plane correlates commands with broadcast responses through
//! [`Controller`] and [`Conductor`]; the data plane multiplexes logical
//! streams over per-destination channels through [`Target`], with window
//! and reset frames flowing back to each stream's registered owner.
//!
//! ## Command round trip
//!
//! ```
//! use reaktor::transport::{ring_buffer, BroadcastChannel};
//! use reaktor::types::control::{AuthorizeCommand, RouteCommand, UnauthorizeCommand};
//! use reaktor::{
//!     Acceptor, BoxError, Conductor, ControlOutcome, Controller, Nukleus, ReaktorConfig,
//!     ReplyEmitter, Role,
//! };
//!
//! /// Completes every command inline.
//! struct EchoAcceptor;
//!
//! impl Acceptor for EchoAcceptor {
//!     fn do_route(
//!         &mut self,
//!         route: RouteCommand,
//!         replies: &mut ReplyEmitter,
//!     ) -> Result<(), BoxError> {
//!         replies.on_routed(route.correlation_id, route.source_ref);
//!         Ok(())
//!     }
//!
//!     fn do_unroute(
//!         &mut self,
//!         unroute: RouteCommand,
//!         replies: &mut ReplyEmitter,
//!     ) -> Result<(), BoxError> {
//!         replies.on_unrouted(unroute.correlation_id);
//!         Ok(())
//!     }
//!
//!     fn do_authorize(
//!         &mut self,
//!         authorize: AuthorizeCommand,
//!         replies: &mut ReplyEmitter,
//!     ) -> Result<(), BoxError> {
//!         replies.on_authorized(authorize.correlation_id, 0x1, 0);
//!         Ok(())
//!     }
//!
//!     fn do_unauthorize(
//!         &mut self,
//!         unauthorize: UnauthorizeCommand,
//!         replies: &mut ReplyEmitter,
//!     ) -> Result<(), BoxError> {
//!         replies.on_unauthorized(unauthorize.correlation_id);
//!         Ok(())
//!     }
//! }
//!
//! let config = ReaktorConfig::default();
//! let (command_writer, command_reader) = ring_buffer(config.command_buffer_capacity);
//! let responses = BroadcastChannel::new(config.response_buffer_capacity);
//!
//! let mut controller = Controller::new("tcp", &config, command_writer, responses.attach());
//! let mut conductor = Conductor::new(
//!     &config,
//!     command_reader,
//!     responses.transmitter(),
//!     Box::new(EchoAcceptor),
//! );
//!
//! let mut pending = controller
//!     .route(Role::Server, "tcp", 8080, "echo", 0, &[])
//!     .unwrap();
//!
//! // One turn each: the conductor answers, the controller resolves.
//! conductor.process().unwrap();
//! controller.process().unwrap();
//!
//! assert_eq!(
//!     pending.try_outcome(),
//!     Some(Ok(ControlOutcome::Routed { source_ref: 8080 }))
//! );
//! ```
//!
//! ## Internal architecture map
//!
//! - Types: frame data model and the little-endian wire codec
//! - Transport: bounded ring buffers and the response broadcast channel
//! - Control plane: command dispatch, response correlation
//! - Data plane: per-destination stream multiplexing and flow control
//! - Runtime: thread hosting for polled nuklei
//!
//! ## Observability model
//!
//! The workspace uses `tracing` for logs/events.
//! Library code emits events/spans and does not unconditionally initialize a
//! global subscriber. Binaries and tests are responsible for one-time
//! `tracing_subscriber` initialization at process boundaries.

mod config;
pub use config::{ConfigError, ReaktorConfig};

mod error;
pub use error::{BoxError, ControlError, DecodeError, TargetError};

mod nukleus;
pub use nukleus::Nukleus;

mod control_plane;
pub use control_plane::{Acceptor, Conductor, ControlOutcome, Controller, PendingResponse, ReplyEmitter};

mod data_plane;
pub use data_plane::{Target, ThrottleHandler};

mod runtime;
pub use runtime::NukleusRunner;

#[doc(hidden)]
pub mod observability;
pub mod transport;
pub mod types;

pub use types::control::Role;
