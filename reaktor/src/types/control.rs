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

//! Control-plane command and response schemas.
//!
//! Every body starts with the 8-byte `correlation_id` so a malformed frame
//! can still be answered with a correlated `Error`.

use crate::error::DecodeError;
use crate::types::codec::{FrameCursor, FrameWriter};

/// Control-plane type tags. Commands count up from one; responses carry the
/// reply bit.
pub mod tag {
    pub const ROUTE: u32 = 0x0000_0001;
    pub const UNROUTE: u32 = 0x0000_0002;
    pub const AUTHORIZE: u32 = 0x0000_0003;
    pub const UNAUTHORIZE: u32 = 0x0000_0004;
    pub const RESOLVE: u32 = 0x0000_0005;
    pub const UNRESOLVE: u32 = 0x0000_0006;

    pub const ERROR: u32 = 0x4000_0000;
    pub const ROUTED: u32 = 0x4000_0001;
    pub const UNROUTED: u32 = 0x4000_0002;
    pub const AUTHORIZED: u32 = 0x4000_0003;
    pub const UNAUTHORIZED: u32 = 0x4000_0004;
}

/// Direction tag on a route.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Role {
    Client,
    Server,
}

impl Role {
    pub(crate) fn to_u8(self) -> u8 {
        match self {
            Role::Client => 0,
            Role::Server => 1,
        }
    }

    pub(crate) fn from_u8(value: u8) -> Result<Self, DecodeError> {
        match value {
            0 => Ok(Role::Client),
            1 => Ok(Role::Server),
            other => Err(DecodeError::InvalidRole { value: other }),
        }
    }
}

/// Body shared by `Route` and `Unroute`.
#[derive(Clone, Debug, PartialEq)]
pub struct RouteCommand {
    pub correlation_id: u64,
    pub role: Role,
    pub source: String,
    pub source_ref: u64,
    pub target: String,
    pub target_ref: u64,
    pub extension: Vec<u8>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AuthorizeCommand {
    pub correlation_id: u64,
    pub source_ref: u64,
    pub security_nukleus: String,
    /// Ordered; sequence order is meaningful to the resolver.
    pub roles: Vec<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct UnauthorizeCommand {
    pub correlation_id: u64,
    pub source_ref: u64,
    pub security_nukleus: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ResolveCommand {
    pub correlation_id: u64,
    pub realm: String,
    pub roles: Vec<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct UnresolveCommand {
    pub correlation_id: u64,
    pub realm_id: u64,
}

/// Control-plane request, decoded once per frame and exhaustively matched.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    Route(RouteCommand),
    Unroute(RouteCommand),
    Authorize(AuthorizeCommand),
    Unauthorize(UnauthorizeCommand),
    Resolve(ResolveCommand),
    Unresolve(UnresolveCommand),
}

impl Command {
    pub fn tag(&self) -> u32 {
        match self {
            Command::Route(_) => tag::ROUTE,
            Command::Unroute(_) => tag::UNROUTE,
            Command::Authorize(_) => tag::AUTHORIZE,
            Command::Unauthorize(_) => tag::UNAUTHORIZE,
            Command::Resolve(_) => tag::RESOLVE,
            Command::Unresolve(_) => tag::UNRESOLVE,
        }
    }

    pub fn correlation_id(&self) -> u64 {
        match self {
            Command::Route(body) | Command::Unroute(body) => body.correlation_id,
            Command::Authorize(body) => body.correlation_id,
            Command::Unauthorize(body) => body.correlation_id,
            Command::Resolve(body) => body.correlation_id,
            Command::Unresolve(body) => body.correlation_id,
        }
    }

    /// Encodes into the scratch writer and exposes the written sub-range.
    pub fn encode<'a>(&self, writer: &'a mut FrameWriter) -> &'a [u8] {
        writer.begin();
        match self {
            Command::Route(body) | Command::Unroute(body) => {
                writer
                    .put_u64(body.correlation_id)
                    .put_u8(body.role.to_u8())
                    .put_u64(body.source_ref)
                    .put_u64(body.target_ref)
                    .put_str(&body.source)
                    .put_str(&body.target)
                    .put_bytes(&body.extension);
            }
            Command::Authorize(body) => {
                writer
                    .put_u64(body.correlation_id)
                    .put_u64(body.source_ref)
                    .put_str(&body.security_nukleus)
                    .put_str_seq(&body.roles);
            }
            Command::Unauthorize(body) => {
                writer
                    .put_u64(body.correlation_id)
                    .put_u64(body.source_ref)
                    .put_str(&body.security_nukleus);
            }
            Command::Resolve(body) => {
                writer
                    .put_u64(body.correlation_id)
                    .put_str(&body.realm)
                    .put_str_seq(&body.roles);
            }
            Command::Unresolve(body) => {
                writer
                    .put_u64(body.correlation_id)
                    .put_u64(body.realm_id);
            }
        }
        writer.written()
    }

    pub fn decode(msg_type_id: u32, body: &[u8]) -> Result<Self, DecodeError> {
        let mut cursor = FrameCursor::new(body);
        match msg_type_id {
            tag::ROUTE => Ok(Command::Route(decode_route(&mut cursor)?)),
            tag::UNROUTE => Ok(Command::Unroute(decode_route(&mut cursor)?)),
            tag::AUTHORIZE => Ok(Command::Authorize(AuthorizeCommand {
                correlation_id: cursor.get_u64()?,
                source_ref: cursor.get_u64()?,
                security_nukleus: cursor.get_str()?,
                roles: cursor.get_str_seq()?,
            })),
            tag::UNAUTHORIZE => Ok(Command::Unauthorize(UnauthorizeCommand {
                correlation_id: cursor.get_u64()?,
                source_ref: cursor.get_u64()?,
                security_nukleus: cursor.get_str()?,
            })),
            tag::RESOLVE => Ok(Command::Resolve(ResolveCommand {
                correlation_id: cursor.get_u64()?,
                realm: cursor.get_str()?,
                roles: cursor.get_str_seq()?,
            })),
            tag::UNRESOLVE => Ok(Command::Unresolve(UnresolveCommand {
                correlation_id: cursor.get_u64()?,
                realm_id: cursor.get_u64()?,
            })),
            other => Err(DecodeError::UnknownTag { tag: other }),
        }
    }
}

fn decode_route(cursor: &mut FrameCursor<'_>) -> Result<RouteCommand, DecodeError> {
    Ok(RouteCommand {
        correlation_id: cursor.get_u64()?,
        role: Role::from_u8(cursor.get_u8()?)?,
        source_ref: cursor.get_u64()?,
        target_ref: cursor.get_u64()?,
        source: cursor.get_str()?,
        target: cursor.get_str()?,
        extension: cursor.get_bytes()?,
    })
}

/// Control-plane reply, matched by correlation id on the broadcast side.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Response {
    Routed {
        correlation_id: u64,
        source_ref: u64,
    },
    Unrouted {
        correlation_id: u64,
    },
    Authorized {
        correlation_id: u64,
        auth_mask: u64,
        auth_expires: u64,
    },
    Unauthorized {
        correlation_id: u64,
    },
    Error {
        correlation_id: u64,
    },
}

impl Response {
    pub fn tag(&self) -> u32 {
        match self {
            Response::Routed { .. } => tag::ROUTED,
            Response::Unrouted { .. } => tag::UNROUTED,
            Response::Authorized { .. } => tag::AUTHORIZED,
            Response::Unauthorized { .. } => tag::UNAUTHORIZED,
            Response::Error { .. } => tag::ERROR,
        }
    }

    pub fn correlation_id(&self) -> u64 {
        match self {
            Response::Routed { correlation_id, .. }
            | Response::Unrouted { correlation_id }
            | Response::Authorized { correlation_id, .. }
            | Response::Unauthorized { correlation_id }
            | Response::Error { correlation_id } => *correlation_id,
        }
    }

    pub fn encode<'a>(&self, writer: &'a mut FrameWriter) -> &'a [u8] {
        writer.begin();
        match self {
            Response::Routed {
                correlation_id,
                source_ref,
            } => {
                writer.put_u64(*correlation_id).put_u64(*source_ref);
            }
            Response::Authorized {
                correlation_id,
                auth_mask,
                auth_expires,
            } => {
                writer
                    .put_u64(*correlation_id)
                    .put_u64(*auth_mask)
                    .put_u64(*auth_expires);
            }
            Response::Unrouted { correlation_id }
            | Response::Unauthorized { correlation_id }
            | Response::Error { correlation_id } => {
                writer.put_u64(*correlation_id);
            }
        }
        writer.written()
    }

    pub fn decode(msg_type_id: u32, body: &[u8]) -> Result<Self, DecodeError> {
        let mut cursor = FrameCursor::new(body);
        match msg_type_id {
            tag::ROUTED => Ok(Response::Routed {
                correlation_id: cursor.get_u64()?,
                source_ref: cursor.get_u64()?,
            }),
            tag::UNROUTED => Ok(Response::Unrouted {
                correlation_id: cursor.get_u64()?,
            }),
            tag::AUTHORIZED => Ok(Response::Authorized {
                correlation_id: cursor.get_u64()?,
                auth_mask: cursor.get_u64()?,
                auth_expires: cursor.get_u64()?,
            }),
            tag::UNAUTHORIZED => Ok(Response::Unauthorized {
                correlation_id: cursor.get_u64()?,
            }),
            tag::ERROR => Ok(Response::Error {
                correlation_id: cursor.get_u64()?,
            }),
            other => Err(DecodeError::UnknownTag { tag: other }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{tag, AuthorizeCommand, Command, Response, Role, RouteCommand};
    use crate::error::DecodeError;
    use crate::types::codec::FrameWriter;

    fn route_command(correlation_id: u64) -> RouteCommand {
        RouteCommand {
            correlation_id,
            role: Role::Server,
            source: "tcp".to_string(),
            source_ref: 1,
            target: "example".to_string(),
            target_ref: 2,
            extension: vec![0xde, 0xad],
        }
    }

    #[test]
    fn route_round_trips_through_scratch_writer() {
        let command = Command::Route(route_command(0x1234));
        let mut writer = FrameWriter::with_capacity(128);

        let body = command.encode(&mut writer).to_vec();
        let decoded = Command::decode(tag::ROUTE, &body).unwrap();

        assert_eq!(decoded, command);
        assert_eq!(decoded.correlation_id(), 0x1234);
    }

    #[test]
    fn authorize_preserves_role_sequence_order() {
        let command = Command::Authorize(AuthorizeCommand {
            correlation_id: 9,
            source_ref: 1,
            security_nukleus: "security".to_string(),
            roles: vec!["first".to_string(), "second".to_string()],
        });
        let mut writer = FrameWriter::with_capacity(128);

        let body = command.encode(&mut writer).to_vec();
        match Command::decode(tag::AUTHORIZE, &body).unwrap() {
            Command::Authorize(decoded) => {
                assert_eq!(decoded.roles, vec!["first", "second"]);
            }
            other => panic!("decoded wrong variant: {other:?}"),
        }
    }

    #[test]
    fn unroute_and_route_share_body_schema() {
        let body_source = Command::Route(route_command(3));
        let mut writer = FrameWriter::with_capacity(128);
        let body = body_source.encode(&mut writer).to_vec();

        let decoded = Command::decode(tag::UNROUTE, &body).unwrap();
        assert_eq!(decoded, Command::Unroute(route_command(3)));
    }

    #[test]
    fn responses_round_trip() {
        let mut writer = FrameWriter::with_capacity(64);
        let cases = [
            Response::Routed {
                correlation_id: 1,
                source_ref: 7,
            },
            Response::Unrouted { correlation_id: 2 },
            Response::Authorized {
                correlation_id: 3,
                auth_mask: 0xff,
                auth_expires: 10_000,
            },
            Response::Unauthorized { correlation_id: 4 },
            Response::Error { correlation_id: 5 },
        ];

        for response in cases {
            let body = response.encode(&mut writer).to_vec();
            assert_eq!(Response::decode(response.tag(), &body).unwrap(), response);
        }
    }

    #[test]
    fn unknown_tag_is_explicit_not_a_silent_default() {
        assert_eq!(
            Command::decode(0x0000_7777, &[0u8; 16]),
            Err(DecodeError::UnknownTag { tag: 0x0000_7777 })
        );
    }

    #[test]
    fn invalid_role_byte_fails_decode() {
        let mut writer = FrameWriter::with_capacity(64);
        let body = Command::Route(route_command(1)).encode(&mut writer).to_vec();
        let mut corrupted = body;
        corrupted[8] = 9;

        assert_eq!(
            Command::decode(tag::ROUTE, &corrupted),
            Err(DecodeError::InvalidRole { value: 9 })
        );
    }
}
