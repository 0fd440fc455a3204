use reaktor::transport::{ring_buffer, BroadcastChannel};
use reaktor::types::control::{AuthorizeCommand, RouteCommand, UnauthorizeCommand};
use reaktor::{Acceptor, BoxError, Conductor, Controller, ReaktorConfig, ReplyEmitter, Role};
use std::sync::Once;

pub(crate) fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Role count past which the recording acceptor refuses to authorize.
#[allow(dead_code)]
pub(crate) const MAX_AUTHORIZE_ROLES: usize = 16;

/// Acceptor completing commands inline with deterministic assignments:
/// server routes get freshly allocated source refs counting up from 1,
/// client routes echo the requested ref, and authorize grants one mask bit
/// per role until [`MAX_AUTHORIZE_ROLES`] is exceeded.
#[allow(dead_code)]
pub(crate) struct RecordingAcceptor {
    next_source_ref: u64,
}

#[allow(dead_code)]
impl RecordingAcceptor {
    pub(crate) fn new() -> Self {
        Self { next_source_ref: 1 }
    }
}

impl Acceptor for RecordingAcceptor {
    fn do_route(&mut self, route: RouteCommand, replies: &mut ReplyEmitter) -> Result<(), BoxError> {
        let source_ref = match route.role {
            Role::Server => {
                let allocated = self.next_source_ref;
                self.next_source_ref += 1;
                allocated
            }
            Role::Client => route.source_ref,
        };
        replies.on_routed(route.correlation_id, source_ref);
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
        if authorize.roles.len() > MAX_AUTHORIZE_ROLES {
            replies.on_error(authorize.correlation_id);
            return Ok(());
        }

        let auth_mask = (0..authorize.roles.len()).fold(0u64, |mask, bit| mask | (1 << bit));
        replies.on_authorized(authorize.correlation_id, auth_mask, 0);
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

/// One connected conductor/controller pair over fresh channels.
#[allow(dead_code)]
pub(crate) fn control_pair(controller_name: &str) -> (Conductor, Controller) {
    let config = ReaktorConfig::default();
    let (command_writer, command_reader) = ring_buffer(config.command_buffer_capacity);
    let responses = BroadcastChannel::new(config.response_buffer_capacity);

    let controller = Controller::new(controller_name, &config, command_writer, responses.attach());
    let conductor = Conductor::new(
        &config,
        command_reader,
        responses.transmitter(),
        Box::new(RecordingAcceptor::new()),
    );

    (conductor, controller)
}
