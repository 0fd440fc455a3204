//! Canonical structured event names used across `reaktor`.

// Transport events.
pub const BROADCAST_RECORD_DROPPED: &str = "broadcast_record_dropped";

// Conductor events.
pub const COMMAND_DISPATCH: &str = "command_dispatch";
pub const COMMAND_DECODE_FAILED: &str = "command_decode_failed";
pub const COMMAND_FRAME_DROPPED: &str = "command_frame_dropped";
pub const COMMAND_UNSUPPORTED: &str = "command_unsupported";
pub const RESPONSE_TRANSMIT: &str = "response_transmit";

// Controller events.
pub const COMMAND_ISSUED: &str = "command_issued";
pub const COMMAND_REJECTED: &str = "command_rejected";
pub const RESPONSE_RESOLVED: &str = "response_resolved";
pub const RESPONSE_DISCARDED: &str = "response_discarded";
pub const RESPONSE_DECODE_FAILED: &str = "response_decode_failed";

// Target events.
pub const STREAM_WRITE_REJECTED: &str = "stream_write_rejected";
pub const THROTTLE_FRAME_DROPPED: &str = "throttle_frame_dropped";
pub const THROTTLE_DISPATCH_FAILED: &str = "throttle_dispatch_failed";
pub const TARGET_CLOSE_RESETS: &str = "target_close_resets";
pub const TARGET_DETACHED: &str = "target_detached";

// Runner events.
pub const RUNNER_SPAWN_OK: &str = "runner_spawn_ok";
pub const RUNNER_TURN_FAILED: &str = "runner_turn_failed";
pub const RUNNER_STOPPED: &str = "runner_stopped";
pub const RUNNER_CLOSE_FAILED: &str = "runner_close_failed";
pub const RUNNER_THREAD_NAME_FALLBACK: &str = "runner_thread_name_fallback";
