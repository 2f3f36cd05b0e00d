// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Command channels.
//!
//! Everything above this module produces `(command, args)` pairs and consumes
//! [`Reply`] values; the channel is the only piece that talks to a server.
//!
//! - [`RedisChannel`]: blocking connection via the `redis` crate
//! - [`RecordingChannel`]: in-memory fake that records commands and replays
//!   scripted replies

pub mod memory;
pub mod redis;
pub mod traits;

pub use memory::{RecordedCommand, RecordingChannel};
pub use self::redis::RedisChannel;
pub use traits::{f32_blob, Arg, CommandChannel, Reply};

use tracing::{debug, warn};

use crate::error::ChannelError;
use crate::metrics;

/// Send one command with logging and metrics around it.
pub(crate) fn send(
    channel: &dyn CommandChannel,
    command: &str,
    args: &[Arg],
) -> Result<Reply, ChannelError> {
    debug!(command, argc = args.len(), "Sending command");
    let _timer = metrics::LatencyTimer::new(command);

    match channel.execute(command, args) {
        Ok(reply) => {
            metrics::record_command(command, "success");
            Ok(reply)
        }
        Err(e) => {
            metrics::record_command(command, "error");
            warn!(command, error = %e, "Command failed");
            Err(e)
        }
    }
}
