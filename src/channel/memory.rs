use parking_lot::Mutex;
use std::collections::VecDeque;

use super::traits::{Arg, CommandChannel, Reply};
use crate::error::ChannelError;

/// A command captured by [`RecordingChannel`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCommand {
    pub command: String,
    pub args: Vec<Arg>,
}

/// In-process channel that records every command and answers from a queue
/// of scripted replies.
///
/// When the queue is empty it answers `OK`. Used by the test suites and
/// handy for dry runs that only need the serialized commands.
#[derive(Default)]
pub struct RecordingChannel {
    calls: Mutex<Vec<RecordedCommand>>,
    replies: Mutex<VecDeque<Result<Reply, ChannelError>>>,
}

impl RecordingChannel {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the reply for the next unanswered command.
    pub fn push_reply(&self, reply: Reply) {
        self.replies.lock().push_back(Ok(reply));
    }

    /// Queue an error for the next unanswered command.
    pub fn push_error(&self, error: ChannelError) {
        self.replies.lock().push_back(Err(error));
    }

    /// All commands received so far, oldest first.
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCommand> {
        self.calls.lock().clone()
    }

    #[must_use]
    pub fn last_call(&self) -> Option<RecordedCommand> {
        self.calls.lock().last().cloned()
    }

    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Forget recorded commands and pending replies
    pub fn clear(&self) {
        self.calls.lock().clear();
        self.replies.lock().clear();
    }
}

impl CommandChannel for RecordingChannel {
    fn execute(&self, command: &str, args: &[Arg]) -> Result<Reply, ChannelError> {
        self.calls.lock().push(RecordedCommand {
            command: command.to_string(),
            args: args.to_vec(),
        });
        self.replies
            .lock()
            .pop_front()
            .unwrap_or_else(|| Ok(Reply::Status("OK".to_string())))
    }
}
