// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Error types.
//!
//! Three families, raised at different points of a call:
//!
//! - [`SchemaError`]: schema declaration problems, raised while fields are
//!   being declared, before anything touches the wire.
//! - [`ValidationError`]: bad input to an index operation, raised before the
//!   command is sent.
//! - [`ChannelError`]: failures reported by the command channel, passed
//!   through untouched.
//!
//! [`SearchError`] wraps all of them for the index-level API.

use thiserror::Error;

/// Result alias for index-level operations.
pub type Result<T> = std::result::Result<T, SearchError>;

/// Errors raised while declaring fields and schemas.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    #[error("Field name must not be empty")]
    EmptyFieldName,
    #[error("Unknown option '{option}' for {kind} field '{field}'")]
    UnknownOption {
        field: String,
        kind: &'static str,
        option: String,
    },
    #[error("Invalid value {value} for option '{option}' on field '{field}'")]
    InvalidOptionValue {
        field: String,
        option: String,
        value: String,
    },
    #[error("Invalid phonetic matcher '{matcher}' on field '{field}' (expected dm:en, dm:fr, dm:pt or dm:es)")]
    InvalidPhonetic { field: String, matcher: String },
    #[error("Vector attribute '{attribute}' is not valid for field '{field}': {reason}")]
    InvalidVectorAttribute {
        field: String,
        attribute: &'static str,
        reason: String,
    },
    #[error("Field '{0}' is declared more than once")]
    DuplicateField(String),
}

/// Errors raised before a command is sent because its input is unusable.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Field '{field}' is numeric but got non-numeric value {value:?}")]
    NonNumericValue { field: String, value: String },
    #[error("Schema must declare at least one field")]
    EmptySchema,
    #[error("Schema rejected for index '{index}': {message}")]
    InvalidSchema { index: String, message: String },
}

/// Errors reported by a [`CommandChannel`](crate::channel::CommandChannel).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChannelError {
    /// The server answered with an error reply.
    #[error("Server error: {0}")]
    Server(String),
    /// The connection could not be opened or was lost.
    #[error("Connection error: {0}")]
    Connection(String),
    /// The reply could not be decoded.
    #[error("Protocol error: {0}")]
    Protocol(String),
}

/// Umbrella error for the index API.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SearchError {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Channel(#[from] ChannelError),
    #[error("Unexpected reply: expected {expected}, got {actual}")]
    UnexpectedReply {
        expected: &'static str,
        actual: String,
    },
}

impl SearchError {
    pub(crate) fn unexpected(expected: &'static str, actual: impl std::fmt::Debug) -> Self {
        SearchError::UnexpectedReply {
            expected,
            actual: format!("{:?}", actual),
        }
    }
}
