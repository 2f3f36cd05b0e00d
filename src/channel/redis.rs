//! Redis-backed command channel.
//!
//! Sends `FT.*`, `HSET` and `JSON.SET` commands over a blocking
//! `redis::Connection`. Requires a server with the search module loaded
//! (Redis Stack):
//!
//! ```text
//! FT.CREATE idx:products ON HASH PREFIX 1 product: SCHEMA title TEXT WEIGHT 5.0
//! FT.SEARCH idx:products '@title:Hello*' LIMIT 0 10
//! ```

use parking_lot::Mutex;
use redis::{Client, Connection};

use super::traits::{Arg, CommandChannel, Reply};
use crate::config::SearchClientConfig;
use crate::error::ChannelError;

pub struct RedisChannel {
    connection: Mutex<Connection>,
}

impl RedisChannel {
    /// Connect to the server at `connection_string` (e.g. "redis://localhost:6379").
    pub fn open(connection_string: &str) -> Result<Self, ChannelError> {
        let client = Client::open(connection_string)
            .map_err(|e| ChannelError::Connection(e.to_string()))?;
        let connection = client
            .get_connection()
            .map_err(|e| ChannelError::Connection(e.to_string()))?;

        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    /// Connect using the configured `redis_url`.
    pub fn from_config(config: &SearchClientConfig) -> Result<Self, ChannelError> {
        Self::open(&config.redis_url)
    }
}

impl CommandChannel for RedisChannel {
    fn execute(&self, command: &str, args: &[Arg]) -> Result<Reply, ChannelError> {
        let mut cmd = redis::cmd(command);
        for arg in args {
            match arg {
                Arg::Str(s) => cmd.arg(s.as_str()),
                Arg::Blob(b) => cmd.arg(b.as_slice()),
            };
        }

        let mut conn = self.connection.lock();
        let value: redis::Value = cmd.query(&mut *conn).map_err(map_redis_error)?;
        Ok(Reply::from(value))
    }
}

fn map_redis_error(e: redis::RedisError) -> ChannelError {
    if e.is_io_error() || e.is_connection_dropped() || e.is_connection_refusal() {
        ChannelError::Connection(e.to_string())
    } else if e.kind() == redis::ErrorKind::TypeError {
        ChannelError::Protocol(e.to_string())
    } else {
        ChannelError::Server(e.to_string())
    }
}

impl From<redis::Value> for Reply {
    fn from(value: redis::Value) -> Self {
        match value {
            redis::Value::Nil => Reply::Nil,
            redis::Value::Int(n) => Reply::Integer(n),
            redis::Value::Data(bytes) => match String::from_utf8(bytes) {
                Ok(s) => Reply::Bulk(s),
                Err(e) => Reply::Blob(e.into_bytes()),
            },
            redis::Value::Bulk(items) => Reply::Array(items.into_iter().map(Reply::from).collect()),
            redis::Value::Status(s) => Reply::Status(s),
            redis::Value::Okay => Reply::Status("OK".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_conversion() {
        let value = redis::Value::Bulk(vec![
            redis::Value::Int(1),
            redis::Value::Data(b"product:1".to_vec()),
            redis::Value::Data(vec![0xff, 0xfe]),
            redis::Value::Okay,
            redis::Value::Nil,
        ]);

        assert_eq!(
            Reply::from(value),
            Reply::Array(vec![
                Reply::Integer(1),
                Reply::Bulk("product:1".into()),
                Reply::Blob(vec![0xff, 0xfe]),
                Reply::Status("OK".into()),
                Reply::Nil,
            ])
        );
    }

    #[test]
    fn test_open_rejects_bad_url() {
        let result = RedisChannel::open("not a url");
        assert!(matches!(result, Err(ChannelError::Connection(_))));
    }
}
