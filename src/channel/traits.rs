use std::fmt;
use std::sync::Arc;

use crate::error::ChannelError;

/// One positional command argument.
///
/// Almost everything on the wire is text; vector query parameters are raw
/// little-endian float blobs.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    Str(String),
    Blob(Vec<u8>),
}

impl Arg {
    /// Text content, if this argument is not a blob.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Arg::Str(s) => Some(s),
            Arg::Blob(_) => None,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Arg::Str(s) => s.as_bytes(),
            Arg::Blob(b) => b,
        }
    }
}

impl fmt::Display for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Str(s) => write!(f, "{}", s),
            Arg::Blob(b) => write!(f, "<blob {} bytes>", b.len()),
        }
    }
}

impl From<&str> for Arg {
    fn from(s: &str) -> Self {
        Arg::Str(s.to_string())
    }
}

impl From<String> for Arg {
    fn from(s: String) -> Self {
        Arg::Str(s)
    }
}

impl From<&String> for Arg {
    fn from(s: &String) -> Self {
        Arg::Str(s.clone())
    }
}

impl From<Vec<u8>> for Arg {
    fn from(b: Vec<u8>) -> Self {
        Arg::Blob(b)
    }
}

macro_rules! arg_from_integer {
    ($($t:ty),*) => {
        $(impl From<$t> for Arg {
            fn from(n: $t) -> Self {
                Arg::Str(n.to_string())
            }
        })*
    };
}

arg_from_integer!(u32, u64, usize, i64);

impl PartialEq<str> for Arg {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == Some(other)
    }
}

impl PartialEq<&str> for Arg {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == Some(*other)
    }
}

/// Encode a vector as the little-endian FLOAT32 blob the server expects.
pub fn f32_blob(vector: &[f32]) -> Vec<u8> {
    vector.iter().flat_map(|v| v.to_le_bytes()).collect()
}

/// A decoded reply from the command channel.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Nil,
    Integer(i64),
    /// Simple status line such as `OK`.
    Status(String),
    /// UTF-8 bulk string.
    Bulk(String),
    /// Bulk string that is not valid UTF-8.
    Blob(Vec<u8>),
    Array(Vec<Reply>),
}

impl Reply {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Reply::Status(s) | Reply::Bulk(s) => Some(s),
            _ => None,
        }
    }

    /// Integer value; numeric bulk strings are accepted too since some
    /// servers send counts as text.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Reply::Integer(n) => Some(*n),
            Reply::Bulk(s) => s.parse().ok(),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Reply]> {
        match self {
            Reply::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn into_array(self) -> Option<Vec<Reply>> {
        match self {
            Reply::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Reply::Nil)
    }
}

impl From<&str> for Reply {
    fn from(s: &str) -> Self {
        Reply::Bulk(s.to_string())
    }
}

impl From<i64> for Reply {
    fn from(n: i64) -> Self {
        Reply::Integer(n)
    }
}

impl From<Vec<Reply>> for Reply {
    fn from(items: Vec<Reply>) -> Self {
        Reply::Array(items)
    }
}

/// Request/reply transport for positional commands.
///
/// One call sends one command and blocks for its reply. Implementations must
/// serialize concurrent callers themselves.
pub trait CommandChannel: Send + Sync {
    fn execute(&self, command: &str, args: &[Arg]) -> Result<Reply, ChannelError>;
}

impl<C: CommandChannel + ?Sized> CommandChannel for Arc<C> {
    fn execute(&self, command: &str, args: &[Arg]) -> Result<Reply, ChannelError> {
        (**self).execute(command, args)
    }
}

impl<C: CommandChannel + ?Sized> CommandChannel for &C {
    fn execute(&self, command: &str, args: &[Arg]) -> Result<Reply, ChannelError> {
        (**self).execute(command, args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arg_compares_with_str() {
        let args: Vec<Arg> = vec!["LIMIT".into(), 0usize.into(), 10u32.into()];
        assert_eq!(args, ["LIMIT", "0", "10"]);
    }

    #[test]
    fn test_blob_never_equals_text() {
        let arg = Arg::Blob(b"abc".to_vec());
        assert!(arg != "abc");
        assert_eq!(arg.to_string(), "<blob 3 bytes>");
    }

    #[test]
    fn test_f32_blob_is_little_endian() {
        let blob = f32_blob(&[1.0, -2.5]);
        assert_eq!(blob.len(), 8);
        assert_eq!(&blob[..4], &1.0f32.to_le_bytes());
        assert_eq!(&blob[4..], &(-2.5f32).to_le_bytes());
    }

    #[test]
    fn test_reply_integer_from_bulk() {
        assert_eq!(Reply::Bulk("42".into()).as_integer(), Some(42));
        assert_eq!(Reply::Bulk("abc".into()).as_integer(), None);
        assert_eq!(Reply::Status("OK".into()).as_str(), Some("OK"));
    }
}
