//! Error types for memoized calls.

use std::fmt;
use thiserror::Error;

/// Result alias for memoized calls.
pub type MemoResult<T, E> = std::result::Result<T, MemoError<E>>;

/// Failure surface of a memoized call.
///
/// Upstream failures are stored and redelivered exactly as received; the
/// cache never swallows or transforms them. The codec variant is the one
/// failure mode the cache adds of its own: stored payloads cross a JSON
/// boundary, and a payload that cannot cross it is surfaced rather than
/// left to block waiters.
#[derive(Debug, Error)]
pub enum MemoError<E> {
    /// The wrapped operation failed; its error is replayed verbatim to
    /// every caller for the key until the entry goes stale.
    #[error("upstream operation failed")]
    Upstream(E),

    /// A payload could not be encoded into, or decoded out of, the store.
    /// Decoding fails when a namespace is shared by callers expecting
    /// different types.
    #[error("cache payload for '{key}' could not be {operation}: {reason}")]
    Codec {
        key: String,
        operation: CodecOp,
        reason: String,
    },
}

impl<E> MemoError<E> {
    pub(crate) fn codec(key: &str, operation: CodecOp, reason: impl Into<String>) -> Self {
        Self::Codec {
            key: key.to_string(),
            operation,
            reason: reason.into(),
        }
    }

    /// The replayed upstream error, if that is what this is.
    pub fn into_upstream(self) -> Option<E> {
        match self {
            Self::Upstream(err) => Some(err),
            Self::Codec { .. } => None,
        }
    }
}

/// Direction of a failed payload conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecOp {
    Encode,
    Decode,
}

impl fmt::Display for CodecOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Encode => write!(f, "encoded"),
            Self::Decode => write!(f, "decoded"),
        }
    }
}
