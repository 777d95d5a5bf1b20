#![expect(
    clippy::module_name_repetitions,
    reason = "Error types include the module name to indicate their scope"
)]

use std::error::Error as StdError;
use std::fmt;
use std::time::Duration;

use reqwest::StatusCode;

/// Everything that can go wrong on the event stream.
///
/// Only [`RetryBudgetExhausted`](Self::RetryBudgetExhausted) ends the logical stream.
/// Transport variants trigger a reconnection; [`MessageParse`](Self::MessageParse) drops
/// a single frame and leaves the connection open.
#[non_exhaustive]
#[derive(Debug)]
pub enum StreamError {
    /// Error opening or reading the underlying connection
    Connection(Box<dyn StdError + Send + Sync + 'static>),
    /// The event endpoint answered with a non-success status
    Status(StatusCode),
    /// The server closed the stream
    ConnectionClosed,
    /// No frame arrived within the configured idle timeout
    IdleTimeout(Duration),
    /// A frame that is neither a control token nor a valid event
    MessageParse {
        /// The raw frame data
        frame: String,
        source: serde_json::Error,
    },
    /// Every reconnection attempt failed; the stream will not reconnect on its own
    RetryBudgetExhausted {
        /// Number of reconnection attempts that were made
        attempts: u32,
    },
}

impl StreamError {
    /// Wrap any transport failure.
    pub fn connection<E: StdError + Send + Sync + 'static>(error: E) -> Self {
        Self::Connection(Box::new(error))
    }

    /// Whether this error ends the logical stream.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::RetryBudgetExhausted { .. })
    }

    /// Whether this error dropped the connection (and so counts against the retry budget).
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Connection(_) | Self::Status(_) | Self::ConnectionClosed | Self::IdleTimeout(_)
        )
    }
}

impl fmt::Display for StreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connection(e) => write!(f, "event stream connection error: {e}"),
            Self::Status(status) => write!(f, "event stream endpoint returned {status}"),
            Self::ConnectionClosed => write!(f, "event stream closed by server"),
            Self::IdleTimeout(after) => write!(f, "event stream idle for {after:?}"),
            Self::MessageParse { frame, source } => {
                write!(f, "failed to parse event frame {frame:?}: {source}")
            }
            Self::RetryBudgetExhausted { attempts } => write!(
                f,
                "event stream lost after {attempts} reconnection attempts, restart required"
            ),
        }
    }
}

impl StdError for StreamError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Connection(e) => Some(e.as_ref()),
            Self::MessageParse { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for StreamError {
    fn from(e: reqwest::Error) -> Self {
        Self::connection(e)
    }
}

impl From<StreamError> for crate::error::Error {
    fn from(e: StreamError) -> Self {
        crate::error::Error::with_source(crate::error::Kind::Stream, e)
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;
    use crate::error::{Error, Kind};

    #[test]
    fn classification() {
        let refused = StreamError::connection(io::Error::from(io::ErrorKind::ConnectionRefused));
        assert!(refused.is_transport(), "refused connection is a transport error");
        assert!(!refused.is_terminal(), "transport errors are retried");

        let exhausted = StreamError::RetryBudgetExhausted { attempts: 5 };
        assert!(exhausted.is_terminal(), "exhausted budget is terminal");
        assert!(!exhausted.is_transport(), "exhausted budget is not a transport error");

        let parse = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let parse = StreamError::MessageParse {
            frame: "{".to_owned(),
            source: parse,
        };
        assert!(!parse.is_transport() && !parse.is_terminal(), "parse errors are local");
        assert!(parse.source().is_some(), "parse error keeps its cause");
    }

    #[test]
    fn converts_into_stream_kind() {
        let error: Error = StreamError::Status(StatusCode::SERVICE_UNAVAILABLE).into();

        assert_eq!(error.kind(), Kind::Stream);
        assert_eq!(
            error.to_string(),
            "Stream: event stream endpoint returned 503 Service Unavailable"
        );
        assert!(matches!(
            error.downcast_ref::<StreamError>(),
            Some(StreamError::Status(StatusCode::SERVICE_UNAVAILABLE))
        ));
    }
}
