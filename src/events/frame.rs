use super::error::StreamError;
use super::types::OrderEvent;

/// Keep-alive token the server sends every ten seconds.
pub const PING: &str = "ping";
/// Token the server sends once right after the stream opens.
pub const CONNECTED: &str = "connected";

/// A decoded frame of the event stream.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Ping,
    Connected,
    Event(OrderEvent),
}

impl Frame {
    /// Classify raw frame data. Control tokens match exactly; everything else must be
    /// an [`OrderEvent`] object.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::MessageParse`] when the data is neither.
    pub fn classify(data: &str) -> Result<Self, StreamError> {
        match data {
            PING => Ok(Self::Ping),
            CONNECTED => Ok(Self::Connected),
            _ => serde_json::from_str(data)
                .map(Self::Event)
                .map_err(|source| StreamError::MessageParse {
                    frame: data.to_owned(),
                    source,
                }),
        }
    }

    #[must_use]
    pub const fn is_control(&self) -> bool {
        matches!(self, Self::Ping | Self::Connected)
    }
}
