use async_stream::try_stream;
use async_trait::async_trait;
use futures::StreamExt as _;
use futures::stream::BoxStream;
use reqwest::header::{ACCEPT, CACHE_CONTROL};
use url::Url;

use super::error::StreamError;
use super::sse::SseDecoder;

/// Frame data read from one open connection.
///
/// The stream ends with an error (usually [`StreamError::ConnectionClosed`]) when the
/// connection drops; a stream that simply ends is treated the same way.
pub type FrameStream = BoxStream<'static, Result<String, StreamError>>;

/// Opens connections to the event endpoint.
///
/// [`StreamClient`](super::StreamClient) owns the reconnection policy; a transport only
/// connects once per call and reports what happened.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Open a connection and return its frames.
    ///
    /// # Errors
    ///
    /// Returns a transport [`StreamError`] if the connection cannot be established.
    async fn connect(&self, endpoint: &Url) -> Result<FrameStream, StreamError>;
}

/// [`Transport`] over HTTP server-sent events.
#[derive(Clone, Debug, Default)]
pub struct SseTransport {
    client: reqwest::Client,
}

impl SseTransport {
    /// Use `client` for connections. It should not carry a total request timeout, since
    /// the response body is expected to stay open indefinitely.
    #[must_use]
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for SseTransport {
    async fn connect(&self, endpoint: &Url) -> Result<FrameStream, StreamError> {
        let response = self
            .client
            .get(endpoint.clone())
            .header(ACCEPT, "text/event-stream")
            .header(CACHE_CONTROL, "no-cache")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(StreamError::Status(status));
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(%endpoint, "event stream response received");

        let mut body = Box::pin(response.bytes_stream());
        let frames = try_stream! {
            let mut decoder = SseDecoder::new();

            while let Some(chunk) = body.next().await {
                let chunk = chunk.map_err(StreamError::from)?;
                for frame in decoder.feed(&chunk) {
                    yield frame;
                }
            }

            Err::<(), StreamError>(StreamError::ConnectionClosed)?;
        };

        Ok(frames.boxed())
    }
}
