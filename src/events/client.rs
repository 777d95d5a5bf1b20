#![expect(
    clippy::module_name_repetitions,
    reason = "Stream types expose their domain in the name for clarity"
)]

use std::cell::Cell;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::{Duration, Instant};

use backoff::backoff::{Backoff as _, Constant};
use futures::StreamExt as _;
use tokio::sync::watch;
use tokio::time::{sleep, timeout};
use tokio_util::sync::{CancellationToken, DropGuard};
use url::Url;

use super::config::Config;
use super::error::StreamError;
use super::frame::Frame;
use super::transport::{FrameStream, SseTransport, Transport};
use super::types::OrderEvent;

type EventHandler = Arc<dyn Fn(OrderEvent) + Send + Sync>;
type ErrorHandler = Arc<dyn Fn(&StreamError) + Send + Sync>;

/// Connection state of a [`StreamClient`].
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Not started, or stopped
    Disconnected,
    /// Attempting to connect
    Connecting,
    /// Receiving frames
    Open {
        /// When the connection was established
        since: Instant,
    },
    /// Waiting before the next connection attempt
    Reconnecting {
        /// Reconnection attempt about to be made, starting at one
        attempt: u32,
    },
    /// The retry budget is spent; only [`StreamClient::start`] reconnects
    Failed,
}

impl ConnectionState {
    #[must_use]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Open { .. })
    }

    #[must_use]
    pub const fn is_failed(self) -> bool {
        matches!(self, Self::Failed)
    }
}

thread_local! {
    /// Address of the [`Handlers`] whose callback is running on this thread, or zero.
    static DISPATCHING: Cell<usize> = const { Cell::new(0) };
}

#[derive(Default)]
struct Handlers {
    event: RwLock<Option<EventHandler>>,
    error: RwLock<Option<ErrorHandler>>,
    /// Held shared for the duration of every callback and exclusively by
    /// [`StreamClient::stop`], so no callback is running or can start once `stop` returns.
    gate: RwLock<()>,
}

impl Handlers {
    fn event(&self) -> Option<EventHandler> {
        self.event
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn error(&self) -> Option<ErrorHandler> {
        self.error
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn id(&self) -> usize {
        std::ptr::from_ref(self) as usize
    }

    /// Run `callback` behind the gate unless `token` has been cancelled.
    fn deliver<F: FnOnce()>(&self, token: &CancellationToken, callback: F) {
        let _gate = self.gate.read().unwrap_or_else(PoisonError::into_inner);
        if token.is_cancelled() {
            return;
        }

        let _dispatching = Dispatching::enter(self.id());
        callback();
    }

    /// Wait for running callbacks to return. A callback that stops its own stream
    /// already holds the gate, so it is not waited for.
    fn fence(&self) {
        if DISPATCHING.get() != self.id() {
            drop(self.gate.write().unwrap_or_else(PoisonError::into_inner));
        }
    }
}

/// Marks this thread as running a callback, restoring the previous mark on drop.
struct Dispatching(usize);

impl Dispatching {
    fn enter(id: usize) -> Self {
        Self(DISPATCHING.replace(id))
    }
}

impl Drop for Dispatching {
    fn drop(&mut self) {
        DISPATCHING.set(self.0);
    }
}

/// Cancels the connection task it guards when replaced, cancelled or dropped, so neither
/// [`StreamClient::start`] nor dropping the client can leave a task running.
///
/// `finished` belongs to the most recently spawned run and is cancelled once that run has
/// released its connection.
#[derive(Debug, Default)]
struct DroppingCancellationToken {
    token: Option<CancellationToken>,
    finished: Option<CancellationToken>,
}

impl DroppingCancellationToken {
    /// Cancel the current run and install a new one, returning the `finished` token of
    /// the run being replaced.
    fn replace(
        &mut self,
        token: CancellationToken,
        finished: CancellationToken,
    ) -> Option<CancellationToken> {
        self.cancel();
        self.token = Some(token);
        self.finished.replace(finished)
    }

    fn cancel(&mut self) {
        if let Some(token) = self.token.take() {
            token.cancel();
        }
    }

    fn finished(&self) -> Option<CancellationToken> {
        self.finished.clone()
    }
}

impl Drop for DroppingCancellationToken {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Reconnecting consumer of the order event stream.
///
/// Frames are classified as they arrive: `ping` and `connected` are swallowed, valid
/// events go to the [`on_event`](Self::on_event) handler in arrival order, and anything
/// else goes to the [`on_error`](Self::on_error) handler without closing the connection.
///
/// When the connection fails or drops the client waits
/// [`reconnect_delay`](Config::reconnect_delay) and tries again, up to
/// [`max_reconnect_attempts`](Config::max_reconnect_attempts) consecutive times. A
/// successful connection resets the count. Once the budget is spent the state becomes
/// [`ConnectionState::Failed`] and the error handler receives
/// [`StreamError::RetryBudgetExhausted`] exactly once.
///
/// Every connection error is also reported to the error handler as it happens, so a
/// handler that only cares about the end of the stream should check
/// [`StreamError::is_terminal`].
///
/// Dropping the client stops it.
///
/// # Example
///
/// ```no_run
/// use themenu_client::events::{Config, StreamClient};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let stream = StreamClient::new("http://localhost:3000/events".parse()?, Config::default());
/// stream.on_event(|event| println!("{}: {}", event.event_type, event.payload));
/// stream.on_error(|error| {
///     if error.is_terminal() {
///         eprintln!("{error}");
///     }
/// });
/// stream.start();
///
/// let mut state = stream.state_receiver();
/// state.wait_for(|state| state.is_failed()).await?;
/// # Ok(())
/// # }
/// ```
pub struct StreamClient<T: Transport = SseTransport> {
    endpoint: Url,
    config: Config,
    transport: Arc<T>,
    handlers: Arc<Handlers>,
    state_tx: watch::Sender<ConnectionState>,
    task: Mutex<DroppingCancellationToken>,
}

impl StreamClient<SseTransport> {
    /// Creates a client for the server-sent event endpoint at `endpoint`. Nothing
    /// connects until [`start`](Self::start).
    #[must_use]
    pub fn new(endpoint: Url, config: Config) -> Self {
        Self::with_transport(endpoint, config, SseTransport::default())
    }
}

impl<T: Transport> StreamClient<T> {
    /// Creates a client that opens connections through `transport`.
    #[must_use]
    pub fn with_transport(endpoint: Url, config: Config, transport: T) -> Self {
        let (state_tx, _) = watch::channel(ConnectionState::Disconnected);

        Self {
            endpoint,
            config,
            transport: Arc::new(transport),
            handlers: Arc::default(),
            state_tx,
            task: Mutex::default(),
        }
    }

    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Register the event handler, replacing any previous one. Takes effect for the next
    /// delivered event, including on a running stream.
    pub fn on_event<F>(&self, handler: F)
    where
        F: Fn(OrderEvent) + Send + Sync + 'static,
    {
        *self
            .handlers
            .event
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(handler));
    }

    /// Register the error handler, replacing any previous one.
    pub fn on_error<F>(&self, handler: F)
    where
        F: Fn(&StreamError) + Send + Sync + 'static,
    {
        *self
            .handlers
            .error
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(handler));
    }

    /// Connect and keep the stream alive in a background task.
    ///
    /// Calling `start` again (including after the stream has failed) tears down the
    /// current connection and starts over with a fresh retry budget. The new run does
    /// not connect until the previous one has released its connection.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime.
    pub fn start(&self) {
        let token = CancellationToken::new();
        let finished = CancellationToken::new();

        let previous = self
            .task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(token.clone(), finished.clone());

        let connection = Connection {
            endpoint: self.endpoint.clone(),
            config: self.config.clone(),
            transport: Arc::clone(&self.transport),
            handlers: Arc::clone(&self.handlers),
            state_tx: self.state_tx.clone(),
            token,
            previous,
            _finished: finished.drop_guard(),
        };

        #[cfg(feature = "tracing")]
        tracing::debug!(endpoint = %self.endpoint, "starting event stream");

        self.state_tx.send_replace(ConnectionState::Connecting);
        tokio::spawn(connection.run());
    }

    /// Cancel the connection and any pending reconnection. Once this returns no handler
    /// is running and none will be invoked, and the background task drops its connection
    /// at its next wake-up; [`shutdown`](Self::shutdown) waits for that as well.
    /// Safe to call at any time, any number of times, including from a handler.
    pub fn stop(&self) {
        self.task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .cancel();
        self.handlers.fence();

        _ = self.state_tx.send_if_modified(|state| {
            if *state == ConnectionState::Disconnected {
                return false;
            }

            #[cfg(feature = "tracing")]
            tracing::debug!(endpoint = %self.endpoint, "event stream stopped");

            *state = ConnectionState::Disconnected;
            true
        });
    }

    /// [`stop`](Self::stop), then wait until the background task has released its
    /// connection. Must not be awaited from inside a handler of this client.
    pub async fn shutdown(&self) {
        self.stop();

        let finished = self
            .task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .finished();
        if let Some(finished) = finished {
            finished.cancelled().await;
        }
    }

    #[must_use]
    pub fn state(&self) -> ConnectionState {
        *self.state_tx.borrow()
    }

    /// Watch state changes.
    #[must_use]
    pub fn state_receiver(&self) -> watch::Receiver<ConnectionState> {
        self.state_tx.subscribe()
    }
}

/// One run of the connection loop, owned by its background task.
struct Connection<T: Transport> {
    endpoint: Url,
    config: Config,
    transport: Arc<T>,
    handlers: Arc<Handlers>,
    state_tx: watch::Sender<ConnectionState>,
    token: CancellationToken,
    /// Cancelled once the run this one replaces has released its connection
    previous: Option<CancellationToken>,
    /// Signals that this run has released its connection, when the task is dropped
    _finished: DropGuard,
}

impl<T: Transport> Connection<T> {
    async fn run(self) {
        // Not raced against `token`: this run only counts as finished once the one
        // before it has.
        if let Some(previous) = &self.previous {
            previous.cancelled().await;
        }

        let mut retries = 0_u32;
        let mut delay: Constant = (&self.config).into();

        loop {
            self.publish(ConnectionState::Connecting);

            let connected = tokio::select! {
                biased;
                () = self.token.cancelled() => return,
                connected = self.transport.connect(&self.endpoint) => connected,
            };

            let error = match connected {
                Ok(frames) => {
                    retries = 0;
                    delay.reset();
                    self.publish(ConnectionState::Open {
                        since: Instant::now(),
                    });

                    #[cfg(feature = "tracing")]
                    tracing::debug!(endpoint = %self.endpoint, "event stream open");

                    match self.pump(frames).await {
                        Some(error) => error,
                        None => return,
                    }
                }
                Err(error) => error,
            };

            if self.token.is_cancelled() {
                return;
            }

            #[cfg(feature = "tracing")]
            tracing::warn!(endpoint = %self.endpoint, retries, "event stream connection error: {error}");
            self.report(&error);

            if retries >= self.config.max_reconnect_attempts {
                #[cfg(feature = "tracing")]
                tracing::error!(endpoint = %self.endpoint, attempts = retries, "event stream retry budget exhausted");

                self.publish(ConnectionState::Failed);
                self.report(&StreamError::RetryBudgetExhausted { attempts: retries });
                return;
            }

            retries += 1;
            self.publish(ConnectionState::Reconnecting { attempt: retries });

            let wait = delay.next_backoff().unwrap_or(self.config.reconnect_delay);
            tokio::select! {
                biased;
                () = self.token.cancelled() => return,
                () = sleep(wait) => {}
            }
        }
    }

    /// Deliver frames until the connection drops (returning why) or the task is
    /// cancelled (returning `None`). The frame stream is dropped on return.
    async fn pump(&self, mut frames: FrameStream) -> Option<StreamError> {
        loop {
            let next = tokio::select! {
                biased;
                () = self.token.cancelled() => return None,
                next = next_frame(&mut frames, self.config.idle_timeout) => next,
            };

            match next {
                Ok(data) => self.dispatch(&data),
                Err(error) => return Some(error),
            }
        }
    }

    fn dispatch(&self, data: &str) {
        if self.token.is_cancelled() {
            return;
        }

        match Frame::classify(data) {
            Ok(Frame::Event(event)) => {
                #[cfg(feature = "tracing")]
                tracing::trace!(id = %event.id, event_type = %event.event_type, "event received");

                if let Some(handler) = self.handlers.event() {
                    self.handlers.deliver(&self.token, || handler(event));
                }
            }
            Ok(_control) => {
                #[cfg(feature = "tracing")]
                tracing::trace!(frame = data, "control frame received");
            }
            Err(error) => {
                #[cfg(feature = "tracing")]
                tracing::warn!("dropping event frame: {error}");
                self.report(&error);
            }
        }
    }

    fn report(&self, error: &StreamError) {
        if let Some(handler) = self.handlers.error() {
            self.handlers.deliver(&self.token, || handler(error));
        }
    }

    /// Publish `state` unless this run has been cancelled, in which case the state
    /// belongs to [`StreamClient::stop`] or to a newer run.
    fn publish(&self, state: ConnectionState) {
        self.state_tx.send_if_modified(|current| {
            if self.token.is_cancelled() || *current == state {
                return false;
            }
            *current = state;
            true
        });
    }
}

/// Next frame data, or the transport error that ended the connection.
async fn next_frame(
    frames: &mut FrameStream,
    idle_timeout: Option<Duration>,
) -> Result<String, StreamError> {
    let next = match idle_timeout {
        Some(limit) => timeout(limit, frames.next())
            .await
            .map_err(|_elapsed| StreamError::IdleTimeout(limit))?,
        None => frames.next().await,
    };

    next.unwrap_or(Err(StreamError::ConnectionClosed))
}
