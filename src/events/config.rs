use std::time::Duration;

use backoff::backoff::Constant;
use bon::Builder;

const DEFAULT_MAX_RECONNECT_ATTEMPTS: u32 = 5;
const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(3);

/// Reconnection policy for a [`StreamClient`](super::StreamClient).
///
/// The defaults mirror the dashboard's behavior: five attempts, three seconds apart,
/// and no idle timeout.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Builder)]
pub struct Config {
    /// Consecutive reconnection attempts allowed before the stream is declared failed.
    /// Zero disables reconnection entirely.
    #[builder(default = DEFAULT_MAX_RECONNECT_ATTEMPTS)]
    pub max_reconnect_attempts: u32,
    /// Fixed wait between a connection error and the next attempt.
    #[builder(default = DEFAULT_RECONNECT_DELAY)]
    pub reconnect_delay: Duration,
    /// Treat an open connection that stays silent this long as dropped. The server pings
    /// every ten seconds, so anything comfortably above that works. Unset by default.
    pub idle_timeout: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Config::builder().build()
    }
}

impl From<&Config> for Constant {
    fn from(config: &Config) -> Self {
        Constant::new(config.reconnect_delay)
    }
}
