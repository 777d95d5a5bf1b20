//! Live event feed.
//!
//! Prints every order event published on the event stream, along with connection state
//! changes, until the stream fails or `FEED_SECONDS` (default 60) elapse.
//!
//! Run against a local order service:
//! ```sh
//! RUST_LOG=info,themenu_client=debug EVENTS_URL=http://localhost:3000/events cargo run --example event_feed --features events,tracing
//! ```

use std::time::Duration;

use themenu_client::events::{Config, StreamClient};
use tokio::time::timeout;
use tracing::{error, info, warn};
use url::Url;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let endpoint = std::env::var("EVENTS_URL")
        .unwrap_or_else(|_| "http://localhost:3000/events".to_owned());
    let run_for = std::env::var("FEED_SECONDS")
        .ok()
        .and_then(|seconds| seconds.parse().ok())
        .map_or(Duration::from_secs(60), Duration::from_secs);

    let config = Config::builder()
        .idle_timeout(Duration::from_secs(30))
        .build();
    let stream = StreamClient::new(Url::parse(&endpoint)?, config);

    stream.on_event(|event| {
        info!(
            id = %event.id,
            event_type = %event.event_type,
            status = %event.status,
            timestamp = %event.timestamp,
            payload = %event.payload,
        );
    });
    stream.on_error(|e| {
        if e.is_terminal() {
            error!(error = %e, "event stream failed");
        } else {
            warn!(error = %e);
        }
    });

    let mut state = stream.state_receiver();
    stream.start();

    let watch_state = async {
        while state.changed().await.is_ok() {
            let current = *state.borrow_and_update();
            info!(state = ?current);
            if current.is_failed() {
                break;
            }
        }
    };

    if timeout(run_for, watch_state).await.is_err() {
        info!(seconds = run_for.as_secs(), "feed finished");
    }
    stream.shutdown().await;

    Ok(())
}
