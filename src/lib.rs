//! Client SDK for the themenu order dashboard.
//!
//! | Module | Feature | What it talks to |
//! |--------|---------|------------------|
//! | [`orders`] | `orders` | `GET /orders`, `PATCH /orders/{id}/status` |
//! | [`events`] | `events` | the `/events` server-sent event stream |
//!
//! Both modules are enabled by default. The `tracing` feature adds structured logging
//! for HTTP calls, stream lifecycle changes and unknown response fields.
//!
//! # Example
//!
//! ```no_run
//! use themenu_client::events::{Config, StreamClient};
//! use themenu_client::orders::{Client, Config as OrdersConfig};
//! use themenu_client::orders::types::{OrderStatus, UpdateOrderStatusRequest};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::new("http://localhost:3000", OrdersConfig::default())?;
//!
//! let stream = StreamClient::new(client.events_endpoint()?, Config::default());
//! stream.on_event(|event| println!("{} -> {}", event.event_type, event.status));
//! stream.on_error(|error| eprintln!("event stream: {error}"));
//! stream.start();
//!
//! for order in client.active_orders().await? {
//!     let request = UpdateOrderStatusRequest::builder()
//!         .status(OrderStatus::Preparing)
//!         .build();
//!     let response = client.update_order_status(order.id, &request).await?;
//!     println!("{}", response.message);
//! }
//!
//! stream.stop();
//! # Ok(())
//! # }
//! ```

pub mod error;
#[cfg(feature = "events")]
pub mod events;
#[cfg(feature = "orders")]
pub mod orders;
pub(crate) mod serde_helpers;
pub mod types;

#[cfg(feature = "orders")]
use reqwest::Request;
#[cfg(feature = "orders")]
use serde::de::DeserializeOwned;

use crate::error::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Execute `request` and decode a JSON body, turning non-success statuses into
/// [`Kind::Status`](crate::error::Kind::Status) errors that carry the response text.
#[cfg(feature = "orders")]
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(
        level = "debug",
        skip(client, request),
        fields(
            method = %request.method(),
            path = request.url().path(),
            status_code
        )
    )
)]
async fn request<Response: DeserializeOwned>(
    client: &reqwest::Client,
    request: Request,
) -> Result<Response> {
    let method = request.method().clone();
    let path = request.url().path().to_owned();

    let response = client.execute(request).await?;
    let status_code = response.status();

    #[cfg(feature = "tracing")]
    tracing::Span::current().record("status_code", status_code.as_u16());

    if !status_code.is_success() {
        let message = response.text().await.unwrap_or_default();

        #[cfg(feature = "tracing")]
        tracing::warn!(
            status = %status_code,
            method = %method,
            path = %path,
            message = %message,
            "API request failed"
        );

        return Err(Error::status(status_code, method, path, message));
    }

    let json_value = response.json::<serde_json::Value>().await?;
    serde_helpers::deserialize_with_warnings(json_value)
}
