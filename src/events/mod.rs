//! Live order events over server-sent events.
//!
//! The order service publishes every order change on its `/events` endpoint as
//! `text/event-stream`. Besides events it sends a `connected` token when the stream opens
//! and a `ping` token every ten seconds; [`StreamClient`] swallows both.
//!
//! # Architecture
//!
//! - [`StreamClient`]: connection lifecycle, reconnection policy and handler dispatch
//! - [`Transport`]: opens one connection and yields raw frame data; [`SseTransport`]
//!   does so over HTTP
//! - [`Frame`]: classification of raw frame data into control tokens and [`OrderEvent`]s
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use themenu_client::events::{Config, StreamClient, event_type};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::builder()
//!     .max_reconnect_attempts(10)
//!     .reconnect_delay(Duration::from_secs(1))
//!     .idle_timeout(Duration::from_secs(30))
//!     .build();
//! let stream = StreamClient::new("http://localhost:3000/events".parse()?, config);
//!
//! stream.on_event(|event| {
//!     if event.event_type == event_type::ORDER_CREATED
//!         && let Some(order) = event.order_payload()
//!     {
//!         println!("new order {} for dish {}", order.order_id, order.dish_id);
//!     }
//! });
//! stream.start();
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod frame;
pub mod sse;
pub mod transport;
pub mod types;

pub use client::{ConnectionState, StreamClient};
pub use config::Config;
pub use error::StreamError;
pub use frame::Frame;
pub use transport::{FrameStream, SseTransport, Transport};
pub use types::{OrderEvent, OrderEventPayload, event_type};
