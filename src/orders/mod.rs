//! Order API client and types.
//!
//! **Feature flag:** `orders` (enabled by default)
//!
//! The dashboard server exposes a small JSON API over the order store. This module
//! wraps it with typed requests and responses.
//!
//! ## Available Endpoints
//!
//! | Endpoint | Method | Description |
//! |----------|--------|-------------|
//! | `/orders` | GET | List orders |
//! | `/orders/{id}/status` | PATCH | Move an order to a new status |
//!
//! Non-success responses are returned as errors of kind
//! [`Kind::Status`](crate::error::Kind::Status) and are never retried.
//!
//! # Example
//!
//! ```no_run
//! use themenu_client::orders::{Client, Config};
//! use themenu_client::orders::types::{OrderStatus, UpdateOrderStatusRequest};
//! use themenu_client::types::Uuid;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::builder()
//!     .bearer_token("aaaaaaaa-aaaa-aaaa-aaaa-aaaaaaaaaaaa".to_owned())
//!     .build();
//! let client = Client::new("http://localhost:3000", config)?;
//!
//! for order in client.active_orders().await? {
//!     println!("{} {} ({})", order.id, order.dish_name, order.status);
//! }
//!
//! let request = UpdateOrderStatusRequest::builder()
//!     .status(OrderStatus::Served)
//!     .build();
//! let response = client.update_order_status(Uuid::nil(), &request).await?;
//! println!("{}", response.message);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod types;

pub use client::{Client, Config};
