use serde::{Deserialize, Serialize};

pub mod request;
pub mod response;

pub use request::UpdateOrderStatusRequest;
pub use response::{Order, UpdateOrderStatusResponse};

/// Where an order is in the kitchen workflow.
///
/// `received` is assigned by the server when the order is created. The dashboard may move
/// an order to any of the known values; `served` and `cancelled` are terminal.
#[non_exhaustive]
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum OrderStatus {
    Received,
    Confirmed,
    Preparing,
    Served,
    Cancelled,
    /// Unknown status from the API (captures the raw value for debugging).
    ///
    /// Never accepted as the target of a status update.
    #[serde(untagged)]
    #[strum(default)]
    Unknown(String),
}

impl OrderStatus {
    /// Every status a client may request, in workflow order.
    pub const SETTABLE: [OrderStatus; 5] = [
        OrderStatus::Received,
        OrderStatus::Confirmed,
        OrderStatus::Preparing,
        OrderStatus::Served,
        OrderStatus::Cancelled,
    ];

    /// Whether an order in this status is finished (served or cancelled).
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Served | OrderStatus::Cancelled)
    }

    /// Whether the server accepts this value in a status update.
    #[must_use]
    pub fn is_settable(&self) -> bool {
        !matches!(self, OrderStatus::Unknown(_))
    }
}
