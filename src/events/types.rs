use bon::Builder;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use uuid::Uuid;

use crate::serde_helpers::TimestampFromAny;

/// Event type names published by the order service.
pub mod event_type {
    pub const ORDER_CREATED: &str = "OrderCreated";
    pub const ORDER_STATUS_UPDATED: &str = "OrderStatusUpdated";
    pub const ORDER_CANCELLED: &str = "OrderCancelled";
    pub const ORDER_UPDATED: &str = "OrderUpdated";
    pub const ORDER_DELETED: &str = "OrderDeleted";
    pub const USER_CREATED: &str = "UserCreated";
    pub const USER_UPDATED: &str = "UserUpdated";
    pub const DISH_CREATED: &str = "DishCreated";
    pub const DISH_UPDATED: &str = "DishUpdated";
}

/// A business event delivered over the event stream.
///
/// `status` and `payload` are opaque here; `payload` usually holds JSON that
/// [`payload_as`](Self::payload_as) or [`order_payload`](Self::order_payload) can decode.
/// `timestamp` accepts epoch milliseconds as well as RFC 3339.
#[serde_as]
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Builder)]
#[builder(on(String, into))]
pub struct OrderEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub status: String,
    #[serde_as(as = "TimestampFromAny")]
    pub timestamp: DateTime<Utc>,
    pub payload: String,
}

impl OrderEvent {
    /// Decode the payload as `T`.
    pub fn payload_as<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.payload)
    }

    /// The order payload carried by `Order*` events, if the payload has that shape.
    #[must_use]
    pub fn order_payload(&self) -> Option<OrderEventPayload> {
        if !self.is_order_event() {
            return None;
        }

        self.payload_as().ok()
    }

    #[must_use]
    pub fn is_order_event(&self) -> bool {
        self.event_type.starts_with("Order")
    }
}

/// Payload of the `Order*` events.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Builder)]
#[builder(on(String, into))]
pub struct OrderEventPayload {
    pub order_id: Uuid,
    pub user_id: Uuid,
    pub dish_id: Uuid,
    pub status: String,
}
