use bon::Builder;
use serde::Deserialize;

use super::OrderStatus;
use crate::types::{DateTime, Decimal, Utc, Uuid};

/// An order as listed by `GET /orders`, joined with the dish it is for.
#[non_exhaustive]
#[derive(Debug, Clone, Deserialize, PartialEq, Builder)]
#[builder(on(String, into))]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub dish_id: Uuid,
    pub status: OrderStatus,
    pub dish_name: String,
    #[serde(default)]
    #[builder(default)]
    pub dish_description: String,
    pub dish_price: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Orders are active until they are served or cancelled.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.status.is_terminal()
    }
}

/// Response to a successful status update, e.g. `Order 42 updated to served`.
#[non_exhaustive]
#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Builder)]
#[builder(on(String, into))]
pub struct UpdateOrderStatusResponse {
    pub message: String,
}
