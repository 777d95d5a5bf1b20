use bon::Builder;
use serde::Serialize;

use super::OrderStatus;
use crate::Result;
use crate::error::Error;

/// Request body for `PATCH /orders/{id}/status`.
///
/// # Example
///
/// ```
/// use themenu_client::orders::types::{OrderStatus, UpdateOrderStatusRequest};
///
/// let request = UpdateOrderStatusRequest::builder()
///     .status(OrderStatus::Confirmed)
///     .build();
/// assert_eq!(
///     serde_json::to_string(&request).unwrap(),
///     r#"{"status":"confirmed"}"#
/// );
/// ```
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Builder)]
pub struct UpdateOrderStatusRequest {
    /// The status to move the order to.
    pub status: OrderStatus,
}

impl UpdateOrderStatusRequest {
    pub(crate) fn validate(&self) -> Result<()> {
        if self.status.is_settable() {
            Ok(())
        } else {
            Err(Error::validation(format!(
                "`{}` is not a status the server accepts; expected one of received, confirmed, preparing, served, cancelled",
                self.status
            )))
        }
    }
}
