//! Re-exported types from external crates for convenience.
//!
//! These types are commonly used in this SDK and are re-exported here
//! so users don't need to add these dependencies to their `Cargo.toml`.

/// Date and time types for order and event timestamps.
pub use chrono::{DateTime, Utc};
/// Arbitrary precision decimal type for dish prices.
pub use rust_decimal::Decimal;
/// Macro for creating [`Decimal`] literals at compile time.
///
/// # Example
/// ```
/// use themenu_client::types::dec;
/// let price = dec!(12.50);
/// ```
pub use rust_decimal_macros::dec;
/// Identifier type used for orders, users and dishes.
pub use uuid::Uuid;
