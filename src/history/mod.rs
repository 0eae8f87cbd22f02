//! Price history module
//!
//! Bounded per-symbol price series with volatility and momentum estimates

mod store;
mod types;

pub use store::{PriceHistoryStore, INSUFFICIENT_DATA};
pub use types::PricePoint;
