//! Event distribution: canonical market events and the in-process data bus.

pub mod bus;
pub mod types;

pub use bus::{DataBus, FailedDelivery, Subscriber};
pub use types::{DataType, Field, MarketEvent};
