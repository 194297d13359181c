//! # AlphaTrader
//! In-process market data distribution: a publish/subscribe data bus with
//! failed-delivery tracking and retry, plus a feed abstraction that turns
//! heterogeneous market data sources into canonical candle/tick events.
//!
//! The design is deliberately single-threaded and best-effort: `publish`
//! runs every subscriber inline on the caller's thread, failures are
//! isolated per subscriber and queued for an explicit
//! [`events::DataBus::retry_failed_deliveries`] pass. Cross-process
//! delivery, persistence and exactly-once semantics are out of scope.
//!
//! ```no_run
//! use alphatrader::events::{DataBus, Subscriber};
//! use alphatrader::feeds::{CsvFeed, DataFeed};
//!
//! # fn main() -> alphatrader::utils::error::Result<()> {
//! let mut bus = DataBus::new();
//! bus.subscribe("prices", Subscriber::new(|event| {
//!     println!("{}", event);
//!     Ok(())
//! }));
//!
//! CsvFeed::new("data/AAPL.csv", "AAPL").run(&mut bus)?;
//! # Ok(())
//! # }
//! ```

pub use crate::utils::error::{Error, Result};

pub mod config;
pub mod events;
pub mod feeds;
pub mod utils;
