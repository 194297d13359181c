//! Market data feeds: the source capability contract and its implementations.

pub mod csv;

pub use self::csv::{CsvEventReader, CsvFeed};

use crate::events::{DataBus, MarketEvent};
use crate::Result;

/// One-shot stream of normalized events produced by a feed.
///
/// The stream is finite and tied to a single open handle on the underlying
/// resource: it can be consumed exactly once and is not restartable. A second
/// pass requires calling [`DataFeed::load_data`] again.
pub type EventStream = Box<dyn Iterator<Item = Result<MarketEvent>> + Send>;

/// Capability contract any market data source must satisfy so it can be
/// driven uniformly, whatever sits behind it (historical file, websocket,
/// broker API).
pub trait DataFeed {
    /// Instrument identifier this feed represents
    fn ticket(&self) -> &str;

    /// Open the underlying source and return its event stream.
    ///
    /// Fails with [`crate::Error::SourceUnavailable`] when the resource
    /// cannot be opened, or [`crate::Error::SchemaClassification`] when its
    /// shape matches no known record type.
    fn load_data(&self) -> Result<EventStream>;

    /// Drive the feed to exhaustion, publishing every event onto the bus
    fn run(&self, bus: &mut DataBus) -> Result<()>;
}
