//! CSV-backed market data feed.
//!
//! Reads a delimited file of historical candles or quotes, normalizes each
//! row into a [`MarketEvent`] and publishes it onto the data bus at a
//! configurable pace, simulating a live feed's inter-tick timing from
//! historical data.

use crate::events::{DataBus, DataType, Field, MarketEvent};
use crate::feeds::{DataFeed, EventStream};
use crate::{Error, Result};
use csv::{ReaderBuilder, StringRecord, StringRecordsIntoIter};
use log::{info, warn};
use std::fs::File;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

/// Channel the reference feed publishes to
pub const DEFAULT_CHANNEL: &str = "prices";

/// Per-event pacing between successive publishes
pub const DEFAULT_DELAY: Duration = Duration::from_secs(1);

/// Historical market data feed backed by a comma-delimited file with a
/// header row.
///
/// The header decides the record shape: any OHLC column classifies the file
/// as candles, otherwise any bid/ask column classifies it as ticks. A header
/// carrying both classifies as candles (fixed tie-break). Anything else is a
/// schema classification error and the feed produces no events at all.
pub struct CsvFeed {
    path: PathBuf,
    ticket: String,
    channel: String,
    delay: Duration,
}

impl CsvFeed {
    pub fn new(path: impl Into<PathBuf>, ticket: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ticket: ticket.into(),
            channel: DEFAULT_CHANNEL.to_string(),
            delay: DEFAULT_DELAY,
        }
    }

    /// Override the bus channel events are published to
    pub fn with_channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = channel.into();
        self
    }

    /// Override the pacing between successive events
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Open the file, classify its header and return the one-shot row
    /// iterator. The file handle lives inside the returned reader and is
    /// closed when it is dropped, whichever way iteration ends.
    pub fn events(&self) -> Result<CsvEventReader> {
        if self.ticket.is_empty() {
            return Err(Error::Config("CSV feed requires a non-empty ticket".to_string()));
        }

        let file = File::open(&self.path).map_err(|e| {
            Error::SourceUnavailable(format!("{}: {}", self.path.display(), e))
        })?;

        let mut reader = ReaderBuilder::new().has_headers(true).from_reader(file);
        let headers = reader.headers().map_err(|e| {
            Error::SourceUnavailable(format!("{}: cannot read header: {}", self.path.display(), e))
        })?;

        let columns: Vec<Option<Field>> = headers.iter().map(Field::from_header).collect();
        let data_type = classify(&columns).ok_or_else(|| {
            Error::SchemaClassification(format!(
                "{}: header [{}] matches neither candle nor tick columns",
                self.path.display(),
                headers.iter().collect::<Vec<_>>().join(", ")
            ))
        })?;

        info!(
            "Loaded {} as {} data for ticket {}",
            self.path.display(),
            data_type,
            self.ticket
        );

        Ok(CsvEventReader {
            records: reader.into_records(),
            columns,
            ticket: self.ticket.clone(),
            data_type,
        })
    }
}

impl DataFeed for CsvFeed {
    fn ticket(&self) -> &str {
        &self.ticket
    }

    fn load_data(&self) -> Result<EventStream> {
        Ok(Box::new(self.events()?))
    }

    /// Publish every row onto the bus, sleeping `delay` after each publish.
    ///
    /// Malformed rows are skipped with a warning; only structural failures
    /// (missing file, unclassifiable header) abort the run.
    fn run(&self, bus: &mut DataBus) -> Result<()> {
        for event in self.events()? {
            match event {
                Ok(event) => {
                    bus.publish(&self.channel, &event);
                    thread::sleep(self.delay);
                }
                Err(e) => warn!("Skipping row in {}: {}", self.path.display(), e),
            }
        }
        Ok(())
    }
}

/// Classify a header's recognized columns into a record shape.
///
/// OHLC columns win over bid/ask when both appear.
fn classify(columns: &[Option<Field>]) -> Option<DataType> {
    if columns.iter().flatten().any(Field::is_candle_column) {
        Some(DataType::Candle)
    } else if columns.iter().flatten().any(Field::is_quote_column) {
        Some(DataType::Tick)
    } else {
        None
    }
}

/// Lazy row-at-a-time event reader over an open CSV file.
///
/// Iterating yields one [`MarketEvent`] per data row in file order;
/// unrecognized columns are dropped, rows that do not line up with the
/// header yield a [`Error::MalformedRow`] and iteration continues. Tied to
/// a single open file handle, so it cannot be restarted.
pub struct CsvEventReader {
    records: StringRecordsIntoIter<File>,
    columns: Vec<Option<Field>>,
    ticket: String,
    data_type: DataType,
}

impl std::fmt::Debug for CsvEventReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CsvEventReader")
            .field("columns", &self.columns)
            .field("ticket", &self.ticket)
            .field("data_type", &self.data_type)
            .finish_non_exhaustive()
    }
}

impl CsvEventReader {
    /// Record shape the header classified to
    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    fn build_event(&self, record: &StringRecord) -> Result<MarketEvent> {
        if record.len() != self.columns.len() {
            return Err(Error::MalformedRow(format!(
                "row {} has {} fields, header has {}",
                record
                    .position()
                    .map(|p| p.line().to_string())
                    .unwrap_or_else(|| "?".to_string()),
                record.len(),
                self.columns.len()
            )));
        }

        let mut event = MarketEvent::new(self.ticket.clone(), self.data_type);
        for (column, value) in self.columns.iter().zip(record.iter()) {
            if let Some(field) = column {
                event.set(*field, value);
            }
        }
        Ok(event)
    }
}

impl Iterator for CsvEventReader {
    type Item = Result<MarketEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.records.next()? {
            Ok(record) => Some(self.build_event(&record)),
            Err(e) => Some(Err(Error::MalformedRow(e.to_string()))),
        }
    }
}
