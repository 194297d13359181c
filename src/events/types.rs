//! Canonical market data event types shared by feeds and the data bus.

use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

/// Shape of a market data record: an aggregated candle or a single quote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Candle,
    Tick,
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataType::Candle => write!(f, "candle"),
            DataType::Tick => write!(f, "tick"),
        }
    }
}

/// Normalized field keys an event may carry. Source columns outside this set
/// are dropped during normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Date,
    Datetime,
    Bid,
    Ask,
    Open,
    High,
    Low,
    Close,
    AdjClose,
    Volume,
}

impl Field {
    /// Map a raw header column name to a normalized field.
    ///
    /// Matching is case-insensitive and tolerates surrounding whitespace;
    /// `adj close` and `adj_close` are both accepted. Returns `None` for
    /// anything outside the recognized set.
    pub fn from_header(name: &str) -> Option<Field> {
        match name.trim().to_lowercase().as_str() {
            "date" => Some(Field::Date),
            "datetime" => Some(Field::Datetime),
            "bid" => Some(Field::Bid),
            "ask" => Some(Field::Ask),
            "open" => Some(Field::Open),
            "high" => Some(Field::High),
            "low" => Some(Field::Low),
            "close" => Some(Field::Close),
            "adj close" | "adj_close" => Some(Field::AdjClose),
            "volume" => Some(Field::Volume),
            _ => None,
        }
    }

    /// Canonical lower-cased key used in the event shape
    pub fn key(&self) -> &'static str {
        match self {
            Field::Date => "date",
            Field::Datetime => "datetime",
            Field::Bid => "bid",
            Field::Ask => "ask",
            Field::Open => "open",
            Field::High => "high",
            Field::Low => "low",
            Field::Close => "close",
            Field::AdjClose => "adj_close",
            Field::Volume => "volume",
        }
    }

    /// Whether this column marks an aggregated candle schema
    pub fn is_candle_column(&self) -> bool {
        matches!(self, Field::Open | Field::High | Field::Low | Field::Close)
    }

    /// Whether this column marks a bid/ask quote schema
    pub fn is_quote_column(&self) -> bool {
        matches!(self, Field::Bid | Field::Ask)
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// A single normalized market data event.
///
/// Carries the instrument ticket, the classified record shape, and the
/// recognized fields of the source row in source column order. Values are
/// kept verbatim as read from the source; consumers decide how (and whether)
/// to parse them numerically.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketEvent {
    pub ticket: String,
    pub data_type: DataType,
    fields: Vec<(Field, String)>,
}

impl MarketEvent {
    /// Create an event. The ticket must be non-empty; feeds guarantee this
    /// before any event is built.
    pub fn new(ticket: impl Into<String>, data_type: DataType) -> Self {
        let ticket = ticket.into();
        debug_assert!(!ticket.is_empty(), "market events require a ticket");
        Self { ticket, data_type, fields: Vec::new() }
    }

    /// Append a normalized field. Keeps insertion (source column) order.
    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        self.fields.push((field, value.into()));
    }

    /// Look up a field value
    pub fn get(&self, field: Field) -> Option<&str> {
        self.fields
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, v)| v.as_str())
    }

    /// Normalized fields in source column order
    pub fn fields(&self) -> &[(Field, String)] {
        &self.fields
    }
}

impl Serialize for MarketEvent {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        // Fixed keys first, then normalized fields in source order
        let mut map = serializer.serialize_map(Some(2 + self.fields.len()))?;
        map.serialize_entry("ticket", &self.ticket)?;
        map.serialize_entry("data_type", &self.data_type)?;
        for (field, value) in &self.fields {
            map.serialize_entry(field.key(), value)?;
        }
        map.end()
    }
}

impl std::fmt::Display for MarketEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.ticket, self.data_type)?;
        for (field, value) in &self.fields {
            write!(f, " {}={}", field.key(), value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_from_header() {
        assert_eq!(Field::from_header("Close"), Some(Field::Close));
        assert_eq!(Field::from_header("  VOLUME "), Some(Field::Volume));
        assert_eq!(Field::from_header("Adj Close"), Some(Field::AdjClose));
        assert_eq!(Field::from_header("adj_close"), Some(Field::AdjClose));
        assert_eq!(Field::from_header("symbol"), None);
        assert_eq!(Field::from_header(""), None);
    }

    #[test]
    fn test_data_type_tokens() {
        assert_eq!(DataType::Candle.to_string(), "candle");
        assert_eq!(
            serde_json::to_string(&DataType::Tick).unwrap(),
            "\"tick\""
        );
    }

    #[test]
    fn test_event_accessors() {
        let mut event = MarketEvent::new("AAPL", DataType::Candle);
        event.set(Field::Date, "2024-01-01");
        event.set(Field::Open, "100");

        assert_eq!(event.get(Field::Date), Some("2024-01-01"));
        assert_eq!(event.get(Field::Open), Some("100"));
        assert_eq!(event.get(Field::Close), None);
        assert_eq!(event.fields().len(), 2);
    }

    #[test]
    fn test_event_wire_shape() {
        let mut event = MarketEvent::new("AAPL", DataType::Candle);
        event.set(Field::Date, "2024-01-01");
        event.set(Field::Open, "100");
        event.set(Field::High, "110");
        event.set(Field::Low, "95");
        event.set(Field::Close, "105");

        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(
            json,
            r#"{"ticket":"AAPL","data_type":"candle","date":"2024-01-01","open":"100","high":"110","low":"95","close":"105"}"#
        );
    }

    #[test]
    fn test_event_display() {
        let mut event = MarketEvent::new("EURUSD", DataType::Tick);
        event.set(Field::Bid, "1.0831");
        event.set(Field::Ask, "1.0833");

        assert_eq!(event.to_string(), "EURUSD tick bid=1.0831 ask=1.0833");
    }
}
