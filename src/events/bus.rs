//! In-memory data bus for publishing and subscribing to market data updates.
//!
//! Suitable for communication within a single process. Delivery is
//! synchronous and best-effort: every subscriber on a channel is invoked
//! inline, a failing subscriber is recorded for retry and never blocks the
//! rest of the fan-out. Cross-process distribution belongs to an external
//! broker layered on top, not to this bus.

use crate::events::types::MarketEvent;
use crate::Result;
use log::{debug, error, warn};
use std::collections::HashMap;
use std::sync::Arc;

/// Callback capability a subscriber must provide
pub type SubscriberFn = dyn Fn(&MarketEvent) -> Result<()> + Send + Sync;

/// Cloneable handle to a subscriber callback.
///
/// Identity is reference equality on the underlying allocation: cloning a
/// `Subscriber` yields the same identity, wrapping the same closure twice
/// yields two distinct subscribers.
#[derive(Clone)]
pub struct Subscriber {
    inner: Arc<SubscriberFn>,
}

impl Subscriber {
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(&MarketEvent) -> Result<()> + Send + Sync + 'static,
    {
        Self { inner: Arc::new(callback) }
    }

    /// Deliver one event to this subscriber
    pub fn call(&self, event: &MarketEvent) -> Result<()> {
        (self.inner)(event)
    }

    fn same_as(&self, other: &Subscriber) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl std::fmt::Debug for Subscriber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Subscriber({:p})", Arc::as_ptr(&self.inner))
    }
}

/// A delivery attempt that raised, kept for retry
#[derive(Debug, Clone)]
pub struct FailedDelivery {
    pub subscriber: Subscriber,
    pub event: MarketEvent,
}

/// In-process publish/subscribe bus with failed-delivery tracking.
///
/// Channels are created lazily on first subscription and live for the
/// process lifetime. Single-threaded by design: all mutation goes through
/// `&mut self` and there is no internal locking.
#[derive(Default)]
pub struct DataBus {
    channels: HashMap<String, Vec<Subscriber>>,
    failed_deliveries: Vec<FailedDelivery>,
}

impl DataBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subscriber on a channel, creating the channel if absent.
    ///
    /// Registering the same subscriber handle twice on one channel is a
    /// warned no-op, so no subscriber ever receives an event twice per
    /// publish. The same handle may be registered on several channels.
    pub fn subscribe(&mut self, channel: &str, subscriber: Subscriber) {
        let subscribers = self.channels.entry(channel.to_string()).or_default();
        if subscribers.iter().any(|s| s.same_as(&subscriber)) {
            warn!("Subscriber already exists in channel: {}", channel);
            return;
        }
        debug!("Registered {:?} on channel: {}", subscriber, channel);
        subscribers.push(subscriber);
    }

    /// Publish an event to every subscriber on a channel, in subscription
    /// order.
    ///
    /// A subscriber error is logged and queued as a [`FailedDelivery`]; it
    /// never halts delivery to the remaining subscribers and never reaches
    /// the publisher. Publishing to a channel nobody subscribed to is not an
    /// error, only a logged warning.
    pub fn publish(&mut self, channel: &str, event: &MarketEvent) {
        let subscribers = match self.channels.get(channel) {
            Some(list) if !list.is_empty() => list.clone(),
            _ => {
                warn!("No subscribers found for channel: {}", channel);
                return;
            }
        };

        for subscriber in subscribers {
            if let Err(e) = subscriber.call(event) {
                error!("Error while publishing data to {}: {}", channel, e);
                self.failed_deliveries.push(FailedDelivery {
                    subscriber,
                    event: event.clone(),
                });
            }
        }
    }

    /// Retry every pending failed delivery, in recorded order.
    ///
    /// Takes a snapshot of the queue and rebuilds the still-failing list
    /// rather than removing entries mid-iteration, so one resolving entry
    /// can never make a neighbour be skipped. Entries whose retry fails stay
    /// queued for the next pass.
    pub fn retry_failed_deliveries(&mut self) {
        if self.failed_deliveries.is_empty() {
            return;
        }

        let pending = std::mem::take(&mut self.failed_deliveries);
        let mut still_failing = Vec::new();
        for delivery in pending {
            match delivery.subscriber.call(&delivery.event) {
                Ok(()) => debug!("Retried delivery to {:?}", delivery.subscriber),
                Err(e) => {
                    error!("Failed to retry delivery to subscriber: {}", e);
                    still_failing.push(delivery);
                }
            }
        }

        // Anything queued while retrying goes after the still-failing entries
        still_failing.append(&mut self.failed_deliveries);
        self.failed_deliveries = still_failing;
    }

    /// Pending failed deliveries, oldest first
    pub fn get_failed_deliveries(&self) -> &[FailedDelivery] {
        &self.failed_deliveries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::types::{DataType, Field};
    use crate::Error;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    fn candle(ticket: &str, close: &str) -> MarketEvent {
        let mut event = MarketEvent::new(ticket, DataType::Candle);
        event.set(Field::Close, close);
        event
    }

    /// Subscriber that appends every received close price to a shared log
    fn recording_subscriber(log: Arc<Mutex<Vec<String>>>, tag: &str) -> Subscriber {
        let tag = tag.to_string();
        Subscriber::new(move |event| {
            log.lock()
                .unwrap()
                .push(format!("{}:{}", tag, event.get(Field::Close).unwrap_or("")));
            Ok(())
        })
    }

    #[test]
    fn test_publish_without_subscribers_is_harmless() {
        let mut bus = DataBus::new();
        bus.publish("prices", &candle("AAPL", "105"));
        assert!(bus.get_failed_deliveries().is_empty());
    }

    #[test]
    fn test_fan_out_in_subscription_order() {
        let mut bus = DataBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        bus.subscribe("prices", recording_subscriber(log.clone(), "a"));
        bus.subscribe("prices", recording_subscriber(log.clone(), "b"));

        bus.publish("prices", &candle("AAPL", "105"));
        bus.publish("prices", &candle("AAPL", "106"));

        assert_eq!(
            *log.lock().unwrap(),
            vec!["a:105", "b:105", "a:106", "b:106"]
        );
        assert!(bus.get_failed_deliveries().is_empty());
    }

    #[test]
    fn test_duplicate_subscription_is_idempotent() {
        let mut bus = DataBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        let subscriber = recording_subscriber(log.clone(), "a");
        bus.subscribe("prices", subscriber.clone());
        bus.subscribe("prices", subscriber.clone());
        // Same handle on another channel is a fresh registration
        bus.subscribe("candles", subscriber);

        bus.publish("prices", &candle("AAPL", "105"));
        assert_eq!(*log.lock().unwrap(), vec!["a:105"]);
    }

    #[test]
    fn test_failure_does_not_block_later_subscribers() {
        let mut bus = DataBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        bus.subscribe(
            "prices",
            Subscriber::new(|_| Err(Error::SubscriberDelivery("down".to_string()))),
        );
        bus.subscribe("prices", recording_subscriber(log.clone(), "b"));

        bus.publish("prices", &candle("AAPL", "105"));

        assert_eq!(*log.lock().unwrap(), vec!["b:105"]);
        assert_eq!(bus.get_failed_deliveries().len(), 1);
        assert_eq!(
            bus.get_failed_deliveries()[0].event.get(Field::Close),
            Some("105")
        );
    }

    #[test]
    fn test_each_failed_attempt_is_recorded_once() {
        let mut bus = DataBus::new();
        bus.subscribe("prices", Subscriber::new(|_| Err("always down".into())));

        bus.publish("prices", &candle("AAPL", "105"));
        bus.publish("prices", &candle("AAPL", "106"));

        assert_eq!(bus.get_failed_deliveries().len(), 2);
    }

    #[test]
    fn test_retry_removes_only_resolved_entries() {
        let mut bus = DataBus::new();
        let healthy = Arc::new(AtomicBool::new(false));

        let healthy_flag = healthy.clone();
        let delivered = Arc::new(Mutex::new(Vec::new()));
        let delivered_log = delivered.clone();
        bus.subscribe(
            "prices",
            Subscriber::new(move |event| {
                if healthy_flag.load(Ordering::SeqCst) {
                    delivered_log
                        .lock()
                        .unwrap()
                        .push(event.get(Field::Close).unwrap_or("").to_string());
                    Ok(())
                } else {
                    Err("flaky".into())
                }
            }),
        );
        bus.subscribe("prices", Subscriber::new(|_| Err("always down".into())));

        bus.publish("prices", &candle("AAPL", "105"));
        bus.publish("prices", &candle("AAPL", "106"));
        assert_eq!(bus.get_failed_deliveries().len(), 4);

        // First retry pass: the flaky subscriber recovered, the dead one did not
        healthy.store(true, Ordering::SeqCst);
        bus.retry_failed_deliveries();

        assert_eq!(*delivered.lock().unwrap(), vec!["105", "106"]);
        assert_eq!(bus.get_failed_deliveries().len(), 2);

        // A second pass neither duplicates nor drops the dead entries
        bus.retry_failed_deliveries();
        assert_eq!(bus.get_failed_deliveries().len(), 2);
        assert_eq!(*delivered.lock().unwrap(), vec!["105", "106"]);
    }

    #[test]
    fn test_retry_with_empty_queue_is_a_no_op() {
        let mut bus = DataBus::new();
        bus.retry_failed_deliveries();
        assert!(bus.get_failed_deliveries().is_empty());
    }
}
