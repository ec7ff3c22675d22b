//! Price series models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single observed point of the synthetic price series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceSample {
    pub timestamp: DateTime<Utc>,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
}

impl PriceSample {
    pub fn new(timestamp: DateTime<Utc>, price: f64) -> Self {
        PriceSample {
            timestamp,
            price,
            volume: None,
        }
    }

    pub fn with_volume(mut self, volume: f64) -> Self {
        self.volume = Some(volume);
        self
    }
}

/// Immutable view of the rolling window handed from the sampler to readers.
///
/// The sampler publishes a fresh snapshot after every step instead of
/// mutating a shared sequence, so a reader never observes a half-applied append.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SeriesSnapshot {
    pub samples: Vec<PriceSample>,
    pub percent_change: f64,
}

impl SeriesSnapshot {
    pub fn current_price(&self) -> Option<f64> {
        self.samples.last().map(|s| s.price)
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_sample_serializes_without_missing_volume() {
        let ts = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        let json = serde_json::to_string(&PriceSample::new(ts, 100.5)).unwrap();
        assert!(json.contains("\"price\":100.5"));
        assert!(!json.contains("volume"));

        let json = serde_json::to_string(&PriceSample::new(ts, 100.5).with_volume(75.0)).unwrap();
        assert!(json.contains("\"volume\":75.0"));
    }

    #[test]
    fn test_snapshot_current_price() {
        let ts = Utc.timestamp_millis_opt(0).unwrap();
        let snapshot = SeriesSnapshot {
            samples: vec![PriceSample::new(ts, 1.0), PriceSample::new(ts, 2.0)],
            percent_change: 100.0,
        };
        assert_eq!(snapshot.current_price(), Some(2.0));
        assert_eq!(snapshot.len(), 2);
        assert_eq!(SeriesSnapshot::default().current_price(), None);
    }
}
