use std::collections::VecDeque;
use std::time::Duration;

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, trace};

use crate::models::{PriceSample, SeriesSnapshot};

/// Maximum retained samples; older ones are evicted first
pub const MAX_SAMPLES: usize = 100;
/// Samples backfilled when the chart activates
pub const SEED_SAMPLES: usize = 61;
/// Spacing between backfilled samples
pub const SEED_SPACING_MS: i64 = 2000;
/// Cadence of the live sampler
pub const SAMPLE_PERIOD: Duration = Duration::from_millis(1000);
pub const VOLATILITY: f64 = 0.0003;
pub const BASE_PRICE_MIN: f64 = 45_000.0;
pub const BASE_PRICE_SPREAD: f64 = 5_000.0;
/// Center of the drift draw; below 0.5 so the walk leans slightly upward
pub const DRIFT_CENTER: f64 = 0.48;

/// One random-walk step from two uniform draws in [0, 1)
pub fn walk_step(price: f64, volatility: f64, drift_draw: f64, shock_draw: f64) -> f64 {
    let drift = (drift_draw - DRIFT_CENTER) * volatility;
    let shock = (shock_draw - 0.5) * volatility * 2.0;
    price + price * (drift + shock)
}

pub fn random_walk<R: Rng + ?Sized>(price: f64, volatility: f64, rng: &mut R) -> f64 {
    let drift_draw: f64 = rng.gen();
    let shock_draw: f64 = rng.gen();
    walk_step(price, volatility, drift_draw, shock_draw)
}

/// One-step momentum in percent
pub fn percent_change(reference: f64, price: f64) -> f64 {
    if reference == 0.0 {
        return 0.0;
    }
    (price - reference) / reference * 100.0
}

/// Owns the rolling window of synthetic prices
pub struct PriceSampler<R = StdRng> {
    rng: R,
    samples: VecDeque<PriceSample>,
    seeded: bool,
    percent_change: f64,
}

impl PriceSampler<StdRng> {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }
}

impl Default for PriceSampler<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> PriceSampler<R> {
    pub fn with_rng(rng: R) -> Self {
        PriceSampler {
            rng,
            samples: VecDeque::with_capacity(MAX_SAMPLES + 1),
            seeded: false,
            percent_change: 0.0,
        }
    }

    pub fn is_seeded(&self) -> bool {
        self.seeded
    }

    /// Backfill [`SEED_SAMPLES`] samples ending at `now`.
    ///
    /// Runs once; later calls return `false` and leave the series untouched.
    pub fn seed(&mut self, now: DateTime<Utc>) -> bool {
        if self.seeded {
            return false;
        }
        self.seeded = true;

        let base_price = BASE_PRICE_MIN + self.rng.gen::<f64>() * BASE_PRICE_SPREAD;
        let mut price = base_price;
        let mut previous = base_price;
        let last_index = (SEED_SAMPLES - 1) as i64;

        for i in 0..SEED_SAMPLES as i64 {
            previous = price;
            price = random_walk(price, VOLATILITY, &mut self.rng);
            let timestamp = now - ChronoDuration::milliseconds((last_index - i) * SEED_SPACING_MS);
            let volume = self.rng.gen_range(50.0..150.0);
            self.push(PriceSample::new(timestamp, price).with_volume(volume));
        }
        self.percent_change = percent_change(previous, price);

        debug!(
            "Seeded {} samples from base price {:.2} (last {:.2})",
            self.samples.len(),
            base_price,
            price
        );
        true
    }

    /// Generate one new sample at `now`. No-op until the series has been seeded.
    pub fn step(&mut self, now: DateTime<Utc>) -> Option<PriceSample> {
        let previous = *self.samples.back()?;
        let price = random_walk(previous.price, VOLATILITY, &mut self.rng);
        let volume = self.rng.gen_range(50.0..150.0);
        let sample = PriceSample::new(now, price).with_volume(volume);
        self.record(sample)
    }

    /// Append a sample, evicting the oldest past [`MAX_SAMPLES`], and update the momentum.
    ///
    /// Timestamps are kept strictly increasing: a sample that does not advance the
    /// clock is moved 1 ms past the previous one.
    pub fn record(&mut self, mut sample: PriceSample) -> Option<PriceSample> {
        let previous = *self.samples.back()?;
        if sample.timestamp <= previous.timestamp {
            sample.timestamp = previous.timestamp + ChronoDuration::milliseconds(1);
        }

        self.percent_change = percent_change(previous.price, sample.price);
        self.push(sample);
        trace!(
            "Sampled {:.2} ({:+.4}%), {} retained",
            sample.price,
            self.percent_change,
            self.samples.len()
        );
        Some(sample)
    }

    fn push(&mut self, sample: PriceSample) {
        self.samples.push_back(sample);
        while self.samples.len() > MAX_SAMPLES {
            self.samples.pop_front();
        }
    }

    pub fn samples(&self) -> &VecDeque<PriceSample> {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn current_price(&self) -> Option<f64> {
        self.samples.back().map(|s| s.price)
    }

    pub fn percent_change(&self) -> f64 {
        self.percent_change
    }

    /// Copy of the current window for readers
    pub fn snapshot(&self) -> SeriesSnapshot {
        SeriesSnapshot {
            samples: self.samples.iter().copied().collect(),
            percent_change: self.percent_change,
        }
    }
}
