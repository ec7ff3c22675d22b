//! Coordinate mapping between the price series and the plotting area

use crate::models::{Padding, PriceSample};

/// Headroom added above and below the visible price span
pub const RANGE_PADDING_RATIO: f64 = 0.15;
/// Smallest padded span; a flat series is widened to this around its price
pub const MIN_PRICE_SPAN: f64 = 1e-6;

/// The rectangle inside the surface padding where the series is plotted
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotArea {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl PlotArea {
    /// Returns `None` when the padding leaves no room to plot
    pub fn new(surface_width: f64, surface_height: f64, padding: &Padding) -> Option<Self> {
        let width = surface_width - padding.left - padding.right;
        let height = surface_height - padding.top - padding.bottom;
        if width <= 0.0 || height <= 0.0 || !width.is_finite() || !height.is_finite() {
            return None;
        }

        Some(PlotArea {
            left: padding.left,
            top: padding.top,
            width,
            height,
        })
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

/// Min/max price over a window of samples
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

impl PriceRange {
    pub fn of(samples: &[PriceSample]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }

        let min = samples.iter().map(|s| s.price).fold(f64::INFINITY, f64::min);
        let max = samples.iter().map(|s| s.price).fold(f64::NEG_INFINITY, f64::max);
        Some(PriceRange { min, max })
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    /// Widen the range by [`RANGE_PADDING_RATIO`] of its span on both ends.
    ///
    /// The result always spans at least [`MIN_PRICE_SPAN`], centred on the
    /// original midpoint when the window is (nearly) flat.
    pub fn padded(&self) -> PriceRange {
        let span = self.span();
        let min = self.min - span * RANGE_PADDING_RATIO;
        let max = self.max + span * RANGE_PADDING_RATIO;
        if max - min >= MIN_PRICE_SPAN {
            return PriceRange { min, max };
        }

        let mid = self.min + span / 2.0;
        PriceRange {
            min: mid - MIN_PRICE_SPAN / 2.0,
            max: mid + MIN_PRICE_SPAN / 2.0,
        }
    }
}

/// Maps sample index to x and price to y (inverted, higher price is higher on screen)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartScale {
    pub area: PlotArea,
    pub range: PriceRange,
    count: usize,
}

impl ChartScale {
    /// `range` is used as given; pass a padded range for plotting
    pub fn new(area: PlotArea, range: PriceRange, count: usize) -> Self {
        ChartScale { area, range, count }
    }

    pub fn x(&self, index: usize) -> f64 {
        if self.count < 2 {
            return self.area.left;
        }
        self.area.left + index as f64 / (self.count - 1) as f64 * self.area.width
    }

    /// A range with no span maps every price to the vertical middle
    pub fn y(&self, price: f64) -> f64 {
        let span = self.range.span();
        if span <= 0.0 {
            return self.area.top + self.area.height / 2.0;
        }
        self.area.top + (1.0 - (price - self.range.min) / span) * self.area.height
    }

    /// Inverse of [`ChartScale::y`]
    pub fn price_at(&self, y: f64) -> f64 {
        let span = self.range.span();
        if span <= 0.0 {
            return self.range.min;
        }
        self.range.min + (1.0 - (y - self.area.top) / self.area.height) * span
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn samples(prices: &[f64]) -> Vec<PriceSample> {
        prices
            .iter()
            .enumerate()
            .map(|(i, &p)| PriceSample::new(Utc.timestamp_millis_opt(i as i64 * 1000).unwrap(), p))
            .collect()
    }

    fn padding() -> Padding {
        Padding { left: 70.0, right: 30.0, top: 25.0, bottom: 40.0 }
    }

    #[test]
    fn test_padded_range_scenario() {
        let range = PriceRange::of(&samples(&[100.0, 101.0, 99.0, 102.0])).unwrap();
        assert_eq!(range.min, 99.0);
        assert_eq!(range.max, 102.0);
        assert_eq!(range.span(), 3.0);

        let padded = range.padded();
        assert!((padded.min - 98.55).abs() < 1e-9);
        assert!((padded.max - 102.45).abs() < 1e-9);
    }

    #[test]
    fn test_flat_range_is_guarded() {
        let range = PriceRange::of(&samples(&[500.0, 500.0, 500.0])).unwrap();
        let padded = range.padded();
        assert!(padded.span() > 0.0);

        let area = PlotArea::new(400.0, 200.0, &padding()).unwrap();
        let scale = ChartScale::new(area, padded, 3);
        let y = scale.y(500.0);
        assert!(y.is_finite());
        assert!((y - (area.top + area.height / 2.0)).abs() < 1e-3);
    }

    #[test]
    fn test_flat_range_maps_to_area_edges() {
        let range = PriceRange::of(&samples(&[48_000.0; 60])).unwrap();
        let padded = range.padded();
        assert!(padded.min < 48_000.0 && padded.max > 48_000.0);
        assert!((padded.span() - MIN_PRICE_SPAN).abs() < 1e-9);

        let area = PlotArea::new(1280.0, 400.0, &padding()).unwrap();
        let scale = ChartScale::new(area, padded, 60);
        assert!((scale.y(padded.max) - area.top).abs() < 1e-6);
        assert!((scale.y(padded.min) - area.bottom()).abs() < 1e-6);
        assert!((scale.y(48_000.0) - 192.5).abs() < 0.01);
    }

    #[test]
    fn test_zero_span_scale_stays_finite() {
        let area = PlotArea::new(400.0, 200.0, &padding()).unwrap();
        let scale = ChartScale::new(area, PriceRange { min: 10.0, max: 10.0 }, 3);
        assert_eq!(scale.y(10.0), area.top + area.height / 2.0);
        assert_eq!(scale.price_at(area.top), 10.0);
    }

    #[test]
    fn test_empty_range() {
        assert!(PriceRange::of(&[]).is_none());
    }

    #[test]
    fn test_plot_area() {
        let area = PlotArea::new(1280.0, 400.0, &padding()).unwrap();
        assert_eq!(area.left, 70.0);
        assert_eq!(area.top, 25.0);
        assert_eq!(area.width, 1180.0);
        assert_eq!(area.height, 335.0);
        assert_eq!(area.right(), 1250.0);
        assert_eq!(area.bottom(), 360.0);
    }

    #[test]
    fn test_collapsed_plot_area() {
        assert!(PlotArea::new(100.0, 400.0, &padding()).is_none());
        assert!(PlotArea::new(1280.0, 65.0, &padding()).is_none());
        assert!(PlotArea::new(0.0, 0.0, &padding()).is_none());
    }

    #[test]
    fn test_price_mapping_hits_area_edges() {
        let area = PlotArea::new(1280.0, 400.0, &padding()).unwrap();
        let range = PriceRange { min: 98.55, max: 102.45 };
        let scale = ChartScale::new(area, range, 60);

        assert!((scale.y(range.min) - area.bottom()).abs() < 1.0);
        assert!((scale.y(range.max) - area.top).abs() < 1.0);
        assert!(scale.y(101.0) < scale.y(100.0));
    }

    #[test]
    fn test_price_at_inverts_y() {
        let area = PlotArea::new(1280.0, 400.0, &padding()).unwrap();
        let scale = ChartScale::new(area, PriceRange { min: 45_000.0, max: 50_000.0 }, 60);
        let y = scale.y(47_321.5);
        assert!((scale.price_at(y) - 47_321.5).abs() < 1e-6);
    }

    #[test]
    fn test_index_mapping() {
        let area = PlotArea::new(1280.0, 400.0, &padding()).unwrap();
        let scale = ChartScale::new(area, PriceRange { min: 0.0, max: 1.0 }, 60);
        assert_eq!(scale.x(0), area.left);
        assert!((scale.x(59) - area.right()).abs() < 1e-9);
        assert!(scale.x(30) > scale.x(29));
    }
}
