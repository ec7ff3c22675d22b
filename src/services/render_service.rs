use std::f64::consts::TAU;

use crate::models::{
    ChartScale, FrameOutcome, LayoutConfig, PlotArea, PriceRange, PriceSample, SkipReason,
    ViewportClass,
};
use crate::utils::errors::ChartError;
use crate::utils::format::{format_percent, format_price_full, format_price_label, format_time};
use crate::utils::geometry::{smooth_curve, Point};
use crate::utils::surface::{Rgba, Surface, TextAlign};

/// Samples plotted per frame; older retained samples scroll off the left edge
pub const VISIBLE_SAMPLES: usize = 60;
/// Line pieces per quadratic curve segment
const CURVE_SEGMENTS: usize = 8;

pub const BACKGROUND: Rgba = Rgba::rgb(11, 14, 23);
pub const UP_COLOR: Rgba = Rgba::rgb(16, 185, 129);
pub const DOWN_COLOR: Rgba = Rgba::rgb(239, 68, 68);
const GRID_COLOR: Rgba = Rgba { r: 255, g: 255, b: 255, a: 0.06 };
const LABEL_COLOR: Rgba = Rgba { r: 255, g: 255, b: 255, a: 0.5 };
const CROSSHAIR_COLOR: Rgba = Rgba { r: 255, g: 255, b: 255, a: 0.2 };
const MARKER_CENTER: Rgba = Rgba::rgb(255, 255, 255);

const AREA_TOP_ALPHA: f64 = 0.3;
const PULSE_HZ: f64 = 1.25;
const LABEL_GAP: f64 = 6.0;
const BADGE_OFFSET: f64 = 10.0;
const BADGE_PADDING: f64 = 6.0;
/// Rough advance width of one glyph relative to the font size
const GLYPH_WIDTH_RATIO: f64 = 0.6;

/// Everything one redraw needs
#[derive(Debug, Clone, Copy)]
pub struct RenderInput<'a> {
    pub samples: &'a [PriceSample],
    pub viewport: ViewportClass,
    pub percent_change: f64,
    /// Seconds since activation, drives the marker pulse
    pub pulse_phase: f64,
    pub caption: Option<&'a str>,
}

/// The last [`VISIBLE_SAMPLES`] samples
pub fn visible_window(samples: &[PriceSample]) -> &[PriceSample] {
    &samples[samples.len().saturating_sub(VISIBLE_SAMPLES)..]
}

/// Green for a non-negative momentum, red otherwise
pub fn trend_color(percent_change: f64) -> Rgba {
    if percent_change >= 0.0 {
        UP_COLOR
    } else {
        DOWN_COLOR
    }
}

/// Left edge of the price badge: right of the last point, or mirrored to its left
/// when it would overflow the plotting area
pub fn badge_left(last: Point, badge_width: f64, area: &PlotArea) -> f64 {
    let right_side = last.x + BADGE_OFFSET;
    if right_side + badge_width > area.right() {
        last.x - BADGE_OFFSET - badge_width
    } else {
        right_side
    }
}

fn text_width(text: &str, font_px: f64) -> f64 {
    text.chars().count() as f64 * font_px * GLYPH_WIDTH_RATIO
}

/// Redraw the whole chart.
///
/// The surface is always cleared first. A series shorter than two samples or a
/// plotting area collapsed to nothing leaves it cleared and reports a skip.
pub fn render_frame<S: Surface + ?Sized>(
    surface: &mut S,
    input: &RenderInput<'_>,
) -> Result<FrameOutcome, ChartError> {
    surface.clear(BACKGROUND)?;

    if input.samples.len() < 2 {
        return Ok(FrameOutcome::Skipped(SkipReason::NotEnoughSamples));
    }

    let layout = input.viewport.layout();
    let (width, height) = surface.size();
    let Some(area) = PlotArea::new(width, height, &layout.padding) else {
        return Ok(FrameOutcome::Skipped(SkipReason::EmptyPlotArea));
    };

    let visible = visible_window(input.samples);
    let Some(range) = PriceRange::of(visible) else {
        return Ok(FrameOutcome::Skipped(SkipReason::NotEnoughSamples));
    };
    let scale = ChartScale::new(area, range.padded(), visible.len());

    draw_grid(surface, &scale, layout, visible)?;

    let points: Vec<Point> = visible
        .iter()
        .enumerate()
        .map(|(i, s)| Point::new(scale.x(i), scale.y(s.price)))
        .collect();
    let curve = smooth_curve(&points, CURVE_SEGMENTS);
    let color = trend_color(input.percent_change);

    draw_area(surface, &curve, &area, color)?;
    surface.stroke_glow(&curve, color, layout.line_width, layout.glow_blur)?;
    surface.stroke_path(&curve, color, layout.line_width)?;

    let last = points[points.len() - 1];
    let last_price = visible[visible.len() - 1].price;
    draw_marker(surface, last, layout, color, input.pulse_phase)?;

    if layout.show_price_label {
        draw_price_badge(surface, last, last_price, &area, layout, color)?;
    }

    surface.stroke_dashed(
        Point::new(area.left, last.y),
        Point::new(area.right(), last.y),
        CROSSHAIR_COLOR,
        1.0,
        4.0,
        4.0,
    )?;

    if let Some(caption) = input.caption.filter(|_| layout.show_caption) {
        let header = format!(
            "{}  {}  {}",
            caption,
            format_price_full(last_price),
            format_percent(input.percent_change)
        );
        surface.text(
            &header,
            Point::new(area.left, layout.padding.top / 2.0),
            layout.font_size + 1.0,
            LABEL_COLOR.with_alpha(0.8),
            TextAlign::Left,
        )?;
    }

    Ok(FrameOutcome::Drawn)
}

fn draw_grid<S: Surface + ?Sized>(
    surface: &mut S,
    scale: &ChartScale,
    layout: &LayoutConfig,
    visible: &[PriceSample],
) -> Result<(), ChartError> {
    let area = scale.area;

    let price_lines = layout.price_grid_lines.max(1);
    for i in 0..=price_lines {
        let price = scale.range.min + scale.range.span() * i as f64 / price_lines as f64;
        let y = scale.y(price);
        surface.stroke_path(
            &[Point::new(area.left, y), Point::new(area.right(), y)],
            GRID_COLOR,
            1.0,
        )?;
        surface.text(
            &format_price_label(price, layout.abbreviate_prices),
            Point::new(area.left - LABEL_GAP, y),
            layout.font_size,
            LABEL_COLOR,
            TextAlign::Right,
        )?;
    }

    let time_lines = layout.time_grid_lines.max(1);
    let last_index = visible.len() - 1;
    for i in 0..=time_lines {
        let index = (last_index as f64 * i as f64 / time_lines as f64).round() as usize;
        let x = scale.x(index);
        surface.stroke_path(
            &[Point::new(x, area.top), Point::new(x, area.bottom())],
            GRID_COLOR,
            1.0,
        )?;
        if layout.show_time_labels {
            surface.text(
                &format_time(visible[index].timestamp),
                Point::new(x, area.bottom() + layout.font_size * 1.5),
                layout.font_size,
                LABEL_COLOR,
                TextAlign::Center,
            )?;
        }
    }
    Ok(())
}

fn draw_area<S: Surface + ?Sized>(
    surface: &mut S,
    curve: &[Point],
    area: &PlotArea,
    color: Rgba,
) -> Result<(), ChartError> {
    let (Some(first), Some(last)) = (curve.first(), curve.last()) else {
        return Ok(());
    };

    let mut polygon = curve.to_vec();
    polygon.push(Point::new(last.x, area.bottom()));
    polygon.push(Point::new(first.x, area.bottom()));

    surface.fill_vertical_gradient(
        &polygon,
        (area.top, color.with_alpha(AREA_TOP_ALPHA)),
        (area.bottom(), color.with_alpha(0.0)),
    )
}

fn draw_marker<S: Surface + ?Sized>(
    surface: &mut S,
    at: Point,
    layout: &LayoutConfig,
    color: Rgba,
    phase: f64,
) -> Result<(), ChartError> {
    let pulse = 0.5 + 0.5 * (TAU * PULSE_HZ * phase).sin();
    let radius = layout.marker_radius;

    surface.fill_circle(
        at,
        radius * (1.8 + 0.8 * pulse),
        color.with_alpha(0.25 * (1.0 - 0.5 * pulse)),
    )?;
    surface.fill_circle(at, radius, color)?;
    surface.fill_circle(at, radius * 0.4, MARKER_CENTER)
}

fn draw_price_badge<S: Surface + ?Sized>(
    surface: &mut S,
    last: Point,
    price: f64,
    area: &PlotArea,
    layout: &LayoutConfig,
    color: Rgba,
) -> Result<(), ChartError> {
    let label = format_price_full(price);
    let width = text_width(&label, layout.font_size) + BADGE_PADDING * 2.0;
    let height = layout.font_size + BADGE_PADDING * 1.5;
    let left = badge_left(last, width, area);

    surface.fill_rect(
        Point::new(left, last.y - height / 2.0),
        Point::new(left + width, last.y + height / 2.0),
        color,
    )?;
    surface.text(
        &label,
        Point::new(left + BADGE_PADDING, last.y),
        layout.font_size,
        MARKER_CENTER,
        TextAlign::Left,
    )
}
