//! Drawing surface abstraction.
//!
//! The renderer issues every primitive in logical pixels against [`Surface`].
//! [`BitmapSurface`] implements it on top of any plotters backend, scaling by the
//! device pixel ratio so the backing bitmap stays crisp on dense displays.

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use crate::models::SurfaceSize;
use crate::utils::errors::ChartError;
use crate::utils::geometry::{clip_to_slab, dash_segments, Point};

/// Horizontal bands used to approximate a vertical gradient
const GRADIENT_BANDS: usize = 24;
/// Translucent strokes stacked under a line to approximate a glow
const GLOW_LAYERS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Rgba {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Rgba { r, g, b, a: 1.0 }
    }

    pub fn with_alpha(self, a: f64) -> Self {
        Rgba { a: a.clamp(0.0, 1.0), ..self }
    }
}

impl From<Rgba> for RGBAColor {
    fn from(c: Rgba) -> Self {
        RGBAColor(c.r, c.g, c.b, c.a)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

/// Gradient stop: a y coordinate and the color at that height
pub type GradientStop = (f64, Rgba);

pub trait Surface {
    /// Logical width and height
    fn size(&self) -> (f64, f64);

    fn clear(&mut self, color: Rgba) -> Result<(), ChartError>;

    fn stroke_path(&mut self, points: &[Point], color: Rgba, width: f64) -> Result<(), ChartError>;

    fn fill_polygon(&mut self, points: &[Point], color: Rgba) -> Result<(), ChartError>;

    fn fill_circle(&mut self, center: Point, radius: f64, color: Rgba) -> Result<(), ChartError>;

    fn fill_rect(
        &mut self,
        top_left: Point,
        bottom_right: Point,
        color: Rgba,
    ) -> Result<(), ChartError>;

    /// Text is vertically centered on `at.y`
    fn text(
        &mut self,
        text: &str,
        at: Point,
        font_px: f64,
        color: Rgba,
        align: TextAlign,
    ) -> Result<(), ChartError>;

    /// Fill `polygon` with a vertical gradient running from `top` to `bottom`.
    ///
    /// The default approximates the gradient with flat horizontal bands.
    fn fill_vertical_gradient(
        &mut self,
        polygon: &[Point],
        top: GradientStop,
        bottom: GradientStop,
    ) -> Result<(), ChartError> {
        let (top_y, top_color) = top;
        let (bottom_y, bottom_color) = bottom;
        if polygon.len() < 3 || bottom_y <= top_y {
            return Ok(());
        }

        let band_height = (bottom_y - top_y) / GRADIENT_BANDS as f64;
        for band in 0..GRADIENT_BANDS {
            let y0 = top_y + band as f64 * band_height;
            let y1 = y0 + band_height;
            let slice = clip_to_slab(polygon, y0, y1);
            if slice.len() < 3 {
                continue;
            }

            let t = (band as f64 + 0.5) / GRADIENT_BANDS as f64;
            let color = top_color.with_alpha(top_color.a + (bottom_color.a - top_color.a) * t);
            self.fill_polygon(&slice, color)?;
        }
        Ok(())
    }

    /// Stroke a soft halo under a line; the caller strokes the line itself afterwards
    fn stroke_glow(
        &mut self,
        points: &[Point],
        color: Rgba,
        width: f64,
        blur: f64,
    ) -> Result<(), ChartError> {
        if blur <= 0.0 {
            return Ok(());
        }
        for layer in (1..=GLOW_LAYERS).rev() {
            let spread = blur * layer as f64 / GLOW_LAYERS as f64;
            let alpha = 0.35 / GLOW_LAYERS as f64;
            self.stroke_path(points, color.with_alpha(alpha), width + spread)?;
        }
        Ok(())
    }

    fn stroke_dashed(
        &mut self,
        from: Point,
        to: Point,
        color: Rgba,
        width: f64,
        dash: f64,
        gap: f64,
    ) -> Result<(), ChartError> {
        for (start, end) in dash_segments(from, to, dash, gap) {
            self.stroke_path(&[start, end], color, width)?;
        }
        Ok(())
    }
}

/// [`Surface`] over a plotters drawing backend (in-memory bitmap or PNG file)
pub struct BitmapSurface<DB: DrawingBackend> {
    area: DrawingArea<DB, Shift>,
    logical: (f64, f64),
    scale: f64,
}

impl<DB: DrawingBackend> BitmapSurface<DB> {
    pub fn new(backend: DB, size: SurfaceSize) -> Self {
        let scale = if size.device_pixel_ratio > 0.0 { size.device_pixel_ratio } else { 1.0 };
        BitmapSurface {
            area: backend.into_drawing_area(),
            logical: (size.width, size.height),
            scale,
        }
    }

    fn px(&self, p: Point) -> (i32, i32) {
        ((p.x * self.scale).round() as i32, (p.y * self.scale).round() as i32)
    }

    fn px_len(&self, logical: f64) -> u32 {
        (logical * self.scale).round().max(1.0) as u32
    }

    fn style(&self, color: Rgba, filled: bool, width: f64) -> ShapeStyle {
        ShapeStyle {
            color: color.into(),
            filled,
            stroke_width: self.px_len(width),
        }
    }

    /// Flush the backend (writes the file for file-backed bitmaps)
    pub fn present(&self) -> Result<(), ChartError> {
        self.area.present().map_err(ChartError::surface)
    }
}

impl<DB: DrawingBackend> Surface for BitmapSurface<DB> {
    fn size(&self) -> (f64, f64) {
        self.logical
    }

    fn clear(&mut self, color: Rgba) -> Result<(), ChartError> {
        self.area
            .fill(&RGBAColor::from(color))
            .map_err(ChartError::surface)
    }

    fn stroke_path(&mut self, points: &[Point], color: Rgba, width: f64) -> Result<(), ChartError> {
        if points.len() < 2 {
            return Ok(());
        }
        let pixels: Vec<(i32, i32)> = points.iter().map(|&p| self.px(p)).collect();
        let style = self.style(color, false, width);
        self.area
            .draw(&PathElement::new(pixels, style))
            .map_err(ChartError::surface)
    }

    fn fill_polygon(&mut self, points: &[Point], color: Rgba) -> Result<(), ChartError> {
        if points.len() < 3 {
            return Ok(());
        }
        let pixels: Vec<(i32, i32)> = points.iter().map(|&p| self.px(p)).collect();
        let style = self.style(color, true, 1.0);
        self.area
            .draw(&Polygon::new(pixels, style))
            .map_err(ChartError::surface)
    }

    fn fill_circle(&mut self, center: Point, radius: f64, color: Rgba) -> Result<(), ChartError> {
        let radius = (radius * self.scale).round().max(1.0) as i32;
        let style = self.style(color, true, 1.0);
        self.area
            .draw(&Circle::new(self.px(center), radius, style))
            .map_err(ChartError::surface)
    }

    fn fill_rect(
        &mut self,
        top_left: Point,
        bottom_right: Point,
        color: Rgba,
    ) -> Result<(), ChartError> {
        let style = self.style(color, true, 1.0);
        self.area
            .draw(&Rectangle::new([self.px(top_left), self.px(bottom_right)], style))
            .map_err(ChartError::surface)
    }

    fn text(
        &mut self,
        text: &str,
        at: Point,
        font_px: f64,
        color: Rgba,
        align: TextAlign,
    ) -> Result<(), ChartError> {
        let h_pos = match align {
            TextAlign::Left => HPos::Left,
            TextAlign::Center => HPos::Center,
            TextAlign::Right => HPos::Right,
        };
        let style = ("sans-serif", font_px * self.scale)
            .into_font()
            .color(&RGBAColor::from(color))
            .pos(Pos::new(h_pos, VPos::Center));
        self.area
            .draw(&Text::new(text.to_string(), self.px(at), style))
            .map_err(ChartError::surface)
    }
}
