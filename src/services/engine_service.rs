use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use plotters::prelude::BitMapBackend;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, trace, warn};

use crate::models::{
    ContainerLayout, Frame, FrameOutcome, PriceSample, SeriesSnapshot, SkipReason, SurfaceSize,
    ViewportClass,
};
use crate::services::render_service::{render_frame, RenderInput};
use crate::services::sampler_service::{PriceSampler, SAMPLE_PERIOD};
use crate::utils::errors::ChartError;
use crate::utils::format::format_percent;
use crate::utils::surface::BitmapSurface;

pub const DEFAULT_CHART_HEIGHT: f64 = 400.0;
pub const DEFAULT_FRAME_RATE: u32 = 60;

type SeriesSender = Arc<watch::Sender<Arc<SeriesSnapshot>>>;
type FrameSender = Arc<watch::Sender<Option<Arc<Frame>>>>;

/// Activation input for a chart
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Cosmetic asset identifier, drawn as the caption
    pub asset: Option<String>,
    /// Requested logical height; only the desktop layout honours it
    pub height: f64,
    /// Redraw cadence standing in for the display refresh signal
    pub frame_period: Duration,
}

impl Default for EngineOptions {
    fn default() -> Self {
        EngineOptions {
            asset: None,
            height: DEFAULT_CHART_HEIGHT,
            frame_period: Duration::from_secs(1) / DEFAULT_FRAME_RATE,
        }
    }
}

/// The sampler timer and the redraw loop of one activation.
/// Dropping it aborts both, whichever way the owner goes away.
struct EngineTasks {
    sampler: JoinHandle<()>,
    redraw: JoinHandle<()>,
}

impl Drop for EngineTasks {
    fn drop(&mut self) {
        self.sampler.abort();
        self.redraw.abort();
    }
}

/// Live chart: a rolling synthetic price series and its continuously redrawn frame
pub struct ChartEngine {
    options: EngineOptions,
    series_tx: SeriesSender,
    layout_tx: watch::Sender<ContainerLayout>,
    frame_tx: FrameSender,
    tasks: Option<EngineTasks>,
}

impl ChartEngine {
    pub fn new(options: EngineOptions, layout: ContainerLayout) -> Self {
        let (series_tx, _) = watch::channel(Arc::new(SeriesSnapshot::default()));
        let (layout_tx, _) = watch::channel(layout.sanitized());
        let (frame_tx, _) = watch::channel(None);

        ChartEngine {
            options,
            series_tx: Arc::new(series_tx),
            layout_tx,
            frame_tx: Arc::new(frame_tx),
            tasks: None,
        }
    }

    /// Seed the series and start the sampler and redraw loop.
    ///
    /// Must be called from within a tokio runtime. Returns `false` if the chart is
    /// already active, in which case nothing is reseeded.
    pub fn activate(&mut self) -> bool {
        if self.tasks.is_some() {
            debug!("Chart already active, ignoring activation");
            return false;
        }

        let mut sampler = PriceSampler::new();
        sampler.seed(Utc::now());
        self.series_tx.send_replace(Arc::new(sampler.snapshot()));

        let sampler_task = tokio::spawn(run_sampler(sampler, Arc::clone(&self.series_tx)));
        let redraw_task = tokio::spawn(run_redraw_loop(RedrawContext {
            series: self.series_tx.subscribe(),
            layout: self.layout_tx.subscribe(),
            frames: Arc::clone(&self.frame_tx),
            height: self.options.height,
            caption: self.options.asset.clone(),
            frame_period: self.options.frame_period,
        }));

        self.tasks = Some(EngineTasks {
            sampler: sampler_task,
            redraw: redraw_task,
        });

        info!(
            "Chart activated for {} ({} viewport)",
            self.options.asset.as_deref().unwrap_or("unnamed asset"),
            self.viewport()
        );
        true
    }

    /// Stop both loops and discard the series. Returns `false` if the chart was not active.
    pub fn deactivate(&mut self) -> bool {
        let Some(tasks) = self.tasks.take() else {
            return false;
        };
        drop(tasks);

        self.series_tx.send_replace(Arc::new(SeriesSnapshot::default()));
        self.frame_tx.send_replace(None);
        info!("Chart deactivated");
        true
    }

    pub fn is_active(&self) -> bool {
        self.tasks.is_some()
    }

    /// Report a new container width (resize or orientation change).
    /// Non-finite widths are ignored and oversized ones clamped.
    pub fn resize(&self, width: f64) -> bool {
        if !width.is_finite() {
            warn!("Ignoring non-finite container width {}", width);
            return false;
        }
        self.update_layout(|layout| layout.width = width)
    }

    pub fn set_device_pixel_ratio(&self, ratio: f64) -> bool {
        if !ratio.is_finite() || ratio <= 0.0 {
            warn!("Ignoring device pixel ratio {}", ratio);
            return false;
        }
        self.update_layout(|layout| layout.device_pixel_ratio = ratio)
    }

    fn update_layout(&self, apply: impl FnOnce(&mut ContainerLayout)) -> bool {
        self.layout_tx.send_if_modified(|layout| {
            let before = *layout;
            apply(layout);
            *layout = layout.sanitized();
            if *layout == before {
                return false;
            }

            if before.viewport() != layout.viewport() {
                debug!("Viewport class changed: {} -> {}", before.viewport(), layout.viewport());
            }
            true
        })
    }

    pub fn layout(&self) -> ContainerLayout {
        *self.layout_tx.borrow()
    }

    pub fn viewport(&self) -> ViewportClass {
        self.layout().viewport()
    }

    pub fn surface_size(&self) -> SurfaceSize {
        self.layout().surface_size(self.options.height)
    }

    pub fn snapshot(&self) -> Arc<SeriesSnapshot> {
        self.series_tx.borrow().clone()
    }

    pub fn series(&self) -> Vec<PriceSample> {
        self.snapshot().samples.clone()
    }

    pub fn current_price(&self) -> Option<f64> {
        self.snapshot().current_price()
    }

    pub fn percent_change(&self) -> f64 {
        self.snapshot().percent_change
    }

    /// Every new series snapshot, replace-the-value semantics
    pub fn subscribe_series(&self) -> watch::Receiver<Arc<SeriesSnapshot>> {
        self.series_tx.subscribe()
    }

    /// Latest drawn frame; `None` before the first frame and after deactivation
    pub fn subscribe_frames(&self) -> watch::Receiver<Option<Arc<Frame>>> {
        self.frame_tx.subscribe()
    }

    /// Render the current series once into a PNG file
    pub fn snapshot_png(&self, path: &Path) -> Result<FrameOutcome, ChartError> {
        let snapshot = self.snapshot();
        if snapshot.is_empty() {
            return Err(ChartError::NotActive);
        }

        let size = self.surface_size();
        if size.is_empty() {
            return Ok(FrameOutcome::Skipped(SkipReason::EmptyPlotArea));
        }

        let backend = BitMapBackend::new(path, size.physical());
        let mut surface = BitmapSurface::new(backend, size);
        let outcome = render_frame(
            &mut surface,
            &RenderInput {
                samples: &snapshot.samples,
                viewport: self.viewport(),
                percent_change: snapshot.percent_change,
                pulse_phase: 0.0,
                caption: self.options.asset.as_deref(),
            },
        )?;
        surface.present()?;

        info!("Snapshot written to {} ({:?})", path.display(), outcome);
        Ok(outcome)
    }
}

async fn run_sampler(mut sampler: PriceSampler, series: SeriesSender) {
    let mut ticker = time::interval_at(Instant::now() + SAMPLE_PERIOD, SAMPLE_PERIOD);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        if let Some(sample) = sampler.step(Utc::now()) {
            trace!(
                "Price {:.2} ({})",
                sample.price,
                format_percent(sampler.percent_change())
            );
            series.send_replace(Arc::new(sampler.snapshot()));
        }
    }
}

struct RedrawContext {
    series: watch::Receiver<Arc<SeriesSnapshot>>,
    layout: watch::Receiver<ContainerLayout>,
    frames: FrameSender,
    height: f64,
    caption: Option<String>,
    frame_period: Duration,
}

async fn run_redraw_loop(ctx: RedrawContext) {
    let RedrawContext {
        series,
        mut layout,
        frames,
        height,
        caption,
        frame_period,
    } = ctx;

    let started = Instant::now();
    let mut canvas = Canvas::new(*layout.borrow_and_update(), height);
    let mut ticker = time::interval(frame_period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut frame_number = 0u64;
    let mut failing = false;

    loop {
        ticker.tick().await;

        match layout.has_changed() {
            Ok(true) => canvas.resize(*layout.borrow_and_update(), height),
            Ok(false) => {}
            Err(_) => break,
        }

        let snapshot = series.borrow().clone();
        let phase = started.elapsed().as_secs_f64();
        match canvas.draw(&snapshot, phase, caption.as_deref()) {
            Ok(FrameOutcome::Drawn) => {
                failing = false;
                frame_number += 1;
                publish_frame(&frames, &canvas, frame_number);
            }
            Ok(FrameOutcome::Skipped(reason)) => trace!("Skipped frame: {:?}", reason),
            Err(e) if !failing => {
                failing = true;
                warn!("Failed to draw frame: {}", e);
            }
            Err(e) => trace!("Failed to draw frame: {}", e),
        }
    }
}

/// Copies the backing pixels out only when someone is watching
fn publish_frame(frames: &watch::Sender<Option<Arc<Frame>>>, canvas: &Canvas, number: u64) -> bool {
    if frames.receiver_count() == 0 {
        return false;
    }
    frames.send_replace(Some(Arc::new(canvas.frame(number))));
    true
}

/// Backing pixels of the live chart, reallocated whenever the layout changes
struct Canvas {
    size: SurfaceSize,
    viewport: ViewportClass,
    buffer: Vec<u8>,
}

impl Canvas {
    fn new(layout: ContainerLayout, height: f64) -> Self {
        let size = layout.surface_size(height);
        Canvas {
            size,
            viewport: layout.viewport(),
            buffer: allocate(size),
        }
    }

    fn resize(&mut self, layout: ContainerLayout, height: f64) {
        let size = layout.surface_size(height);
        if size == self.size {
            return;
        }

        self.size = size;
        self.viewport = layout.viewport();
        self.buffer = allocate(size);
        let (w, h) = size.physical();
        debug!(
            "Surface resized to {}x{} logical ({} viewport), {}x{} backing",
            size.width, size.height, self.viewport, w, h
        );
    }

    fn draw(
        &mut self,
        series: &SeriesSnapshot,
        pulse_phase: f64,
        caption: Option<&str>,
    ) -> Result<FrameOutcome, ChartError> {
        if self.size.is_empty() {
            return Ok(FrameOutcome::Skipped(SkipReason::EmptyPlotArea));
        }

        let backend = BitMapBackend::with_buffer(&mut self.buffer, self.size.physical());
        let mut surface = BitmapSurface::new(backend, self.size);
        let outcome = render_frame(
            &mut surface,
            &RenderInput {
                samples: &series.samples,
                viewport: self.viewport,
                percent_change: series.percent_change,
                pulse_phase,
                caption,
            },
        )?;
        surface.present()?;
        Ok(outcome)
    }

    fn frame(&self, number: u64) -> Frame {
        Frame {
            number,
            viewport: self.viewport,
            size: self.size,
            rgb: self.buffer.clone(),
        }
    }
}

fn allocate(size: SurfaceSize) -> Vec<u8> {
    let (w, h) = size.physical();
    vec![0; w as usize * h as usize * 3]
}
