use std::time::Duration;

use tokio::time;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use stc_livechart::config::ChartSettings;
use stc_livechart::services::ChartEngine;
use stc_livechart::utils::errors::ChartError;
use stc_livechart::utils::format::{format_percent, format_price_full};

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env()
            .add_directive("stc_livechart=debug".parse().unwrap()))
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("📈 Starting STC AutoTrade live chart...");

    let settings = match ChartSettings::from_env() {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to load settings: {}", e);
            return;
        }
    };
    info!(
        "Asset {} | container {}px @{}x | {} fps | running {}s",
        settings.asset,
        settings.container_width,
        settings.device_pixel_ratio,
        settings.frame_rate,
        settings.run_seconds
    );

    let mut engine = ChartEngine::new(settings.engine_options(), settings.container_layout());
    engine.activate();

    run(&engine, &settings).await;

    if let Err(e) = write_outputs(&engine, &settings) {
        error!("Failed to write chart outputs: {}", e);
    }

    engine.deactivate();
    info!("Chart stopped");
}

/// Keep the chart live until the run time elapses or Ctrl-C, applying the resize schedule
async fn run(engine: &ChartEngine, settings: &ChartSettings) {
    let mut frames = engine.subscribe_frames();
    let mut schedule = settings.resize_schedule.iter().copied();
    let mut ticker = time::interval(Duration::from_secs(1));

    let deadline = time::sleep(Duration::from_secs(settings.run_seconds));
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(deadline, ctrl_c);

    loop {
        tokio::select! {
            _ = &mut deadline => {
                info!("Run time elapsed");
                break;
            }
            _ = &mut ctrl_c => {
                info!("Interrupted, shutting down");
                break;
            }
            _ = ticker.tick() => {
                if let Some(width) = schedule.next() {
                    if engine.resize(width) {
                        info!("Container resized to {}px ({} viewport)", width, engine.viewport());
                    }
                }

                let (frame_number, backing) = match frames.borrow_and_update().as_ref() {
                    Some(frame) => (frame.number, frame.size.physical()),
                    None => (0, (0, 0)),
                };
                if let Some(price) = engine.current_price() {
                    info!(
                        "{} {} ({}) | frame #{} {}x{}",
                        settings.asset,
                        format_price_full(price),
                        format_percent(engine.percent_change()),
                        frame_number,
                        backing.0,
                        backing.1
                    );
                }
            }
        }
    }
}

fn write_outputs(engine: &ChartEngine, settings: &ChartSettings) -> Result<(), ChartError> {
    engine.snapshot_png(&settings.snapshot_path)?;

    if let Some(path) = &settings.series_path {
        let snapshot = engine.snapshot();
        let json = serde_json::to_string_pretty(&*snapshot)?;
        std::fs::write(path, json)?;
        info!("Series written to {} ({} samples)", path.display(), snapshot.len());
    }

    Ok(())
}
