//! Packcam: packing-station recorder with overlay stamping and cloud upload.

mod api_video;
mod camera;
mod config;
mod error;
mod ffmpeg_recorder;
mod local_sink;
mod logs_client;
mod raster_surface;
mod station;
mod status;

pub(crate) use {
    error::{AppError, Result as AppResult},
    station::{Station, StationEvent},
};

use crate::{
    api_video::ApiVideoTransport,
    camera::{NokhwaSource, RETIRE_JOIN_TIMEOUT, RetiredThreads},
    config::Config,
    ffmpeg_recorder::FfmpegRecorderFactory,
    local_sink::DirectorySink,
    logs_client::WmsLogsClient,
    raster_surface::RasterSurface,
    status::DesktopStatus,
};

use std::sync::Arc;

use packcam_core::{
    CaptureController, CaptureDevices, LocalSink, OverlayRenderer, StatusSink, SystemClock,
    UploadPipeline, UploadTransport,
};
use tokio::sync::mpsc;
use tracing::{error, info, instrument};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_LOG_FILTER: &str = "packcam=debug,packcam_core=debug";

/// Console output plus a daily rolling JSON file in the data dir.
///
/// The returned guard flushes the file writer when dropped.
fn init_tracing() -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let (file_layer, guard) = match Config::log_dir() {
        Ok(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "packcam.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(fmt::layer().json().with_writer(writer)), Some(guard))
        }
        Err(_) => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    guard
}

/// Application entry point.
fn main() {
    let _log_guard = init_tracing();

    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load config: {:?}", e);
            std::process::exit(1);
        }
    };

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            error!("Failed to create tokio runtime: {:?}", e);
            std::process::exit(1);
        }
    };

    let result = rt.block_on(run(config));
    // A capture thread wedged in the driver must not hold the process open.
    rt.shutdown_timeout(RETIRE_JOIN_TIMEOUT);

    if let Err(e) = result {
        error!(error = ?e, "Packcam error");
        std::process::exit(1);
    }
}

/// Build the capture stack and drive the station until it quits.
#[instrument(skip(config))]
async fn run(config: Config) -> AppResult<()> {
    info!("Packcam starting");

    let credentials = config.upload_credentials()?;
    config.validate_fonts()?;
    ffmpeg_recorder::check_available()?;

    let http = reqwest::Client::new();
    let (events_tx, events_rx) = mpsc::unbounded_channel();

    // Only the capture stack holds the status sink, so the event channel
    // closes once the controller and its uploads are done.
    let status: Arc<dyn StatusSink> = Arc::new(DesktopStatus::new(events_tx, true));

    let transport: Arc<dyn UploadTransport> = Arc::new(ApiVideoTransport::new(
        http.clone(),
        config.upload.endpoint.clone(),
        config.upload.retry_policy(),
    ));
    let pipeline = Arc::new(UploadPipeline::new(
        transport,
        credentials,
        Arc::clone(&status),
        config.upload.min_part_size,
    ));

    let surface = RasterSurface::load(
        config.overlay.surface_width,
        config.overlay.surface_height,
        &config.overlay.font_path,
        &config.overlay.watermark_font_path,
    )?;

    let local = DirectorySink::new(config.download_dir()?);
    info!(download_dir = ?local.dir(), "Local copies directory");

    let retired_cameras = RetiredThreads::default();
    let devices = CaptureDevices {
        source: Box::new(NokhwaSource::new(
            Arc::clone(&status),
            retired_cameras.clone(),
        )),
        surface: Box::new(surface),
        recorders: Box::new(FfmpegRecorderFactory::new(
            config.overlay.surface_width,
            config.overlay.surface_height,
        )),
        local: Arc::new(local) as Arc<dyn LocalSink>,
    };

    let renderer = OverlayRenderer::new(
        Arc::new(SystemClock),
        config.overlay.watermark_text.clone(),
    );

    let mut controller = CaptureController::new(
        devices,
        pipeline,
        status,
        renderer,
        config.capture_settings(),
        config.operator.operator(),
    );
    controller.set_save_to_local(config.behaviour.save_to_local);

    let (command_tx, command_rx) = mpsc::channel(32);
    let controller_task = tokio::spawn(controller.run(command_rx));

    let station = Station::new(
        WmsLogsClient::new(http, &config.backend),
        command_tx,
        &config.operator,
    );
    let input = station::spawn_input_reader()?;

    let result = station
        .run(config.camera.device_id.clone(), input, events_rx)
        .await;

    if let Err(e) = controller_task.await {
        error!(error = ?e, "Capture controller task panicked");
    }
    retired_cameras.join_all(RETIRE_JOIN_TIMEOUT).await;

    info!("Packcam shut down successfully");

    result
}
