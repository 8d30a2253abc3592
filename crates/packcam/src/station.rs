//! Terminal packing station.
//!
//! Reads barcode scans and commands line by line, keeps the transaction
//! logs in sync with the recordings and pushes actions to the capture
//! controller.

use crate::{
    AppError, AppResult, camera,
    config::OperatorConfig,
    logs_client::{LogStore, NewWmsLog, WmsLog},
};

use std::{
    collections::{HashMap, VecDeque},
    fmt::Write as _,
    io::BufRead,
    ops::ControlFlow,
    panic::Location,
    thread,
};

use error_location::ErrorLocation;
use packcam_core::{Action, ActionKind, ControllerCommand, Toast, UploadResult};
use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument, warn};

/// Recent transaction logs kept on screen.
pub(crate) const MAX_RECENT_LOGS: usize = 8;

/// Status callbacks forwarded from the capture stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum StationEvent {
    /// Camera became ready (`true`) or failed.
    Stream(bool),
    UploadStarted {
        tracking_code: String,
    },
    UploadFinished(UploadResult),
    Toast(Toast),
}

/// One line of operator input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum StationCommand {
    /// A scanned tracking code.
    Scan(String),
    /// Empty line: the parcel is packed.
    Complete,
    /// Abort the current parcel and delete its log.
    Cancel,
    /// Switch camera.
    Device(String),
    /// Print the available cameras.
    ListDevices,
    /// Toggle local copies.
    Local(bool),
    Quit,
    Unknown(String),
}

impl StationCommand {
    pub(crate) fn parse(line: &str) -> Self {
        let line = line.trim();
        let mut words = line.split_whitespace();

        match (words.next(), words.next(), words.next()) {
            (None, _, _) => StationCommand::Complete,
            (Some("cancel"), None, _) => StationCommand::Cancel,
            (Some("quit" | "exit"), None, _) => StationCommand::Quit,
            (Some("devices"), None, _) => StationCommand::ListDevices,
            (Some("device"), Some(id), None) => StationCommand::Device(id.to_string()),
            (Some("local"), Some("on"), None) => StationCommand::Local(true),
            (Some("local"), Some("off"), None) => StationCommand::Local(false),
            (Some("device" | "local"), _, _) => StationCommand::Unknown(line.to_string()),
            (Some(code), None, _) => StationCommand::Scan(code.to_string()),
            _ => StationCommand::Unknown(line.to_string()),
        }
    }
}

/// Forward stdin lines from a dedicated thread.
///
/// Blocking reads keep the runtime free to shut down while the operator is
/// idle at the prompt.
pub(crate) fn spawn_input_reader() -> AppResult<mpsc::Receiver<String>> {
    let (tx, rx) = mpsc::channel(32);

    thread::Builder::new()
        .name("station-input".to_string())
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                match line {
                    Ok(line) => {
                        if tx.blocking_send(line).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        error!(error = %e, "Failed to read station input");
                        break;
                    }
                }
            }
        })?;

    Ok(rx)
}

/// Page-level controller of the packing station.
pub(crate) struct Station<L> {
    logs: L,
    controller: mpsc::Sender<ControllerCommand>,
    organization_id: u64,
    user_id: u64,
    action: Action,
    stream_ready: bool,
    recent: VecDeque<WmsLog>,
    awaiting_video: HashMap<String, u64>,
    /// Log of the parcel being packed, if the backend created one.
    current_log: Option<u64>,
}

impl<L: LogStore> Station<L> {
    pub(crate) fn new(
        logs: L,
        controller: mpsc::Sender<ControllerCommand>,
        operator: &OperatorConfig,
    ) -> Self {
        Self {
            logs,
            controller,
            organization_id: operator.organization_id,
            user_id: operator.user_id,
            action: Action::default(),
            stream_ready: false,
            recent: VecDeque::with_capacity(MAX_RECENT_LOGS),
            awaiting_video: HashMap::new(),
            current_log: None,
        }
    }

    /// Action last pushed to the controller.
    #[cfg(test)]
    pub(crate) fn action(&self) -> &Action {
        &self.action
    }

    /// Most recent logs, newest first.
    #[cfg(test)]
    pub(crate) fn recent(&self) -> impl Iterator<Item = &WmsLog> {
        self.recent.iter()
    }

    /// Process operator input and status events until `quit` (or end of
    /// input) and every pending upload has reported back.
    #[instrument(skip(self, input, events))]
    pub(crate) async fn run(
        mut self,
        initial_device: Option<String>,
        mut input: mpsc::Receiver<String>,
        mut events: mpsc::UnboundedReceiver<StationEvent>,
    ) -> AppResult<()> {
        info!("Packing station ready");

        if let Some(device_id) = initial_device {
            let _ = self.handle_command(StationCommand::Device(device_id)).await?;
        }

        let mut quitting = false;

        loop {
            tokio::select! {
                line = input.recv(), if !quitting => {
                    let command = match line {
                        Some(line) => StationCommand::parse(&line),
                        None => {
                            info!("Station input closed");
                            StationCommand::Quit
                        }
                    };

                    match self.handle_command(command).await {
                        Ok(ControlFlow::Break(())) => quitting = true,
                        Ok(ControlFlow::Continue(())) => {}
                        Err(e) => error!(error = ?e, "Failed to handle station command"),
                    }
                }

                event = events.recv() => match event {
                    Some(event) => self.handle_event(event).await,
                    None => {
                        info!("Capture stack closed, station stopping");
                        break;
                    }
                },
            }
        }

        Ok(())
    }

    /// Apply one command. `Break` once the station is shutting down.
    #[instrument(skip(self))]
    pub(crate) async fn handle_command(
        &mut self,
        command: StationCommand,
    ) -> AppResult<ControlFlow<()>> {
        match command {
            StationCommand::Scan(code) => self.scan(code).await?,
            StationCommand::Complete => {
                if self.action.kind == ActionKind::Start {
                    info!(tracking_code = %self.action.tracking_code, "Parcel packed");
                    self.current_log = None;
                    self.push(self.action.with_kind(ActionKind::Stop)).await?;
                } else {
                    debug!("Nothing to complete");
                }
            }
            StationCommand::Cancel => self.cancel().await?,
            StationCommand::Device(device_id) => {
                self.stream_ready = false;
                self.current_log = None;
                self.push(Action::new(device_id, ActionKind::Idle, "")).await?;
            }
            StationCommand::ListDevices => match camera::list_devices() {
                Ok(devices) if devices.is_empty() => println!("No cameras found"),
                Ok(devices) => {
                    for device in devices {
                        println!("  {}  {}", device.device_id, device.name);
                    }
                }
                Err(e) => error!(error = ?e, "Failed to list cameras"),
            },
            StationCommand::Local(enabled) => {
                self.send(ControllerCommand::SetSaveToLocal(enabled)).await?;
                println!("Save to local: {}", if enabled { "on" } else { "off" });
            }
            StationCommand::Quit => {
                info!("Shutting down, waiting for pending uploads");
                self.send(ControllerCommand::Shutdown).await?;
                return Ok(ControlFlow::Break(()));
            }
            StationCommand::Unknown(line) => {
                warn!(input = %line, "Unrecognised command");
                println!("Commands: <tracking code>, <enter>, cancel, device <id>, devices, local on|off, quit");
            }
        }

        Ok(ControlFlow::Continue(()))
    }

    /// React to a status callback from the capture stack.
    pub(crate) async fn handle_event(&mut self, event: StationEvent) {
        match event {
            StationEvent::Stream(ready) => {
                self.stream_ready = ready;
                if ready {
                    println!("Camera ready. Scan a tracking code.");
                } else {
                    println!("Camera unavailable. Select another device.");
                }
            }
            StationEvent::UploadStarted { tracking_code } => {
                println!("Uploading {tracking_code}...");
            }
            StationEvent::UploadFinished(result) => self.attach_video(result).await,
            StationEvent::Toast(toast) => println!("{}: {}", toast.title, toast.description),
        }
    }

    /// Recent logs as printed under the prompt.
    pub(crate) fn render_recent(&self) -> String {
        let mut out = String::new();
        for log in &self.recent {
            let _ = writeln!(
                out,
                "  {:<24} {:<26} {}",
                log.attributes.transaction,
                log.attributes.created_at.as_deref().unwrap_or("-"),
                log.attributes.video_url.as_deref().unwrap_or("(no video yet)")
            );
        }
        out
    }

    async fn scan(&mut self, code: String) -> AppResult<()> {
        if self.action.kind == ActionKind::Start {
            warn!(
                tracking_code = %code,
                current = %self.action.tracking_code,
                "Finish the current parcel before scanning another"
            );
            return Ok(());
        }

        if !self.stream_ready {
            warn!(tracking_code = %code, "Camera is not ready, select a device first");
            return Ok(());
        }

        let entry = NewWmsLog::packed(self.organization_id, &code, self.user_id);
        self.current_log = match self.logs.create(&entry).await {
            Ok(log) => {
                let id = log.id;
                self.awaiting_video.insert(code.clone(), id);
                self.remember(log);
                Some(id)
            }
            Err(e) => {
                error!(tracking_code = %code, error = ?e, "Failed to create transaction log");
                None
            }
        };

        let action = Action {
            kind: ActionKind::Start,
            tracking_code: code,
            ..self.action.clone()
        };
        self.push(action).await
    }

    async fn cancel(&mut self) -> AppResult<()> {
        if self.action.kind != ActionKind::Start {
            debug!("Nothing to cancel");
            return Ok(());
        }

        self.push(self.action.with_kind(ActionKind::Idle)).await?;

        let Some(id) = self.current_log.take() else {
            debug!("Cancelled parcel has no transaction log");
            return Ok(());
        };

        match self.logs.delete(id).await {
            Ok(deleted) => {
                self.recent.retain(|log| log.id != deleted.id);
                self.awaiting_video.retain(|_, log_id| *log_id != deleted.id);
                println!("Deleted transaction {}", deleted.attributes.transaction);
                print!("{}", self.render_recent());
            }
            Err(e) => error!(id, error = ?e, "Failed to delete transaction log"),
        }

        Ok(())
    }

    async fn attach_video(&mut self, result: UploadResult) {
        let Some(url) = result.video.as_ref().and_then(|v| v.url()) else {
            warn!(tracking_code = %result.tracking_code, "Upload finished without a video URL");
            return;
        };

        let Some(id) = self.awaiting_video.remove(&result.tracking_code) else {
            debug!(tracking_code = %result.tracking_code, "No transaction log awaiting this video");
            return;
        };

        match self.logs.attach_video(id, url).await {
            Ok(()) => {
                if let Some(log) = self.recent.iter_mut().find(|log| log.id == id) {
                    log.attributes.video_url = Some(url.to_string());
                }
                println!("Uploaded {}: {}", result.tracking_code, url);
                print!("{}", self.render_recent());
            }
            Err(e) => error!(id, error = ?e, "Failed to attach video to transaction log"),
        }
    }

    fn remember(&mut self, log: WmsLog) {
        self.recent.push_front(log);
        self.recent.truncate(MAX_RECENT_LOGS);
        print!("{}", self.render_recent());
    }

    async fn push(&mut self, action: Action) -> AppResult<()> {
        self.action = action.clone();
        self.send(ControllerCommand::Action(action)).await
    }

    #[track_caller]
    fn channel_closed(message: String) -> AppError {
        AppError::ChannelSendFailed {
            message,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    async fn send(&self, command: ControllerCommand) -> AppResult<()> {
        self.controller
            .send(command)
            .await
            .map_err(|e| Self::channel_closed(format!("Capture controller is gone: {}", e)))
    }
}
