//! Packcam Core Library
//!
//! Records a packing action from a camera, stamps every frame with the
//! tracking code, time and operator, and uploads the result to a media
//! service in two parts.
//!
//! Platform access lives behind the capability traits ([`StreamSource`],
//! [`DrawSurface`], [`RecorderFactory`], [`UploadTransport`],
//! [`LocalSink`], [`StatusSink`]); [`CaptureController`] drives them from
//! [`Action`]s pushed by the station.
//!
//! # Example
//!
//! ```no_run
//! use packcam_core::{Action, ActionKind, CaptureController, ControllerCommand};
//!
//! async fn pack(controller: CaptureController) {
//!     let (tx, rx) = tokio::sync::mpsc::channel(32);
//!     let task = tokio::spawn(controller.run(rx));
//!
//!     let action = Action::new("0", ActionKind::Idle, "");
//!     let _ = tx.send(ControllerCommand::Action(action.clone())).await;
//!
//!     let scanned = Action::new("0", ActionKind::Start, "ABC123");
//!     let _ = tx.send(ControllerCommand::Action(scanned.clone())).await;
//!     let _ = tx.send(ControllerCommand::Action(scanned.with_kind(ActionKind::Stop))).await;
//!
//!     let _ = tx.send(ControllerCommand::Shutdown).await;
//!     let _ = task.await;
//! }
//! ```

mod capture;
mod error;
mod model;
mod overlay;
mod upload;

pub use {
    capture::{
        CaptureController, CaptureDevices, CaptureSettings, CaptureState, ControllerCommand,
        Frame, FrameFeed, LocalSink, Recorder, RecorderEvent, RecorderFactory, RecorderOptions,
        StreamConstraints, StreamSource, VideoStream,
    },
    error::{CaptureError, Result as CoreResult},
    model::{Action, ActionKind, Operator, Toast, ToastVariant, UploadResult, VideoReference},
    overlay::{
        Clock, Color, DEFAULT_WATERMARK_TEXT, DrawSurface, FontFamily, FontSpec, OverlayRenderer,
        SystemClock,
    },
    upload::{
        DEFAULT_MIN_PART_SIZE, RetryPolicy, StatusSink, UploadCredentials, UploadPhase,
        UploadPipeline, UploadTicket, UploadTransport,
    },
};

#[cfg(test)]
mod tests;
