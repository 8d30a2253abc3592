mod capabilities;
mod command;
mod controller;
mod session;
mod state;

pub use {
    capabilities::{
        Frame, FrameFeed, LocalSink, Recorder, RecorderEvent, RecorderFactory, RecorderOptions,
        StreamConstraints, StreamSource, VideoStream,
    },
    command::ControllerCommand,
    controller::{CaptureController, CaptureDevices, CaptureSettings},
    state::CaptureState,
};
