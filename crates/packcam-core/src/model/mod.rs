mod action;
mod operator;
mod toast;
mod video;

pub use {
    action::{Action, ActionKind},
    operator::Operator,
    toast::{Toast, ToastVariant},
    video::{UploadResult, VideoReference},
};
