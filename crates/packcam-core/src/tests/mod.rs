mod overlay;
mod support;
mod upload;
