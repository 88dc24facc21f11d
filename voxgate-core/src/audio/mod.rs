//! Audio device layer.
//!
//! The capture session never talks to a sound API directly. It depends on the
//! narrow [`DeviceLayer`] / [`InputStream`] capability defined here, and the
//! application injects a concrete layer:
//!
//! - [`CpalDeviceLayer`] (feature `audio-cpal`, default) opens the system
//!   default microphone through cpal.
//! - [`NullDeviceLayer`] has no input devices; every open fails with
//!   `CaptureError::DeviceUnavailable`.
//!
//! # Callback contract
//!
//! The layer invokes the [`FrameCallback`] on its own real-time thread with
//! interleaved `f32` samples and the frame count. The callback must return
//! promptly. It owns whatever context it needs (the session passes an `Arc`
//! of its shared state), so the context outlives every in-flight callback.
//!
//! # Threading note
//!
//! `cpal::Stream` is `!Send` on most platforms (COM on Windows, CoreAudio on
//! macOS), so [`InputStream`] does not require `Send`. Dropping the stream
//! closes it.

#[cfg(feature = "audio-cpal")]
pub mod cpal_backend;

#[cfg(feature = "audio-cpal")]
pub use cpal_backend::CpalDeviceLayer;

use std::sync::Arc;

use crate::error::{CaptureError, Result};

/// Whether the device layer should keep delivering frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamFlow {
    Continue,
    Complete,
}

/// Producer-side frame handler: `(interleaved_samples, frame_count)`.
pub type FrameCallback = Box<dyn FnMut(&[f32], usize) -> StreamFlow + Send + 'static>;

/// Parameters requested when opening an input stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamParams {
    pub sample_rate: u32,
    pub channels: u16,
    pub frames_per_buffer: u32,
}

/// An open input stream. Dropping it closes the stream and releases the device.
pub trait InputStream {
    /// Begin delivering callbacks.
    fn start(&mut self) -> Result<()>;

    /// Halt callback delivery. The stream stays open and may be restarted.
    fn stop(&mut self) -> Result<()>;
}

/// Capability to open input streams on the default input device.
pub trait DeviceLayer: Send + Sync {
    /// Open (but do not start) an input stream.
    ///
    /// # Errors
    /// - `CaptureError::DeviceUnavailable` when there is no input device.
    /// - `CaptureError::StreamOpenFailed` when the device rejects `params`.
    fn open_input_stream(
        &self,
        params: StreamParams,
        on_frames: FrameCallback,
    ) -> Result<Box<dyn InputStream>>;
}

/// Device layer with zero input devices.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullDeviceLayer;

impl DeviceLayer for NullDeviceLayer {
    fn open_input_stream(
        &self,
        _params: StreamParams,
        _on_frames: FrameCallback,
    ) -> Result<Box<dyn InputStream>> {
        Err(CaptureError::DeviceUnavailable)
    }
}

/// The platform device layer: cpal when compiled with `audio-cpal`,
/// otherwise [`NullDeviceLayer`].
#[cfg(feature = "audio-cpal")]
pub fn default_device_layer() -> Arc<dyn DeviceLayer> {
    Arc::new(CpalDeviceLayer::new())
}

/// Stub when the `audio-cpal` feature is disabled.
#[cfg(not(feature = "audio-cpal"))]
pub fn default_device_layer() -> Arc<dyn DeviceLayer> {
    Arc::new(NullDeviceLayer)
}
