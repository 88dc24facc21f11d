//! cpal-backed [`DeviceLayer`].
//!
//! The cpal input callback runs on an OS audio thread at elevated priority.
//! The adapter adds nothing to that path beyond an atomic gate: frames that
//! arrive while the stream is stopped (some backends begin delivering as soon
//! as the stream is built) are dropped before they reach the session.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use cpal::{
    traits::{DeviceTrait, HostTrait, StreamTrait},
    BufferSize, HostId, SampleRate, Stream, StreamConfig,
};
use tracing::{error, info};

use super::{DeviceLayer, FrameCallback, InputStream, StreamFlow, StreamParams};
use crate::error::{CaptureError, Result};

/// Opens the default input device of one cpal host.
#[derive(Debug, Clone, Copy)]
pub struct CpalDeviceLayer {
    host_id: HostId,
}

impl CpalDeviceLayer {
    /// Use the platform's default cpal host.
    pub fn new() -> Self {
        Self {
            host_id: cpal::default_host().id(),
        }
    }

    /// Use a specific cpal host (e.g. JACK or ASIO when compiled in).
    pub fn with_host(host_id: HostId) -> Self {
        Self { host_id }
    }
}

impl Default for CpalDeviceLayer {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceLayer for CpalDeviceLayer {
    fn open_input_stream(
        &self,
        params: StreamParams,
        mut on_frames: FrameCallback,
    ) -> Result<Box<dyn InputStream>> {
        let host = cpal::host_from_id(self.host_id)
            .map_err(|e| CaptureError::StreamOpenFailed(e.to_string()))?;
        let device = host
            .default_input_device()
            .ok_or(CaptureError::DeviceUnavailable)?;

        info!(
            device = device.name().unwrap_or_default().as_str(),
            sample_rate = params.sample_rate,
            channels = params.channels,
            frames_per_buffer = params.frames_per_buffer,
            "opening input device"
        );

        let config = StreamConfig {
            channels: params.channels,
            sample_rate: SampleRate(params.sample_rate),
            buffer_size: BufferSize::Fixed(params.frames_per_buffer),
        };

        let active = Arc::new(AtomicBool::new(false));
        let active_cb = Arc::clone(&active);
        let channels = usize::from(params.channels);

        let stream = device
            .build_input_stream(
                &config,
                move |data: &[f32], _info: &cpal::InputCallbackInfo| {
                    if !active_cb.load(Ordering::Relaxed) {
                        return;
                    }
                    let frames = data.len() / channels;
                    if on_frames(data, frames) == StreamFlow::Complete {
                        active_cb.store(false, Ordering::Relaxed);
                    }
                },
                |err| error!("audio stream error: {err}"),
                None,
            )
            .map_err(|e| CaptureError::StreamOpenFailed(e.to_string()))?;

        Ok(Box::new(CpalInputStream { stream, active }))
    }
}

/// Open cpal stream. **Not `Send`**; drop it on the thread that opened it.
struct CpalInputStream {
    stream: Stream,
    /// Shared with the data callback; `false` makes it drop frames.
    active: Arc<AtomicBool>,
}

impl InputStream for CpalInputStream {
    fn start(&mut self) -> Result<()> {
        self.active.store(true, Ordering::Release);
        self.stream.play().map_err(|e| {
            self.active.store(false, Ordering::Release);
            CaptureError::StreamStartFailed(e.to_string())
        })
    }

    fn stop(&mut self) -> Result<()> {
        self.active.store(false, Ordering::Release);
        self.stream
            .pause()
            .map_err(|e| CaptureError::StreamStopFailed(e.to_string()))
    }
}

impl Drop for CpalInputStream {
    fn drop(&mut self) {
        // The cpal stream itself closes when `stream` drops.
        self.active.store(false, Ordering::Release);
    }
}
