//! `CaptureSession`: capture lifecycle controller.
//!
//! ## Lifecycle
//!
//! ```text
//! CaptureSession::new()      → Created
//!     └─► initialize()       → stream opened, callback registered → Initialized
//!         └─► start()        → device delivering frames → Capturing
//!             └─► stop()     → delivery halted → Stopped (start() again to resume)
//! drop                       → stop(), then the stream is closed
//! ```
//!
//! `start()` on a capturing session and `stop()` on a non-capturing one are
//! successful no-ops.
//!
//! ## Threading
//!
//! The session owns the device stream, which may be bound to the thread that
//! opened it. Consumers on other threads use a [`CaptureMonitor`] from
//! [`CaptureSession::monitor`] to drain audio and poll/reset VAD state.

pub mod handler;

use std::sync::{atomic::Ordering, Arc};

use parking_lot::Mutex;
use tracing::{debug, error, info, warn};

use crate::{
    audio::{DeviceLayer, FrameCallback, InputStream, StreamParams},
    buffering::SharedAudioBuffer,
    config::CaptureConfig,
    error::{CaptureError, Result},
    vad::{EnergyVad, SpeechTracker, VadSnapshot, VoiceActivityDetector},
};

pub use handler::{AudioCallback, CaptureDiagnostics, DiagnosticsSnapshot};
use handler::CaptureShared;

/// Device batches the shared buffer can hold before its first reallocation.
const PREALLOCATED_BATCHES: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Constructed; no device stream held.
    Created,
    /// Stream open, not yet started.
    Initialized,
    /// Device is delivering frames.
    Capturing,
    /// Stream open, delivery halted by `stop()`.
    Stopped,
}

/// A microphone capture session with voice-activity segmentation.
pub struct CaptureSession {
    config: CaptureConfig,
    device: Arc<dyn DeviceLayer>,
    stream: Option<Box<dyn InputStream>>,
    state: SessionState,
    shared: Arc<CaptureShared>,
}

impl CaptureSession {
    /// Create a session using the energy (RMS) classifier at
    /// `config.vad_threshold`. Does not touch the device; call `initialize()`.
    ///
    /// # Errors
    /// `CaptureError::InvalidConfig` if `config` fails validation.
    pub fn new(config: CaptureConfig, device: Arc<dyn DeviceLayer>) -> Result<Self> {
        let detector = EnergyVad::new(config.vad_threshold);
        Self::with_detector(config, device, detector)
    }

    /// Create a session with a custom speech/silence classifier.
    pub fn with_detector<D: VoiceActivityDetector>(
        config: CaptureConfig,
        device: Arc<dyn DeviceLayer>,
        detector: D,
    ) -> Result<Self> {
        config.validate()?;

        let tracker = SpeechTracker::new(
            config.min_speech_samples(),
            config.silence_threshold_samples(),
        );
        // A few device batches up front keeps early appends from reallocating.
        let capacity = config.frames_per_buffer as usize
            * usize::from(config.channels)
            * PREALLOCATED_BATCHES;

        let shared = Arc::new(CaptureShared {
            channels: usize::from(config.channels),
            buffer: SharedAudioBuffer::with_capacity(capacity),
            vad: Mutex::new(tracker),
            detector: Box::new(detector),
            callback: Mutex::new(None),
            capturing: Default::default(),
            diagnostics: CaptureDiagnostics::default(),
        });

        Ok(Self {
            config,
            device,
            stream: None,
            state: SessionState::Created,
            shared,
        })
    }

    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Open the default input device and register the frame handler.
    ///
    /// Calling this on an already-initialized session stops capture, closes
    /// the current stream, and opens a fresh one.
    ///
    /// # Errors
    /// - `CaptureError::DeviceUnavailable` if there is no input device.
    /// - `CaptureError::StreamOpenFailed` if the device rejects the parameters.
    pub fn initialize(&mut self) -> Result<()> {
        if self.stream.is_some() {
            debug!("reinitializing capture session; closing current stream");
            let _ = self.stop();
            self.stream = None;
            self.state = SessionState::Created;
        }

        let params = StreamParams {
            sample_rate: self.config.sample_rate,
            channels: self.config.channels,
            frames_per_buffer: self.config.frames_per_buffer,
        };

        let shared = Arc::clone(&self.shared);
        let on_frames: FrameCallback = Box::new(move |samples: &[f32], frame_count: usize| {
            shared.handle_frames(samples, frame_count)
        });

        match self.device.open_input_stream(params, on_frames) {
            Ok(stream) => {
                self.stream = Some(stream);
                self.state = SessionState::Initialized;
                info!(
                    sample_rate = params.sample_rate,
                    channels = params.channels,
                    frames_per_buffer = params.frames_per_buffer,
                    "capture session initialized"
                );
                Ok(())
            }
            Err(e) => {
                error!("failed to initialize audio capture: {e}");
                Err(e)
            }
        }
    }

    /// Begin capturing.
    ///
    /// # Errors
    /// - `CaptureError::StreamNotInitialized` before a successful `initialize()`.
    /// - `CaptureError::StreamStartFailed` if the device refuses to start.
    pub fn start(&mut self) -> Result<()> {
        let Some(stream) = self.stream.as_mut() else {
            error!("audio stream not initialized");
            return Err(CaptureError::StreamNotInitialized);
        };

        if self.shared.capturing.load(Ordering::SeqCst) {
            return Ok(());
        }

        if let Err(e) = stream.start() {
            error!("failed to start audio capture: {e}");
            return Err(e);
        }

        self.shared.diagnostics.reset();
        self.shared.capturing.store(true, Ordering::SeqCst);
        self.state = SessionState::Capturing;
        info!("audio capture started");
        Ok(())
    }

    /// Stop capturing.
    ///
    /// The session is marked as not capturing even when the device reports a
    /// failure; that failure is logged and returned for information only.
    pub fn stop(&mut self) -> Result<()> {
        if !self.shared.capturing.swap(false, Ordering::SeqCst) {
            return Ok(());
        }
        self.state = SessionState::Stopped;

        let outcome = match self.stream.as_mut() {
            Some(stream) => stream.stop(),
            None => Ok(()),
        };

        match outcome {
            Ok(()) => {
                info!("audio capture stopped");
                Ok(())
            }
            Err(e) => {
                warn!("audio device reported an error while stopping: {e}");
                Err(e)
            }
        }
    }

    pub fn is_capturing(&self) -> bool {
        self.shared.capturing.load(Ordering::SeqCst)
    }

    /// Install or replace the user frame handler.
    ///
    /// The handler runs inline on the audio thread after buffering and VAD
    /// accounting, with an owned copy of each batch. Keep it short.
    pub fn set_callback<F>(&self, callback: F)
    where
        F: Fn(Vec<f32>) + Send + Sync + 'static,
    {
        *self.shared.callback.lock() = Some(Arc::new(callback));
    }

    pub fn clear_callback(&self) {
        *self.shared.callback.lock() = None;
    }

    /// Cloneable, `Send + Sync` handle for consumer threads.
    pub fn monitor(&self) -> CaptureMonitor {
        CaptureMonitor {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Drain all audio captured since the previous take.
    pub fn take_all(&self) -> Vec<f32> {
        self.shared.buffer.take_all()
    }

    pub fn clear_buffer(&self) {
        self.shared.buffer.clear();
    }

    pub fn is_ready_to_process(&self) -> bool {
        self.shared.vad.lock().is_ready_to_process()
    }

    /// Acknowledge a ready utterance; returns VAD state to idle.
    pub fn reset_vad_state(&self) {
        self.shared.vad.lock().reset();
    }

    pub fn vad_snapshot(&self) -> VadSnapshot {
        self.shared.vad.lock().snapshot()
    }

    pub fn diagnostics(&self) -> DiagnosticsSnapshot {
        self.shared.diagnostics.snapshot()
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        // stop() already logged any device error.
        let _ = self.stop();
        if self.stream.take().is_some() {
            debug!("audio stream closed");
        }
    }
}

/// Consumer-side view of a session: drain audio, poll and reset VAD state.
///
/// Holds only the shared state, not the device stream, so it can outlive the
/// session; after the session drops it simply sees no new audio.
#[derive(Clone)]
pub struct CaptureMonitor {
    shared: Arc<CaptureShared>,
}

impl CaptureMonitor {
    pub fn take_all(&self) -> Vec<f32> {
        self.shared.buffer.take_all()
    }

    pub fn clear_buffer(&self) {
        self.shared.buffer.clear();
    }

    pub fn buffered_samples(&self) -> usize {
        self.shared.buffer.len()
    }

    pub fn is_capturing(&self) -> bool {
        self.shared.capturing.load(Ordering::SeqCst)
    }

    pub fn is_ready_to_process(&self) -> bool {
        self.shared.vad.lock().is_ready_to_process()
    }

    pub fn reset_vad_state(&self) {
        self.shared.vad.lock().reset();
    }

    pub fn vad_snapshot(&self) -> VadSnapshot {
        self.shared.vad.lock().snapshot()
    }

    pub fn diagnostics(&self) -> DiagnosticsSnapshot {
        self.shared.diagnostics.snapshot()
    }
}

impl std::fmt::Debug for CaptureMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureMonitor").finish_non_exhaustive()
    }
}
