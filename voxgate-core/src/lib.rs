//! # voxgate-core
//!
//! Continuous microphone capture with automatic utterance segmentation.
//!
//! ## Architecture
//!
//! ```text
//! DeviceLayer (cpal) ──callback──► CaptureShared::handle_frames   [audio thread]
//!                                     │ 1. SharedAudioBuffer::append
//!                                     │ 2. VoiceActivityDetector → SpeechTracker
//!                                     │ 3. user AudioCallback (copy of batch)
//!                                     ▼
//! CaptureMonitor ◄── take_all / is_ready_to_process / reset_vad_state  [consumer]
//! ```
//!
//! The buffer and the VAD state each have their own short-lived lock; the
//! audio thread never holds both at once and never holds either while user
//! code runs.
//!
//! ## Example
//!
//! ```no_run
//! use voxgate_core::{audio::default_device_layer, CaptureConfig, CaptureSession};
//!
//! let mut session = CaptureSession::new(CaptureConfig::default(), default_device_layer())?;
//! session.initialize()?;
//! session.start()?;
//!
//! let monitor = session.monitor();
//! loop {
//!     if monitor.is_ready_to_process() {
//!         let utterance = monitor.take_all();
//!         monitor.reset_vad_state();
//!         println!("{} samples", utterance.len());
//!         break;
//!     }
//!     std::thread::sleep(std::time::Duration::from_millis(20));
//! }
//! # Ok::<(), voxgate_core::CaptureError>(())
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all)]

pub mod audio;
pub mod buffering;
pub mod config;
pub mod error;
pub mod session;
pub mod vad;

// Convenience re-exports for downstream crates
pub use audio::{DeviceLayer, FrameCallback, InputStream, NullDeviceLayer, StreamFlow, StreamParams};
pub use buffering::SharedAudioBuffer;
pub use config::CaptureConfig;
pub use error::{CaptureError, Result};
pub use session::{CaptureMonitor, CaptureSession, DiagnosticsSnapshot, SessionState};
pub use vad::{EnergyVad, VadDecision, VadPhase, VadSnapshot, VoiceActivityDetector};

#[cfg(feature = "audio-cpal")]
pub use audio::CpalDeviceLayer;
