//! Producer side of a capture session.
//!
//! `CaptureShared` is everything the device callback touches. It lives in an
//! `Arc` held by both the session and the callback closure. Per batch, in this
//! order:
//!
//! ```text
//! 1. append to SharedAudioBuffer          (buffer lock)
//! 2. classify, fold into SpeechTracker    (vad lock)
//! 3. invoke the user callback with a copy (no lock held)
//! ```
//!
//! At most one lock is held at any time, and neither is held while user code
//! runs.

use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc,
};

use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, trace};

use crate::{
    audio::StreamFlow,
    buffering::SharedAudioBuffer,
    vad::{SpeechTracker, VadPhase, VoiceActivityDetector},
};

/// User frame handler. Receives an owned copy of each batch.
pub type AudioCallback = Arc<dyn Fn(Vec<f32>) + Send + Sync + 'static>;

/// Relaxed counters updated from the audio thread.
#[derive(Default)]
pub struct CaptureDiagnostics {
    pub batches_in: AtomicUsize,
    pub samples_in: AtomicUsize,
    pub speech_batches: AtomicUsize,
    pub callbacks_invoked: AtomicUsize,
    pub utterances_ready: AtomicUsize,
}

impl CaptureDiagnostics {
    pub fn reset(&self) {
        self.batches_in.store(0, Ordering::Relaxed);
        self.samples_in.store(0, Ordering::Relaxed);
        self.speech_batches.store(0, Ordering::Relaxed);
        self.callbacks_invoked.store(0, Ordering::Relaxed);
        self.utterances_ready.store(0, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> DiagnosticsSnapshot {
        DiagnosticsSnapshot {
            batches_in: self.batches_in.load(Ordering::Relaxed),
            samples_in: self.samples_in.load(Ordering::Relaxed),
            speech_batches: self.speech_batches.load(Ordering::Relaxed),
            callbacks_invoked: self.callbacks_invoked.load(Ordering::Relaxed),
            utterances_ready: self.utterances_ready.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticsSnapshot {
    pub batches_in: usize,
    pub samples_in: usize,
    pub speech_batches: usize,
    pub callbacks_invoked: usize,
    pub utterances_ready: usize,
}

pub(crate) struct CaptureShared {
    pub(crate) channels: usize,
    pub(crate) buffer: SharedAudioBuffer,
    pub(crate) vad: Mutex<SpeechTracker>,
    pub(crate) detector: Box<dyn VoiceActivityDetector>,
    pub(crate) callback: Mutex<Option<AudioCallback>>,
    pub(crate) capturing: AtomicBool,
    pub(crate) diagnostics: CaptureDiagnostics,
}

impl CaptureShared {
    /// Device callback entry point. Runs on the real-time thread.
    pub(crate) fn handle_frames(&self, samples: &[f32], frame_count: usize) -> StreamFlow {
        let total = frame_count.saturating_mul(self.channels).min(samples.len());
        if total == 0 {
            return StreamFlow::Continue;
        }
        let batch = &samples[..total];

        self.buffer.append(batch);

        let decision = self.detector.classify(batch);
        let transition = self.vad.lock().observe(decision.is_speech(), total);

        self.diagnostics.batches_in.fetch_add(1, Ordering::Relaxed);
        self.diagnostics.samples_in.fetch_add(total, Ordering::Relaxed);
        if decision.is_speech() {
            self.diagnostics.speech_batches.fetch_add(1, Ordering::Relaxed);
        }
        match transition {
            Some(VadPhase::ReadyToProcess) => {
                self.diagnostics.utterances_ready.fetch_add(1, Ordering::Relaxed);
                debug!("utterance ready to process");
            }
            Some(VadPhase::Confirmed) => debug!(samples = total, "speech confirmed"),
            Some(phase) => trace!(?phase, "vad phase changed"),
            None => {}
        }

        // Clone the handle out so the lock is released before user code runs.
        let callback = self.callback.lock().clone();
        if let Some(callback) = callback {
            callback(batch.to_vec());
            self.diagnostics
                .callbacks_invoked
                .fetch_add(1, Ordering::Relaxed);
        }

        StreamFlow::Continue
    }
}
