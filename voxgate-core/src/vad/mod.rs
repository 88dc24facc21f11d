//! Voice Activity Detection (VAD).
//!
//! Two halves:
//! - A stateless classifier (`VoiceActivityDetector`) that labels one batch of
//!   samples as speech or silence. `EnergyVad` is the default.
//! - `SpeechTracker`, which folds those labels into utterance boundaries and
//!   latches `ready_to_process`.

pub mod energy;
pub mod tracker;

pub use energy::{rms, EnergyVad};
pub use tracker::{SpeechTracker, VadPhase, VadSnapshot};

/// Whether a given batch of samples contains speech or silence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VadDecision {
    /// The batch contains speech energy above threshold.
    Speech,
    /// The batch is silent (at or below threshold).
    Silence,
}

impl VadDecision {
    pub fn is_speech(self) -> bool {
        self == VadDecision::Speech
    }
}

/// Classifier seam for the capture session.
///
/// Runs on the device's real-time thread, so implementations must be cheap,
/// must not block, and take `&self`: any state they need has to be internally
/// synchronised.
pub trait VoiceActivityDetector: Send + Sync + 'static {
    /// Classify one batch of interleaved samples.
    fn classify(&self, samples: &[f32]) -> VadDecision;
}
