//! Utterance boundary state machine.
//!
//! ```text
//!            speech (< min)             speech (>= min)
//!   Idle ───────────────► Accumulating ───────────────► Confirmed
//!    ▲                        │                             │ silence run
//!    └──────── silence ───────┘                             ▼ >= threshold
//!                                                     ReadyToProcess
//! ```
//!
//! Silence before confirmation zeroes both counters, so a speech run has to
//! reach `min_speech_samples` without a single silent batch in between.
//! `ReadyToProcess` is latched until [`SpeechTracker::reset`]; batches that
//! arrive after the latch still move the counters.

/// Point-in-time copy of every tracker field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VadSnapshot {
    pub has_speech: bool,
    pub speech_sample_count: usize,
    pub silence_sample_count: usize,
    pub ready_to_process: bool,
}

impl VadSnapshot {
    pub fn phase(&self) -> VadPhase {
        if self.ready_to_process {
            VadPhase::ReadyToProcess
        } else if self.has_speech {
            VadPhase::Confirmed
        } else if self.speech_sample_count > 0 {
            VadPhase::Accumulating
        } else {
            VadPhase::Idle
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VadPhase {
    /// No speech accumulated.
    Idle,
    /// Speech seen, but the run is still shorter than the minimum.
    Accumulating,
    /// Minimum speech duration reached.
    Confirmed,
    /// Confirmed speech followed by enough trailing silence.
    ReadyToProcess,
}

/// Counts speech/silence samples and latches the "ready" signal.
///
/// Not synchronised; the capture session wraps it in its own mutex.
#[derive(Debug, Clone)]
pub struct SpeechTracker {
    min_speech_samples: usize,
    silence_threshold_samples: usize,
    state: VadSnapshot,
}

impl SpeechTracker {
    pub fn new(min_speech_samples: usize, silence_threshold_samples: usize) -> Self {
        Self {
            min_speech_samples,
            silence_threshold_samples,
            state: VadSnapshot::default(),
        }
    }

    /// Fold one classified batch of `samples` into the counters.
    ///
    /// Returns the new phase when this batch changed it, `None` otherwise.
    pub fn observe(&mut self, is_speech: bool, samples: usize) -> Option<VadPhase> {
        let before = self.state.phase();
        let s = &mut self.state;

        if is_speech {
            s.speech_sample_count = s.speech_sample_count.saturating_add(samples);
            s.silence_sample_count = 0;
            if s.speech_sample_count >= self.min_speech_samples {
                s.has_speech = true;
            }
        } else if s.has_speech {
            s.silence_sample_count = s.silence_sample_count.saturating_add(samples);
            if s.silence_sample_count >= self.silence_threshold_samples {
                s.ready_to_process = true;
            }
        } else {
            s.speech_sample_count = 0;
            s.silence_sample_count = 0;
        }

        let after = self.state.phase();
        (after != before).then_some(after)
    }

    /// Return to `Idle`.
    pub fn reset(&mut self) {
        self.state = VadSnapshot::default();
    }

    pub fn snapshot(&self) -> VadSnapshot {
        self.state
    }

    pub fn is_ready_to_process(&self) -> bool {
        self.state.ready_to_process
    }

    pub fn min_speech_samples(&self) -> usize {
        self.min_speech_samples
    }

    pub fn silence_threshold_samples(&self) -> usize {
        self.silence_threshold_samples
    }
}
