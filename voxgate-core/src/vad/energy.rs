//! Energy-based VAD using a strict RMS threshold.
//!
//! A batch is speech when `rms(batch) > threshold`. A batch whose RMS is
//! exactly the threshold is silence.

use super::{VadDecision, VoiceActivityDetector};

/// Root-mean-square of a sample slice. Returns `0.0` for an empty slice.
pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_sq: f32 = samples.iter().map(|s| s * s).sum();
    (sum_sq / samples.len() as f32).sqrt()
}

/// A simple energy-based voice activity detector.
#[derive(Debug, Clone)]
pub struct EnergyVad {
    /// RMS amplitude threshold. Batches strictly above this are speech.
    /// Typical range: 0.01–0.05 for a quiet microphone.
    threshold: f32,
}

impl EnergyVad {
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn is_speech(&self, samples: &[f32]) -> bool {
        rms(samples) > self.threshold
    }
}

impl Default for EnergyVad {
    fn default() -> Self {
        Self::new(0.01)
    }
}

impl VoiceActivityDetector for EnergyVad {
    fn classify(&self, samples: &[f32]) -> VadDecision {
        if self.is_speech(samples) {
            VadDecision::Speech
        } else {
            VadDecision::Silence
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn rms_of_empty_is_zero() {
        assert_eq!(rms(&[]), 0.0);
    }

    #[test]
    fn rms_of_constant_amplitude_is_its_magnitude() {
        for amplitude in [0.5f32, -0.25, 1.0, 0.003] {
            for len in [1usize, 7, 512] {
                let samples = vec![amplitude; len];
                assert_relative_eq!(rms(&samples), amplitude.abs(), epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn rms_of_square_wave() {
        let samples: Vec<f32> = (0..256)
            .map(|i| if i % 2 == 0 { 0.5 } else { -0.5 })
            .collect();
        assert_relative_eq!(rms(&samples), 0.5, epsilon = 1e-5);
    }

    #[test]
    fn silence_below_threshold() {
        let vad = EnergyVad::new(0.02);
        assert_eq!(vad.classify(&[0.0; 160]), VadDecision::Silence);
    }

    #[test]
    fn speech_above_threshold() {
        let vad = EnergyVad::new(0.02);
        assert_eq!(vad.classify(&[0.5; 160]), VadDecision::Speech);
    }

    #[test]
    fn rms_equal_to_threshold_is_silence() {
        // 0.5 is exactly representable, so rms(batch) == threshold.
        let vad = EnergyVad::new(0.5);
        let batch = [0.5f32, -0.5, 0.5, -0.5];
        assert_eq!(rms(&batch), 0.5);
        assert_eq!(vad.classify(&batch), VadDecision::Silence);
        assert_eq!(vad.classify(&[0.5001; 4]), VadDecision::Speech);
    }

    #[test]
    fn empty_batch_is_silence() {
        let vad = EnergyVad::new(0.0);
        assert_eq!(vad.classify(&[]), VadDecision::Silence);
    }
}
