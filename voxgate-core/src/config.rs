//! Capture configuration.
//!
//! `CaptureConfig` is a plain value object. Durations are given in
//! milliseconds but the VAD counts samples, so the session converts them
//! once at construction via [`CaptureConfig::min_speech_samples`] and
//! [`CaptureConfig::silence_threshold_samples`].

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CaptureError, Result};

/// Highest accepted capture rate (Hz).
pub const MAX_SAMPLE_RATE: u32 = 384_000;
/// Highest accepted interleaved channel count.
pub const MAX_CHANNELS: u16 = 32;
/// Highest accepted frames per device callback.
pub const MAX_FRAMES_PER_BUFFER: u32 = 65_536;

/// Configuration for a `CaptureSession`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Capture sample rate (Hz). Default: 16000.
    pub sample_rate: u32,
    /// Interleaved channel count. Default: 1.
    pub channels: u16,
    /// Frames delivered per device callback. Default: 512.
    pub frames_per_buffer: u32,
    /// RMS level a batch must exceed to count as speech. Default: 0.01.
    pub vad_threshold: f32,
    /// Contiguous speech required before an utterance is confirmed. Default: 500 ms.
    pub min_speech_duration_ms: f32,
    /// Trailing silence after confirmed speech that marks the utterance ready. Default: 250 ms.
    pub silence_duration_ms: f32,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            sample_rate: 16_000,
            channels: 1,
            frames_per_buffer: 512,
            vad_threshold: 0.01,
            min_speech_duration_ms: 500.0,
            silence_duration_ms: 250.0,
        }
    }
}

impl CaptureConfig {
    /// Parse a (possibly partial) JSON document. Missing fields take defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).map_err(|e| CaptureError::InvalidConfig {
            field: "json",
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| CaptureError::InvalidConfig {
            field: "path",
            reason: format!("{}: {e}", path.display()),
        })?;
        Self::from_json_str(&raw)
    }

    /// Check every field against its allowed range.
    pub fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 || self.sample_rate > MAX_SAMPLE_RATE {
            return Err(invalid(
                "sample_rate",
                &format!("must be in 1..={MAX_SAMPLE_RATE}"),
            ));
        }
        if self.channels == 0 || self.channels > MAX_CHANNELS {
            return Err(invalid("channels", &format!("must be in 1..={MAX_CHANNELS}")));
        }
        if self.frames_per_buffer == 0 || self.frames_per_buffer > MAX_FRAMES_PER_BUFFER {
            return Err(invalid(
                "frames_per_buffer",
                &format!("must be in 1..={MAX_FRAMES_PER_BUFFER}"),
            ));
        }
        if !self.vad_threshold.is_finite() || self.vad_threshold < 0.0 {
            return Err(invalid("vad_threshold", "must be a non-negative number"));
        }
        if !self.min_speech_duration_ms.is_finite() || self.min_speech_duration_ms < 0.0 {
            return Err(invalid(
                "min_speech_duration_ms",
                "must be a non-negative number",
            ));
        }
        if !self.silence_duration_ms.is_finite() || self.silence_duration_ms < 0.0 {
            return Err(invalid("silence_duration_ms", "must be a non-negative number"));
        }
        Ok(())
    }

    /// Samples of contiguous speech needed to confirm an utterance.
    pub fn min_speech_samples(&self) -> usize {
        ms_to_samples(self.min_speech_duration_ms, self.sample_rate)
    }

    /// Samples of trailing silence needed to mark an utterance ready.
    pub fn silence_threshold_samples(&self) -> usize {
        ms_to_samples(self.silence_duration_ms, self.sample_rate)
    }
}

fn ms_to_samples(ms: f32, sample_rate: u32) -> usize {
    ((ms / 1000.0) * sample_rate as f32) as usize
}

fn invalid(field: &'static str, reason: &str) -> CaptureError {
    CaptureError::InvalidConfig {
        field,
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn defaults_match_documented_values() {
        let config = CaptureConfig::default();
        assert_eq!(config.sample_rate, 16_000);
        assert_eq!(config.channels, 1);
        assert_eq!(config.frames_per_buffer, 512);
        assert_eq!(config.vad_threshold, 0.01);
        assert_eq!(config.min_speech_duration_ms, 500.0);
        assert_eq!(config.silence_duration_ms, 250.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn derived_thresholds_are_sample_counts() {
        let config = CaptureConfig::default();
        assert_eq!(config.min_speech_samples(), 8_000);
        assert_eq!(config.silence_threshold_samples(), 4_000);

        let config = CaptureConfig {
            sample_rate: 44_100,
            min_speech_duration_ms: 100.0,
            silence_duration_ms: 0.0,
            ..CaptureConfig::default()
        };
        assert_eq!(config.min_speech_samples(), 4_410);
        assert_eq!(config.silence_threshold_samples(), 0);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config = CaptureConfig::from_json_str(
            r#"{ "sample_rate": 44100, "channels": 2, "frames_per_buffer": 1024 }"#,
        )
        .unwrap();
        assert_eq!(config.sample_rate, 44_100);
        assert_eq!(config.channels, 2);
        assert_eq!(config.frames_per_buffer, 1024);
        assert_eq!(config.vad_threshold, 0.01);
    }

    #[test]
    fn loads_config_from_json_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("capture.json");
        std::fs::write(&path, r#"{ "vad_threshold": 0.25, "silence_duration_ms": 400 }"#)
            .unwrap();

        let config = CaptureConfig::from_json_file(&path).unwrap();
        assert_eq!(config.vad_threshold, 0.25);
        assert_eq!(config.silence_duration_ms, 400.0);
        assert_eq!(config.sample_rate, 16_000);
    }

    #[test]
    fn missing_json_file_is_invalid_config() {
        let dir = tempdir().unwrap();
        let err = CaptureConfig::from_json_file(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, CaptureError::InvalidConfig { field: "path", .. }));
    }

    #[test]
    fn rejects_out_of_range_fields() {
        let zero_rate = CaptureConfig {
            sample_rate: 0,
            ..CaptureConfig::default()
        };
        assert!(matches!(
            zero_rate.validate(),
            Err(CaptureError::InvalidConfig {
                field: "sample_rate",
                ..
            })
        ));

        let no_channels = CaptureConfig {
            channels: 0,
            ..CaptureConfig::default()
        };
        assert!(no_channels.validate().is_err());

        let negative = CaptureConfig {
            vad_threshold: -0.1,
            ..CaptureConfig::default()
        };
        assert!(negative.validate().is_err());

        let huge = CaptureConfig {
            sample_rate: u32::MAX,
            channels: u16::MAX,
            ..CaptureConfig::default()
        };
        assert!(matches!(
            huge.validate(),
            Err(CaptureError::InvalidConfig {
                field: "sample_rate",
                ..
            })
        ));

        let too_many_channels = CaptureConfig {
            channels: MAX_CHANNELS + 1,
            ..CaptureConfig::default()
        };
        assert!(too_many_channels.validate().is_err());

        let huge_batch = CaptureConfig {
            frames_per_buffer: MAX_FRAMES_PER_BUFFER + 1,
            ..CaptureConfig::default()
        };
        assert!(huge_batch.validate().is_err());

        let upper_bounds = CaptureConfig {
            sample_rate: MAX_SAMPLE_RATE,
            channels: MAX_CHANNELS,
            frames_per_buffer: MAX_FRAMES_PER_BUFFER,
            ..CaptureConfig::default()
        };
        assert!(upper_bounds.validate().is_ok());

        let nan = CaptureConfig {
            silence_duration_ms: f32::NAN,
            ..CaptureConfig::default()
        };
        assert!(nan.validate().is_err());
    }

    #[test]
    fn malformed_json_is_invalid_config() {
        let err = CaptureConfig::from_json_str("{ sample_rate: ").unwrap_err();
        assert!(matches!(err, CaptureError::InvalidConfig { field: "json", .. }));
    }
}
