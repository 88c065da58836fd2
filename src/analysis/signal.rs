// Signal module - validated time-domain input
//
// A SampleSequence is the unit every other stage works from. It is built
// once through `load` and replaced wholesale on re-import.

use serde::Serialize;

use crate::error::AnalysisError;

/// Minimum number of samples accepted for analysis
pub const MIN_SAMPLES: usize = 32;

/// Ordered real-valued samples plus the rate they were captured at
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampleSequence {
    samples: Vec<f64>,
    sample_rate: f64,
}

impl SampleSequence {
    /// Validate and take ownership of a sample buffer
    ///
    /// # Errors
    /// * `InsufficientData` - fewer than [`MIN_SAMPLES`] samples
    /// * `InvalidSampleRate` - sample rate is not a positive finite number
    /// * `InvalidSample` - a sample is NaN or infinite
    pub fn load(samples: Vec<f64>, sample_rate: f64) -> Result<Self, AnalysisError> {
        if samples.len() < MIN_SAMPLES {
            return Err(AnalysisError::InsufficientData {
                required: MIN_SAMPLES,
                collected: samples.len(),
            });
        }

        if !sample_rate.is_finite() || sample_rate <= 0.0 {
            return Err(AnalysisError::InvalidSampleRate { sample_rate });
        }

        if let Some((index, &value)) = samples.iter().enumerate().find(|(_, s)| !s.is_finite()) {
            return Err(AnalysisError::InvalidSample { index, value });
        }

        Ok(Self {
            samples,
            sample_rate,
        })
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Always false for a loaded sequence; present for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Signal length in seconds
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate
    }

    /// Time stamp of sample `index` in seconds
    pub fn time_at(&self, index: usize) -> f64 {
        index as f64 / self.sample_rate
    }

    /// Copy the samples into an `fft_size` buffer, truncating or zero-padding
    pub fn fit_to(&self, fft_size: usize) -> Vec<f64> {
        let mut buffer: Vec<f64> = self.samples.iter().take(fft_size).copied().collect();
        buffer.resize(fft_size, 0.0);
        buffer
    }
}
