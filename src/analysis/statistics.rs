// Statistics module - descriptive time-domain statistics for reports

use serde::Serialize;

use crate::analysis::signal::SampleSequence;

/// Basic descriptive statistics of a loaded signal
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SignalStatistics {
    pub sample_count: usize,
    pub sample_rate: f64,
    pub duration_secs: f64,
    pub mean: f64,
    /// Population standard deviation
    pub std_dev: f64,
    pub max: f64,
    pub min: f64,
    pub rms: f64,
}

impl SignalStatistics {
    pub fn compute(signal: &SampleSequence) -> Self {
        let samples = signal.samples();
        let count = samples.len() as f64;

        let mean = samples.iter().sum::<f64>() / count;
        let variance = samples.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / count;
        let max = samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let min = samples.iter().copied().fold(f64::INFINITY, f64::min);
        let rms = (samples.iter().map(|s| s * s).sum::<f64>() / count).sqrt();

        Self {
            sample_count: samples.len(),
            sample_rate: signal.sample_rate(),
            duration_secs: signal.duration_secs(),
            mean,
            std_dev: variance.sqrt(),
            max,
            min,
            rms,
        }
    }
}
