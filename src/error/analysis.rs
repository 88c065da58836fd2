// Analysis error types and constants

use crate::error::ErrorCode;
use log::error;
use std::fmt;

/// Analysis error code constants
///
/// Single source of truth for the numeric codes reported by the CLI and
/// serialized into JSON error payloads.
///
/// Error code range: 1001-1011
pub struct AnalysisErrorCodes {}

impl AnalysisErrorCodes {
    /// Fewer samples than the minimum analysis window
    pub const INSUFFICIENT_DATA: i32 = 1001;

    /// Sample rate is zero, negative or not finite
    pub const INVALID_SAMPLE_RATE: i32 = 1002;

    /// FFT size is not a power of two
    pub const INVALID_FFT_SIZE: i32 = 1003;

    /// No harmonic of the fundamental lies below Nyquist
    pub const NO_HARMONICS_FOUND: i32 = 1004;

    /// Fundamental bin carries no energy, distortion ratios are undefined
    pub const UNDEFINED_DISTORTION_METRIC: i32 = 1005;

    /// Window length below 2
    pub const INVALID_WINDOW_LENGTH: i32 = 1006;

    /// Fundamental frequency is zero, negative or not finite
    pub const INVALID_FUNDAMENTAL: i32 = 1007;

    /// Harmonic order count is zero
    pub const INVALID_HARMONIC_ORDER: i32 = 1008;

    /// Filter cutoff frequencies are inconsistent
    pub const INVALID_CUTOFF: i32 = 1009;

    /// Pipeline stage requested before its input exists
    pub const STAGE_NOT_READY: i32 = 1010;

    /// Sample value is NaN or infinite
    pub const INVALID_SAMPLE: i32 = 1011;
}

/// Log an analysis error with structured context
///
/// Emits the numeric code, component and message so failures can be
/// grepped out of CLI logs.
pub fn log_analysis_error(err: &AnalysisError, context: &str) {
    error!(
        "Analysis error in {}: code={}, component=SpectralPipeline, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Spectral analysis errors
///
/// Every pipeline operation fails fast with one of these instead of
/// letting NaN or infinity flow into downstream results.
///
/// Error code range: 1001-1011
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// Not enough samples to run an analysis
    InsufficientData { required: usize, collected: usize },

    /// Sample rate must be a positive finite number
    InvalidSampleRate { sample_rate: f64 },

    /// FFT length must be a power of two (and at least 2)
    InvalidFftSize { size: usize },

    /// Every requested harmonic lies at or above Nyquist
    NoHarmonicsFound { fundamental_freq: f64, nyquist: f64 },

    /// Fundamental magnitude is zero so THD/THD+N/SINAD cannot be formed
    UndefinedDistortionMetric { fundamental_freq: f64 },

    /// Window functions divide by N-1 and need at least two points
    InvalidWindowLength { length: usize },

    /// Fundamental frequency must be a positive finite number
    InvalidFundamental { fundamental_freq: f64 },

    /// At least one harmonic order must be requested
    InvalidHarmonicOrder { order: usize },

    /// Cutoff frequencies are negative, not finite, or out of order
    InvalidCutoff { reason: String },

    /// A stage was invoked before the stage it depends on
    StageNotReady { stage: String },

    /// Samples must be finite numbers
    InvalidSample { index: usize, value: f64 },
}

impl ErrorCode for AnalysisError {
    fn code(&self) -> i32 {
        match self {
            AnalysisError::InsufficientData { .. } => AnalysisErrorCodes::INSUFFICIENT_DATA,
            AnalysisError::InvalidSampleRate { .. } => AnalysisErrorCodes::INVALID_SAMPLE_RATE,
            AnalysisError::InvalidFftSize { .. } => AnalysisErrorCodes::INVALID_FFT_SIZE,
            AnalysisError::NoHarmonicsFound { .. } => AnalysisErrorCodes::NO_HARMONICS_FOUND,
            AnalysisError::UndefinedDistortionMetric { .. } => {
                AnalysisErrorCodes::UNDEFINED_DISTORTION_METRIC
            }
            AnalysisError::InvalidWindowLength { .. } => {
                AnalysisErrorCodes::INVALID_WINDOW_LENGTH
            }
            AnalysisError::InvalidFundamental { .. } => AnalysisErrorCodes::INVALID_FUNDAMENTAL,
            AnalysisError::InvalidHarmonicOrder { .. } => {
                AnalysisErrorCodes::INVALID_HARMONIC_ORDER
            }
            AnalysisError::InvalidCutoff { .. } => AnalysisErrorCodes::INVALID_CUTOFF,
            AnalysisError::StageNotReady { .. } => AnalysisErrorCodes::STAGE_NOT_READY,
            AnalysisError::InvalidSample { .. } => AnalysisErrorCodes::INVALID_SAMPLE,
        }
    }

    fn message(&self) -> String {
        match self {
            AnalysisError::InsufficientData {
                required,
                collected,
            } => {
                format!("Insufficient data: need {}, got {}", required, collected)
            }
            AnalysisError::InvalidSampleRate { sample_rate } => {
                format!("Sample rate must be greater than 0 (got {})", sample_rate)
            }
            AnalysisError::InvalidFftSize { size } => {
                format!("FFT size {} is not a power of two or does not match the analyzer", size)
            }
            AnalysisError::NoHarmonicsFound {
                fundamental_freq,
                nyquist,
            } => format!(
                "No harmonic of {} Hz lies below the Nyquist frequency {} Hz",
                fundamental_freq, nyquist
            ),
            AnalysisError::UndefinedDistortionMetric { fundamental_freq } => format!(
                "Fundamental at {} Hz has zero magnitude; distortion metrics are undefined",
                fundamental_freq
            ),
            AnalysisError::InvalidWindowLength { length } => {
                format!("Window length must be at least 2 (got {})", length)
            }
            AnalysisError::InvalidFundamental { fundamental_freq } => format!(
                "Fundamental frequency must be greater than 0 (got {})",
                fundamental_freq
            ),
            AnalysisError::InvalidHarmonicOrder { order } => {
                format!("Harmonic order must be at least 1 (got {})", order)
            }
            AnalysisError::InvalidCutoff { reason } => {
                format!("Invalid cutoff: {}", reason)
            }
            AnalysisError::StageNotReady { stage } => {
                format!("Stage not ready: {}", stage)
            }
            AnalysisError::InvalidSample { index, value } => {
                format!("Sample {} is not a finite number (got {})", index, value)
            }
        }
    }
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "AnalysisError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for AnalysisError {}
