// Analysis module - spectral analysis pipeline
//
// This module owns the numeric core: a validated sample buffer, window
// library, radix-2 FFT, harmonic/distortion analysis and a brick-wall
// spectral filter. AnalysisSession ties the stages together for one caller.
//
// Architecture:
// - SampleSequence: validated time-domain input
// - Pipeline: Window → FFT → { HarmonicAnalyzer, SpectralFilter }
// - Worker: runs a full pipeline request on its own thread and returns the
//   finished session through a oneshot channel

pub mod fft;
pub mod filter;
pub mod harmonics;
pub mod session;
pub mod signal;
pub mod statistics;
pub mod window;
pub mod worker;

pub use fft::{
    compute_spectrum, forward_fft, inverse_fft, is_power_of_two, ComplexSpectrum, FftProcessor,
    PeakSummary, Spectrum,
};
pub use filter::{FilterSpec, FilterStats, FilterType, FilteredSequence, SpectralFilter};
pub use harmonics::{
    distortion_metrics, DistortionMetrics, Harmonic, HarmonicAnalysis, HarmonicAnalyzer,
};
pub use session::{AnalysisSession, PipelineStage, TransformResult};
pub use signal::{SampleSequence, MIN_SAMPLES};
pub use statistics::SignalStatistics;
pub use window::WindowFunction;
pub use worker::{run_pipeline, spawn_analysis, AnalysisRequest, HarmonicRequest};
