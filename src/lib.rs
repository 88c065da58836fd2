// Spectral Analyzer Core - FFT spectral analysis engine
// Windowed radix-2 FFT, harmonic distortion metrics and brick-wall filtering

// Module declarations
pub mod analysis;
pub mod config;
pub mod error;
pub mod export;
pub mod import;
pub mod synthetic;

// Re-exports for convenience
pub use analysis::{
    AnalysisRequest, AnalysisSession, FilterSpec, FilterType, PipelineStage, WindowFunction,
};
pub use config::AppConfig;
pub use error::{AnalysisError, ErrorCode};
