// AnalysisSession - caller-owned pipeline context
//
// Holds the loaded signal and every derived result. Each stage recomputes
// from its direct input and invalidates whatever depends on it:
//
//   Empty -> Loaded -> Transformed -> { Analyzed, Filtered }
//
// Loading clears everything; re-running the transform clears harmonics and
// filter output. Nothing here is shared, so a session can be moved to a
// worker thread as a whole.

use serde::Serialize;

use crate::analysis::fft::{FftProcessor, PeakSummary, Spectrum};
use crate::analysis::filter::{FilterSpec, FilteredSequence, SpectralFilter};
use crate::analysis::harmonics::{HarmonicAnalysis, HarmonicAnalyzer};
use crate::analysis::signal::SampleSequence;
use crate::analysis::statistics::SignalStatistics;
use crate::analysis::window::WindowFunction;
use crate::error::AnalysisError;

/// Coarse pipeline progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Empty,
    Loaded,
    Transformed,
    Analyzed,
    Filtered,
    AnalyzedAndFiltered,
}

/// Spectrum together with the parameters that produced it
#[derive(Debug, Clone)]
pub struct TransformResult {
    pub fft_size: usize,
    pub window: WindowFunction,
    pub spectrum: Spectrum,
    pub summary: PeakSummary,
}

impl TransformResult {
    pub fn frequency_resolution(&self) -> f64 {
        self.summary.frequency_resolution
    }
}

/// Caller-owned analysis context
#[derive(Debug, Clone, Default)]
pub struct AnalysisSession {
    signal: Option<SampleSequence>,
    transform: Option<TransformResult>,
    harmonics: Option<HarmonicAnalysis>,
    filtered: Option<FilteredSequence>,
}

impl AnalysisSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the signal and drop every derived result
    pub fn load(&mut self, samples: Vec<f64>, sample_rate: f64) -> Result<(), AnalysisError> {
        let signal = SampleSequence::load(samples, sample_rate)?;
        tracing::info!(
            "[Session] Loaded {} samples at {} Hz",
            signal.len(),
            signal.sample_rate()
        );

        *self = Self {
            signal: Some(signal),
            ..Self::default()
        };
        Ok(())
    }

    /// Window and transform the loaded signal
    pub fn transform(
        &mut self,
        fft_size: usize,
        window: WindowFunction,
    ) -> Result<&TransformResult, AnalysisError> {
        let signal = self.signal.as_ref().ok_or_else(|| not_ready("load data first"))?;
        let processor = FftProcessor::new(fft_size, window)?;
        let spectrum = processor.process(signal)?;
        let summary = processor.summarize(&spectrum, signal.sample_rate());

        tracing::info!(
            "[Session] FFT complete: size={}, window={}, resolution={:.4} Hz, peak={:.2} Hz ({:.6})",
            fft_size,
            window,
            summary.frequency_resolution,
            summary.peak_frequency,
            summary.peak_magnitude
        );

        self.harmonics = None;
        self.filtered = None;
        Ok(&*self.transform.insert(TransformResult {
            fft_size,
            window,
            spectrum,
            summary,
        }))
    }

    /// Harmonic content relative to `fundamental_freq`
    pub fn analyze_harmonics(
        &mut self,
        fundamental_freq: f64,
        harmonic_order: usize,
    ) -> Result<&HarmonicAnalysis, AnalysisError> {
        let (signal, transform) = self.transformed()?;
        let analyzer = HarmonicAnalyzer::new(signal.sample_rate(), transform.fft_size);
        let analysis = analyzer.analyze(&transform.spectrum, fundamental_freq, harmonic_order)?;

        tracing::info!(
            "[Session] Harmonics: {} found, THD={:.3}%, THD+N={:.3}%, SINAD={:.2} dB",
            analysis.harmonics.len(),
            analysis.metrics.thd,
            analysis.metrics.thd_plus_n,
            analysis.metrics.sinad
        );

        Ok(&*self.harmonics.insert(analysis))
    }

    /// Brick-wall filter the transformed signal
    pub fn apply_filter(&mut self, spec: FilterSpec) -> Result<&FilteredSequence, AnalysisError> {
        let (signal, transform) = self.transformed()?;
        let filter = SpectralFilter::new(signal.sample_rate());
        let filtered = filter.filter(&transform.spectrum.complex, &spec, signal.samples())?;

        match filtered.stats.attenuation_db {
            Some(db) => tracing::info!(
                "[Session] {} applied ({} bins zeroed, attenuation {:.1} dB)",
                spec.filter_type.label(),
                filtered.bins_zeroed,
                db
            ),
            None => tracing::info!(
                "[Session] {} applied ({} bins zeroed, output silent)",
                spec.filter_type.label(),
                filtered.bins_zeroed
            ),
        }

        Ok(&*self.filtered.insert(filtered))
    }

    fn transformed(&self) -> Result<(&SampleSequence, &TransformResult), AnalysisError> {
        let signal = self.signal.as_ref().ok_or_else(|| not_ready("load data first"))?;
        let transform = self
            .transform
            .as_ref()
            .ok_or_else(|| not_ready("run the FFT first"))?;
        Ok((signal, transform))
    }

    pub fn stage(&self) -> PipelineStage {
        match (
            &self.signal,
            &self.transform,
            &self.harmonics,
            &self.filtered,
        ) {
            (None, ..) => PipelineStage::Empty,
            (Some(_), None, ..) => PipelineStage::Loaded,
            (Some(_), Some(_), None, None) => PipelineStage::Transformed,
            (Some(_), Some(_), Some(_), None) => PipelineStage::Analyzed,
            (Some(_), Some(_), None, Some(_)) => PipelineStage::Filtered,
            (Some(_), Some(_), Some(_), Some(_)) => PipelineStage::AnalyzedAndFiltered,
        }
    }

    pub fn signal(&self) -> Option<&SampleSequence> {
        self.signal.as_ref()
    }

    pub fn transform_result(&self) -> Option<&TransformResult> {
        self.transform.as_ref()
    }

    pub fn harmonics(&self) -> Option<&HarmonicAnalysis> {
        self.harmonics.as_ref()
    }

    pub fn filtered(&self) -> Option<&FilteredSequence> {
        self.filtered.as_ref()
    }

    pub fn statistics(&self) -> Option<SignalStatistics> {
        self.signal.as_ref().map(SignalStatistics::compute)
    }
}

fn not_ready(stage: &str) -> AnalysisError {
    AnalysisError::StageNotReady {
        stage: stage.to_string(),
    }
}
