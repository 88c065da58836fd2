// Worker module - run the whole pipeline off the caller's thread
//
// A request carries everything a run needs; the worker thread builds its own
// AnalysisSession, drives it stage by stage and hands the finished session
// back through a oneshot channel. No state is shared with the caller, so
// overlapping runs cannot interfere with each other.

use std::thread;

use tokio::sync::oneshot;

use crate::analysis::filter::FilterSpec;
use crate::analysis::session::AnalysisSession;
use crate::analysis::window::WindowFunction;
use crate::config::AppConfig;
use crate::error::AnalysisError;

/// Harmonic stage parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HarmonicRequest {
    pub fundamental_freq: f64,
    pub harmonic_order: usize,
}

/// Inputs for one pipeline run
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRequest {
    pub samples: Vec<f64>,
    pub sample_rate: f64,
    pub fft_size: usize,
    pub window: WindowFunction,
    /// Skipped when `None`
    pub harmonics: Option<HarmonicRequest>,
    /// Skipped when `None`
    pub filter: Option<FilterSpec>,
}

impl AnalysisRequest {
    /// Transform-only request
    pub fn new(
        samples: Vec<f64>,
        sample_rate: f64,
        fft_size: usize,
        window: WindowFunction,
    ) -> Self {
        Self {
            samples,
            sample_rate,
            fft_size,
            window,
            harmonics: None,
            filter: None,
        }
    }

    /// Request built from configuration; `sample_rate` overrides the
    /// configured rate (WAV inputs carry their own)
    pub fn from_config(samples: Vec<f64>, sample_rate: f64, config: &AppConfig) -> Self {
        let harmonics = config.harmonics.enabled.then_some(HarmonicRequest {
            fundamental_freq: config.harmonics.fundamental_freq,
            harmonic_order: config.harmonics.harmonic_order,
        });
        let filter = config.filter.enabled.then(|| config.filter.spec());

        Self {
            samples,
            sample_rate,
            fft_size: config.analysis.fft_points,
            window: config.analysis.window_function,
            harmonics,
            filter,
        }
    }

    pub fn with_harmonics(mut self, fundamental_freq: f64, harmonic_order: usize) -> Self {
        self.harmonics = Some(HarmonicRequest {
            fundamental_freq,
            harmonic_order,
        });
        self
    }

    pub fn with_filter(mut self, spec: FilterSpec) -> Self {
        self.filter = Some(spec);
        self
    }
}

/// Load, transform, then run the optional stages in order
///
/// Stops at the first failing stage.
pub fn run_pipeline(request: AnalysisRequest) -> Result<AnalysisSession, AnalysisError> {
    let AnalysisRequest {
        samples,
        sample_rate,
        fft_size,
        window,
        harmonics,
        filter,
    } = request;

    let mut session = AnalysisSession::new();
    session.load(samples, sample_rate)?;
    session.transform(fft_size, window)?;

    if let Some(params) = harmonics {
        session.analyze_harmonics(params.fundamental_freq, params.harmonic_order)?;
    }
    if let Some(spec) = filter {
        session.apply_filter(spec)?;
    }

    Ok(session)
}

/// Run the pipeline on a dedicated thread
///
/// The receiver yields the finished session or the first stage error. If
/// the caller drops the receiver the result is discarded.
pub fn spawn_analysis(
    request: AnalysisRequest,
) -> oneshot::Receiver<Result<AnalysisSession, AnalysisError>> {
    let (tx, rx) = oneshot::channel();

    thread::spawn(move || {
        tracing::info!(
            "[Worker] Starting run: {} samples, fft_size={}, window={}",
            request.samples.len(),
            request.fft_size,
            request.window
        );

        let result = run_pipeline(request);
        match &result {
            Ok(session) => tracing::info!("[Worker] Run finished at stage {:?}", session.stage()),
            Err(err) => tracing::warn!("[Worker] Run failed: {}", err),
        }

        if tx.send(result).is_err() {
            tracing::debug!("[Worker] Receiver dropped, discarding result");
        }
    });

    rx
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::session::PipelineStage;
    use std::f64::consts::PI;

    const HANNING: WindowFunction = WindowFunction::Hanning;

    fn sine(freq: f64, sample_rate: f64, len: usize) -> Vec<f64> {
        (0..len)
            .map(|i| (2.0 * PI * freq * i as f64 / sample_rate).sin())
            .collect()
    }

    #[test]
    fn test_run_pipeline_all_stages() {
        let request = AnalysisRequest::new(sine(50.0, 1000.0, 1000), 1000.0, 1024, HANNING)
            .with_harmonics(50.0, 5)
            .with_filter(FilterSpec::lowpass(100.0));

        let session = run_pipeline(request).unwrap();
        assert_eq!(session.stage(), PipelineStage::AnalyzedAndFiltered);
        assert_eq!(session.harmonics().unwrap().harmonics.len(), 5);
    }

    #[test]
    fn test_run_pipeline_stops_at_first_error() {
        let request = AnalysisRequest::new(sine(50.0, 1000.0, 1000), 1000.0, 1000, HANNING)
            .with_harmonics(50.0, 5);
        assert_eq!(
            run_pipeline(request).unwrap_err(),
            AnalysisError::InvalidFftSize { size: 1000 }
        );
    }

    #[test]
    fn test_from_config_respects_enabled_flags() {
        let mut config = AppConfig::default();
        config.harmonics.enabled = false;
        config.filter.enabled = true;

        let request = AnalysisRequest::from_config(vec![0.0; 64], 2000.0, &config);
        assert_eq!(request.sample_rate, 2000.0);
        assert_eq!(request.fft_size, 1024);
        assert!(request.harmonics.is_none());
        assert_eq!(request.filter, Some(config.filter.spec()));
    }

    #[test]
    fn test_spawned_runs_are_independent() {
        let first = spawn_analysis(AnalysisRequest::new(
            sine(50.0, 1000.0, 1000),
            1000.0,
            1024,
            WindowFunction::Rectangular,
        ));
        let second = spawn_analysis(AnalysisRequest::new(
            sine(120.0, 1000.0, 1000),
            1000.0,
            512,
            WindowFunction::Blackman,
        ));

        let first = first.blocking_recv().unwrap().unwrap();
        let second = second.blocking_recv().unwrap().unwrap();
        assert_eq!(first.transform_result().unwrap().fft_size, 1024);
        assert_eq!(second.transform_result().unwrap().fft_size, 512);
    }

    #[tokio::test]
    async fn test_spawned_run_reports_errors() {
        let rx = spawn_analysis(AnalysisRequest::new(vec![1.0; 8], 1000.0, 64, HANNING));
        let result = rx.await.unwrap();
        assert!(matches!(
            result,
            Err(AnalysisError::InsufficientData { required: 32, collected: 8 })
        ));
    }
}
