// Harmonics module - harmonic sampling and distortion metrics
//
// Samples the magnitude/phase spectrum at integer multiples of a
// fundamental and derives THD, THD+N and SINAD from them.
//
// Formulas (m_h = magnitude at harmonic h):
// - THD   = sqrt(Σ_{h≥2} m_h²) / m_1 × 100
// - noise = max(Σ_positive |M|² - Σ_h m_h², 0)
// - THD+N = sqrt(Σ_{h≥2} m_h² + noise) / m_1 × 100
// - SINAD = 20 log10(m_1 / sqrt(Σ_{h≥2} m_h² + noise))

use serde::Serialize;

use crate::analysis::fft::Spectrum;
use crate::error::AnalysisError;

/// Fundamental magnitudes at or below this are treated as zero
pub const MIN_FUNDAMENTAL_MAGNITUDE: f64 = 1e-12;

/// One sampled harmonic
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Harmonic {
    /// Harmonic number, 1 = fundamental
    pub order: usize,
    /// order × fundamental, in Hz
    pub frequency: f64,
    /// FFT bin the frequency rounds to
    pub bin: usize,
    pub magnitude: f64,
    pub phase: f64,
}

/// Distortion ratios derived from a harmonic list
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DistortionMetrics {
    /// Percent
    pub thd: f64,
    /// Percent
    pub thd_plus_n: f64,
    /// dB
    pub sinad: f64,
}

/// Result of a harmonic analysis run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HarmonicAnalysis {
    pub fundamental_freq: f64,
    pub harmonics: Vec<Harmonic>,
    pub metrics: DistortionMetrics,
}

impl HarmonicAnalysis {
    pub fn fundamental(&self) -> &Harmonic {
        &self.harmonics[0]
    }

    pub fn harmonic(&self, order: usize) -> Option<&Harmonic> {
        self.harmonics.iter().find(|h| h.order == order)
    }
}

/// Harmonic analysis bound to a sample rate and FFT size
pub struct HarmonicAnalyzer {
    sample_rate: f64,
    fft_size: usize,
}

impl HarmonicAnalyzer {
    pub fn new(sample_rate: f64, fft_size: usize) -> Self {
        Self {
            sample_rate,
            fft_size,
        }
    }

    /// Bin spacing in Hz
    pub fn frequency_resolution(&self) -> f64 {
        self.sample_rate / self.fft_size as f64
    }

    /// Harmonics of `fundamental_freq` whose bins fall below N/2
    ///
    /// # Errors
    /// * `InvalidFftSize` - `spectrum` was not computed at this analyzer's size
    /// * `InvalidFundamental` - frequency is not a positive finite number
    /// * `InvalidHarmonicOrder` - `harmonic_order` is zero
    /// * `NoHarmonicsFound` - even the fundamental sits at or above Nyquist
    pub fn locate(
        &self,
        spectrum: &Spectrum,
        fundamental_freq: f64,
        harmonic_order: usize,
    ) -> Result<Vec<Harmonic>, AnalysisError> {
        if spectrum.fft_size() != self.fft_size {
            return Err(AnalysisError::InvalidFftSize {
                size: spectrum.fft_size(),
            });
        }
        if !fundamental_freq.is_finite() || fundamental_freq <= 0.0 {
            return Err(AnalysisError::InvalidFundamental { fundamental_freq });
        }
        if harmonic_order == 0 {
            return Err(AnalysisError::InvalidHarmonicOrder {
                order: harmonic_order,
            });
        }

        let resolution = self.frequency_resolution();
        let limit = self.fft_size / 2;

        // bins grow with order, so the first miss ends the scan
        let harmonics: Vec<Harmonic> = (1..=harmonic_order)
            .map(|order| {
                let frequency = order as f64 * fundamental_freq;
                let bin = (frequency / resolution).round() as usize;
                (order, frequency, bin)
            })
            .take_while(|&(_, _, bin)| bin < limit)
            .map(|(order, frequency, bin)| Harmonic {
                order,
                frequency,
                bin,
                magnitude: spectrum.magnitude[bin],
                phase: spectrum.phase[bin],
            })
            .collect();

        if harmonics.is_empty() {
            return Err(AnalysisError::NoHarmonicsFound {
                fundamental_freq,
                nyquist: self.sample_rate / 2.0,
            });
        }

        Ok(harmonics)
    }

    /// Locate harmonics and compute distortion metrics
    pub fn analyze(
        &self,
        spectrum: &Spectrum,
        fundamental_freq: f64,
        harmonic_order: usize,
    ) -> Result<HarmonicAnalysis, AnalysisError> {
        let harmonics = self.locate(spectrum, fundamental_freq, harmonic_order)?;
        let metrics = distortion_metrics(spectrum, &harmonics, fundamental_freq)?;

        Ok(HarmonicAnalysis {
            fundamental_freq,
            harmonics,
            metrics,
        })
    }
}

/// THD, THD+N and SINAD for a located harmonic list
///
/// # Errors
/// * `UndefinedDistortionMetric` - the fundamental magnitude is zero
pub fn distortion_metrics(
    spectrum: &Spectrum,
    harmonics: &[Harmonic],
    fundamental_freq: f64,
) -> Result<DistortionMetrics, AnalysisError> {
    let fundamental = harmonics
        .first()
        .map(|h| h.magnitude)
        .unwrap_or_default();

    if !fundamental.is_finite() || fundamental <= MIN_FUNDAMENTAL_MAGNITUDE {
        return Err(AnalysisError::UndefinedDistortionMetric { fundamental_freq });
    }

    let harmonic_sum: f64 = harmonics.iter().skip(1).map(|h| h.magnitude * h.magnitude).sum();

    let total_power: f64 = spectrum
        .positive_magnitudes()
        .iter()
        .map(|m| m * m)
        .sum();
    let signal_power: f64 = harmonics.iter().map(|h| h.magnitude * h.magnitude).sum();
    let noise_power = (total_power - signal_power).max(0.0);

    let distortion = (harmonic_sum + noise_power).sqrt();

    Ok(DistortionMetrics {
        thd: harmonic_sum.sqrt() / fundamental * 100.0,
        thd_plus_n: distortion / fundamental * 100.0,
        sinad: 20.0 * (fundamental / distortion).log10(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::fft::compute_spectrum;
    use std::f64::consts::PI;

    fn tones(parts: &[(f64, f64)], sample_rate: f64, len: usize) -> Vec<f64> {
        (0..len)
            .map(|i| {
                let t = i as f64 / sample_rate;
                parts
                    .iter()
                    .map(|&(freq, amp)| amp * (2.0 * PI * freq * t).sin())
                    .sum()
            })
            .collect()
    }

    #[test]
    fn test_bin_centered_harmonics() {
        // Fs = N so every integer frequency sits on a bin
        let signal = tones(&[(64.0, 1.0), (128.0, 0.5), (192.0, 0.25)], 1024.0, 1024);
        let spectrum = compute_spectrum(&signal).unwrap();
        let analysis = HarmonicAnalyzer::new(1024.0, 1024)
            .analyze(&spectrum, 64.0, 3)
            .unwrap();

        assert_eq!(analysis.harmonics.len(), 3);
        assert!((analysis.harmonics[0].magnitude - 1.0).abs() < 1e-9);
        assert!((analysis.harmonics[1].magnitude - 0.5).abs() < 1e-9);
        assert!((analysis.harmonics[2].magnitude - 0.25).abs() < 1e-9);

        let expected_thd = (0.25f64 + 0.0625).sqrt() * 100.0;
        assert!((analysis.metrics.thd - expected_thd).abs() < 1e-6);
        // noiseless: THD+N collapses onto THD
        assert!((analysis.metrics.thd_plus_n - expected_thd).abs() < 1e-4);
        let expected_sinad = 20.0 * (1.0 / (0.25f64 + 0.0625).sqrt()).log10();
        assert!((analysis.metrics.sinad - expected_sinad).abs() < 1e-4);
    }

    #[test]
    fn test_harmonics_above_nyquist_are_dropped() {
        let signal = tones(&[(300.0, 1.0)], 1000.0, 1024);
        let spectrum = compute_spectrum(&signal).unwrap();
        let harmonics = HarmonicAnalyzer::new(1000.0, 1024)
            .locate(&spectrum, 300.0, 3)
            .unwrap();

        assert_eq!(harmonics.len(), 1);
        assert_eq!(harmonics[0].order, 1);
        assert_eq!(harmonics[0].bin, 307);
    }

    #[test]
    fn test_no_harmonics_found() {
        let spectrum = compute_spectrum(&tones(&[(100.0, 1.0)], 1000.0, 256)).unwrap();
        let err = HarmonicAnalyzer::new(1000.0, 256)
            .analyze(&spectrum, 600.0, 5)
            .unwrap_err();
        assert_eq!(
            err,
            AnalysisError::NoHarmonicsFound {
                fundamental_freq: 600.0,
                nyquist: 500.0
            }
        );
    }

    #[test]
    fn test_silent_fundamental_is_an_error() {
        let spectrum = compute_spectrum(&[0.0; 256]).unwrap();
        let err = HarmonicAnalyzer::new(1000.0, 256)
            .analyze(&spectrum, 50.0, 3)
            .unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::UndefinedDistortionMetric { .. }
        ));
    }

    #[test]
    fn test_parameter_validation() {
        let spectrum = compute_spectrum(&[1.0; 64]).unwrap();
        let analyzer = HarmonicAnalyzer::new(1000.0, 64);
        assert!(matches!(
            analyzer.analyze(&spectrum, 0.0, 3),
            Err(AnalysisError::InvalidFundamental { .. })
        ));
        assert!(matches!(
            analyzer.analyze(&spectrum, f64::NAN, 3),
            Err(AnalysisError::InvalidFundamental { .. })
        ));
        assert_eq!(
            analyzer.analyze(&spectrum, 50.0, 0),
            Err(AnalysisError::InvalidHarmonicOrder { order: 0 })
        );
    }

    #[test]
    fn test_mismatched_spectrum_size_is_an_error() {
        // 300 Hz lands on bin 1229 of a 4096 point grid, past a 1024 point spectrum
        let spectrum = compute_spectrum(&tones(&[(300.0, 1.0)], 1000.0, 1024)).unwrap();
        let analyzer = HarmonicAnalyzer::new(1000.0, 4096);
        assert_eq!(
            analyzer.analyze(&spectrum, 300.0, 3),
            Err(AnalysisError::InvalidFftSize { size: 1024 })
        );
        assert_eq!(
            HarmonicAnalyzer::new(1000.0, 256).locate(&spectrum, 300.0, 1),
            Err(AnalysisError::InvalidFftSize { size: 1024 })
        );
    }

    #[test]
    fn test_noise_raises_thd_plus_n_above_thd() {
        let mut signal = tones(&[(64.0, 1.0), (128.0, 0.1)], 1024.0, 1024);
        // deterministic broadband disturbance
        for (i, sample) in signal.iter_mut().enumerate() {
            *sample += 0.01 * (((i * 7919) % 101) as f64 / 50.0 - 1.0);
        }
        let spectrum = compute_spectrum(&signal).unwrap();
        let analysis = HarmonicAnalyzer::new(1024.0, 1024)
            .analyze(&spectrum, 64.0, 2)
            .unwrap();

        assert!(analysis.metrics.thd_plus_n > analysis.metrics.thd);
        assert!(analysis.metrics.sinad > 0.0);
        assert!(analysis.harmonic(2).is_some());
        assert!(analysis.harmonic(3).is_none());
    }
}
