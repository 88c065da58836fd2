// Filter module - ideal (brick-wall) frequency-domain filtering
//
// Bins are zeroed on a private copy of the complex spectrum and the result
// is inverse-transformed back to the time domain. Bin i and its mirror
// N - i are judged by the same folded frequency, so both halves of a real
// signal's spectrum are kept or dropped together.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::analysis::fft::{inverse_fft, ComplexSpectrum};
use crate::error::AnalysisError;

/// Filter response shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterType {
    Lowpass,
    Highpass,
    Bandpass,
    Bandstop,
}

impl FilterType {
    pub fn name(&self) -> &'static str {
        match self {
            FilterType::Lowpass => "lowpass",
            FilterType::Highpass => "highpass",
            FilterType::Bandpass => "bandpass",
            FilterType::Bandstop => "bandstop",
        }
    }

    /// Human-readable label used in reports
    pub fn label(&self) -> &'static str {
        match self {
            FilterType::Lowpass => "Low-pass filter",
            FilterType::Highpass => "High-pass filter",
            FilterType::Bandpass => "Band-pass filter",
            FilterType::Bandstop => "Band-stop filter",
        }
    }

    /// Whether the type reads `cutoff2`
    pub fn uses_second_cutoff(&self) -> bool {
        matches!(self, FilterType::Bandpass | FilterType::Bandstop)
    }
}

impl fmt::Display for FilterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Filter shape plus cutoff frequencies in Hz
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    pub filter_type: FilterType,
    pub cutoff1: f64,
    /// Only read by bandpass/bandstop
    #[serde(default)]
    pub cutoff2: f64,
}

impl FilterSpec {
    pub fn lowpass(cutoff: f64) -> Self {
        Self {
            filter_type: FilterType::Lowpass,
            cutoff1: cutoff,
            cutoff2: 0.0,
        }
    }

    pub fn highpass(cutoff: f64) -> Self {
        Self {
            filter_type: FilterType::Highpass,
            cutoff1: cutoff,
            cutoff2: 0.0,
        }
    }

    pub fn bandpass(low: f64, high: f64) -> Self {
        Self {
            filter_type: FilterType::Bandpass,
            cutoff1: low,
            cutoff2: high,
        }
    }

    pub fn bandstop(low: f64, high: f64) -> Self {
        Self {
            filter_type: FilterType::Bandstop,
            cutoff1: low,
            cutoff2: high,
        }
    }

    /// Reject negative, non-finite or inverted cutoffs
    ///
    /// Cutoffs above Nyquist are accepted: a lowpass there passes
    /// everything and a highpass blocks everything.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        check_cutoff("cutoff1", self.cutoff1)?;

        if self.filter_type.uses_second_cutoff() {
            check_cutoff("cutoff2", self.cutoff2)?;
            if self.cutoff1 > self.cutoff2 {
                return Err(AnalysisError::InvalidCutoff {
                    reason: format!(
                        "cutoff1 ({} Hz) must not exceed cutoff2 ({} Hz) for {}",
                        self.cutoff1, self.cutoff2, self.filter_type
                    ),
                });
            }
        }

        Ok(())
    }

    /// True when a bin at `freq` Hz is removed
    pub fn rejects(&self, freq: f64) -> bool {
        match self.filter_type {
            FilterType::Lowpass => freq > self.cutoff1,
            FilterType::Highpass => freq < self.cutoff1,
            FilterType::Bandpass => freq < self.cutoff1 || freq > self.cutoff2,
            FilterType::Bandstop => freq >= self.cutoff1 && freq <= self.cutoff2,
        }
    }
}

fn check_cutoff(name: &str, value: f64) -> Result<(), AnalysisError> {
    if !value.is_finite() || value < 0.0 {
        return Err(AnalysisError::InvalidCutoff {
            reason: format!("{} must be a finite frequency >= 0 (got {})", name, value),
        });
    }
    Ok(())
}

/// Time-domain filter output and its level change
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilteredSequence {
    pub spec: FilterSpec,
    pub samples: Vec<f64>,
    pub bins_zeroed: usize,
    pub stats: FilterStats,
}

/// RMS before/after filtering
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FilterStats {
    pub original_rms: f64,
    pub filtered_rms: f64,
    /// 20 log10(filtered / original); `None` when either level is zero
    pub attenuation_db: Option<f64>,
}

impl FilterStats {
    pub fn measure(original: &[f64], filtered: &[f64]) -> Self {
        let original_rms = rms(original);
        let filtered_rms = rms(filtered);
        let attenuation_db = (original_rms > 0.0 && filtered_rms > 0.0)
            .then(|| 20.0 * (filtered_rms / original_rms).log10());

        Self {
            original_rms,
            filtered_rms,
            attenuation_db,
        }
    }
}

fn rms(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    (samples.iter().map(|s| s * s).sum::<f64>() / samples.len() as f64).sqrt()
}

/// Brick-wall filter bound to a sample rate
pub struct SpectralFilter {
    sample_rate: f64,
}

impl SpectralFilter {
    pub fn new(sample_rate: f64) -> Self {
        Self { sample_rate }
    }

    /// Folded frequency of bin `i` in an `n`-point spectrum
    pub fn bin_frequency(&self, i: usize, n: usize) -> f64 {
        let folded = i.min(n - i);
        folded as f64 * self.sample_rate / n as f64
    }

    /// Zero rejected bins on a copy of `spectrum` and inverse-transform
    ///
    /// The output has `original_len` samples: truncated when the signal was
    /// longer than the transform, zero-padded otherwise.
    pub fn apply(
        &self,
        spectrum: &ComplexSpectrum,
        spec: &FilterSpec,
        original_len: usize,
    ) -> Result<(Vec<f64>, usize), AnalysisError> {
        spec.validate()?;

        let n = spectrum.len();
        let mut working = spectrum.to_working_buffer();
        let mut zeroed = 0;

        for (i, bin) in working.iter_mut().enumerate() {
            if spec.rejects(self.bin_frequency(i, n)) {
                bin.re = 0.0;
                bin.im = 0.0;
                zeroed += 1;
            }
        }

        inverse_fft(&mut working)?;

        let mut samples: Vec<f64> = working.iter().take(original_len).map(|c| c.re).collect();
        samples.resize(original_len, 0.0);

        Ok((samples, zeroed))
    }

    /// Filter and measure against the unfiltered signal
    pub fn filter(
        &self,
        spectrum: &ComplexSpectrum,
        spec: &FilterSpec,
        original: &[f64],
    ) -> Result<FilteredSequence, AnalysisError> {
        let (samples, bins_zeroed) = self.apply(spectrum, spec, original.len())?;
        let stats = FilterStats::measure(original, &samples);

        Ok(FilteredSequence {
            spec: *spec,
            samples,
            bins_zeroed,
            stats,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::fft::compute_spectrum;
    use std::f64::consts::PI;

    const FS: f64 = 1024.0;
    const N: usize = 1024;

    fn two_tone() -> (Vec<f64>, Vec<f64>, Vec<f64>) {
        let low: Vec<f64> = (0..N)
            .map(|i| (2.0 * PI * 50.0 * i as f64 / FS).sin())
            .collect();
        let high: Vec<f64> = (0..N)
            .map(|i| 0.5 * (2.0 * PI * 300.0 * i as f64 / FS).sin())
            .collect();
        let mix = low.iter().zip(&high).map(|(a, b)| a + b).collect();
        (mix, low, high)
    }

    fn assert_close(a: &[f64], b: &[f64], tol: f64) {
        assert_eq!(a.len(), b.len());
        for (i, (x, y)) in a.iter().zip(b).enumerate() {
            assert!((x - y).abs() < tol, "sample {}: {} vs {}", i, x, y);
        }
    }

    #[test]
    fn test_lowpass_isolates_low_tone() {
        let (mix, low, _) = two_tone();
        let spectrum = compute_spectrum(&mix).unwrap();
        let (out, _) = SpectralFilter::new(FS)
            .apply(&spectrum.complex, &FilterSpec::lowpass(100.0), N)
            .unwrap();
        assert_close(&out, &low, 1e-9);
    }

    #[test]
    fn test_highpass_isolates_high_tone() {
        let (mix, _, high) = two_tone();
        let spectrum = compute_spectrum(&mix).unwrap();
        let (out, _) = SpectralFilter::new(FS)
            .apply(&spectrum.complex, &FilterSpec::highpass(100.0), N)
            .unwrap();
        assert_close(&out, &high, 1e-9);
    }

    #[test]
    fn test_bandpass_and_bandstop_are_complementary() {
        let (mix, low, high) = two_tone();
        let spectrum = compute_spectrum(&mix).unwrap();
        let filter = SpectralFilter::new(FS);

        let (passed, _) = filter
            .apply(&spectrum.complex, &FilterSpec::bandpass(250.0, 350.0), N)
            .unwrap();
        assert_close(&passed, &high, 1e-9);

        let (stopped, _) = filter
            .apply(&spectrum.complex, &FilterSpec::bandstop(250.0, 350.0), N)
            .unwrap();
        assert_close(&stopped, &low, 1e-9);
    }

    #[test]
    fn test_wide_lowpass_is_identity() {
        let (mix, _, _) = two_tone();
        let spectrum = compute_spectrum(&mix).unwrap();
        let (out, zeroed) = SpectralFilter::new(FS)
            .apply(&spectrum.complex, &FilterSpec::lowpass(FS / 2.0), N)
            .unwrap();
        assert_eq!(zeroed, 0);
        assert_close(&out, &mix, 1e-9);
    }

    #[test]
    fn test_mirror_bins_zeroed_together() {
        let spectrum = compute_spectrum(&[1.0; 64]).unwrap();
        let filter = SpectralFilter::new(64.0);
        assert_eq!(filter.bin_frequency(3, 64), 3.0);
        assert_eq!(filter.bin_frequency(61, 64), 3.0);
        assert_eq!(filter.bin_frequency(32, 64), 32.0);

        let (_, zeroed) = filter
            .apply(&spectrum.complex, &FilterSpec::lowpass(10.0), 64)
            .unwrap();
        // bins 11..=53 fold above 10 Hz
        assert_eq!(zeroed, 43);
    }

    #[test]
    fn test_output_length_follows_original() {
        let spectrum = compute_spectrum(&[0.5; 64]).unwrap();
        let filter = SpectralFilter::new(64.0);

        let (short, _) = filter
            .apply(&spectrum.complex, &FilterSpec::lowpass(32.0), 40)
            .unwrap();
        assert_eq!(short.len(), 40);

        let (long, _) = filter
            .apply(&spectrum.complex, &FilterSpec::lowpass(32.0), 100)
            .unwrap();
        assert_eq!(long.len(), 100);
        assert!(long[64..].iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_source_spectrum_untouched() {
        let (mix, _, _) = two_tone();
        let spectrum = compute_spectrum(&mix).unwrap();
        let before = spectrum.complex.clone();
        SpectralFilter::new(FS)
            .apply(&spectrum.complex, &FilterSpec::highpass(400.0), N)
            .unwrap();
        assert_eq!(before, spectrum.complex);
    }

    #[test]
    fn test_cutoff_validation() {
        assert!(FilterSpec::lowpass(-1.0).validate().is_err());
        assert!(FilterSpec::highpass(f64::NAN).validate().is_err());
        assert!(FilterSpec::bandpass(300.0, 100.0).validate().is_err());
        assert!(FilterSpec::bandstop(100.0, f64::INFINITY).validate().is_err());
        assert!(FilterSpec::bandpass(100.0, 100.0).validate().is_ok());
        // cutoff2 is ignored for single-edge filters
        let spec = FilterSpec {
            filter_type: FilterType::Lowpass,
            cutoff1: 100.0,
            cutoff2: -5.0,
        };
        assert!(spec.validate().is_ok());
    }

    #[test]
    fn test_filter_stats() {
        let (mix, _, _) = two_tone();
        let spectrum = compute_spectrum(&mix).unwrap();
        let filtered = SpectralFilter::new(FS)
            .filter(&spectrum.complex, &FilterSpec::lowpass(100.0), &mix)
            .unwrap();

        let expected_original = (0.5f64 + 0.125).sqrt();
        assert!((filtered.stats.original_rms - expected_original).abs() < 1e-9);
        assert!((filtered.stats.filtered_rms - 0.5f64.sqrt()).abs() < 1e-9);
        let attenuation = filtered.stats.attenuation_db.unwrap();
        assert!(attenuation < 0.0 && attenuation > -1.0);

        let silent = FilterStats::measure(&[0.0; 8], &[0.0; 8]);
        assert_eq!(silent.attenuation_db, None);
    }
}
