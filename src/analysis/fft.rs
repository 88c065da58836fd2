// FFT module - radix-2 Cooley-Tukey transform and spectrum views
//
// The transform runs in place over a caller-owned buffer: bit-reversal
// permutation followed by log2(N) butterfly stages. Each stage evaluates
// its root of unity once and rotates the twiddle factor by complex
// multiplication instead of calling sin/cos per butterfly.
//
// Magnitudes are normalized by N and doubled below N/2 (excluding DC) so
// the positive half reads as single-sided amplitude.

use std::f64::consts::PI;

use rustfft::num_complex::Complex;
use serde::Serialize;

use crate::analysis::signal::SampleSequence;
use crate::analysis::window::WindowFunction;
use crate::error::AnalysisError;

/// True for 1, 2, 4, 8, ...
pub fn is_power_of_two(n: usize) -> bool {
    n > 0 && (n & (n - 1)) == 0
}

fn check_size(n: usize) -> Result<(), AnalysisError> {
    if is_power_of_two(n) {
        Ok(())
    } else {
        Err(AnalysisError::InvalidFftSize { size: n })
    }
}

/// In-place forward DFT
///
/// # Errors
/// * `InvalidFftSize` - buffer length is not a power of two
pub fn forward_fft(buffer: &mut [Complex<f64>]) -> Result<(), AnalysisError> {
    let n = buffer.len();
    check_size(n)?;

    bit_reverse_permute(buffer);

    let mut len = 2;
    while len <= n {
        let half = len / 2;
        let angle = -2.0 * PI / len as f64;
        let wlen = Complex::new(angle.cos(), angle.sin());

        for start in (0..n).step_by(len) {
            let mut w = Complex::new(1.0, 0.0);
            for j in 0..half {
                let u = buffer[start + j];
                let v = buffer[start + j + half] * w;
                buffer[start + j] = u + v;
                buffer[start + j + half] = u - v;
                w *= wlen;
            }
        }

        len <<= 1;
    }

    Ok(())
}

/// In-place inverse DFT: conjugate, forward, conjugate, scale by 1/N
pub fn inverse_fft(buffer: &mut [Complex<f64>]) -> Result<(), AnalysisError> {
    let n = buffer.len();
    check_size(n)?;

    for bin in buffer.iter_mut() {
        *bin = bin.conj();
    }

    forward_fft(buffer)?;

    let scale = 1.0 / n as f64;
    for bin in buffer.iter_mut() {
        *bin = bin.conj() * scale;
    }

    Ok(())
}

fn bit_reverse_permute(buffer: &mut [Complex<f64>]) {
    let n = buffer.len();
    let mut j = 0usize;

    for i in 1..n {
        let mut bit = n >> 1;
        while j & bit != 0 {
            j ^= bit;
            bit >>= 1;
        }
        j ^= bit;

        if i < j {
            buffer.swap(i, j);
        }
    }
}

/// Raw complex FFT output (length N, unnormalized)
#[derive(Debug, Clone, PartialEq)]
pub struct ComplexSpectrum {
    bins: Vec<Complex<f64>>,
}

impl ComplexSpectrum {
    pub fn from_bins(bins: Vec<Complex<f64>>) -> Result<Self, AnalysisError> {
        check_size(bins.len())?;
        Ok(Self { bins })
    }

    pub fn bins(&self) -> &[Complex<f64>] {
        &self.bins
    }

    pub fn len(&self) -> usize {
        self.bins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    pub fn real(&self) -> Vec<f64> {
        self.bins.iter().map(|c| c.re).collect()
    }

    pub fn imag(&self) -> Vec<f64> {
        self.bins.iter().map(|c| c.im).collect()
    }

    /// Owned copy of the bins for stages that mutate their working set
    pub fn to_working_buffer(&self) -> Vec<Complex<f64>> {
        self.bins.clone()
    }
}

/// Complex output plus magnitude and phase views
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrum {
    pub complex: ComplexSpectrum,
    /// |X[i]| / N, doubled for 0 < i < N/2
    pub magnitude: Vec<f64>,
    /// atan2(im, re) in (-π, π]
    pub phase: Vec<f64>,
}

impl Spectrum {
    pub fn fft_size(&self) -> usize {
        self.complex.len()
    }

    /// Positive-frequency magnitudes, DC through Nyquist inclusive
    pub fn positive_magnitudes(&self) -> &[f64] {
        &self.magnitude[..=self.fft_size() / 2]
    }
}

/// Transform a windowed real buffer into its spectrum
///
/// # Errors
/// * `InvalidFftSize` - buffer length is not a power of two
pub fn compute_spectrum(windowed: &[f64]) -> Result<Spectrum, AnalysisError> {
    let n = windowed.len();
    check_size(n)?;

    let mut bins: Vec<Complex<f64>> = windowed.iter().map(|&x| Complex::new(x, 0.0)).collect();
    forward_fft(&mut bins)?;

    let scale = 1.0 / n as f64;
    let magnitude = bins
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let mag = c.norm() * scale;
            if i > 0 && i < n / 2 {
                mag * 2.0
            } else {
                mag
            }
        })
        .collect();

    let phase = bins.iter().map(|c| wrap_phase(c.im.atan2(c.re))).collect();

    Ok(Spectrum {
        complex: ComplexSpectrum { bins },
        magnitude,
        phase,
    })
}

/// Map atan2's -π onto π so phases sit in (-π, π]
fn wrap_phase(phase: f64) -> f64 {
    if phase <= -PI {
        phase + 2.0 * PI
    } else {
        phase
    }
}

/// Summary of the displayed (positive) half of a spectrum
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PeakSummary {
    pub fft_size: usize,
    pub sample_rate: f64,
    pub frequency_resolution: f64,
    pub max_frequency: f64,
    pub peak_bin: usize,
    pub peak_frequency: f64,
    pub peak_magnitude: f64,
}

/// FFT processor bound to a transform size and window
///
/// Window coefficients are computed once in `new`; every `process` call
/// works on freshly allocated buffers, so one processor can serve any
/// number of signals.
#[derive(Debug, Clone)]
pub struct FftProcessor {
    fft_size: usize,
    window: WindowFunction,
    coefficients: Vec<f64>,
}

impl FftProcessor {
    /// # Errors
    /// * `InvalidFftSize` - `fft_size` is not a power of two or is below 2
    pub fn new(fft_size: usize, window: WindowFunction) -> Result<Self, AnalysisError> {
        if fft_size < 2 {
            return Err(AnalysisError::InvalidFftSize { size: fft_size });
        }
        check_size(fft_size)?;

        Ok(Self {
            fft_size,
            window,
            coefficients: window.coefficients(fft_size)?,
        })
    }

    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    pub fn window(&self) -> WindowFunction {
        self.window
    }

    /// Truncate or zero-pad the signal to `fft_size` and apply the window
    pub fn prepare(&self, signal: &SampleSequence) -> Vec<f64> {
        let mut buffer = signal.fit_to(self.fft_size);
        for (sample, coeff) in buffer.iter_mut().zip(&self.coefficients) {
            *sample *= coeff;
        }
        buffer
    }

    /// Windowed spectrum of `signal`
    pub fn process(&self, signal: &SampleSequence) -> Result<Spectrum, AnalysisError> {
        compute_spectrum(&self.prepare(signal))
    }

    /// Frequency resolution, peak and displayed range of a spectrum
    pub fn summarize(&self, spectrum: &Spectrum, sample_rate: f64) -> PeakSummary {
        let resolution = sample_rate / self.fft_size as f64;
        let half = self.fft_size / 2;

        let (peak_bin, peak_magnitude) = spectrum.magnitude[..half]
            .iter()
            .copied()
            .enumerate()
            .fold((0, f64::MIN), |best, (i, mag)| {
                if mag > best.1 {
                    (i, mag)
                } else {
                    best
                }
            });

        PeakSummary {
            fft_size: self.fft_size,
            sample_rate,
            frequency_resolution: resolution,
            max_frequency: (half - 1) as f64 * resolution,
            peak_bin,
            peak_frequency: peak_bin as f64 * resolution,
            peak_magnitude,
        }
    }
}
