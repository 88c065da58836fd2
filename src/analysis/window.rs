// Window module - tapering coefficients applied before the FFT
//
// Coefficients are computed on the fly from (index, length); applying a
// window multiplies in place and never changes the buffer length.

use std::f64::consts::PI;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

/// Shape parameter of the approximate Kaiser window
const KAISER_BETA: f64 = 5.0;

/// Series for I0 stops once a term drops below this
const BESSEL_TOLERANCE: f64 = 1e-12;

/// Supported window functions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowFunction {
    /// No tapering
    Rectangular,
    /// 0.54 - 0.46 cos(2πi/(N-1))
    Hamming,
    /// Raised cosine, zero at both ends
    #[default]
    Hanning,
    /// Three-term Blackman
    Blackman,
    /// Triangular
    Bartlett,
    /// Kaiser with β = 5
    Kaiser,
}

impl WindowFunction {
    pub const ALL: [WindowFunction; 6] = [
        WindowFunction::Rectangular,
        WindowFunction::Hamming,
        WindowFunction::Hanning,
        WindowFunction::Blackman,
        WindowFunction::Bartlett,
        WindowFunction::Kaiser,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            WindowFunction::Rectangular => "rectangular",
            WindowFunction::Hamming => "hamming",
            WindowFunction::Hanning => "hanning",
            WindowFunction::Blackman => "blackman",
            WindowFunction::Bartlett => "bartlett",
            WindowFunction::Kaiser => "kaiser",
        }
    }

    /// Coefficient for sample `i` of an `n`-point window
    ///
    /// # Errors
    /// * `InvalidWindowLength` - `n < 2`
    pub fn coefficient(&self, i: usize, n: usize) -> Result<f64, AnalysisError> {
        if n < 2 {
            return Err(AnalysisError::InvalidWindowLength { length: n });
        }
        Ok(self.coefficient_unchecked(i, n))
    }

    fn coefficient_unchecked(&self, i: usize, n: usize) -> f64 {
        let i = i as f64;
        let span = (n - 1) as f64;

        match self {
            WindowFunction::Rectangular => 1.0,
            WindowFunction::Hamming => 0.54 - 0.46 * (2.0 * PI * i / span).cos(),
            WindowFunction::Hanning => 0.5 * (1.0 - (2.0 * PI * i / span).cos()),
            WindowFunction::Blackman => {
                0.42 - 0.5 * (2.0 * PI * i / span).cos() + 0.08 * (4.0 * PI * i / span).cos()
            }
            WindowFunction::Bartlett => {
                let half = span / 2.0;
                1.0 - ((i - half) / half).abs()
            }
            WindowFunction::Kaiser => {
                let alpha = span / 2.0;
                let x = (i - alpha) / alpha;
                let arg = (1.0 - x * x).max(0.0).sqrt();
                bessel_i0(KAISER_BETA * arg) / bessel_i0(KAISER_BETA)
            }
        }
    }

    /// Full coefficient table for an `n`-point window
    pub fn coefficients(&self, n: usize) -> Result<Vec<f64>, AnalysisError> {
        if n < 2 {
            return Err(AnalysisError::InvalidWindowLength { length: n });
        }
        Ok((0..n).map(|i| self.coefficient_unchecked(i, n)).collect())
    }

    /// Multiply `buffer` by the window in place
    pub fn apply(&self, buffer: &mut [f64]) -> Result<(), AnalysisError> {
        let n = buffer.len();
        if n < 2 {
            return Err(AnalysisError::InvalidWindowLength { length: n });
        }

        if *self == WindowFunction::Rectangular {
            return Ok(());
        }

        for (i, sample) in buffer.iter_mut().enumerate() {
            *sample *= self.coefficient_unchecked(i, n);
        }
        Ok(())
    }
}

impl fmt::Display for WindowFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Zeroth-order modified Bessel function of the first kind (power series)
pub fn bessel_i0(x: f64) -> f64 {
    let mut sum: f64 = 1.0;
    let mut term: f64 = 1.0;
    let mut k: f64 = 1.0;

    while term.abs() > BESSEL_TOLERANCE {
        let factor = x / (2.0 * k);
        term *= factor * factor;
        sum += term;
        k += 1.0;
    }

    sum
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    #[test]
    fn test_hamming_endpoints() {
        let w = WindowFunction::Hamming;
        assert!((w.coefficient(0, 64).unwrap() - 0.08).abs() < EPS);
        assert!((w.coefficient(63, 64).unwrap() - 0.08).abs() < EPS);
    }

    #[test]
    fn test_hanning_endpoints_and_peak() {
        let w = WindowFunction::Hanning;
        assert!(w.coefficient(0, 65).unwrap().abs() < EPS);
        assert!(w.coefficient(64, 65).unwrap().abs() < EPS);
        assert!((w.coefficient(32, 65).unwrap() - 1.0).abs() < EPS);
    }

    #[test]
    fn test_blackman_and_bartlett_shapes() {
        let blackman = WindowFunction::Blackman.coefficients(33).unwrap();
        assert!(blackman[0].abs() < 1e-9);
        assert!((blackman[16] - 1.0).abs() < 1e-9);

        let bartlett = WindowFunction::Bartlett.coefficients(33).unwrap();
        assert!(bartlett[0].abs() < EPS);
        assert!((bartlett[16] - 1.0).abs() < EPS);
        assert!((bartlett[8] - 0.5).abs() < EPS);
    }

    #[test]
    fn test_kaiser_is_symmetric_and_normalized() {
        let kaiser = WindowFunction::Kaiser.coefficients(65).unwrap();
        assert!((kaiser[32] - 1.0).abs() < EPS);
        for i in 0..32 {
            assert!((kaiser[i] - kaiser[64 - i]).abs() < 1e-9);
        }
        // I0(0) / I0(5) at the edges
        assert!((kaiser[0] - 1.0 / bessel_i0(5.0)).abs() < 1e-9);
    }

    #[test]
    fn test_bessel_i0_reference_values() {
        assert!((bessel_i0(0.0) - 1.0).abs() < EPS);
        assert!((bessel_i0(1.0) - 1.266_065_877_752_008_4).abs() < 1e-9);
        assert!((bessel_i0(5.0) - 27.239_871_823_604_45).abs() < 1e-8);
    }

    #[test]
    fn test_apply_keeps_length() {
        let mut buffer = vec![2.0; 16];
        WindowFunction::Hanning.apply(&mut buffer).unwrap();
        assert_eq!(buffer.len(), 16);
        assert_eq!(buffer[0], 0.0);

        let mut flat = vec![2.0; 16];
        WindowFunction::Rectangular.apply(&mut flat).unwrap();
        assert!(flat.iter().all(|&v| v == 2.0));
    }

    #[test]
    fn test_short_window_rejected() {
        for window in WindowFunction::ALL {
            assert_eq!(
                window.coefficient(0, 1),
                Err(AnalysisError::InvalidWindowLength { length: 1 })
            );
        }
        let mut single = vec![1.0];
        assert!(WindowFunction::Hamming.apply(&mut single).is_err());
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&WindowFunction::Blackman).unwrap();
        assert_eq!(json, "\"blackman\"");
        let parsed: WindowFunction = serde_json::from_str("\"kaiser\"").unwrap();
        assert_eq!(parsed, WindowFunction::Kaiser);
    }
}
