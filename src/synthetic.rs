//! Deterministic test signals.
//!
//! `demo_signal` reproduces the built-in demonstration input: a 50 Hz
//! fundamental with 3rd and 5th harmonics and a little uniform noise. The
//! noise comes from a seeded `StdRng`, so a given seed always yields the
//! same samples.

use std::f64::consts::PI;

use rand::{rngs::StdRng, Rng, SeedableRng};

/// Demo signal sample rate in Hz
pub const DEMO_SAMPLE_RATE: f64 = 1000.0;

/// Demo signal length (one second)
pub const DEMO_SAMPLES: usize = 1000;

/// Default seed used by the CLI `demo` command
pub const DEMO_SEED: u64 = 0x5EED_0050;

/// One sinusoidal component of a tone mix
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    pub frequency: f64,
    pub amplitude: f64,
}

impl Tone {
    pub fn new(frequency: f64, amplitude: f64) -> Self {
        Self {
            frequency,
            amplitude,
        }
    }
}

/// Noiseless sum of sines sampled at `sample_rate`
pub fn tone_mix(tones: &[Tone], sample_rate: f64, len: usize) -> Vec<f64> {
    (0..len)
        .map(|i| {
            let t = i as f64 / sample_rate;
            tones
                .iter()
                .map(|tone| tone.amplitude * (2.0 * PI * tone.frequency * t).sin())
                .sum()
        })
        .collect()
}

/// sin(2π·50t) + 0.3 sin(2π·150t) + 0.1 sin(2π·250t) + 0.05·(u − 0.5)
pub fn demo_signal(seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let tones = [
        Tone::new(50.0, 1.0),
        Tone::new(150.0, 0.3),
        Tone::new(250.0, 0.1),
    ];

    tone_mix(&tones, DEMO_SAMPLE_RATE, DEMO_SAMPLES)
        .into_iter()
        .map(|sample| sample + 0.05 * (rng.gen::<f64>() - 0.5))
        .collect()
}
