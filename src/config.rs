//! Configuration management for analysis parameters
//!
//! This module loads analysis settings from JSON files so the CLI can be
//! driven by a saved profile instead of long flag lists. Every field has a
//! default, so partial files are accepted.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::analysis::{FilterSpec, FilterType, WindowFunction};

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub analysis: AnalysisConfig,
    pub harmonics: HarmonicConfig,
    pub filter: FilterConfig,
}

/// Signal and transform parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Sample rate in Hz for text inputs (WAV files carry their own)
    pub sample_rate: f64,
    /// FFT length, must be a power of two
    pub fft_points: usize,
    pub window_function: WindowFunction,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            sample_rate: 1000.0,
            fft_points: 1024,
            window_function: WindowFunction::Hanning,
        }
    }
}

/// Harmonic analysis parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarmonicConfig {
    /// Run harmonic analysis as part of a pipeline run
    pub enabled: bool,
    /// Fundamental frequency in Hz
    pub fundamental_freq: f64,
    /// Number of harmonic orders to sample, fundamental included
    pub harmonic_order: usize,
}

impl Default for HarmonicConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            fundamental_freq: 50.0,
            harmonic_order: 10,
        }
    }
}

/// Spectral filter parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Apply the filter as part of a pipeline run
    pub enabled: bool,
    pub filter_type: FilterType,
    pub cutoff_freq1: f64,
    /// Upper edge, only used by bandpass/bandstop
    pub cutoff_freq2: f64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            filter_type: FilterType::Lowpass,
            cutoff_freq1: 100.0,
            cutoff_freq2: 200.0,
        }
    }
}

impl FilterConfig {
    pub fn spec(&self) -> FilterSpec {
        FilterSpec {
            filter_type: self.filter_type,
            cutoff1: self.cutoff_freq1,
            cutoff2: self.cutoff_freq2,
        }
    }
}

impl AppConfig {
    /// Load configuration from a JSON file
    ///
    /// # Returns
    /// The parsed configuration, or defaults (with a warning) when the file
    /// is missing or the JSON is invalid
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    log::info!("[Config] Loaded configuration from {:?}", path.as_ref());
                    config
                }
                Err(err) => {
                    log::warn!(
                        "[Config] Failed to parse JSON from {:?}: {}. Using defaults.",
                        path.as_ref(),
                        err
                    );
                    Self::default()
                }
            },
            Err(err) => {
                log::warn!(
                    "[Config] Failed to read config file {:?}: {}. Using defaults.",
                    path.as_ref(),
                    err
                );
                Self::default()
            }
        }
    }

    /// Load configuration from a JSON file, failing on any read or parse error
    pub fn load_strict<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents =
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        let config = serde_json::from_str(&contents)
            .with_context(|| format!("parsing {}", path.display()))?;
        log::info!("[Config] Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Write the configuration as pretty-printed JSON
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }
}
