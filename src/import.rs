//! Sample import from delimited text and PCM WAV files.
//!
//! Text input is one or more values per line separated by commas, tabs or
//! whitespace. Tokens that do not parse as numbers (headers, units) are
//! skipped. WAV input must be mono; integer PCM is normalized to ±1.

use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};

/// Samples plus the rate they should be analyzed at
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedSignal {
    pub samples: Vec<f64>,
    pub sample_rate: f64,
}

/// Parse delimited numeric text into samples
///
/// Each non-empty line is split on `,` if it contains one, else on tabs if
/// it contains one, else on runs of whitespace. `NaN` and infinity tokens
/// are skipped like any other non-numeric text.
pub fn parse_text_data(text: &str) -> Vec<f64> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .flat_map(split_line)
        .filter_map(|token| token.trim().parse::<f64>().ok())
        .filter(|value| value.is_finite())
        .collect()
}

fn split_line(line: &str) -> Vec<&str> {
    if line.contains(',') {
        line.split(',').collect()
    } else if line.contains('\t') {
        line.split('\t').collect()
    } else {
        line.split_whitespace().collect()
    }
}

/// Load samples from `path`
///
/// `.wav` files carry their own sample rate; any other extension is read as
/// delimited text at `fallback_rate`.
pub fn load_samples(path: &Path, fallback_rate: f64) -> Result<ImportedSignal> {
    let is_wav = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("wav"));

    let signal = if is_wav {
        let (samples, sample_rate) = read_wav(path)?;
        ImportedSignal {
            samples,
            sample_rate: sample_rate as f64,
        }
    } else {
        let text =
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        ImportedSignal {
            samples: parse_text_data(&text),
            sample_rate: fallback_rate,
        }
    };

    log::info!(
        "[Import] Read {} samples from {} ({} Hz)",
        signal.samples.len(),
        path.display(),
        signal.sample_rate
    );
    Ok(signal)
}

/// Decode a mono PCM WAV file
pub fn read_wav(path: &Path) -> Result<(Vec<f64>, u32)> {
    let mut reader =
        hound::WavReader::open(path).with_context(|| format!("opening {}", path.display()))?;
    let spec = reader.spec();
    if spec.channels != 1 {
        return Err(anyhow!(
            "{} must be mono (found {} channels)",
            path.display(),
            spec.channels
        ));
    }

    let samples = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .map(|sample| sample.map(f64::from).map_err(|err| anyhow!(err)))
            .collect::<Result<Vec<f64>>>()?,
        hound::SampleFormat::Int => {
            let max = ((1i64 << (spec.bits_per_sample - 1)) - 1) as f64;
            match spec.bits_per_sample {
                8 | 16 | 24 | 32 => reader
                    .samples::<i32>()
                    .map(|sample| {
                        sample
                            .map(|value| value as f64 / max)
                            .map_err(|err| anyhow!(err))
                    })
                    .collect::<Result<Vec<f64>>>()?,
                other => {
                    return Err(anyhow!(
                        "Unsupported bits per sample {} in {}",
                        other,
                        path.display()
                    ))
                }
            }
        }
    };

    Ok((samples, spec.sample_rate))
}

/// Write samples as one value per line
pub fn write_text_data(path: &Path, samples: &[f64]) -> Result<()> {
    let body: String = samples.iter().map(|s| format!("{}\n", s)).collect();
    fs::write(path, body).with_context(|| format!("writing {}", path.display()))
}
