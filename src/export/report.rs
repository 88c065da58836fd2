// Markdown report export
//
// Sections appear only when the matching stage has run: basic info and
// statistics always, harmonic analysis after `analyze_harmonics`, filter
// results after `apply_filter`.

use std::fmt::Write;

use crate::analysis::AnalysisSession;
use crate::error::AnalysisError;

pub fn render_report(
    session: &AnalysisSession,
    generated_at: &str,
) -> Result<String, AnalysisError> {
    let stats = session
        .statistics()
        .ok_or_else(|| AnalysisError::StageNotReady {
            stage: "load data first".to_string(),
        })?;

    // writes into a String are infallible
    let mut out = String::new();
    let _ = writeln!(out, "# FFT Spectrum Analysis Report\n");
    let _ = writeln!(out, "Generated: {}\n", generated_at);

    let _ = writeln!(out, "## Basic Information");
    let _ = writeln!(out, "- Data points: {}", stats.sample_count);
    let _ = writeln!(out, "- Sample rate: {} Hz", stats.sample_rate);
    let _ = writeln!(out, "- Duration: {:.3} s\n", stats.duration_secs);

    let _ = writeln!(out, "## Statistics");
    let _ = writeln!(out, "- Mean: {:.6}", stats.mean);
    let _ = writeln!(out, "- Std deviation: {:.6}", stats.std_dev);
    let _ = writeln!(out, "- Max: {:.6}", stats.max);
    let _ = writeln!(out, "- Min: {:.6}", stats.min);
    let _ = writeln!(out, "- RMS: {:.6}\n", stats.rms);

    if let Some(transform) = session.transform_result() {
        let summary = &transform.summary;
        let _ = writeln!(out, "## Spectrum");
        let _ = writeln!(out, "- FFT points: {}", transform.fft_size);
        let _ = writeln!(out, "- Window: {}", transform.window);
        let _ = writeln!(
            out,
            "- Frequency resolution: {:.4} Hz",
            summary.frequency_resolution
        );
        let _ = writeln!(
            out,
            "- Peak: {:.2} Hz ({:.6})\n",
            summary.peak_frequency, summary.peak_magnitude
        );
    }

    if let Some(analysis) = session.harmonics() {
        let metrics = &analysis.metrics;
        let _ = writeln!(out, "## Harmonic Analysis");
        let _ = writeln!(out, "- Fundamental: {:.1} Hz", analysis.fundamental_freq);
        let _ = writeln!(out, "- THD: {:.3}%", metrics.thd);
        let _ = writeln!(out, "- THD+N: {:.3}%", metrics.thd_plus_n);
        let _ = writeln!(out, "- SINAD: {:.2} dB\n", metrics.sinad);

        let _ = writeln!(out, "### Harmonics");
        for harmonic in &analysis.harmonics {
            let _ = writeln!(
                out,
                "- Order {} ({:.1} Hz): {:.6}",
                harmonic.order, harmonic.frequency, harmonic.magnitude
            );
        }
        out.push('\n');
    }

    if let Some(filtered) = session.filtered() {
        let spec = &filtered.spec;
        let _ = writeln!(out, "## Filter");
        let _ = writeln!(out, "- Type: {}", spec.filter_type.label());
        if spec.filter_type.uses_second_cutoff() {
            let _ = writeln!(out, "- Cutoff: {} Hz - {} Hz", spec.cutoff1, spec.cutoff2);
        } else {
            let _ = writeln!(out, "- Cutoff: {} Hz", spec.cutoff1);
        }
        let _ = writeln!(out, "- Bins zeroed: {}", filtered.bins_zeroed);
        let _ = writeln!(out, "- Original RMS: {:.4}", filtered.stats.original_rms);
        let _ = writeln!(out, "- Filtered RMS: {:.4}", filtered.stats.filtered_rms);
        match filtered.stats.attenuation_db {
            Some(db) => {
                let _ = writeln!(out, "- Attenuation: {:.2} dB", db);
            }
            None => {
                let _ = writeln!(out, "- Attenuation: n/a");
            }
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{FilterSpec, WindowFunction};
    use crate::synthetic::{tone_mix, Tone};

    fn loaded_session() -> AnalysisSession {
        let mut session = AnalysisSession::new();
        let samples = tone_mix(&[Tone::new(64.0, 1.0), Tone::new(128.0, 0.5)], 1024.0, 1024);
        session.load(samples, 1024.0).unwrap();
        session
    }

    #[test]
    fn test_basic_sections_only() {
        let report = render_report(&loaded_session(), "2026-01-01 00:00:00").unwrap();
        assert!(report.starts_with("# FFT Spectrum Analysis Report\n"));
        assert!(report.contains("Generated: 2026-01-01 00:00:00"));
        assert!(report.contains("- Data points: 1024"));
        assert!(report.contains("- Duration: 1.000 s"));
        assert!(!report.contains("## Harmonic Analysis"));
        assert!(!report.contains("## Filter"));
    }

    #[test]
    fn test_full_report() {
        let mut session = loaded_session();
        session.transform(1024, WindowFunction::Rectangular).unwrap();
        session.analyze_harmonics(64.0, 2).unwrap();
        session.apply_filter(FilterSpec::bandpass(50.0, 100.0)).unwrap();

        let report = session.render_report("now").unwrap();
        assert!(report.contains("- THD: 50.000%"));
        assert!(report.contains("- Order 1 (64.0 Hz): 1.000000"));
        assert!(report.contains("- Order 2 (128.0 Hz): 0.500000"));
        assert!(report.contains("- Type: Band-pass filter"));
        assert!(report.contains("- Cutoff: 50 Hz - 100 Hz"));
    }
}
