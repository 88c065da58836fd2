// CSV export
//
// Header: Time,Original[,Filtered][,FFT_Magnitude,FFT_Phase]
// One row per input sample. The spectrum columns are only filled for rows
// below the FFT size; later rows stop after the time-domain columns.

use std::fmt::Write;

use crate::analysis::AnalysisSession;
use crate::error::AnalysisError;

pub fn render_csv(session: &AnalysisSession) -> Result<String, AnalysisError> {
    let signal = session.signal().ok_or_else(|| AnalysisError::StageNotReady {
        stage: "load data first".to_string(),
    })?;
    let filtered = session.filtered().map(|f| f.samples.as_slice());
    let spectrum = session.transform_result().map(|t| &t.spectrum);

    let mut out = String::from("Time,Original");
    if filtered.is_some() {
        out.push_str(",Filtered");
    }
    if spectrum.is_some() {
        out.push_str(",FFT_Magnitude,FFT_Phase");
    }
    out.push('\n');

    for (i, sample) in signal.samples().iter().enumerate() {
        // writing to a String cannot fail
        let _ = write!(out, "{},{}", signal.time_at(i), sample);

        if let Some(value) = filtered.and_then(|f| f.get(i)) {
            let _ = write!(out, ",{}", value);
        }
        if let Some(spectrum) = spectrum.filter(|s| i < s.fft_size()) {
            let _ = write!(out, ",{},{}", spectrum.magnitude[i], spectrum.phase[i]);
        }
        out.push('\n');
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{FilterSpec, WindowFunction};

    fn ramp(len: usize) -> Vec<f64> {
        (0..len).map(|i| i as f64 / len as f64).collect()
    }

    #[test]
    fn test_loaded_only() {
        let mut session = AnalysisSession::new();
        session.load(ramp(40), 10.0).unwrap();

        let csv = render_csv(&session).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "Time,Original");
        assert_eq!(lines.len(), 41);
        assert_eq!(lines[1], "0,0");
        assert_eq!(lines[2], "0.1,0.025");
    }

    #[test]
    fn test_spectrum_columns_stop_at_fft_size() {
        let mut session = AnalysisSession::new();
        session.load(ramp(40), 10.0).unwrap();
        session.transform(32, WindowFunction::Rectangular).unwrap();
        session.apply_filter(FilterSpec::lowpass(2.0)).unwrap();

        let csv = render_csv(&session).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "Time,Original,Filtered,FFT_Magnitude,FFT_Phase");
        assert_eq!(lines[1].split(',').count(), 5);
        assert_eq!(lines[32].split(',').count(), 5);
        assert_eq!(lines[33].split(',').count(), 3);
    }

    #[test]
    fn test_empty_session_is_rejected() {
        assert!(matches!(
            AnalysisSession::new().export_csv(),
            Err(AnalysisError::StageNotReady { .. })
        ));
    }
}
