//! Text exports of a finished analysis session.
//!
//! Both formats are rendered to a `String`; writing them to disk is left to
//! the caller so the CLI can choose between stdout and a file.

pub mod csv;
pub mod report;

pub use csv::render_csv;
pub use report::render_report;

use crate::analysis::AnalysisSession;
use crate::error::AnalysisError;

impl AnalysisSession {
    /// Per-sample CSV of the original, filtered and spectrum columns
    pub fn export_csv(&self) -> Result<String, AnalysisError> {
        render_csv(self)
    }

    /// Markdown summary stamped with `generated_at`
    pub fn render_report(&self, generated_at: &str) -> Result<String, AnalysisError> {
        render_report(self, generated_at)
    }
}
