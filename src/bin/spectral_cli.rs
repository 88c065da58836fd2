use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use spectral_analyzer::analysis::{
    spawn_analysis, AnalysisRequest, AnalysisSession, FilterStats, FilterType, HarmonicAnalysis,
    PeakSummary, PipelineStage, SignalStatistics, WindowFunction,
};
use spectral_analyzer::config::AppConfig;
use spectral_analyzer::error::{log_analysis_error, AnalysisError, ErrorCode};
use spectral_analyzer::import::{load_samples, write_text_data};
use spectral_analyzer::synthetic::{demo_signal, DEMO_SEED};

#[derive(Parser, Debug)]
#[command(
    name = "spectral_cli",
    about = "FFT spectrum, harmonic distortion and spectral filter analysis"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the pipeline and print a JSON summary
    Analyze(AnalyzeArgs),
    /// Run the pipeline and write per-sample CSV
    ExportCsv(OutputArgs),
    /// Run the pipeline and write a Markdown report
    Report(ReportArgs),
    /// Write the built-in demo signal as one sample per line
    Demo(DemoArgs),
}

#[derive(Args, Debug, Clone)]
struct AnalyzeArgs {
    #[command(flatten)]
    pipeline: PipelineArgs,
    /// Destination file (stdout when omitted)
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
struct OutputArgs {
    #[command(flatten)]
    pipeline: PipelineArgs,
    /// Destination file (stdout when omitted)
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
struct ReportArgs {
    #[command(flatten)]
    pipeline: PipelineArgs,
    /// Destination file (stdout when omitted)
    #[arg(long)]
    output: Option<PathBuf>,
    /// Timestamp written into the report header
    #[arg(long)]
    generated_at: Option<String>,
}

#[derive(Args, Debug, Clone)]
struct DemoArgs {
    /// Destination file (stdout when omitted)
    #[arg(long)]
    output: Option<PathBuf>,
    /// Noise seed
    #[arg(long, default_value_t = DEMO_SEED)]
    seed: u64,
}

/// Input selection plus overrides for every configuration field
#[derive(Args, Debug, Clone)]
struct PipelineArgs {
    /// JSON configuration file; flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,
    /// Text (one or more numbers per line) or mono WAV input
    #[arg(long)]
    input: PathBuf,
    /// Sample rate in Hz for text input
    #[arg(long)]
    sample_rate: Option<f64>,
    /// FFT length (power of two)
    #[arg(long)]
    fft_points: Option<usize>,
    #[arg(long, value_enum)]
    window: Option<WindowArg>,
    /// Fundamental frequency in Hz
    #[arg(long)]
    fundamental: Option<f64>,
    /// Number of harmonic orders, fundamental included
    #[arg(long)]
    orders: Option<usize>,
    /// Skip harmonic analysis
    #[arg(long, default_value_t = false)]
    no_harmonics: bool,
    /// Apply a brick-wall filter of this type
    #[arg(long, value_enum)]
    filter: Option<FilterArg>,
    #[arg(long)]
    cutoff1: Option<f64>,
    #[arg(long)]
    cutoff2: Option<f64>,
}

#[derive(Debug, Copy, Clone, ValueEnum)]
enum WindowArg {
    Rectangular,
    Hamming,
    Hanning,
    Blackman,
    Bartlett,
    Kaiser,
}

impl From<WindowArg> for WindowFunction {
    fn from(value: WindowArg) -> Self {
        match value {
            WindowArg::Rectangular => WindowFunction::Rectangular,
            WindowArg::Hamming => WindowFunction::Hamming,
            WindowArg::Hanning => WindowFunction::Hanning,
            WindowArg::Blackman => WindowFunction::Blackman,
            WindowArg::Bartlett => WindowFunction::Bartlett,
            WindowArg::Kaiser => WindowFunction::Kaiser,
        }
    }
}

#[derive(Debug, Copy, Clone, ValueEnum)]
enum FilterArg {
    Lowpass,
    Highpass,
    Bandpass,
    Bandstop,
}

impl From<FilterArg> for FilterType {
    fn from(value: FilterArg) -> Self {
        match value {
            FilterArg::Lowpass => FilterType::Lowpass,
            FilterArg::Highpass => FilterType::Highpass,
            FilterArg::Bandpass => FilterType::Bandpass,
            FilterArg::Bandstop => FilterType::Bandstop,
        }
    }
}

impl PipelineArgs {
    fn resolved_config(&self) -> Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => AppConfig::load_strict(path)?,
            None => AppConfig::default(),
        };

        if let Some(rate) = self.sample_rate {
            config.analysis.sample_rate = rate;
        }
        if let Some(points) = self.fft_points {
            config.analysis.fft_points = points;
        }
        if let Some(window) = self.window {
            config.analysis.window_function = window.into();
        }
        if let Some(freq) = self.fundamental {
            config.harmonics.fundamental_freq = freq;
        }
        if let Some(orders) = self.orders {
            config.harmonics.harmonic_order = orders;
        }
        if self.no_harmonics {
            config.harmonics.enabled = false;
        }
        if let Some(filter) = self.filter {
            config.filter.enabled = true;
            config.filter.filter_type = filter.into();
        }
        if let Some(cutoff) = self.cutoff1 {
            config.filter.cutoff_freq1 = cutoff;
        }
        if let Some(cutoff) = self.cutoff2 {
            config.filter.cutoff_freq2 = cutoff;
        }

        Ok(config)
    }

    fn run(&self) -> Result<AnalysisSession> {
        let config = self.resolved_config()?;
        let signal = load_samples(&self.input, config.analysis.sample_rate)?;
        let request = AnalysisRequest::from_config(signal.samples, signal.sample_rate, &config);

        let session = spawn_analysis(request)
            .blocking_recv()
            .map_err(|_| anyhow!("analysis worker exited without a result"))?
            .with_context(|| format!("analyzing {}", self.input.display()))?;
        Ok(session)
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(tracing::Level::WARN)
        .init();

    match run() {
        Ok(code) => code,
        Err(err) => {
            if let Some(analysis_err) = err.downcast_ref::<AnalysisError>() {
                log_analysis_error(analysis_err, "spectral_cli");
                eprintln!("Error (code {}): {err:#}", analysis_err.code());
            } else {
                eprintln!("Error: {err:#}");
            }
            ExitCode::from(1)
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze(args) => run_analyze(args),
        Commands::ExportCsv(args) => run_export_csv(args),
        Commands::Report(args) => run_report(args),
        Commands::Demo(args) => run_demo(args),
    }
}

fn run_analyze(args: AnalyzeArgs) -> Result<ExitCode> {
    let session = args.pipeline.run()?;
    let payload = AnalyzePayload::from_session(&args.pipeline.input, &session)?;
    let json = serde_json::to_string_pretty(&payload)?;
    emit(&json, args.output.as_deref())?;
    Ok(ExitCode::SUCCESS)
}

fn run_export_csv(args: OutputArgs) -> Result<ExitCode> {
    let session = args.pipeline.run()?;
    let csv = session.export_csv()?;
    emit(&csv, args.output.as_deref())?;
    Ok(ExitCode::SUCCESS)
}

fn run_report(args: ReportArgs) -> Result<ExitCode> {
    let session = args.pipeline.run()?;
    let generated_at = args.generated_at.unwrap_or_else(unix_timestamp);
    let report = session.render_report(&generated_at)?;
    emit(&report, args.output.as_deref())?;
    Ok(ExitCode::SUCCESS)
}

fn run_demo(args: DemoArgs) -> Result<ExitCode> {
    let samples = demo_signal(args.seed);
    match args.output {
        Some(path) => write_text_data(&path, &samples)?,
        None => {
            let mut stdout = io::stdout().lock();
            for sample in samples {
                writeln!(stdout, "{sample}")?;
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn emit(body: &str, output_path: Option<&Path>) -> Result<()> {
    if let Some(path) = output_path {
        fs::write(path, body).with_context(|| format!("writing {}", path.display()))?;
    } else {
        print!("{body}");
        if !body.ends_with('\n') {
            println!();
        }
    }
    Ok(())
}

fn unix_timestamp() -> String {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    format!("{secs} (unix time)")
}

#[derive(Serialize)]
struct AnalyzePayload<'a> {
    input: String,
    stage: PipelineStage,
    window: WindowFunction,
    statistics: SignalStatistics,
    spectrum: PeakSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    harmonics: Option<&'a HarmonicAnalysis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    filter: Option<FilterPayload>,
}

#[derive(Serialize)]
struct FilterPayload {
    filter_type: FilterType,
    cutoff1: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    cutoff2: Option<f64>,
    bins_zeroed: usize,
    stats: FilterStats,
}

impl<'a> AnalyzePayload<'a> {
    fn from_session(input: &Path, session: &'a AnalysisSession) -> Result<Self> {
        let statistics = session
            .statistics()
            .ok_or_else(|| anyhow!("no signal loaded"))?;
        let transform = session
            .transform_result()
            .ok_or_else(|| anyhow!("no spectrum computed"))?;

        let filter = session.filtered().map(|filtered| FilterPayload {
            filter_type: filtered.spec.filter_type,
            cutoff1: filtered.spec.cutoff1,
            cutoff2: filtered
                .spec
                .filter_type
                .uses_second_cutoff()
                .then_some(filtered.spec.cutoff2),
            bins_zeroed: filtered.bins_zeroed,
            stats: filtered.stats,
        });

        Ok(Self {
            input: input.display().to_string(),
            stage: session.stage(),
            window: transform.window,
            statistics,
            spectrum: transform.summary,
            harmonics: session.harmonics(),
            filter,
        })
    }
}
