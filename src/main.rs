//! vwf2tikz - Quartus waveform to tikz-timing converter
//!
//! # Usage
//!
//! ```bash
//! vwf2tikz counter.vwf counter.tex --mode document --start 0 --end 200 --clock clk
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use tracing::debug;
use tracing_subscriber::EnvFilter;
use vwf2tikz::{convert_file, model::parse_ticks, ClockEdge, OutputMode, RenderOptions};

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Mode {
    /// Bare table rows
    Rows,
    /// A tikztimingtable environment
    Graphic,
    /// A standalone LaTeX document
    Document,
}

impl From<Mode> for OutputMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Rows => OutputMode::Rows,
            Mode::Graphic => OutputMode::Graphic,
            Mode::Document => OutputMode::Document,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ClockLines {
    Rising,
    Falling,
    None,
}

/// Parse a time in the file's time unit into ticks.
fn time_arg(text: &str) -> Result<u64, String> {
    parse_ticks(text).ok_or_else(|| format!("'{}' is not a non-negative time with at most 3 decimals", text))
}

/// Quartus vector waveform to tikz-timing converter
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the waveform file (.vwf)
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Path of the generated TeX file
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Output flavour
    #[arg(short, long, value_enum, default_value_t = Mode::Graphic)]
    mode: Mode,

    /// Time per diagram slot (defaults to the file's grid period)
    #[arg(long, value_parser = time_arg)]
    scale: Option<u64>,

    /// Viewport start (defaults to the file's data offset)
    #[arg(long, value_parser = time_arg)]
    start: Option<u64>,

    /// Viewport end (defaults to the end of the file's data)
    #[arg(long, value_parser = time_arg)]
    end: Option<u64>,

    /// Node drawn as a clock; repeat for several
    #[arg(long = "clock", value_name = "NAME")]
    clocks: Vec<String>,

    /// Draw clock toggles with sloped edges
    #[arg(long)]
    sloped_clock: bool,

    /// Clock edge marked with vertical help lines
    #[arg(long, value_enum, default_value_t = ClockLines::Rising)]
    clock_lines: ClockLines,

    /// Draw the table grid
    #[arg(long)]
    grid: bool,

    /// Minimum slots for a bus label to be drawn
    #[arg(long, value_name = "SLOTS")]
    label_threshold: Option<f64>,

    /// Log pipeline stages
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn options(&self) -> RenderOptions {
        let mut options = RenderOptions::new()
            .with_clock_no_slope(!self.sloped_clock)
            .with_clock_lines(match self.clock_lines {
                ClockLines::Rising => Some(ClockEdge::Rising),
                ClockLines::Falling => Some(ClockEdge::Falling),
                ClockLines::None => None,
            });

        if !self.clocks.is_empty() {
            options = options.with_clock_nodes(self.clocks.iter().cloned());
        }
        if let Some(scale) = self.scale {
            options = options.with_scale(scale as f64);
        }
        if self.grid {
            options = options.with_grid(true);
        }
        if let Some(threshold) = self.label_threshold {
            options.label_hide_threshold = threshold;
        }
        options.start_time = self.start;
        options.end_time = self.end;
        options
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    let options = args.options();
    debug!(?options, "converting {}", args.input.display());

    match convert_file(&args.input, &args.output, &options, args.mode.into()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
