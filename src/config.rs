//! Command-line options and the run configuration derived from them

use crate::error::ConfigError;
use crate::memory::palette::DEFAULT_SEED;
use crate::memory::Geometry;
use crate::trace::parse_number;
use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// Replay an allocator trace and draw the heap after every call.
#[derive(Parser, Debug, Clone)]
#[command(name = "heapline")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Trace file, `-` for stdin
    #[arg(default_value = "-")]
    pub trace: PathBuf,

    /// HTML output file, `-` for stdout
    #[arg(default_value = "-")]
    pub out: PathBuf,

    /// Metadata bytes before the user pointer
    #[arg(long, default_value = "8", value_parser = parse_size)]
    pub header: u64,

    /// Metadata bytes after the user data
    #[arg(long, default_value = "0", value_parser = parse_size)]
    pub footer: u64,

    /// Chunk size granularity
    #[arg(long, default_value = "0x10", value_parser = parse_size)]
    pub round: u64,

    /// Minimum chunk size
    #[arg(long, default_value = "0x20", value_parser = parse_size)]
    pub minsz: u64,

    /// Draw requested sizes exactly (header=0, footer=0, round=1, minsz=0)
    #[arg(long)]
    pub raw: bool,

    /// Seed for block colors
    #[arg(short, long, default_value_t = DEFAULT_SEED)]
    pub seed: u64,

    /// Print the seed at the top of the document
    #[arg(short = 'S', long)]
    pub show_seed: bool,

    /// Browse the timeline in the terminal instead of writing HTML
    #[arg(long)]
    pub tui: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

fn parse_size(s: &str) -> Result<u64, ConfigError> {
    parse_number(s).ok_or_else(|| ConfigError::BadNumber(s.to_string()))
}

/// Where the document goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    Stdout,
    File(PathBuf),
    Terminal,
}

/// Validated settings for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub geometry: Geometry,
    pub seed: u64,
    pub show_seed: bool,
    /// `None` reads stdin
    pub input: Option<PathBuf>,
    pub output: Output,
}

impl Config {
    pub fn from_cli(cli: &Cli) -> Result<Config, ConfigError> {
        let geometry = if cli.raw {
            Geometry::RAW
        } else {
            Geometry::new(cli.header, cli.footer, cli.round, cli.minsz)
        };
        if geometry.round == 0 {
            return Err(ConfigError::ZeroRound);
        }

        let input = if is_stdio(&cli.trace) {
            None
        } else {
            Some(cli.trace.clone())
        };
        let output = if cli.tui {
            Output::Terminal
        } else if is_stdio(&cli.out) {
            Output::Stdout
        } else {
            Output::File(cli.out.clone())
        };

        Ok(Config {
            geometry,
            seed: cli.seed,
            show_seed: cli.show_seed,
            input,
            output,
        })
    }
}

fn is_stdio(path: &std::path::Path) -> bool {
    path.as_os_str() == "-"
}

/// Log filter for a `-v` count; `RUST_LOG` takes precedence when set.
pub fn log_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}
