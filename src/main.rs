// heapline: replay an allocator trace and draw the heap after every call

use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;
use tracing_subscriber::EnvFilter;

use heapline::config::{log_filter, Cli, Config, Output};
use heapline::layout::{layout_timeline, TimelineLayout};
use heapline::render::html;
use heapline::replay::replay;
use heapline::snapshot::Timeline;
use heapline::trace::Trace;
use heapline::ui::App;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = Config::from_cli(&cli)?;
    let text = read_input(&config)?;
    let trace = Trace::new(text);

    let timeline = replay(trace.events(), config.geometry, config.seed);
    info!(snapshots = timeline.len(), "trace replayed");

    // Layout needs the complete grid; a failure here aborts before any output
    let layout = layout_timeline(&timeline).context("cannot lay out heap timeline")?;

    let seed = config.show_seed.then_some(config.seed);
    match &config.output {
        Output::Stdout => {
            let stdout = io::stdout();
            let mut out = BufWriter::new(stdout.lock());
            html::render(&mut out, &timeline, &layout, seed)?;
            out.flush()?;
        }
        Output::File(path) => {
            let file = File::create(path)
                .with_context(|| format!("cannot create {}", path.display()))?;
            let mut out = BufWriter::new(file);
            html::render(&mut out, &timeline, &layout, seed)?;
            out.flush()?;
            info!(path = %path.display(), "document written");
        }
        Output::Terminal => run_tui(timeline, layout)?,
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_filter(verbose)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Read the whole trace; undecodable bytes are replaced rather than rejected.
fn read_input(config: &Config) -> Result<String> {
    let bytes = match &config.input {
        Some(path) => {
            fs::read(path).with_context(|| format!("cannot read {}", path.display()))?
        }
        None => {
            let mut buf = Vec::new();
            io::stdin()
                .read_to_end(&mut buf)
                .context("cannot read trace from stdin")?;
            buf
        }
    };
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn run_tui(timeline: Timeline, layout: TimelineLayout) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(timeline, layout);
    let res = app.run(&mut terminal);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res.context("terminal viewer failed")
}
