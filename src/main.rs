mod config;
mod display;
mod error;
mod format;
mod metrics;
mod models;
mod normalizer;
mod parser;
mod pi_parser;
mod project_name;
mod scanner;
mod sources;
mod theme;
mod tui_app;
mod tui_events;
mod tui_ui;

use anyhow::Result;
use clap::{Parser, Subcommand};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::path::PathBuf;
use std::sync::mpsc;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::display::{print_json, print_sources_table, print_stats_table};
use crate::models::{SourceId, SourceInfo, Statistics};
use crate::sources::{compute_for, compute_statistics, list_available_sources, source_config};
use crate::tui_app::{App, LoadMessage};

#[derive(Parser)]
#[command(name = "au", about = "Agent usage: analyze Pi Agent & Claude Code session logs", version)]
struct Cli {
    /// Path to config file (default: <config dir>/agent-usage/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging on stderr (subcommands only)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List sources whose session logs are present
    Sources {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print usage statistics for one source
    Stats {
        /// Source id: "pi" or "claude" (default: first available)
        #[arg(short, long)]
        source: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Tracing targets are module paths rooted at the binary crate name.
const DEFAULT_LOG_FILTER: &str = concat!(env!("CARGO_CRATE_NAME"), "=info,warn");

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Compute statistics for every available source, optionally sending progress
fn load_all(
    config: &Config,
    progress: Option<&mpsc::Sender<LoadMessage>>,
) -> crate::error::Result<Vec<(SourceInfo, Statistics)>> {
    let mut loaded = Vec::new();
    for info in list_available_sources(config) {
        if let Some(tx) = progress {
            let _ = tx.send(LoadMessage::Progress(format!("Reading {} logs...", info.label)));
        }
        let stats = compute_for(config, info.id)?;
        loaded.push((info, stats));
    }
    Ok(loaded)
}

fn main() -> Result<()> {
    let args = Cli::parse();
    // The TUI owns the terminal; log lines would draw over it.
    if args.command.is_some() {
        init_tracing(args.verbose);
    }

    let config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    match args.command {
        Some(Commands::Sources { json }) => {
            let sources = list_available_sources(&config);
            if json {
                print_json(&sources)?;
            } else {
                print_sources_table(&sources);
            }
            Ok(())
        }
        Some(Commands::Stats { source, json }) => {
            let stats = match source {
                Some(s) => compute_statistics(&config, &s)?,
                None => {
                    let id = list_available_sources(&config)
                        .first()
                        .map(|s| s.id)
                        .unwrap_or(SourceId::Pi);
                    compute_for(&config, id)?
                }
            };
            if json {
                print_json(&stats)?;
            } else {
                print_stats_table(&source_config(&config, stats.source).label, &stats);
            }
            Ok(())
        }
        // Default: interactive TUI, load in background
        None => run_tui(config),
    }
}

fn run_tui(config: Config) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Spawn background data loading with progress
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        let msg = match load_all(&config, Some(&tx)) {
            Ok(sources) => LoadMessage::Done(sources),
            Err(e) => LoadMessage::Failed(e.to_string()),
        };
        let _ = tx.send(msg);
    });

    let mut app = App::loading(rx);

    // Main loop
    let result = loop {
        app.poll_load();

        if let Err(e) = terminal.draw(|f| tui_ui::draw(f, &mut app)) {
            break Err(e.into());
        }
        if let Err(e) = tui_events::handle_events(&mut app) {
            break Err(e);
        }

        if app.should_quit {
            break Ok(());
        }
    };

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}
