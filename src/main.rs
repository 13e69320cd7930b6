mod app;
mod keys;
mod logging;
mod theme;
mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Instant;

use rescramble::config::{
    get_config_path, load_config, load_config_from_path, speed_from_bounds, write_default_config,
    Config,
};
use rescramble::{FrameQueue, ScrambleText, TextProps};

use crate::app::App;

// ============================================================================
// MAIN
// ============================================================================

#[derive(Parser)]
#[command(name = "rescramble")]
#[command(author = "Ninso112")]
#[command(version)]
#[command(about = "Scramble-morph text transitions in the terminal", long_about = None)]
struct Cli {
    /// Phrases to cycle through (overrides the config file)
    phrases: Vec<String>,

    /// Frames each character spends scrambling
    #[arg(short, long, num_args = 2, value_names = ["MIN", "MAX"])]
    speed: Option<Vec<u32>>,

    /// Seed the animation for reproducible output
    #[arg(long)]
    seed: Option<u64>,

    /// Print markup frames and each settled phrase instead of opening the terminal UI
    #[arg(short, long)]
    print: bool,

    /// Generate default configuration file
    #[arg(short, long)]
    init: bool,

    /// Specify custom config file path
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Write logs to this file (filter with RUST_LOG)
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(log_file) = &cli.log_file {
        logging::init_file_logging(log_file)?;
    }

    // Handle --init flag
    if cli.init {
        return generate_config_file();
    }

    let mut config = if let Some(config_path) = &cli.config {
        load_config_from_path(config_path)?
    } else {
        load_config()
    };
    apply_overrides(&mut config, &cli);
    tracing::info!(phrases = config.phrases.len(), "configuration loaded");

    if cli.print {
        return print_frames(&config, &mut io::stdout().lock());
    }

    // Setup terminal
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to setup terminal")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;

    let mut app = App::new(config);
    let res = run_app(&mut terminal, &mut app);
    app.shutdown();

    // Restore terminal
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("Failed to restore terminal")?;
    terminal.show_cursor().context("Failed to show cursor")?;

    if let Err(err) = res {
        tracing::error!("terminal loop failed: {err:#}");
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}

fn apply_overrides(config: &mut Config, cli: &Cli) {
    if !cli.phrases.is_empty() {
        config.phrases = cli.phrases.clone();
    }
    if let Some(&[min_frames, max_frames]) = cli.speed.as_deref() {
        config.animation.speed = speed_from_bounds(min_frames, max_frames);
    }
    if cli.seed.is_some() {
        config.animation.seed = cli.seed;
    }
}

fn generate_config_file() -> Result<()> {
    let config_path = get_config_path().context("Could not determine config directory")?;

    write_default_config(&config_path)?;

    println!(
        "Default configuration file created at: {}",
        config_path.display()
    );
    println!("Edit this file to customize rescramble's appearance and behavior.");

    Ok(())
}

/// Drive every phrase to completion without a terminal: one markup line per
/// frame, then the settled phrase as plain text.
fn print_frames<W: Write>(config: &Config, out: &mut W) -> Result<()> {
    let mut text = ScrambleText::new(config.animation.scramble_settings());
    let mut queue = FrameQueue::new();

    for phrase in &config.phrases {
        let props = TextProps::new(phrase.clone()).with_speed(config.animation.speed);
        text.update(props, &mut queue);

        while !queue.is_empty() {
            for request in queue.take_pending() {
                if let Some(frame) = text.on_frame(&request, &mut queue) {
                    writeln!(out, "{}", frame.markup()).context("Failed to write frame")?;
                }
            }
        }
        writeln!(out, "{}", text.displayed()).context("Failed to write frame")?;
    }

    text.unmount();
    out.flush().context("Failed to flush output")?;
    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    let frame_interval = app.frame_interval();
    let mut next_frame_at = Instant::now();
    app.start();

    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        if app.should_quit {
            break;
        }

        let timeout = next_frame_at.saturating_duration_since(Instant::now());
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(&key);
                }
            }
        }

        let now = Instant::now();
        if now >= next_frame_at {
            app.fire_frames();
            app.advance_if_held(now);
            next_frame_at = now + frame_interval;
        }
    }
    Ok(())
}
