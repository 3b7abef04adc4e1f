//! h5lens - A terminal-based HDF5 browser.

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use h5lens::config::Config;
use h5lens::container::{ContainerAccess, Hdf5Container};
use h5lens::format::header_text;
use h5lens::session::{Control, Session};
use h5lens::ui;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Environment variable naming the log file.
const ENV_LOG_FILE: &str = "H5LENS_LOG";

#[derive(Parser, Debug)]
#[command(name = "h5lens", version)]
#[command(about = "A terminal-based HDF5 browser", long_about = None)]
struct Args {
    /// Path to the HDF5 file to open
    file: PathBuf,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // The terminal belongs to the UI, so logs only ever go to a file.
    if let Some(log_path) = std::env::var_os(ENV_LOG_FILE) {
        init_logging(Path::new(&log_path))?;
        tracing::info!("Starting h5lens");
    }

    if !args.file.exists() {
        eprintln!("Error: Path not found: {}", args.file.display());
        std::process::exit(1);
    }

    let container = match Hdf5Container::open(&args.file) {
        Ok(container) => container,
        Err(err) => {
            tracing::error!("{}", err);
            eprintln!("Error: {}", err);
            std::process::exit(1);
        },
    };

    let config = Config::from_env();
    let mut session = Session::new(container, &config);
    session.set_subtitle(header_text(&args.file).unwrap_or_else(|err| {
        tracing::warn!("Cannot stat {}: {}", args.file.display(), err);
        format!("File: {}", args.file.display())
    }));

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut session);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    session.close();
    tracing::info!("h5lens exited");

    res
}

fn init_logging(path: &Path) -> Result<()> {
    let file = std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn run_app<B, C>(terminal: &mut Terminal<B>, session: &mut Session<C>) -> Result<()>
where
    B: ratatui::backend::Backend,
    C: ContainerAccess,
{
    loop {
        terminal.draw(|f| ui::draw(f, session))?;

        // Keep stepping a pending inspection between key presses.
        let timeout = if session.has_pending() {
            Duration::ZERO
        } else {
            Duration::from_millis(100)
        };

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && session.handle_key(key) == Control::Quit {
                    return Ok(());
                }
            }
        }

        session.tick();
    }
}
