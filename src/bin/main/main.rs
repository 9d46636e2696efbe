pub mod app;
pub mod event;
pub mod game_ui;
pub mod menu_ui;
pub mod tui;
pub mod update;

use app::App;
use clap::Parser;
use color_eyre::Result;
use event::{Event, EventHandler};
use log::LevelFilter;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::path::{Path, PathBuf};
use tui::Tui;
use update::update;

/// The game clock advances once per tick.
const TICK_RATE_MS: u64 = 1000;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Skip the menu and start a game of this difficulty right away
    #[arg(short, long)]
    difficulty: Option<u8>,
    /// Seed for the mine placement, for reproducible fields
    #[arg(short, long)]
    seed: Option<u64>,
    /// Write logs to this file (nothing is logged otherwise)
    #[arg(long)]
    log_file: Option<PathBuf>,
    #[arg(long, default_value_t = LevelFilter::Info)]
    log_level: LevelFilter,
}

/// The terminal is taken by the interface, so the logs only ever go to a file.
fn setup_logging(path: &Path, level: LevelFilter) -> Result<(), fern::InitError> {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}[{}][{}] {}",
                chrono::Local::now().format("[%Y-%m-%d][%H:%M:%S]"),
                record.target(),
                record.level(),
                message,
            ))
        })
        .level(level)
        .chain(fern::log_file(path)?)
        .apply()?;

    log::info!("Logging to {}", path.display());
    Ok(())
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();

    if let Some(path) = &args.log_file {
        setup_logging(path, args.log_level)?;
    }

    // Create the terminal application.
    let mut app = App::new(args.difficulty, args.seed)?;

    // Initialize the terminal user interface.
    let backend = CrosstermBackend::new(std::io::stderr());
    let terminal = Terminal::new(backend)?;
    let events = EventHandler::new(TICK_RATE_MS);
    let mut tui = Tui::new(terminal, events);
    tui.enter()?;

    // Start the main loop. Key presses and clock ticks arrive through the same queue, so the game only ever sees one
    // of them at a time.
    while !app.should_quit {
        // Render the user interface.
        tui.draw(&mut app)?;
        // Handle events.
        match tui.events.next()? {
            Event::Tick => app.tick(),
            Event::Key(key_event) => update(&mut app, key_event),
            Event::Resize(_, _) => {}
        };

        app.process_requests();
    }

    // Exit the user interface.
    tui.exit()?;
    Ok(())
}
