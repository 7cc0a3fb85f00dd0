use std::{fs::File, io::stdout, sync::Arc};

use anyhow::Result;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use log::{error, info, warn};
use ratatui::{Terminal, backend::CrosstermBackend};
use simplelog::WriteLogger;

use parabible::event_source::KeyboardEventSource;
use parabible::loader::{BackgroundDispatcher, FileTextLoader, TextLoader};
use parabible::main_app::{App, run_app_with_event_source};
use parabible::panic_handler;
use parabible::reader::{Reader, ReaderOptions};
use parabible::settings;
use parabible::storage::{KeyValueStore, MemoryStore, YamlFileStore};
use parabible::version::{VersionCatalog, VersionCode};
use parabible::widget::chapter_view::ChapterViews;

fn main() -> Result<()> {
    // Initialize panic handler first, before any other setup
    panic_handler::initialize_panic_handler();

    // Load settings from ~/.parabible_settings.yaml
    settings::load_settings();

    let level = settings::get_log_level();
    WriteLogger::init(
        level,
        simplelog::ConfigBuilder::new()
            .set_max_level(level)
            .build(),
        File::create("parabible.log")?,
    )?;

    info!("Starting Parabible");

    let bible_dir = settings::get_bible_dir();
    let catalog = VersionCatalog::load(&bible_dir);
    let loader: Arc<dyn TextLoader> = Arc::new(FileTextLoader::new(bible_dir));
    let storage: Box<dyn KeyValueStore> = match YamlFileStore::open_default() {
        Ok(store) => Box::new(store),
        Err(e) => {
            warn!("Reading state will not be saved: {e:#}");
            Box::new(MemoryStore::new())
        }
    };
    let reader = Reader::with_options(
        loader.clone(),
        Box::new(BackgroundDispatcher::new(loader)),
        storage,
        ChapterViews::new(),
        ReaderOptions {
            default_version: VersionCode::new(settings::get_default_version()),
            min_panel_width: f32::from(settings::get_min_panel_width()),
        },
    );

    // Terminal initialization
    enable_raw_mode()?;
    let mut stdout = stdout();

    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(reader, catalog);
    app.start();
    let mut event_source = KeyboardEventSource;
    let res = run_app_with_event_source(&mut terminal, &mut app, &mut event_source);

    // Restore terminal state
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        error!("Application error: {err:?}");
        println!("{err:?}");
    }

    info!("Shutting down Parabible");
    Ok(())
}
