use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use directories::ProjectDirs;
use log::LevelFilter;
use provider_explorer::app::App;
use provider_explorer::schema_source::{self, SchemaEvent};
use provider_explorer::ui;
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::fs::{self, File, OpenOptions};
use std::{io, path::PathBuf, time::Duration};
use tokio::sync::mpsc::{self, UnboundedReceiver};

const LOG_FILE_ENV: &str = "PROVIDER_EXPLORER_LOG_FILE";

/// Browse Terraform provider schemas and export variables or outputs.
#[derive(Debug, Parser)]
#[command(name = "provider-explorer", version, about)]
struct Cli {
    /// Provider schema JSON, as written by `terraform providers schema -json`
    schema: PathBuf,

    /// Only show this provider (full source address or short name)
    #[arg(long)]
    provider: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger();

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = restore_terminal();
        original_hook(panic_info);
    }));

    let app = match App::new(cli.provider.clone()).await {
        Ok(app) => {
            log::info!("Application initialized successfully");
            app
        }
        Err(e) => {
            eprintln!("Failed to initialize: {:#}", e);
            return Err(e);
        }
    };

    // Setup terminal
    if let Err(e) = enable_raw_mode() {
        eprintln!("Failed to initialize terminal: {}", e);
        return Err(e.into());
    }
    let mut stdout = io::stdout();
    if let Err(e) = execute!(stdout, EnterAlternateScreen, EnableMouseCapture) {
        let _ = disable_raw_mode();
        eprintln!("Failed to configure terminal: {}", e);
        return Err(e.into());
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let (tx, rx) = mpsc::unbounded_channel();
    log::info!("Loading schema from {}", cli.schema.display());
    let loader = schema_source::spawn_load(cli.schema, tx);

    let res = run_app(&mut terminal, app, rx).await;
    loader.abort();

    restore_terminal()?;

    if let Err(err) = res {
        eprintln!("Application error: {:#}", err);
        log::error!("Application error: {:#}", err);
        return Err(err);
    }

    Ok(())
}

/// Logs go to a file; stderr belongs to the terminal UI.
fn init_logger() {
    let mut logger = env_logger::Builder::from_default_env();
    if std::env::var_os("RUST_LOG").is_none() {
        logger.filter_level(LevelFilter::Info);
        logger.filter_module("provider_explorer", LevelFilter::Debug);
        logger.filter_module("schematree", LevelFilter::Debug);
    }
    if let Some(file) = open_log_file() {
        logger.target(env_logger::Target::Pipe(Box::new(file)));
    }
    logger.init();
}

fn open_log_file() -> Option<File> {
    let path = match std::env::var_os(LOG_FILE_ENV) {
        Some(path) => PathBuf::from(path),
        None => {
            let dirs = ProjectDirs::from("io", "terraconstructs", "provider-explorer")?;
            fs::create_dir_all(dirs.data_dir()).ok()?;
            dirs.data_dir().join("provider-explorer.log")
        }
    };
    OpenOptions::new().create(true).append(true).open(path).ok()
}

async fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    mut app: App,
    mut schema_events: UnboundedReceiver<SchemaEvent>,
) -> Result<()> {
    loop {
        if let Err(e) = terminal.draw(|f| ui::draw(f, &mut app)) {
            log::error!("Terminal draw error: {}", e);
        }

        app.update_status();

        if let Ok(event) = schema_events.try_recv() {
            app.apply_schema_event(event);
        }

        if app.should_quit() {
            log::info!("Application shutdown requested");
            break;
        }

        if event::poll(Duration::from_millis(100))? {
            match event::read()? {
                Event::Key(key) => {
                    if let Err(e) = handle_key_event_safe(key, &mut app).await {
                        log::error!("Key event handling error: {}", e);
                        app.ui_state.set_error_message(format!("Key handling error: {}", e));
                    }
                }
                Event::Resize(_, _) => {
                    log::debug!("Terminal resized");
                }
                _ => {}
            }
        }
    }

    log::info!("Application loop ended successfully");
    Ok(())
}

async fn handle_key_event_safe(key: KeyEvent, app: &mut App) -> Result<()> {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        log::info!("Exit requested via Ctrl+C");
        app.quit();
        return Ok(());
    }

    app.handle_key_event(key).await
}

/// Restore terminal to normal state
fn restore_terminal() -> Result<()> {
    disable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, LeaveAlternateScreen, DisableMouseCapture)?;
    let _ = execute!(stdout, crossterm::cursor::Show);
    Ok(())
}
