use std::time::Duration;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod app;
mod clipboard;
mod config;
mod error;
mod gemini;
mod handler;
mod prompt;
mod tui;
mod ui;

use app::App;
use config::Config;
use error::Error;

const TICK_RATE: Duration = Duration::from_millis(250);

#[tokio::main]
async fn main() -> Result<()> {
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => fatal(e),
    };

    if let Err(e) = init_tracing() {
        eprintln!("sandgen: logging disabled: {e}");
    }

    // Resolving the credential happens before the terminal changes
    // modes, so a missing key halts startup with a plain message.
    let app = match App::new(&config) {
        Ok(app) => app,
        Err(e) => fatal(e),
    };

    info!("starting with model {}", config.model());

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let result = run(&mut terminal, app).await;
    tui::restore()?;
    result
}

async fn run(terminal: &mut tui::Tui, mut app: App) -> Result<()> {
    let mut events = tui::EventHandler::new(TICK_RATE);

    while !app.should_quit {
        app.poll_generation().await;
        terminal.draw(|frame| ui::render(&mut app, frame))?;

        if let Some(event) = events.next().await {
            handler::handle_event(&mut app, event).await?;
        }
    }

    Ok(())
}

fn fatal(e: Error) -> ! {
    eprintln!("sandgen: {e}");
    if matches!(e, Error::Configuration(_)) {
        eprintln!(
            "Set the {} environment variable (or api_key in the config file) and try again.",
            config::API_KEY_VAR
        );
    }
    std::process::exit(1);
}

fn init_tracing() -> Result<()> {
    let Some(data_dir) = dirs::data_local_dir() else {
        return Ok(());
    };
    let log_dir = data_dir.join("sandgen");
    std::fs::create_dir_all(&log_dir)?;
    let log_file = std::fs::File::create(log_dir.join("sandgen.log"))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("SANDGEN_LOG").unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::sync::Arc::new(log_file))
        .with_ansi(false)
        .init();
    Ok(())
}
