use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use fluxchat::{
    gallery, logger, App, AppEvent, Command, Config, FalClient, ImageGenerator, QueueStatus,
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let env_loaded = dotenv::dotenv().is_ok();

    let config = Config::from_env();
    logger::init_with_config(
        logger::LoggerConfig::terminal_session(&config.log_file).with_level(config.log_level),
    )?;
    if env_loaded {
        log::info!("✅ .env file loaded");
    } else {
        log::warn!("⚠️  No .env file found, using system environment variables");
    }
    logger::log_config_info(&config);

    if let Err(e) = config.validate() {
        eprintln!("{}", e);
        eprintln!("Set FAL_KEY in the environment or in a .env file.");
        return Err(e.into());
    }
    let client = FalClient::new(config.fal.clone())?;

    let mut app = App::new(config.output_dir.clone());
    let (tx, mut rx) = mpsc::unbounded_channel();

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_event_loop(&mut terminal, &mut app, &client, &tx, &mut rx).await;

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        log::error!("❌ {}", err);
        eprintln!("Error: {}", err);
    }
    log::info!("👋 Session ended");

    Ok(())
}

async fn run_event_loop<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    client: &FalClient,
    tx: &UnboundedSender<AppEvent>,
    rx: &mut UnboundedReceiver<AppEvent>,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        terminal.draw(|f| fluxchat::ui::render(f, app))?;

        while let Ok(update) = rx.try_recv() {
            app.apply_event(update);
        }

        if event::poll(Duration::from_millis(100))? {
            let command = match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => app.handle_key_event(key),
                Event::Mouse(mouse) => app.handle_mouse_event(mouse),
                _ => None,
            };
            if let Some(command) = command {
                spawn_command(command, app, client, tx);
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

fn spawn_command(command: Command, app: &App, client: &FalClient, tx: &UnboundedSender<AppEvent>) {
    match command {
        Command::Generate(pending) => {
            let image_client = client.image().clone();
            let tx = tx.clone();
            tokio::spawn(async move {
                let updates = tx.clone();
                let mut on_update = move |status: &QueueStatus| {
                    let _ = updates.send(AppEvent::Queue(status.clone()));
                };
                let result = image_client.generate(&pending.settings, &mut on_update).await;
                let _ = tx.send(AppEvent::Finished(result));
            });
        }
        Command::SaveImages { message_id, urls } => {
            let image_client = client.image().clone();
            let dir = app.output_dir.clone();
            let tx = tx.clone();
            log::info!("Saving {} image(s) from message {}", urls.len(), message_id);
            tokio::spawn(async move {
                for url in urls {
                    let result = gallery::save_image(&image_client, &url, &dir).await;
                    let _ = tx.send(AppEvent::Saved(result));
                }
            });
        }
    }
}
