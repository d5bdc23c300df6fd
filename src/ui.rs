use crate::app::{App, AppEvent, AppScreen};
use crate::chat_view;
use crate::key_handlers;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event as CEvent},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Frame, Terminal};
use std::io;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// Runs the terminal UI until the user quits.
pub async fn run(mut app: App) -> anyhow::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let (tx, rx) = mpsc::channel::<AppEvent>(100);
    spawn_input_reader(tx.clone());

    let result = event_loop(&mut terminal, &mut app, tx, rx).await;

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

/// Reads crossterm input and emits a tick every 250ms, mirroring the redraw
/// cadence. Stops once the receiving side goes away.
fn spawn_input_reader(tx: mpsc::Sender<AppEvent>) {
    tokio::spawn(async move {
        let mut last_tick = Instant::now();
        loop {
            let timeout = Duration::from_millis(100);
            if event::poll(timeout).unwrap_or(false) {
                if let Ok(event) = event::read() {
                    if tx.send(AppEvent::Input(event)).await.is_err() {
                        return;
                    }
                }
            }

            if last_tick.elapsed() >= Duration::from_millis(250) {
                if tx.send(AppEvent::Tick).await.is_err() {
                    return;
                }
                last_tick = Instant::now();
            }
        }
    });
}

async fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    tx: mpsc::Sender<AppEvent>,
    mut rx: mpsc::Receiver<AppEvent>,
) -> anyhow::Result<()> {
    loop {
        terminal.draw(|f| draw(f, app))?;

        match rx.recv().await {
            Some(AppEvent::Input(CEvent::Key(key))) => {
                key_handlers::handle_key(key, app, tx.clone());
            }
            Some(AppEvent::Input(_)) => {}
            Some(AppEvent::Tick) => {}
            Some(AppEvent::StreamFragment(id, fragment)) => {
                app.on_stream_fragment(id, &fragment);
            }
            Some(AppEvent::StreamDone(id)) => {
                app.on_stream_done(id);
            }
            Some(AppEvent::StreamError(id, failure)) => {
                app.on_stream_error(id, &failure);
            }
            None => break,
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

fn draw(f: &mut Frame, app: &mut App) {
    match app.screen {
        AppScreen::Chat => chat_view::draw_chat(f, app),
        AppScreen::SetupError => chat_view::draw_setup_error(f, app),
        AppScreen::QuitConfirm => chat_view::draw_quit_confirm(f),
    }
}
