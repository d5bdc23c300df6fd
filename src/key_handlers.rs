use crate::app::{App, AppEvent, AppScreen};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::sync::mpsc;

pub fn handle_key(key: KeyEvent, app: &mut App, events: mpsc::Sender<AppEvent>) {
    match app.screen {
        AppScreen::Chat => handle_chat_key(key, app, events),
        AppScreen::QuitConfirm => handle_quit_confirm_key(key, app),
        AppScreen::SetupError => handle_setup_error_key(key, app),
    }
}

fn handle_chat_key(key: KeyEvent, app: &mut App, events: mpsc::Sender<AppEvent>) {
    match key.code {
        KeyCode::Esc => {
            app.screen = AppScreen::QuitConfirm;
        }
        KeyCode::Enter => {
            app.submit(events);
        }
        KeyCode::Backspace => {
            app.input.pop();
        }
        KeyCode::PageUp => app.scroll_up(),
        KeyCode::PageDown => app.scroll_down(),
        KeyCode::Char(c) => {
            if key.modifiers.contains(KeyModifiers::CONTROL) {
                match c {
                    'c' => app.screen = AppScreen::QuitConfirm,
                    'u' => app.scroll_up(),
                    'd' => app.scroll_down(),
                    _ => {}
                }
            } else {
                app.input.push(c);
            }
        }
        _ => {}
    }
}

fn handle_quit_confirm_key(key: KeyEvent, app: &mut App) {
    match key.code {
        KeyCode::Char('y') | KeyCode::Enter => {
            app.should_quit = true;
        }
        KeyCode::Char('n') | KeyCode::Esc => {
            app.screen = AppScreen::Chat;
        }
        _ => {}
    }
}

fn handle_setup_error_key(key: KeyEvent, app: &mut App) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc | KeyCode::Enter => {
            app.should_quit = true;
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventKind;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: crossterm::event::KeyEventState::NONE,
        }
    }

    #[test]
    fn typing_fills_the_input_buffer() {
        let mut app = App::test_shell();
        let (tx, _rx) = mpsc::channel(1);
        for c in ['h', 'i'] {
            handle_key(press(KeyCode::Char(c)), &mut app, tx.clone());
        }
        assert_eq!(app.input, "hi");

        handle_key(press(KeyCode::Backspace), &mut app, tx);
        assert_eq!(app.input, "h");
    }

    #[test]
    fn escape_asks_for_confirmation_before_quitting() {
        let mut app = App::test_shell();
        let (tx, _rx) = mpsc::channel(1);

        handle_key(press(KeyCode::Esc), &mut app, tx.clone());
        assert_eq!(app.screen, AppScreen::QuitConfirm);
        assert!(!app.should_quit);

        handle_key(press(KeyCode::Char('n')), &mut app, tx.clone());
        assert_eq!(app.screen, AppScreen::Chat);

        handle_key(press(KeyCode::Esc), &mut app, tx.clone());
        handle_key(press(KeyCode::Char('y')), &mut app, tx);
        assert!(app.should_quit);
    }
}
