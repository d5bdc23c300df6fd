use crate::config::Config;
use crate::constants::{INIT_FAILURE_TEXT, MISSING_KEY_TEXT, WELCOME_TEXT};
use crate::conversation::{Conversation, MessageId};
use crate::errors::FailureCategory;
use crate::gemini::{ChatSession, StreamEvent};
use crate::log_view::LogView;
use crate::status_indicator::StatusIndicator;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppScreen {
    Chat,
    SetupError,
    QuitConfirm,
}

/// Discrete events driving the session: terminal input, the redraw tick,
/// and the fold's stream progress.
#[derive(Debug)]
pub enum AppEvent {
    Input(crossterm::event::Event),
    Tick,
    StreamFragment(MessageId, String),
    StreamDone(MessageId),
    StreamError(MessageId, String),
}

pub struct App {
    pub screen: AppScreen,
    pub conversation: Conversation,
    pub session: Option<Arc<Mutex<ChatSession>>>,
    pub setup_error: Option<String>,
    pub input: String,
    pub scroll: u16,
    pub stick_to_bottom: bool,
    pub is_streaming: bool,
    pub should_quit: bool,
    pub status_indicator: StatusIndicator,
    pub logs: LogView,
}

impl App {
    /// Builds the session state. A missing credential or a failed client
    /// construction lands on the permanent setup-error screen with zero
    /// messages seeded; no network call is ever attempted from there.
    pub fn new() -> App {
        let mut app = App {
            screen: AppScreen::Chat,
            conversation: Conversation::new(),
            session: None,
            setup_error: None,
            input: String::new(),
            scroll: 0,
            stick_to_bottom: true,
            is_streaming: false,
            should_quit: false,
            status_indicator: StatusIndicator::new(),
            logs: LogView::new(),
        };

        let config = match Config::from_env() {
            Ok(config) => config,
            Err(e) => {
                log::error!("configuration error: {}", e);
                app.enter_setup_error(MISSING_KEY_TEXT.to_string());
                return app;
            }
        };

        match ChatSession::new(&config) {
            Ok(session) => {
                app.session = Some(Arc::new(Mutex::new(session)));
                app.conversation.seed_welcome(WELCOME_TEXT);
                app.logs.add("session ready");
            }
            Err(e) => {
                log::error!("session init failed: {}", e);
                app.enter_setup_error(format!("{}\n\n({})", INIT_FAILURE_TEXT, e));
            }
        }

        app
    }

    fn enter_setup_error(&mut self, text: String) {
        self.screen = AppScreen::SetupError;
        self.setup_error = Some(text);
    }

    /// Submits the input buffer: appends the user message, opens the reply
    /// placeholder, and spawns the fold task. No-op while a fold is in
    /// flight, when the trimmed input is empty, or without a session.
    pub fn submit(&mut self, events: mpsc::Sender<AppEvent>) {
        let Some(session) = self.session.clone() else {
            return;
        };
        let Some((text, pending)) = self.begin_exchange() else {
            return;
        };

        log::info!("submitting message ({} chars)", text.len());
        self.logs.add(format!("sending message ({} chars)", text.len()));
        self.status_indicator.set_thinking(true);
        self.status_indicator.set_status("Contacting Fei...");

        tokio::spawn(run_fold(session, text, pending, events));
    }

    /// The state-transition half of submission, separated from the network
    /// half so it can be driven directly in tests. Returns the trimmed text
    /// and the placeholder's id, or `None` when the submission is rejected.
    pub fn begin_exchange(&mut self) -> Option<(String, MessageId)> {
        let text = self.input.trim().to_string();
        if text.is_empty() || self.is_streaming {
            return None;
        }

        self.input.clear();
        self.conversation.push_user(&text);
        let pending = self.conversation.open_reply();
        self.is_streaming = true;
        self.stick_to_bottom = true;

        Some((text, pending))
    }

    pub fn on_stream_fragment(&mut self, id: MessageId, fragment: &str) {
        self.conversation.append_fragment(id, fragment);
        self.stick_to_bottom = true;
        self.status_indicator.set_status("Streaming reply...");
    }

    pub fn on_stream_done(&mut self, id: MessageId) {
        self.conversation.complete(id);
        self.finish_fold();
        self.logs.add("reply complete");
    }

    pub fn on_stream_error(&mut self, id: MessageId, failure: &str) {
        let category = FailureCategory::classify(failure);
        log::error!("exchange failed ({:?}): {}", category, failure);
        self.conversation.fail(id, category.fallback_text());
        self.finish_fold();
        self.logs.add(format!("exchange failed: {}", failure));
    }

    fn finish_fold(&mut self) {
        self.is_streaming = false;
        self.stick_to_bottom = true;
        self.status_indicator.set_thinking(false);
        self.status_indicator.clear_status();
    }

    pub fn scroll_up(&mut self) {
        self.stick_to_bottom = false;
        self.scroll = self.scroll.saturating_sub(1);
    }

    pub fn scroll_down(&mut self) {
        self.scroll = self.scroll.saturating_add(1);
    }

    /// Bare chat-screen app with no session, for driving state transitions
    /// in tests without touching the environment or the network.
    #[cfg(test)]
    pub(crate) fn test_shell() -> App {
        App {
            screen: AppScreen::Chat,
            conversation: Conversation::new(),
            session: None,
            setup_error: None,
            input: String::new(),
            scroll: 0,
            stick_to_bottom: true,
            is_streaming: false,
            should_quit: false,
            status_indicator: StatusIndicator::new(),
            logs: LogView::new(),
        }
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

/// The fold task: opens the stream, forwards each fragment as its own event,
/// and finishes with exactly one of `StreamDone`/`StreamError`. Runs to
/// completion once started; there is no cancellation path.
async fn run_fold(
    session: Arc<Mutex<ChatSession>>,
    text: String,
    pending: MessageId,
    events: mpsc::Sender<AppEvent>,
) {
    let opened = { session.lock().await.send_message_stream(&text).await };

    let mut rx = match opened {
        Ok(rx) => rx,
        Err(e) => {
            session.lock().await.discard_last_turn();
            let _ = events
                .send(AppEvent::StreamError(pending, e.to_string()))
                .await;
            return;
        }
    };

    let mut full_reply = String::new();
    while let Some(event) = rx.recv().await {
        match event {
            StreamEvent::Fragment(fragment) => {
                full_reply.push_str(&fragment);
                if events
                    .send(AppEvent::StreamFragment(pending, fragment))
                    .await
                    .is_err()
                {
                    return;
                }
            }
            StreamEvent::Done => break,
            StreamEvent::Error(failure) => {
                session.lock().await.discard_last_turn();
                let _ = events.send(AppEvent::StreamError(pending, failure)).await;
                return;
            }
        }
    }

    session.lock().await.record_reply(&full_reply);
    let _ = events.send(AppEvent::StreamDone(pending)).await;
}
