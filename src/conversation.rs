use chrono::{DateTime, Local};
use uuid::Uuid;

/// Origin tag of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Bot,
    SystemError,
}

/// Opaque per-conversation message identifier. Assigned at creation, never
/// reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageId(Uuid);

impl MessageId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// One entry in the conversation.
#[derive(Debug, Clone)]
pub struct Message {
    pub id: MessageId,
    pub text: String,
    pub sender: Sender,
    pub timestamp: DateTime<Local>,
}

impl Message {
    fn new(text: impl Into<String>, sender: Sender) -> Self {
        Self {
            id: MessageId::new(),
            text: text.into(),
            sender,
            timestamp: Local::now(),
        }
    }
}

/// Ordered message sequence owned by the UI session.
///
/// Append-only, with one exception: while a reply streams in, the single
/// most recent bot message grows as fragments arrive, or is converted in
/// place to an error bubble if the stream fails. No other message is ever
/// mutated after creation.
#[derive(Debug, Default)]
pub struct Conversation {
    messages: Vec<Message>,
    in_progress: Option<MessageId>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// True while a reply is being folded in.
    pub fn is_folding(&self) -> bool {
        self.in_progress.is_some()
    }

    /// True while the in-flight reply has not received its first fragment.
    /// Drives the typing indicator.
    pub fn awaiting_first_fragment(&self) -> bool {
        self.in_progress_message()
            .map(|msg| msg.text.is_empty())
            .unwrap_or(false)
    }

    fn in_progress_message(&self) -> Option<&Message> {
        let id = self.in_progress?;
        self.messages.iter().find(|msg| msg.id == id)
    }

    /// Seeds the single welcome message shown when the session opens.
    pub fn seed_welcome(&mut self, text: &str) {
        self.messages.push(Message::new(text, Sender::Bot));
    }

    pub fn push_user(&mut self, text: &str) -> MessageId {
        let message = Message::new(text, Sender::User);
        let id = message.id;
        self.messages.push(message);
        id
    }

    /// Appends the empty placeholder bot message and marks it in progress.
    /// Callers gate submission, so at most one reply is ever open.
    pub fn open_reply(&mut self) -> MessageId {
        debug_assert!(self.in_progress.is_none(), "a reply is already open");
        let message = Message::new("", Sender::Bot);
        let id = message.id;
        self.messages.push(message);
        self.in_progress = Some(id);
        id
    }

    /// Appends one streamed fragment to the open reply. Fragments arrive in
    /// order and are concatenated append-only; anything addressed to a
    /// message that is not the open reply is dropped.
    pub fn append_fragment(&mut self, id: MessageId, fragment: &str) {
        if self.in_progress != Some(id) {
            return;
        }
        if let Some(message) = self.messages.iter_mut().find(|msg| msg.id == id) {
            message.text.push_str(fragment);
        }
    }

    /// Closes the open reply on normal stream exhaustion. The message is
    /// frozen from here on.
    pub fn complete(&mut self, id: MessageId) {
        if self.in_progress == Some(id) {
            self.in_progress = None;
        }
    }

    /// Converts the open reply in place to an error bubble carrying the
    /// category-matched fallback text. No partial fragment remains under the
    /// bot sender.
    pub fn fail(&mut self, id: MessageId, fallback_text: &str) {
        if self.in_progress != Some(id) {
            return;
        }
        if let Some(message) = self.messages.iter_mut().find(|msg| msg.id == id) {
            message.text = fallback_text.to_string();
            message.sender = Sender::SystemError;
        }
        self.in_progress = None;
    }
}
