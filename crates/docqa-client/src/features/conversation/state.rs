use chrono::{DateTime, Utc};
use docqa_core::model::{Message, Sender};

/// Lifecycle of the latest question.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DispatchState {
    #[default]
    Idle,
    Sending,
    Resolved,
    Failed,
}

impl DispatchState {
    pub fn is_sending(self) -> bool {
        matches!(self, DispatchState::Sending)
    }
}

/// Messages of the active session plus the compose state.
///
/// `messages` is server history followed by locally authored turns. Ids of
/// optimistic user messages still waiting on an answer are tracked in
/// `pending` so a history reload can keep them.
#[derive(Debug, Default, Clone)]
pub struct ConversationState {
    pub messages: Vec<Message>,
    pub input: String,
    pub typing: bool,
    pub dispatch: DispatchState,
    pending: Vec<String>,
    next_seq: u64,
}

impl ConversationState {
    /// `"{sender}-{micros}-{seq}"`, unique within this state.
    pub fn next_message_id(&mut self, sender: Sender, now: DateTime<Utc>) -> String {
        let seq = self.next_seq;
        self.next_seq = self.next_seq.wrapping_add(1);
        format!("{}-{}-{}", sender, now.timestamp_micros(), seq)
    }

    fn local_message(&mut self, sender: Sender, content: String, now: DateTime<Utc>) -> Message {
        Message {
            id: self.next_message_id(sender, now),
            content,
            sender,
            timestamp: now.to_rfc3339(),
        }
    }

    /// Appends the user's question ahead of the network call.
    pub fn begin_dispatch(&mut self, question: String, now: DateTime<Utc>) -> String {
        let message = self.local_message(Sender::User, question, now);
        let id = message.id.clone();
        self.messages.push(message);
        self.pending.push(id.clone());
        self.input.clear();
        self.typing = true;
        self.dispatch = DispatchState::Sending;
        id
    }

    pub fn resolve_dispatch(&mut self, answer: String, now: DateTime<Utc>) {
        let message = self.local_message(Sender::Assistant, answer, now);
        self.messages.push(message);
        self.pending.clear();
        self.typing = false;
        self.dispatch = DispatchState::Resolved;
    }

    /// The optimistic message stays in the list; it is no longer pending.
    pub fn fail_dispatch(&mut self) {
        self.pending.clear();
        self.typing = false;
        self.dispatch = DispatchState::Failed;
    }

    /// Replaces the list with server history, re-appending optimistic
    /// messages that are still waiting on an answer.
    pub fn replace_history(&mut self, history: Vec<Message>) {
        let pending: Vec<Message> = self
            .messages
            .drain(..)
            .filter(|m| self.pending.contains(&m.id))
            .collect();
        self.messages = history;
        self.messages.extend(pending);
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Clears everything tied to the previous session. The input buffer and
    /// id counter survive.
    pub fn reset(&mut self) {
        self.messages.clear();
        self.pending.clear();
        self.typing = false;
        self.dispatch = DispatchState::Idle;
    }
}
