use std::sync::Arc;

use tracing::warn;

use autobot_core::message::{Message, MessageId};

use crate::state::{StateStore, StoreError};

/// Well-known key the transcript lives under in the state seam.
pub const TRANSCRIPT_KEY: &str = "autobot.transcript";

/// Ordered, capped message log. Every mutation is persisted through the
/// state seam; if the seam fails the log keeps working in memory for the
/// session and the failure is logged once.
pub struct TranscriptStore {
    messages: Vec<Message>,
    cap: usize,
    state: Arc<dyn StateStore>,
    degraded: bool,
}

impl TranscriptStore {
    /// Loads any persisted transcript; an unreadable or absent value starts
    /// the log empty rather than failing the conversation.
    pub async fn load(state: Arc<dyn StateStore>, cap: usize) -> Self {
        let messages = match state.get(TRANSCRIPT_KEY).await {
            Ok(Some(value)) => match serde_json::from_value::<Vec<Message>>(value) {
                Ok(messages) => messages,
                Err(error) => {
                    warn!(
                        event_name = "transcript.load_discarded",
                        error = %error,
                        "persisted transcript was not decodable; starting fresh"
                    );
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(error) => {
                warn!(
                    event_name = "transcript.load_failed",
                    error = %error,
                    "state seam unavailable; transcript will not survive a reload"
                );
                Vec::new()
            }
        };

        let mut store = Self { messages, cap, state, degraded: false };
        store.enforce_cap();
        store
    }

    /// Appends and returns the assigned id. Oldest entries are evicted
    /// first once the cap is exceeded; the newest message is never dropped.
    pub async fn append(&mut self, message: Message) -> MessageId {
        let id = message.id.clone();
        self.messages.push(message);
        self.enforce_cap();
        self.persist().await;
        id
    }

    /// Rewrites a message's text, marking it edited. A missing id is a
    /// silent no-op. Sender restrictions are the dialogue layer's job, not
    /// the store's.
    pub async fn update(&mut self, id: &MessageId, text: &str) -> bool {
        let Some(message) = self.messages.iter_mut().find(|message| &message.id == id) else {
            return false;
        };
        message.apply_edit(text);
        self.persist().await;
        true
    }

    pub async fn delete(&mut self, id: &MessageId) -> bool {
        let before = self.messages.len();
        self.messages.retain(|message| &message.id != id);
        let removed = self.messages.len() != before;
        if removed {
            self.persist().await;
        }
        removed
    }

    pub async fn clear(&mut self) {
        self.messages.clear();
        self.persist().await;
    }

    pub fn list(&self) -> &[Message] {
        &self.messages
    }

    pub fn find(&self, id: &MessageId) -> Option<&Message> {
        self.messages.iter().find(|message| &message.id == id)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// The `/download` artifact: the full transcript as a JSON array of
    /// message records.
    pub fn export_json(&self) -> Result<String, StoreError> {
        Ok(serde_json::to_string_pretty(&self.messages)?)
    }

    fn enforce_cap(&mut self) {
        if self.messages.len() > self.cap {
            let excess = self.messages.len() - self.cap;
            self.messages.drain(..excess);
        }
    }

    async fn persist(&mut self) {
        let value = match serde_json::to_value(&self.messages) {
            Ok(value) => value,
            Err(error) => {
                warn!(
                    event_name = "transcript.encode_failed",
                    error = %error,
                    "transcript could not be encoded for persistence"
                );
                return;
            }
        };

        if let Err(error) = self.state.set(TRANSCRIPT_KEY, value).await {
            if !self.degraded {
                self.degraded = true;
                warn!(
                    event_name = "transcript.persist_degraded",
                    error = %error,
                    "state seam unavailable; continuing in-memory only"
                );
            }
        } else {
            self.degraded = false;
        }
    }
}
