use serde::{Deserialize, Serialize};

/// Which guided-collection flow a confirmation gate leads into. Threaded
/// from the originating intent transition all the way into the submitted
/// lead, never hard-coded downstream.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadKind {
    Quote,
    Support,
}

impl LeadKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Quote => "quote",
            Self::Support => "support",
        }
    }
}

/// Conversation mode as an explicit sum type: a session that is collecting
/// always knows which flow it is collecting for and which field is active,
/// so "collecting but no target recorded" is unrepresentable.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DialogueMode {
    Chat,
    ConfirmationGate { kind: LeadKind },
    Collecting { kind: LeadKind, field_index: usize },
}

/// Per-conversation state. Exactly one session exists per conversation;
/// `/reset` is the only hard reinitialization and there is no terminal mode.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogueSession {
    pub mode: DialogueMode,
    /// Validated values in field declaration order.
    pub collected: Vec<(String, String)>,
    pub consent_granted: bool,
}

impl DialogueSession {
    pub fn new() -> Self {
        Self {
            mode: DialogueMode::Chat,
            collected: Vec::new(),
            // Consent is assumed on a fresh session; nothing in the flow
            // prompts for it, so `/reset` restores it too.
            consent_granted: true,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn clear_collected(&mut self) {
        self.collected.clear();
    }
}

impl Default for DialogueSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Side effect requested by a turn, carried out by the runtime layer. The
/// engine itself stays pure.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TurnEffect {
    SubmitLead { kind: LeadKind, fields: Vec<(String, String)> },
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TurnOutcome {
    pub replies: Vec<String>,
    pub suggestions: Vec<String>,
    pub effect: Option<TurnEffect>,
}

impl TurnOutcome {
    pub(crate) fn reply(text: impl Into<String>) -> Self {
        Self { replies: vec![text.into()], ..Self::default() }
    }
}
