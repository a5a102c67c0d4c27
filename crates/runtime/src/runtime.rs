use tracing::info;
use uuid::Uuid;

use autobot_core::commands::{self, SlashCommand};
use autobot_core::dialogue::{DialogueEngine, DialogueMode, DialogueSession, TurnEffect, TurnOutcome};
use autobot_core::message::{Message, MessageId, Sender};
use autobot_store::TranscriptStore;

use crate::context::SubmissionContext;
use crate::submit::{SubmissionOutcome, SubmissionPipeline};

/// Everything one user turn produced: the assistant messages appended to
/// the transcript, quick-reply suggestions, the `/download` artifact when
/// requested, and the submission outcome when a collection completed.
#[derive(Debug, Default)]
pub struct TurnReport {
    pub replies: Vec<Message>,
    pub suggestions: Vec<String>,
    pub export: Option<String>,
    pub submission: Option<SubmissionOutcome>,
}

/// Owns one conversation end to end: session state, durable transcript,
/// dialogue engine, and the submission pipeline. All mutation goes through
/// `&mut self`, which is what serializes turns for the session.
pub struct ChatRuntime {
    engine: DialogueEngine,
    session: DialogueSession,
    session_id: Uuid,
    transcript: TranscriptStore,
    pipeline: SubmissionPipeline,
    context: SubmissionContext,
    greeting: String,
}

const STARTER_SUGGESTIONS: &[&str] = &["Services", "Pricing", "Support"];

impl ChatRuntime {
    /// A fresh transcript is seeded with the configured greeting; a
    /// persisted one picks up where it left off.
    pub async fn start(
        engine: DialogueEngine,
        mut transcript: TranscriptStore,
        pipeline: SubmissionPipeline,
        context: SubmissionContext,
        greeting: impl Into<String>,
    ) -> Self {
        let greeting = greeting.into();
        let session_id = Uuid::new_v4();
        let resumed = !transcript.is_empty();

        if !resumed {
            transcript.append(Message::assistant(greeting.clone())).await;
        }
        info!(
            event_name = "session.started",
            session_id = %session_id,
            resumed,
            path = %context.path,
            "conversation session started"
        );

        Self {
            engine,
            session: DialogueSession::new(),
            session_id,
            transcript,
            pipeline,
            context,
            greeting,
        }
    }

    pub fn session(&self) -> &DialogueSession {
        &self.session
    }

    pub fn transcript(&self) -> &TranscriptStore {
        &self.transcript
    }

    pub fn context(&self) -> &SubmissionContext {
        &self.context
    }

    /// One user turn: append the input, short-circuit slash commands, then
    /// let the dialogue engine drive.
    pub async fn handle_input(&mut self, text: &str) -> TurnReport {
        self.transcript.append(Message::user(text)).await;

        if let Some(command) = commands::parse_command(text) {
            return self.handle_command(command).await;
        }

        let outcome = self.engine.handle_turn(&mut self.session, text);
        info!(
            event_name = "dialogue.turn_handled",
            session_id = %self.session_id,
            mode = ?self.session.mode,
            reply_count = outcome.replies.len(),
            "turn handled"
        );
        self.apply_outcome(outcome).await
    }

    /// Edits a previously sent message. Only user messages are editable;
    /// editing the latest user message while chatting re-answers it, while
    /// edits further back are a log correction only. Returns `None` when
    /// the id is missing or points at an assistant message.
    pub async fn edit_message(&mut self, id: &MessageId, text: &str) -> Option<TurnReport> {
        let target = self.transcript.find(id)?;
        if target.sender != Sender::User {
            return None;
        }

        let is_latest_user_message = self
            .transcript
            .list()
            .iter()
            .rev()
            .find(|message| message.sender == Sender::User)
            .is_some_and(|message| &message.id == id);

        self.transcript.update(id, text).await;
        info!(
            event_name = "transcript.message_edited",
            session_id = %self.session_id,
            reclassified = is_latest_user_message,
            "user message edited"
        );

        if is_latest_user_message && self.session.mode == DialogueMode::Chat {
            let outcome = self.engine.handle_turn(&mut self.session, text);
            return Some(self.apply_outcome(outcome).await);
        }
        Some(TurnReport::default())
    }

    /// Removes a message of either party. No-op (false) when absent.
    pub async fn delete_message(&mut self, id: &MessageId) -> bool {
        self.transcript.delete(id).await
    }

    async fn handle_command(&mut self, command: SlashCommand) -> TurnReport {
        match command {
            SlashCommand::Help => self.reply_with(commands::help_text()).await,
            SlashCommand::Reset => {
                self.transcript.clear().await;
                self.session.reset();
                let mut report = self.reply_with(self.greeting.clone()).await;
                report.suggestions =
                    STARTER_SUGGESTIONS.iter().map(|s| (*s).to_string()).collect();
                info!(
                    event_name = "session.reset",
                    session_id = %self.session_id,
                    "session and transcript reinitialized"
                );
                report
            }
            SlashCommand::Download => match self.transcript.export_json() {
                Ok(artifact) => {
                    let mut report = self
                        .reply_with("Here's a copy of our conversation so far.")
                        .await;
                    report.export = Some(artifact);
                    report
                }
                Err(error) => {
                    self.reply_with(format!("I couldn't put the export together: {error}"))
                        .await
                }
            },
            SlashCommand::Unknown(verb) => {
                self.reply_with(commands::unknown_command_reply(&verb)).await
            }
        }
    }

    async fn reply_with(&mut self, text: impl Into<String>) -> TurnReport {
        let message = Message::assistant(text);
        self.transcript.append(message.clone()).await;
        TurnReport { replies: vec![message], ..TurnReport::default() }
    }

    async fn apply_outcome(&mut self, outcome: TurnOutcome) -> TurnReport {
        let mut report = TurnReport {
            suggestions: outcome.suggestions,
            ..TurnReport::default()
        };

        for reply in outcome.replies {
            let message = Message::assistant(reply);
            self.transcript.append(message.clone()).await;
            report.replies.push(message);
        }

        if let Some(TurnEffect::SubmitLead { kind, fields }) = outcome.effect {
            let snapshot = self.transcript.list().to_vec();
            let outcome =
                self.pipeline.submit(kind, fields, &self.context, snapshot).await;

            if matches!(outcome, SubmissionOutcome::Accepted { .. }) {
                // Only a confirmed delivery clears the collected values;
                // a failure leaves them available for follow-up.
                self.session.clear_collected();
            }

            let message = Message::assistant(outcome.user_message());
            self.transcript.append(message.clone()).await;
            report.replies.push(message);
            report.submission = Some(outcome);
        }

        report
    }
}
