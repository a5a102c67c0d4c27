//! End-to-end conversation runs against an in-memory seam and a recording
//! transport: the quote happy path, the degraded submission path, slash
//! commands, and transcript editing.

use std::sync::Arc;

use tokio::sync::Mutex;

use autobot_core::dialogue::{DialogueEngine, DialogueMode, LeadKind};
use autobot_core::message::Sender;
use autobot_runtime::{
    ChatRuntime, LeadSubmission, LeadTransport, SubmissionContext, SubmissionOutcome,
    SubmissionPipeline, TransportError,
};
use autobot_store::{InMemoryStateStore, TranscriptStore};

#[derive(Default)]
struct RecordingTransport {
    delivered: Mutex<Vec<LeadSubmission>>,
    fail: bool,
}

#[async_trait::async_trait]
impl LeadTransport for RecordingTransport {
    async fn deliver(&self, lead: &LeadSubmission) -> Result<(), TransportError> {
        if self.fail {
            return Err(TransportError::Transport("connection refused".to_owned()));
        }
        self.delivered.lock().await.push(lead.clone());
        Ok(())
    }
}

async fn runtime_with(transport: Arc<RecordingTransport>) -> ChatRuntime {
    let transcript =
        TranscriptStore::load(Arc::new(InMemoryStateStore::default()), 300).await;
    ChatRuntime::start(
        DialogueEngine::new(),
        transcript,
        SubmissionPipeline::new(transport),
        SubmissionContext::capture("/pricing", Some("https://ads.example".to_owned()), Some("utm_source=ad&utm_campaign=fall")),
        "Hi! I'm AutoBot.",
    )
    .await
}

#[tokio::test]
async fn quote_happy_path_submits_one_lead_with_context() {
    let transport = Arc::new(RecordingTransport::default());
    let mut runtime = runtime_with(transport.clone()).await;

    runtime.handle_input("how much do you charge?").await;
    runtime.handle_input("yes").await;
    runtime.handle_input("Ada Lovelace").await;
    runtime.handle_input("ada@engine.works").await;
    runtime.handle_input("Analytical Engines Ltd").await;
    let report = runtime.handle_input("42").await;

    assert_eq!(
        report.submission,
        Some(SubmissionOutcome::Accepted { kind: LeadKind::Quote })
    );

    let delivered = transport.delivered.lock().await;
    assert_eq!(delivered.len(), 1);
    let lead = &delivered[0];
    assert_eq!(lead.kind, LeadKind::Quote);
    assert_eq!(lead.fields.get("email").map(String::as_str), Some("ada@engine.works"));
    assert_eq!(lead.fields.get("user_count").map(String::as_str), Some("42"));
    assert_eq!(lead.context.path, "/pricing");
    assert_eq!(lead.context.utm.get("utm_source").map(String::as_str), Some("ad"));
    assert!(!lead.transcript_snapshot.is_empty());

    // Confirmed delivery clears the session's collected values.
    assert!(runtime.session().collected.is_empty());
    assert_eq!(runtime.session().mode, DialogueMode::Chat);
}

#[tokio::test]
async fn failed_submission_reports_retained_data_and_keeps_fields() {
    let transport = Arc::new(RecordingTransport { fail: true, ..Default::default() });
    let mut runtime = runtime_with(transport).await;

    runtime.handle_input("I need support, everything is broken").await;
    runtime.handle_input("yes").await;
    runtime.handle_input("Grace").await;
    runtime.handle_input("grace@navy.mil").await;
    let report = runtime.handle_input("The mail server rejects every login").await;

    let Some(SubmissionOutcome::Failed { kind, fields }) = &report.submission else {
        panic!("expected a failed submission, got {:?}", report.submission);
    };
    assert_eq!(*kind, LeadKind::Support);
    assert_eq!(fields.len(), 3);

    // Exactly one user-visible failure message, and the session still holds
    // the values for a human follow-up.
    let failure_messages = report
        .replies
        .iter()
        .filter(|message| message.text.contains("details are saved"))
        .count();
    assert_eq!(failure_messages, 1);
    assert_eq!(runtime.session().collected.len(), 3);
}

#[tokio::test]
async fn reset_returns_to_a_single_greeting_from_any_state() {
    let mut runtime = runtime_with(Arc::new(RecordingTransport::default())).await;

    runtime.handle_input("pricing").await;
    runtime.handle_input("yes").await;
    runtime.handle_input("Ada").await;
    assert!(!runtime.session().collected.is_empty());

    let report = runtime.handle_input("/reset").await;

    assert_eq!(runtime.session().mode, DialogueMode::Chat);
    assert!(runtime.session().collected.is_empty());
    assert!(runtime.session().consent_granted);
    // The transcript holds exactly the fresh greeting.
    assert_eq!(runtime.transcript().len(), 1);
    assert_eq!(runtime.transcript().list()[0].sender, Sender::Assistant);
    assert!(!report.suggestions.is_empty());
}

#[tokio::test]
async fn commands_bypass_the_classifier_entirely() {
    let mut runtime = runtime_with(Arc::new(RecordingTransport::default())).await;

    // "/help pricing" must not enter the quote gate.
    let report = runtime.handle_input("/help pricing").await;
    assert_eq!(runtime.session().mode, DialogueMode::Chat);
    assert!(report.replies[0].text.contains("/reset"));

    let report = runtime.handle_input("/teleport").await;
    assert_eq!(runtime.session().mode, DialogueMode::Chat);
    assert!(report.replies[0].text.contains("/teleport"));
    assert!(report.submission.is_none());
}

#[tokio::test]
async fn download_returns_the_transcript_artifact() {
    let mut runtime = runtime_with(Arc::new(RecordingTransport::default())).await;
    runtime.handle_input("hello").await;

    let report = runtime.handle_input("/download").await;

    let artifact = report.export.expect("artifact present");
    let parsed: Vec<autobot_core::message::Message> =
        serde_json::from_str(&artifact).expect("artifact is a message array");
    // Greeting, "hello", its reply, and the /download command itself.
    assert_eq!(parsed.len(), 4);
}

#[tokio::test]
async fn editing_the_latest_user_message_reanswers_it() {
    let mut runtime = runtime_with(Arc::new(RecordingTransport::default())).await;

    runtime.handle_input("what are your hours").await;
    let latest_user_id = runtime
        .transcript()
        .list()
        .iter()
        .rev()
        .find(|message| message.sender == Sender::User)
        .expect("user message present")
        .id
        .clone();

    let report = runtime
        .edit_message(&latest_user_id, "what services do you offer")
        .await
        .expect("edit accepted");

    assert!(!report.replies.is_empty());
    assert!(report.replies[0].text.contains("monitoring"));
    let edited = runtime.transcript().find(&latest_user_id).expect("still present");
    assert!(edited.edited);
}

#[tokio::test]
async fn assistant_messages_are_not_editable() {
    let mut runtime = runtime_with(Arc::new(RecordingTransport::default())).await;
    let greeting_id = runtime.transcript().list()[0].id.clone();

    assert!(runtime.edit_message(&greeting_id, "hacked").await.is_none());
    assert_eq!(runtime.transcript().list()[0].text, "Hi! I'm AutoBot.");
}

#[tokio::test]
async fn deleting_any_message_shrinks_the_log() {
    let mut runtime = runtime_with(Arc::new(RecordingTransport::default())).await;
    runtime.handle_input("hello").await;

    let before = runtime.transcript().len();
    let first_id = runtime.transcript().list()[0].id.clone();

    assert!(runtime.delete_message(&first_id).await);
    assert_eq!(runtime.transcript().len(), before - 1);
    assert!(!runtime.delete_message(&first_id).await);
}

#[tokio::test]
async fn transcript_persists_across_runtime_restarts() {
    let seam = Arc::new(InMemoryStateStore::default());

    {
        let transcript = TranscriptStore::load(seam.clone(), 300).await;
        let mut runtime = ChatRuntime::start(
            DialogueEngine::new(),
            transcript,
            SubmissionPipeline::new(Arc::new(RecordingTransport::default())),
            SubmissionContext::default(),
            "Hi! I'm AutoBot.",
        )
        .await;
        runtime.handle_input("hello").await;
    }

    let transcript = TranscriptStore::load(seam, 300).await;
    let runtime = ChatRuntime::start(
        DialogueEngine::new(),
        transcript,
        SubmissionPipeline::new(Arc::new(RecordingTransport::default())),
        SubmissionContext::default(),
        "Hi! I'm AutoBot.",
    )
    .await;

    // Greeting + "hello" + reply survived; no second greeting was seeded.
    assert_eq!(runtime.transcript().len(), 3);
    assert_eq!(runtime.transcript().list()[1].text, "hello");
}
