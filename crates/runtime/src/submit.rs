use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use autobot_core::dialogue::LeadKind;
use autobot_core::message::Message;

use crate::context::SubmissionContext;

/// The wire document POSTed to the submission endpoint.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadSubmission {
    pub kind: LeadKind,
    pub fields: BTreeMap<String, String>,
    pub context: SubmissionContext,
    pub transcript_snapshot: Vec<Message>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("submission endpoint returned status {0}")]
    Status(u16),
    #[error("submission transport failure: {0}")]
    Transport(String),
    #[error("no submission endpoint is configured")]
    NotConfigured,
}

/// The submission seam. Success means a 2xx-equivalent result; everything
/// else, timeouts included, is a failure the pipeline reports to the user.
#[async_trait::async_trait]
pub trait LeadTransport: Send + Sync {
    async fn deliver(&self, lead: &LeadSubmission) -> Result<(), TransportError>;
}

pub struct HttpLeadTransport {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpLeadTransport {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| TransportError::Transport(error.to_string()))?;
        Ok(Self { client, endpoint: endpoint.into() })
    }
}

#[async_trait::async_trait]
impl LeadTransport for HttpLeadTransport {
    async fn deliver(&self, lead: &LeadSubmission) -> Result<(), TransportError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(lead)
            .send()
            .await
            .map_err(|error| TransportError::Transport(error.to_string()))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(TransportError::Status(response.status().as_u16()))
        }
    }
}

/// Transport used when no endpoint is configured. It refuses delivery so
/// the retained-data path is taken instead of losing the lead silently.
#[derive(Default)]
pub struct NoopLeadTransport;

#[async_trait::async_trait]
impl LeadTransport for NoopLeadTransport {
    async fn deliver(&self, _lead: &LeadSubmission) -> Result<(), TransportError> {
        Err(TransportError::NotConfigured)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmissionOutcome {
    Accepted {
        kind: LeadKind,
    },
    /// Delivery failed; the validated fields ride along so callers can
    /// retry or hand them to a human channel. They are never discarded.
    Failed {
        kind: LeadKind,
        fields: Vec<(String, String)>,
    },
    /// A second submission was requested while one was outstanding.
    AlreadyInFlight,
}

impl SubmissionOutcome {
    pub fn user_message(&self) -> String {
        match self {
            Self::Accepted { kind: LeadKind::Quote } => {
                "All sent! Our team will email you a tailored quote within one business day."
                    .to_owned()
            }
            Self::Accepted { kind: LeadKind::Support } => {
                "Your support request is in. An engineer will reach out shortly - keep an \
                 eye on your inbox."
                    .to_owned()
            }
            Self::Failed { .. } => {
                "I couldn't reach our system just now, but your details are saved - a \
                 member of our team will follow up with you by email."
                    .to_owned()
            }
            Self::AlreadyInFlight => {
                "One moment - I'm still sending your previous request.".to_owned()
            }
        }
    }
}

/// Serializes collected fields plus session context into a lead and hands
/// it to the transport, guarding against concurrent duplicates with a
/// single in-flight flag. Appending to the transcript is never blocked by
/// an outstanding submission; only a second submission is.
pub struct SubmissionPipeline {
    transport: Arc<dyn LeadTransport>,
    in_flight: AtomicBool,
}

impl SubmissionPipeline {
    pub fn new(transport: Arc<dyn LeadTransport>) -> Self {
        Self { transport, in_flight: AtomicBool::new(false) }
    }

    pub async fn submit(
        &self,
        kind: LeadKind,
        fields: Vec<(String, String)>,
        context: &SubmissionContext,
        transcript_snapshot: Vec<Message>,
    ) -> SubmissionOutcome {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            warn!(
                event_name = "submission.duplicate_rejected",
                kind = kind.as_str(),
                "submission requested while another is outstanding"
            );
            return SubmissionOutcome::AlreadyInFlight;
        }

        let lead = LeadSubmission {
            kind,
            fields: fields.iter().cloned().collect(),
            context: context.clone(),
            transcript_snapshot,
            created_at: Utc::now(),
        };

        let result = self.transport.deliver(&lead).await;
        self.in_flight.store(false, Ordering::SeqCst);

        match result {
            Ok(()) => {
                info!(
                    event_name = "submission.accepted",
                    kind = kind.as_str(),
                    field_count = lead.fields.len(),
                    "lead delivered"
                );
                SubmissionOutcome::Accepted { kind }
            }
            Err(error) => {
                warn!(
                    event_name = "submission.failed",
                    kind = kind.as_str(),
                    error = %error,
                    "lead delivery failed; fields retained"
                );
                SubmissionOutcome::Failed { kind, fields }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use autobot_core::dialogue::LeadKind;
    use tokio::sync::Mutex;

    use super::{
        LeadSubmission, LeadTransport, NoopLeadTransport, SubmissionOutcome, SubmissionPipeline,
        TransportError,
    };
    use crate::context::SubmissionContext;

    #[derive(Default)]
    struct RecordingTransport {
        delivered: Mutex<Vec<LeadSubmission>>,
    }

    #[async_trait::async_trait]
    impl LeadTransport for RecordingTransport {
        async fn deliver(&self, lead: &LeadSubmission) -> Result<(), TransportError> {
            self.delivered.lock().await.push(lead.clone());
            Ok(())
        }
    }

    /// Blocks until released so tests can hold a submission in flight.
    struct StallingTransport {
        calls: AtomicUsize,
        release: tokio::sync::Notify,
    }

    #[async_trait::async_trait]
    impl LeadTransport for StallingTransport {
        async fn deliver(&self, _lead: &LeadSubmission) -> Result<(), TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.release.notified().await;
            Ok(())
        }
    }

    fn fields() -> Vec<(String, String)> {
        vec![
            ("name".to_owned(), "Ada".to_owned()),
            ("email".to_owned(), "ada@engine.works".to_owned()),
        ]
    }

    #[tokio::test]
    async fn accepted_submission_carries_context_and_fields() {
        let transport = Arc::new(RecordingTransport::default());
        let pipeline = SubmissionPipeline::new(transport.clone());
        let context = SubmissionContext::capture("/pricing", None, Some("utm_source=ad"));

        let outcome =
            pipeline.submit(LeadKind::Quote, fields(), &context, Vec::new()).await;

        assert_eq!(outcome, SubmissionOutcome::Accepted { kind: LeadKind::Quote });
        let delivered = transport.delivered.lock().await;
        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0].context, context);
        assert_eq!(delivered[0].fields.get("name").map(String::as_str), Some("Ada"));
    }

    #[tokio::test]
    async fn failed_submission_retains_the_fields() {
        let pipeline = SubmissionPipeline::new(Arc::new(NoopLeadTransport));
        let context = SubmissionContext::default();

        let outcome =
            pipeline.submit(LeadKind::Support, fields(), &context, Vec::new()).await;

        match outcome {
            SubmissionOutcome::Failed { kind, fields: retained } => {
                assert_eq!(kind, LeadKind::Support);
                assert_eq!(retained, fields());
            }
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn second_submission_is_rejected_while_one_is_in_flight() {
        let transport = Arc::new(StallingTransport {
            calls: AtomicUsize::new(0),
            release: tokio::sync::Notify::new(),
        });
        let pipeline = Arc::new(SubmissionPipeline::new(transport.clone()));
        let context = SubmissionContext::default();

        let first = {
            let pipeline = pipeline.clone();
            let context = context.clone();
            tokio::spawn(async move {
                pipeline.submit(LeadKind::Quote, fields(), &context, Vec::new()).await
            })
        };

        // Wait for the first call to reach the transport.
        while transport.calls.load(Ordering::SeqCst) == 0 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        let second = pipeline.submit(LeadKind::Quote, fields(), &context, Vec::new()).await;
        assert_eq!(second, SubmissionOutcome::AlreadyInFlight);

        transport.release.notify_one();
        let first = first.await.expect("join");
        assert_eq!(first, SubmissionOutcome::Accepted { kind: LeadKind::Quote });
        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn pipeline_is_usable_again_after_a_failure() {
        let pipeline = SubmissionPipeline::new(Arc::new(NoopLeadTransport));
        let context = SubmissionContext::default();

        let first = pipeline.submit(LeadKind::Quote, fields(), &context, Vec::new()).await;
        let second = pipeline.submit(LeadKind::Quote, fields(), &context, Vec::new()).await;

        assert!(matches!(first, SubmissionOutcome::Failed { .. }));
        assert!(matches!(second, SubmissionOutcome::Failed { .. }));
    }
}
