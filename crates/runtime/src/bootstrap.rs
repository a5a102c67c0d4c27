use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::info;

use autobot_core::config::{AppConfig, ConfigError, LoadOptions};
use autobot_core::dialogue::DialogueEngine;
use autobot_store::{InMemoryStateStore, JsonFileStateStore, StateStore, StoreError, TranscriptStore};

use crate::context::SubmissionContext;
use crate::runtime::ChatRuntime;
use crate::scheduler::ReplyScheduler;
use crate::submit::{HttpLeadTransport, LeadTransport, NoopLeadTransport, SubmissionPipeline, TransportError};

pub struct Application {
    pub config: AppConfig,
    pub runtime: ChatRuntime,
    pub scheduler: ReplyScheduler,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("state storage could not be opened: {0}")]
    Storage(#[from] StoreError),
    #[error("submission transport could not be built: {0}")]
    Transport(#[from] TransportError),
}

/// Wires config, storage, transport, and the dialogue engine into a ready
/// conversation. Absent optional pieces degrade rather than fail: no data
/// dir means an in-memory transcript, no endpoint means submissions take
/// the retained-data path.
pub async fn bootstrap(
    options: LoadOptions,
    context: SubmissionContext,
) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config, context).await
}

pub async fn bootstrap_with_config(
    config: AppConfig,
    context: SubmissionContext,
) -> Result<Application, BootstrapError> {
    let state: Arc<dyn StateStore> = match &config.storage.data_dir {
        Some(dir) => {
            let store = JsonFileStateStore::open(dir.clone()).await?;
            info!(
                event_name = "bootstrap.storage_ready",
                data_dir = %dir.display(),
                "durable state directory opened"
            );
            Arc::new(store)
        }
        None => {
            info!(
                event_name = "bootstrap.storage_in_memory",
                "no data dir configured; transcript will not survive a restart"
            );
            Arc::new(InMemoryStateStore::default())
        }
    };

    let transport: Arc<dyn LeadTransport> = match &config.submission.endpoint {
        Some(endpoint) => Arc::new(HttpLeadTransport::new(
            endpoint.clone(),
            Duration::from_secs(config.submission.timeout_secs),
        )?),
        None => Arc::new(NoopLeadTransport),
    };

    let transcript = TranscriptStore::load(state, config.assistant.transcript_cap).await;
    let runtime = ChatRuntime::start(
        DialogueEngine::new(),
        transcript,
        SubmissionPipeline::new(transport),
        context,
        config.assistant.greeting.clone(),
    )
    .await;

    info!(event_name = "bootstrap.complete", "application ready");
    Ok(Application { config, runtime, scheduler: ReplyScheduler::new() })
}
