use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};

use autobot_core::config::AppConfig;
use autobot_store::{JsonFileStateStore, TranscriptStore};

/// Writes the persisted transcript as the same JSON artifact `/download`
/// produces in a conversation.
pub async fn run(config: AppConfig, out: Option<PathBuf>) -> Result<()> {
    let Some(data_dir) = &config.storage.data_dir else {
        bail!(
            "no storage.data_dir is configured, so there is no persisted transcript to export"
        );
    };

    let state = JsonFileStateStore::open(data_dir.clone())
        .await
        .with_context(|| format!("could not open state directory {}", data_dir.display()))?;
    let transcript =
        TranscriptStore::load(Arc::new(state), config.assistant.transcript_cap).await;

    if transcript.is_empty() {
        bail!("the persisted transcript is empty");
    }

    let artifact = transcript.export_json().context("could not encode the transcript")?;
    match out {
        Some(path) => {
            std::fs::write(&path, artifact)
                .with_context(|| format!("could not write {}", path.display()))?;
            println!("exported {} messages to {}", transcript.len(), path.display());
        }
        None => println!("{artifact}"),
    }
    Ok(())
}
