use autobot_core::config::{AppConfig, LogFormat};

/// Renders the effective configuration after defaults, file, environment,
/// and flag overrides have been applied.
pub fn render(config: &AppConfig) -> String {
    let mut lines = Vec::new();

    lines.push("[assistant]".to_owned());
    lines.push(format!("greeting = {:?}", config.assistant.greeting));
    lines.push(format!("typing_delay_ms = {}", config.assistant.typing_delay_ms));
    lines.push(format!("transcript_cap = {}", config.assistant.transcript_cap));

    lines.push(String::new());
    lines.push("[submission]".to_owned());
    lines.push(format!(
        "endpoint = {}",
        config
            .submission
            .endpoint
            .as_deref()
            .map(|value| format!("{value:?}"))
            .unwrap_or_else(|| "(unset - leads take the retained-data path)".to_owned())
    ));
    lines.push(format!("timeout_secs = {}", config.submission.timeout_secs));

    lines.push(String::new());
    lines.push("[storage]".to_owned());
    lines.push(format!(
        "data_dir = {}",
        config
            .storage
            .data_dir
            .as_deref()
            .map(|value| format!("{:?}", value.display().to_string()))
            .unwrap_or_else(|| "(unset - transcript is in-memory only)".to_owned())
    ));

    lines.push(String::new());
    lines.push("[logging]".to_owned());
    lines.push(format!("level = {:?}", config.logging.level));
    let format = match config.logging.format {
        LogFormat::Compact => "compact",
        LogFormat::Pretty => "pretty",
        LogFormat::Json => "json",
    };
    lines.push(format!("format = {format:?}"));

    lines.join("\n")
}
