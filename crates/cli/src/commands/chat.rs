use std::io::Write;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};

use autobot_core::config::AppConfig;
use autobot_runtime::{bootstrap_with_config, SubmissionContext, TurnReport};

pub async fn run(config: AppConfig, context: SubmissionContext) -> Result<()> {
    let typing_delay = Duration::from_millis(config.assistant.typing_delay_ms);
    let mut app = bootstrap_with_config(config, context)
        .await
        .context("could not start the assistant")?;

    // Replay whatever is already on screen-worth of transcript: the seeded
    // greeting on a fresh session, history on a resumed one.
    for message in app.runtime.transcript().list() {
        print_message(&message.sender, &message.text);
    }
    println!("(type /help for commands, Ctrl-D to leave)");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        prompt()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let report = app.runtime.handle_input(input).await;

        // One pending reply slot per session: the scheduler provides the
        // typing pause, and joining it before the next read keeps user
        // input queued behind the reply instead of racing it.
        let rendered = render_report(&report);
        app.scheduler
            .schedule(typing_delay, async move {
                for line in rendered {
                    println!("{line}");
                }
            })
            .await;
        app.scheduler.join_pending().await;

        if let Some(artifact) = report.export {
            let path = "autobot-transcript.json";
            std::fs::write(path, artifact)
                .with_context(|| format!("could not write {path}"))?;
            println!("(transcript saved to {path})");
        }
    }

    println!();
    Ok(())
}

fn render_report(report: &TurnReport) -> Vec<String> {
    let mut lines: Vec<String> =
        report.replies.iter().map(|message| format!("autobot> {}", message.text)).collect();
    if !report.suggestions.is_empty() {
        lines.push(format!("        [{}]", report.suggestions.join(" | ")));
    }
    lines
}

fn print_message(sender: &autobot_core::message::Sender, text: &str) {
    match sender {
        autobot_core::message::Sender::Assistant => println!("autobot> {text}"),
        autobot_core::message::Sender::User => println!("you> {text}"),
    }
}

fn prompt() -> Result<()> {
    print!("you> ");
    std::io::stdout().flush().context("stdout unavailable")?;
    Ok(())
}
