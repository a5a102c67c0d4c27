/// Out-of-band slash commands. These are recognized before the intent
/// classifier ever sees the text; commands and conversational intents never
/// compete.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SlashCommand {
    Help,
    Reset,
    Download,
    Unknown(String),
}

/// Returns `None` for ordinary conversational text. Any input whose first
/// non-whitespace character is `/` is a command, known or not.
pub fn parse_command(input: &str) -> Option<SlashCommand> {
    let rest = input.trim().strip_prefix('/')?;
    let verb = rest.split_whitespace().next().unwrap_or_default().to_ascii_lowercase();

    Some(match verb.as_str() {
        "help" => SlashCommand::Help,
        "reset" => SlashCommand::Reset,
        "download" => SlashCommand::Download,
        _ => SlashCommand::Unknown(verb),
    })
}

pub fn help_text() -> &'static str {
    "Here's what I can do:\n\
     - Ask about our services, hours, or pricing in plain words\n\
     - /help shows this message\n\
     - /reset starts the conversation over\n\
     - /download saves a copy of this conversation"
}

pub fn unknown_command_reply(verb: &str) -> String {
    format!("I don't know the command `/{verb}`. Try `/help` for the list.")
}
