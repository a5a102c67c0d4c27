pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use autobot_core::config::{AppConfig, LoadOptions, LogFormat};
use autobot_runtime::SubmissionContext;

#[derive(Debug, Parser)]
#[command(
    name = "autobot",
    about = "AutoBot conversational assistant",
    long_about = "Chat with the AutoBot lead-capture assistant, export saved transcripts, \
                  and inspect effective configuration.",
    after_help = "Examples:\n  autobot chat --path /pricing --query utm_source=ad\n  \
                  autobot export --out transcript.json\n  autobot config"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Path to an autobot.toml config file")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Start an interactive conversation in the terminal")]
    Chat {
        #[arg(
            long,
            default_value = "/",
            help = "Entry page path recorded in the submission context"
        )]
        path: String,
        #[arg(long, help = "Referrer URL recorded in the submission context")]
        referrer: Option<String>,
        #[arg(long, help = "Entry query string; utm_* parameters ride on every lead")]
        query: Option<String>,
    },
    #[command(about = "Write the persisted transcript to a file or stdout")]
    Export {
        #[arg(long, help = "Output file; stdout when omitted")]
        out: Option<PathBuf>,
    },
    #[command(about = "Print the effective configuration values")]
    Config,
}

fn init_logging(config: &AppConfig) {
    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_new(&config.logging.level)
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr);

    match config.logging.format {
        LogFormat::Compact => builder.compact().init(),
        LogFormat::Pretty => builder.pretty().init(),
        LogFormat::Json => builder.json().init(),
    }
}

pub async fn run() -> ExitCode {
    let cli = Cli::parse();

    let options = LoadOptions {
        config_path: cli.config.clone(),
        require_file: cli.config.is_some(),
        ..Default::default()
    };
    let config = match AppConfig::load(options) {
        Ok(config) => config,
        Err(error) => {
            eprintln!("configuration error: {error}");
            return ExitCode::FAILURE;
        }
    };
    init_logging(&config);

    let result = match cli.command {
        Command::Chat { path, referrer, query } => {
            let context = SubmissionContext::capture(path, referrer, query.as_deref());
            commands::chat::run(config, context).await
        }
        Command::Export { out } => commands::export::run(config, out).await,
        Command::Config => {
            println!("{}", commands::config::render(&config));
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("{error:#}");
            ExitCode::FAILURE
        }
    }
}
