use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    autobot_cli::run().await
}
