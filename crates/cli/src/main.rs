use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    itinera_cli::run().await
}
