use color_eyre::Result;
use genesis::cli::{parse_args, run_command, version_string, CliCommand};
use genesis::startup::ClientConfig;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let command = parse_args(std::env::args());

    // Handle --version before any initialization
    if command == CliCommand::Version {
        println!("{}", version_string());
        return Ok(());
    }

    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("genesis=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    run_command(command, ClientConfig::from_env()).await
}
