use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clinica::{bootstrap, docs, routes::RouteGroups};

#[derive(Parser)]
#[command(name = "clinica", version, about = "Clinic booking API gateway")]
struct Cli {
    /// Env file to load instead of the one next to the crate
    #[arg(long, global = true)]
    env_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the HTTP API (default)
    Serve,
    /// Write the OpenAPI document and exit
    Docs {
        #[arg(long, default_value = "api.json")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    bootstrap::init_base(cli.env_file.as_deref()).await;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            // Route group implementations are registered by embedding crates.
            let app = bootstrap::init_app(RouteGroups::new()).await?;

            bootstrap::init_server(app).await
        }
        Command::Docs { output } => docs::generate_docs(&output).await,
    }
}
