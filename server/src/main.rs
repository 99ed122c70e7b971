use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use directory_server::{AppConfig, AppState, ServeConfig, route_table, serve};
use platform_obs::{ObsConfig, init_tracing};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "directory-server", version, about = "Employee directory API")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP server.
    Serve(ServeCommand),
    /// Print the route table for the configured namespace.
    Routes,
}

#[derive(Args, Debug)]
struct ServeCommand {
    #[arg(long, default_value = "127.0.0.1")]
    host: std::net::IpAddr,
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

impl From<ServeCommand> for ServeConfig {
    fn from(value: ServeCommand) -> Self {
        ServeConfig::new(value.host, value.port)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing(ObsConfig::default())?;
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    match cli.command {
        Command::Serve(cmd) => run_server(cmd, config).await,
        Command::Routes => {
            for (verb, path) in route_table(&config) {
                println!("{verb:<7}{path}");
            }
            Ok(())
        }
    }
}

async fn run_server(cmd: ServeCommand, config: AppConfig) -> Result<()> {
    let state = AppState::new(&config)?;
    info!(
        strategy = ?config.id_strategy,
        seeded = config.seed_demo_data,
        latency_ms = config.network.latency.as_millis() as u64,
        failure_rate = config.network.failure_rate,
        "directory state initialized"
    );
    serve(cmd.into(), state).await
}
