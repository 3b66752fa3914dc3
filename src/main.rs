use clap::{Parser, Subcommand};
use std::io::Read;
use std::sync::Arc;

use spa_origin::config::{AppState, Config, DEFAULT_CONFIG_PATH};
use spa_origin::gateway::Gateway;
use spa_origin::{logger, server};

#[derive(Parser)]
#[command(name = "spa-origin", version, about = "Serve a single-page app from an object store")]
struct Cli {
    /// Configuration file (optional; environment variables still apply)
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Clone, Copy)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Handle one proxy event read from stdin and print the response
    Invoke,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let cfg = Config::load_from(&cli.config)?;
    logger::init(&cfg);

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(cfg),
        Command::Invoke => invoke(&cli.config),
    }
}

fn serve(cfg: Config) -> Result<(), Box<dyn std::error::Error>> {
    // Worker thread count follows config, defaulting to CPU cores
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    let state = Arc::new(AppState::new(cfg));
    runtime.block_on(server::run(state, server::shutdown_signal()))
}

fn invoke(config_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let mut input = String::new();
    std::io::stdin().read_to_string(&mut input)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let output = runtime.block_on(Gateway::global(config_path).handle_json(&input))?;
    println!("{output}");
    Ok(())
}
