use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use asset_gate::config::{self, AppState, Config};
use asset_gate::gateway::{self, GatewayEvent};
use asset_gate::{logger, server};
use clap::{Parser, Subcommand};

/// Static asset gateway
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Config file path (extension optional)
    #[arg(short, long, default_value = config::DEFAULT_CONFIG_PATH, value_hint = clap::ValueHint::FilePath)]
    config: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve assets over HTTP (default)
    Serve,

    /// Resolve one gateway proxy event and print the proxy response as JSON
    Invoke {
        /// Event JSON file, or "-" for stdin
        #[arg(value_hint = clap::ValueHint::FilePath)]
        event: PathBuf,
    },

    /// Print the effective configuration as TOML
    Config,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let cfg = Config::load_from(&cli.config)?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Config => {
            print!("{}", cfg.to_toml()?);
            Ok(())
        }
        Command::Invoke { event } => run_invoke(cfg, &event),
        Command::Serve => run_serve(cfg),
    }
}

fn run_invoke(cfg: Config, event_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let raw = if event_path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(event_path)?
    };
    let event: GatewayEvent = serde_json::from_str(&raw)?;
    let resolver = cfg.build_resolver()?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let response = runtime.block_on(gateway::invoke(
        &resolver,
        cfg.http.base_path.as_deref(),
        &event,
    ));

    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

fn run_serve(cfg: Config) -> Result<(), Box<dyn std::error::Error>> {
    logger::init(&cfg)?;

    // Tokio runtime sized by the workers setting
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let state = Arc::new(AppState::new(cfg)?);
    let listener = server::create_reusable_listener(addr)?;

    logger::log_server_start(&listener.local_addr()?, &state.config);

    let shutdown = server::ShutdownSignal::new();
    server::start_signal_handler(Arc::clone(&shutdown))?;

    // Use LocalSet for spawn_local support
    let local = tokio::task::LocalSet::new();
    local
        .run_until(server::start_server_loop(listener, state, shutdown))
        .await;

    logger::log_info("Server stopped");
    Ok(())
}
