use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use kubevision::{
    build_router,
    services::{open_store, ContextResolver, KubeClientFactory, KubeResourceClient, ResourceClient},
    AppState, Config,
};

/// Kube Vision - web dashboard backend for Kubernetes clusters
#[derive(Parser, Debug)]
#[command(name = "kubevision")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server
    Serve(ServeArgs),
    /// Print the version
    Version,
}

#[derive(clap::Args, Debug)]
struct ServeArgs {
    /// Run serve with specified port
    #[arg(short, long)]
    port: Option<u16>,

    /// Run serve with develop mode
    #[arg(long)]
    develop: bool,

    /// Show debug message
    #[arg(short, long)]
    debug: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Command::Serve(args) => {
            let config = Config::load().context("Failed to load configuration")?;
            init_tracing(&config, args.debug || args.develop);

            let mut runtime = tokio::runtime::Builder::new_multi_thread();
            if let Some(workers) = config.workers {
                runtime.worker_threads(workers);
            }
            runtime
                .enable_all()
                .build()
                .context("Failed to build tokio runtime")?
                .block_on(serve(config, args))
        }
    }
}

fn init_tracing(config: &Config, debug: bool) {
    let level = if debug { "debug" } else { config.log_level.as_str() };
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(true)
        .init();
}

async fn serve(config: Config, args: ServeArgs) -> Result<()> {
    info!("🚀 Starting kubevision server...");

    let store = open_store(&config.database_url)
        .await
        .context(format!("Failed to open cluster store at {}", config.database_url))?;
    info!("✅ Cluster store ready");

    // Requests without a selected cluster use the local kubeconfig
    let default_client: Option<Arc<dyn ResourceClient>> =
        match KubeResourceClient::from_kubeconfig(config.kube_context.as_deref()).await {
            Ok(client) => {
                info!("✅ Default cluster client configured");
                Some(Arc::new(client))
            }
            Err(e) => {
                warn!("⚠️ No default cluster client: {:#}", e);
                None
            }
        };

    let resolver = ContextResolver::new(store.clone(), Arc::new(KubeClientFactory), default_client);
    let app_state = AppState {
        config: config.clone(),
        store,
        resolver: Arc::new(resolver),
    };

    let app = build_router(app_state);

    let address = config.bind_address(args.port);
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .context(format!("Failed to bind to {}", address))?;
    info!("🌐 Server listening on {}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("✅ Server stopped gracefully");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
