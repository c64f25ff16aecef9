use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;

use api_ingress::{shutdown::cancel_on_shutdown_signal, ApiIngress, ApiIngressConfig};
use customers::{
    api::rest::routes::register_routes,
    domain::repo::CustomersRepository,
    infra::storage::{
        connect, ensure_table_exists, BootstrapOptions, DynamoCustomersRepository,
        InMemoryCustomersRepository,
    },
    Service,
};
use runtime::{AppConfig, CliArgs};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Customer API Server - CRUD over customers stored in DynamoDB
#[derive(Parser)]
#[command(name = "customer-server")]
#[command(about = "Customer API Server - CRUD over customers stored in DynamoDB")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port for HTTP server (overrides config and PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Serve from an in-memory store instead of DynamoDB
    #[arg(long)]
    mock: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Check configuration
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let args = CliArgs {
        port: cli.port,
        print_config: cli.print_config,
        verbose: cli.verbose,
        mock: cli.mock,
    };

    let mut config = AppConfig::load(cli.config.as_deref())?;
    config.apply_cli_overrides(&args);

    let logging_config = config.logging.clone().unwrap_or_default();
    let base_dir = std::env::current_dir().context("failed to resolve working directory")?;
    runtime::logging::init_logging_from_config(&logging_config, &base_dir);
    tracing::info!("Customer API server starting");

    if args.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config, args).await,
        Commands::Check => check_config(config),
    }
}

async fn open_repository(config: &AppConfig, mock: bool) -> Result<Arc<dyn CustomersRepository>> {
    if mock {
        tracing::warn!("Running with the in-memory store (--mock); data is not persisted");
        return Ok(Arc::new(InMemoryCustomersRepository::new()));
    }

    let store = &config.store;
    tracing::info!(
        region = %store.region,
        endpoint = %store.endpoint,
        table = %store.table_name,
        "Connecting to DynamoDB"
    );
    let client = connect(&store.region, &store.endpoint)
        .await
        .context("failed to create DynamoDB client")?;

    ensure_table_exists(&client, &store.table_name, &BootstrapOptions::default())
        .await
        .with_context(|| format!("failed to ensure table '{}' exists", store.table_name))?;

    Ok(Arc::new(DynamoCustomersRepository::new(
        client,
        store.table_name.clone(),
    )))
}

async fn run_server(config: AppConfig, args: CliArgs) -> Result<()> {
    let repo = open_repository(&config, args.mock).await?;
    let service = Arc::new(Service::new(repo));

    let ingress = ApiIngress::new(ApiIngressConfig::new(config.bind_addr()));
    let router = ingress.build_router(register_routes(Router::new(), service));

    tracing::info!("Server starting on port {}", config.server.port);
    ingress.serve(router, cancel_on_shutdown_signal()).await
}

fn check_config(config: AppConfig) -> Result<()> {
    tracing::info!("Checking configuration...");

    tracing::info!("Configuration is valid");
    println!("Configuration check passed");
    println!("{}", config.to_yaml()?);

    Ok(())
}
