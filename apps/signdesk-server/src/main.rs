use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use api_ingress::{ApiIngress, ApiIngressConfig};
use axum::Router;
use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use modkit_db::{ConnectOpts, DbHandle};
use runtime::{AppConfig, CliArgs};
use signdesk::{SignDesk, SignDeskConfig};
use tokio_util::sync::CancellationToken;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

const MOCK_DSN: &str = "sqlite::memory:";

/// SignDesk Server - signage production jobs dashboard backend
#[derive(Parser)]
#[command(name = "signdesk-server")]
#[command(about = "SignDesk Server - signage production jobs dashboard backend")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print effective configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Use an in-memory database instead of the configured one
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
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        port: cli.port,
        print_config: cli.print_config,
        verbose: cli.verbose,
        mock: cli.mock,
    };

    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    config.apply_cli_overrides(&args);

    let logging = config.logging.clone().unwrap_or_default();
    runtime::logging::init_logging_from_config(&logging, Path::new(&config.server.home_dir));
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "SignDesk Server starting");

    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config, args).await,
        Commands::Check => check_config(&config, &args),
    }
}

/// Module sections plus the bind address, validated without touching the network.
struct Plan {
    ingress: ApiIngressConfig,
    signdesk: SignDeskConfig,
    bind_addr: String,
    dsn: String,
}

fn plan(config: &AppConfig, args: &CliArgs) -> Result<Plan> {
    let mut ingress: ApiIngressConfig = config.module_config("api_ingress")?;
    if config.server.timeout_sec > 0 {
        ingress.request_timeout_secs = config.server.timeout_sec;
    }
    let signdesk: SignDeskConfig = config.module_config("signdesk")?;

    let bind_addr = ingress.resolve_bind_addr(&config.server.host, config.server.port);
    bind_addr
        .parse::<SocketAddr>()
        .with_context(|| format!("invalid bind address '{bind_addr}'"))?;

    let dsn = if args.mock {
        MOCK_DSN.to_string()
    } else {
        let url = config.database.clone().unwrap_or_default().url;
        DbHandle::detect(url.trim()).context("unsupported database url")?;
        url.trim().to_string()
    };

    Ok(Plan {
        ingress,
        signdesk,
        bind_addr,
        dsn,
    })
}

async fn connect_db(config: &AppConfig, dsn: &str) -> Result<DbHandle> {
    let db_cfg = config.database.clone().unwrap_or_default();
    let opts = ConnectOpts {
        max_conns: db_cfg.max_conns,
        acquire_timeout: Some(Duration::from_secs(5)),
        sqlite_busy_timeout: db_cfg.busy_timeout_ms.map(|ms| Duration::from_millis(ms as u64)),
        sqlite_base_dir: Some(PathBuf::from(&config.server.home_dir)),
    };
    DbHandle::connect(dsn, opts)
        .await
        .context("failed to connect to database")
}

async fn run_server(config: AppConfig, args: CliArgs) -> Result<()> {
    let plan = plan(&config, &args)?;
    if args.mock {
        tracing::warn!("--mock: using an in-memory database, data is lost on exit");
    }

    let db = connect_db(&config, &plan.dsn).await?;
    SignDesk::migrate(&db).await?;
    let signdesk = SignDesk::from_config(&db, plan.signdesk)?;

    let ingress = ApiIngress::new(plan.ingress);
    let router = ingress.build_router(
        signdesk.register_rest(Router::new()),
        Some(signdesk.openapi()),
    )?;

    let listener = api_ingress::bind(&plan.bind_addr).await?;

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if let Err(e) = modkit::runtime::wait_for_shutdown().await {
            tracing::warn!(error = %e, "signal handler failed; shutting down");
        }
        trigger.cancel();
    });

    api_ingress::serve(listener, router, cancel).await?;
    tracing::info!("SignDesk Server stopped");
    Ok(())
}

fn check_config(config: &AppConfig, args: &CliArgs) -> Result<()> {
    tracing::info!("Checking configuration...");
    let plan = plan(config, args)?;
    tracing::info!(bind = %plan.bind_addr, "Configuration is valid");

    println!("Configuration check passed");
    println!("{}", config.to_yaml()?);
    Ok(())
}
