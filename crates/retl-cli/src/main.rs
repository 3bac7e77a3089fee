use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use retl_algolia_loader::AlgoliaLoaderFactory;
use retl_api::{AppState, ApiServer};
use retl_catalog::{Catalog, CatalogBackend, FileCatalog, InMemoryConfigStore, PgCatalog};
use retl_config::{AppConfig, CatalogBackendKind};
use retl_core::{run_extractor, run_loader, Registry, RuntimeEnv};
use retl_launcher::{ImageSet, KubernetesScheduler, Launcher};
use retl_postgres_extractor::PostgresExtractorFactory;
use retl_postgres_loader::PostgresLoaderFactory;
use retl_snowflake_extractor::SnowflakeExtractorFactory;
use retl_transport::{BrokerConfig, KafkaTransport};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "retl")]
#[command(about = "Reverse-ETL pipeline platform", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the control plane API
    Serve {
        /// Path to configuration directory
        #[arg(short, long, default_value = "config")]
        config_dir: String,
    },

    /// Run a source unit: read the configured source once and publish every row
    Extract {
        #[arg(long, env = "RETL_LOG_LEVEL", default_value = "info")]
        log_level: String,

        #[arg(long, env = "RETL_LOG_JSON")]
        json_logs: bool,
    },

    /// Run a destination unit: consume the shared log and upsert every document
    Load {
        #[arg(long, env = "RETL_LOG_LEVEL", default_value = "info")]
        log_level: String,

        #[arg(long, env = "RETL_LOG_JSON")]
        json_logs: bool,
    },

    /// Print the effective configuration and the registered adapters
    Validate {
        /// Path to configuration directory
        #[arg(short, long, default_value = "config")]
        config_dir: String,
    },
}

/// `RUST_LOG` wins over the configured level
fn init_tracing(level: &str, json: bool) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let registry = tracing_subscriber::registry().with(env_filter);

    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

fn adapter_registry() -> Registry {
    let mut registry = Registry::new();

    // Sources
    registry.register_extractor(Arc::new(PostgresExtractorFactory));
    registry.register_extractor(Arc::new(SnowflakeExtractorFactory));

    // Destinations
    registry.register_loader(Arc::new(AlgoliaLoaderFactory));
    registry.register_loader(Arc::new(PostgresLoaderFactory));

    registry
}

async fn catalog_backend(config: &AppConfig) -> anyhow::Result<Arc<dyn CatalogBackend>> {
    match config.catalog.backend {
        CatalogBackendKind::Postgres => {
            let url = config
                .catalog
                .database_url
                .as_deref()
                .ok_or_else(|| anyhow!("catalog.database_url is required by the postgres backend"))?;
            info!("Using PostgreSQL catalog");

            let store = PgCatalog::new(url).await?;
            store.ensure_schema().await?;
            info!("Connected to PostgreSQL catalog");
            Ok(Arc::new(store))
        }
        CatalogBackendKind::File => {
            info!(
                "Using file catalog in {}",
                config.catalog.storage_dir.display()
            );
            Ok(Arc::new(FileCatalog::load(&config.catalog.storage_dir)?))
        }
    }
}

async fn serve(config_dir: &str) -> anyhow::Result<()> {
    let app_config = AppConfig::load(config_dir)?;
    init_tracing(&app_config.logging.level, app_config.logging.json);
    info!("Starting control plane with config directory: {}", config_dir);

    let backend = catalog_backend(&app_config).await?;
    let catalog = Catalog::new(backend, Arc::new(InMemoryConfigStore::new()));

    let scheduler = KubernetesScheduler::try_default(app_config.launcher.namespace.clone())
        .await
        .context("Failed to create Kubernetes client")?;
    info!("Submitting execution units to namespace {}", scheduler.namespace());

    let launcher = Launcher::new(
        Arc::new(scheduler),
        ImageSet {
            source: app_config.launcher.source_image.clone(),
            destination: app_config.launcher.destination_image.clone(),
        },
    );

    let api = app_config.api.clone();
    let server = ApiServer::new(
        api.host.clone(),
        api.port,
        api.cors_enabled,
        AppState::new(catalog, launcher),
    );
    info!("API server available at http://{}:{}", api.host, api.port);

    tokio::select! {
        res = server.run() => {
            if let Err(e) = res {
                error!("API server error: {}", e);
                return Err(e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutting down control plane...");
        }
    }

    Ok(())
}

async fn extract() -> anyhow::Result<()> {
    let env = RuntimeEnv::from_process();
    let registry = adapter_registry();
    let transport = KafkaTransport::connect(BrokerConfig::from_env(&env)?)?;

    let stats = run_extractor(&env, &registry, &transport).await?;
    info!("Extraction finished: {} row(s) published", stats.processed);
    Ok(())
}

async fn load() -> anyhow::Result<()> {
    let env = RuntimeEnv::from_process();
    let registry = adapter_registry();
    let transport = KafkaTransport::connect(BrokerConfig::from_env(&env)?)?;

    tokio::select! {
        res = run_loader(&env, &registry, &transport) => {
            let stats = res?;
            info!(
                "Loader stopped: {} written, {} skipped, {} failed",
                stats.written, stats.skipped, stats.failed
            );
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Loader interrupted");
        }
    }
    Ok(())
}

fn validate(config_dir: &str) -> anyhow::Result<()> {
    let app_config = AppConfig::load(config_dir)?;
    let registry = adapter_registry();

    println!("Configuration is valid\n");
    println!("{}", serde_yaml::to_string(&app_config)?);
    println!("Sources: {}", registry.list_extractors().join(", "));
    println!("Destinations: {}", registry.list_loaders().join(", "));
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { config_dir } => serve(&config_dir).await?,
        Commands::Extract {
            log_level,
            json_logs,
        } => {
            init_tracing(&log_level, json_logs);
            extract().await?
        }
        Commands::Load {
            log_level,
            json_logs,
        } => {
            init_tracing(&log_level, json_logs);
            load().await?
        }
        Commands::Validate { config_dir } => validate(&config_dir)?,
    }

    Ok(())
}
