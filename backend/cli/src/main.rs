mod analyze_cmd;
mod services;
mod storage_cmd;

use std::net::SocketAddr;
use std::path::PathBuf;

use accessplus_config::{defaults, Config};
use accessplus_gateway::{start_server, GatewayState, ReportPipeline};
use anyhow::{Context, Result};
use clap::{ArgGroup, Parser, Subcommand};
use tracing::info;

use analyze_cmd::ImageSource;
use services::Services;

#[derive(Parser)]
#[command(name = "accessplus")]
#[command(about = "AccessPlus: AI-verified accessibility reports")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the report HTTP server
    Serve {
        /// Port to bind the HTTP server to
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Label one image and compare it with a description
    #[command(group(ArgGroup::new("source").required(true).args(["file", "key"])))]
    Analyze {
        /// Local image file
        #[arg(long)]
        file: Option<PathBuf>,
        /// Object key in the configured bucket
        #[arg(long)]
        key: Option<String>,
        /// What the image is supposed to show
        #[arg(short, long)]
        description: String,
        /// Minimum label confidence (0-100)
        #[arg(long, default_value_t = defaults::ANALYZE_MIN_CONFIDENCE)]
        min_confidence: f32,
        /// Maximum number of labels
        #[arg(long, default_value_t = defaults::ANALYZE_MAX_LABELS)]
        max_labels: u32,
    },
    /// List object keys in the bucket
    Objects {
        #[arg(long)]
        prefix: Option<String>,
    },
    /// Print the reports manifest
    Reports,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Missing bucket or API key stops here, before anything else starts.
    let config = accessplus_config::load()?;
    accessplus_logging::init_logger(&config.log_dir, &config.log_level)
        .context("Failed to initialize logging")?;
    accessplus_config::check(&config)?;

    let snapshot = accessplus_config::redact(&serde_json::to_value(&config)?);
    info!(config = %snapshot, "Loaded configuration");

    let services = Services::connect(&config).await?;

    match cli.command {
        Commands::Serve { port } => {
            let config = Config {
                port: port.unwrap_or(config.port),
                ..config
            };
            run_server(config, services).await?;
        }
        Commands::Analyze {
            file,
            key,
            description,
            min_confidence,
            max_labels,
        } => {
            let source = match (file, key) {
                (Some(path), _) => ImageSource::File(path),
                (None, Some(key)) => ImageSource::Key(key),
                (None, None) => anyhow::bail!("Pass --file or --key"),
            };
            analyze_cmd::run(
                &config,
                &services,
                source,
                &description,
                min_confidence,
                max_labels,
            )
            .await?;
        }
        Commands::Objects { prefix } => {
            storage_cmd::list_objects(&services, prefix.as_deref()).await?;
        }
        Commands::Reports => {
            storage_cmd::print_reports(&config, &services).await?;
        }
    }

    Ok(())
}

async fn run_server(config: Config, services: Services) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.bind_address, config.port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", config.bind_address, config.port))?;

    info!(
        %addr,
        min_confidence = config.min_confidence,
        max_labels = config.max_labels,
        manifest = %config.reports_index_key,
        "Starting AccessPlus reporter"
    );

    let pipeline = ReportPipeline::new(
        services.detector(config.min_confidence, config.max_labels),
        services.comparator(&config.openai_model),
        services.images(),
        services.index(&config.reports_index_key),
    );
    let state = GatewayState::new(pipeline, config.static_dir.clone());

    start_server(addr, state).await
}
