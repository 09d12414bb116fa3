//! rules-check - validate a base recipe rules document against a catalog fixture

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use formulation::FormulationConfig;
use rules::{validate_rules, CatalogContents, CatalogSnapshot, Rules};

/// Validate a rules document the way posting a base recipe does
#[derive(Parser, Debug, Clone)]
#[command(name = "rules-check")]
#[command(about = "Validate base recipe rules against a nomenclature catalog")]
struct Args {
    /// Rules document (JSON)
    #[arg(long, env = "RULES_FILE")]
    rules: PathBuf,

    /// Catalog fixture (JSON with `materials` and `groups`)
    #[arg(long, env = "CATALOG_FILE")]
    catalog: PathBuf,

    /// Engine configuration (YAML)
    #[arg(long, env = "FORMULATION_CONFIG")]
    config: Option<PathBuf>,

    /// Validate as posted even if the document is a draft
    #[arg(long, default_value = "false")]
    post: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = args.log_level.clone();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("formulation={log_level},rules={log_level}").into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match &args.config {
        Some(path) => {
            let yaml = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            FormulationConfig::from_yaml(&yaml).context("parsing config")?
        }
        None => FormulationConfig::default(),
    };

    let body = std::fs::read_to_string(&args.rules)
        .with_context(|| format!("reading rules {}", args.rules.display()))?;
    let mut rules = Rules::from_json(&body).context("parsing rules")?;
    if args.post {
        rules.is_posted = true;
    }

    let catalog_body = std::fs::read_to_string(&args.catalog)
        .with_context(|| format!("reading catalog {}", args.catalog.display()))?;
    let contents: CatalogContents =
        serde_json::from_str(&catalog_body).context("parsing catalog")?;
    let catalog = CatalogSnapshot::from_contents(contents);

    info!(
        rules = %args.rules.display(),
        posted = rules.is_posted,
        variants = rules.pigment_part.len(),
        "Validating rules"
    );

    match validate_rules(&rules, &catalog, &config.catalog.required_groups).await {
        Ok(()) => {
            info!("Rules accepted");
            Ok(())
        }
        Err(e) => {
            error!(
                code = e.code(),
                category = ?e.category(),
                path = e.path().unwrap_or_default(),
                "Rules rejected: {}",
                e
            );
            std::process::exit(1);
        }
    }
}
