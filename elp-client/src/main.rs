use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use elp_client::backend::{Backend, HttpBackend};
use elp_client::cfg;
use elp_client::media::MediaResolver;
use elp_client::model::format_duration;
use elp_client::store::CourseStore;
use elp_client::token::TokenCache;

use elp_api::api;

#[derive(Parser, Debug)]
struct Args {
    /// Path to the portal client configuration
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn default_config_path() -> PathBuf {
    "/var/lib/elp/config/config.toml".into()
}

fn init_telemetry(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_level.into());
    tracing_subscriber::registry()
        .with(filter)
        .with(JsonStorageLayer)
        .with(BunyanFormattingLayer::new("elp".into(), std::io::stdout))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = cfg::get_config(&args.config.unwrap_or_else(default_config_path))?;

    init_telemetry(config.debug);

    let backend = Arc::new(HttpBackend::new(&config.api.base_url));
    let token_cache = TokenCache::new(config.token_path.clone());
    if let Some(token) = token_cache.load().await {
        tracing::info!("Restored cached login token");
        backend.set_token(Some(token)).await;
    }

    let media = MediaResolver::new(&config.media.origin.to_string());
    let mut store = CourseStore::new(backend as Arc<dyn Backend>, media);

    store.fetch_courses(&api::courses::get::Query::default()).await;
    if let Some(error) = store.last_error() {
        anyhow::bail!("Could not load the course catalog: {error}");
    }

    println!("{} course(s) available", store.courses().len());
    for course in store.courses() {
        println!(
            "  {}: {} [{}] {}",
            course.id,
            course.title,
            course.level.label(),
            format_duration(course.total_duration),
        );
    }

    Ok(())
}
