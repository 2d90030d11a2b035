mod shell;

use std::sync::Arc;

use ams_client::{
    storage::FileStorage, ClientConfig, Context, Navigator, Notifier, SessionStore,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const CONFIG_PATH: &str = "./data/config.toml";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = ClientConfig::load(CONFIG_PATH)?;
    info!("using backend at {}", config.api_url);

    let storage = Arc::new(FileStorage::new(&config.storage_path));
    let cx = Context::new(&config, storage, Navigator::default())?;
    let session = SessionStore::new(cx);

    // Views stay in the loading state until the persisted session is verified.
    session.initialize().await;

    shell::Shell::new(session, Notifier::new()).run().await
}
