use configuration::{load_config, DEFAULT_CONFIG_FILE};
use std::path::PathBuf;

// This main function is the entry point when running `cargo run -p web-server`.
// Its only job is to load the configuration and call `run_server`.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let _guard = web_server::init_tracing();

    let path = std::env::var_os("CONTACTS_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    let settings = load_config(&path)?;

    web_server::run_server(settings).await
}
