use json_matchers::config::MatcherConfig;
use json_matchers::server::MatchServer;
use json_matchers::store::SchemaStore;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // stdout carries protocol responses; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let config = match MatcherConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("configuration error: {e}");
            std::process::exit(1);
        }
    };

    let store = match SchemaStore::open(&config.schema_root) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("cannot load schemas: {e}");
            std::process::exit(1);
        }
    };

    let server = MatchServer::new(config, store);
    if let Err(e) = server.run().await {
        tracing::error!("fatal error: {e}");
        std::process::exit(1);
    }
}
