use std::{net::SocketAddr, sync::Arc};

use gag_stock::{api, upstream, Config, Metrics, StockCache};

const CONFIG_PATH: &str = "config.yaml";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let subscriber = tracing_subscriber::fmt().with_ansi(false).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    tracing::info!("Starting");

    let config = Config::load_or_default(CONFIG_PATH)?;
    tracing::info!(?config, "Loaded Config");

    let registry = prometheus::Registry::new();
    let metrics = Metrics::new(&registry)?;

    let client = upstream::Client::new(&config.upstream)?;
    let cache = Arc::new(StockCache::new(client, config.cache.ttl(), metrics));

    let app = api::router(cache, registry);
    let addr: SocketAddr = config.bind_address.parse()?;

    runtime.block_on(async move {
        let server = axum::Server::try_bind(&addr)?.serve(app.into_make_service());

        tracing::info!(address = %server.local_addr(), "Listening");
        server.with_graceful_shutdown(shutdown_signal()).await?;

        tracing::info!("Stopped");
        Ok::<_, Box<dyn std::error::Error>>(())
    })
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received"),
        Err(e) => {
            tracing::error!("Installing Ctrl+C handler {:?}", e);
            std::future::pending::<()>().await;
        }
    }
}
