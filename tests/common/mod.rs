//! Shared helpers for spinning up the relay against a mock upstream.

use std::{net::SocketAddr, sync::Arc, time::Duration};

use gag_stock::{api, config::UpstreamConfig, upstream, Metrics, StockCache};

/// Serve `app` on an ephemeral local port.
pub fn spawn(app: axum::Router) -> SocketAddr {
    let server = axum::Server::bind(&SocketAddr::from(([127, 0, 0, 1], 0)))
        .serve(app.into_make_service());
    let addr = server.local_addr();

    tokio::spawn(async move {
        server.await.unwrap();
    });

    addr
}

/// Start the relay in front of `upstream_addr` and return its address.
pub fn start_relay(upstream_addr: SocketAddr, timeout: Duration) -> SocketAddr {
    let config = UpstreamConfig {
        url: format!("http://{upstream_addr}/api/ws/stocks.getAll"),
        timeout_secs: timeout.as_secs(),
    };

    let registry = prometheus::Registry::new();
    let metrics = Metrics::new(&registry).unwrap();
    let client = upstream::Client::new(&config).unwrap();
    let cache = Arc::new(StockCache::new(client, Duration::from_secs(30), metrics));

    spawn(api::router(cache, registry))
}

pub async fn get_stock(relay: SocketAddr) -> (u16, serde_json::Value) {
    let resp = reqwest::get(format!("http://{relay}/api/stock/GetStock"))
        .await
        .unwrap();
    let status = resp.status().as_u16();
    let body = resp.json().await.unwrap();

    (status, body)
}

#[allow(dead_code)]
pub fn payload() -> serde_json::Value {
    serde_json::json!([{
        "result": {
            "data": {
                "json": {
                    "gear": [{ "name": "Wrench", "value": 3 }],
                    "egg": [{ "name": "Common Egg", "value": 1, "image": "https://img/egg.png", "emoji": "🥚" }],
                    "lastSeen": {
                        "Seeds": [{ "name": "Carrot", "seen": "2024-01-01T00:00:00Z" }],
                        "Weather": [{ "name": "Rain", "seen": "not-a-date" }],
                    }
                }
            }
        }
    }])
}
