/* demos/axum.rs */

use axum::{Router, extract::ConnectInfo, response::Json, routing::get};
use edgeip::{Classifier, RangeRegistry, ResolvedIdentity, TrustLayer};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let app = match create_app() {
        Ok(app) => app,
        Err(err) => {
            eprintln!("Invalid range configuration: {}", err);
            return;
        }
    };
    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();

    println!("Server starting on http://localhost:3000");
    println!("Test endpoints:");
    println!("  • GET /ip            - Classified identity (default Cloudflare ranges)");
    println!("  • GET /local/ip      - Classified identity, loopback treated as the edge");
    println!("  • GET /ranges        - Ranges used by /local");
    println!();
    println!("Test with headers:");
    println!("  curl -H 'CF-Ray: 1' -H 'CF-Connecting-IP: 203.0.113.42' http://localhost:3000/local/ip");
    println!("  curl -H 'Client-IP: 198.51.100.1' http://localhost:3000/ip");
    println!();

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .unwrap();
}

fn create_app() -> edgeip::Result<Router> {
    let default_router = Router::new()
        .route("/ip", get(ip_handler))
        .layer(TrustLayer::default());

    // Pretend local connections come from the edge so the demo is testable with curl.
    let mut registry = RangeRegistry::new();
    registry.add("127.0.0.0/8")?;
    let local = Arc::new(Classifier::new().with_registry(registry));

    let ranges: Vec<String> = local
        .registry()
        .entries()
        .iter()
        .map(|range| range.to_string())
        .collect();

    let local_router = Router::new()
        .route("/ip", get(ip_handler))
        .layer(TrustLayer::with_classifier(local));

    Ok(Router::new()
        .merge(default_router)
        .nest("/local", local_router)
        .route("/ranges", get(move || async move { Json(json!({ "ranges": ranges })) })))
}

/// Handler that returns the classified identity in JSON format
async fn ip_handler(
    identity: ResolvedIdentity,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
) -> Json<serde_json::Value> {
    Json(json!({
        "reported_address": identity.reported_address,
        "is_trusted": identity.is_trusted,
        "peer_address": identity.peer_address,
        "connecting_ip": identity.connecting_ip,
        "connection": {
            "remote_addr": addr.to_string(),
            "remote_port": addr.port(),
        },
    }))
}
