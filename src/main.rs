use std::net::SocketAddr;

use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use masgan_storefront::{config::Config, routes, AppState};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "masgan_storefront=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env();
    tracing::info!(
        road_tolerance_factor = config.road_tolerance_factor,
        fee_rounding_increment = config.fee_rounding_increment,
        "Starting storefront at {}",
        config.server_addr()
    );

    let state = AppState::new(config.clone()).expect("Invalid shipping configuration");
    tracing::info!(branches = state.calculator.branches().len(), "Branches loaded");

    let app = routes::create_app(state).expect("Failed to build router");

    let addr: SocketAddr = config.server_addr().parse().expect("Invalid address");
    let listener = TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("Failed to start server");
}
