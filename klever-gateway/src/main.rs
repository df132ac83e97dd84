use actix_web::{web, App, HttpServer};
use klever_gateway::{api, config::Config, gateway::Gateway, relay::HttpRelay};
use std::sync::Arc;
use tracing::info;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::EnvFilter;

/// Application entry point
///
/// This is the main function that:
/// 1. Sets up logging
/// 2. Loads configuration
/// 3. Builds the node relay and endpoint resolver
/// 4. Creates the gateway service
/// 5. Starts the HTTP server with all endpoints
#[actix_web::main] // Actix will build a multithreaded runtime
async fn main() -> eyre::Result<()> {
    // Debug level for our service comes from RUST_LOG; dependencies stay quiet
    let filter = EnvFilter::from_default_env()
        .add_directive("klever_gateway=info".parse()?)
        .add_directive("actix_web=error".parse()?)
        .add_directive("hyper=warn".parse()?)
        .add_directive("reqwest=warn".parse()?);

    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = Config::from_env()?;
    let resolver = config.endpoint_resolver()?;
    let relay = HttpRelay::new()?;

    info!(
        "Starting gateway on {}:{} (default network: {})",
        config.host,
        config.port,
        resolver.default_network()
    );

    // Shared between workers; the gateway itself holds no per-request state
    let gateway = Arc::new(Gateway::new(
        Arc::new(relay),
        resolver,
        config.fee_schedule(),
    ));

    HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .app_data(web::Data::new(gateway.clone()))
            .configure(api::configure)
    })
    .workers(config.workers)
    .bind((config.host.as_str(), config.port))?
    .run()
    .await?;

    Ok(())
}
