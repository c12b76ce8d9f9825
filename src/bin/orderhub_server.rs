//! orderhub-server: Order service host
//!
//! Serves `OrderService` plus the gRPC health service over TCP, wrapped
//! in the logging and authentication middleware. Shuts down on SIGINT,
//! stopping the update scheduler on the way out.

use std::sync::Arc;

use tonic::transport::Server;
use tonic_health::server::health_reporter;
use tower::ServiceBuilder;
use tracing::{error, info};

use orderhub::config::Config;
use orderhub::interceptors::{grpc_logging_layer, AuthInterceptor};
use orderhub::proto::order_service_server::OrderServiceServer;
use orderhub::scheduler::UpdateScheduler;
use orderhub::services::OrderCoreService;
use orderhub::store::MemoryOrderStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    orderhub::utils::bootstrap::init_tracing();

    let config_path = orderhub::utils::bootstrap::parse_config_path();
    let config = Config::load(config_path.as_deref()).map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    info!("Starting orderhub server");

    let store = Arc::new(MemoryOrderStore::new());
    let scheduler = Arc::new(UpdateScheduler::new());
    let service = OrderCoreService::new(store, scheduler.clone(), config.tracking.tick());

    let (mut health_reporter, health_service) = health_reporter();
    health_reporter
        .set_service_status("", tonic_health::ServingStatus::Serving)
        .await;

    // Logging outermost so it observes the whole chain, auth rejections
    // included.
    let middleware = ServiceBuilder::new()
        .layer(grpc_logging_layer())
        .layer(tonic::service::interceptor::interceptor(
            AuthInterceptor::new(),
        ))
        .into_inner();

    let addr = config.server.addr().parse()?;
    info!(address = %addr, "Server listening");

    Server::builder()
        .layer(middleware)
        .add_service(health_service)
        .add_service(OrderServiceServer::new(service))
        .serve_with_shutdown(addr, async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    scheduler.shutdown();
    info!("Server shut down");
    Ok(())
}
