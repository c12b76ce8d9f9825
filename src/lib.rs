//! orderhub - Order-processing gRPC service
//!
//! One `OrderService` exposing the four gRPC call shapes (unary,
//! server-streaming, client-streaming, bidirectional) over a shared
//! in-process order store, wrapped by authentication and logging
//! middleware.

pub mod config;
pub mod interceptors;
pub mod scheduler;
pub mod services;
pub mod status;
pub mod store;
pub mod utils;
pub mod validation;

pub mod proto {
    tonic::include_proto!("orderhub");
}
