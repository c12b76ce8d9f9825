//! gRPC service implementations.

pub mod order;

pub use order::OrderCoreService;
