//! Cross-cutting call middleware.
//!
//! Applied to every inbound call regardless of shape: the logging layer
//! wraps the authentication interceptor, which wraps the handlers. Either
//! stage can short-circuit before the handler runs.

pub mod auth;
pub mod logging;

pub use auth::AuthInterceptor;
pub use logging::grpc_logging_layer;
