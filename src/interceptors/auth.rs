//! Bearer-token authentication.

use tonic::service::Interceptor;
use tonic::{Request, Status};
use tracing::{debug, warn};

const AUTHORIZATION_KEY: &str = "authorization";
const TOKEN_PREFIX: &str = "Bearer ";
/// Tokens must be strictly longer than this, prefix included.
const MIN_TOKEN_LENGTH: usize = 20;
/// At most this many characters of a token ever reach the logs.
const MASK_VISIBLE_CHARS: usize = 10;

/// Static bearer-token check on the `authorization` metadata key.
///
/// Rejects with `Unauthenticated` before the handler is invoked; valid
/// calls pass through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthInterceptor;

impl AuthInterceptor {
    pub fn new() -> Self {
        Self
    }
}

impl Interceptor for AuthInterceptor {
    fn call(&mut self, request: Request<()>) -> Result<Request<()>, Status> {
        let token = match request.metadata().get(AUTHORIZATION_KEY) {
            Some(value) => value
                .to_str()
                .map_err(|_| Status::unauthenticated("invalid authorization token"))?,
            None => {
                warn!("missing authorization token");
                return Err(Status::unauthenticated("missing authorization token"));
            }
        };

        if !is_valid_token(token) {
            warn!(token = %mask_token(token), "invalid authorization token");
            return Err(Status::unauthenticated("invalid authorization token"));
        }

        debug!(token = %mask_token(token), "authentication successful");
        Ok(request)
    }
}

fn is_valid_token(token: &str) -> bool {
    token.starts_with(TOKEN_PREFIX) && token.len() > MIN_TOKEN_LENGTH
}

/// Mask a token for logging: at most the leading characters, then a
/// fixed redaction marker.
fn mask_token(token: &str) -> String {
    if token.len() > MASK_VISIBLE_CHARS {
        format!("{}***", &token[..MASK_VISIBLE_CHARS])
    } else {
        "***".to_string()
    }
}
