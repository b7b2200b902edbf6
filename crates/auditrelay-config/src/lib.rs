//! Environment-derived configuration for Auditrelay.
//!
//! Everything the service reads from its environment lives here: the sink
//! endpoint (external webhook or the internally provisioned index) and the
//! listen port. Pipeline tunables live next to the pipeline itself.

mod env;
mod sink;

pub use env::{vars, Environment, EnvError};
pub use sink::SinkEndpoint;

/// Default listen port for the ingestion server.
pub const DEFAULT_PORT: u16 = 8888;

/// Resolve the listen port from `PORT`, falling back to [`DEFAULT_PORT`].
pub fn listen_port() -> Result<u16, EnvError> {
    match Environment::get(vars::PORT) {
        Some(raw) => raw.parse().map_err(|_| EnvError::InvalidValue {
            var: vars::PORT.to_string(),
            message: "expected port number".to_string(),
        }),
        None => Ok(DEFAULT_PORT),
    }
}
