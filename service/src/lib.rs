//! Token farm service: runs the staking engine behind a single writer.
//!
//! The service:
//! - Serialises every farm operation through one request queue
//! - Reads the block clock once per request
//! - Writes touched accounts through to durable storage
//! - Loads its configuration from TOML and installs structured logging
//! - Shuts down gracefully on SIGINT/SIGTERM or on request

pub mod config;
pub mod error;
pub mod logging;
pub mod service;
pub mod shutdown;

pub use config::FarmConfig;
pub use error::ServiceError;
pub use logging::{init_logging, LogFormat};
pub use service::{FarmHandle, FarmService, Request};
pub use shutdown::ShutdownController;
