//! Application state, configuration and dependency injection.

mod config;
mod state;

pub use self::config::{ConfigError, ServiceConfig};
pub use self::state::{ServiceState, SharedDirectory};
