//! LDS test server — a disposable server for Local Discovery Server setups.
//!
//! Takes its application URI, application name, capability list, port and
//! DI namespace switch from command-line flags, publishes them through a
//! [`ServerRuntime`], marks itself fully operational and runs until
//! interrupted.
//!
//! parse ([`config`]) → capabilities ([`capabilities`]) → bootstrap ([`bootstrap`])

pub mod bootstrap;
pub mod capabilities;
pub mod config;
pub mod error;
pub mod runtime;

pub use bootstrap::{BootstrapStep, Bootstrapper, ServerGuard, ServerState, launch};
pub use capabilities::CapabilityList;
pub use config::{ServerArgs, parse_args};
pub use error::{ErrorKind, Result, TestServerError};
pub use runtime::http::{HttpRuntime, HttpServer};
pub use runtime::service_level::{ServiceBand, ServiceLevel};
pub use runtime::{LocalizedText, NodeId, RuntimeConfig, RuntimeError, ServerRuntime, Variant};
