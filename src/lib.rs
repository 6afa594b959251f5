//! SKAS connector lets an identity federation host check passwords against a
//! SKAS login provider.
//!
//! ```no_run
//! use skas_connector::telemetry::TracingTelemetry;
//! use skas_connector::{Configuration, PasswordConnector, Scopes};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Configuration::read(None)?;
//! let connector = config.open("skas", Box::new(TracingTelemetry::new()))?;
//!
//! let outcome = connector
//!     .login(&CancellationToken::new(), &Scopes::default(), "alice", "pa55")
//!     .await?;
//! let (identity, valid) = outcome.into_parts();
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

pub mod client;
pub mod config;
pub mod connector;
pub mod error;
pub mod proto;
pub mod telemetry;

pub use client::{ExchangeOptions, HttpSkClient, SkClient};
pub use config::{ClientConfig, Configuration};
pub use connector::{
    Identity, LoginOutcome, PasswordConnector, Scopes, SkasConnector,
};
pub use error::{ClientError, ConnectorError, Result};
