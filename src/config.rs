//! Configuration manager for the SKAS connector.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::client::HttpSkClient;
use crate::connector::SkasConnector;
use crate::error::ConnectorError;
use crate::proto::ClientAuth;
use crate::telemetry::TelemetryPort;

pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";

/// Errors that may occur during the configuration loading process.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("unable to open configuration file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to deserialize configuration: {0}")]
    Deserialize(#[from] serde_yaml::Error),
}

/// Connector settings, as found under the host's `config` entry.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Configuration {
    /// Label displayed above the login form.
    #[serde(default)]
    pub login_prompt: String,
    /// Related to the SKAS login provider.
    pub login_provider: ClientConfig,
}

/// SKAS login provider configuration.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    /// Base URL of the provider. Scheme defaults to `https`.
    #[validate(length(min = 1, message = "login provider URL is required"))]
    pub url: String,
    /// PEM file holding the CA which signed the provider certificate.
    #[serde(default)]
    pub root_ca_path: Option<PathBuf>,
    /// Same as `root_ca_path`, base64 encoded inline.
    #[serde(default)]
    pub root_ca_data: Option<String>,
    #[serde(default)]
    pub insecure_skip_verify: bool,
    /// Credentials of this connector on the provider.
    #[serde(default)]
    pub client_auth: ClientAuth,
}

impl Configuration {
    /// Reads the configuration file from the specified path or the default
    /// location.
    pub fn read(path: Option<&Path>) -> Result<Self, Error> {
        let path = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_PATH));
        let file = File::open(path)?;
        Ok(serde_yaml::from_reader(file)?)
    }

    /// Build a [`SkasConnector`] bound to `id`.
    pub fn open(
        &self,
        id: &str,
        telemetry: Box<dyn TelemetryPort>,
    ) -> Result<SkasConnector<HttpSkClient>, ConnectorError> {
        telemetry.record_open(
            id,
            &self.login_provider.url,
            &self.login_provider.client_auth.id,
        );

        let client = HttpSkClient::new(&self.login_provider)
            .map_err(ConnectorError::Configuration)?;

        Ok(SkasConnector::new(id, &self.login_prompt, client, telemetry))
    }
}

impl FromStr for Configuration {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(serde_yaml::from_str(s)?)
    }
}
