//! Password connector backed by a SKAS login provider.

use std::fmt;

use async_trait::async_trait;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::client::SkClient;
use crate::error::{ConnectorError, Result};
use crate::proto::{LOGIN_META, LoginRequest, LoginResponse};
use crate::telemetry::TelemetryPort;

pub const DEFAULT_PROMPT: &str = "SKAS login";

/// Normalized identity handed back to the host.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub user_id: String,
    pub username: String,
    pub preferred_username: String,
    pub email: String,
    pub groups: Vec<String>,
}

impl From<LoginResponse> for Identity {
    fn from(response: LoginResponse) -> Self {
        Self {
            user_id: response.uid.to_string(),
            username: response.login,
            preferred_username: response
                .common_names
                .into_iter()
                .next()
                .unwrap_or_default(),
            email: response.emails.into_iter().next().unwrap_or_default(),
            groups: response.groups,
        }
    }
}

/// Scopes requested by the host's client. Not consulted by this connector.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Scopes {
    pub offline_access: bool,
    pub groups: bool,
}

/// Verdict of a login which reached the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    Valid(Identity),
    InvalidPassword,
}

impl LoginOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }

    /// Split into the host's `(identity, valid_password)` pair.
    ///
    /// A rejected password yields a default [`Identity`].
    pub fn into_parts(self) -> (Identity, bool) {
        match self {
            Self::Valid(identity) => (identity, true),
            Self::InvalidPassword => (Identity::default(), false),
        }
    }
}

/// Capabilities expected from a password-based connector.
#[async_trait]
pub trait PasswordConnector: Send + Sync {
    /// Label of the login form.
    fn prompt(&self) -> &str;

    /// Check `username` and `password`.
    ///
    /// `Ok(LoginOutcome::InvalidPassword)` means the credentials were
    /// refused, while `Err` means no verdict could be obtained.
    async fn login(
        &self,
        cancel: &CancellationToken,
        scopes: &Scopes,
        username: &str,
        password: &str,
    ) -> Result<LoginOutcome>;
}

/// Connector instance bound to an identifier.
pub struct SkasConnector<C> {
    id: String,
    prompt: String,
    client: C,
    telemetry: Box<dyn TelemetryPort>,
}

impl<C: SkClient> SkasConnector<C> {
    /// Create a new [`SkasConnector`].
    ///
    /// An empty `prompt` falls back to [`DEFAULT_PROMPT`].
    pub fn new(
        id: impl Into<String>,
        prompt: impl Into<String>,
        client: C,
        telemetry: Box<dyn TelemetryPort>,
    ) -> Self {
        Self {
            id: id.into(),
            prompt: prompt.into(),
            client,
            telemetry,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn client(&self) -> &C {
        &self.client
    }
}

impl<C: fmt::Debug> fmt::Debug for SkasConnector<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SkasConnector")
            .field("id", &self.id)
            .field("prompt", &self.prompt)
            .field("client", &self.client)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl<C: SkClient> PasswordConnector for SkasConnector<C> {
    fn prompt(&self) -> &str {
        if self.prompt.is_empty() {
            DEFAULT_PROMPT
        } else {
            &self.prompt
        }
    }

    async fn login(
        &self,
        cancel: &CancellationToken,
        _scopes: &Scopes,
        username: &str,
        password: &str,
    ) -> Result<LoginOutcome> {
        let request =
            LoginRequest::new(self.client.client_auth().clone(), username, password);

        let response: LoginResponse = match self
            .client
            .exchange(cancel, &LOGIN_META, &request, None)
            .await
        {
            Ok(response) => response,
            Err(source) => {
                let err = ConnectorError::Exchange {
                    path: LOGIN_META.url_path,
                    source,
                };
                self.telemetry.record_exchange_error(&self.id, username, &err);
                return Err(err);
            },
        };

        if !response.success {
            self.telemetry.record_login_failure(&self.id, username);
            return Ok(LoginOutcome::InvalidPassword);
        }

        let identity = Identity::from(response);
        self.telemetry.record_login_success(&self.id, &identity);
        Ok(LoginOutcome::Valid(identity))
    }
}
