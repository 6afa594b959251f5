//! Telemetry logic.
//! Support logging and metrics of connector events.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::connector::Identity;
use crate::error::ConnectorError;

/// Port for observability of connector events.
pub trait TelemetryPort: Send + Sync {
    /// Record the opening of a connector.
    fn record_open(&self, connector: &str, url: &str, client_id: &str);

    /// Record a successful login.
    fn record_login_success(&self, connector: &str, identity: &Identity);

    /// Record credentials rejected by the provider.
    fn record_login_failure(&self, connector: &str, username: &str);

    /// Record an exchange which did not reach a verdict.
    fn record_exchange_error(
        &self,
        connector: &str,
        username: &str,
        error: &ConnectorError,
    );
}

/// Tracing-based telemetry adapter.
#[derive(Debug, Default)]
pub struct TracingTelemetry;

impl TracingTelemetry {
    /// Create a new [`TracingTelemetry`].
    pub fn new() -> Self {
        Self
    }
}

impl TelemetryPort for TracingTelemetry {
    fn record_open(&self, connector: &str, url: &str, client_id: &str) {
        tracing::info!(connector, url, client_id, "SKAS connector opened");
    }

    fn record_login_success(&self, connector: &str, identity: &Identity) {
        metrics::counter!("skas_login_total", "outcome" => "success").increment(1);
        tracing::info!(
            connector,
            username = %identity.username,
            preferred_username = %identity.preferred_username,
            email = %identity.email,
            groups = ?identity.groups,
            "login successful"
        );
    }

    fn record_login_failure(&self, connector: &str, username: &str) {
        metrics::counter!("skas_login_total", "outcome" => "failure").increment(1);
        tracing::info!(connector, username, "login failed");
    }

    fn record_exchange_error(
        &self,
        connector: &str,
        username: &str,
        error: &ConnectorError,
    ) {
        metrics::counter!("skas_login_total", "outcome" => "error").increment(1);
        tracing::warn!(connector, username, %error, "login exchange failed");
    }
}

/// Install a global subscriber writing to stderr.
///
/// Filter is read from `RUST_LOG`, defaulting to `info`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[cfg(test)]
pub(crate) mod capture {
    use std::sync::{Arc, Mutex};

    use super::TelemetryPort;
    use crate::connector::Identity;
    use crate::error::ConnectorError;

    /// Keep a trace of every event.
    #[derive(Clone, Default)]
    pub(crate) struct CapturingTelemetry(Arc<Mutex<Vec<String>>>);

    impl CapturingTelemetry {
        pub(crate) fn events(&self) -> Vec<String> {
            self.0.lock().unwrap().clone()
        }
    }

    impl TelemetryPort for CapturingTelemetry {
        fn record_open(&self, connector: &str, url: &str, client_id: &str) {
            self.0
                .lock()
                .unwrap()
                .push(format!("open {connector} {url} {client_id}"));
        }

        fn record_login_success(&self, connector: &str, identity: &Identity) {
            self.0.lock().unwrap().push(format!(
                "success {connector} {} {} {} {:?}",
                identity.username,
                identity.preferred_username,
                identity.email,
                identity.groups
            ));
        }

        fn record_login_failure(&self, connector: &str, username: &str) {
            self.0
                .lock()
                .unwrap()
                .push(format!("failure {connector} {username}"));
        }

        fn record_exchange_error(
            &self,
            connector: &str,
            username: &str,
            _error: &ConnectorError,
        ) {
            self.0
                .lock()
                .unwrap()
                .push(format!("error {connector} {username}"));
        }
    }
}
