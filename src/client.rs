//! Client of the SKAS login provider.
//!
//! Connection setup, transport security and serialization live here. The
//! connector only hands typed payloads to [`SkClient::exchange`].

use std::time::{Duration, Instant};

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::{Certificate, Client, RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use url::Url;
use validator::Validate;

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::proto::{ClientAuth, RequestMeta};

type Result<T> = std::result::Result<T, ClientError>;

/// Per-exchange overrides.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExchangeOptions {
    /// Replace the client timeout for this exchange only.
    pub timeout: Option<Duration>,
}

/// Request/response exchange with a SKAS provider.
#[async_trait]
pub trait SkClient: Send + Sync {
    /// Credentials of this client, to embed in requests.
    fn client_auth(&self) -> &ClientAuth;

    /// Send `request` to the endpoint described by `meta` and decode the
    /// answer.
    ///
    /// Fails with [`ClientError::Cancelled`] once `cancel` fires.
    async fn exchange<Req, Resp>(
        &self,
        cancel: &CancellationToken,
        meta: &RequestMeta,
        request: &Req,
        options: Option<&ExchangeOptions>,
    ) -> Result<Resp>
    where
        Req: Serialize + Sync,
        Resp: DeserializeOwned + Send;
}

/// HTTP(S) client of a SKAS provider.
#[derive(Debug, Clone)]
pub struct HttpSkClient {
    http: Client,
    base_url: String,
    client_auth: ClientAuth,
}

impl HttpSkClient {
    /// Create a new [`HttpSkClient`].
    pub fn new(config: &ClientConfig) -> Result<Self> {
        config.validate()?;
        let base_url = normalize_url(&config.url)?;

        let mut builder = Client::builder()
            .danger_accept_invalid_certs(config.insecure_skip_verify);
        for certificate in root_certificates(config)? {
            builder = builder.add_root_certificate(certificate);
        }

        Ok(Self {
            http: builder.build()?,
            base_url,
            client_auth: config.client_auth.clone(),
        })
    }

    /// Gets the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl SkClient for HttpSkClient {
    fn client_auth(&self) -> &ClientAuth {
        &self.client_auth
    }

    async fn exchange<Req, Resp>(
        &self,
        cancel: &CancellationToken,
        meta: &RequestMeta,
        request: &Req,
        options: Option<&ExchangeOptions>,
    ) -> Result<Resp>
    where
        Req: Serialize + Sync,
        Resp: DeserializeOwned + Send,
    {
        let url = format!("{}{}", self.base_url, meta.url_path);
        let mut builder = self.http.request(meta.method.clone(), &url).json(request);
        if let Some(timeout) = options.and_then(|o| o.timeout) {
            builder = builder.timeout(timeout);
        }

        let start = Instant::now();
        let result = tokio::select! {
            _ = cancel.cancelled() => Err(ClientError::Cancelled),
            result = send(builder) => result,
        };
        metrics::histogram!("skas_exchange_duration_seconds", "endpoint" => meta.name)
            .record(start.elapsed().as_secs_f64());

        result
    }
}

async fn send<Resp: DeserializeOwned>(builder: RequestBuilder) -> Result<Resp> {
    let response = builder.send().await?;
    let status = response.status();

    if status != StatusCode::OK {
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "unknown error".to_string());
        return Err(ClientError::Status {
            status: status.as_u16(),
            message: message.trim().to_owned(),
        });
    }

    let body = response.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}

/// Normalizes a URL string by ensuring it starts with a valid scheme
/// (`http` or `https`) and has no trailing slash.
fn normalize_url(url: &str) -> Result<String> {
    let url_with_scheme =
        if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else {
            format!("https://{url}")
        };

    let parsed_url = Url::parse(&url_with_scheme)?;
    Ok(parsed_url.as_str().trim_end_matches('/').to_owned())
}

/// PEM bundles to trust on top of the system roots.
/// Every certificate of the configured PEM bundles, file first.
fn root_certificates(config: &ClientConfig) -> Result<Vec<Certificate>> {
    let mut pems = Vec::new();

    if let Some(path) = config
        .root_ca_path
        .as_ref()
        .filter(|p| !p.as_os_str().is_empty())
    {
        pems.push(std::fs::read(path)?);
    }
    if let Some(data) = config.root_ca_data.as_deref().map(str::trim) {
        if !data.is_empty() {
            pems.push(STANDARD.decode(data)?);
        }
    }

    let mut certificates = Vec::new();
    for pem in pems {
        certificates.extend(Certificate::from_pem_bundle(&pem)?);
    }

    Ok(certificates)
}
