use async_trait::async_trait;
use http::StatusCode;
use log::{debug, info, warn};
use reqwest::{Client, Identity};
use secrecy::ExposeSecret;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use crate::error::PaymentError;
use crate::paypal::config::{AuthMethod, Credentials, Environment, GatewayConfig};
use crate::paypal::model::{GatewayRequest, GatewayResult};
use crate::paypal::nvp::{self, NvpPairs};

pub const DEFAULT_API_VERSION: &str = "56.0";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Error code the gateway uses when the API credentials are rejected.
const SECURITY_HEADER_INVALID: &str = "10002";

/// Errors that can occur while talking to the gateway.
#[derive(Debug, thiserror::Error)]
pub enum GatewayClientError {
    #[error("URL parse error: {context}: {source}")]
    UrlParse {
        context: &'static str,
        #[source]
        source: url::ParseError,
    },
    #[error("HTTP error: {context}: {source}")]
    Http {
        context: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("Unexpected HTTP status {status}: {context}: {body}")]
    HttpStatus {
        context: &'static str,
        status: StatusCode,
        body: String,
    },
    #[error("Failed to read response body as text: {context}: {source}")]
    ResponseBodyRead {
        context: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("Request timed out after {timeout:?}: {context}")]
    Timeout {
        context: &'static str,
        timeout: Duration,
    },
    #[error("Malformed gateway response: {reason}")]
    MalformedResponse { reason: String },
}

/// Moves one form-encoded request to the gateway and hands back the raw body.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post_form(
        &self,
        url: &Url,
        context: &'static str,
        form: &[(&'static str, String)],
    ) -> Result<String, GatewayClientError>;
}

/// [`Transport`] backed by a reqwest HTTPS client.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post_form(
        &self,
        url: &Url,
        context: &'static str,
        form: &[(&'static str, String)],
    ) -> Result<String, GatewayClientError> {
        let http_response = self
            .client
            .post(url.clone())
            .form(form)
            .send()
            .await
            .map_err(|e| GatewayClientError::Http { context, source: e })?;

        let status = http_response.status();
        let body = http_response
            .text()
            .await
            .map_err(|e| GatewayClientError::ResponseBodyRead { context, source: e })?;

        if status != StatusCode::OK {
            return Err(GatewayClientError::HttpStatus {
                context,
                status,
                body,
            });
        }
        Ok(body)
    }
}

/// Unauthenticated gateway client for a single payment attempt.
///
/// [`GatewayClient::authenticate`] yields a [`GatewaySession`] that performs
/// exactly one remote call. Flows that need several calls authenticate once
/// per call; nothing is pooled or retried.
#[derive(Clone)]
pub struct GatewayClient {
    credentials: Arc<Credentials>,
    endpoint: Option<Url>,
    api_version: String,
    timeout: Duration,
    transport: Option<Arc<dyn Transport>>,
}

impl GatewayClient {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials: Arc::new(credentials),
            endpoint: None,
            api_version: DEFAULT_API_VERSION.to_string(),
            timeout: DEFAULT_TIMEOUT,
            transport: None,
        }
    }

    pub fn from_config(config: &GatewayConfig) -> Result<Self, PaymentError> {
        let mut client = Self::new(Credentials::from_config(config)?)
            .with_api_version(config.api_version.clone())
            .with_timeout(config.timeout());
        if let Some(endpoint) = &config.endpoint {
            client = client.with_endpoint(endpoint.clone());
        }
        Ok(client)
    }

    pub fn with_endpoint(mut self, endpoint: Url) -> Self {
        self.endpoint = Some(endpoint);
        self
    }

    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Replaces the HTTPS transport, e.g. with an in-memory one in tests.
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn environment(&self) -> Environment {
        self.credentials.environment
    }

    /// Checks the credentials and prepares the transport for one call.
    pub fn authenticate(&self) -> Result<GatewaySession, PaymentError> {
        let credentials = &self.credentials;
        if credentials.username.trim().is_empty() {
            return Err(PaymentError::Auth("API username is empty".to_string()));
        }
        if credentials.password.expose_secret().is_empty() {
            return Err(PaymentError::Auth("API password is empty".to_string()));
        }
        if let AuthMethod::Signature(signature) = &credentials.auth
            && signature.expose_secret().is_empty()
        {
            return Err(PaymentError::Auth("API signature is empty".to_string()));
        }

        let endpoint = match &self.endpoint {
            Some(endpoint) => endpoint.clone(),
            None => Url::parse(credentials.environment.api_endpoint(&credentials.auth)).map_err(
                |e| GatewayClientError::UrlParse {
                    context: "Failed to construct NVP endpoint URL",
                    source: e,
                },
            )?,
        };

        let transport = match &self.transport {
            Some(transport) => transport.clone(),
            None => Arc::new(self.build_http_transport()?),
        };

        info!(
            "Authenticated gateway session user={} environment={:?} endpoint={}",
            credentials.username, credentials.environment, endpoint
        );

        Ok(GatewaySession {
            credentials: credentials.clone(),
            endpoint,
            api_version: self.api_version.clone(),
            timeout: self.timeout,
            transport,
        })
    }

    fn build_http_transport(&self) -> Result<HttpTransport, PaymentError> {
        let mut builder = Client::builder().timeout(self.timeout);

        if let AuthMethod::Certificate(path) = &self.credentials.auth {
            let pem = std::fs::read(path).map_err(|e| {
                PaymentError::Auth(format!(
                    "cannot read API certificate {}: {e}",
                    path.display()
                ))
            })?;
            let identity = Identity::from_pkcs8_pem(&pem, &pem)
                .map_err(|e| {
                    PaymentError::Auth(format!(
                        "invalid API certificate {} (expected a certificate and a PKCS#8 private key): {e}",
                        path.display()
                    ))
                })?;
            builder = builder.identity(identity);
        }

        let client = builder
            .build()
            .map_err(|e| PaymentError::Auth(format!("failed to set up HTTPS client: {e}")))?;
        Ok(HttpTransport::new(client))
    }
}

/// Authenticated handle good for exactly one remote call.
pub struct GatewaySession {
    credentials: Arc<Credentials>,
    endpoint: Url,
    api_version: String,
    timeout: Duration,
    transport: Arc<dyn Transport>,
}

impl GatewaySession {
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn auth_pairs(&self) -> NvpPairs {
        let mut pairs = vec![
            ("VERSION", self.api_version.clone()),
            ("USER", self.credentials.username.clone()),
            ("PWD", self.credentials.password.expose_secret().clone()),
        ];
        if let AuthMethod::Signature(signature) = &self.credentials.auth {
            pairs.push(("SIGNATURE", signature.expose_secret().clone()));
        }
        if let Some(subject) = &self.credentials.subject {
            pairs.push(("SUBJECT", subject.clone()));
        }
        pairs
    }

    /// Sends the request and decodes the gateway's answer.
    ///
    /// A declined payment is still `Ok`; only transport failures and rejected
    /// credentials are errors.
    pub async fn send(self, request: &GatewayRequest) -> Result<GatewayResult, PaymentError> {
        let context = request.kind().method();
        let mut form = nvp::encode_request(request);
        form.extend(self.auth_pairs());

        debug!(
            "Sending {} to {} with {} fields",
            context,
            self.endpoint,
            form.len()
        );
        let body = tokio::time::timeout(
            self.timeout,
            self.transport.post_form(&self.endpoint, context, &form),
        )
        .await
        .map_err(|_| GatewayClientError::Timeout {
            context,
            timeout: self.timeout,
        })??;

        let result = nvp::decode_response(&body)?;

        if let Some(errors) = &result.errors
            && !result.is_success()
            && errors.has_code(SECURITY_HEADER_INVALID)
        {
            let reason = errors.messages().join(" ");
            warn!("Gateway rejected API credentials for {}: {}", context, reason);
            return Err(PaymentError::Auth(reason));
        }

        info!("{} acknowledged with {}", context, result.ack);
        Ok(result)
    }
}
