use envconfig::Envconfig;
use secrecy::SecretString;
use std::convert::Infallible;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

use crate::error::PaymentError;
use crate::paypal::model::PaymentAction;

pub const LIVE_WEB_HOST: &str = "www.paypal.com";
pub const SANDBOX_WEB_HOST: &str = "www.sandbox.paypal.com";

#[derive(Envconfig, Clone)]
pub struct GatewayConfig {
    #[envconfig(from = "PAYPAL_USERNAME")]
    pub username: String,

    #[envconfig(from = "PAYPAL_PASSWORD")]
    pub password: String,

    #[envconfig(from = "PAYPAL_SIGNATURE")]
    pub signature: Option<String>,

    /// PEM file holding the API certificate followed by its private key.
    ///
    /// The key must be a PKCS#8 `BEGIN PRIVATE KEY` block. Certificates
    /// downloaded from PayPal usually carry a PKCS#1 `BEGIN RSA PRIVATE KEY`
    /// and need converting first:
    /// `openssl pkcs8 -topk8 -nocrypt -in paypal_key.pem -out paypal_pkcs8.pem`
    #[envconfig(from = "PAYPAL_CERTIFICATE")]
    pub certificate: Option<PathBuf>,

    /// Email of the merchant this account transacts on behalf of.
    #[envconfig(from = "PAYPAL_SUBJECT")]
    pub subject: Option<String>,

    #[envconfig(from = "PAYPAL_TEST_MODE", default = "true")]
    pub test_mode: bool,

    #[envconfig(from = "PAYPAL_API_VERSION", default = "56.0")]
    pub api_version: String,

    #[envconfig(from = "PAYPAL_CURRENCY", default = "EUR")]
    pub currency: String,

    #[envconfig(from = "PAYPAL_PAYMENT_ACTION", default = "Sale")]
    pub payment_action: PaymentAction,

    #[envconfig(from = "PAYPAL_TIMEOUT_SECS", default = "30")]
    pub timeout_secs: u64,

    /// Overrides the NVP endpoint picked from the environment and auth method.
    #[envconfig(from = "PAYPAL_ENDPOINT")]
    pub endpoint: Option<Url>,

    /// Overrides the Website Payments Standard form target.
    #[envconfig(from = "PAYPAL_FORM_HOST")]
    pub form_host: Option<Url>,

    #[envconfig(
        from = "PAYPAL_FORM_BUTTON",
        default = "https://www.paypal.com/fr_FR/FR/i/btn/btn_buynowCC_LG.gif"
    )]
    pub form_button: String,

    #[envconfig(
        from = "PAYPAL_FORM_MANDATORY_FIELDS",
        default = "cmd,business,item_name,amount,currency_code"
    )]
    pub form_mandatory_fields: FieldList,
}

impl GatewayConfig {
    pub fn environment(&self) -> Environment {
        Environment::from_test_mode(self.test_mode)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Configured form target, else the environment's standard checkout page.
    pub fn form_host(&self) -> Result<Url, PaymentError> {
        match &self.form_host {
            Some(url) => Ok(url.clone()),
            None => self.environment().standard_checkout_url(),
        }
    }
}

/// Comma separated list of names, as read from the environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldList(pub Vec<String>);

impl FromStr for FieldList {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(FieldList(
            s.split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .collect(),
        ))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Sandbox,
    Live,
}

impl Environment {
    pub fn from_test_mode(test_mode: bool) -> Self {
        if test_mode {
            Environment::Sandbox
        } else {
            Environment::Live
        }
    }

    /// Host buyers are redirected to.
    pub fn web_host(&self) -> &'static str {
        match self {
            Environment::Sandbox => SANDBOX_WEB_HOST,
            Environment::Live => LIVE_WEB_HOST,
        }
    }

    /// Signature and certificate credentials are served from different hosts.
    pub fn api_endpoint(&self, auth: &AuthMethod) -> &'static str {
        match (self, auth) {
            (Environment::Sandbox, AuthMethod::Signature(_)) => {
                "https://api-3t.sandbox.paypal.com/nvp"
            }
            (Environment::Sandbox, AuthMethod::Certificate(_)) => {
                "https://api.sandbox.paypal.com/nvp"
            }
            (Environment::Live, AuthMethod::Signature(_)) => "https://api-3t.paypal.com/nvp",
            (Environment::Live, AuthMethod::Certificate(_)) => "https://api.paypal.com/nvp",
        }
    }

    pub fn standard_checkout_url(&self) -> Result<Url, PaymentError> {
        let raw = format!("https://{}/cgi-bin/webscr", self.web_host());
        Url::parse(&raw)
            .map_err(|e| PaymentError::InvalidConfiguration(format!("checkout url {raw}: {e}")))
    }
}

#[derive(Debug)]
pub enum AuthMethod {
    Signature(SecretString),
    Certificate(PathBuf),
}

/// API credentials bound to one environment.
#[derive(Debug)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
    pub auth: AuthMethod,
    pub subject: Option<String>,
    pub environment: Environment,
}

impl Credentials {
    /// A signature wins over a certificate when both are configured.
    pub fn from_config(config: &GatewayConfig) -> Result<Self, PaymentError> {
        let signature = config.signature.as_deref().filter(|s| !s.is_empty());
        let auth = match (signature, &config.certificate) {
            (Some(signature), _) => AuthMethod::Signature(SecretString::new(signature.to_string())),
            (None, Some(path)) => AuthMethod::Certificate(path.clone()),
            (None, None) => {
                return Err(PaymentError::Auth(
                    "neither an API signature nor a certificate is configured".to_string(),
                ));
            }
        };

        Ok(Self {
            username: config.username.clone(),
            password: SecretString::new(config.password.clone()),
            auth,
            subject: config.subject.clone().filter(|s| !s.is_empty()),
            environment: config.environment(),
        })
    }
}
