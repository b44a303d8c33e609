use thiserror::Error;

#[derive(Error, Debug)]
pub enum PaymentError {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Gateway transport error: {0}")]
    Transport(#[from] crate::paypal::GatewayClientError),

    #[error("Mandatory field missing or empty: {0}")]
    MissingMandatoryField(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Unknown transaction field: {0}")]
    UnknownField(String),
}
