use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

use crate::error::PaymentError;

/// Whether a payment moves funds immediately or only reserves them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentAction {
    #[default]
    Sale,
    Authorization,
}

impl PaymentAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentAction::Sale => "Sale",
            PaymentAction::Authorization => "Authorization",
        }
    }
}

impl fmt::Display for PaymentAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentAction {
    type Err = PaymentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sale" => Ok(PaymentAction::Sale),
            "authorization" | "authorize" => Ok(PaymentAction::Authorization),
            other => Err(PaymentError::InvalidConfiguration(format!(
                "unknown payment action: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    DirectCharge,
    ExpressCheckoutInit,
    ExpressCheckoutDetails,
    ExpressCheckoutCapture,
}

impl OperationKind {
    /// NVP `METHOD` value for the operation.
    pub fn method(&self) -> &'static str {
        match self {
            OperationKind::DirectCharge => "DoDirectPayment",
            OperationKind::ExpressCheckoutInit => "SetExpressCheckout",
            OperationKind::ExpressCheckoutDetails => "GetExpressCheckoutDetails",
            OperationKind::ExpressCheckoutCapture => "DoExpressCheckoutPayment",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.method())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Amount {
    pub value: String,
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderDetails {
    pub total: Amount,
    pub description: String,
    pub custom: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonName {
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub street1: String,
    pub street2: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub country: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreditCard {
    pub card_type: String,
    pub number: String,
    pub exp_month: String,
    pub exp_year: String,
    pub cvv2: String,
    pub owner: PersonName,
    pub billing_address: Address,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectChargeRequest {
    pub action: PaymentAction,
    pub order: OrderDetails,
    pub card: CreditCard,
    pub ip_address: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpressCheckoutInitRequest {
    pub total: Amount,
    pub no_shipping: String,
    pub cancel_url: String,
    pub return_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpressCheckoutDetailsRequest {
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpressCheckoutCaptureRequest {
    pub token: String,
    pub payer_id: String,
    pub action: PaymentAction,
    pub order: OrderDetails,
    pub ship_to: Address,
}

/// One remote call, tagged with the operation it performs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayRequest {
    DirectCharge(DirectChargeRequest),
    ExpressCheckoutInit(ExpressCheckoutInitRequest),
    ExpressCheckoutDetails(ExpressCheckoutDetailsRequest),
    ExpressCheckoutCapture(ExpressCheckoutCaptureRequest),
}

impl GatewayRequest {
    pub fn kind(&self) -> OperationKind {
        match self {
            GatewayRequest::DirectCharge(_) => OperationKind::DirectCharge,
            GatewayRequest::ExpressCheckoutInit(_) => OperationKind::ExpressCheckoutInit,
            GatewayRequest::ExpressCheckoutDetails(_) => OperationKind::ExpressCheckoutDetails,
            GatewayRequest::ExpressCheckoutCapture(_) => OperationKind::ExpressCheckoutCapture,
        }
    }
}

impl From<DirectChargeRequest> for GatewayRequest {
    fn from(request: DirectChargeRequest) -> Self {
        GatewayRequest::DirectCharge(request)
    }
}

impl From<ExpressCheckoutInitRequest> for GatewayRequest {
    fn from(request: ExpressCheckoutInitRequest) -> Self {
        GatewayRequest::ExpressCheckoutInit(request)
    }
}

impl From<ExpressCheckoutDetailsRequest> for GatewayRequest {
    fn from(request: ExpressCheckoutDetailsRequest) -> Self {
        GatewayRequest::ExpressCheckoutDetails(request)
    }
}

impl From<ExpressCheckoutCaptureRequest> for GatewayRequest {
    fn from(request: ExpressCheckoutCaptureRequest) -> Self {
        GatewayRequest::ExpressCheckoutCapture(request)
    }
}

/// Top-level acknowledgement of a gateway response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ack {
    Success,
    Failure,
    Warning,
}

impl Ack {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "Success" => Some(Ack::Success),
            "Failure" | "FailureWithWarning" => Some(Ack::Failure),
            "Warning" | "SuccessWithWarning" => Some(Ack::Warning),
            _ => None,
        }
    }
}

impl fmt::Display for Ack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Ack::Success => "Success",
            Ack::Failure => "Failure",
            Ack::Warning => "Warning",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorEntry {
    pub error_code: String,
    pub short_message: String,
    pub long_message: String,
    pub severity_code: String,
}

impl ErrorEntry {
    /// Human-readable reason: the long message, or whatever else the entry has.
    pub fn message(&self) -> String {
        [&self.long_message, &self.short_message]
            .into_iter()
            .find(|msg| !msg.trim().is_empty())
            .map(|msg| msg.trim().to_string())
            .unwrap_or_else(|| {
                if self.error_code.is_empty() {
                    "Unknown gateway error".to_string()
                } else {
                    format!("Gateway error code {}", self.error_code)
                }
            })
    }
}

/// The gateway reports errors either as a list of entries or as one bare entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorDetails {
    List(Vec<ErrorEntry>),
    Single(ErrorEntry),
}

impl ErrorDetails {
    pub fn entries(&self) -> &[ErrorEntry] {
        match self {
            ErrorDetails::List(entries) => entries,
            ErrorDetails::Single(entry) => std::slice::from_ref(entry),
        }
    }

    pub fn messages(&self) -> Vec<String> {
        self.entries().iter().map(ErrorEntry::message).collect()
    }

    pub fn has_code(&self, code: &str) -> bool {
        self.entries().iter().any(|entry| entry.error_code == code)
    }
}

/// What the gateway knows about the buyer after express checkout approval.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayerDetails {
    pub payer_id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub address: Address,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultPayload {
    pub token: Option<String>,
    pub transaction_id: Option<String>,
    pub payer: Option<PayerDetails>,
}

/// Raw answer to one remote call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayResult {
    pub ack: Ack,
    pub errors: Option<ErrorDetails>,
    pub payload: ResultPayload,
}

impl GatewayResult {
    pub fn is_success(&self) -> bool {
        self.ack == Ack::Success
    }
}

/// Normalised result of a payment attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Charged {
        #[serde(skip_serializing_if = "Option::is_none")]
        transaction_id: Option<String>,
    },
    RedirectReady {
        url: Url,
        token: String,
    },
    PayerDetails(PayerDetails),
    Declined {
        messages: Vec<String>,
    },
}

impl Outcome {
    pub fn is_declined(&self) -> bool {
        matches!(self, Outcome::Declined { .. })
    }
}
