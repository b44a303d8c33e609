use log::{info, warn};

mod builder;
mod client;
mod config;
mod fields;
mod interpret;
mod model;
mod nvp;

pub use builder::{
    build_direct_charge, build_express_checkout_capture, build_express_checkout_details,
    build_express_checkout_init,
};
pub use client::{
    DEFAULT_API_VERSION, GatewayClient, GatewayClientError, GatewaySession, HttpTransport,
    Transport,
};
pub use config::{AuthMethod, Credentials, Environment, FieldList, GatewayConfig};
pub use fields::{DEFAULT_CURRENCY, Field, TransactionFields};
pub use interpret::{express_checkout_redirect_url, interpret};
pub use model::{
    Ack, Address, Amount, CreditCard, DirectChargeRequest, ErrorDetails, ErrorEntry,
    ExpressCheckoutCaptureRequest, ExpressCheckoutDetailsRequest, ExpressCheckoutInitRequest,
    GatewayRequest, GatewayResult, OperationKind, OrderDetails, Outcome, PayerDetails,
    PaymentAction, PersonName, ResultPayload,
};

use crate::error::PaymentError;

async fn perform(client: &GatewayClient, request: GatewayRequest) -> Result<Outcome, PaymentError> {
    let kind = request.kind();
    let result = client.authenticate()?.send(&request).await?;
    Ok(interpret(&result, kind, client.environment()))
}

/// Charges (or authorizes, per the `action` field) the card held in `fields`.
pub async fn charge_direct(
    client: &GatewayClient,
    fields: &TransactionFields,
) -> Result<Outcome, PaymentError> {
    let action = fields.payment_action();
    info!(
        "Direct {} of {} {}",
        action,
        fields.value(Field::Total),
        fields.currency()
    );
    let request = build_direct_charge(fields, action);
    perform(client, request.into()).await
}

/// Starts an express checkout; a successful outcome carries the buyer redirect.
pub async fn express_checkout_url(
    client: &GatewayClient,
    fields: &TransactionFields,
) -> Result<Outcome, PaymentError> {
    info!(
        "Starting express checkout for {} {}",
        fields.value(Field::Total),
        fields.currency()
    );
    let request = build_express_checkout_init(fields);
    perform(client, request.into()).await
}

/// Completes an express checkout the buyer approved.
///
/// Looks up the payer behind `token`, copies their name and address into
/// `fields`, then captures the amount in `fields`.
pub async fn charge_express_checkout(
    client: &GatewayClient,
    fields: &mut TransactionFields,
    token: &str,
) -> Result<Outcome, PaymentError> {
    info!("Fetching express checkout details for token={}", token);
    let payer = match perform(client, build_express_checkout_details(token).into()).await? {
        Outcome::PayerDetails(payer) => payer,
        outcome => {
            warn!("Express checkout details lookup failed for token={}", token);
            return Ok(outcome);
        }
    };

    fields.apply_payer_details(&payer);
    info!(
        "Capturing express checkout token={} payer={} amount={} {}",
        token,
        payer.payer_id,
        fields.value(Field::Total),
        fields.currency()
    );
    let request = build_express_checkout_capture(fields, token, &payer.payer_id);
    perform(client, request.into()).await
}

#[cfg(test)]
mod tests {
    use super::client::mock::MockTransport;
    use super::config::tests::test_config;
    use super::*;
    use std::sync::Arc;

    fn scenario_fields() -> TransactionFields {
        let mut fields = TransactionFields::new();
        fields.set(Field::Total, "19.99");
        fields.set(Field::Currency, "EUR");
        fields.set(Field::FirstName, "Jane");
        fields.set(Field::LastName, "Doe");
        fields.set(Field::CardType, "Visa");
        fields.set(Field::CardNumber, "4111111111111111");
        fields.set(Field::CardExpMonth, "12");
        fields.set(Field::CardExpYear, "2030");
        fields.set(Field::CardVerificationNumber, "123");
        fields
    }

    fn client_with(transport: Arc<MockTransport>) -> GatewayClient {
        GatewayClient::from_config(&test_config())
            .unwrap()
            .with_transport(transport)
    }

    #[tokio::test]
    async fn test_direct_charge_success() {
        let transport = Arc::new(MockTransport::new().respond("ACK=Success&TRANSACTIONID=4XY"));

        let outcome = charge_direct(&client_with(transport.clone()), &scenario_fields())
            .await
            .unwrap();

        assert_eq!(
            outcome,
            Outcome::Charged {
                transaction_id: Some("4XY".to_string())
            }
        );
        let sent = &transport.requests()[0];
        assert_eq!(sent.get("METHOD"), Some("DoDirectPayment"));
        assert_eq!(sent.get("AMT"), Some("19.99"));
        assert_eq!(sent.get("CURRENCYCODE"), Some("EUR"));
        assert_eq!(sent.get("EXPDATE"), Some("122030"));
        assert_eq!(sent.get("PAYMENTACTION"), Some("Sale"));
    }

    #[tokio::test]
    async fn test_direct_charge_declined() {
        let transport = Arc::new(
            MockTransport::new().respond("ACK=Failure&L_ERRORCODE0=15005&L_LONGMESSAGE0=Invalid%20card"),
        );

        let outcome = charge_direct(&client_with(transport), &scenario_fields())
            .await
            .unwrap();

        assert_eq!(
            outcome,
            Outcome::Declined {
                messages: vec!["Invalid card".to_string()]
            }
        );
    }

    #[tokio::test]
    async fn test_direct_authorization() {
        let transport = Arc::new(MockTransport::new().respond("ACK=Success"));
        let mut fields = scenario_fields();
        fields.set_payment_action(PaymentAction::Authorization);

        charge_direct(&client_with(transport.clone()), &fields)
            .await
            .unwrap();

        assert_eq!(
            transport.requests()[0].get("PAYMENTACTION"),
            Some("Authorization")
        );
    }

    #[tokio::test]
    async fn test_express_checkout_url() {
        let transport = Arc::new(MockTransport::new().respond("ACK=Success&TOKEN=EC-77"));
        let mut fields = TransactionFields::with_defaults();
        fields.set(Field::Total, "30.00");
        fields.set(Field::ReturnUrl, "https://shop.example/paypal/return");
        fields.set(Field::CancelUrl, "https://shop.example/paypal/cancel");

        let outcome = express_checkout_url(&client_with(transport), &fields)
            .await
            .unwrap();

        let Outcome::RedirectReady { url, token } = outcome else {
            panic!("expected redirect, got {outcome:?}");
        };
        assert_eq!(token, "EC-77");
        assert_eq!(url.host_str(), Some("www.sandbox.paypal.com"));
    }

    #[tokio::test]
    async fn test_express_checkout_capture_uses_payer_details() {
        let transport = Arc::new(
            MockTransport::new()
                .respond(
                    "ACK=Success&TOKEN=EC-77&PAYERID=BUYER1&EMAIL=jane%40example.com\
                     &FIRSTNAME=Jane&LASTNAME=Doe&SHIPTOSTREET=5%20Quai%20Voltaire\
                     &SHIPTOCITY=Paris&SHIPTOZIP=75007&SHIPTOCOUNTRYCODE=FR",
                )
                .respond("ACK=Success&TRANSACTIONID=9ZZ"),
        );
        let mut fields = TransactionFields::with_defaults();
        fields.set(Field::Total, "30.00");
        fields.set(Field::Description, "Order 77");

        let outcome = charge_express_checkout(&client_with(transport.clone()), &mut fields, "EC-77")
            .await
            .unwrap();

        assert_eq!(
            outcome,
            Outcome::Charged {
                transaction_id: Some("9ZZ".to_string())
            }
        );
        assert_eq!(fields.get(Field::Email), Some("jane@example.com"));

        let requests = transport.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].get("METHOD"), Some("GetExpressCheckoutDetails"));
        let capture = &requests[1];
        assert_eq!(capture.get("METHOD"), Some("DoExpressCheckoutPayment"));
        assert_eq!(capture.get("TOKEN"), Some("EC-77"));
        assert_eq!(capture.get("PAYERID"), Some("BUYER1"));
        assert_eq!(capture.get("AMT"), Some("30.00"));
        assert_eq!(capture.get("DESC"), Some("Order 77"));
        assert_eq!(capture.get("SHIPTOSTREET"), Some("5 Quai Voltaire"));
        assert_eq!(capture.get("SHIPTOCOUNTRYCODE"), Some("FR"));
    }

    #[tokio::test]
    async fn test_express_checkout_details_failure_stops_capture() {
        let transport = Arc::new(MockTransport::new().respond(
            "ACK=Failure&L_ERRORCODE0=10410&L_LONGMESSAGE0=Invalid%20token",
        ));
        let mut fields = TransactionFields::with_defaults();

        let outcome = charge_express_checkout(&client_with(transport.clone()), &mut fields, "EC-bad")
            .await
            .unwrap();

        assert_eq!(
            outcome,
            Outcome::Declined {
                messages: vec!["Invalid token".to_string()]
            }
        );
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_transport_failure_aborts_attempt() {
        let transport = Arc::new(MockTransport::new());

        let err = charge_direct(&client_with(transport), &scenario_fields())
            .await
            .unwrap_err();

        assert!(matches!(err, PaymentError::Transport(_)));
    }
}
