use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use log::{error, info, warn};
use paypal_checkout::{
    PaymentError, RedirectForm,
    paypal::{self, GatewayClient, GatewayConfig, Outcome, TransactionFields},
};
use std::collections::BTreeMap;

use crate::http::{
    model::{CaptureRequest, CheckoutRequest, ErrorResponse, FormRequest},
    router::AppState,
};

/// Defaults from configuration, overlaid with what the caller sent.
fn attempt_fields(
    config: &GatewayConfig,
    raw: &BTreeMap<String, String>,
) -> Result<TransactionFields, PaymentError> {
    let mut fields = TransactionFields::with_defaults();
    fields.set_currency(config.currency.clone());
    fields.set_payment_action(config.payment_action);
    for (field, value) in TransactionFields::try_from(raw)?.iter() {
        fields.set(field, value);
    }
    Ok(fields)
}

fn error_response(error: PaymentError) -> Response {
    let status = match &error {
        PaymentError::UnknownField(_) | PaymentError::MissingMandatoryField(_) => {
            StatusCode::BAD_REQUEST
        }
        PaymentError::Auth(_) | PaymentError::Transport(_) => StatusCode::BAD_GATEWAY,
        PaymentError::InvalidConfiguration(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
        }),
    )
        .into_response()
}

fn respond(flow: &str, result: Result<Outcome, PaymentError>) -> Response {
    match result {
        Ok(outcome) => {
            match &outcome {
                Outcome::Declined { messages } => {
                    warn!("{} declined: {}", flow, messages.join(" "))
                }
                _ => info!("{} succeeded", flow),
            }
            (StatusCode::OK, Json(outcome)).into_response()
        }
        Err(e) => {
            error!("{} failed: {}", flow, e);
            error_response(e)
        }
    }
}

async fn direct(config: &GatewayConfig, body: CheckoutRequest) -> Result<Outcome, PaymentError> {
    let fields = attempt_fields(config, &body.fields)?;
    let client = GatewayClient::from_config(config)?;
    paypal::charge_direct(&client, &fields).await
}

async fn express(config: &GatewayConfig, body: CheckoutRequest) -> Result<Outcome, PaymentError> {
    let fields = attempt_fields(config, &body.fields)?;
    let client = GatewayClient::from_config(config)?;
    paypal::express_checkout_url(&client, &fields).await
}

async fn capture(config: &GatewayConfig, body: CaptureRequest) -> Result<Outcome, PaymentError> {
    let mut fields = attempt_fields(config, &body.fields)?;
    let client = GatewayClient::from_config(config)?;
    paypal::charge_express_checkout(&client, &mut fields, &body.token).await
}

pub async fn handle_direct(
    State(state): State<AppState>,
    Json(body): Json<CheckoutRequest>,
) -> Response {
    respond("Direct payment", direct(&state.config.paypal, body).await)
}

pub async fn handle_express(
    State(state): State<AppState>,
    Json(body): Json<CheckoutRequest>,
) -> Response {
    respond("Express checkout", express(&state.config.paypal, body).await)
}

pub async fn handle_capture(
    State(state): State<AppState>,
    Json(body): Json<CaptureRequest>,
) -> Response {
    respond(
        "Express checkout capture",
        capture(&state.config.paypal, body).await,
    )
}

pub async fn handle_form(
    State(state): State<AppState>,
    Json(body): Json<FormRequest>,
) -> Response {
    let config = &state.config.paypal;
    let host = match config.form_host() {
        Ok(host) => host,
        Err(e) => {
            error!("Payment form unavailable: {}", e);
            return error_response(e);
        }
    };
    let button = body.button.unwrap_or_else(|| config.form_button.clone());
    let form = RedirectForm::new(host.to_string(), button)
        .with_fields(body.fields)
        .with_mandatory_fields(config.form_mandatory_fields.0.clone());

    let status = match form.check_mandatory_fields() {
        Ok(()) => StatusCode::OK,
        Err(_) => StatusCode::UNPROCESSABLE_ENTITY,
    };
    (status, Html(form.render())).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::Config;
    use axum::body::to_bytes;
    use envconfig::Envconfig;
    use paypal_checkout::form::DEFAULT_ERROR_MESSAGE;
    use paypal_checkout::paypal::{Field, GatewayClientError, PaymentAction};
    use std::collections::HashMap;
    use std::sync::Arc;

    fn test_config(extra: &[(&str, &str)]) -> Config {
        let mut env = HashMap::new();
        env.insert("PAYPAL_USERNAME".to_string(), "merchant_api1.example.com".to_string());
        env.insert("PAYPAL_PASSWORD".to_string(), "s3cr3t".to_string());
        env.insert("PAYPAL_SIGNATURE".to_string(), "A1b2C3".to_string());
        for (name, value) in extra {
            env.insert(name.to_string(), value.to_string());
        }
        Config::init_from_hashmap(&env).unwrap()
    }

    fn raw(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect()
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_attempt_fields_start_from_configuration() {
        let config = test_config(&[
            ("PAYPAL_CURRENCY", "USD"),
            ("PAYPAL_PAYMENT_ACTION", "Authorization"),
        ]);

        let fields = attempt_fields(&config.paypal, &raw(&[("total", "10.00")])).unwrap();

        assert_eq!(fields.currency(), "USD");
        assert_eq!(fields.payment_action(), PaymentAction::Authorization);
        assert_eq!(fields.get(Field::Country), Some("FR"));
        assert_eq!(fields.get(Field::NoShipping), Some("1"));
        assert_eq!(fields.get(Field::Total), Some("10.00"));
    }

    #[test]
    fn test_attempt_fields_caller_values_win() {
        let config = test_config(&[
            ("PAYPAL_CURRENCY", "USD"),
            ("PAYPAL_PAYMENT_ACTION", "Authorization"),
        ]);

        let fields = attempt_fields(
            &config.paypal,
            &raw(&[("currency", "GBP"), ("action", "Sale"), ("country", "DE")]),
        )
        .unwrap();

        assert_eq!(fields.currency(), "GBP");
        assert_eq!(fields.payment_action(), PaymentAction::Sale);
        assert_eq!(fields.get(Field::Country), Some("DE"));
    }

    #[tokio::test]
    async fn test_unknown_field_is_bad_request() {
        let config = test_config(&[]);
        let err = attempt_fields(&config.paypal, &raw(&[("ccnumbr", "4111")])).unwrap_err();

        let response = error_response(err);
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert!(body["error"].as_str().unwrap().contains("ccnumbr"));
    }

    #[test]
    fn test_error_status_mapping() {
        let status = |error: PaymentError| error_response(error).status();

        assert_eq!(
            status(PaymentError::MissingMandatoryField("business".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status(PaymentError::Auth("rejected".to_string())),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status(PaymentError::Transport(GatewayClientError::MalformedResponse {
                reason: "no ACK".to_string(),
            })),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status(PaymentError::InvalidConfiguration("bad action".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    fn form_state() -> AppState {
        AppState {
            config: Arc::new(test_config(&[(
                "PAYPAL_FORM_MANDATORY_FIELDS",
                "business,amount",
            )])),
        }
    }

    #[tokio::test]
    async fn test_form_renders_fields_in_request_order() {
        let body = FormRequest {
            fields: vec![
                ("business".to_string(), "shop@example.com".to_string()),
                ("amount".to_string(), "12.50".to_string()),
                ("cmd".to_string(), "_xclick".to_string()),
            ],
            button: None,
        };

        let response = handle_form(State(form_state()), Json(body)).await;
        assert_eq!(response.status(), StatusCode::OK);

        let html = body_text(response).await;
        assert!(html.starts_with(
            "<form action=\"https://www.sandbox.paypal.com/cgi-bin/webscr\" method=\"post\">"
        ));
        let business = html.find("name=\"business\"").unwrap();
        let amount = html.find("name=\"amount\"").unwrap();
        let cmd = html.find("name=\"cmd\"").unwrap();
        assert!(business < amount && amount < cmd);
    }

    #[tokio::test]
    async fn test_form_missing_mandatory_field_is_unprocessable() {
        let body = FormRequest {
            fields: vec![("business".to_string(), "shop@example.com".to_string())],
            button: Some("https://shop.example.com/pay.png".to_string()),
        };

        let response = handle_form(State(form_state()), Json(body)).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body_text(response).await, DEFAULT_ERROR_MESSAGE);
    }
}
