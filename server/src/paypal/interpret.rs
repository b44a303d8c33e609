use log::{debug, warn};
use url::Url;

use crate::error::PaymentError;
use crate::paypal::config::Environment;
use crate::paypal::model::{GatewayResult, OperationKind, Outcome};

/// Buyer-facing express checkout approval page for `token`.
pub fn express_checkout_redirect_url(
    environment: Environment,
    token: &str,
) -> Result<Url, PaymentError> {
    let mut url = environment.standard_checkout_url()?;
    url.query_pairs_mut()
        .append_pair("cmd", "_express-checkout")
        .append_pair("token", token);
    Ok(url)
}

fn declined(messages: Vec<String>) -> Outcome {
    Outcome::Declined { messages }
}

/// Turns a raw gateway answer into the outcome of the operation that produced it.
pub fn interpret(result: &GatewayResult, kind: OperationKind, environment: Environment) -> Outcome {
    if !result.is_success() {
        let messages = match &result.errors {
            Some(errors) => errors.messages(),
            None => vec![format!("{kind} acknowledged with {}", result.ack)],
        };
        warn!("{} declined: {}", kind, messages.join(" "));
        return declined(messages);
    }

    match kind {
        OperationKind::DirectCharge | OperationKind::ExpressCheckoutCapture => Outcome::Charged {
            transaction_id: result.payload.transaction_id.clone(),
        },
        OperationKind::ExpressCheckoutInit => match result.payload.token.as_deref() {
            Some(token) if !token.is_empty() => {
                match express_checkout_redirect_url(environment, token) {
                    Ok(url) => {
                        debug!("Express checkout redirect ready: {}", url);
                        Outcome::RedirectReady {
                            url,
                            token: token.to_string(),
                        }
                    }
                    Err(e) => declined(vec![e.to_string()]),
                }
            }
            _ => declined(vec![
                "Gateway accepted the checkout but returned no token".to_string(),
            ]),
        },
        OperationKind::ExpressCheckoutDetails => match &result.payload.payer {
            Some(payer) if !payer.payer_id.is_empty() => Outcome::PayerDetails(payer.clone()),
            _ => declined(vec![
                "Gateway returned no payer for this checkout token".to_string(),
            ]),
        },
    }
}
