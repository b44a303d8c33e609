//! Flat name-value-pair encoding of requests and responses.

use std::collections::HashMap;
use url::form_urlencoded;

use crate::paypal::client::GatewayClientError;
use crate::paypal::model::{
    Ack, Address, Amount, ErrorDetails, ErrorEntry, GatewayRequest, GatewayResult, OrderDetails,
    PayerDetails, ResultPayload,
};

pub type NvpPairs = Vec<(&'static str, String)>;

/// Empty values are left off the wire entirely.
fn push(pairs: &mut NvpPairs, key: &'static str, value: &str) {
    if !value.is_empty() {
        pairs.push((key, value.to_string()));
    }
}

fn push_amount(pairs: &mut NvpPairs, amount: &Amount) {
    push(pairs, "AMT", &amount.value);
    push(pairs, "CURRENCYCODE", &amount.currency);
}

fn push_order(pairs: &mut NvpPairs, order: &OrderDetails) {
    push_amount(pairs, &order.total);
    push(pairs, "DESC", &order.description);
    push(pairs, "CUSTOM", &order.custom);
}

fn expiry_date(month: &str, year: &str) -> String {
    if month.is_empty() || year.is_empty() {
        return String::new();
    }
    format!("{month:0>2}{year}")
}

pub fn encode_request(request: &GatewayRequest) -> NvpPairs {
    let mut pairs = vec![("METHOD", request.kind().method().to_string())];

    match request {
        GatewayRequest::DirectCharge(req) => {
            push(&mut pairs, "PAYMENTACTION", req.action.as_str());
            push_order(&mut pairs, &req.order);
            push(&mut pairs, "CREDITCARDTYPE", &req.card.card_type);
            push(&mut pairs, "ACCT", &req.card.number);
            push(
                &mut pairs,
                "EXPDATE",
                &expiry_date(&req.card.exp_month, &req.card.exp_year),
            );
            push(&mut pairs, "CVV2", &req.card.cvv2);
            push(&mut pairs, "FIRSTNAME", &req.card.owner.first_name);
            push(&mut pairs, "LASTNAME", &req.card.owner.last_name);
            let address = &req.card.billing_address;
            push(&mut pairs, "STREET", &address.street1);
            push(&mut pairs, "STREET2", &address.street2);
            push(&mut pairs, "CITY", &address.city);
            push(&mut pairs, "STATE", &address.state);
            push(&mut pairs, "ZIP", &address.zip);
            push(&mut pairs, "COUNTRYCODE", &address.country);
            push(&mut pairs, "IPADDRESS", &req.ip_address);
        }
        GatewayRequest::ExpressCheckoutInit(req) => {
            push_amount(&mut pairs, &req.total);
            push(&mut pairs, "NOSHIPPING", &req.no_shipping);
            push(&mut pairs, "CANCELURL", &req.cancel_url);
            push(&mut pairs, "RETURNURL", &req.return_url);
        }
        GatewayRequest::ExpressCheckoutDetails(req) => {
            push(&mut pairs, "TOKEN", &req.token);
        }
        GatewayRequest::ExpressCheckoutCapture(req) => {
            push(&mut pairs, "TOKEN", &req.token);
            push(&mut pairs, "PAYERID", &req.payer_id);
            push(&mut pairs, "PAYMENTACTION", req.action.as_str());
            push_order(&mut pairs, &req.order);
            let ship_to = &req.ship_to;
            push(&mut pairs, "SHIPTOSTREET", &ship_to.street1);
            push(&mut pairs, "SHIPTOSTREET2", &ship_to.street2);
            push(&mut pairs, "SHIPTOCITY", &ship_to.city);
            push(&mut pairs, "SHIPTOSTATE", &ship_to.state);
            push(&mut pairs, "SHIPTOZIP", &ship_to.zip);
            push(&mut pairs, "SHIPTOCOUNTRYCODE", &ship_to.country);
        }
    }

    pairs
}

fn take(values: &HashMap<String, String>, key: &str) -> String {
    values.get(key).cloned().unwrap_or_default()
}

fn decode_errors(values: &HashMap<String, String>) -> Option<ErrorDetails> {
    let mut entries = Vec::new();
    for index in 0.. {
        let keys = [
            format!("L_ERRORCODE{index}"),
            format!("L_SHORTMESSAGE{index}"),
            format!("L_LONGMESSAGE{index}"),
            format!("L_SEVERITYCODE{index}"),
        ];
        if !keys.iter().any(|key| values.contains_key(key)) {
            break;
        }
        let [code, short, long, severity] = keys;
        entries.push(ErrorEntry {
            error_code: take(values, &code),
            short_message: take(values, &short),
            long_message: take(values, &long),
            severity_code: take(values, &severity),
        });
    }

    if entries.is_empty() {
        None
    } else {
        Some(ErrorDetails::List(entries))
    }
}

fn decode_payer(values: &HashMap<String, String>) -> Option<PayerDetails> {
    let payer_id = values.get("PAYERID")?.clone();
    let country = values
        .get("SHIPTOCOUNTRYCODE")
        .or_else(|| values.get("COUNTRYCODE"))
        .cloned()
        .unwrap_or_default();
    Some(PayerDetails {
        payer_id,
        email: take(values, "EMAIL"),
        first_name: take(values, "FIRSTNAME"),
        last_name: take(values, "LASTNAME"),
        address: Address {
            street1: take(values, "SHIPTOSTREET"),
            street2: take(values, "SHIPTOSTREET2"),
            city: take(values, "SHIPTOCITY"),
            state: take(values, "SHIPTOSTATE"),
            zip: take(values, "SHIPTOZIP"),
            country,
        },
    })
}

pub fn decode_response(body: &str) -> Result<GatewayResult, GatewayClientError> {
    let values: HashMap<String, String> = form_urlencoded::parse(body.trim().as_bytes())
        .into_owned()
        .collect();

    let raw_ack = values
        .get("ACK")
        .ok_or_else(|| GatewayClientError::MalformedResponse {
            reason: "response has no ACK field".to_string(),
        })?;
    let ack = Ack::parse(raw_ack).ok_or_else(|| GatewayClientError::MalformedResponse {
        reason: format!("unrecognised ACK value: {raw_ack}"),
    })?;

    let transaction_id = values
        .get("TRANSACTIONID")
        .or_else(|| values.get("PAYMENTINFO_0_TRANSACTIONID"))
        .cloned();

    Ok(GatewayResult {
        ack,
        errors: decode_errors(&values),
        payload: ResultPayload {
            token: values.get("TOKEN").cloned(),
            transaction_id,
            payer: decode_payer(&values),
        },
    })
}
