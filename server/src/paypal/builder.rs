//! Maps a [`TransactionFields`] snapshot onto gateway requests.
//!
//! Builders never reject input: a field the caller did not set turns into an
//! empty sub-field, and the gateway decides whether that is acceptable.

use crate::paypal::fields::{Field, TransactionFields};
use crate::paypal::model::{
    Address, Amount, CreditCard, DirectChargeRequest, ExpressCheckoutCaptureRequest,
    ExpressCheckoutDetailsRequest, ExpressCheckoutInitRequest, OrderDetails, PaymentAction,
    PersonName,
};

fn amount(fields: &TransactionFields) -> Amount {
    Amount {
        value: fields.value(Field::Total).to_string(),
        currency: fields.currency().to_string(),
    }
}

fn order_details(fields: &TransactionFields) -> OrderDetails {
    OrderDetails {
        total: amount(fields),
        description: fields.value(Field::Description).to_string(),
        custom: fields.value(Field::Custom).to_string(),
    }
}

fn billing_address(fields: &TransactionFields) -> Address {
    Address {
        street1: fields.value(Field::Street1).to_string(),
        street2: fields.value(Field::Street2).to_string(),
        city: fields.value(Field::City).to_string(),
        state: fields.value(Field::State).to_string(),
        zip: fields.value(Field::Zip).to_string(),
        country: fields.value(Field::Country).to_string(),
    }
}

pub fn build_direct_charge(
    fields: &TransactionFields,
    action: PaymentAction,
) -> DirectChargeRequest {
    let card = CreditCard {
        card_type: fields.value(Field::CardType).to_string(),
        number: fields.value(Field::CardNumber).to_string(),
        exp_month: fields.value(Field::CardExpMonth).to_string(),
        exp_year: fields.value(Field::CardExpYear).to_string(),
        cvv2: fields.value(Field::CardVerificationNumber).to_string(),
        owner: PersonName {
            first_name: fields.value(Field::FirstName).to_string(),
            last_name: fields.value(Field::LastName).to_string(),
        },
        billing_address: billing_address(fields),
    };

    DirectChargeRequest {
        action,
        order: order_details(fields),
        card,
        ip_address: fields.value(Field::Ip).to_string(),
    }
}

pub fn build_express_checkout_init(fields: &TransactionFields) -> ExpressCheckoutInitRequest {
    ExpressCheckoutInitRequest {
        total: amount(fields),
        no_shipping: fields.value(Field::NoShipping).to_string(),
        cancel_url: fields.value(Field::CancelUrl).to_string(),
        return_url: fields.value(Field::ReturnUrl).to_string(),
    }
}

pub fn build_express_checkout_details(token: &str) -> ExpressCheckoutDetailsRequest {
    ExpressCheckoutDetailsRequest {
        token: token.to_string(),
    }
}

/// Capture uses the billing address fields as the ship-to address, so callers
/// normally run [`TransactionFields::apply_payer_details`] first.
pub fn build_express_checkout_capture(
    fields: &TransactionFields,
    token: &str,
    payer_id: &str,
) -> ExpressCheckoutCaptureRequest {
    ExpressCheckoutCaptureRequest {
        token: token.to_string(),
        payer_id: payer_id.to_string(),
        action: fields.payment_action(),
        order: order_details(fields),
        ship_to: billing_address(fields),
    }
}
