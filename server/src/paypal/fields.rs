use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::PaymentError;
use crate::paypal::model::{PayerDetails, PaymentAction};

pub const DEFAULT_CURRENCY: &str = "EUR";

/// Every attribute a caller can set before a charge attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Country,
    Action,
    NoShipping,
    Total,
    Description,
    Custom,
    FirstName,
    LastName,
    Street1,
    Street2,
    City,
    State,
    Zip,
    Email,
    CardType,
    CardNumber,
    CardExpMonth,
    CardExpYear,
    CardVerificationNumber,
    Ip,
    CancelUrl,
    ReturnUrl,
    Currency,
}

impl Field {
    pub const ALL: [Field; 23] = [
        Field::Country,
        Field::Action,
        Field::NoShipping,
        Field::Total,
        Field::Description,
        Field::Custom,
        Field::FirstName,
        Field::LastName,
        Field::Street1,
        Field::Street2,
        Field::City,
        Field::State,
        Field::Zip,
        Field::Email,
        Field::CardType,
        Field::CardNumber,
        Field::CardExpMonth,
        Field::CardExpYear,
        Field::CardVerificationNumber,
        Field::Ip,
        Field::CancelUrl,
        Field::ReturnUrl,
        Field::Currency,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Country => "country",
            Field::Action => "action",
            Field::NoShipping => "noshipping",
            Field::Total => "total",
            Field::Description => "description",
            Field::Custom => "custom",
            Field::FirstName => "firstname",
            Field::LastName => "lastname",
            Field::Street1 => "street1",
            Field::Street2 => "street2",
            Field::City => "city",
            Field::State => "state",
            Field::Zip => "zip",
            Field::Email => "email",
            Field::CardType => "cctype",
            Field::CardNumber => "ccnumber",
            Field::CardExpMonth => "ccexpmonth",
            Field::CardExpYear => "ccexpyear",
            Field::CardVerificationNumber => "ccvnumber",
            Field::Ip => "ip",
            Field::CancelUrl => "cancelurl",
            Field::ReturnUrl => "returnurl",
            Field::Currency => "currency",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Field {
    type Err = PaymentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Field::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| PaymentError::UnknownField(s.to_string()))
    }
}

/// Billing, card and transaction attributes for one payment attempt.
///
/// Values are stored verbatim; nothing is validated on `set`. A field that was
/// never set reads back as `None` and is left out of outgoing requests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionFields {
    values: BTreeMap<Field, String>,
}

impl TransactionFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fields preloaded with the values every attempt used to start from:
    /// country `FR`, a `Sale` action and shipping turned off.
    pub fn with_defaults() -> Self {
        let mut fields = Self::new();
        fields.set(Field::Country, "FR");
        fields.set_payment_action(PaymentAction::Sale);
        fields.set_shipping(false);
        fields
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        self.values.insert(field, value.into());
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.values.get(&field).map(String::as_str)
    }

    /// Stored value, or the empty string when the field is absent.
    pub fn value(&self, field: Field) -> &str {
        self.get(field).unwrap_or_default()
    }

    pub fn contains(&self, field: Field) -> bool {
        self.values.contains_key(&field)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.values.iter().map(|(field, value)| (*field, value.as_str()))
    }

    pub fn currency(&self) -> &str {
        self.get(Field::Currency).unwrap_or(DEFAULT_CURRENCY)
    }

    pub fn set_currency(&mut self, currency: impl Into<String>) {
        self.set(Field::Currency, currency);
    }

    /// Express checkout only. `true` asks the buyer for a shipping address.
    pub fn set_shipping(&mut self, enabled: bool) {
        self.set(Field::NoShipping, if enabled { "0" } else { "1" });
    }

    pub fn set_payment_action(&mut self, action: PaymentAction) {
        self.set(Field::Action, action.as_str());
    }

    /// Action stored in the `action` field. Missing or unrecognised values fall
    /// back to `Sale`.
    pub fn payment_action(&self) -> PaymentAction {
        self.get(Field::Action)
            .and_then(|raw| raw.parse().ok())
            .unwrap_or_default()
    }

    /// Copies what the gateway knows about the payer into the billing fields.
    pub fn apply_payer_details(&mut self, details: &PayerDetails) {
        let updates = [
            (Field::FirstName, &details.first_name),
            (Field::LastName, &details.last_name),
            (Field::Street1, &details.address.street1),
            (Field::Street2, &details.address.street2),
            (Field::City, &details.address.city),
            (Field::State, &details.address.state),
            (Field::Zip, &details.address.zip),
            (Field::Country, &details.address.country),
            (Field::Email, &details.email),
        ];
        for (field, value) in updates {
            self.set(field, value.clone());
        }
    }
}

impl<'a> TryFrom<&'a BTreeMap<String, String>> for TransactionFields {
    type Error = PaymentError;

    fn try_from(raw: &'a BTreeMap<String, String>) -> Result<Self, Self::Error> {
        let mut fields = TransactionFields::new();
        for (key, value) in raw {
            fields.set(key.parse()?, value.clone());
        }
        Ok(fields)
    }
}
