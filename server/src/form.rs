//! Hidden-field form that posts a payment to PayPal Website Payments Standard.

use log::warn;
use std::collections::BTreeMap;
use std::fmt::Write;

use crate::error::PaymentError;

pub const TRACKING_PIXEL_URL: &str = "https://www.paypal.com/fr_FR/i/scr/pixel.gif";
pub const DEFAULT_ERROR_MESSAGE: &str = "Error, unable to pay with PayPal";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectForm {
    /// Form `action` target.
    pub host: String,
    /// Image used as the submit button.
    pub button: String,
    /// Hidden inputs, rendered in order.
    pub fields: Vec<(String, String)>,
    pub mandatory_fields: Vec<String>,
    /// Shown instead of the form when a mandatory field is missing.
    pub error_message: String,
}

impl RedirectForm {
    pub fn new(host: impl Into<String>, button: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            button: button.into(),
            fields: Vec::new(),
            mandatory_fields: Vec::new(),
            error_message: DEFAULT_ERROR_MESSAGE.to_string(),
        }
    }

    /// Builds a form from a single value map in which `host` and `button`
    /// travel alongside the hidden fields.
    pub fn from_values(mut values: BTreeMap<String, String>) -> Self {
        let host = values.remove("host").unwrap_or_default();
        let button = values.remove("button").unwrap_or_default();
        Self::new(host, button).with_fields(values)
    }

    pub fn with_fields<I, K, V>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.fields
            .extend(fields.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    pub fn with_mandatory_fields<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.mandatory_fields = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_error_message(mut self, message: impl Into<String>) -> Self {
        self.error_message = message.into();
        self
    }

    fn value_of(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value.as_str())
    }

    /// Fails on the first mandatory field that is absent or empty.
    pub fn check_mandatory_fields(&self) -> Result<(), PaymentError> {
        for name in &self.mandatory_fields {
            match self.value_of(name) {
                Some(value) if !value.is_empty() => {}
                _ => return Err(PaymentError::MissingMandatoryField(name.clone())),
            }
        }
        Ok(())
    }

    pub fn try_render(&self) -> Result<String, PaymentError> {
        self.check_mandatory_fields()?;

        let mut html = format!(
            "<form action=\"{}\" method=\"post\">\n",
            escape_html(&self.host)
        );
        for (name, value) in &self.fields {
            let name = escape_html(name);
            let _ = writeln!(
                html,
                "<input type=\"hidden\" name=\"{name}\" id=\"{name}\" value=\"{}\" />",
                escape_html(value)
            );
        }
        let _ = writeln!(
            html,
            "<input name=\"submit\" src=\"{}\" type=\"image\" style=\"width: auto;\"/>",
            escape_html(&self.button)
        );
        let _ = writeln!(
            html,
            "<img src=\"{TRACKING_PIXEL_URL}\" border=\"0\" alt=\"\" width=\"1\" height=\"1\" />"
        );
        html.push_str("</form>");
        Ok(html)
    }

    /// Form markup, or the error message when the form cannot be submitted.
    pub fn render(&self) -> String {
        match self.try_render() {
            Ok(html) => html,
            Err(e) => {
                warn!("Not rendering payment form: {}", e);
                escape_html(&self.error_message)
            }
        }
    }
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
