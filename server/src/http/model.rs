use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutRequest {
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CaptureRequest {
    pub token: String,
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FormRequest {
    /// Hidden inputs, kept in the order the caller sent them.
    #[serde(default, deserialize_with = "ordered_pairs")]
    pub fields: Vec<(String, String)>,
    pub button: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn ordered_pairs<'de, D>(deserializer: D) -> Result<Vec<(String, String)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct PairsVisitor;

    impl<'de> Visitor<'de> for PairsVisitor {
        type Value = Vec<(String, String)>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("an object of string values")
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut pairs = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some(pair) = map.next_entry::<String, String>()? {
                pairs.push(pair);
            }
            Ok(pairs)
        }
    }

    deserializer.deserialize_map(PairsVisitor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_fields_keep_document_order() {
        let request: FormRequest = serde_json::from_str(
            r#"{"fields":{"cmd":"_xclick","business":"shop@example.com","amount":"12.50"}}"#,
        )
        .unwrap();

        let names: Vec<&str> = request.fields.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, vec!["cmd", "business", "amount"]);
        assert_eq!(request.button, None);
    }

    #[test]
    fn test_form_fields_default_to_empty() {
        let request: FormRequest =
            serde_json::from_str(r#"{"button":"https://shop.example.com/pay.png"}"#).unwrap();
        assert!(request.fields.is_empty());
    }

    #[test]
    fn test_form_fields_must_be_strings() {
        assert!(serde_json::from_str::<FormRequest>(r#"{"fields":{"amount":12.5}}"#).is_err());
    }
}
