//! Deserializers for amounts in request bodies.
//!
//! An amount may arrive as a JSON number or as a string. Strings may use
//! Arabic-Indic digits and `,` thousands separators.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, de};

use hivedrive_shared::types::money::parse_amount;

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAmount {
    Text(String),
    Number(serde_json::Number),
}

impl RawAmount {
    fn into_decimal<E: de::Error>(self) -> Result<Decimal, E> {
        let text = match self {
            Self::Text(text) => text,
            Self::Number(number) => number.to_string(),
        };
        parse_amount(&text).ok_or_else(|| E::custom(format!("invalid amount: {text}")))
    }
}

/// Deserializes a required amount.
///
/// # Errors
///
/// Fails when the value is neither a number nor numeric text.
pub fn deserialize<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    RawAmount::deserialize(deserializer)?.into_decimal()
}

/// Deserializes an optional amount. Use with `#[serde(default)]`.
///
/// # Errors
///
/// Fails when a value is present but is not numeric.
pub fn deserialize_option<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<RawAmount>::deserialize(deserializer)?
        .map(RawAmount::into_decimal)
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[derive(Debug, Deserialize)]
    struct Body {
        #[serde(deserialize_with = "deserialize")]
        amount: Decimal,
        #[serde(default, deserialize_with = "deserialize_option")]
        tax: Option<Decimal>,
    }

    fn parse(json: &str) -> Result<Body, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[test]
    fn test_number_and_text_agree() {
        assert_eq!(parse(r#"{"amount": 99.95}"#).unwrap().amount, dec!(99.95));
        assert_eq!(parse(r#"{"amount": "99.95"}"#).unwrap().amount, dec!(99.95));
        assert_eq!(parse(r#"{"amount": 500}"#).unwrap().amount, dec!(500));
    }

    #[test]
    fn test_arabic_digits_and_separators() {
        let body = parse(r#"{"amount": "١٬٢٣٤٫٥٠", "tax": "١٤"}"#).unwrap();
        assert_eq!(body.amount, dec!(1234.50));
        assert_eq!(body.tax, Some(dec!(14)));

        assert_eq!(parse(r#"{"amount": "2,500"}"#).unwrap().amount, dec!(2500));
    }

    #[test]
    fn test_missing_optional_is_none() {
        assert_eq!(parse(r#"{"amount": 1}"#).unwrap().tax, None);
        assert_eq!(parse(r#"{"amount": 1, "tax": null}"#).unwrap().tax, None);
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(parse(r#"{"amount": "twelve"}"#).is_err());
        assert!(parse(r#"{"amount": ""}"#).is_err());
        assert!(parse(r#"{"amount": true}"#).is_err());
    }
}
