//! Deserializers for numbers that browsers may send as strings.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Deserializer, de};

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString<T> {
    Number(T),
    String(String),
}

/// Accept either a JSON number or a string containing one, e.g. `2500` or `"2500.50"`.
pub(crate) fn number<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + FromStr,
    T::Err: Display,
{
    match NumberOrString::<T>::deserialize(deserializer)? {
        NumberOrString::Number(number) => Ok(number),
        NumberOrString::String(text) => text.trim().parse().map_err(de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Payment {
        #[serde(deserialize_with = "super::number")]
        amount: f64,
        #[serde(deserialize_with = "super::number")]
        month: u8,
    }

    #[test]
    fn accepts_numbers_and_numeric_strings() {
        let from_numbers: Payment = serde_json::from_str(r#"{"amount": 25, "month": 3}"#).unwrap();
        let from_strings: Payment =
            serde_json::from_str(r#"{"amount": " 25.5", "month": "03"}"#).unwrap();

        assert_eq!(from_numbers.amount, 25.0);
        assert_eq!(from_numbers.month, 3);
        assert_eq!(from_strings.amount, 25.5);
        assert_eq!(from_strings.month, 3);
    }

    #[test]
    fn rejects_non_numeric_strings() {
        let result = serde_json::from_str::<Payment>(r#"{"amount": "lots", "month": 1}"#);

        assert!(result.is_err());
    }
}
