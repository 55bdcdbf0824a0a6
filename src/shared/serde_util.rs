//! Custom serde helpers for bundler wire formats.

/// `u128` that serializes as a decimal string and deserializes from either a
/// string or a JSON number.
///
/// Bundlr nodes report balances as strings (`{"balance": "1000"}`) because
/// atomic amounts overflow JavaScript numbers; some endpoints still send bare
/// numbers.
pub mod u128_string {
    use serde::de::{self, Visitor};
    use serde::{Deserializer, Serializer};

    pub fn serialize<S>(value: &u128, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<u128, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(U128Visitor)
    }

    struct U128Visitor;

    impl<'de> Visitor<'de> for U128Visitor {
        type Value = u128;

        fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
            f.write_str("a non-negative integer or integer string")
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<u128, E> {
            Ok(v as u128)
        }

        fn visit_u128<E: de::Error>(self, v: u128) -> Result<u128, E> {
            Ok(v)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<u128, E> {
            u128::try_from(v).map_err(|_| E::custom(format!("Negative amount: {}", v)))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<u128, E> {
            v.trim()
                .parse::<u128>()
                .map_err(|_| E::custom(format!("Invalid amount: {}", v)))
        }
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Balance {
        #[serde(with = "super::u128_string")]
        balance: u128,
    }

    #[test]
    fn test_accepts_string_and_number() {
        let b: Balance = serde_json::from_str(r#"{"balance": "340282366920938463463"}"#).unwrap();
        assert_eq!(b.balance, 340_282_366_920_938_463_463);
        let b: Balance = serde_json::from_str(r#"{"balance": 7}"#).unwrap();
        assert_eq!(b.balance, 7);
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(serde_json::from_str::<Balance>(r#"{"balance": "abc"}"#).is_err());
        assert!(serde_json::from_str::<Balance>(r#"{"balance": -1}"#).is_err());
    }
}
