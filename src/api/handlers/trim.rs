//! Serde helpers that trim request strings before validation runs.

use serde::{Deserialize, Deserializer};

pub fn string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(|s| s.trim().to_string())
}

/// Pair with `#[serde(default)]` so a missing field stays `None`.
pub fn option<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(|o| o.map(|s| s.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Sample {
        #[serde(deserialize_with = "super::string")]
        required: String,
        #[serde(default, deserialize_with = "super::option")]
        optional: Option<String>,
    }

    #[test]
    fn test_trims_present_values() {
        let sample: Sample =
            serde_json::from_str(r#"{"required":"  a@b.io ","optional":"\t x \n"}"#).unwrap();
        assert_eq!(sample.required, "a@b.io");
        assert_eq!(sample.optional.as_deref(), Some("x"));
    }

    #[test]
    fn test_missing_and_null_optional_stay_none() {
        let missing: Sample = serde_json::from_str(r#"{"required":"a"}"#).unwrap();
        assert!(missing.optional.is_none());

        let null: Sample = serde_json::from_str(r#"{"required":"a","optional":null}"#).unwrap();
        assert!(null.optional.is_none());
    }
}
