//! JSON wire helpers. Field names and nesting are exactly those of the
//! producing service, so these are thin wrappers over `serde_json` that map
//! failures into [`SchemaError`].

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::error::SchemaError;

pub fn decode<T: DeserializeOwned>(json: &str) -> Result<T, SchemaError> {
    serde_json::from_str(json).map_err(SchemaError::Decode)
}

/// Accepts a single object or an array of objects.
pub fn decode_batch<T: DeserializeOwned>(json: &str) -> Result<Vec<T>, SchemaError> {
    // Untagged enums lose the field-level error.
    let value: Value = decode(json)?;
    let records = match value {
        array @ Value::Array(_) => serde_json::from_value::<Vec<T>>(array),
        other => serde_json::from_value::<T>(other).map(|record| vec![record]),
    }
    .map_err(SchemaError::Decode)?;

    debug!("Decoded batch of {} record(s)", records.len());
    Ok(records)
}

pub fn encode<T: Serialize>(value: &T) -> Result<String, SchemaError> {
    serde_json::to_string(value).map_err(SchemaError::Encode)
}

pub fn encode_pretty<T: Serialize>(value: &T) -> Result<String, SchemaError> {
    serde_json::to_string_pretty(value).map_err(SchemaError::Encode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ChannelWebhook;

    const HOOK: &str = r#"{
        "uuid": "w1",
        "name": "alerts",
        "description": "pager alerts",
        "channel_uuid": "c1",
        "created_at": "2024-05-01T12:00:00Z",
        "updated_at": "2024-05-02T08:30:00Z"
    }"#;

    #[test]
    fn batch_accepts_single_object() {
        let hooks: Vec<ChannelWebhook> = decode_batch(HOOK).unwrap();
        assert_eq!(hooks.len(), 1);
        assert_eq!(hooks[0].name, "alerts");
    }

    #[test]
    fn batch_accepts_array() {
        let json = format!("[{}, {}]", HOOK, HOOK);
        let hooks: Vec<ChannelWebhook> = decode_batch(&json).unwrap();
        assert_eq!(hooks.len(), 2);

        let empty: Vec<ChannelWebhook> = decode_batch("[]").unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn batch_reports_the_offending_field() {
        let json = r#"[{ "uuid": "w1", "name": "alerts" }]"#;
        let err = decode_batch::<ChannelWebhook>(json).unwrap_err();
        assert!(matches!(err, SchemaError::Decode(_)));
        assert!(err.to_string().contains("missing field `description`"), "got: {}", err);
    }

    #[test]
    fn malformed_json_is_a_decode_error() {
        assert!(matches!(decode::<ChannelWebhook>("{"), Err(SchemaError::Decode(_))));
        assert!(matches!(decode_batch::<ChannelWebhook>("nope"), Err(SchemaError::Decode(_))));
    }

    #[test]
    fn encode_then_decode_is_identity() {
        let hook: ChannelWebhook = decode(HOOK).unwrap();
        assert_eq!(decode::<ChannelWebhook>(&encode(&hook).unwrap()).unwrap(), hook);
        assert_eq!(decode::<ChannelWebhook>(&encode_pretty(&hook).unwrap()).unwrap(), hook);
    }
}
