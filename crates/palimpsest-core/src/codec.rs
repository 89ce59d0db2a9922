//! Snapshot codec.
//!
//! Snapshots are stored as JSON text in which every value is tagged with its
//! kind (see [`AttributeValue`]), so strings, numbers, timestamps, dates,
//! nulls and nested collections all decode to exactly what was encoded.
//!
//! [`AttributeValue`]: palimpsest_types::AttributeValue

use palimpsest_types::Attributes;

use crate::error::SnapshotError;

/// Encode an attribute map into snapshot text.
///
/// # Errors
///
/// Returns [`SnapshotError::Encode`] only for values JSON cannot represent.
pub fn encode(attributes: &Attributes) -> Result<String, SnapshotError> {
    serde_json::to_string(attributes).map_err(|source| SnapshotError::Encode { source })
}

/// Decode snapshot text into an attribute map.
///
/// # Errors
///
/// Returns [`SnapshotError::CorruptSnapshot`] if `text` is not an encoded
/// attribute map.
pub fn decode(text: &str) -> Result<Attributes, SnapshotError> {
    serde_json::from_str(text).map_err(|source| SnapshotError::CorruptSnapshot { source })
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone, Utc};
    use palimpsest_types::AttributeValue;

    use super::*;

    fn sample() -> Attributes {
        let mut nested = Attributes::new();
        nested.insert("lang".to_owned(), AttributeValue::from("en"));

        let mut attrs = Attributes::new();
        attrs.insert("title".to_owned(), AttributeValue::from("Hi"));
        attrs.insert("views".to_owned(), AttributeValue::Integer(-17));
        attrs.insert("rating".to_owned(), AttributeValue::Float(4.25));
        attrs.insert("published".to_owned(), AttributeValue::Bool(true));
        attrs.insert("deleted_at".to_owned(), AttributeValue::Null);
        attrs.insert(
            "updated_at".to_owned(),
            AttributeValue::from(Utc.with_ymd_and_hms(2009, 6, 1, 12, 30, 5).single()),
        );
        attrs.insert(
            "issue_date".to_owned(),
            AttributeValue::from(NaiveDate::from_ymd_opt(2009, 6, 1)),
        );
        attrs.insert(
            "tags".to_owned(),
            AttributeValue::List(vec![AttributeValue::from("a"), AttributeValue::Integer(2)]),
        );
        attrs.insert("meta".to_owned(), AttributeValue::Map(nested));
        attrs
    }

    #[test]
    fn decode_restores_encoded_values() {
        let attrs = sample();
        let text = encode(&attrs).ok();
        let decoded = text.as_deref().map(decode);
        assert!(matches!(decoded, Some(Ok(ref d)) if *d == attrs));
    }

    #[test]
    fn timestamps_do_not_decay_to_text() {
        let attrs = sample();
        let decoded = encode(&attrs).and_then(|t| decode(&t)).ok();
        let updated = decoded.as_ref().and_then(|d| d.get("updated_at"));
        assert!(matches!(updated, Some(AttributeValue::Timestamp(_))));
    }

    #[test]
    fn non_finite_floats_survive_the_round_trip() {
        let mut attrs = Attributes::new();
        attrs.insert("score".to_owned(), AttributeValue::Float(f64::NAN));
        attrs.insert("limit".to_owned(), AttributeValue::Float(f64::INFINITY));
        attrs.insert("floor".to_owned(), AttributeValue::Float(f64::NEG_INFINITY));

        let decoded = encode(&attrs).and_then(|t| decode(&t)).ok();
        let float = |key: &str| match decoded.as_ref().and_then(|d| d.get(key)) {
            Some(AttributeValue::Float(f)) => Some(*f),
            _ => None,
        };
        assert!(float("score").is_some_and(f64::is_nan));
        assert_eq!(float("limit"), Some(f64::INFINITY));
        assert_eq!(float("floor"), Some(f64::NEG_INFINITY));
    }

    #[test]
    fn empty_map_is_valid() {
        assert_eq!(decode("{}").ok(), Some(Attributes::new()));
    }

    #[test]
    fn malformed_text_is_corrupt() {
        let result = decode("title: Hi\n---");
        assert!(matches!(result, Err(SnapshotError::CorruptSnapshot { .. })));
    }

    #[test]
    fn untagged_values_are_corrupt() {
        let result = decode(r#"{"title": "Hi"}"#);
        assert!(matches!(result, Err(SnapshotError::CorruptSnapshot { .. })));
    }
}
