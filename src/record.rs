use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::LoadError;

/// A post as the content API sends it. Every field may be absent.
///
/// Scalars are read leniently: numbers and `true` are stringified, while
/// `null`, `false`, `0`, `""` and nested arrays/objects all count as absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPostRecord {
    #[serde(default, deserialize_with = "lenient_text")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub author: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub content: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub image_0: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub create_at: Option<String>,
}

impl RawPostRecord {
    /// Reads a record out of a JSON value. Only objects are accepted.
    pub fn from_value(value: Value) -> Result<Self, LoadError> {
        if !value.is_object() {
            return Err(LoadError::Decode(format!(
                "expected a JSON object, got {}",
                json_kind(&value)
            )));
        }
        serde_json::from_value(value).map_err(|err| LoadError::Decode(err.to_string()))
    }

    /// Creation time used to order related posts. Unparseable or missing
    /// timestamps yield `None`, which sorts after every real timestamp.
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(self.create_at.as_deref()?)
    }
}

/// JavaScript-style truthiness of a response body.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn lenient_text<'de, D>(de: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(de)?;
    Ok(value.filter(is_truthy).and_then(|v| match v {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }))
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    // Epoch milliseconds.
    if raw.bytes().all(|b| b.is_ascii_digit()) {
        return raw.parse::<i64>().ok().and_then(DateTime::from_timestamp_millis);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_rfc2822(raw))
        .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f%z"))
    {
        return Some(dt.with_timezone(&Utc));
    }

    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn lenient_fields() {
        let record = RawPostRecord::from_value(json!({
            "id": 42,
            "title": "",
            "author": null,
            "description": ["nested"],
            "content": false,
            "image_0": "/a.png",
            "unknown_field": "ignored"
        }))
        .unwrap();

        assert_eq!(record.id.as_deref(), Some("42"));
        assert!(record.title.is_none());
        assert!(record.author.is_none());
        assert!(record.description.is_none());
        assert!(record.content.is_none());
        assert_eq!(record.image_0.as_deref(), Some("/a.png"));
        assert!(record.create_at.is_none());
    }

    #[test]
    fn rejects_non_objects() {
        assert!(matches!(
            RawPostRecord::from_value(json!(["abc"])),
            Err(LoadError::Decode(_))
        ));
        assert!(matches!(
            RawPostRecord::from_value(json!("abc")),
            Err(LoadError::Decode(_))
        ));
    }

    #[test]
    fn truthiness() {
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!("")));
        assert!(is_truthy(&json!({})));
        assert!(is_truthy(&json!([])));
        assert!(is_truthy(&json!("x")));
    }

    #[test]
    fn timestamp_formats() {
        let rfc = parse_timestamp("2024-05-01T10:00:00.000Z").unwrap();
        let naive = parse_timestamp("2024-05-01 10:00:00").unwrap();
        let date = parse_timestamp("2024-05-01").unwrap();
        let millis = parse_timestamp("1714557600000").unwrap();
        let rfc2822 = parse_timestamp("Wed, 01 May 2024 10:00:00 GMT").unwrap();
        let compact_offset = parse_timestamp("2024-05-01T17:00:00+0700").unwrap();

        assert_eq!(rfc, naive);
        assert_eq!(rfc, millis);
        assert_eq!(rfc, rfc2822);
        assert_eq!(rfc, compact_offset);
        assert!(date < rfc);
        assert!(parse_timestamp("yesterday").is_none());
    }
}
