//! Structured-record redaction
//!
//! Brace-delimited blocks embedded in free text are parsed as JSON objects.
//! Known sensitive fields are replaced in place and the object is written
//! back as pretty JSON. A block that does not parse is returned untouched.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

use crate::RecordError;

/// Innermost `{...}` blocks; nested objects are never matched as a whole
pub(crate) static RECORD_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{[^{}]+\}").unwrap());

/// Character hidden contact digits are replaced with
pub const CONTACT_MASK_CHAR: char = 'X';

#[derive(Debug, Clone, Copy)]
enum FieldPolicy {
    Placeholder(&'static str),
    ContactDigits,
    Email,
}

/// Top-level keys (compared case-insensitively) and how they are redacted
const SENSITIVE_FIELDS: &[(&str, FieldPolicy)] = &[
    ("id", FieldPolicy::Placeholder("X")),
    ("name", FieldPolicy::Placeholder("XXX")),
    ("full_name", FieldPolicy::Placeholder("XXX")),
    ("contact", FieldPolicy::ContactDigits),
    ("phone", FieldPolicy::ContactDigits),
    ("mobile", FieldPolicy::ContactDigits),
    ("email", FieldPolicy::Email),
    ("password", FieldPolicy::Placeholder("********")),
    ("token", FieldPolicy::Placeholder("********")),
];

/// A successfully rewritten record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordRewrite {
    pub text: String,
    /// Number of sensitive fields replaced
    pub fields: usize,
    /// Number of other values changed by the value sweep
    pub values: usize,
}

/// Redact the sensitive fields of one brace-delimited block.
///
/// Returns the block unchanged (with `fields == 0`) when it parses but holds
/// no sensitive field.
pub fn redact_record(block: &str) -> Result<RecordRewrite, RecordError> {
    redact_record_with(block, |value| value.to_string())
}

/// Like [`redact_record`], and also passes every other string or number
/// value through `sweep`. A value the sweep changes is stored as a JSON
/// string, so the record stays valid JSON.
pub fn redact_record_with<F>(block: &str, mut sweep: F) -> Result<RecordRewrite, RecordError>
where
    F: FnMut(&str) -> String,
{
    let value: Value = serde_json::from_str(block)?;
    let Value::Object(mut object) = value else {
        return Err(RecordError::NotObject);
    };

    let fields = redact_fields(&mut object);
    let values = object
        .iter_mut()
        .filter(|(key, _)| policy_for(key).is_none())
        .map(|(_, value)| sweep_value(value, &mut sweep))
        .sum();

    if fields == 0 && values == 0 {
        return Ok(RecordRewrite {
            text: block.to_string(),
            fields,
            values,
        });
    }

    let text = serde_json::to_string_pretty(&Value::Object(object)).map_err(RecordError::Serialize)?;
    Ok(RecordRewrite {
        text,
        fields,
        values,
    })
}

fn sweep_value<F>(value: &mut Value, sweep: &mut F) -> usize
where
    F: FnMut(&str) -> String,
{
    match value {
        Value::String(s) => {
            let swept = sweep(s);
            if swept == *s {
                return 0;
            }
            *s = swept;
            1
        }
        Value::Number(n) => {
            let raw = n.to_string();
            let swept = sweep(&raw);
            if swept == raw {
                return 0;
            }
            *value = Value::String(swept);
            1
        }
        Value::Array(items) => items.iter_mut().map(|item| sweep_value(item, sweep)).sum(),
        Value::Object(map) => map.values_mut().map(|item| sweep_value(item, sweep)).sum(),
        Value::Bool(_) | Value::Null => 0,
    }
}

fn redact_fields(object: &mut Map<String, Value>) -> usize {
    let mut fields = 0;
    for (key, value) in object.iter_mut() {
        let Some(policy) = policy_for(key) else {
            continue;
        };

        let replacement = match (policy, &*value) {
            (FieldPolicy::Placeholder(placeholder), _) => Some(placeholder.to_string()),
            (FieldPolicy::ContactDigits, Value::String(s)) => Some(mask_contact(s)),
            (FieldPolicy::ContactDigits, Value::Number(n)) => Some(mask_contact(&n.to_string())),
            (FieldPolicy::Email, Value::String(s)) => Some(mask_email_value(s)),
            _ => None,
        };

        if let Some(replacement) = replacement {
            *value = Value::String(replacement);
            fields += 1;
        }
    }
    fields
}

fn policy_for(key: &str) -> Option<FieldPolicy> {
    SENSITIVE_FIELDS
        .iter()
        .find(|(name, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, policy)| *policy)
}

/// Hide every digit except the first and the last three; other characters
/// and the overall length are kept
pub fn mask_contact(value: &str) -> String {
    let total = value.chars().filter(char::is_ascii_digit).count();
    let mut seen = 0;

    value
        .chars()
        .map(|c| {
            if !c.is_ascii_digit() {
                return c;
            }
            let ordinal = seen;
            seen += 1;
            if ordinal == 0 || ordinal + 3 >= total {
                c
            } else {
                CONTACT_MASK_CHAR
            }
        })
        .collect()
}

fn mask_email_value(value: &str) -> String {
    match value.split_once('@') {
        Some((local, domain)) => match local.chars().next() {
            Some(first) => format!("{first}****@{domain}"),
            None => value.to_string(),
        },
        None => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_record() {
        let rewrite =
            redact_record(r#"{"ID": 101, "Name": "Alice", "Contact": "9876543210"}"#).unwrap();

        assert_eq!(rewrite.fields, 3);
        assert_eq!(
            rewrite.text,
            "{\n  \"ID\": \"X\",\n  \"Name\": \"XXX\",\n  \"Contact\": \"9XXXXXX210\"\n}"
        );

        let parsed: Value = serde_json::from_str(&rewrite.text).unwrap();
        assert_eq!(parsed["Contact"].as_str().unwrap().len(), 10);
    }

    #[test]
    fn test_invalid_block_is_an_error() {
        let result = redact_record(r#"{"ID": 101, "Name": }"#);
        assert!(matches!(result, Err(RecordError::Parse(_))));
    }

    #[test]
    fn test_record_without_sensitive_fields_is_untouched() {
        let block = r#"{"error": "Invalid email or password", "status": 401}"#;
        let rewrite = redact_record(block).unwrap();

        assert_eq!(rewrite.fields, 0);
        assert_eq!(rewrite.text, block);
    }

    #[test]
    fn test_rewrite_is_stable() {
        let once = redact_record(r#"{"id": 7, "email": "bob@example.com", "phone": 5551234567}"#)
            .unwrap()
            .text;
        let twice = redact_record(&once).unwrap().text;

        assert_eq!(once, twice);
        assert!(once.contains("\"b****@example.com\""));
        assert!(once.contains("\"5XXXXXX567\""));
    }

    #[test]
    fn test_swept_number_becomes_a_string() {
        let block = r#"{"ID": 7, "Status": 403, "Retry": true}"#;
        let rewrite = redact_record_with(block, |value| value.replace("403", "***")).unwrap();

        assert_eq!((rewrite.fields, rewrite.values), (1, 1));
        let parsed: Value = serde_json::from_str(&rewrite.text).unwrap();
        assert_eq!(parsed["Status"], "***");
        assert_eq!(parsed["Retry"], true);
    }

    #[test]
    fn test_sweep_skips_sensitive_fields() {
        let mut seen = Vec::new();
        redact_record_with(r#"{"Name": "Alice", "note": "hi", "codes": [1, 2]}"#, |value| {
            seen.push(value.to_string());
            value.to_string()
        })
        .unwrap();

        assert_eq!(seen, vec!["hi", "1", "2"]);
    }

    #[test]
    fn test_mask_contact_shapes() {
        assert_eq!(mask_contact("9876543210"), "9XXXXXX210");
        assert_eq!(mask_contact("+1 555-123-4567"), "+1 XXX-XXX-X567");
        assert_eq!(mask_contact("1234"), "1234");
        assert_eq!(mask_contact("9XXXXXX210"), "9XXXXXX210");
    }

    #[test]
    fn test_block_pattern_skips_nested_objects() {
        let text = r#"outer {"a": {"ID": 1}} done"#;
        let blocks: Vec<_> = RECORD_BLOCK.find_iter(text).map(|m| m.as_str()).collect();

        assert_eq!(blocks, vec![r#"{"ID": 1}"#]);
    }
}
