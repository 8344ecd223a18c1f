//! Query string and URL-encoded form parsing.
//!
//! Both produce a JSON object of string values. A key that appears more than
//! once becomes an array of its values, in order of appearance.

use serde_json::{Map, Value};

use crate::{ExtractionError, ExtractionSource};

/// Parsed query or form mapping. Keys keep their first-seen order.
pub type QueryMap = Map<String, Value>;

/// Parses a query string (without the leading `?`).
///
/// # Example
///
/// ```rust
/// use hermes_extract::parse_query;
/// use serde_json::json;
///
/// let query = parse_query(Some("tag=a&limit=10&tag=b")).unwrap();
/// assert_eq!(query["limit"], json!("10"));
/// assert_eq!(query["tag"], json!(["a", "b"]));
///
/// assert!(parse_query(None).unwrap().is_empty());
/// ```
pub fn parse_query(query: Option<&str>) -> Result<QueryMap, ExtractionError> {
    match query {
        Some(query) if !query.is_empty() => parse_pairs(query.as_bytes(), ExtractionSource::Query),
        _ => Ok(QueryMap::new()),
    }
}

/// Parses an `application/x-www-form-urlencoded` body.
pub fn parse_form(body: &[u8]) -> Result<QueryMap, ExtractionError> {
    parse_pairs(body, ExtractionSource::Body)
}

fn parse_pairs(input: &[u8], source: ExtractionSource) -> Result<QueryMap, ExtractionError> {
    let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(input)
        .map_err(|e| ExtractionError::malformed(source, e.to_string()))?;

    let mut map = QueryMap::new();
    for (key, value) in pairs {
        append(&mut map, key, Value::String(value));
    }
    Ok(map)
}

/// Inserts `value` under `key`, turning repeated keys into arrays.
pub(crate) fn append(map: &mut QueryMap, key: String, value: Value) {
    match map.get_mut(&key) {
        Some(Value::Array(values)) => values.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
        None => {
            map.insert(key, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_single_values() {
        let query = parse_query(Some("limit=10&offset=20")).unwrap();
        assert_eq!(Value::Object(query), json!({"limit": "10", "offset": "20"}));
    }

    #[test]
    fn test_repeated_keys_become_arrays() {
        let query = parse_query(Some("id=1&id=2&id=3")).unwrap();
        assert_eq!(query["id"], json!(["1", "2", "3"]));
    }

    #[test]
    fn test_percent_decoding() {
        let query = parse_query(Some("q=hello%20world&name=a+b")).unwrap();
        assert_eq!(query["q"], json!("hello world"));
        assert_eq!(query["name"], json!("a b"));
    }

    #[test]
    fn test_key_order_is_first_seen() {
        let query = parse_query(Some("z=1&a=2&z=3")).unwrap();
        let keys: Vec<_> = query.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["z", "a"]);
    }

    #[test]
    fn test_empty_query() {
        assert!(parse_query(Some("")).unwrap().is_empty());
        assert!(parse_query(None).unwrap().is_empty());
    }

    #[test]
    fn test_form_body() {
        let form = parse_form(b"name=alice&email=alice%40example.com").unwrap();
        assert_eq!(form["email"], json!("alice@example.com"));
    }
}
