//! Deterministic query-string encoding for link parameters.
//!
//! # Design
//! Every leaf becomes one `key=value` token. Keys and values are escaped
//! like CGI form encoding: only `A-Z a-z 0-9 _ . - ~` stay literal, a space
//! becomes `+`, and every other byte is percent-encoded. Tokens are
//! sorted by their full text and joined with `&`, so the same mapping always
//! yields the same bytes. A nested object is encoded recursively into its own
//! sorted run and its key is dropped; that run sorts as a single token in the
//! parent. Arrays are not exploded: the whole array is stringified as
//! `["a", "b"]` and encoded as one value.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde_json::{Map, Value};

/// Bytes escaped in keys and values. Space is left out here and mapped to
/// `+` afterwards.
const QUERY_ESCAPE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'_')
    .remove(b'.')
    .remove(b'-')
    .remove(b'~')
    .remove(b' ');

/// Encode `params` into a query string (without the leading `?`).
pub fn to_query(params: &Map<String, Value>) -> String {
    let mut tokens: Vec<String> = params
        .iter()
        .map(|(key, value)| match value {
            Value::Object(nested) => to_query(nested),
            scalar => to_param(key, scalar),
        })
        .filter(|token| !token.is_empty())
        .collect();
    tokens.sort();
    tokens.join("&")
}

fn to_param(key: &str, value: &Value) -> String {
    format!("{}={}", escape(key), escape(&stringify(value)))
}

fn stringify(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => inspect(other),
    }
}

/// Text form of a value inside an array: elements separated by `", "`,
/// strings quoted.
fn inspect(value: &Value) -> String {
    match value {
        Value::Array(items) => {
            let items: Vec<String> = items.iter().map(inspect).collect();
            format!("[{}]", items.join(", "))
        }
        other => other.to_string(),
    }
}

pub(crate) fn escape(input: &str) -> String {
    utf8_percent_encode(input, QUERY_ESCAPE)
        .to_string()
        .replace(' ', "+")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use url::form_urlencoded;

    fn map(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn empty_mapping_is_empty_string() {
        assert_eq!(to_query(&Map::new()), "");
    }

    #[test]
    fn tokens_are_sorted() {
        let params = map(json!({"story_id": 1, "feature": "partner", "alias": "a"}));
        assert_eq!(to_query(&params), "alias=a&feature=partner&story_id=1");
    }

    #[test]
    fn values_are_form_urlencoded() {
        let params = map(json!({"$og_description": "Join John's story!"}));
        assert_eq!(to_query(&params), "%24og_description=Join+John%27s+story%21");
    }

    #[test]
    fn arrays_are_encoded_as_one_token() {
        let params = map(json!({"tags": ["greeting", "asd"]}));
        assert_eq!(to_query(&params), "tags=%5B%22greeting%22%2C+%22asd%22%5D");
    }

    #[test]
    fn nested_arrays_keep_element_separator() {
        let params = map(json!({"grid": [[1, 2], [3]]}));
        assert_eq!(to_query(&params), "grid=%5B%5B1%2C+2%5D%2C+%5B3%5D%5D");
    }

    #[test]
    fn tilde_is_literal_and_asterisk_is_escaped() {
        let params = map(json!({"u": "~user*x"}));
        assert_eq!(to_query(&params), "u=~user%2Ax");
    }

    #[test]
    fn plus_and_multibyte_are_percent_encoded() {
        let params = map(json!({"q": "a+b é"}));
        assert_eq!(to_query(&params), "q=a%2Bb+%C3%A9");
    }

    #[test]
    fn nested_mapping_drops_its_key() {
        let params = map(json!({"z": 1, "data": {"b": 2, "a": 1}}));
        assert_eq!(to_query(&params), "a=1&b=2&z=1");
    }

    #[test]
    fn nested_run_sorts_as_one_token() {
        let params = map(json!({"c": 3, "nested": {"d": 4, "a": 1}}));
        // "a=1&d=4" sorts before "c=3" as a whole.
        assert_eq!(to_query(&params), "a=1&d=4&c=3");
    }

    #[test]
    fn empty_nested_mapping_contributes_nothing() {
        let params = map(json!({"b": 1, "empty": {}}));
        assert_eq!(to_query(&params), "b=1");
    }

    #[test]
    fn scalars_use_display_form() {
        let params = map(json!({"n": 1.5, "t": true, "z": null}));
        assert_eq!(to_query(&params), "n=1.5&t=true&z=");
    }

    #[test]
    fn encoding_is_deterministic() {
        let params = map(json!({"b": [1, 2], "a": "x y", "c": {"e": "f"}}));
        assert_eq!(to_query(&params), to_query(&params.clone()));
    }

    #[test]
    fn decoding_recovers_flat_leaf_pairs() {
        let params = map(json!({
            "feature": "partner",
            "story_id": 42,
            "$og_title": "Hello & welcome",
            "inner": {"deep": "value=1"}
        }));
        let query = to_query(&params);
        let mut decoded: Vec<(String, String)> = form_urlencoded::parse(query.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        decoded.sort();
        let expected = vec![
            ("$og_title".to_string(), "Hello & welcome".to_string()),
            ("deep".to_string(), "value=1".to_string()),
            ("feature".to_string(), "partner".to_string()),
            ("story_id".to_string(), "42".to_string()),
        ];
        assert_eq!(decoded, expected);
    }
}
