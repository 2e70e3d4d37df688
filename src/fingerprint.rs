use crate::request::RequestDescriptor;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::fmt;

/// Deterministic identity of a request, derived from its method, URL, query
/// parameters, and body. Headers, timeout, and extensions never contribute.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Hash of the canonical serialization of (method, url, params, body).
    /// Params iterate in key order and JSON object keys are sorted, so
    /// structurally equal requests always produce the same fingerprint.
    /// Every field is hashed as a length-prefixed frame; the byte stream
    /// parses uniquely as a frame sequence, so values containing `=`, `&`,
    /// or any other delimiter cannot collide across field boundaries.
    pub fn of(request: &RequestDescriptor) -> Self {
        let mut hasher = Sha256::new();
        update_framed(&mut hasher, request.method().to_string().as_bytes());
        update_framed(&mut hasher, request.url().as_bytes());
        for (key, value) in &request.config().params {
            update_framed(&mut hasher, key.as_bytes());
            update_framed(&mut hasher, value.as_bytes());
        }
        if let Some(body) = request.body() {
            update_framed(&mut hasher, canonical_json(body).to_string().as_bytes());
        }
        Fingerprint(hex::encode(hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn update_framed(hasher: &mut Sha256, bytes: &[u8]) {
    hasher.update((bytes.len() as u64).to_be_bytes());
    hasher.update(bytes);
}

/// Rebuilds a JSON value with object keys in sorted order at every level, so
/// bodies with the same fields in different insertion order serialize
/// identically. Array order is semantic and preserved.
fn canonical_json(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut sorted = Map::new();
            for key in keys {
                sorted.insert(key.clone(), canonical_json(&map[key.as_str()]));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonical_json).collect()),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::{Method, RequestDescriptor};
    use serde_json::{json, Map, Value};

    #[test]
    fn identical_requests_share_a_fingerprint() {
        let first = RequestDescriptor::new(Method::Get, "/items").param("page", "1");
        let second = RequestDescriptor::new(Method::Get, "/items").param("page", "1");

        assert_eq!(Fingerprint::of(&first), Fingerprint::of(&second));
    }

    #[test]
    fn param_insertion_order_is_irrelevant() {
        let first = RequestDescriptor::new(Method::Get, "/items")
            .param("page", "1")
            .param("sort", "name");
        let second = RequestDescriptor::new(Method::Get, "/items")
            .param("sort", "name")
            .param("page", "1");

        assert_eq!(Fingerprint::of(&first), Fingerprint::of(&second));
    }

    #[test]
    fn body_key_order_is_irrelevant() {
        let mut forward = Map::new();
        forward.insert("alpha".to_string(), json!(1));
        forward.insert("beta".to_string(), json!({ "inner": true, "also": 2 }));
        let mut backward = Map::new();
        backward.insert("beta".to_string(), json!({ "also": 2, "inner": true }));
        backward.insert("alpha".to_string(), json!(1));

        let first =
            RequestDescriptor::new(Method::Post, "/items").with_body(Value::Object(forward));
        let second =
            RequestDescriptor::new(Method::Post, "/items").with_body(Value::Object(backward));

        assert_eq!(Fingerprint::of(&first), Fingerprint::of(&second));
    }

    #[test]
    fn headers_and_timeout_do_not_contribute() {
        let plain = RequestDescriptor::new(Method::Get, "/items").param("page", "1");
        let decorated = RequestDescriptor::new(Method::Get, "/items")
            .param("page", "1")
            .header("authorization", "Bearer token")
            .timeout(std::time::Duration::from_secs(5));

        assert_eq!(Fingerprint::of(&plain), Fingerprint::of(&decorated));
    }

    #[test]
    fn differing_fields_produce_distinct_fingerprints() {
        let base = RequestDescriptor::new(Method::Get, "/items").param("page", "1");

        let other_method = RequestDescriptor::new(Method::Delete, "/items").param("page", "1");
        let other_url = RequestDescriptor::new(Method::Get, "/users").param("page", "1");
        let other_param = RequestDescriptor::new(Method::Get, "/items").param("page", "2");
        let with_body =
            RequestDescriptor::new(Method::Get, "/items")
                .param("page", "1")
                .with_body(json!({ "q": "x" }));

        let fingerprint = Fingerprint::of(&base);
        assert_ne!(fingerprint, Fingerprint::of(&other_method));
        assert_ne!(fingerprint, Fingerprint::of(&other_url));
        assert_ne!(fingerprint, Fingerprint::of(&other_param));
        assert_ne!(fingerprint, Fingerprint::of(&with_body));
    }

    #[test]
    fn delimiter_bearing_params_do_not_collide() {
        let merged = RequestDescriptor::new(Method::Get, "/items").param("a", "b&c=d");
        let split = RequestDescriptor::new(Method::Get, "/items")
            .param("a", "b")
            .param("c", "d");

        assert_ne!(Fingerprint::of(&merged), Fingerprint::of(&split));

        let key_side = RequestDescriptor::new(Method::Get, "/items").param("a=b", "c");
        let value_side = RequestDescriptor::new(Method::Get, "/items").param("a", "b=c");

        assert_ne!(Fingerprint::of(&key_side), Fingerprint::of(&value_side));
    }

    #[test]
    fn array_order_is_preserved() {
        let first = RequestDescriptor::new(Method::Post, "/items").with_body(json!([1, 2, 3]));
        let second = RequestDescriptor::new(Method::Post, "/items").with_body(json!([3, 2, 1]));

        assert_ne!(Fingerprint::of(&first), Fingerprint::of(&second));
    }
}
