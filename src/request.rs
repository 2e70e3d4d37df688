use getset::{CopyGetters, Getters};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;
use strum_macros::{Display, EnumString};

/// HTTP method of a logical request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
}

/// Pass-through request configuration. Only `params` participates in the
/// request fingerprint; headers, timeout, and extensions are forwarded to
/// the transport unchanged.
#[derive(Clone, Debug, Default)]
pub struct RequestConfig {
    /// Query parameters. Stored sorted, so insertion order is irrelevant.
    pub params: BTreeMap<String, String>,
    /// Headers forwarded verbatim to the transport.
    pub headers: BTreeMap<String, String>,
    /// Per-request time limit enforced by the transport.
    pub timeout: Option<Duration>,
    /// Escape hatch for transport-specific options outside the recognized
    /// fields.
    pub extensions: BTreeMap<String, Value>,
}

impl RequestConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn extension(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extensions.insert(key.into(), value);
        self
    }
}

/// A logical request. Consumed to derive a [`Fingerprint`] and handed to the
/// transport; not retained after dispatch.
///
/// [`Fingerprint`]: crate::Fingerprint
#[derive(Clone, Debug, Getters, CopyGetters)]
pub struct RequestDescriptor {
    #[getset(get_copy = "pub")]
    method: Method,
    #[getset(get = "pub")]
    url: String,
    #[getset(get = "pub")]
    body: Option<Value>,
    #[getset(get = "pub")]
    config: RequestConfig,
}

impl RequestDescriptor {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self::with_config(method, url, RequestConfig::default())
    }

    pub fn with_config(method: Method, url: impl Into<String>, config: RequestConfig) -> Self {
        Self {
            method,
            url: url.into(),
            body: None,
            config,
        }
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.params.insert(key.into(), value.into());
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.headers.insert(name.into(), value.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = Some(timeout);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn body_builder_and_accessor_coexist() {
        let request =
            RequestDescriptor::new(Method::Post, "/items").with_body(json!({ "name": "a" }));

        assert_eq!(request.body().as_ref(), Some(&json!({ "name": "a" })));
        assert!(RequestDescriptor::new(Method::Get, "/items").body().is_none());
    }
}
