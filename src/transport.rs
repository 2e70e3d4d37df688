use crate::error::{Error, ErrorKind};
use crate::inflight::CancelSignal;
use crate::logging::RequestLogging;
use crate::request::{Method, RequestDescriptor};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use surf::http::headers::HeaderName;

/// Semantic response container returned by the remote API on success.
/// Passed through to the caller unmodified; the coordinator does not
/// interpret `code` or `message`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub code: u16,
    pub message: String,
    #[serde(default)]
    pub data: Value,
}

/// External collaborator performing the actual network call.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Performs the network call described by `request`. Implementations
    /// must honor `signal` and settle with [`ErrorKind::Canceled`] when it
    /// fires; the coordinator never force-terminates a call itself.
    async fn send(
        &self,
        request: &RequestDescriptor,
        signal: CancelSignal,
    ) -> Result<ResponseEnvelope, Error>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(
        &self,
        request: &RequestDescriptor,
        signal: CancelSignal,
    ) -> Result<ResponseEnvelope, Error> {
        (**self).send(request, signal).await
    }
}

/// Default transport backed by a surf client with request logging.
pub struct SurfTransport {
    http: surf::Client,
}

impl SurfTransport {
    pub fn new() -> Self {
        Self {
            http: surf::Client::new().with(RequestLogging),
        }
    }

    async fn perform(&self, request: &RequestDescriptor) -> Result<ResponseEnvelope, Error> {
        let mut builder = self
            .http
            .request(surf_method(request.method()), request.url());

        if !request.config().params.is_empty() {
            builder = builder
                .query(&request.config().params)
                .map_err(|error| Error::new(ErrorKind::InvalidRequest(error.to_string())))?;
        }
        for (name, value) in &request.config().headers {
            let name = HeaderName::from_bytes(name.clone().into_bytes())
                .map_err(|error| Error::new(ErrorKind::InvalidRequest(error.to_string())))?;
            builder = builder.header(name, value.as_str());
        }
        if let Some(body) = request.body() {
            let body = surf::Body::from_json(body)
                .map_err(|error| Error::new(ErrorKind::InvalidRequest(error.to_string())))?;
            builder = builder.body(body);
        }

        let call = async move {
            let mut response = builder
                .await
                .map_err(|error| Error::new(ErrorKind::Network(error.to_string())))?;
            let status = response.status();
            if !status.is_success() {
                return Err(Error::new(ErrorKind::Status {
                    code: status.into(),
                    message: status.canonical_reason().to_string(),
                }));
            }
            response
                .body_json::<ResponseEnvelope>()
                .await
                .map_err(|error| Error::new(ErrorKind::Network(error.to_string())))
        };

        match request.config().timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .unwrap_or_else(|_| Err(Error::new(ErrorKind::Timeout))),
            None => call.await,
        }
    }
}

impl Default for SurfTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for SurfTransport {
    async fn send(
        &self,
        request: &RequestDescriptor,
        signal: CancelSignal,
    ) -> Result<ResponseEnvelope, Error> {
        tokio::select! {
            result = self.perform(request) => result,
            _ = signal.cancelled() => Err(Error::canceled()),
        }
    }
}

fn surf_method(method: Method) -> surf::http::Method {
    match method {
        Method::Get => surf::http::Method::Get,
        Method::Post => surf::http::Method::Post,
        Method::Put => surf::http::Method::Put,
        Method::Delete => surf::http::Method::Delete,
        Method::Patch => surf::http::Method::Patch,
        Method::Head => surf::http::Method::Head,
    }
}
