//! Client-side request coordination on top of a pluggable HTTP transport.
//!
//! For any given request fingerprint (method, URL, query parameters, body)
//! only the most recently dispatched request survives: an identical request
//! issued while an earlier one is still in flight cancels the earlier one,
//! which settles as a failure with `is_canceled() == true`. The transport
//! performs the actual network I/O and is responsible for honoring the
//! cancellation signal it is handed.

mod error;
mod fingerprint;
mod inflight;
mod logging;
mod request;
mod transport;


pub use error::{Error, ErrorKind};
pub use fingerprint::Fingerprint;
pub use inflight::{CancelSignal, InFlightStats, InFlightTable, SharedInFlightTable};
pub use logging::RequestLogging;
pub use request::{Method, RequestConfig, RequestDescriptor};
pub use transport::{ResponseEnvelope, SurfTransport, Transport};

use serde_json::Value;
use std::sync::Arc;

/// Coordinates which logical requests run and when a duplicate is
/// superseded. Cloning shares the transport and the in-flight table, so one
/// instance constructed at startup can be handed to every caller that should
/// share a de-duplication scope.
pub struct RequestCoordinator<T: Transport = SurfTransport> {
    transport: Arc<T>,
    in_flight: SharedInFlightTable,
}

impl<T: Transport> Clone for RequestCoordinator<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            in_flight: Arc::clone(&self.in_flight),
        }
    }
}

impl RequestCoordinator<SurfTransport> {
    /// Coordinator over the default surf transport.
    pub fn new() -> Self {
        Self::with_transport(SurfTransport::new())
    }
}

impl Default for RequestCoordinator<SurfTransport> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Transport> RequestCoordinator<T> {
    pub fn with_transport(transport: T) -> Self {
        Self {
            transport: Arc::new(transport),
            in_flight: Arc::new(InFlightTable::new()),
        }
    }

    pub async fn get(
        &self,
        url: impl Into<String>,
        config: Option<RequestConfig>,
    ) -> Result<ResponseEnvelope, Error> {
        self.dispatch(descriptor(Method::Get, url, None, config))
            .await
    }

    pub async fn post(
        &self,
        url: impl Into<String>,
        body: Option<Value>,
        config: Option<RequestConfig>,
    ) -> Result<ResponseEnvelope, Error> {
        self.dispatch(descriptor(Method::Post, url, body, config))
            .await
    }

    pub async fn put(
        &self,
        url: impl Into<String>,
        body: Option<Value>,
        config: Option<RequestConfig>,
    ) -> Result<ResponseEnvelope, Error> {
        self.dispatch(descriptor(Method::Put, url, body, config))
            .await
    }

    pub async fn delete(
        &self,
        url: impl Into<String>,
        config: Option<RequestConfig>,
    ) -> Result<ResponseEnvelope, Error> {
        self.dispatch(descriptor(Method::Delete, url, None, config))
            .await
    }

    /// Dispatches a request, cancelling any in-flight request with the same
    /// fingerprint first. Suspends until the transport settles, performs its
    /// own table cleanup, and forwards exactly one terminal outcome.
    pub async fn dispatch(
        &self,
        request: RequestDescriptor,
    ) -> Result<ResponseEnvelope, Error> {
        if request.url().is_empty() {
            return Err(Error::new(ErrorKind::InvalidRequest(
                "url must not be empty".to_string(),
            )));
        }

        let fingerprint = Fingerprint::of(&request);
        let (signal, id) = self.in_flight.register(fingerprint.clone());

        let result = self.transport.send(&request, signal).await;
        self.in_flight.settle(&fingerprint, id);

        if let Err(error) = &result {
            if error.is_canceled() {
                log::debug!("{} {} canceled", request.method(), request.url());
            }
        }
        result
    }

    /// Signals cancellation to every in-flight request and clears the table.
    /// The interrupted calls settle as cancellation failures on their own
    /// dispatch paths.
    pub fn cancel_all_pending_requests(&self) {
        self.in_flight.cancel_all();
    }

    pub fn stats(&self) -> InFlightStats {
        self.in_flight.stats()
    }
}

fn descriptor(
    method: Method,
    url: impl Into<String>,
    body: Option<Value>,
    config: Option<RequestConfig>,
) -> RequestDescriptor {
    let mut request = RequestDescriptor::with_config(method, url, config.unwrap_or_default());
    if let Some(body) = body {
        request = request.with_body(body);
    }
    request
}
