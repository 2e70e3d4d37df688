use std::time::Instant;
use surf::middleware::{Middleware, Next};
use surf::{Client, Request, Response};

/// Surf middleware logging every outgoing request and its outcome.
pub struct RequestLogging;

#[surf::utils::async_trait]
impl Middleware for RequestLogging {
    async fn handle(
        &self,
        request: Request,
        client: Client,
        next: Next<'_>,
    ) -> surf::Result<Response> {
        let method = request.method();
        let url = request.url().clone();
        log::debug!("-> {} {}", method, url);

        let started = Instant::now();
        let outcome = next.run(request, client).await;
        let elapsed = started.elapsed().as_millis();

        match &outcome {
            Ok(response) => {
                log::debug!("<- {} {} {} ({} ms)", method, url, response.status(), elapsed)
            }
            Err(error) => log::warn!("<- {} {} failed: {} ({} ms)", method, url, error, elapsed),
        }
        outcome
    }
}
