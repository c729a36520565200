//! HTTP surface of a Clova extension.
//!
//! Endpoints:
//! - GET|POST / - Health check
//! - POST /clova - CEK webhook

use lambda_http::{Body, Request, Response};
use tracing::{info, warn};

use crate::http::{header, json_response, text_response, CLOVA_CONTENT_TYPE};
use crate::request::ClovaRequest;
use crate::router::Router;
use crate::signature::{SignatureVerifier, SIGNATURE_HEADER};
use crate::{Config, Error};

/// Body of the health check endpoint.
pub const HEALTH_MESSAGE: &str = "hello from the Clova extension!";

/// A router bound to its state and request checks.
pub struct Extension<S: Sync> {
    application_id: String,
    verifier: SignatureVerifier,
    router: Router<S>,
    state: S,
}

impl<S: Sync + 'static> Extension<S> {
    pub fn new(config: &Config, verifier: SignatureVerifier, router: Router<S>, state: S) -> Self {
        Self {
            application_id: config.application_id.clone(),
            verifier,
            router,
            state,
        }
    }

    pub async fn handle(&self, event: Request) -> Result<Response<Body>, lambda_http::Error> {
        let method = event.method().as_str();
        let path = event.uri().path();

        info!("Received request: method={}, path={}", method, path);

        match (method, path) {
            ("GET" | "POST", "/") => text_response(200, HEALTH_MESSAGE),
            ("POST", "/clova") => self.handle_clova(&event).await,
            _ => text_response(404, "Not found"),
        }
    }

    async fn handle_clova(&self, event: &Request) -> Result<Response<Body>, lambda_http::Error> {
        let body: &[u8] = event.body().as_ref();

        if let Err(e) = self.verifier.verify(body, header(event, SIGNATURE_HEADER)) {
            warn!("Rejected request: {}", e);
            return text_response(e.status_code(), "Invalid signature");
        }

        let request: ClovaRequest = match serde_json::from_slice(body) {
            Ok(request) => request,
            Err(e) => {
                warn!("Failed to parse CEK request: {}", e);
                return json_response(200, CLOVA_CONTENT_TYPE, &self.router.not_understood());
            }
        };

        if request.application_id() != self.application_id {
            let e = Error::InvalidRequest(format!(
                "unexpected application id '{}'",
                request.application_id()
            ));
            warn!("Rejected request: {}", e);
            return text_response(e.status_code(), "Invalid application id");
        }

        info!(
            "Dispatching {:?} for user {}",
            request.intent_name().unwrap_or("non-intent request"),
            request.user_id().unwrap_or("unknown")
        );

        let response = self.router.dispatch(&self.state, &request).await;
        json_response(200, CLOVA_CONTENT_TYPE, &response)
    }
}
