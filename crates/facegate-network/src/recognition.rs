//! Recognition client.
//!
//! Performs one request/response exchange with the recognition service per
//! call and turns the outcome into a [`RecognitionResult`] or a
//! [`RecognitionError`].
//!
//! # Wire format
//!
//! ```text
//! POST /recognize                      Content-Type: application/json
//! {"image": "<base64 bytes>"}
//!
//! 200 OK
//! {"success": true, "name": "alice", "confidence": 0.97, "timestamp": "..."}
//! {"success": false, "message": "No face detected", "timestamp": "..."}
//! ```
//!
//! # Guarantees
//!
//! - Not connected: `NotConnected`, and the transport is never called.
//! - Exactly one transport call otherwise; no retries.
//! - The whole exchange is bounded by the configured request deadline;
//!   exceeding it yields `TransportFailure(TRANSPORT_TIMEOUT)`.

use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use facegate_core::constants::IMAGE_FIELD;
use facegate_core::{ImagePayload, RecognitionResult, ServiceConfig};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::connectivity::ConnectionStatus;
use crate::error::{RecognitionError, TRANSPORT_TIMEOUT, TransportError};
use crate::transport::{HttpResponse, HttpTransport};

/// Request body for one recognition exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecognitionRequest {
    /// Base64 (standard alphabet, padded) image bytes.
    pub image: String,
}

impl RecognitionRequest {
    /// Encode `payload`. An empty payload encodes to an empty string.
    pub fn new(payload: &ImagePayload) -> Self {
        Self {
            image: STANDARD.encode(payload.as_bytes()),
        }
    }

    /// JSON body: a single object with one field carrying the image.
    pub fn to_body(&self) -> String {
        serde_json::json!({ IMAGE_FIELD: self.image }).to_string()
    }
}

/// Verdict body returned by the service with status 200.
///
/// Missing fields take the negative default, matching what the service sends
/// when it finds no face (`success: false` with a `message` only).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RecognitionResponse {
    #[serde(default)]
    pub success: bool,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub confidence: f32,

    #[serde(default)]
    pub message: Option<String>,

    #[serde(default)]
    pub timestamp: Option<String>,
}

impl RecognitionResponse {
    /// Parse and validate a 200 body.
    ///
    /// # Errors
    ///
    /// Returns `ParseFailure` for malformed JSON, a non-object body, wrongly
    /// typed fields, or a confidence outside `[0, 1]`.
    pub fn parse(body: &str) -> Result<RecognitionResult, RecognitionError> {
        let value: serde_json::Value = serde_json::from_str(body)
            .map_err(|e| RecognitionError::ParseFailure(e.to_string()))?;
        // Derived deserializers also accept sequences; only an object is a verdict.
        if !value.is_object() {
            return Err(RecognitionError::ParseFailure(
                "response body is not a JSON object".to_string(),
            ));
        }
        let response: RecognitionResponse = serde_json::from_value(value)
            .map_err(|e| RecognitionError::ParseFailure(e.to_string()))?;
        response.into_result()
    }

    fn into_result(self) -> Result<RecognitionResult, RecognitionError> {
        let result = RecognitionResult::new(self.success, self.name, self.confidence)
            .map_err(|e| RecognitionError::ParseFailure(e.to_string()))?;
        Ok(match self.message {
            Some(message) => result.with_message(message),
            None => result,
        })
    }
}

/// Body of the service health endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServiceHealth {
    pub status: String,

    #[serde(default)]
    pub timestamp: Option<String>,

    #[serde(default)]
    pub known_faces: u32,
}

impl ServiceHealth {
    pub fn is_online(&self) -> bool {
        self.status == "online"
    }
}

/// Client for the recognition service.
#[derive(Debug, Clone)]
pub struct RecognitionClient<T> {
    transport: T,
    recognize_url: String,
    health_url: String,
    timeout: Duration,
}

impl<T: HttpTransport> RecognitionClient<T> {
    pub fn new(transport: T, config: &ServiceConfig) -> Self {
        Self {
            transport,
            recognize_url: config.recognize_url.clone(),
            health_url: config.health_url.clone(),
            timeout: config.request_timeout,
        }
    }

    /// Run one recognition exchange for `image`.
    ///
    /// # Errors
    ///
    /// - `NotConnected` if `link` reports the link down (no request is sent)
    /// - `TransportFailure(code)` for non-200 statuses, failures below HTTP,
    ///   and deadline expiry
    /// - `ParseFailure` if a 200 body is not a valid verdict
    pub async fn recognize<C: ConnectionStatus>(
        &self,
        link: &C,
        image: &ImagePayload,
    ) -> Result<RecognitionResult, RecognitionError> {
        if !link.is_connected() {
            warn!("Recognition skipped: network not connected");
            return Err(RecognitionError::NotConnected);
        }

        let body = RecognitionRequest::new(image).to_body();
        info!(
            url = %self.recognize_url,
            image_bytes = image.len(),
            "Sending recognition request"
        );

        let response = self
            .bounded(self.transport.post_json(&self.recognize_url, body))
            .await?;

        if !response.is_ok() {
            return Err(self.status_failure(&response));
        }
        debug!(body = %response.body, "Recognition response");

        let result = RecognitionResponse::parse(&response.body).inspect_err(|e| {
            warn!(error = %e, "Unparseable recognition response");
        })?;

        info!(
            success = result.authenticated,
            name = result.subject(),
            confidence = %format!("{:.2}%", result.confidence * 100.0),
            message = result.message.as_deref().unwrap_or(""),
            "Recognition verdict"
        );
        Ok(result)
    }

    /// Query the service health endpoint.
    ///
    /// # Errors
    ///
    /// Same classification as [`recognize`](Self::recognize).
    pub async fn health<C: ConnectionStatus>(
        &self,
        link: &C,
    ) -> Result<ServiceHealth, RecognitionError> {
        if !link.is_connected() {
            return Err(RecognitionError::NotConnected);
        }

        let response = self.bounded(self.transport.get(&self.health_url)).await?;
        if !response.is_ok() {
            return Err(self.status_failure(&response));
        }
        serde_json::from_str(&response.body)
            .map_err(|e| RecognitionError::ParseFailure(e.to_string()))
    }

    async fn bounded<F>(&self, exchange: F) -> Result<HttpResponse, RecognitionError>
    where
        F: Future<Output = Result<HttpResponse, TransportError>>,
    {
        match tokio::time::timeout(self.timeout, exchange).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(e)) => {
                warn!(error = %e, code = e.code(), "HTTP exchange failed");
                Err(e.into())
            }
            Err(_) => {
                warn!(
                    "HTTP exchange timed out after {}ms",
                    self.timeout.as_millis()
                );
                Err(RecognitionError::TransportFailure(TRANSPORT_TIMEOUT))
            }
        }
    }

    fn status_failure(&self, response: &HttpResponse) -> RecognitionError {
        warn!(status = response.status, body = %response.body, "HTTP error");
        RecognitionError::TransportFailure(i32::from(response.status))
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn recognize_url(&self) -> &str {
        &self.recognize_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_request_encodes_base64() {
        let request = RecognitionRequest::new(&ImagePayload::from(b"face".as_slice()));
        assert_eq!(request.image, "ZmFjZQ==");
        assert_eq!(request.to_body(), r#"{"image":"ZmFjZQ=="}"#);
    }

    #[test]
    fn test_empty_payload_encodes_empty_string() {
        let request = RecognitionRequest::new(&ImagePayload::empty());
        assert_eq!(request.to_body(), r#"{"image":""}"#);
    }

    #[test]
    fn test_parse_positive_verdict() {
        let result =
            RecognitionResponse::parse(r#"{"success": true, "name": "alice", "confidence": 0.97}"#)
                .unwrap();

        assert!(result.authenticated);
        assert_eq!(result.subject_name.as_deref(), Some("alice"));
        assert!((result.confidence - 0.97).abs() < f32::EPSILON);
    }

    #[test]
    fn test_parse_no_face_detected() {
        let result = RecognitionResponse::parse(
            r#"{"success": false, "message": "No face detected", "timestamp": "2025-01-01T00:00:00"}"#,
        )
        .unwrap();

        assert!(!result.authenticated);
        assert_eq!(result.subject_name, None);
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.message.as_deref(), Some("No face detected"));
    }

    #[test]
    fn test_parse_empty_object_is_negative() {
        let result = RecognitionResponse::parse("{}").unwrap();
        assert!(!result.authenticated);
    }

    #[rstest]
    #[case::not_json("not-json")]
    #[case::empty("")]
    #[case::array("[]")]
    #[case::positional_verdict("[true]")]
    #[case::positional_named_verdict(r#"[true, "mallory", 0.9]"#)]
    #[case::null("null")]
    #[case::string_success(r#"{"success": "yes"}"#)]
    #[case::confidence_too_high(r#"{"success": true, "name": "alice", "confidence": 1.5}"#)]
    #[case::confidence_negative(r#"{"success": true, "name": "alice", "confidence": -0.2}"#)]
    fn test_parse_failures(#[case] body: &str) {
        assert!(matches!(
            RecognitionResponse::parse(body),
            Err(RecognitionError::ParseFailure(_))
        ));
    }

    #[test]
    fn test_health_is_online() {
        let health: ServiceHealth =
            serde_json::from_str(r#"{"status": "online", "known_faces": 3}"#).unwrap();
        assert!(health.is_online());
        assert_eq!(health.known_faces, 3);
    }
}
