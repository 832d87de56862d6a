use std::sync::Arc;
use std::time::Instant;

use reqwest::StatusCode;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::error::{ApiError, error_message};
use super::request::{PreparedBody, PreparedRequest, RawResponse, RequestBody, RequestOptions};
use super::transport::Transport;
use crate::metrics::Metrics;

/// The gateway wrapper.
///
/// Each call issues exactly one request through the [`Transport`] and returns the
/// decoded payload or a single [`ApiError`] whose `Display` is the message to show.
#[derive(Clone)]
pub struct ApiClient<T> {
    base_url: String,
    transport: T,
    metrics: Arc<Metrics>,
}

impl<T: Transport> ApiClient<T> {
    pub fn new(base_url: impl Into<String>, transport: T) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            transport,
            metrics: Arc::new(Metrics::new()),
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Resolve the URL, headers and body encoding for one call.
    ///
    /// JSON bodies get an `application/json` content type; multipart bodies get none so the
    /// transport can set the boundary.
    pub fn prepare(&self, path: &str, options: RequestOptions, token: Option<&str>) -> PreparedRequest {
        let url = if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        };

        let mut headers: Vec<(String, String)> = options
            .headers
            .into_iter()
            .filter(|(name, _)| !name.eq_ignore_ascii_case("content-type"))
            .collect();

        if let Some(token) = token.filter(|t| !t.is_empty()) {
            headers.push(("Authorization".to_string(), format!("Bearer {token}")));
        }

        let body = match options.body {
            Some(RequestBody::Json(value)) => {
                headers.push(("Content-Type".to_string(), "application/json".to_string()));
                Some(PreparedBody::Json(value))
            }
            Some(RequestBody::Multipart(form)) => Some(PreparedBody::Multipart(form)),
            None => None,
        };

        PreparedRequest {
            method: options.method,
            url,
            headers,
            query: options.query,
            body,
        }
    }

    pub async fn request<R: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
        token: Option<&str>,
    ) -> Result<R, ApiError> {
        let request = self.prepare(path, options, token);
        let method = request.method.clone();
        tracing::debug!("{} {}", method, path);

        let started = Instant::now();
        let outcome = self.transport.send(request).await;
        self.metrics.record_request(started.elapsed());

        let response = match outcome {
            Ok(response) => response,
            Err(err) => {
                self.metrics.record_request_failed();
                tracing::warn!("{} {} failed before a response: {}", method, path, err);
                return Err(err);
            }
        };

        if !response.is_success() {
            self.metrics.record_request_failed();
            let err = Self::status_error(&response);
            tracing::warn!("{} {} returned {}: {}", method, path, response.status, err);
            return Err(err);
        }

        decode(path, &response.body)
    }

    pub async fn get<R: DeserializeOwned>(&self, path: &str, token: Option<&str>) -> Result<R, ApiError> {
        self.request(path, RequestOptions::get(), token).await
    }

    pub async fn post<B: Serialize, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        token: Option<&str>,
    ) -> Result<R, ApiError> {
        self.request(path, RequestOptions::post().json(body)?, token).await
    }

    pub async fn put<B: Serialize, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        token: Option<&str>,
    ) -> Result<R, ApiError> {
        self.request(path, RequestOptions::put().json(body)?, token).await
    }

    pub async fn delete<R: DeserializeOwned>(&self, path: &str, token: Option<&str>) -> Result<R, ApiError> {
        self.request(path, RequestOptions::delete(), token).await
    }

    fn status_error(response: &RawResponse) -> ApiError {
        let parsed = serde_json::from_str::<Value>(&response.body).ok();
        let reason = StatusCode::from_u16(response.status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .map(str::to_string)
            .unwrap_or_else(|| format!("Request failed with status {}", response.status));

        ApiError::Status {
            status: response.status,
            message: error_message(parsed.as_ref(), &reason),
        }
    }
}

fn decode<R: DeserializeOwned>(path: &str, body: &str) -> Result<R, ApiError> {
    let schema_error = |e: serde_json::Error| ApiError::Schema {
        path: path.to_string(),
        message: e.to_string(),
    };

    let trimmed = body.trim();
    if trimmed.is_empty() {
        // empty acknowledgements decode as null, or as an empty object for envelope types
        return serde_json::from_value(Value::Null)
            .or_else(|_| serde_json::from_value(Value::Object(Default::default())))
            .map_err(schema_error);
    }

    serde_json::from_str(trimmed).map_err(schema_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::request::FormPayload;
    use crate::api::transport::MockTransport;
    use crate::models::{JobsEnvelope, MessageEnvelope};
    use reqwest::Method;

    fn client(mock: MockTransport) -> ApiClient<MockTransport> {
        ApiClient::new("http://api.test/api/", mock)
    }

    #[test]
    fn test_prepare_json_sets_content_type_and_bearer() {
        let api = client(MockTransport::new());
        let options = RequestOptions::post()
            .json(&serde_json::json!({ "email": "a@b.com" }))
            .unwrap();

        let request = api.prepare("/auth/login", options, Some("tok"));

        assert_eq!(request.url, "http://api.test/api/auth/login");
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.header("content-type"), Some("application/json"));
        assert_eq!(request.header("authorization"), Some("Bearer tok"));
    }

    #[test]
    fn test_prepare_multipart_omits_content_type() {
        let api = client(MockTransport::new());
        let options = RequestOptions::post()
            .header("Content-Type", "application/json")
            .multipart(FormPayload::new().text("coverLetter", "hi"));

        let request = api.prepare("applications/apply/J1", options, None);

        assert_eq!(request.url, "http://api.test/api/applications/apply/J1");
        assert_eq!(request.header("content-type"), None);
        assert_eq!(request.header("authorization"), None);
        assert!(matches!(request.body, Some(PreparedBody::Multipart(_))));
    }

    #[tokio::test]
    async fn test_request_decodes_schema() {
        let mut mock = MockTransport::new();
        mock.expect_send()
            .withf(|req| req.url.ends_with("/jobs/AllJobs") && req.query.len() == 1)
            .times(1)
            .returning(|_| {
                Ok(RawResponse::new(
                    200,
                    r#"{"jobs":[{"_id":"J1","title":"Dev","description":"d","location":"Oslo","jobType":"remote"}]}"#,
                ))
            });

        let api = client(mock);
        let options = RequestOptions::get().query(vec![("search".into(), "dev".into())]);
        let envelope: JobsEnvelope = api.request("/jobs/AllJobs", options, None).await.unwrap();

        assert_eq!(envelope.jobs.len(), 1);
        assert_eq!(envelope.jobs[0].id, "J1");
    }

    #[tokio::test]
    async fn test_malformed_payload_is_schema_error() {
        let mut mock = MockTransport::new();
        mock.expect_send()
            .returning(|_| Ok(RawResponse::new(200, r#"{"items":[]}"#)));

        let api = client(mock);
        let err = api.get::<JobsEnvelope>("/jobs/AllJobs", None).await.unwrap_err();

        assert!(matches!(err, ApiError::Schema { ref path, .. } if path == "/jobs/AllJobs"));
    }

    #[tokio::test]
    async fn test_status_error_prefers_server_error_field() {
        let mut mock = MockTransport::new();
        mock.expect_send().returning(|_| {
            Ok(RawResponse::new(401, r#"{"error":"Invalid credentials"}"#))
        });

        let api = client(mock);
        let err = api.get::<JobsEnvelope>("/auth/login", None).await.unwrap_err();

        assert_eq!(err, ApiError::Status { status: 401, message: "Invalid credentials".into() });
        assert_eq!(api.metrics.requests_failed(), 1);
    }

    #[tokio::test]
    async fn test_status_error_without_body_uses_reason() {
        let mut mock = MockTransport::new();
        mock.expect_send()
            .returning(|_| Ok(RawResponse::new(500, "<html>oops</html>")));

        let api = client(mock);
        let err = api.get::<JobsEnvelope>("/jobs/AllJobs", None).await.unwrap_err();

        assert_eq!(err.to_string(), "Internal Server Error");
    }

    #[tokio::test]
    async fn test_transport_error_passes_through_once() {
        let mut mock = MockTransport::new();
        mock.expect_send()
            .times(1)
            .returning(|_| Err(ApiError::Transport("connection refused".into())));

        let api = client(mock);
        let err = api.get::<JobsEnvelope>("/jobs/AllJobs", None).await.unwrap_err();

        assert_eq!(err.to_string(), "connection refused");
    }

    #[tokio::test]
    async fn test_put_sends_json_body_with_token() {
        let mut mock = MockTransport::new();
        mock.expect_send()
            .withf(|req| {
                req.method == Method::PUT
                    && req.header("authorization") == Some("Bearer tok")
                    && matches!(&req.body, Some(PreparedBody::Json(v)) if v["status"] == "verified")
            })
            .times(1)
            .returning(|_| Ok(RawResponse::new(200, r#"{"message":"ok"}"#)));

        let api = client(mock);
        let ack: MessageEnvelope = api
            .put("/admin/recruiters/R1/verify", &serde_json::json!({ "status": "verified" }), Some("tok"))
            .await
            .unwrap();

        assert_eq!(ack.message.as_deref(), Some("ok"));
    }

    #[tokio::test]
    async fn test_empty_body_decodes_message_envelope() {
        let mut mock = MockTransport::new();
        mock.expect_send().returning(|_| Ok(RawResponse::new(204, "")));

        let api = client(mock);
        let ack: MessageEnvelope = api.delete("/jobs/J1", Some("tok")).await.unwrap();

        assert!(ack.message.is_none());
    }
}
