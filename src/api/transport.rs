use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};

use super::ApiError;
use super::request::{FormPayload, PreparedBody, PreparedRequest, RawResponse};
use crate::models::ClientSettings;

/// Sends one prepared request and returns the raw response.
///
/// Implementations must not retry; a transport failure is reported as
/// [`ApiError::Transport`] carrying the underlying error text.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: PreparedRequest) -> Result<RawResponse, ApiError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, request: PreparedRequest) -> Result<RawResponse, ApiError> {
        (**self).send(request).await
    }
}

/// reqwest-backed transport with a cookie store, so session cookies travel with every call.
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(settings: &ClientSettings) -> Result<Self, ApiError> {
        let mut builder = reqwest::Client::builder()
            .cookie_store(true)
            .user_agent(settings.user_agent.clone());

        if let Some(secs) = settings.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        let client = builder
            .build()
            .map_err(|e| ApiError::Transport(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client })
    }

    fn build_form(payload: FormPayload) -> Result<Form, ApiError> {
        let mut form = Form::new();
        for (name, value) in payload.fields {
            form = form.text(name, value);
        }
        for file in payload.files {
            let part = Part::bytes(file.bytes)
                .file_name(file.file_name)
                .mime_str(&file.mime)?;
            form = form.part(file.field, part);
        }
        Ok(form)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: PreparedRequest) -> Result<RawResponse, ApiError> {
        let mut builder = self.client.request(request.method, &request.url);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        builder = match request.body {
            Some(PreparedBody::Json(value)) => builder.body(value.to_string()),
            // reqwest sets the multipart boundary header itself
            Some(PreparedBody::Multipart(payload)) => builder.multipart(Self::build_form(payload)?),
            None => builder,
        };

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        Ok(RawResponse { status, body })
    }
}
