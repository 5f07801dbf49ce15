//! HTTP transport shared by every dataset operation
//!
//! Operations describe what they want as an [`ApiRequest`]; the [`Transport`]
//! turns it into exactly one `reqwest` call, drives the loading observer, and
//! decodes the reply into an [`ApiResponse`].

use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, Response, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use tracing::instrument;

use crate::error::{Error, Result};
use crate::export::ExportedFile;
use crate::loading::Loading;
use crate::response::{self, ApiResponse};

/// HTTP method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    fn as_reqwest(self) -> Method {
        match self {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Delete => Method::DELETE,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_reqwest().as_str())
    }
}

/// A part of a multipart form.
#[derive(Debug, Clone, PartialEq)]
pub enum MultipartPart {
    Text {
        name: String,
        value: String,
    },
    File {
        name: String,
        file_name: String,
        content_type: Option<String>,
        data: Vec<u8>,
    },
}

/// Request body.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Json(Value),
    Multipart(Vec<MultipartPart>),
}

/// A fully shaped request, independent of any connection
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: HttpMethod,
    /// Unencoded path segments, relative to the base URL
    pub segments: Vec<String>,
    pub query: Vec<(String, String)>,
    pub body: Option<RequestBody>,
    /// Overrides the transport's default timeout
    pub timeout: Option<Duration>,
}

impl ApiRequest {
    pub fn new<I, S>(method: HttpMethod, segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            method,
            segments: segments.into_iter().map(Into::into).collect(),
            query: Vec::new(),
            body: None,
            timeout: None,
        }
    }

    pub fn get<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(HttpMethod::Get, segments)
    }

    pub fn post<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(HttpMethod::Post, segments)
    }

    pub fn put<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(HttpMethod::Put, segments)
    }

    pub fn delete<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(HttpMethod::Delete, segments)
    }

    /// Appends a query parameter.
    pub fn with_query(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((name.into(), value.to_string()));
        self
    }

    /// Appends a query parameter when a value is present.
    pub fn with_optional_query(self, name: impl Into<String>, value: Option<impl ToString>) -> Self {
        match value {
            Some(value) => self.with_query(name, value),
            None => self,
        }
    }

    /// Sets a JSON request body.
    pub fn with_json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self> {
        self.body = Some(RequestBody::Json(serde_json::to_value(body)?));
        Ok(self)
    }

    /// Sets a multipart form request body.
    pub fn with_multipart(mut self, parts: Vec<MultipartPart>) -> Self {
        self.body = Some(RequestBody::Multipart(parts));
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Path relative to the base URL, e.g. `/dataset/2/10`
    pub fn path(&self) -> String {
        format!("/{}", self.segments.join("/"))
    }
}

/// Sends [`ApiRequest`]s with a shared `reqwest` client
#[derive(Debug, Clone)]
pub struct Transport {
    client: Client,
    base_url: Url,
    timeout: Duration,
}

impl Transport {
    pub fn new(client: Client, base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|e| {
            Error::Configuration(format!("Invalid base URL '{}': {}", base_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(Error::Configuration(format!(
                "Base URL '{}' cannot carry a path",
                base_url
            )));
        }

        Ok(Self {
            client,
            base_url,
            timeout,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Timeout applied to requests that do not override it
    pub fn default_timeout(&self) -> Duration {
        self.timeout
    }

    /// Builds the full URL for a request, percent-encoding each segment.
    pub fn url(&self, request: &ApiRequest) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(&request.segments);
        }
        url
    }

    /// Send a request and decode the JSON envelope
    pub async fn execute<T: DeserializeOwned>(
        &self,
        request: ApiRequest,
        loading: Option<&Loading>,
    ) -> Result<ApiResponse<T>> {
        let _guard = loading.map(Loading::start);

        let response = self.send(request).await?;
        let status = response.status();
        let body = response.bytes().await?;

        let decoded = response::decode(status, &body);
        if let Ok(ApiResponse::Failure(failure)) = &decoded {
            tracing::debug!(
                status = failure.status,
                code = failure.code,
                message = %failure.message,
                "server reported failure"
            );
        }
        decoded
    }

    /// Send a request whose successful reply is a file rather than an envelope
    pub async fn export_file(
        &self,
        request: ApiRequest,
        file_name: String,
        loading: Option<&Loading>,
    ) -> Result<ApiResponse<ExportedFile>> {
        let _guard = loading.map(Loading::start);

        let response = self.send(request).await?;
        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await?;

        let is_json = content_type
            .as_deref()
            .is_some_and(|ct| ct.starts_with("application/json"));
        if !status.is_success() || is_json {
            if let Some(failure) = response::failure(status, &body) {
                tracing::debug!(
                    status = failure.status,
                    code = failure.code,
                    message = %failure.message,
                    "export rejected by server"
                );
                return Ok(ApiResponse::Failure(failure));
            }
        }

        tracing::debug!(file_name = %file_name, bytes = body.len(), "export received");
        Ok(ApiResponse::Success {
            code: i64::from(status.as_u16()),
            message: String::new(),
            data: ExportedFile {
                file_name,
                content_type,
                bytes: body.to_vec(),
            },
        })
    }

    #[instrument(level = "debug", skip(self, request), fields(method = %request.method, path = %request.path()))]
    async fn send(&self, request: ApiRequest) -> Result<Response> {
        let url = self.url(&request);

        tracing::debug!("dispatching request");

        let mut builder = self
            .client
            .request(request.method.as_reqwest(), url)
            .timeout(request.timeout.unwrap_or(self.timeout));

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }

        match request.body {
            Some(RequestBody::Json(body)) => builder = builder.json(&body),
            Some(RequestBody::Multipart(parts)) => builder = builder.multipart(build_form(parts)?),
            None => {}
        }

        match builder.send().await {
            Ok(response) => {
                tracing::debug!(status = response.status().as_u16(), "request settled");
                Ok(response)
            }
            Err(e) => {
                tracing::warn!(error = %e, "request failed");
                Err(Error::Network(e))
            }
        }
    }
}

fn build_form(parts: Vec<MultipartPart>) -> Result<Form> {
    let mut form = Form::new();
    for part in parts {
        form = match part {
            MultipartPart::Text { name, value } => form.text(name, value),
            MultipartPart::File {
                name,
                file_name,
                content_type,
                data,
            } => {
                let mut file = Part::bytes(data).file_name(file_name);
                if let Some(content_type) = content_type {
                    file = file.mime_str(&content_type).map_err(|e| {
                        Error::Validation(format!("Invalid content type '{}': {}", content_type, e))
                    })?;
                }
                form.part(name, file)
            }
        };
    }
    Ok(form)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn transport(base_url: &str) -> Transport {
        Transport::new(Client::new(), base_url, Duration::from_secs(60)).unwrap()
    }

    #[test]
    fn test_path_joins_segments() {
        let request = ApiRequest::get(["dataset", "2", "10"]);
        assert_eq!(request.path(), "/dataset/2/10");
        assert_eq!(ApiRequest::get(["dataset"]).path(), "/dataset");
    }

    #[test]
    fn test_url_respects_base_path() {
        let request = ApiRequest::get(["dataset", "abc"]);

        let url = transport("http://localhost:8080/api").url(&request);
        assert_eq!(url.as_str(), "http://localhost:8080/api/dataset/abc");

        let url = transport("http://localhost:8080/api/").url(&request);
        assert_eq!(url.as_str(), "http://localhost:8080/api/dataset/abc");

        let url = transport("http://localhost:8080").url(&request);
        assert_eq!(url.as_str(), "http://localhost:8080/dataset/abc");
    }

    #[test]
    fn test_url_encodes_segments() {
        let request = ApiRequest::post(["dataset", "lark", "id", "fold/er token", "doc_list"]);
        let url = transport("http://localhost").url(&request);
        assert_eq!(
            url.as_str(),
            "http://localhost/dataset/lark/id/fold%2Fer%20token/doc_list"
        );
    }

    #[test]
    fn test_invalid_base_url_is_configuration_error() {
        let result = Transport::new(Client::new(), "not a url", Duration::from_secs(1));
        assert!(matches!(result, Err(Error::Configuration(_))));

        let result = Transport::new(Client::new(), "mailto:someone@example.com", Duration::from_secs(1));
        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[test]
    fn test_request_builders() {
        let request = ApiRequest::put(["dataset", "id", "sync_web"])
            .with_query("sync_type", "replace")
            .with_optional_query("missing", None::<&str>)
            .with_timeout(Duration::from_secs(5));

        assert_eq!(request.method, HttpMethod::Put);
        assert_eq!(
            request.query,
            vec![("sync_type".to_string(), "replace".to_string())]
        );
        assert_eq!(request.body, None);
        assert_eq!(request.timeout, Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_invalid_multipart_content_type() {
        let parts = vec![MultipartPart::File {
            name: "file".to_string(),
            file_name: "qa.xlsx".to_string(),
            content_type: Some("not a mime".to_string()),
            data: vec![1, 2, 3],
        }];
        assert!(matches!(build_form(parts), Err(Error::Validation(_))));
    }

    #[test]
    fn test_method_display() {
        assert_eq!(HttpMethod::Delete.to_string(), "DELETE");
        assert_eq!(HttpMethod::Put.to_string(), "PUT");
    }
}
