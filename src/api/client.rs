//! Configured HTTP client shared by every service

use super::request::{
    ApiRequest, ApiResponse, Method, MultipartBody, PartValue, PreparedRequest, RawResponse,
    RequestBody,
};
use crate::config::{ClientConfig, SOURCE_TYPE};
use crate::error::{Error, Result};
use crate::session::SessionStore;
use async_trait::async_trait;
use futures_util::StreamExt;
use std::collections::BTreeMap;
use std::sync::Arc;

pub const HEADER_SOURCE_TYPE: &str = "X-Source-Type";
pub const HEADER_AUTHORIZATION: &str = "Authorization";
pub const HEADER_CONTENT_TYPE: &str = "Content-Type";

/// Sends a prepared request and returns the undecoded response.
///
/// Status codes are not interpreted here; a 4xx/5xx is still `Ok`.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: PreparedRequest) -> Result<RawResponse>;
}

/// reqwest based transport with a response size limit
pub struct HttpTransport {
    client: reqwest::Client,
    max_response_bytes: u64,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("pdf-tools/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(Error::HttpRequest)?;

        Ok(Self {
            client,
            max_response_bytes: config.max_response_bytes,
        })
    }
}

fn into_form(body: MultipartBody) -> Result<reqwest::multipart::Form> {
    let mut form = reqwest::multipart::Form::new();
    for part in body.into_parts() {
        form = match part.value {
            PartValue::Text(value) => form.text(part.name, value),
            PartValue::File {
                file_name,
                content_type,
                data,
            } => {
                let file_part = reqwest::multipart::Part::bytes(data)
                    .file_name(file_name)
                    .mime_str(&content_type)
                    .map_err(Error::HttpRequest)?;
                form.part(part.name, file_part)
            }
        };
    }
    Ok(form)
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: PreparedRequest) -> Result<RawResponse> {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self.client.request(method, &request.url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder = match request.body {
            RequestBody::None => builder,
            RequestBody::Json(value) => builder.body(serde_json::to_vec(&value)?),
            RequestBody::Multipart(body) => builder.multipart(into_form(body)?),
        };

        let response = builder.send().await?;
        let status = response.status().as_u16();

        let mut headers = BTreeMap::new();
        for (name, value) in response.headers() {
            if let Ok(value) = value.to_str() {
                headers.insert(name.as_str().to_ascii_lowercase(), value.to_string());
            }
        }

        // Check Content-Length header for early rejection
        if let Some(content_length) = response.content_length() {
            if content_length > self.max_response_bytes {
                return Err(Error::ResponseTooLarge {
                    size: content_length,
                    max_size: self.max_response_bytes,
                });
            }
        }

        // Stream the body with incremental size checking
        let mut body = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(Error::HttpRequest)?;
            body.extend_from_slice(&chunk);
            if body.len() as u64 > self.max_response_bytes {
                return Err(Error::ResponseTooLarge {
                    size: body.len() as u64,
                    max_size: self.max_response_bytes,
                });
            }
        }

        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }
}

/// The single configured API client.
///
/// Attaches `X-Source-Type` and, when a session holds a token,
/// `Authorization: Bearer <token>` to every request. One attempt per call.
#[derive(Clone)]
pub struct ApiClient {
    config: Arc<ClientConfig>,
    session: Arc<SessionStore>,
    transport: Arc<dyn Transport>,
}

impl ApiClient {
    /// Create a client backed by the real HTTP transport
    pub fn new(config: ClientConfig, session: Arc<SessionStore>) -> Result<Self> {
        let transport = Arc::new(HttpTransport::new(&config)?);
        Ok(Self::with_transport(config, session, transport))
    }

    pub fn with_transport(
        config: ClientConfig,
        session: Arc<SessionStore>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            session,
            transport,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    /// Resolve the URL and attach default headers.
    ///
    /// The token is captured here, so a logout racing an in-flight request
    /// does not affect it.
    pub fn prepare(&self, request: ApiRequest) -> PreparedRequest {
        let mut headers = vec![(HEADER_SOURCE_TYPE.to_string(), SOURCE_TYPE.to_string())];

        // reqwest sets the multipart content type itself (it carries the boundary)
        if !matches!(request.body, RequestBody::Multipart(_)) {
            headers.push((
                HEADER_CONTENT_TYPE.to_string(),
                "application/json".to_string(),
            ));
        }

        if let Some(token) = self.session.access_token() {
            headers.push((HEADER_AUTHORIZATION.to_string(), format!("Bearer {}", token)));
        }

        PreparedRequest {
            method: request.method,
            url: self.config.endpoint(&request.path),
            query: request.query,
            headers,
            body: request.body,
        }
    }

    /// Send a request and tag the response according to `request.expect`
    pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        let expect = request.expect;
        let prepared = self.prepare(request);
        tracing::debug!(method = %prepared.method, url = %prepared.url, "sending request");

        let raw = self.transport.execute(prepared).await?;
        if raw.is_error() {
            tracing::debug!(status = raw.status, "request rejected");
        }
        ApiResponse::from_raw(raw, expect)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory transport for unit tests

    use super::*;
    use parking_lot::Mutex;
    use std::collections::VecDeque;

    /// Replays canned responses and records every request
    #[derive(Default)]
    pub struct FakeTransport {
        responses: Mutex<VecDeque<Result<RawResponse>>>,
        requests: Mutex<Vec<PreparedRequest>>,
    }

    impl FakeTransport {
        pub fn new() -> Arc<Self> {
            Arc::new(Self::default())
        }

        pub fn push(&self, response: RawResponse) {
            self.responses.lock().push_back(Ok(response));
        }

        pub fn push_err(&self, error: Error) {
            self.responses.lock().push_back(Err(error));
        }

        pub fn requests(&self) -> Vec<PreparedRequest> {
            self.requests.lock().clone()
        }

        pub fn last_request(&self) -> Option<PreparedRequest> {
            self.requests.lock().last().cloned()
        }
    }

    #[async_trait]
    impl Transport for FakeTransport {
        async fn execute(&self, request: PreparedRequest) -> Result<RawResponse> {
            self.requests.lock().push(request);
            self.responses
                .lock()
                .pop_front()
                .unwrap_or_else(|| Ok(RawResponse::new(200, Vec::new())))
        }
    }

    pub fn client_with(
        transport: Arc<FakeTransport>,
    ) -> (ApiClient, Arc<SessionStore>) {
        let session = Arc::new(SessionStore::new(Arc::new(
            crate::session::MemoryStore::new(),
        )));
        let client =
            ApiClient::with_transport(ClientConfig::default(), session.clone(), transport);
        (client, session)
    }
}
