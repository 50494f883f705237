//! Request path builder
//!
//! An [`ApiClient`] holds the base URL, default headers, formatters, the
//! transport, and an optional rate-limit hook. Endpoints are expressed as a
//! chain of segments off [`ApiClient::path`] and terminated with a verb:
//!
//! ```ignore
//! let client = ApiClient::builder("https://bank.hackclub.com/api/v3")
//!     .header("Bank-Wrapped", "true")
//!     .build()?;
//!
//! let org = client
//!     .path()
//!     .segment("organizations")
//!     .segment("org_123")
//!     .get()
//!     .call(Headers::new())
//!     .await?;
//! ```

pub mod format;
pub mod path;
pub mod rate_limit;
pub mod transport;

pub use format::{InputFormatter, JsonFormatter, OutputFormatter, TextFormatter};
pub use path::{ApiPath, ApiResponse, BodyEndpoint, Endpoint};
pub use rate_limit::{IntervalRateLimiter, RateLimitHook};
pub use transport::{Headers, HttpRequest, HttpResponse, HttpTransport, Method, ReqwestTransport};

use crate::error::{Error, Result};
use futures::future::BoxFuture;
use std::sync::Arc;
use tracing::trace;

/// A default header value, either fixed or computed at dispatch time.
#[derive(Clone)]
pub enum HeaderSource {
    Static(String),
    Dynamic(Arc<dyn Fn() -> BoxFuture<'static, String> + Send + Sync>),
}

impl HeaderSource {
    /// Header recomputed synchronously for each request.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        HeaderSource::Dynamic(Arc::new(move || {
            let value = f();
            Box::pin(async move { value })
        }))
    }

    /// Header awaited for each request, e.g. a rotating token.
    pub fn from_async<F, Fut>(f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = String> + Send + 'static,
    {
        HeaderSource::Dynamic(Arc::new(move || Box::pin(f())))
    }

    async fn resolve(&self) -> String {
        match self {
            HeaderSource::Static(value) => value.clone(),
            HeaderSource::Dynamic(f) => f().await,
        }
    }
}

impl std::fmt::Debug for HeaderSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HeaderSource::Static(value) => f.debug_tuple("Static").field(value).finish(),
            HeaderSource::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

impl From<&str> for HeaderSource {
    fn from(value: &str) -> Self {
        HeaderSource::Static(value.to_string())
    }
}

impl From<String> for HeaderSource {
    fn from(value: String) -> Self {
        HeaderSource::Static(value)
    }
}

struct ClientInner {
    base_url: String,
    default_headers: Vec<(String, HeaderSource)>,
    transport: Arc<dyn HttpTransport>,
    input: Arc<dyn InputFormatter>,
    output: Arc<dyn OutputFormatter>,
    rate_limiter: Option<Arc<dyn RateLimitHook>>,
}

/// Cheaply cloneable handle shared by every path and endpoint built from it.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

impl ApiClient {
    pub fn builder(base_url: impl Into<String>) -> ApiClientBuilder {
        ApiClientBuilder::new(base_url)
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Empty path rooted at the base URL.
    pub fn path(&self) -> ApiPath {
        ApiPath::root(self.clone())
    }

    async fn dispatch(
        &self,
        method: Method,
        url: &str,
        headers: Headers,
        body: Option<&serde_json::Value>,
    ) -> Result<ApiResponse> {
        if let Some(limiter) = &self.inner.rate_limiter {
            limiter.before_request().await;
        }

        let mut merged = Headers::new();
        for (name, source) in &self.inner.default_headers {
            merged.insert(name.clone(), source.resolve().await);
        }
        merged.extend(headers);

        let body = match body {
            Some(body) => Some(self.inner.input.format(body)?),
            None => None,
        };

        trace!("{} {}", method.as_str(), url);
        let response = self
            .inner
            .transport
            .send(HttpRequest {
                method,
                url: url.to_string(),
                headers: merged,
                body,
            })
            .await?;

        let parsed = self.inner.output.parse(&response.body)?;
        Ok(ApiResponse {
            status: response.status,
            headers: response.headers,
            parsed,
        })
    }
}

pub struct ApiClientBuilder {
    base_url: String,
    default_headers: Vec<(String, HeaderSource)>,
    transport: Option<Arc<dyn HttpTransport>>,
    input: Arc<dyn InputFormatter>,
    output: Arc<dyn OutputFormatter>,
    rate_limiter: Option<Arc<dyn RateLimitHook>>,
}

impl ApiClientBuilder {
    fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            default_headers: Vec::new(),
            transport: None,
            input: Arc::new(JsonFormatter),
            output: Arc::new(JsonFormatter),
            rate_limiter: None,
        }
    }

    /// Add a default header; a later header with the same name replaces it.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<HeaderSource>) -> Self {
        let name = name.into();
        self.default_headers.retain(|(existing, _)| *existing != name);
        self.default_headers.push((name, value.into()));
        self
    }

    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn input_formatter(mut self, formatter: Arc<dyn InputFormatter>) -> Self {
        self.input = formatter;
        self
    }

    pub fn output_formatter(mut self, formatter: Arc<dyn OutputFormatter>) -> Self {
        self.output = formatter;
        self
    }

    pub fn rate_limiter(mut self, limiter: Arc<dyn RateLimitHook>) -> Self {
        self.rate_limiter = Some(limiter);
        self
    }

    pub fn build(self) -> Result<ApiClient> {
        let base_url = self.base_url.trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(Error::Config("API base URL is empty".to_string()));
        }
        url::Url::parse(&base_url)
            .map_err(|e| Error::Config(format!("Invalid API base URL {base_url}: {e}")))?;

        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new()?),
        };

        Ok(ApiClient {
            inner: Arc::new(ClientInner {
                base_url,
                default_headers: self.default_headers,
                transport,
                input: self.input,
                output: self.output,
                rate_limiter: self.rate_limiter,
            }),
        })
    }
}
