use super::{ApiClient, Headers, Method};
use crate::error::Result;
use serde_json::Value;

/// Parsed response plus the transport-level details callers sometimes need
/// (pagination headers, status).
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    /// Lower-cased header names.
    pub headers: Headers,
    pub parsed: Value,
}

/// Immutable accumulated path. Every step returns a new value, so branches
/// taken from the same prefix never see each other's segments.
#[derive(Clone)]
pub struct ApiPath {
    client: ApiClient,
    segments: Vec<String>,
    query: Option<String>,
}

impl ApiPath {
    pub(super) fn root(client: ApiClient) -> Self {
        Self {
            client,
            segments: Vec::new(),
            query: None,
        }
    }

    /// Append one path segment. The value is percent-encoded.
    pub fn segment(&self, name: impl AsRef<str>) -> Self {
        let mut next = self.clone();
        next.segments
            .push(urlencoding::encode(name.as_ref()).into_owned());
        next
    }

    /// Set the query string from key/value pairs, percent-encoding each value.
    ///
    /// Replaces any query set earlier on this branch.
    pub fn search_params<I, K, V>(&self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: ToString,
    {
        let query = params
            .into_iter()
            .map(|(key, value)| {
                format!(
                    "{}={}",
                    key.as_ref(),
                    urlencoding::encode(&value.to_string())
                )
            })
            .collect::<Vec<_>>()
            .join("&");

        let mut next = self.clone();
        next.query = if query.is_empty() { None } else { Some(query) };
        next
    }

    /// Fully resolved URL for this path.
    pub fn url(&self) -> String {
        let mut url = self.client.base_url().to_string();
        if !self.segments.is_empty() {
            url.push('/');
            url.push_str(&self.segments.join("/"));
        }
        if let Some(query) = &self.query {
            url.push('?');
            url.push_str(query);
        }
        url
    }

    pub fn get(&self) -> Endpoint {
        self.endpoint(Method::Get)
    }

    pub fn head(&self) -> Endpoint {
        self.endpoint(Method::Head)
    }

    pub fn post(&self) -> BodyEndpoint {
        self.body_endpoint(Method::Post)
    }

    pub fn put(&self) -> BodyEndpoint {
        self.body_endpoint(Method::Put)
    }

    pub fn patch(&self) -> BodyEndpoint {
        self.body_endpoint(Method::Patch)
    }

    pub fn delete(&self) -> BodyEndpoint {
        self.body_endpoint(Method::Delete)
    }

    pub fn options(&self) -> BodyEndpoint {
        self.body_endpoint(Method::Options)
    }

    fn endpoint(&self, method: Method) -> Endpoint {
        Endpoint {
            client: self.client.clone(),
            method,
            url: self.url(),
        }
    }

    fn body_endpoint(&self, method: Method) -> BodyEndpoint {
        BodyEndpoint {
            client: self.client.clone(),
            method,
            url: self.url(),
        }
    }
}

impl std::fmt::Debug for ApiPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiPath").field("url", &self.url()).finish()
    }
}

/// A bodiless request (GET, HEAD) bound to a resolved URL.
#[derive(Clone)]
pub struct Endpoint {
    client: ApiClient,
    method: Method,
    url: String,
}

impl Endpoint {
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub async fn call(&self, headers: Headers) -> Result<Value> {
        Ok(self.call_raw(headers).await?.parsed)
    }

    pub async fn call_raw(&self, headers: Headers) -> Result<ApiResponse> {
        self.client
            .dispatch(self.method, &self.url, headers, None)
            .await
    }
}

/// A request carrying a body (POST, PUT, PATCH, DELETE, OPTIONS) bound to a
/// resolved URL.
#[derive(Clone)]
pub struct BodyEndpoint {
    client: ApiClient,
    method: Method,
    url: String,
}

impl BodyEndpoint {
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub async fn call(&self, body: &Value, headers: Headers) -> Result<Value> {
        Ok(self.call_raw(body, headers).await?.parsed)
    }

    pub async fn call_raw(&self, body: &Value, headers: Headers) -> Result<ApiResponse> {
        self.client
            .dispatch(self.method, &self.url, headers, Some(body))
            .await
    }
}
