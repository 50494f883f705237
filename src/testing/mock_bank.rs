//! In-memory stand-in for the bank REST API

use crate::api::{ApiClient, Headers, HttpRequest, HttpResponse, HttpTransport};
use crate::bank::page::{NEXT_PAGE_HEADER, PAGE_HEADER, TOTAL_PAGES_HEADER};
use crate::bank::Transaction;
use crate::error::{Error, Result};
use async_trait::async_trait;
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

pub const MOCK_BASE_URL: &str = "https://bank.test/api/v3";

struct MockOrg {
    name: String,
    members: Vec<(String, String)>,
    transactions: Vec<Transaction>,
}

/// Serves `/organizations/{id}` and `/organizations/{id}/transactions` from
/// memory, with pagination headers computed from `per_page`.
///
/// Failures are scripted per organization or per page and counted down as
/// requests arrive. Every request is recorded, failed ones included.
pub struct MockBank {
    orgs: HashMap<String, MockOrg>,
    omit_total_pages: bool,
    latency: Option<Duration>,
    org_failures: Mutex<HashMap<String, u32>>,
    page_failures: Mutex<HashMap<(String, u32), u32>>,
    requests: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl Default for MockBank {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBank {
    pub fn new() -> Self {
        Self {
            orgs: HashMap::new(),
            omit_total_pages: false,
            latency: None,
            org_failures: Mutex::new(HashMap::new()),
            page_failures: Mutex::new(HashMap::new()),
            requests: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// Organization named after its id. Transactions are served newest first
    /// in the order given.
    pub fn with_org(self, id: &str, members: Vec<(&str, &str)>, txs: Vec<Transaction>) -> Self {
        self.with_named_org(id, id, members, txs)
    }

    pub fn with_named_org(
        mut self,
        id: &str,
        name: &str,
        members: Vec<(&str, &str)>,
        txs: Vec<Transaction>,
    ) -> Self {
        self.orgs.insert(
            id.to_string(),
            MockOrg {
                name: name.to_string(),
                members: members
                    .into_iter()
                    .map(|(id, name)| (id.to_string(), name.to_string()))
                    .collect(),
                transactions: txs,
            },
        );
        self
    }

    /// Fail the next `times` metadata requests for `org_id`.
    pub fn fail_org(mut self, org_id: &str, times: u32) -> Self {
        self.org_failures
            .get_mut()
            .insert(org_id.to_string(), times);
        self
    }

    /// Fail the next `times` requests for one transactions page.
    pub fn fail_page(mut self, org_id: &str, page: u32, times: u32) -> Self {
        self.page_failures
            .get_mut()
            .insert((org_id.to_string(), page), times);
        self
    }

    pub fn without_total_pages(mut self) -> Self {
        self.omit_total_pages = true;
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Client rooted at [`MOCK_BASE_URL`] that sends through this bank.
    pub fn client(self: &Arc<Self>) -> ApiClient {
        let transport: Arc<dyn HttpTransport> = self.clone();
        match ApiClient::builder(MOCK_BASE_URL).transport(transport).build() {
            Ok(client) => client,
            Err(e) => panic!("mock client: {e}"),
        }
    }

    pub async fn request_urls(&self) -> Vec<String> {
        self.requests.lock().await.clone()
    }

    /// Transactions pages requested for `org_id`, in arrival order.
    pub async fn page_requests(&self, org_id: &str) -> Vec<u32> {
        self.request_urls()
            .await
            .iter()
            .filter_map(|raw| {
                let url = url::Url::parse(raw).ok()?;
                let segments = route(&url);
                if segments.len() != 3 || segments[1] != org_id || segments[2] != "transactions" {
                    return None;
                }
                query_u32(&url, "page")
            })
            .collect()
    }

    /// Highest number of requests observed in flight at once.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    async fn respond(&self, url: &url::Url) -> Result<HttpResponse> {
        let segments = route(url);
        let parts: Vec<&str> = segments.iter().map(String::as_str).collect();

        match parts.as_slice() {
            ["organizations", org_id] => {
                if take_failure(&self.org_failures, org_id.to_string()).await {
                    return Err(Error::Network(format!("scripted failure for {org_id}")));
                }
                match self.orgs.get(*org_id) {
                    Some(org) => Ok(json_response(200, Headers::new(), org_body(org_id, org))),
                    None => Ok(not_found()),
                }
            }
            ["organizations", org_id, "transactions"] => {
                let page = query_u32(url, "page").unwrap_or(1).max(1);
                let per_page = query_u32(url, "per_page").unwrap_or(50).max(1);
                if take_failure(&self.page_failures, (org_id.to_string(), page)).await {
                    return Err(Error::Network(format!(
                        "scripted failure for {org_id} page {page}"
                    )));
                }
                match self.orgs.get(*org_id) {
                    Some(org) => self.transactions_page(org, page, per_page),
                    None => Ok(not_found()),
                }
            }
            _ => Ok(not_found()),
        }
    }

    fn transactions_page(&self, org: &MockOrg, page: u32, per_page: u32) -> Result<HttpResponse> {
        let total = org.transactions.len();
        let per = per_page as usize;
        let total_pages = total.div_ceil(per).max(1) as u32;

        let start = ((page - 1) as usize * per).min(total);
        let end = (start + per).min(total);
        let records = &org.transactions[start..end];

        let mut headers = Headers::new();
        headers.insert(PAGE_HEADER.to_string(), page.to_string());
        let next = if page < total_pages {
            (page + 1).to_string()
        } else {
            String::new()
        };
        headers.insert(NEXT_PAGE_HEADER.to_string(), next);
        if !self.omit_total_pages {
            headers.insert(TOTAL_PAGES_HEADER.to_string(), total_pages.to_string());
        }

        Ok(json_response(200, headers, serde_json::to_value(records)?))
    }
}

#[async_trait]
impl HttpTransport for MockBank {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.requests.lock().await.push(request.url.clone());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        let result = match url::Url::parse(&request.url) {
            Ok(url) => self.respond(&url).await,
            Err(e) => Err(Error::Network(format!("bad url {}: {e}", request.url))),
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

/// Decoded path segments below the `/api/v3` prefix.
fn route(url: &url::Url) -> Vec<String> {
    url.path_segments()
        .map(|segments| {
            segments
                .skip(2)
                .map(|s| {
                    urlencoding::decode(s)
                        .map(|d| d.into_owned())
                        .unwrap_or_else(|_| s.to_string())
                })
                .collect()
        })
        .unwrap_or_default()
}

fn query_u32(url: &url::Url, name: &str) -> Option<u32> {
    url.query_pairs()
        .find(|(key, _)| key == name)
        .and_then(|(_, value)| value.parse().ok())
}

async fn take_failure<K>(failures: &Mutex<HashMap<K, u32>>, key: K) -> bool
where
    K: std::hash::Hash + Eq,
{
    let mut failures = failures.lock().await;
    match failures.get_mut(&key) {
        Some(remaining) if *remaining > 0 => {
            *remaining -= 1;
            true
        }
        _ => false,
    }
}

fn org_body(id: &str, org: &MockOrg) -> serde_json::Value {
    let users: Vec<_> = org
        .members
        .iter()
        .map(|(id, name)| json!({ "id": id, "full_name": name }))
        .collect();

    json!({
        "id": id,
        "slug": id,
        "name": org.name,
        "logo": null,
        "users": users,
    })
}

fn json_response(status: u16, headers: Headers, body: serde_json::Value) -> HttpResponse {
    HttpResponse {
        status,
        headers,
        body: body.to_string(),
    }
}

fn not_found() -> HttpResponse {
    json_response(404, Headers::new(), json!({ "error": "Not found" }))
}
