//! Testing utilities and fixtures
//!
//! In-memory transports for exercising the request builder, the fetcher, and
//! the aggregator without a network.

pub mod fixtures;
pub mod mock_bank;

pub use fixtures::{card_tx, tx, with_memo};
pub use mock_bank::{MockBank, MOCK_BASE_URL};

use crate::api::{Headers, HttpRequest, HttpResponse, HttpTransport};
use crate::error::Result;
use async_trait::async_trait;
use tokio::sync::Mutex;

/// Answers every request with the same canned response and records what it saw.
pub struct RecordingTransport {
    status: u16,
    body: String,
    requests: Mutex<Vec<HttpRequest>>,
}

impl RecordingTransport {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(200, body)
    }

    pub async fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().await.clone()
    }
}

#[async_trait]
impl HttpTransport for RecordingTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.requests.lock().await.push(request);
        Ok(HttpResponse {
            status: self.status,
            headers: Headers::new(),
            body: self.body.clone(),
        })
    }
}
