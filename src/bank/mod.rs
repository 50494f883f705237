//! Bank domain models and the upstream REST seam
//!
//! [`BankApi`] is what the fetcher and aggregator depend on;
//! [`HttpBankApi`] implements it over the request path builder.

pub mod models;
pub mod page;

pub use models::{CardCharge, Organization, Transaction, User, CARD_CHARGE};
pub use page::{Page, PageMeta};

use crate::api::{ApiClient, Headers};
use crate::error::Result;
use async_trait::async_trait;
use tracing::debug;

#[async_trait]
pub trait BankApi: Send + Sync {
    /// `GET /organizations/{id}`
    async fn organization(&self, org_id: &str) -> Result<Organization>;

    /// `GET /organizations/{id}/transactions?per_page=N&page=P&expand=card_charge`
    async fn transactions_page(
        &self,
        org_id: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Page<Transaction>>;
}

pub struct HttpBankApi {
    client: ApiClient,
}

impl HttpBankApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }
}

#[async_trait]
impl BankApi for HttpBankApi {
    async fn organization(&self, org_id: &str) -> Result<Organization> {
        let value = self
            .client
            .path()
            .segment("organizations")
            .segment(org_id)
            .get()
            .call(Headers::new())
            .await?;

        Ok(serde_json::from_value(value)?)
    }

    async fn transactions_page(
        &self,
        org_id: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Page<Transaction>> {
        let response = self
            .client
            .path()
            .segment("organizations")
            .segment(org_id)
            .segment("transactions")
            .search_params([
                ("per_page", per_page.to_string()),
                ("page", page.to_string()),
                ("expand", "card_charge".to_string()),
            ])
            .get()
            .call_raw(Headers::new())
            .await?;

        let meta = PageMeta::from_headers(&response.headers);
        let records: Vec<Transaction> = serde_json::from_value(response.parsed)?;
        debug!(
            "Fetched {} transactions for {} page {} (next: {:?}, total: {:?})",
            records.len(),
            org_id,
            page,
            meta.next_page,
            meta.total_pages
        );

        Ok(Page::new(records, meta))
    }
}
