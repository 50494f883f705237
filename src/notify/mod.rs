//! Share links and the completion webhook

use crate::api::{ApiClient, Headers, HttpTransport, TextFormatter};
use crate::error::Result;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, warn};

/// Length of the type prefix on bank ids (`usr_`, `org_`).
const ID_PREFIX_LEN: usize = 4;

fn strip_prefix(id: &str) -> &str {
    id.char_indices()
        .nth(ID_PREFIX_LEN)
        .map(|(index, _)| &id[index..])
        .unwrap_or("")
}

fn first_name(name: &str) -> String {
    name.replace('_', " ")
        .split(' ')
        .next()
        .unwrap_or_default()
        .to_string()
}

/// Build the shareable link for a run.
///
/// The query is `<user>_<org>_<org>..._<name>` with id prefixes dropped.
/// Only the first word of the name is kept, with underscores counted as word
/// breaks; a missing or blank name is written as `0`.
pub fn share_link(base: &str, user_id: &str, org_ids: &[String], name: Option<&str>) -> String {
    let mut parts = Vec::with_capacity(org_ids.len() + 2);
    parts.push(strip_prefix(user_id).to_string());
    parts.extend(org_ids.iter().map(|id| strip_prefix(id).to_string()));
    parts.push(match name.map(first_name) {
        Some(first) if !first.is_empty() => urlencoding::encode(&first).into_owned(),
        _ => "0".to_string(),
    });

    format!("{}?q={}", base, parts.join("_"))
}

/// Posts `{"message": ...}` to a webhook. Delivery is best effort.
#[derive(Clone)]
pub struct WebhookNotifier {
    client: ApiClient,
}

impl WebhookNotifier {
    pub fn new(url: &str) -> Result<Self> {
        Self::build(url, None)
    }

    pub fn with_transport(url: &str, transport: Arc<dyn HttpTransport>) -> Result<Self> {
        Self::build(url, Some(transport))
    }

    fn build(url: &str, transport: Option<Arc<dyn HttpTransport>>) -> Result<Self> {
        let mut builder = ApiClient::builder(url).output_formatter(Arc::new(TextFormatter));
        if let Some(transport) = transport {
            builder = builder.transport(transport);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }

    /// Send `message`, logging instead of failing when delivery fails.
    pub async fn notify(&self, message: &str) {
        let mut headers = Headers::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());

        match self
            .client
            .path()
            .post()
            .call_raw(&json!({ "message": message }), headers)
            .await
        {
            Ok(response) if (200..300).contains(&response.status) => {
                debug!("Webhook accepted share link ({})", response.status);
            }
            Ok(response) => warn!("Webhook returned status {}", response.status),
            Err(e) => warn!("Webhook delivery failed: {}", e),
        }
    }
}
