use async_trait::async_trait;
use rowflow_core::config::SinkConfig;
use rowflow_core::{Row, RowHandler};

use crate::extract::HttpExtractor;

/// POSTs each row's fields as a JSON object to a fixed endpoint.
///
/// With an API key the request carries both `Authorization: Bearer` and an
/// `apikey` header, which covers PostgREST-style gateways.
pub struct HttpPostHandler {
    client: HttpExtractor,
    url: String,
    api_key: Option<String>,
}

impl HttpPostHandler {
    pub fn new(url: String, api_key: Option<String>, timeout_ms: u64) -> anyhow::Result<Self> {
        let api_key = api_key.filter(|k| !k.trim().is_empty());
        let headers: Vec<(&str, &str)> = api_key
            .as_deref()
            .map(|k| vec![("apikey", k)])
            .unwrap_or_default();
        let client = HttpExtractor::with_headers("rowflow", timeout_ms, &headers)?;
        Ok(Self {
            client,
            url,
            api_key,
        })
    }

    pub fn from_config(cfg: &SinkConfig) -> anyhow::Result<Self> {
        let url = cfg
            .url
            .clone()
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| anyhow::anyhow!("sink.url is required for the http sink"))?;
        Self::new(url, cfg.api_key.clone(), cfg.timeout_ms)
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl RowHandler for HttpPostHandler {
    async fn handle(&self, row: &Row) -> anyhow::Result<()> {
        self.client
            .post_json(&self.url, row.fields(), self.api_key.as_deref())
            .await?;
        Ok(())
    }
}
