//! Client for the issue tracker's internal development-status API.
//!
//! The endpoints are undocumented and may be missing on some instances, so
//! any non-success status is reported as "no data" rather than an error.

use crate::http::{build_client, from_transport, read_json};
use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::ACCEPT;
use serde_json::Value;
use std::time::Duration;
use testplan_core::config::JiraConfig;
use testplan_core::development::DevDataType;
use testplan_core::error::Result;
use testplan_core::source::DevelopmentStatusSource;

const SERVICE: &str = "Jira development status";

#[derive(Clone)]
pub struct DevStatusClient {
    client: Client,
    config: JiraConfig,
    timeout: Duration,
}

impl DevStatusClient {
    pub fn new(config: JiraConfig, timeout: Duration) -> Self {
        Self {
            client: build_client(),
            config,
            timeout,
        }
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    async fn get(&self, endpoint: &str, query: &[(&str, &str)]) -> Result<Option<Value>> {
        let url = format!("{}/rest/dev-status/latest/issue/{endpoint}", self.config.base_url());
        let response = self
            .client
            .get(&url)
            .basic_auth(&self.config.email, Some(&self.config.api_token))
            .header(ACCEPT, "application/json")
            .query(query)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| from_transport(SERVICE, &e, self.timeout))?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!(endpoint, status = status.as_u16(), "development status unavailable");
            return Ok(None);
        }
        read_json(SERVICE, response, self.timeout).await.map(Some)
    }
}

#[async_trait]
impl DevelopmentStatusSource for DevStatusClient {
    async fn fetch_summary(&self, issue_id: &str) -> Result<Option<Value>> {
        self.get("summary", &[("issueId", issue_id)]).await
    }

    async fn fetch_detail(
        &self,
        issue_id: &str,
        application_type: &str,
        data_type: DevDataType,
    ) -> Result<Option<Value>> {
        self.get(
            "detail",
            &[
                ("issueId", issue_id),
                ("applicationType", application_type),
                ("dataType", data_type.as_ref()),
            ],
        )
        .await
    }
}
