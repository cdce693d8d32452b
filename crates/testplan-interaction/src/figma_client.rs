//! Design tool client (Figma REST v1).

use crate::http::{build_client, from_transport, read_json};
use async_trait::async_trait;
use reqwest::Client;
use reqwest::StatusCode;
use reqwest::header::ACCEPT;
use serde_json::Value;
use std::time::Duration;
use testplan_core::config::FigmaConfig;
use testplan_core::design::{self, DesignComponent, DesignContext};
use testplan_core::enrichment::Enrichment;
use testplan_core::error::Result;
use testplan_core::source::DesignSource;

const SERVICE: &str = "Figma";
const TOKEN_HEADER: &str = "X-FIGMA-TOKEN";

#[derive(Clone)]
pub struct FigmaClient {
    client: Client,
    config: Option<FigmaConfig>,
    timeout: Duration,
}

impl FigmaClient {
    /// `config` of `None` disables design context.
    pub fn new(config: Option<FigmaConfig>, timeout: Duration) -> Self {
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

    /// GETs `path`; a non-success status yields `Ok(None)` after logging it.
    async fn get(&self, config: &FigmaConfig, path: &str) -> Result<Option<Value>> {
        let url = format!("{}{}", config.api_url.trim_end_matches('/'), path);
        let response = self
            .client
            .get(&url)
            .header(TOKEN_HEADER, &config.token)
            .header(ACCEPT, "application/json")
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| from_transport(SERVICE, &e, self.timeout))?;

        match response.status() {
            StatusCode::OK => read_json(SERVICE, response, self.timeout).await.map(Some),
            StatusCode::NOT_FOUND => {
                tracing::warn!(path, "Figma file not found or not shared with this token");
                Ok(None)
            }
            StatusCode::FORBIDDEN => {
                tracing::warn!(path, "Figma rate limit or insufficient permissions");
                Ok(None)
            }
            status => {
                tracing::warn!(path, status = status.as_u16(), "Figma request failed");
                Ok(None)
            }
        }
    }

    async fn fetch_components(&self, config: &FigmaConfig, file_key: &str) -> Vec<DesignComponent> {
        match self.get(config, &format!("/files/{file_key}/components")).await {
            Ok(Some(payload)) => design::parse_components(&payload),
            Ok(None) => Vec::new(),
            Err(err) => {
                tracing::warn!(file_key, error = %err, "Figma components unavailable");
                Vec::new()
            }
        }
    }
}

#[async_trait]
impl DesignSource for FigmaClient {
    async fn fetch_design(&self, url: &str) -> Enrichment<DesignContext> {
        let Some(config) = &self.config else {
            tracing::debug!("Figma token not configured, skipping design context");
            return Enrichment::Absent;
        };
        let Some(file_key) = design::parse_file_key(url) else {
            tracing::debug!(url, "could not parse Figma file key");
            return Enrichment::Absent;
        };

        let file_path = format!("/files/{file_key}");
        let (file, components) = tokio::join!(
            self.get(config, &file_path),
            self.fetch_components(config, &file_key),
        );

        match file {
            Ok(Some(file)) => {
                let context = design::build_context(&file_key, &file, components);
                tracing::info!(
                    file = %context.file_name,
                    elements = context.elements.len(),
                    components = context.components.len(),
                    "fetched design context"
                );
                Enrichment::Found(context)
            }
            Ok(None) => Enrichment::Absent,
            Err(err) => Enrichment::Failed(err),
        }
    }
}
