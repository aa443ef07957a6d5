//! Mock SL client for running without API access.
//!
//! Loads recorded responses from JSON files and serves them as if they
//! were live API responses.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use super::error::SlError;
use super::source::{DepartureSource, SiteQuery};
use super::types::RealtimeResponse;

/// Mock client that serves responses from JSON files.
#[derive(Debug, Clone)]
pub struct MockSlClient {
    /// Recorded responses, keyed by site id.
    responses: Arc<HashMap<String, RealtimeResponse>>,
}

impl MockSlClient {
    /// Load every `{siteid}.json` file in `data_dir`.
    pub fn new(data_dir: impl AsRef<Path>) -> Result<Self, SlError> {
        let data_dir = data_dir.as_ref();
        let mut responses = HashMap::new();

        let entries = std::fs::read_dir(data_dir).map_err(|e| {
            SlError::MockData(format!("failed to read {}: {e}", data_dir.display()))
        })?;

        for entry in entries {
            let path = entry
                .map_err(|e| SlError::MockData(format!("failed to read directory entry: {e}")))?
                .path();
            if !path.is_file() || path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }

            let site_id = path
                .file_stem()
                .and_then(|s| s.to_str())
                .ok_or_else(|| SlError::MockData(format!("invalid filename: {}", path.display())))?
                .to_string();

            let json = std::fs::read_to_string(&path)
                .map_err(|e| SlError::MockData(format!("failed to read {}: {e}", path.display())))?;
            let response: RealtimeResponse = serde_json::from_str(&json)
                .map_err(|e| SlError::MockData(format!("failed to parse {}: {e}", path.display())))?;

            responses.insert(site_id, response);
        }

        if responses.is_empty() {
            return Err(SlError::MockData(format!(
                "no mock response files found in {}",
                data_dir.display()
            )));
        }

        Ok(Self::from_responses(responses))
    }

    /// Build a mock from responses already in memory.
    pub fn from_responses(responses: HashMap<String, RealtimeResponse>) -> Self {
        Self {
            responses: Arc::new(responses),
        }
    }

    /// Site ids with recorded data.
    pub fn available_sites(&self) -> Vec<String> {
        let mut sites: Vec<String> = self.responses.keys().cloned().collect();
        sites.sort();
        sites
    }
}

impl DepartureSource for MockSlClient {
    async fn realtime_departures(&self, query: &SiteQuery) -> Result<RealtimeResponse, SlError> {
        self.responses
            .get(&query.site_id)
            .cloned()
            .ok_or_else(|| SlError::UnknownSite(query.site_id.clone()))
    }
}
