use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::record::CandidateId;
use crate::store::{self, ArtifactError};

/// Which postings to keep: both conditions must hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub job_functions: HashSet<String>,
    pub organization_name: String,
}

impl FilterCriteria {
    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        store::read_json(path)
    }

    fn matches_function(&self, descriptor: &Descriptor) -> bool {
        descriptor
            .job_category
            .iter()
            .any(|category| self.job_functions.contains(&category.name))
    }

    fn matches_organization(&self, descriptor: &Descriptor) -> bool {
        descriptor.parent_organization_name.as_deref() == Some(self.organization_name.as_str())
    }

    pub fn matches(&self, descriptor: &Descriptor) -> bool {
        self.matches_function(descriptor) && self.matches_organization(descriptor)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SearchResponse {
    pub search_result: SearchResult,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SearchResult {
    #[serde(default)]
    pub search_result_items: Vec<SearchResultItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SearchResultItem {
    pub matched_object_descriptor: Descriptor,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Descriptor {
    #[serde(rename = "ID")]
    pub id: CandidateId,
    #[serde(default)]
    pub job_category: Vec<JobCategory>,
    #[serde(default)]
    pub parent_organization_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct JobCategory {
    pub name: String,
}

#[derive(Debug, Error)]
pub enum FilterError {
    #[error("search request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("search endpoint answered HTTP {0}")]
    Status(reqwest::StatusCode),
}

/// Ids of matching items, in the order the API returned them.
pub fn filter_ids(response: &SearchResponse, criteria: &FilterCriteria) -> Vec<CandidateId> {
    response
        .search_result
        .search_result_items
        .iter()
        .map(|item| &item.matched_object_descriptor)
        .filter(|descriptor| criteria.matches(descriptor))
        .map(|descriptor| descriptor.id)
        .collect()
}

/// Query the search endpoint once and filter its results.
pub async fn try_select_ids(
    client: &reqwest::Client,
    endpoint: &str,
    criteria: &FilterCriteria,
) -> Result<Vec<CandidateId>, FilterError> {
    info!("Fetching search results");
    let response = client.get(endpoint).send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(FilterError::Status(status));
    }

    let body: SearchResponse = response.json().await?;
    let total = body.search_result.search_result_items.len();
    let ids = filter_ids(&body, criteria);
    info!("{} of {} postings match the filter", ids.len(), total);
    Ok(ids)
}

/// Like [`try_select_ids`], but a failed fetch is logged and reads as
/// "no matches".
pub async fn select_ids(
    client: &reqwest::Client,
    endpoint: &str,
    criteria: &FilterCriteria,
) -> Vec<CandidateId> {
    match try_select_ids(client, endpoint, criteria).await {
        Ok(ids) => ids,
        Err(e) => {
            warn!("Error occurred while fetching search results: {}", e);
            Vec::new()
        }
    }
}
