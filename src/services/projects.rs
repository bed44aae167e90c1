// src/services/projects.rs

//! Project and birthday sources.
//!
//! Fetches project records from the subgraph and creation timestamps from the
//! metadata endpoint, with transparent offset pagination.

use std::collections::HashMap;
use std::future::Future;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::models::Project;
use crate::services::GraphClient;

/// Fetch every page of an offset-paginated record set.
///
/// Calls `fetch_page(offset, limit)` starting at offset 0, advancing by the
/// number of records returned, until a page comes back shorter than the
/// requested size. An empty source yields an empty result, not an error; a
/// failed page fails the whole fetch.
pub async fn fetch_paginated<T, F, Fut>(page_size: usize, mut fetch_page: F) -> Result<Vec<T>>
where
    F: FnMut(usize, usize) -> Fut,
    Fut: Future<Output = Result<Vec<T>>>,
{
    let mut records = Vec::new();
    loop {
        let page = fetch_page(records.len(), page_size).await?;
        let fetched = page.len();
        records.extend(page);
        if fetched < page_size {
            break;
        }
    }
    Ok(records)
}

/// A backend exposing the full project set of one source.
#[async_trait]
pub trait ProjectSource: Send + Sync {
    /// Fetch all projects belonging to `source_id` (a contract address).
    async fn fetch_projects(&self, source_id: &str) -> Result<Vec<Project>>;
}

/// A backend exposing creation timestamps keyed `"contract-projectNumber"`.
#[async_trait]
pub trait BirthdaySource: Send + Sync {
    async fn fetch_birthdays(&self) -> Result<HashMap<String, DateTime<Utc>>>;
}

const CONTRACT_PROJECTS_QUERY: &str = r"
query getContractProjects($id: ID!, $first: Int!, $skip: Int) {
  contract(id: $id) {
    projects(first: $first, skip: $skip, orderBy: projectId) {
      projectId
      name
      invocations
      maxInvocations
      active
      contract {
        id
      }
    }
  }
}";

const PROJECT_START_TIMES_QUERY: &str = r"
query getProjectStartTimes($first: Int!, $skip: Int) {
  projects_metadata(limit: $first, offset: $skip) {
    id
    start_datetime
  }
}";

#[derive(Debug, Deserialize)]
struct ContractProjectsData {
    contract: Option<ContractData>,
}

#[derive(Debug, Deserialize)]
struct ContractData {
    projects: Vec<RawProject>,
}

/// Project row as the subgraph returns it. BigInt fields arrive as strings.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawProject {
    project_id: String,
    #[serde(default)]
    name: Option<String>,
    invocations: String,
    max_invocations: String,
    active: bool,
    contract: RawContractRef,
}

#[derive(Debug, Deserialize)]
struct RawContractRef {
    id: String,
}

impl RawProject {
    fn into_project(self, source_id: &str) -> Result<Project> {
        let project_id = self
            .project_id
            .parse::<u32>()
            .map_err(|e| AppError::source(source_id, format!("bad projectId: {e}")))?;
        let invocations = self
            .invocations
            .parse::<u64>()
            .map_err(|e| AppError::source(source_id, format!("bad invocations: {e}")))?;
        let max_invocations = self
            .max_invocations
            .parse::<u64>()
            .map_err(|e| AppError::source(source_id, format!("bad maxInvocations: {e}")))?;

        Ok(Project {
            project_id,
            contract: self.contract.id,
            name: self.name.unwrap_or_default(),
            invocations,
            max_invocations,
            active: self.active,
            start_time: None,
        })
    }
}

/// Subgraph-backed project source.
pub struct GraphProjectSource {
    graph: GraphClient,
    page_size: usize,
}

impl GraphProjectSource {
    pub fn new(graph: GraphClient, page_size: usize) -> Self {
        Self { graph, page_size }
    }

    async fn fetch_page(&self, source_id: &str, skip: usize, first: usize) -> Result<Vec<Project>> {
        let variables = serde_json::json!({ "id": source_id, "first": first, "skip": skip });
        let data: ContractProjectsData = self
            .graph
            .query(CONTRACT_PROJECTS_QUERY, variables)
            .await
            .map_err(|e| AppError::source(source_id, e))?;

        // An unknown contract resolves to null; treat it as an empty source.
        let rows = data.contract.map(|c| c.projects).unwrap_or_default();
        rows.into_iter()
            .map(|raw| raw.into_project(source_id))
            .collect()
    }
}

#[async_trait]
impl ProjectSource for GraphProjectSource {
    async fn fetch_projects(&self, source_id: &str) -> Result<Vec<Project>> {
        fetch_paginated(self.page_size, |skip, first| {
            self.fetch_page(source_id, skip, first)
        })
        .await
    }
}

#[derive(Debug, Deserialize)]
struct StartTimesData {
    projects_metadata: Vec<RawStartTime>,
}

#[derive(Debug, Deserialize)]
struct RawStartTime {
    id: String,
    #[serde(default)]
    start_datetime: Option<String>,
}

/// Metadata-endpoint-backed birthday source.
pub struct MetadataBirthdaySource {
    graph: GraphClient,
    page_size: usize,
}

impl MetadataBirthdaySource {
    pub fn new(graph: GraphClient, page_size: usize) -> Self {
        Self { graph, page_size }
    }
}

#[async_trait]
impl BirthdaySource for MetadataBirthdaySource {
    async fn fetch_birthdays(&self) -> Result<HashMap<String, DateTime<Utc>>> {
        let rows = fetch_paginated(self.page_size, |skip, first| async move {
            let variables = serde_json::json!({ "first": first, "skip": skip });
            let data: StartTimesData = self
                .graph
                .query(PROJECT_START_TIMES_QUERY, variables)
                .await
                .map_err(|e| AppError::source("metadata", e))?;
            Ok(data.projects_metadata)
        })
        .await?;

        let mut birthdays = HashMap::new();
        for row in rows {
            let Some(raw) = row.start_datetime else {
                continue;
            };
            match DateTime::parse_from_rfc3339(&raw) {
                Ok(dt) => {
                    birthdays.insert(row.id, dt.with_timezone(&Utc));
                }
                Err(e) => {
                    log::warn!("Skipping bad start_datetime '{}' for {}: {}", raw, row.id, e);
                }
            }
        }
        Ok(birthdays)
    }
}
