// src/index/builder.rs

//! Periodic full-index rebuild with atomic publish.
//!
//! The indexer refetches every configured source, assembles a fresh
//! [`IndexSnapshot`] off to the side, and swaps it in with a single atomic
//! store. A failed rebuild leaves the previously published snapshot exactly
//! as it was.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use arc_swap::ArcSwap;
use futures::future;

use crate::error::Result;
use crate::models::{IndexerConfig, Project};
use crate::services::{BirthdaySource, ProjectSource};

use super::sampler::sample_qualifying;
use super::snapshot::IndexSnapshot;

/// Orchestrates index rebuilds and owns the published snapshot.
///
/// Only one rebuild may be in flight; a tick that fires mid-rebuild is
/// skipped, not queued. Readers load the last published snapshot without
/// locking, at any time.
pub struct ProjectIndexer<S, B> {
    source: S,
    birthday_source: B,
    contracts: Vec<String>,
    interval: Duration,
    max_sample_attempts: u32,
    published: ArcSwap<IndexSnapshot>,
    rebuilding: AtomicBool,
}

impl<S: ProjectSource, B: BirthdaySource> ProjectIndexer<S, B> {
    pub fn new(
        source: S,
        birthday_source: B,
        config: &IndexerConfig,
        max_sample_attempts: u32,
    ) -> Self {
        Self {
            source,
            birthday_source,
            contracts: config.contracts.clone(),
            interval: Duration::from_secs(config.refresh_interval_minutes * 60),
            max_sample_attempts,
            published: ArcSwap::from_pointee(IndexSnapshot::default()),
            rebuilding: AtomicBool::new(false),
        }
    }

    /// The currently published snapshot.
    pub fn snapshot(&self) -> Arc<IndexSnapshot> {
        self.published.load_full()
    }

    /// Run one rebuild cycle, unless one is already in flight.
    pub async fn rebuild(&self) -> Result<()> {
        if self
            .rebuilding
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            log::debug!("Rebuild already in flight; skipping tick");
            return Ok(());
        }

        let result = self.rebuild_inner().await;
        self.rebuilding.store(false, Ordering::SeqCst);
        result
    }

    async fn rebuild_inner(&self) -> Result<()> {
        // Every source in parallel; any single failure aborts the cycle
        // before anything is published.
        let fetches = self
            .contracts
            .iter()
            .map(|contract| self.source.fetch_projects(contract));
        let per_source: Vec<Vec<Project>> = future::try_join_all(fetches).await?;
        let birthdays = self.birthday_source.fetch_birthdays().await?;

        let mut next = IndexSnapshot::default();
        for mut project in per_source.into_iter().flatten() {
            project.start_time = birthdays.get(&project.metadata_key()).copied();
            log::debug!(
                "Refreshed project {} '{}' on {}",
                project.project_id,
                project.name,
                project.contract
            );
            next.insert(project);
        }

        log::info!(
            "Published index: {} projects across {} sources, {} birthday dates",
            next.len(),
            self.contracts.len(),
            next.birthday_count()
        );
        self.published.store(Arc::new(next));
        Ok(())
    }

    /// Rebuild immediately, then on the configured interval.
    ///
    /// The next tick is scheduled only after the previous rebuild finishes,
    /// so a slow upstream cannot stack concurrent rebuilds. Failures are
    /// logged and retried on the next tick.
    pub async fn run(self: Arc<Self>) {
        loop {
            if let Err(e) = self.rebuild().await {
                log::error!("Index rebuild failed: {}", e);
            }
            tokio::time::sleep(self.interval).await;
        }
    }

    /// Look up a project by display name in the published snapshot.
    pub fn lookup(&self, name: &str) -> Option<Arc<Project>> {
        self.snapshot().lookup(name).cloned()
    }

    /// Projects whose creation date falls on `"MM-DD"`.
    pub fn birthdays_on(&self, month_day: &str) -> Vec<Arc<Project>> {
        self.snapshot().birthdays_on(month_day).to_vec()
    }

    /// Pick a random project satisfying `predicate`, with the configured
    /// probe bound.
    pub fn sample_qualifying<F>(&self, predicate: F) -> Option<Arc<Project>>
    where
        F: FnMut(&Project) -> bool,
    {
        sample_qualifying(&self.snapshot(), self.max_sample_attempts, predicate)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use async_trait::async_trait;
    use chrono::{DateTime, Utc};

    use crate::error::AppError;

    use super::*;

    /// Source serving fixed per-contract project lists, with a failure
    /// switch per contract.
    struct FixtureSource {
        projects: HashMap<String, Vec<Project>>,
        failing: std::sync::Mutex<Vec<String>>,
    }

    impl FixtureSource {
        fn new(projects: HashMap<String, Vec<Project>>) -> Self {
            Self {
                projects,
                failing: std::sync::Mutex::new(Vec::new()),
            }
        }

        fn fail_source(&self, contract: &str) {
            self.failing.lock().unwrap().push(contract.to_string());
        }
    }

    #[async_trait]
    impl ProjectSource for &FixtureSource {
        async fn fetch_projects(&self, source_id: &str) -> Result<Vec<Project>> {
            if self.failing.lock().unwrap().iter().any(|c| c == source_id) {
                return Err(AppError::source(source_id, "connection refused"));
            }
            Ok(self.projects.get(source_id).cloned().unwrap_or_default())
        }
    }

    struct FixtureBirthdays(HashMap<String, DateTime<Utc>>);

    #[async_trait]
    impl BirthdaySource for &FixtureBirthdays {
        async fn fetch_birthdays(&self) -> Result<HashMap<String, DateTime<Utc>>> {
            Ok(self.0.clone())
        }
    }

    fn project(contract: &str, id: u32, name: &str) -> Project {
        Project {
            project_id: id,
            contract: contract.to_string(),
            name: name.to_string(),
            invocations: 500,
            max_invocations: 1000,
            active: true,
            start_time: None,
        }
    }

    fn config(contracts: &[&str]) -> IndexerConfig {
        IndexerConfig {
            contracts: contracts.iter().map(|c| c.to_string()).collect(),
            ..IndexerConfig::default()
        }
    }

    fn two_source_fixture() -> (HashMap<String, Vec<Project>>, FixtureBirthdays) {
        let mut projects = HashMap::new();
        projects.insert(
            "0xa".to_string(),
            vec![project("0xa", 0, "Chromie Squiggle"), project("0xa", 78, "Fidenza")],
        );
        projects.insert("0xb".to_string(), vec![project("0xb", 2, "Ringers #2")]);

        let mut birthdays = HashMap::new();
        birthdays.insert(
            "0xa-78".to_string(),
            "2021-06-11T17:00:00Z".parse().unwrap(),
        );
        (projects, FixtureBirthdays(birthdays))
    }

    #[tokio::test]
    async fn test_rebuild_indexes_all_sources_and_birthdays() {
        let (projects, birthdays) = two_source_fixture();
        let source = FixtureSource::new(projects);
        let indexer = ProjectIndexer::new(&source, &birthdays, &config(&["0xa", "0xb"]), 10);

        indexer.rebuild().await.unwrap();

        let snapshot = indexer.snapshot();
        assert_eq!(snapshot.len(), 3);
        assert!(snapshot.get("chromiesquiggle").is_some());
        assert!(snapshot.get("fidenza").is_some());
        assert!(snapshot.get("ringers2").is_some());

        // Only Fidenza got a birthday attached.
        let born = indexer.birthdays_on("06-11");
        assert_eq!(born.len(), 1);
        assert_eq!(born[0].project_id, 78);
        assert!(born[0].start_time.is_some());
        assert!(indexer.lookup("Chromie Squiggle").unwrap().start_time.is_none());
    }

    #[tokio::test]
    async fn test_failed_source_leaves_previous_snapshot_untouched() {
        let (projects, birthdays) = two_source_fixture();
        let source = FixtureSource::new(projects);
        let indexer = ProjectIndexer::new(&source, &birthdays, &config(&["0xa", "0xb"]), 10);

        indexer.rebuild().await.unwrap();
        let before = indexer.snapshot();

        // Second source now fails; the cycle must abort without publishing.
        source.fail_source("0xb");
        let err = indexer.rebuild().await.unwrap_err();
        assert!(matches!(err, AppError::Source { .. }));

        let after = indexer.snapshot();
        assert!(Arc::ptr_eq(&before, &after));
        assert!(indexer.lookup("Ringers #2").is_some());
    }

    #[tokio::test]
    async fn test_rebuild_replaces_stale_entries() {
        let (mut projects, birthdays) = two_source_fixture();
        let source = FixtureSource::new(projects.clone());
        let indexer = ProjectIndexer::new(&source, &birthdays, &config(&["0xa", "0xb"]), 10);
        indexer.rebuild().await.unwrap();
        assert!(indexer.lookup("Fidenza").is_some());

        // A renamed project drops its old key on the next cycle.
        projects.get_mut("0xa").unwrap()[1].name = "Fidenza Redux".to_string();
        let source = FixtureSource::new(projects);
        let indexer2 = ProjectIndexer::new(&source, &birthdays, &config(&["0xa", "0xb"]), 10);
        indexer2.rebuild().await.unwrap();
        assert!(indexer2.lookup("Fidenza").is_none());
        assert!(indexer2.lookup("Fidenza Redux").is_some());
    }

    #[tokio::test]
    async fn test_empty_source_is_not_an_error() {
        let (mut projects, birthdays) = two_source_fixture();
        projects.insert("0xc".to_string(), Vec::new());
        let source = FixtureSource::new(projects);
        let indexer = ProjectIndexer::new(&source, &birthdays, &config(&["0xa", "0xb", "0xc"]), 10);

        indexer.rebuild().await.unwrap();
        assert_eq!(indexer.snapshot().len(), 3);
    }

    #[tokio::test]
    async fn test_sample_qualifying_respects_predicate() {
        let (projects, birthdays) = two_source_fixture();
        let source = FixtureSource::new(projects);
        let indexer = ProjectIndexer::new(&source, &birthdays, &config(&["0xa", "0xb"]), 10);
        indexer.rebuild().await.unwrap();

        let sampled = indexer.sample_qualifying(|p| p.is_open_edition());
        assert!(sampled.is_some());

        let none = indexer.sample_qualifying(|p| p.invocations > 10_000);
        assert!(none.is_none());
    }
}
