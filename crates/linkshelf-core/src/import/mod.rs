//! Bulk import from external providers
//!
//! Each provider implements [`ImportSource`]: it pages through a remote API
//! and normalizes its raw records into [`Candidate`]s. [`run_import`] only
//! touches the store once the complete candidate list is in hand, so a
//! failed or abandoned fetch leaves the collection exactly as it was.

pub mod error;
pub mod github;
pub mod vercel;

use std::time::Duration;

use serde::Serialize;
use tracing::{info, warn};

use crate::models::Candidate;
use crate::storage::Persistence;
use crate::store::LinkStore;

pub use error::ImportError;
pub use github::GitHubSource;
pub use vercel::VercelSource;

/// Per-request timeout for provider APIs
const REQUEST_TIMEOUT: u64 = 30;

/// Stop paginating after this many pages even if the API keeps going
pub(crate) const MAX_PAGES: u32 = 100;

/// A provider that can produce import candidates
#[allow(async_fn_in_trait)]
pub trait ImportSource {
    /// Raw provider record
    type Record;

    /// Provider name for messages
    fn name(&self) -> &'static str;

    /// Fetch every record, following pagination to the end
    async fn fetch_all(&self) -> Result<Vec<Self::Record>, ImportError>;

    /// Map one record to a candidate; `None` filters it out
    fn normalize(&self, record: Self::Record) -> Option<Candidate>;

    /// Provider-specific presentation order, applied before normalizing
    fn sort_records(&self, _records: &mut [Self::Record]) {}
}

/// Sort, filter and normalize a full record list
pub fn normalize_all<S: ImportSource>(source: &S, mut records: Vec<S::Record>) -> Vec<Candidate> {
    source.sort_records(&mut records);
    records
        .into_iter()
        .filter_map(|record| source.normalize(record))
        .collect()
}

/// Fetch everything from `source` and normalize it
pub async fn collect_candidates<S: ImportSource>(source: &S) -> Result<Vec<Candidate>, ImportError> {
    let records = source.fetch_all().await?;
    Ok(normalize_all(source, records))
}

/// Result of an import, suitable for showing to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ImportOutcome {
    Success {
        source: String,
        total: usize,
        added: usize,
        updated: usize,
        skipped: usize,
    },
    Failure {
        source: String,
        error: String,
    },
}

impl ImportOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ImportOutcome::Success { .. })
    }
}

/// Import from `source` into `store` as one batch
///
/// Errors are returned as [`ImportOutcome::Failure`]; the store is only
/// modified after every page has been fetched.
pub async fn run_import<S, P>(store: &mut LinkStore<P>, source: &S) -> ImportOutcome
where
    S: ImportSource,
    P: Persistence,
{
    let candidates = match collect_candidates(source).await {
        Ok(candidates) => candidates,
        Err(e) => {
            warn!("Import from {} failed: {}", source.name(), e);
            return ImportOutcome::Failure {
                source: source.name().to_string(),
                error: e.to_string(),
            };
        }
    };

    let total = candidates.len();
    let report = store.batch_reconcile(candidates);
    info!(
        "Imported {} candidates from {} ({} added, {} updated)",
        total,
        source.name(),
        report.added,
        report.updated
    );

    ImportOutcome::Success {
        source: source.name().to_string(),
        total,
        added: report.added,
        updated: report.updated,
        skipped: report.skipped,
    }
}

/// HTTP client shared by the provider sources
pub(crate) fn http_client(provider: &'static str) -> Result<reqwest::Client, ImportError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(REQUEST_TIMEOUT))
        .user_agent(concat!("linkshelf/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| ImportError::from_reqwest(provider, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LinkInput;
    use crate::storage::MemoryPersistence;

    /// Serves canned records, or fails
    struct StaticSource {
        records: Vec<(String, String)>,
        fail: bool,
    }

    impl ImportSource for StaticSource {
        type Record = (String, String);

        fn name(&self) -> &'static str {
            "Static"
        }

        async fn fetch_all(&self) -> Result<Vec<Self::Record>, ImportError> {
            if self.fail {
                return Err(ImportError::RateLimited { provider: "Static" });
            }
            Ok(self.records.clone())
        }

        fn normalize(&self, (title, url): Self::Record) -> Option<Candidate> {
            if title.starts_with('_') {
                return None;
            }
            Some(Candidate::new(title, url))
        }

        fn sort_records(&self, records: &mut [Self::Record]) {
            records.sort_by(|a, b| a.0.cmp(&b.0));
        }
    }

    fn source(records: &[(&str, &str)]) -> StaticSource {
        StaticSource {
            records: records
                .iter()
                .map(|(t, u)| (t.to_string(), u.to_string()))
                .collect(),
            fail: false,
        }
    }

    #[test]
    fn test_normalize_all_sorts_then_filters() {
        let src = source(&[("b", "https://b"), ("_hidden", "https://h"), ("a", "https://a")]);
        let candidates = normalize_all(&src, src.records.clone());
        let titles: Vec<_> = candidates.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_run_import_success() {
        let mut store = LinkStore::init(MemoryPersistence::new());
        store.add(LinkInput::new("Old A", "https://a")).unwrap();

        let outcome = run_import(&mut store, &source(&[("a", "https://a"), ("c", "https://c")])).await;

        assert_eq!(
            outcome,
            ImportOutcome::Success {
                source: "Static".to_string(),
                total: 2,
                added: 1,
                updated: 1,
                skipped: 0,
            }
        );
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn test_run_import_failure_leaves_store_untouched() {
        let persistence = MemoryPersistence::new();
        let mut store = LinkStore::init(persistence.clone());
        store.add(LinkInput::new("A", "https://a")).unwrap();
        let before = store.list();
        let saves = persistence.save_count();

        let mut failing = source(&[("x", "https://x")]);
        failing.fail = true;
        let outcome = run_import(&mut store, &failing).await;

        assert!(!outcome.is_success());
        match outcome {
            ImportOutcome::Failure { source, error } => {
                assert_eq!(source, "Static");
                assert!(error.contains("rate limit"));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(store.list(), before);
        assert_eq!(persistence.save_count(), saves);
    }

    #[test]
    fn test_outcome_serialization_is_tagged() {
        let outcome = ImportOutcome::Failure {
            source: "Vercel".to_string(),
            error: "Vercel: token invalid or expired".to_string(),
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "failure");
        assert_eq!(json["source"], "Vercel");
    }
}
