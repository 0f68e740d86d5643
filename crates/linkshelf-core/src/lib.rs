//! linkshelf core library
//!
//! A local, user-ordered collection of links that can be bulk-filled from
//! GitHub and Vercel without ever duplicating an entry.
//!
//! # Architecture
//!
//! - **Store**: in-memory source of truth, rewritten to disk in full after
//!   every mutation
//! - **Import**: provider sources produce candidates; the store reconciles a
//!   complete candidate list in one batch (dedup by URL, patch-version bump,
//!   append in candidate order)
//!
//! # Quick Start
//!
//! ```text
//! let config = Config::load()?;
//! let mut store = LinkStore::open_with_config(&config);
//!
//! store.add(LinkInput::new("Rust", "https://rust-lang.org"))?;
//!
//! let github = GitHubSource::new("octocat")?;
//! let outcome = run_import(&mut store, &github).await;
//! ```
//!
//! # Modules
//!
//! - `store`: the link store and reconciliation (main entry point)
//! - `models`: links, candidates, versions
//! - `import`: provider sources and the import runner
//! - `storage`: persistence adapters
//! - `session`: editing/deleting UI state
//! - `config`: application configuration

pub mod config;
pub mod import;
pub mod models;
pub mod session;
pub mod storage;
pub mod store;

pub use config::Config;
pub use import::{run_import, GitHubSource, ImportError, ImportOutcome, ImportSource, VercelSource};
pub use models::{
    increment_version, Candidate, Link, LinkId, LinkInput, ReconcileReport, ValidationError,
    Version,
};
pub use session::Session;
pub use storage::{JsonFilePersistence, MemoryPersistence, Persistence, StorageError, StorageStats};
pub use store::{LinkStore, Presenter};
