//! Link store
//!
//! The `LinkStore` owns the in-memory link collection and is the only writer
//! of the persisted copy. Every mutation runs to completion on `&mut self`,
//! then rewrites the whole collection once and re-renders once.
//!
//! ## Ordering
//!
//! Links are kept sorted ascending by `order`. `add` and
//! [`batch_reconcile`](LinkStore::batch_reconcile) append past the current
//! maximum, `delete` leaves gaps, and `reorder` renumbers everything to
//! `0..n`.
//!
//! ## Failure policy
//!
//! A failed load starts an empty store and a failed save is logged; the
//! in-memory collection stays authoritative for the session either way.
//!
//! ## Usage
//!
//! ```ignore
//! let mut store = LinkStore::open_with_config(&config);
//!
//! let link = store.add(LinkInput::new("Rust", "https://rust-lang.org"))?;
//! let report = store.batch_reconcile(candidates);
//! ```

use std::collections::HashMap;

use chrono::Utc;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::models::{
    increment_version, non_empty, Candidate, Link, LinkId, LinkInput, ReconcileReport,
    ValidationError, DEFAULT_VERSION,
};
use crate::storage::{JsonFilePersistence, Persistence};

/// Receives a fresh snapshot after every successful mutation
pub trait Presenter {
    fn render(&mut self, links: &[Link]);
}

/// Ordered link collection backed by a [`Persistence`] adapter
pub struct LinkStore<P: Persistence> {
    /// Sorted ascending by `order`
    links: Vec<Link>,
    persistence: P,
    presenter: Option<Box<dyn Presenter>>,
}

impl LinkStore<JsonFilePersistence> {
    /// Open the collection file named by the configuration
    pub fn open_with_config(config: &Config) -> Self {
        Self::init(JsonFilePersistence::from_config(config))
    }
}

impl<P: Persistence> LinkStore<P> {
    /// Load the persisted collection
    ///
    /// Records missing `order` get their load position, records missing
    /// `version` get `1.0.0` and missing timestamps become the load time. If
    /// anything was filled in, the collection is saved straight away so the
    /// filled values stick. Unreadable data yields an empty store.
    pub fn init(persistence: P) -> Self {
        let stored = match persistence.load() {
            Ok(stored) => stored,
            Err(e) => {
                warn!("Failed to load links, starting empty: {}", e);
                Vec::new()
            }
        };

        let needs_save = stored.iter().any(|s| s.needs_backfill());
        let mut links: Vec<Link> = stored
            .into_iter()
            .enumerate()
            .map(|(position, s)| s.into_link(position))
            .collect();
        links.sort_by_key(|l| l.order);

        let store = Self {
            links,
            persistence,
            presenter: None,
        };

        if needs_save {
            info!("Backfilled missing fields on stored links");
            store.persist();
        }
        debug!("Loaded {} links", store.links.len());
        store
    }

    /// Attach a presenter and render the current snapshot to it
    pub fn set_presenter(&mut self, presenter: Box<dyn Presenter>) {
        self.presenter = Some(presenter);
        self.render();
    }

    /// Get the persistence adapter
    pub fn persistence(&self) -> &P {
        &self.persistence
    }

    // ==================== Queries ====================

    /// Snapshot of all links, ascending `order`
    pub fn list(&self) -> Vec<Link> {
        self.links.clone()
    }

    /// Get a link by ID
    pub fn get(&self, id: &LinkId) -> Option<Link> {
        self.links.iter().find(|l| &l.id == id).cloned()
    }

    /// Links whose id starts with `prefix`
    pub fn find_by_prefix(&self, prefix: &str) -> Vec<Link> {
        self.links
            .iter()
            .filter(|l| l.id.as_str().starts_with(prefix))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    // ==================== Mutations ====================

    /// Add a new link after all existing ones
    pub fn add(&mut self, input: LinkInput) -> Result<Link, ValidationError> {
        let valid = input.validate()?;
        let order = self.next_order();
        let link = Link::create(valid, order);
        debug!("Adding link {} ({})", link.id, link.url);

        self.links.push(link.clone());
        self.commit();
        Ok(link)
    }

    /// Edit an existing link
    ///
    /// Returns `Ok(None)` when no link has this id; the store is untouched.
    /// A missing `version` in `input` keeps the current one.
    pub fn update(&mut self, id: &LinkId, input: LinkInput) -> Result<Option<Link>, ValidationError> {
        let Some(index) = self.position(id) else {
            debug!("Update of unknown link {}", id);
            return Ok(None);
        };
        let valid = input.validate()?;

        self.links[index].apply(valid);
        let updated = self.links[index].clone();
        self.commit();
        Ok(Some(updated))
    }

    /// Remove a link. Remaining `order` values are left as they are.
    ///
    /// Returns whether a link was removed; an unknown id is a no-op.
    pub fn delete(&mut self, id: &LinkId) -> bool {
        let Some(index) = self.position(id) else {
            return false;
        };

        let removed = self.links.remove(index);
        debug!("Deleted link {} ({})", removed.id, removed.url);
        self.commit();
        true
    }

    /// Move `dragged` into `target`'s current slot and renumber everything
    ///
    /// No-op (returns `false`) if either id is unknown or they are the same.
    pub fn reorder(&mut self, dragged: &LinkId, target: &LinkId) -> bool {
        if dragged == target {
            return false;
        }
        let (Some(from), Some(to)) = (self.position(dragged), self.position(target)) else {
            return false;
        };

        let link = self.links.remove(from);
        self.links.insert(to, link);
        self.renumber();

        debug!("Moved link {} to position {}", dragged, to);
        self.commit();
        true
    }

    /// Merge imported candidates into the collection
    ///
    /// A candidate whose URL matches an existing link (exact string match,
    /// first match wins) updates that link's title, description and version;
    /// without an explicit version the patch component is bumped. Any other
    /// candidate becomes a new link after all existing ones, in candidate
    /// order. The collection is saved and rendered once for the whole batch.
    pub fn batch_reconcile<I>(&mut self, candidates: I) -> ReconcileReport
    where
        I: IntoIterator<Item = Candidate>,
    {
        let mut report = ReconcileReport::default();

        let mut by_url: HashMap<String, usize> = HashMap::new();
        for (index, link) in self.links.iter().enumerate() {
            by_url.entry(link.url.clone()).or_insert(index);
        }

        for candidate in candidates {
            let url = candidate.url.trim().to_string();
            let title = candidate.title.trim().to_string();
            let description = non_empty(candidate.description);
            let version = non_empty(candidate.version);
            let now = Utc::now();

            match by_url.get(&url) {
                Some(&index) => {
                    let existing = &mut self.links[index];
                    existing.version =
                        version.unwrap_or_else(|| increment_version(&existing.version));
                    existing.title = title;
                    if let Some(description) = description {
                        existing.description = description;
                    }
                    existing.updated_at = now;
                    report.updated += 1;
                }
                None => {
                    let link = Link {
                        id: LinkId::generate(),
                        title,
                        url: url.clone(),
                        description: description.unwrap_or_default(),
                        order: self.next_order(),
                        version: version.unwrap_or_else(|| DEFAULT_VERSION.to_string()),
                        created_at: now,
                        updated_at: now,
                    };
                    by_url.insert(url, self.links.len());
                    self.links.push(link);
                    report.added += 1;
                }
            }
        }

        if report.changed() {
            self.commit();
        }
        info!(
            "Reconciled batch: {} added, {} updated, {} skipped",
            report.added, report.updated, report.skipped
        );
        report
    }

    // ==================== Internals ====================

    fn position(&self, id: &LinkId) -> Option<usize> {
        self.links.iter().position(|l| &l.id == id)
    }

    /// One past the last link's `order`
    ///
    /// `links` is sorted, so the last link holds the maximum. If that is
    /// `i64::MAX` the collection is renumbered to `0..n` first.
    fn next_order(&mut self) -> i64 {
        let Some(last) = self.links.last() else {
            return 0;
        };
        match last.order.checked_add(1) {
            Some(next) => next,
            None => {
                warn!("Link order reached i64::MAX, renumbering");
                self.renumber();
                self.links.len() as i64
            }
        }
    }

    fn renumber(&mut self) {
        for (position, link) in self.links.iter_mut().enumerate() {
            link.order = position as i64;
        }
    }

    fn commit(&mut self) {
        self.persist();
        self.render();
    }

    fn persist(&self) {
        if let Err(e) = self.persistence.save(&self.links) {
            if !e.is_recoverable() {
                error!("Failed to save links: {}", e);
                return;
            }
            match e.recovery_suggestion() {
                Some(hint) => warn!("Failed to save links: {} ({})", e, hint),
                None => warn!("Failed to save links: {}", e),
            }
        }
    }

    fn render(&mut self) {
        if let Some(presenter) = self.presenter.as_mut() {
            presenter.render(&self.links);
        }
    }
}
