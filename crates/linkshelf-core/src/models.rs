//! Data models for linkshelf
//!
//! Defines the core data structures: [`Link`], the user input used to create
//! or edit one ([`LinkInput`]), the transient import [`Candidate`], and the
//! lenient semantic [`Version`] that import reconciliation bumps.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Version assigned to links that never carried one
pub const DEFAULT_VERSION: &str = "1.0.0";

/// Opaque link identifier
///
/// Freshly created links get a UUID-derived id. Ids loaded from storage are
/// kept verbatim, whatever their shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LinkId(String);

impl LinkId {
    /// Generate a new unique id
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    /// Get the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for LinkId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for LinkId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A saved link
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    /// Unique identifier, immutable after creation
    pub id: LinkId,
    /// Display title
    pub title: String,
    /// The URL (dedup key for imports)
    pub url: String,
    /// Description, possibly empty
    pub description: String,
    /// Position in the user's manual ordering
    pub order: i64,
    /// `major.minor.patch`
    pub version: String,
    /// When this link was created
    pub created_at: DateTime<Utc>,
    /// When this link was last updated
    pub updated_at: DateTime<Utc>,
}

impl Link {
    /// Build a fresh link from validated input at the given position
    pub(crate) fn create(input: ValidInput, order: i64) -> Self {
        let now = Utc::now();
        Self {
            id: LinkId::generate(),
            title: input.title,
            url: input.url,
            description: input.description,
            order,
            version: input.version.unwrap_or_else(|| DEFAULT_VERSION.to_string()),
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply an explicit edit. `order`, `id` and `created_at` never change.
    pub(crate) fn apply(&mut self, input: ValidInput) {
        self.title = input.title;
        self.url = input.url;
        self.description = input.description;
        if let Some(version) = input.version {
            self.version = version;
        }
        self.updated_at = Utc::now();
    }
}

/// A link record as it may appear in storage
///
/// Collections written by older releases lack `order`, `version` and
/// sometimes timestamps; those are filled in when the store loads them.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredLink {
    pub id: LinkId,
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub order: Option<i64>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl StoredLink {
    /// Whether any field has to be filled in on load
    pub fn needs_backfill(&self) -> bool {
        self.order.is_none()
            || self.version.as_deref().map_or(true, str::is_empty)
            || self.created_at.is_none()
            || self.updated_at.is_none()
    }

    /// Convert into a [`Link`], using `position` when `order` is missing
    ///
    /// Missing timestamps become the load time; a missing `updatedAt` falls
    /// back to `createdAt`.
    pub fn into_link(self, position: usize) -> Link {
        let created_at = self.created_at.unwrap_or_else(Utc::now);
        Link {
            id: self.id,
            title: self.title,
            url: self.url,
            description: self.description.unwrap_or_default(),
            order: self.order.unwrap_or(position as i64),
            version: self
                .version
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| DEFAULT_VERSION.to_string()),
            created_at,
            updated_at: self.updated_at.unwrap_or(created_at),
        }
    }
}

/// User-supplied fields for adding or editing a link
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkInput {
    pub title: String,
    pub url: String,
    pub description: Option<String>,
    pub version: Option<String>,
}

impl LinkInput {
    /// Create input with the required fields
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            description: None,
            version: None,
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set an explicit version
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Trim all fields and reject an empty title or URL
    pub fn validate(self) -> Result<ValidInput, ValidationError> {
        let title = self.title.trim().to_string();
        if title.is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        let url = self.url.trim().to_string();
        if url.is_empty() {
            return Err(ValidationError::EmptyUrl);
        }
        Ok(ValidInput {
            title,
            url,
            description: self
                .description
                .map(|d| d.trim().to_string())
                .unwrap_or_default(),
            version: non_empty(self.version),
        })
    }
}

/// Trimmed input that passed validation
#[derive(Debug, Clone, PartialEq)]
pub struct ValidInput {
    pub(crate) title: String,
    pub(crate) url: String,
    pub(crate) description: String,
    pub(crate) version: Option<String>,
}

/// Rejected explicit add or edit
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("title must not be empty")]
    EmptyTitle,
    #[error("URL must not be empty")]
    EmptyUrl,
}

/// An import item, normalized from a provider record
///
/// Candidates are never stored directly; they always go through
/// [`LinkStore::batch_reconcile`](crate::store::LinkStore::batch_reconcile).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
    pub title: String,
    pub url: String,
    pub description: Option<String>,
    /// Explicit version; when absent a matched link gets a patch bump
    pub version: Option<String>,
}

impl Candidate {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            description: None,
            version: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }
}

/// Outcome of one reconciliation batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    pub added: usize,
    pub updated: usize,
    /// Always zero: candidates arrive pre-normalized
    pub skipped: usize,
}

impl ReconcileReport {
    /// Whether the batch changed anything
    pub fn changed(&self) -> bool {
        self.added + self.updated > 0
    }
}

/// A `major.minor.patch` version
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl Version {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parse without failing
    ///
    /// Each dot-separated component contributes its leading digits; a missing
    /// or non-numeric component counts as 0. Components past the third are
    /// ignored.
    pub fn parse_lenient(s: &str) -> Self {
        let mut parts = s.split('.').map(leading_number);
        Self {
            major: parts.next().unwrap_or(0),
            minor: parts.next().unwrap_or(0),
            patch: parts.next().unwrap_or(0),
        }
    }

    /// The next patch version. Saturates instead of wrapping.
    pub fn bump_patch(self) -> Self {
        Self {
            patch: self.patch.saturating_add(1),
            ..self
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Bump the patch component of a version string
///
/// ```
/// use linkshelf_core::models::increment_version;
///
/// assert_eq!(increment_version("1.2.3"), "1.2.4");
/// assert_eq!(increment_version("bad"), "0.0.1");
/// ```
pub fn increment_version(version: &str) -> String {
    Version::parse_lenient(version).bump_patch().to_string()
}

fn leading_number(component: &str) -> u64 {
    let trimmed = component.trim_start();
    let end = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    trimmed[..end].parse().unwrap_or(0)
}

pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
