//! Vercel project import
//!
//! Lists the projects visible to an API token and turns every project that
//! has a deployment into a link to its live site. The project's last update
//! date becomes the version (`YYYY.MM.DD`), so re-importing an unchanged
//! project leaves its link's version alone.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::debug;

use super::{http_client, ImportError, ImportSource, MAX_PAGES};
use crate::models::Candidate;

pub const VERCEL_API_URL: &str = "https://api.vercel.com";

/// Maximum `limit` the projects endpoint accepts
pub const VERCEL_PAGE_SIZE: usize = 100;

const PROVIDER: &str = "Vercel";

#[derive(Debug, Clone, Deserialize)]
struct ProjectsPage {
    #[serde(default)]
    projects: Vec<VercelProject>,
    #[serde(default)]
    pagination: Option<Pagination>,
}

#[derive(Debug, Clone, Deserialize)]
struct Pagination {
    /// Cursor for the following page, absent on the last one
    #[serde(default)]
    next: Option<i64>,
}

/// A project as returned by `GET /v9/projects`
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VercelProject {
    pub name: String,
    #[serde(default)]
    pub framework: Option<String>,
    #[serde(default)]
    pub alias: Vec<ProjectAlias>,
    #[serde(default)]
    pub production_deployment: Option<Deployment>,
    #[serde(default)]
    pub latest_deployment: Option<Deployment>,
    /// Milliseconds since the epoch
    #[serde(default)]
    pub updated_at: Option<i64>,
}

/// Aliases come either as bare domains or as objects carrying one
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ProjectAlias {
    Domain(String),
    Detailed { domain: String },
}

impl ProjectAlias {
    pub fn domain(&self) -> &str {
        match self {
            ProjectAlias::Domain(d) => d,
            ProjectAlias::Detailed { domain } => domain,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Deployment {
    #[serde(default)]
    pub url: Option<String>,
}

impl VercelProject {
    fn deployment(&self) -> Option<&Deployment> {
        self.production_deployment
            .as_ref()
            .or(self.latest_deployment.as_ref())
    }

    /// Custom domain, then deployment host, then the default project domain
    fn app_url(&self) -> Option<String> {
        if let Some(alias) = self.alias.iter().map(ProjectAlias::domain).find(|d| !d.is_empty()) {
            return Some(format!("https://{}", alias));
        }
        if let Some(url) = self
            .deployment()
            .and_then(|d| d.url.as_deref())
            .filter(|u| !u.is_empty())
        {
            return Some(with_scheme(url));
        }
        if !self.name.is_empty() {
            return Some(format!("https://{}.vercel.app", self.name));
        }
        None
    }
}

/// Imports the projects of one Vercel account or team token
pub struct VercelSource {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl VercelSource {
    pub fn new(token: impl Into<String>) -> Result<Self, ImportError> {
        Ok(Self {
            client: http_client(PROVIDER)?,
            base_url: VERCEL_API_URL.to_string(),
            token: token.into().trim().to_string(),
        })
    }

    /// Point at a different API root (tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    async fn fetch_page(&self, until: Option<i64>) -> Result<ProjectsPage, ImportError> {
        let url = format!("{}/v9/projects", self.base_url);
        let mut query = vec![("limit", VERCEL_PAGE_SIZE.to_string())];
        if let Some(cursor) = until {
            query.push(("until", cursor.to_string()));
        }

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .query(&query)
            .send()
            .await
            .map_err(|e| ImportError::from_reqwest(PROVIDER, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ImportError::from_status(
                PROVIDER,
                status,
                "API token invalid or expired",
            ));
        }

        response
            .json()
            .await
            .map_err(|e| ImportError::from_reqwest(PROVIDER, e))
    }
}

impl ImportSource for VercelSource {
    type Record = VercelProject;

    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn fetch_all(&self) -> Result<Vec<VercelProject>, ImportError> {
        if self.token.is_empty() {
            return Err(ImportError::MissingCredentials {
                provider: PROVIDER,
                what: "API token",
            });
        }

        let mut projects = Vec::new();
        let mut until = None;
        for page in 1..=MAX_PAGES {
            let batch = self.fetch_page(until).await?;
            let count = batch.projects.len();
            debug!("Vercel page {} returned {} projects", page, count);
            projects.extend(batch.projects);

            let next = batch.pagination.and_then(|p| p.next);
            match next {
                Some(cursor) if count == VERCEL_PAGE_SIZE => until = Some(cursor),
                _ => break,
            }
        }
        Ok(projects)
    }

    fn sort_records(&self, records: &mut [VercelProject]) {
        records.sort_by(|a, b| b.updated_at.unwrap_or(0).cmp(&a.updated_at.unwrap_or(0)));
    }

    fn normalize(&self, project: VercelProject) -> Option<Candidate> {
        project.deployment()?;
        let url = project.app_url()?;

        let description = match project.framework.as_deref().filter(|f| !f.is_empty()) {
            Some(framework) => format!("Vercel app: {} | Framework: {}", project.name, framework),
            None => format!("Vercel app: {}", project.name),
        };
        let version = date_version(project.updated_at);

        Some(
            Candidate::new(project.name, url)
                .with_description(description)
                .with_version(version),
        )
    }
}

/// `YYYY.MM.DD` of an epoch-millis timestamp (UTC), today when unknown
pub fn date_version(updated_at_ms: Option<i64>) -> String {
    let date = updated_at_ms
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .unwrap_or_else(Utc::now);
    date.format("%Y.%m.%d").to_string()
}

fn with_scheme(url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("https://{}", url)
    }
}
