//! GitHub repository import
//!
//! Lists a user's public repositories, newest-updated first, 100 per page.
//! Forks and the configured excluded repository are skipped; the rest are
//! presented most-starred first.

use serde::Deserialize;
use tracing::debug;

use super::{http_client, ImportError, ImportSource, MAX_PAGES};
use crate::models::Candidate;

pub const GITHUB_API_URL: &str = "https://api.github.com";

/// Maximum `per_page` the API accepts
pub const GITHUB_PAGE_SIZE: usize = 100;

const PROVIDER: &str = "GitHub";

/// A repository as returned by `GET /users/{user}/repos`
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct GitHubRepo {
    pub name: String,
    pub html_url: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub homepage: Option<String>,
    #[serde(default)]
    pub fork: bool,
    #[serde(default)]
    pub stargazers_count: u64,
    #[serde(default)]
    pub language: Option<String>,
}

/// Imports the public repositories of one GitHub user
pub struct GitHubSource {
    client: reqwest::Client,
    base_url: String,
    username: String,
    token: Option<String>,
    exclude_repo: Option<String>,
}

impl GitHubSource {
    pub fn new(username: impl Into<String>) -> Result<Self, ImportError> {
        Ok(Self {
            client: http_client(PROVIDER)?,
            base_url: GITHUB_API_URL.to_string(),
            username: username.into().trim().to_string(),
            token: None,
            exclude_repo: None,
        })
    }

    /// Point at a different API root (GitHub Enterprise, tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Authenticate requests (raises the rate limit)
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.is_empty());
        self
    }

    /// Skip a repository by name
    pub fn excluding(mut self, repo: Option<String>) -> Self {
        self.exclude_repo = repo.filter(|r| !r.is_empty());
        self
    }

    async fn fetch_page(&self, page: u32) -> Result<Vec<GitHubRepo>, ImportError> {
        let url = format!("{}/users/{}/repos", self.base_url, self.username);
        let mut request = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .query(&[
                ("per_page", GITHUB_PAGE_SIZE.to_string()),
                ("page", page.to_string()),
                ("sort", "updated".to_string()),
            ]);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ImportError::from_reqwest(PROVIDER, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ImportError::from_status(
                PROVIDER,
                status,
                "token invalid or expired",
            ));
        }

        response
            .json()
            .await
            .map_err(|e| ImportError::from_reqwest(PROVIDER, e))
    }
}

impl ImportSource for GitHubSource {
    type Record = GitHubRepo;

    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn fetch_all(&self) -> Result<Vec<GitHubRepo>, ImportError> {
        if self.username.is_empty() {
            return Err(ImportError::MissingCredentials {
                provider: PROVIDER,
                what: "username",
            });
        }

        let mut repos = Vec::new();
        for page in 1..=MAX_PAGES {
            let batch = self.fetch_page(page).await?;
            let count = batch.len();
            debug!("GitHub page {} returned {} repos", page, count);
            repos.extend(batch);

            if count < GITHUB_PAGE_SIZE {
                break;
            }
        }
        Ok(repos)
    }

    fn sort_records(&self, records: &mut [GitHubRepo]) {
        records.sort_by(|a, b| b.stargazers_count.cmp(&a.stargazers_count));
    }

    fn normalize(&self, repo: GitHubRepo) -> Option<Candidate> {
        if repo.fork || self.exclude_repo.as_deref() == Some(repo.name.as_str()) {
            return None;
        }

        // Prefer the project's homepage over the repository page
        let url = repo
            .homepage
            .as_deref()
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .unwrap_or(&repo.html_url)
            .to_string();

        let mut description = repo
            .description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("GitHub repository: {}", repo.name));
        if let Some(language) = repo.language.as_deref().filter(|l| !l.is_empty()) {
            description.push_str(&format!(" | Language: {}", language));
        }
        if repo.stargazers_count > 0 {
            description.push_str(&format!(" | ⭐ {}", repo.stargazers_count));
        }

        Some(Candidate::new(repo.name, url).with_description(description))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::normalize_all;

    fn repo(name: &str, stars: u64) -> GitHubRepo {
        GitHubRepo {
            name: name.to_string(),
            html_url: format!("https://github.com/octocat/{}", name),
            description: None,
            homepage: None,
            fork: false,
            stargazers_count: stars,
            language: None,
        }
    }

    fn source() -> GitHubSource {
        GitHubSource::new("octocat").unwrap()
    }

    #[test]
    fn test_normalize_uses_repo_page_without_homepage() {
        let candidate = source().normalize(repo("hello", 0)).unwrap();
        assert_eq!(candidate.title, "hello");
        assert_eq!(candidate.url, "https://github.com/octocat/hello");
        assert_eq!(
            candidate.description.as_deref(),
            Some("GitHub repository: hello")
        );
        assert!(candidate.version.is_none());
    }

    #[test]
    fn test_normalize_prefers_homepage_and_decorates() {
        let mut r = repo("site", 42);
        r.homepage = Some("https://site.dev".to_string());
        r.description = Some("My site".to_string());
        r.language = Some("Rust".to_string());

        let candidate = source().normalize(r).unwrap();
        assert_eq!(candidate.url, "https://site.dev");
        assert_eq!(
            candidate.description.as_deref(),
            Some("My site | Language: Rust | ⭐ 42")
        );
    }

    #[test]
    fn test_blank_homepage_falls_back() {
        let mut r = repo("blank", 0);
        r.homepage = Some("   ".to_string());
        let candidate = source().normalize(r).unwrap();
        assert_eq!(candidate.url, "https://github.com/octocat/blank");
    }

    #[test]
    fn test_forks_and_excluded_are_skipped() {
        let src = source().excluding(Some("linkshelf".to_string()));
        let mut fork = repo("forked", 10);
        fork.fork = true;

        assert!(src.normalize(fork).is_none());
        assert!(src.normalize(repo("linkshelf", 3)).is_none());
        assert!(src.normalize(repo("other", 3)).is_some());
    }

    #[test]
    fn test_sorted_by_stars_descending() {
        let src = source();
        let candidates = normalize_all(&src, vec![repo("low", 1), repo("high", 99), repo("mid", 5)]);
        let titles: Vec<_> = candidates.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["high", "mid", "low"]);
    }

    #[test]
    fn test_deserialize_api_record() {
        let json = r#"{
            "id": 1296269,
            "name": "Hello-World",
            "full_name": "octocat/Hello-World",
            "html_url": "https://github.com/octocat/Hello-World",
            "description": null,
            "fork": false,
            "homepage": "",
            "stargazers_count": 80,
            "language": null
        }"#;
        let repo: GitHubRepo = serde_json::from_str(json).unwrap();
        assert_eq!(repo.name, "Hello-World");
        assert_eq!(repo.stargazers_count, 80);
        assert_eq!(repo.homepage.as_deref(), Some(""));
    }

    #[tokio::test]
    async fn test_blank_username_is_rejected() {
        let src = GitHubSource::new("  ").unwrap();
        let err = src.fetch_all().await.unwrap_err();
        assert!(matches!(err, ImportError::MissingCredentials { .. }));
    }
}
