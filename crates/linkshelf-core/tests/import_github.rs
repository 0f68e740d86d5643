use linkshelf_core::{
    run_import, GitHubSource, ImportError, ImportOutcome, ImportSource, LinkInput, LinkStore,
    MemoryPersistence,
};
use serde_json::{json, Value};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn repo(name: &str, stars: u64) -> Value {
    json!({
        "name": name,
        "html_url": format!("https://github.com/octocat/{}", name),
        "description": null,
        "homepage": null,
        "fork": false,
        "stargazers_count": stars,
        "language": "Rust"
    })
}

fn full_page(prefix: &str) -> Value {
    Value::Array((0..100).map(|i| repo(&format!("{}-{}", prefix, i), 0)).collect())
}

async fn mount_page(server: &MockServer, page: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path("/users/octocat/repos"))
        .and(query_param("page", page))
        .and(query_param("per_page", "100"))
        .and(query_param("sort", "updated"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(server)
        .await;
}

fn source(server: &MockServer) -> GitHubSource {
    GitHubSource::new("octocat")
        .unwrap()
        .with_base_url(server.uri())
}

#[tokio::test]
async fn follows_pages_until_a_short_one() {
    let server = MockServer::start().await;
    mount_page(&server, "1", full_page("a")).await;
    mount_page(&server, "2", json!([repo("last", 1)])).await;

    let repos = source(&server).fetch_all().await.expect("fetch ok");
    assert_eq!(repos.len(), 101);
    assert_eq!(repos[100].name, "last");
}

#[tokio::test]
async fn stops_on_empty_page() {
    let server = MockServer::start().await;
    mount_page(&server, "1", full_page("a")).await;
    mount_page(&server, "2", json!([])).await;

    let repos = source(&server).fetch_all().await.expect("fetch ok");
    assert_eq!(repos.len(), 100);
}

#[tokio::test]
async fn sends_token_when_configured() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/octocat/repos"))
        .and(header("authorization", "Bearer ghp_secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([repo("private-ok", 0)])))
        .expect(1)
        .mount(&server)
        .await;

    let repos = source(&server)
        .with_token(Some("ghp_secret".to_string()))
        .fetch_all()
        .await
        .expect("fetch ok");
    assert_eq!(repos.len(), 1);
}

#[tokio::test]
async fn maps_error_statuses() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/octocat/repos"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    let err = source(&server).fetch_all().await.unwrap_err();
    assert!(matches!(err, ImportError::Unauthorized { .. }));

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/octocat/repos"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;
    let err = source(&server).fetch_all().await.unwrap_err();
    assert!(matches!(err, ImportError::RateLimited { .. }));
    assert!(err.is_transient());
}

#[tokio::test]
async fn malformed_body_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/octocat/repos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "nope"})))
        .mount(&server)
        .await;

    let err = source(&server).fetch_all().await.unwrap_err();
    assert!(matches!(err, ImportError::Decode { .. }));
}

#[tokio::test]
async fn import_reconciles_into_store() {
    let server = MockServer::start().await;
    let mut fork = repo("forked", 500);
    fork["fork"] = json!(true);
    let mut site = repo("site", 10);
    site["homepage"] = json!("https://site.dev");
    mount_page(
        &server,
        "1",
        json!([repo("tools", 3), fork, site, repo("linkshelf", 50)]),
    )
    .await;

    let persistence = MemoryPersistence::new();
    let mut store = LinkStore::init(persistence.clone());
    store
        .add(LinkInput::new("My site", "https://site.dev").with_version("2.1.0"))
        .unwrap();

    let github = source(&server).excluding(Some("linkshelf".to_string()));
    let outcome = run_import(&mut store, &github).await;

    assert_eq!(
        outcome,
        ImportOutcome::Success {
            source: "GitHub".to_string(),
            total: 2,
            added: 1,
            updated: 1,
            skipped: 0,
        }
    );

    let links = store.list();
    assert_eq!(links.len(), 2);
    assert_eq!(links[0].title, "site");
    assert_eq!(links[0].version, "2.1.1");
    assert_eq!(links[0].description, "GitHub repository: site | Language: Rust | ⭐ 10");
    assert_eq!(links[1].title, "tools");
    assert_eq!(links[1].url, "https://github.com/octocat/tools");
    assert_eq!(links[1].order, 1);

    // One save for the manual add, one for the whole batch
    assert_eq!(persistence.save_count(), 2);
}

#[tokio::test]
async fn failed_import_leaves_store_untouched() {
    let server = MockServer::start().await;
    mount_page(&server, "1", full_page("a")).await;
    Mock::given(method("GET"))
        .and(path("/users/octocat/repos"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let persistence = MemoryPersistence::new();
    let mut store = LinkStore::init(persistence.clone());
    let outcome = run_import(&mut store, &source(&server)).await;

    match outcome {
        ImportOutcome::Failure { source, error } => {
            assert_eq!(source, "GitHub");
            assert!(error.contains("500"));
        }
        other => panic!("expected failure, got {:?}", other),
    }
    assert!(store.is_empty());
    assert_eq!(persistence.save_count(), 0);
}
