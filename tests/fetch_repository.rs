// Integration tests against a fake GitHub contents API
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use repo_harvest::{FetchError, HarvestConfig, MemoryCache, RepoHarvester, ThrottlePolicy};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const REPO_URL: &str = "https://github.com/acme/widgets.git";
const ROOT: &str = "/repos/acme/widgets/contents/";

fn now() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs()
}

fn ok(body: Value) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_json(body)
        .insert_header("x-ratelimit-remaining", "4999")
        .insert_header("x-ratelimit-reset", (now() + 3600).to_string().as_str())
}

fn file(name: &str, text: &str) -> Value {
    json!({"type": "file", "name": name, "content": STANDARD.encode(text), "encoding": "base64"})
}

fn config(server: &MockServer) -> HarvestConfig {
    HarvestConfig::default()
        .with_api_base(server.uri())
        .with_token(Some("t0ken".to_string()))
        .with_throttle(ThrottlePolicy::Fail)
}

async fn request_count(server: &MockServer) -> usize {
    server.received_requests().await.map(|r| r.len()).unwrap_or(0)
}

// README.md at the root, src/main.go one level down
async fn mount_sample_repo(server: &MockServer) {
    let base = server.uri();
    Mock::given(method("GET"))
        .and(path(ROOT))
        .and(header("authorization", "Bearer t0ken"))
        .respond_with(ok(json!([
            {"type": "dir", "name": "src", "url": format!("{base}{ROOT}src")},
            {"type": "file", "name": "README.md", "url": format!("{base}{ROOT}README.md")}
        ])))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{ROOT}src")))
        .respond_with(ok(json!([
            {"type": "file", "name": "main.go", "url": format!("{base}{ROOT}src/main.go")}
        ])))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{ROOT}README.md")))
        .respond_with(ok(file("README.md", "# widgets\n")))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{ROOT}src/main.go")))
        .respond_with(ok(file("main.go", "package main\n")))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_fetches_and_flattens_the_whole_tree() {
    let server = MockServer::start().await;
    mount_sample_repo(&server).await;

    let harvester = RepoHarvester::new(config(&server)).unwrap();
    let files = harvester.fetch_repository_files(REPO_URL).await.unwrap();

    assert_eq!(files.len(), 2);
    assert_eq!(files["README.md"], "# widgets\n");
    assert_eq!(files["src/main.go"], "package main\n");
    assert_eq!(request_count(&server).await, 4);
}

#[tokio::test]
async fn test_second_fetch_makes_no_remote_calls() {
    let server = MockServer::start().await;
    mount_sample_repo(&server).await;

    let harvester = RepoHarvester::new(config(&server)).unwrap();
    let first = harvester.fetch_repository_files(REPO_URL).await.unwrap();
    let calls = request_count(&server).await;

    // same repository, spelled differently
    let second = harvester
        .fetch_repository_files("https://github.com/acme/widgets/")
        .await
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(request_count(&server).await, calls);
}

#[tokio::test]
async fn test_harvesters_sharing_a_cache_share_results() {
    let server = MockServer::start().await;
    mount_sample_repo(&server).await;
    let cache = Arc::new(MemoryCache::new());
    let client = Arc::new(
        repo_harvest::HttpContentClient::new(
            Some("t0ken".to_string()),
            "repo-harvest-test",
            std::time::Duration::from_secs(5),
        )
        .unwrap(),
    );

    let one = RepoHarvester::with_capabilities(config(&server), client.clone(), cache.clone());
    let two = RepoHarvester::with_capabilities(config(&server), client, cache);

    let first = one.fetch_repository_files(REPO_URL).await.unwrap();
    let calls = request_count(&server).await;
    let second = two.fetch_repository_files(REPO_URL).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(request_count(&server).await, calls);
}

#[tokio::test]
async fn test_not_found_is_reported_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(ROOT))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"status": 404, "message": "Not Found"})))
        .mount(&server)
        .await;

    let harvester = RepoHarvester::new(config(&server)).unwrap();
    match harvester.fetch_repository_files(REPO_URL).await {
        Err(FetchError::Remote { status, message }) => {
            assert_eq!(status, 404);
            assert_eq!(message, "Not Found");
        }
        other => panic!("expected a remote error, got {other:?}"),
    }
    assert_eq!(request_count(&server).await, 1);
}

#[tokio::test]
async fn test_error_without_json_body_uses_http_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(ROOT))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>bad gateway</html>"))
        .mount(&server)
        .await;

    let harvester = RepoHarvester::new(config(&server)).unwrap();
    let err = harvester.fetch_repository_files(REPO_URL).await.unwrap_err();
    assert_eq!(err.status(), 502);
    assert!(matches!(err, FetchError::Remote { .. }));
}

#[tokio::test]
async fn test_forbidden_without_status_field() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(ROOT))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({"message": "API rate limit exceeded"})))
        .mount(&server)
        .await;

    let harvester = RepoHarvester::new(config(&server)).unwrap();
    match harvester.fetch_repository_files(REPO_URL).await {
        Err(FetchError::Remote { status, message }) => {
            assert_eq!(status, 403);
            assert_eq!(message, "API rate limit exceeded");
        }
        other => panic!("expected a remote error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_exhausted_budget_surfaces_as_throttle() {
    let server = MockServer::start().await;
    let base = server.uri();
    Mock::given(method("GET"))
        .and(path(ROOT))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([
                    {"type": "file", "name": "README.md", "url": format!("{base}{ROOT}README.md")}
                ]))
                .insert_header("x-ratelimit-remaining", "0")
                .insert_header("x-ratelimit-reset", (now() + 120).to_string().as_str()),
        )
        .mount(&server)
        .await;

    let harvester = RepoHarvester::new(config(&server)).unwrap();
    let err = harvester.fetch_repository_files(REPO_URL).await.unwrap_err();

    assert!(err.is_throttled());
    assert_eq!(err.status(), 429);
    // the file behind the exhausted budget was never requested
    assert_eq!(request_count(&server).await, 1);
}

#[tokio::test]
async fn test_binary_files_resolve_to_their_name() {
    let server = MockServer::start().await;
    let base = server.uri();
    Mock::given(method("GET"))
        .and(path(ROOT))
        .respond_with(ok(json!([
            {"type": "file", "name": "logo.png", "url": format!("{base}{ROOT}logo.png")},
            {"type": "file", "name": "notes.txt", "url": format!("{base}{ROOT}notes.txt")}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{ROOT}logo.png")))
        .respond_with(ok(json!({"name": "logo.png", "content": STANDARD.encode([0x89u8, 0x50, 0x4e, 0x47, 0xff, 0xd8])})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{ROOT}notes.txt")))
        .respond_with(ok(file("notes.txt", "remember the milk")))
        .mount(&server)
        .await;

    let harvester = RepoHarvester::new(config(&server)).unwrap();
    let files = harvester.fetch_repository_files(REPO_URL).await.unwrap();

    assert_eq!(files["logo.png"], "logo.png");
    assert_eq!(files["notes.txt"], "remember the milk");
}

#[tokio::test]
async fn test_invalid_repository_url_makes_no_calls() {
    let server = MockServer::start().await;
    let harvester = RepoHarvester::new(config(&server)).unwrap();

    let err = harvester.fetch_repository_files("widgets").await.unwrap_err();
    assert!(matches!(err, FetchError::InvalidRepositoryUrl(_)));
    assert_eq!(err.status(), 400);
    assert_eq!(request_count(&server).await, 0);
}
