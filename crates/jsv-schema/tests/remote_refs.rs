//! Integration tests: `$ref` resolution against HTTP origins.
//!
//! Each test stands up a wiremock server playing the role of a schema host
//! and checks which URLs the resolver requests and how fetch failures show
//! up on the file report.

use jsv_schema::{BaseDirectory, FileValidator, Outcome, ValidatorConfig};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn validator() -> FileValidator {
    FileValidator::new(&ValidatorConfig::default()).expect("validator")
}

fn local_root(dir: &tempfile::TempDir, name: &str, schema: serde_json::Value) -> BaseDirectory {
    std::fs::write(dir.path().join(name), serde_json::to_vec(&schema).unwrap()).unwrap();
    BaseDirectory::local(dir.path())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn absolute_http_ref_is_fetched_verbatim_from_local_root() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/shared/money.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"type": "string"})))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let base = local_root(
        &dir,
        "invoice.json",
        json!({
            "properties": {
                "total": {"$ref": format!("{}/shared/money.json", server.uri())}
            }
        }),
    );

    let report = validator().validate_file("invoice.json", &base).await;
    assert!(report.ok(), "{report}");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn relative_ref_under_remote_root_is_joined_onto_base_url() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/schemas/root.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"properties": {"child": {"$ref": "child.json"}}})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/schemas/child.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"type": "integer"})))
        .expect(1)
        .mount(&server)
        .await;

    let base = BaseDirectory::new(&format!("{}/schemas", server.uri()));
    let report = validator().validate_file("root.json", &base).await;
    assert!(report.ok(), "{report}");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn parent_directory_ref_under_remote_root_climbs_the_base_url() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/order.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"properties": {"sku": {"$ref": "../common/sku.json"}}})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/common/sku.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"type": "string"})))
        .expect(1)
        .mount(&server)
        .await;

    let base = BaseDirectory::new(&format!("{}/v1", server.uri()));
    let report = validator().validate_file("order.json", &base).await;
    assert!(report.ok(), "{report}");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn schema_without_refs_makes_no_ref_requests() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/plain.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"type": "object"})))
        .expect(1)
        .mount(&server)
        .await;

    let base = BaseDirectory::new(&server.uri());
    let report = validator().validate_file("plain.json", &base).await;
    assert!(report.ok(), "{report}");

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1, "only the root document may be requested");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn not_found_ref_reports_loading_error_and_spares_siblings() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing.json"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("broken.json"),
        serde_json::to_vec(&json!({"$ref": format!("{}/missing.json", server.uri())})).unwrap(),
    )
    .unwrap();
    std::fs::write(dir.path().join("fine.json"), r#"{"type":"string"}"#).unwrap();
    let base = BaseDirectory::local(dir.path());

    let v = validator();
    let (broken, fine) = tokio::join!(
        v.validate_file("broken.json", &base),
        v.validate_file("fine.json", &base),
    );

    match &broken.outcome {
        Outcome::Invalid(message) => assert!(
            message.contains("Loading error: 404"),
            "unexpected message: {message}"
        ),
        other => panic!("expected INVALID, got {other:?}"),
    }
    assert!(fine.ok(), "{fine}");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn server_error_on_root_is_reported_on_file() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/root.json"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let base = BaseDirectory::new(&server.uri());
    let report = validator().validate_file("root.json", &base).await;
    assert_eq!(report.outcome.tag(), "INVALID");
    assert!(report.message().unwrap().contains("Loading error: 503"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn repeated_runs_give_identical_verdicts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/id.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"type": "integer"})))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let base = local_root(
        &dir,
        "entity.json",
        json!({"properties": {"id": {"$ref": format!("{}/id.json", server.uri())}}}),
    );
    std::fs::write(dir.path().join("bad.json"), r#"{"minLength": "three"}"#).unwrap();

    let v = validator();
    let first = (
        v.validate_file("entity.json", &base).await,
        v.validate_file("bad.json", &base).await,
    );
    let second = (
        v.validate_file("entity.json", &base).await,
        v.validate_file("bad.json", &base).await,
    );
    assert_eq!(first, second);
    assert!(first.0.ok());
    assert!(!first.1.ok());
}
