use resume_builder::core::config_manager::{ScoringConfig, ToolchainConfig};
use resume_builder::core::templates::TemplateRegistry;
use resume_builder::generator::ResumeGenerator;
use resume_builder::web::{build_rocket, AppState, ResumeCache};
use rocket::http::{ContentType, Status};
use rocket::local::asynchronous::Client;
use serde_json::{json, Value};
use std::path::PathBuf;
use tempfile::TempDir;

const RESUME: &str = r#"contact:
  name: Api User
  email: api@example.com
  phone: 555-0100

education:
  institution: State University
  location: Springfield
  degree: B.S. Computer Science

skills:
  languages:
    - name: Rust
      tags: [rust, backend]

experience:
  - id: acme
    title: Engineer
    company: Acme
    location: Remote
    start_date: Jan 2021
    end_date: Present
    bullets:
      - id: acme-api
        text: Built the billing API
        tags: [rust, api]

leadership:
  - id: lead-a
    text: Ran the reading group
  - id: lead-b
    text: Mentored new hires
"#;

struct Fixture {
    _dir: TempDir,
    resume_path: PathBuf,
    order_path: PathBuf,
    client: Client,
}

async fn fixture() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let resume_path = dir.path().join("resume.yaml");
    let order_path = dir.path().join("order.yaml");
    std::fs::write(&resume_path, RESUME).unwrap();

    let state = AppState {
        cache: ResumeCache::new(&resume_path),
        order_path: order_path.clone(),
        generator: ResumeGenerator::new(TemplateRegistry::default(), ToolchainConfig::default()),
        scoring: ScoringConfig::default(),
    };
    let client = Client::tracked(build_rocket(state)).await.unwrap();

    Fixture {
        _dir: dir,
        resume_path,
        order_path,
        client,
    }
}

async fn post_json(client: &Client, uri: &str, body: &str) -> (Status, Value) {
    let response = client
        .post(uri.to_string())
        .header(ContentType::JSON)
        .body(body.to_string())
        .dispatch()
        .await;
    let status = response.status();
    (status, response.into_json::<Value>().await.unwrap())
}

#[rocket::async_test]
async fn test_health() {
    let fx = fixture().await;
    let response = fx.client.get("/api/health").dispatch().await;

    assert_eq!(response.status(), Status::Ok);
    assert_eq!(
        response.headers().get_one("Access-Control-Allow-Origin"),
        Some("*")
    );
    assert_eq!(
        response.into_json::<Value>().await.unwrap(),
        json!({"status": "ok"})
    );
}

#[rocket::async_test]
async fn test_get_resume_marks_everything_selected() {
    let fx = fixture().await;
    let response = fx.client.get("/api/resume").dispatch().await;
    assert_eq!(response.status(), Status::Ok);

    let body: Value = response.into_json().await.unwrap();
    assert_eq!(body["contact"]["name"], "Api User");
    assert_eq!(body["skills"][0]["items"][0]["selected"], true);
    assert_eq!(body["experience"][0]["selected"], true);
    assert_eq!(body["experience"][0]["tags"], json!([]));
    assert_eq!(body["experience"][0]["bullets"][0]["id"], "acme-api");
    assert_eq!(body["leadership"][1]["id"], "lead-b");
}

#[rocket::async_test]
async fn test_reload_picks_up_edits() {
    let fx = fixture().await;
    fx.client.get("/api/resume").dispatch().await;

    std::fs::write(&fx.resume_path, RESUME.replace("Api User", "Edited User")).unwrap();

    let response = fx.client.post("/api/resume/reload").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    let body: Value = response.into_json().await.unwrap();
    assert_eq!(body["contact"]["name"], "Edited User");
}

#[rocket::async_test]
async fn test_analyze_requires_description() {
    let fx = fixture().await;
    let (status, body) = post_json(&fx.client, "/api/job/analyze", r#"{"job_title": "Engineer"}"#).await;

    assert_eq!(status, Status::BadRequest);
    assert_eq!(body, json!({"error": "description is required"}));
}

#[rocket::async_test]
async fn test_analyze_without_credential_is_server_error() {
    let fx = fixture().await;
    let (status, body) = post_json(
        &fx.client,
        "/api/job/analyze",
        r#"{"job_title": "Engineer", "company": "Initech", "description": "Rust services"}"#,
    )
    .await;

    assert_eq!(status, Status::InternalServerError);
    assert!(body["error"].as_str().unwrap().contains("OPENROUTER_API_KEY"));
}

#[rocket::async_test]
async fn test_malformed_json_is_a_json_error() {
    let fx = fixture().await;

    let (status, body) = post_json(&fx.client, "/api/job/analyze", "{not json").await;
    assert_eq!(status, Status::BadRequest);
    assert_eq!(body, json!({"error": "invalid request body"}));

    let (status, body) = post_json(&fx.client, "/api/job/analyze", r#"{"description": 5}"#).await;
    assert_eq!(status, Status::UnprocessableEntity);
    assert_eq!(body, json!({"error": "invalid request body"}));
}

#[rocket::async_test]
async fn test_generate_with_unknown_ids_is_rejected() {
    let fx = fixture().await;
    let (status, body) = post_json(
        &fx.client,
        "/api/generate",
        r#"{"selections": {"experience": ["nope"]}, "template": "modern"}"#,
    )
    .await;

    assert_eq!(status, Status::BadRequest);
    assert_eq!(
        body,
        json!({"error": "no items found matching the specified IDs/tags"})
    );
}

#[rocket::async_test]
async fn test_order_defaults_then_merges_and_applies() {
    let fx = fixture().await;

    let response = fx.client.get("/api/order").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    assert_eq!(
        response.into_json::<Value>().await.unwrap(),
        json!({"experience": ["acme"], "projects": [], "leadership": ["lead-a", "lead-b"]})
    );
    assert!(!fx.order_path.exists());

    let response = fx
        .client
        .put("/api/order")
        .header(ContentType::JSON)
        .body(r#"{"leadership": ["lead-b"]}"#)
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    assert_eq!(
        response.into_json::<Value>().await.unwrap(),
        json!({"experience": ["acme"], "projects": [], "leadership": ["lead-b"]})
    );
    assert!(fx.order_path.exists());

    let body: Value = fx
        .client
        .get("/api/resume")
        .dispatch()
        .await
        .into_json()
        .await
        .unwrap();
    assert_eq!(body["leadership"][0]["id"], "lead-b");
    assert_eq!(body["leadership"][1]["id"], "lead-a");
}

#[rocket::async_test]
async fn test_templates_lists_builtin() {
    let fx = fixture().await;
    let body: Value = fx
        .client
        .get("/api/templates")
        .dispatch()
        .await
        .into_json()
        .await
        .unwrap();
    assert_eq!(body, json!({"templates": ["modern"]}));
}

#[rocket::async_test]
async fn test_unknown_route_and_preflight() {
    let fx = fixture().await;

    let response = fx.client.get("/api/nope").dispatch().await;
    assert_eq!(response.status(), Status::NotFound);
    let body: Value = response.into_json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("/api/nope"));

    let response = fx.client.options("/api/generate").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    assert_eq!(
        response.headers().get_one("Access-Control-Allow-Methods"),
        Some("GET, POST, PUT, OPTIONS")
    );
}
