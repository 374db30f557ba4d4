mod common;

use std::sync::Arc;

use anyhow::Result;
use reqwest::{Response, StatusCode};
use serde_json::{json, Value};

use common::stores::FailingStore;
use lupus_api_rust::AppState;

async fn broken_server() -> Result<common::TestServer> {
    let state = AppState {
        posts: Arc::new(FailingStore),
        authors: Arc::new(FailingStore),
        secrets: common::secrets(),
    };
    common::TestServer::start_with(state).await
}

/// A store failure is a generic 500: no rows and nothing from the driver
async fn assert_generic_500(res: Response) -> Result<()> {
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let text = res.text().await?;
    assert!(!text.contains("relation"), "driver detail leaked: {}", text);
    assert!(!text.contains("does not exist"), "driver detail leaked: {}", text);

    let body: Value = serde_json::from_str(&text)?;
    assert!(!body.is_array(), "error must not look like a record list: {}", body);
    assert_eq!(body["code"], "INTERNAL_SERVER_ERROR");
    assert_eq!(body["message"], "An error occurred while processing your request");
    Ok(())
}

#[tokio::test]
async fn list_failure_is_generic_500() -> Result<()> {
    let server = broken_server().await?;

    for path in ["/posts", "/authors"] {
        let res = server.get(path).send().await?;
        assert_generic_500(res).await?;
    }
    Ok(())
}

#[tokio::test]
async fn create_failure_is_generic_500() -> Result<()> {
    let server = broken_server().await?;

    let res = server.post("/authors").json(&json!({ "name": "Ada" })).send().await?;
    assert_generic_500(res).await?;

    let res = server
        .post("/posts")
        .json(&json!({ "title": "Hello", "authorId": 1 }))
        .send()
        .await?;
    assert_generic_500(res).await
}

#[tokio::test]
async fn update_failure_is_generic_500() -> Result<()> {
    let server = broken_server().await?;

    let res = server.put("/authors/1").json(&json!({ "bio": "x" })).send().await?;
    assert_generic_500(res).await?;

    let res = server.put("/posts/1").json(&json!({ "title": "x" })).send().await?;
    assert_generic_500(res).await
}

#[tokio::test]
async fn validation_still_runs_before_the_store() -> Result<()> {
    let server = broken_server().await?;

    let res = server.post("/authors").json(&json!({})).send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn health_reports_unavailable_store() -> Result<()> {
    let server = broken_server().await?;

    let res = server.get("/health").send().await?;
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);

    let body = res.json::<Value>().await?;
    assert_eq!(body["code"], "SERVICE_UNAVAILABLE");
    assert_eq!(body["message"], "Database unavailable");
    assert!(!body.to_string().contains("relation"));
    Ok(())
}
