mod common;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

use common::stores::SlowStore;
use lupus_api_rust::resource::{AuthorFields, PostFields};
use lupus_api_rust::AppState;

async fn slow_server() -> Result<common::TestServer> {
    let state = AppState {
        posts: Arc::new(SlowStore::<PostFields>::new(Duration::from_millis(100))),
        authors: Arc::new(SlowStore::<AuthorFields>::new(Duration::from_millis(100))),
        secrets: common::secrets(),
    };
    common::TestServer::start_with(state).await
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_partial_updates_all_land() -> Result<()> {
    let server = slow_server().await?;
    let author = server.create("/authors", json!({ "name": "Ada" })).await?;
    let path = format!("/authors/{}", author["id"]);

    let (name, bio, image) = tokio::join!(
        server.put(&path).json(&json!({ "name": "Ada Lovelace" })).send(),
        server.put(&path).json(&json!({ "bio": "mathematician" })).send(),
        server.put(&path).json(&json!({ "imageId": 7 })).send(),
    );
    for res in [name?, bio?, image?] {
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.json::<Vec<Value>>().await?.len(), 1);
    }

    let authors = server.list("/authors").await?;
    assert_eq!(authors.len(), 1);
    assert_eq!(authors[0]["name"], "Ada Lovelace");
    assert_eq!(authors[0]["bio"], "mathematician");
    assert_eq!(authors[0]["imageId"], 7);
    assert_eq!(authors[0]["createdAt"], author["createdAt"]);

    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_updates_to_different_posts_stay_separate() -> Result<()> {
    let server = slow_server().await?;
    let author = server.create("/authors", json!({ "name": "Ada" })).await?;
    let first = server
        .create("/posts", json!({ "title": "First", "authorId": author["id"] }))
        .await?;
    let second = server
        .create("/posts", json!({ "title": "Second", "authorId": author["id"] }))
        .await?;

    let (a, b) = tokio::join!(
        server
            .put(&format!("/posts/{}", first["id"]))
            .json(&json!({ "content": "one" }))
            .send(),
        server
            .put(&format!("/posts/{}", second["id"]))
            .json(&json!({ "content": "two" }))
            .send(),
    );
    assert_eq!(a?.status(), StatusCode::OK);
    assert_eq!(b?.status(), StatusCode::OK);

    let posts = server.list("/posts").await?;
    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0]["title"], "First");
    assert_eq!(posts[0]["content"], "one");
    assert_eq!(posts[1]["title"], "Second");
    assert_eq!(posts[1]["content"], "two");

    Ok(())
}
