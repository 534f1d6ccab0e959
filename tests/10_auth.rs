mod common;

use anyhow::Result;
use reqwest::StatusCode;

#[tokio::test]
async fn health_endpoint_responds() -> Result<()> {
    let server = common::spawn_server().await?;
    let client = reqwest::Client::new();

    let res = client.get(server.url("/health")).send().await?;
    assert_eq!(res.status(), StatusCode::OK, "unexpected status: {}", res.status());

    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["data"]["status"], "ok", "{}", body);
    Ok(())
}

#[tokio::test]
async fn root_lists_endpoints_without_a_token() -> Result<()> {
    let server = common::spawn_server().await?;

    let body = reqwest::get(server.url("/")).await?.json::<serde_json::Value>().await?;
    assert!(body["success"].as_bool().unwrap_or(false), "success=false: {}", body);
    assert!(body["data"]["endpoints"]["habits"].is_string(), "{}", body);
    Ok(())
}

#[tokio::test]
async fn requests_without_token_are_unauthorized() -> Result<()> {
    let server = common::spawn_server().await?;
    let client = reqwest::Client::new();

    for path in ["/habits", "/habits/1", "/entries", "/entries/1"] {
        let res = client.get(server.url(path)).send().await?;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "{}", path);
        let body = res.json::<serde_json::Value>().await?;
        assert_eq!(body["code"], "UNAUTHORIZED", "{}", body);
    }

    let res = client.post(server.url("/habits/1/archive")).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn malformed_and_foreign_tokens_are_rejected() -> Result<()> {
    let server = common::spawn_server().await?;
    let client = reqwest::Client::new();

    let res = client.get(server.url("/habits")).header("Authorization", "Token abc").send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client.get(server.url("/habits")).bearer_auth("not.a.jwt").send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let forged = habit_api_rust::auth::generate_jwt(
        &habit_api_rust::auth::Claims::new(uuid::Uuid::new_v4(), "mallory", 1)?,
        "some-other-secret",
    )?;
    let res = client.get(server.url("/habits")).bearer_auth(forged).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn valid_token_reaches_the_api() -> Result<()> {
    let server = common::spawn_server().await?;
    let alice = server.user("alice")?;

    let (status, body) = server.get(&alice, "/habits").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], serde_json::json!([]));
    Ok(())
}
