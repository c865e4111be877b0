mod common;

use anyhow::Result;
use reqwest::{Method, StatusCode};
use serde_json::json;

use common::{TestServer, ADMIN_EMAIL, ADMIN_PASSWORD};

#[tokio::test]
async fn health_reports_database_ok() -> Result<()> {
    let server = TestServer::start().await?;

    let (status, body) = server.get("/health", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "ok");
    assert_eq!(body["data"]["database"], "ok");
    Ok(())
}

#[tokio::test]
async fn fresh_instance_is_not_initialized() -> Result<()> {
    let server = TestServer::start().await?;

    let (status, body) = server.get("/setup/status", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["initialized"], false);
    assert_eq!(body["data"]["superAdminCount"], 0);
    assert!(body["data"].get("orgName").is_none());
    Ok(())
}

#[tokio::test]
async fn init_then_login() -> Result<()> {
    let server = TestServer::start().await?;

    let (status, body) = server
        .post(
            "/setup/init",
            None,
            json!({ "orgName": "Acme", "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD }),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["role"], "super-admin");
    assert_eq!(body["data"]["email"], ADMIN_EMAIL);
    assert!(body["data"]["orgId"].as_str().unwrap().starts_with("org_"));
    assert!(body["data"]["userId"].as_str().unwrap().starts_with("usr_"));

    let (_, status_body) = server.get("/setup/status", None).await?;
    assert_eq!(status_body["data"]["initialized"], true);
    assert_eq!(status_body["data"]["superAdminCount"], 1);
    assert_eq!(status_body["data"]["orgName"], "Acme");

    let (status, body) = server
        .post("/auth/login", None, json!({ "email": ADMIN_EMAIL, "password": "Wrong123!" }))
        .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Invalid email or password");
    assert_eq!(body["code"], "UNAUTHORIZED");

    let (status, body) = server
        .post("/auth/login", None, json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD }))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Login successful");
    assert_eq!(body["data"]["role"], "super-admin");
    assert!(body["data"]["token"].as_str().is_some());
    Ok(())
}

#[tokio::test]
async fn init_succeeds_only_once() -> Result<()> {
    let server = TestServer::start().await?;
    let (_, founder_id) = server.init().await?;

    let (status, body) = server
        .post(
            "/setup/init",
            None,
            json!({ "orgName": "Other", "email": "b@other.com", "password": "Xyz98765#" }),
        )
        .await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Instance is already initialized");
    assert_eq!(body["code"], "CONFLICT");

    let (_, status_body) = server.get("/setup/status", None).await?;
    assert_eq!(status_body["data"]["orgName"], "Acme");
    assert_eq!(status_body["data"]["superAdminCount"], 1);

    let (status, _) = server
        .post("/auth/login", None, json!({ "email": "b@other.com", "password": "Xyz98765#" }))
        .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let token = server.login(ADMIN_EMAIL, ADMIN_PASSWORD).await?;
    let (_, me) = server.get("/auth/me", Some(&token)).await?;
    assert_eq!(me["data"]["id"], founder_id.as_str());
    Ok(())
}

#[tokio::test]
async fn init_validates_input() -> Result<()> {
    let server = TestServer::start().await?;

    let (status, body) = server
        .post("/setup/init", None, json!({ "orgName": "  ", "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD }))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Organization name is required");

    let (status, body) = server
        .post("/setup/init", None, json!({ "orgName": "Acme", "email": "not-an-email", "password": ADMIN_PASSWORD }))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid email format");

    let (status, body) = server
        .post("/setup/init", None, json!({ "orgName": "Acme", "email": ADMIN_EMAIL, "password": "weak" }))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["error"].as_str().unwrap().starts_with("Password validation failed: "));

    let (status, body) = server
        .post("/setup/init", None, json!({ "orgName": "Acme" }))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Email and password are required");

    // Nothing was created along the way
    let (_, status_body) = server.get("/setup/status", None).await?;
    assert_eq!(status_body["data"]["initialized"], false);
    Ok(())
}

#[tokio::test]
async fn malformed_json_uses_the_error_envelope() -> Result<()> {
    let server = TestServer::start().await?;

    let response = reqwest::Client::new()
        .post(format!("{}/api/auth/login", server.base_url))
        .header("content-type", "application/json")
        .body("{ not json")
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "BAD_REQUEST");
    assert!(!body["error"].as_str().unwrap().is_empty());
    Ok(())
}

#[tokio::test]
async fn unknown_routes_are_not_found() -> Result<()> {
    let server = TestServer::start().await?;

    for path in ["/nope", "/team/abc/extra/segments"] {
        let (status, body) = server.send(Method::GET, path, None, None).await?;
        assert_eq!(status, StatusCode::NOT_FOUND, "{path}");
        assert_eq!(body["error"], "Route not found");
        assert_eq!(body["code"], "NOT_FOUND");
    }
    Ok(())
}

#[tokio::test]
async fn wrong_methods_are_not_found() -> Result<()> {
    let server = TestServer::start().await?;
    let (token, _) = server.init().await?;

    for (method, path, auth) in [
        (Method::GET, "/auth/login", None),
        (Method::DELETE, "/health", None),
        (Method::PUT, "/setup/init", None),
        (Method::PATCH, "/team", Some(token.as_str())),
    ] {
        let (status, body) = server.send(method, path, auth, None).await?;
        assert_eq!(status, StatusCode::NOT_FOUND, "{path}");
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Route not found");
        assert_eq!(body["code"], "NOT_FOUND");
    }
    Ok(())
}

#[tokio::test]
async fn non_json_bodies_are_unsupported_media_type() -> Result<()> {
    let server = TestServer::start().await?;

    let response = reqwest::Client::new()
        .post(format!("{}/api/auth/login", server.base_url))
        .header("content-type", "text/plain")
        .body("email=a@acme.com")
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);

    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "UNSUPPORTED_MEDIA_TYPE");
    Ok(())
}
