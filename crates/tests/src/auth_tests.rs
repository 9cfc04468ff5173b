use crate::fixtures::seed::PASSWORD;
use crate::fixtures::test_app::TestApp;
use serde_json::Value;

#[tokio::test]
async fn register_creates_user_and_returns_tokens() {
    let app = TestApp::spawn().await;

    let resp = app
        .client
        .post(app.url("/api/auth/register"))
        .json(&serde_json::json!({
            "name": "Alice",
            "email": "Alice@Test.com",
            "password": PASSWORD,
            "countryCode": "SI",
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status().as_u16(), 201);
    assert!(resp.headers().get("set-cookie").is_some());

    let json: Value = resp.json().await.unwrap();
    assert!(json["accessToken"].is_string());
    assert!(json["refreshToken"].is_string());
    assert_eq!(json["user"]["email"], "alice@test.com");
    assert_eq!(json["user"]["role"], "user");
    assert_eq!(json["user"]["countryCode"], "SI");
}

#[tokio::test]
async fn register_duplicate_email_is_rejected() {
    let app = TestApp::spawn().await;
    app.register_user("Dup", "dup@test.com").await;

    let resp = app
        .client
        .post(app.url("/api/auth/register"))
        .json(&serde_json::json!({
            "name": "Dup Again",
            "email": "dup@test.com",
            "password": PASSWORD,
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status().as_u16(), 400);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["success"], false);
}

#[tokio::test]
async fn register_rejects_invalid_email_and_short_password() {
    let app = TestApp::spawn().await;

    let resp = app
        .client
        .post(app.url("/api/auth/register"))
        .json(&serde_json::json!({
            "name": "Bad",
            "email": "not-an-email",
            "password": "short",
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status().as_u16(), 400);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["error"], "validation");
}

#[tokio::test]
async fn organiser_without_organization_is_rejected() {
    let app = TestApp::spawn().await;

    let resp = app
        .client
        .post(app.url("/api/auth/register"))
        .json(&serde_json::json!({
            "name": "Olga",
            "email": "olga@test.com",
            "password": PASSWORD,
            "role": "organiser",
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status().as_u16(), 400);
}

#[tokio::test]
async fn self_registration_as_admin_is_rejected() {
    let app = TestApp::spawn().await;

    let resp = app
        .client
        .post(app.url("/api/auth/register"))
        .json(&serde_json::json!({
            "name": "Mallory",
            "email": "mallory@test.com",
            "password": PASSWORD,
            "role": "admin",
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status().as_u16(), 400);
}

#[tokio::test]
async fn login_with_wrong_password_fails() {
    let app = TestApp::spawn().await;
    app.register_user("Bob", "bob@test.com").await;

    let resp = app
        .client
        .post(app.url("/api/auth/login"))
        .json(&serde_json::json!({
            "email": "bob@test.com",
            "password": "WrongPassword1!",
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status().as_u16(), 401);
}

#[tokio::test]
async fn me_requires_token_and_returns_profile() {
    let app = TestApp::spawn().await;
    let user = app.register_user("Carol", "carol@test.com").await;

    let resp = app.client.get(app.url("/api/auth/me")).send().await.unwrap();
    assert_eq!(resp.status().as_u16(), 401);

    let resp = app
        .auth_get("/api/auth/me", &user.access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["id"], user.id.as_str());
    assert_eq!(json["name"], "Carol");
}

#[tokio::test]
async fn update_profile_changes_fields() {
    let app = TestApp::spawn().await;
    let user = app.register_user("Dan", "dan@test.com").await;

    let resp = app
        .auth_put("/api/auth/me", &user.access_token)
        .json(&serde_json::json!({ "city": "Ljubljana", "mobile": "+386000" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["city"], "Ljubljana");
    assert_eq!(json["mobile"], "+386000");
    assert_eq!(json["name"], "Dan");
}

#[tokio::test]
async fn refresh_token_issues_new_pair() {
    let app = TestApp::spawn().await;
    let user = app.register_user("Eve", "eve@test.com").await;

    let resp = app
        .client
        .post(app.url("/api/auth/refresh"))
        .json(&serde_json::json!({ "refreshToken": user.refresh_token }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let json: Value = resp.json().await.unwrap();
    assert!(json["accessToken"].is_string());

    // An access token is not accepted as a refresh token
    let resp = app
        .client
        .post(app.url("/api/auth/refresh"))
        .json(&serde_json::json!({ "refreshToken": user.access_token }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 401);
}

#[tokio::test]
async fn admin_broadcast_reaches_role_and_can_be_marked_read() {
    let app = TestApp::spawn().await;
    let admin = app.register_admin("admin@test.com").await;
    let user = app.register_user("Fay", "fay@test.com").await;

    let resp = app
        .auth_post("/api/admin/notification", &user.access_token)
        .json(&serde_json::json!({ "title": "Hi", "message": "Nope" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 403);

    let resp = app
        .auth_post("/api/admin/notification", &admin.access_token)
        .json(&serde_json::json!({ "title": "Maintenance", "message": "Down at noon", "role": "user" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    let resp = app
        .auth_get("/api/user/notification", &user.access_token)
        .send()
        .await
        .unwrap();
    let notifications: Vec<Value> = resp.json().await.unwrap();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0]["title"], "Maintenance");
    assert_eq!(notifications[0]["isRead"], false);

    let nid = notifications[0]["id"].as_str().unwrap();
    let resp = app
        .auth_put(&format!("/api/user/notification/{}/read", nid), &user.access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    let resp = app
        .auth_get("/api/user/notification", &user.access_token)
        .send()
        .await
        .unwrap();
    let notifications: Vec<Value> = resp.json().await.unwrap();
    assert_eq!(notifications[0]["isRead"], true);
}

#[tokio::test]
async fn health_check_is_public() {
    let app = TestApp::spawn().await;

    let resp = app.client.get(app.url("/health")).send().await.unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn malformed_body_gets_error_envelope() {
    let app = TestApp::spawn().await;

    let resp = app
        .client
        .post(app.url("/api/auth/register"))
        .json(&serde_json::json!({ "name": 5 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "bad_request");
    assert!(json["message"].is_string());

    let resp = app
        .client
        .post(app.url("/api/auth/login"))
        .header("Content-Type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["success"], false);
}
