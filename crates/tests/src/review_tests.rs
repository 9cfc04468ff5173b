use serde_json::Value;

use crate::fixtures::test_app::TestApp;

async fn post_reviews(app: &TestApp, token: &str, retreat_id: &str, reviews: Value) -> reqwest::Response {
    app.auth_post("/api/review", token)
        .json(&serde_json::json!({ "retreatId": retreat_id, "reviews": reviews }))
        .send()
        .await
        .unwrap()
}

async fn average(app: &TestApp, retreat_id: &str) -> f64 {
    let json: Value = app
        .client
        .get(app.url(&format!("/api/review/retreat/{}/average", retreat_id)))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    json["averageRating"].as_f64().unwrap()
}

#[tokio::test]
async fn average_is_zero_then_mean_of_entries() {
    let app = TestApp::spawn().await;
    let seeded = app.seed_marketplace().await;

    assert_eq!(average(&app, &seeded.retreat_id).await, 0.0);

    let resp = post_reviews(
        &app,
        &seeded.guest.access_token,
        &seeded.retreat_id,
        serde_json::json!([{ "rating": 5, "comment": "Bliss" }]),
    )
    .await;
    assert_eq!(resp.status().as_u16(), 201);

    let other = app.register_user("Hal", "hal@test.com").await;
    post_reviews(
        &app,
        &other.access_token,
        &seeded.retreat_id,
        serde_json::json!([{ "rating": 3, "comment": "Fine" }]),
    )
    .await;

    assert_eq!(average(&app, &seeded.retreat_id).await, 4.0);
}

#[tokio::test]
async fn second_post_appends_to_same_container() {
    let app = TestApp::spawn().await;
    let seeded = app.seed_marketplace().await;

    post_reviews(
        &app,
        &seeded.guest.access_token,
        &seeded.retreat_id,
        serde_json::json!([{ "rating": 4, "comment": "Good" }]),
    )
    .await;
    let resp = post_reviews(
        &app,
        &seeded.guest.access_token,
        &seeded.retreat_id,
        serde_json::json!([{ "rating": 2, "comment": "Second visit was worse" }]),
    )
    .await;
    assert_eq!(resp.status().as_u16(), 201);

    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["userName"], "Gina");
    let entries = json["reviews"].as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert!(entries.iter().all(|e| e["username"] == "Gina"));

    let containers = app
        .db
        .collection::<bson::Document>("reviews")
        .count_documents(bson::doc! {})
        .await
        .unwrap();
    assert_eq!(containers, 1);
}

#[tokio::test]
async fn invalid_reviews_are_rejected() {
    let app = TestApp::spawn().await;
    let seeded = app.seed_marketplace().await;

    for reviews in [
        serde_json::json!([]),
        serde_json::json!([{ "rating": 6, "comment": "Too good" }]),
        serde_json::json!([{ "rating": 0, "comment": "Too bad" }]),
        serde_json::json!([{ "rating": 3, "comment": "" }]),
    ] {
        let resp = post_reviews(&app, &seeded.guest.access_token, &seeded.retreat_id, reviews).await;
        assert_eq!(resp.status().as_u16(), 400);
    }
}

#[tokio::test]
async fn listing_joins_poster_and_retreat_title() {
    let app = TestApp::spawn().await;
    let seeded = app.seed_marketplace().await;
    let path = format!("/api/review/retreat/{}", seeded.retreat_id);

    let resp = app.client.get(app.url(&path)).send().await.unwrap();
    assert_eq!(resp.status().as_u16(), 404);

    post_reviews(
        &app,
        &seeded.guest.access_token,
        &seeded.retreat_id,
        serde_json::json!([{ "rating": 5, "comment": "Bliss" }]),
    )
    .await;

    let json: Value = app
        .client
        .get(app.url(&path))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let data = json["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["rating"], 5);
    assert_eq!(data[0]["comment"], "Bliss");
    assert_eq!(data[0]["username"], "Gina");
    assert_eq!(data[0]["retreatName"], seeded.retreat_title.as_str());
}

#[tokio::test]
async fn edit_requires_ownership_but_admin_edit_does_not() {
    let app = TestApp::spawn().await;
    let seeded = app.seed_marketplace().await;
    let other = app.register_user("Hal", "hal@test.com").await;

    let resp = post_reviews(
        &app,
        &seeded.guest.access_token,
        &seeded.retreat_id,
        serde_json::json!([{ "rating": 2, "comment": "Meh" }]),
    )
    .await;
    let json: Value = resp.json().await.unwrap();
    let review_id = json["reviews"][0]["id"].as_str().unwrap().to_string();

    let resp = app
        .auth_put(&format!("/api/review/{}", review_id), &other.access_token)
        .json(&serde_json::json!({ "rating": 1, "comment": "Hijacked" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 404);

    let resp = app
        .auth_put(&format!("/api/review/{}", review_id), &seeded.guest.access_token)
        .json(&serde_json::json!({ "rating": 4, "comment": "Grew on me" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let edited: Value = resp.json().await.unwrap();
    assert_eq!(edited["rating"], 4);
    assert_eq!(edited["comment"], "Grew on me");

    let resp = app
        .auth_put(&format!("/api/admin/review/{}", review_id), &seeded.admin.access_token)
        .json(&serde_json::json!({ "rating": 3, "comment": "Moderated" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    assert_eq!(average(&app, &seeded.retreat_id).await, 3.0);
}

#[tokio::test]
async fn helpful_votes_and_admin_delete() {
    let app = TestApp::spawn().await;
    let seeded = app.seed_marketplace().await;

    let resp = post_reviews(
        &app,
        &seeded.guest.access_token,
        &seeded.retreat_id,
        serde_json::json!([
            { "rating": 5, "comment": "Keep" },
            { "rating": 1, "comment": "Spam" },
        ]),
    )
    .await;
    let json: Value = resp.json().await.unwrap();
    let keep_id = json["reviews"][0]["id"].as_str().unwrap().to_string();
    let spam_id = json["reviews"][1]["id"].as_str().unwrap().to_string();

    for _ in 0..2 {
        let resp = app
            .auth_post(&format!("/api/review/{}/helpful", keep_id), &seeded.organiser.access_token)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status().as_u16(), 200);
    }

    let resp = app
        .auth_delete(&format!("/api/admin/review/{}", spam_id), &seeded.guest.access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 403);

    let resp = app
        .auth_delete(&format!("/api/admin/review/{}", spam_id), &seeded.admin.access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 204);

    let json: Value = app
        .client
        .get(app.url(&format!("/api/review/retreat/{}", seeded.retreat_id)))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let data = json["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["helpfulCount"], 2);
    assert_eq!(average(&app, &seeded.retreat_id).await, 5.0);
}

#[tokio::test]
async fn removed_poster_is_listed_as_anonymous() {
    let app = TestApp::spawn().await;
    let seeded = app.seed_marketplace().await;
    let ghost = app.register_user("Casper", "casper@test.com").await;

    let resp = post_reviews(
        &app,
        &ghost.access_token,
        &seeded.retreat_id,
        serde_json::json!([{ "rating": 4, "comment": "Quiet and kind" }]),
    )
    .await;
    assert_eq!(resp.status().as_u16(), 201);

    app.db
        .collection::<bson::Document>("users")
        .delete_one(bson::doc! { "_id": ghost.oid() })
        .await
        .unwrap();

    let json: Value = app
        .client
        .get(app.url(&format!("/api/review/retreat/{}", seeded.retreat_id)))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let data = json["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["username"], "Anonymous");
    assert_eq!(data[0]["comment"], "Quiet and kind");
}
