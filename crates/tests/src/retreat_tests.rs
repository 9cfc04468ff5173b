use crate::fixtures::test_app::TestApp;
use serde_json::Value;

#[tokio::test]
async fn organiser_retreat_waits_for_approval() {
    let app = TestApp::spawn().await;
    let admin = app.register_admin("admin@test.com").await;
    let organiser = app
        .register_organiser("Olga", "olga@test.com", "Lakeside Yoga")
        .await;

    let resp = app.create_retreat(&organiser.access_token, "Forest Bathing").await;
    assert_eq!(resp.status().as_u16(), 201);
    let retreat: Value = resp.json().await.unwrap();
    assert_eq!(retreat["isApproved"], false);
    assert_eq!(retreat["organizerId"], organiser.id.as_str());
    assert_eq!(retreat["rooms"][0]["roomType"], "Shared");
    let rid = retreat["id"].as_str().unwrap().to_string();

    // Not in the public list yet
    let resp = app.client.get(app.url("/api/retreat")).send().await.unwrap();
    let page: Value = resp.json().await.unwrap();
    assert_eq!(page["total"], 0);

    app.approve_retreat(&admin.access_token, &rid).await;

    let resp = app.client.get(app.url("/api/retreat")).send().await.unwrap();
    let page: Value = resp.json().await.unwrap();
    assert_eq!(page["total"], 1);
    assert_eq!(page["items"][0]["title"], "Forest Bathing");
}

#[tokio::test]
async fn admin_retreat_is_approved_without_owner() {
    let app = TestApp::spawn().await;
    let admin = app.register_admin("admin@test.com").await;

    let resp = app.create_retreat(&admin.access_token, "House Retreat").await;
    assert_eq!(resp.status().as_u16(), 201);
    let retreat: Value = resp.json().await.unwrap();
    assert_eq!(retreat["isApproved"], true);
    assert_eq!(retreat["isCreatedByAdmin"], true);
    assert!(retreat["organizerId"].is_null());
}

#[tokio::test]
async fn plain_user_cannot_create_retreat() {
    let app = TestApp::spawn().await;
    let user = app.register_user("Gina", "gina@test.com").await;

    let resp = app.create_retreat(&user.access_token, "Nope").await;
    assert_eq!(resp.status().as_u16(), 403);
}

#[tokio::test]
async fn duplicate_title_is_rejected_without_new_document() {
    let app = TestApp::spawn().await;
    let organiser = app
        .register_organiser("Olga", "olga@test.com", "Lakeside Yoga")
        .await;

    let resp = app.create_retreat(&organiser.access_token, "Same Name").await;
    assert_eq!(resp.status().as_u16(), 201);

    let resp = app.create_retreat(&organiser.access_token, "Same Name").await;
    assert_eq!(resp.status().as_u16(), 400);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "conflict");

    let count = app
        .db
        .collection::<bson::Document>("retreats")
        .count_documents(bson::doc! {})
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn end_before_start_is_rejected() {
    let app = TestApp::spawn().await;
    let organiser = app
        .register_organiser("Olga", "olga@test.com", "Lakeside Yoga")
        .await;

    let resp = app
        .auth_post("/api/retreat", &organiser.access_token)
        .json(&serde_json::json!({
            "title": "Backwards",
            "price": 10.0,
            "dates": { "start": "2030-05-10T00:00:00Z", "end": "2030-05-01T00:00:00Z" },
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);
}

#[tokio::test]
async fn only_owner_or_admin_can_update() {
    let app = TestApp::spawn().await;
    let owner = app
        .register_organiser("Olga", "olga@test.com", "Lakeside Yoga")
        .await;
    let other = app
        .register_organiser("Otto", "otto@test.com", "Mountain Zen")
        .await;

    let resp = app.create_retreat(&owner.access_token, "Editable").await;
    let retreat: Value = resp.json().await.unwrap();
    let rid = retreat["id"].as_str().unwrap();

    let resp = app
        .auth_put(&format!("/api/retreat/{}", rid), &other.access_token)
        .json(&serde_json::json!({ "price": 1.0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 403);

    let resp = app
        .auth_put(&format!("/api/retreat/{}", rid), &owner.access_token)
        .json(&serde_json::json!({ "price": 650.0, "description": "Now with sauna" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let updated: Value = resp.json().await.unwrap();
    assert_eq!(updated["price"], 650.0);
    assert_eq!(updated["description"], "Now with sauna");
}

#[tokio::test]
async fn organiser_listing_hides_unapproved_from_others() {
    let app = TestApp::spawn().await;
    let owner = app
        .register_organiser("Olga", "olga@test.com", "Lakeside Yoga")
        .await;
    let guest = app.register_user("Gina", "gina@test.com").await;

    app.create_retreat(&owner.access_token, "Pending One").await;

    let path = format!("/api/retreat/organizer/{}", owner.id);
    let own: Vec<Value> = app
        .auth_get(&path, &owner.access_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(own.len(), 1);

    let public: Vec<Value> = app
        .auth_get(&path, &guest.access_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(public.is_empty());
}

#[tokio::test]
async fn malformed_id_is_bad_request() {
    let app = TestApp::spawn().await;

    let resp = app
        .client
        .get(app.url("/api/retreat/not-an-id"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);
}

#[tokio::test]
async fn admin_deletes_retreat() {
    let app = TestApp::spawn().await;
    let admin = app.register_admin("admin@test.com").await;

    let resp = app.create_retreat(&admin.access_token, "Short Lived").await;
    let retreat: Value = resp.json().await.unwrap();
    let rid = retreat["id"].as_str().unwrap();

    let resp = app
        .auth_delete(&format!("/api/retreat/{}", rid), &admin.access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 204);

    let resp = app
        .client
        .get(app.url(&format!("/api/retreat/{}", rid)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 404);
}
