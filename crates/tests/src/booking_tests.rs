use bson::{DateTime, oid::ObjectId};
use chrono::{Duration, Utc};
use retreats_db::models::{Accommodation, Booking, BookingStatus, DateWindow};
use serde_json::Value;

use crate::fixtures::test_app::TestApp;

fn stored_booking(
    user_id: ObjectId,
    retreat_id: ObjectId,
    status: Option<BookingStatus>,
    start_offset_days: i64,
    order_id: &str,
) -> Booking {
    let start = Utc::now() + Duration::days(start_offset_days);
    Booking {
        id: None,
        user_id,
        retreat_id,
        dates: DateWindow {
            start: DateTime::from_chrono(start),
            end: DateTime::from_chrono(start + Duration::days(2)),
        },
        occupancy: 1,
        accommodation: Accommodation {
            room_type: "Shared".to_string(),
            rooms: 1,
            price: 100.0,
            images: vec![],
        },
        total_amount: 100.0,
        order_id: order_id.to_string(),
        status,
        cancellation_reason: None,
        date_of_booking: DateTime::now(),
    }
}

#[tokio::test]
async fn checkout_confirms_and_notifies_guest() {
    let app = TestApp::spawn().await;
    let seeded = app.seed_marketplace().await;

    let resp = app
        .book(&seeded.guest.access_token, &seeded.retreat_id, 10, 2)
        .await;
    assert_eq!(resp.status().as_u16(), 201);

    let booking: Value = resp.json().await.unwrap();
    assert_eq!(booking["status"], "confirmed");
    assert_eq!(booking["totalAmount"], 200.0);
    assert_eq!(booking["accommodation"]["roomType"], "Shared");
    assert!(booking["orderId"].as_str().unwrap().starts_with("ORD-"));

    let notifications: Vec<Value> = app
        .auth_get("/api/user/notification", &seeded.guest.access_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0]["title"], "Booking confirmed");
}

#[tokio::test]
async fn booking_unapproved_retreat_or_unknown_room_fails() {
    let app = TestApp::spawn().await;
    let seeded = app.seed_marketplace().await;

    let resp = app
        .create_retreat(&seeded.organiser.access_token, "Not Yet Open")
        .await;
    let pending: Value = resp.json().await.unwrap();
    let pending_id = pending["id"].as_str().unwrap();

    let resp = app.book(&seeded.guest.access_token, pending_id, 10, 1).await;
    assert_eq!(resp.status().as_u16(), 400);

    let start = Utc::now() + Duration::days(10);
    let resp = app
        .auth_post("/api/booking", &seeded.guest.access_token)
        .json(&serde_json::json!({
            "retreatId": seeded.retreat_id,
            "dates": { "start": start.to_rfc3339(), "end": (start + Duration::days(1)).to_rfc3339() },
            "occupancy": 1,
            "roomType": "Penthouse",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);
}

#[tokio::test]
async fn book_then_cancel_moves_booking_to_canceled() {
    let app = TestApp::spawn().await;
    let seeded = app.seed_marketplace().await;
    let path = format!("/api/booking/{}", seeded.guest.id);

    let resp = app
        .book(&seeded.guest.access_token, &seeded.retreat_id, 14, 1)
        .await;
    let booking: Value = resp.json().await.unwrap();
    let booking_id = booking["id"].as_str().unwrap();

    let buckets: Value = app
        .auth_get(&path, &seeded.guest.access_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(buckets["upcoming"].as_array().unwrap().len(), 1);
    assert_eq!(buckets["upcoming"][0]["retreatTitle"], seeded.retreat_title.as_str());
    assert_eq!(buckets["upcoming"][0]["userName"], "Gina");
    assert!(buckets["canceled"].as_array().unwrap().is_empty());

    // A blank reason is refused
    let resp = app
        .auth_put(&format!("/api/booking/{}/cancel", booking_id), &seeded.guest.access_token)
        .json(&serde_json::json!({ "reason": "" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);

    let resp = app
        .auth_put(&format!("/api/booking/{}/cancel", booking_id), &seeded.guest.access_token)
        .json(&serde_json::json!({ "reason": "Family emergency" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let cancelled: Value = resp.json().await.unwrap();
    assert_eq!(cancelled["status"], "cancelled");
    assert_eq!(cancelled["cancellationReason"], "Family emergency");

    let buckets: Value = app
        .auth_get(&path, &seeded.guest.access_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(buckets["upcoming"].as_array().unwrap().is_empty());
    assert_eq!(buckets["canceled"].as_array().unwrap().len(), 1);

    let notifications: Vec<Value> = app
        .auth_get("/api/user/notification", &seeded.guest.access_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(
        notifications
            .iter()
            .any(|n| n["message"].as_str().unwrap().contains("Family emergency"))
    );

    // Cancelling twice is refused
    let resp = app
        .auth_put(&format!("/api/booking/{}/cancel", booking_id), &seeded.guest.access_token)
        .json(&serde_json::json!({ "reason": "Again" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);
}

#[tokio::test]
async fn stranger_cannot_cancel_or_view_buckets() {
    let app = TestApp::spawn().await;
    let seeded = app.seed_marketplace().await;
    let stranger = app.register_user("Sam", "sam@test.com").await;

    let resp = app
        .book(&seeded.guest.access_token, &seeded.retreat_id, 14, 1)
        .await;
    let booking: Value = resp.json().await.unwrap();
    let booking_id = booking["id"].as_str().unwrap();

    let resp = app
        .auth_put(&format!("/api/booking/{}/cancel", booking_id), &stranger.access_token)
        .json(&serde_json::json!({ "reason": "Mischief" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 403);

    let resp = app
        .auth_get(&format!("/api/booking/{}", seeded.guest.id), &stranger.access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 403);
}

#[tokio::test]
async fn buckets_follow_status_precedence() {
    let app = TestApp::spawn().await;
    let seeded = app.seed_marketplace().await;
    let guest = seeded.guest.oid();
    let retreat = bson::oid::ObjectId::parse_str(&seeded.retreat_id).unwrap();

    let bookings = app.db.collection::<Booking>("bookings");
    bookings
        .insert_many([
            stored_booking(guest, retreat, Some(BookingStatus::Cancelled), 20, "ORD-A"),
            stored_booking(guest, retreat, Some(BookingStatus::Confirmed), 20, "ORD-B"),
            stored_booking(guest, retreat, Some(BookingStatus::Confirmed), -20, "ORD-C"),
            stored_booking(guest, retreat, Some(BookingStatus::Completed), -40, "ORD-D"),
            stored_booking(guest, retreat, None, 5, "ORD-E"),
            stored_booking(guest, retreat, Some(BookingStatus::Pending), 5, "ORD-F"),
        ])
        .await
        .unwrap();

    let buckets: Value = app
        .auth_get(&format!("/api/booking/{}", seeded.guest.id), &seeded.guest.access_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let orders = |key: &str| -> Vec<String> {
        buckets[key]
            .as_array()
            .unwrap()
            .iter()
            .map(|b| b["orderId"].as_str().unwrap().to_string())
            .collect()
    };

    assert_eq!(orders("canceled"), vec!["ORD-A"]);
    assert_eq!(orders("upcoming"), vec!["ORD-B"]);
    assert_eq!(orders("confirmed"), vec!["ORD-C"]);
    assert_eq!(orders("completed"), vec!["ORD-D"]);
    assert_eq!(orders("unconfirmed"), vec!["ORD-E"]);
    assert_eq!(orders("unknown"), vec!["ORD-F"]);
}

#[tokio::test]
async fn organiser_sees_confirmed_bookings_with_organization() {
    let app = TestApp::spawn().await;
    let seeded = app.seed_marketplace().await;

    app.book(&seeded.guest.access_token, &seeded.retreat_id, 10, 1)
        .await;
    let resp = app
        .book(&seeded.guest.access_token, &seeded.retreat_id, 12, 1)
        .await;
    let second: Value = resp.json().await.unwrap();
    app.auth_put(
        &format!("/api/booking/{}/cancel", second["id"].as_str().unwrap()),
        &seeded.guest.access_token,
    )
    .json(&serde_json::json!({ "reason": "Clash" }))
    .send()
    .await
    .unwrap();

    let path = format!("/api/booking/organizer/{}", seeded.organiser.id);
    let resp = app
        .auth_get(&path, &seeded.organiser.access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["organization"], "Lakeside Yoga");
    assert_eq!(json["bookings"].as_array().unwrap().len(), 1);
    assert_eq!(json["bookings"][0]["userEmail"], "gina@retreats.test");

    let buckets: Value = app
        .auth_get(&format!("{}/categorized", path), &seeded.organiser.access_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(buckets["upcoming"].as_array().unwrap().len(), 1);
    assert_eq!(buckets["canceled"].as_array().unwrap().len(), 1);

    let resp = app
        .auth_get(&path, &seeded.guest.access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 403);
}

#[tokio::test]
async fn admin_marks_booking_completed() {
    let app = TestApp::spawn().await;
    let seeded = app.seed_marketplace().await;

    let resp = app
        .book(&seeded.guest.access_token, &seeded.retreat_id, 10, 1)
        .await;
    let booking: Value = resp.json().await.unwrap();
    let status_path = format!("/api/booking/{}/status", booking["id"].as_str().unwrap());

    let resp = app
        .auth_put(&status_path, &seeded.guest.access_token)
        .json(&serde_json::json!({ "status": "completed" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 403);

    let resp = app
        .auth_put(&status_path, &seeded.admin.access_token)
        .json(&serde_json::json!({ "status": "completed" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    let buckets: Value = app
        .auth_get(&format!("/api/booking/{}", seeded.guest.id), &seeded.guest.access_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(buckets["completed"].as_array().unwrap().len(), 1);
    assert!(buckets["upcoming"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn organiser_cancel_notifies_guest_with_reason() {
    let app = TestApp::spawn().await;
    let seeded = app.seed_marketplace().await;

    let resp = app
        .book(&seeded.guest.access_token, &seeded.retreat_id, 21, 1)
        .await;
    let booking: Value = resp.json().await.unwrap();
    let booking_id = booking["id"].as_str().unwrap();

    let resp = app
        .auth_put(&format!("/api/booking/{}/cancel", booking_id), &seeded.organiser.access_token)
        .json(&serde_json::json!({ "reason": "Venue flooded, refund requested" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let cancelled: Value = resp.json().await.unwrap();
    assert_eq!(cancelled["status"], "cancelled");

    let buckets: Value = app
        .auth_get(&format!("/api/booking/{}", seeded.guest.id), &seeded.guest.access_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(buckets["canceled"][0]["id"], booking_id);

    let notifications: Vec<Value> = app
        .auth_get("/api/user/notification", &seeded.guest.access_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let cancel_notice = notifications
        .iter()
        .find(|n| n["title"] == "Booking cancelled")
        .unwrap();
    let message = cancel_notice["message"].as_str().unwrap();
    assert!(message.contains("refund requested"));
    assert!(message.contains(seeded.retreat_title.as_str()));
}

#[tokio::test]
async fn categorized_requires_an_organization_profile() {
    let app = TestApp::spawn().await;
    let seeded = app.seed_marketplace().await;

    // A plain user asking about themselves
    let resp = app
        .auth_get(
            &format!("/api/booking/organizer/{}/categorized", seeded.guest.id),
            &seeded.guest.access_token,
        )
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 404);

    let resp = app
        .auth_get(
            &format!("/api/booking/organizer/{}/categorized", ObjectId::new().to_hex()),
            &seeded.admin.access_token,
        )
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 404);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["success"], false);
}
