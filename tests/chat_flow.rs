mod common;

use anyhow::Result;
use axum::http::StatusCode;
use common::{acquire_db_lock, json_body, TestApp};
use diesel::prelude::*;
use estate_agent::models::Appointment;
use estate_agent::schema::{appointments, customer_inquiries};
use serde_json::{json, Value};

#[tokio::test]
async fn phone_and_date_book_a_visit() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let Some(app) = TestApp::new().await? else {
        return Ok(());
    };

    app.insert_property("Sea Breeze Apartments", "Bandra West, Mumbai", "₹ 5 Cr", 3, true)
        .await?;

    let history = json!({
        "messages": [
            { "role": "user", "content": "Tell me about Sea Breeze Apartments" },
            { "role": "assistant", "content": "It is a 3 BHK in Bandra West." },
            { "role": "user", "content": "9876543210 tomorrow" }
        ]
    });
    let response = app.post_json("/api/chat", &history, None).await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = json_body(response).await?;
    assert_eq!(body["data"]["intent"], "booking");
    assert_eq!(body["data"]["scheduled"], true);
    assert!(body["data"]["message"]
        .as_str()
        .unwrap()
        .contains("Sea Breeze Apartments"));

    let stored: Vec<Appointment> = app
        .with_conn(|conn| Ok(appointments::table.load::<Appointment>(conn)?))
        .await?;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].customer_phone, "9876543210");
    assert_eq!(stored[0].appointment_date.as_deref(), Some("tomorrow"));
    assert_eq!(
        stored[0].property_location.as_deref(),
        Some("Bandra West, Mumbai")
    );
    assert_eq!(stored[0].status, "pending");

    app.cleanup().await?;
    Ok(())
}

#[tokio::test]
async fn search_replies_do_not_write() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let Some(app) = TestApp::new().await? else {
        return Ok(());
    };

    app.insert_property("Urban Heights", "Andheri East, Mumbai", "₹ 2.2 Cr", 2, false)
        .await?;

    let response = app
        .post_json(
            "/api/chat",
            &json!({ "messages": [{ "role": "user", "text": "3 bhk in bandra" }] }),
            None,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = json_body(response).await?;
    assert_eq!(body["data"]["intent"], "search");
    assert_eq!(body["data"]["scheduled"], false);

    let count: i64 = app
        .with_conn(|conn| Ok(appointments::table.count().get_result(conn)?))
        .await?;
    assert_eq!(count, 0);

    app.cleanup().await?;
    Ok(())
}

#[tokio::test]
async fn missing_messages_is_a_bad_request() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let Some(app) = TestApp::new().await? else {
        return Ok(());
    };

    let response = app.post_json("/api/chat", &json!({}), None).await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = json_body(response).await?;
    assert_eq!(body["error"], "Messages array required");

    app.cleanup().await?;
    Ok(())
}

#[tokio::test]
async fn schedule_viewing_records_inquiry() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let Some(app) = TestApp::new().await? else {
        return Ok(());
    };

    let response = app
        .post_json(
            "/api/chat",
            &json!({
                "action": "schedule_viewing",
                "viewingData": {
                    "name": "Asha",
                    "email": "asha@example.com",
                    "phone": "9876543210",
                    "date": "2024-07-01",
                    "time": "11:00 AM",
                    "location": "Lonavala",
                    "propertyTitle": "Green Valley Villa"
                }
            }),
            None,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = json_body(response).await?;
    assert_eq!(body["data"]["scheduled"], true);

    let count: i64 = app
        .with_conn(|conn| Ok(customer_inquiries::table.count().get_result(conn)?))
        .await?;
    assert_eq!(count, 1);

    app.cleanup().await?;
    Ok(())
}
