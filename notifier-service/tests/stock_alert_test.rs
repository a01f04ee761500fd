mod common;

use common::TestApp;
use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

fn alert(level: &str) -> Value {
    json!({
        "product_id": "prod-7",
        "product_name": "Rice 5kg",
        "quantity": 3,
        "level": level,
        "min_stock_level": 10,
        "user_id": "owner-1",
    })
}

async fn mount_business(app: &TestApp) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/profiles"))
        .and(query_param("select", "id"))
        .and(query_param("or", r#"(id.eq."owner-1",owner_id.eq."owner-1")"#))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "owner-1" },
            { "id": "staff-1" },
            { "id": "staff-2" },
        ])))
        .expect(1)
        .mount(&app.store)
        .await;
}

async fn mount_vendor(app: &TestApp, id: &str) {
    Mock::given(method("POST"))
        .and(path("/notifications"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": id })))
        .expect(1)
        .mount(&app.vendor)
        .await;
}

#[tokio::test]
async fn out_of_stock_alert_is_urgent() {
    let app = TestApp::spawn().await;
    mount_business(&app).await;
    mount_vendor(&app, "s1").await;

    let response = app.post("trigger_stock_alert", &alert("out")).await;

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body, json!({ "success": true, "notification_id": "s1" }));

    let payloads = app.vendor_payloads().await;
    let payload = &payloads[0];
    assert_eq!(
        payload["include_external_user_ids"],
        json!(["owner-1", "staff-1", "staff-2"])
    );
    assert_eq!(payload["priority"], 10);
    assert_eq!(payload["headings"]["en"], "⚠️ OUT OF STOCK: Rice 5kg");
    assert_eq!(
        payload["contents"]["en"],
        "Rice 5kg is completely out of stock. Restock immediately!"
    );
    assert_eq!(
        payload["data"],
        json!({
            "type": "stock_alert",
            "product_id": "prod-7",
            "product_name": "Rice 5kg",
            "quantity": 3,
            "level": "out",
            "min_stock_level": 10,
        })
    );
}

#[tokio::test]
async fn low_stock_alert_reports_threshold() {
    let app = TestApp::spawn().await;
    mount_business(&app).await;
    mount_vendor(&app, "s2").await;

    let response = app.post("trigger_stock_alert", &alert("low")).await;

    assert_eq!(response.status().as_u16(), 200);

    let payloads = app.vendor_payloads().await;
    let payload = &payloads[0];
    assert_eq!(payload["priority"], 5);
    assert_eq!(payload["headings"]["en"], "📦 Low Stock: Rice 5kg");
    assert_eq!(
        payload["contents"]["en"],
        "Rice 5kg is running low (3 left, threshold: 10)"
    );
}

#[tokio::test]
async fn stock_alert_never_touches_announcements() {
    let app = TestApp::spawn().await;
    mount_business(&app).await;
    mount_vendor(&app, "s3").await;
    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&app.store)
        .await;

    let response = app.post("trigger_stock_alert", &alert("low")).await;

    assert_eq!(response.status().as_u16(), 200);
}

#[tokio::test]
async fn recipient_query_failure_never_reaches_vendor() {
    let app = TestApp::spawn().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/profiles"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "message": "JWT expired" })))
        .mount(&app.store)
        .await;
    Mock::given(method("POST"))
        .and(path("/notifications"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "never" })))
        .expect(0)
        .mount(&app.vendor)
        .await;

    let response = app.post("trigger_stock_alert", &alert("out")).await;

    assert_eq!(response.status().as_u16(), 500);
    let body: Value = response.json().await.expect("Failed to parse response");
    let error = body["error"].as_str().expect("error message");
    assert!(error.starts_with("Recipient query failed"));
    assert!(error.contains("JWT expired"));
}

#[tokio::test]
async fn caller_idempotency_key_is_forwarded() {
    let app = TestApp::spawn().await;
    mount_business(&app).await;
    mount_vendor(&app, "s4").await;

    let key = "6f1c1b7e-4b8e-4f4e-9a57-0c1f2d3e4a5b";
    let response = app
        .client
        .post(format!("{}/trigger_stock_alert", app.address))
        .header("Idempotency-Key", key)
        .json(&alert("low"))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 200);
    let payloads = app.vendor_payloads().await;
    assert_eq!(payloads[0]["idempotency_key"], key);
}
