use super::*;
use crate::net::test_support::spawn_stub;
use crate::net::types::BillingCycle;
use axum::Json;
use axum::extract::Path;
use axum::routing::{get, post};
use serde_json::json;

#[test]
fn receipt_endpoint_formats_expected_path() {
    assert_eq!(receipt_endpoint("pay_42"), "/payments/generate-receipt/pay_42");
    assert_eq!(receipt_endpoint("pay#42"), "/payments/generate-receipt/pay%2342");
}

#[test]
fn decode_order_unwraps_envelope() {
    let order = decode_order(json!({ "order": { "id": "order_1", "amount": 9900, "currency": "INR" } })).unwrap();
    assert_eq!(order.order_id, "order_1");
    assert_eq!(order.amount, 9900);
}

#[test]
fn decode_order_rejects_missing_amount() {
    assert!(matches!(decode_order(json!({ "id": "order_1" })), Err(ApiError::Decode(_))));
}

#[test]
fn checkout_params_prefill_from_user() {
    let user: User = serde_json::from_value(json!({ "id": "u1", "name": "Asha", "email": "asha@example.com" })).unwrap();
    let key = PaymentKey { key: "rzp_test_123".into() };
    let order = PaymentOrder { order_id: "order_1".into(), amount: 49900, currency: "INR".into() };
    let params = CheckoutParams::new(&key, &order, &user, "Pro plan (monthly)");
    assert_eq!(params.key, "rzp_test_123");
    assert_eq!(params.order_id, "order_1");
    assert_eq!(params.prefill.email, "asha@example.com");
    assert_eq!(params.description, "Pro plan (monthly)");
}

#[tokio::test]
async fn create_order_round_trip_through_stub() {
    let client = spawn_stub(axum::Router::new().route(
        "/api/payments/create-order",
        post(|Json(body): Json<Value>| async move {
            assert_eq!(body["plan"], "pro");
            assert_eq!(body["billingCycle"], "monthly");
            Json(json!({ "order": { "id": "order_7", "amount": 19900 } }))
        }),
    ))
    .await;
    let order = create_order(
        &client,
        &CreateOrderRequest { plan: "pro".into(), billing_cycle: BillingCycle::Monthly, amount: None },
    )
    .await
    .unwrap();
    assert_eq!(order.order_id, "order_7");
    assert_eq!(order.currency, "INR");
}

#[tokio::test]
async fn history_accepts_wrapped_list() {
    let client = spawn_stub(axum::Router::new().route(
        "/api/payments/history",
        get(|| async {
            Json(json!({ "payments": [
                { "_id": "p1", "plan": "pro", "amount": 199.0, "status": "paid" },
                { "_id": "p2", "amount": 99.0 }
            ] }))
        }),
    ))
    .await;
    let records = history(&client).await.unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].status.as_deref(), Some("paid"));
    assert!(records[1].plan.is_none());
}

#[tokio::test]
async fn receipt_downloads_bytes_for_payment() {
    let client = spawn_stub(axum::Router::new().route(
        "/api/payments/generate-receipt/{id}",
        get(|Path(id): Path<String>| async move { format!("%PDF-{id}").into_bytes() }),
    ))
    .await;
    assert_eq!(receipt(&client, "p9").await.unwrap(), b"%PDF-p9");
}
