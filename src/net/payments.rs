//! Subscription payment endpoints.
//!
//! Checkout itself runs in the payment gateway's hosted widget; this module
//! only creates the order, hands the widget its parameters, and forwards the
//! widget's result to the backend for signature verification. A failure after
//! order creation is left for the backend to reconcile.

#[cfg(test)]
#[path = "payments_test.rs"]
mod payments_test;

use serde::Serialize;
use serde_json::Value;

use super::http::{ApiClient, path_segment};
use super::types::{
    CreateOrderRequest, PaymentKey, PaymentOrder, PaymentRecord, ProratedQuote, ProratedRequest, User,
    VerifyPaymentRequest, unwrap_list,
};
use crate::error::ApiError;

fn receipt_endpoint(payment_id: &str) -> String {
    format!("/payments/generate-receipt/{}", path_segment(payment_id))
}

/// Fetch the gateway's public key via `GET /payments/getkey`.
///
/// # Errors
///
/// Returns the mapped `ApiError` for transport failures and non-2xx statuses,
/// or `Decode` if the body does not match.
pub async fn get_key(client: &ApiClient) -> Result<PaymentKey, ApiError> {
    client.get_json("/payments/getkey").await
}

/// Create a gateway order via `POST /payments/create-order`.
///
/// # Errors
///
/// Returns the mapped `ApiError` for transport failures and non-2xx statuses,
/// or `Decode` if the body does not match.
pub async fn create_order(client: &ApiClient, req: &CreateOrderRequest) -> Result<PaymentOrder, ApiError> {
    let raw: Value = client.post_json("/payments/create-order", req).await?;
    decode_order(raw)
}

/// Forward the widget's success payload to `POST /payments/verify`.
///
/// # Errors
///
/// Returns the mapped `ApiError`; a 400 means the gateway signature did not verify.
pub async fn verify(client: &ApiClient, req: &VerifyPaymentRequest) -> Result<Value, ApiError> {
    client.post_json("/payments/verify", req).await
}

/// Ask the backend for an upgrade quote via `POST /payments/calculate-prorated`.
///
/// # Errors
///
/// Returns the mapped `ApiError` for transport failures and non-2xx statuses,
/// or `Decode` if the body does not match.
pub async fn calculate_prorated(client: &ApiClient, req: &ProratedRequest) -> Result<ProratedQuote, ApiError> {
    client.post_json("/payments/calculate-prorated", req).await
}

/// List past payments via `GET /payments/history`.
///
/// # Errors
///
/// Returns the mapped `ApiError` for transport failures and non-2xx statuses,
/// or `Decode` if the body does not match.
pub async fn history(client: &ApiClient) -> Result<Vec<PaymentRecord>, ApiError> {
    let raw: Value = client.get_json("/payments/history").await?;
    serde_json::from_value(unwrap_list(raw, "payments")).map_err(|e| ApiError::Decode(e.to_string()))
}

/// Download the PDF receipt for one payment.
///
/// # Errors
///
/// Returns the mapped `ApiError` for transport failures and non-2xx statuses.
pub async fn receipt(client: &ApiClient, payment_id: &str) -> Result<Vec<u8>, ApiError> {
    client.get_bytes(&receipt_endpoint(payment_id)).await
}

fn decode_order(raw: Value) -> Result<PaymentOrder, ApiError> {
    let order = match raw {
        Value::Object(mut map) if map.contains_key("order") => map.remove("order").unwrap_or(Value::Null),
        other => other,
    };
    serde_json::from_value(order).map_err(|e| ApiError::Decode(e.to_string()))
}

/// Parameters the hosted checkout widget is opened with.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CheckoutParams {
    pub key: String,
    pub amount: u64,
    pub currency: String,
    pub name: String,
    pub description: String,
    pub order_id: String,
    pub prefill: CheckoutPrefill,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CheckoutPrefill {
    pub name: String,
    pub email: String,
}

impl CheckoutParams {
    #[must_use]
    pub fn new(key: &PaymentKey, order: &PaymentOrder, user: &User, description: &str) -> Self {
        Self {
            key: key.key.clone(),
            amount: order.amount,
            currency: order.currency.clone(),
            name: "Hireveu".to_owned(),
            description: description.to_owned(),
            order_id: order.order_id.clone(),
            prefill: CheckoutPrefill { name: user.name.clone(), email: user.email.clone() },
        }
    }
}
