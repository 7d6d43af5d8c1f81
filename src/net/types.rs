//! Wire DTOs for the client/backend boundary.
//!
//! DESIGN
//! ======
//! The backend speaks camelCase JSON with Mongo-style `_id` keys. Fields the
//! client only displays stay loosely typed (`serde_json::Value`) so new
//! backend fields never break decoding.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

// =============================================================================
// USER
// =============================================================================

/// The authenticated user as returned by `GET /user` and the login endpoints.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub username: Option<String>,
    pub email: String,
    /// Platform-level role (`user`, `admin`, ...).
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    /// Membership in a tenant organization, if any.
    #[serde(default)]
    pub organization: Option<OrgMembership>,
    /// Subscription coin balance.
    #[serde(default)]
    pub coins: Option<i64>,
}

/// A user's role/department/status inside one organization.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrgMembership {
    pub org_id: String,
    pub role: OrgRole,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub batch: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Organization role. Unknown roles are preserved verbatim.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum OrgRole {
    SuperAdmin,
    Admin,
    Member,
    Viewer,
    Other(String),
}

impl OrgRole {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::SuperAdmin => "super_admin",
            Self::Admin => "admin",
            Self::Member => "member",
            Self::Viewer => "viewer",
            Self::Other(raw) => raw,
        }
    }

    /// Whether this role may invite, edit, or remove members.
    #[must_use]
    pub fn can_manage_members(&self) -> bool {
        matches!(self, Self::SuperAdmin | Self::Admin)
    }
}

impl From<&str> for OrgRole {
    fn from(raw: &str) -> Self {
        match raw {
            "super_admin" => Self::SuperAdmin,
            "admin" => Self::Admin,
            "member" => Self::Member,
            "viewer" => Self::Viewer,
            other => Self::Other(other.to_owned()),
        }
    }
}

impl fmt::Display for OrgRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for OrgRole {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for OrgRole {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::from(raw.as_str()))
    }
}

// =============================================================================
// AUTH PAYLOADS
// =============================================================================

#[derive(Clone, Debug, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct GoogleLoginRequest {
    /// Credential token from the identity provider's widget, forwarded verbatim.
    pub credential: String,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_code: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub password: String,
}

/// Envelope returned by login, Google login, and register.
#[derive(Clone, Debug, Deserialize)]
pub struct AuthResponse {
    pub user: User,
    #[serde(default)]
    pub message: Option<String>,
}

/// Generic `{ message }` acknowledgement.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: Option<String>,
}

/// `GET /user` returns either `{ "user": {...} }` or the bare record.
#[derive(Deserialize)]
#[serde(untagged)]
pub(crate) enum CurrentUserResponse {
    Wrapped { user: User },
    Bare(User),
}

impl CurrentUserResponse {
    pub(crate) fn into_user(self) -> User {
        match self {
            Self::Wrapped { user } | Self::Bare(user) => user,
        }
    }
}

// =============================================================================
// PAYMENTS
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingCycle {
    Monthly,
    Yearly,
}

#[derive(Clone, Debug, Deserialize)]
pub struct PaymentKey {
    pub key: String,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub plan: String,
    pub billing_cycle: BillingCycle,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<u64>,
}

/// Order created server-side; amounts are in the smallest currency unit.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentOrder {
    #[serde(alias = "id")]
    pub order_id: String,
    pub amount: u64,
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_currency() -> String {
    "INR".to_owned()
}

/// Fields the hosted checkout widget returns to its success handler.
#[derive(Clone, Debug, Serialize)]
pub struct VerifyPaymentRequest {
    pub razorpay_order_id: String,
    pub razorpay_payment_id: String,
    pub razorpay_signature: String,
    pub plan: String,
    #[serde(rename = "billingCycle")]
    pub billing_cycle: BillingCycle,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProratedRequest {
    pub new_plan: String,
    pub billing_cycle: BillingCycle,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProratedQuote {
    pub prorated_amount: f64,
    #[serde(default)]
    pub credit: Option<f64>,
    #[serde(default)]
    pub days_remaining: Option<u32>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRecord {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub plan: Option<String>,
    pub amount: f64,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

// =============================================================================
// ORGANIZATIONS
// =============================================================================

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrgMember {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub email: String,
    pub role: OrgRole,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub batch: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct InviteRequest {
    pub email: String,
    pub role: OrgRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct MemberUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<OrgRole>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrgInvite {
    #[serde(alias = "_id")]
    pub id: String,
    pub email: String,
    pub role: OrgRole,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub expires_at: Option<String>,
}

// =============================================================================
// SHARED
// =============================================================================

/// List endpoints answer with either a bare array or `{ "<key>": [...] }`.
pub(crate) fn unwrap_list(value: Value, key: &str) -> Value {
    match value {
        Value::Object(mut map) if map.get(key).is_some_and(Value::is_array) => map.remove(key).unwrap_or(Value::Null),
        other => other,
    }
}
