//! Multi-tenant organization admin endpoints under `/organizations/{id}`.
//!
//! Stats and analytics are aggregated server-side and returned as opaque JSON.

#[cfg(test)]
#[path = "organizations_test.rs"]
mod organizations_test;

use serde_json::Value;

use super::http::{ApiClient, path_segment};
use super::types::{InviteRequest, MemberUpdate, OrgInvite, OrgMember, unwrap_list};
use crate::error::ApiError;

/// `rest` is a literal sub-path; callers escape any ids inside it.
fn org_endpoint(org_id: &str, rest: &str) -> String {
    let org_id = path_segment(org_id);
    if rest.is_empty() {
        format!("/organizations/{org_id}")
    } else {
        format!("/organizations/{org_id}/{}", rest.trim_start_matches('/'))
    }
}

fn decode_list<T: serde::de::DeserializeOwned>(raw: Value, key: &str) -> Result<Vec<T>, ApiError> {
    serde_json::from_value(unwrap_list(raw, key)).map_err(|e| ApiError::Decode(e.to_string()))
}

/// List members of an organization.
///
/// # Errors
///
/// Returns the mapped `ApiError` for transport failures and non-2xx statuses,
/// or `Decode` if the body does not match.
pub async fn members(client: &ApiClient, org_id: &str) -> Result<Vec<OrgMember>, ApiError> {
    let raw: Value = client.get_json(&org_endpoint(org_id, "members")).await?;
    decode_list(raw, "members")
}

/// Change a member's role, department, batch, or status.
///
/// # Errors
///
/// Returns the mapped `ApiError` for transport failures and non-2xx statuses.
pub async fn update_member(
    client: &ApiClient,
    org_id: &str,
    member_id: &str,
    update: &MemberUpdate,
) -> Result<Value, ApiError> {
    client
        .put_json(&org_endpoint(org_id, &format!("members/{}", path_segment(member_id))), update)
        .await
}

/// Remove a member from the organization.
///
/// # Errors
///
/// Returns the mapped `ApiError` for transport failures and non-2xx statuses.
pub async fn remove_member(client: &ApiClient, org_id: &str, member_id: &str) -> Result<(), ApiError> {
    client
        .delete(&org_endpoint(org_id, &format!("members/{}", path_segment(member_id))))
        .await
}

/// Staff view (admins and viewers) of the organization.
///
/// # Errors
///
/// Returns the mapped `ApiError` for transport failures and non-2xx statuses,
/// or `Decode` if the body does not match.
pub async fn team(client: &ApiClient, org_id: &str) -> Result<Vec<OrgMember>, ApiError> {
    let raw: Value = client.get_json(&org_endpoint(org_id, "team")).await?;
    decode_list(raw, "team")
}

/// Aggregate member statistics.
///
/// # Errors
///
/// Returns the mapped `ApiError` for transport failures and non-2xx statuses.
pub async fn stats(client: &ApiClient, org_id: &str) -> Result<Value, ApiError> {
    client.get_json(&org_endpoint(org_id, "stats")).await
}

/// List outstanding invites.
///
/// # Errors
///
/// Returns the mapped `ApiError` for transport failures and non-2xx statuses,
/// or `Decode` if the body does not match.
pub async fn invites(client: &ApiClient, org_id: &str) -> Result<Vec<OrgInvite>, ApiError> {
    let raw: Value = client.get_json(&org_endpoint(org_id, "invites")).await?;
    decode_list(raw, "invites")
}

/// Invite a user by email; the backend may wrap the result in `{ invite }`.
///
/// # Errors
///
/// Returns the mapped `ApiError` for transport failures and non-2xx statuses,
/// or `Decode` if the body does not match.
pub async fn invite_member(client: &ApiClient, org_id: &str, invite: &InviteRequest) -> Result<OrgInvite, ApiError> {
    let raw: Value = client.post_json(&org_endpoint(org_id, "invites"), invite).await?;
    let invite = match raw {
        Value::Object(mut map) if map.contains_key("invite") => map.remove("invite").unwrap_or(Value::Null),
        other => other,
    };
    serde_json::from_value(invite).map_err(|e| ApiError::Decode(e.to_string()))
}

/// Cancel a pending invite.
///
/// # Errors
///
/// Returns the mapped `ApiError` for transport failures and non-2xx statuses.
pub async fn revoke_invite(client: &ApiClient, org_id: &str, invite_id: &str) -> Result<(), ApiError> {
    client
        .delete(&org_endpoint(org_id, &format!("invites/{}", path_segment(invite_id))))
        .await
}

/// Organization analytics as opaque JSON.
///
/// # Errors
///
/// Returns the mapped `ApiError` for transport failures and non-2xx statuses.
pub async fn analytics(client: &ApiClient, org_id: &str) -> Result<Value, ApiError> {
    client.get_json(&org_endpoint(org_id, "analytics")).await
}
