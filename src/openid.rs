//! Steam OpenID handshake parameters.
//!
//! The provider redirects back with a flat `openid.*` query record. That
//! record is forwarded to the backend verification endpoint exactly as
//! received, except for `openid.mode`, which is always the fixed
//! `check_authentication` value and never taken from the redirect query.

use crate::api::{ApiError, ApiErrorKind};
use crate::utils::query::parse_query;
use serde::{Deserialize, Serialize};

pub const OPENID_PREFIX: &str = "openid.";
pub const VERIFY_MODE: &str = "check_authentication";

/// Query keys whose presence marks a redirect-back from the provider.
pub const CALLBACK_MARKER_KEYS: [&str; 2] = ["openid.mode", "openid.claimed_id"];

/// Keeps every parameter namespaced under the provider prefix, in the order
/// the provider sent them.
pub fn extract_openid_params(query: &str) -> Vec<(String, String)> {
    parse_query(query)
        .into_iter()
        .filter(|(key, _)| key.starts_with(OPENID_PREFIX))
        .collect()
}

pub fn has_callback_markers(params: &[(String, String)]) -> bool {
    CALLBACK_MARKER_KEYS
        .iter()
        .all(|marker| params.iter().any(|(key, _)| key == marker))
}

/// Overlays the persisted parameter set onto the live query when the live
/// query lost the handshake (page reload, or the identity bootstrap rewrote
/// the URL before this flow could read it). Live values win when present.
pub fn merge_params(
    live: Vec<(String, String)>,
    saved: Vec<(String, String)>,
) -> Vec<(String, String)> {
    if live.iter().any(|(key, _)| key == "openid.mode") {
        return live;
    }
    let mut merged = saved;
    for (key, value) in live {
        if let Some(slot) = merged.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = value;
        } else {
            merged.push((key, value));
        }
    }
    merged
}

/// The exact record the backend verification endpoint expects.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OpenIdParams {
    #[serde(rename = "openid.ns")]
    pub ns: String,
    #[serde(rename = "openid.mode")]
    pub mode: String,
    #[serde(rename = "openid.op_endpoint")]
    pub op_endpoint: String,
    #[serde(rename = "openid.claimed_id")]
    pub claimed_id: String,
    #[serde(rename = "openid.identity")]
    pub identity: String,
    #[serde(rename = "openid.return_to")]
    pub return_to: String,
    #[serde(rename = "openid.response_nonce")]
    pub response_nonce: String,
    #[serde(rename = "openid.assoc_handle")]
    pub assoc_handle: String,
    #[serde(rename = "openid.signed")]
    pub signed: String,
    #[serde(rename = "openid.sig")]
    pub sig: String,
}

impl OpenIdParams {
    /// Builds the verification record. Fails before any network call when the
    /// signature or the signed-field list is absent.
    pub fn from_pairs(params: &[(String, String)]) -> Result<Self, ApiError> {
        let get = |key: &str| {
            params
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone())
        };

        let signed = get("openid.signed");
        let sig = get("openid.sig");
        if signed.as_deref().unwrap_or("").is_empty() || sig.as_deref().unwrap_or("").is_empty() {
            return Err(ApiError::new(
                ApiErrorKind::IncompleteParameters,
                "Incomplete OpenID parameters: missing signature",
            ));
        }

        Ok(Self {
            ns: get("openid.ns").unwrap_or_default(),
            mode: VERIFY_MODE.to_string(),
            op_endpoint: get("openid.op_endpoint").unwrap_or_default(),
            claimed_id: get("openid.claimed_id").unwrap_or_default(),
            identity: get("openid.identity").unwrap_or_default(),
            return_to: get("openid.return_to").unwrap_or_default(),
            response_nonce: get("openid.response_nonce").unwrap_or_default(),
            assoc_handle: get("openid.assoc_handle").unwrap_or_default(),
            signed: signed.unwrap_or_default(),
            sig: sig.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SteamVerifyRequest {
    pub openid_params: OpenIdParams,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LinkStatus {
    Created,
    Existing,
    Conflict,
}

impl LinkStatus {
    /// All three outcomes are informational, never errors.
    pub fn message(&self) -> &'static str {
        match self {
            LinkStatus::Created => "Steam account linked successfully",
            LinkStatus::Existing => "This Steam account was already linked to your profile",
            LinkStatus::Conflict => "This Steam account is already linked to another user",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SteamVerifyResponse {
    pub message: String,
    pub steamid64: String,
    #[serde(default)]
    pub is_default: Option<bool>,
    pub status: LinkStatus,
}

/// Continuation record written before navigating away to the provider.
/// The redirect discards the whole page runtime, so everything the callback
/// boot needs must live in browser storage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LinkContinuation {
    pub return_path: String,
    pub pending_token: Option<String>,
    pub callback_url: Option<String>,
    pub timestamp: i64,
}

pub const CONTINUATION_KEY: &str = "steam_link_continuation";
pub const CALLBACK_URL_KEY: &str = "steam_callback_url";

impl LinkContinuation {
    pub fn new(return_path: impl Into<String>, pending_token: Option<String>) -> Self {
        Self {
            return_path: return_path.into(),
            pending_token,
            callback_url: None,
            timestamp: chrono::Utc::now().timestamp(),
        }
    }

    pub fn to_json(&self) -> Result<String, String> {
        serde_json::to_string(self).map_err(|e| format!("Failed to serialize continuation: {}", e))
    }

    pub fn from_json(raw: &str) -> Option<Self> {
        serde_json::from_str(raw).ok()
    }

    pub fn save(&self) -> Result<(), String> {
        let storage = crate::utils::storage::session_storage()?;
        storage
            .set_item(CONTINUATION_KEY, &self.to_json()?)
            .map_err(|_| "Failed to persist continuation".to_string())
    }

    /// Reads and clears the pending continuation, if any.
    pub fn take() -> Option<Self> {
        let storage = crate::utils::storage::session_storage().ok()?;
        let raw = storage.get_item(CONTINUATION_KEY).ok().flatten()?;
        let _ = storage.remove_item(CONTINUATION_KEY);
        Self::from_json(&raw)
    }

    /// Parameter set recovered from the persisted callback URL.
    pub fn saved_params(&self) -> Vec<(String, String)> {
        self.callback_url
            .as_deref()
            .and_then(|url| url.split_once('?'))
            .map(|(_, query)| extract_openid_params(query))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_query() -> String {
        [
            ("openid.ns", "http://specs.openid.net/auth/2.0"),
            ("openid.mode", "id_res"),
            ("openid.op_endpoint", "https://steamcommunity.com/openid/login"),
            ("openid.claimed_id", "https://steamcommunity.com/openid/id/7656119"),
            ("openid.identity", "https://steamcommunity.com/openid/id/7656119"),
            ("openid.return_to", "http://localhost:4200/steam-callback"),
            ("openid.response_nonce", "2025-08-27T00:00:00Zabc"),
            ("openid.assoc_handle", "1234567890"),
            ("openid.signed", "signed,op_endpoint,claimed_id"),
            ("openid.sig", "c2lnbmF0dXJl"),
        ]
        .iter()
        .map(|(k, v)| format!("{}={}", k, crate::utils::query::encode_component(v)))
        .collect::<Vec<_>>()
        .join("&")
    }

    #[test]
    fn extract_keeps_only_prefixed_keys_in_order() {
        let query = format!("foo=bar&{}&trailing=1", full_query());
        let params = extract_openid_params(&query);
        assert_eq!(params.len(), 10);
        assert_eq!(params[0].0, "openid.ns");
        assert_eq!(params[9].0, "openid.sig");
        assert!(params.iter().all(|(k, _)| k.starts_with(OPENID_PREFIX)));
    }

    #[test]
    fn verify_mode_is_fixed_regardless_of_query_value() {
        let params = extract_openid_params(&full_query());
        let payload = OpenIdParams::from_pairs(&params).unwrap();
        assert_eq!(payload.mode, VERIFY_MODE);
    }

    #[test]
    fn missing_sig_fails_before_any_network_call() {
        let mut params = extract_openid_params(&full_query());
        params.retain(|(k, _)| k != "openid.sig");
        let err = OpenIdParams::from_pairs(&params).unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::IncompleteParameters);
    }

    #[test]
    fn missing_signed_fails_before_any_network_call() {
        let mut params = extract_openid_params(&full_query());
        params.retain(|(k, _)| k != "openid.signed");
        let err = OpenIdParams::from_pairs(&params).unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::IncompleteParameters);
    }

    #[test]
    fn link_status_messages_are_distinct_and_non_error() {
        let created = LinkStatus::Created.message();
        let existing = LinkStatus::Existing.message();
        let conflict = LinkStatus::Conflict.message();
        assert_ne!(created, existing);
        assert_ne!(existing, conflict);
        assert_ne!(created, conflict);
        for message in [created, existing, conflict] {
            assert!(!message.to_lowercase().contains("error"));
            assert!(!message.to_lowercase().contains("fail"));
        }
    }

    #[test]
    fn link_status_parses_backend_literals() {
        for (literal, expected) in [
            ("created", LinkStatus::Created),
            ("existing", LinkStatus::Existing),
            ("conflict", LinkStatus::Conflict),
        ] {
            let parsed: LinkStatus =
                serde_json::from_str(&format!("\"{}\"", literal)).unwrap();
            assert_eq!(parsed, expected);
        }
    }

    #[test]
    fn continuation_round_trips_callback_parameters() {
        let callback_url = format!("http://localhost:4200/steam-callback?{}", full_query());
        let mut continuation = LinkContinuation::new("/profile", Some("tok".into()));
        continuation.callback_url = Some(callback_url);

        let original = extract_openid_params(&full_query());
        let json = continuation.to_json().unwrap();
        let restored = LinkContinuation::from_json(&json).unwrap();
        let merged = merge_params(Vec::new(), restored.saved_params());
        assert_eq!(merged, original);
    }

    #[test]
    fn merge_prefers_live_params_when_handshake_is_intact() {
        let live = extract_openid_params(&full_query());
        let saved = vec![("openid.mode".to_string(), "stale".to_string())];
        assert_eq!(merge_params(live.clone(), saved), live);
    }

    #[test]
    fn serialized_payload_uses_provider_key_names() {
        let params = extract_openid_params(&full_query());
        let payload = OpenIdParams::from_pairs(&params).unwrap();
        let value = serde_json::to_value(&payload).unwrap();
        assert!(value.get("openid.ns").is_some());
        assert_eq!(
            value.get("openid.mode").and_then(|v| v.as_str()),
            Some(VERIFY_MODE)
        );
    }
}
