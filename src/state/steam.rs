//! Linked Steam identities: listing, default selection, unlinking, and the
//! two halves of the account-link handshake split by the full-page redirect
//! to the provider.

use leptos::*;

use crate::api::{ApiClient, ApiError, SteamIdRecord};
use crate::openid::{
    merge_params, LinkContinuation, OpenIdParams, SteamVerifyRequest, SteamVerifyResponse,
};

#[derive(Debug, Clone, Default)]
pub struct SteamState {
    pub steam_ids: Vec<SteamIdRecord>,
    pub loading: bool,
    pub message: Option<String>,
}

impl SteamState {
    pub fn has_linked_ids(&self) -> bool {
        !self.steam_ids.is_empty()
    }

    pub fn default_id(&self) -> Option<&str> {
        self.steam_ids
            .iter()
            .find(|record| record.is_default)
            .map(|record| record.steamid64.as_str())
    }
}

pub fn use_steam() -> (ReadSignal<SteamState>, WriteSignal<SteamState>) {
    match use_context::<(ReadSignal<SteamState>, WriteSignal<SteamState>)>() {
        Some(ctx) => ctx,
        None => {
            let ctx = create_signal(SteamState::default());
            provide_context(ctx);
            ctx
        }
    }
}

pub async fn load_steam_ids(
    api: &ApiClient,
    set_state: WriteSignal<SteamState>,
) -> Result<(), ApiError> {
    set_state.update(|state| state.loading = true);
    match api.get_user_steam_ids().await {
        Ok(response) => {
            set_state.update(|state| {
                state.steam_ids = response.steam_ids;
                state.loading = false;
            });
            Ok(())
        }
        Err(error) => {
            set_state.update(|state| {
                state.loading = false;
                state.message = Some(error.message.clone());
            });
            Err(error)
        }
    }
}

/// Marks one identity as default. The backend enforces the single-default
/// rule; the local list mirrors it without a re-fetch.
pub async fn set_default_steam_id(
    api: &ApiClient,
    set_state: WriteSignal<SteamState>,
    steamid64: &str,
) -> Result<(), ApiError> {
    let response = api.set_default_steam_id(steamid64).await?;
    let target = steamid64.to_string();
    set_state.update(|state| {
        for record in state.steam_ids.iter_mut() {
            record.is_default = record.steamid64 == target;
        }
        state.message = response.message;
    });
    Ok(())
}

pub async fn delete_steam_id(
    api: &ApiClient,
    set_state: WriteSignal<SteamState>,
    steamid64: &str,
) -> Result<(), ApiError> {
    let response = api.delete_steam_id(steamid64).await?;
    let target = steamid64.to_string();
    set_state.update(|state| {
        state.steam_ids.retain(|record| record.steamid64 != target);
        state.message = response.message;
    });
    Ok(())
}

/// First half of the link flow: persist the continuation, then leave the page
/// for the provider. Everything after this line runs in a fresh page load.
#[cfg(target_arch = "wasm32")]
pub async fn begin_link(api: &ApiClient, return_path: &str) -> Result<(), ApiError> {
    use crate::api::ApiErrorKind;

    let window = crate::utils::storage::window()
        .map_err(|e| ApiError::new(ApiErrorKind::Unknown, e))?;
    let origin = window
        .location()
        .origin()
        .map_err(|_| ApiError::new(ApiErrorKind::Unknown, "No window origin"))?;
    let redirect_uri = format!("{}/steam-callback", origin);

    let response = api.get_steam_login_url(&redirect_uri).await?;

    let token = crate::state::session::stored_access_token();
    let continuation = LinkContinuation::new(return_path, token);
    continuation
        .save()
        .map_err(|e| ApiError::new(ApiErrorKind::Unknown, e))?;

    window
        .location()
        .set_href(&response.steam_login_url)
        .map_err(|_| ApiError::new(ApiErrorKind::Unknown, "Navigation to provider failed"))?;
    Ok(())
}

/// Outcome of the callback half of the link flow, regardless of which of the
/// three backend statuses came back.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkOutcome {
    pub message: String,
    pub steamid64: Option<String>,
    pub return_path: String,
}

/// Second half: reconstruct the handshake from the live query plus the
/// persisted continuation, validate it locally, then let the backend verify
/// the signature with the provider.
pub async fn process_callback(
    live_params: Vec<(String, String)>,
    continuation: Option<LinkContinuation>,
) -> Result<LinkOutcome, ApiError> {
    let return_path = continuation
        .as_ref()
        .map(|c| c.return_path.clone())
        .unwrap_or_else(|| "/".to_string());
    let saved_params = continuation
        .as_ref()
        .map(|c| c.saved_params())
        .unwrap_or_default();

    let params = merge_params(live_params, saved_params);
    let payload = OpenIdParams::from_pairs(&params)?;

    let api = match continuation.and_then(|c| c.pending_token) {
        Some(token) => ApiClient::new().with_token(token),
        None => ApiClient::new(),
    };
    let response: SteamVerifyResponse = api
        .verify_steam_login(&SteamVerifyRequest {
            openid_params: payload,
        })
        .await?;

    Ok(LinkOutcome {
        message: response.status.message().to_string(),
        steamid64: Some(response.steamid64),
        return_path,
    })
}
