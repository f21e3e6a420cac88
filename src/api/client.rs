use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::api::error::ApiError;
use crate::api::types::*;
use crate::config;
use crate::openid::{SteamVerifyRequest, SteamVerifyResponse};
use crate::state::session;

/// Refresh the bearer token when it is this close to expiry.
pub const REFRESH_THRESHOLD_SECS: i64 = 30;

/// Paths that bypass the token pipeline entirely: static assets and the
/// identity provider's own endpoints.
pub fn is_excluded_path(url: &str) -> bool {
    url.contains("/assets/") || url.contains("/realms/") || url.contains("/openid-connect/")
}

#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Option<String>,
    token_override: Option<String>,
}

impl Default for ApiClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ApiClient {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            base_url: None,
            token_override: None,
        }
    }

    pub fn new_with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: Some(base_url.into()),
            token_override: None,
        }
    }

    /// Fixed bearer token, skipping the session store. Used by tests and by
    /// the callback page, which runs before the identity bootstrap.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token_override = Some(token.into());
        self
    }

    async fn resolved_base_url(&self) -> String {
        if let Some(base) = &self.base_url {
            base.clone()
        } else {
            config::await_api_base_url().await
        }
    }

    async fn bearer_token(&self) -> Option<String> {
        if let Some(token) = &self.token_override {
            return Some(token.clone());
        }
        session::ensure_fresh_token(REFRESH_THRESHOLD_SECS).await
    }

    async fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.resolved_base_url().await, path);
        let mut builder = self.client.request(method, &url);
        if !is_excluded_path(&url) {
            if let Some(token) = self.bearer_token().await {
                builder = builder.bearer_auth(token);
            }
        }
        builder
    }

    async fn handle_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let status = response.status();
        if status.is_success() {
            response
                .json()
                .await
                .map_err(|e| ApiError::unknown(format!("Failed to parse response: {}", e)))
        } else {
            let body = response.json::<Value>().await.ok();
            let error = ApiError::from_response(status.as_u16(), body);
            Self::recover_auth(&error);
            Err(error)
        }
    }

    /// A 401 recovers by forcing a fresh login; no toast accompanies it.
    fn recover_auth(error: &ApiError) {
        if error.should_force_login() {
            session::force_login_redirect();
        }
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ApiError> {
        let response = builder.send().await.map_err(ApiError::network)?;
        Self::handle_json(response).await
    }

    // --- Steam linking -----------------------------------------------------

    pub async fn get_steam_login_url(
        &self,
        redirect_uri: &str,
    ) -> Result<SteamLoginUrlResponse, ApiError> {
        let builder = self
            .request(Method::GET, "/auth/steam_url")
            .await
            .query(&[("redirect_uri", redirect_uri)]);
        self.send(builder).await
    }

    pub async fn verify_steam_login(
        &self,
        payload: &SteamVerifyRequest,
    ) -> Result<SteamVerifyResponse, ApiError> {
        let builder = self
            .request(Method::POST, "/auth/steam_verify")
            .await
            .json(payload);
        self.send(builder).await
    }

    pub async fn get_user_steam_ids(&self) -> Result<UserSteamIdsResponse, ApiError> {
        let builder = self.request(Method::GET, "/user/steam_ids").await;
        self.send(builder).await
    }

    pub async fn set_default_steam_id(
        &self,
        steamid64: &str,
    ) -> Result<ApiMessageResponse, ApiError> {
        let path = format!("/user/steamid/{}/set_default", steamid64);
        let builder = self.request(Method::GET, &path).await;
        self.send(builder).await
    }

    pub async fn delete_steam_id(&self, steamid64: &str) -> Result<ApiMessageResponse, ApiError> {
        let path = format!("/user/steam_ids/{}", steamid64);
        let builder = self.request(Method::DELETE, &path).await;
        self.send(builder).await
    }

    // --- Slots -------------------------------------------------------------

    pub async fn get_user_slots(&self, server_id: &str) -> Result<SlotsResponse, ApiError> {
        let path = format!("/servers/{}/user_slots", server_id);
        let builder = self.request(Method::GET, &path).await;
        self.send(builder)
            .await
            .map_err(|e: ApiError| e.with_no_linked_identity_check())
    }

    pub async fn change_slot(
        &self,
        server_id: &str,
        to_slot_id: &str,
    ) -> Result<ChangeSlotResponse, ApiError> {
        let path = format!("/servers/{}/change_slot", server_id);
        let builder = self.request(Method::POST, &path).await.json(&ChangeSlotRequest {
            to_slot_id: to_slot_id.to_string(),
        });
        self.send(builder).await
    }

    // --- Economy -----------------------------------------------------------

    pub async fn get_server_balance(
        &self,
        server_id: &str,
    ) -> Result<ServerBalanceResponse, ApiError> {
        let path = format!("/servers/{}/balance", server_id);
        let builder = self.request(Method::GET, &path).await;
        self.send(builder).await
    }

    // --- Profile -----------------------------------------------------------

    pub async fn get_user_profile(&self) -> Result<UserProfile, ApiError> {
        let builder = self.request(Method::GET, "/user/profile").await;
        self.send(builder).await
    }

    pub async fn update_user_profile(
        &self,
        profile: &UserProfile,
    ) -> Result<UserProfile, ApiError> {
        let builder = self.request(Method::PUT, "/user/profile").await.json(profile);
        self.send(builder).await
    }

    pub async fn upload_profile_image(
        &self,
        filename: &str,
        mime: &str,
        bytes: Vec<u8>,
    ) -> Result<ApiMessageResponse, ApiError> {
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(filename.to_string())
            .mime_str(mime)
            .map_err(|e| ApiError::unknown(format!("Invalid image type: {}", e)))?;
        let form = reqwest::multipart::Form::new().part("image", part);
        let builder = self
            .request(Method::POST, "/upload/user-profile")
            .await
            .multipart(form);
        self.send(builder).await
    }

    pub async fn delete_profile_image(&self) -> Result<ApiMessageResponse, ApiError> {
        let builder = self
            .request(Method::DELETE, "/images/user-profile/delete")
            .await;
        self.send(builder).await
    }
}


#[cfg(all(test, not(target_arch = "wasm32")))]
mod host_tests {
    use super::*;
    use crate::api::error::ApiErrorKind;
    use httpmock::prelude::*;
    use serde_json::json;

    fn client_for(server: &MockServer) -> ApiClient {
        ApiClient::new_with_base_url(server.url("/api")).with_token("test-token")
    }

    #[tokio::test]
    async fn steam_login_url_passes_redirect_uri() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/api/auth/steam_url")
                .query_param("redirect_uri", "http://localhost:4200/steam-callback");
            then.status(200)
                .json_body(json!({"steam_login_url": "https://steamcommunity.com/openid/login?x=1"}));
        });

        let response = client_for(&server)
            .get_steam_login_url("http://localhost:4200/steam-callback")
            .await
            .unwrap();
        assert!(response.steam_login_url.starts_with("https://steamcommunity.com"));
        mock.assert();
    }

    #[tokio::test]
    async fn requests_carry_the_bearer_token() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/api/user/steam_ids")
                .header("authorization", "Bearer test-token");
            then.status(200).json_body(json!({"steam_ids": []}));
        });

        let response = client_for(&server).get_user_steam_ids().await.unwrap();
        assert!(response.steam_ids.is_empty());
        mock.assert();
    }

    #[tokio::test]
    async fn unauthorized_maps_to_auth_required() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/api/user/steam_ids");
            then.status(401).json_body(json!({"error": "expired"}));
        });

        let error = client_for(&server).get_user_steam_ids().await.unwrap_err();
        assert_eq!(error.kind, ApiErrorKind::AuthRequired);
        assert!(!error.should_toast());
    }

    #[tokio::test]
    async fn slots_error_with_marker_maps_to_no_linked_identity() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/api/servers/srv-1/user_slots");
            then.status(400)
                .json_body(json!({"error": "SteamID not set for this user"}));
        });

        let error = client_for(&server).get_user_slots("srv-1").await.unwrap_err();
        assert_eq!(error.kind, ApiErrorKind::NoLinkedIdentity);
    }

    #[tokio::test]
    async fn change_slot_cooldown_carries_remaining_seconds() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path("/api/servers/srv-1/change_slot");
            then.status(429).json_body(json!({
                "message": "Slot switch on cooldown",
                "remaining_time_seconds": 300
            }));
        });

        let error = client_for(&server)
            .change_slot("srv-1", "slot-2")
            .await
            .unwrap_err();
        assert_eq!(error.kind, ApiErrorKind::Cooldown);
        assert_eq!(error.cooldown_seconds(), Some(300));
    }

    #[tokio::test]
    async fn profile_update_round_trips_the_saved_profile() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(PUT)
                .path("/api/user/profile")
                .json_body(json!({
                    "first_name": "Rex",
                    "last_name": "Raptor",
                    "email": null,
                    "avatar_url": null
                }));
            then.status(200).json_body(json!({
                "first_name": "Rex",
                "last_name": "Raptor"
            }));
        });

        let profile = UserProfile {
            first_name: Some("Rex".into()),
            last_name: Some("Raptor".into()),
            ..Default::default()
        };
        let saved = client_for(&server)
            .update_user_profile(&profile)
            .await
            .unwrap();
        assert_eq!(saved.first_name.as_deref(), Some("Rex"));
        mock.assert();
    }

    #[tokio::test]
    async fn profile_image_upload_posts_multipart() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST).path("/api/upload/user-profile");
            then.status(200).json_body(json!({"message": "Image uploaded"}));
        });

        let response = client_for(&server)
            .upload_profile_image("avatar.png", "image/png", vec![0x89, 0x50, 0x4e, 0x47])
            .await
            .unwrap();
        assert_eq!(response.message.as_deref(), Some("Image uploaded"));
        mock.assert();
    }

    #[tokio::test]
    async fn change_slot_conflict_keeps_backend_message() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path("/api/servers/srv-1/change_slot");
            then.status(409).json_body(json!({"message": "Already on this slot"}));
        });

        let error = client_for(&server)
            .change_slot("srv-1", "slot-2")
            .await
            .unwrap_err();
        assert_eq!(error.kind, ApiErrorKind::Conflict);
        assert_eq!(error.message, "Already on this slot");
    }
}
