//! Session/token store. Exclusive owner of the identity-provider session:
//! every other module reads it through the context signal, none mutate it
//! directly. The token is mirrored into localStorage because the Steam link
//! flow leaves and re-enters the app via full-page navigation.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::Utc;
use leptos::*;
use serde::Deserialize;
use std::collections::HashMap;

use crate::config::{self, ResolvedConfig};
use crate::utils::{query, storage};

pub const ACCESS_TOKEN_KEY: &str = "access_token";
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";

pub type SessionContext = (ReadSignal<Session>, WriteSignal<Session>);

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Profile {
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GrantedRoles {
    pub realm_roles: Vec<String>,
    pub resource_roles: HashMap<String, Vec<String>>,
}

impl GrantedRoles {
    /// Membership is the union of realm-level roles and every resource-level
    /// role set.
    pub fn has_role(&self, role: &str) -> bool {
        if self.realm_roles.iter().any(|r| r == role) {
            return true;
        }
        self.resource_roles
            .values()
            .any(|roles| roles.iter().any(|r| r == role))
    }
}

#[derive(Debug, Clone, Default)]
pub struct Session {
    pub access_token: Option<String>,
    pub expires_at: Option<i64>,
    pub authenticated: bool,
    pub profile: Profile,
    pub granted_roles: GrantedRoles,
    pub loading: bool,
}

impl Session {
    pub fn loading() -> Self {
        Self {
            loading: true,
            ..Default::default()
        }
    }

    pub fn from_token(token: &str, now: i64) -> Option<Self> {
        let claims = decode_claims(token)?;
        if claims.exp <= now {
            return None;
        }
        Some(Self {
            access_token: Some(token.to_string()),
            expires_at: Some(claims.exp),
            authenticated: true,
            profile: claims.profile,
            granted_roles: claims.roles,
            loading: false,
        })
    }
}

/// True when the token is within `threshold` seconds of expiry.
pub fn needs_refresh(expires_at: i64, now: i64, threshold: i64) -> bool {
    expires_at - now <= threshold
}

struct TokenClaims {
    exp: i64,
    profile: Profile,
    roles: GrantedRoles,
}

#[derive(Deserialize)]
struct RoleSet {
    #[serde(default)]
    roles: Vec<String>,
}

#[derive(Deserialize)]
struct RawClaims {
    exp: i64,
    #[serde(default)]
    preferred_username: Option<String>,
    #[serde(default)]
    given_name: Option<String>,
    #[serde(default)]
    family_name: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    realm_access: Option<RoleSet>,
    #[serde(default)]
    resource_access: Option<HashMap<String, RoleSet>>,
}

/// Decodes the provider-signed JWT payload. No signature check here: the
/// token is only trusted by the backend, the client just mirrors its claims.
fn decode_claims(token: &str) -> Option<TokenClaims> {
    let mut parts = token.split('.');
    parts.next()?;
    let payload = parts.next()?;
    let decoded = URL_SAFE_NO_PAD.decode(payload).ok()?;
    let raw: RawClaims = serde_json::from_slice(&decoded).ok()?;
    Some(TokenClaims {
        exp: raw.exp,
        profile: Profile {
            username: raw.preferred_username,
            first_name: raw.given_name,
            last_name: raw.family_name,
            email: raw.email,
        },
        roles: GrantedRoles {
            realm_roles: raw.realm_access.map(|r| r.roles).unwrap_or_default(),
            resource_roles: raw
                .resource_access
                .map(|access| access.into_iter().map(|(k, v)| (k, v.roles)).collect())
                .unwrap_or_default(),
        },
    })
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
}

fn persist_tokens(access_token: &str, refresh_token: Option<&str>) -> Result<(), String> {
    let store = storage::local_storage()?;
    store
        .set_item(ACCESS_TOKEN_KEY, access_token)
        .map_err(|_| "Failed to store token")?;
    if let Some(refresh) = refresh_token {
        store
            .set_item(REFRESH_TOKEN_KEY, refresh)
            .map_err(|_| "Failed to store refresh token")?;
    }
    Ok(())
}

pub fn clear_persisted_session() {
    if let Ok(store) = storage::local_storage() {
        let _ = store.remove_item(ACCESS_TOKEN_KEY);
        let _ = store.remove_item(REFRESH_TOKEN_KEY);
    }
}

pub fn stored_access_token() -> Option<String> {
    storage::local_storage()
        .ok()
        .and_then(|s| s.get_item(ACCESS_TOKEN_KEY).ok().flatten())
}

fn stored_refresh_token() -> Option<String> {
    storage::local_storage()
        .ok()
        .and_then(|s| s.get_item(REFRESH_TOKEN_KEY).ok().flatten())
}

async fn token_grant(
    cfg: &ResolvedConfig,
    params: &[(&str, &str)],
) -> Result<TokenResponse, String> {
    let response = reqwest::Client::new()
        .post(config::token_endpoint(cfg))
        .form(params)
        .send()
        .await
        .map_err(|e| format!("Token request failed: {}", e))?;
    if !response.status().is_success() {
        return Err(format!("Token request rejected: {}", response.status()));
    }
    response
        .json()
        .await
        .map_err(|e| format!("Failed to parse token response: {}", e))
}

#[cfg(target_arch = "wasm32")]
async fn exchange_code(cfg: &ResolvedConfig, code: &str, redirect_uri: &str) -> Result<TokenResponse, String> {
    token_grant(
        cfg,
        &[
            ("grant_type", "authorization_code"),
            ("client_id", &cfg.auth_client_id),
            ("code", code),
            ("redirect_uri", redirect_uri),
        ],
    )
    .await
}

async fn refresh_grant(cfg: &ResolvedConfig, refresh_token: &str) -> Result<TokenResponse, String> {
    token_grant(
        cfg,
        &[
            ("grant_type", "refresh_token"),
            ("client_id", &cfg.auth_client_id),
            ("refresh_token", refresh_token),
        ],
    )
    .await
}

/// Returns a token that is good for at least `threshold` more seconds,
/// refreshing through the provider when necessary. Returns the stale token
/// when the refresh fails, letting the request surface the 401.
pub async fn ensure_fresh_token(threshold: i64) -> Option<String> {
    let token = stored_access_token()?;
    let now = Utc::now().timestamp();
    if let Some(claims) = decode_claims(&token) {
        if !needs_refresh(claims.exp, now, threshold) {
            return Some(token);
        }
    }
    let Some(refresh_token) = stored_refresh_token() else {
        return Some(token);
    };
    let cfg = config::await_config().await;
    match refresh_grant(&cfg, &refresh_token).await {
        Ok(tokens) => {
            let _ = persist_tokens(&tokens.access_token, tokens.refresh_token.as_deref());
            Some(tokens.access_token)
        }
        Err(err) => {
            log::warn!("Token refresh failed: {}", err);
            Some(token)
        }
    }
}

/// Authorization-code login URL with the target path preserved for the
/// post-login return.
pub fn login_redirect_url(cfg: &ResolvedConfig, origin: &str, return_path: &str) -> String {
    format!(
        "{}?client_id={}&redirect_uri={}&response_type=code&scope=openid",
        config::authorize_endpoint(cfg),
        query::encode_component(&cfg.auth_client_id),
        query::encode_component(&format!("{}{}", origin, return_path)),
    )
}

/// True when the live query carries the provider's code-exchange parameters.
pub fn is_provider_callback(query_string: &str) -> bool {
    let params = query::parse_query(query_string);
    params.iter().any(|(k, _)| k == "code") && params.iter().any(|(k, _)| k == "state")
}

/// Full login redirect, preserving the current path. The navigation replaces
/// the document; nothing after it runs.
pub fn force_login_redirect() {
    #[cfg(target_arch = "wasm32")]
    {
        leptos::spawn_local(async move {
            let cfg = config::await_config().await;
            if let Some(win) = web_sys::window() {
                let location = win.location();
                let origin = location.origin().unwrap_or_default();
                let path = location.pathname().unwrap_or_else(|_| "/".into());
                let _ = location.set_href(&login_redirect_url(&cfg, &origin, &path));
            }
        });
    }
}

pub fn logout(set_session: WriteSignal<Session>) {
    clear_persisted_session();
    set_session.set(Session::default());
    #[cfg(target_arch = "wasm32")]
    {
        leptos::spawn_local(async move {
            let cfg = config::await_config().await;
            if let Some(win) = web_sys::window() {
                let location = win.location();
                let origin = location.origin().unwrap_or_default();
                let url = format!(
                    "{}?client_id={}&post_logout_redirect_uri={}",
                    config::logout_endpoint(&cfg),
                    query::encode_component(&cfg.auth_client_id),
                    query::encode_component(&origin),
                );
                let _ = location.set_href(&url);
            }
        });
    }
}

/// Boot-time session resolution: exchange a provider code when present,
/// otherwise restore the persisted token (refreshing it when stale).
#[cfg(target_arch = "wasm32")]
async fn bootstrap_session() -> Session {
    let now = Utc::now().timestamp();

    let Some(win) = web_sys::window() else {
        return Session::default();
    };
    let location = win.location();
    let search = location.search().unwrap_or_default();
    let pathname = location.pathname().unwrap_or_else(|_| "/".into());

    // The Steam link callback restores the persisted token as-is; treating
    // its query as a provider code exchange would eat the handshake.
    if !crate::boot::should_skip_identity_bootstrap(&pathname, &search)
        && is_provider_callback(&search)
    {
        let params = query::parse_query(&search);
        let code = params
            .iter()
            .find(|(k, _)| k == "code")
            .map(|(_, v)| v.clone())
            .unwrap_or_default();
        let origin = location.origin().unwrap_or_default();
        let cfg = config::await_config().await;
        match exchange_code(&cfg, &code, &format!("{}{}", origin, pathname)).await {
            Ok(tokens) => {
                let _ = persist_tokens(&tokens.access_token, tokens.refresh_token.as_deref());
                strip_provider_params(&win, &pathname);
                if let Some(session) = Session::from_token(&tokens.access_token, now) {
                    return session;
                }
            }
            Err(err) => log::error!("Code exchange failed: {}", err),
        }
    }

    if let Some(token) = ensure_fresh_token(0).await {
        if let Some(session) = Session::from_token(&token, now) {
            return session;
        }
    }
    clear_persisted_session();
    Session::default()
}

#[cfg(target_arch = "wasm32")]
fn strip_provider_params(win: &web_sys::Window, path: &str) {
    if let Ok(history) = win.history() {
        let _ = history.replace_state_with_url(
            &wasm_bindgen::JsValue::NULL,
            "",
            Some(path),
        );
    }
}

fn create_session_context() -> SessionContext {
    let (session, set_session) = create_signal(Session::loading());

    #[cfg(target_arch = "wasm32")]
    {
        let set_for_boot = set_session;
        spawn_local(async move {
            let resolved = bootstrap_session().await;
            set_for_boot.set(resolved);
        });
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        set_session.update(|state| state.loading = false);
    }

    (session, set_session)
}

#[component]
pub fn SessionProvider(children: Children) -> impl IntoView {
    let ctx = create_session_context();
    provide_context::<SessionContext>(ctx);
    view! { <>{children()}</> }
}

pub fn use_session() -> SessionContext {
    use_context::<SessionContext>().unwrap_or_else(|| create_signal(Session::default()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    pub fn make_token(payload: serde_json::Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"RS256","typ":"JWT"}"#);
        let body = URL_SAFE_NO_PAD.encode(payload.to_string().as_bytes());
        format!("{}.{}.sig", header, body)
    }

    #[test]
    fn role_membership_is_union_of_realm_and_resource_roles() {
        let roles = GrantedRoles {
            realm_roles: vec!["user".into()],
            resource_roles: HashMap::from([
                ("economy".to_string(), vec!["manage-economy".to_string()]),
                ("slots".to_string(), vec!["view-slots".to_string()]),
            ]),
        };
        assert!(roles.has_role("user"));
        assert!(roles.has_role("manage-economy"));
        assert!(roles.has_role("view-slots"));
        assert!(!roles.has_role("admin"));
    }

    #[test]
    fn needs_refresh_at_the_threshold_boundary() {
        assert!(needs_refresh(1_030, 1_000, 30));
        assert!(needs_refresh(1_020, 1_000, 30));
        assert!(!needs_refresh(1_031, 1_000, 30));
    }

    #[test]
    fn session_from_token_decodes_claims() {
        let exp = Utc::now().timestamp() + 300;
        let token = make_token(json!({
            "exp": exp,
            "preferred_username": "rex",
            "given_name": "Rex",
            "family_name": "Raptor",
            "realm_access": {"roles": ["user"]},
            "resource_access": {"economy": {"roles": ["manage-economy"]}}
        }));
        let session = Session::from_token(&token, Utc::now().timestamp()).unwrap();
        assert!(session.authenticated);
        assert_eq!(session.expires_at, Some(exp));
        assert_eq!(session.profile.username.as_deref(), Some("rex"));
        assert!(session.granted_roles.has_role("manage-economy"));
    }

    #[test]
    fn expired_token_yields_no_session() {
        let token = make_token(json!({"exp": 1_000}));
        assert!(Session::from_token(&token, 2_000).is_none());
    }

    #[test]
    fn malformed_token_yields_no_session() {
        assert!(Session::from_token("not-a-jwt", 0).is_none());
        assert!(Session::from_token("a.b.c", 0).is_none());
    }

    #[test]
    fn login_url_preserves_the_return_path() {
        let cfg = config::resolve(config::RuntimeConfig {
            auth_url: Some("https://id.example".into()),
            auth_realm: Some("game".into()),
            auth_client_id: Some("dashboard".into()),
            ..Default::default()
        });
        let url = login_redirect_url(&cfg, "http://localhost:4200", "/slots");
        assert!(url.starts_with("https://id.example/realms/game/protocol/openid-connect/auth"));
        assert!(url.contains("response_type=code"));
        assert!(url.contains(&query::encode_component("http://localhost:4200/slots")));
    }

    #[test]
    fn provider_callback_requires_code_and_state() {
        assert!(is_provider_callback("?code=abc&state=xyz"));
        assert!(!is_provider_callback("?code=abc"));
        assert!(!is_provider_callback("?openid.mode=id_res&openid.claimed_id=x"));
    }
}
