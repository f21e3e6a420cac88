use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Runtime configuration resolved once at boot. Values come from (in order)
/// `window.__RAPTOR_ENV`, `window.__RAPTOR_CONFIG`, then a fetched
/// `./config.json`, falling back to local-development defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RuntimeConfig {
    pub api_base_url: Option<String>,
    pub auth_url: Option<String>,
    pub auth_realm: Option<String>,
    pub auth_client_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub api_base_url: String,
    pub auth_url: String,
    pub auth_realm: String,
    pub auth_client_id: String,
}

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000/api";
pub const DEFAULT_AUTH_URL: &str = "http://localhost:8080";
pub const DEFAULT_AUTH_REALM: &str = "raptor";
pub const DEFAULT_AUTH_CLIENT_ID: &str = "raptor-frontend";

static CONFIG: OnceLock<ResolvedConfig> = OnceLock::new();

fn read_string_field(obj: &js_sys::Object, key: &str) -> Option<String> {
    js_sys::Reflect::get(obj, &key.into())
        .ok()
        .filter(|v| !v.is_undefined() && !v.is_null())
        .and_then(|v| v.as_string())
}

fn read_global_object(name: &str) -> Option<js_sys::Object> {
    let window = web_sys::window()?;
    let any = js_sys::Reflect::get(&window, &name.into()).ok()?;
    if any.is_undefined() || any.is_null() {
        return None;
    }
    Some(js_sys::Object::from(any))
}

fn config_from_globals() -> Option<RuntimeConfig> {
    // window.__RAPTOR_ENV (env.js) takes precedence over __RAPTOR_CONFIG.
    let obj = read_global_object("__RAPTOR_ENV").or_else(|| read_global_object("__RAPTOR_CONFIG"))?;
    Some(RuntimeConfig {
        api_base_url: read_string_field(&obj, "api_base_url")
            .or_else(|| read_string_field(&obj, "API_BASE_URL")),
        auth_url: read_string_field(&obj, "auth_url").or_else(|| read_string_field(&obj, "AUTH_URL")),
        auth_realm: read_string_field(&obj, "auth_realm")
            .or_else(|| read_string_field(&obj, "AUTH_REALM")),
        auth_client_id: read_string_field(&obj, "auth_client_id")
            .or_else(|| read_string_field(&obj, "AUTH_CLIENT_ID")),
    })
}

async fn fetch_runtime_config() -> Option<RuntimeConfig> {
    let origin = web_sys::window()?.location().origin().ok()?;
    let resp = reqwest::get(format!("{}/config.json", origin)).await.ok()?;
    if !resp.status().is_success() {
        return None;
    }
    resp.json::<RuntimeConfig>().await.ok()
}

pub fn resolve(cfg: RuntimeConfig) -> ResolvedConfig {
    ResolvedConfig {
        api_base_url: cfg
            .api_base_url
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
        auth_url: cfg.auth_url.unwrap_or_else(|| DEFAULT_AUTH_URL.to_string()),
        auth_realm: cfg
            .auth_realm
            .unwrap_or_else(|| DEFAULT_AUTH_REALM.to_string()),
        auth_client_id: cfg
            .auth_client_id
            .unwrap_or_else(|| DEFAULT_AUTH_CLIENT_ID.to_string()),
    }
}

pub async fn await_config() -> ResolvedConfig {
    if let Some(cached) = CONFIG.get() {
        return cached.clone();
    }
    let runtime = match config_from_globals() {
        Some(cfg) => cfg,
        None => fetch_runtime_config().await.unwrap_or_default(),
    };
    let resolved = resolve(runtime);
    let _ = CONFIG.set(resolved.clone());
    resolved
}

pub async fn await_api_base_url() -> String {
    await_config().await.api_base_url
}

/// Authorization endpoint of the identity provider realm.
pub fn authorize_endpoint(cfg: &ResolvedConfig) -> String {
    format!(
        "{}/realms/{}/protocol/openid-connect/auth",
        cfg.auth_url, cfg.auth_realm
    )
}

/// Token endpoint used for the code exchange and refresh grants.
pub fn token_endpoint(cfg: &ResolvedConfig) -> String {
    format!(
        "{}/realms/{}/protocol/openid-connect/token",
        cfg.auth_url, cfg.auth_realm
    )
}

pub fn logout_endpoint(cfg: &ResolvedConfig) -> String {
    format!(
        "{}/realms/{}/protocol/openid-connect/logout",
        cfg.auth_url, cfg.auth_realm
    )
}

pub async fn init() {
    let _ = await_config().await;
}
