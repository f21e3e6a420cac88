//! Pre-mount boot checks. The identity bootstrap rewrites the URL on its way
//! in, which would destroy an in-flight Steam link callback; the callback URL
//! is therefore captured here, before anything else touches the location.

use crate::openid::{extract_openid_params, has_callback_markers, CALLBACK_URL_KEY};

pub const LINK_CALLBACK_PATH: &str = "/steam-callback";

/// True when this page load is the provider redirect-back of a link flow:
/// the callback route plus the provider's marker parameters.
pub fn is_link_callback(path: &str, query_string: &str) -> bool {
    if path != LINK_CALLBACK_PATH {
        return false;
    }
    has_callback_markers(&extract_openid_params(query_string))
}

/// The link callback carries no provider session code, so the identity
/// bootstrap must not try a code exchange on it.
pub fn should_skip_identity_bootstrap(path: &str, query_string: &str) -> bool {
    is_link_callback(path, query_string)
}

/// Persists the raw callback URL before any routing or bootstrap can rewrite
/// it. Runs from `main` as the first thing after the panic hook.
#[cfg(target_arch = "wasm32")]
pub fn preserve_callback_url() {
    let Ok(win) = crate::utils::storage::window() else {
        return;
    };
    let location = win.location();
    let path = location.pathname().unwrap_or_default();
    let search = location.search().unwrap_or_default();
    if !is_link_callback(&path, &search) {
        return;
    }
    if let Ok(href) = location.href() {
        if let Ok(storage) = crate::utils::storage::session_storage() {
            let _ = storage.set_item(CALLBACK_URL_KEY, &href);
        }
    }
}

/// The callback URL captured by [`preserve_callback_url`], cleared on read.
pub fn take_preserved_callback_url() -> Option<String> {
    let storage = crate::utils::storage::session_storage().ok()?;
    let url = storage.get_item(CALLBACK_URL_KEY).ok().flatten()?;
    let _ = storage.remove_item(CALLBACK_URL_KEY);
    Some(url)
}
