pub mod api;
pub mod boot;
pub mod components;
pub mod config;
pub mod openid;
pub mod pages;
pub mod router;
pub mod state;
pub mod utils;

#[cfg(test)]
mod test_support;

/// Browser entry: capture an in-flight link callback before anything can
/// rewrite the URL, resolve runtime config, then mount.
#[cfg(target_arch = "wasm32")]
pub fn run() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);

    boot::preserve_callback_url();

    wasm_bindgen_futures::spawn_local(async move {
        config::init().await;
        log::info!("Runtime config initialized");
        router::mount_app();
    });
}
