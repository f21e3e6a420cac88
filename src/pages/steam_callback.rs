use crate::components::layout::LoadingSpinner;
use leptos::*;

/// Landing page for the provider's redirect-back. Finishes the link
/// handshake, reports the outcome, and returns to where the flow started.
#[component]
pub fn SteamCallbackPage() -> impl IntoView {
    let (status, set_status) = create_signal("Verifying your Steam account...".to_string());
    let (done, set_done) = create_signal(false);
    // The setters only fire from the browser-side verification flow.
    #[cfg(not(target_arch = "wasm32"))]
    let _ = (set_status, set_done);

    #[cfg(target_arch = "wasm32")]
    {
        use crate::state::notify::{push_api_error, push_success, use_toasts};
        use crate::state::steam;
        use crate::{boot, openid};
        use log::error;

        let (_, set_toasts) = use_toasts();
        create_effect(move |_| {
            spawn_local(async move {
                let live_params = crate::utils::storage::window()
                    .ok()
                    .and_then(|win| win.location().search().ok())
                    .map(|search| openid::extract_openid_params(&search))
                    .unwrap_or_default();

                let mut continuation = openid::LinkContinuation::take();
                if let Some(url) = boot::take_preserved_callback_url() {
                    if let Some(record) = continuation.as_mut() {
                        record.callback_url = Some(url);
                    }
                }

                match steam::process_callback(live_params, continuation).await {
                    Ok(outcome) => {
                        push_success(set_toasts, outcome.message.clone());
                        set_status.set(outcome.message.clone());
                        set_done.set(true);
                        if let Ok(win) = crate::utils::storage::window() {
                            let _ = win.location().set_href(&outcome.return_path);
                        }
                    }
                    Err(err) => {
                        error!("Steam link verification failed: {}", err);
                        push_api_error(set_toasts, &err);
                        set_status.set(err.message.clone());
                        set_done.set(true);
                    }
                }
            });
        });
    }

    view! {
        <div class="min-h-screen bg-surface flex items-center justify-center">
            <div class="text-center">
                <Show when=move || !done.get() fallback=|| ()>
                    <LoadingSpinner/>
                </Show>
                <p class="mt-4 text-fg-muted">{status}</p>
                <Show when=move || done.get() fallback=|| ()>
                    <a href="/" class="mt-4 inline-block underline text-accent">"Back to dashboard"</a>
                </Show>
            </div>
        </div>
    }
}
