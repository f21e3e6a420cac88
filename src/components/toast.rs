use crate::state::notify::{use_toasts, ToastLevel};
use leptos::*;

#[component]
pub fn ToastHost() -> impl IntoView {
    let (toasts, set_toasts) = use_toasts();
    view! {
        <div class="fixed bottom-4 right-4 z-50 space-y-2">
            <For
                each=move || toasts.get().toasts
                key=|toast| toast.id
                children=move |toast| {
                    let id = toast.id;
                    let class = match toast.level {
                        ToastLevel::Info => "bg-status-info-bg border-status-info-border text-status-info-text",
                        ToastLevel::Success => "bg-status-success-bg border-status-success-border text-status-success-text",
                        ToastLevel::Error => "bg-status-error-bg border-status-error-border text-status-error-text",
                    };
                    view! {
                        <div class=format!("border px-4 py-3 rounded shadow-lg flex items-center {}", class)>
                            <span class="text-sm">{toast.message.clone()}</span>
                            <button
                                class="ml-3 text-xs opacity-75 hover:opacity-100"
                                on:click=move |_| set_toasts.update(|state| state.dismiss(id))
                            >
                                "✕"
                            </button>
                        </div>
                    }
                }
            />
        </div>
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod host_tests {
    use super::*;
    use crate::state::notify::{push_success, ToastState};
    use crate::test_support::ssr::render_to_string;

    #[test]
    fn host_renders_pushed_toasts() {
        let html = render_to_string(move || {
            let ctx = create_signal(ToastState::default());
            provide_context(ctx);
            push_success(ctx.1, "Steam account linked successfully");
            view! { <ToastHost/> }
        });
        assert!(html.contains("Steam account linked successfully"));
    }
}
