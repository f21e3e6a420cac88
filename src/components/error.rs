use crate::api::{ApiError, ApiErrorKind};
use leptos::*;

#[component]
pub fn InlineErrorMessage(error: Signal<Option<ApiError>>) -> impl IntoView {
    view! {
        <Show when=move || error.get().is_some() fallback=|| ()>
            <div class="bg-status-error-bg border border-status-error-border text-status-error-text px-4 py-3 rounded space-y-1 my-2">
                <div class="font-bold">
                    {move || error.get().map(|e| e.message).unwrap_or_default()}
                </div>
                {move || error.get().map(|e| {
                    if e.kind == ApiErrorKind::Cooldown {
                        if let Some(seconds) = e.cooldown_seconds() {
                            return view! {
                                <div class="text-xs opacity-75">
                                    {format!("Try again in {}", format_cooldown(seconds))}
                                </div>
                            }.into_view();
                        }
                    }
                    if let Some(status) = e.status {
                        view! { <div class="text-xs opacity-75">{format!("HTTP {}", status)}</div> }
                            .into_view()
                    } else {
                        ().into_view()
                    }
                }).unwrap_or_else(|| ().into_view())}
            </div>
        </Show>
    }
}

/// "4:05"-style countdown label.
pub fn format_cooldown(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::format_cooldown;

    #[test]
    fn cooldown_label_pads_seconds() {
        assert_eq!(format_cooldown(300), "5:00");
        assert_eq!(format_cooldown(65), "1:05");
        assert_eq!(format_cooldown(9), "0:09");
        assert_eq!(format_cooldown(0), "0:00");
    }
}
