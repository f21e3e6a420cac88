use crate::components::layout::*;
use leptos::*;

/// Economy transfer tooling, gated on the `manage-economy` role by the
/// router. The transfer forms themselves are backend-driven and land here.
#[component]
pub fn TransferPage() -> impl IntoView {
    view! {
        <PageShell title="Transfers">
            <div class="bg-surface-elevated shadow rounded-lg p-6">
                <p class="text-sm text-fg-muted">
                    "Currency transfer tools for economy managers."
                </p>
            </div>
        </PageShell>
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod host_tests {
    use super::*;
    use crate::test_support::helpers::{authenticated_session, provide_session};
    use crate::test_support::ssr::render_to_string;

    #[test]
    fn transfer_page_renders_inside_the_shell() {
        let html = render_to_string(move || {
            provide_session(authenticated_session(&["manage-economy"]));
            view! { <TransferPage/> }
        });
        assert!(html.contains("Transfers"));
    }
}
