use crate::state::session::{self, use_session};
use leptos::*;

#[component]
pub fn Header() -> impl IntoView {
    let (session, set_session) = use_session();
    let username = move || {
        session
            .get()
            .profile
            .username
            .unwrap_or_else(|| "Guest".to_string())
    };
    let on_logout = move |_| session::logout(set_session);
    view! {
        <header class="bg-surface-elevated shadow-sm border-b border-border">
            <div class="max-w-7xl mx-auto px-4 sm:px-6 lg:px-8">
                <div class="flex justify-between items-center h-16">
                    <div class="flex items-center">
                        <h1 class="text-xl font-semibold text-fg">"Raptor"</h1>
                    </div>
                    <div class="flex items-center">
                        <nav class="hidden lg:flex space-x-4">
                            <a href="/" class="text-fg-muted hover:text-fg px-3 py-2 rounded-md text-sm font-medium hover:bg-action-ghost-bg-hover">
                                "Home"
                            </a>
                            <a href="/slots" class="text-fg-muted hover:text-fg px-3 py-2 rounded-md text-sm font-medium hover:bg-action-ghost-bg-hover">
                                "Slots"
                            </a>
                            <a href="/transfer" class="text-fg-muted hover:text-fg px-3 py-2 rounded-md text-sm font-medium hover:bg-action-ghost-bg-hover">
                                "Transfer"
                            </a>
                            <a href="/profile" class="text-fg-muted hover:text-fg px-3 py-2 rounded-md text-sm font-medium hover:bg-action-ghost-bg-hover">
                                "Profile"
                            </a>
                        </nav>
                        <Show when=move || session.get().authenticated fallback=|| ()>
                            <span class="ml-4 text-sm text-fg-muted">{username}</span>
                            <button
                                class="ml-3 text-sm text-fg-muted hover:text-fg px-3 py-2 rounded-md hover:bg-action-ghost-bg-hover"
                                on:click=on_logout
                            >
                                "Logout"
                            </button>
                        </Show>
                    </div>
                </div>
            </div>
        </header>
    }
}

#[component]
pub fn LoadingSpinner() -> impl IntoView {
    view! {
        <div class="flex justify-center items-center py-12">
            <div class="animate-spin rounded-full h-10 w-10 border-b-2 border-accent"></div>
        </div>
    }
}

#[component]
pub fn PageShell(#[prop(into)] title: String, children: Children) -> impl IntoView {
    view! {
        <div class="min-h-screen bg-surface">
            <Header/>
            <main class="max-w-7xl mx-auto px-4 sm:px-6 lg:px-8 py-8">
                <h2 class="text-2xl font-semibold text-fg mb-6">{title}</h2>
                {children()}
            </main>
        </div>
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod host_tests {
    use super::*;
    use crate::test_support::helpers::{authenticated_session, provide_session};
    use crate::test_support::ssr::render_to_string;

    #[test]
    fn header_shows_username_and_logout_when_authenticated() {
        let html = render_to_string(move || {
            provide_session(authenticated_session(&["user"]));
            view! { <Header/> }
        });
        assert!(html.contains("rex"));
        assert!(html.contains("Logout"));
    }

    #[test]
    fn header_hides_logout_for_anonymous_visitors() {
        let html = render_to_string(move || {
            provide_session(Default::default());
            view! { <Header/> }
        });
        assert!(!html.contains("Logout"));
    }
}
