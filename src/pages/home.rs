use crate::state::session::use_session;
use leptos::*;

#[component]
pub fn HomePage() -> impl IntoView {
    let (session, _) = use_session();
    let greeting = move || {
        let state = session.get();
        if state.authenticated {
            match state.profile.username {
                Some(name) => format!("Welcome back, {}", name),
                None => "Welcome back".to_string(),
            }
        } else {
            "Game-server economy dashboard".to_string()
        }
    };
    view! {
        <div class="min-h-screen bg-surface">
            <crate::components::layout::Header/>
            <div class="max-w-7xl mx-auto py-12 px-4 sm:px-6 lg:px-8">
                <div class="text-center">
                    <h1 class="text-4xl font-extrabold text-fg sm:text-5xl lg:text-6xl">
                        "Raptor"
                    </h1>
                    <p class="mt-3 max-w-md mx-auto text-base text-fg-muted sm:text-lg lg:mt-5 lg:text-xl lg:max-w-3xl">
                        {greeting}
                    </p>
                    <div class="mt-5 max-w-md mx-auto sm:flex sm:justify-center lg:mt-8">
                        <div class="rounded-md shadow">
                            <a href="/slots" class="w-full flex items-center justify-center px-8 py-3 border border-transparent text-base font-medium rounded-md text-action-primary-text bg-action-primary-bg hover:bg-action-primary-bg_hover lg:py-4 lg:text-lg lg:px-10">
                                "My slots"
                            </a>
                        </div>
                    </div>
                </div>
            </div>
        </div>
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod host_tests {
    use super::*;
    use crate::test_support::helpers::{authenticated_session, provide_session};
    use crate::test_support::ssr::render_to_string;

    #[test]
    fn home_greets_an_authenticated_user_by_name() {
        let html = render_to_string(move || {
            provide_session(authenticated_session(&["user"]));
            view! { <HomePage/> }
        });
        assert!(html.contains("Welcome back, rex"));
    }

    #[test]
    fn home_shows_the_product_line_to_visitors() {
        let html = render_to_string(move || {
            provide_session(Default::default());
            view! { <HomePage/> }
        });
        assert!(html.contains("Game-server economy dashboard"));
    }
}
