use crate::{
    components::layout::LoadingSpinner,
    state::session::{self, use_session},
};
use leptos::*;

/// Blocks children until the session resolves; an unauthenticated visitor is
/// sent to the identity provider with the current path preserved.
#[component]
pub fn RequireAuth(children: ChildrenFn) -> impl IntoView {
    let (session, _) = use_session();
    let is_authenticated = create_memo(move |_| session.get().authenticated);
    let is_loading = create_memo(move |_| session.get().loading);
    create_effect(move |_| {
        let state = session.get();
        if state.loading || state.authenticated {
            return;
        }
        session::force_login_redirect();
    });
    view! {
        <Show
            when=move || should_render_children(is_authenticated.get(), is_loading.get())
            fallback=move || {
                if is_loading.get() {
                    view! { <LoadingSpinner /> }.into_view()
                } else {
                    ().into_view()
                }
            }
        >
            {children()}
        </Show>
    }
}

fn should_render_children(is_authenticated: bool, is_loading: bool) -> bool {
    is_authenticated && !is_loading
}

/// Like [`RequireAuth`], plus a role check. Authenticated users without the
/// role land on the forbidden page instead of the provider.
#[component]
pub fn RequireRole(role: &'static str, children: ChildrenFn) -> impl IntoView {
    let (session, _) = use_session();
    let is_authenticated = create_memo(move |_| session.get().authenticated);
    let is_loading = create_memo(move |_| session.get().loading);
    let has_role = create_memo(move |_| session.get().granted_roles.has_role(role));
    create_effect(move |_| {
        let state = session.get();
        if state.loading {
            return;
        }
        if !state.authenticated {
            session::force_login_redirect();
            return;
        }
        if !state.granted_roles.has_role(role) {
            #[cfg(target_arch = "wasm32")]
            if let Some(win) = web_sys::window() {
                let _ = win.location().set_href("/forbidden");
            }
        }
    });
    view! {
        <Show
            when=move || {
                should_render_role_children(is_authenticated.get(), is_loading.get(), has_role.get())
            }
            fallback=move || {
                if is_loading.get() {
                    view! { <LoadingSpinner /> }.into_view()
                } else {
                    ().into_view()
                }
            }
        >
            {children()}
        </Show>
    }
}

fn should_render_role_children(is_authenticated: bool, is_loading: bool, has_role: bool) -> bool {
    is_authenticated && has_role && !is_loading
}

#[cfg(test)]
mod tests {
    use super::{should_render_children, should_render_role_children};

    #[test]
    fn guard_blocks_until_authenticated() {
        assert!(!should_render_children(false, true));
        assert!(!should_render_children(false, false));
        assert!(!should_render_children(true, true));
        assert!(should_render_children(true, false));
    }

    #[test]
    fn role_guard_requires_membership_and_a_settled_session() {
        assert!(!should_render_role_children(false, false, true));
        assert!(!should_render_role_children(true, true, true));
        assert!(!should_render_role_children(true, false, false));
        assert!(should_render_role_children(true, false, true));
    }
}
