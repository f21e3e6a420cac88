use leptos::*;
use leptos_router::*;

use crate::{
    components::{
        guard::{RequireAuth, RequireRole},
        toast::ToastHost,
    },
    pages::{
        forbidden::{ForbiddenPage, NotFoundPage},
        home::HomePage,
        profile::ProfilePage,
        slots::SlotsPage,
        steam_callback::SteamCallbackPage,
        transfer::TransferPage,
    },
    state::session::SessionProvider,
};

pub const ROUTE_PATHS: &[&str] = &[
    "/",
    "/home",
    "/profile",
    "/slots",
    "/transfer",
    "/steam-callback",
    "/forbidden",
];

pub const PROTECTED_ROUTE_PATHS: &[&str] = &["/profile", "/slots", "/transfer"];

/// Routes that must never sit behind a guard: the link callback completes
/// with only the pending token from before the redirect, and the error pages
/// must stay reachable for anyone.
pub const PUBLIC_ROUTE_PATHS: &[&str] = &["/", "/home", "/steam-callback", "/forbidden"];

pub const ECONOMY_MANAGER_ROLE: &str = "manage-economy";

pub fn mount_app() {
    mount_to_body(app_root);
}

pub fn app_root() -> impl IntoView {
    leptos_meta::provide_meta_context();
    view! {
        <leptos_meta::Title text="Raptor"/>
        <SessionProvider>
            <Router>
                <Routes>
                    <Route path="/" view=|| view! { <Redirect path="/home"/> }/>
                    <Route path="/home" view=HomePage/>
                    <Route path="/profile" view=ProtectedProfile/>
                    <Route path="/slots" view=ProtectedSlots/>
                    <Route path="/transfer" view=ProtectedTransfer/>
                    <Route path="/steam-callback" view=SteamCallbackPage/>
                    <Route path="/forbidden" view=ForbiddenPage/>
                    <Route path="/*any" view=NotFoundPage/>
                </Routes>
            </Router>
            <ToastHost/>
        </SessionProvider>
    }
}

#[component]
fn ProtectedProfile() -> impl IntoView {
    view! { <RequireAuth><ProfilePage/></RequireAuth> }
}

#[component]
fn ProtectedSlots() -> impl IntoView {
    view! { <RequireAuth><SlotsPage/></RequireAuth> }
}

#[component]
fn ProtectedTransfer() -> impl IntoView {
    view! { <RequireRole role=ECONOMY_MANAGER_ROLE><TransferPage/></RequireRole> }
}
