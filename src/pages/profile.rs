use crate::{
    api::ApiClient,
    components::layout::*,
    state::{
        notify::{push_api_error, push_success, use_toasts},
        session::use_session,
        steam::{self, use_steam},
    },
};
use leptos::*;
use log::error;

#[component]
pub fn ProfilePage() -> impl IntoView {
    let (session, _) = use_session();
    let (steam_state, set_steam_state) = use_steam();
    let (_, set_toasts) = use_toasts();

    create_effect(move |_| {
        spawn_local(async move {
            let api = ApiClient::new();
            if let Err(err) = steam::load_steam_ids(&api, set_steam_state).await {
                error!("Failed to load linked Steam IDs: {}", err);
                push_api_error(set_toasts, &err);
            }
        });
    });

    let on_link = move |_| {
        spawn_local(async move {
            #[cfg(target_arch = "wasm32")]
            {
                let api = ApiClient::new();
                if let Err(err) = steam::begin_link(&api, "/profile").await {
                    error!("Failed to start Steam link: {}", err);
                    push_api_error(set_toasts, &err);
                }
            }
        });
    };

    let on_set_default = move |steamid64: String| {
        spawn_local(async move {
            let api = ApiClient::new();
            match steam::set_default_steam_id(&api, set_steam_state, &steamid64).await {
                Ok(()) => {
                    if let Some(message) = steam_state.get_untracked().message {
                        push_success(set_toasts, message);
                    }
                }
                Err(err) => {
                    push_api_error(set_toasts, &err);
                }
            }
        });
    };

    let on_unlink = move |steamid64: String| {
        spawn_local(async move {
            let api = ApiClient::new();
            match steam::delete_steam_id(&api, set_steam_state, &steamid64).await {
                Ok(()) => {
                    if let Some(message) = steam_state.get_untracked().message {
                        push_success(set_toasts, message);
                    }
                }
                Err(err) => {
                    push_api_error(set_toasts, &err);
                }
            }
        });
    };

    view! {
        <PageShell title="Profile">
            <div class="bg-surface-elevated shadow rounded-lg p-6 mb-6">
                <h3 class="text-lg font-medium text-fg mb-2">"Account"</h3>
                <dl class="text-sm text-fg-muted space-y-1 mb-4">
                    <div class="flex gap-2">
                        <dt class="font-medium text-fg">"Username:"</dt>
                        <dd>{move || session.get().profile.username.unwrap_or_default()}</dd>
                    </div>
                    <div class="flex gap-2">
                        <dt class="font-medium text-fg">"Email:"</dt>
                        <dd>{move || session.get().profile.email.unwrap_or_default()}</dd>
                    </div>
                </dl>
                <AccountEditor/>
            </div>

            <div class="bg-surface-elevated shadow rounded-lg p-6">
                <div class="flex justify-between items-center mb-4">
                    <h3 class="text-lg font-medium text-fg">"Linked Steam accounts"</h3>
                    <button
                        class="px-3 py-2 text-sm font-medium rounded-md text-action-primary-text bg-action-primary-bg hover:bg-action-primary-bg_hover"
                        on:click=on_link
                    >
                        "Link Steam account"
                    </button>
                </div>
                <Show when=move || steam_state.get().loading fallback=|| ()>
                    <LoadingSpinner/>
                </Show>
                <Show
                    when=move || !steam_state.get().loading && steam_state.get().steam_ids.is_empty()
                    fallback=|| ()
                >
                    <p class="text-sm text-fg-muted">"No Steam accounts linked yet."</p>
                </Show>
                <ul class="divide-y divide-border">
                    <For
                        each=move || steam_state.get().steam_ids
                        key=|record| record.steamid64.clone()
                        children=move |record| {
                            let is_default = record.is_default;
                            let id_for_default = record.steamid64.clone();
                            let id_for_unlink = record.steamid64.clone();
                            view! {
                                <li class="py-3 flex justify-between items-center text-sm">
                                    <div class="flex items-center gap-2">
                                        <span class="font-mono text-fg">{record.steamid64.clone()}</span>
                                        <Show when=move || is_default fallback=|| ()>
                                            <span class="text-xs font-semibold text-accent">"DEFAULT"</span>
                                        </Show>
                                    </div>
                                    <div class="flex gap-2">
                                        <Show when=move || !is_default fallback=|| ()>
                                            {
                                                let id = id_for_default.clone();
                                                view! {
                                                    <button
                                                        class="px-2 py-1 text-xs rounded border border-border text-fg-muted hover:text-fg"
                                                        on:click=move |_| on_set_default(id.clone())
                                                    >
                                                        "Make default"
                                                    </button>
                                                }
                                            }
                                        </Show>
                                        <button
                                            class="px-2 py-1 text-xs rounded border border-status-error-border text-status-error-text"
                                            on:click=move |_| on_unlink(id_for_unlink.clone())
                                        >
                                            "Unlink"
                                        </button>
                                    </div>
                                </li>
                            }
                        }
                    />
                </ul>
            </div>
        </PageShell>
    }
}

#[component]
fn AccountEditor() -> impl IntoView {
    let (_, set_toasts) = use_toasts();
    let (form, set_form) = create_signal(crate::api::UserProfile::default());

    create_effect(move |_| {
        spawn_local(async move {
            let api = ApiClient::new();
            match api.get_user_profile().await {
                Ok(profile) => set_form.set(profile),
                Err(err) => error!("Failed to load profile: {}", err),
            }
        });
    });

    let on_save = move |_| {
        spawn_local(async move {
            let api = ApiClient::new();
            match api.update_user_profile(&form.get_untracked()).await {
                Ok(profile) => {
                    set_form.set(profile);
                    push_success(set_toasts, "Profile updated");
                }
                Err(err) => {
                    push_api_error(set_toasts, &err);
                }
            }
        });
    };

    let on_avatar_delete = move |_| {
        spawn_local(async move {
            let api = ApiClient::new();
            match api.delete_profile_image().await {
                Ok(response) => {
                    set_form.update(|profile| profile.avatar_url = None);
                    if let Some(message) = response.message {
                        push_success(set_toasts, message);
                    }
                }
                Err(err) => {
                    push_api_error(set_toasts, &err);
                }
            }
        });
    };

    let on_avatar_pick = move |ev: leptos::ev::Event| {
        #[cfg(target_arch = "wasm32")]
        {
            use wasm_bindgen::JsCast;

            let Some(input) = ev
                .target()
                .and_then(|t| t.dyn_into::<web_sys::HtmlInputElement>().ok())
            else {
                return;
            };
            let Some(file) = input.files().and_then(|files| files.get(0)) else {
                return;
            };
            spawn_local(async move {
                let name = file.name();
                let mime = file.type_();
                let buffer = match wasm_bindgen_futures::JsFuture::from(file.array_buffer()).await {
                    Ok(buffer) => buffer,
                    Err(_) => {
                        error!("Failed to read the selected image");
                        return;
                    }
                };
                let bytes = js_sys::Uint8Array::new(&buffer).to_vec();
                let api = ApiClient::new();
                match api.upload_profile_image(&name, &mime, bytes).await {
                    Ok(response) => {
                        if let Some(message) = response.message {
                            push_success(set_toasts, message);
                        }
                    }
                    Err(err) => {
                        push_api_error(set_toasts, &err);
                    }
                }
            });
        }
        #[cfg(not(target_arch = "wasm32"))]
        let _ = ev;
    };

    view! {
        <div class="border-t border-border pt-4 space-y-3">
            <div class="flex items-center gap-4">
                <Show when=move || form.get().avatar_url.is_some() fallback=|| ()>
                    <img
                        class="h-12 w-12 rounded-full object-cover"
                        src=move || form.get().avatar_url.unwrap_or_default()
                    />
                    <button
                        class="px-2 py-1 text-xs rounded border border-status-error-border text-status-error-text"
                        on:click=on_avatar_delete
                    >
                        "Remove image"
                    </button>
                </Show>
                <input type="file" accept="image/*" class="text-sm" on:change=on_avatar_pick/>
            </div>
            <div class="grid grid-cols-1 sm:grid-cols-2 gap-3">
                <input
                    type="text"
                    placeholder="First name"
                    class="border border-border rounded-md px-3 py-2 text-sm"
                    prop:value=move || form.get().first_name.unwrap_or_default()
                    on:input=move |ev| set_form.update(|profile| {
                        profile.first_name = Some(event_target_value(&ev));
                    })
                />
                <input
                    type="text"
                    placeholder="Last name"
                    class="border border-border rounded-md px-3 py-2 text-sm"
                    prop:value=move || form.get().last_name.unwrap_or_default()
                    on:input=move |ev| set_form.update(|profile| {
                        profile.last_name = Some(event_target_value(&ev));
                    })
                />
            </div>
            <button
                class="px-3 py-2 text-sm font-medium rounded-md text-action-primary-text bg-action-primary-bg hover:bg-action-primary-bg_hover"
                on:click=on_save
            >
                "Save"
            </button>
        </div>
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod host_tests {
    use super::*;
    use crate::api::SteamIdRecord;
    use crate::state::steam::SteamState;
    use crate::test_support::helpers::{authenticated_session, provide_session};
    use crate::test_support::ssr::render_to_string;

    #[test]
    fn profile_lists_linked_ids_and_marks_the_default() {
        let html = render_to_string(move || {
            provide_session(authenticated_session(&["user"]));
            let ctx = create_signal(SteamState {
                steam_ids: vec![
                    SteamIdRecord {
                        steamid64: "76561198000000001".into(),
                        is_default: true,
                        linked_at: None,
                    },
                    SteamIdRecord {
                        steamid64: "76561198000000002".into(),
                        is_default: false,
                        linked_at: None,
                    },
                ],
                ..Default::default()
            });
            provide_context(ctx);
            view! { <ProfilePage/> }
        });
        assert!(html.contains("76561198000000001"));
        assert!(html.contains("76561198000000002"));
        assert!(html.contains("DEFAULT"));
        // The promote action renders only on the non-default row.
        assert!(html.contains("Make default"));
    }

    #[test]
    fn profile_shows_the_empty_state_without_links() {
        let html = render_to_string(move || {
            provide_session(authenticated_session(&["user"]));
            let ctx = create_signal(SteamState::default());
            provide_context(ctx);
            view! { <ProfilePage/> }
        });
        assert!(html.contains("No Steam accounts linked yet."));
    }
}
