use crate::{
    api::ApiClient,
    components::{error::format_cooldown, layout::*},
    state::{
        notify::{push_api_error, push_success, use_toasts},
        server::{self, use_server},
        slots::{self, use_slots, SlotsPhase},
    },
};
use leptos::*;
use leptos_router::use_query_map;
use log::error;

const DEFAULT_SERVER_ID: &str = "main";

#[component]
pub fn SlotsPage() -> impl IntoView {
    let query = use_query_map();
    let server_id = create_memo(move |_| {
        query
            .get()
            .get("server")
            .cloned()
            .unwrap_or_else(|| DEFAULT_SERVER_ID.to_string())
    });

    let (slots_state, set_slots_state) = use_slots();
    let (server_state, set_server_state) = use_server();
    let (_, set_toasts) = use_toasts();

    create_effect(move |_| {
        let server = server_id.get();
        spawn_local(async move {
            let api = ApiClient::new();
            if let Err(err) = slots::load_slots(&api, set_slots_state, &server).await {
                error!("Failed to load slots: {}", err);
                push_api_error(set_toasts, &err);
            }
            if let Err(err) = server::load_balances(&api, set_server_state, &server).await {
                error!("Failed to load balances: {}", err);
            }
        });
    });

    let on_switch = move |slot_id: String| {
        let server = server_id.get_untracked();
        spawn_local(async move {
            let api = ApiClient::new();
            match slots::change_slot(&api, slots_state, set_slots_state, &server, &slot_id).await {
                Ok(Some(message)) => push_success(set_toasts, message),
                Ok(None) => {}
                Err(err) => {
                    push_api_error(set_toasts, &err);
                    #[cfg(target_arch = "wasm32")]
                    if slots_state.get_untracked().phase == SlotsPhase::CooldownBlocked {
                        slots::spawn_cooldown_countdown(set_slots_state);
                    }
                }
            }
        });
    };

    view! {
        <PageShell title="Slots">
            <CooldownBanner slots_state=slots_state/>
            {move || match slots_state.get().phase {
                SlotsPhase::Loading => view! { <LoadingSpinner/> }.into_view(),
                SlotsPhase::NoLinkedIdentity => view! {
                    <div class="bg-status-warn-bg border border-status-warn-border text-status-warn-text px-4 py-3 rounded">
                        <p>"Link a Steam account to see your slots."</p>
                        <a href="/profile" class="underline font-medium">"Go to profile"</a>
                    </div>
                }.into_view(),
                _ => view! {
                    <SlotGrid slots_state=slots_state on_switch=on_switch/>
                }.into_view(),
            }}
            <BalancePanel server_state=server_state/>
        </PageShell>
    }
}

#[component]
fn CooldownBanner(slots_state: ReadSignal<slots::SlotsState>) -> impl IntoView {
    view! {
        <Show
            when=move || {
                let state = slots_state.get();
                state.phase == SlotsPhase::CooldownBlocked && state.cooldown_remaining > 0
            }
            fallback=|| ()
        >
            <div class="bg-status-warn-bg border border-status-warn-border text-status-warn-text px-4 py-3 rounded mb-4">
                {move || format!(
                    "Slot switching is on cooldown. Try again in {}.",
                    format_cooldown(slots_state.get().cooldown_remaining)
                )}
            </div>
        </Show>
    }
}

#[component]
fn SlotGrid(
    slots_state: ReadSignal<slots::SlotsState>,
    on_switch: impl Fn(String) + Copy + 'static,
) -> impl IntoView {
    view! {
        <Show when=move || slots_state.get().inconsistent fallback=|| ()>
            <div class="bg-status-error-bg border border-status-error-border text-status-error-text px-4 py-3 rounded mb-4">
                {move || slots_state.get().message.unwrap_or_default()}
            </div>
        </Show>
        <div class="grid grid-cols-1 gap-4 sm:grid-cols-2 lg:grid-cols-3">
            <For
                each=move || slots_state.get().slots
                key=|slot| slot.slot_id.clone()
                children=move |slot| {
                    let is_active = slot.is_active;
                    let slot_name = slot.slot_name.clone();
                    let slot_number = slot.slot_number;
                    let slot_id = slot.slot_id.clone();
                    let switchable = create_memo(move |_| {
                        slots::can_request_switch(&slots_state.get(), &slot_id)
                    });
                    let target = slot.slot_id.clone();
                    view! {
                        <div class=move || {
                            if is_active {
                                "bg-surface-elevated border-2 border-accent rounded-lg p-4 shadow"
                            } else {
                                "bg-surface-elevated border border-border rounded-lg p-4 shadow"
                            }
                        }>
                            <div class="flex justify-between items-center">
                                <h3 class="text-lg font-medium text-fg">{slot_name}</h3>
                                <Show when=move || is_active fallback=|| ()>
                                    <span class="text-xs font-semibold text-accent">"ACTIVE"</span>
                                </Show>
                            </div>
                            <p class="text-sm text-fg-muted mt-1">{format!("Slot #{}", slot_number)}</p>
                            <button
                                class="mt-3 w-full px-3 py-2 text-sm font-medium rounded-md text-action-primary-text bg-action-primary-bg hover:bg-action-primary-bg_hover disabled:opacity-50"
                                disabled=move || !switchable.get()
                                on:click=move |_| on_switch(target.clone())
                            >
                                {move || if switchable.get() { "Switch to this slot" } else { "Unavailable" }}
                            </button>
                        </div>
                    }
                }
            />
        </div>
    }
}

#[component]
fn BalancePanel(server_state: ReadSignal<server::ServerState>) -> impl IntoView {
    view! {
        <div class="mt-8 bg-surface-elevated shadow rounded-lg p-6">
            <h3 class="text-lg font-medium text-fg mb-4">
                {move || match server_state.get().server_name {
                    Some(name) => format!("Balances on {}", name),
                    None => "Balances".to_string(),
                }}
            </h3>
            <Show
                when=move || !server_state.get().balances.is_empty()
                fallback=move || view! {
                    <p class="text-sm text-fg-muted">
                        {move || server_state
                            .get()
                            .message
                            .unwrap_or_else(|| "No balances available.".to_string())}
                    </p>
                }
            >
                <ul class="divide-y divide-border">
                    {move || {
                        let state = server_state.get();
                        server::display_order(&state.balances)
                            .into_iter()
                            .map(|balance| view! {
                                <li class="py-2 flex justify-between text-sm">
                                    <span class="text-fg">{balance.currency_name.clone()}</span>
                                    <span class="text-fg-muted">{format!("{:.2}", balance.balance)}</span>
                                </li>
                            })
                            .collect_view()
                    }}
                </ul>
            </Show>
        </div>
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod host_tests {
    use super::*;
    use crate::api::CurrencyBalance;
    use crate::state::server::ServerState;
    use crate::test_support::ssr::render_to_string;

    #[test]
    fn balance_panel_lists_currencies_with_amounts() {
        let html = render_to_string(move || {
            let (state, _set) = create_signal(ServerState {
                server_name: Some("Raptor EU".into()),
                balances: vec![CurrencyBalance {
                    currency_id: "coin".into(),
                    currency_name: "Coin".into(),
                    currency_type: "soft".into(),
                    is_active: true,
                    balance: 42.5,
                }],
                ..Default::default()
            });
            view! { <BalancePanel server_state=state/> }
        });
        assert!(html.contains("Balances on Raptor EU"));
        assert!(html.contains("Coin"));
        assert!(html.contains("42.50"));
    }

    #[test]
    fn balance_panel_degrades_to_the_backend_message() {
        let html = render_to_string(move || {
            let (state, _set) = create_signal(ServerState {
                message: Some("balance backend down".into()),
                ..Default::default()
            });
            view! { <BalancePanel server_state=state/> }
        });
        assert!(html.contains("balance backend down"));
    }
}
