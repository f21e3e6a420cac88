//! Per-server currency balances shown next to the slot view.

use leptos::*;

use crate::api::{ApiClient, ApiError, CurrencyBalance};

#[derive(Debug, Clone, Default)]
pub struct ServerState {
    pub server_name: Option<String>,
    pub balances: Vec<CurrencyBalance>,
    pub loading: bool,
    pub message: Option<String>,
}

pub fn use_server() -> (ReadSignal<ServerState>, WriteSignal<ServerState>) {
    match use_context::<(ReadSignal<ServerState>, WriteSignal<ServerState>)>() {
        Some(ctx) => ctx,
        None => {
            let ctx = create_signal(ServerState::default());
            provide_context(ctx);
            ctx
        }
    }
}

/// Balances are auxiliary: a failed fetch leaves the slot view usable and
/// shows an empty balance list with the mapped error message.
pub async fn load_balances(
    api: &ApiClient,
    set_state: WriteSignal<ServerState>,
    server_id: &str,
) -> Result<(), ApiError> {
    set_state.update(|state| state.loading = true);
    match api.get_server_balance(server_id).await {
        Ok(response) => {
            set_state.update(|state| {
                state.server_name = response.server_name;
                state.balances = response.balances;
                state.loading = false;
                state.message = None;
            });
            Ok(())
        }
        Err(error) => {
            set_state.update(|state| {
                state.balances.clear();
                state.loading = false;
                state.message = Some(error.message.clone());
            });
            Err(error)
        }
    }
}

/// Active currencies first, then by name, for a stable display order.
pub fn display_order(balances: &[CurrencyBalance]) -> Vec<&CurrencyBalance> {
    let mut ordered: Vec<&CurrencyBalance> = balances.iter().collect();
    ordered.sort_by(|a, b| {
        b.is_active
            .cmp(&a.is_active)
            .then_with(|| a.currency_name.cmp(&b.currency_name))
    });
    ordered
}


#[cfg(all(test, not(target_arch = "wasm32")))]
mod host_tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    #[tokio::test]
    async fn failed_balance_fetch_degrades_to_an_empty_list() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/api/servers/srv-1/balance");
            then.status(500).json_body(json!({"message": "balance backend down"}));
        });

        let api = ApiClient::new_with_base_url(server.url("/api")).with_token("tok");
        let runtime = create_runtime();
        let (state, set_state) = create_signal(ServerState {
            balances: vec![CurrencyBalance {
                currency_id: "coin".to_string(),
                currency_name: "Coin".to_string(),
                currency_type: "soft".to_string(),
                is_active: true,
                balance: 1.0,
            }],
            ..Default::default()
        });

        let error = load_balances(&api, set_state, "srv-1").await.unwrap_err();
        // 5xx bodies are never surfaced verbatim; the mapper genericizes them.
        assert_eq!(error.message, "Server error, please try again later");

        let snapshot = state.get_untracked();
        assert!(snapshot.balances.is_empty());
        assert!(!snapshot.loading);
        assert_eq!(
            snapshot.message.as_deref(),
            Some("Server error, please try again later")
        );
        runtime.dispose();
    }

    #[tokio::test]
    async fn balances_load_with_server_name() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/api/servers/srv-1/balance");
            then.status(200).json_body(json!({
                "server_name": "Raptor EU",
                "balances": [{
                    "currency_id": "coin",
                    "currency_name": "Coin",
                    "currency_type": "soft",
                    "is_active": true,
                    "balance": 42.5
                }]
            }));
        });

        let api = ApiClient::new_with_base_url(server.url("/api")).with_token("tok");
        let runtime = create_runtime();
        let (state, set_state) = create_signal(ServerState::default());

        load_balances(&api, set_state, "srv-1").await.unwrap();
        let snapshot = state.get_untracked();
        assert_eq!(snapshot.server_name.as_deref(), Some("Raptor EU"));
        assert_eq!(snapshot.balances.len(), 1);
        assert_eq!(snapshot.balances[0].balance, 42.5);
        runtime.dispose();
    }
}
