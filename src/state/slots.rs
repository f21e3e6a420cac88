//! Slot lifecycle: load, switch, cooldown. The backend owns the truth; this
//! state machine tracks the last reconciled view plus the transient phases a
//! switch passes through.

use leptos::*;

use crate::api::{ApiClient, ApiError, ApiErrorKind, Slot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SlotsPhase {
    #[default]
    Loading,
    Loaded,
    SwitchPending,
    CooldownBlocked,
    NoLinkedIdentity,
    Error,
}

#[derive(Debug, Clone, Default)]
pub struct SlotsState {
    pub phase: SlotsPhase,
    pub slots: Vec<Slot>,
    /// Server-reported wait after a 429, counted down locally.
    pub cooldown_remaining: u32,
    pub message: Option<String>,
    /// Set when the fetched slot set violates the at-most-one-active rule;
    /// surfaced, never silently repaired.
    pub inconsistent: bool,
}

pub fn use_slots() -> (ReadSignal<SlotsState>, WriteSignal<SlotsState>) {
    match use_context::<(ReadSignal<SlotsState>, WriteSignal<SlotsState>)>() {
        Some(ctx) => ctx,
        None => {
            let ctx = create_signal(SlotsState::default());
            provide_context(ctx);
            ctx
        }
    }
}

pub fn active_slot_id(slots: &[Slot]) -> Option<&str> {
    slots
        .iter()
        .find(|slot| slot.is_active)
        .map(|slot| slot.slot_id.as_str())
}

/// A healthy slot set has exactly one active slot.
pub fn check_consistency(slots: &[Slot]) -> Result<(), String> {
    match slots.iter().filter(|slot| slot.is_active).count() {
        1 => Ok(()),
        0 => Err("No active slot reported by the server".to_string()),
        n => Err(format!("{} slots reported active at once", n)),
    }
}

/// Optimistic local flip: target becomes the only active slot.
pub fn apply_switch(slots: &mut [Slot], new_active_slot_id: &str) {
    for slot in slots.iter_mut() {
        slot.is_active = slot.slot_id == new_active_slot_id;
    }
}

/// A switch request is a silent no-op when the target is already active, a
/// switch is in flight, or the cooldown has not expired.
pub fn can_request_switch(state: &SlotsState, target_slot_id: &str) -> bool {
    if state.phase == SlotsPhase::SwitchPending {
        return false;
    }
    if state.phase == SlotsPhase::CooldownBlocked && state.cooldown_remaining > 0 {
        return false;
    }
    active_slot_id(&state.slots) != Some(target_slot_id)
}

/// One countdown step. Returns true once the cooldown has fully expired and
/// switching is allowed again. The timer is local only: it never re-polls the
/// backend, it just gates the action until the reported wait has elapsed.
pub fn tick_cooldown(state: &mut SlotsState) -> bool {
    if state.cooldown_remaining > 0 {
        state.cooldown_remaining -= 1;
    }
    if state.cooldown_remaining == 0 {
        if state.phase == SlotsPhase::CooldownBlocked {
            state.phase = SlotsPhase::Loaded;
        }
        true
    } else {
        false
    }
}

#[cfg(target_arch = "wasm32")]
pub fn spawn_cooldown_countdown(set_state: WriteSignal<SlotsState>) {
    spawn_local(async move {
        loop {
            gloo_timers::future::TimeoutFuture::new(1_000).await;
            let mut finished = false;
            set_state.update(|state| {
                finished = tick_cooldown(state);
            });
            if finished {
                break;
            }
        }
    });
}

pub async fn load_slots(
    api: &ApiClient,
    set_state: WriteSignal<SlotsState>,
    server_id: &str,
) -> Result<(), ApiError> {
    set_state.update(|state| {
        state.phase = SlotsPhase::Loading;
        state.message = None;
    });
    match api.get_user_slots(server_id).await {
        Ok(response) => {
            let slots = response.into_slots();
            let consistency = check_consistency(&slots);
            set_state.update(|state| {
                state.slots = slots;
                state.phase = SlotsPhase::Loaded;
                state.inconsistent = consistency.is_err();
                state.message = consistency.err();
            });
            Ok(())
        }
        Err(error) => {
            set_state.update(|state| {
                state.phase = if error.kind == ApiErrorKind::NoLinkedIdentity {
                    SlotsPhase::NoLinkedIdentity
                } else {
                    SlotsPhase::Error
                };
                state.message = Some(error.message.clone());
            });
            Err(error)
        }
    }
}

/// Returns the backend's confirmation message, or `None` when the request
/// was dropped as a no-op.
pub async fn change_slot(
    api: &ApiClient,
    state: ReadSignal<SlotsState>,
    set_state: WriteSignal<SlotsState>,
    server_id: &str,
    target_slot_id: &str,
) -> Result<Option<String>, ApiError> {
    let snapshot = state.get_untracked();
    if !can_request_switch(&snapshot, target_slot_id) {
        return Ok(None);
    }

    set_state.update(|s| {
        s.phase = SlotsPhase::SwitchPending;
        s.message = None;
    });

    match api.change_slot(server_id, target_slot_id).await {
        Ok(response) => {
            let new_active = response
                .data
                .as_ref()
                .map(|data| data.new_active_slot_id.clone())
                .unwrap_or_else(|| target_slot_id.to_string());
            set_state.update(|s| {
                apply_switch(&mut s.slots, &new_active);
                s.cooldown_remaining = 0;
            });
            // Reconcile against the server's view.
            load_slots(api, set_state, server_id).await?;
            Ok(Some(response.message))
        }
        Err(error) => {
            match error.kind {
                ApiErrorKind::Cooldown => {
                    let remaining = error.cooldown_seconds().unwrap_or(0);
                    set_state.update(|s| {
                        s.phase = SlotsPhase::CooldownBlocked;
                        s.cooldown_remaining = remaining;
                        s.message = Some(error.message.clone());
                    });
                }
                ApiErrorKind::Conflict => {
                    // Another client already switched; the backend view is
                    // authoritative, the local set stays untouched.
                    set_state.update(|s| {
                        s.phase = SlotsPhase::Loaded;
                        s.message = Some(error.message.clone());
                    });
                }
                _ => {
                    set_state.update(|s| {
                        s.phase = SlotsPhase::Error;
                        s.message = Some(error.message.clone());
                    });
                }
            }
            Err(error)
        }
    }
}
