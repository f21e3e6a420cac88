//! Toast notifications. Errors route through `push_api_error`, which honors
//! the one suppression rule: an expired session redirects to login instead of
//! toasting.

use leptos::*;

use crate::api::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub id: u64,
    pub level: ToastLevel,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct ToastState {
    pub toasts: Vec<Toast>,
    next_id: u64,
}

impl ToastState {
    pub fn push(&mut self, level: ToastLevel, message: impl Into<String>) {
        self.next_id += 1;
        self.toasts.push(Toast {
            id: self.next_id,
            level,
            message: message.into(),
        });
    }

    pub fn dismiss(&mut self, id: u64) {
        self.toasts.retain(|toast| toast.id != id);
    }
}

pub fn use_toasts() -> (ReadSignal<ToastState>, WriteSignal<ToastState>) {
    match use_context::<(ReadSignal<ToastState>, WriteSignal<ToastState>)>() {
        Some(ctx) => ctx,
        None => {
            let ctx = create_signal(ToastState::default());
            provide_context(ctx);
            ctx
        }
    }
}

fn push_toast(set_toasts: WriteSignal<ToastState>, level: ToastLevel, message: String) {
    let mut pushed_id = 0;
    set_toasts.update(|state| {
        state.push(level, message);
        pushed_id = state.next_id;
    });
    schedule_dismiss(set_toasts, pushed_id);
}

#[cfg(target_arch = "wasm32")]
fn schedule_dismiss(set_toasts: WriteSignal<ToastState>, id: u64) {
    const AUTO_DISMISS_MS: u32 = 5_000;
    leptos::spawn_local(async move {
        gloo_timers::future::TimeoutFuture::new(AUTO_DISMISS_MS).await;
        set_toasts.update(|state| state.dismiss(id));
    });
}

#[cfg(not(target_arch = "wasm32"))]
fn schedule_dismiss(_set_toasts: WriteSignal<ToastState>, _id: u64) {}

pub fn push_info(set_toasts: WriteSignal<ToastState>, message: impl Into<String>) {
    push_toast(set_toasts, ToastLevel::Info, message.into());
}

pub fn push_success(set_toasts: WriteSignal<ToastState>, message: impl Into<String>) {
    push_toast(set_toasts, ToastLevel::Success, message.into());
}

/// Returns true when a toast was shown. Auth-required errors never toast:
/// their recovery is the login redirect, and a toast over a navigating page
/// is noise.
pub fn push_api_error(set_toasts: WriteSignal<ToastState>, error: &ApiError) -> bool {
    if !error.should_toast() {
        return false;
    }
    push_toast(set_toasts, ToastLevel::Error, error.message.clone());
    true
}
