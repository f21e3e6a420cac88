use leptos::*;

#[component]
pub fn ForbiddenPage() -> impl IntoView {
    view! {
        <div class="min-h-screen bg-surface flex items-center justify-center">
            <div class="text-center">
                <h1 class="text-4xl font-extrabold text-fg">"403"</h1>
                <p class="mt-2 text-fg-muted">"You do not have access to this page."</p>
                <a href="/" class="mt-4 inline-block underline text-accent">"Back to dashboard"</a>
            </div>
        </div>
    }
}

#[component]
pub fn NotFoundPage() -> impl IntoView {
    view! {
        <div class="min-h-screen bg-surface flex items-center justify-center">
            <div class="text-center">
                <h1 class="text-4xl font-extrabold text-fg">"404"</h1>
                <p class="mt-2 text-fg-muted">"This page does not exist."</p>
                <a href="/" class="mt-4 inline-block underline text-accent">"Back to dashboard"</a>
            </div>
        </div>
    }
}
