use crate::notify::{ToastViewport, Toaster};
use crate::pages::{AppPage, IntroPage, LoginPage};
use crate::route::{self, View};
use crate::state::item_sync::ItemSync;
use crate::state::{AppContext, AppState};
use leptos::prelude::*;

#[component]
pub fn App() -> impl IntoView {
    let app_state = AppContext(AppState::new());
    let toaster = Toaster::new();

    provide_context(app_state.clone());
    provide_context(toaster);
    provide_context(ItemSync::new(app_state.clone(), toaster));

    // Hash routing: wire the hashchange listener and resolve the
    // initial fragment.
    route::install(app_state.clone(), toaster);

    let current_view = app_state.0.current_view;

    view! {
        <main id="main" class="bg-background text-foreground min-h-screen">
            {move || match current_view.get() {
                View::Intro => view! { <IntroPage /> }.into_any(),
                View::Login => view! { <LoginPage /> }.into_any(),
                View::App => view! { <AppPage /> }.into_any(),
            }}
            <ToastViewport />
        </main>
    }
}
