use crate::api::parse_item_fragments;
use crate::notify::Toaster;
use crate::state::AppContext;
use leptos::ev;
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_dom::helpers::window_event_listener;

/// Logical page token derived from the URL fragment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub(crate) enum View {
    Intro,
    Login,
    App,
}

impl View {
    /// `""` and anything unrecognized resolve to the intro view.
    /// Unknown fragments are a fallback, not an error.
    pub fn from_fragment(raw: &str) -> Self {
        match raw.trim_start_matches('#') {
            "login" => View::Login,
            "app" => View::App,
            _ => View::Intro,
        }
    }
}

fn current_fragment() -> String {
    window().location().hash().unwrap_or_default()
}

/// Resolve and render `view`. The intro and app views perform their
/// server round-trip first and only swap on success; a failed fetch
/// leaves the current view in place and surfaces the error message.
pub(crate) fn dispatch(app_state: &AppContext, toaster: Toaster, view: View) {
    match view {
        View::Login => {
            // The login form is client-rendered; nothing to fetch.
            app_state.0.current_view.set(View::Login);
        }
        View::Intro => {
            let api_client = app_state.0.api_client.get_untracked();
            let state = app_state.clone();
            spawn_local(async move {
                match api_client.intro_fragment().await {
                    Ok(html) => {
                        state.0.intro_html.set(html);
                        state.0.current_view.set(View::Intro);
                    }
                    Err(e) => toaster.show(e.message),
                }
            });
        }
        View::App => {
            let api_client = app_state.0.api_client.get_untracked();
            let state = app_state.clone();
            spawn_local(async move {
                match api_client.app_fragment().await {
                    Ok(html) => {
                        state.0.items.set(parse_item_fragments(&html));
                        state.0.current_view.set(View::App);
                    }
                    Err(e) => toaster.show(e.message),
                }
            });
        }
    }
}

/// Point the browser at `view`. Writing an already-current fragment
/// emits no hashchange event, so that case re-dispatches manually.
pub(crate) fn navigate(app_state: &AppContext, toaster: Toaster, view: View) {
    let target = view.to_string();
    if current_fragment().trim_start_matches('#') == target {
        dispatch(app_state, toaster, view);
    } else {
        let _ = window().location().set_hash(&target);
    }
}

/// Wire the hashchange listener and perform the initial resolution.
pub(crate) fn install(app_state: AppContext, toaster: Toaster) {
    let listener_state = app_state.clone();
    let handle = window_event_listener(ev::hashchange, move |_ev: web_sys::HashChangeEvent| {
        let view = View::from_fragment(&current_fragment());
        dispatch(&listener_state, toaster, view);
    });

    // Router lives for the app lifetime; park the handle so the
    // listener is never torn down.
    StoredValue::new(handle);

    let fragment = current_fragment();
    if fragment.trim_start_matches('#').is_empty() {
        // Writing `#intro` fires the hashchange that performs the
        // first render, closing the loop through the listener.
        let _ = window().location().set_hash("intro");
    } else {
        // A non-empty initial fragment emits no event; resolve it
        // once by hand.
        dispatch(&app_state, toaster, View::from_fragment(&fragment));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_fragment_normalizes_to_intro() {
        assert_eq!(View::from_fragment(""), View::Intro);
        assert_eq!(View::from_fragment("#"), View::Intro);
    }

    #[test]
    fn known_fragments_resolve_directly() {
        assert_eq!(View::from_fragment("login"), View::Login);
        assert_eq!(View::from_fragment("app"), View::App);
        assert_eq!(View::from_fragment("intro"), View::Intro);
    }

    #[test]
    fn hash_prefix_is_stripped() {
        assert_eq!(View::from_fragment("#login"), View::Login);
        assert_eq!(View::from_fragment("#app"), View::App);
    }

    #[test]
    fn unknown_fragments_fall_back_to_intro() {
        assert_eq!(View::from_fragment("settings"), View::Intro);
        assert_eq!(View::from_fragment("#appp"), View::Intro);
        assert_eq!(View::from_fragment("LOGIN"), View::Intro);
    }

    #[test]
    fn view_tokens_render_lowercase() {
        assert_eq!(View::Intro.to_string(), "intro");
        assert_eq!(View::Login.as_ref(), "login");
        assert_eq!(View::App.to_string(), "app");
    }
}

// WASM-only tests (run with `cargo test --target wasm32-unknown-unknown` + wasm-bindgen-test-runner)
#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn fragment_roundtrip_through_location() {
        let _ = window().location().set_hash("app");
        assert_eq!(View::from_fragment(&current_fragment()), View::App);

        let _ = window().location().set_hash("intro");
        assert_eq!(View::from_fragment(&current_fragment()), View::Intro);
    }
}
