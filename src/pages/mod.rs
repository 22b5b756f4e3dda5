use crate::components::ui::{
    Button, ButtonSize, ButtonVariant, Card, CardContent, CardDescription, CardHeader, CardTitle,
    Input, Label, Spinner,
};
use crate::models::{Counts, Filter, Item};
use crate::notify::Toaster;
use crate::route::{self, View};
use crate::state::item_sync::ItemSync;
use crate::state::{AppContext, EditSession};
use icons::{Check, Eye, EyeOff, Pencil, Trash2};
use leptos::html;
use leptos::prelude::*;
use leptos::task::spawn_local;

const MISSING_CREDENTIALS_MESSAGE: &str = "Please enter both username and password.";

/// The intro view renders the markup fetched on navigation; the
/// container's contents are replaced wholesale on each swap.
#[component]
pub fn IntroPage() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let intro_html = app_state.0.intro_html;

    view! {
        <div class="mx-auto w-full max-w-2xl px-4 py-10">
            <div class="fade-in" inner_html=move || intro_html.get()></div>
            <div class="mt-8">
                <a
                    href="#login"
                    class="bg-primary text-primary-foreground hover:bg-primary/90 inline-flex h-9 items-center justify-center rounded-md px-4 py-2 text-sm font-medium shadow-xs"
                >
                    "Get started"
                </a>
            </div>
        </div>
    }
}

#[component]
pub fn LoginPage() -> impl IntoView {
    let username: RwSignal<String> = RwSignal::new(String::new());
    let password: RwSignal<String> = RwSignal::new(String::new());
    let show_password: RwSignal<bool> = RwSignal::new(false);
    let loading: RwSignal<bool> = RwSignal::new(false);

    let app_state = expect_context::<AppContext>();
    let toaster = expect_context::<Toaster>();
    let app_state_sv = StoredValue::new(app_state);

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();

        let username_val = username.get_untracked();
        let password_val = password.get_untracked();

        if username_val.is_empty() || password_val.is_empty() {
            toaster.show(MISSING_CREDENTIALS_MESSAGE);
            return;
        }

        let state = app_state_sv.get_value();
        let api_client = state.0.api_client.get_untracked();
        loading.set(true);

        spawn_local(async move {
            match api_client.login(&username_val, &password_val).await {
                Ok(resp) => {
                    route::navigate(&state, toaster, View::App);
                    toaster.show(resp.message);
                }
                Err(e) => toaster.show(e.message),
            }
            loading.set(false);
        });
    };

    // Demo account: the server mints throwaway credentials and we
    // drop them straight into the form.
    let on_register = move |_| {
        let api_client = app_state_sv.with_value(|s| s.0.api_client.get_untracked());
        spawn_local(async move {
            match api_client.register().await {
                Ok(resp) => {
                    username.set(resp.username);
                    password.set(resp.password);
                    toaster.show(resp.message);
                }
                Err(e) => toaster.show(e.message),
            }
        });
    };

    view! {
        <div class="mx-auto flex w-full max-w-sm flex-col justify-center px-4 py-10">
            <Card>
                <CardHeader>
                    <CardTitle class="text-lg">"Log in"</CardTitle>
                    <CardDescription class="text-xs">
                        "Use your account, or grab a demo one below."
                    </CardDescription>
                </CardHeader>

                <CardContent>
                    <form class="flex flex-col gap-3" on:submit=on_submit>
                        <div class="flex flex-col gap-1.5">
                            <Label html_for="username-input" class="text-xs">"Username"</Label>
                            <Input
                                id="username-input"
                                placeholder="username"
                                autocomplete="off"
                                bind_value=username
                                class="h-8 text-sm"
                            />
                        </div>

                        <div class="flex flex-col gap-1.5">
                            <Label html_for="password-input" class="text-xs">"Password"</Label>
                            <div class="relative">
                                <input
                                    id="password-input"
                                    type=move || if show_password.get() { "text" } else { "password" }
                                    placeholder="password"
                                    autocomplete="off"
                                    class="placeholder:text-muted-foreground border-input flex h-8 w-full min-w-0 rounded-md border bg-transparent px-3 py-1 pr-9 text-sm shadow-xs outline-none focus-visible:border-ring focus-visible:ring-2 focus-visible:ring-ring/50"
                                    prop:value=move || password.get()
                                    on:input=move |ev| password.set(event_target_value(&ev))
                                />
                                <button
                                    type="button"
                                    id="toggle-password"
                                    class="text-muted-foreground hover:text-foreground absolute inset-y-0 right-2 inline-flex items-center"
                                    on:click=move |_| show_password.update(|v| *v = !*v)
                                >
                                    {move || {
                                        if show_password.get() {
                                            view! { <EyeOff class="size-4" /> }.into_any()
                                        } else {
                                            view! { <Eye class="size-4" /> }.into_any()
                                        }
                                    }}
                                </button>
                            </div>
                        </div>

                        <Button
                            class="w-full"
                            size=ButtonSize::Sm
                            attr:disabled=move || loading.get()
                        >
                            <span class="inline-flex items-center gap-2">
                                <Show when=move || loading.get() fallback=|| ().into_view()>
                                    <Spinner />
                                </Show>
                                {move || if loading.get() { "Logging in..." } else { "Log in" }}
                            </span>
                        </Button>

                        <Button
                            variant=ButtonVariant::Outline
                            size=ButtonSize::Sm
                            class="w-full"
                            attr:r#type="button"
                            on:click=on_register
                        >
                            "Get a demo account"
                        </Button>
                    </form>
                </CardContent>
            </Card>
        </div>
    }
}

#[component]
pub fn AppPage() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let toaster = expect_context::<Toaster>();
    let sync = expect_context::<ItemSync>();

    let items = app_state.0.items;
    let filter = app_state.0.filter;

    // Counts are a pure function of the list; nothing aggregate is
    // ever stored, so they cannot drift.
    let counts = Memo::new(move |_| Counts::of(&items.get()));

    let input_value: RwSignal<String> = RwSignal::new(String::new());
    let input_ref: NodeRef<html::Input> = NodeRef::new();

    let app_state_sv = StoredValue::new(app_state);
    let sync_sv = StoredValue::new(sync);

    let focus_input = move || {
        if let Some(el) = input_ref.get_untracked() {
            let _ = el.focus();
        }
    };

    let on_new_keydown = move |ev: web_sys::KeyboardEvent| {
        if ev.key() == "Enter" {
            sync_sv.with_value(|s| s.create(input_value));
        }
    };

    let on_clear = move |_| {
        focus_input();
        sync_sv.with_value(|s| s.clear_completed());
    };

    let on_logout = move |_| {
        let state = app_state_sv.get_value();
        let api_client = state.0.api_client.get_untracked();
        spawn_local(async move {
            match api_client.logout().await {
                Ok(resp) => {
                    route::navigate(&state, toaster, View::Intro);
                    toaster.show(resp.message);
                }
                Err(e) => toaster.show(e.message),
            }
        });
    };

    // Variant tracks the selected filter, so the tab re-renders when
    // it changes.
    let filter_tab = move |target: Filter, label: &'static str, count: Memo<usize>| {
        view! {
            {move || {
                let selected = filter.get() == target;
                view! {
                    <Button
                        variant=if selected { ButtonVariant::Default } else { ButtonVariant::Ghost }
                        size=ButtonSize::Sm
                        on:click=move |_| {
                            focus_input();
                            sync_sv.with_value(|s| s.set_filter(target));
                        }
                    >
                        {label}
                        <span class="bg-muted text-muted-foreground rounded px-1.5 text-xs">
                            {move || count.get()}
                        </span>
                    </Button>
                }
            }}
        }
    };

    let all_count = Memo::new(move |_| counts.get().all);
    let active_count = Memo::new(move |_| counts.get().active);
    let completed_count = Memo::new(move |_| counts.get().completed);

    view! {
        <div class="mx-auto w-full max-w-2xl px-4 py-8">
            <div class="mb-4 flex items-center justify-between">
                <div class="flex items-center gap-2">
                    <h1 class="text-xl font-semibold">"Quickdo"</h1>
                    <span
                        id="active-count-nav"
                        class="bg-primary text-primary-foreground rounded-full px-2 py-0.5 text-xs"
                    >
                        {move || active_count.get()}
                    </span>
                </div>
                <Button variant=ButtonVariant::Ghost size=ButtonSize::Sm on:click=on_logout>
                    "Log out"
                </Button>
            </div>

            <input
                node_ref=input_ref
                id="item-input"
                placeholder="What needs to be done?"
                autocomplete="off"
                class="placeholder:text-muted-foreground border-input mb-4 flex h-10 w-full min-w-0 rounded-md border bg-transparent px-3 py-1 text-base shadow-xs outline-none focus-visible:border-ring focus-visible:ring-2 focus-visible:ring-ring/50"
                prop:value=move || input_value.get()
                on:input=move |ev| input_value.set(event_target_value(&ev))
                on:keydown=on_new_keydown
            />

            <Show when=move || counts.get().dashboard_visible() fallback=|| ().into_view()>
                <div id="dashboard" class="mb-3 flex items-center justify-between gap-2 border-b pb-3">
                    <div class="flex items-center gap-1">
                        {filter_tab(Filter::All, "All", all_count)}
                        {filter_tab(Filter::Active, "Active", active_count)}
                        {filter_tab(Filter::Completed, "Completed", completed_count)}
                    </div>
                    <Button variant=ButtonVariant::Ghost size=ButtonSize::Sm on:click=on_clear>
                        "Clear completed"
                    </Button>
                </div>
            </Show>

            <ul class="items flex flex-col gap-2">
                {move || {
                    let filter_now = filter.get();
                    items
                        .get()
                        .into_iter()
                        .filter(|i| filter_now.admits(i))
                        .map(|item| view! { <ItemRow item=item input_ref=input_ref /> })
                        .collect_view()
                }}
            </ul>
        </div>
    }
}

#[component]
fn ItemRow(item: Item, input_ref: NodeRef<html::Input>) -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let sync = expect_context::<ItemSync>();
    let sync_sv = StoredValue::new(sync);

    let edit = app_state.0.edit;
    let id = item.id;
    let done = item.done;

    let edit_value: RwSignal<String> = RwSignal::new(String::new());
    let edit_ref: NodeRef<html::Input> = NodeRef::new();

    let is_editing = move || edit.get().open_id() == Some(id);

    // Seed and focus the inline editor once it is mounted for this
    // row, with the cursor at the end of the text.
    Effect::new(move |_| {
        let session = edit.get();
        if session.open_id() != Some(id) {
            return;
        }
        let Some(el) = edit_ref.get() else {
            return;
        };
        if let EditSession::Open { original_body, .. } = session {
            edit_value.set(original_body);
        }
        let _ = el.focus();
        let v = el.value();
        let pos = v.len() as u32;
        let _ = el.set_selection_range(pos, pos);
    });

    let on_toggle = move |_| {
        if let Some(el) = input_ref.get_untracked() {
            let _ = el.focus();
        }
        sync_sv.with_value(|s| s.toggle(id));
    };

    let on_edit_intent = move |_| {
        sync_sv.with_value(|s| s.begin_edit(id));
    };

    let on_delete = move |_| {
        if let Some(el) = input_ref.get_untracked() {
            let _ = el.focus();
        }
        sync_sv.with_value(|s| s.delete(id));
    };

    let display_body = item.body.clone();

    view! {
        <li
            class="item group flex items-center rounded-md border bg-card px-3 py-2"
            data-id=id.to_string()
            data-done=done.to_string()
            data-href=item.href.clone()
        >
            {move || {
                if is_editing() {
                    view! {
                        <input
                            node_ref=edit_ref
                            id="edit-item-input"
                            autocomplete="off"
                            class="border-input h-8 w-full min-w-0 flex-1 rounded-md border bg-transparent px-3 py-1 text-sm shadow-xs outline-none focus-visible:border-ring focus-visible:ring-2 focus-visible:ring-ring/50"
                            prop:value=move || edit_value.get()
                            on:input=move |ev| edit_value.set(event_target_value(&ev))
                            on:keydown=move |ev: web_sys::KeyboardEvent| {
                                match ev.key().as_str() {
                                    "Enter" => {
                                        sync_sv.with_value(|s| {
                                            s.confirm_edit(&edit_value.get_untracked())
                                        });
                                    }
                                    "Escape" => sync_sv.with_value(|s| s.cancel_edit()),
                                    _ => {}
                                }
                            }
                            on:blur=move |_| sync_sv.with_value(|s| s.cancel_edit())
                        />
                    }
                    .into_any()
                } else {
                    let body = display_body.clone();
                    view! {
                        <div class="flex w-full items-center gap-2">
                            <button
                                class="done-btn border-input text-primary inline-flex size-5 shrink-0 items-center justify-center rounded border"
                                on:click=on_toggle
                            >
                                {done.then(|| view! { <Check class="size-4" /> })}
                            </button>

                            <span
                                id=format!("body{id}")
                                class=if done {
                                    "inactive-item flex-1 text-sm text-muted-foreground line-through"
                                } else {
                                    "active-item flex-1 text-sm"
                                }
                            >
                                {body}
                            </span>

                            <div class="edit-btns ml-auto hidden items-center gap-1 group-hover:flex">
                                <Button
                                    variant=ButtonVariant::Ghost
                                    size=ButtonSize::Icon
                                    on:click=on_edit_intent
                                >
                                    <Pencil class="size-4" />
                                </Button>
                                <Button
                                    variant=ButtonVariant::Ghost
                                    size=ButtonSize::Icon
                                    on:click=on_delete
                                >
                                    <Trash2 class="size-4" />
                                </Button>
                            </div>
                        </div>
                    }
                    .into_any()
                }
            }}
        </li>
    }
}
