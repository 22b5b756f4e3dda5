use crate::components::ui::{Alert, AlertDescription};
use leptos::prelude::*;
use wasm_bindgen::JsCast;

const TOAST_DISMISS_MS: i32 = 4000;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Toast {
    pub id: u64,
    pub message: String,
}

/// Transient notification queue. Every server response message lands
/// here, success and failure alike; nothing is classified or retried.
#[derive(Clone, Copy)]
pub(crate) struct Toaster {
    toasts: RwSignal<Vec<Toast>>,
    next_id: RwSignal<u64>,
}

impl Toaster {
    pub fn new() -> Self {
        Self {
            toasts: RwSignal::new(vec![]),
            next_id: RwSignal::new(0),
        }
    }

    pub fn show(&self, message: impl Into<String>) {
        let id = self.next_id.get_untracked();
        self.next_id.set(id + 1);
        self.toasts.update(|t| {
            t.push(Toast {
                id,
                message: message.into(),
            })
        });
        self.schedule_dismiss(id);
    }

    pub fn dismiss(&self, id: u64) {
        self.toasts.update(|t| t.retain(|toast| toast.id != id));
    }

    fn schedule_dismiss(&self, id: u64) {
        let Some(win) = web_sys::window() else {
            return;
        };

        let s2 = *self;
        let cb = wasm_bindgen::closure::Closure::once_into_js(move || {
            s2.dismiss(id);
        });

        let _ = win.set_timeout_with_callback_and_timeout_and_arguments_0(
            cb.as_ref().unchecked_ref(),
            TOAST_DISMISS_MS,
        );
    }
}

#[component]
pub fn ToastViewport() -> impl IntoView {
    let toaster = expect_context::<Toaster>();

    view! {
        <div class="pointer-events-none fixed bottom-4 right-4 z-50 flex w-80 flex-col gap-2">
            {move || {
                toaster
                    .toasts
                    .get()
                    .into_iter()
                    .map(|t| {
                        let id = t.id;
                        view! {
                            <Alert
                                class="pointer-events-auto cursor-pointer bg-card text-card-foreground shadow-md"
                                on:click=move |_| toaster.dismiss(id)
                            >
                                <AlertDescription>{t.message}</AlertDescription>
                            </Alert>
                        }
                    })
                    .collect_view()
            }}
        </div>
    }
}
