use crate::api::parse_item_fragment;
use crate::models::{Filter, Item};
use crate::notify::Toaster;
use crate::state::{close_if_editing, AppContext, EditSession};
use leptos::prelude::*;
use leptos::task::spawn_local;

// Pure list mutations. Every success callback funnels through one of
// these; an id that vanished in the meantime is a silent no-op.

pub(crate) fn apply_body(items: &mut [Item], id: u64, body: &str) -> bool {
    if let Some(i) = items.iter_mut().find(|i| i.id == id) {
        i.body = body.to_string();
        true
    } else {
        false
    }
}

pub(crate) fn apply_done(items: &mut [Item], id: u64, done: bool) -> bool {
    if let Some(i) = items.iter_mut().find(|i| i.id == id) {
        i.done = done;
        true
    } else {
        false
    }
}

pub(crate) fn remove_item(items: &mut Vec<Item>, id: u64) -> bool {
    let before = items.len();
    items.retain(|i| i.id != id);
    items.len() != before
}

pub(crate) fn remove_completed(items: &mut Vec<Item>) -> usize {
    let before = items.len();
    items.retain(|i| !i.done);
    before - items.len()
}

/// Gesture handlers for the item list.
///
/// Each follows validate → request → patch-model-on-success. The
/// model is only ever touched from a success path (the create input
/// clear being the one deliberate exception), so a failed request
/// leaves the list exactly as it was.
#[derive(Clone)]
pub(crate) struct ItemSync {
    app_state: AppContext,
    toaster: Toaster,
}

impl ItemSync {
    pub fn new(app_state: AppContext, toaster: Toaster) -> Self {
        Self { app_state, toaster }
    }

    /// Confirmed create gesture. The input clears before the request
    /// goes out so typing stays responsive; the list gains a node
    /// only once the server answers with the rendered fragment.
    pub fn create(&self, input: RwSignal<String>) {
        let value = input.get_untracked().trim().to_string();
        if value.is_empty() {
            return;
        }
        input.set(String::new());

        let api_client = self.app_state.0.api_client.get_untracked();
        let s2 = self.clone();
        spawn_local(async move {
            match api_client.new_item(&value).await {
                Ok(resp) => {
                    if let Some(item) = parse_item_fragment(&resp.html) {
                        s2.app_state.0.items.update(|items| items.push(item));
                    }
                    s2.toaster.show(resp.message);
                }
                Err(e) => s2.toaster.show(e.message),
            }
        });
    }

    /// Edit-intent on an item. Opening while another session is open
    /// replaces it, which structurally passes through closed.
    pub fn begin_edit(&self, id: u64) {
        let snapshot = self.app_state.0.items.with_untracked(|items| {
            items
                .iter()
                .find(|i| i.id == id)
                .map(|i| (i.body.clone(), i.href.clone()))
        });
        let Some((original_body, href)) = snapshot else {
            return;
        };

        self.app_state.0.edit.set(EditSession::Open {
            id,
            original_body,
            href,
        });
    }

    /// Confirm gesture for the open session. An empty trimmed value
    /// is ignored; cancel and blur are the request-free ways out.
    /// On failure the session stays open with the typed text intact.
    pub fn confirm_edit(&self, value: &str) {
        let value = value.trim().to_string();
        if value.is_empty() {
            return;
        }
        let EditSession::Open { id, href, .. } = self.app_state.0.edit.get_untracked() else {
            return;
        };

        let api_client = self.app_state.0.api_client.get_untracked();
        let s2 = self.clone();
        spawn_local(async move {
            match api_client.edit_item(&href, &value).await {
                Ok(resp) => {
                    s2.app_state.0.items.update(|items| {
                        apply_body(items, id, &value);
                    });
                    // Guarded close: the user may already be editing
                    // another item by the time this resolves.
                    s2.app_state.0.edit.update(|e| close_if_editing(e, id));
                    s2.toaster.show(resp.message);
                }
                Err(e) => s2.toaster.show(e.message),
            }
        });
    }

    pub fn cancel_edit(&self) {
        self.app_state.0.edit.set(EditSession::Closed);
    }

    /// Toggle-done. The target state is captured from the current
    /// flag before the request goes out, so the patch reflects the
    /// gesture's intent even when the response is slow.
    pub fn toggle(&self, id: u64) {
        let snapshot = self.app_state.0.items.with_untracked(|items| {
            items
                .iter()
                .find(|i| i.id == id)
                .map(|i| (i.href.clone(), !i.done))
        });
        let Some((href, target)) = snapshot else {
            return;
        };

        let api_client = self.app_state.0.api_client.get_untracked();
        let s2 = self.clone();
        spawn_local(async move {
            match api_client.toggle_item(&href).await {
                Ok(resp) => {
                    s2.app_state.0.items.update(|items| {
                        apply_done(items, id, target);
                    });
                    s2.toaster.show(resp.message);
                }
                Err(e) => s2.toaster.show(e.message),
            }
        });
    }

    /// Delete removes the node only after server confirmation.
    pub fn delete(&self, id: u64) {
        let href = self.app_state.0.items.with_untracked(|items| {
            items.iter().find(|i| i.id == id).map(|i| i.href.clone())
        });
        let Some(href) = href else {
            return;
        };

        let api_client = self.app_state.0.api_client.get_untracked();
        let s2 = self.clone();
        spawn_local(async move {
            match api_client.delete_item(&href).await {
                Ok(resp) => {
                    s2.app_state.0.items.update(|items| {
                        remove_item(items, id);
                    });
                    s2.toaster.show(resp.message);
                }
                Err(e) => s2.toaster.show(e.message),
            }
        });
    }

    /// Bulk clear. Nothing is removed before the confirmation comes
    /// back; the request is all-or-nothing.
    pub fn clear_completed(&self) {
        let api_client = self.app_state.0.api_client.get_untracked();
        let s2 = self.clone();
        spawn_local(async move {
            match api_client.clear_completed().await {
                Ok(resp) => {
                    s2.app_state.0.items.update(|items| {
                        remove_completed(items);
                    });
                    s2.toaster.show(resp.message);
                }
                Err(e) => s2.toaster.show(e.message),
            }
        });
    }

    /// Filters never touch the server.
    pub fn set_filter(&self, filter: Filter) {
        self.app_state.0.filter.set(filter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Counts;

    fn item(id: u64, done: bool) -> Item {
        Item {
            id,
            body: format!("item {id}"),
            done,
            href: format!("/item/{id}"),
        }
    }

    #[test]
    fn apply_body_patches_matching_item() {
        let mut items = vec![item(1, false), item(2, false)];
        assert!(apply_body(&mut items, 2, "Buy oat milk"));
        assert_eq!(items[1].body, "Buy oat milk");
        assert_eq!(items[0].body, "item 1");
    }

    #[test]
    fn apply_body_on_removed_item_is_a_no_op() {
        let mut items = vec![item(1, false)];
        assert!(!apply_body(&mut items, 9, "gone"));
        assert_eq!(items[0].body, "item 1");
    }

    #[test]
    fn apply_done_sets_target_state() {
        let mut items = vec![item(1, false)];
        assert!(apply_done(&mut items, 1, true));
        assert!(items[0].done);
    }

    #[test]
    fn apply_done_on_removed_item_is_a_no_op() {
        let mut items = vec![item(1, false)];
        assert!(!apply_done(&mut items, 9, true));
        assert!(!items[0].done);
    }

    #[test]
    fn sequential_double_toggle_restores_state() {
        let mut items = vec![item(1, false)];

        let first_target = !items[0].done;
        apply_done(&mut items, 1, first_target);
        let second_target = !items[0].done;
        apply_done(&mut items, 1, second_target);

        assert!(!items[0].done);
    }

    #[test]
    fn remove_item_drops_exactly_one() {
        let mut items = vec![item(1, false), item(2, true), item(3, false)];
        assert!(remove_item(&mut items, 2));
        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|i| i.id != 2));

        assert!(!remove_item(&mut items, 2));
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn remove_completed_keeps_active_items() {
        let mut items = vec![item(1, true), item(2, false), item(3, true)];
        assert_eq!(remove_completed(&mut items), 2);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, 2);
    }

    #[test]
    fn counts_stay_consistent_through_mutations() {
        let mut items = vec![];

        for id in 1..=5 {
            items.push(item(id, false));
            let c = Counts::of(&items);
            assert_eq!(c.all, c.active + c.completed);
        }

        apply_done(&mut items, 3, true);
        apply_done(&mut items, 4, true);
        remove_item(&mut items, 1);
        remove_completed(&mut items);

        let c = Counts::of(&items);
        assert_eq!(c.all, c.active + c.completed);
        assert_eq!(c.completed, 0);
        assert_eq!(c.all, 2);
    }
}
