pub(crate) mod item_sync;

use crate::api::ApiClient;
use crate::models::{Filter, Item};
use crate::route::View;
use leptos::prelude::*;

/// Edit state for the list.
///
/// At most one session can be open because the whole thing is one
/// value: beginning a new edit replaces, and thereby closes, whatever
/// was open before.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub(crate) enum EditSession {
    #[default]
    Closed,
    Open {
        id: u64,
        original_body: String,
        href: String,
    },
}

impl EditSession {
    pub fn open_id(&self) -> Option<u64> {
        match self {
            Self::Open { id, .. } => Some(*id),
            Self::Closed => None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open_id().is_some()
    }
}

/// Close the session only if it still targets `id`. A stale success
/// callback must not tear down an edit the user started afterwards.
pub(crate) fn close_if_editing(edit: &mut EditSession, id: u64) {
    if edit.open_id() == Some(id) {
        *edit = EditSession::Closed;
    }
}

#[derive(Clone)]
pub(crate) struct AppState {
    pub api_client: RwSignal<ApiClient>,

    /// Which of the three views the main container renders.
    pub current_view: RwSignal<View>,

    /// Intro markup fetched on navigation; swapped in wholesale.
    pub intro_html: RwSignal<String>,

    /// The list itself. Counts and dashboard visibility derive from
    /// it on every read; nothing aggregate is stored.
    pub items: RwSignal<Vec<Item>>,

    pub filter: RwSignal<Filter>,
    pub edit: RwSignal<EditSession>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            api_client: RwSignal::new(ApiClient::from_env()),
            current_view: RwSignal::new(View::Intro),
            intro_html: RwSignal::new(String::new()),
            items: RwSignal::new(vec![]),
            filter: RwSignal::new(Filter::default()),
            edit: RwSignal::new(EditSession::Closed),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone)]
pub(crate) struct AppContext(pub AppState);

#[cfg(test)]
mod tests {
    use super::*;

    fn open(id: u64) -> EditSession {
        EditSession::Open {
            id,
            original_body: "body".to_string(),
            href: format!("/item/{id}"),
        }
    }

    #[test]
    fn edit_session_defaults_closed() {
        assert_eq!(EditSession::default(), EditSession::Closed);
        assert!(!EditSession::Closed.is_open());
    }

    #[test]
    fn open_session_reports_its_target() {
        assert_eq!(open(4).open_id(), Some(4));
        assert!(open(4).is_open());
    }

    #[test]
    fn close_if_editing_matching_id() {
        let mut edit = open(4);
        close_if_editing(&mut edit, 4);
        assert_eq!(edit, EditSession::Closed);
    }

    #[test]
    fn stale_close_leaves_newer_session_alone() {
        // A late success for item 4 arrives after the user moved on
        // to editing item 9.
        let mut edit = open(9);
        close_if_editing(&mut edit, 4);
        assert_eq!(edit.open_id(), Some(9));
    }

    #[test]
    fn close_on_closed_is_a_no_op() {
        let mut edit = EditSession::Closed;
        close_if_editing(&mut edit, 1);
        assert_eq!(edit, EditSession::Closed);
    }
}
