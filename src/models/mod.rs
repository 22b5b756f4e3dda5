use serde::{Deserialize, Serialize};

/// A single to-do entry as the server hands it out.
///
/// `href` is the item's mutation resource URL; edit, toggle and
/// delete all target it and are distinguished by HTTP method.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub(crate) struct Item {
    pub id: u64,
    pub body: String,
    pub done: bool,
    pub href: String,
}

/// Visibility filter over the already-loaded list.
///
/// Transient view state: switching filters never touches the server
/// and is never persisted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub(crate) enum Filter {
    #[default]
    All,
    Active,
    Completed,
}

impl Filter {
    pub fn admits(self, item: &Item) -> bool {
        match self {
            Filter::All => true,
            Filter::Active => !item.done,
            Filter::Completed => item.done,
        }
    }
}

/// Aggregate counts. Always derived from the current list, never
/// stored independently.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub(crate) struct Counts {
    pub all: usize,
    pub active: usize,
    pub completed: usize,
}

impl Counts {
    pub fn of(items: &[Item]) -> Self {
        let completed = items.iter().filter(|i| i.done).count();
        Self {
            all: items.len(),
            active: items.len() - completed,
            completed,
        }
    }

    /// The dashboard (summary/filter bar) only shows once there is
    /// something to summarize.
    pub fn dashboard_visible(self) -> bool {
        self.all > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: u64, done: bool) -> Item {
        Item {
            id,
            body: format!("item {id}"),
            done,
            href: format!("/item/{id}"),
        }
    }

    #[test]
    fn counts_split_by_done_flag() {
        let items = vec![item(1, false), item(2, true), item(3, false)];
        let c = Counts::of(&items);
        assert_eq!(c.all, 3);
        assert_eq!(c.active, 2);
        assert_eq!(c.completed, 1);
    }

    #[test]
    fn counts_always_sum() {
        // all == active + completed regardless of list shape
        for done_mask in 0u8..16 {
            let items: Vec<Item> = (0..4)
                .map(|i| item(i, done_mask & (1 << i) != 0))
                .collect();
            let c = Counts::of(&items);
            assert_eq!(c.all, c.active + c.completed);
        }
    }

    #[test]
    fn dashboard_follows_item_presence() {
        assert!(!Counts::of(&[]).dashboard_visible());
        assert!(Counts::of(&[item(1, true)]).dashboard_visible());
    }

    #[test]
    fn filter_admits_by_done_flag() {
        let open = item(1, false);
        let closed = item(2, true);

        assert!(Filter::All.admits(&open));
        assert!(Filter::All.admits(&closed));
        assert!(Filter::Active.admits(&open));
        assert!(!Filter::Active.admits(&closed));
        assert!(!Filter::Completed.admits(&open));
        assert!(Filter::Completed.admits(&closed));
    }

    #[test]
    fn filter_labels_are_lowercase() {
        assert_eq!(Filter::All.to_string(), "all");
        assert_eq!(Filter::Completed.as_ref(), "completed");
    }
}
