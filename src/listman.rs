//! Generic list state: one collection, a debounced search term, cumulative
//! "load more" pagination, a cursor and a single nullable selection.
//!
//! The same machine drives every resource tab; it is instantiated once per
//! [`Resource`] type. Derivations are pure: `filtered()` is always a subset
//! of the collection, `visible()` a prefix-subset of `filtered()`, and an
//! active search term suspends pagination entirely (all matches are shown).

use std::time::{Duration, Instant};

use crate::resource::Resource;

/// Quiet period before a typed search term takes effect.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

/// Records revealed per "load more" step.
pub const DEFAULT_PAGE_SIZE: usize = 9;

pub struct ListManager<T: Resource> {
    items: Vec<T>,
    /// What the search box shows; updates on every keystroke.
    query_input: String,
    /// The effective (debounced, trimmed, lowercased) term.
    query: String,
    /// Set on each keystroke; the term applies once it has been quiet for
    /// [`SEARCH_DEBOUNCE`]. Only the latest edit in a burst fires.
    pending_since: Option<Instant>,
    page: usize,
    page_size: usize,
    cursor: usize,
    selected: Option<String>,
}

impl<T: Resource> ListManager<T> {
    pub fn new() -> Self {
        Self::with_page_size(DEFAULT_PAGE_SIZE)
    }

    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            items: Vec::new(),
            query_input: String::new(),
            query: String::new(),
            pending_since: None,
            page: 1,
            page_size: page_size.max(1),
            cursor: 0,
            selected: None,
        }
    }

    /// Replace the collection (initial fetch or explicit refresh). Records
    /// are ordered newest first by `createdAt`, falling back to the id for
    /// records predating the timestamp column. Pagination resets; the
    /// selection survives only if the id is still present.
    pub fn set_items(&mut self, mut items: Vec<T>) {
        items.sort_by(|a, b| match (b.created_at(), a.created_at()) {
            (Some(x), Some(y)) => x.cmp(&y),
            // records lacking a timestamp sort after timestamped ones
            (Some(_), None) => std::cmp::Ordering::Greater,
            (None, Some(_)) => std::cmp::Ordering::Less,
            (None, None) => b.id().cmp(a.id()),
        });
        self.items = items;
        self.page = 1;
        self.cursor = 0;
        if let Some(id) = &self.selected {
            if !self.items.iter().any(|r| r.id() == id) {
                self.selected = None;
            }
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    // --- search -----------------------------------------------------------

    pub fn query_input(&self) -> &str {
        &self.query_input
    }

    /// The term currently affecting derived state.
    pub fn effective_query(&self) -> &str {
        &self.query
    }

    /// Update the search box. The effective term lags by the debounce
    /// window; `now` is injected so the timer is testable.
    pub fn set_query_input(&mut self, input: String, now: Instant) {
        self.query_input = input;
        self.pending_since = Some(now);
    }

    /// Clear both the box and the effective term immediately (Esc).
    pub fn clear_query(&mut self) {
        self.query_input.clear();
        self.pending_since = None;
        if !self.query.is_empty() {
            self.query.clear();
            self.page = 1;
            self.cursor = 0;
        }
    }

    /// Advance the debounce timer. Returns `true` when the effective term
    /// changed (which also resets pagination to page 1).
    pub fn tick(&mut self, now: Instant) -> bool {
        let Some(since) = self.pending_since else {
            return false;
        };
        if now.duration_since(since) < SEARCH_DEBOUNCE {
            return false;
        }
        self.pending_since = None;
        let effective = self.query_input.trim().to_lowercase();
        if effective == self.query {
            return false;
        }
        self.query = effective;
        self.page = 1;
        self.cursor = 0;
        true
    }

    /// Subset of the collection matching the effective term, order
    /// preserved. An empty term is the identity.
    pub fn filtered(&self) -> Vec<&T> {
        if self.query.is_empty() {
            self.items.iter().collect()
        } else {
            self.items.iter().filter(|r| r.matches(&self.query)).collect()
        }
    }

    // --- pagination -------------------------------------------------------

    pub fn page(&self) -> usize {
        self.page
    }

    /// What the table renders. While a search term is active this is the
    /// entire filtered view; otherwise the cumulative first
    /// `page * page_size` records.
    pub fn visible(&self) -> Vec<&T> {
        let filtered = self.filtered();
        if !self.query.is_empty() {
            return filtered;
        }
        let cap = self.page.saturating_mul(self.page_size).min(filtered.len());
        filtered.into_iter().take(cap).collect()
    }

    /// Whether "load more" would reveal anything. Always `false` while a
    /// search term is active.
    pub fn has_more(&self) -> bool {
        if !self.query.is_empty() {
            return false;
        }
        self.page * self.page_size < self.filtered().len()
    }

    pub fn load_more(&mut self) {
        if self.has_more() {
            self.page += 1;
        }
    }

    // --- cursor -----------------------------------------------------------

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn move_up(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
        }
    }

    pub fn move_down(&mut self) {
        if self.cursor + 1 < self.visible().len() {
            self.cursor += 1;
        }
    }

    pub fn jump(&mut self, step: isize) {
        let len = self.visible().len();
        if len == 0 {
            self.cursor = 0;
            return;
        }
        let next = self.cursor as isize + step;
        self.cursor = next.clamp(0, len as isize - 1) as usize;
    }

    /// Record under the cursor, if any.
    pub fn cursor_record(&self) -> Option<&T> {
        self.visible().get(self.cursor).copied()
    }

    // --- selection --------------------------------------------------------

    pub fn selected_id(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Live lookup of the selected record in the current collection, so
    /// background mutations are reflected on the next render.
    pub fn selected_record(&self) -> Option<&T> {
        let id = self.selected.as_deref()?;
        self.items.iter().find(|r| r.id() == id)
    }

    /// Toggle semantics: selecting the selected id deselects; selecting a
    /// different id replaces (never accumulates).
    pub fn toggle_select(&mut self, id: &str) {
        if self.selected.as_deref() == Some(id) {
            self.selected = None;
        } else {
            self.selected = Some(id.to_string());
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    // --- reconciliation ---------------------------------------------------

    /// Splice a server-returned record over the matching collection entry.
    /// The server's object is the source of truth for that one record; no
    /// refetch happens.
    pub fn apply_saved(&mut self, updated: T) {
        match self.items.iter().position(|r| r.id() == updated.id()) {
            Some(idx) => self.items[idx] = updated,
            None => self.items.insert(0, updated),
        }
    }

    /// Prepend a freshly created record.
    pub fn prepend(&mut self, record: T) {
        self.items.insert(0, record);
    }

    /// Prepend a batch (bulk-import successes), keeping the batch's order.
    pub fn prepend_many(&mut self, records: Vec<T>) {
        for record in records.into_iter().rev() {
            self.items.insert(0, record);
        }
    }

    /// Remove exactly the record with the given id, preserving the relative
    /// order of the rest. Clears the selection when it pointed there.
    pub fn remove(&mut self, id: &str) -> bool {
        let Some(idx) = self.items.iter().position(|r| r.id() == id) else {
            return false;
        };
        self.items.remove(idx);
        if self.selected.as_deref() == Some(id) {
            self.selected = None;
        }
        let len = self.visible().len();
        if self.cursor >= len {
            self.cursor = len.saturating_sub(1);
        }
        true
    }
}

impl<T: Resource> Default for ListManager<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Customer;

    fn customer(id: &str, name: &str) -> Customer {
        Customer {
            customer_id: id.to_string(),
            name: name.to_string(),
            ..Customer::default()
        }
    }

    fn manager_with(n: usize, page_size: usize) -> ListManager<Customer> {
        let mut lm = ListManager::with_page_size(page_size);
        lm.set_items((0..n).map(|i| customer(&format!("c{i:02}"), &format!("rec {i}"))).collect());
        lm
    }

    fn apply_query(lm: &mut ListManager<Customer>, q: &str) {
        let t0 = Instant::now();
        lm.set_query_input(q.to_string(), t0);
        assert!(lm.tick(t0 + SEARCH_DEBOUNCE));
    }

    #[test]
    fn empty_term_is_identity_and_matches_are_subsets() {
        let mut lm = ListManager::new();
        lm.set_items(vec![customer("1", "Alice"), customer("2", "Bob")]);
        assert_eq!(lm.filtered().len(), 2);

        apply_query(&mut lm, "ali");
        let filtered = lm.filtered();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].name, "Alice");
    }

    #[test]
    fn debounce_applies_only_after_quiet_window() {
        let mut lm = ListManager::new();
        lm.set_items(vec![customer("1", "Alice"), customer("2", "Bob")]);

        let t0 = Instant::now();
        lm.set_query_input("a".into(), t0);
        lm.set_query_input("al".into(), t0 + Duration::from_millis(100));
        // 250 ms after the *last* keystroke: still pending
        assert!(!lm.tick(t0 + Duration::from_millis(350)));
        assert_eq!(lm.effective_query(), "");
        // past the window: applies, and the page resets
        lm.load_more();
        assert!(lm.tick(t0 + Duration::from_millis(450)));
        assert_eq!(lm.effective_query(), "al");
        assert_eq!(lm.page(), 1);
    }

    #[test]
    fn effective_term_is_trimmed_and_lowercased() {
        let mut lm = ListManager::new();
        lm.set_items(vec![customer("1", "Alice")]);
        apply_query(&mut lm, "  ALI  ");
        assert_eq!(lm.effective_query(), "ali");
        assert_eq!(lm.filtered().len(), 1);
    }

    #[test]
    fn cumulative_pagination_caps_at_collection_length() {
        let mut lm = manager_with(20, 9);
        assert_eq!(lm.visible().len(), 9);
        assert!(lm.has_more());
        lm.load_more();
        assert_eq!(lm.visible().len(), 18);
        lm.load_more();
        assert_eq!(lm.visible().len(), 20);
        assert!(!lm.has_more());
        // guard: a further load_more is a no-op
        lm.load_more();
        assert_eq!(lm.page(), 3);
    }

    #[test]
    fn visible_is_a_prefix_of_filtered() {
        let lm = manager_with(20, 9);
        let filtered = lm.filtered();
        let visible = lm.visible();
        assert_eq!(visible.len(), 9);
        for (v, f) in visible.iter().zip(filtered.iter()) {
            assert_eq!(v.id(), f.id());
        }
    }

    #[test]
    fn search_suspends_pagination_and_shows_all_matches() {
        let mut lm = manager_with(20, 9);
        apply_query(&mut lm, "rec 1");
        // "rec 1", "rec 10" .. "rec 19"
        assert_eq!(lm.visible().len(), 11);
        assert!(!lm.has_more());
        lm.clear_query();
        assert_eq!(lm.visible().len(), 9);
    }

    #[test]
    fn derivations_are_pure() {
        let lm = manager_with(15, 9);
        let a: Vec<String> = lm.visible().iter().map(|r| r.id().to_string()).collect();
        let b: Vec<String> = lm.visible().iter().map(|r| r.id().to_string()).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn selection_toggles_and_replaces() {
        let mut lm = ListManager::new();
        lm.set_items(vec![customer("a", "A"), customer("b", "B")]);
        lm.toggle_select("a");
        assert_eq!(lm.selected_id(), Some("a"));
        lm.toggle_select("a");
        assert_eq!(lm.selected_id(), None);
        lm.toggle_select("a");
        lm.toggle_select("b");
        assert_eq!(lm.selected_id(), Some("b"));
    }

    #[test]
    fn remove_deletes_exactly_one_and_clears_selection() {
        let mut lm = ListManager::new();
        lm.set_items(vec![customer("a", "A"), customer("b", "B"), customer("c", "C")]);
        let order_before: Vec<String> = lm
            .items()
            .iter()
            .filter(|r| r.id() != "b")
            .map(|r| r.id().to_string())
            .collect();
        lm.toggle_select("b");
        assert!(lm.remove("b"));
        assert_eq!(lm.selected_id(), None);
        assert_eq!(lm.len(), 2);
        let order_after: Vec<String> = lm.items().iter().map(|r| r.id().to_string()).collect();
        assert_eq!(order_before, order_after);
        assert!(!lm.remove("b"));
    }

    #[test]
    fn apply_saved_splices_by_id() {
        let mut lm = ListManager::new();
        lm.set_items(vec![customer("a", "A"), customer("b", "B")]);
        lm.apply_saved(customer("b", "B2"));
        assert_eq!(lm.len(), 2);
        let b = lm.items().iter().find(|r| r.id() == "b").unwrap();
        assert_eq!(b.name, "B2");
    }

    #[test]
    fn newest_first_ordering_with_id_fallback() {
        use chrono::TimeZone;
        let mut older = customer("c01", "old");
        older.created_at = Some(chrono::Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        let mut newer = customer("c02", "new");
        newer.created_at = Some(chrono::Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());
        let legacy = customer("c99", "legacy"); // no timestamp

        let mut lm = ListManager::new();
        lm.set_items(vec![legacy, older, newer]);
        let ids: Vec<&str> = lm.items().iter().map(|r| r.id()).collect();
        // timestamped records first (newest leading), legacy ones after
        assert_eq!(ids, vec!["c02", "c01", "c99"]);
    }

    #[test]
    fn selection_survives_refresh_only_when_id_still_present() {
        let mut lm = ListManager::new();
        lm.set_items(vec![customer("a", "A"), customer("b", "B")]);
        lm.toggle_select("a");
        lm.set_items(vec![customer("a", "A"), customer("c", "C")]);
        assert_eq!(lm.selected_id(), Some("a"));
        lm.set_items(vec![customer("c", "C")]);
        assert_eq!(lm.selected_id(), None);
    }
}
