//! Board state for the paginated status/story view.
//!
//! Stories are fetched one page at a time per status column. [`BoardState`]
//! owns the pagination cursors and the observable result channels but never
//! performs I/O itself: drivers (the TUI event loop, [`Loader`]) call the
//! `begin_*`/`apply_*` pairs around each remote fetch. Keeping the
//! transitions synchronous on the driver's side is what guarantees at most
//! one fetch in flight per status.

mod loader;

pub use loader::Loader;

use crate::data::{SprintId, Status, StatusId, Story};
use crate::remote::RepositoryError;
use std::collections::{HashMap, HashSet};

/// User-facing message for any failed remote call. Details go to the log.
pub const LOAD_ERROR_MESSAGE: &str = "Failed to load data from the server";

/// Observable result channel: idle until the first load, then
/// loading/ready/failed.
#[derive(Debug, Clone, PartialEq)]
pub enum Loadable<T> {
    Idle,
    Loading,
    Ready(T),
    Failed(String),
}

impl<T> Default for Loadable<T> {
    fn default() -> Self {
        Self::Idle
    }
}

impl<T> Loadable<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Ready(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message),
            _ => None,
        }
    }
}

/// Per-status pagination bookkeeping.
///
/// `current_page` is incremented before each fetch. `max_page` starts
/// unbounded and is frozen at `current_page` when the server returns an
/// empty page; `current_page == max_page` is the stop condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCursor {
    current_page: u32,
    max_page: Option<u32>,
}

impl PageCursor {
    fn new() -> Self {
        Self {
            current_page: 0,
            max_page: None,
        }
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    /// True once an empty page froze `max_page`; no further fetches happen.
    pub fn is_exhausted(&self) -> bool {
        self.max_page == Some(self.current_page)
    }
}

/// One renderable row of the board. Section headers are always present;
/// story rows appear only while their section is expanded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisualItem {
    SectionHeader(StatusId),
    /// Index into the accumulated story collection
    Story(usize),
}

/// All session-scoped board state: the two result channels, per-status
/// cursors, and the loading/expanded sets. Mutated only from the owning
/// task context.
#[derive(Debug, Default)]
pub struct BoardState {
    sprint: Option<SprintId>,
    pub statuses: Loadable<Vec<Status>>,
    pub stories: Loadable<Vec<Story>>,
    cursors: HashMap<StatusId, PageCursor>,
    loading: HashSet<StatusId>,
    expanded: HashSet<StatusId>,
}

impl BoardState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sprint(&self) -> Option<SprintId> {
        self.sprint
    }

    pub fn set_sprint(&mut self, sprint: Option<SprintId>) {
        self.sprint = sprint;
    }

    pub fn cursor(&self, status: StatusId) -> Option<&PageCursor> {
        self.cursors.get(&status)
    }

    /// True while a page fetch for this status is outstanding
    pub fn is_fetching(&self, status: StatusId) -> bool {
        self.loading.contains(&status)
    }

    pub fn is_expanded(&self, status: StatusId) -> bool {
        self.expanded.contains(&status)
    }

    /// True while anything on the board is still loading
    pub fn any_loading(&self) -> bool {
        self.statuses.is_loading() || !self.loading.is_empty()
    }

    /// Toggle a section open or closed. Pure state change, no I/O.
    pub fn toggle_expanded(&mut self, status: StatusId) {
        if !self.expanded.remove(&status) {
            self.expanded.insert(status);
        }
    }

    /// Start a (re)load of the status list. Cached pagination state is
    /// discarded and the story channel becomes an empty success, so freshly
    /// fetched pages append into a clean collection.
    pub fn begin_statuses(&mut self) {
        self.statuses = Loadable::Loading;
        self.stories = Loadable::Ready(Vec::new());
        self.cursors.clear();
        self.loading.clear();
    }

    /// Apply the status-list fetch outcome. On success every status gets a
    /// fresh cursor; the returned ids are the first-page fetches the caller
    /// must now launch. On failure nothing is scheduled and the status
    /// channel carries the generic error.
    pub fn apply_statuses(
        &mut self,
        outcome: Result<Vec<Status>, RepositoryError>,
    ) -> Vec<StatusId> {
        match outcome {
            Ok(statuses) => {
                let ids: Vec<StatusId> = statuses.iter().map(|s| s.id).collect();
                for id in &ids {
                    self.cursors.insert(*id, PageCursor::new());
                }
                self.statuses = Loadable::Ready(statuses);
                ids
            }
            Err(e) => {
                tracing::warn!("status list fetch failed: {}", e);
                self.statuses = Loadable::Failed(LOAD_ERROR_MESSAGE.to_string());
                Vec::new()
            }
        }
    }

    /// Reserve the next page for `status`. Returns the page number to
    /// fetch, or `None` when the status is unknown, exhausted, or already
    /// fetching (at most one fetch in flight per status).
    pub fn begin_stories(&mut self, status: StatusId) -> Option<u32> {
        if self.loading.contains(&status) {
            return None;
        }
        let cursor = self.cursors.get_mut(&status)?;
        if cursor.is_exhausted() {
            return None;
        }
        cursor.current_page += 1;
        self.loading.insert(status);
        Some(cursor.current_page)
    }

    /// Apply a story-page fetch outcome for `status`.
    ///
    /// A non-empty page is appended to the accumulated collection. An empty
    /// page freezes the cursor. A failure rolls the page counter back so a
    /// later attempt retries the same page, and surfaces the generic error
    /// on the status channel.
    pub fn apply_stories(
        &mut self,
        status: StatusId,
        outcome: Result<Vec<Story>, RepositoryError>,
    ) {
        self.loading.remove(&status);
        let Some(cursor) = self.cursors.get_mut(&status) else {
            // Cursor discarded by a reload while the fetch was in flight
            return;
        };

        match outcome {
            Ok(page) => {
                if page.is_empty() {
                    // reached maximum page
                    cursor.max_page = Some(cursor.current_page);
                    return;
                }
                let mut all = match std::mem::take(&mut self.stories) {
                    Loadable::Ready(existing) => existing,
                    _ => Vec::new(),
                };
                all.extend(page);
                self.stories = Loadable::Ready(all);
            }
            Err(e) => {
                tracing::warn!("story page fetch failed for status {}: {}", status, e);
                cursor.current_page = cursor.current_page.saturating_sub(1);
                self.statuses = Loadable::Failed(LOAD_ERROR_MESSAGE.to_string());
            }
        }
    }

    /// Discard everything, scope included. The next `begin_statuses` starts
    /// from a first-launch state.
    pub fn reset(&mut self) {
        self.sprint = None;
        self.statuses = Loadable::Idle;
        self.stories = Loadable::Idle;
        self.cursors.clear();
        self.loading.clear();
        self.expanded.clear();
    }

    /// Stories accumulated so far for one status, in arrival order.
    pub fn stories_for(&self, status: StatusId) -> impl Iterator<Item = &Story> {
        self.stories
            .data()
            .map(|v| v.as_slice())
            .unwrap_or(&[])
            .iter()
            .filter(move |story| story.status_id == status)
    }

    pub fn story_count_for(&self, status: StatusId) -> usize {
        self.stories_for(status).count()
    }

    /// Build the renderable row list that matches exactly what's drawn.
    /// This enables j/k navigation through the visual representation.
    pub fn build_visual_items(&self) -> Vec<VisualItem> {
        let mut items = Vec::new();
        let Loadable::Ready(statuses) = &self.statuses else {
            return items;
        };
        let stories = self.stories.data().map(|v| v.as_slice()).unwrap_or(&[]);

        for status in statuses {
            items.push(VisualItem::SectionHeader(status.id));
            if !self.expanded.contains(&status.id) {
                continue;
            }
            for (idx, story) in stories.iter().enumerate() {
                if story.status_id == status.id {
                    items.push(VisualItem::Story(idx));
                }
            }
        }

        items
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn make_status(id: StatusId, name: &str) -> Status {
        Status {
            id,
            name: name.to_string(),
            color: "#70728F".to_string(),
            order: id,
            is_closed: false,
        }
    }

    fn make_story(id: i64, status: StatusId) -> Story {
        Story {
            id,
            reference: id * 10,
            subject: format!("Story {}", id),
            status_id: status,
            assignee: None,
            is_closed: false,
            created_at: Utc::now(),
        }
    }

    fn server_error() -> RepositoryError {
        RepositoryError::Server { status: 500 }
    }

    #[test]
    fn fresh_cursor_starts_open_at_page_zero() {
        let mut board = BoardState::new();
        board.begin_statuses();
        board.apply_statuses(Ok(vec![make_status(1, "New")]));

        let cursor = board.cursor(1).expect("cursor for fetched status");
        assert_eq!(cursor.current_page(), 0);
        assert!(!cursor.is_exhausted());
    }

    #[test]
    fn begin_statuses_clears_cached_pagination() {
        let mut board = BoardState::new();
        board.begin_statuses();
        board.apply_statuses(Ok(vec![make_status(1, "New")]));
        board.begin_stories(1);
        board.apply_stories(1, Ok(vec![make_story(1, 1)]));

        board.begin_statuses();
        assert!(board.cursor(1).is_none());
        assert!(!board.is_fetching(1));
        assert_eq!(board.stories.data().map(Vec::len), Some(0));
        assert!(board.statuses.is_loading());
    }

    #[test]
    fn begin_stories_increments_page_and_marks_fetching() {
        let mut board = BoardState::new();
        board.begin_statuses();
        board.apply_statuses(Ok(vec![make_status(1, "New")]));

        assert_eq!(board.begin_stories(1), Some(1));
        assert!(board.is_fetching(1));
        assert_eq!(board.cursor(1).unwrap().current_page(), 1);
    }

    #[test]
    fn begin_stories_refuses_while_fetch_in_flight() {
        let mut board = BoardState::new();
        board.begin_statuses();
        board.apply_statuses(Ok(vec![make_status(1, "New")]));

        assert_eq!(board.begin_stories(1), Some(1));
        // Second request before the first resolves must not advance the page
        assert_eq!(board.begin_stories(1), None);
        assert_eq!(board.cursor(1).unwrap().current_page(), 1);
    }

    #[test]
    fn begin_stories_refuses_unknown_status() {
        let mut board = BoardState::new();
        assert_eq!(board.begin_stories(99), None);
    }

    #[test]
    fn empty_page_freezes_cursor() {
        let mut board = BoardState::new();
        board.begin_statuses();
        board.apply_statuses(Ok(vec![make_status(1, "New")]));

        board.begin_stories(1);
        board.apply_stories(1, Ok(vec![]));

        let cursor = board.cursor(1).unwrap();
        assert!(cursor.is_exhausted());
        assert_eq!(cursor.current_page(), 1);
        assert_eq!(board.begin_stories(1), None);
    }

    #[test]
    fn non_empty_page_appends_and_stays_open() {
        let mut board = BoardState::new();
        board.begin_statuses();
        board.apply_statuses(Ok(vec![make_status(1, "New")]));

        board.begin_stories(1);
        board.apply_stories(1, Ok(vec![make_story(1, 1), make_story(2, 1)]));

        assert!(!board.cursor(1).unwrap().is_exhausted());
        assert_eq!(board.story_count_for(1), 2);

        board.begin_stories(1);
        board.apply_stories(1, Ok(vec![make_story(3, 1)]));
        // Append, not replace
        assert_eq!(board.story_count_for(1), 3);
        assert_eq!(board.cursor(1).unwrap().current_page(), 2);
    }

    #[test]
    fn failed_page_rolls_cursor_back_and_surfaces_error() {
        let mut board = BoardState::new();
        board.begin_statuses();
        board.apply_statuses(Ok(vec![make_status(1, "New")]));

        board.begin_stories(1);
        board.apply_stories(1, Err(server_error()));

        assert_eq!(board.cursor(1).unwrap().current_page(), 0);
        assert!(!board.is_fetching(1));
        assert_eq!(board.statuses.error(), Some(LOAD_ERROR_MESSAGE));
        // The failed page is retried, not skipped
        assert_eq!(board.begin_stories(1), Some(1));
    }

    #[test]
    fn failed_status_fetch_leaves_story_channel_untouched() {
        let mut board = BoardState::new();
        board.begin_statuses();
        let launches = board.apply_statuses(Err(server_error()));

        assert!(launches.is_empty());
        assert_eq!(board.statuses.error(), Some(LOAD_ERROR_MESSAGE));
        // Story channel keeps the empty success set by begin_statuses
        assert_eq!(board.stories.data().map(Vec::len), Some(0));
    }

    #[test]
    fn toggle_expanded_is_its_own_inverse() {
        let mut board = BoardState::new();
        assert!(!board.is_expanded(1));
        board.toggle_expanded(1);
        assert!(board.is_expanded(1));
        board.toggle_expanded(1);
        assert!(!board.is_expanded(1));
    }

    #[test]
    fn late_result_after_reload_is_ignored() {
        let mut board = BoardState::new();
        board.begin_statuses();
        board.apply_statuses(Ok(vec![make_status(1, "New")]));
        board.begin_stories(1);

        // Reload discards the cursor while the fetch is in flight
        board.begin_statuses();
        board.apply_stories(1, Ok(vec![make_story(1, 1)]));

        assert!(board.cursor(1).is_none());
        assert_eq!(board.stories.data().map(Vec::len), Some(0));
    }

    #[test]
    fn reset_returns_to_initial_state() {
        let mut board = BoardState::new();
        board.set_sprint(Some(7));
        board.begin_statuses();
        board.apply_statuses(Ok(vec![make_status(1, "New")]));
        board.begin_stories(1);
        board.apply_stories(1, Ok(vec![make_story(1, 1)]));
        board.toggle_expanded(1);

        board.reset();

        assert_eq!(board.sprint(), None);
        assert_eq!(board.statuses, Loadable::Idle);
        assert_eq!(board.stories, Loadable::Idle);
        assert!(board.cursor(1).is_none());
        assert!(!board.is_fetching(1));
        assert!(!board.is_expanded(1));
    }
}
