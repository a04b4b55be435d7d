//! Sequential driver over [`BoardState`] and a repository.
//!
//! The TUI applies fetch results as they arrive over a channel; this driver
//! instead awaits each fetch in turn. It backs the `snapshot` subcommand
//! and keeps the loader semantics testable without a terminal.

use super::BoardState;
use crate::data::StatusId;
use crate::remote::StoriesRepository;

pub struct Loader<R> {
    repo: R,
    pub board: BoardState,
}

impl<R: StoriesRepository> Loader<R> {
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            board: BoardState::new(),
        }
    }

    /// Reload the status list, then fetch the first page of every returned
    /// status in order.
    pub async fn load_statuses(&mut self) {
        self.board.begin_statuses();
        let outcome = self.repo.get_statuses(self.board.sprint()).await;
        let initial = self.board.apply_statuses(outcome);
        for status in initial {
            self.load_stories(status).await;
        }
    }

    /// Fetch the next page for one status. Does nothing when the status is
    /// exhausted, unknown, or already fetching.
    pub async fn load_stories(&mut self, status: StatusId) {
        let Some(page) = self.board.begin_stories(status) else {
            return;
        };
        let outcome = self.repo.get_stories(status, page, self.board.sprint()).await;
        self.board.apply_stories(status, outcome);
    }

    /// Drain every status to exhaustion. Stops early if the status list
    /// fetch failed, or a page fetch surfaced an error (the error channel
    /// replaces the status list).
    pub async fn load_all(&mut self) {
        self.load_statuses().await;
        let ids: Vec<StatusId> = match self.board.statuses.data() {
            Some(statuses) => statuses.iter().map(|s| s.id).collect(),
            None => return,
        };
        for status in ids {
            while !self
                .board
                .cursor(status)
                .map(|c| c.is_exhausted())
                .unwrap_or(true)
            {
                let before = self.board.cursor(status).map(|c| c.current_page());
                self.load_stories(status).await;
                // A failed fetch rolls the counter back; bail instead of
                // hammering the same page forever.
                if self.board.cursor(status).map(|c| c.current_page()) == before {
                    return;
                }
            }
        }
    }
}
