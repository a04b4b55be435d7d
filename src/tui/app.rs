use crate::board::{BoardState, VisualItem};
use crate::data::{SprintId, Status, StatusId, Story};
use crate::remote::{RepositoryError, StoriesRepository};
use crate::util;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Braille spinner frames for loading animation
pub const SPINNER_FRAMES: &[char] = &['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

/// Result of a background fetch, applied on the event-loop side.
pub enum BoardEvent {
    /// Status list fetch resolved
    Statuses(Result<Vec<Status>, RepositoryError>),
    /// One story page fetch resolved
    StoryPage {
        status: StatusId,
        outcome: Result<Vec<Story>, RepositoryError>,
    },
}

pub struct App {
    repo: Arc<dyn StoriesRepository>,
    pub board: BoardState,
    pub visual_items: Vec<VisualItem>,
    pub visual_selected: usize,

    // UI state
    pub show_help: bool,
    pub spinner_frame: usize,

    /// Sprint from config/CLI that `b` toggles against the backlog
    pub default_sprint: Option<SprintId>,

    /// Channel the fetch tasks report back on. Replaced on every reload so
    /// results of abandoned fetches are dropped with the old receiver.
    events_tx: mpsc::Sender<BoardEvent>,
    events_rx: mpsc::Receiver<BoardEvent>,
}

impl App {
    pub fn new(repo: Arc<dyn StoriesRepository>, sprint: Option<SprintId>) -> Self {
        let (events_tx, events_rx) = mpsc::channel(64);
        let mut board = BoardState::new();
        board.set_sprint(sprint);
        Self {
            repo,
            board,
            visual_items: vec![],
            visual_selected: 0,
            show_help: false,
            spinner_frame: 0,
            default_sprint: sprint,
            events_tx,
            events_rx,
        }
    }

    /// Process a message and update app state (Elm Architecture update
    /// function). Returns `true` if the app should quit.
    pub fn update(&mut self, msg: super::Message) -> bool {
        use super::Message;
        match msg {
            Message::Quit => return true,
            Message::Reload => self.start_reload(),
            Message::ToggleScope => self.toggle_scope(),

            Message::MoveUp => self.move_selection(-1),
            Message::MoveDown => self.move_selection(1),
            Message::GotoTop => self.visual_selected = 0,
            Message::GotoBottom => {
                self.visual_selected = self.visual_items.len().saturating_sub(1);
            }
            Message::PageUp => self.move_selection(-10),
            Message::PageDown => self.move_selection(10),

            Message::ToggleSection => {
                if let Some(status) = self.selected_section() {
                    self.board.toggle_expanded(status);
                    self.rebuild_visual_items();
                }
            }
            Message::LoadMore => {
                if let Some(status) = self.selected_section() {
                    self.request_stories(status);
                }
            }

            Message::ToggleHelp => self.show_help = !self.show_help,
            Message::CloseModal => self.show_help = false,
            Message::None => {}
        }
        false
    }

    /// Start a full board reload (non-blocking).
    pub fn start_reload(&mut self) {
        // Fresh channel: anything still in flight reports to the old sender
        // and is dropped along with the old receiver.
        let (tx, rx) = mpsc::channel(64);
        self.events_tx = tx;
        self.events_rx = rx;

        self.board.begin_statuses();
        self.rebuild_visual_items();

        let repo = Arc::clone(&self.repo);
        let sprint = self.board.sprint();
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let outcome = repo.get_statuses(sprint).await;
            util::send_or_log(&tx, BoardEvent::Statuses(outcome), "status list").await;
        });
    }

    /// Launch a next-page fetch for one status (non-blocking). The page is
    /// reserved synchronously, so rapid repeats cannot double-fetch.
    pub fn request_stories(&mut self, status: StatusId) {
        let Some(page) = self.board.begin_stories(status) else {
            return;
        };

        let repo = Arc::clone(&self.repo);
        let sprint = self.board.sprint();
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let outcome = repo.get_stories(status, page, sprint).await;
            util::send_or_log(&tx, BoardEvent::StoryPage { status, outcome }, "story page").await;
        });
    }

    /// Switch between the configured sprint and the backlog. No-op when no
    /// sprint is configured.
    fn toggle_scope(&mut self) {
        let next = if self.board.sprint().is_some() {
            None
        } else {
            self.default_sprint
        };
        if next == self.board.sprint() {
            return;
        }
        self.board.reset();
        self.board.set_sprint(next);
        self.visual_selected = 0;
        self.start_reload();
    }

    /// Drain pending fetch results (non-blocking, call from event loop tick).
    pub fn poll_board_events(&mut self) {
        let mut launches: Vec<StatusId> = Vec::new();
        let mut changed = false;

        while let Ok(event) = self.events_rx.try_recv() {
            changed = true;
            match event {
                BoardEvent::Statuses(outcome) => {
                    launches.extend(self.board.apply_statuses(outcome));
                }
                BoardEvent::StoryPage { status, outcome } => {
                    self.board.apply_stories(status, outcome);
                }
            }
        }

        // A fresh status list triggers every status's first page
        for status in launches {
            self.request_stories(status);
        }

        if changed {
            self.rebuild_visual_items();
        }
    }

    /// Rebuild the visual items list (call after any board change).
    pub fn rebuild_visual_items(&mut self) {
        let selected_before = self.visual_items.get(self.visual_selected).copied();

        self.visual_items = self.board.build_visual_items();

        if self.visual_items.is_empty() {
            self.visual_selected = 0;
            return;
        }

        // Try to stay on the same row after a rebuild
        if let Some(previous) = selected_before {
            if let Some(idx) = self.visual_items.iter().position(|item| *item == previous) {
                self.visual_selected = idx;
                return;
            }
        }

        if self.visual_selected >= self.visual_items.len() {
            self.visual_selected = self.visual_items.len() - 1;
        }
    }

    pub fn move_selection(&mut self, delta: i32) {
        let len = self.visual_items.len();
        if len == 0 {
            return;
        }

        let mut pos = self.visual_selected;
        for _ in 0..delta.unsigned_abs() as usize {
            if delta > 0 {
                if pos >= len - 1 {
                    break;
                }
                pos += 1;
            } else {
                if pos == 0 {
                    break;
                }
                pos -= 1;
            }
        }

        self.visual_selected = pos;
    }

    /// The section the cursor is in: the header itself, or the section a
    /// selected story belongs to.
    pub fn selected_section(&self) -> Option<StatusId> {
        match self.visual_items.get(self.visual_selected)? {
            VisualItem::SectionHeader(status) => Some(*status),
            VisualItem::Story(idx) => self
                .board
                .stories
                .data()
                .and_then(|stories| stories.get(*idx))
                .map(|story| story.status_id),
        }
    }

    /// Human-readable scope for the header bar.
    pub fn scope_label(&self) -> String {
        match self.board.sprint() {
            Some(id) => format!("sprint {}", id),
            None => "backlog".to_string(),
        }
    }

    /// Advance the spinner animation.
    pub fn tick_spinner(&mut self) {
        if self.board.any_loading() {
            self.spinner_frame = (self.spinner_frame + 1) % SPINNER_FRAMES.len();
        }
    }

    /// Get current spinner character
    pub fn spinner_char(&self) -> char {
        SPINNER_FRAMES[self.spinner_frame]
    }
}
