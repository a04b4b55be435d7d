//! Message enum for Elm Architecture (TEA) pattern.
//!
//! All possible user actions in the application are represented as messages.
//! This enables unidirectional data flow and testable update logic.

/// All possible user actions in the application.
///
/// Messages are dispatched from key events and processed by `App::update()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    // ─────────────────────────────────────────────────────────────────────────
    // App lifecycle
    // ─────────────────────────────────────────────────────────────────────────
    /// Quit the application
    Quit,
    /// Reload the whole board (statuses + first pages)
    Reload,
    /// Switch between sprint scope and backlog (resets the board)
    ToggleScope,

    // ─────────────────────────────────────────────────────────────────────────
    // Navigation
    // ─────────────────────────────────────────────────────────────────────────
    /// Move selection up by one
    MoveUp,
    /// Move selection down by one
    MoveDown,
    /// Go to the first item
    GotoTop,
    /// Go to the last item
    GotoBottom,
    /// Page up (half screen)
    PageUp,
    /// Page down (half screen)
    PageDown,

    // ─────────────────────────────────────────────────────────────────────────
    // Board actions
    // ─────────────────────────────────────────────────────────────────────────
    /// Expand/collapse the section under the cursor
    ToggleSection,
    /// Fetch the next story page for the section under the cursor
    LoadMore,

    // ─────────────────────────────────────────────────────────────────────────
    // Modals
    // ─────────────────────────────────────────────────────────────────────────
    /// Toggle help popup
    ToggleHelp,
    /// Close current modal
    CloseModal,

    /// No operation (for unhandled keys or pending chords)
    None,
}
