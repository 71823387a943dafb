//! src/controller/actions.rs
//! ============================================================================
//! # Actions: Centralized Application Commands
//!
//! Defines the `Action` enum, which represents all user inputs and internal
//! events the application responds to. This gives the `Controller` a single
//! clear interface to process, independent of raw terminal events.

/// A high-level action the application can perform.
///
/// Not `Clone`: task results carry non-clonable errors and are consumed
/// exactly once by the dispatcher.
#[derive(Debug)]
pub enum Action {
    /// Quit the application.
    Quit,

    /// A terminal resize; forces a redraw.
    Resize,

    /// Periodic tick for spinner animation and progress refresh.
    Tick,

    /// Move selection up.
    CursorUp,

    /// Move selection down.
    CursorDown,

    /// Jump to first entry.
    SelectFirst,

    /// Jump to last entry.
    SelectLast,

    /// Descend into the selected directory.
    Descend,

    /// Go back to the parent directory (pop the stack).
    Ascend,

    /// Toggle sort mode (size↔name).
    ToggleSort,

    /// Open the selection with the OS default application.
    OpenSelection,

    /// Reveal the selection in the OS file manager.
    RevealSelection,

    /// Begin the delete-confirm flow for the selection.
    BeginDelete,

    /// Confirm the pending delete (trash the captured path).
    ConfirmTrash,

    /// Dismiss the delete-confirm overlay without side effects.
    CancelDelete,

    /// A result from a background task.
    TaskResult(crate::controller::event_loop::TaskResult),

    /// Event consumed, no state change needed.
    NoOp,
}
