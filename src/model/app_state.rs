//! src/model/app_state.rs
//! ============================================================================
//! # AppState: Navigation State Machine Over the Scanned Tree
//!
//! Owns the scanned tree and everything the view needs: the phase
//! (Scanning / Browsing / ConfirmDelete / Error), the navigation stack and
//! cursor, the sort policy, live scan progress, and the delete-confirm
//! capture. Mutated only from the single-threaded event loop; the tree is
//! shared with workers only while the scan runs.
//!
//! ## Sort-generation contract
//! A sort-mode toggle bumps `sort_gen` and nothing else — O(1) on
//! million-node trees. Each directory re-sorts lazily on first access when
//! its recorded `(gen, mode)` no longer matches, at most once per toggle
//! and visit.

use crate::config::config::Config;
use crate::controller::event_loop::TaskResult;
use crate::error::AppError;
use crate::scanner::node::{self, Node};
use crate::tasks::hooks::OpsHooks;
use compact_str::CompactString;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicI64;
use tokio::sync::mpsc;
use tracing::info;

/// What the model is currently showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Initial scanning progress view.
    Scanning,
    /// Interactive tree browser.
    Browsing,
    /// Deletion prompt overlay; navigation is captured.
    ConfirmDelete,
    /// Unrecoverable error display; only quit is accepted.
    Error,
}

/// Ordering applied to a directory's children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortMode {
    /// Largest first.
    Size,
    /// Alphabetical, byte-wise.
    Name,
}

impl SortMode {
    /// The tag stored in [`Node`] sort bookkeeping.
    pub fn tag(self) -> i8 {
        match self {
            SortMode::Size => node::SORT_BY_SIZE,
            SortMode::Name => node::SORT_BY_NAME,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            SortMode::Size => SortMode::Name,
            SortMode::Name => SortMode::Size,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortMode::Size => "size",
            SortMode::Name => "name",
        }
    }
}

/// Captured state of the delete-confirm overlay.
#[derive(Debug, Clone)]
pub struct ConfirmState {
    /// Full path of the entry at capture time.
    pub path: PathBuf,
    /// Display name for the prompt.
    pub name: CompactString,
}

/// Core application state.
pub struct AppState {
    pub config: Arc<Config>,
    pub hooks: Arc<dyn OpsHooks>,
    pub task_tx: mpsc::UnboundedSender<TaskResult>,

    pub phase: Phase,
    /// Absolute scan target, resolved before the scan starts.
    pub root_path: PathBuf,
    pub root: Option<Arc<Node>>,
    /// Breadcrumb stack; `stack.last()` is the directory being browsed.
    pub stack: Vec<Arc<Node>>,
    pub cursor: usize,
    pub sort: SortMode,
    sort_gen: u64,

    pub last_error: Option<String>,
    pub confirm: Option<ConfirmState>,
    /// Path handed to the trash hook, applied to the tree only on success.
    pending_trash: Option<PathBuf>,

    /// Live byte counter fed by the scanner's progress channel.
    pub scanned_bytes: Arc<AtomicI64>,
    /// Volume purgeable-space estimate, once the async query lands.
    pub purgeable: Option<i64>,
    pub spinner_frame: usize,

    pub redraw: bool,
}

impl AppState {
    pub fn new(
        config: Arc<Config>,
        hooks: Arc<dyn OpsHooks>,
        root_path: PathBuf,
        task_tx: mpsc::UnboundedSender<TaskResult>,
    ) -> Self {
        Self {
            config,
            hooks,
            task_tx,
            phase: Phase::Scanning,
            root_path,
            root: None,
            stack: Vec::new(),
            cursor: 0,
            sort: SortMode::Size,
            // Start at 1 so zero-generation nodes are always stale.
            sort_gen: 1,
            last_error: None,
            confirm: None,
            pending_trash: None,
            scanned_bytes: Arc::new(AtomicI64::new(0)),
            purgeable: None,
            spinner_frame: 0,
            redraw: true,
        }
    }

    pub fn sort_gen(&self) -> u64 {
        self.sort_gen
    }

    // --------------------------------------------------------------------- //
    // Scan completion
    // --------------------------------------------------------------------- //

    /// Install the finished tree and enter Browsing. The root level is
    /// sorted eagerly so the first frame is ordered; everything below
    /// sorts lazily on first visit.
    pub fn install_root(&mut self, root: Arc<Node>) {
        match self.sort {
            SortMode::Size => root.sort_by_size(),
            SortMode::Name => root.sort_by_name(),
        }
        root.mark_sorted(self.sort_gen, self.sort.tag());
        self.root = Some(root);
        self.stack.clear();
        self.cursor = 0;
        self.phase = Phase::Browsing;
        self.redraw = true;
        info!("scan complete: {}", self.root_path.display());
    }

    /// A fatal scan error: navigation is disabled, only quit is accepted.
    pub fn fail_scan(&mut self, err: AppError) {
        self.last_error = Some(err.to_string());
        self.phase = Phase::Error;
        self.redraw = true;
    }

    /// A failed hook invocation. The tree is untouched.
    pub fn fail_action(&mut self, err: AppError) {
        self.pending_trash = None;
        self.last_error = Some(err.to_string());
        self.phase = Phase::Error;
        self.redraw = true;
    }

    // --------------------------------------------------------------------- //
    // Navigation
    // --------------------------------------------------------------------- //

    /// The directory currently being browsed.
    pub fn current_dir(&self) -> Option<Arc<Node>> {
        self.stack.last().cloned().or_else(|| self.root.clone())
    }

    /// Sorted children of the current directory, sorting lazily on first
    /// access: a stale `(gen, mode)` stamp triggers one re-sort, then the
    /// stamp is refreshed.
    pub fn visible_children(&self) -> Vec<Arc<Node>> {
        let Some(dir) = self.current_dir() else {
            return Vec::new();
        };
        let mode = self.sort.tag();
        if !dir.is_sorted(self.sort_gen, mode) {
            match self.sort {
                SortMode::Size => dir.sort_by_size(),
                SortMode::Name => dir.sort_by_name(),
            }
            dir.mark_sorted(self.sort_gen, mode);
        }
        dir.children.read().clone()
    }

    pub fn visible_len(&self) -> usize {
        self.current_dir().map_or(0, |d| d.child_count())
    }

    /// The highlighted node, if any.
    pub fn selected(&self) -> Option<Arc<Node>> {
        self.visible_children().get(self.cursor).cloned()
    }

    fn clamp_cursor(&mut self) {
        let n = self.visible_len();
        if n == 0 {
            self.cursor = 0;
        } else if self.cursor >= n {
            self.cursor = n - 1;
        }
    }

    pub fn move_up(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            self.redraw = true;
        }
    }

    pub fn move_down(&mut self) {
        if self.cursor + 1 < self.visible_len() {
            self.cursor += 1;
            self.redraw = true;
        }
    }

    pub fn select_first(&mut self) {
        self.cursor = 0;
        self.redraw = true;
    }

    pub fn select_last(&mut self) {
        let n = self.visible_len();
        if n > 0 {
            self.cursor = n - 1;
        }
        self.redraw = true;
    }

    /// Descend into the selection if it is a directory.
    pub fn enter_selected(&mut self) {
        if let Some(sel) = self.selected() {
            if sel.is_dir {
                self.stack.push(sel);
                self.cursor = 0;
                self.redraw = true;
            }
        }
    }

    /// Pop the navigation stack.
    pub fn ascend(&mut self) {
        if self.stack.pop().is_some() {
            self.clamp_cursor();
            self.redraw = true;
        }
    }

    /// Toggle size↔name ordering. Bumps the generation counter; no tree
    /// walk happens here.
    pub fn toggle_sort(&mut self) {
        self.sort = self.sort.toggled();
        self.sort_gen += 1;
        self.cursor = 0;
        self.redraw = true;
    }

    // --------------------------------------------------------------------- //
    // Delete flow
    // --------------------------------------------------------------------- //

    /// Capture the selection and enter ConfirmDelete.
    pub fn begin_confirm(&mut self) {
        if let Some(sel) = self.selected() {
            self.confirm = Some(ConfirmState {
                path: sel.full_path(),
                name: sel.name.clone(),
            });
            self.phase = Phase::ConfirmDelete;
            self.redraw = true;
        }
    }

    /// Leave ConfirmDelete without side effects.
    pub fn cancel_confirm(&mut self) {
        self.confirm = None;
        self.phase = Phase::Browsing;
        self.redraw = true;
    }

    /// Confirm the capture: returns the path for the trash hook and goes
    /// back to Browsing. The tree is mutated only when the hook reports
    /// success, via [`AppState::apply_trash_success`].
    pub fn confirm_trash(&mut self) -> Option<PathBuf> {
        let captured = self.confirm.take()?;
        self.phase = Phase::Browsing;
        self.redraw = true;
        self.pending_trash = Some(captured.path.clone());
        Some(captured.path)
    }

    /// The trash hook succeeded: remove the entry from the current
    /// directory's children and subtract its size from every ancestor on
    /// the stack and from the root.
    pub fn apply_trash_success(&mut self, trashed: PathBuf) {
        if self.pending_trash.as_ref() != Some(&trashed) {
            return; // stale completion, e.g. after an error reset
        }
        self.pending_trash = None;

        let Some(dir) = self.current_dir() else {
            return;
        };

        // Match the captured path against the current children: same
        // parent directory, same final component.
        let parent_matches = trashed.parent().map(|p| p == dir.full_path());
        if parent_matches != Some(true) {
            return; // user navigated away; nothing to remove here
        }
        let Some(file_name) = trashed.file_name() else {
            return;
        };
        let file_name = file_name.to_string_lossy();

        let removed_size: i64 = {
            let mut children = dir.children.write();
            let Some(idx) = children
                .iter()
                .position(|c| c.name.as_str() == file_name)
            else {
                return;
            };
            let removed = children.remove(idx);
            removed.size()
        };

        // Subtractive maintenance up the ancestor chain. The current
        // directory is the stack top (or the root itself), so it is covered.
        for anc in &self.stack {
            anc.add_size(-removed_size);
        }
        if let Some(root) = &self.root {
            root.add_size(-removed_size);
        }

        self.clamp_cursor();
        self.redraw = true;
        info!("trashed {} ({} bytes)", trashed.display(), removed_size);
    }

    // --------------------------------------------------------------------- //
    // Status feed
    // --------------------------------------------------------------------- //

    pub fn set_purgeable(&mut self, bytes: i64) {
        self.purgeable = Some(bytes.max(0));
        self.redraw = true;
    }

    /// Periodic tick: animate the scanning spinner.
    pub fn tick(&mut self) {
        if self.phase == Phase::Scanning {
            self.spinner_frame = self.spinner_frame.wrapping_add(1);
            self.redraw = true;
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("phase", &self.phase)
            .field("root_path", &self.root_path)
            .field("stack_depth", &self.stack.len())
            .field("cursor", &self.cursor)
            .field("sort", &self.sort)
            .field("sort_gen", &self.sort_gen)
            .field("last_error", &self.last_error)
            .finish()
    }
}
