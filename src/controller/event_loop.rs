//! src/controller/event_loop.rs
//! ============================================================================
//! # Controller: Async Event & State Coordination
//!
//! - Maps terminal input and background task completions to `Action`s.
//! - Mutates AppState, signals UI redraw via the redraw flag.
//! - Never calls UI rendering directly; fully decoupled for immediate-mode TUI.
//!
//! Action hooks (open/reveal/trash) run on their own short-lived tasks and
//! report back through the `TaskResult` channel, so the loop never blocks
//! on the host OS.

use crate::config::config::Config;
use crate::controller::actions::Action;
use crate::error::AppError;
use crate::model::app_state::{AppState, Phase};
use crate::scanner::node::Node;
use crate::scanner::scan::scan;
use crate::tasks::hooks::OpsHooks;
use crossterm::event::{Event as TermEvent, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;
use tokio::sync::{Mutex, MutexGuard, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Which non-mutating hook a completion belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookOp {
    Open,
    Reveal,
}

/// Result from a background async task.
#[derive(Debug)]
pub enum TaskResult {
    /// The scanner finished (or failed on the root path).
    ScanDone {
        result: Result<Arc<Node>, AppError>,
    },

    /// The startup purgeable-space query landed.
    Purgeable { bytes: i64 },

    /// An open/reveal hook finished.
    HookDone {
        op: HookOp,
        result: Result<(), AppError>,
    },

    /// The trash hook finished for the given path.
    TrashDone {
        path: PathBuf,
        result: Result<(), AppError>,
    },
}

pub struct Controller {
    pub app: Arc<Mutex<AppState>>,
    task_rx: mpsc::UnboundedReceiver<TaskResult>,
    event_stream: EventStream,
    tick: tokio::time::Interval,
    /// Shared cancellation root: quitting cancels the scan and all hooks.
    cancel: CancellationToken,
}

impl Controller {
    pub fn new(
        app: Arc<Mutex<AppState>>,
        task_rx: mpsc::UnboundedReceiver<TaskResult>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            app,
            task_rx,
            event_stream: EventStream::new(),
            tick: tokio::time::interval(Duration::from_millis(120)),
            cancel,
        }
    }

    /// Asynchronously returns the next action, waiting for user input,
    /// background task results, or the animation tick.
    pub async fn next_action(&mut self) -> Option<Action> {
        tokio::select! {
            Some(Ok(event)) = self.event_stream.next() => {
                debug!("raw terminal event: {:?}", event);
                Some(self.handle_terminal_event(event).await)
            }

            Some(task_result) = self.task_rx.recv() => {
                debug!("task result: {:?}", task_result);
                Some(Action::TaskResult(task_result))
            }

            _ = self.tick.tick() => Some(Action::Tick),

            else => None,
        }
    }

    /// Maps a raw terminal event to a high-level Action for the current phase.
    async fn handle_terminal_event(&self, event: TermEvent) -> Action {
        let app: MutexGuard<'_, AppState> = self.app.lock().await;
        let phase: Phase = app.phase;
        drop(app); // release the lock as soon as possible

        match event {
            TermEvent::Resize(..) => Action::Resize,
            TermEvent::Key(key) if key.kind != KeyEventKind::Release => map_key(phase, key),
            _ => Action::NoOp,
        }
    }

    /// Applies an action to the state. `Action::Quit` is handled by the
    /// caller (the main loop) before this is reached.
    pub async fn dispatch_action(&mut self, action: Action) {
        let mut app: MutexGuard<'_, AppState> = self.app.lock().await;

        match action {
            Action::Quit | Action::NoOp => {}

            Action::Resize => app.redraw = true,

            Action::Tick => app.tick(),

            Action::CursorUp => app.move_up(),
            Action::CursorDown => app.move_down(),
            Action::SelectFirst => app.select_first(),
            Action::SelectLast => app.select_last(),
            Action::Descend => app.enter_selected(),
            Action::Ascend => app.ascend(),
            Action::ToggleSort => app.toggle_sort(),

            Action::OpenSelection => self.spawn_hook(&app, HookOp::Open),
            Action::RevealSelection => self.spawn_hook(&app, HookOp::Reveal),

            Action::BeginDelete => app.begin_confirm(),
            Action::CancelDelete => app.cancel_confirm(),
            Action::ConfirmTrash => {
                if let Some(path) = app.confirm_trash() {
                    self.spawn_trash(&app, path);
                }
            }

            Action::TaskResult(tr) => Self::apply_task_result(&mut app, tr),
        }
    }

    /// Run open/reveal for the current selection on its own task.
    fn spawn_hook(&self, app: &AppState, op: HookOp) {
        let Some(sel) = app.selected() else {
            return;
        };
        let path = sel.full_path();
        let hooks = app.hooks.clone();
        let tx = app.task_tx.clone();
        let cancel = self.cancel.child_token();
        tokio::spawn(async move {
            let result = match op {
                HookOp::Open => hooks.open(cancel, path).await,
                HookOp::Reveal => hooks.reveal(cancel, path).await,
            };
            let _ = tx.send(TaskResult::HookDone { op, result });
        });
    }

    /// Run the trash hook; the tree mutation waits for its success message.
    fn spawn_trash(&self, app: &AppState, path: PathBuf) {
        let hooks = app.hooks.clone();
        let tx = app.task_tx.clone();
        let cancel = self.cancel.child_token();
        tokio::spawn(async move {
            let result = hooks.trash(cancel, path.clone()).await;
            let _ = tx.send(TaskResult::TrashDone { path, result });
        });
    }

    fn apply_task_result(app: &mut AppState, tr: TaskResult) {
        match tr {
            TaskResult::ScanDone { result } => match result {
                Ok(root) => app.install_root(root),
                Err(e) => app.fail_scan(e),
            },

            TaskResult::Purgeable { bytes } => app.set_purgeable(bytes),

            TaskResult::HookDone { result, .. } => match result {
                Ok(()) => {}
                // A cancelled hook during shutdown is not an error state.
                Err(AppError::Cancelled) => {}
                Err(e) => app.fail_action(e),
            },

            TaskResult::TrashDone { path, result } => match result {
                Ok(()) => app.apply_trash_success(path),
                Err(AppError::Cancelled) => {}
                Err(e) => app.fail_action(e),
            },
        }
    }
}

/// Translate a key event into an action under the current phase.
///
/// `q`/ctrl-c quit from anywhere except that inside ConfirmDelete `q`
/// cancels the prompt instead.
pub fn map_key(phase: Phase, key: KeyEvent) -> Action {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Action::Quit;
    }

    match phase {
        Phase::Scanning | Phase::Error => match key.code {
            KeyCode::Char('q') => Action::Quit,
            _ => Action::NoOp,
        },

        Phase::Browsing => match key.code {
            KeyCode::Char('q') => Action::Quit,
            KeyCode::Up | KeyCode::Char('k') => Action::CursorUp,
            KeyCode::Down | KeyCode::Char('j') => Action::CursorDown,
            KeyCode::Right | KeyCode::Enter | KeyCode::Char('l') => Action::Descend,
            KeyCode::Left | KeyCode::Backspace | KeyCode::Char('h') => Action::Ascend,
            KeyCode::Char('s') => Action::ToggleSort,
            KeyCode::Char('o') => Action::OpenSelection,
            KeyCode::Char('r') => Action::RevealSelection,
            KeyCode::Char('d') => Action::BeginDelete,
            KeyCode::Char('g') | KeyCode::Home => Action::SelectFirst,
            KeyCode::Char('G') | KeyCode::End => Action::SelectLast,
            _ => Action::NoOp,
        },

        Phase::ConfirmDelete => match key.code {
            KeyCode::Char('d') | KeyCode::Char('y') | KeyCode::Enter => Action::ConfirmTrash,
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('q') => Action::CancelDelete,
            _ => Action::NoOp,
        },
    }
}

/// Launch the concurrent scanner plus a drain task that folds progress
/// subtotals into the live counter the scanning view displays.
pub fn spawn_scan(
    cancel: CancellationToken,
    root_path: PathBuf,
    config: Arc<Config>,
    scanned_bytes: Arc<AtomicI64>,
    task_tx: mpsc::UnboundedSender<TaskResult>,
) {
    let (progress_tx, mut progress_rx) = mpsc::channel::<i64>(config.progress_capacity);

    let drain = tokio::spawn(async move {
        while let Some(bytes) = progress_rx.recv().await {
            scanned_bytes.fetch_add(bytes, Ordering::Relaxed);
        }
    });

    tokio::spawn(async move {
        let result = scan(cancel, root_path, Some(progress_tx), &config).await;
        // All sender clones are gone once scan returns; wait for the last
        // progress bytes to land before announcing completion.
        let _ = drain.await;
        let _ = task_tx.send(TaskResult::ScanDone { result });
    });
}

/// Query purgeable space in the background; the result lands in the status bar.
pub fn spawn_purgeable(
    hooks: Arc<dyn OpsHooks>,
    path: PathBuf,
    task_tx: mpsc::UnboundedSender<TaskResult>,
) {
    tokio::spawn(async move {
        let bytes = hooks.purgeable_space(path).await;
        let _ = task_tx.send(TaskResult::Purgeable { bytes });
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::app_state::SortMode;
    use futures::future::BoxFuture;
    use std::sync::Mutex as StdMutex;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn browsing_key_table() {
        let cases = [
            (KeyCode::Char('j'), "CursorDown"),
            (KeyCode::Down, "CursorDown"),
            (KeyCode::Char('k'), "CursorUp"),
            (KeyCode::Enter, "Descend"),
            (KeyCode::Char('l'), "Descend"),
            (KeyCode::Backspace, "Ascend"),
            (KeyCode::Char('h'), "Ascend"),
            (KeyCode::Char('s'), "ToggleSort"),
            (KeyCode::Char('o'), "OpenSelection"),
            (KeyCode::Char('r'), "RevealSelection"),
            (KeyCode::Char('d'), "BeginDelete"),
            (KeyCode::Char('g'), "SelectFirst"),
            (KeyCode::Char('G'), "SelectLast"),
            (KeyCode::Char('q'), "Quit"),
        ];
        for (code, expected) in cases {
            let action = map_key(Phase::Browsing, key(code));
            assert_eq!(format!("{action:?}"), expected, "key {code:?}");
        }
    }

    #[test]
    fn confirm_delete_key_table() {
        for code in [KeyCode::Char('d'), KeyCode::Char('y'), KeyCode::Enter] {
            assert!(matches!(
                map_key(Phase::ConfirmDelete, key(code)),
                Action::ConfirmTrash
            ));
        }
        for code in [KeyCode::Esc, KeyCode::Char('n'), KeyCode::Char('q')] {
            assert!(matches!(
                map_key(Phase::ConfirmDelete, key(code)),
                Action::CancelDelete
            ));
        }
    }

    #[test]
    fn ctrl_c_quits_from_any_phase() {
        for phase in [
            Phase::Scanning,
            Phase::Browsing,
            Phase::ConfirmDelete,
            Phase::Error,
        ] {
            let ev = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
            assert!(matches!(map_key(phase, ev), Action::Quit));
        }
    }

    #[test]
    fn scanning_ignores_navigation_keys() {
        assert!(matches!(
            map_key(Phase::Scanning, key(KeyCode::Char('j'))),
            Action::NoOp
        ));
        assert!(matches!(
            map_key(Phase::Error, key(KeyCode::Enter)),
            Action::NoOp
        ));
    }

    /// Hooks that record calls; trash fails when `fail_trash` is set.
    struct RecordingHooks {
        fail_trash: bool,
        calls: StdMutex<Vec<String>>,
    }

    impl RecordingHooks {
        fn new(fail_trash: bool) -> Self {
            Self {
                fail_trash,
                calls: StdMutex::new(Vec::new()),
            }
        }
    }

    impl OpsHooks for RecordingHooks {
        fn open(
            &self,
            _cancel: CancellationToken,
            path: PathBuf,
        ) -> BoxFuture<'static, Result<(), AppError>> {
            self.calls.lock().unwrap().push(format!("open {}", path.display()));
            Box::pin(async { Ok(()) })
        }

        fn reveal(
            &self,
            _cancel: CancellationToken,
            path: PathBuf,
        ) -> BoxFuture<'static, Result<(), AppError>> {
            self.calls.lock().unwrap().push(format!("reveal {}", path.display()));
            Box::pin(async { Ok(()) })
        }

        fn trash(
            &self,
            _cancel: CancellationToken,
            path: PathBuf,
        ) -> BoxFuture<'static, Result<(), AppError>> {
            self.calls.lock().unwrap().push(format!("trash {}", path.display()));
            let fail = self.fail_trash;
            Box::pin(async move {
                if fail {
                    Err(AppError::Action {
                        op: "trash",
                        path,
                        detail: "refused".into(),
                    })
                } else {
                    Ok(())
                }
            })
        }

        fn purgeable_space(&self, _path: PathBuf) -> BoxFuture<'static, i64> {
            Box::pin(async { 42 })
        }
    }

    /// root { foo: 100, bar: 50 }, size 150.
    fn two_file_tree() -> Arc<Node> {
        let root = Node::root("/scan/root", true);
        let foo = Node::child(&root, "foo", false);
        foo.set_size(100);
        let bar = Node::child(&root, "bar", false);
        bar.set_size(50);
        {
            let mut kids = root.children.write();
            kids.push(foo);
            kids.push(bar);
        }
        root.set_size(150);
        root
    }

    fn controller_with(
        hooks: Arc<dyn OpsHooks>,
    ) -> (Controller, mpsc::UnboundedSender<TaskResult>) {
        let (task_tx, task_rx) = mpsc::unbounded_channel();
        let app = AppState::new(
            Arc::new(Config::default()),
            hooks,
            PathBuf::from("/scan/root"),
            task_tx.clone(),
        );
        let controller = Controller::new(
            Arc::new(Mutex::new(app)),
            task_rx,
            CancellationToken::new(),
        );
        (controller, task_tx)
    }

    #[tokio::test]
    async fn trash_success_flows_back_into_the_tree() {
        let hooks = Arc::new(RecordingHooks::new(false));
        let (mut controller, _tx) = controller_with(hooks.clone());
        {
            let mut app = controller.app.lock().await;
            app.install_root(two_file_tree());
        }

        controller.dispatch_action(Action::BeginDelete).await; // selects "foo"
        controller.dispatch_action(Action::ConfirmTrash).await;

        // The spawned hook task reports through the controller's channel.
        let tr = controller.task_rx.recv().await.unwrap();
        assert!(matches!(tr, TaskResult::TrashDone { .. }));
        controller.dispatch_action(Action::TaskResult(tr)).await;

        let app = controller.app.lock().await;
        assert_eq!(app.phase, Phase::Browsing);
        assert_eq!(app.visible_len(), 1);
        assert_eq!(app.visible_children()[0].name, "bar");
        assert_eq!(app.root.as_ref().unwrap().size(), 50);
        assert_eq!(
            hooks.calls.lock().unwrap().as_slice(),
            ["trash /scan/root/foo"]
        );
    }

    #[tokio::test]
    async fn trash_failure_leaves_tree_untouched_and_enters_error() {
        let hooks = Arc::new(RecordingHooks::new(true));
        let (mut controller, _tx) = controller_with(hooks);
        {
            let mut app = controller.app.lock().await;
            app.install_root(two_file_tree());
        }

        controller.dispatch_action(Action::BeginDelete).await;
        controller.dispatch_action(Action::ConfirmTrash).await;
        let tr = controller.task_rx.recv().await.unwrap();
        controller.dispatch_action(Action::TaskResult(tr)).await;

        let app = controller.app.lock().await;
        assert_eq!(app.phase, Phase::Error);
        assert_eq!(app.root.as_ref().unwrap().size(), 150);
        assert_eq!(app.root.as_ref().unwrap().child_count(), 2);
    }

    #[tokio::test]
    async fn open_hook_receives_the_selected_path() {
        let hooks = Arc::new(RecordingHooks::new(false));
        let (mut controller, _tx) = controller_with(hooks.clone());
        {
            let mut app = controller.app.lock().await;
            app.install_root(two_file_tree());
        }

        controller.dispatch_action(Action::OpenSelection).await;
        let tr = controller.task_rx.recv().await.unwrap();
        assert!(matches!(
            tr,
            TaskResult::HookDone {
                op: HookOp::Open,
                result: Ok(())
            }
        ));
        assert_eq!(
            hooks.calls.lock().unwrap().as_slice(),
            ["open /scan/root/foo"]
        );
    }

    #[tokio::test]
    async fn purgeable_result_lands_in_state() {
        let hooks = Arc::new(RecordingHooks::new(false));
        let (mut controller, task_tx) = controller_with(hooks.clone());

        spawn_purgeable(hooks, PathBuf::from("/scan/root"), task_tx);
        let tr = controller.task_rx.recv().await.unwrap();
        controller.dispatch_action(Action::TaskResult(tr)).await;

        let app = controller.app.lock().await;
        assert_eq!(app.purgeable, Some(42));
    }

    #[tokio::test]
    async fn sort_toggle_via_dispatch_switches_ordering() {
        let hooks = Arc::new(RecordingHooks::new(false));
        let (mut controller, _tx) = controller_with(hooks);
        {
            let mut app = controller.app.lock().await;
            app.install_root(two_file_tree());
        }

        controller.dispatch_action(Action::ToggleSort).await;
        let app = controller.app.lock().await;
        assert_eq!(app.sort, SortMode::Name);
        assert_eq!(app.visible_children()[0].name, "bar");
    }
}
