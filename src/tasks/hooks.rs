//! src/tasks/hooks.rs
//! ============================================================================
//! # OpsHooks: Injectable OS Action Hooks
//!
//! The three platform operations (open, reveal, trash) plus the
//! purgeable-space query are the core's only integration points with the
//! host OS. They are injected behind a trait so the model and event loop
//! stay testable without opening applications or trashing real files.
//!
//! `PlatformHooks` is the default implementation: it shells out through
//! `tokio::process::Command`, each call wrapped in a deadline.

use crate::error::AppError;
use futures::future::BoxFuture;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// Injectable OS operations. All methods take an absolute path.
///
/// `trash` is the only mutating operation: on success the path no longer
/// resolves; on failure the caller must leave the tree untouched.
pub trait OpsHooks: Send + Sync {
    /// Open the path in the host's default application.
    fn open(
        &self,
        cancel: CancellationToken,
        path: PathBuf,
    ) -> BoxFuture<'static, Result<(), AppError>>;

    /// Select/highlight the path in the host's file manager.
    fn reveal(
        &self,
        cancel: CancellationToken,
        path: PathBuf,
    ) -> BoxFuture<'static, Result<(), AppError>>;

    /// Move the path to the platform trash.
    fn trash(
        &self,
        cancel: CancellationToken,
        path: PathBuf,
    ) -> BoxFuture<'static, Result<(), AppError>>;

    /// Best-effort volume-level purgeable byte count; 0 when unavailable.
    fn purgeable_space(&self, path: PathBuf) -> BoxFuture<'static, i64>;
}

/// Default hooks shelling out to the platform's own tools.
pub struct PlatformHooks {
    open_timeout: Duration,
    trash_timeout: Duration,
}

impl PlatformHooks {
    pub fn new(open_timeout: Duration, trash_timeout: Duration) -> Self {
        Self {
            open_timeout,
            trash_timeout,
        }
    }
}

impl OpsHooks for PlatformHooks {
    fn open(
        &self,
        cancel: CancellationToken,
        path: PathBuf,
    ) -> BoxFuture<'static, Result<(), AppError>> {
        let deadline = self.open_timeout;
        Box::pin(async move {
            let cmd = open_cmd(&path);
            run_hook("open", path, deadline, cancel, cmd).await
        })
    }

    fn reveal(
        &self,
        cancel: CancellationToken,
        path: PathBuf,
    ) -> BoxFuture<'static, Result<(), AppError>> {
        let deadline = self.open_timeout;
        Box::pin(async move {
            let cmd = reveal_cmd(&path);
            run_hook("reveal", path, deadline, cancel, cmd).await
        })
    }

    fn trash(
        &self,
        cancel: CancellationToken,
        path: PathBuf,
    ) -> BoxFuture<'static, Result<(), AppError>> {
        let deadline = self.trash_timeout;
        Box::pin(async move {
            let cmd = trash_cmd(&path);
            run_hook("trash", path, deadline, cancel, cmd).await
        })
    }

    fn purgeable_space(&self, _path: PathBuf) -> BoxFuture<'static, i64> {
        // Purgeable space needs a platform framework call the default
        // hooks don't make; shells that can compute it inject their own.
        Box::pin(async { 0 })
    }
}

/// Run one hook command to completion under a deadline and the shared
/// cancellation token. Non-zero exit surfaces stderr as the error detail.
async fn run_hook(
    op: &'static str,
    path: PathBuf,
    deadline: Duration,
    cancel: CancellationToken,
    mut cmd: Command,
) -> Result<(), AppError> {
    cmd.stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        // a timed-out or cancelled hook must not leave its child running
        .kill_on_drop(true);

    tokio::select! {
        _ = cancel.cancelled() => Err(AppError::Cancelled),
        res = timeout(deadline, cmd.output()) => match res {
            Err(_) => {
                warn!("{op} timed out after {deadline:?} for {}", path.display());
                Err(AppError::Timeout { op, path })
            }
            Ok(Err(e)) => Err(AppError::Action {
                op,
                path,
                detail: e.to_string(),
            }),
            Ok(Ok(out)) if out.status.success() => Ok(()),
            Ok(Ok(out)) => Err(AppError::Action {
                op,
                path,
                detail: String::from_utf8_lossy(&out.stderr).trim().to_string(),
            }),
        }
    }
}

#[cfg(target_os = "macos")]
fn open_cmd(path: &Path) -> Command {
    let mut c = Command::new("open");
    c.arg(path);
    c
}

#[cfg(target_os = "macos")]
fn reveal_cmd(path: &Path) -> Command {
    let mut c = Command::new("open");
    c.arg("-R").arg(path);
    c
}

#[cfg(target_os = "macos")]
fn trash_cmd(path: &Path) -> Command {
    let script = format!(
        "tell application \"Finder\" to delete POSIX file {:?}",
        path.to_string_lossy()
    );
    let mut c = Command::new("osascript");
    c.arg("-e").arg(script);
    c
}

#[cfg(all(unix, not(target_os = "macos")))]
fn open_cmd(path: &Path) -> Command {
    let mut c = Command::new("xdg-open");
    c.arg(path);
    c
}

#[cfg(all(unix, not(target_os = "macos")))]
fn reveal_cmd(path: &Path) -> Command {
    // No portable "select in file manager" on freedesktop; open the parent.
    let mut c = Command::new("xdg-open");
    c.arg(path.parent().unwrap_or(path));
    c
}

#[cfg(all(unix, not(target_os = "macos")))]
fn trash_cmd(path: &Path) -> Command {
    let mut c = Command::new("gio");
    c.arg("trash").arg(path);
    c
}

#[cfg(windows)]
fn open_cmd(path: &Path) -> Command {
    let mut c = Command::new("cmd");
    c.arg("/C").arg("start").arg("").arg(path);
    c
}

#[cfg(windows)]
fn reveal_cmd(path: &Path) -> Command {
    let mut c = Command::new("explorer");
    c.arg(format!("/select,{}", path.display()));
    c
}

#[cfg(windows)]
fn trash_cmd(path: &Path) -> Command {
    let mut c = Command::new("powershell");
    c.arg("-NoProfile").arg("-Command").arg(format!(
        "Add-Type -AssemblyName Microsoft.VisualBasic; \
         [Microsoft.VisualBasic.FileIO.FileSystem]::DeleteFile('{}', \
         'OnlyErrorDialogs', 'SendToRecycleBin')",
        path.display()
    ));
    c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    fn sh(script: &str) -> Command {
        let mut c = Command::new("sh");
        c.arg("-c").arg(script);
        c
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn nonzero_exit_surfaces_stderr() {
        let err = run_hook(
            "open",
            PathBuf::from("/x"),
            Duration::from_secs(2),
            CancellationToken::new(),
            sh("echo boom >&2; exit 3"),
        )
        .await
        .unwrap_err();

        match err {
            AppError::Action { op, detail, .. } => {
                assert_eq!(op, "open");
                assert_eq!(detail, "boom");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn slow_hook_times_out() {
        let err = run_hook(
            "trash",
            PathBuf::from("/x"),
            Duration::from_millis(50),
            CancellationToken::new(),
            sh("sleep 5"),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Timeout { op: "trash", .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn cancelled_token_aborts_hook() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = run_hook(
            "reveal",
            PathBuf::from("/x"),
            Duration::from_secs(2),
            cancel,
            sh("sleep 5"),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Cancelled));
    }

    #[tokio::test]
    async fn default_purgeable_space_is_zero() {
        let hooks = PlatformHooks::new(Duration::from_secs(2), Duration::from_secs(3));
        assert_eq!(hooks.purgeable_space(PathBuf::from("/")).await, 0);
    }
}
