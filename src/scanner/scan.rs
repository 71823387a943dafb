//! src/scanner/scan.rs
//! ============================================================================
//! # Scanner: Bounded-Parallel Directory Walk
//!
//! Builds the in-memory [`Node`] tree for an absolute path, one task per
//! directory. Directory I/O concurrency is capped by a counting semaphore;
//! the slot is held only around the open→batched-read→close window and
//! released before child tasks are spawned, so a deep tree can never
//! deadlock on its own parent.
//!
//! Sizes aggregate bottom-up: a directory task adds its total to its parent
//! only after every child task it spawned has completed, so an observer of
//! the parent's size sees the finished subtree.

use crate::config::config::Config;
use crate::error::AppError;
use crate::scanner::node::Node;
use futures::StreamExt;
use futures::future::BoxFuture;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Shared per-scan context, cheap to clone into each directory task.
#[derive(Clone)]
struct ScanCtx {
    sem: Arc<Semaphore>,
    cancel: CancellationToken,
    progress: Option<mpsc::Sender<i64>>,
    batch_size: usize,
    stat_fanout: usize,
}

/// Scan the tree rooted at `root_path`, emitting per-batch byte subtotals to
/// `progress` (best-effort, drop-on-full).
///
/// Returns the root node once every worker has finished; the tree is
/// quiescent from the caller's point of view. A cancelled scan returns the
/// partial tree with no error. Only an unstattable root fails.
pub async fn scan(
    cancel: CancellationToken,
    root_path: impl Into<PathBuf>,
    progress: Option<mpsc::Sender<i64>>,
    cfg: &Config,
) -> Result<Arc<Node>, AppError> {
    let raw: PathBuf = root_path.into();
    let root_path: PathBuf = std::path::absolute(&raw).map_err(|source| AppError::Path {
        path: raw.clone(),
        source,
    })?;

    let meta = fs::symlink_metadata(&root_path)
        .await
        .map_err(|source| AppError::Path {
            path: root_path.clone(),
            source,
        })?;

    let root: Arc<Node> = Node::root(root_path.to_string_lossy().as_ref(), meta.is_dir());

    if !meta.is_dir() {
        // A file (or symlink) root is a single-node tree.
        root.set_size(meta.len() as i64);
        send_progress(&progress, &cancel, meta.len() as i64);
        return Ok(root);
    }

    let ctx = ScanCtx {
        sem: Arc::new(Semaphore::new(cfg.scan_permits())),
        cancel,
        progress,
        batch_size: cfg.read_batch_size.max(1),
        stat_fanout: cfg.stat_fanout.max(1),
    };

    debug!(
        "scan start: {} (permits={})",
        root_path.display(),
        cfg.scan_permits()
    );

    // The root task awaits its entire subtree before returning.
    scan_dir(ctx, root.clone(), root_path).await;

    Ok(root)
}

/// One directory's task: read it under a semaphore slot, then run child
/// directory tasks to completion, then signal the parent.
///
/// Boxed because the walk recurses through task spawns.
fn scan_dir(ctx: ScanCtx, node: Arc<Node>, path: PathBuf) -> BoxFuture<'static, ()> {
    Box::pin(async move {
        walk_dir(&ctx, &node, path).await;

        // Completion bookkeeping runs even for cancelled or errored
        // directories: whatever was counted still reaches the parent.
        if let Some(parent) = node.parent() {
            parent.add_size(node.size());
        }
    })
}

/// Read one directory in batches and spawn tasks for its subdirectories.
/// The semaphore slot covers only the directory I/O; child tasks acquire
/// their own slots.
async fn walk_dir(ctx: &ScanCtx, node: &Arc<Node>, path: PathBuf) {
    let mut subdirs: Vec<(Arc<Node>, PathBuf)> = Vec::new();

    {
        let Ok(_permit) = ctx.sem.acquire().await else {
            return; // semaphore closed, scan is shutting down
        };

        if ctx.cancel.is_cancelled() {
            return;
        }

        let mut read_dir = match fs::read_dir(&path).await {
            Ok(rd) => rd,
            Err(e) => {
                node.record_err(e);
                return;
            }
        };

        loop {
            if ctx.cancel.is_cancelled() {
                break;
            }

            let (entries, done) = read_batch(&mut read_dir, ctx.batch_size, node).await;
            if !entries.is_empty() {
                process_batch(ctx, node, &path, entries, &mut subdirs).await;
            }
            if done {
                break;
            }
        }

        // _permit drops here: the slot is free before any child task runs.
    }

    if subdirs.is_empty() {
        return;
    }

    let mut tasks: JoinSet<()> = JoinSet::new();
    for (child, child_path) in subdirs {
        tasks.spawn(scan_dir(ctx.clone(), child, child_path));
    }
    while tasks.join_next().await.is_some() {}
}

/// Pull up to `batch_size` entries. Returns `(entries, done)`; a read error
/// is recorded on `node` and ends the directory.
async fn read_batch(
    read_dir: &mut fs::ReadDir,
    batch_size: usize,
    node: &Arc<Node>,
) -> (Vec<fs::DirEntry>, bool) {
    let mut entries: Vec<fs::DirEntry> = Vec::new();
    loop {
        match read_dir.next_entry().await {
            Ok(Some(entry)) => {
                entries.push(entry);
                if entries.len() >= batch_size {
                    return (entries, false);
                }
            }
            Ok(None) => return (entries, true),
            Err(e) => {
                node.record_err(e);
                return (entries, true);
            }
        }
    }
}

/// Append the batch's children in encounter order (the scanner never
/// sorts), stat file entries with a bounded fan-out, apply one atomic add
/// for the batch subtotal, and emit one progress message.
async fn process_batch(
    ctx: &ScanCtx,
    node: &Arc<Node>,
    dir_path: &Path,
    entries: Vec<fs::DirEntry>,
    subdirs: &mut Vec<(Arc<Node>, PathBuf)>,
) {
    let mut batch: Vec<Arc<Node>> = Vec::with_capacity(entries.len());
    let mut file_jobs: Vec<(Arc<Node>, fs::DirEntry)> = Vec::new();

    for entry in entries {
        let name = entry.file_name();
        let name = name.to_string_lossy();

        let file_type = match entry.file_type().await {
            Ok(ft) => ft,
            Err(e) => {
                // Entry vanished mid-scan: keep it as an errored leaf.
                let child = Node::child(node, name.as_ref(), false);
                child.record_err(e);
                batch.push(child);
                continue;
            }
        };

        if file_type.is_symlink() {
            // Zero-size leaf, never followed.
            batch.push(Node::child(node, name.as_ref(), false));
        } else if file_type.is_dir() {
            let child = Node::child(node, name.as_ref(), true);
            batch.push(child.clone());
            subdirs.push((child, dir_path.join(name.as_ref())));
        } else {
            let child = Node::child(node, name.as_ref(), false);
            batch.push(child.clone());
            file_jobs.push((child, entry));
        }
    }

    // One short lock for the whole batch; the guard never crosses an await.
    node.children.write().append(&mut batch);

    if file_jobs.is_empty() {
        return;
    }

    let batch_total: i64 = futures::stream::iter(file_jobs)
        .map(|(child, entry)| async move {
            match entry.metadata().await {
                Ok(md) => {
                    let sz = md.len() as i64;
                    child.set_size(sz);
                    sz
                }
                Err(e) => {
                    child.record_err(e);
                    0
                }
            }
        })
        .buffer_unordered(ctx.stat_fanout)
        .fold(0i64, |acc, sz| async move { acc + sz })
        .await;

    if batch_total > 0 {
        node.add_size(batch_total);
        send_progress(&ctx.progress, &ctx.cancel, batch_total);
    }
}

/// Non-blocking progress emission; drops when the receiver is slow.
fn send_progress(progress: &Option<mpsc::Sender<i64>>, cancel: &CancellationToken, bytes: i64) {
    if bytes == 0 || cancel.is_cancelled() {
        return;
    }
    if let Some(tx) = progress {
        let _ = tx.try_send(bytes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs as std_fs;
    use tempfile::TempDir;

    fn test_config() -> Config {
        Config::default()
    }

    /// Size conservation: every directory's total equals the sum of its
    /// children's totals.
    fn assert_conserved(node: &Arc<Node>) {
        if !node.is_dir {
            return;
        }
        let children = node.children.read();
        let sum: i64 = children.iter().map(|c| c.size()).sum();
        assert_eq!(
            node.size(),
            sum,
            "size mismatch at {:?}: {} != sum {}",
            node.name,
            node.size(),
            sum
        );
        for child in children.iter() {
            assert_conserved(child);
        }
    }

    #[tokio::test]
    async fn empty_directory() {
        let tmp = TempDir::new().unwrap();
        std_fs::create_dir(tmp.path().join("empty")).unwrap();

        let root = scan(CancellationToken::new(), tmp.path(), None, &test_config())
            .await
            .unwrap();

        assert_eq!(root.size(), 0);
        let children = root.children.read();
        assert_eq!(children.len(), 1);
        assert!(children[0].is_dir);
        assert_eq!(children[0].size(), 0);
    }

    #[tokio::test]
    async fn flat_directory_sums_file_sizes() {
        let tmp = TempDir::new().unwrap();
        std_fs::write(tmp.path().join("a.txt"), vec![0u8; 100]).unwrap();
        std_fs::write(tmp.path().join("b.txt"), vec![0u8; 500]).unwrap();
        std_fs::write(tmp.path().join("c.txt"), vec![0u8; 1000]).unwrap();

        let root = scan(CancellationToken::new(), tmp.path(), None, &test_config())
            .await
            .unwrap();

        assert_eq!(root.size(), 1600);
        assert_eq!(root.child_count(), 3);
        assert_conserved(&root);
    }

    #[tokio::test]
    async fn nested_tree_aggregates_bottom_up() {
        let tmp = TempDir::new().unwrap();
        std_fs::create_dir(tmp.path().join("sub")).unwrap();
        std_fs::write(tmp.path().join("sub/f1.bin"), vec![0u8; 1000]).unwrap();
        std_fs::write(tmp.path().join("sub/f2.bin"), vec![0u8; 1000]).unwrap();
        std_fs::write(tmp.path().join("root.txt"), vec![0u8; 100]).unwrap();

        let root = scan(CancellationToken::new(), tmp.path(), None, &test_config())
            .await
            .unwrap();

        assert_eq!(root.size(), 2100);
        let children = root.children.read();
        let sub = children.iter().find(|c| c.name == "sub").unwrap();
        assert_eq!(sub.size(), 2000);
        drop(children);
        assert_conserved(&root);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn symlinks_are_zero_size_leaves() {
        let tmp = TempDir::new().unwrap();
        std_fs::create_dir(tmp.path().join("real_dir")).unwrap();
        std_fs::write(tmp.path().join("real_dir/file.bin"), vec![0u8; 500]).unwrap();
        std::os::unix::fs::symlink(tmp.path().join("real_dir"), tmp.path().join("symlink_dir"))
            .unwrap();

        let root = scan(CancellationToken::new(), tmp.path(), None, &test_config())
            .await
            .unwrap();

        assert_eq!(root.size(), 500);
        let children = root.children.read();
        let link = children.iter().find(|c| c.name == "symlink_dir").unwrap();
        assert!(!link.is_dir);
        assert_eq!(link.size(), 0);
        assert_eq!(link.child_count(), 0);
    }

    #[tokio::test]
    async fn pre_cancelled_token_returns_partial_tree_without_error() {
        let tmp = TempDir::new().unwrap();
        std_fs::create_dir_all(tmp.path().join("a/b/c")).unwrap();
        std_fs::write(tmp.path().join("a/b/c/deep.bin"), vec![0u8; 64]).unwrap();

        let cancel = CancellationToken::new();
        cancel.cancel();

        let root = scan(cancel, tmp.path(), None, &test_config())
            .await
            .unwrap();
        assert!(root.is_dir);
        assert_conserved(&root);
    }

    #[tokio::test]
    async fn non_directory_root_is_single_node() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("lone.bin");
        std_fs::write(&file, vec![0u8; 321]).unwrap();

        let (tx, mut rx) = mpsc::channel(16);
        let root = scan(CancellationToken::new(), &file, Some(tx), &test_config())
            .await
            .unwrap();

        assert!(!root.is_dir);
        assert_eq!(root.size(), 321);
        assert_eq!(root.child_count(), 0);
        assert_eq!(rx.try_recv().unwrap(), 321);
    }

    #[tokio::test]
    async fn missing_root_is_a_path_error() {
        let tmp = TempDir::new().unwrap();
        let gone = tmp.path().join("no-such-entry");

        let err = scan(CancellationToken::new(), &gone, None, &test_config())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Path { .. }));
    }

    #[tokio::test]
    async fn drained_progress_equals_total_file_bytes() {
        let tmp = TempDir::new().unwrap();
        std_fs::create_dir(tmp.path().join("sub")).unwrap();
        std_fs::write(tmp.path().join("one.bin"), vec![0u8; 700]).unwrap();
        std_fs::write(tmp.path().join("sub/two.bin"), vec![0u8; 300]).unwrap();

        // Capacity comfortably above the file count, so nothing is dropped.
        let (tx, mut rx) = mpsc::channel(64);
        let root = scan(CancellationToken::new(), tmp.path(), Some(tx), &test_config())
            .await
            .unwrap();

        let mut emitted: i64 = 0;
        while let Ok(b) = rx.try_recv() {
            emitted += b;
        }
        assert_eq!(emitted, 1000);
        assert_eq!(root.size(), 1000);
    }

    #[tokio::test]
    async fn children_keep_parent_links_for_full_path() {
        let tmp = TempDir::new().unwrap();
        std_fs::create_dir(tmp.path().join("sub")).unwrap();
        std_fs::write(tmp.path().join("sub/leaf.txt"), b"x").unwrap();

        let root = scan(CancellationToken::new(), tmp.path(), None, &test_config())
            .await
            .unwrap();

        let children = root.children.read();
        let sub = children.iter().find(|c| c.name == "sub").unwrap();
        let sub_children = sub.children.read();
        let leaf = &sub_children[0];
        let expected = std::path::absolute(tmp.path()).unwrap().join("sub/leaf.txt");
        assert_eq!(leaf.full_path(), expected);
    }
}
