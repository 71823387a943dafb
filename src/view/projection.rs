//! src/view/projection.rs
//! ============================================================================
//! # ViewProjection: Pure NavModel → Row Mapping
//!
//! Everything here is a pure function of the model: the scroll window, the
//! char-aware name truncation, proportional bar widths, rank color buckets,
//! and humanized sizes. The ratatui components consume these and add
//! nothing but styling.

use crate::scanner::node::Node;
use bytesize::ByteSize;
use std::sync::Arc;

/// Number of rank color buckets (largest entries land in bucket 0).
pub const COLOR_BUCKETS: usize = 6;

/// Kind of glyph a row gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    Dir,
    File,
    /// Entry whose scan captured an error.
    Errored,
}

/// One renderable list row.
#[derive(Debug, Clone)]
pub struct Row {
    pub kind: RowKind,
    /// Name truncated to the computed column width.
    pub name: String,
    pub size: i64,
    /// Share of the parent directory's size, in `[0, 1]`.
    pub ratio: f64,
    /// Proportional bar length in columns.
    pub bar: u16,
    /// Rank color bucket, `0..COLOR_BUCKETS`.
    pub bucket: usize,
    pub selected: bool,
}

/// Scroll window `[start, end)` keeping `cursor` visible within `height`
/// rows: full when possible, centered on the cursor, sliding one row at
/// a time at the edges.
pub fn scroll_window(cursor: usize, total: usize, height: usize) -> (usize, usize) {
    if total <= height {
        return (0, total);
    }
    let mut start = cursor.saturating_sub(height / 2);
    let mut end = start + height;
    if end > total {
        end = total;
        start = end - height;
    }
    (start, end)
}

/// Shorten `s` to at most `max_chars` Unicode scalar values, the last one
/// replaced by an ellipsis when anything was cut.
pub fn truncate(s: &str, max_chars: usize) -> String {
    if max_chars == 0 {
        return String::new();
    }
    let count = s.chars().count();
    if count <= max_chars {
        return s.to_owned();
    }
    if max_chars == 1 {
        return s.chars().take(1).collect();
    }
    let mut out: String = s.chars().take(max_chars - 1).collect();
    out.push('…');
    out
}

/// Proportional bar length: `round(size/parent × bar_max)`, at least 1 for
/// any non-empty entry, 0 for an empty one.
pub fn bar_len(size: i64, parent_size: i64, bar_max: u16) -> u16 {
    if size <= 0 {
        return 0;
    }
    if parent_size <= 0 {
        return 1;
    }
    let ratio = size as f64 / parent_size as f64;
    let len = (ratio * f64::from(bar_max)).round() as u16;
    len.clamp(1, bar_max)
}

/// Rank → color bucket: `rank × (buckets−1) / max(1, total−1)`.
pub fn color_bucket(rank: usize, total: usize, buckets: usize) -> usize {
    if buckets == 0 {
        return 0;
    }
    let idx = rank * (buckets - 1) / total.saturating_sub(1).max(1);
    idx.min(buckets - 1)
}

/// Humanized byte count for display; negatives render as zero.
pub fn human_size(size: i64) -> String {
    ByteSize::b(size.max(0) as u64).to_string()
}

/// Fraction of the parent's size, `0.0` when the parent is empty.
pub fn ratio_of(size: i64, parent_size: i64) -> f64 {
    if parent_size <= 0 {
        return 0.0;
    }
    (size as f64 / parent_size as f64).clamp(0.0, 1.0)
}

/// Project the visible slice of `children` into rows.
///
/// `window` is a `scroll_window` result; `rank` (the color input) is the
/// absolute index in the sorted list, not the on-screen position.
pub fn project_rows(
    children: &[Arc<Node>],
    window: (usize, usize),
    cursor: usize,
    parent_size: i64,
    name_width: usize,
    bar_max: u16,
) -> Vec<Row> {
    let (start, end) = window;
    let total = children.len();

    children[start..end.min(total)]
        .iter()
        .enumerate()
        .map(|(offset, child)| {
            let rank = start + offset;
            let size = child.size();
            let kind = if child.err().is_some() {
                RowKind::Errored
            } else if child.is_dir {
                RowKind::Dir
            } else {
                RowKind::File
            };
            Row {
                kind,
                name: truncate(&child.name, name_width),
                size,
                ratio: ratio_of(size, parent_size),
                bar: bar_len(size, parent_size, bar_max),
                bucket: color_bucket(rank, total, COLOR_BUCKETS),
                selected: rank == cursor,
            }
        })
        .collect()
}
