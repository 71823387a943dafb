//! src/config/config.rs
//! ============================================================================
//! # Config: Scanner and UI Tunables
//!
//! Holds every knob the scanner and the view consult. The analyzer persists
//! nothing on disk, so values come from built-in defaults overlaid with
//! `DUSK_*` environment variables.

use std::env;
use std::time::Duration;

/// Main configuration struct for the application.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory I/O concurrency = `max(4, logical_cpus * worker_multiplier)`.
    pub worker_multiplier: usize,

    /// Entries read from a directory per batch. Caps peak memory on
    /// million-entry directories.
    pub read_batch_size: usize,

    /// Concurrent metadata fetches within one batch.
    pub stat_fanout: usize,

    /// Capacity of the bounded scanner→UI progress channel. Sends are
    /// drop-on-full; a slow UI never stalls a worker.
    pub progress_capacity: usize,

    /// Deadline for the open/reveal hooks.
    pub open_timeout: Duration,

    /// Deadline for the trash hook.
    pub trash_timeout: Duration,

    /// Upper bound on the proportional bar width, in columns.
    pub bar_max_width: u16,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            worker_multiplier: 8,
            read_batch_size: 1024,
            stat_fanout: 8,
            progress_capacity: 4096,
            open_timeout: Duration::from_secs(2),
            trash_timeout: Duration::from_secs(3),
            bar_max_width: 30,
        }
    }
}

impl Config {
    /// Defaults overlaid with `DUSK_*` environment variables. Unparseable
    /// values fall back to the default silently.
    pub fn from_env() -> Self {
        let mut cfg = Config::default();
        if let Some(v) = env_usize("DUSK_WORKER_MULTIPLIER") {
            cfg.worker_multiplier = v.clamp(2, 32);
        }
        if let Some(v) = env_usize("DUSK_READ_BATCH_SIZE") {
            cfg.read_batch_size = v.max(1);
        }
        if let Some(v) = env_usize("DUSK_STAT_FANOUT") {
            cfg.stat_fanout = v.max(1);
        }
        if let Some(v) = env_usize("DUSK_PROGRESS_CAPACITY") {
            cfg.progress_capacity = v.max(1);
        }
        if let Some(v) = env_usize("DUSK_OPEN_TIMEOUT_MS") {
            cfg.open_timeout = Duration::from_millis(v as u64);
        }
        if let Some(v) = env_usize("DUSK_TRASH_TIMEOUT_MS") {
            cfg.trash_timeout = Duration::from_millis(v as u64);
        }
        if let Some(v) = env_usize("DUSK_BAR_MAX_WIDTH") {
            cfg.bar_max_width = v.min(u16::MAX as usize) as u16;
        }
        cfg
    }

    /// Semaphore permits for directory I/O.
    pub fn scan_permits(&self) -> usize {
        (num_cpus::get() * self.worker_multiplier).max(4)
    }
}

fn env_usize(key: &str) -> Option<usize> {
    env::var(key).ok()?.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let cfg = Config::default();
        assert_eq!(cfg.read_batch_size, 1024);
        assert!(cfg.scan_permits() >= 4);
        assert_eq!(cfg.bar_max_width, 30);
    }

    #[test]
    fn env_overrides_clamp_multiplier() {
        // SAFETY: test-only env mutation, no other thread reads this key.
        unsafe { env::set_var("DUSK_WORKER_MULTIPLIER", "100") };
        let cfg = Config::from_env();
        assert_eq!(cfg.worker_multiplier, 32);
        unsafe { env::remove_var("DUSK_WORKER_MULTIPLIER") };
    }
}
