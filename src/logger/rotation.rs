//! Rotation bookkeeping for the file writer.
//!
//! Rotated files are renamed to `<stem>.<YYYYmmdd_HHMMSS>[.<n>].<ext>` next to
//! the live log. The timestamp sorts lexically, so pruning keeps the newest
//! `max_files` names without consulting file metadata.

use crate::logger::config::{RotationConfig, RotationStrategy, TimeUnit};
use crate::logger::error::LoggerError;
use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};

pub struct RotationManager {
    config: RotationConfig,
    last_rotation: DateTime<Utc>,
}

impl RotationManager {
    pub fn new(config: RotationConfig) -> Self {
        Self {
            config,
            last_rotation: Utc::now(),
        }
    }

    pub fn should_rotate(&self, current_size: u64) -> bool {
        self.should_rotate_at(current_size, Utc::now())
    }

    fn should_rotate_at(&self, current_size: u64, now: DateTime<Utc>) -> bool {
        let size_reached = current_size >= self.config.max_size;
        match self.config.strategy {
            RotationStrategy::Size => size_reached,
            RotationStrategy::Time(unit) => unit.elapsed_since(self.last_rotation, now),
            RotationStrategy::Combined => {
                size_reached || TimeUnit::Daily.elapsed_since(self.last_rotation, now)
            }
        }
    }

    /// Moves the live file aside and prunes old rotations.
    pub fn rotate(&mut self, live: &Path) -> Result<PathBuf, LoggerError> {
        let now = Utc::now();
        let rotated = rotated_path(live, now);
        if live.exists() {
            fs::rename(live, &rotated)?;
        }
        self.last_rotation = now;
        self.prune(live)?;
        Ok(rotated)
    }

    fn prune(&self, live: &Path) -> Result<(), LoggerError> {
        let mut rotated = rotated_files(live)?;
        if rotated.len() <= self.config.max_files {
            return Ok(());
        }
        rotated.sort();
        let excess = rotated.len() - self.config.max_files;
        for old in rotated.into_iter().take(excess) {
            fs::remove_file(old)?;
        }
        Ok(())
    }
}

fn stem_and_ext(live: &Path) -> (String, Option<String>) {
    let stem = live
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "log".to_string());
    let ext = live.extension().map(|e| e.to_string_lossy().into_owned());
    (stem, ext)
}

fn rotated_path(live: &Path, now: DateTime<Utc>) -> PathBuf {
    let (stem, ext) = stem_and_ext(live);
    let stamp = now.format("%Y%m%d_%H%M%S").to_string();
    let name = |n: usize| {
        let base = if n == 0 {
            format!("{stem}.{stamp}")
        } else {
            format!("{stem}.{stamp}.{n}")
        };
        match &ext {
            Some(ext) => format!("{base}.{ext}"),
            None => base,
        }
    };

    // several rotations within one second
    let mut n = 0;
    loop {
        let candidate = live.with_file_name(name(n));
        if !candidate.exists() {
            return candidate;
        }
        n += 1;
    }
}

fn rotated_files(live: &Path) -> Result<Vec<PathBuf>, LoggerError> {
    let parent = match live.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let (stem, _) = stem_and_ext(live);
    let prefix = format!("{stem}.");
    let live_name = live.file_name();

    let files = fs::read_dir(parent)?
        .filter_map(|entry| entry.ok())
        .filter(|entry| Some(entry.file_name().as_os_str()) != live_name)
        .filter(|entry| entry.file_name().to_string_lossy().starts_with(&prefix))
        .map(|entry| entry.path())
        .collect();
    Ok(files)
}
