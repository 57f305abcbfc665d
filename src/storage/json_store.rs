//! JSON storage for the workspace
//!
//! The whole portfolio lives in `.gantt/workspace.json`. Readers take a shared
//! lock and writers an exclusive lock on `.gantt/workspace.lock`, held across
//! the whole read-modify-write so concurrent commands never interleave.
//! Writes go to a temp file that is renamed over the original.

use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fs2::FileExt;

use super::config::DATA_DIR;
use crate::domain::Portfolio;

/// Store for workspace data in JSON format
pub struct WorkspaceStore {
    path: PathBuf,
    lock_path: PathBuf,
}

impl WorkspaceStore {
    /// Creates a new store at the given path; the lock file sits beside it
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let lock_path = path.with_extension("lock");
        Self { path, lock_path }
    }

    /// Creates the default store for a project
    pub fn for_project(project_root: &Path) -> Self {
        Self::new(project_root.join(DATA_DIR).join("workspace.json"))
    }

    /// Returns the path to the store file
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    fn open_lock(&self) -> Result<File> {
        if let Some(parent) = self.lock_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.lock_path)
            .with_context(|| format!("Failed to open lock file: {}", self.lock_path.display()))
    }

    /// Reads the portfolio. A missing file reads as an empty portfolio.
    pub fn read(&self) -> Result<Portfolio> {
        let lock = self.open_lock()?;

        // Acquire shared lock for reading
        lock.lock_shared()
            .context("Failed to acquire read lock on workspace")?;

        // Lock is released when `lock` is dropped
        self.read_unlocked()
    }

    fn read_unlocked(&self) -> Result<Portfolio> {
        if !self.path.exists() {
            return Ok(Portfolio::default());
        }

        let file = File::open(&self.path)
            .with_context(|| format!("Failed to open workspace: {}", self.path.display()))?;

        serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to parse workspace: {}", self.path.display()))
    }

    /// Writes the portfolio (full rewrite)
    pub fn write(&self, portfolio: &Portfolio) -> Result<()> {
        let lock = self.open_lock()?;

        lock.lock_exclusive()
            .context("Failed to acquire write lock on workspace")?;

        self.write_unlocked(portfolio)
    }

    fn write_unlocked(&self, portfolio: &Portfolio) -> Result<()> {
        // Write to temp file first
        let temp_path = self.path.with_extension("json.tmp");

        {
            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)
                .with_context(|| format!("Failed to create temp file: {}", temp_path.display()))?;

            let mut writer = BufWriter::new(&file);
            serde_json::to_writer_pretty(&mut writer, portfolio)
                .context("Failed to serialize workspace")?;
            writeln!(writer).context("Failed to write workspace")?;
            writer.flush().context("Failed to flush workspace")?;
        }

        // Atomic rename
        fs::rename(&temp_path, &self.path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                temp_path.display(),
                self.path.display()
            )
        })?;

        tracing::debug!(path = %self.path.display(), "saved workspace");
        Ok(())
    }

    /// Reads, modifies and writes the portfolio under one exclusive lock.
    ///
    /// Nothing is written when `f` fails.
    pub fn update<R>(&self, f: impl FnOnce(&mut Portfolio) -> Result<R>) -> Result<R> {
        let lock = self.open_lock()?;

        lock.lock_exclusive()
            .context("Failed to acquire write lock on workspace")?;

        let mut portfolio = self.read_unlocked()?;
        let result = f(&mut portfolio)?;
        self.write_unlocked(&portfolio)?;

        Ok(result)
    }
}
