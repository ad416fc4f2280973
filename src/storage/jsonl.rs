//! JSONL storage for flat task lists
//!
//! One task per line, in `order_index` order. Records are stored flat: their
//! position in the outline is carried by `indent_level` and `order_index`.
//! Readers and writers coordinate through a sibling `.lock` file, since
//! writes replace the data file by rename.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fs2::FileExt;

use crate::domain::TaskRecord;

/// Store for a flat task list in JSONL format
pub struct TaskStore {
    path: PathBuf,
}

impl TaskStore {
    /// Creates a new task store at the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the path to the store file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the path of the lock file guarding the store
    pub fn lock_path(&self) -> PathBuf {
        self.path.with_extension("jsonl.lock")
    }

    fn open_lock(&self) -> Result<File> {
        let lock_path = self.lock_path();
        OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .with_context(|| format!("Failed to open lock file: {}", lock_path.display()))
    }

    /// Reads all tasks, sorted by `order_index`
    ///
    /// The sort is stable, so tasks sharing an index keep file order.
    pub fn read_all(&self) -> Result<Vec<TaskRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        // Acquire shared lock for reading
        let lock = self.open_lock()?;
        lock.lock_shared()
            .context("Failed to acquire read lock on task store")?;

        let file = File::open(&self.path)
            .with_context(|| format!("Failed to open task store: {}", self.path.display()))?;

        let reader = BufReader::new(&file);
        let mut tasks = Vec::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.with_context(|| format!("Failed to read line {}", line_num + 1))?;

            if line.trim().is_empty() {
                continue;
            }

            let task: TaskRecord = serde_json::from_str(&line)
                .with_context(|| format!("Failed to parse task at line {}", line_num + 1))?;

            tasks.push(task);
        }

        tasks.sort_by_key(|t| t.order_index);

        // Lock is released when `lock` is dropped
        Ok(tasks)
    }

    /// Writes a flat task list (full rewrite)
    ///
    /// Any children still attached to the records are not written.
    pub fn write_all(&self, tasks: &[TaskRecord]) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        // Exclusive lock held until the rename is done
        let lock = self.open_lock()?;
        lock.lock_exclusive()
            .context("Failed to acquire write lock on task store")?;

        // Write to temp file first
        let temp_path = self.path.with_extension("jsonl.tmp");

        {
            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)
                .with_context(|| format!("Failed to create temp file: {}", temp_path.display()))?;

            let mut writer = BufWriter::new(&file);

            for task in tasks {
                let row = if task.children.is_empty() {
                    serde_json::to_string(task)
                } else {
                    serde_json::to_string(&task.detached())
                };
                let line = row.context("Failed to serialize task")?;
                writeln!(writer, "{}", line).context("Failed to write task")?;
            }

            writer.flush().context("Failed to flush task store")?;
        }

        // Atomic rename
        fs::rename(&temp_path, &self.path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                temp_path.display(),
                self.path.display()
            )
        })?;

        drop(lock);
        Ok(())
    }
}
