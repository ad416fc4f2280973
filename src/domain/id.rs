//! Engine task identifiers
//!
//! ID Format: `t-{10-char-hash}` (e.g., `t-7f2b4c19a0`)
//!
//! The hash is derived from a generator seed (creation timestamp), a
//! sequence counter and the task name. Identifiers are always generated by
//! the engine; external document identifiers are never reused as task IDs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const HASH_LEN: usize = 10;

#[derive(Debug, Error, PartialEq)]
pub enum IdError {
    #[error("Invalid task ID format: expected 't-{{10-char-hash}}', got '{0}'")]
    InvalidTaskId(String),
}

fn generate_hash(seed: i64, sequence: u64, name: &str) -> String {
    let input = format!("{}:{}:{}", seed, sequence, name);
    let hash = blake3::hash(input.as_bytes());
    let hex = hash.to_hex();
    hex[..HASH_LEN].to_string()
}

/// Task ID in the format `t-{10-char-hash}`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TaskId {
    hash: String,
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t-{}", self.hash)
    }
}

impl FromStr for TaskId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let hash = s
            .strip_prefix("t-")
            .ok_or_else(|| IdError::InvalidTaskId(s.to_string()))?;

        if hash.len() != HASH_LEN || !hash.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(IdError::InvalidTaskId(s.to_string()));
        }

        Ok(Self {
            hash: hash.to_ascii_lowercase(),
        })
    }
}

impl TryFrom<String> for TaskId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TaskId> for String {
    fn from(id: TaskId) -> Self {
        id.to_string()
    }
}

/// Issues task IDs that are unique for the lifetime of the generator
///
/// One generator is used per import, so every record produced by a single
/// import run gets a distinct ID even when names repeat.
#[derive(Debug)]
pub struct IdGenerator {
    seed: i64,
    sequence: u64,
    issued: HashSet<String>,
}

impl IdGenerator {
    /// Creates a generator seeded with the current time
    pub fn new() -> Self {
        Self::with_seed(Utc::now())
    }

    /// Creates a generator with an explicit seed timestamp
    pub fn with_seed(seed: DateTime<Utc>) -> Self {
        Self {
            seed: seed.timestamp_nanos_opt().unwrap_or(0),
            sequence: 0,
            issued: HashSet::new(),
        }
    }

    /// Issues the next task ID
    pub fn next_id(&mut self, name: &str) -> TaskId {
        loop {
            self.sequence += 1;
            let hash = generate_hash(self.seed, self.sequence, name);
            if self.issued.insert(hash.clone()) {
                return TaskId { hash };
            }
        }
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}
