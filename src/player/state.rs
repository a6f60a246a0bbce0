//! Observed stream state owned by the player.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::props::DEFAULT_LOG_LIMIT;
use crate::error::StreamError;
use crate::stream::StreamStatus;

/// Bounded message log.
///
/// New messages are appended at the tail; once the length exceeds the limit
/// the oldest entries are dropped from the head.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageLog {
    limit: usize,
    entries: VecDeque<Value>,
}

impl MessageLog {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            entries: VecDeque::new(),
        }
    }

    pub fn push(&mut self, message: Value) {
        self.entries.push_back(message);
        self.truncate();
    }

    /// Change the limit, dropping the oldest entries if needed.
    pub fn set_limit(&mut self, limit: usize) {
        self.limit = limit;
        self.truncate();
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter()
    }

    /// Oldest-first copy of the retained messages.
    pub fn to_vec(&self) -> Vec<Value> {
        self.entries.iter().cloned().collect()
    }

    fn truncate(&mut self) {
        while self.entries.len() > self.limit {
            self.entries.pop_front();
        }
    }
}

impl Default for MessageLog {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_LIMIT)
    }
}

/// State mirrored from the bound adapter's events.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObservedState {
    pub status: StreamStatus,
    pub is_open: bool,
    pub last_error: Option<StreamError>,
    pub messages: MessageLog,
}

impl ObservedState {
    pub fn new(log_limit: usize) -> Self {
        Self {
            messages: MessageLog::new(log_limit),
            ..Self::default()
        }
    }

    /// Start over for a new adapter instance, keeping the log limit.
    pub fn reset(&mut self) {
        *self = Self::new(self.messages.limit());
    }

    pub fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            status: self.status,
            is_open: self.is_open,
            error: self.last_error.clone(),
            messages: self.messages.to_vec(),
        }
    }
}

/// Point-in-time copy of the observed state, used for rendering.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub status: StreamStatus,
    pub is_open: bool,
    pub error: Option<StreamError>,
    pub messages: Vec<Value>,
}
