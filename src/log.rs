use serde::Serialize;
use std::collections::VecDeque;

/// Keeps the previous ten lines plus the newest one.
pub const DEFAULT_LOG_RETENTION: usize = 11;

/// Narrated battle log; the oldest lines fall off past the retention window.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BattleLog {
    #[serde(skip)]
    retention: usize,
    lines: VecDeque<String>,
}

impl BattleLog {
    pub fn new(retention: usize) -> Self {
        let retention = retention.max(1);
        BattleLog {
            retention,
            lines: VecDeque::with_capacity(retention),
        }
    }

    pub fn push(&mut self, line: impl Into<String>) {
        if self.lines.len() == self.retention {
            self.lines.pop_front();
        }
        self.lines.push_back(line.into());
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    pub fn last(&self) -> Option<&str> {
        self.lines.back().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.lines.iter().cloned().collect()
    }
}

impl Default for BattleLog {
    fn default() -> Self {
        BattleLog::new(DEFAULT_LOG_RETENTION)
    }
}
