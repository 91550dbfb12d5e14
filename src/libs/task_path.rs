//! Positional encoding of tasks in the task tree.
//!
//! A task is located by the path shared with its siblings plus its own
//! 1-based sibling number rendered as two uppercase hexadecimal digits.
//! The concatenation of both (the full path) is the path of the task's
//! children, which turns "is an ancestor of" into a prefix test and "all
//! descendants" into a `LIKE 'prefix%'` query.
//!
//! ## Invariants
//!
//! - A path has an even length and holds uppercase hex digits only.
//! - The root path is the empty string.
//! - Lexicographic ordering of full paths is the tree print order
//!   (`"0101" < "010101" < "0102"`).

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Width of one encoded sibling number.
pub const SEGMENT_LEN: usize = 2;

/// Highest sibling number one segment can encode.
pub const MAX_NUMBER: u8 = u8::MAX;

/// Placeholder number used while two siblings swap positions.
pub const PLACEHOLDER_NUMBER: u8 = 0;

#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TaskPath(String);

impl TaskPath {
    /// The path shared by root-level tasks.
    pub fn root() -> Self {
        Self(String::new())
    }

    pub fn parse(value: &str) -> Result<Self, String> {
        if value.len() % SEGMENT_LEN != 0 {
            return Err(format!("task path '{value}' has an odd length"));
        }
        if !value.chars().all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c)) {
            return Err(format!("task path '{value}' is not made of uppercase hex digits"));
        }
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of ancestors of a task stored under this path.
    pub fn depth(&self) -> usize {
        self.0.len() / SEGMENT_LEN
    }

    /// Full path of the child numbered `number` under this path.
    pub fn child(&self, number: u8) -> Self {
        Self(format!("{}{:02X}", self.0, number))
    }

    /// Path shared by the siblings of the task whose full path is `self`.
    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }
        Some(Self(self.0[..self.0.len() - SEGMENT_LEN].to_string()))
    }

    /// Sibling number encoded by the last segment.
    pub fn last_number(&self) -> Option<u8> {
        if self.is_root() {
            return None;
        }
        u8::from_str_radix(&self.0[self.0.len() - SEGMENT_LEN..], 16).ok()
    }

    /// Full paths of every ancestor, root-level first, `self` excluded.
    pub fn ancestors(&self) -> Vec<Self> {
        (1..self.depth()).map(|depth| Self(self.0[..depth * SEGMENT_LEN].to_string())).collect()
    }

    pub fn is_prefix_of(&self, other: &TaskPath) -> bool {
        other.0.starts_with(&self.0)
    }

    /// Replaces the first `old_len` characters with `new_prefix`.
    ///
    /// This is the single rewrite rule used when a subtree changes place:
    /// every descendant keeps its own tail and receives the new ancestor head.
    pub fn replace_prefix(&self, old_len: usize, new_prefix: &TaskPath) -> Self {
        Self(format!("{}{}", new_prefix.0, &self.0[old_len.min(self.0.len())..]))
    }

    /// SQL `LIKE` pattern matching this path and every path below it.
    pub fn like_pattern(&self) -> String {
        format!("{}%", self.0)
    }
}

impl Display for TaskPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for TaskPath {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<TaskPath> for String {
    fn from(value: TaskPath) -> Self {
        value.0
    }
}

impl ToSql for TaskPath {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.0.as_str()))
    }
}

impl FromSql for TaskPath {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let text = value.as_str()?;
        TaskPath::parse(text).map_err(|err| FromSqlError::Other(err.into()))
    }
}
