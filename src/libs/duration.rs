use serde::{Deserialize, Serialize};

/// A reusable contribution amount.
///
/// The id is the magnitude itself, in hundredths of a unit, which is why
/// changing it means removing the old duration and creating a new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Duration {
    pub id: i64,
    pub is_active: bool,
}

impl Duration {
    pub fn new(id: i64) -> Self {
        Duration { id, is_active: true }
    }
}
