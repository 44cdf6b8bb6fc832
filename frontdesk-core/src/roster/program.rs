//! Program definitions - the capacity-bounded activity slots

use serde::{Deserialize, Serialize};

/// One capacity-bounded activity attendees are assigned to.
///
/// `id` is stable display numbering only; `name` is the foreign-key value
/// records carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    pub id: u32,
    pub name: String,
    pub max_members: usize,
}

impl Program {
    pub fn new(id: u32, name: impl Into<String>, max_members: usize) -> Self {
        Program {
            id,
            name: name.into(),
            max_members,
        }
    }
}
