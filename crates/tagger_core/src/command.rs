//! Logical commands accepted by a session

use crate::tags::TagId;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One user action, already decoded from whatever input produced it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", content = "args", rename_all = "snake_case")]
pub enum Command {
    // Navigation
    Next,
    Previous,
    First,
    Last,
    /// Jump to the subset image closest to a catalog id
    Goto(u32),

    /// Tag key press; grid mode selects the active tag instead of tagging
    Key(char),

    // Tagging; `image` defaults to the current image
    AddTag { tag: TagId, image: Option<u32> },
    DeleteTag { tag: TagId, image: Option<u32> },

    // Grid
    /// Toggle the active tag on a 0-based cell of the current page
    ToggleCell(usize),
    SetActiveTag(TagId),

    // Queries
    ShowTags,
    ShowCounts,
    ExportSubset { tag: TagId, path: PathBuf },

    // Auto-advance
    ToggleAutoAdvance,
    AdjustDelay(i64),
    Tick,

    Quit,
}
