use crate::chore::{Chore, ChoreCatalog};
use crate::roster::Roster;
use std::collections::BTreeMap;

/// Roster used when no configuration is supplied.
pub fn default_roster() -> Roster {
    ["Person 1", "Person 2", "Person 3", "Person 4"]
        .into_iter()
        .collect()
}

/// Chore catalog used when no configuration is supplied.
pub fn default_chores() -> ChoreCatalog {
    [
        Chore::new("clean-kitchen", "Clean Kitchen", 1)
            .with_description("Wipe counters, do dishes, clean sink.")
            .with_icon("CookingPot"),
        Chore::new("clean-living-area", "Clean Living Area", 1)
            .with_description("Tidy up, dust surfaces, vacuum.")
            .with_icon("Sofa"),
        Chore::new("clean-bathroom", "Clean Bathroom", 1)
            .with_description("Clean toilet, sink, and shower.")
            .with_icon("Bath"),
        Chore::new("take-out-trash", "Take out Trash", 1)
            .with_description("Empty all non-kitchen trash bins and take to curb.")
            .with_icon("Trash"),
    ]
    .into_iter()
    .collect()
}

/// Completed-task counts the board starts with.
pub fn default_completions() -> BTreeMap<String, u32> {
    BTreeMap::from([
        ("Person 1".to_string(), 5),
        ("Person 2".to_string(), 4),
        ("Person 3".to_string(), 6),
        ("Person 4".to_string(), 5),
    ])
}

/// Template for a chore added without details.
pub fn new_chore(id: impl Into<String>) -> Chore {
    Chore::new(id, "New Task", 1)
        .with_description("Task description")
        .with_icon("ClipboardList")
}
