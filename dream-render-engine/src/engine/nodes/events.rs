use bevy::prelude::*;

/// Cursor hover changed; `None` when nothing is under the cursor.
#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub struct NodeHoverEvent(pub Option<String>);

#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub struct NodeSelectEvent(pub String);

/// A node's progress reached 100. Raised once per crossing.
#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub struct NodeCompleted(pub String);
