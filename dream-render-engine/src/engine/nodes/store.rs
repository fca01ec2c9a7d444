use std::collections::HashSet;

use bevy::log::warn;
use bevy::prelude::Resource;
use serde_json::Value;

use super::visual_node::VisualNode;

/// Outcome of writing one node into the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Inserted,
    Updated,
    Unchanged,
    /// Dropped: malformed or unusable input.
    Rejected,
}

/// Write channel from the external data layer into the visualizer.
///
/// Progress is clamped to `[0, 100]` on write. Crossing into 100 queues a
/// one-shot completion signal, re-armed when progress falls back below.
#[derive(Resource, Debug, Default)]
pub struct NodeStore {
    nodes: Vec<VisualNode>,
    completed: HashSet<String>,
    pending_completed: Vec<String>,
    revision: u64,
}

impl NodeStore {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Bumped on every visible change.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn iter(&self) -> impl Iterator<Item = &VisualNode> {
        self.nodes.iter()
    }

    pub fn get(&self, id: &str) -> Option<&VisualNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn selected(&self) -> Option<&VisualNode> {
        self.nodes.iter().find(|node| node.selected)
    }

    pub fn hovered(&self) -> Option<&VisualNode> {
        self.nodes.iter().find(|node| node.hovered)
    }

    pub fn upsert(&mut self, mut node: VisualNode) -> Upsert {
        if node.id.is_empty() {
            warn!("Node without id ignored");
            return Upsert::Rejected;
        }
        node.progress = clamp_progress(node.progress);
        let existing = self.nodes.iter().position(|n| n.id == node.id);

        if !node.position.is_finite() {
            match existing {
                Some(index) => {
                    warn!("Node {} has a non-finite position, keeping the previous one", node.id);
                    node.position = self.nodes[index].position;
                }
                None => {
                    warn!("Node {} has a non-finite position, ignored", node.id);
                    return Upsert::Rejected;
                }
            }
        }

        self.track_completion(&node);
        let outcome = match existing {
            Some(index) if self.nodes[index] == node => return Upsert::Unchanged,
            Some(index) => {
                self.nodes[index] = node;
                Upsert::Updated
            }
            None => {
                self.nodes.push(node);
                Upsert::Inserted
            }
        };
        self.revision += 1;
        outcome
    }

    /// Parse and write one JSON node; malformed input is logged and skipped.
    pub fn upsert_json(&mut self, value: Value) -> Upsert {
        match serde_json::from_value::<VisualNode>(value) {
            Ok(node) => self.upsert(node),
            Err(error) => {
                warn!("Malformed node skipped: {}", error);
                Upsert::Rejected
            }
        }
    }

    /// Replace the whole set. Returns how many nodes were accepted.
    pub fn replace_all(&mut self, values: Vec<Value>) -> usize {
        self.nodes.clear();
        let mut accepted = 0;
        for value in values {
            if self.upsert_json(value) != Upsert::Rejected {
                accepted += 1;
            }
        }
        let nodes = &self.nodes;
        self.completed.retain(|id| nodes.iter().any(|n| &n.id == id));
        self.revision += 1;
        accepted
    }

    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.nodes.len();
        self.nodes.retain(|node| node.id != id);
        if self.nodes.len() == before {
            return false;
        }
        self.completed.remove(id);
        self.revision += 1;
        true
    }

    /// Mark `id` as the single selected node, or clear the selection.
    pub fn set_selected(&mut self, id: Option<&str>) -> bool {
        self.set_flag(id, |node| &mut node.selected)
    }

    pub fn set_hovered(&mut self, id: Option<&str>) -> bool {
        self.set_flag(id, |node| &mut node.hovered)
    }

    fn set_flag(&mut self, id: Option<&str>, flag: impl Fn(&mut VisualNode) -> &mut bool) -> bool {
        let mut changed = false;
        for node in &mut self.nodes {
            let value = Some(node.id.as_str()) == id;
            let slot = flag(node);
            if *slot != value {
                *slot = value;
                changed = true;
            }
        }
        if changed {
            self.revision += 1;
        }
        changed
    }

    /// Ids that reached full progress since the last drain.
    pub fn drain_completed(&mut self) -> std::vec::Drain<'_, String> {
        self.pending_completed.drain(..)
    }

    fn track_completion(&mut self, node: &VisualNode) {
        if node.progress >= 100.0 {
            if self.completed.insert(node.id.clone()) {
                self.pending_completed.push(node.id.clone());
            }
        } else {
            self.completed.remove(&node.id);
        }
    }
}

/// Clamp to `[0, 100]`; non-finite input reads as zero.
pub fn clamp_progress(progress: f32) -> f32 {
    if progress.is_finite() {
        progress.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::math::Vec3;
    use serde_json::json;

    fn node(id: &str, progress: f32) -> VisualNode {
        VisualNode {
            progress,
            ..VisualNode::new(id, Vec3::ZERO)
        }
    }

    #[test]
    fn progress_is_clamped_on_write() {
        let mut store = NodeStore::default();
        store.upsert(node("a", 150.0));
        store.upsert(node("b", -5.0));
        store.upsert(node("c", f32::NAN));
        assert_eq!(store.get("a").unwrap().progress, 100.0);
        assert_eq!(store.get("b").unwrap().progress, 0.0);
        assert_eq!(store.get("c").unwrap().progress, 0.0);
    }

    #[test]
    fn completion_fires_once_per_crossing() {
        let mut store = NodeStore::default();
        store.upsert(node("a", 90.0));
        store.upsert(node("a", 100.0));
        store.upsert(node("a", 120.0));
        assert_eq!(store.drain_completed().collect::<Vec<_>>(), ["a"]);

        store.upsert(node("a", 50.0));
        store.upsert(node("a", 100.0));
        assert_eq!(store.drain_completed().count(), 1);
    }

    #[test]
    fn malformed_json_is_skipped() {
        let mut store = NodeStore::default();
        let accepted = store.replace_all(vec![
            json!({ "id": "ok", "position": { "x": 1, "y": 2, "z": 3 } }),
            json!({ "id": "broken", "position": "nowhere" }),
            json!(42),
        ]);
        assert_eq!(accepted, 1);
        assert_eq!(store.len(), 1);
        assert!(store.get("ok").is_some());
    }

    #[test]
    fn unknown_kind_is_accepted_and_walks_the_chain() {
        use crate::engine::nodes::visual_kind::{ResolvedVisual, resolve_visual};

        let mut store = NodeStore::default();
        let outcome = store.upsert_json(json!({
            "id": "trip",
            "position": { "x": 0, "y": 0, "z": 0 },
            "visualizationKind": "hologram",
            "progress": "half",
            "category": "travel"
        }));
        assert_eq!(outcome, Upsert::Inserted);
        let stored = store.get("trip").unwrap();
        assert_eq!(stored.progress, 0.0);
        assert_eq!(resolve_visual(stored), ResolvedVisual::Glyph("✈".into()));
    }

    #[test]
    fn non_finite_position_keeps_previous() {
        let mut store = NodeStore::default();
        assert_eq!(store.upsert(node("a", 10.0)), Upsert::Inserted);

        let mut moved = node("a", 20.0);
        moved.position.x = f32::INFINITY;
        assert_eq!(store.upsert(moved), Upsert::Updated);
        let stored = store.get("a").unwrap();
        assert_eq!(stored.translation(), Vec3::ZERO);
        assert_eq!(stored.progress, 20.0);

        let mut fresh = node("b", 0.0);
        fresh.position.y = f32::NAN;
        assert_eq!(store.upsert(fresh), Upsert::Rejected);
    }

    #[test]
    fn selection_is_exclusive() {
        let mut store = NodeStore::default();
        store.upsert(node("a", 0.0));
        store.upsert(node("b", 0.0));
        assert!(store.set_selected(Some("a")));
        assert!(store.set_selected(Some("b")));
        assert_eq!(store.selected().map(|n| n.id.as_str()), Some("b"));
        assert!(!store.get("a").unwrap().selected);
        assert!(!store.set_selected(Some("b")));
        assert!(store.set_selected(None));
        assert!(store.selected().is_none());
    }

    #[test]
    fn revision_tracks_changes() {
        let mut store = NodeStore::default();
        store.upsert(node("a", 0.0));
        let revision = store.revision();
        assert_eq!(store.upsert(node("a", 0.0)), Upsert::Unchanged);
        assert_eq!(store.revision(), revision);
        assert!(store.remove("a"));
        assert!(!store.remove("a"));
        assert!(store.revision() > revision);
    }
}
