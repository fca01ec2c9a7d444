//! Formation ceremony for a dedicated particle set.
//!
//! Scattered → Forming → Formed → Locked, driven by caller-supplied
//! timestamps. Phase changes leave the controller as [`FormationEvent`]s in an
//! outbox; a fallback timer guarantees the set reaches Locked.

pub mod callbacks;
pub mod controller;
pub mod phase;
pub mod targets;
pub mod tasks;

pub use callbacks::{PhaseCallback, PhaseCallbacks};
pub use controller::FormationController;
pub use phase::{FormationEvent, FormationPhase, FormationPhaseEvent, FormationTimeline};
pub use tasks::{DelayedTasks, TaskHandle};
