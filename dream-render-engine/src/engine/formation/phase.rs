use bevy::prelude::Event;
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FormationPhase {
    #[default]
    Scattered,
    Forming,
    Formed,
    /// Terminal until an explicit reset.
    Locked,
}

/// Phase boundary crossed by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormationEvent {
    FormingStart,
    Formed,
    Locked,
}

impl FormationEvent {
    pub fn phase(self) -> FormationPhase {
        match self {
            Self::FormingStart => FormationPhase::Forming,
            Self::Formed => FormationPhase::Formed,
            Self::Locked => FormationPhase::Locked,
        }
    }

    /// Name used for callbacks and bridge notifications.
    pub fn label(self) -> &'static str {
        match self {
            Self::FormingStart => "forming_start",
            Self::Formed => "formed",
            Self::Locked => "locked",
        }
    }
}

/// Bevy-side mirror of a controller [`FormationEvent`], written once per
/// boundary after the frame's advance.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormationPhaseEvent(pub FormationEvent);

/// Phase-start timestamps, in the same clock passed to `advance`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FormationTimeline {
    pub forming_start: f32,
    pub formed_at: f32,
}

impl FormationTimeline {
    /// Forming begins at `start` and lasts `forming_secs`.
    pub fn starting_at(start: f32, forming_secs: f32) -> Self {
        Self {
            forming_start: start,
            formed_at: start + forming_secs.max(0.0),
        }
    }

    /// `formed_at` never precedes `forming_start`.
    pub fn normalized(self) -> Self {
        Self {
            forming_start: self.forming_start,
            formed_at: self.formed_at.max(self.forming_start),
        }
    }
}
