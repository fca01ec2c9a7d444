use std::panic::{AssertUnwindSafe, catch_unwind};

use super::phase::FormationEvent;
use crate::engine::core::error::CallbackError;

/// Externally supplied phase hook. An `Err` is logged, never propagated.
pub type PhaseCallback = Box<dyn FnMut() -> Result<(), String> + Send + Sync>;

#[derive(Default)]
pub struct PhaseCallbacks {
    pub on_forming_start: Option<PhaseCallback>,
    pub on_formed: Option<PhaseCallback>,
    pub on_locked: Option<PhaseCallback>,
}

impl std::fmt::Debug for PhaseCallbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhaseCallbacks")
            .field("on_forming_start", &self.on_forming_start.is_some())
            .field("on_formed", &self.on_formed.is_some())
            .field("on_locked", &self.on_locked.is_some())
            .finish()
    }
}

impl PhaseCallbacks {
    pub fn set(&mut self, event: FormationEvent, callback: PhaseCallback) {
        *self.slot(event) = Some(callback);
    }

    fn slot(&mut self, event: FormationEvent) -> &mut Option<PhaseCallback> {
        match event {
            FormationEvent::FormingStart => &mut self.on_forming_start,
            FormationEvent::Formed => &mut self.on_formed,
            FormationEvent::Locked => &mut self.on_locked,
        }
    }

    /// Run the hook for `event`, if any, through [`invoke_guarded`].
    pub fn invoke(&mut self, event: FormationEvent) -> Result<(), CallbackError> {
        match self.slot(event) {
            Some(callback) => invoke_guarded(event.label(), callback),
            None => Ok(()),
        }
    }
}

/// Call `callback`, converting both an `Err` and a panic into a
/// [`CallbackError`].
pub fn invoke_guarded(phase: &'static str, callback: &mut PhaseCallback) -> Result<(), CallbackError> {
    match catch_unwind(AssertUnwindSafe(|| callback())) {
        Ok(Ok(())) => Ok(()),
        Ok(Err(message)) => Err(CallbackError::Failed { phase, message }),
        Err(_) => Err(CallbackError::Panicked(phase)),
    }
}
