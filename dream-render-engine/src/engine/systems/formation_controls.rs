use bevy::prelude::*;

use crate::engine::core::engine::DreamEngine;

/// Seconds of convergence when the ceremony is started from the keyboard.
const KEYBOARD_FORMING_SECONDS: f32 = 3.0;

/// Native keyboard control of the formation: F starts, L locks, R resets.
/// On wasm32 the bridge drives the formation instead.
pub fn handle_formation_shortcuts(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut engine: ResMut<DreamEngine>,
) {
    #[cfg(not(target_arch = "wasm32"))]
    {
        let result = if keyboard.just_pressed(KeyCode::KeyF) {
            engine
                .start_formation(KEYBOARD_FORMING_SECONDS)
                .map(|armed| {
                    if !armed {
                        info!("Formation already triggered, press R to reset");
                    }
                })
        } else if keyboard.just_pressed(KeyCode::KeyL) {
            engine.lock_formation().map(|_| ())
        } else if keyboard.just_pressed(KeyCode::KeyR) {
            engine.reset_formation()
        } else {
            return;
        };
        if let Err(error) = result {
            warn!("Formation shortcut ignored: {}", error);
        }
    }

    #[cfg(target_arch = "wasm32")]
    {
        let _ = (keyboard, engine, KEYBOARD_FORMING_SECONDS);
    }
}
