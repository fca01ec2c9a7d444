use bevy::prelude::*;

use crate::engine::core::config::CameraRigSettings;

/// Distance below which a returning camera rejoins the orbit path.
const PATH_SNAP_DISTANCE: f32 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RigMode {
    /// Circular path around the scene, no selection.
    AutoOrbit,
    /// Easing toward a selected node.
    Targeted,
    /// User-controlled orbit around the current look-at point.
    Free,
}

/// Camera rig state. Reads the selected node, never writes it.
#[derive(Resource, Debug, Clone)]
pub struct CameraRig {
    settings: CameraRigSettings,
    mode: RigMode,
    orbit_enabled: bool,
    angle: f32,
    on_path: bool,
    position: Vec3,
    look_at: Vec3,
    target_position: Vec3,
    target_look_at: Vec3,
    selected: Option<String>,
}

impl CameraRig {
    pub fn new(settings: CameraRigSettings) -> Self {
        let center = Vec3::from_array(settings.orbit_center);
        let mut rig = Self {
            mode: RigMode::Free,
            orbit_enabled: settings.orbit_enabled,
            angle: 0.0,
            on_path: true,
            position: Vec3::ZERO,
            look_at: center,
            target_position: Vec3::ZERO,
            target_look_at: center,
            selected: None,
            settings,
        };
        rig.position = rig.orbit_point();
        rig.target_position = rig.position;
        rig.mode = if rig.orbit_enabled { RigMode::AutoOrbit } else { RigMode::Free };
        rig
    }

    pub fn mode(&self) -> RigMode {
        self.mode
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn look_at(&self) -> Vec3 {
        self.look_at
    }

    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn orbit_enabled(&self) -> bool {
        self.orbit_enabled
    }

    pub fn set_orbit_enabled(&mut self, enabled: bool) {
        self.orbit_enabled = enabled;
        if !enabled && self.mode == RigMode::AutoOrbit {
            self.mode = RigMode::Free;
        }
    }

    fn center(&self) -> Vec3 {
        Vec3::from_array(self.settings.orbit_center)
    }

    fn orbit_point(&self) -> Vec3 {
        let r = self.settings.orbit_radius;
        self.center()
            + Vec3::new(
                self.angle.cos() * r,
                self.settings.orbit_height,
                self.angle.sin() * r,
            )
    }

    fn ease(&self, dt: f32) -> f32 {
        (dt * self.settings.follow_rate).clamp(0.0, 1.0)
    }

    /// Advance by `dt` seconds given the currently selected node.
    pub fn advance(&mut self, dt: f32, selected: Option<(&str, Vec3)>) {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.observe_selection(selected);

        match self.mode {
            RigMode::AutoOrbit => {
                self.angle += dt * self.settings.angular_speed;
                let path = self.orbit_point();
                if self.on_path {
                    self.position = path;
                } else {
                    self.position = self.position.lerp(path, self.ease(dt));
                    self.on_path = self.position.distance(path) < PATH_SNAP_DISTANCE;
                }
                self.look_at = self.look_at.lerp(self.center(), self.ease(dt));
            }
            RigMode::Targeted => {
                let t = self.ease(dt);
                self.position = self.position.lerp(self.target_position, t);
                self.look_at = self.look_at.lerp(self.target_look_at, t);
            }
            RigMode::Free => {}
        }
    }

    fn observe_selection(&mut self, selected: Option<(&str, Vec3)>) {
        match selected {
            Some((id, node_position)) => {
                if self.selected.as_deref() != Some(id) {
                    self.selected = Some(id.to_string());
                    self.target_position =
                        node_position + Vec3::from_array(self.settings.focus_offset);
                    self.target_look_at = node_position;
                    self.mode = RigMode::Targeted;
                }
            }
            None => {
                self.selected = None;
                if self.orbit_enabled && self.mode != RigMode::AutoOrbit {
                    // Resume the orbit from the camera's current bearing.
                    let offset = self.position - self.center();
                    self.angle = offset.z.atan2(offset.x);
                    self.on_path = false;
                    self.mode = RigMode::AutoOrbit;
                } else if !self.orbit_enabled && self.mode == RigMode::Targeted {
                    self.mode = RigMode::Free;
                }
            }
        }
    }

    /// Orbit around the look-at point by a mouse delta in pixels. Ignored
    /// while auto-orbiting. Returns whether the drag applied.
    pub fn apply_drag(&mut self, delta: Vec2) -> bool {
        if self.mode == RigMode::AutoOrbit || delta == Vec2::ZERO {
            return false;
        }
        let sensitivity = self.settings.drag_sensitivity;
        let (distance, polar, azimuth) = self.spherical();
        let azimuth = azimuth - delta.x * sensitivity;
        let polar = (polar - delta.y * sensitivity)
            .clamp(self.settings.polar_min, self.settings.polar_max);
        self.place(distance, polar, azimuth);
        true
    }

    /// Dolly toward the look-at point. Ignored while auto-orbiting.
    pub fn apply_zoom(&mut self, amount: f32) -> bool {
        if self.mode == RigMode::AutoOrbit || amount == 0.0 || !amount.is_finite() {
            return false;
        }
        let (distance, polar, azimuth) = self.spherical();
        let distance = (distance - amount * self.settings.zoom_sensitivity)
            .clamp(self.settings.distance_min, self.settings.distance_max);
        self.place(distance, polar, azimuth);
        true
    }

    /// Distance, polar angle from +Y and azimuth of the camera about the
    /// look-at point.
    fn spherical(&self) -> (f32, f32, f32) {
        let offset = self.position - self.look_at;
        let distance = offset.length().max(f32::EPSILON);
        let polar = (offset.y / distance).clamp(-1.0, 1.0).acos();
        let azimuth = offset.z.atan2(offset.x);
        (distance, polar, azimuth)
    }

    fn place(&mut self, distance: f32, polar: f32, azimuth: f32) {
        let offset = Vec3::new(
            polar.sin() * azimuth.cos(),
            polar.cos(),
            polar.sin() * azimuth.sin(),
        ) * distance;
        // Settle the ease target on the look-at the camera is heading to.
        self.look_at = self.target_look_at_for_mode();
        self.position = self.look_at + offset;
        self.target_position = self.position;
        self.mode = RigMode::Free;
    }

    fn target_look_at_for_mode(&self) -> Vec3 {
        match self.mode {
            RigMode::Targeted => self.target_look_at,
            _ => self.look_at,
        }
    }

    pub fn transform(&self) -> Transform {
        Transform::from_translation(self.position).looking_at(self.look_at, Vec3::Y)
    }
}
