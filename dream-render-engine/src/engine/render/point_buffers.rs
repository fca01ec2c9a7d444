use bevy::math::Vec3;

/// Structure-of-arrays point data, one slot per particle, allocated once.
///
/// Writers mutate slots in place and call [`mark_dirty`](Self::mark_dirty);
/// the upload step consumes the flag with [`take_dirty`](Self::take_dirty) so
/// "data changed" and "data uploaded" stay decoupled.
#[derive(Debug, Clone, PartialEq)]
pub struct PointBuffers {
    positions: Vec<Vec3>,
    colors: Vec<Vec3>,
    sizes: Vec<f32>,
    opacities: Vec<f32>,
    dirty: bool,
}

impl PointBuffers {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            positions: vec![Vec3::ZERO; capacity],
            colors: vec![Vec3::ONE; capacity],
            sizes: vec![0.0; capacity],
            opacities: vec![0.0; capacity],
            dirty: true,
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    #[inline]
    pub fn write(&mut self, index: usize, position: Vec3, color: Vec3, size: f32, opacity: f32) {
        self.positions[index] = position;
        self.colors[index] = color;
        self.sizes[index] = size;
        self.opacities[index] = opacity;
    }

    #[inline]
    pub fn hide(&mut self, index: usize) {
        self.opacities[index] = 0.0;
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn positions_mut(&mut self) -> &mut [Vec3] {
        &mut self.positions
    }

    pub fn colors(&self) -> &[Vec3] {
        &self.colors
    }

    pub fn sizes(&self) -> &[f32] {
        &self.sizes
    }

    pub fn opacities(&self) -> &[f32] {
        &self.opacities
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Returns whether an upload is pending and clears the flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }
}
