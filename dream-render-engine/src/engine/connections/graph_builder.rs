use bevy::math::Vec3;

use crate::engine::core::config::ConnectionSettings;

/// A line between two pool slots, valid for the current frame only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Connection {
    pub a: u32,
    pub b: u32,
    pub start: Vec3,
    pub end: Vec3,
}

impl Connection {
    pub const ZERO: Self = Self {
        a: 0,
        b: 0,
        start: Vec3::ZERO,
        end: Vec3::ZERO,
    };
}

/// Pre-allocated connection slots plus a parallel per-line alpha.
///
/// Slots `0..active_count()` hold this frame's connections, every other slot
/// is zeroed so stale geometry cannot render.
#[derive(Debug, Clone)]
pub struct ConnectionBuffer {
    connections: Vec<Connection>,
    alphas: Vec<f32>,
    active: usize,
    dropped: usize,
    dirty: bool,
}

impl ConnectionBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            connections: vec![Connection::ZERO; capacity],
            alphas: vec![0.0; capacity],
            active: 0,
            dropped: 0,
            dirty: true,
        }
    }

    pub fn capacity(&self) -> usize {
        self.connections.len()
    }

    /// Draw range for the frame.
    pub fn active_count(&self) -> usize {
        self.active
    }

    /// Connections found past capacity on the last rebuild.
    pub fn dropped_count(&self) -> usize {
        self.dropped
    }

    pub fn active(&self) -> &[Connection] {
        &self.connections[..self.active]
    }

    /// Every slot, including zeroed ones past the draw range.
    pub fn slots(&self) -> &[Connection] {
        &self.connections
    }

    pub fn alphas(&self) -> &[f32] {
        &self.alphas
    }

    pub fn contains(&self, a: u32, b: u32) -> bool {
        self.active()
            .iter()
            .any(|c| (c.a == a && c.b == b) || (c.a == b && c.b == a))
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }
}

/// Windowed proximity scan: each particle is tested against the next
/// `window` particles in pool order only, O(n·K) instead of all pairs.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionGraphBuilder {
    pub threshold: f32,
    pub window: usize,
    pub line_opacity: f32,
}

impl ConnectionGraphBuilder {
    pub fn new(settings: &ConnectionSettings) -> Self {
        Self {
            threshold: settings.distance_threshold,
            window: settings.window,
            line_opacity: settings.line_opacity,
        }
    }

    /// Rebuild `buffer` from the first `active` entries of `positions`.
    ///
    /// Connections found after the buffer is full are dropped silently and
    /// only counted. Returns the number of connections written.
    pub fn rebuild(&self, positions: &[Vec3], active: usize, buffer: &mut ConnectionBuffer) -> usize {
        let active = active.min(positions.len());
        let capacity = buffer.capacity();
        let previous = buffer.active;
        let mut count = 0;
        let mut dropped = 0;

        for i in 0..active {
            let window_end = (i + 1 + self.window).min(active);
            for j in (i + 1)..window_end {
                let distance = positions[i].distance(positions[j]);
                if !(distance < self.threshold) {
                    continue;
                }
                if count == capacity {
                    dropped += 1;
                    continue;
                }
                buffer.connections[count] = Connection {
                    a: i as u32,
                    b: j as u32,
                    start: positions[i],
                    end: positions[j],
                };
                buffer.alphas[count] = self.alpha(distance);
                count += 1;
            }
        }

        for slot in count..previous {
            buffer.connections[slot] = Connection::ZERO;
            buffer.alphas[slot] = 0.0;
        }

        buffer.active = count;
        buffer.dropped = dropped;
        buffer.dirty = true;
        count
    }

    /// Line alpha fades linearly to zero at the threshold.
    pub fn alpha(&self, distance: f32) -> f32 {
        if self.threshold <= 0.0 {
            return 0.0;
        }
        self.line_opacity * (1.0 - distance / self.threshold).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder(threshold: f32, window: usize) -> ConnectionGraphBuilder {
        ConnectionGraphBuilder {
            threshold,
            window,
            line_opacity: 0.2,
        }
    }

    #[test]
    fn pair_connects_only_below_threshold() {
        let builder = builder(120.0, 12);
        let mut buffer = ConnectionBuffer::with_capacity(8);

        let near = [Vec3::ZERO, Vec3::new(50.0, 0.0, 0.0)];
        assert_eq!(builder.rebuild(&near, 2, &mut buffer), 1);
        assert!(buffer.contains(0, 1));

        let far = [Vec3::ZERO, Vec3::new(200.0, 0.0, 0.0)];
        assert_eq!(builder.rebuild(&far, 2, &mut buffer), 0);
        assert!(!buffer.contains(0, 1));
    }

    #[test]
    fn exact_threshold_does_not_connect() {
        let builder = builder(10.0, 4);
        let mut buffer = ConnectionBuffer::with_capacity(4);
        let positions = [Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0)];
        assert_eq!(builder.rebuild(&positions, 2, &mut buffer), 0);
    }

    #[test]
    fn pairs_outside_the_window_are_skipped() {
        let builder = builder(5.0, 1);
        let mut buffer = ConnectionBuffer::with_capacity(8);
        let positions = [Vec3::ZERO, Vec3::new(100.0, 0.0, 0.0), Vec3::X];
        builder.rebuild(&positions, 3, &mut buffer);
        assert!(!buffer.contains(0, 2));
    }

    #[test]
    fn overflow_is_truncated_and_counted() {
        let builder = builder(1.0, 12);
        let mut buffer = ConnectionBuffer::with_capacity(3);
        let positions = [Vec3::ZERO; 5];
        assert_eq!(builder.rebuild(&positions, 5, &mut buffer), 3);
        assert_eq!(buffer.active_count(), 3);
        assert_eq!(buffer.dropped_count(), 10 - 3);
    }

    #[test]
    fn stale_slots_are_zeroed() {
        let builder = builder(1.0, 12);
        let mut buffer = ConnectionBuffer::with_capacity(8);
        builder.rebuild(&[Vec3::ONE; 4], 4, &mut buffer);
        assert_eq!(buffer.active_count(), 6);

        builder.rebuild(&[Vec3::ONE; 4], 2, &mut buffer);
        assert_eq!(buffer.active_count(), 1);
        assert!(buffer.slots()[1..].iter().all(|c| *c == Connection::ZERO));
        assert!(buffer.alphas()[1..].iter().all(|&a| a == 0.0));
    }

    #[test]
    fn inactive_slots_never_connect() {
        let builder = builder(1.0, 12);
        let mut buffer = ConnectionBuffer::with_capacity(8);
        builder.rebuild(&[Vec3::ZERO; 4], 1, &mut buffer);
        assert_eq!(buffer.active_count(), 0);
    }

    #[test]
    fn alpha_fades_with_distance() {
        let builder = builder(4.0, 12);
        assert!((builder.alpha(0.0) - 0.2).abs() < 1e-6);
        assert!((builder.alpha(2.0) - 0.1).abs() < 1e-6);
        assert_eq!(builder.alpha(4.0), 0.0);
    }
}
