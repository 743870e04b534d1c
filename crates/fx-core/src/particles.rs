//! Free-floating particle field.
//!
//! Each particle integrates its own velocity, drifts vertically with a term
//! coupled to its horizontal position, bounces off the walls of a fixed box
//! and now and then receives a tiny random kick. Particles never interact, so
//! a frame is O(n).

use glam::Vec3;
use rand::prelude::*;

use crate::constants::*;
use crate::error::{FxError, FxResult};
use crate::theme::Theme;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    pub position: Vec3,
    pub velocity: Vec3,
}

/// Owned, exclusively mutated particle buffers plus the container transform.
pub struct ParticleField {
    positions: Vec<Vec3>,
    velocities: Vec<Vec3>,
    half_extents: Vec3,
    rotation_x: f32,
    rotation_y: f32,
    theme: Theme,
    rng: StdRng,
}

impl ParticleField {
    pub fn new(count: usize, theme: Theme, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let half_extents = Vec3::from_array(FIELD_HALF_EXTENTS);
        let mut positions = Vec::with_capacity(count);
        let mut velocities = Vec::with_capacity(count);
        for _ in 0..count {
            let (p, v) = spawn(&mut rng, half_extents);
            positions.push(p);
            velocities.push(v);
        }
        log::debug!("[particles] spawned {} particles (seed {})", count, seed);
        Self {
            positions,
            velocities,
            half_extents,
            rotation_x: 0.0,
            rotation_y: 0.0,
            theme,
            rng,
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn color(&self) -> &'static str {
        self.theme.particle_color()
    }

    pub fn half_extents(&self) -> Vec3 {
        self.half_extents
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// Positions as a packed `xyzxyz...` slice, ready for a vertex buffer.
    pub fn positions_flat(&self) -> &[f32] {
        bytemuck::cast_slice(&self.positions)
    }

    pub fn particles(&self) -> impl Iterator<Item = Particle> + '_ {
        self.positions
            .iter()
            .zip(&self.velocities)
            .map(|(&position, &velocity)| Particle { position, velocity })
    }

    /// Container rotation `(x, y)` in radians.
    pub fn rotation(&self) -> (f32, f32) {
        (self.rotation_x, self.rotation_y)
    }

    /// Advance one frame. `t` is seconds since the field was mounted.
    pub fn advance(&mut self, t: f32) -> FxResult<()> {
        if !t.is_finite() {
            return Err(FxError::NonFinite("particle clock"));
        }
        self.rotation_x = (t * FIELD_SWAY_RATE).sin() * FIELD_SWAY_AMPLITUDE;
        self.rotation_y = t * FIELD_SPIN_RATE;

        let mut corrupted = 0usize;
        for i in 0..self.positions.len() {
            let mut p = self.positions[i];
            let mut v = self.velocities[i];

            p.x += v.x;
            p.y += v.y + (t + p.x).sin() * DRIFT_COUPLING;
            p.z += v.z;

            for axis in 0..3 {
                if let Some(mirrored) = reflect(p[axis], self.half_extents[axis]) {
                    p[axis] = mirrored;
                    v[axis] *= BOUNCE_DAMPING;
                }
                if self.rng.gen_bool(JITTER_PROBABILITY) {
                    v[axis] += self.rng.gen_range(-JITTER_HALF_RANGE..JITTER_HALF_RANGE);
                }
            }

            if !(p.is_finite() && v.is_finite()) {
                (p, v) = spawn(&mut self.rng, self.half_extents);
                corrupted += 1;
            }
            self.positions[i] = p;
            self.velocities[i] = v;
        }

        if corrupted > 0 {
            return Err(FxError::NonFinite("particle field"));
        }
        Ok(())
    }
}

fn spawn(rng: &mut StdRng, half: Vec3) -> (Vec3, Vec3) {
    let p = Vec3::new(
        rng.gen_range(-half.x..=half.x),
        rng.gen_range(-half.y..=half.y),
        rng.gen_range(-half.z..=half.z),
    );
    let s = INITIAL_SPEED_MAX;
    let v = Vec3::new(
        rng.gen_range(-s..=s),
        rng.gen_range(-s..=s),
        rng.gen_range(-s..=s),
    );
    (p, v)
}

/// Mirror `x` back into `[-extent, extent]` if it left the interval.
///
/// Overshoot past a wall is folded back inside by the same distance.
#[inline]
fn reflect(x: f32, extent: f32) -> Option<f32> {
    if x.abs() <= extent || !x.is_finite() {
        return None;
    }
    let period = 4.0 * extent;
    let mut m = (x + extent).rem_euclid(period);
    if m > 2.0 * extent {
        m = period - m;
    }
    Some((m - extent).clamp(-extent, extent))
}
