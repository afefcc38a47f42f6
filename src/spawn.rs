//! Randomized spawn parameters for new confetti pieces.
//!
//! All randomness in the effect is funneled through [`SpawnContext`] so that
//! spawning stays a pure function of the generator state: same seed, same
//! confetti. The world owns one context and calls [`SpawnContext::make`] for
//! every particle it inserts.

use crate::particle::Particle;
use crate::visuals::{Palette, ShapeKind};
use glam::{Vec2, Vec3};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::{FRAC_PI_2, PI};

/// Horizontal launch direction for popper-style particles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
}

impl Direction {
    /// Sign applied to the emitting force: left launches push negative x.
    #[inline]
    pub fn factor(&self) -> f32 {
        match self {
            Direction::Left => -1.0,
            Direction::Right => 1.0,
        }
    }
}

/// Launch angle range measured from the horizontal axis.
const ANGLE_MIN: f32 = PI / 36.0;
const ANGLE_MAX: f32 = FRAC_PI_2;

/// Drag coefficient during a directional launch. Much higher than the
/// ambient value so the popper burst bleeds off speed quickly.
const EMITTING_DRAG: f32 = 5.0;
/// Drag coefficient for ambient drift.
const AMBIENT_DRAG: f32 = 0.01;
/// Length of the launch window in seconds.
const EMITTING_DURATION: f32 = 0.03;

/// Generator of fully-populated spawn parameters.
///
/// ```ignore
/// let mut spawner = SpawnContext::seeded(7, Vec2::new(12.0, 24.0), Palette::Classic, None);
/// let particle = spawner.make(Vec2::new(150.0, -40.0), Some(Direction::Right));
/// ```
pub struct SpawnContext {
    /// Unscaled particle size; each spawn shrinks it by a random factor.
    base_size: Vec2,
    /// Palette the spawn colors draw from.
    palette: Palette,
    /// Lifespan stamped on every spawned particle, `None` for unbounded.
    lifetime: Option<f32>,
    rng: SmallRng,
}

impl SpawnContext {
    /// Create a context seeded from entropy.
    pub fn new(base_size: Vec2, palette: Palette, lifetime: Option<f32>) -> Self {
        Self {
            base_size,
            palette,
            lifetime,
            rng: SmallRng::from_entropy(),
        }
    }

    /// Create a context with a fixed seed for reproducible effects.
    pub fn seeded(seed: u64, base_size: Vec2, palette: Palette, lifetime: Option<f32>) -> Self {
        Self {
            base_size,
            palette,
            lifetime,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    // ========== Random primitives ==========

    /// Random f32 between 0.0 and 1.0.
    #[inline]
    fn random(&mut self) -> f32 {
        self.rng.gen()
    }

    /// Random f32 in the given range. Also used by the world to draw spawn
    /// positions from the canvas bands.
    #[inline]
    pub(crate) fn random_range(&mut self, min: f32, max: f32) -> f32 {
        self.rng.gen_range(min..max)
    }

    /// -1.0 or 1.0, evenly.
    #[inline]
    fn random_sign(&mut self) -> f32 {
        if self.rng.gen::<bool>() {
            1.0
        } else {
            -1.0
        }
    }

    fn random_shape(&mut self) -> ShapeKind {
        ShapeKind::ALL[self.rng.gen_range(0..ShapeKind::ALL.len())]
    }

    fn random_color(&mut self) -> Vec3 {
        let colors = self.palette.colors();
        colors[self.rng.gen_range(0..colors.len())]
    }

    // ========== Particle construction ==========

    /// Build a fully-randomized particle at `position`.
    ///
    /// With a [`Direction`] the particle gets the popper treatment: a strong
    /// signed emitting force, heavy launch drag and a velocity aimed along a
    /// random angle off the horizontal. Without one it drifts down like
    /// falling paper.
    pub fn make(&mut self, position: Vec2, direction: Option<Direction>) -> Particle {
        let scale = self.random_range(0.5, 1.0);
        let mut particle = Particle {
            position,
            size: self.base_size * scale,
            shape: self.random_shape(),
            color: self.random_color(),
            rotation: self.random_range(0.0, 360.0),
            rotation_axis: Vec3::new(self.random(), self.random(), self.random()),
            lifetime: self.lifetime,
            gravity: self.random_range(200.0, 300.0),
            mass: 1.0,
            ..Particle::default()
        };
        particle.rotation_speed = self.random_range(300.0, 600.0) * self.random_sign();

        match direction {
            Some(direction) => {
                particle.drag = EMITTING_DRAG;
                particle.emitting_duration = EMITTING_DURATION;
                particle.emitting_force =
                    self.random_range(3000.0, 5000.0) * direction.factor();

                let angle = match direction {
                    Direction::Left => PI - self.random_range(ANGLE_MIN, ANGLE_MAX),
                    Direction::Right => self.random_range(ANGLE_MIN, ANGLE_MAX),
                };
                particle.velocity.y = self.random_range(200.0, 600.0);
                particle.velocity.x = particle.velocity.y / angle.tan();
            }
            None => {
                particle.drag = AMBIENT_DRAG;
                particle.velocity.y = self.random_range(100.0, 500.0);
            }
        }

        particle
    }
}
