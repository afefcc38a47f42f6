//! The confetti particle and its per-frame update rule.
//!
//! A [`Particle`] is a plain value owned by the world's collection. Each frame
//! the world calls [`Particle::update`] exactly once with that frame's delta
//! time; the return value tells the world whether the particle is still within
//! its lifetime. Off-canvas culling is a separate check, [`Particle::is_visible`].
//!
//! The physics is a forced-drag model: a short propulsive launch window
//! (`emitting_force` over `emitting_duration`) followed by plain gravity with
//! air resistance on the horizontal axis. Good enough for a cosmetic effect at
//! 60 fps with hundreds of particles; this is not a rigid-body engine.

use crate::visuals::ShapeKind;
use glam::{Vec2, Vec3};
use std::f32::consts::{FRAC_PI_2, PI};

/// A single confetti piece.
///
/// Shape, color, rotation axis and spin speed are the particle's visual
/// identity: fixed at spawn, never mutated afterwards. Position, velocity,
/// rotation angle and elapsed time are integrated every frame.
#[derive(Clone, Debug)]
pub struct Particle {
    /// Current location in canvas coordinates (pixels, y down).
    pub position: Vec2,
    /// Bounding box used for rendering and visibility culling. Both
    /// components are positive.
    pub size: Vec2,
    /// Visual form, chosen at spawn.
    pub shape: ShapeKind,
    /// One entry of the effect palette (RGB, 0.0-1.0), chosen at spawn.
    pub color: Vec3,
    /// Current rotation angle in degrees.
    pub rotation: f32,
    /// Rotation axis for the 3D-look spin, components in [0, 1].
    pub rotation_axis: Vec3,
    /// Spin speed in degrees per second, fixed at spawn.
    pub rotation_speed: f32,
    /// Velocity in pixels per second.
    pub velocity: Vec2,
    /// Time this particle has been alive, in seconds.
    pub elapsed: f32,
    /// Optional lifespan in seconds. `None` means unbounded: only off-canvas
    /// culling removes the particle.
    pub lifetime: Option<f32>,
    /// Gravity acceleration in pixels per second squared. Canvas pixels, not
    /// metres, so this is nowhere near 9.8.
    pub gravity: f32,
    /// Particle mass.
    pub mass: f32,
    /// Air resistance coefficient, scales with speed.
    pub drag: f32,
    /// Propulsive force active only during the launch window. Signed: the
    /// sign carries the horizontal launch direction.
    pub emitting_force: f32,
    /// Length of the launch window in seconds, measured from spawn.
    pub emitting_duration: f32,
}

impl Default for Particle {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            size: Vec2::new(12.0, 24.0),
            shape: ShapeKind::Circle,
            color: Vec3::new(0.5, 0.5, 0.5),
            rotation: 0.0,
            rotation_axis: Vec3::ZERO,
            rotation_speed: 0.0,
            velocity: Vec2::ZERO,
            elapsed: 0.0,
            lifetime: None,
            gravity: 9.8,
            mass: 1.0,
            drag: 0.01,
            emitting_force: 0.0,
            emitting_duration: 0.0,
        }
    }
}

impl Particle {
    /// Instantaneous speed.
    #[inline]
    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }

    /// Angle between the velocity vector and the horizontal axis, in
    /// [0, PI). Vertical movement (zero horizontal velocity) reads as PI/2,
    /// which also sidesteps the division.
    pub fn velocity_angle(&self) -> f32 {
        if self.velocity.x == 0.0 {
            FRAC_PI_2
        } else {
            let mut radians = (self.velocity.y / self.velocity.x).atan();
            if radians < 0.0 {
                radians += PI;
            }
            radians
        }
    }

    /// Advance this particle by `dt` seconds of explicit Euler integration.
    ///
    /// `dt` must be non-negative; the world clamps each frame step to at most
    /// 1/30 s before calling in. Order matters: position integrates the
    /// pre-update velocity, then velocity integrates the acceleration derived
    /// from that same pre-update state.
    ///
    /// During the launch window (`elapsed <= emitting_duration`) the emitting
    /// force and drag act along the velocity direction on both axes, on top
    /// of gravity. Once the window ends, drag applies to the horizontal axis
    /// only and the vertical acceleration is plain gravity.
    ///
    /// Returns whether the particle is still within its lifetime. `false`
    /// tells the caller to cull; a particle without an explicit lifetime
    /// always returns `true` here and is only ever removed by visibility
    /// culling.
    pub fn update(&mut self, dt: f32) -> bool {
        debug_assert!(dt >= 0.0, "frame delta must be non-negative");

        self.elapsed += dt;
        self.position += self.velocity * dt;

        let speed = self.speed();
        let angle = self.velocity_angle();
        let acceleration = if self.elapsed <= self.emitting_duration {
            Vec2::new(
                (-self.drag * speed + self.emitting_force) * angle.cos() / self.mass,
                self.gravity
                    + (self.emitting_force - self.drag * speed) * angle.sin() / self.mass,
            )
        } else {
            // Launch over: resistance is ignored on the y axis.
            Vec2::new(
                -self.drag * speed * angle.cos() / self.mass,
                self.gravity,
            )
        };
        self.velocity += acceleration * dt;
        self.rotation += self.rotation_speed * dt;

        match self.lifetime {
            Some(lifetime) => self.elapsed <= lifetime,
            None => true,
        }
    }

    /// Whether any part of this particle's bounding box can still reach the
    /// canvas. Invisible means gone for good: the particle has fallen past
    /// the bottom edge or drifted fully past a side edge.
    pub fn is_visible(&self, canvas: Vec2) -> bool {
        let top = self.position.y - self.size.y / 2.0;
        if top > canvas.y {
            return false;
        }
        if self.position.x + self.size.x / 2.0 < 0.0 {
            return false;
        }
        if self.position.x - self.size.x / 2.0 > canvas.x {
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_delta_is_identity() {
        let mut particle = Particle {
            position: Vec2::new(10.0, 20.0),
            velocity: Vec2::new(30.0, -40.0),
            rotation: 123.0,
            rotation_speed: 400.0,
            gravity: 250.0,
            ..Particle::default()
        };
        let before = particle.clone();

        let alive = particle.update(0.0);

        assert!(alive);
        assert_eq!(particle.position, before.position);
        assert_eq!(particle.velocity, before.velocity);
        assert_eq!(particle.rotation, before.rotation);
        // Same verdict on a repeat call.
        assert_eq!(particle.update(0.0), alive);
    }

    #[test]
    fn test_unbounded_lifetime_never_expires() {
        let mut particle = Particle::default();
        for _ in 0..10_000 {
            assert!(particle.update(1.0 / 30.0));
        }
    }

    #[test]
    fn test_lifetime_expiry() {
        let mut particle = Particle {
            lifetime: Some(1.0),
            ..Particle::default()
        };
        assert!(particle.update(0.6));
        assert!(!particle.update(0.6));
    }

    #[test]
    fn test_vertical_fall_gains_gravity() {
        // No launch force, purely vertical velocity: angle is PI/2, so the
        // horizontal acceleration vanishes and vy grows by g*dt.
        let mut particle = Particle {
            velocity: Vec2::new(0.0, 100.0),
            gravity: 250.0,
            drag: 0.01,
            ..Particle::default()
        };
        particle.update(0.1);
        assert!((particle.velocity.y - 125.0).abs() < 1e-3);
        assert!(particle.velocity.x.abs() < 1e-4);
    }

    #[test]
    fn test_horizontal_velocity_decays_by_drag() {
        let mut particle = Particle {
            velocity: Vec2::new(100.0, 0.0),
            gravity: 250.0,
            drag: 0.01,
            mass: 1.0,
            ..Particle::default()
        };
        particle.update(0.1);
        // ax = -k * |v| * cos(0) / m = -1.0
        assert!((particle.velocity.x - 99.9).abs() < 1e-3);
        assert!((particle.velocity.y - 25.0).abs() < 1e-3);
    }

    #[test]
    fn test_emitting_force_drives_launch() {
        let mut launched = Particle {
            velocity: Vec2::new(100.0, 100.0),
            gravity: 250.0,
            drag: 5.0,
            emitting_force: 4000.0,
            emitting_duration: 0.03,
            ..Particle::default()
        };
        let mut coasting = launched.clone();
        coasting.emitting_force = 0.0;
        coasting.emitting_duration = 0.0;

        launched.update(0.01);
        coasting.update(0.01);

        // Inside the launch window the force outruns drag on both axes.
        assert!(launched.velocity.x > 100.0);
        assert!(launched.velocity.y > coasting.velocity.y);
        assert!(coasting.velocity.x < 100.0);
    }

    #[test]
    fn test_force_expires_with_window() {
        let mut particle = Particle {
            velocity: Vec2::new(100.0, 0.0),
            gravity: 250.0,
            drag: 0.01,
            emitting_force: 4000.0,
            emitting_duration: 0.03,
            ..Particle::default()
        };
        // First step lands past the window, so the force never applies.
        particle.update(0.1);
        assert!(particle.velocity.x < 100.0);
    }

    #[test]
    fn test_rotation_integrates_spin() {
        let mut particle = Particle {
            rotation: 10.0,
            rotation_speed: -450.0,
            ..Particle::default()
        };
        particle.update(0.1);
        assert!((particle.rotation - (10.0 - 45.0)).abs() < 1e-3);
    }

    #[test]
    fn test_velocity_angle_is_vertical_without_x() {
        let particle = Particle {
            velocity: Vec2::new(0.0, 300.0),
            ..Particle::default()
        };
        assert!((particle.velocity_angle() - FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn test_velocity_angle_normalized_into_half_turn() {
        let left = Particle {
            velocity: Vec2::new(-100.0, 100.0),
            ..Particle::default()
        };
        let angle = left.velocity_angle();
        assert!((0.0..PI).contains(&angle));
    }

    #[test]
    fn test_visibility_boundaries() {
        let canvas = Vec2::new(300.0, 600.0);
        let mut particle = Particle {
            size: Vec2::new(10.0, 20.0),
            ..Particle::default()
        };

        // Dead center: visible.
        particle.position = Vec2::new(150.0, 300.0);
        assert!(particle.is_visible(canvas));

        // Top edge exactly on the bottom of the canvas: still visible.
        particle.position = Vec2::new(150.0, 610.0);
        assert!(particle.is_visible(canvas));
        particle.position = Vec2::new(150.0, 610.1);
        assert!(!particle.is_visible(canvas));

        // Sliding off the left and right edges.
        particle.position = Vec2::new(-5.0, 300.0);
        assert!(particle.is_visible(canvas));
        particle.position = Vec2::new(-5.1, 300.0);
        assert!(!particle.is_visible(canvas));
        particle.position = Vec2::new(305.0, 300.0);
        assert!(particle.is_visible(canvas));
        particle.position = Vec2::new(305.1, 300.0);
        assert!(!particle.is_visible(canvas));

        // Still above the canvas counts as visible; it will fall in.
        particle.position = Vec2::new(150.0, -40.0);
        assert!(particle.is_visible(canvas));
    }
}
