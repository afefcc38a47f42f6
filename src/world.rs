//! The simulation world: particle ownership, per-frame integration, culling.
//!
//! A [`World`] owns the live particle collection and is the only thing that
//! mutates it. Two operations write: [`World::advance`] (called once per frame
//! tick with the current timestamp) and [`World::spawn`]/[`World::spawn_batch`]
//! (driven by the emission scheduler). Both run on the same execution context;
//! the renderer only ever sees the immutable [`World::particles`] snapshot.

use crate::emitter::{Batch, BatchKind};
use crate::particle::Particle;
use crate::spawn::{Direction, SpawnContext};
use glam::Vec2;

/// Upper bound for a single integration step, in seconds.
///
/// After a stall (window drag, app switch) the next frame would otherwise
/// integrate one huge step and teleport every particle off-canvas.
pub const MAX_FRAME_DELTA: f32 = 1.0 / 30.0;

/// Container for the live confetti population.
pub struct World {
    /// Live particles. Newest sits at index 0; renderers paint in collection
    /// order. Culling compacts in place, so the tail order is not stable.
    particles: Vec<Particle>,
    /// Timestamp of the previous `advance` call.
    last_update: f32,
    spawner: SpawnContext,
    /// Particles spawned since the last reset.
    total_spawned: u64,
}

impl World {
    /// Create an empty world that spawns through the given generator.
    pub fn new(spawner: SpawnContext) -> Self {
        Self {
            particles: Vec::new(),
            last_update: 0.0,
            spawner,
            total_spawned: 0,
        }
    }

    /// The live particles, in draw order. Read-only: kinematic state only
    /// changes inside `advance`.
    #[inline]
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Number of live particles.
    #[inline]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    /// Whether the effect has fully decayed.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Particles spawned since the last reset, including ones already culled.
    #[inline]
    pub fn total_spawned(&self) -> u64 {
        self.total_spawned
    }

    /// Clear all simulation state for a fresh effect run.
    ///
    /// The effect layer composes this with scheduler cancellation and the
    /// audio cue; the world itself only owns particles and the clock.
    pub fn reset(&mut self) {
        self.particles.clear();
        self.last_update = 0.0;
        self.total_spawned = 0;
    }

    /// Advance every particle by one frame and cull the dead.
    ///
    /// `now` comes from the frame clock and must not be reused across calls;
    /// the step is `now - last_update`, clamped into `[0, MAX_FRAME_DELTA]`
    /// (a backwards clock reads as a zero step, never a negative one).
    ///
    /// A particle is removed when its update reports the lifetime exceeded or
    /// when its bounding box has left the canvas. Removal swaps the particle
    /// to the tail and truncates once at the end, so a frame that culls many
    /// particles does no per-removal shifting. Removal is terminal.
    pub fn advance(&mut self, now: f32, canvas: Vec2) {
        let delta = (now - self.last_update).clamp(0.0, MAX_FRAME_DELTA);
        self.last_update = now;

        let mut live = self.particles.len();
        let mut index = 0;
        while index < live {
            let particle = &mut self.particles[index];
            let keep = particle.update(delta) && particle.is_visible(canvas);
            if keep {
                index += 1;
            } else {
                live -= 1;
                self.particles.swap(index, live);
            }
        }
        self.particles.truncate(live);
    }

    /// Spawn one particle at `position` and insert it at the front of the
    /// collection. Front insertion is the draw-order contract: renderers
    /// paint index 0 first, so the newest piece lands beneath older ones.
    pub fn spawn(&mut self, position: Vec2, direction: Option<Direction>) {
        let particle = self.spawner.make(position, direction);
        self.particles.insert(0, particle);
        self.total_spawned += 1;
    }

    /// Spawn a scheduled batch.
    ///
    /// Directional batches launch from a band around the top center, each
    /// particle popping away from the center line. Ambient batches drift in
    /// from anywhere along the top edge. A canvas without positive width
    /// yields nothing; degenerate sizes clamp to an empty batch.
    pub fn spawn_batch(&mut self, batch: Batch, canvas: Vec2) {
        if batch.count == 0 || canvas.x <= 0.0 {
            return;
        }
        for _ in 0..batch.count {
            let y = self.spawner.random_range(-50.0, -30.0);
            match batch.kind {
                BatchKind::Directional => {
                    let center = canvas.x / 2.0;
                    let offset = canvas.x / 5.0;
                    let x = self.spawner.random_range(center - offset, center + offset);
                    let direction = if x < center {
                        Direction::Left
                    } else {
                        Direction::Right
                    };
                    self.spawn(Vec2::new(x, y), Some(direction));
                }
                BatchKind::Ambient => {
                    let x = self.spawner.random_range(0.0, canvas.x);
                    self.spawn(Vec2::new(x, y), None);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visuals::Palette;

    fn world(seed: u64) -> World {
        World::new(SpawnContext::seeded(
            seed,
            Vec2::new(12.0, 24.0),
            Palette::Classic,
            None,
        ))
    }

    const CANVAS: Vec2 = Vec2::new(300.0, 600.0);

    #[test]
    fn test_advance_on_empty_world_is_noop() {
        let mut world = world(0);
        world.advance(0.5, CANVAS);
        world.advance(1.0, CANVAS);
        assert_eq!(world.len(), 0);
    }

    #[test]
    fn test_removal_keeps_survivors_untouched() {
        let mut world = world(0);

        // Zero-delta advance so the cull pass is pure: same timestamp twice.
        world.advance(1.0, CANVAS);

        let on_canvas = Particle {
            position: Vec2::new(150.0, 300.0),
            ..Particle::default()
        };
        let off_canvas = Particle {
            position: Vec2::new(150.0, 700.0),
            ..Particle::default()
        };
        for i in 0..6 {
            if i % 3 == 0 {
                world.particles.push(off_canvas.clone());
            } else {
                world.particles.push(on_canvas.clone());
            }
        }

        world.advance(1.0, CANVAS);

        assert_eq!(world.len(), 4);
        for particle in world.particles() {
            assert_eq!(particle.position, on_canvas.position);
            assert_eq!(particle.velocity, on_canvas.velocity);
        }
    }

    #[test]
    fn test_lifetime_expiry_culls() {
        let mut world = world(0);
        world.advance(0.0, CANVAS);
        world.particles.push(Particle {
            position: Vec2::new(150.0, 300.0),
            lifetime: Some(0.01),
            gravity: 0.0,
            ..Particle::default()
        });

        world.advance(0.02, CANVAS);
        assert_eq!(world.len(), 0);
    }

    #[test]
    fn test_backwards_clock_reads_as_zero_step() {
        let mut world = world(0);
        world.advance(10.0, CANVAS);
        world.particles.push(Particle {
            position: Vec2::new(150.0, 300.0),
            velocity: Vec2::new(50.0, 50.0),
            ..Particle::default()
        });

        world.advance(5.0, CANVAS);

        assert_eq!(world.len(), 1);
        assert_eq!(world.particles()[0].position, Vec2::new(150.0, 300.0));
    }

    #[test]
    fn test_large_gap_clamps_to_max_step() {
        let mut world = world(0);
        world.advance(0.0, CANVAS);
        world.particles.push(Particle {
            position: Vec2::new(150.0, 0.0),
            velocity: Vec2::new(0.0, 90.0),
            gravity: 0.0,
            ..Particle::default()
        });

        // Ten seconds of stall still integrates a single 1/30 s step.
        world.advance(10.0, CANVAS);
        let y = world.particles()[0].position.y;
        assert!((y - 90.0 * MAX_FRAME_DELTA).abs() < 1e-3);
    }

    #[test]
    fn test_spawn_inserts_at_front() {
        let mut world = world(1);
        world.spawn(Vec2::new(1.0, -40.0), None);
        world.spawn(Vec2::new(2.0, -40.0), None);
        world.spawn(Vec2::new(3.0, -40.0), None);

        assert_eq!(world.particles()[0].position.x, 3.0);
        assert_eq!(world.particles()[2].position.x, 1.0);
        assert_eq!(world.total_spawned(), 3);
    }

    #[test]
    fn test_directional_batch_splits_on_center() {
        let mut world = world(2);
        world.spawn_batch(
            Batch {
                kind: BatchKind::Directional,
                count: 40,
            },
            CANVAS,
        );

        assert_eq!(world.len(), 40);
        for particle in world.particles() {
            let center = CANVAS.x / 2.0;
            assert!(particle.position.x >= center - CANVAS.x / 5.0);
            assert!(particle.position.x <= center + CANVAS.x / 5.0);
            assert!((-50.0..-30.0).contains(&particle.position.y));
            // Left of center pops left, right of center pops right.
            if particle.position.x < center {
                assert!(particle.emitting_force < 0.0);
            } else {
                assert!(particle.emitting_force > 0.0);
            }
        }
    }

    #[test]
    fn test_ambient_batch_spans_canvas_width() {
        let mut world = world(3);
        world.spawn_batch(
            Batch {
                kind: BatchKind::Ambient,
                count: 30,
            },
            CANVAS,
        );

        assert_eq!(world.len(), 30);
        for particle in world.particles() {
            assert!((0.0..CANVAS.x).contains(&particle.position.x));
            assert_eq!(particle.emitting_force, 0.0);
        }
    }

    #[test]
    fn test_degenerate_canvas_spawns_nothing() {
        let mut world = world(4);
        world.spawn_batch(
            Batch {
                kind: BatchKind::Ambient,
                count: 20,
            },
            Vec2::new(0.0, 600.0),
        );
        assert_eq!(world.len(), 0);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut world = world(5);
        world.spawn(Vec2::new(10.0, -40.0), None);
        world.advance(0.5, CANVAS);

        world.reset();

        assert!(world.is_empty());
        assert_eq!(world.total_spawned(), 0);
    }
}
