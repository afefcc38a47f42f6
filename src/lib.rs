//! # Confetti
//!
//! Physically animated confetti bursts with a simple, declarative API.
//!
//! One trigger pops a popper: a directional burst from the top of the canvas,
//! a settling wave, then a decaying trickle of drifting paper. Every piece is
//! integrated per frame (gravity, drag, a brief launch force, 3D-look spin)
//! and culled once it leaves the canvas or outlives its lifespan.
//!
//! ## Quick Start
//!
//! ```ignore
//! use confetti::Confetti;
//!
//! fn main() -> Result<(), confetti::EffectError> {
//!     Confetti::new().run() // click the window to pop
//! }
//! ```
//!
//! ## Core Concepts
//!
//! ### Headless or windowed
//!
//! [`Confetti::run`] opens a winit window and drives everything. For your own
//! render loop, [`Confetti::build`] returns a [`ConfettiEffect`] you feed
//! with timestamps:
//!
//! ```ignore
//! let mut effect = Confetti::new().with_seed(7).build();
//! effect.trigger(now, canvas);        // on user input
//! effect.tick(now, canvas);           // once per frame
//! draw(effect.particles());           // read-only snapshot
//! ```
//!
//! ### The effect pipeline
//!
//! | Stage | Type | Job |
//! |-------|------|-----|
//! | Schedule | [`EmissionScheduler`] | When each spawn batch fires, cancellable |
//! | Spawn | [`SpawnContext`] | Randomized particle parameters, seedable |
//! | Simulate | [`World`] | Per-frame integration and culling |
//! | Draw | [`Renderer`] | Instanced quads, shapes carved in the shader |
//!
//! Data flows one way: the schedule spawns particles into the world, the
//! world integrates and culls, the renderer reads the surviving snapshot.
//!
//! ### Determinism
//!
//! All randomness goes through one seedable generator. The same seed, canvas
//! and tick timestamps reproduce an effect exactly, which the tests lean on.

pub mod emitter;
pub mod error;
pub mod feedback;
pub mod particle;
pub mod render;
mod simulation;
pub mod spawn;
pub mod time;
pub mod visuals;
pub mod world;

pub use emitter::{Batch, BatchKind, CancelHandle, EmissionPhase, EmissionScheduler};
pub use error::{EffectError, GpuError};
pub use feedback::{EffectCue, SilentCue};
pub use glam::{Vec2, Vec3};
pub use particle::Particle;
pub use render::{ParticleInstance, Renderer};
pub use simulation::{Confetti, ConfettiEffect};
pub use spawn::{Direction, SpawnContext};
pub use time::Time;
pub use visuals::{Palette, ShapeKind};
pub use world::{World, MAX_FRAME_DELTA};

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use confetti::prelude::*;
/// ```
pub mod prelude {
    pub use crate::emitter::{Batch, BatchKind, EmissionPhase, EmissionScheduler};
    pub use crate::feedback::{EffectCue, SilentCue};
    pub use crate::particle::Particle;
    pub use crate::simulation::{Confetti, ConfettiEffect};
    pub use crate::spawn::{Direction, SpawnContext};
    pub use crate::time::Time;
    pub use crate::visuals::{Palette, ShapeKind};
    pub use crate::world::World;
    pub use crate::{Vec2, Vec3};
}
